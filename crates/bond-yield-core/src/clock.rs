use chrono::{NaiveDate, Utc};

/// Source of "today" for requests that omit a settlement date.
///
/// The only wall-clock read in the crate goes through this trait so that
/// calculations stay deterministic under test.
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Reads the current UTC date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// Always returns the same date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn today(&self) -> NaiveDate {
        (**self).today()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_is_stable() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let clock = FixedClock(date);
        assert_eq!(clock.today(), date);
        assert_eq!(clock.today(), clock.today());
    }

    #[test]
    fn test_clock_through_reference() {
        let date = NaiveDate::from_ymd_opt(2030, 12, 31).unwrap();
        let clock = FixedClock(date);
        let dynamic: &dyn Clock = &clock;
        assert_eq!(dynamic.today(), date);
    }
}
