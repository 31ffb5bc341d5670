use crate::types::Rate;

/// Below this magnitude a periodic rate is treated as zero and the
/// undiscounted limits are used instead of the closed forms.
pub const ZERO_RATE_THRESHOLD: f64 = 1e-12;

/// Present value of a level-coupon bullet bond at periodic rate `rate`:
///
///   P(r) = C * (1 - (1+r)^-N) / r + F * (1+r)^-N
///
/// With |r| below [`ZERO_RATE_THRESHOLD`] the limit `C*N + F` is returned.
pub fn bond_price(rate: Rate, coupon: f64, face_value: f64, periods: u32) -> f64 {
    let n = f64::from(periods);
    if rate.abs() < ZERO_RATE_THRESHOLD {
        return coupon * n + face_value;
    }

    let discount = (1.0 + rate).powf(-n);
    // A zero coupon contributes nothing, even where the annuity factor blows up.
    let coupons = if coupon == 0.0 {
        0.0
    } else {
        coupon * (1.0 - discount) / rate
    };

    coupons + face_value * discount
}

/// Analytic first derivative dP/dr of [`bond_price`]:
///
///   dP/dr = C * [N r v / (1+r) - (1 - v)] / r^2 - N F v / (1+r),  v = (1+r)^-N
///
/// Near zero the limit `-C*N(N+1)/2 - N*F` is returned.
pub fn bond_price_derivative(rate: Rate, coupon: f64, face_value: f64, periods: u32) -> f64 {
    let n = f64::from(periods);
    if rate.abs() < ZERO_RATE_THRESHOLD {
        return -coupon * n * (n + 1.0) / 2.0 - n * face_value;
    }

    let one_plus_r = 1.0 + rate;
    let discount = one_plus_r.powf(-n);
    let coupons = if coupon == 0.0 {
        0.0
    } else {
        coupon * (n * rate * discount / one_plus_r - (1.0 - discount)) / (rate * rate)
    };

    coupons - n * face_value * discount / one_plus_r
}
