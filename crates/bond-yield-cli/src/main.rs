mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use bond_yield_core::CalculationConfig;
use commands::bond::BondArgs;

/// Fixed-rate bond yield calculations
#[derive(Parser)]
#[command(
    name = "ytm",
    version,
    about = "Fixed-rate bond yield and cash flow schedule calculations",
    long_about = "A CLI for solving the yield to maturity of a plain-vanilla fixed-rate bond \
                  and projecting its coupon schedule. Reports nominal YTM, effective annual \
                  yield, current yield, premium/discount status and per-period cash flows."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Calculation settings file (JSON or YAML)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Log solver progress to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve yield to maturity and build the cash flow schedule
    Yield(BondArgs),
    /// Print the cash flow schedule only
    Schedule(BondArgs),
    /// Check a bond description and list every problem found
    Validate(BondArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(path: Option<&str>) -> Result<CalculationConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => input::file::read_document(path),
        None => Ok(CalculationConfig::default()),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    };

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Yield(args) => commands::bond::run_yield(args, &config),
        Commands::Schedule(args) => commands::bond::run_schedule(args, &config),
        Commands::Validate(args) => commands::bond::run_validate(args),
        Commands::Version => {
            println!("ytm {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            let invalid = value.get("valid") == Some(&serde_json::Value::Bool(false));
            process::exit(if invalid { 1 } else { 0 });
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
