mod commands;
mod input;
mod output;
mod telemetry;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::mortgage::{AffordabilityArgs, AmortizeArgs, MortgageArgs};
use commands::va::{DtiArgs, FundingFeeArgs};

/// VA home-loan calculators
#[derive(Parser)]
#[command(
    name = "valoan",
    version,
    about = "VA home-loan calculators",
    long_about = "Estimate VA funding fees, debt-to-income ratios, amortization \
                  schedules, full monthly payments and affordable home prices \
                  with decimal precision. Results are illustrative estimates, \
                  not loan decisions."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Policy overrides file (JSON or YAML); omitted fields use built-in values
    #[arg(long, global = true)]
    policy: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the VA funding fee for a loan
    FundingFee(FundingFeeArgs),
    /// Evaluate front-end / back-end debt-to-income ratios
    Dti(DtiArgs),
    /// Build a monthly amortization schedule
    Amortize(AmortizeArgs),
    /// Solve for maximum and recommended home price
    Affordability(AffordabilityArgs),
    /// Compose the full monthly mortgage payment
    Mortgage(MortgageArgs),
    /// Print the active policy tables
    Policy,
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

fn main() {
    let cli = Cli::parse();

    if let Err(e) = telemetry::init(cli.verbose) {
        eprintln!("{}: {}", "warning".yellow().bold(), e);
    }

    let policy = match commands::policy::load_policy(cli.policy.as_deref()) {
        Ok(policy) => policy,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    };

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::FundingFee(args) => commands::va::run_funding_fee(args, &policy),
        Commands::Dti(args) => commands::va::run_dti(args, &policy),
        Commands::Amortize(args) => commands::mortgage::run_amortize(args),
        Commands::Affordability(args) => commands::mortgage::run_affordability(args, &policy),
        Commands::Mortgage(args) => commands::mortgage::run_mortgage(args, &policy),
        Commands::Policy => commands::policy::run_policy(&policy),
        Commands::Version => {
            println!("valoan {} (policy {})", env!("CARGO_PKG_VERSION"), policy.version);
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
