mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::dashboard::ClientArgs;
use commands::mortgage::MortgageArgs;
use commands::schedule::ScheduleArgs;

/// Loan amortization, mortgage simulation and client dashboard figures
#[derive(Parser)]
#[command(
    name = "loanbook",
    version,
    about = "Loan amortization, mortgage simulation and client dashboard figures",
    long_about = "Computes loan repayment schedules (annuity or flat-interest), \
                  mortgage simulations from a provider quote or local pricing, \
                  and the dashboard summary for a backend client record, \
                  all with decimal precision."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Pricing configuration file (JSON or YAML)
    #[arg(long, global = true)]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Month-by-month amortization schedule for a loan
    Schedule(ScheduleArgs),
    /// Mortgage simulation with DAE, total cost and schedule
    Mortgage(MortgageArgs),
    /// Full dashboard summary for a client record
    Dashboard(ClientArgs),
    /// Products held and deposit maturities
    Accounts(ClientArgs),
    /// Overdraft and credit card utilization with risk grade
    Utilization(ClientArgs),
    /// Spending by MCC category
    Spending(ClientArgs),
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
    env_logger::init();
    let cli = Cli::parse();

    let config = match input::load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    };

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Schedule(args) => commands::schedule::run_schedule(args, &config),
        Commands::Mortgage(args) => commands::mortgage::run_mortgage(args, &config),
        Commands::Dashboard(args) => commands::dashboard::run_dashboard(args),
        Commands::Accounts(args) => commands::dashboard::run_accounts(args),
        Commands::Utilization(args) => commands::dashboard::run_utilization(args),
        Commands::Spending(args) => commands::dashboard::run_spending(args),
        Commands::Version => {
            println!("loanbook {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            log::debug!("command failed: {e:?}");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
