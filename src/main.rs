use anyhow::Result;
use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use fintrack::core::amortization::{InterestType, LoanTerms};
use fintrack::core::log::init_logging;
use rust_decimal::Decimal;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for fintrack::AppCommand {
    fn from(cmd: Commands) -> fintrack::AppCommand {
        match cmd {
            Commands::Schedule {
                amount,
                installments,
                rate,
                interest_type,
                first_payment,
                json,
            } => fintrack::AppCommand::Schedule {
                terms: LoanTerms {
                    total_amount: amount,
                    total_installments: installments,
                    interest_rate: rate,
                    interest_type,
                    first_payment_date: first_payment,
                },
                json,
            },
            Commands::Analyze { as_of, json } => fintrack::AppCommand::Analyze { as_of, json },
            Commands::Monthly { as_of } => fintrack::AppCommand::Monthly { as_of },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display the installment schedule for a loan or purchase
    Schedule {
        /// Principal being financed
        #[arg(short, long)]
        amount: Decimal,
        /// Number of monthly installments
        #[arg(short = 'n', long)]
        installments: u32,
        /// Annual interest rate in percent
        #[arg(short, long, default_value = "0")]
        rate: Decimal,
        /// Interest convention: simple or compound
        #[arg(short = 't', long, default_value = "simple")]
        interest_type: InterestType,
        /// Due date of the first installment (YYYY-MM-DD)
        #[arg(short, long)]
        first_payment: NaiveDate,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Display spending, projection, debt risk and goal progress
    Analyze {
        /// Analysis date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        as_of: Option<NaiveDate>,
        /// Print JSON instead of tables
        #[arg(long)]
        json: bool,
    },
    /// Display income and expense per month
    Monthly {
        /// Last day of the window (YYYY-MM-DD), defaults to today
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => fintrack::cli::setup::setup(),
        Some(cmd) => fintrack::run_command(cmd.into(), cli.config_path.as_deref()),
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
