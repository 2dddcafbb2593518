pub mod cli;
pub mod core;

use crate::core::amortization::LoanTerms;
use crate::core::config::AppConfig;
use anyhow::Result;
use chrono::{Local, NaiveDate};
use tracing::{debug, info};

/// Commands the application can run.
pub enum AppCommand {
    /// Print the installment schedule for a loan or purchase.
    Schedule { terms: LoanTerms, json: bool },
    /// Analyse the configured ledger on a date (today when `None`).
    Analyze { as_of: Option<NaiveDate>, json: bool },
    /// Print income and expense per month.
    Monthly { as_of: Option<NaiveDate> },
}

pub fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("fintrack starting...");

    match command {
        AppCommand::Schedule { terms, json } => cli::schedule::run(&terms, json),
        AppCommand::Analyze { as_of, json } => {
            let config = load_config(config_path)?;
            cli::analyze::run(&config, as_of.unwrap_or_else(today), json)
        }
        AppCommand::Monthly { as_of } => {
            let config = load_config(config_path)?;
            cli::monthly::run(&config, as_of.unwrap_or_else(today))
        }
    }
}

fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");
    Ok(config)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
