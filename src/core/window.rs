//! Selects the bounded record set an analysis runs over.
use crate::core::analytics::AnalysisOptions;
use crate::core::error::{FinanceError, Result};
use crate::core::records::{CreditAggregate, InstallmentStatus, Ledger, Snapshot};
use chrono::{Datelike, Months, NaiveDate};
use tracing::debug;

/// Inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// History from the first day of the month `lookback_months` before `as_of`
/// through `as_of` itself.
pub fn history_range(as_of: NaiveDate, lookback_months: u32) -> Result<DateRange> {
    let start = first_of_month(as_of)
        .checked_sub_months(Months::new(lookback_months))
        .ok_or_else(|| out_of_range("lookback_months"))?;
    Ok(DateRange { start, end: as_of })
}

/// From `as_of` through the last day of the month before the one
/// `horizon_months` ahead.
pub fn horizon_range(as_of: NaiveDate, horizon_months: u32) -> Result<DateRange> {
    let end = first_of_month(as_of)
        .checked_add_months(Months::new(horizon_months))
        .and_then(|d| d.pred_opt())
        .ok_or_else(|| out_of_range("installment_horizon_months"))?;
    Ok(DateRange { start: as_of, end })
}

/// Picks the transactions, pending installments, active goals and active
/// cards relevant for an analysis on `as_of`.
pub fn select_snapshot(
    ledger: &Ledger,
    as_of: NaiveDate,
    options: &AnalysisOptions,
) -> Result<Snapshot> {
    let history = history_range(as_of, options.lookback_months)?;
    let horizon = horizon_range(as_of, options.installment_horizon_months)?;
    debug!(?history, ?horizon, "Selecting records");

    let snapshot = Snapshot {
        transactions: ledger
            .transactions
            .iter()
            .filter(|t| history.contains(t.date))
            .cloned()
            .collect(),
        installments: ledger
            .installments
            .iter()
            .filter(|i| i.status == InstallmentStatus::Pending && horizon.contains(i.due_date))
            .cloned()
            .collect(),
        goals: ledger.goals.iter().filter(|g| g.is_active).cloned().collect(),
        credit: CreditAggregate::from_cards(&ledger.credit_cards)?,
    };

    debug!(
        transactions = snapshot.transactions.len(),
        installments = snapshot.installments.len(),
        goals = snapshot.goals.len(),
        "Selected records"
    );
    Ok(snapshot)
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - chrono::Days::new(u64::from(date.day0()))
}

fn out_of_range(field: &'static str) -> FinanceError {
    FinanceError::invalid(field, "window falls outside the supported date range")
}
