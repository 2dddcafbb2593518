//! Installment schedules for loans and purchases split into monthly payments.
//!
//! Two conventions are supported:
//! - **Simple interest**: interest accrues on the original principal for the
//!   whole term and the total is spread evenly across every installment.
//! - **Compound interest**: the standard amortized-loan payment
//!   `P * r(1 + r)^n / ((1 + r)^n - 1)` with `r` the monthly rate; each
//!   payment first covers the interest on the outstanding balance.
use chrono::{Months, NaiveDate};
use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::core::error::{FinanceError, Result};

const MONTHS_PER_YEAR: u32 = 12;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterestType {
    #[default]
    Simple,
    Compound,
}

impl FromStr for InterestType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "simple" => Ok(InterestType::Simple),
            "compound" => Ok(InterestType::Compound),
            other => Err(format!(
                "unknown interest type '{other}', expected 'simple' or 'compound'"
            )),
        }
    }
}

impl fmt::Display for InterestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterestType::Simple => write!(f, "simple"),
            InterestType::Compound => write!(f, "compound"),
        }
    }
}

/// Input parameters for a schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanTerms {
    /// The principal being financed.
    pub total_amount: Decimal,
    pub total_installments: u32,
    /// Annual interest rate as a percentage (e.g., 2.5 for 2.5%).
    #[serde(default)]
    pub interest_rate: Decimal,
    #[serde(default)]
    pub interest_type: InterestType,
    pub first_payment_date: NaiveDate,
}

/// A single row of the schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledInstallment {
    /// 1-based position in the schedule.
    pub number: u32,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    /// Portion of `amount` that pays interest.
    pub interest: Decimal,
    /// Portion of `amount` that pays down the principal.
    pub principal: Decimal,
    /// Outstanding balance after this payment, never negative.
    pub remaining_balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallmentSchedule {
    pub installments: Vec<ScheduledInstallment>,
    pub total_interest: Decimal,
    pub total_payable: Decimal,
    /// Total cost of the loan as a percentage of the principal.
    pub effective_rate: Decimal,
}

/// Adds calendar months to `date`, clamping to the last day of shorter months.
///
/// Returns `None` when the result falls outside the supported date range.
pub fn add_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(months))
}

/// Builds the full installment schedule for `terms`.
///
/// # Errors
///
/// Returns [`FinanceError::InvalidArgument`] when the principal is not
/// positive, the installment count is zero, the rate is negative, or the
/// terms overflow decimal arithmetic.
pub fn compute_schedule(terms: &LoanTerms) -> Result<InstallmentSchedule> {
    validate_terms(terms)?;
    debug!(
        amount = %terms.total_amount,
        installments = terms.total_installments,
        rate = %terms.interest_rate,
        kind = %terms.interest_type,
        "Computing installment schedule"
    );

    let (installments, total_interest, total_payable) = match terms.interest_type {
        InterestType::Simple => simple_schedule(terms)?,
        InterestType::Compound => compound_schedule(terms)?,
    };

    let effective_rate = (total_payable - terms.total_amount)
        .checked_div(terms.total_amount)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .ok_or_else(unstable)?;

    debug!(%total_interest, %total_payable, %effective_rate, "Schedule computed");
    Ok(InstallmentSchedule {
        installments,
        total_interest,
        total_payable,
        effective_rate,
    })
}

type ScheduleParts = (Vec<ScheduledInstallment>, Decimal, Decimal);

fn simple_schedule(terms: &LoanTerms) -> Result<ScheduleParts> {
    let count = terms.total_installments;
    let n = Decimal::from(count);
    let years = n / Decimal::from(MONTHS_PER_YEAR);

    let total_interest = terms
        .total_amount
        .checked_mul(terms.interest_rate / Decimal::ONE_HUNDRED)
        .and_then(|v| v.checked_mul(years))
        .ok_or_else(unstable)?;
    let total_payable = terms
        .total_amount
        .checked_add(total_interest)
        .ok_or_else(unstable)?;

    let installment_amount = total_payable / n;
    let interest_share = total_interest / n;
    let principal_share = terms.total_amount / n;

    let mut installments = Vec::with_capacity(count as usize);
    for number in 1..=count {
        let remaining_balance = if number == count {
            Decimal::ZERO
        } else {
            (total_payable - installment_amount * Decimal::from(number)).max(Decimal::ZERO)
        };
        installments.push(ScheduledInstallment {
            number,
            amount: installment_amount,
            due_date: due_date(terms.first_payment_date, number)?,
            interest: interest_share,
            principal: principal_share,
            remaining_balance,
        });
    }

    Ok((installments, total_interest, total_payable))
}

fn compound_schedule(terms: &LoanTerms) -> Result<ScheduleParts> {
    let count = terms.total_installments;
    let n = Decimal::from(count);
    let monthly_rate = terms.interest_rate / Decimal::ONE_HUNDRED / Decimal::from(MONTHS_PER_YEAR);

    let installment_amount = if monthly_rate.is_zero() {
        terms.total_amount / n
    } else {
        let growth = (Decimal::ONE + monthly_rate)
            .checked_powu(u64::from(count))
            .ok_or_else(unstable)?;
        let denominator = growth - Decimal::ONE;
        if denominator.is_zero() {
            return Err(unstable());
        }
        monthly_rate
            .checked_mul(growth)
            .and_then(|v| v.checked_div(denominator))
            .and_then(|factor| terms.total_amount.checked_mul(factor))
            .ok_or_else(unstable)?
    };

    let mut remaining = terms.total_amount;
    let mut total_interest = Decimal::ZERO;
    let mut installments = Vec::with_capacity(count as usize);

    for number in 1..=count {
        let interest = remaining * monthly_rate;
        let principal = installment_amount - interest;
        remaining -= principal;
        total_interest += interest;

        let remaining_balance = if number == count {
            Decimal::ZERO
        } else {
            remaining.max(Decimal::ZERO)
        };
        installments.push(ScheduledInstallment {
            number,
            amount: installment_amount,
            due_date: due_date(terms.first_payment_date, number)?,
            interest,
            principal,
            remaining_balance,
        });
    }

    // Flat-payment convention: the sum of the payments, not of the reductions.
    let total_payable = installment_amount.checked_mul(n).ok_or_else(unstable)?;
    Ok((installments, total_interest, total_payable))
}

fn validate_terms(terms: &LoanTerms) -> Result<()> {
    if terms.total_amount <= Decimal::ZERO {
        return Err(FinanceError::invalid(
            "total_amount",
            format!("must be positive, got {}", terms.total_amount),
        ));
    }
    if terms.total_installments == 0 {
        return Err(FinanceError::invalid(
            "total_installments",
            "must be at least 1",
        ));
    }
    if terms.interest_rate < Decimal::ZERO {
        return Err(FinanceError::invalid(
            "interest_rate",
            format!("cannot be negative, got {}", terms.interest_rate),
        ));
    }
    Ok(())
}

fn due_date(first_payment_date: NaiveDate, number: u32) -> Result<NaiveDate> {
    add_months(first_payment_date, number - 1).ok_or_else(|| {
        FinanceError::invalid(
            "first_payment_date",
            format!("installment {number} falls outside the supported date range"),
        )
    })
}

fn unstable() -> FinanceError {
    FinanceError::invalid(
        "interest_rate",
        "rate and term combination overflows decimal arithmetic",
    )
}
