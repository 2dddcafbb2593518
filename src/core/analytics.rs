//! Provides functions for analysing a window of personal-finance records.
//!
//! Every step is a pure function over borrowed records so it can be tested on
//! its own; [`analyze`] stitches them together into a [`FinancialAnalysis`].
use crate::core::error::{FinanceError, Result};
use crate::core::records::{CreditAggregate, Goal, GoalType, Installment, Snapshot, Transaction};
use chrono::{Datelike, NaiveDate};
use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

const MONTHS_PER_YEAR: u32 = 12;
/// Utilization strictly above this is high risk.
const HIGH_RISK_UTILIZATION: Decimal = Decimal::from_parts(7, 0, 0, false, 1);
/// Utilization strictly above this is at least medium risk.
const MEDIUM_RISK_UTILIZATION: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

/// Tunables for an analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct AnalysisOptions {
    /// Months of transaction history selected before the analysis date.
    pub lookback_months: u32,
    /// Divisor turning windowed income and expense totals into monthly figures.
    pub run_rate_months: u32,
    /// Months of upcoming installments selected and averaged over.
    pub installment_horizon_months: u32,
    /// Standard deviations above the mean before an expense counts as abnormal.
    pub anomaly_sigma: Decimal,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        AnalysisOptions {
            lookback_months: 12,
            run_rate_months: 6,
            installment_horizon_months: 12,
            anomaly_sigma: Decimal::TWO,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Classifies a utilization ratio (balance / limit, not a percentage).
    pub fn from_utilization(utilization: Decimal) -> Self {
        if utilization > HIGH_RISK_UTILIZATION {
            RiskLevel::High
        } else if utilization > MEDIUM_RISK_UTILIZATION {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtRisk {
    pub level: RiskLevel,
    pub utilization_pct: Decimal,
    pub limit: Decimal,
    pub balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trends {
    pub income_growth_rate_pct: Decimal,
    pub monthly_income: Decimal,
    pub monthly_expenses: Decimal,
    pub monthly_installments: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbnormalExpense {
    pub id: Option<String>,
    pub description: Option<String>,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalProgress {
    pub id: Option<String>,
    pub title: String,
    pub progress_pct: Decimal,
    pub target_date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: GoalType,
}

/// Population statistics over the expense amounts of a window.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ExpenseStatistics {
    pub count: usize,
    pub mean: Decimal,
    pub std_dev: Decimal,
    /// Amounts strictly above this are abnormal.
    pub threshold: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RunRates {
    pub monthly_income: Decimal,
    pub monthly_expenses: Decimal,
    pub monthly_installments: Decimal,
}

impl RunRates {
    /// Income left each month after expenses and installments.
    pub fn projected_monthly_balance(&self) -> Result<Decimal> {
        self.monthly_income
            .checked_sub(self.monthly_expenses)
            .and_then(|balance| balance.checked_sub(self.monthly_installments))
            .ok_or_else(|| overflow("transactions"))
    }
}

/// Income and expense totals for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySummary {
    /// `YYYY-MM`
    pub month: String,
    pub income: Decimal,
    pub expense: Decimal,
    pub balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialAnalysis {
    pub expenses_by_category: BTreeMap<String, Decimal>,
    pub average_ticket: Decimal,
    pub abnormal_expenses: Vec<AbnormalExpense>,
    pub projected_monthly_balance: Decimal,
    pub projected_annual_balance: Decimal,
    pub debt_risk: DebtRisk,
    pub trends: Trends,
    pub goals_progress: Vec<GoalProgress>,
}

/// Runs every analysis step over `snapshot`.
///
/// `as_of` only anchors the year-over-year comparison; the snapshot is
/// expected to be already bounded by the caller (see [`crate::core::window`]).
///
/// # Errors
///
/// Returns [`FinanceError::InvalidArgument`] if the run-rate or horizon month
/// counts are zero, or any amount overflows decimal arithmetic.
pub fn analyze(
    snapshot: &Snapshot,
    as_of: NaiveDate,
    options: &AnalysisOptions,
) -> Result<FinancialAnalysis> {
    debug!(
        transactions = snapshot.transactions.len(),
        installments = snapshot.installments.len(),
        goals = snapshot.goals.len(),
        %as_of,
        "Analysing snapshot"
    );

    let expenses_by_category = expenses_by_category(&snapshot.transactions)?;
    let average_ticket = average_ticket(&snapshot.transactions)?;

    let stats = expense_statistics(&snapshot.transactions, options.anomaly_sigma)?;
    debug!(count = stats.count, mean = %stats.mean, std_dev = %stats.std_dev, threshold = %stats.threshold, "Expense statistics");
    let abnormal_expenses = abnormal_expenses(&snapshot.transactions, &stats);

    let rates = run_rates(&snapshot.transactions, &snapshot.installments, options)?;
    let projected_monthly_balance = rates.projected_monthly_balance()?;
    let projected_annual_balance = projected_monthly_balance
        .checked_mul(Decimal::from(MONTHS_PER_YEAR))
        .ok_or_else(|| overflow("transactions"))?;

    let debt_risk = debt_risk(&snapshot.credit)?;
    let income_growth_rate_pct = income_growth_rate(&snapshot.transactions, as_of)?;

    Ok(FinancialAnalysis {
        expenses_by_category,
        average_ticket,
        abnormal_expenses,
        projected_monthly_balance,
        projected_annual_balance,
        debt_risk,
        trends: Trends {
            income_growth_rate_pct,
            monthly_income: rates.monthly_income,
            monthly_expenses: rates.monthly_expenses,
            monthly_installments: rates.monthly_installments,
        },
        goals_progress: goals_progress(&snapshot.goals)?,
    })
}

/// Sums expense amounts per category name.
///
/// Categories without any expense in the input are absent, not zero.
pub fn expenses_by_category(transactions: &[Transaction]) -> Result<BTreeMap<String, Decimal>> {
    let mut totals = BTreeMap::new();
    for transaction in transactions.iter().filter(|t| t.is_expense()) {
        let total = totals
            .entry(transaction.category_name.clone())
            .or_insert(Decimal::ZERO);
        *total = total
            .checked_add(transaction.amount)
            .ok_or_else(|| overflow("transactions"))?;
    }
    Ok(totals)
}

/// Mean expense amount, or zero when there are no expenses.
pub fn average_ticket(transactions: &[Transaction]) -> Result<Decimal> {
    let amounts: Vec<Decimal> = transactions
        .iter()
        .filter(|t| t.is_expense())
        .map(|t| t.amount)
        .collect();
    if amounts.is_empty() {
        return Ok(Decimal::ZERO);
    }

    let total = checked_sum(amounts.iter().copied()).ok_or_else(|| overflow("transactions"))?;
    Ok(total / Decimal::from(amounts.len()))
}

/// Population mean and standard deviation of expense amounts, with the
/// anomaly threshold at `mean + sigma * std_dev`.
///
/// An empty input yields all-zero statistics.
pub fn expense_statistics(
    transactions: &[Transaction],
    sigma: Decimal,
) -> Result<ExpenseStatistics> {
    let amounts: Vec<Decimal> = transactions
        .iter()
        .filter(|t| t.is_expense())
        .map(|t| t.amount)
        .collect();

    if amounts.is_empty() {
        return Ok(ExpenseStatistics::default());
    }

    let n = Decimal::from(amounts.len());
    let mean = checked_sum(amounts.iter().copied()).ok_or_else(|| overflow("transactions"))? / n;

    let squared_deviations = amounts
        .iter()
        .try_fold(Decimal::ZERO, |acc, amount| -> Option<Decimal> {
            let deviation = amount.checked_sub(mean)?;
            deviation
                .checked_mul(deviation)
                .and_then(|square| acc.checked_add(square))
        })
        .ok_or_else(|| overflow("transactions"))?;
    let variance = squared_deviations / n;
    let std_dev = variance.sqrt().unwrap_or(Decimal::ZERO);

    let threshold = sigma
        .checked_mul(std_dev)
        .and_then(|spread| mean.checked_add(spread))
        .ok_or_else(|| overflow("anomaly_sigma"))?;

    Ok(ExpenseStatistics {
        count: amounts.len(),
        mean,
        std_dev,
        threshold,
    })
}

/// Expenses strictly above the statistical threshold.
pub fn abnormal_expenses(
    transactions: &[Transaction],
    stats: &ExpenseStatistics,
) -> Vec<AbnormalExpense> {
    if stats.count == 0 {
        return Vec::new();
    }

    transactions
        .iter()
        .filter(|t| t.is_expense() && t.amount > stats.threshold)
        .map(|t| AbnormalExpense {
            id: t.id.clone(),
            description: t.description.clone(),
            amount: t.amount,
            date: t.date,
            category: t.category_name.clone(),
        })
        .collect()
}

/// Average monthly income, expenses and upcoming installment outflow.
pub fn run_rates(
    transactions: &[Transaction],
    installments: &[Installment],
    options: &AnalysisOptions,
) -> Result<RunRates> {
    if options.run_rate_months == 0 {
        return Err(FinanceError::invalid(
            "run_rate_months",
            "must be at least 1",
        ));
    }
    if options.installment_horizon_months == 0 {
        return Err(FinanceError::invalid(
            "installment_horizon_months",
            "must be at least 1",
        ));
    }

    let run_rate_months = Decimal::from(options.run_rate_months);
    let income = checked_sum(
        transactions
            .iter()
            .filter(|t| t.is_income())
            .map(|t| t.amount),
    )
    .ok_or_else(|| overflow("transactions"))?;
    let expenses = checked_sum(
        transactions
            .iter()
            .filter(|t| t.is_expense())
            .map(|t| t.amount),
    )
    .ok_or_else(|| overflow("transactions"))?;
    let upcoming = checked_sum(installments.iter().map(|i| i.installment_amount))
        .ok_or_else(|| overflow("installments"))?;

    Ok(RunRates {
        monthly_income: income / run_rate_months,
        monthly_expenses: expenses / run_rate_months,
        monthly_installments: upcoming / Decimal::from(options.installment_horizon_months),
    })
}

/// Credit utilization and its risk tier. A zero limit counts as no utilization.
pub fn debt_risk(credit: &CreditAggregate) -> Result<DebtRisk> {
    let utilization = if credit.limit > Decimal::ZERO {
        credit
            .balance
            .checked_div(credit.limit)
            .ok_or_else(|| overflow("credit_cards"))?
    } else {
        Decimal::ZERO
    };
    let utilization_pct = utilization
        .checked_mul(Decimal::ONE_HUNDRED)
        .ok_or_else(|| overflow("credit_cards"))?;

    Ok(DebtRisk {
        level: RiskLevel::from_utilization(utilization),
        utilization_pct,
        limit: credit.limit,
        balance: credit.balance,
    })
}

/// Growth of income in the year of `as_of` over the previous calendar year,
/// as a percentage. Zero when there was no income last year.
pub fn income_growth_rate(transactions: &[Transaction], as_of: NaiveDate) -> Result<Decimal> {
    let current_year = as_of.year();
    let last_year = current_year - 1;

    let income_in = |year: i32| -> Result<Decimal> {
        checked_sum(
            transactions
                .iter()
                .filter(|t| t.is_income() && t.date.year() == year)
                .map(|t| t.amount),
        )
        .ok_or_else(|| overflow("transactions"))
    };

    let current_year_income = income_in(current_year)?;
    let last_year_income = income_in(last_year)?;

    if last_year_income > Decimal::ZERO {
        current_year_income
            .checked_sub(last_year_income)
            .and_then(|change| change.checked_div(last_year_income))
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .ok_or_else(|| overflow("transactions"))
    } else {
        Ok(Decimal::ZERO)
    }
}

/// Progress towards each active goal; a zero target reports zero progress.
pub fn goals_progress(goals: &[Goal]) -> Result<Vec<GoalProgress>> {
    goals
        .iter()
        .filter(|g| g.is_active)
        .map(|goal| -> Result<GoalProgress> {
            let progress_pct = if goal.target_amount > Decimal::ZERO {
                goal.current_amount
                    .checked_div(goal.target_amount)
                    .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
                    .ok_or_else(|| overflow("goals"))?
            } else {
                Decimal::ZERO
            };
            Ok(GoalProgress {
                id: goal.id.clone(),
                title: goal.title.clone(),
                progress_pct,
                target_date: goal.target_date,
                kind: goal.kind,
            })
        })
        .collect()
}

/// Per-month income, expense and balance in chronological order.
pub fn monthly_evolution(transactions: &[Transaction]) -> Result<Vec<MonthlySummary>> {
    let mut months: BTreeMap<(i32, u32), (Decimal, Decimal)> = BTreeMap::new();
    for t in transactions {
        let (income, expense) = months
            .entry((t.date.year(), t.date.month()))
            .or_insert((Decimal::ZERO, Decimal::ZERO));
        let total = if t.is_income() { income } else { expense };
        *total = total
            .checked_add(t.amount)
            .ok_or_else(|| overflow("transactions"))?;
    }

    months
        .into_iter()
        .map(|((year, month), (income, expense))| -> Result<MonthlySummary> {
            Ok(MonthlySummary {
                month: format!("{year:04}-{month:02}"),
                income,
                expense,
                balance: income
                    .checked_sub(expense)
                    .ok_or_else(|| overflow("transactions"))?,
            })
        })
        .collect()
}

/// Adds up `amounts`, or `None` once the total leaves the decimal range.
pub fn checked_sum(amounts: impl IntoIterator<Item = Decimal>) -> Option<Decimal> {
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, amount| acc.checked_add(amount))
}

fn overflow(field: &'static str) -> FinanceError {
    FinanceError::invalid(field, "amounts overflow decimal arithmetic")
}
