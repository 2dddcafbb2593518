//! Records supplied by the persistence side of the tracker.
//!
//! The engine only reads these; nothing in `core` mutates a record.
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::amortization::InterestType;
use crate::core::error::{FinanceError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub date: NaiveDate,
    #[serde(default)]
    pub category_id: Option<String>,
    pub category_name: String,
}

impl Transaction {
    pub fn is_expense(&self) -> bool {
        self.kind == TransactionType::Expense
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionType::Income
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallmentStatus {
    #[default]
    Pending,
    Paid,
    Overdue,
}

/// One installment of a purchase split across several invoices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Installment {
    #[serde(default)]
    pub id: Option<String>,
    pub total_amount: Decimal,
    pub installment_amount: Decimal,
    /// 1-based, never above `total_installments`.
    pub installment_number: u32,
    pub total_installments: u32,
    /// Annual percentage.
    #[serde(default)]
    pub interest_rate: Decimal,
    #[serde(default)]
    pub interest_type: InterestType,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub status: InstallmentStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalType {
    Savings,
    ExpenseLimit,
    DebtReduction,
}

impl fmt::Display for GoalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GoalType::Savings => write!(f, "savings"),
            GoalType::ExpenseLimit => write!(f, "expense_limit"),
            GoalType::DebtReduction => write!(f, "debt_reduction"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    pub target_amount: Decimal,
    #[serde(default)]
    pub current_amount: Decimal,
    pub target_date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: GoalType,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditCard {
    pub name: String,
    pub limit: Decimal,
    #[serde(default)]
    pub current_balance: Decimal,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Limit and balance summed across a user's active cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CreditAggregate {
    pub limit: Decimal,
    pub balance: Decimal,
}

impl CreditAggregate {
    pub fn new(limit: Decimal, balance: Decimal) -> Self {
        CreditAggregate { limit, balance }
    }

    /// Sums limit and current balance over the active cards only.
    ///
    /// # Errors
    ///
    /// Returns [`FinanceError::InvalidArgument`] if the totals overflow
    /// decimal arithmetic.
    pub fn from_cards<'a>(cards: impl IntoIterator<Item = &'a CreditCard>) -> Result<Self> {
        cards
            .into_iter()
            .filter(|c| c.is_active)
            .try_fold(CreditAggregate::default(), |acc, card| -> Option<Self> {
                Some(CreditAggregate {
                    limit: acc.limit.checked_add(card.limit)?,
                    balance: acc.balance.checked_add(card.current_balance)?,
                })
            })
            .ok_or_else(|| {
                FinanceError::invalid("credit_cards", "amounts overflow decimal arithmetic")
            })
    }
}

/// Every record the tracker holds for one user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ledger {
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub installments: Vec<Installment>,
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub credit_cards: Vec<CreditCard>,
}

/// The bounded record set a single analysis runs over.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub transactions: Vec<Transaction>,
    pub installments: Vec<Installment>,
    pub goals: Vec<Goal>,
    pub credit: CreditAggregate,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn card(limit: Decimal, balance: Decimal, is_active: bool) -> CreditCard {
        CreditCard {
            name: "Visa".to_string(),
            limit,
            current_balance: balance,
            is_active,
        }
    }

    #[test]
    fn test_credit_aggregate_skips_inactive_cards() {
        let cards = vec![
            card(dec!(5000), dec!(1200), true),
            card(dec!(3000), dec!(800), true),
            card(dec!(10000), dec!(9000), false),
        ];

        let aggregate = CreditAggregate::from_cards(&cards).unwrap();
        assert_eq!(aggregate.limit, dec!(8000));
        assert_eq!(aggregate.balance, dec!(2000));
    }

    #[test]
    fn test_credit_aggregate_of_no_cards_is_zero() {
        let aggregate = CreditAggregate::from_cards(&Vec::<CreditCard>::new()).unwrap();
        assert_eq!(aggregate, CreditAggregate::default());
    }

    #[test]
    fn test_credit_aggregate_overflow_is_an_error() {
        let cards = vec![
            card(Decimal::MAX, dec!(100), true),
            card(Decimal::MAX, dec!(100), true),
        ];

        assert!(matches!(
            CreditAggregate::from_cards(&cards),
            Err(FinanceError::InvalidArgument {
                field: "credit_cards",
                ..
            })
        ));

        let cards = vec![
            card(Decimal::MAX, dec!(100), true),
            card(Decimal::MAX, dec!(100), false),
        ];
        assert!(CreditAggregate::from_cards(&cards).is_ok());
    }

    #[test]
    fn test_ledger_deserialization_with_defaults() {
        let yaml_str = r#"
transactions:
  - amount: 8000
    type: income
    date: 2024-08-05
    categoryName: "Salary"
  - id: "t-2"
    description: "Groceries"
    amount: 450.25
    type: expense
    date: 2024-08-12
    categoryId: "cat-5"
    categoryName: "Food"
installments:
  - totalAmount: 1200
    installmentAmount: 100
    installmentNumber: 3
    totalInstallments: 12
    dueDate: 2024-11-10
goals:
  - title: "Emergency fund"
    targetAmount: 30000
    currentAmount: 12500
    targetDate: 2025-12-31
    type: savings
creditCards:
  - name: "Mastercard"
    limit: 3000
    isActive: false
"#;

        let ledger: Ledger = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(ledger.transactions.len(), 2);
        assert!(ledger.transactions[0].is_income());
        assert_eq!(ledger.transactions[0].id, None);
        assert!(ledger.transactions[1].is_expense());
        assert_eq!(ledger.transactions[1].amount, dec!(450.25));
        assert_eq!(ledger.transactions[1].category_id.as_deref(), Some("cat-5"));

        let installment = &ledger.installments[0];
        assert_eq!(installment.status, InstallmentStatus::Pending);
        assert_eq!(installment.interest_type, InterestType::Simple);
        assert_eq!(installment.interest_rate, Decimal::ZERO);

        let goal = &ledger.goals[0];
        assert_eq!(goal.kind, GoalType::Savings);
        assert!(goal.is_active);

        let card = &ledger.credit_cards[0];
        assert_eq!(card.current_balance, Decimal::ZERO);
        assert!(!card.is_active);
    }
}
