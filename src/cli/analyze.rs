use super::ui;
use crate::core::analytics::{self, FinancialAnalysis};
use crate::core::config::AppConfig;
use crate::core::window;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use comfy_table::{Cell, Table};
use rust_decimal::Decimal;
use tracing::info;

pub fn run(config: &AppConfig, as_of: NaiveDate, json: bool) -> Result<()> {
    info!("Analysing finances as of {as_of}...");
    let snapshot = window::select_snapshot(&config.ledger, as_of, &config.analysis)?;
    let analysis = analytics::analyze(&snapshot, as_of, &config.analysis)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        return Ok(());
    }

    display_analysis(&analysis, &config.currency, as_of)
}

fn display_analysis(analysis: &FinancialAnalysis, currency: &str, as_of: NaiveDate) -> Result<()> {
    println!(
        "\n{} {}",
        ui::style_text("Financial analysis", ui::StyleType::Title),
        ui::style_text(&format!("(as of {as_of}, {currency})"), ui::StyleType::Subtle)
    );

    if analysis.expenses_by_category.is_empty() {
        println!("No expenses in the analysis window.");
    } else {
        println!("{}", category_table(analysis)?);
    }

    println!("\n{}", ui::style_text("Projection", ui::StyleType::Title));
    println!("{}", projection_table(analysis));

    println!("\n{}", ui::style_text("Debt risk", ui::StyleType::Title));
    println!("{}", debt_risk_table(analysis));

    if !analysis.abnormal_expenses.is_empty() {
        println!(
            "\n{}",
            ui::style_text("Abnormal expenses", ui::StyleType::Error)
        );
        println!("{}", abnormal_table(analysis));
    }

    if !analysis.goals_progress.is_empty() {
        ui::print_separator();
        println!("\n{}", ui::style_text("Goals", ui::StyleType::Title));
        println!("{}", goals_table(analysis));
    }
    Ok(())
}

fn category_table(analysis: &FinancialAnalysis) -> Result<Table> {
    let total = analytics::checked_sum(analysis.expenses_by_category.values().copied())
        .context("Category totals overflow decimal arithmetic")?;

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Category"),
        ui::header_cell("Spent"),
        ui::header_cell("Share (%)"),
    ]);

    let mut rows: Vec<(&String, &Decimal)> = analysis.expenses_by_category.iter().collect();
    rows.sort_by(|a, b| b.1.cmp(a.1));
    for (category, amount) in rows {
        let share = if total > Decimal::ZERO {
            amount
                .checked_div(total)
                .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
                .with_context(|| format!("Share of {category} overflows decimal arithmetic"))?
        } else {
            Decimal::ZERO
        };
        table.add_row(vec![
            Cell::new(category),
            ui::money_cell(*amount),
            ui::percentage_cell(share),
        ]);
    }

    table.add_row(vec![
        ui::total_label_cell("Total"),
        ui::total_money_cell(total),
        Cell::new(""),
    ]);
    Ok(table)
}

fn projection_table(analysis: &FinancialAnalysis) -> Table {
    let trends = &analysis.trends;
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Metric"), ui::header_cell("Value")]);

    table.add_row(vec![
        Cell::new("Average ticket"),
        ui::money_cell(analysis.average_ticket),
    ]);
    table.add_row(vec![
        Cell::new("Monthly income"),
        ui::money_cell(trends.monthly_income),
    ]);
    table.add_row(vec![
        Cell::new("Monthly expenses"),
        ui::money_cell(trends.monthly_expenses),
    ]);
    table.add_row(vec![
        Cell::new("Monthly installments"),
        ui::money_cell(trends.monthly_installments),
    ]);
    table.add_row(vec![
        ui::total_label_cell("Projected monthly balance"),
        ui::balance_cell(analysis.projected_monthly_balance),
    ]);
    table.add_row(vec![
        ui::total_label_cell("Projected annual balance"),
        ui::balance_cell(analysis.projected_annual_balance),
    ]);
    table.add_row(vec![
        Cell::new("Income growth (YoY)"),
        ui::change_cell(trends.income_growth_rate_pct),
    ]);
    table
}

fn debt_risk_table(analysis: &FinancialAnalysis) -> Table {
    let risk = &analysis.debt_risk;
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Level"),
        ui::header_cell("Utilization (%)"),
        ui::header_cell("Limit"),
        ui::header_cell("Balance"),
    ]);
    table.add_row(vec![
        ui::risk_cell(risk.level),
        ui::percentage_cell(risk.utilization_pct),
        ui::money_cell(risk.limit),
        ui::money_cell(risk.balance),
    ]);
    table
}

fn abnormal_table(analysis: &FinancialAnalysis) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Date"),
        ui::header_cell("Category"),
        ui::header_cell("Description"),
        ui::header_cell("Amount"),
    ]);
    for expense in &analysis.abnormal_expenses {
        table.add_row(vec![
            Cell::new(expense.date.format("%Y-%m-%d")),
            Cell::new(&expense.category),
            Cell::new(expense.description.as_deref().unwrap_or("-")),
            ui::money_cell(expense.amount),
        ]);
    }
    table
}

fn goals_table(analysis: &FinancialAnalysis) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Goal"),
        ui::header_cell("Type"),
        ui::header_cell("Target Date"),
        ui::header_cell("Progress (%)"),
    ]);
    for goal in &analysis.goals_progress {
        table.add_row(vec![
            Cell::new(&goal.title),
            Cell::new(goal.kind),
            Cell::new(goal.target_date.format("%Y-%m-%d")),
            ui::percentage_cell(goal.progress_pct),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::analytics::AnalysisOptions;
    use crate::core::records::{
        CreditAggregate, Goal, GoalType, Snapshot, Transaction, TransactionType,
    };
    use rust_decimal_macros::dec;

    fn sample_analysis() -> FinancialAnalysis {
        let as_of = NaiveDate::from_ymd_opt(2024, 8, 31).unwrap();
        let expense = |amount: Decimal, category: &str, day: u32| Transaction {
            id: None,
            description: Some(format!("{category} bill")),
            amount,
            kind: TransactionType::Expense,
            date: NaiveDate::from_ymd_opt(2024, 8, day).unwrap(),
            category_id: None,
            category_name: category.to_string(),
        };
        let snapshot = Snapshot {
            transactions: vec![
                expense(dec!(300), "Housing", 1),
                expense(dec!(100), "Food", 2),
            ],
            installments: vec![],
            goals: vec![Goal {
                id: None,
                title: "Emergency fund".to_string(),
                target_amount: dec!(1000),
                current_amount: dec!(250),
                target_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                kind: GoalType::ExpenseLimit,
                is_active: true,
            }],
            credit: CreditAggregate::new(dec!(1000), dec!(800)),
        };
        analytics::analyze(&snapshot, as_of, &AnalysisOptions::default()).unwrap()
    }

    #[test]
    fn test_category_table_shows_shares() {
        let rendered = category_table(&sample_analysis()).unwrap().to_string();
        assert!(rendered.contains("Housing"));
        assert!(rendered.contains("75.00%"));
        assert!(rendered.contains("25.00%"));
        assert!(rendered.contains("400.00"));
    }

    #[test]
    fn test_risk_and_goal_tables() {
        let analysis = sample_analysis();
        let risk = debt_risk_table(&analysis).to_string();
        assert!(risk.contains("HIGH"));
        assert!(risk.contains("80.00%"));

        let goals = goals_table(&analysis).to_string();
        assert!(goals.contains("Emergency fund"));
        assert!(goals.contains("expense_limit"));
        assert!(goals.contains("25.00%"));
    }
}
