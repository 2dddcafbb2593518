use super::ui;
use crate::core::analytics::{self, MonthlySummary};
use crate::core::config::AppConfig;
use crate::core::records::Transaction;
use crate::core::window;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use comfy_table::{Cell, Table};
use tracing::info;

pub fn run(config: &AppConfig, as_of: NaiveDate) -> Result<()> {
    info!("Building monthly evolution as of {as_of}...");
    let range = window::history_range(as_of, config.analysis.lookback_months)?;
    let transactions: Vec<Transaction> = config
        .ledger
        .transactions
        .iter()
        .filter(|t| range.contains(t.date))
        .cloned()
        .collect();

    let months = analytics::monthly_evolution(&transactions)?;
    if months.is_empty() {
        println!("No transactions between {} and {}.", range.start, range.end);
        return Ok(());
    }

    println!(
        "\n{} {}",
        ui::style_text("Monthly evolution", ui::StyleType::Title),
        ui::style_text(&format!("({})", config.currency), ui::StyleType::Subtle)
    );
    println!("{}", evolution_table(&months)?);
    Ok(())
}

fn evolution_table(months: &[MonthlySummary]) -> Result<Table> {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Month"),
        ui::header_cell("Income"),
        ui::header_cell("Expense"),
        ui::header_cell("Balance"),
    ]);

    for month in months {
        table.add_row(vec![
            Cell::new(&month.month),
            ui::money_cell(month.income),
            ui::money_cell(month.expense),
            ui::balance_cell(month.balance),
        ]);
    }

    let income = analytics::checked_sum(months.iter().map(|m| m.income))
        .context("Income total overflows decimal arithmetic")?;
    let expense = analytics::checked_sum(months.iter().map(|m| m.expense))
        .context("Expense total overflows decimal arithmetic")?;
    let balance = income
        .checked_sub(expense)
        .context("Balance total overflows decimal arithmetic")?;
    table.add_row(vec![
        ui::total_label_cell("Total"),
        ui::total_money_cell(income),
        ui::total_money_cell(expense),
        ui::balance_cell(balance),
    ]);
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_evolution_table_totals() {
        let months = vec![
            MonthlySummary {
                month: "2024-08".to_string(),
                income: dec!(8500),
                expense: dec!(3200),
                balance: dec!(5300),
            },
            MonthlySummary {
                month: "2024-09".to_string(),
                income: dec!(9200),
                expense: dec!(2800),
                balance: dec!(6400),
            },
        ];

        let rendered = evolution_table(&months).unwrap().to_string();
        assert!(rendered.contains("2024-08"));
        assert!(rendered.contains("17700.00"));
        assert!(rendered.contains("6000.00"));
        assert!(rendered.contains("11700.00"));
    }
}
