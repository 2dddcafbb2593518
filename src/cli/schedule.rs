use super::ui;
use crate::core::amortization::{self, InstallmentSchedule, LoanTerms};
use anyhow::Result;
use comfy_table::{Cell, Table};
use tracing::info;

pub fn run(terms: &LoanTerms, json: bool) -> Result<()> {
    info!("Computing installment schedule...");
    let schedule = amortization::compute_schedule(terms)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&schedule)?);
        return Ok(());
    }

    println!(
        "\n{} {}",
        ui::style_text("Installment schedule", ui::StyleType::Title),
        ui::style_text(
            &format!(
                "({} x {}, {}% a year, {} interest)",
                terms.total_installments,
                terms.total_amount,
                terms.interest_rate,
                terms.interest_type
            ),
            ui::StyleType::Subtle
        )
    );
    println!("{}", schedule_table(&schedule));
    Ok(())
}

fn schedule_table(schedule: &InstallmentSchedule) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("#"),
        ui::header_cell("Due Date"),
        ui::header_cell("Amount"),
        ui::header_cell("Interest"),
        ui::header_cell("Principal"),
        ui::header_cell("Balance"),
    ]);

    for installment in &schedule.installments {
        table.add_row(vec![
            Cell::new(installment.number),
            Cell::new(installment.due_date.format("%Y-%m-%d")),
            ui::money_cell(installment.amount),
            ui::money_cell(installment.interest),
            ui::money_cell(installment.principal),
            ui::money_cell(installment.remaining_balance),
        ]);
    }

    table.add_row(vec![
        ui::total_label_cell("Total"),
        Cell::new(""),
        ui::total_money_cell(schedule.total_payable),
        ui::total_money_cell(schedule.total_interest),
        Cell::new(""),
        ui::percentage_cell(schedule.effective_rate),
    ]);
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::amortization::InterestType;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn test_schedule_table_lists_every_installment() {
        let terms = LoanTerms {
            total_amount: dec!(3000),
            total_installments: 6,
            interest_rate: dec!(2.5),
            interest_type: InterestType::Simple,
            first_payment_date: NaiveDate::from_ymd_opt(2024, 2, 10).unwrap(),
        };
        let schedule = amortization::compute_schedule(&terms).unwrap();

        let rendered = schedule_table(&schedule).to_string();
        assert!(rendered.contains("2024-02-10"));
        assert!(rendered.contains("2024-07-10"));
        assert!(rendered.contains("506.25"));
        assert!(rendered.contains("3037.50"));
        assert!(rendered.contains("1.25%"));
    }
}
