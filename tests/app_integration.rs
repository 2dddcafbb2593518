use chrono::NaiveDate;
use fintrack::core::amortization::{InterestType, LoanTerms};
use fintrack::core::analytics::{self, AnalysisOptions, RiskLevel};
use fintrack::core::config::AppConfig;
use fintrack::core::window;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::fs;
use std::path::PathBuf;
use tracing::info;

fn example_config_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("docs")
        .join("example_config.yaml")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    fs::write(config_file.path(), content).expect("Failed to write config file");
    config_file
}

#[test_log::test]
fn test_schedule_command() {
    let terms = LoanTerms {
        total_amount: dec!(3000.00),
        total_installments: 6,
        interest_rate: dec!(2.5),
        interest_type: InterestType::Simple,
        first_payment_date: date(2024, 2, 10),
    };

    for json in [false, true] {
        let result = fintrack::run_command(
            fintrack::AppCommand::Schedule {
                terms: terms.clone(),
                json,
            },
            None,
        );
        assert!(result.is_ok(), "Schedule failed with: {:?}", result.err());
    }
}

#[test_log::test]
fn test_schedule_command_reports_invalid_terms() {
    let terms = LoanTerms {
        total_amount: dec!(3000.00),
        total_installments: 0,
        interest_rate: dec!(2.5),
        interest_type: InterestType::Compound,
        first_payment_date: date(2024, 2, 10),
    };

    let err = fintrack::run_command(fintrack::AppCommand::Schedule { terms, json: false }, None)
        .unwrap_err();
    info!(%err, "Schedule rejected");
    assert!(err.to_string().contains("total_installments"));
}

#[test_log::test]
fn test_full_app_flow_with_example_config() {
    let config_path = example_config_path();
    let config_path = config_path.to_str().unwrap();

    for json in [false, true] {
        let result = fintrack::run_command(
            fintrack::AppCommand::Analyze {
                as_of: Some(date(2025, 1, 31)),
                json,
            },
            Some(config_path),
        );
        assert!(result.is_ok(), "Analyze failed with: {:?}", result.err());
    }

    let result = fintrack::run_command(
        fintrack::AppCommand::Monthly {
            as_of: Some(date(2025, 1, 31)),
        },
        Some(config_path),
    );
    assert!(result.is_ok(), "Monthly failed with: {:?}", result.err());
}

#[test_log::test]
fn test_example_config_analysis_values() {
    let config = AppConfig::load_from_path(example_config_path()).unwrap();
    let as_of = date(2025, 1, 31);

    let snapshot = window::select_snapshot(&config.ledger, as_of, &config.analysis).unwrap();
    assert_eq!(snapshot.installments.len(), 7);
    assert_eq!(snapshot.goals.len(), 2);

    let analysis = analytics::analyze(&snapshot, as_of, &config.analysis).unwrap();

    assert_eq!(analysis.expenses_by_category["Housing"], dec!(12000));
    assert_eq!(analysis.expenses_by_category["Electronics"], dec!(6500));
    assert_eq!(analysis.average_ticket, dec!(968));

    assert_eq!(analysis.abnormal_expenses.len(), 1);
    assert_eq!(analysis.abnormal_expenses[0].amount, dec!(6500));
    assert_eq!(
        analysis.abnormal_expenses[0].description.as_deref(),
        Some("New laptop")
    );

    assert_eq!(analysis.trends.monthly_installments, dec!(175));
    assert_eq!(analysis.projected_annual_balance.round_dp(2), dec!(53500));
    assert_eq!(
        analysis.trends.income_growth_rate_pct.round_dp(2),
        dec!(-76.19)
    );

    assert_eq!(analysis.debt_risk.level, RiskLevel::Medium);
    assert_eq!(analysis.debt_risk.utilization_pct, dec!(60));
    assert_eq!(analysis.debt_risk.limit, dec!(8000));

    let progress: Vec<Decimal> = analysis
        .goals_progress
        .iter()
        .map(|g| g.progress_pct)
        .collect();
    assert_eq!(progress, vec![dec!(50), dec!(25)]);
}

#[test_log::test]
fn test_analyze_with_empty_window() {
    let config_file = write_config(
        r#"
currency: "USD"
ledger:
  transactions:
    - { amount: 500, type: income, date: 2020-01-05, categoryName: "Salary" }
"#,
    );

    let result = fintrack::run_command(
        fintrack::AppCommand::Analyze {
            as_of: Some(date(2024, 6, 30)),
            json: false,
        },
        Some(config_file.path().to_str().unwrap()),
    );
    assert!(result.is_ok(), "Analyze failed with: {:?}", result.err());

    let config = AppConfig::load_from_path(config_file.path()).unwrap();
    let snapshot =
        window::select_snapshot(&config.ledger, date(2024, 6, 30), &config.analysis).unwrap();
    assert!(snapshot.transactions.is_empty());

    let analysis =
        analytics::analyze(&snapshot, date(2024, 6, 30), &AnalysisOptions::default()).unwrap();
    assert_eq!(analysis.average_ticket, Decimal::ZERO);
    assert!(analysis.abnormal_expenses.is_empty());
}

#[test_log::test]
fn test_analyze_rejects_zero_run_rate_window() {
    let config_file = write_config(
        r#"
currency: "USD"
analysis:
  runRateMonths: 0
"#,
    );

    let err = fintrack::run_command(
        fintrack::AppCommand::Analyze {
            as_of: Some(date(2024, 6, 30)),
            json: true,
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .unwrap_err();
    assert!(err.to_string().contains("run_rate_months"));
}

#[test_log::test]
fn test_missing_config_file_fails() {
    let result = fintrack::run_command(
        fintrack::AppCommand::Monthly { as_of: None },
        Some("/nonexistent/fintrack/config.yaml"),
    );
    let err = result.unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}

#[test_log::test]
fn test_analyze_reports_amount_overflow() {
    let config_file = write_config(
        r#"
currency: "USD"
ledger:
  transactions:
    - { amount: "79228162514264337593543950335", type: expense, date: 2024-06-01, categoryName: "Electronics" }
    - { amount: "79228162514264337593543950335", type: expense, date: 2024-06-02, categoryName: "Electronics" }
"#,
    );
    let config_path = config_file.path().to_str().unwrap();

    let err = fintrack::run_command(
        fintrack::AppCommand::Analyze {
            as_of: Some(date(2024, 6, 30)),
            json: true,
        },
        Some(config_path),
    )
    .unwrap_err();
    info!(%err, "Analyze rejected");
    assert!(err.to_string().contains("overflow"));

    let err = fintrack::run_command(
        fintrack::AppCommand::Monthly {
            as_of: Some(date(2024, 6, 30)),
        },
        Some(config_path),
    )
    .unwrap_err();
    assert!(err.to_string().contains("overflow"));
}
