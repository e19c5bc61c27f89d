use chrono::NaiveDate;
use financial_ratios::{
    execute, FiscalYear, InMemoryLedger, LineItemRow, Periodicity, RatioConfig, ReportFilters,
    Section,
};

const QUARTERS: [&str; 4] = ["mar_2024", "jun_2024", "sep_2024", "dec_2024"];

fn quarterly_row(account: &str, values: [f64; 4]) -> LineItemRow {
    let mut row = LineItemRow::new(account, account).with_total(values.iter().sum());
    for (key, value) in QUARTERS.iter().zip(values) {
        row = row.with_value(*key, value);
    }
    row
}

fn section_with_total(section: Section, lines: Vec<LineItemRow>) -> Vec<LineItemRow> {
    let marker = section.total_row_marker();
    let mut total = LineItemRow::new(marker.clone(), marker).with_total(0.0);

    for key in QUARTERS {
        let sum: f64 = lines.iter().filter_map(|r| r.get(key)).sum();
        total = total.with_value(key, sum);
    }
    total.total = Some(lines.iter().map(LineItemRow::total_or_zero).sum());

    let mut rows = lines;
    rows.push(total);
    rows.push(LineItemRow::default());
    rows
}

fn main() {
    let ledger = InMemoryLedger::new("NGN")
        .with_fiscal_year(FiscalYear {
            name: "2024".to_string(),
            year_start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            year_end_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        })
        .with_section(
            Section::Income,
            section_with_total(
                Section::Income,
                vec![
                    quarterly_row("4100 - Sales", [120_000.0, 135_000.0, 150_000.0, 210_000.0]),
                    quarterly_row("4900 - Other Income", [2_000.0, 1_500.0, 1_800.0, 2_200.0]),
                ],
            ),
        )
        .with_section(
            Section::Expense,
            section_with_total(
                Section::Expense,
                vec![
                    quarterly_row("5100 - Cost of Sales", [70_000.0, 78_000.0, 86_000.0, 120_000.0]),
                    quarterly_row("6100 - Salaries", [30_000.0, 30_000.0, 32_000.0, 32_000.0]),
                ],
            ),
        )
        .with_section(
            Section::Asset,
            section_with_total(
                Section::Asset,
                vec![
                    quarterly_row("1100 - Current Assets", [90_000.0, 12_000.0, 15_000.0, 20_000.0]),
                    quarterly_row("1500 - Fixed Assets", [250_000.0, 0.0, 0.0, 40_000.0]),
                ],
            ),
        )
        .with_section(
            Section::Liability,
            section_with_total(
                Section::Liability,
                vec![quarterly_row(
                    "2100 - Current Liabilities",
                    [45_000.0, 5_000.0, -2_000.0, 8_000.0],
                )],
            ),
        )
        .with_section(
            Section::Equity,
            section_with_total(
                Section::Equity,
                vec![quarterly_row("3100 - Share Capital", [200_000.0, 0.0, 0.0, 0.0])],
            ),
        );

    let config = RatioConfig {
        sales_accounts: vec!["4100 - Sales".to_string()],
        current_asset_account: Some("1100 - Current Assets".to_string()),
        current_liability_account: Some("2100 - Current Liabilities".to_string()),
    };

    let filters = ReportFilters {
        from_fiscal_year: Some("2024".to_string()),
        to_fiscal_year: Some("2024".to_string()),
        periodicity: Periodicity::Quarterly,
        company: Some("Demo Trading Ltd".to_string()),
        ..Default::default()
    };

    let report = execute(&filters, &ledger, &config).expect("ratio report should build");

    println!("{}", report.to_markdown());
    println!("{}", report.to_csv());
}
