use crate::error::{RatioReportError, Result};
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, JsonSchema)]
pub enum Periodicity {
    #[schemars(description = "One column per calendar month")]
    Monthly,

    #[schemars(description = "One column per three-month bucket")]
    Quarterly,

    #[serde(rename = "Half-Yearly")]
    #[schemars(description = "One column per six-month bucket")]
    HalfYearly,

    #[schemars(description = "One column per fiscal year. Never carries a trailing aggregate column.")]
    Yearly,
}

impl Periodicity {
    pub fn months(self) -> u32 {
        match self {
            Self::Monthly => 1,
            Self::Quarterly => 3,
            Self::HalfYearly => 6,
            Self::Yearly => 12,
        }
    }

    pub fn is_yearly(self) -> bool {
        self == Self::Yearly
    }
}

impl Default for Periodicity {
    fn default() -> Self {
        Self::Monthly
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, JsonSchema)]
pub enum BalanceSide {
    Debit,
    Credit,
}

impl fmt::Display for BalanceSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Debit => write!(f, "Debit"),
            Self::Credit => write!(f, "Credit"),
        }
    }
}

/// One of the five financial statement sections a ledger reports on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, JsonSchema)]
pub enum Section {
    Income,
    Expense,
    Asset,
    Liability,
    Equity,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::Income,
        Section::Expense,
        Section::Asset,
        Section::Liability,
        Section::Equity,
    ];

    /// The side on which the section's balances are naturally reported.
    pub fn balance_side(self) -> BalanceSide {
        match self {
            Self::Income | Self::Liability | Self::Equity => BalanceSide::Credit,
            Self::Expense | Self::Asset => BalanceSide::Debit,
        }
    }

    /// Account identifier of the synthesized grand-total row, e.g. `'Total Asset (Debit)'`.
    pub fn total_row_marker(self) -> String {
        format!("'Total {} ({})'", self, self.balance_side())
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Income => "Income",
            Self::Expense => "Expense",
            Self::Asset => "Asset",
            Self::Liability => "Liability",
            Self::Equity => "Equity",
        };
        write!(f, "{}", name)
    }
}

/// A reporting bucket. `key` indexes into row data, `label` is what the renderer shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Period {
    pub key: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_start_date: Option<NaiveDate>,
}

impl Period {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            from_date: None,
            to_date: None,
            year_start_date: None,
        }
    }
}

/// A line of section data as produced by the ledger: one balance per period key.
///
/// Any numeric field that is not one of the named fields is read as a period
/// balance, which mirrors the flat row layout ledgers emit. Text, boolean and
/// null fields (`parent_account`, `has_value`, `currency`, ...) and the
/// numeric row metadata in [`ROW_METADATA_FIELDS`] are skipped.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LineItemRow {
    #[serde(default)]
    pub account: String,
    #[serde(default)]
    pub account_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
    #[serde(flatten, deserialize_with = "period_balances")]
    pub values: BTreeMap<String, f64>,
}

/// Numeric fields ledgers attach to a row that are not period balances.
pub const ROW_METADATA_FIELDS: &[&str] = &["indent", "is_group", "include_in_gross"];

fn period_balances<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<String, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;

    Ok(raw
        .into_iter()
        .filter(|(key, _)| !ROW_METADATA_FIELDS.contains(&key.as_str()))
        .filter_map(|(key, value)| value.as_f64().map(|balance| (key, balance)))
        .collect())
}

impl LineItemRow {
    pub fn new(account: impl Into<String>, account_name: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            account_name: account_name.into(),
            ..Default::default()
        }
    }

    pub fn with_value(mut self, period_key: impl Into<String>, value: f64) -> Self {
        self.values.insert(period_key.into(), value);
        self
    }

    pub fn with_total(mut self, total: f64) -> Self {
        self.total = Some(total);
        self
    }

    pub fn get(&self, period_key: &str) -> Option<f64> {
        self.values.get(period_key).copied()
    }

    /// Balance for a period, failing when the producer left the key out.
    pub fn value(&self, period_key: &str) -> Result<f64> {
        self.get(period_key)
            .ok_or_else(|| RatioReportError::MissingPeriodValue {
                account: self.display_account().to_string(),
                period: period_key.to_string(),
            })
    }

    pub fn total_or_zero(&self) -> f64 {
        self.total.unwrap_or(0.0)
    }

    fn display_account(&self) -> &str {
        if self.account.is_empty() {
            &self.account_name
        } else {
            &self.account
        }
    }
}

/// The output unit of the report: one named figure per period plus an overall total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioRow {
    pub account: String,
    pub account_name: String,
    #[serde(flatten)]
    pub values: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
    pub currency: String,
    pub warn_if_negative: bool,
}

impl RatioRow {
    pub fn new(
        account: impl Into<String>,
        account_name: impl Into<String>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            account: account.into(),
            account_name: account_name.into(),
            values: BTreeMap::new(),
            total: None,
            currency: currency.into(),
            warn_if_negative: true,
        }
    }

    /// A computed row whose account identifier is the quoted display name.
    pub fn synthetic(account_name: &str, currency: impl Into<String>) -> Self {
        Self::new(format!("'{}'", account_name), account_name, currency)
    }

    pub fn get(&self, period_key: &str) -> Option<f64> {
        self.values.get(period_key).copied()
    }

    pub fn value(&self, period_key: &str) -> Result<f64> {
        self.get(period_key)
            .ok_or_else(|| RatioReportError::MissingPeriodValue {
                account: self.account.clone(),
                period: period_key.to_string(),
            })
    }

    pub fn has_values(&self) -> bool {
        !self.values.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub enum FilterBasedOn {
    #[serde(rename = "Fiscal Year")]
    #[schemars(description = "Resolve the reporting window from the from/to fiscal year names")]
    FiscalYear,

    #[serde(rename = "Date Range")]
    #[schemars(description = "Use period_start_date and period_end_date directly")]
    DateRange,
}

impl Default for FilterBasedOn {
    fn default() -> Self {
        Self::FiscalYear
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FiscalYear {
    #[schemars(description = "Fiscal year name as referenced by the report filters, e.g. '2024' or '2023-2024'")]
    pub name: String,
    pub year_start_date: NaiveDate,
    pub year_end_date: NaiveDate,
}

/// The request a report renderer hands to `execute`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ReportFilters {
    #[serde(default)]
    #[schemars(description = "First fiscal year of the reporting window (Fiscal Year mode)")]
    pub from_fiscal_year: Option<String>,

    #[serde(default)]
    #[schemars(description = "Last fiscal year of the reporting window (Fiscal Year mode)")]
    pub to_fiscal_year: Option<String>,

    #[serde(default)]
    #[schemars(description = "Start of the reporting window (Date Range mode), YYYY-MM-DD")]
    pub period_start_date: Option<NaiveDate>,

    #[serde(default)]
    #[schemars(description = "End of the reporting window (Date Range mode), YYYY-MM-DD")]
    pub period_end_date: Option<NaiveDate>,

    #[serde(default)]
    pub filter_based_on: FilterBasedOn,

    #[serde(default)]
    pub periodicity: Periodicity,

    #[serde(default)]
    #[schemars(description = "If true, section balances are cumulative year-to-date rather than period-only")]
    pub accumulated_values: bool,

    #[serde(default)]
    #[schemars(description = "Reporting entity. Adds a hidden currency column and drives the default currency.")]
    pub company: Option<String>,

    #[serde(default)]
    #[schemars(description = "Currency label carried on every output row. No conversion is performed.")]
    pub presentation_currency: Option<String>,
}

impl ReportFilters {
    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(ReportFilters)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}

/// Account classification consumed by the ratio engine. Read-only for a computation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct RatioConfig {
    #[serde(default)]
    #[schemars(description = "Account identifiers whose rows count as sales for the net profit margin")]
    pub sales_accounts: Vec<String>,

    #[serde(default)]
    #[schemars(description = "Account identifier of the designated current asset row")]
    pub current_asset_account: Option<String>,

    #[serde(default)]
    #[schemars(description = "Account identifier of the designated current liability row")]
    pub current_liability_account: Option<String>,
}

impl RatioConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn is_sales_account(&self, account: &str) -> bool {
        !account.is_empty() && self.sales_accounts.iter().any(|a| a == account)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&schemars::schema_for!(RatioConfig))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_row_markers() {
        assert_eq!(Section::Income.total_row_marker(), "'Total Income (Credit)'");
        assert_eq!(Section::Expense.total_row_marker(), "'Total Expense (Debit)'");
        assert_eq!(Section::Asset.total_row_marker(), "'Total Asset (Debit)'");
        assert_eq!(Section::Liability.total_row_marker(), "'Total Liability (Credit)'");
        assert_eq!(Section::Equity.total_row_marker(), "'Total Equity (Credit)'");
    }

    #[test]
    fn test_line_item_row_flattened_json() {
        let json = r#"{
            "account": "4100 - Sales",
            "account_name": "Sales",
            "total": 2200.0,
            "jan_2024": 1000.0,
            "feb_2024": 1200.0
        }"#;

        let row: LineItemRow = serde_json::from_str(json).unwrap();
        assert_eq!(row.account, "4100 - Sales");
        assert_eq!(row.total, Some(2200.0));
        assert_eq!(row.get("jan_2024"), Some(1000.0));
        assert_eq!(row.values.len(), 2);

        let back = serde_json::to_value(&row).unwrap();
        assert_eq!(back["feb_2024"], 1200.0);
    }

    #[test]
    fn test_line_item_row_skips_non_balance_fields() {
        let json = r#"{
            "account": "4100 - Sales",
            "account_name": "Sales",
            "parent_account": "4000 - Income",
            "currency": "NGN",
            "has_value": true,
            "include_in_gross": 1,
            "indent": 1.0,
            "opening_balance": null,
            "jan_2024": 10.0,
            "feb_2024": 12.5,
            "total": 22.5
        }"#;

        let row: LineItemRow = serde_json::from_str(json).unwrap();
        assert_eq!(row.account_name, "Sales");
        assert_eq!(row.total, Some(22.5));
        assert_eq!(
            row.values.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["feb_2024", "jan_2024"]
        );
        assert_eq!(row.value("feb_2024").unwrap(), 12.5);
    }

    #[test]
    fn test_missing_period_value_is_an_error() {
        let row = LineItemRow::new("Cash", "Cash").with_value("jan_2024", 10.0);
        assert!(row.value("jan_2024").is_ok());

        match row.value("feb_2024") {
            Err(RatioReportError::MissingPeriodValue { account, period }) => {
                assert_eq!(account, "Cash");
                assert_eq!(period, "feb_2024");
            }
            other => panic!("expected MissingPeriodValue, got {:?}", other),
        }
    }

    #[test]
    fn test_filters_deserialize_with_defaults() {
        let json = r#"{
            "filter_based_on": "Date Range",
            "period_start_date": "2024-01-01",
            "period_end_date": "2024-06-30",
            "periodicity": "Half-Yearly",
            "company": "ACME"
        }"#;

        let filters: ReportFilters = serde_json::from_str(json).unwrap();
        assert_eq!(filters.filter_based_on, FilterBasedOn::DateRange);
        assert_eq!(filters.periodicity, Periodicity::HalfYearly);
        assert!(!filters.accumulated_values);
        assert!(filters.presentation_currency.is_none());
    }

    #[test]
    fn test_schema_generation() {
        let schema_json = ReportFilters::schema_as_json().unwrap();
        assert!(schema_json.contains("periodicity"));
        assert!(schema_json.contains("accumulated_values"));

        let config_schema = RatioConfig::schema_as_json().unwrap();
        assert!(config_schema.contains("sales_accounts"));
    }

    #[test]
    fn test_sales_account_matching_ignores_blank_accounts() {
        let config = RatioConfig {
            sales_accounts: vec!["Sales".to_string()],
            ..Default::default()
        };
        assert!(config.is_sales_account("Sales"));
        assert!(!config.is_sales_account(""));
        assert!(!config.is_sales_account("Service Revenue"));
    }
}
