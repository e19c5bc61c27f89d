use crate::error::{RatioReportError, Result};
use crate::periods::{build_period_list, resolve_reporting_window};
use crate::schema::{FiscalYear, LineItemRow, Period, ReportFilters, Section};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// The ledger-side collaborators the report depends on.
///
/// Implementations own period enumeration, section balances and company
/// defaults. `section_rows` must put the section's grand-total row either under
/// the account `Section::total_row_marker()` or at index `len - 2`.
pub trait LedgerSource {
    fn period_list(&self, filters: &ReportFilters) -> Result<Vec<Period>>;

    fn section_rows(
        &self,
        company: Option<&str>,
        section: Section,
        periods: &[Period],
        filters: &ReportFilters,
    ) -> Result<Vec<LineItemRow>>;

    fn default_currency(&self, company: Option<&str>) -> Result<String>;
}

/// A ledger snapshot held in memory, typically loaded from a JSON fixture.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemoryLedger {
    #[serde(default)]
    pub default_currency: String,

    #[serde(default)]
    pub company_currencies: BTreeMap<String, String>,

    #[serde(default)]
    pub fiscal_years: Vec<FiscalYear>,

    /// Fixed period list; when absent periods are enumerated from the filters.
    #[serde(default)]
    pub periods: Option<Vec<Period>>,

    #[serde(default)]
    pub sections: BTreeMap<Section, Vec<LineItemRow>>,
}

impl InMemoryLedger {
    pub fn new(default_currency: impl Into<String>) -> Self {
        Self {
            default_currency: default_currency.into(),
            ..Default::default()
        }
    }

    pub fn with_periods(mut self, periods: Vec<Period>) -> Self {
        self.periods = Some(periods);
        self
    }

    pub fn with_fiscal_year(mut self, fiscal_year: FiscalYear) -> Self {
        self.fiscal_years.push(fiscal_year);
        self
    }

    pub fn with_section(mut self, section: Section, rows: Vec<LineItemRow>) -> Self {
        self.sections.insert(section, rows);
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl LedgerSource for InMemoryLedger {
    fn period_list(&self, filters: &ReportFilters) -> Result<Vec<Period>> {
        if let Some(periods) = &self.periods {
            return Ok(periods.clone());
        }

        let (start, end) = resolve_reporting_window(filters, &self.fiscal_years)?;
        build_period_list(start, end, filters.periodicity, &self.fiscal_years)
    }

    fn section_rows(
        &self,
        _company: Option<&str>,
        section: Section,
        _periods: &[Period],
        _filters: &ReportFilters,
    ) -> Result<Vec<LineItemRow>> {
        Ok(self.sections.get(&section).cloned().unwrap_or_default())
    }

    fn default_currency(&self, company: Option<&str>) -> Result<String> {
        let currency = company
            .and_then(|c| self.company_currencies.get(c))
            .unwrap_or(&self.default_currency);

        if currency.is_empty() {
            return Err(RatioReportError::MissingDefaultCurrency(
                company.unwrap_or("<none>").to_string(),
            ));
        }

        Ok(currency.clone())
    }
}
