use crate::aggregator::derive_profit_loss;
use crate::columns::{build_columns, ColumnDescriptor};
use crate::error::Result;
use crate::ratios::RatioEngine;
use crate::schema::{LineItemRow, Period, Periodicity, RatioConfig, RatioRow, ReportFilters, Section};
use crate::source::LedgerSource;
use crate::summary::{build_report_summary, SummaryItem};
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Section rows for one request, as handed over by the ledger.
#[derive(Debug, Clone, Default)]
pub struct SectionData {
    pub income: Vec<LineItemRow>,
    pub expense: Vec<LineItemRow>,
    pub assets: Vec<LineItemRow>,
    pub liabilities: Vec<LineItemRow>,
    pub equity: Vec<LineItemRow>,
}

impl SectionData {
    pub fn fetch<S: LedgerSource + ?Sized>(
        source: &S,
        company: Option<&str>,
        periods: &[Period],
        filters: &ReportFilters,
    ) -> Result<Self> {
        let mut data = Self::default();

        for section in Section::ALL {
            let rows = source.section_rows(company, section, periods, filters)?;
            debug!("Fetched {} {} rows", rows.len(), section);
            *data.rows_mut(section) = rows;
        }

        Ok(data)
    }

    fn rows_mut(&mut self, section: Section) -> &mut Vec<LineItemRow> {
        match section {
            Section::Income => &mut self.income,
            Section::Expense => &mut self.expense,
            Section::Asset => &mut self.assets,
            Section::Liability => &mut self.liabilities,
            Section::Equity => &mut self.equity,
        }
    }
}

pub struct ReportAssembler<'a> {
    config: &'a RatioConfig,
    accumulated_values: bool,
    company: Option<&'a str>,
    currency: &'a str,
}

impl<'a> ReportAssembler<'a> {
    pub fn new(
        config: &'a RatioConfig,
        accumulated_values: bool,
        company: Option<&'a str>,
        currency: &'a str,
    ) -> Self {
        Self {
            config,
            accumulated_values,
            company,
            currency,
        }
    }

    /// Column schema plus the ratio rows, always in the order net profit margin,
    /// return on assets, return on equity, current ratio.
    pub fn assemble(
        &self,
        periods: &[Period],
        periodicity: Periodicity,
        sections: &SectionData,
        profit_loss: Option<&RatioRow>,
    ) -> Result<(Vec<ColumnDescriptor>, Vec<RatioRow>)> {
        let engine = RatioEngine::new(self.config, periods, self.currency);

        let mut rows = Vec::with_capacity(4);
        rows.push(engine.net_profit_margin(&sections.income, &sections.expense, profit_loss)?);
        rows.push(engine.return_on_assets(&sections.assets, profit_loss)?);
        rows.push(engine.return_on_equity(&sections.equity, profit_loss)?);
        rows.push(engine.current_ratio(&sections.assets, &sections.liabilities)?);

        let columns = build_columns(periodicity, periods, self.accumulated_values, self.company);

        Ok((columns, rows))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatioReport {
    pub columns: Vec<ColumnDescriptor>,
    pub rows: Vec<RatioRow>,
    pub summary: Vec<SummaryItem>,
    pub currency: String,
}

/// Builds the ratio report for one request.
pub fn execute<S: LedgerSource + ?Sized>(
    filters: &ReportFilters,
    source: &S,
    config: &RatioConfig,
) -> Result<RatioReport> {
    let company = filters.company.as_deref();
    let periods = source.period_list(filters)?;

    info!(
        "Computing financial ratios for {} ({:?}, {} periods, accumulated={})",
        company.unwrap_or("<all companies>"),
        filters.periodicity,
        periods.len(),
        filters.accumulated_values
    );

    let sections = SectionData::fetch(source, company, &periods, filters)?;

    let currency = match &filters.presentation_currency {
        Some(currency) => currency.clone(),
        None => source.default_currency(company)?,
    };

    let profit_loss = derive_profit_loss(&sections.income, &sections.expense, &periods, &currency)?;

    let assembler = ReportAssembler::new(config, filters.accumulated_values, company, &currency);
    let (columns, rows) =
        assembler.assemble(&periods, filters.periodicity, &sections, profit_loss.as_ref())?;

    let summary = build_report_summary(
        &periods,
        filters.periodicity,
        &sections.income,
        &sections.expense,
        profit_loss.as_ref(),
        &currency,
    )?;

    Ok(RatioReport {
        columns,
        rows,
        summary,
        currency,
    })
}

impl RatioReport {
    pub fn row(&self, account_name: &str) -> Option<&RatioRow> {
        self.rows.iter().find(|r| r.account_name == account_name)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn visible_columns(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.iter().filter(|c| !c.hidden)
    }

    pub fn to_csv(&self) -> String {
        let mut output = String::new();

        let header: Vec<String> = self.visible_columns().map(|c| csv_field(&c.label)).collect();
        output.push_str(&header.join(","));
        output.push('\n');

        for row in &self.rows {
            let cells: Vec<String> = self
                .visible_columns()
                .map(|c| csv_field(&cell_text(row, &c.fieldname)))
                .collect();
            output.push_str(&cells.join(","));
            output.push('\n');
        }

        output
    }

    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str("# Financial Ratios\n\n");
        output.push_str(&format!("**Currency:** {}\n\n", self.currency));

        let labels: Vec<&str> = self.visible_columns().map(|c| c.label.as_str()).collect();
        output.push_str(&format!("| {} |\n", labels.join(" | ")));
        output.push_str(&format!("|{}\n", "---|".repeat(labels.len())));

        for row in &self.rows {
            let cells: Vec<String> = self
                .visible_columns()
                .map(|c| cell_text(row, &c.fieldname))
                .collect();
            output.push_str(&format!("| {} |\n", cells.join(" | ")));
        }

        if !self.summary.is_empty() {
            output.push_str("\n## Summary\n\n");
            for item in &self.summary {
                if let (Some(label), Some(value)) = (item.label(), item.value()) {
                    output.push_str(&format!("- {}: {:.2} {}\n", label, value, self.currency));
                }
            }
        }

        output
    }
}

fn cell_text(row: &RatioRow, fieldname: &str) -> String {
    let value = match fieldname {
        "account" => return row.account_name.clone(),
        "currency" => return row.currency.clone(),
        "total" => row.total,
        key => row.get(key),
    };

    value.map(|v| format!("{:.2}", v)).unwrap_or_default()
}

fn csv_field(text: &str) -> String {
    if text.contains(',') || text.contains('"') || text.contains('\n') {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text.to_string()
    }
}
