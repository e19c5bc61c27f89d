//! # Financial Ratios
//!
//! Derives period-by-period financial ratios from the section totals a general
//! ledger produces, ready for tabular presentation.
//!
//! ## Core Concepts
//!
//! - **Periods**: ordered reporting buckets (month, quarter, half-year, year), each with a key and a label
//! - **Sections**: Income, Expense, Asset, Liability and Equity rows, one balance per period key
//! - **Aggregate Rows**: a section's grand-total row, found by its `'Total <Section> (<Side>)'` account
//! - **Profit for the Year**: income aggregate minus expense aggregate, per period
//! - **Ratios**: net profit margin, return on assets, return on equity, current ratio
//!
//! Every division clamps its denominator to at least 1, so a report never
//! faults on empty or zero balances.
//!
//! ## Example
//!
//! ```rust,ignore
//! use financial_ratios::*;
//!
//! let ledger = InMemoryLedger::from_file("ledger.json")?;
//! let config = RatioConfig {
//!     sales_accounts: vec!["4100 - Sales".to_string()],
//!     current_asset_account: Some("1100 - Current Assets".to_string()),
//!     current_liability_account: Some("2100 - Current Liabilities".to_string()),
//! };
//! let filters = ReportFilters {
//!     from_fiscal_year: Some("2024".to_string()),
//!     periodicity: Periodicity::Quarterly,
//!     company: Some("ACME Ltd".to_string()),
//!     ..Default::default()
//! };
//!
//! let report = execute(&filters, &ledger, &config)?;
//! println!("{}", report.to_markdown());
//! ```

pub mod aggregator;
pub mod columns;
pub mod error;
pub mod periods;
pub mod ratios;
pub mod report;
pub mod schema;
pub mod source;
pub mod summary;
pub mod utils;

pub use aggregator::{derive_profit_loss, find_aggregate_row, PROFIT_FOR_THE_YEAR};
pub use columns::{build_columns, ColumnDescriptor, FieldType};
pub use error::{RatioReportError, Result};
pub use periods::{build_period_list, resolve_reporting_window};
pub use ratios::{RatioEngine, CURRENT_RATIO, NET_PROFIT_MARGIN, RETURN_ON_ASSETS, RETURN_ON_EQUITY};
pub use report::{execute, RatioReport, ReportAssembler, SectionData};
pub use schema::*;
pub use source::{InMemoryLedger, LedgerSource};
pub use summary::{build_report_summary, Indicator, SummaryItem};
pub use utils::{clamp_denominator, round_to, safe_ratio};
