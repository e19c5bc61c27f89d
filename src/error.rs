use thiserror::Error;

#[derive(Error, Debug)]
pub enum RatioReportError {
    #[error("Row '{account}' has no value for period '{period}'")]
    MissingPeriodValue { account: String, period: String },

    #[error("Could not locate the aggregate row for section {section} ({rows} rows supplied)")]
    AggregateRowNotFound { section: String, rows: usize },

    #[error("Invalid period range: start {start} is after end {end}")]
    InvalidPeriodRange { start: String, end: String },

    #[error("Unknown fiscal year: {0}")]
    UnknownFiscalYear(String),

    #[error("Required filter missing: {0}")]
    MissingFilter(&'static str),

    #[error("No default currency configured for company: {0}")]
    MissingDefaultCurrency(String),

    #[error("Date calculation error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RatioReportError>;
