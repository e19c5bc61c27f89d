use crate::error::{RatioReportError, Result};
use chrono::{Datelike, Days, Months, NaiveDate};

/// Rounds to a fixed number of decimal places, exact halves to even.
///
/// The scaled value is first cut to 8 decimals so float noise such as
/// `100.49999999999999` is treated as the midpoint it stands for.
pub fn round_to(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    let scaled = ((value * factor) * 1e8).round() / 1e8;
    let rounded = if (scaled - scaled.trunc()).abs() == 0.5 {
        scaled.round_ties_even() / factor
    } else {
        scaled.round() / factor
    };
    // avoid handing back -0.0 for tiny negatives
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Every ratio divides through this: a zero or sub-unit denominator becomes 1.
///
/// A true denominator of zero therefore yields `numerator / 1`, which can look
/// like a small but valid ratio. Callers never see a division fault or a
/// non-finite value.
pub fn clamp_denominator(denominator: f64) -> f64 {
    denominator.max(1.0)
}

/// `numerator / max(denominator, 1)` rounded to two places.
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    round_to(numerator / clamp_denominator(denominator), 2)
}

pub fn last_day_of_month(year: i32, month: u32) -> Result<NaiveDate> {
    let next_month = if month == 12 { 1 } else { month + 1 };
    let next_year = if month == 12 { year + 1 } else { year };

    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.checked_sub_days(Days::new(1)))
        .ok_or_else(|| {
            RatioReportError::DateError(format!("Invalid year/month: {}-{:02}", year, month))
        })
}

pub fn first_day_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn add_months(date: NaiveDate, months: u32) -> Result<NaiveDate> {
    date.checked_add_months(Months::new(months)).ok_or_else(|| {
        RatioReportError::DateError(format!("Cannot add {} months to {}", months, date))
    })
}

/// Period key for a bucket ending in the given month, e.g. `jan_2024`.
pub fn period_key_for(date: NaiveDate) -> String {
    date.format("%b_%Y").to_string().to_lowercase()
}

pub fn month_label(date: NaiveDate) -> String {
    date.format("%b %Y").to_string()
}
