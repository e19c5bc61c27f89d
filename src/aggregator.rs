use crate::error::{RatioReportError, Result};
use crate::schema::{LineItemRow, Period, RatioRow, Section};
use crate::utils::round_to;
use log::{debug, warn};

pub const PROFIT_FOR_THE_YEAR: &str = "'Profit for the year'";

/// Locates a section's grand-total row.
///
/// Prefers the row whose account is the section's total marker. Producers that
/// do not label the row are expected to place it second to last, so that
/// position is used as a fallback. An empty section has no aggregate.
pub fn find_aggregate_row(section: Section, rows: &[LineItemRow]) -> Result<Option<&LineItemRow>> {
    if rows.is_empty() {
        return Ok(None);
    }

    let marker = section.total_row_marker();
    if let Some(row) = rows.iter().find(|r| r.account == marker) {
        debug!("Found {} aggregate row by name", section);
        return Ok(Some(row));
    }

    if rows.len() >= 2 {
        warn!(
            "No row named {} in {} section; using the row at index {}",
            marker,
            section,
            rows.len() - 2
        );
        return Ok(Some(&rows[rows.len() - 2]));
    }

    Err(RatioReportError::AggregateRowNotFound {
        section: section.to_string(),
        rows: rows.len(),
    })
}

/// Net profit or loss per period: income aggregate minus expense aggregate.
///
/// A missing section contributes zero. The running `total` is the sum of the
/// per-period results. Returns `None` when every period nets to exactly zero.
pub fn derive_profit_loss(
    income: &[LineItemRow],
    expense: &[LineItemRow],
    periods: &[Period],
    currency: &str,
) -> Result<Option<RatioRow>> {
    let income_total = find_aggregate_row(Section::Income, income)?;
    let expense_total = find_aggregate_row(Section::Expense, expense)?;

    let mut row = RatioRow::new(PROFIT_FOR_THE_YEAR, PROFIT_FOR_THE_YEAR, currency);
    let mut total = 0.0;
    let mut has_value = false;

    for period in periods {
        let total_income = match income_total {
            Some(r) => round_to(r.value(&period.key)?, 3),
            None => 0.0,
        };
        let total_expense = match expense_total {
            Some(r) => round_to(r.value(&period.key)?, 3),
            None => 0.0,
        };

        let profit = total_income - total_expense;
        if profit != 0.0 {
            has_value = true;
        }

        total += profit;
        row.values.insert(period.key.clone(), profit);
    }

    if !has_value {
        debug!("No profit or loss across {} periods", periods.len());
        return Ok(None);
    }

    row.total = Some(total);
    Ok(Some(row))
}
