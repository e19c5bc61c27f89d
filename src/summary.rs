use crate::aggregator::find_aggregate_row;
use crate::error::Result;
use crate::schema::{LineItemRow, Period, Periodicity, RatioRow, Section};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Indicator {
    Green,
    Red,
}

/// Headline figures shown above the ratio table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SummaryItem {
    Figure {
        value: f64,
        label: String,
        currency: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        indicator: Option<Indicator>,
    },
    Separator {
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        color: Option<String>,
    },
}

impl SummaryItem {
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Figure { value, .. } => Some(*value),
            Self::Separator { .. } => None,
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Figure { label, .. } => Some(label),
            Self::Separator { .. } => None,
        }
    }
}

/// Total income, total expense and net profit over the reported periods.
pub fn build_report_summary(
    periods: &[Period],
    periodicity: Periodicity,
    income: &[LineItemRow],
    expense: &[LineItemRow],
    profit_loss: Option<&RatioRow>,
    currency: &str,
) -> Result<Vec<SummaryItem>> {
    let income_total = find_aggregate_row(Section::Income, income)?;
    let expense_total = find_aggregate_row(Section::Expense, expense)?;

    let mut net_income = 0.0;
    let mut net_expense = 0.0;
    let mut net_profit = 0.0;

    for period in periods {
        if let Some(row) = income_total {
            net_income += row.value(&period.key)?;
        }
        if let Some(row) = expense_total {
            net_expense += row.value(&period.key)?;
        }
        if let Some(row) = profit_loss {
            net_profit += row.value(&period.key)?;
        }
    }

    let single_year = periods.len() == 1 && periodicity.is_yearly();
    let (profit_label, income_label, expense_label) = if single_year {
        ("Profit This Year", "Total Income This Year", "Total Expense This Year")
    } else {
        ("Net Profit", "Total Income", "Total Expense")
    };

    let figure = |value: f64, label: &str, indicator: Option<Indicator>| SummaryItem::Figure {
        value,
        label: label.to_string(),
        currency: currency.to_string(),
        indicator,
    };

    let indicator = if net_profit > 0.0 {
        Indicator::Green
    } else {
        Indicator::Red
    };

    Ok(vec![
        figure(net_income, income_label, None),
        SummaryItem::Separator {
            value: "-".to_string(),
            color: None,
        },
        figure(net_expense, expense_label, None),
        SummaryItem::Separator {
            value: "=".to_string(),
            color: Some("blue".to_string()),
        },
        figure(net_profit, profit_label, Some(indicator)),
    ])
}
