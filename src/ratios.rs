//! The four financial ratios, each computed per period plus an overall total.
//!
//! All divisions go through [`safe_ratio`], so a zero denominator yields the
//! numerator divided by one. Results are rounded to two places; intermediate
//! sums are not.

use crate::aggregator::find_aggregate_row;
use crate::error::Result;
use crate::schema::{LineItemRow, Period, RatioConfig, RatioRow, Section};
use crate::utils::safe_ratio;
use log::{debug, warn};
use std::collections::BTreeMap;

pub const NET_PROFIT_MARGIN: &str = "Net Profit Margin";
pub const RETURN_ON_ASSETS: &str = "Return on Assets";
pub const RETURN_ON_EQUITY: &str = "Return on Equity";
pub const CURRENT_RATIO: &str = "Current Ratio";

pub struct RatioEngine<'a> {
    config: &'a RatioConfig,
    periods: &'a [Period],
    currency: &'a str,
}

impl<'a> RatioEngine<'a> {
    pub fn new(config: &'a RatioConfig, periods: &'a [Period], currency: &'a str) -> Self {
        Self {
            config,
            periods,
            currency,
        }
    }

    /// Profit for the year over total sales.
    ///
    /// Sales rows are picked from the income and expense sections by account.
    /// Per period, a later sales row replaces the value of an earlier one, while
    /// the `total` is summed across every sales row.
    pub fn net_profit_margin(
        &self,
        income: &[LineItemRow],
        expense: &[LineItemRow],
        profit_loss: Option<&RatioRow>,
    ) -> Result<RatioRow> {
        let mut row = RatioRow::synthetic(NET_PROFIT_MARGIN, self.currency);

        let mut sales: BTreeMap<&str, f64> = BTreeMap::new();
        let mut sales_total = 0.0;
        let mut matched = 0;

        for item in income
            .iter()
            .chain(expense.iter())
            .filter(|r| self.config.is_sales_account(&r.account))
        {
            for period in self.periods {
                sales.insert(period.key.as_str(), item.value(&period.key)?);
            }
            sales_total += item.total_or_zero();
            matched += 1;
        }

        debug!("Net profit margin uses {} sales rows", matched);

        for period in self.periods {
            let net_income = net_income_for(profit_loss, &period.key)?;
            let total_sales = sales.get(period.key.as_str()).copied().unwrap_or(0.0);
            row.values
                .insert(period.key.clone(), safe_ratio(net_income, total_sales));
        }

        row.total = Some(safe_ratio(net_income_total(profit_loss), sales_total));
        Ok(row)
    }

    pub fn return_on_assets(
        &self,
        assets: &[LineItemRow],
        profit_loss: Option<&RatioRow>,
    ) -> Result<RatioRow> {
        self.return_on(Section::Asset, RETURN_ON_ASSETS, assets, profit_loss)
    }

    pub fn return_on_equity(
        &self,
        equity: &[LineItemRow],
        profit_loss: Option<&RatioRow>,
    ) -> Result<RatioRow> {
        self.return_on(Section::Equity, RETURN_ON_EQUITY, equity, profit_loss)
    }

    /// Net income of each period over the section aggregate accumulated through
    /// that period. The total is grand-total profit over the aggregate's total.
    fn return_on(
        &self,
        section: Section,
        name: &str,
        rows: &[LineItemRow],
        profit_loss: Option<&RatioRow>,
    ) -> Result<RatioRow> {
        let aggregate = find_aggregate_row(section, rows)?;
        let mut row = RatioRow::synthetic(name, self.currency);
        let mut cumulative = 0.0;

        for period in self.periods {
            if let Some(agg) = aggregate {
                cumulative += agg.value(&period.key)?;
            }
            let net_income = net_income_for(profit_loss, &period.key)?;
            row.values
                .insert(period.key.clone(), safe_ratio(net_income, cumulative));
        }

        let denominator = aggregate.map(LineItemRow::total_or_zero).unwrap_or(0.0);
        row.total = Some(safe_ratio(net_income_total(profit_loss), denominator));
        Ok(row)
    }

    /// Designated current asset row over designated current liability row, both
    /// accumulated across periods. If either account is not configured or not
    /// present, the row comes back with no values at all.
    pub fn current_ratio(
        &self,
        assets: &[LineItemRow],
        liabilities: &[LineItemRow],
    ) -> Result<RatioRow> {
        let mut row = RatioRow::synthetic(CURRENT_RATIO, self.currency);

        let current_assets = find_configured(self.config.current_asset_account.as_deref(), assets);
        let current_liabilities =
            find_configured(self.config.current_liability_account.as_deref(), liabilities);

        let (ca, cl) = match (current_assets, current_liabilities) {
            (Some(ca), Some(cl)) => (ca, cl),
            _ => {
                warn!(
                    "Current ratio left empty: current asset account {:?} found={}, current liability account {:?} found={}",
                    self.config.current_asset_account,
                    current_assets.is_some(),
                    self.config.current_liability_account,
                    current_liabilities.is_some()
                );
                return Ok(row);
            }
        };

        let mut cumulative_assets = 0.0;
        let mut cumulative_liabilities = 0.0;

        for period in self.periods {
            cumulative_assets += ca.value(&period.key)?;
            cumulative_liabilities += cl.value(&period.key)?;
            row.values.insert(
                period.key.clone(),
                safe_ratio(cumulative_assets, cumulative_liabilities),
            );
        }

        row.total = Some(safe_ratio(ca.total_or_zero(), cl.total_or_zero()));
        Ok(row)
    }
}

fn find_configured<'r>(account: Option<&str>, rows: &'r [LineItemRow]) -> Option<&'r LineItemRow> {
    let account = account?;
    rows.iter().find(|r| r.account == account)
}

fn net_income_for(profit_loss: Option<&RatioRow>, period_key: &str) -> Result<f64> {
    match profit_loss {
        Some(row) => row.value(period_key),
        None => Ok(0.0),
    }
}

fn net_income_total(profit_loss: Option<&RatioRow>) -> f64 {
    profit_loss.and_then(|r| r.total).unwrap_or(0.0)
}
