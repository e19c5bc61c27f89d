//! Period enumeration for callers that do not have their own fiscal calendar.
//!
//! The ratio engine only ever sees the resulting `Period` list; nothing here is
//! required for computing ratios over periods supplied from elsewhere.

use crate::error::{RatioReportError, Result};
use crate::schema::{FilterBasedOn, FiscalYear, Period, Periodicity, ReportFilters};
use crate::utils::{add_months, first_day_of_month, last_day_of_month, month_label, period_key_for};
use chrono::{Datelike, NaiveDate};
use log::debug;

/// Splits `start..=end` into chronological buckets of the given periodicity.
///
/// Buckets start on the first of a month; the last bucket is truncated at
/// `end`. Each period is tagged with the start of the fiscal year that
/// contains it, when `fiscal_years` covers it.
pub fn build_period_list(
    start: NaiveDate,
    end: NaiveDate,
    periodicity: Periodicity,
    fiscal_years: &[FiscalYear],
) -> Result<Vec<Period>> {
    if end < start {
        return Err(RatioReportError::InvalidPeriodRange {
            start: start.to_string(),
            end: end.to_string(),
        });
    }

    let step = periodicity.months();
    let mut periods = Vec::new();
    let mut cursor = start;

    loop {
        let last_month = add_months(first_day_of_month(cursor), step - 1)?;
        let bucket_end = last_day_of_month(last_month.year(), last_month.month())?.min(end);

        let label = if periodicity == Periodicity::Monthly {
            month_label(bucket_end)
        } else {
            format!("{} - {}", month_label(cursor), month_label(bucket_end))
        };

        periods.push(Period {
            key: period_key_for(bucket_end),
            label,
            from_date: Some(cursor),
            to_date: Some(bucket_end),
            year_start_date: fiscal_year_containing(fiscal_years, cursor).map(|fy| fy.year_start_date),
        });

        if bucket_end >= end {
            break;
        }
        cursor = add_months(first_day_of_month(cursor), step)?;
    }

    debug!(
        "Built {} {:?} periods between {} and {}",
        periods.len(),
        periodicity,
        start,
        end
    );

    Ok(periods)
}

/// Resolves the reporting window a request asks for.
pub fn resolve_reporting_window(
    filters: &ReportFilters,
    fiscal_years: &[FiscalYear],
) -> Result<(NaiveDate, NaiveDate)> {
    match filters.filter_based_on {
        FilterBasedOn::DateRange => {
            let start = filters
                .period_start_date
                .ok_or(RatioReportError::MissingFilter("period_start_date"))?;
            let end = filters
                .period_end_date
                .ok_or(RatioReportError::MissingFilter("period_end_date"))?;
            Ok((start, end))
        }
        FilterBasedOn::FiscalYear => {
            let from_name = filters
                .from_fiscal_year
                .as_deref()
                .ok_or(RatioReportError::MissingFilter("from_fiscal_year"))?;
            let to_name = filters.to_fiscal_year.as_deref().unwrap_or(from_name);

            let from = find_fiscal_year(fiscal_years, from_name)?;
            let to = find_fiscal_year(fiscal_years, to_name)?;
            Ok((from.year_start_date, to.year_end_date))
        }
    }
}

fn find_fiscal_year<'a>(fiscal_years: &'a [FiscalYear], name: &str) -> Result<&'a FiscalYear> {
    fiscal_years
        .iter()
        .find(|fy| fy.name == name)
        .ok_or_else(|| RatioReportError::UnknownFiscalYear(name.to_string()))
}

fn fiscal_year_containing(fiscal_years: &[FiscalYear], date: NaiveDate) -> Option<&FiscalYear> {
    fiscal_years
        .iter()
        .find(|fy| fy.year_start_date <= date && date <= fy.year_end_date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn fy(name: &str, start: NaiveDate, end: NaiveDate) -> FiscalYear {
        FiscalYear {
            name: name.to_string(),
            year_start_date: start,
            year_end_date: end,
        }
    }

    #[test]
    fn test_monthly_periods() {
        let periods =
            build_period_list(date(2024, 1, 1), date(2024, 12, 31), Periodicity::Monthly, &[])
                .unwrap();

        assert_eq!(periods.len(), 12);
        assert_eq!(periods[0].key, "jan_2024");
        assert_eq!(periods[0].label, "Jan 2024");
        assert_eq!(periods[1].to_date, Some(date(2024, 2, 29)));
        assert_eq!(periods[11].key, "dec_2024");
        assert!(periods.iter().all(|p| p.year_start_date.is_none()));
    }

    #[test]
    fn test_quarterly_periods_for_july_fiscal_year() {
        let years = [fy("2023-2024", date(2023, 7, 1), date(2024, 6, 30))];
        let periods =
            build_period_list(date(2023, 7, 1), date(2024, 6, 30), Periodicity::Quarterly, &years)
                .unwrap();

        let keys: Vec<&str> = periods.iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, vec!["sep_2023", "dec_2023", "mar_2024", "jun_2024"]);
        assert_eq!(periods[0].label, "Jul 2023 - Sep 2023");
        assert!(periods
            .iter()
            .all(|p| p.year_start_date == Some(date(2023, 7, 1))));
    }

    #[test]
    fn test_last_bucket_is_truncated() {
        let periods =
            build_period_list(date(2024, 1, 1), date(2024, 8, 15), Periodicity::HalfYearly, &[])
                .unwrap();

        assert_eq!(periods.len(), 2);
        assert_eq!(periods[1].from_date, Some(date(2024, 7, 1)));
        assert_eq!(periods[1].to_date, Some(date(2024, 8, 15)));
        assert_eq!(periods[1].key, "aug_2024");
    }

    #[test]
    fn test_yearly_periods_span_fiscal_years() {
        let years = [
            fy("2023", date(2023, 1, 1), date(2023, 12, 31)),
            fy("2024", date(2024, 1, 1), date(2024, 12, 31)),
        ];
        let periods =
            build_period_list(date(2023, 1, 1), date(2024, 12, 31), Periodicity::Yearly, &years)
                .unwrap();

        assert_eq!(periods.len(), 2);
        assert_eq!(periods[0].year_start_date, Some(date(2023, 1, 1)));
        assert_eq!(periods[1].year_start_date, Some(date(2024, 1, 1)));
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let result =
            build_period_list(date(2024, 5, 1), date(2024, 1, 1), Periodicity::Monthly, &[]);
        assert!(matches!(result, Err(RatioReportError::InvalidPeriodRange { .. })));
    }

    #[test]
    fn test_resolve_window_from_fiscal_years() {
        let years = [
            fy("2023", date(2023, 1, 1), date(2023, 12, 31)),
            fy("2024", date(2024, 1, 1), date(2024, 12, 31)),
        ];
        let filters = ReportFilters {
            from_fiscal_year: Some("2023".to_string()),
            to_fiscal_year: Some("2024".to_string()),
            ..Default::default()
        };

        let (start, end) = resolve_reporting_window(&filters, &years).unwrap();
        assert_eq!(start, date(2023, 1, 1));
        assert_eq!(end, date(2024, 12, 31));

        let unknown = ReportFilters {
            from_fiscal_year: Some("1999".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            resolve_reporting_window(&unknown, &years),
            Err(RatioReportError::UnknownFiscalYear(_))
        ));
    }

    #[test]
    fn test_resolve_window_from_date_range_requires_both_dates() {
        let filters = ReportFilters {
            filter_based_on: FilterBasedOn::DateRange,
            period_start_date: Some(date(2024, 1, 1)),
            ..Default::default()
        };
        assert!(matches!(
            resolve_reporting_window(&filters, &[]),
            Err(RatioReportError::MissingFilter("period_end_date"))
        ));
    }
}
