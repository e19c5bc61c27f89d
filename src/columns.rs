use crate::schema::{Period, Periodicity};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

pub const RATIO_COLUMN_WIDTH: u32 = 300;
pub const PERIOD_COLUMN_WIDTH: u32 = 150;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    Data,
    Link,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub fieldname: String,
    pub label: String,
    pub fieldtype: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,
}

impl ColumnDescriptor {
    fn data(fieldname: impl Into<String>, label: impl Into<String>, width: u32) -> Self {
        Self {
            fieldname: fieldname.into(),
            label: label.into(),
            fieldtype: FieldType::Data,
            width: Some(width),
            options: None,
            hidden: false,
        }
    }

    fn hidden_currency() -> Self {
        Self {
            fieldname: "currency".to_string(),
            label: "Currency".to_string(),
            fieldtype: FieldType::Link,
            width: None,
            options: Some("Currency".to_string()),
            hidden: true,
        }
    }
}

/// Column layout for the ratio table.
///
/// Ratio label first, a hidden currency column when reporting for a company,
/// one column per period, then a trailing `total` column unless the report is
/// yearly or already shows accumulated values.
pub fn build_columns(
    periodicity: Periodicity,
    periods: &[Period],
    accumulated_values: bool,
    company: Option<&str>,
) -> Vec<ColumnDescriptor> {
    let mut columns = vec![ColumnDescriptor::data("account", "Ratio", RATIO_COLUMN_WIDTH)];

    if company.is_some() {
        columns.push(ColumnDescriptor::hidden_currency());
    }

    for period in periods {
        columns.push(ColumnDescriptor::data(
            period.key.clone(),
            period.label.clone(),
            PERIOD_COLUMN_WIDTH,
        ));
    }

    if !periodicity.is_yearly() && !accumulated_values {
        columns.push(ColumnDescriptor::data(
            "total",
            aggregate_column_label(periods),
            PERIOD_COLUMN_WIDTH,
        ));
    }

    columns
}

/// "Year-to-Date" when the periods all sit in one fiscal year, "Total" otherwise.
///
/// Periods without a fiscal year start fall back to the calendar year of their
/// dates. Periods with neither count as the same year.
pub fn aggregate_column_label(periods: &[Period]) -> &'static str {
    let single_year = periods
        .windows(2)
        .all(|pair| year_start_of(&pair[0]) == year_start_of(&pair[1]));

    if single_year {
        "Year-to-Date"
    } else {
        "Total"
    }
}

fn year_start_of(period: &Period) -> Option<NaiveDate> {
    period.year_start_date.or_else(|| {
        period
            .from_date
            .or(period.to_date)
            .and_then(|date| NaiveDate::from_ymd_opt(date.year(), 1, 1))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn months() -> Vec<Period> {
        ["jan", "feb", "mar"]
            .iter()
            .map(|m| Period::new(format!("{}_2024", m), m.to_string()))
            .collect()
    }

    #[test]
    fn test_monthly_columns_with_company() {
        let columns = build_columns(Periodicity::Monthly, &months(), false, Some("ACME"));
        let names: Vec<&str> = columns.iter().map(|c| c.fieldname.as_str()).collect();

        assert_eq!(
            names,
            vec!["account", "currency", "jan_2024", "feb_2024", "mar_2024", "total"]
        );
        assert_eq!(columns[0].label, "Ratio");
        assert_eq!(columns[0].width, Some(RATIO_COLUMN_WIDTH));
        assert!(columns[1].hidden);
        assert_eq!(columns[1].fieldtype, FieldType::Link);
        assert_eq!(columns[2].fieldtype, FieldType::Data);
        assert_eq!(columns[2].width, Some(PERIOD_COLUMN_WIDTH));
        assert_eq!(columns[5].label, "Year-to-Date");
    }

    #[test]
    fn test_no_currency_column_without_company() {
        let columns = build_columns(Periodicity::Monthly, &months(), false, None);
        assert!(columns.iter().all(|c| c.fieldname != "currency"));
        assert_eq!(columns.len(), 5);
    }

    #[test]
    fn test_yearly_never_has_total_column() {
        let periods = vec![Period::new("dec_2023", "2023"), Period::new("dec_2024", "2024")];
        for accumulated in [true, false] {
            let columns = build_columns(Periodicity::Yearly, &periods, accumulated, Some("ACME"));
            assert!(columns.iter().all(|c| c.fieldname != "total"));
        }
    }

    #[test]
    fn test_accumulated_values_drop_total_column() {
        let columns = build_columns(Periodicity::Quarterly, &months(), true, None);
        assert!(columns.iter().all(|c| c.fieldname != "total"));
    }

    #[test]
    fn test_total_label_across_fiscal_years() {
        let mut periods = months();
        periods[0].year_start_date = NaiveDate::from_ymd_opt(2023, 4, 1);
        periods[1].year_start_date = NaiveDate::from_ymd_opt(2023, 4, 1);
        periods[2].year_start_date = NaiveDate::from_ymd_opt(2024, 4, 1);

        assert_eq!(aggregate_column_label(&periods), "Total");

        let columns = build_columns(Periodicity::Monthly, &periods, false, None);
        assert_eq!(columns.last().unwrap().label, "Total");
    }

    #[test]
    fn test_total_label_falls_back_to_calendar_years() {
        let quarter = |year: i32, from: u32, to: u32| Period {
            from_date: NaiveDate::from_ymd_opt(year, from, 1),
            to_date: NaiveDate::from_ymd_opt(year, to, 28),
            ..Period::new(format!("q_{}_{}", year, to), format!("{}", year))
        };

        let one_year = vec![quarter(2024, 1, 3), quarter(2024, 4, 6)];
        assert_eq!(aggregate_column_label(&one_year), "Year-to-Date");

        let three_years = vec![quarter(2022, 1, 3), quarter(2023, 1, 3), quarter(2024, 1, 3)];
        assert_eq!(aggregate_column_label(&three_years), "Total");

        assert_eq!(aggregate_column_label(&months()), "Year-to-Date");
    }

    #[test]
    fn test_hidden_flag_serialization() {
        let columns = build_columns(Periodicity::Monthly, &months(), false, Some("ACME"));
        let json = serde_json::to_value(&columns).unwrap();

        assert_eq!(json[1]["hidden"], true);
        assert!(json[0].get("hidden").is_none());
        assert_eq!(json[1]["options"], "Currency");
    }
}
