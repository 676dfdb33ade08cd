use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Values stored for the date-range select.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum DateRangePreset {
    #[default]
    #[serde(rename = "")]
    None,
    #[serde(rename = "x")]
    Custom,
    #[serde(rename = "7")]
    Last7Days,
    #[serde(rename = "14")]
    Last14Days,
}

impl DateRangePreset {
    pub const ALL: [DateRangePreset; 4] = [
        DateRangePreset::None,
        DateRangePreset::Custom,
        DateRangePreset::Last7Days,
        DateRangePreset::Last14Days,
    ];

    /// The stored select value.
    pub fn as_str(&self) -> &'static str {
        match self {
            DateRangePreset::None => "",
            DateRangePreset::Custom => "x",
            DateRangePreset::Last7Days => "7",
            DateRangePreset::Last14Days => "14",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DateRangePreset::None => "None",
            DateRangePreset::Custom => "Custom Dates",
            DateRangePreset::Last7Days => "Last 7 days",
            DateRangePreset::Last14Days => "Last 14 days",
        }
    }

    pub fn from_value(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == value)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExcludeRecurring {
    #[default]
    Yes,
    No,
}

impl ExcludeRecurring {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExcludeRecurring::Yes => "yes",
            ExcludeRecurring::No => "no",
        }
    }
}

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct DateRange {
    pub preset: DateRangePreset,
    /// `YYYY-MM-DD`, empty when unset. Only read for `Custom`.
    pub start: String,
    pub end: String,
}

impl DateRange {
    /// Resolve to concrete days relative to `today`.
    ///
    /// Custom bounds that are missing or not `YYYY-MM-DD` give no window.
    pub fn window(&self, today: NaiveDate) -> Option<DateWindow> {
        match self.preset {
            DateRangePreset::None => None,
            DateRangePreset::Last7Days => Some(DateWindow {
                start: today - Duration::days(6),
                end: today,
            }),
            DateRangePreset::Last14Days => Some(DateWindow {
                start: today - Duration::days(13),
                end: today,
            }),
            DateRangePreset::Custom => {
                let start = NaiveDate::parse_from_str(&self.start, "%Y-%m-%d").ok()?;
                let end = NaiveDate::parse_from_str(&self.end, "%Y-%m-%d").ok()?;
                Some(DateWindow { start, end })
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct IncomeFilter {
    pub exclude: ExcludeRecurring,
    pub types: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct AllocationFilter {
    pub donation_item: Vec<String>,
    pub location: Vec<String>,
}

/// The filter record edited by the form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterCriteria {
    pub name: String,
    pub date_range: DateRange,
    pub income: IncomeFilter,
    pub allocation: AllocationFilter,
}

impl FilterCriteria {
    /// The value tree the store works on.
    pub fn to_value(&self) -> Value {
        // Only strings, string lists and unit enums: serialization cannot fail.
        serde_json::to_value(self).unwrap_or_default()
    }

    /// Typed view of a value tree. Fails when an edit stored a value of the
    /// wrong shape.
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        FilterCriteria::deserialize(value)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_record_shape() {
        assert_eq!(
            FilterCriteria::default().to_value(),
            json!({
                "name": "",
                "dateRange": { "preset": "", "start": "", "end": "" },
                "income": { "exclude": "yes", "types": [] },
                "allocation": { "donationItem": [], "location": [] }
            })
        );
    }

    #[test]
    fn typed_view_of_edited_tree() {
        let mut value = FilterCriteria::default().to_value();
        value["name"] = json!("Gifts");
        value["income"]["types"] = json!(["1"]);
        value["dateRange"]["preset"] = json!("14");
        let criteria = FilterCriteria::from_value(&value).unwrap();
        assert_eq!(criteria.name, "Gifts");
        assert_eq!(criteria.income.types, vec!["1".to_string()]);
        assert_eq!(criteria.date_range.preset, DateRangePreset::Last14Days);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let criteria = FilterCriteria::from_value(&json!({"name": "Standing"})).unwrap();
        assert_eq!(criteria.name, "Standing");
        assert_eq!(criteria.income, IncomeFilter::default());
    }

    #[test]
    fn typed_view_rejects_wrong_shape() {
        let mut value = FilterCriteria::default().to_value();
        value["income"]["exclude"] = json!("maybe");
        assert!(FilterCriteria::from_value(&value).is_err());
    }

    #[test]
    fn preset_values_match_select_options() {
        let values: Vec<&str> = DateRangePreset::ALL.iter().map(|p| p.as_str()).collect();
        assert_eq!(values, vec!["", "x", "7", "14"]);
        assert_eq!(DateRangePreset::from_value("7"), Some(DateRangePreset::Last7Days));
        assert_eq!(DateRangePreset::from_value("30"), None);
        assert_eq!(
            serde_json::to_string(&DateRangePreset::Custom).unwrap(),
            "\"x\""
        );
    }

    #[test]
    fn preset_windows() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let mut range = DateRange::default();
        assert_eq!(range.window(today), None);

        range.preset = DateRangePreset::Last7Days;
        let w = range.window(today).unwrap();
        assert_eq!(w.start, NaiveDate::from_ymd_opt(2026, 3, 4).unwrap());
        assert_eq!(w.end, today);

        range.preset = DateRangePreset::Last14Days;
        let w = range.window(today).unwrap();
        assert_eq!(w.start, NaiveDate::from_ymd_opt(2026, 2, 25).unwrap());
    }

    #[test]
    fn custom_window_needs_both_dates() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let mut range = DateRange {
            preset: DateRangePreset::Custom,
            start: "2026-01-01".into(),
            end: String::new(),
        };
        assert_eq!(range.window(today), None);

        range.end = "2026-01-31".into();
        let w = range.window(today).unwrap();
        assert_eq!(w.start, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        assert_eq!(w.end, NaiveDate::from_ymd_opt(2026, 1, 31).unwrap());

        range.start = "01/01/2026".into();
        assert_eq!(range.window(today), None);
    }
}
