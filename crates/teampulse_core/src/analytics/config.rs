//! Analytics configuration: date windows, filters, view preferences.

use crate::model::member::MemberId;
use crate::model::task::{TaskCategory, TaskPriority};
use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Inclusive instant range used for task admission.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    /// Inclusive containment on both ends.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant <= self.end
    }
}

/// Named range presets resolved against "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatePreset {
    ThisWeek,
    ThisMonth,
    LastMonth,
    Last3Months,
    Custom,
}

impl DatePreset {
    /// Resolves the preset window. `Custom` resolves to `None`: the caller
    /// keeps whatever explicit range it already has.
    pub fn resolve(self, now: DateTime<Utc>) -> Option<DateRange> {
        match self {
            Self::ThisWeek => Some(DateRange {
                start: start_of_week(now),
                end: end_of_week(now),
            }),
            Self::ThisMonth => Some(DateRange {
                start: start_of_month(now),
                end: end_of_month(now),
            }),
            Self::LastMonth => {
                let in_last_month = start_of_month(now) - Duration::days(1);
                Some(DateRange {
                    start: start_of_month(in_last_month),
                    end: end_of_month(in_last_month),
                })
            }
            Self::Last3Months => Some(DateRange {
                start: start_of_month(now) - Duration::days(90),
                end: end_of_month(now),
            }),
            Self::Custom => None,
        }
    }
}

/// Allow-lists and completion-bucket toggles for task admission.
///
/// An empty allow-list admits everything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AnalyticsFilters {
    pub selected_members: Vec<MemberId>,
    pub selected_categories: Vec<TaskCategory>,
    pub selected_priorities: Vec<TaskPriority>,
    pub include_completed: bool,
    pub include_in_progress: bool,
    pub include_not_started: bool,
}

impl Default for AnalyticsFilters {
    fn default() -> Self {
        Self {
            selected_members: Vec::new(),
            selected_categories: Vec::new(),
            selected_priorities: Vec::new(),
            include_completed: true,
            include_in_progress: true,
            include_not_started: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartType {
    Bar,
    Line,
    Pie,
    Mixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Pdf,
    Csv,
    Excel,
}

/// Dashboard view preferences; configuration only, no rendering here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ViewSettings {
    pub chart_type: ChartType,
    pub show_comparisons: bool,
    pub show_trends: bool,
    pub refresh_interval_ms: i64,
    pub export_format: ExportFormat,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            chart_type: ChartType::Mixed,
            show_comparisons: true,
            show_trends: true,
            refresh_interval_ms: 300_000,
            export_format: ExportFormat::Pdf,
        }
    }
}

/// Full analytics configuration owned by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    pub date_range: DateRange,
    pub preset: DatePreset,
    pub filters: AnalyticsFilters,
    pub view: ViewSettings,
}

impl AnalyticsConfig {
    /// Default configuration: the current calendar month, no filters.
    pub fn this_month(now: DateTime<Utc>) -> Self {
        Self {
            date_range: DateRange {
                start: start_of_month(now),
                end: end_of_month(now),
            },
            preset: DatePreset::ThisMonth,
            filters: AnalyticsFilters::default(),
            view: ViewSettings::default(),
        }
    }
}

/// UTC midnight of the instant's calendar day.
pub fn start_of_day(instant: DateTime<Utc>) -> DateTime<Utc> {
    at_midnight(instant.date_naive())
}

/// Last representable millisecond of the instant's calendar day.
pub fn end_of_day(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant
        .date_naive()
        .and_hms_milli_opt(23, 59, 59, 999)
        .expect("end of day is valid for any date")
        .and_utc()
}

/// Midnight of the Sunday opening the instant's week.
pub fn start_of_week(instant: DateTime<Utc>) -> DateTime<Utc> {
    let date = instant.date_naive();
    let back = date.weekday().num_days_from_sunday() as i64;
    at_midnight(date - Duration::days(back))
}

/// End of the Saturday closing the instant's week.
pub fn end_of_week(instant: DateTime<Utc>) -> DateTime<Utc> {
    end_of_day(start_of_week(instant) + Duration::days(6))
}

/// Midnight of the first day of the instant's month.
pub fn start_of_month(instant: DateTime<Utc>) -> DateTime<Utc> {
    at_midnight(first_of_month(instant.date_naive()))
}

/// End of the last day of the instant's month.
pub fn end_of_month(instant: DateTime<Utc>) -> DateTime<Utc> {
    let first = first_of_month(instant.date_naive());
    let first_of_next = first
        .checked_add_months(Months::new(1))
        .expect("one month past a valid date is representable");
    end_of_day(at_midnight(first_of_next - Duration::days(1)))
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).expect("day 1 is valid for any month")
}

fn at_midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(0, 0, 0)
        .expect("midnight is valid for any date")
        .and_utc()
}

#[cfg(test)]
mod tests {
    use super::{
        end_of_month, end_of_week, start_of_month, start_of_week, DatePreset, DateRange,
    };
    use chrono::{TimeZone, Utc};

    #[test]
    fn week_runs_sunday_through_saturday() {
        // 2024-02-14 is a Wednesday.
        let now = Utc.with_ymd_and_hms(2024, 2, 14, 15, 30, 0).unwrap();
        assert_eq!(
            start_of_week(now),
            Utc.with_ymd_and_hms(2024, 2, 11, 0, 0, 0).unwrap()
        );
        assert_eq!(
            end_of_week(now),
            Utc.with_ymd_and_hms(2024, 2, 17, 23, 59, 59).unwrap()
                + chrono::Duration::milliseconds(999)
        );
    }

    #[test]
    fn month_window_handles_leap_february() {
        let now = Utc.with_ymd_and_hms(2024, 2, 14, 12, 0, 0).unwrap();
        assert_eq!(
            start_of_month(now),
            Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            end_of_month(now),
            Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap()
                + chrono::Duration::milliseconds(999)
        );
    }

    #[test]
    fn last_month_preset_crosses_year_boundary() {
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 8, 0, 0).unwrap();
        let range = DatePreset::LastMonth.resolve(now).unwrap();
        assert_eq!(range.start, Utc.with_ymd_and_hms(2023, 12, 1, 0, 0, 0).unwrap());
        assert_eq!(
            range.end,
            Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap()
                + chrono::Duration::milliseconds(999)
        );
    }

    #[test]
    fn custom_preset_does_not_resolve() {
        let now = Utc.with_ymd_and_hms(2024, 2, 14, 12, 0, 0).unwrap();
        assert!(DatePreset::Custom.resolve(now).is_none());
    }

    #[test]
    fn range_containment_is_inclusive() {
        let start = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap();
        let range = DateRange { start, end };

        assert!(range.contains(start));
        assert!(range.contains(end));
        assert!(!range.contains(start - chrono::Duration::milliseconds(1)));
        assert!(!range.contains(end + chrono::Duration::milliseconds(1)));
    }
}
