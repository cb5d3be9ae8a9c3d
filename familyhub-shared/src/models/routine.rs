/// Recurrence settings for routine tasks
///
/// Stored as JSONB on the task row:
///
/// ```json
/// {"repeat_every": "weekly", "weekdays": [0, 3], "day_of_month": null}
/// ```
///
/// Weekdays are numbered from Monday (0) to Sunday (6).

use std::borrow::Cow;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Recurrence cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatEvery {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// Structured recurrence rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "check_routine_settings"))]
pub struct RoutineSettings {
    pub repeat_every: RepeatEvery,

    /// Weekly repetition days, 0 = Monday .. 6 = Sunday
    #[serde(default)]
    pub weekdays: Option<Vec<u8>>,

    /// Monthly repetition day, 1..=31
    #[serde(default)]
    pub day_of_month: Option<u8>,
}

/// Range checks for weekdays and day of month
pub fn check_routine_settings(settings: &RoutineSettings) -> Result<(), ValidationError> {
    if let Some(days) = &settings.weekdays {
        if days.iter().any(|d| *d > 6) {
            let mut err = ValidationError::new("range");
            err.message = Some(Cow::from("weekdays must be between 0 (Monday) and 6 (Sunday)"));
            return Err(err);
        }
    }

    if let Some(day) = settings.day_of_month {
        if !(1..=31).contains(&day) {
            let mut err = ValidationError::new("range");
            err.message = Some(Cow::from("day_of_month must be between 1 and 31"));
            return Err(err);
        }
    }

    Ok(())
}

impl RoutineSettings {
    /// First date on or after `anchor` matching this rule
    ///
    /// - daily and yearly: the anchor itself
    /// - weekly: the nearest listed weekday (the anchor when none are listed)
    /// - monthly: the configured day, clamped to the month's length; falls
    ///   through to the following month when this month's day has passed
    pub fn next_occurrence_on_or_after(&self, anchor: NaiveDate) -> Option<NaiveDate> {
        match self.repeat_every {
            RepeatEvery::Daily | RepeatEvery::Yearly => Some(anchor),
            RepeatEvery::Weekly => {
                let today = anchor.weekday().num_days_from_monday() as i64;
                let ahead = self
                    .weekdays
                    .as_deref()
                    .unwrap_or_default()
                    .iter()
                    .map(|d| (*d as i64 - today).rem_euclid(7))
                    .min()
                    .unwrap_or(0);
                anchor.checked_add_signed(Duration::days(ahead))
            }
            RepeatEvery::Monthly => {
                let day = self.day_of_month.map(u32::from).unwrap_or_else(|| anchor.day());
                let this_month = clamped_date(anchor.year(), anchor.month(), day)?;
                if this_month >= anchor {
                    return Some(this_month);
                }
                let (year, month) = if anchor.month() == 12 {
                    (anchor.year() + 1, 1)
                } else {
                    (anchor.year(), anchor.month() + 1)
                };
                clamped_date(year, month, day)
            }
        }
    }
}

/// Number of days in the given month
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };

    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(28)
}

fn clamped_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day.min(days_in_month(year, month)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn weekly(days: &[u8]) -> RoutineSettings {
        RoutineSettings {
            repeat_every: RepeatEvery::Weekly,
            weekdays: Some(days.to_vec()),
            day_of_month: None,
        }
    }

    fn monthly(day: u8) -> RoutineSettings {
        RoutineSettings {
            repeat_every: RepeatEvery::Monthly,
            weekdays: None,
            day_of_month: Some(day),
        }
    }

    #[test]
    fn test_deserialize_settings() {
        let settings: RoutineSettings =
            serde_json::from_str(r#"{"repeat_every": "weekly", "weekdays": [0, 6]}"#).unwrap();
        assert_eq!(settings.repeat_every, RepeatEvery::Weekly);
        assert_eq!(settings.weekdays, Some(vec![0, 6]));
        assert_eq!(settings.day_of_month, None);

        assert!(serde_json::from_str::<RoutineSettings>(r#"{"repeat_every": "hourly"}"#).is_err());
    }

    #[test]
    fn test_validation_ranges() {
        assert!(weekly(&[0, 6]).validate().is_ok());
        assert!(weekly(&[7]).validate().is_err());
        assert!(monthly(31).validate().is_ok());
        assert!(monthly(0).validate().is_err());
        assert!(monthly(32).validate().is_err());
    }

    #[test]
    fn test_daily_and_yearly_use_anchor() {
        let anchor = date(2025, 3, 14);
        let daily = RoutineSettings {
            repeat_every: RepeatEvery::Daily,
            weekdays: None,
            day_of_month: None,
        };
        assert_eq!(daily.next_occurrence_on_or_after(anchor), Some(anchor));

        let yearly = RoutineSettings {
            repeat_every: RepeatEvery::Yearly,
            ..daily
        };
        assert_eq!(yearly.next_occurrence_on_or_after(anchor), Some(anchor));
    }

    #[test]
    fn test_weekly_next_listed_weekday() {
        // 2025-03-12 is a Wednesday (2)
        let wednesday = date(2025, 3, 12);
        assert_eq!(weekly(&[2]).next_occurrence_on_or_after(wednesday), Some(wednesday));
        assert_eq!(weekly(&[4]).next_occurrence_on_or_after(wednesday), Some(date(2025, 3, 14)));
        assert_eq!(weekly(&[0]).next_occurrence_on_or_after(wednesday), Some(date(2025, 3, 17)));
        assert_eq!(
            weekly(&[0, 5]).next_occurrence_on_or_after(wednesday),
            Some(date(2025, 3, 15))
        );
        assert_eq!(weekly(&[]).next_occurrence_on_or_after(wednesday), Some(wednesday));
    }

    #[test]
    fn test_monthly_clamps_and_rolls_over() {
        assert_eq!(
            monthly(20).next_occurrence_on_or_after(date(2025, 3, 14)),
            Some(date(2025, 3, 20))
        );
        assert_eq!(
            monthly(10).next_occurrence_on_or_after(date(2025, 3, 14)),
            Some(date(2025, 4, 10))
        );
        assert_eq!(
            monthly(31).next_occurrence_on_or_after(date(2025, 2, 3)),
            Some(date(2025, 2, 28))
        );
        assert_eq!(
            monthly(5).next_occurrence_on_or_after(date(2025, 12, 20)),
            Some(date(2026, 1, 5))
        );
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2025, 2), 28);
        assert_eq!(days_in_month(2025, 4), 30);
        assert_eq!(days_in_month(2025, 12), 31);
    }
}
