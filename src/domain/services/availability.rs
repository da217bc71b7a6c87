use chrono::{Datelike, NaiveDate};

use crate::domain::entities::{
    parse_clock_time, DateOverride, DayRule, TimeRange, WeeklySchedule, WorkerAvailability,
};

/// Hours assumed for a day that is enabled without explicit hours
pub const DEFAULT_BUSINESS_HOURS: TimeRange = TimeRange::new(9 * 60, 17 * 60);

/// Whether a worker can take the window `start_time..end_time` on `date`.
///
/// Times are clock strings (`"9:00 AM"`, `"14:30"`). A window that cannot be
/// parsed is never available unless the worker is unrestricted.
pub fn is_available(
    config: &WorkerAvailability,
    date: NaiveDate,
    start_time: &str,
    end_time: &str,
) -> bool {
    if matches!(config, WorkerAvailability::Unrestricted) {
        return true;
    }

    match (parse_clock_time(start_time), parse_clock_time(end_time)) {
        (Some(start), Some(end)) if end > start => is_available_for(
            config,
            date,
            &TimeRange::new(start, end),
            &DEFAULT_BUSINESS_HOURS,
        ),
        _ => {
            tracing::debug!("Invalid window {} - {}", start_time, end_time);
            false
        }
    }
}

/// Whether a worker can take `window` on `date`, using `business_hours` for
/// days that are enabled without explicit hours.
pub fn is_available_for(
    config: &WorkerAvailability,
    date: NaiveDate,
    window: &TimeRange,
    business_hours: &TimeRange,
) -> bool {
    match config {
        WorkerAvailability::Unrestricted => true,
        WorkerAvailability::Scheduled(schedule) => {
            resolve(schedule, date, window, business_hours)
        }
    }
}

fn resolve(
    schedule: &WeeklySchedule,
    date: NaiveDate,
    window: &TimeRange,
    business_hours: &TimeRange,
) -> bool {
    match schedule.overrides.get(&date) {
        Some(DateOverride::Closed) => return false,
        Some(DateOverride::Hours(ranges)) => {
            return ranges.iter().any(|range| range.contains(window));
        }
        Some(DateOverride::Open) | None => {}
    }

    match schedule.days.get(&date.weekday()) {
        None | Some(DayRule::Unavailable) => false,
        Some(DayRule::Window { hours, slots }) => {
            hours.contains(window)
                && (slots.is_empty() || slots.iter().any(|slot| slot.contains(window)))
        }
        Some(DayRule::BusinessHours) => business_hours.contains(window),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // 2024-03-04 is a Monday
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
    }

    fn config(value: serde_json::Value) -> WorkerAvailability {
        WorkerAvailability::from_value(&value)
    }

    #[test]
    fn test_no_config_is_available() {
        let unrestricted = WorkerAvailability::from_stored(None);
        assert!(is_available(&unrestricted, monday(), "06:00", "23:00"));
    }

    #[test]
    fn test_malformed_config_fails_open() {
        let malformed = WorkerAvailability::from_stored(Some("{\"monday\": "));
        assert!(is_available(&malformed, monday(), "09:00", "10:00"));
    }

    #[test]
    fn test_closed_override_beats_weekly_schedule() {
        let worker = config(json!({
            "weeklySchedule": {"monday": {"enabled": true, "start": "00:00", "end": "24:00"}},
            "dateOverrides": [{"date": "2024-03-04", "available": false}]
        }));

        assert!(!is_available(&worker, monday(), "09:00", "10:00"));
        assert!(!is_available(&worker, monday(), "12:00 AM", "1:00 AM"));

        let next_monday = NaiveDate::from_ymd_opt(2024, 3, 11).unwrap();
        assert!(is_available(&worker, next_monday, "09:00", "10:00"));
    }

    #[test]
    fn test_override_hours_require_containment_in_one_range() {
        let worker = config(json!({
            "monday": {"start": "09:00", "end": "17:00"},
            "dateOverrides": [{
                "date": "2024-03-04",
                "hours": [{"start": "07:00", "end": "09:00"}, {"start": "09:00", "end": "11:00"}]
            }]
        }));

        assert!(is_available(&worker, monday(), "7:00 AM", "8:30 AM"));
        assert!(is_available(&worker, monday(), "09:00", "11:00"));
        // Spans both ranges but fits in neither
        assert!(!is_available(&worker, monday(), "08:30", "09:30"));
        // Inside the weekly window but outside the override
        assert!(!is_available(&worker, monday(), "13:00", "14:00"));
    }

    #[test]
    fn test_unparseable_override_hours_fall_back_to_weekday() {
        let listed = config(json!({
            "monday": {"start": "09:00", "end": "17:00"},
            "dateOverrides": [{"date": "2024-03-04", "hours": ["all day"]}]
        }));
        assert!(is_available(&listed, monday(), "10:00", "11:00"));
        assert!(!is_available(&listed, monday(), "18:00", "19:00"));

        let text = config(json!({
            "monday": {"start": "09:00", "end": "17:00"},
            "dateOverrides": {"2024-03-04": {"hours": "whenever"}}
        }));
        assert!(is_available(&text, monday(), "10:00", "11:00"));
    }

    #[test]
    fn test_open_override_falls_through_to_weekday() {
        let worker = config(json!({
            "monday": {"start": "09:00", "end": "12:00"},
            "dateOverrides": {"2024-03-04": {"available": true}}
        }));

        assert!(is_available(&worker, monday(), "10:00", "11:00"));
        assert!(!is_available(&worker, monday(), "13:00", "14:00"));
    }

    #[test]
    fn test_unconfigured_day_is_unavailable() {
        let worker = config(json!({"tuesday": {"start": "09:00", "end": "17:00"}}));
        assert!(!is_available(&worker, monday(), "10:00", "11:00"));
    }

    #[test]
    fn test_disabled_day_is_unavailable() {
        let worker = config(json!({
            "schedule": {
                "monday": {"enabled": false, "start": "09:00", "end": "17:00"}
            }
        }));
        assert!(!is_available(&worker, monday(), "10:00", "11:00"));
    }

    #[test]
    fn test_start_end_window_with_time_slots() {
        let worker = config(json!({
            "weeklySchedule": {
                "monday": {
                    "enabled": true,
                    "start": "08:00",
                    "end": "18:00",
                    "timeSlots": [{"start": "08:00", "end": "12:00"}, {"start": "14:00", "end": "18:00"}]
                }
            }
        }));

        assert!(is_available(&worker, monday(), "08:00", "10:00"));
        assert!(is_available(&worker, monday(), "15:00", "18:00"));
        assert!(!is_available(&worker, monday(), "12:00", "13:00"));
        assert!(!is_available(&worker, monday(), "07:30", "08:30"));
    }

    #[test]
    fn test_free_text_hours() {
        let worker = config(json!({"monday": {"available": true, "hours": "9:00 AM - 6:00 PM"}}));

        assert!(is_available(&worker, monday(), "17:00", "18:00"));
        assert!(!is_available(&worker, monday(), "5:30 PM", "6:30 PM"));
        assert!(!is_available(&worker, monday(), "08:00", "09:30"));
    }

    #[test]
    fn test_enabled_day_without_hours_uses_business_hours() {
        let worker = config(json!({"monday": {"enabled": true}}));

        assert!(is_available(&worker, monday(), "09:00", "17:00"));
        assert!(!is_available(&worker, monday(), "16:30", "17:30"));

        let extended = TimeRange::new(8 * 60, 20 * 60);
        assert!(is_available_for(
            &worker,
            monday(),
            &TimeRange::new(16 * 60 + 30, 17 * 60 + 30),
            &extended
        ));
    }

    #[test]
    fn test_invalid_window_is_unavailable_for_scheduled_worker() {
        let worker = config(json!({"monday": {"enabled": true}}));
        assert!(!is_available(&worker, monday(), "later", "17:00"));
        assert!(!is_available(&worker, monday(), "11:00", "10:00"));
    }
}
