//! Worker availability configuration.
//!
//! Worker rows store availability as loosely shaped JSON that grew three
//! encodings over time: a weekly schedule of `{start, end}` entries with
//! optional `timeSlots`, weekday entries with a free-text `hours` string,
//! and per-date overrides layered on top of either. Everything is decoded
//! once into [`WorkerAvailability`] so resolution never branches on shape.

use chrono::{NaiveDate, NaiveTime, Timelike, Weekday};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::OnceLock;

const SCHEDULE_KEYS: [&str; 4] = ["weeklySchedule", "weekly_schedule", "schedule", "days"];
const OVERRIDE_KEYS: [&str; 3] = ["dateOverrides", "date_overrides", "overrides"];
const SLOT_KEYS: [&str; 3] = ["timeSlots", "time_slots", "slots"];

/// Half-open interval of minutes from midnight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: u32,
    pub end: u32,
}

impl TimeRange {
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn minutes_of(time: NaiveTime) -> u32 {
        time.hour() * 60 + time.minute()
    }

    /// Parse a "9:00 AM - 6:00 PM" style range (12h or 24h clock)
    pub fn parse(text: &str) -> Option<Self> {
        static RANGE_REGEX: OnceLock<Regex> = OnceLock::new();
        let re = RANGE_REGEX.get_or_init(|| {
            Regex::new(r"(?i)^\s*(.+?)\s*(?:-|\x{2013}|\x{2014}|\bto\b)\s*(.+?)\s*$")
                .expect("Invalid hours range regex")
        });

        let caps = re.captures(text)?;
        Self::from_bounds(&caps[1], &caps[2])
    }

    /// Build a range from two clock strings, rejecting empty or inverted ranges
    pub fn from_bounds(start: &str, end: &str) -> Option<Self> {
        let start = parse_clock_time(start)?;
        let end = parse_clock_time(end)?;
        (end > start).then_some(Self::new(start, end))
    }

    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `other` lies entirely within this range
    pub fn contains(&self, other: &TimeRange) -> bool {
        other.start >= self.start && other.end <= self.end
    }

    /// Half-open overlap: touching endpoints do not overlap
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && self.end > other.start
    }
}

/// Parse a clock time into minutes from midnight.
///
/// Accepts `H:MM AM/PM`, `H AM/PM`, `HH:MM` and `HH:MM:SS`; `24:00` is
/// accepted as end of day.
pub fn parse_clock_time(text: &str) -> Option<u32> {
    static CLOCK_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = CLOCK_REGEX.get_or_init(|| {
        Regex::new(r"(?i)^\s*(\d{1,2})(?::(\d{2}))?(?::\d{2})?\s*(?:([ap])\.?\s*m\.?)?\s*$")
            .expect("Invalid clock time regex")
    });

    let caps = re.captures(text)?;
    let hour: u32 = caps[1].parse().ok()?;
    let minute: u32 = match caps.get(2) {
        Some(m) => m.as_str().parse().ok()?,
        None => 0,
    };
    if minute >= 60 {
        return None;
    }

    let hour = match caps.get(3).map(|m| m.as_str().to_ascii_lowercase()) {
        Some(meridiem) => {
            if !(1..=12).contains(&hour) {
                return None;
            }
            match (meridiem.as_str(), hour) {
                ("a", 12) => 0,
                ("a", h) => h,
                (_, 12) => 12,
                (_, h) => h + 12,
            }
        }
        None => hour,
    };

    let total = hour * 60 + minute;
    (total <= 24 * 60).then_some(total)
}

/// How a configured weekday resolves
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DayRule {
    /// Explicitly disabled
    Unavailable,
    /// Working window, optionally narrowed to finer-grained slots
    Window {
        hours: TimeRange,
        slots: Vec<TimeRange>,
    },
    /// Enabled without explicit hours
    BusinessHours,
}

/// Exception for a single calendar date
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateOverride {
    Closed,
    Hours(Vec<TimeRange>),
    /// Present but not decisive; the weekday rule applies
    Open,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeeklySchedule {
    pub days: HashMap<Weekday, DayRule>,
    pub overrides: HashMap<NaiveDate, DateOverride>,
}

/// Canonical availability of a worker
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum WorkerAvailability {
    /// No configuration, or configuration that could not be decoded.
    ///
    /// Malformed configuration fails open: the worker is treated as available
    /// rather than silently blocked from every booking.
    #[default]
    Unrestricted,
    Scheduled(WeeklySchedule),
}

impl WorkerAvailability {
    /// Decode the stored (JSON text) form of a worker's availability
    pub fn from_stored(raw: Option<&str>) -> Self {
        let text = match raw.map(str::trim) {
            None | Some("") | Some("null") => return Self::Unrestricted,
            Some(text) => text,
        };

        match serde_json::from_str::<Value>(text) {
            Ok(value) => Self::from_value(&value),
            Err(e) => {
                tracing::warn!(
                    "Malformed availability JSON ({}); treating worker as available",
                    e
                );
                Self::Unrestricted
            }
        }
    }

    /// Decode an already structured availability value
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Null => Self::Unrestricted,
            Value::String(text) => Self::from_stored(Some(text)),
            Value::Object(map) => match WeeklySchedule::from_object(map) {
                Ok(schedule) => Self::Scheduled(schedule),
                Err(reason) => {
                    tracing::warn!(
                        "Unrecognised availability shape ({}); treating worker as available",
                        reason
                    );
                    Self::Unrestricted
                }
            },
            other => {
                tracing::warn!(
                    "Unexpected availability value {}; treating worker as available",
                    other
                );
                Self::Unrestricted
            }
        }
    }
}

impl WeeklySchedule {
    fn from_object(map: &Map<String, Value>) -> Result<Self, String> {
        let day_source = SCHEDULE_KEYS
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_object))
            .unwrap_or(map);

        let mut days = HashMap::new();
        for (key, entry) in day_source {
            let Ok(weekday) = key.parse::<Weekday>() else {
                continue;
            };
            if let Some(rule) = DayRule::from_entry(entry) {
                days.insert(weekday, rule);
            }
        }

        let overrides = OVERRIDE_KEYS
            .iter()
            .find_map(|key| map.get(*key))
            .map(parse_overrides)
            .unwrap_or_default();

        let has_override_key = OVERRIDE_KEYS.iter().any(|key| map.contains_key(*key));
        if days.is_empty() && !has_override_key {
            return Err("no weekday entries or date overrides".to_string());
        }

        Ok(Self { days, overrides })
    }
}

impl DayRule {
    /// `None` means the entry carries no configuration (JSON null)
    fn from_entry(entry: &Value) -> Option<Self> {
        match entry {
            Value::Null => None,
            Value::Bool(false) => Some(Self::Unavailable),
            Value::Bool(true) => Some(Self::BusinessHours),
            Value::String(text) => Some(Self::from_hours_text(text)),
            Value::Object(fields) => Some(Self::from_fields(fields)),
            other => {
                tracing::warn!("Unexpected weekday entry {}; using business hours", other);
                Some(Self::BusinessHours)
            }
        }
    }

    fn from_fields(fields: &Map<String, Value>) -> Self {
        let disabled = ["enabled", "available"]
            .iter()
            .any(|key| fields.get(*key).and_then(Value::as_bool) == Some(false));
        if disabled {
            return Self::Unavailable;
        }

        let start = fields.get("start").and_then(Value::as_str);
        let end = fields.get("end").and_then(Value::as_str);
        if let (Some(start), Some(end)) = (start, end) {
            return match TimeRange::from_bounds(start, end) {
                Some(hours) => Self::Window {
                    hours,
                    slots: SLOT_KEYS
                        .iter()
                        .find_map(|key| fields.get(*key))
                        .map(parse_ranges)
                        .unwrap_or_default(),
                },
                None => {
                    tracing::warn!(
                        "Unparseable weekday window {} - {}; using business hours",
                        start,
                        end
                    );
                    Self::BusinessHours
                }
            };
        }

        match fields.get("hours").and_then(Value::as_str) {
            Some(text) => Self::from_hours_text(text),
            None => Self::BusinessHours,
        }
    }

    fn from_hours_text(text: &str) -> Self {
        let normalized = text.trim().to_lowercase();
        if matches!(normalized.as_str(), "closed" | "off" | "unavailable" | "none") {
            return Self::Unavailable;
        }

        match TimeRange::parse(text) {
            Some(hours) => Self::Window {
                hours,
                slots: Vec::new(),
            },
            None => {
                tracing::warn!("Unparseable hours string {:?}; using business hours", text);
                Self::BusinessHours
            }
        }
    }
}

fn parse_overrides(value: &Value) -> HashMap<NaiveDate, DateOverride> {
    let mut overrides = HashMap::new();

    match value {
        Value::Array(entries) => {
            for entry in entries {
                let Some(date) = entry.get("date").and_then(Value::as_str).and_then(parse_date)
                else {
                    tracing::warn!("Skipping date override without a valid date: {}", entry);
                    continue;
                };
                overrides.insert(date, DateOverride::from_entry(entry));
            }
        }
        Value::Object(entries) => {
            for (key, entry) in entries {
                let Some(date) = parse_date(key) else {
                    tracing::warn!("Skipping date override with invalid date key {:?}", key);
                    continue;
                };
                overrides.insert(date, DateOverride::from_entry(entry));
            }
        }
        _ => {}
    }

    overrides
}

impl DateOverride {
    fn from_entry(entry: &Value) -> Self {
        if entry.get("available").and_then(Value::as_bool) == Some(false)
            || entry.as_bool() == Some(false)
        {
            return Self::Closed;
        }

        let hours = match entry.get("hours") {
            Some(hours @ (Value::Array(_) | Value::String(_))) => hours,
            _ => return Self::Open,
        };

        let ranges = parse_ranges(hours);
        let listed = hours.as_array().map_or(1, Vec::len);
        if ranges.is_empty() && listed > 0 {
            tracing::warn!(
                "Unparseable override hours {}; using the weekday schedule",
                hours
            );
            return Self::Open;
        }

        Self::Hours(ranges)
    }
}

/// Parse a list of `{start, end}` objects or range strings; a single string is a one-item list
fn parse_ranges(value: &Value) -> Vec<TimeRange> {
    let items: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        Value::String(_) => vec![value],
        _ => Vec::new(),
    };

    items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(text) => TimeRange::parse(text),
            Value::Object(fields) => {
                let start = fields.get("start").and_then(Value::as_str)?;
                let end = fields.get("end").and_then(Value::as_str)?;
                TimeRange::from_bounds(start, end)
            }
            _ => None,
        })
        .collect()
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    let day = text.get(..10).unwrap_or(text);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}
