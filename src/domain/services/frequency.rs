//! Recurrence frequency descriptors and next-occurrence arithmetic.
//!
//! Descriptors are short, human-authored strings such as `weekly-friday`,
//! `2 weeks`, `bi-weekly-tuesday`, `monthly-day-15` or `monthly-last-friday`.
//! Calculation is a pure function of the descriptor and the anchor date.

use chrono::{Datelike, Duration, Months, NaiveDate, Weekday};
use regex::Regex;
use std::sync::OnceLock;

/// Position of a weekday within a month
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ordinal {
    First,
    Second,
    Third,
    Fourth,
    Last,
}

impl std::str::FromStr for Ordinal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1st" | "first" => Ok(Ordinal::First),
            "2nd" | "second" => Ok(Ordinal::Second),
            "3rd" | "third" => Ok(Ordinal::Third),
            "4th" | "fourth" => Ok(Ordinal::Fourth),
            "last" => Ok(Ordinal::Last),
            _ => Err(format!("Invalid ordinal: {}", s)),
        }
    }
}

/// Day selection inside the target month of a monthly frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthDay {
    /// Keep the anchor's day of month, clamped to the target month
    SameAsAnchor,
    /// Fixed day of month (1..=31), clamped to the target month
    Fixed(u32),
    Ordinal(Ordinal, Weekday),
}

/// Parsed recurrence descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    Days(u32),
    Weeks {
        interval: u32,
        weekday: Option<Weekday>,
    },
    Biweekly {
        weekday: Option<Weekday>,
    },
    Months {
        interval: u32,
        day: MonthDay,
    },
}

fn daily_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:daily|(?P<n>\d+)\s*days?)$").expect("Invalid daily frequency regex")
    })
}

fn weekly_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:weekly|(?P<n>\d+)\s*weeks?)(?:-(?P<wd>[a-z]+))?$")
            .expect("Invalid weekly frequency regex")
    })
}

fn biweekly_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^bi-?weekly(?:-(?P<wd>[a-z]+))?$").expect("Invalid biweekly frequency regex")
    })
}

fn monthly_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(?:monthly|(?P<n>\d+)\s*months?)(?:-day-(?P<day>\d{1,2})|-(?P<ord>1st|2nd|3rd|4th|last)-(?P<wd>[a-z]+))?$",
        )
        .expect("Invalid monthly frequency regex")
    })
}

/// Interval capture defaulting to 1; zero never advances and is rejected
fn interval(caps: &regex::Captures<'_>) -> Result<u32, String> {
    let n = match caps.name("n") {
        Some(m) => m
            .as_str()
            .parse::<u32>()
            .map_err(|_| format!("Invalid interval: {}", m.as_str()))?,
        None => 1,
    };
    if n == 0 {
        return Err("Interval must be greater than 0".to_string());
    }
    Ok(n)
}

fn weekday(caps: &regex::Captures<'_>) -> Result<Option<Weekday>, String> {
    caps.name("wd")
        .map(|m| {
            m.as_str()
                .parse::<Weekday>()
                .map_err(|_| format!("Invalid weekday: {}", m.as_str()))
        })
        .transpose()
}

impl std::str::FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let descriptor = s.trim().to_lowercase();

        if let Some(caps) = daily_regex().captures(&descriptor) {
            return Ok(Frequency::Days(interval(&caps)?));
        }

        if let Some(caps) = biweekly_regex().captures(&descriptor) {
            return Ok(Frequency::Biweekly {
                weekday: weekday(&caps)?,
            });
        }

        if let Some(caps) = weekly_regex().captures(&descriptor) {
            return Ok(Frequency::Weeks {
                interval: interval(&caps)?,
                weekday: weekday(&caps)?,
            });
        }

        if let Some(caps) = monthly_regex().captures(&descriptor) {
            let day = if let Some(day) = caps.name("day") {
                let day: u32 = day
                    .as_str()
                    .parse()
                    .map_err(|_| format!("Invalid day of month: {}", day.as_str()))?;
                if !(1..=31).contains(&day) {
                    return Err(format!("Day of month out of range: {}", day));
                }
                MonthDay::Fixed(day)
            } else if let Some(ord) = caps.name("ord") {
                let weekday = weekday(&caps)?.ok_or("Ordinal without weekday")?;
                MonthDay::Ordinal(ord.as_str().parse()?, weekday)
            } else {
                MonthDay::SameAsAnchor
            };

            return Ok(Frequency::Months {
                interval: interval(&caps)?,
                day,
            });
        }

        Err(format!("Unrecognised frequency: {}", s))
    }
}

impl Frequency {
    /// Next occurrence strictly after `anchor`
    pub fn next_after(&self, anchor: NaiveDate) -> Option<NaiveDate> {
        match *self {
            Frequency::Days(n) => anchor.checked_add_signed(Duration::days(i64::from(n))),

            Frequency::Weeks {
                interval,
                weekday: None,
            } => anchor.checked_add_signed(Duration::weeks(i64::from(interval))),

            Frequency::Weeks {
                interval,
                weekday: Some(target),
            } => {
                // Searching from the day after the anchor means a same-weekday
                // anchor rolls a full week forward.
                let start = anchor.succ_opt()?;
                let first = start + Duration::days(days_until(start.weekday(), target));
                first.checked_add_signed(Duration::weeks(i64::from(interval) - 1))
            }

            Frequency::Biweekly { weekday } => {
                let base = anchor.checked_add_signed(Duration::days(14))?;
                match weekday {
                    Some(target) => Some(base + Duration::days(days_until(base.weekday(), target))),
                    None => Some(base),
                }
            }

            Frequency::Months { interval, day } => {
                let months = Months::new(interval);
                match day {
                    // chrono clamps the day into the target month (Jan 31 -> Feb 28/29)
                    MonthDay::SameAsAnchor => anchor.checked_add_months(months),
                    MonthDay::Fixed(requested) => {
                        let first = first_of_month(anchor).checked_add_months(months)?;
                        let day = requested.min(days_in_month(first)?);
                        first.with_day(day)
                    }
                    MonthDay::Ordinal(ordinal, target) => {
                        let first = first_of_month(anchor).checked_add_months(months)?;
                        ordinal_weekday(first, ordinal, target)
                    }
                }
            }
        }
    }
}

/// Days to add to land on `target`, 0 when already there
fn days_until(from: Weekday, target: Weekday) -> i64 {
    let from = i64::from(from.num_days_from_monday());
    let target = i64::from(target.num_days_from_monday());
    (target - from).rem_euclid(7)
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn last_of_month(first: NaiveDate) -> Option<NaiveDate> {
    first.checked_add_months(Months::new(1))?.pred_opt()
}

fn days_in_month(first: NaiveDate) -> Option<u32> {
    last_of_month(first).map(|last| last.day())
}

/// Resolve "2nd Friday" style positions within the month starting at `first`
fn ordinal_weekday(first: NaiveDate, ordinal: Ordinal, target: Weekday) -> Option<NaiveDate> {
    let last = last_of_month(first)?;

    let date = match ordinal {
        Ordinal::Last => {
            let back = days_until(target, last.weekday());
            last - Duration::days(back)
        }
        _ => {
            let first_match = first + Duration::days(days_until(first.weekday(), target));
            let weeks = match ordinal {
                Ordinal::First => 0,
                Ordinal::Second => 1,
                Ordinal::Third => 2,
                _ => 3,
            };
            first_match + Duration::weeks(weeks)
        }
    };

    Some(date.min(last))
}

/// Next occurrence date for a stored descriptor, or `None` for non-recurring
/// (`None`, empty, `never`) and unparseable descriptors.
pub fn next_occurrence(descriptor: Option<&str>, anchor: NaiveDate) -> Option<NaiveDate> {
    let descriptor = descriptor.map(str::trim).filter(|d| !d.is_empty())?;
    if descriptor.eq_ignore_ascii_case("never") {
        return None;
    }

    match descriptor.parse::<Frequency>() {
        Ok(frequency) => frequency.next_after(anchor),
        Err(e) => {
            tracing::debug!("Frequency {:?} not recognised: {}", descriptor, e);
            None
        }
    }
}
