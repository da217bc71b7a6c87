use chrono::NaiveTime;
use serde::{Serialize, Serializer};

/// Bookable interval on a given day
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Slot {
    #[serde(serialize_with = "serialize_clock")]
    pub start_time: NaiveTime,
    #[serde(serialize_with = "serialize_clock")]
    pub end_time: NaiveTime,
    pub available_worker_count: usize,
}

fn serialize_clock<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&time.format("%H:%M").to_string())
}
