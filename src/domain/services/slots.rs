use chrono::{Duration, NaiveDate, NaiveTime};
use std::collections::HashMap;

use super::availability::{is_available_for, DEFAULT_BUSINESS_HOURS};
use crate::domain::entities::{Appointment, Slot, TimeRange, Worker};

/// Stride between candidate start times
pub const DEFAULT_SLOT_INTERVAL_MINUTES: u32 = 30;

/// Parameters for one day of slot generation
#[derive(Debug, Clone)]
pub struct SlotRequest {
    pub date: NaiveDate,
    pub duration_minutes: u32,
    /// Restrict evaluation to a single worker
    pub worker_id: Option<String>,
    pub business_hours: TimeRange,
    pub interval_minutes: u32,
}

impl SlotRequest {
    pub fn new(date: NaiveDate, duration_minutes: u32) -> Self {
        Self {
            date,
            duration_minutes,
            worker_id: None,
            business_hours: DEFAULT_BUSINESS_HOURS,
            interval_minutes: DEFAULT_SLOT_INTERVAL_MINUTES,
        }
    }

    pub fn for_worker(mut self, worker_id: impl Into<String>) -> Self {
        self.worker_id = Some(worker_id.into());
        self
    }
}

/// Generate the bookable slots for a day from a snapshot of workers and appointments.
///
/// A worker is free for a candidate interval when its availability admits the
/// interval and none of *its own* appointments overlap it; appointments of
/// other workers (or unassigned ones) never block it. Slots with no free
/// worker are omitted, and the result is ordered by start time.
pub fn generate_slots(
    request: &SlotRequest,
    workers: &[Worker],
    appointments: &[Appointment],
) -> Vec<Slot> {
    let candidates: Vec<&Worker> = match &request.worker_id {
        Some(worker_id) => workers.iter().filter(|w| &w.id == worker_id).collect(),
        None => workers.iter().collect(),
    };

    let duration = request.duration_minutes;
    let stride = request.interval_minutes.max(1);
    let hours = request.business_hours;
    if candidates.is_empty() || duration == 0 || duration > hours.len() {
        return Vec::new();
    }

    let booked = booked_by_worker(appointments);
    let midnight = request.date.and_hms_opt(0, 0, 0).unwrap_or_default();

    let mut slots = Vec::new();
    let mut start = hours.start;
    while start + duration <= hours.end {
        let window = TimeRange::new(start, start + duration);
        let window_start = midnight + Duration::minutes(i64::from(window.start));
        let window_end = midnight + Duration::minutes(i64::from(window.end));

        let available_worker_count = candidates
            .iter()
            .filter(|worker| {
                is_available_for(&worker.availability, request.date, &window, &hours)
                    && !booked
                        .get(worker.id.as_str())
                        .is_some_and(|own| own.iter().any(|a| a.overlaps(window_start, window_end)))
            })
            .count();

        if available_worker_count > 0 {
            if let (Some(start_time), Some(end_time)) =
                (clock_time(window.start), clock_time(window.end))
            {
                slots.push(Slot {
                    start_time,
                    end_time,
                    available_worker_count,
                });
            }
        }

        start += stride;
    }

    slots
}

/// Blocking appointments per assigned worker. Appointments are compared as
/// absolute intervals, so one that started the day before still blocks the
/// morning it runs into.
fn booked_by_worker(appointments: &[Appointment]) -> HashMap<&str, Vec<&Appointment>> {
    let mut booked: HashMap<&str, Vec<&Appointment>> = HashMap::new();
    for appointment in appointments.iter().filter(|a| a.blocks_time()) {
        if let Some(worker_id) = appointment.worker_id.as_deref() {
            booked.entry(worker_id).or_default().push(appointment);
        }
    }
    booked
}

/// Minutes from midnight to a clock time; `None` for 24:00 and beyond
fn clock_time(minutes: u32) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0)
}
