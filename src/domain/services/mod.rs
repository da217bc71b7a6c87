//! Pure scheduling computations: no I/O, no wall-clock reads.

pub mod availability;
pub mod frequency;
pub mod slots;

pub use availability::{is_available, is_available_for, DEFAULT_BUSINESS_HOURS};
pub use frequency::{next_occurrence, Frequency, MonthDay, Ordinal};
pub use slots::{generate_slots, SlotRequest, DEFAULT_SLOT_INTERVAL_MINUTES};
