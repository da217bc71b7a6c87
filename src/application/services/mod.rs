pub mod recurrence_service;
pub mod scheduling_service;

pub use recurrence_service::*;
pub use scheduling_service::*;
