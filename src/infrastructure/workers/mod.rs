pub mod regeneration_worker;

pub use regeneration_worker::*;
