pub mod availability;
pub mod customer;
pub mod job;
pub mod slot;
pub mod worker;

pub use availability::*;
pub use customer::*;
pub use job::*;
pub use slot::*;
pub use worker::*;
