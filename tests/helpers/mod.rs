#![allow(dead_code, unused_imports)]
pub mod scheduling_helpers;
pub mod test_db;

pub use scheduling_helpers::*;
pub use test_db::*;
