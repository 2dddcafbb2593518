//! Terminal presentation of the engine's results.

pub mod analyze;
pub mod monthly;
pub mod schedule;
pub mod setup;
pub mod ui;
