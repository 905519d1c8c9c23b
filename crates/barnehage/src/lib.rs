//! Municipal kindergarten coverage statistics and day-care application intake.
//!
//! The crate is split along the two halves of the system: [`statistics`]
//! loads and cleans the national coverage workbook and derives the
//! descriptive figures and chart payloads, while [`intake`] models the
//! application workflow that matches applicants to day-care slots.

pub mod config;
pub mod error;
pub mod intake;
pub mod statistics;
pub mod telemetry;
