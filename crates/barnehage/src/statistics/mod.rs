//! Coverage statistics for one- and two-year-olds in kindergarten.
//!
//! The pipeline has three stages: [`loader`] turns the source workbook into
//! a cleaned [`table::CoverageTable`], [`aggregate`] derives descriptive
//! figures from it, and [`chart`] reshapes rows into chart payloads.

pub mod aggregate;
pub mod chart;
pub mod loader;
pub mod table;

pub use aggregate::{AverageExtreme, RankedAverage, StatsError, YearExtreme, YearMinimum};
pub use chart::{ChartDocument, SeriesPoint};
pub use loader::{RawRow, RawSheet, WorkbookError};
pub use table::{CoverageRow, CoverageTable, Year, YEAR_COUNT};
