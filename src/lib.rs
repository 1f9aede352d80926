//! Spreadsheet-export dashboard core.
//!
//! CSV text exported from the project sheets goes through
//! [`parser`] (rows), [`fields`], [`dates`] and [`fill`] (row cleanup), then
//! into [`kpi`] (daily/weekly/monthly snapshots) and [`timeline`] (Gantt
//! geometry). [`dashboard::Dashboard`] ties the pieces together for callers
//! that hold several sheets at once.
pub mod config;
pub mod dashboard;
pub mod dates;
pub mod error;
pub mod fields;
pub mod fill;
pub mod kpi;
pub mod loader;
pub mod output;
pub mod parser;
pub mod reports;
pub mod timeline;
pub mod types;
pub mod util;

pub use dashboard::{Dashboard, TimelineView};
pub use error::{DashboardError, Result};
pub use types::{Dataset, Datasets, Kpi, KpiSet, Row, TimelineRange, TimelineTask};
