//! # Fund Analytics
//!
//! This crate turns loaded return series into fund-performance statistics: monthly
//! compounded returns, value-at-risk, Sharpe and Sortino ratios, correlation to a benchmark,
//! the cumulative return path and the calendar performance table.
//!
//! ## Architectural Principles
//!
//! - **Pure logic:** This crate has no knowledge of where series come from. It depends only
//!   on `core-types` and the metrics settings.
//! - **Stateless Calculation:** Every metric is a free function over passed-in values. The
//!   `AnalyticsEngine` only wires those functions to the settlement state of each input, so
//!   a figure whose input is still loading reads `Pending` rather than a fake number.
//!
//! ## Public API
//!
//! - `aggregate_monthly`: The period aggregator.
//! - `AnalyticsEngine`: Produces a `PerformanceReport` from the three series states.
//! - `format_table`: The year × month grid.

// Declare the modules that constitute this crate.
pub mod aggregate;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod report;
pub mod table;

// Re-export the key components to create a clean, public-facing API.
pub use aggregate::aggregate_monthly;
pub use engine::AnalyticsEngine;
pub use error::AnalyticsError;
pub use metrics::Correlation;
pub use report::{MetricsSnapshot, PerformanceReport};
pub use table::{TableRow, display_pct, display_ratio, format_table};
