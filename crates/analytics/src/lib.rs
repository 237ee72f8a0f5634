//! # Shoplens Analytics Engine
//!
//! This crate turns a table of annual financial figures into the enriched
//! report the rest of the application prints and charts.
//!
//! ## Architectural Principles
//!
//! - **Pure logic:** no knowledge of files, terminals or charts. It depends
//!   only on `core-types` for its inputs and `configuration` for its settings.
//! - **Stateless calculation:** `AnalyticsEngine` takes a `FinancialTable` and
//!   produces an `AnalysisReport`.
//!
//! ## Public API
//!
//! - `derive_metrics`, `pct_change`, `ratio_pct`: growth rates and margins.
//! - `ExponentialSmoothing`: additive Holt-Winters / Holt linear forecasting.
//! - `cluster_rows`: k-means assignment of rows to clusters.
//! - `AnalyticsEngine` / `AnalysisReport`: the whole pipeline and its output.

// Declare the modules that constitute this crate.
pub mod clustering;
pub mod derived;
pub mod engine;
pub mod error;
pub mod forecast;
pub mod report;

// Re-export the key components to create a clean, public-facing API.
pub use clustering::cluster_rows;
pub use derived::{DerivedMetrics, derive_metrics, pct_change, ratio_pct};
pub use engine::AnalyticsEngine;
pub use error::AnalyticsError;
pub use forecast::{ExponentialSmoothing, FittedModel, SmoothingMethod, SmoothingParams};
pub use report::{AnalysisReport, ForecastPoint, ForecastSeries, ReportRow};
