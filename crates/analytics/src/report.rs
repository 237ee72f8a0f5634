use crate::derived::DerivedMetrics;
use crate::forecast::{SmoothingMethod, SmoothingParams};
use chrono::{DateTime, Utc};
use core_types::{FinancialRecord, FiscalPeriod};
use serde::{Deserialize, Serialize};

/// The full result of one analysis run.
///
/// This struct is the final output of the `AnalyticsEngine` and the input of
/// both the console output and the chart renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub generated_at: DateTime<Utc>,
    pub rows: Vec<ReportRow>,
    /// Total revenues, one period ahead.
    pub revenue_forecast: ForecastSeries,
    /// Revenue growth (%), `horizon` periods ahead.
    pub growth_forecast: ForecastSeries,
}

/// A source record with its derived columns and, when clustering ran, its
/// cluster label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    #[serde(flatten)]
    pub record: FinancialRecord,
    #[serde(flatten)]
    pub metrics: DerivedMetrics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSeries {
    pub method: SmoothingMethod,
    pub params: SmoothingParams,
    pub points: Vec<ForecastPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub period: FiscalPeriod,
    pub value: f64,
}

impl AnalysisReport {
    pub fn periods(&self) -> Vec<FiscalPeriod> {
        self.rows.iter().map(|r| r.record.period).collect()
    }
}
