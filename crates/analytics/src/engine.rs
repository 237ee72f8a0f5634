use crate::clustering::cluster_rows;
use crate::derived::{DerivedMetrics, derive_metrics};
use crate::error::AnalyticsError;
use crate::forecast::ExponentialSmoothing;
use crate::report::{AnalysisReport, ForecastPoint, ForecastSeries, ReportRow};
use chrono::Utc;
use configuration::{ClusteringSettings, ForecastSettings};
use core_types::{FinancialTable, FiscalPeriod};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// A stateless calculator that turns a financial table into an
/// `AnalysisReport`.
#[derive(Debug, Clone, Default)]
pub struct AnalyticsEngine {
    forecast: ForecastSettings,
    clustering: ClusteringSettings,
}

impl AnalyticsEngine {
    pub fn new(forecast: ForecastSettings, clustering: ClusteringSettings) -> Self {
        Self {
            forecast,
            clustering,
        }
    }

    /// The main entry point: derived columns, both forecasts and clustering.
    ///
    /// # Arguments
    ///
    /// * `table` - The financial records, oldest period first.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `AnalysisReport` or an `AnalyticsError`.
    pub fn analyze(&self, table: &FinancialTable) -> Result<AnalysisReport, AnalyticsError> {
        let clusters = self.cluster(table)?;
        self.build_report(table, Some(clusters))
    }

    /// Derived columns and both forecasts, leaving every row's cluster unset.
    ///
    /// Used where the cluster labels are not needed, so a `clustering.k`
    /// larger than the table does not fail the run.
    pub fn analyze_unclustered(
        &self,
        table: &FinancialTable,
    ) -> Result<AnalysisReport, AnalyticsError> {
        self.build_report(table, None)
    }

    fn build_report(
        &self,
        table: &FinancialTable,
        clusters: Option<Vec<usize>>,
    ) -> Result<AnalysisReport, AnalyticsError> {
        tracing::info!(rows = table.len(), "Computing derived metrics.");
        let metrics = derive_metrics(table);

        let revenue_forecast = self.forecast_revenue(table)?;
        let growth_forecast = self.forecast_growth(table, &metrics)?;

        let labels: Vec<Option<usize>> = match clusters {
            Some(clusters) => clusters.into_iter().map(Some).collect(),
            None => vec![None; table.len()],
        };
        let rows = table
            .records()
            .iter()
            .cloned()
            .zip(metrics)
            .zip(labels)
            .map(|((record, metrics), cluster)| ReportRow {
                record,
                metrics,
                cluster,
            })
            .collect();

        Ok(AnalysisReport {
            generated_at: Utc::now(),
            rows,
            revenue_forecast,
            growth_forecast,
        })
    }

    /// Total revenues, one period past the end of the table.
    pub fn forecast_revenue(&self, table: &FinancialTable) -> Result<ForecastSeries, AnalyticsError> {
        tracing::info!("Fitting revenue forecast.");
        let series = to_f64_series(&table.revenues(), "total revenues")?;
        self.forecast_series(&series, table.last_period(), 1)
    }

    /// Revenue growth over the rows where it is defined, `horizon` periods
    /// past the end of the table.
    pub fn forecast_growth(
        &self,
        table: &FinancialTable,
        metrics: &[DerivedMetrics],
    ) -> Result<ForecastSeries, AnalyticsError> {
        tracing::info!(horizon = self.forecast.horizon, "Fitting revenue growth forecast.");
        let growth: Vec<Decimal> = metrics.iter().filter_map(|m| m.revenue_growth).collect();
        let series = to_f64_series(&growth, "revenue growth")?;
        self.forecast_series(&series, table.last_period(), self.forecast.horizon)
    }

    /// Cluster labels over (systemwide AUV, same-shop sales growth).
    pub fn cluster(&self, table: &FinancialTable) -> Result<Vec<usize>, AnalyticsError> {
        tracing::info!(k = self.clustering.k, "Clustering shop performance.");
        let auvs = to_f64_series(&table.auvs(), "systemwide AUV")?;
        let growth = to_f64_series(&table.same_shop_sales_growth(), "same-shop sales growth")?;
        let features: Vec<Vec<f64>> = auvs
            .into_iter()
            .zip(growth)
            .map(|(auv, growth)| vec![auv, growth])
            .collect();
        cluster_rows(&features, &self.clustering)
    }

    fn forecast_series(
        &self,
        series: &[f64],
        last_period: FiscalPeriod,
        horizon: usize,
    ) -> Result<ForecastSeries, AnalyticsError> {
        let model = ExponentialSmoothing::new(&self.forecast).fit(series)?;

        let mut period = last_period;
        let points = model
            .forecast(horizon)
            .into_iter()
            .map(|value| {
                period = period.next();
                ForecastPoint { period, value }
            })
            .collect();

        Ok(ForecastSeries {
            method: model.method(),
            params: model.params(),
            points,
        })
    }
}

fn to_f64_series(values: &[Decimal], name: &str) -> Result<Vec<f64>, AnalyticsError> {
    values
        .iter()
        .map(|v| v.to_f64().ok_or_else(|| AnalyticsError::Conversion(format!("{} value {}", name, v))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::SmoothingMethod;
    use core_types::reference_dataset;

    #[test]
    fn analyzes_reference_dataset() {
        let report = AnalyticsEngine::default().analyze(&reference_dataset()).unwrap();

        assert_eq!(report.rows.len(), 4);
        assert!(report.rows.iter().all(|r| r.cluster.is_some_and(|c| c < 3)));

        assert_eq!(report.revenue_forecast.points.len(), 1);
        assert_eq!(report.revenue_forecast.points[0].period.to_string(), "2024");
        assert!(report.revenue_forecast.points[0].value.is_finite());

        let growth_periods: Vec<String> = report
            .growth_forecast
            .points
            .iter()
            .map(|p| p.period.to_string())
            .collect();
        assert_eq!(growth_periods, vec!["2024", "2025"]);
        // Three defined growth values are not enough for a seasonal fit.
        assert_eq!(report.growth_forecast.method, SmoothingMethod::HoltLinear);
    }

    #[test]
    fn horizon_controls_growth_points() {
        let forecast = ForecastSettings {
            horizon: 4,
            ..ForecastSettings::default()
        };
        let engine = AnalyticsEngine::new(forecast, ClusteringSettings::default());
        let table = reference_dataset();
        let metrics = derive_metrics(&table);
        let series = engine.forecast_growth(&table, &metrics).unwrap();
        assert_eq!(series.points.len(), 4);
    }

    #[test]
    fn single_row_table_cannot_be_forecast() {
        let first = reference_dataset().records()[0].clone();
        let table = FinancialTable::new(vec![first]).unwrap();
        assert!(matches!(
            AnalyticsEngine::default().analyze(&table),
            Err(AnalyticsError::NotEnoughData(_))
        ));
    }

    #[test]
    fn unclustered_report_ignores_oversized_k() {
        let clustering = ClusteringSettings {
            k: 10,
            ..ClusteringSettings::default()
        };
        let engine = AnalyticsEngine::new(ForecastSettings::default(), clustering);
        let table = reference_dataset();

        assert!(matches!(
            engine.analyze(&table),
            Err(AnalyticsError::InvalidParameter(_, _))
        ));

        let report = engine.analyze_unclustered(&table).unwrap();
        assert_eq!(report.rows.len(), 4);
        assert!(report.rows.iter().all(|r| r.cluster.is_none()));
        assert_eq!(report.growth_forecast.points.len(), 2);

        let json = serde_json::to_value(&report).unwrap();
        assert!(json["rows"][0].get("cluster").is_none());
    }

    #[test]
    fn report_serializes_to_json() {
        let report = AnalyticsEngine::default().analyze(&reference_dataset()).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["rows"][3]["period"], "2023_9M");
        assert!(json["rows"][0]["revenue_growth"].is_null());
        assert_eq!(json["growth_forecast"]["method"], "holt_linear");
    }
}
