use analytics::{AnalysisReport, ReportRow};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::ops::Range;

/// The report's columns, converted to plottable `f64` values.
///
/// Rows are plotted at x = 0, 1, 2, ...; forecast points continue the
/// sequence after the last row.
#[derive(Debug, Clone, Default)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub forecast_labels: Vec<String>,
    pub revenues: Vec<Option<f64>>,
    pub shop_counts: Vec<Option<f64>>,
    pub auvs: Vec<Option<f64>>,
    pub revenue_growth: Vec<Option<f64>>,
    pub growth_forecast: Vec<f64>,
    pub cost_of_sales_pct: Vec<Option<f64>>,
    pub sga_pct: Vec<Option<f64>>,
    pub net_income_margin: Vec<Option<f64>>,
}

impl ChartData {
    pub fn from_report(report: &AnalysisReport) -> Self {
        let rows = &report.rows;

        Self {
            labels: rows.iter().map(|r| r.record.period.to_string()).collect(),
            forecast_labels: report
                .growth_forecast
                .points
                .iter()
                .map(|p| p.period.to_string())
                .collect(),
            revenues: column(rows, |r| Some(r.record.total_revenues)),
            shop_counts: column(rows, |r| Some(Decimal::from(r.record.shop_count))),
            auvs: column(rows, |r| Some(r.record.systemwide_auv)),
            revenue_growth: column(rows, |r| r.metrics.revenue_growth),
            growth_forecast: report.growth_forecast.points.iter().map(|p| p.value).collect(),
            cost_of_sales_pct: column(rows, |r| r.metrics.cost_of_sales_pct),
            sga_pct: column(rows, |r| r.metrics.sga_pct),
            net_income_margin: column(rows, |r| r.metrics.net_income_margin),
        }
    }

    /// Number of x positions, rows and forecast points together.
    pub fn span(&self, with_forecast: bool) -> usize {
        if with_forecast {
            self.labels.len() + self.forecast_labels.len()
        } else {
            self.labels.len()
        }
    }

    /// Axis label for an x position; blank between whole positions.
    pub fn label_at(&self, x: f64) -> String {
        let rounded = x.round();
        if (x - rounded).abs() > 1e-6 || rounded < 0.0 {
            return String::new();
        }
        let index = rounded as usize;
        self.labels
            .iter()
            .chain(self.forecast_labels.iter())
            .nth(index)
            .cloned()
            .unwrap_or_default()
    }

    /// Forecast points positioned after the last row.
    pub fn forecast_points(&self) -> Vec<(f64, f64)> {
        let offset = self.labels.len();
        self.growth_forecast
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_finite())
            .map(|(i, v)| ((offset + i) as f64, *v))
            .collect()
    }
}

fn column<F>(rows: &[ReportRow], accessor: F) -> Vec<Option<f64>>
where
    F: Fn(&ReportRow) -> Option<Decimal>,
{
    rows.iter().map(|r| accessor(r).and_then(|d| d.to_f64())).collect()
}

/// Positions the defined values of a column at their row index.
pub fn points(values: &[Option<f64>]) -> Vec<(f64, f64)> {
    values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.filter(|v| v.is_finite()).map(|v| (i as f64, v)))
        .collect()
}

/// X range with half a slot of margin around `count` positions.
pub fn x_range(count: usize) -> Range<f64> {
    -0.5..(count.max(1) as f64 - 0.5)
}

/// Y range covering every value with 10% headroom on both sides.
pub fn padded_range<I>(values: I) -> Range<f64>
where
    I: IntoIterator<Item = f64>,
{
    let (min, max) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), v| {
            (min.min(v), max.max(v))
        });

    if !min.is_finite() || !max.is_finite() {
        return 0.0..1.0;
    }
    let spread = max - min;
    let pad = if spread > 0.0 {
        spread * 0.1
    } else {
        (max.abs() * 0.1).max(1.0)
    };
    (min - pad)..(max + pad)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_skip_undefined_values() {
        let pts = points(&[None, Some(2.0), Some(f64::NAN), Some(4.0)]);
        assert_eq!(pts, vec![(1.0, 2.0), (3.0, 4.0)]);
    }

    #[test]
    fn padded_range_covers_values() {
        let range = padded_range([10.0, 20.0]);
        assert!(range.start < 10.0 && range.end > 20.0);
        assert!((range.start - 9.0).abs() < 1e-9);
        assert!((range.end - 21.0).abs() < 1e-9);
    }

    #[test]
    fn padded_range_handles_flat_and_empty_input() {
        let flat = padded_range([5.0, 5.0]);
        assert!(flat.start < 5.0 && flat.end > 5.0);
        assert_eq!(padded_range(std::iter::empty()), 0.0..1.0);
    }

    #[test]
    fn labels_cover_rows_and_forecast() {
        let data = ChartData {
            labels: vec!["2022".to_string(), "2023_9M".to_string()],
            forecast_labels: vec!["2024".to_string()],
            growth_forecast: vec![3.5],
            ..ChartData::default()
        };
        assert_eq!(data.label_at(0.0), "2022");
        assert_eq!(data.label_at(2.0), "2024");
        assert_eq!(data.label_at(0.5), "");
        assert_eq!(data.label_at(7.0), "");
        assert_eq!(data.span(true), 3);
        assert_eq!(data.forecast_points(), vec![(2.0, 3.5)]);
    }
}
