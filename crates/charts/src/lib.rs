//! Chart rendering for an `AnalysisReport`.
//!
//! Each chart is written to its own file in the configured output directory,
//! as PNG or SVG.

pub mod draw;
pub mod error;
pub mod series;

pub use error::ChartError;
pub use series::ChartData;

use analytics::AnalysisReport;
use configuration::{ChartFormat, ChartSettings};
use draw::DrawResult;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::{Path, PathBuf};

/// The charts produced for every report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Overview,
    RevenueGrowth,
    AuvTrend,
    GrowthForecast,
    OperationalEfficiency,
}

impl ChartKind {
    pub const ALL: [ChartKind; 5] = [
        ChartKind::Overview,
        ChartKind::RevenueGrowth,
        ChartKind::AuvTrend,
        ChartKind::GrowthForecast,
        ChartKind::OperationalEfficiency,
    ];

    pub fn file_stem(&self) -> &'static str {
        match self {
            ChartKind::Overview => "overview",
            ChartKind::RevenueGrowth => "revenue_growth",
            ChartKind::AuvTrend => "auv_trend",
            ChartKind::GrowthForecast => "growth_forecast",
            ChartKind::OperationalEfficiency => "operational_efficiency",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ChartKind::Overview => "Dutch Bros Inc. Financial & Operational Overview",
            ChartKind::RevenueGrowth => "Yearly Revenue Growth Trend",
            ChartKind::AuvTrend => "Systemwide Average Unit Volume (AUV) Trend",
            ChartKind::GrowthForecast => "Yearly Revenue Growth Trend with Forecast",
            ChartKind::OperationalEfficiency => "Operational Efficiency Metrics Over Time",
        }
    }

    /// Where this chart lands for the given settings.
    pub fn output_path(&self, settings: &ChartSettings) -> PathBuf {
        settings
            .output_dir
            .join(format!("{}.{}", self.file_stem(), settings.format.extension()))
    }

    fn draw<DB>(&self, root: &DrawingArea<DB, Shift>, data: &ChartData) -> DrawResult<DB>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        match self {
            ChartKind::Overview => draw::draw_overview(root, data, self.title()),
            ChartKind::RevenueGrowth => draw::draw_trend(
                root,
                data,
                &data.revenue_growth,
                draw::TAB_BLUE,
                self.title(),
                "Revenue Growth (%)",
                "Revenue Growth (%)",
            ),
            ChartKind::AuvTrend => draw::draw_trend(
                root,
                data,
                &data.auvs,
                draw::TAB_ORANGE,
                self.title(),
                "Systemwide AUV",
                "AUV ($ thousands)",
            ),
            ChartKind::GrowthForecast => draw::draw_growth_forecast(root, data, self.title()),
            ChartKind::OperationalEfficiency => {
                draw::draw_operational_efficiency(root, data, self.title())
            }
        }
    }
}

/// Renders every chart and returns the written paths, in `ChartKind::ALL`
/// order. The output directory is created when missing.
pub fn render_all(report: &AnalysisReport, settings: &ChartSettings) -> Result<Vec<PathBuf>, ChartError> {
    std::fs::create_dir_all(&settings.output_dir).map_err(|source| ChartError::OutputDir {
        path: settings.output_dir.clone(),
        source,
    })?;

    let data = ChartData::from_report(report);
    let mut written = Vec::with_capacity(ChartKind::ALL.len());

    for kind in ChartKind::ALL {
        let path = kind.output_path(settings);
        render_one(kind, &data, &path, settings)?;
        tracing::info!(chart = kind.file_stem(), path = %path.display(), "Chart written.");
        written.push(path);
    }

    Ok(written)
}

fn render_one(
    kind: ChartKind,
    data: &ChartData,
    path: &Path,
    settings: &ChartSettings,
) -> Result<(), ChartError> {
    let size = (settings.width, settings.height);
    let render_err = |message: String| ChartError::Render {
        path: path.to_path_buf(),
        message,
    };

    match settings.format {
        ChartFormat::Png => {
            let root = BitMapBackend::new(path, size).into_drawing_area();
            kind.draw(&root, data).map_err(|e| render_err(e.to_string()))
        }
        ChartFormat::Svg => {
            let root = SVGBackend::new(path, size).into_drawing_area();
            kind.draw(&root, data).map_err(|e| render_err(e.to_string()))
        }
    }
}
