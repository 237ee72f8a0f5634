use core_types::FinancialRecord;
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
///
/// Every section falls back to its defaults, so an absent `config.toml` is a
/// valid configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub forecast: ForecastSettings,
    #[serde(default)]
    pub clustering: ClusteringSettings,
    #[serde(default)]
    pub charts: ChartSettings,
    /// Replaces the built-in data set when present.
    #[serde(default)]
    pub records: Option<Vec<FinancialRecord>>,
}

/// Parameters for the exponential-smoothing forecasts.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ForecastSettings {
    /// Length of one seasonal cycle, in periods.
    pub seasonal_periods: usize,
    /// Number of periods to forecast for the revenue-growth series.
    pub horizon: usize,
    /// Spacing of the smoothing-parameter grid search.
    pub grid_step: f64,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            seasonal_periods: 4,
            horizon: 2,
            grid_step: 0.05,
        }
    }
}

/// Parameters for the k-means pass over the shop-performance features.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClusteringSettings {
    pub k: usize,
    pub max_iter: usize,
    /// Z-score each feature before fitting. Off by default, so AUV dominates
    /// the distance the same way it does in raw units.
    pub standardize: bool,
}

impl Default for ClusteringSettings {
    fn default() -> Self {
        Self {
            k: 3,
            max_iter: 100,
            standardize: false,
        }
    }
}

/// Output options for the rendered charts.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChartSettings {
    pub output_dir: PathBuf,
    pub format: ChartFormat,
    pub width: u32,
    pub height: u32,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("charts"),
            format: ChartFormat::Png,
            width: 1200,
            height: 600,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum ChartFormat {
    #[default]
    Png,
    Svg,
}

impl ChartFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ChartFormat::Png => "png",
            ChartFormat::Svg => "svg",
        }
    }
}

impl fmt::Display for ChartFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
