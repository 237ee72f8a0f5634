use crate::error::AnalyticsError;
use configuration::ForecastSettings;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which exponential-smoothing variant a model was fitted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmoothingMethod {
    /// Additive trend and additive season (Holt-Winters).
    HoltWintersAdditive,
    /// Additive trend only (Holt's linear method).
    HoltLinear,
}

impl fmt::Display for SmoothingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SmoothingMethod::HoltWintersAdditive => f.write_str("Holt-Winters (additive)"),
            SmoothingMethod::HoltLinear => f.write_str("Holt linear trend"),
        }
    }
}

/// Smoothing weights chosen by the fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SmoothingParams {
    pub alpha: f64,
    pub beta: f64,
    /// Seasonal weight; absent for non-seasonal fits.
    pub gamma: Option<f64>,
}

/// Additive exponential smoothing with a grid-searched parameter fit.
#[derive(Debug, Clone)]
pub struct ExponentialSmoothing {
    seasonal_periods: usize,
    grid_step: f64,
}

/// The state of a fitted model at the end of its series.
#[derive(Debug, Clone)]
pub struct FittedModel {
    method: SmoothingMethod,
    params: SmoothingParams,
    level: f64,
    trend: f64,
    /// Seasonal components indexed by `t % m`; empty for non-seasonal fits.
    seasonals: Vec<f64>,
    observations: usize,
    sse: f64,
}

impl ExponentialSmoothing {
    pub fn new(settings: &ForecastSettings) -> Self {
        Self {
            seasonal_periods: settings.seasonal_periods,
            grid_step: settings.grid_step,
        }
    }

    /// Fits the series and returns the model state after its last observation.
    ///
    /// A seasonal model needs two full cycles to initialise its components;
    /// shorter series are fitted with Holt's linear trend instead.
    pub fn fit(&self, series: &[f64]) -> Result<FittedModel, AnalyticsError> {
        if series.len() < 2 {
            return Err(AnalyticsError::NotEnoughData(format!(
                "exponential smoothing needs at least 2 observations, got {}",
                series.len()
            )));
        }
        if let Some(bad) = series.iter().find(|v| !v.is_finite()) {
            return Err(AnalyticsError::Calculation(format!(
                "series contains a non-finite value ({})",
                bad
            )));
        }
        if !(self.grid_step > 0.0 && self.grid_step <= 0.5) {
            return Err(AnalyticsError::InvalidParameter(
                "grid_step".to_string(),
                format!("must be within (0, 0.5], got {}", self.grid_step),
            ));
        }

        let m = self.seasonal_periods;
        let model = if m >= 2 && series.len() >= 2 * m {
            self.fit_holt_winters(series)
        } else {
            tracing::warn!(
                observations = series.len(),
                seasonal_periods = m,
                "Series is shorter than two seasonal cycles; falling back to Holt's linear trend."
            );
            self.fit_holt_linear(series)
        };

        tracing::debug!(
            method = %model.method,
            alpha = model.params.alpha,
            beta = model.params.beta,
            gamma = ?model.params.gamma,
            sse = model.sse,
            "Exponential smoothing fitted."
        );

        Ok(model)
    }

    fn grid(&self) -> Vec<f64> {
        (1..)
            .map(|k| k as f64 * self.grid_step)
            .take_while(|v| *v < 1.0 - 1e-9)
            .collect()
    }

    fn fit_holt_linear(&self, series: &[f64]) -> FittedModel {
        let grid = self.grid();
        let mut best: Option<FittedModel> = None;

        for &alpha in &grid {
            for &beta in &grid {
                let params = SmoothingParams {
                    alpha,
                    beta,
                    gamma: None,
                };
                let candidate = run_holt_linear(series, params);
                if best.as_ref().is_none_or(|b| candidate.sse < b.sse) {
                    best = Some(candidate);
                }
            }
        }

        // The grid always holds at least one value for a step within (0, 0.5].
        best.unwrap_or_else(|| {
            run_holt_linear(
                series,
                SmoothingParams {
                    alpha: 0.5,
                    beta: 0.5,
                    gamma: None,
                },
            )
        })
    }

    fn fit_holt_winters(&self, series: &[f64]) -> FittedModel {
        let m = self.seasonal_periods;
        let grid = self.grid();
        let mut best: Option<FittedModel> = None;

        for &alpha in &grid {
            for &beta in &grid {
                for &gamma in &grid {
                    let params = SmoothingParams {
                        alpha,
                        beta,
                        gamma: Some(gamma),
                    };
                    let candidate = run_holt_winters(series, m, params);
                    if best.as_ref().is_none_or(|b| candidate.sse < b.sse) {
                        best = Some(candidate);
                    }
                }
            }
        }

        best.unwrap_or_else(|| {
            run_holt_winters(
                series,
                m,
                SmoothingParams {
                    alpha: 0.5,
                    beta: 0.5,
                    gamma: Some(0.5),
                },
            )
        })
    }
}

impl FittedModel {
    /// Predicts the next `horizon` periods. Always returns `horizon` values.
    pub fn forecast(&self, horizon: usize) -> Vec<f64> {
        (1..=horizon)
            .map(|h| {
                let seasonal = if self.seasonals.is_empty() {
                    0.0
                } else {
                    self.seasonals[(self.observations + h - 1) % self.seasonals.len()]
                };
                self.level + h as f64 * self.trend + seasonal
            })
            .collect()
    }

    pub fn method(&self) -> SmoothingMethod {
        self.method
    }

    pub fn params(&self) -> SmoothingParams {
        self.params
    }

    /// Sum of squared one-step-ahead errors over the fitted series.
    pub fn sse(&self) -> f64 {
        self.sse
    }
}

/// Runs Holt's linear recursion with the pre-sample state chosen so that the
/// first one-step prediction equals the first observation.
fn run_holt_linear(series: &[f64], params: SmoothingParams) -> FittedModel {
    let SmoothingParams { alpha, beta, .. } = params;
    let mut trend = series[1] - series[0];
    let mut level = series[0] - trend;
    let mut sse = 0.0;

    for &y in series {
        let predicted = level + trend;
        sse += (y - predicted).powi(2);

        let prev_level = level;
        level = alpha * y + (1.0 - alpha) * (level + trend);
        trend = beta * (level - prev_level) + (1.0 - beta) * trend;
    }

    FittedModel {
        method: SmoothingMethod::HoltLinear,
        params,
        level,
        trend,
        seasonals: Vec::new(),
        observations: series.len(),
        sse,
    }
}

/// Runs the additive Holt-Winters recursion.
///
/// Initial level and trend come from the means of the first two cycles; the
/// seasonal components are the first cycle's deviations from that trend line.
fn run_holt_winters(series: &[f64], m: usize, params: SmoothingParams) -> FittedModel {
    let SmoothingParams { alpha, beta, gamma } = params;
    let gamma = gamma.unwrap_or(0.0);

    let mean = |values: &[f64]| values.iter().sum::<f64>() / values.len() as f64;
    let first_cycle = mean(&series[..m]);
    let second_cycle = mean(&series[m..2 * m]);

    let mut trend = (second_cycle - first_cycle) / m as f64;
    // `first_cycle` is the level at the middle of the first cycle.
    let centre = (m as f64 - 1.0) / 2.0;
    let mut seasonals: Vec<f64> = series[..m]
        .iter()
        .enumerate()
        .map(|(i, y)| y - (first_cycle + (i as f64 - centre) * trend))
        .collect();
    let mut level = first_cycle - (centre + 1.0) * trend;
    let mut sse = 0.0;

    for (t, &y) in series.iter().enumerate() {
        let slot = t % m;
        let seasonal = seasonals[slot];
        let predicted = level + trend + seasonal;
        sse += (y - predicted).powi(2);

        let prev_level = level;
        level = alpha * (y - seasonal) + (1.0 - alpha) * (level + trend);
        trend = beta * (level - prev_level) + (1.0 - beta) * trend;
        seasonals[slot] = gamma * (y - level) + (1.0 - gamma) * seasonal;
    }

    FittedModel {
        method: SmoothingMethod::HoltWintersAdditive,
        params,
        level,
        trend,
        seasonals,
        observations: series.len(),
        sse,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn smoother() -> ExponentialSmoothing {
        ExponentialSmoothing::new(&ForecastSettings::default())
    }

    #[test]
    fn forecast_length_matches_horizon() {
        let model = smoother().fit(&[327413.0, 497876.0, 739012.0, 711653.0]).unwrap();
        for horizon in 0..5 {
            assert_eq!(model.forecast(horizon).len(), horizon);
        }
    }

    #[test]
    fn short_series_falls_back_to_holt_linear() {
        let model = smoother().fit(&[1.0, 2.0, 4.0, 3.0]).unwrap();
        assert_eq!(model.method(), SmoothingMethod::HoltLinear);
        assert!(model.params().gamma.is_none());
    }

    #[test]
    fn linear_series_is_extrapolated() {
        let model = smoother().fit(&[10.0, 20.0, 30.0, 40.0]).unwrap();
        let forecast = model.forecast(2);
        assert!((forecast[0] - 50.0).abs() < 1e-9, "got {:?}", forecast);
        assert!((forecast[1] - 60.0).abs() < 1e-9, "got {:?}", forecast);
        assert!(model.sse() < 1e-9);
    }

    #[test]
    fn seasonal_series_uses_holt_winters() {
        let pattern = [5.0, -5.0, 10.0, -10.0];
        let series: Vec<f64> = (0..8)
            .map(|t| 100.0 + 10.0 * t as f64 + pattern[t % 4])
            .collect();

        let model = smoother().fit(&series).unwrap();
        assert_eq!(model.method(), SmoothingMethod::HoltWintersAdditive);

        let forecast = model.forecast(4);
        let expected: Vec<f64> = (8..12)
            .map(|t| 100.0 + 10.0 * t as f64 + pattern[t % 4])
            .collect();
        for (got, want) in forecast.iter().zip(&expected) {
            assert!((got - want).abs() < 1e-6, "got {:?}, want {:?}", forecast, expected);
        }
    }

    #[test]
    fn rejects_too_few_observations() {
        assert!(matches!(
            smoother().fit(&[1.0]),
            Err(AnalyticsError::NotEnoughData(_))
        ));
    }

    #[test]
    fn rejects_non_finite_values() {
        assert!(matches!(
            smoother().fit(&[1.0, f64::NAN, 3.0]),
            Err(AnalyticsError::Calculation(_))
        ));
    }

    #[test]
    fn grid_excludes_bounds() {
        let grid = smoother().grid();
        assert_eq!(grid.len(), 19);
        assert!(grid.iter().all(|v| *v > 0.0 && *v < 1.0));
    }
}
