use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{ChartFormat, ChartSettings, ClusteringSettings, Config, ForecastSettings};

/// Prefix for environment overrides, e.g. `SHOPLENS__CLUSTERING__K=2`.
pub const ENV_PREFIX: &str = "SHOPLENS";

/// Loads the application configuration.
///
/// The TOML file at `path` is optional. Environment variables prefixed with
/// `SHOPLENS__` are layered on top, and anything left unset takes its default.
/// The result is validated before it is returned.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "No configuration file found, using defaults.");
    }

    let builder = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    Ok(config)
}

impl Config {
    /// Rejects settings that no stage of the pipeline can run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: &'static str, reason: String| -> Result<(), ConfigError> {
            Err(ConfigError::Invalid { field, reason })
        };

        if self.forecast.horizon == 0 {
            return invalid("forecast.horizon", "must be at least 1".to_string());
        }
        if self.forecast.seasonal_periods < 2 {
            return invalid(
                "forecast.seasonal_periods",
                format!("must be at least 2, got {}", self.forecast.seasonal_periods),
            );
        }
        if !(self.forecast.grid_step > 0.0 && self.forecast.grid_step <= 0.5) {
            return invalid(
                "forecast.grid_step",
                format!("must be within (0, 0.5], got {}", self.forecast.grid_step),
            );
        }
        if self.clustering.k == 0 {
            return invalid("clustering.k", "must be at least 1".to_string());
        }
        if self.clustering.max_iter == 0 {
            return invalid("clustering.max_iter", "must be at least 1".to_string());
        }
        if self.charts.width == 0 || self.charts.height == 0 {
            return invalid(
                "charts.width/height",
                format!("must be non-zero, got {}x{}", self.charts.width, self.charts.height),
            );
        }
        if self.records.as_ref().is_some_and(|records| records.is_empty()) {
            return invalid("records", "must contain at least one entry when given".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.forecast.seasonal_periods, 4);
        assert_eq!(config.clustering.k, 3);
        assert_eq!(config.charts.format, ChartFormat::Png);
        assert!(config.records.is_none());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = load_config(Path::new("does-not-exist/shoplens.toml")).unwrap();
        assert_eq!(config.forecast.horizon, 2);
        assert_eq!(config.charts.width, 1200);
    }

    #[test]
    fn rejects_zero_horizon() {
        let mut config = Config::default();
        config.forecast.horizon = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "forecast.horizon", .. })
        ));
    }

    #[test]
    fn rejects_out_of_range_grid_step() {
        let mut config = Config::default();
        config.forecast.grid_step = 0.75;
        assert!(config.validate().is_err());
        config.forecast.grid_step = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_clusters() {
        let mut config = Config::default();
        config.clustering.k = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_empty_records_list() {
        let config = Config {
            records: Some(Vec::new()),
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "records", .. })
        ));
    }

    #[test]
    fn environment_overrides_file_defaults() {
        // SAFETY: no other test in this crate reads or writes this variable.
        unsafe { std::env::set_var("SHOPLENS__CLUSTERING__K", "2") };
        let loaded = load_config(Path::new("does-not-exist/env-override.toml"));
        unsafe { std::env::remove_var("SHOPLENS__CLUSTERING__K") };

        let config = loaded.unwrap();
        assert_eq!(config.clustering.k, 2);
        assert_eq!(config.clustering.max_iter, 100);
    }

    #[test]
    fn parses_toml_sections_and_records() {
        let toml = r#"
            [clustering]
            k = 2
            standardize = true

            [charts]
            format = "svg"

            [[records]]
            period = "2024"
            total_revenues = 100.5
            company_operated_revenue = 80
            franchising_and_other_revenue = 20.5
            total_costs_and_expenses = 90
            net_income_loss = -3
            shop_count = 12
            systemwide_auv = 1500
            same_shop_sales_growth = 1.5
        "#;
        let config: Config = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.clustering.k, 2);
        assert!(config.clustering.standardize);
        assert_eq!(config.clustering.max_iter, 100);
        assert_eq!(config.charts.format, ChartFormat::Svg);
        let records = config.records.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].period.to_string(), "2024");
        assert_eq!(records[0].shop_count, 12);
    }
}
