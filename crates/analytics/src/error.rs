use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Not enough data to perform calculation: {0}")]
    NotEnoughData(String),

    #[error("Invalid parameter '{0}': {1}")]
    InvalidParameter(String, String),

    #[error("Failed to convert {0} to a floating-point value")]
    Conversion(String),

    #[error("Model fitting failed: {0}")]
    ModelFit(String),

    #[error("Error in calculation: {0}")]
    Calculation(String),
}
