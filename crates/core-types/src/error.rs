use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),

    #[error("Financial table must contain at least one record")]
    EmptyTable,

    #[error("Duplicate fiscal period '{0}' in financial table")]
    DuplicatePeriod(String),

    #[error("Fiscal period '{next}' follows '{previous}'; records must be ordered oldest first")]
    UnorderedPeriods { previous: String, next: String },
}
