pub mod dataset;
pub mod error;
pub mod period;
pub mod record;

// Re-export the core types to provide a clean public API.
pub use dataset::reference_dataset;
pub use error::CoreError;
pub use period::FiscalPeriod;
pub use record::{FinancialRecord, FinancialTable};
