pub mod enums;
pub mod error;
pub mod state;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{SeriesOrigin, SeriesRole, ValueUnit};
pub use error::CoreError;
pub use state::{Metric, SeriesState};
pub use structs::{DatedValue, MonthlyReturn, Period, Series};
