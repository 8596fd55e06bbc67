//! Error types for fleetpulse-forecast

use thiserror::Error;

use fleetpulse_store::StoreError;

/// Errors that can occur while generating or persisting forecasts.
///
/// Data-unavailable conditions on the read path never surface here; the
/// engine degrades to empty/default results instead (see module docs).
/// Only invalid input and snapshot write failures are raised.
#[derive(Error, Debug)]
pub enum ForecastError {
    /// The requested forecast horizon is not a positive day count
    #[error("Forecast horizon must be at least 1 day, got {days}")]
    InvalidDays { days: u32 },

    /// A snapshot write failed
    #[error(transparent)]
    Store(#[from] StoreError),
}
