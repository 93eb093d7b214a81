//! Error types for fuel metering.

use thiserror::Error;

/// Errors reported by the fuel meter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FuelError {
    /// The run burned more fuel than its limit.
    #[error("Fuel exhausted in {operation}: burned {burned}, limit {limit}")]
    Exhausted {
        /// Burn operation that crossed the limit.
        operation: &'static str,
        /// Total fuel burned at that point.
        burned: u64,
        /// The run's fuel limit.
        limit: u64,
    },

    /// `start` was called on a meter that is already running.
    #[error("Fuel meter already started")]
    AlreadyStarted,

    /// A burn was attempted before `start`.
    #[error("Fuel meter not started")]
    NotStarted,
}

impl FuelError {
    /// Create an exhausted error.
    pub fn exhausted(operation: &'static str, burned: u64, limit: u64) -> Self {
        Self::Exhausted {
            operation,
            burned,
            limit,
        }
    }

    /// Returns true if this error is the resource-limit abort.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }
}

/// Result type for fuel operations.
pub type FuelResult<T> = std::result::Result<T, FuelError>;
