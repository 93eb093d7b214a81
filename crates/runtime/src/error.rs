//! Error types for contract execution.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use sandbox_accounts::AccountError;
use sandbox_fuel::FuelError;

/// Errors that can end a host call or a run.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecError {
    /// Malformed host-call input. Fails only the call.
    #[error("Invalid parameter: {message}")]
    Param {
        /// Error message.
        message: String,
    },

    /// An accounting sum or difference would wrap.
    #[error("Arithmetic overflow: {message}")]
    ArithmeticOverflow {
        /// Error message.
        message: String,
    },

    /// The run burned more than its fuel limit.
    #[error("Fuel exhausted: burned {burned}, limit {limit}")]
    FuelExhausted {
        /// Fuel burned when the limit was crossed.
        burned: u64,
        /// The run's fuel limit.
        limit: u64,
    },

    /// A debit exceeds the available free, frozen or native balance.
    #[error("Insufficient balance: {message}")]
    InsufficientBalance {
        /// Error message.
        message: String,
    },

    /// Recorded effects do not conserve value.
    #[error("Invariant violation: {message}")]
    InvariantViolation {
        /// Error message.
        message: String,
    },

    /// The code blob cannot be run.
    #[error("Malformed bytecode: {message}")]
    MalformedBytecode {
        /// Error message.
        message: String,
    },

    /// Code or arguments exceed their size bound.
    #[error("Oversized {what}: {size} bytes, limit {limit}")]
    OversizedInput {
        /// Which input.
        what: String,
        /// Actual size.
        size: usize,
        /// Size bound.
        limit: usize,
    },

    /// The interpreter reported a script error.
    #[error("Script error: {message}")]
    Script {
        /// Error message.
        message: String,
    },

    /// The transaction's fee cannot pay for a run.
    #[error("Fee error: {message}")]
    Fee {
        /// Error message.
        message: String,
    },

    /// The ledger collaborator failed.
    #[error("Ledger error: {message}")]
    Ledger {
        /// Error message.
        message: String,
    },

    /// The driver or meter was misused.
    #[error("Internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },
}

/// Discriminant of [`ExecError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Param,
    ArithmeticOverflow,
    FuelExhausted,
    InsufficientBalance,
    InvariantViolation,
    MalformedBytecode,
    OversizedInput,
    Script,
    Fee,
    Ledger,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Param => "param",
            ErrorKind::ArithmeticOverflow => "arithmetic_overflow",
            ErrorKind::FuelExhausted => "fuel_exhausted",
            ErrorKind::InsufficientBalance => "insufficient_balance",
            ErrorKind::InvariantViolation => "invariant_violation",
            ErrorKind::MalformedBytecode => "malformed_bytecode",
            ErrorKind::OversizedInput => "oversized_input",
            ErrorKind::Script => "script",
            ErrorKind::Fee => "fee",
            ErrorKind::Ledger => "ledger",
            ErrorKind::Internal => "internal",
        };
        f.write_str(name)
    }
}

impl ExecError {
    /// Create a parameter error.
    pub fn param<S: Into<String>>(message: S) -> Self {
        Self::Param {
            message: message.into(),
        }
    }

    /// Create an arithmetic overflow error.
    pub fn overflow<S: Into<String>>(message: S) -> Self {
        Self::ArithmeticOverflow {
            message: message.into(),
        }
    }

    /// Create an insufficient balance error.
    pub fn insufficient<S: Into<String>>(message: S) -> Self {
        Self::InsufficientBalance {
            message: message.into(),
        }
    }

    /// Create an invariant violation error.
    pub fn invariant<S: Into<String>>(message: S) -> Self {
        Self::InvariantViolation {
            message: message.into(),
        }
    }

    /// Create a malformed bytecode error.
    pub fn malformed<S: Into<String>>(message: S) -> Self {
        Self::MalformedBytecode {
            message: message.into(),
        }
    }

    /// Create an oversized input error.
    pub fn oversized<S: Into<String>>(what: S, size: usize, limit: usize) -> Self {
        Self::OversizedInput {
            what: what.into(),
            size,
            limit,
        }
    }

    /// Create a script error.
    pub fn script<S: Into<String>>(message: S) -> Self {
        Self::Script {
            message: message.into(),
        }
    }

    /// Create a fee error.
    pub fn fee<S: Into<String>>(message: S) -> Self {
        Self::Fee {
            message: message.into(),
        }
    }

    /// Create a ledger error.
    pub fn ledger<S: Into<String>>(message: S) -> Self {
        Self::Ledger {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ExecError::Param { .. } => ErrorKind::Param,
            ExecError::ArithmeticOverflow { .. } => ErrorKind::ArithmeticOverflow,
            ExecError::FuelExhausted { .. } => ErrorKind::FuelExhausted,
            ExecError::InsufficientBalance { .. } => ErrorKind::InsufficientBalance,
            ExecError::InvariantViolation { .. } => ErrorKind::InvariantViolation,
            ExecError::MalformedBytecode { .. } => ErrorKind::MalformedBytecode,
            ExecError::OversizedInput { .. } => ErrorKind::OversizedInput,
            ExecError::Script { .. } => ErrorKind::Script,
            ExecError::Fee { .. } => ErrorKind::Fee,
            ExecError::Ledger { .. } => ErrorKind::Ledger,
            ExecError::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// Only parameter errors leave the run alive; the script sees a failed
    /// call and may continue.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ExecError::Param { .. })
    }

    /// Errors raised before the interpreter was entered.
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            ExecError::MalformedBytecode { .. } | ExecError::OversizedInput { .. } | ExecError::Fee { .. }
        )
    }
}

impl From<FuelError> for ExecError {
    fn from(error: FuelError) -> Self {
        match error {
            FuelError::Exhausted { burned, limit, .. } => ExecError::FuelExhausted { burned, limit },
            other => ExecError::internal(other.to_string()),
        }
    }
}

impl From<AccountError> for ExecError {
    fn from(error: AccountError) -> Self {
        match error {
            AccountError::Overflow { .. } => ExecError::overflow(error.to_string()),
            AccountError::InsufficientFree { .. }
            | AccountError::InsufficientFund { .. }
            | AccountError::InsufficientBalance { .. }
            | AccountError::FundNotFound { .. } => ExecError::insufficient(error.to_string()),
            AccountError::InvalidTag { .. }
            | AccountError::InvalidOwner { .. }
            | AccountError::InvalidAccountRef { .. } => ExecError::param(error.to_string()),
            AccountError::AccountNotFound { .. } | AccountError::Storage { .. } => {
                ExecError::ledger(error.to_string())
            }
        }
    }
}

/// Result type for execution.
pub type ExecResult<T> = std::result::Result<T, ExecError>;
