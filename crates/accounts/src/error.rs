//! Error types for account and sub-account operations.

use thiserror::Error;

/// Errors that can occur while reading or mutating balances.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccountError {
    /// A balance addition would wrap.
    #[error("Balance overflow: {context}")]
    Overflow {
        /// What was being added.
        context: String,
    },

    /// A debit exceeds a sub-account's free balance.
    #[error("Insufficient free balance: required {required}, available {available}")]
    InsufficientFree {
        /// Amount requested.
        required: u64,
        /// Amount available.
        available: u64,
    },

    /// A debit exceeds the value of a frozen fund.
    #[error("Insufficient fund {tag}@{height}: required {required}, available {available}")]
    InsufficientFund {
        /// Hex-encoded tag.
        tag: String,
        /// Maturity height.
        height: u32,
        /// Amount requested.
        required: u64,
        /// Amount available.
        available: u64,
    },

    /// A debit exceeds a native account balance.
    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance {
        /// Amount requested.
        required: u64,
        /// Amount available.
        available: u64,
    },

    /// No frozen fund matches the tag and maturity height.
    #[error("Fund not found: tag {tag}, height {height}")]
    FundNotFound {
        /// Hex-encoded tag.
        tag: String,
        /// Maturity height.
        height: u32,
    },

    /// A fund tag is longer than allowed.
    #[error("Invalid fund tag: {message}")]
    InvalidTag {
        /// Error message.
        message: String,
    },

    /// A sub-account owner id is empty or too long.
    #[error("Invalid owner id: {message}")]
    InvalidOwner {
        /// Error message.
        message: String,
    },

    /// An account reference is in no recognized form.
    #[error("Invalid account reference: {message}")]
    InvalidAccountRef {
        /// Error message.
        message: String,
    },

    /// The referenced account does not exist.
    #[error("Account not found: {account}")]
    AccountNotFound {
        /// The account reference.
        account: String,
    },

    /// The ledger backend failed.
    #[error("Storage error: {message}")]
    Storage {
        /// Error message from the backend.
        message: String,
    },
}

impl AccountError {
    /// Create an overflow error.
    pub fn overflow<S: Into<String>>(context: S) -> Self {
        Self::Overflow {
            context: context.into(),
        }
    }

    /// Create an insufficient free balance error.
    pub fn insufficient_free(required: u64, available: u64) -> Self {
        Self::InsufficientFree {
            required,
            available,
        }
    }

    /// Create an insufficient fund error.
    pub fn insufficient_fund(tag: &[u8], height: u32, required: u64, available: u64) -> Self {
        Self::InsufficientFund {
            tag: hex::encode(tag),
            height,
            required,
            available,
        }
    }

    /// Create an insufficient native balance error.
    pub fn insufficient_balance(required: u64, available: u64) -> Self {
        Self::InsufficientBalance {
            required,
            available,
        }
    }

    /// Create a fund not found error.
    pub fn fund_not_found(tag: &[u8], height: u32) -> Self {
        Self::FundNotFound {
            tag: hex::encode(tag),
            height,
        }
    }

    /// Create an invalid tag error.
    pub fn invalid_tag<S: Into<String>>(message: S) -> Self {
        Self::InvalidTag {
            message: message.into(),
        }
    }

    /// Create an invalid owner error.
    pub fn invalid_owner<S: Into<String>>(message: S) -> Self {
        Self::InvalidOwner {
            message: message.into(),
        }
    }

    /// Create an invalid account reference error.
    pub fn invalid_account_ref<S: Into<String>>(message: S) -> Self {
        Self::InvalidAccountRef {
            message: message.into(),
        }
    }

    /// Create an account not found error.
    pub fn account_not_found<S: Into<String>>(account: S) -> Self {
        Self::AccountNotFound {
            account: account.into(),
        }
    }

    /// Create a storage backend error.
    pub fn storage<S: Into<String>>(message: S) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Returns true for errors caused by a balance that is too small.
    pub fn is_insufficient(&self) -> bool {
        matches!(
            self,
            Self::InsufficientFree { .. }
                | Self::InsufficientFund { .. }
                | Self::InsufficientBalance { .. }
                | Self::FundNotFound { .. }
        )
    }
}

/// Result type for account operations.
pub type AccountResult<T> = std::result::Result<T, AccountError>;
