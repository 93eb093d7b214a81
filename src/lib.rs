//! # Contract Sandbox
//!
//! Deterministic, fuel-metered execution of contract calls against a ledger.
//!
//! This library provides:
//! - Fuel metering with burn versions, storage refunds and a per-run limit
//! - The opcode and host-call price tables
//! - Per-contract sub-accounts with free and frozen (tagged, maturing) funds
//! - Effect collection and the conservation checks run before commit
//! - An execution driver that applies a run's effects all-or-nothing
//!
//! ## Quick Start
//!
//! ```rust
//! use contract_sandbox::prelude::*;
//!
//! let contract = RegId::new(100, 1);
//! let mut ledger = MemoryLedger::new(200).with_account(
//!     Account::new("wLKf2NqwtHk3BfzK5wMDfbKYN1SC3weyR4")
//!         .with_reg_id(contract)
//!         .with_balance(1_000),
//! );
//!
//! let sandbox = Sandbox::new(SandboxConfig::default()).unwrap();
//! let ctx = sandbox.context(
//!     TxMeta {
//!         hash: [1; 32],
//!         sender: RegId::new(50, 2),
//!         sender_address: "wNDue1jHcgRSioSDL4o1AzXz3D72gCMkP6".to_string(),
//!         fees: 1_010_000,
//!         fuel_rate: 100,
//!         valid_height: 200,
//!         coin_amount: 0,
//!         coin_symbol: "WICC".to_string(),
//!         block_timestamp: 0,
//!     },
//!     contract,
//!     vec![0x01],
//!     Vec::new(),
//!     200,
//! );
//! let script = ReplayInterpreter::from_calls([HostCall::LogPrint(b"hi".to_vec())]);
//!
//! let outcome = sandbox.execute(&mut ledger, script, ctx);
//! assert!(outcome.is_committed());
//! assert_eq!(outcome.logs, vec!["hi".to_string()]);
//! ```
//!
//! ## Architecture
//!
//! - [`config`] - protocol constants and [`SandboxConfig`]
//! - [`fuel`] - the fuel meter and price tables
//! - [`accounts`] - accounts, sub-accounts and the `Ledger` trait
//! - [`runtime`] - host bridge, validator and execution driver

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

use std::path::Path;

use thiserror::Error;
use tracing::debug;

pub use sandbox_accounts as accounts;
pub use sandbox_config as config;
pub use sandbox_fuel as fuel;
pub use sandbox_runtime as runtime;

use sandbox_accounts::{Ledger, RegId};
use sandbox_config::{ConfigError, SandboxConfig};
use sandbox_runtime::{ExecutionContext, ExecutionDriver, Interpreter, RunOutcome, TxMeta};

/// Common imports for embedding the sandbox
pub mod prelude {
    pub use crate::accounts::{
        Account, AccountRef, FundEntry, FundTag, Ledger, MemoryLedger, OwnerId, RegId, SubAccount,
    };
    pub use crate::config::{AbortFeePolicy, BurnVersion, SandboxConfig};
    pub use crate::fuel::{BurnReport, FuelMeter};
    pub use crate::runtime::{
        DriverState, ErrorKind, ExecError, ExecutionContext, ExecutionDriver, HostCall, HostValue,
        Interpreter, Receipt, ReplayInterpreter, RunOutcome, TxMeta,
    };
    pub use crate::{Sandbox, SandboxError};
}

/// Errors raised while setting up a [`Sandbox`]
#[derive(Error, Debug)]
pub enum SandboxError {
    /// The configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Validated configuration plus the entry point for running calls
#[derive(Debug, Clone)]
pub struct Sandbox {
    config: SandboxConfig,
}

impl Sandbox {
    /// Creates a sandbox, rejecting settings no run could execute under
    pub fn new(config: SandboxConfig) -> Result<Self, SandboxError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Loads settings from a `.toml` or `.json` file
    pub fn from_file(path: &Path) -> Result<Self, SandboxError> {
        let config = SandboxConfig::load_from_file(path)?;
        debug!(path = %path.display(), "sandbox configured from file");
        Ok(Self { config })
    }

    /// The active settings
    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }

    /// Bundles the inputs of one call
    pub fn context(
        &self,
        tx: TxMeta,
        contract: RegId,
        code: Vec<u8>,
        arguments: Vec<u8>,
        height: u32,
    ) -> ExecutionContext {
        ExecutionContext {
            tx,
            contract,
            code,
            arguments,
            height,
        }
    }

    /// Runs one call to completion against `ledger`
    pub fn execute<L: Ledger, I: Interpreter>(
        &self,
        ledger: &mut L,
        interpreter: I,
        ctx: ExecutionContext,
    ) -> RunOutcome {
        ExecutionDriver::new(&self.config, ledger, interpreter, ctx).execute()
    }
}
