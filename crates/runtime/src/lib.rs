//! # Sandbox Runtime
//!
//! Deterministic execution of one contract call.
//!
//! The [`ExecutionDriver`] owns a run from start to finish. It checks the
//! inputs, starts a [`sandbox_fuel::FuelMeter`], and hands the code to an
//! [`Interpreter`]. The interpreter reaches the node only through a
//! [`HostBridge`], and every host call is a [`HostCall`] variant. Effects are
//! recorded in an [`EffectCollector`], never written directly. When the
//! script returns, the [`InvariantValidator`] checks native-coin and
//! sub-account conservation. The driver then writes all effects through a
//! [`LedgerOverlay`] in one step, or none at all.
//!
//! ## Example
//!
//! ```rust
//! use sandbox_accounts::{Account, MemoryLedger, RegId};
//! use sandbox_config::SandboxConfig;
//! use sandbox_runtime::{
//!     ExecutionContext, ExecutionDriver, HostCall, ReplayInterpreter, TxMeta,
//! };
//!
//! let contract = RegId::new(100, 1);
//! let mut ledger = MemoryLedger::new(200).with_account(
//!     Account::new("wLKf2NqwtHk3BfzK5wMDfbKYN1SC3weyR4").with_reg_id(contract),
//! );
//! let config = SandboxConfig::default();
//! let ctx = ExecutionContext {
//!     tx: TxMeta {
//!         hash: [7; 32],
//!         sender: RegId::new(50, 2),
//!         sender_address: "wNDue1jHcgRSioSDL4o1AzXz3D72gCMkP6".to_string(),
//!         fees: config.min_tx_fee + 100_000,
//!         fuel_rate: 100,
//!         valid_height: 200,
//!         coin_amount: 0,
//!         coin_symbol: config.native_symbol.clone(),
//!         block_timestamp: 0,
//!     },
//!     contract,
//!     code: vec![0x01],
//!     arguments: Vec::new(),
//!     height: 200,
//! };
//! let script = ReplayInterpreter::from_calls([HostCall::WriteData {
//!     key: b"greeting".to_vec(),
//!     value: b"hello".to_vec(),
//! }]);
//!
//! let outcome = ExecutionDriver::new(&config, &mut ledger, script, ctx).execute();
//! assert!(outcome.is_committed());
//! assert_eq!(
//!     ledger.get_contract_data(&contract, b"greeting").unwrap(),
//!     Some(b"hello".to_vec())
//! );
//! # use sandbox_accounts::Ledger;
//! ```

pub mod context;
pub mod driver;
pub mod effects;
pub mod error;
pub mod fee;
pub mod host;
pub mod interpreter;
pub mod overlay;
pub mod receipt;
pub mod validator;

pub use context::{ExecutionContext, TxMeta};
pub use driver::{DriverState, ExecutionDriver, RunOutcome};
pub use effects::{AccountDelta, EffectCollector, EffectRecord, StorageWrite};
pub use error::{ErrorKind, ExecError, ExecResult};
pub use fee::{derive_fuel_limit, fee_for};
pub use host::{AppOperate, HostBridge, HostCall, HostValue, RunState};
pub use interpreter::{Interpreter, ReplayInterpreter, ScriptExit, ScriptStep};
pub use overlay::LedgerOverlay;
pub use receipt::{Party, Receipt, ReceiptAsset, ReceiptEntry, ReceiptKind};
pub use validator::InvariantValidator;
