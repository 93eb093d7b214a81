//! # Sandbox Fuel
//!
//! Fuel metering for contract execution.
//!
//! A [`FuelMeter`] is created per run and owned by the execution driver. The
//! interpreter burns step and opcode fuel through it, host calls burn storage,
//! account and call fuel. Every burn re-checks the limit and reports
//! [`FuelError::Exhausted`] as soon as it is crossed; once exhausted the meter
//! is latched and accepts no further burns.
//!
//! ## Accounting
//!
//! ```text
//! total = gross + memory_fuel(alloc) - min((gross + memory_fuel) / 2, refund)
//! ```
//!
//! Refunds come from storage shrinking and can never cancel more than half of
//! the fuel burned.
//!
//! ## Example
//!
//! ```rust
//! use sandbox_fuel::{BurnVersion, FuelMeter, OpCode};
//!
//! let mut meter = FuelMeter::new();
//! meter.start(1_000, BurnVersion::V2).unwrap();
//! meter.burn_step(1).unwrap();
//! meter.burn_opcode(OpCode::Add as u8).unwrap();
//! assert_eq!(meter.total_burned(), 4);
//! ```

pub mod error;
pub mod meter;
pub mod opcode;
pub mod prices;
pub mod report;

pub use error::{FuelError, FuelResult};
pub use meter::{cost_by_size, FuelCounters, FuelMeter};
pub use opcode::{OpCategory, OpCode, OpCostTable, OPCODE_COUNT};
pub use report::BurnReport;

pub use sandbox_config::BurnVersion;
