//! Sandbox Configuration Module
//!
//! Protocol limits shared by every sandbox crate, the burn version enumeration
//! and the runtime settings an embedder loads from TOML or JSON.

pub mod error;
pub mod settings;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use error::{ConfigError, ConfigResult};
pub use settings::{AbortFeePolicy, SandboxConfig};

/// Upper bound on the fuel a single contract call may burn.
pub const MAX_BLOCK_RUN_STEP: u64 = 12_000_000;
/// Fuel granted per unit of fee above the minimum, before dividing by the fuel rate.
pub const FUEL_LIMIT_MULTIPLIER: u64 = 100;
/// Maximum number of native-coin outputs a script may record.
pub const MAX_OUTPUT_COUNT: usize = 100;
/// Maximum length of a fund tag and of a sub-account owner id.
pub const MAX_TAG_SIZE: usize = 40;
/// Maximum contract code size in bytes (64KB).
pub const MAX_CONTRACT_CODE_SIZE: usize = 65_536;
/// Argument blobs must be strictly smaller than this.
pub const MAX_CONTRACT_ARGUMENT_SIZE: usize = 4_096;
/// Largest buffer a host call accepts from or hands back to a script.
pub const MAX_HOST_BUFFER_SIZE: usize = 500;

/// Fuel rate bounds
pub const MIN_FUEL_RATE: u64 = 1;
pub const DEFAULT_FUEL_RATE: u64 = 100;
/// Minimum transaction fee; only the excess buys fuel.
pub const DEFAULT_MIN_TX_FEE: u64 = 10_000;

/// Raw size of a registration id (height u32 + index u16).
pub const REG_ID_SIZE: usize = 6;
/// Length of a Base58 account address.
pub const ADDRESS_SIZE: usize = 34;
/// Compressed secp256k1 public key.
pub const PUBLIC_KEY_SIZE: usize = 33;

/// Default symbol of the ledger's native coin.
pub const DEFAULT_NATIVE_SYMBOL: &str = "WICC";

/// Burner version gating which burns are applied during a run.
///
/// A burn tagged with version `v` is applied only when `v` is not newer than
/// the version the run was started with.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum BurnVersion {
    /// Step metering only.
    V1 = 10_001,
    /// Steps, opcodes, memory, storage, accounts and host calls.
    #[default]
    V2 = 10_002,
}

impl BurnVersion {
    /// The newest version, enabling every burn.
    pub const NEWEST: BurnVersion = BurnVersion::V2;

    /// Returns the wire value.
    pub fn as_u32(self) -> u32 {
        self as u32
    }

    /// Returns true if a burn requiring `required` is applied under this version.
    #[inline]
    pub fn enables(self, required: BurnVersion) -> bool {
        required <= self
    }
}

impl TryFrom<u32> for BurnVersion {
    type Error = ConfigError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            10_001 => Ok(BurnVersion::V1),
            10_002 => Ok(BurnVersion::V2),
            other => Err(ConfigError::invalid(format!("unknown burn version {other}"))),
        }
    }
}

impl From<BurnVersion> for u32 {
    fn from(version: BurnVersion) -> Self {
        version.as_u32()
    }
}

impl fmt::Display for BurnVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BurnVersion::V1 => write!(f, "v1"),
            BurnVersion::V2 => write!(f, "v2"),
        }
    }
}

impl FromStr for BurnVersion {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "v1" | "r1" | "10001" => Ok(BurnVersion::V1),
            "v2" | "r2" | "10002" | "newest" => Ok(BurnVersion::V2),
            _ => Err(ConfigError::invalid(format!("unknown burn version: {s}"))),
        }
    }
}
