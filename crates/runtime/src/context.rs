//! Per-run inputs.

use serde::{Deserialize, Serialize};

use crate::error::{ExecError, ExecResult};
use crate::fee::derive_fuel_limit;
use sandbox_accounts::{AccountRef, OwnerId, RegId};
use sandbox_config::SandboxConfig;

/// The contract-invoking transaction, as the sandbox sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxMeta {
    pub hash: [u8; 32],
    /// Registered id of the paying account.
    pub sender: RegId,
    pub sender_address: String,
    pub fees: u64,
    pub fuel_rate: u64,
    pub valid_height: u32,
    /// Native coin transferred into the contract.
    pub coin_amount: u64,
    pub coin_symbol: String,
    pub block_timestamp: i64,
}

impl TxMeta {
    pub fn tx_hash_hex(&self) -> String {
        hex::encode(self.hash)
    }

    /// The sender's sub-account key inside a contract.
    pub fn sender_owner(&self) -> ExecResult<OwnerId> {
        OwnerId::new(self.sender_address.as_bytes().to_vec())
            .map_err(|e| ExecError::param(format!("sender address: {}", e)))
    }
}

/// Everything one run needs besides the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionContext {
    pub tx: TxMeta,
    /// The executing contract.
    pub contract: RegId,
    pub code: Vec<u8>,
    pub arguments: Vec<u8>,
    /// Height of the block being built.
    pub height: u32,
}

impl ExecutionContext {
    pub fn contract_ref(&self) -> AccountRef {
        AccountRef::RegId(self.contract)
    }

    /// Fuel limit the transaction's fee buys under `config`.
    pub fn fuel_limit(&self, config: &SandboxConfig) -> ExecResult<u64> {
        derive_fuel_limit(
            self.tx.fees,
            config.min_tx_fee,
            self.tx.fuel_rate,
            config.max_block_run_step,
        )
    }

    /// True when the transaction moves the ledger's native coin.
    pub fn transfers_native(&self, config: &SandboxConfig) -> bool {
        self.tx.coin_symbol == config.native_symbol
    }
}
