//! Burn report emitted at the end of a run.

use serde::{Deserialize, Serialize};
use std::fmt;

use sandbox_config::BurnVersion;

/// Snapshot of a meter's counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurnReport {
    pub version: BurnVersion,
    pub limit: u64,
    pub total_burned: u64,
    pub gross: u64,
    /// Raw refund, before the cap.
    pub refund: u64,
    pub refund_applied: u64,
    pub memory_alloc: u64,
    pub memory_fuel: u64,
    pub step: u64,
    pub opcode: u64,
    pub storage: u64,
    pub account: u64,
    pub function: u64,
}

impl fmt::Display for BurnReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "version={} limit={} burned={} step={} refund={} alloc={} memory={} opcode={} storage={} account={} function={}",
            self.version,
            self.limit,
            self.total_burned,
            self.step,
            self.refund,
            self.memory_alloc,
            self.memory_fuel,
            self.opcode,
            self.storage,
            self.account,
            self.function
        )
    }
}
