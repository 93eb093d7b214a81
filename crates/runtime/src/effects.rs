//! Effects recorded during a run.
//!
//! Nothing here touches the ledger. The collector is filled by host calls and
//! handed to the validator and then to the driver's commit step, or dropped.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{ExecError, ExecResult};
use sandbox_accounts::{AccountRef, BalanceOp, FundDelta, OwnerId};

/// A native-coin balance change against the outer ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountDelta {
    pub account: AccountRef,
    pub op: BalanceOp,
    pub amount: u64,
}

impl AccountDelta {
    pub fn credit(account: AccountRef, amount: u64) -> Self {
        Self {
            account,
            op: BalanceOp::Credit,
            amount,
        }
    }

    pub fn debit(account: AccountRef, amount: u64) -> Self {
        Self {
            account,
            op: BalanceOp::Debit,
            amount,
        }
    }
}

/// Any balance-affecting record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectRecord {
    Account(AccountDelta),
    Fund(FundDelta),
}

/// Pending write to the executing contract's storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageWrite {
    Put(Vec<u8>),
    Erase,
}

/// Append-only record of one run's effects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectCollector {
    max_outputs: usize,
    account_deltas: Vec<AccountDelta>,
    fund_deltas: IndexMap<OwnerId, Vec<FundDelta>>,
    fund_count: usize,
    storage: IndexMap<Vec<u8>, StorageWrite>,
}

impl EffectCollector {
    pub fn new(max_outputs: usize) -> Self {
        Self {
            max_outputs,
            ..Self::default()
        }
    }

    /// Records a native-coin delta. Fails with `Param` once the output
    /// limit is reached.
    pub fn push_account_delta(&mut self, delta: AccountDelta) -> ExecResult<()> {
        if self.account_deltas.len() >= self.max_outputs {
            return Err(ExecError::param(format!(
                "output limit {} reached",
                self.max_outputs
            )));
        }
        trace!(account = %delta.account, op = %delta.op, amount = delta.amount, "recorded output");
        self.account_deltas.push(delta);
        Ok(())
    }

    pub fn push_fund_delta(&mut self, delta: FundDelta) {
        trace!(owner = %delta.owner, op = %delta.op, amount = delta.amount, "recorded fund operation");
        self.fund_count += 1;
        self.fund_deltas
            .entry(delta.owner.clone())
            .or_default()
            .push(delta);
    }

    pub fn put_data(&mut self, key: Vec<u8>, value: Vec<u8>) {
        self.storage.insert(key, StorageWrite::Put(value));
    }

    pub fn erase_data(&mut self, key: Vec<u8>) {
        self.storage.insert(key, StorageWrite::Erase);
    }

    /// The run's latest write to `key`, if any.
    pub fn pending_data(&self, key: &[u8]) -> Option<&StorageWrite> {
        self.storage.get(key)
    }

    pub fn account_deltas(&self) -> &[AccountDelta] {
        &self.account_deltas
    }

    /// Fund deltas grouped by owner, owners in first-touch order.
    pub fn fund_deltas(&self) -> impl Iterator<Item = (&OwnerId, &[FundDelta])> {
        self.fund_deltas
            .iter()
            .map(|(owner, deltas)| (owner, deltas.as_slice()))
    }

    pub fn fund_delta_count(&self) -> usize {
        self.fund_count
    }

    pub fn storage_writes(&self) -> impl Iterator<Item = (&Vec<u8>, &StorageWrite)> {
        self.storage.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.account_deltas.is_empty() && self.fund_count == 0 && self.storage.is_empty()
    }

    /// Every balance record in application order.
    pub fn records(&self) -> Vec<EffectRecord> {
        let funds = self
            .fund_deltas
            .values()
            .flatten()
            .cloned()
            .map(EffectRecord::Fund);
        self.account_deltas
            .iter()
            .cloned()
            .map(EffectRecord::Account)
            .chain(funds)
            .collect()
    }
}
