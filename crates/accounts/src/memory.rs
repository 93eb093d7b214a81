//! In-memory ledger.

use hashbrown::HashMap;

use crate::account::{Account, AccountRef, RegId};
use crate::error::{AccountError, AccountResult};
use crate::fund::OwnerId;
use crate::ledger::{Ledger, LedgerOp, TxRecord};
use crate::sub_account::SubAccount;

/// `Ledger` backed by hash maps.
///
/// Cloning gives an independent snapshot; equality compares every stored
/// record, which makes before/after comparisons of a run straightforward.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryLedger {
    height: u32,
    accounts: HashMap<String, Account>,
    reg_ids: HashMap<RegId, String>,
    contract_data: HashMap<(RegId, Vec<u8>), Vec<u8>>,
    sub_accounts: HashMap<(RegId, OwnerId), SubAccount>,
    transactions: HashMap<[u8; 32], TxRecord>,
    block_hashes: HashMap<u32, [u8; 32]>,
}

impl MemoryLedger {
    pub fn new(height: u32) -> Self {
        Self {
            height,
            ..Self::default()
        }
    }

    pub fn set_height(&mut self, height: u32) {
        self.height = height;
    }

    pub fn with_account(mut self, account: Account) -> Self {
        self.insert_account(account);
        self
    }

    pub fn with_contract_data(mut self, contract: RegId, key: &[u8], value: &[u8]) -> Self {
        self.contract_data.insert((contract, key.to_vec()), value.to_vec());
        self
    }

    pub fn with_sub_account(mut self, contract: RegId, sub_account: SubAccount) -> Self {
        self.sub_accounts
            .insert((contract, sub_account.owner.clone()), sub_account);
        self
    }

    pub fn with_transaction(mut self, tx: TxRecord) -> Self {
        self.transactions.insert(tx.hash, tx);
        self
    }

    pub fn with_block_hash(mut self, height: u32, hash: [u8; 32]) -> Self {
        self.block_hashes.insert(height, hash);
        self
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    /// Native balance by address, 0 when the account does not exist.
    pub fn balance_of(&self, address: &str) -> u64 {
        self.accounts.get(address).map_or(0, |account| account.balance)
    }

    pub fn sub_account_count(&self, contract: &RegId) -> usize {
        self.sub_accounts.keys().filter(|(c, _)| c == contract).count()
    }

    fn insert_account(&mut self, account: Account) {
        if let Some(reg_id) = account.reg_id {
            self.reg_ids.insert(reg_id, account.address.clone());
        }
        self.accounts.insert(account.address.clone(), account);
    }
}

impl Ledger for MemoryLedger {
    fn current_height(&self) -> u32 {
        self.height
    }

    fn get_account(&self, account: &AccountRef) -> AccountResult<Option<Account>> {
        let address = match account {
            AccountRef::Address(address) => Some(address),
            AccountRef::RegId(id) => self.reg_ids.get(id),
        };
        Ok(address.and_then(|a| self.accounts.get(a)).cloned())
    }

    fn put_account(&mut self, account: Account) -> AccountResult<()> {
        if let Some(reg_id) = account.reg_id {
            match self.reg_ids.get(&reg_id) {
                Some(owner) if owner != &account.address => {
                    return Err(AccountError::storage(format!(
                        "reg id {} already belongs to {}",
                        reg_id, owner
                    )));
                }
                _ => {}
            }
        }
        self.insert_account(account);
        Ok(())
    }

    fn get_contract_data(&self, contract: &RegId, key: &[u8]) -> AccountResult<Option<Vec<u8>>> {
        Ok(self.contract_data.get(&(*contract, key.to_vec())).cloned())
    }

    fn set_contract_data(&mut self, contract: &RegId, key: &[u8], value: &[u8]) -> AccountResult<()> {
        self.contract_data
            .insert((*contract, key.to_vec()), value.to_vec());
        Ok(())
    }

    fn erase_contract_data(&mut self, contract: &RegId, key: &[u8]) -> AccountResult<()> {
        self.contract_data.remove(&(*contract, key.to_vec()));
        Ok(())
    }

    fn get_sub_account(&self, contract: &RegId, owner: &OwnerId) -> AccountResult<Option<SubAccount>> {
        Ok(self.sub_accounts.get(&(*contract, owner.clone())).cloned())
    }

    fn set_sub_account(&mut self, contract: &RegId, sub_account: &SubAccount) -> AccountResult<()> {
        self.sub_accounts
            .insert((*contract, sub_account.owner.clone()), sub_account.clone());
        Ok(())
    }

    fn get_transaction(&self, hash: &[u8; 32]) -> AccountResult<Option<TxRecord>> {
        Ok(self.transactions.get(hash).cloned())
    }

    fn get_block_hash(&self, height: u32) -> AccountResult<Option<[u8; 32]>> {
        Ok(self.block_hashes.get(&height).copied())
    }

    /// Applies the batch to a snapshot and swaps it in, so a rejected write
    /// leaves the ledger as it was.
    fn write_batch(&mut self, ops: Vec<LedgerOp>) -> AccountResult<()> {
        let mut staged = self.clone();
        for op in ops {
            op.apply_to(&mut staged)?;
        }
        *self = staged;
        Ok(())
    }
}
