//! Buffered view over a ledger.
//!
//! Reads fall through to the base ledger unless the overlay holds a newer
//! value. Writes are kept in memory and logged; `commit` hands the log to the
//! base as one batch, dropping the overlay discards it.

use hashbrown::HashMap;
use tracing::debug;

use sandbox_accounts::{
    Account, AccountRef, AccountResult, Ledger, LedgerOp, OwnerId, RegId, SubAccount, TxRecord,
};

/// Copy-on-write ledger view for one run.
pub struct LedgerOverlay<'a, L: Ledger> {
    base: &'a mut L,
    accounts: HashMap<String, Account>,
    reg_ids: HashMap<RegId, String>,
    data: HashMap<(RegId, Vec<u8>), Option<Vec<u8>>>,
    sub_accounts: HashMap<(RegId, OwnerId), SubAccount>,
    ops: Vec<LedgerOp>,
}

impl<'a, L: Ledger> LedgerOverlay<'a, L> {
    pub fn new(base: &'a mut L) -> Self {
        Self {
            base,
            accounts: HashMap::new(),
            reg_ids: HashMap::new(),
            data: HashMap::new(),
            sub_accounts: HashMap::new(),
            ops: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn operations(&self) -> &[LedgerOp] {
        &self.ops
    }

    /// Writes every buffered op into the base ledger as one batch.
    pub fn commit(self) -> AccountResult<usize> {
        let count = self.ops.len();
        self.base.write_batch(self.ops)?;
        debug!(operations = count, "committed ledger overlay");
        Ok(count)
    }

    /// Drops every buffered write.
    pub fn discard(self) {
        if !self.ops.is_empty() {
            debug!(operations = self.ops.len(), "discarded ledger overlay");
        }
    }
}

impl<L: Ledger> Ledger for LedgerOverlay<'_, L> {
    fn current_height(&self) -> u32 {
        self.base.current_height()
    }

    fn get_account(&self, account: &AccountRef) -> AccountResult<Option<Account>> {
        let address = match account {
            AccountRef::Address(address) => Some(address),
            AccountRef::RegId(id) => self.reg_ids.get(id),
        };
        if let Some(buffered) = address.and_then(|a| self.accounts.get(a)) {
            return Ok(Some(buffered.clone()));
        }
        Ok(self
            .base
            .get_account(account)?
            .map(|found| self.accounts.get(&found.address).cloned().unwrap_or(found)))
    }

    fn put_account(&mut self, account: Account) -> AccountResult<()> {
        if let Some(reg_id) = account.reg_id {
            self.reg_ids.insert(reg_id, account.address.clone());
        }
        self.accounts.insert(account.address.clone(), account.clone());
        self.ops.push(LedgerOp::PutAccount(account));
        Ok(())
    }

    fn get_contract_data(&self, contract: &RegId, key: &[u8]) -> AccountResult<Option<Vec<u8>>> {
        match self.data.get(&(*contract, key.to_vec())) {
            Some(buffered) => Ok(buffered.clone()),
            None => self.base.get_contract_data(contract, key),
        }
    }

    fn set_contract_data(&mut self, contract: &RegId, key: &[u8], value: &[u8]) -> AccountResult<()> {
        self.data
            .insert((*contract, key.to_vec()), Some(value.to_vec()));
        self.ops.push(LedgerOp::SetData {
            contract: *contract,
            key: key.to_vec(),
            value: value.to_vec(),
        });
        Ok(())
    }

    fn erase_contract_data(&mut self, contract: &RegId, key: &[u8]) -> AccountResult<()> {
        self.data.insert((*contract, key.to_vec()), None);
        self.ops.push(LedgerOp::EraseData {
            contract: *contract,
            key: key.to_vec(),
        });
        Ok(())
    }

    fn get_sub_account(&self, contract: &RegId, owner: &OwnerId) -> AccountResult<Option<SubAccount>> {
        match self.sub_accounts.get(&(*contract, owner.clone())) {
            Some(buffered) => Ok(Some(buffered.clone())),
            None => self.base.get_sub_account(contract, owner),
        }
    }

    fn set_sub_account(&mut self, contract: &RegId, sub_account: &SubAccount) -> AccountResult<()> {
        self.sub_accounts
            .insert((*contract, sub_account.owner.clone()), sub_account.clone());
        self.ops.push(LedgerOp::SetSubAccount {
            contract: *contract,
            sub_account: sub_account.clone(),
        });
        Ok(())
    }

    fn get_transaction(&self, hash: &[u8; 32]) -> AccountResult<Option<TxRecord>> {
        self.base.get_transaction(hash)
    }

    fn get_block_hash(&self, height: u32) -> AccountResult<Option<[u8; 32]>> {
        self.base.get_block_hash(height)
    }
}
