//! The ledger interface the sandbox reads from and commits into.
//!
//! Implementations own persistence. The sandbox only ever writes through a
//! buffering overlay that hands the whole run to [`Ledger::write_batch`] at
//! once. A backend whose individual writes can fail must override
//! `write_batch` so that the batch lands completely or not at all.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::account::{Account, AccountRef, BalanceOp, RegId};
use crate::error::{AccountError, AccountResult};
use crate::fund::OwnerId;
use crate::sub_account::SubAccount;

/// A confirmed transaction, as far as scripts may inspect one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxRecord {
    pub hash: [u8; 32],
    /// Unset when the sender was not registered when it signed.
    pub sender: Option<RegId>,
    pub confirm_height: u32,
    /// Call arguments, present only for contract invocations.
    pub arguments: Option<Vec<u8>>,
}

/// One write of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerOp {
    PutAccount(Account),
    SetData {
        contract: RegId,
        key: Vec<u8>,
        value: Vec<u8>,
    },
    EraseData {
        contract: RegId,
        key: Vec<u8>,
    },
    SetSubAccount {
        contract: RegId,
        sub_account: SubAccount,
    },
}

impl LedgerOp {
    /// Performs this write on `ledger`.
    pub fn apply_to<L: Ledger + ?Sized>(self, ledger: &mut L) -> AccountResult<()> {
        match self {
            LedgerOp::PutAccount(account) => ledger.put_account(account),
            LedgerOp::SetData {
                contract,
                key,
                value,
            } => ledger.set_contract_data(&contract, &key, &value),
            LedgerOp::EraseData { contract, key } => ledger.erase_contract_data(&contract, &key),
            LedgerOp::SetSubAccount {
                contract,
                sub_account,
            } => ledger.set_sub_account(&contract, &sub_account),
        }
    }
}

/// Account, contract-data and sub-account storage of the outer ledger.
pub trait Ledger {
    /// Height of the block the run executes in.
    fn current_height(&self) -> u32;

    /// Looks up an account by either reference form.
    fn get_account(&self, account: &AccountRef) -> AccountResult<Option<Account>>;

    /// Stores an account, replacing any account with the same address.
    fn put_account(&mut self, account: Account) -> AccountResult<()>;

    /// Reads a contract's storage entry.
    fn get_contract_data(&self, contract: &RegId, key: &[u8]) -> AccountResult<Option<Vec<u8>>>;

    /// Writes a contract's storage entry.
    fn set_contract_data(&mut self, contract: &RegId, key: &[u8], value: &[u8]) -> AccountResult<()>;

    /// Removes a contract's storage entry. Removing a missing key is not an error.
    fn erase_contract_data(&mut self, contract: &RegId, key: &[u8]) -> AccountResult<()>;

    /// Loads a sub-account exactly as stored, without maturing it.
    fn get_sub_account(&self, contract: &RegId, owner: &OwnerId) -> AccountResult<Option<SubAccount>>;

    /// Stores a sub-account under its owner id.
    fn set_sub_account(&mut self, contract: &RegId, sub_account: &SubAccount) -> AccountResult<()>;

    /// Looks up a confirmed transaction. Backends without chain history
    /// report every hash as unknown.
    fn get_transaction(&self, _hash: &[u8; 32]) -> AccountResult<Option<TxRecord>> {
        Ok(None)
    }

    /// Hash of the block at `height`, if the backend keeps one.
    fn get_block_hash(&self, _height: u32) -> AccountResult<Option<[u8; 32]>> {
        Ok(None)
    }

    /// Applies `ops` in order. The default writes them one at a time and
    /// stops at the first failure, which is only correct for backends whose
    /// writes cannot fail; anything else must apply the batch atomically.
    fn write_batch(&mut self, ops: Vec<LedgerOp>) -> AccountResult<()> {
        for op in ops {
            op.apply_to(self)?;
        }
        Ok(())
    }

    /// Registered id behind a reference, if the account exists and is registered.
    fn resolve_reg_id(&self, account: &AccountRef) -> AccountResult<Option<RegId>> {
        if let AccountRef::RegId(id) = account {
            return Ok(Some(*id));
        }
        Ok(self.get_account(account)?.and_then(|found| found.reg_id))
    }

    /// Creates an empty, unregistered account for an address. Reg ids are
    /// assigned by registration, so they cannot be created here.
    fn create_account(&mut self, account: &AccountRef) -> AccountResult<Account> {
        account.validate()?;
        match account {
            AccountRef::Address(address) => {
                let created = Account::new(address.clone());
                self.put_account(created.clone())?;
                debug!(address = %address, "created account");
                Ok(created)
            }
            AccountRef::RegId(id) => Err(AccountError::account_not_found(id.to_string())),
        }
    }

    /// Credits or debits a native balance. A credit to an unseen address
    /// creates the account first.
    fn apply_account_delta(&mut self, account: &AccountRef, op: BalanceOp, amount: u64) -> AccountResult<()> {
        let mut target = match (self.get_account(account)?, op) {
            (Some(found), _) => found,
            (None, BalanceOp::Credit) => self.create_account(account)?,
            (None, BalanceOp::Debit) => return Err(AccountError::account_not_found(account.to_string())),
        };
        target.apply(op, amount)?;
        self.put_account(target)
    }

    /// Loads a sub-account, or an empty one if none is stored, and matures it
    /// at `height`.
    fn get_or_create_sub_account(
        &self,
        contract: &RegId,
        owner: &OwnerId,
        height: u32,
    ) -> AccountResult<SubAccount> {
        let mut sub_account = self
            .get_sub_account(contract, owner)?
            .unwrap_or_else(|| SubAccount::new(owner.clone()));
        sub_account.mature(height)?;
        Ok(sub_account)
    }
}
