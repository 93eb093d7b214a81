//! Conservation checks run between the interpreter and commit.

use tracing::debug;

use crate::effects::{AccountDelta, EffectCollector};
use crate::error::{ExecError, ExecResult};
use sandbox_accounts::{Account, AccountRef, BalanceOp, Ledger, RegId};

/// Checks a run's effects against the executing contract's identity.
#[derive(Debug, Clone)]
pub struct InvariantValidator {
    contract: RegId,
    contract_address: Option<String>,
    max_outputs: usize,
}

impl InvariantValidator {
    pub fn new(contract: RegId, max_outputs: usize) -> Self {
        Self {
            contract,
            contract_address: None,
            max_outputs,
        }
    }

    /// Also accept the contract's address as a reference to its account.
    pub fn with_contract_account(mut self, account: &Account) -> Self {
        self.contract_address = Some(account.address.clone());
        self
    }

    /// True when `account` names the executing contract.
    pub fn is_contract(&self, account: &AccountRef) -> bool {
        match account {
            AccountRef::RegId(id) => *id == self.contract,
            AccountRef::Address(address) => self.contract_address.as_deref() == Some(address.as_str()),
        }
    }

    /// Native-coin conservation: recognized references only, reg ids must
    /// resolve on `ledger`, debits only from the contract itself, credits
    /// equal debits.
    pub fn check_operate<L: Ledger + ?Sized>(&self, deltas: &[AccountDelta], ledger: &L) -> ExecResult<()> {
        if deltas.len() > self.max_outputs {
            return Err(ExecError::invariant(format!(
                "{} outputs exceed limit {}",
                deltas.len(),
                self.max_outputs
            )));
        }

        let mut credits = 0u64;
        let mut debits = 0u64;
        for delta in deltas {
            if !delta.account.is_recognized() {
                return Err(ExecError::invariant(format!(
                    "unrecognized account reference {}",
                    delta.account
                )));
            }
            if let AccountRef::RegId(id) = &delta.account {
                if *id != self.contract && ledger.get_account(&delta.account)?.is_none() {
                    return Err(ExecError::invariant(format!("reg id {} is not registered", id)));
                }
            }
            match delta.op {
                BalanceOp::Credit => {
                    credits = credits
                        .checked_add(delta.amount)
                        .ok_or_else(|| ExecError::overflow("sum of output credits"))?;
                }
                BalanceOp::Debit => {
                    if !self.is_contract(&delta.account) {
                        return Err(ExecError::invariant(format!(
                            "debit from {} which is not contract {}",
                            delta.account, self.contract
                        )));
                    }
                    debits = debits
                        .checked_add(delta.amount)
                        .ok_or_else(|| ExecError::overflow("sum of output debits"))?;
                }
            }
        }

        if credits != debits {
            return Err(ExecError::invariant(format!(
                "output credits {} != debits {}",
                credits, debits
            )));
        }
        debug!(contract = %self.contract, outputs = deltas.len(), amount = credits, "outputs balanced");
        Ok(())
    }

    /// Sub-account conservation: net sub-account credit equals the coin paid
    /// into the contract minus what the contract paid out.
    pub fn check_app_account_operate(&self, effects: &EffectCollector, coin_amount: u64) -> ExecResult<()> {
        let mut credits = 0u64;
        let mut debits = 0u64;
        for (_, deltas) in effects.fund_deltas() {
            for delta in deltas {
                let sum = if delta.op.is_credit() { &mut credits } else { &mut debits };
                *sum = sum
                    .checked_add(delta.amount)
                    .ok_or_else(|| ExecError::overflow("sum of sub-account operations"))?;
            }
        }

        let mut paid_out = 0u64;
        for delta in effects.account_deltas() {
            if delta.op == BalanceOp::Debit && self.is_contract(&delta.account) {
                paid_out = paid_out
                    .checked_add(delta.amount)
                    .ok_or_else(|| ExecError::overflow("sum of contract debits"))?;
            }
        }

        let internal = i128::from(credits) - i128::from(debits);
        let external = i128::from(coin_amount) - i128::from(paid_out);
        if internal != external {
            return Err(ExecError::invariant(format!(
                "sub-account net {} != coin in {} minus paid out {}",
                internal, coin_amount, paid_out
            )));
        }
        debug!(contract = %self.contract, net = %internal, "sub-accounts balanced");
        Ok(())
    }
}
