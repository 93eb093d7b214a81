//! Contract sub-accounts.
//!
//! A sub-account is a contract's internal record for one owner: a free balance
//! plus frozen funds that become spendable once the ledger reaches their
//! maturity height. Every balance change here is checked; a failed operation
//! leaves the sub-account untouched.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::account::BalanceOp;
use crate::error::{AccountError, AccountResult};
use crate::fund::{FundDelta, FundEntry, FundOp, FundTag, OwnerId};

/// Balance record of one owner inside a contract's namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubAccount {
    pub owner: OwnerId,
    pub free: u64,
    /// Kept in insertion order.
    frozen: Vec<FundEntry>,
}

impl SubAccount {
    pub fn new(owner: OwnerId) -> Self {
        Self {
            owner,
            free: 0,
            frozen: Vec::new(),
        }
    }

    pub fn with_free(mut self, free: u64) -> Self {
        self.free = free;
        self
    }

    pub fn frozen(&self) -> impl Iterator<Item = &FundEntry> {
        self.frozen.iter()
    }

    pub fn frozen_len(&self) -> usize {
        self.frozen.len()
    }

    /// No free balance and no frozen funds.
    pub fn is_empty(&self) -> bool {
        self.free == 0 && self.frozen.is_empty()
    }

    /// Sum of every frozen fund.
    pub fn total_frozen(&self) -> AccountResult<u64> {
        self.frozen.iter().try_fold(0u64, |sum, entry| {
            sum.checked_add(entry.value)
                .ok_or_else(|| AccountError::overflow(format!("frozen total of {}", self.owner)))
        })
    }

    /// The fund matching both `tag` and `maturity_height`.
    pub fn find_fund(&self, tag: &FundTag, maturity_height: u32) -> Option<&FundEntry> {
        self.frozen
            .iter()
            .find(|entry| entry.same_fund(tag, maturity_height))
    }

    pub fn fund_value(&self, tag: &FundTag, maturity_height: u32) -> Option<u64> {
        self.find_fund(tag, maturity_height).map(|entry| entry.value)
    }

    fn position(&self, tag: &FundTag, maturity_height: u32) -> Option<usize> {
        self.frozen
            .iter()
            .position(|entry| entry.same_fund(tag, maturity_height))
    }

    /// Adds to the matching fund, or freezes a new one.
    pub fn credit_tag(&mut self, tag: FundTag, amount: u64, maturity_height: u32) -> AccountResult<()> {
        match self.position(&tag, maturity_height) {
            Some(index) => {
                let entry = &mut self.frozen[index];
                entry.value = entry.value.checked_add(amount).ok_or_else(|| {
                    AccountError::overflow(format!("fund {}@{} of {}", tag, maturity_height, self.owner))
                })?;
            }
            None => self.frozen.push(FundEntry::new(tag, amount, maturity_height)),
        }
        Ok(())
    }

    /// Takes from the matching fund, removing it when emptied.
    pub fn debit_tag(&mut self, tag: &FundTag, amount: u64, maturity_height: u32) -> AccountResult<()> {
        let index = self
            .position(tag, maturity_height)
            .ok_or_else(|| AccountError::fund_not_found(tag.as_bytes(), maturity_height))?;
        let available = self.frozen[index].value;
        if amount > available {
            return Err(AccountError::insufficient_fund(
                tag.as_bytes(),
                maturity_height,
                amount,
                available,
            ));
        }
        if amount == available {
            self.frozen.remove(index);
        } else {
            self.frozen[index].value = available - amount;
        }
        Ok(())
    }

    /// Overwrites the fund with the same tag and height as `entry`.
    pub fn replace_tag(&mut self, entry: FundEntry) -> AccountResult<()> {
        let index = self
            .position(&entry.tag, entry.maturity_height)
            .ok_or_else(|| AccountError::fund_not_found(entry.tag.as_bytes(), entry.maturity_height))?;
        self.frozen[index] = entry;
        Ok(())
    }

    /// Sweeps every fund with `maturity_height <= current_height` into the
    /// free balance and returns the amount swept.
    pub fn mature(&mut self, current_height: u32) -> AccountResult<u64> {
        let mut swept = 0u64;
        for entry in self.frozen.iter().filter(|e| e.maturity_height <= current_height) {
            swept = swept
                .checked_add(entry.value)
                .ok_or_else(|| AccountError::overflow(format!("maturing funds of {}", self.owner)))?;
        }
        let free = self
            .free
            .checked_add(swept)
            .ok_or_else(|| AccountError::overflow(format!("free balance of {}", self.owner)))?;

        let before = self.frozen.len();
        self.frozen.retain(|entry| entry.maturity_height > current_height);
        self.free = free;

        if before != self.frozen.len() {
            trace!(
                owner = %self.owner,
                height = current_height,
                swept,
                matured = before - self.frozen.len(),
                "matured frozen funds"
            );
        }
        Ok(swept)
    }

    pub fn apply_free(&mut self, op: BalanceOp, amount: u64) -> AccountResult<()> {
        match op {
            BalanceOp::Credit => {
                self.free = self.free.checked_add(amount).ok_or_else(|| {
                    AccountError::overflow(format!("free balance of {}", self.owner))
                })?;
            }
            BalanceOp::Debit => {
                if amount > self.free {
                    return Err(AccountError::insufficient_free(amount, self.free));
                }
                self.free -= amount;
            }
        }
        Ok(())
    }

    /// Applies a recorded delta. The delta must name this sub-account.
    pub fn apply(&mut self, delta: &FundDelta) -> AccountResult<()> {
        if delta.owner != self.owner {
            return Err(AccountError::invalid_owner(format!(
                "delta for {} applied to {}",
                delta.owner, self.owner
            )));
        }
        match delta.op {
            FundOp::CreditFree => self.apply_free(BalanceOp::Credit, delta.amount),
            FundOp::DebitFree => self.apply_free(BalanceOp::Debit, delta.amount),
            FundOp::CreditTag => self.credit_tag(delta.tag.clone(), delta.amount, delta.maturity_height),
            FundOp::DebitTag => self.debit_tag(&delta.tag, delta.amount, delta.maturity_height),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> OwnerId {
        OwnerId::new(b"alice".to_vec()).unwrap()
    }

    fn tag(name: &str) -> FundTag {
        FundTag::new(name.as_bytes().to_vec()).unwrap()
    }

    #[test]
    fn test_credit_tag_merges_same_fund() {
        let mut sub = SubAccount::new(owner());
        sub.credit_tag(tag("x"), 50, 100).unwrap();
        sub.credit_tag(tag("x"), 30, 100).unwrap();
        assert_eq!(sub.frozen_len(), 1);
        assert_eq!(sub.find_fund(&tag("x"), 100), Some(&FundEntry::new(tag("x"), 80, 100)));

        sub.credit_tag(tag("x"), 1, 101).unwrap();
        sub.credit_tag(tag("y"), 1, 100).unwrap();
        assert_eq!(sub.frozen_len(), 3);
    }

    #[test]
    fn test_credit_tag_overflow_is_rejected() {
        let mut sub = SubAccount::new(owner());
        sub.credit_tag(tag("x"), u64::MAX, 1).unwrap();
        assert!(matches!(
            sub.credit_tag(tag("x"), 1, 1),
            Err(AccountError::Overflow { .. })
        ));
        assert_eq!(sub.fund_value(&tag("x"), 1), Some(u64::MAX));
    }

    #[test]
    fn test_debit_tag() {
        let mut sub = SubAccount::new(owner());
        sub.credit_tag(tag("x"), 10, 5).unwrap();

        assert!(matches!(
            sub.debit_tag(&tag("x"), 1, 6),
            Err(AccountError::FundNotFound { .. })
        ));
        assert!(matches!(
            sub.debit_tag(&tag("x"), 11, 5),
            Err(AccountError::InsufficientFund { .. })
        ));

        sub.debit_tag(&tag("x"), 4, 5).unwrap();
        assert_eq!(sub.fund_value(&tag("x"), 5), Some(6));
        sub.debit_tag(&tag("x"), 6, 5).unwrap();
        assert!(sub.find_fund(&tag("x"), 5).is_none());
        assert!(sub.is_empty());
    }

    #[test]
    fn test_replace_tag_requires_match() {
        let mut sub = SubAccount::new(owner());
        assert!(sub.replace_tag(FundEntry::new(tag("x"), 3, 1)).is_err());
        sub.credit_tag(tag("x"), 10, 1).unwrap();
        sub.replace_tag(FundEntry::new(tag("x"), 3, 1)).unwrap();
        assert_eq!(sub.fund_value(&tag("x"), 1), Some(3));
    }

    #[test]
    fn test_mature_sweeps_due_funds() {
        let mut sub = SubAccount::new(owner()).with_free(1);
        sub.credit_tag(tag("a"), 10, 50).unwrap();
        sub.credit_tag(tag("b"), 20, 100).unwrap();
        sub.credit_tag(tag("c"), 40, 101).unwrap();

        assert_eq!(sub.mature(100).unwrap(), 30);
        assert_eq!(sub.free, 31);
        assert_eq!(sub.frozen_len(), 1);
        assert_eq!(sub.total_frozen().unwrap(), 40);

        let snapshot = sub.clone();
        assert_eq!(sub.mature(100).unwrap(), 0);
        assert_eq!(sub, snapshot);
    }

    #[test]
    fn test_mature_overflow_leaves_state() {
        let mut sub = SubAccount::new(owner()).with_free(u64::MAX);
        sub.credit_tag(tag("a"), 1, 1).unwrap();
        let snapshot = sub.clone();
        assert!(sub.mature(1).is_err());
        assert_eq!(sub, snapshot);
    }

    #[test]
    fn test_apply_free() {
        let mut sub = SubAccount::new(owner());
        sub.apply_free(BalanceOp::Credit, 7).unwrap();
        assert!(matches!(
            sub.apply_free(BalanceOp::Debit, 8),
            Err(AccountError::InsufficientFree {
                required: 8,
                available: 7
            })
        ));
        sub.apply_free(BalanceOp::Debit, 7).unwrap();
        assert_eq!(sub.free, 0);
    }

    #[test]
    fn test_apply_delta_checks_owner() {
        let mut sub = SubAccount::new(owner());
        let other = OwnerId::new(b"bob".to_vec()).unwrap();
        assert!(matches!(
            sub.apply(&FundDelta::credit_free(other, 1)),
            Err(AccountError::InvalidOwner { .. })
        ));

        sub.apply(&FundDelta::credit_tag(owner(), 9, tag("t"), 4)).unwrap();
        sub.apply(&FundDelta::debit_tag(owner(), 9, tag("t"), 4)).unwrap();
        sub.apply(&FundDelta::credit_free(owner(), 2)).unwrap();
        sub.apply(&FundDelta::debit_free(owner(), 2)).unwrap();
        assert!(sub.is_empty());
    }
}
