//! Native accounts and the reference forms scripts use to name them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{AccountError, AccountResult};
use sandbox_config::{ADDRESS_SIZE, REG_ID_SIZE};

/// Registration id: the height and in-block index of the transaction that
/// registered the account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegId {
    pub height: u32,
    pub index: u16,
}

impl RegId {
    pub const fn new(height: u32, index: u16) -> Self {
        Self { height, index }
    }

    /// The zero id, which names no account.
    pub fn is_empty(&self) -> bool {
        self.height == 0 && self.index == 0
    }

    /// Little-endian height followed by little-endian index.
    pub fn to_raw(&self) -> [u8; REG_ID_SIZE] {
        let mut raw = [0u8; REG_ID_SIZE];
        raw[..4].copy_from_slice(&self.height.to_le_bytes());
        raw[4..].copy_from_slice(&self.index.to_le_bytes());
        raw
    }

    pub fn from_raw(raw: &[u8]) -> AccountResult<Self> {
        if raw.len() != REG_ID_SIZE {
            return Err(AccountError::invalid_account_ref(format!(
                "reg id must be {} bytes, got {}",
                REG_ID_SIZE,
                raw.len()
            )));
        }
        let height = u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]);
        let index = u16::from_le_bytes([raw[4], raw[5]]);
        Ok(Self { height, index })
    }
}

impl fmt::Display for RegId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.height, self.index)
    }
}

impl FromStr for RegId {
    type Err = AccountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (height, index) = s
            .split_once('-')
            .ok_or_else(|| AccountError::invalid_account_ref(format!("malformed reg id '{}'", s)))?;
        let height = height
            .parse::<u32>()
            .map_err(|e| AccountError::invalid_account_ref(format!("reg id height: {}", e)))?;
        let index = index
            .parse::<u16>()
            .map_err(|e| AccountError::invalid_account_ref(format!("reg id index: {}", e)))?;
        Ok(Self { height, index })
    }
}

/// How a script names a native account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountRef {
    RegId(RegId),
    Address(String),
}

impl AccountRef {
    /// True when the reference is in a form the ledger can resolve: a
    /// non-zero reg id, or a Base58 address of the expected length.
    pub fn is_recognized(&self) -> bool {
        match self {
            AccountRef::RegId(id) => !id.is_empty(),
            AccountRef::Address(address) => is_valid_address(address),
        }
    }

    pub fn validate(&self) -> AccountResult<()> {
        if self.is_recognized() {
            Ok(())
        } else {
            Err(AccountError::invalid_account_ref(self.to_string()))
        }
    }

    pub fn reg_id(&self) -> Option<RegId> {
        match self {
            AccountRef::RegId(id) => Some(*id),
            AccountRef::Address(_) => None,
        }
    }
}

impl From<RegId> for AccountRef {
    fn from(id: RegId) -> Self {
        AccountRef::RegId(id)
    }
}

impl fmt::Display for AccountRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountRef::RegId(id) => write!(f, "{}", id),
            AccountRef::Address(address) => f.write_str(address),
        }
    }
}

/// Checks that `address` is a Base58 string of the protocol's address length.
pub fn is_valid_address(address: &str) -> bool {
    address.len() == ADDRESS_SIZE && bs58::decode(address).into_vec().is_ok()
}

/// Direction of a native balance change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceOp {
    Credit,
    Debit,
}

impl fmt::Display for BalanceOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BalanceOp::Credit => f.write_str("credit"),
            BalanceOp::Debit => f.write_str("debit"),
        }
    }
}

/// A native-coin account of the outer ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unset until the account is registered.
    pub reg_id: Option<RegId>,
    pub address: String,
    pub balance: u64,
    /// Compressed secp256k1 owner key, once the account has published one.
    #[serde(default)]
    pub public_key: Option<Vec<u8>>,
}

impl Account {
    pub fn new<S: Into<String>>(address: S) -> Self {
        Self {
            reg_id: None,
            address: address.into(),
            balance: 0,
            public_key: None,
        }
    }

    pub fn with_reg_id(mut self, reg_id: RegId) -> Self {
        self.reg_id = Some(reg_id);
        self
    }

    pub fn with_balance(mut self, balance: u64) -> Self {
        self.balance = balance;
        self
    }

    pub fn with_public_key(mut self, public_key: Vec<u8>) -> Self {
        self.public_key = Some(public_key);
        self
    }

    /// True when `account` names this account by either form.
    pub fn matches(&self, account: &AccountRef) -> bool {
        match account {
            AccountRef::RegId(id) => self.reg_id == Some(*id),
            AccountRef::Address(address) => &self.address == address,
        }
    }

    pub fn credit(&mut self, amount: u64) -> AccountResult<()> {
        self.balance = self.balance.checked_add(amount).ok_or_else(|| {
            AccountError::overflow(format!("credit {} to {}", amount, self.address))
        })?;
        Ok(())
    }

    pub fn debit(&mut self, amount: u64) -> AccountResult<()> {
        if amount > self.balance {
            return Err(AccountError::insufficient_balance(amount, self.balance));
        }
        self.balance -= amount;
        Ok(())
    }

    pub fn apply(&mut self, op: BalanceOp, amount: u64) -> AccountResult<()> {
        match op {
            BalanceOp::Credit => self.credit(amount),
            BalanceOp::Debit => self.debit(amount),
        }
    }
}
