//! Frozen funds and the deltas scripts record against sub-accounts.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{AccountError, AccountResult};
use sandbox_config::MAX_TAG_SIZE;

/// Label of a frozen fund, at most `MAX_TAG_SIZE` bytes. May be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct FundTag(Vec<u8>);

impl FundTag {
    pub fn new(bytes: impl Into<Vec<u8>>) -> AccountResult<Self> {
        let bytes = bytes.into();
        if bytes.len() > MAX_TAG_SIZE {
            return Err(AccountError::invalid_tag(format!(
                "{} bytes exceeds {}",
                bytes.len(),
                MAX_TAG_SIZE
            )));
        }
        Ok(Self(bytes))
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl TryFrom<Vec<u8>> for FundTag {
    type Error = AccountError;

    fn try_from(bytes: Vec<u8>) -> Result<Self, Self::Error> {
        FundTag::new(bytes)
    }
}

impl From<FundTag> for Vec<u8> {
    fn from(tag: FundTag) -> Self {
        tag.0
    }
}

impl fmt::Display for FundTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

/// Key of a sub-account inside a contract's namespace, 1 to `MAX_TAG_SIZE`
/// bytes. Usually the owner's address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct OwnerId(Vec<u8>);

impl OwnerId {
    pub fn new(bytes: impl Into<Vec<u8>>) -> AccountResult<Self> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(AccountError::invalid_owner("empty owner id"));
        }
        if bytes.len() > MAX_TAG_SIZE {
            return Err(AccountError::invalid_owner(format!(
                "{} bytes exceeds {}",
                bytes.len(),
                MAX_TAG_SIZE
            )));
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl TryFrom<Vec<u8>> for OwnerId {
    type Error = AccountError;

    fn try_from(bytes: Vec<u8>) -> Result<Self, Self::Error> {
        OwnerId::new(bytes)
    }
}

impl From<OwnerId> for Vec<u8> {
    fn from(owner: OwnerId) -> Self {
        owner.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match std::str::from_utf8(&self.0) {
            Ok(text) if text.chars().all(|c| c.is_ascii_graphic()) => f.write_str(text),
            _ => f.write_str(&hex::encode(&self.0)),
        }
    }
}

/// A frozen fund. `(tag, maturity_height)` identifies it within a
/// sub-account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundEntry {
    pub tag: FundTag,
    pub value: u64,
    pub maturity_height: u32,
}

impl FundEntry {
    pub fn new(tag: FundTag, value: u64, maturity_height: u32) -> Self {
        Self {
            tag,
            value,
            maturity_height,
        }
    }

    pub fn same_fund(&self, tag: &FundTag, maturity_height: u32) -> bool {
        self.maturity_height == maturity_height && &self.tag == tag
    }
}

/// Kind of sub-account change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FundOp {
    CreditFree,
    DebitFree,
    CreditTag,
    DebitTag,
}

impl FundOp {
    pub fn is_credit(self) -> bool {
        matches!(self, FundOp::CreditFree | FundOp::CreditTag)
    }

    pub fn is_tagged(self) -> bool {
        matches!(self, FundOp::CreditTag | FundOp::DebitTag)
    }
}

impl fmt::Display for FundOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FundOp::CreditFree => "credit_free",
            FundOp::DebitFree => "debit_free",
            FundOp::CreditTag => "credit_tag",
            FundOp::DebitTag => "debit_tag",
        };
        f.write_str(name)
    }
}

/// A change a script requested against one sub-account. Free operations
/// carry an empty tag and height 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundDelta {
    pub owner: OwnerId,
    pub op: FundOp,
    pub amount: u64,
    pub tag: FundTag,
    pub maturity_height: u32,
}

impl FundDelta {
    pub fn credit_free(owner: OwnerId, amount: u64) -> Self {
        Self::free(owner, FundOp::CreditFree, amount)
    }

    pub fn debit_free(owner: OwnerId, amount: u64) -> Self {
        Self::free(owner, FundOp::DebitFree, amount)
    }

    pub fn credit_tag(owner: OwnerId, amount: u64, tag: FundTag, maturity_height: u32) -> Self {
        Self::tagged(owner, FundOp::CreditTag, amount, tag, maturity_height)
    }

    pub fn debit_tag(owner: OwnerId, amount: u64, tag: FundTag, maturity_height: u32) -> Self {
        Self::tagged(owner, FundOp::DebitTag, amount, tag, maturity_height)
    }

    fn free(owner: OwnerId, op: FundOp, amount: u64) -> Self {
        Self {
            owner,
            op,
            amount,
            tag: FundTag::empty(),
            maturity_height: 0,
        }
    }

    fn tagged(owner: OwnerId, op: FundOp, amount: u64, tag: FundTag, maturity_height: u32) -> Self {
        Self {
            owner,
            op,
            amount,
            tag,
            maturity_height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_length_bounds() {
        assert!(FundTag::new(Vec::new()).is_ok());
        assert!(FundTag::new(vec![7u8; MAX_TAG_SIZE]).is_ok());
        assert!(matches!(
            FundTag::new(vec![7u8; MAX_TAG_SIZE + 1]),
            Err(AccountError::InvalidTag { .. })
        ));
    }

    #[test]
    fn test_owner_length_bounds() {
        assert!(matches!(
            OwnerId::new(Vec::new()),
            Err(AccountError::InvalidOwner { .. })
        ));
        assert!(OwnerId::new(b"alice".to_vec()).is_ok());
        assert!(OwnerId::new(vec![1u8; MAX_TAG_SIZE + 1]).is_err());
    }

    #[test]
    fn test_owner_display() {
        assert_eq!(OwnerId::new(b"alice".to_vec()).unwrap().to_string(), "alice");
        assert_eq!(OwnerId::new(vec![0u8, 255]).unwrap().to_string(), "00ff");
    }

    #[test]
    fn test_serde_rejects_oversized_tag() {
        let json = serde_json::to_string(&vec![1u8; MAX_TAG_SIZE + 1]).unwrap();
        assert!(serde_json::from_str::<FundTag>(&json).is_err());

        let tag = FundTag::new(b"x".to_vec()).unwrap();
        let back: FundTag = serde_json::from_str(&serde_json::to_string(&tag).unwrap()).unwrap();
        assert_eq!(back, tag);
    }

    #[test]
    fn test_delta_constructors() {
        let owner = OwnerId::new(b"bob".to_vec()).unwrap();
        let free = FundDelta::credit_free(owner.clone(), 5);
        assert!(free.op.is_credit());
        assert!(!free.op.is_tagged());
        assert!(free.tag.is_empty());
        assert_eq!(free.maturity_height, 0);

        let tagged = FundDelta::debit_tag(owner, 5, FundTag::new(b"t".to_vec()).unwrap(), 9);
        assert!(!tagged.op.is_credit());
        assert!(tagged.op.is_tagged());
    }
}
