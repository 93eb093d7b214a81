//! Receipts of committed runs.

use serde::{Deserialize, Serialize};

use crate::effects::EffectRecord;
use sandbox_accounts::{AccountRef, BalanceOp, FundOp, FundTag, OwnerId, RegId};

/// One side of a receipt entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Party {
    /// The executing contract's native account.
    Contract(RegId),
    /// Any other native account.
    Account(AccountRef),
    /// A sub-account inside the executing contract.
    SubAccount(OwnerId),
}

/// What moved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptAsset {
    /// Native coin, by symbol.
    Symbol(String),
    /// A frozen fund.
    Tag { tag: FundTag, maturity_height: u32 },
}

/// Which operation produced an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptKind {
    AccountCredit,
    AccountDebit,
    FreeCredit,
    FreeDebit,
    TagCredit,
    TagDebit,
}

/// One applied movement of value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptEntry {
    pub from: Party,
    pub to: Party,
    pub asset: ReceiptAsset,
    pub amount: u64,
    pub kind: ReceiptKind,
}

/// Applied effects of one committed run, in application order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Hex-encoded hash of the invoking transaction.
    pub tx_hash: String,
    pub contract: RegId,
    pub entries: Vec<ReceiptEntry>,
}

impl Receipt {
    /// Builds the receipt from the collector's records in application order.
    pub fn from_records(
        tx_hash: String,
        contract: RegId,
        native_symbol: &str,
        records: &[EffectRecord],
    ) -> Self {
        let entries = records
            .iter()
            .map(|record| entry_for(contract, native_symbol, record))
            .collect();
        Self {
            tx_hash,
            contract,
            entries,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

fn entry_for(contract: RegId, native_symbol: &str, record: &EffectRecord) -> ReceiptEntry {
    let symbol = || ReceiptAsset::Symbol(native_symbol.to_string());
    match record {
        EffectRecord::Account(delta) => {
            let (from, to, kind) = match delta.op {
                BalanceOp::Credit => (
                    Party::Contract(contract),
                    Party::Account(delta.account.clone()),
                    ReceiptKind::AccountCredit,
                ),
                BalanceOp::Debit => (
                    Party::Account(delta.account.clone()),
                    Party::Contract(contract),
                    ReceiptKind::AccountDebit,
                ),
            };
            ReceiptEntry {
                from,
                to,
                asset: symbol(),
                amount: delta.amount,
                kind,
            }
        }
        EffectRecord::Fund(delta) => {
            let owner = Party::SubAccount(delta.owner.clone());
            let tagged = || ReceiptAsset::Tag {
                tag: delta.tag.clone(),
                maturity_height: delta.maturity_height,
            };
            let (from, to, asset, kind) = match delta.op {
                FundOp::CreditFree => (Party::Contract(contract), owner, symbol(), ReceiptKind::FreeCredit),
                FundOp::DebitFree => (owner, Party::Contract(contract), symbol(), ReceiptKind::FreeDebit),
                FundOp::CreditTag => (Party::Contract(contract), owner, tagged(), ReceiptKind::TagCredit),
                FundOp::DebitTag => (owner, Party::Contract(contract), tagged(), ReceiptKind::TagDebit),
            };
            ReceiptEntry {
                from,
                to,
                asset,
                amount: delta.amount,
                kind,
            }
        }
    }
}
