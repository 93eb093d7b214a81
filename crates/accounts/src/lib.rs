//! # Sandbox Accounts
//!
//! Native accounts, contract sub-accounts and the [`Ledger`] interface.
//!
//! A contract keeps one [`SubAccount`] per owner: a free balance plus frozen
//! funds identified by `(tag, maturity_height)`. Frozen funds are swept into
//! the free balance once the ledger reaches their height; loading a
//! sub-account through [`Ledger::get_or_create_sub_account`] always does
//! this first.
//!
//! ```rust
//! use sandbox_accounts::{FundTag, OwnerId, SubAccount};
//!
//! let owner = OwnerId::new(b"alice".to_vec()).unwrap();
//! let mut sub = SubAccount::new(owner);
//! sub.credit_tag(FundTag::new(b"x".to_vec()).unwrap(), 50, 100).unwrap();
//! sub.credit_tag(FundTag::new(b"x".to_vec()).unwrap(), 30, 100).unwrap();
//! assert_eq!(sub.frozen_len(), 1);
//!
//! sub.mature(100).unwrap();
//! assert_eq!(sub.free, 80);
//! ```

pub mod account;
pub mod error;
pub mod fund;
pub mod ledger;
pub mod memory;
pub mod sub_account;

pub use account::{is_valid_address, Account, AccountRef, BalanceOp, RegId};
pub use error::{AccountError, AccountResult};
pub use fund::{FundDelta, FundEntry, FundOp, FundTag, OwnerId};
pub use ledger::{Ledger, LedgerOp, TxRecord};
pub use memory::MemoryLedger;
pub use sub_account::SubAccount;
