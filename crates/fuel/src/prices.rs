//! Fuel prices.
//!
//! Opcode prices live in [`crate::opcode`]; this module holds everything a
//! host call or the allocator burns.

/// Fuel per interpreter step.
pub const FUEL_STEP: u64 = 1;

/// Memory is charged per started block of this many bytes.
pub const MEM_UNIT_SIZE: u64 = 32;
pub const FUEL_MEM_ADDED: u64 = 3;

// Storage, per byte
pub const FUEL_STORE_ADDED: u64 = 600;
pub const FUEL_STORE_RESET: u64 = 150;
pub const FUEL_STORE_UNCHANGED: u64 = 3;
pub const FUEL_STORE_GET: u64 = 6;
pub const FUEL_STORE_REFUND: u64 = 450;

// Account operations
pub const FUEL_ACCOUNT_OPERATE: u64 = 4_500;
pub const FUEL_ACCOUNT_GET_VALUE: u64 = 400;
pub const FUEL_ACCOUNT_GET_FUND_TAG: u64 = 600;
pub const FUEL_ACCOUNT_UNCHANGED: u64 = 200;

// Fixed-cost host calls
pub const FUEL_CALL_INT64_MUL: u64 = 5;
pub const FUEL_CALL_INT64_ADD: u64 = 3;
pub const FUEL_CALL_INT64_SUB: u64 = 3;
pub const FUEL_CALL_INT64_DIV: u64 = 5;
pub const FUEL_CALL_BYTE_TO_INTEGER: u64 = 10;
pub const FUEL_CALL_INTEGER_TO_BYTE4: u64 = 6;
pub const FUEL_CALL_INTEGER_TO_BYTE8: u64 = 8;
pub const FUEL_CALL_GET_BLOCK_HASH: u64 = 4;
pub const FUEL_CALL_GET_BLOCK_TIMESTAMP: u64 = 4;
pub const FUEL_CALL_GET_CUR_TX_HASH: u64 = 4;
pub const FUEL_CALL_GET_CUR_RUN_ENV_HEIGHT: u64 = 4;
pub const FUEL_CALL_GET_CUR_TX_ACCOUNT: u64 = 4;
pub const FUEL_CALL_GET_CUR_TX_PAY_AMOUNT: u64 = 4;
pub const FUEL_CALL_GET_CONTRACT_REG_ID: u64 = 4;
pub const FUEL_CALL_GET_TX_REG_ID: u64 = 200;
pub const FUEL_CALL_GET_TX_CONFIRM_HEIGHT: u64 = 200;
pub const FUEL_CALL_GET_ACCOUNT_PUBLIC_KEY: u64 = 200;
pub const FUEL_CALL_GET_BASE58_ADDR: u64 = 200;

// Data-dependent host calls: fixed part plus a price per started unit
pub const FUEL_CALL_SHA256: u64 = 50;
pub const FUEL_DATA32_SHA256: u64 = 10;
pub const FUEL_CALL_SHA256_ONCE: u64 = 30;
pub const FUEL_DATA32_SHA256_ONCE: u64 = 6;
pub const FUEL_CALL_VERIFY_SIGNATURE: u64 = 200;
pub const FUEL_DATA32_VERIFY_SIGNATURE: u64 = 10;
pub const FUEL_CALL_LOG_PRINT: u64 = 375;
pub const FUEL_DATA1_LOG_PRINT: u64 = 8;
pub const FUEL_CALL_GET_CUR_TX_CONTRACT: u64 = 4;
pub const FUEL_CALL_GET_TX_CONTRACT: u64 = 200;
pub const FUEL_DATA32_GET_TX_CONTRACT: u64 = 3;
