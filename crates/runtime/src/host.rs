//! Host function bridge.
//!
//! Every call a script can make into the node is a [`HostCall`] variant.
//! [`HostBridge::dispatch`] validates the call's parameters, burns its fuel,
//! performs the read or records the effect, and hands back a [`HostValue`].
//! The bridge never writes to the ledger.
//!
//! A parameter error fails only that call. Any other error is latched: the
//! run is over, and every later call or burn returns the same error without
//! touching the meter.

use secp256k1::ecdsa::Signature;
use secp256k1::{Message, PublicKey, Secp256k1};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::context::ExecutionContext;
use crate::effects::{AccountDelta, EffectCollector, StorageWrite};
use crate::error::{ExecError, ExecResult};
use sandbox_accounts::{
    is_valid_address, AccountRef, FundDelta, FundOp, FundTag, Ledger, OwnerId, RegId, SubAccount,
};
use sandbox_config::{ADDRESS_SIZE, MAX_HOST_BUFFER_SIZE, PUBLIC_KEY_SIZE};
use sandbox_fuel::prices::*;
use sandbox_fuel::{FuelMeter, FuelResult};

/// Value returned to the script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostValue {
    Nil,
    Bool(bool),
    Int(i64),
    Amount(u64),
    Bytes(Vec<u8>),
}

/// A sub-account operation as a script states it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppOperate {
    pub owner: Vec<u8>,
    pub op: FundOp,
    pub amount: u64,
    /// Ignored for free operations.
    pub tag: Vec<u8>,
    /// Ignored for free operations.
    pub maturity_height: u32,
}

impl AppOperate {
    fn to_delta(&self) -> ExecResult<FundDelta> {
        let owner = OwnerId::new(self.owner.clone())?;
        let delta = match self.op {
            FundOp::CreditFree => FundDelta::credit_free(owner, self.amount),
            FundOp::DebitFree => FundDelta::debit_free(owner, self.amount),
            FundOp::CreditTag => {
                FundDelta::credit_tag(owner, self.amount, FundTag::new(self.tag.clone())?, self.maturity_height)
            }
            FundOp::DebitTag => {
                FundDelta::debit_tag(owner, self.amount, FundTag::new(self.tag.clone())?, self.maturity_height)
            }
        };
        Ok(delta)
    }
}

/// Calls a script can make.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostCall {
    Int64Mul(i64, i64),
    Int64Add(i64, i64),
    Int64Sub(i64, i64),
    Int64Div(i64, i64),
    ByteToInteger(Vec<u8>),
    IntegerToByte4(i32),
    IntegerToByte8(i64),
    Sha256(Vec<u8>),
    Sha256Once(Vec<u8>),
    LogPrint(Vec<u8>),
    GetCurTxPayAmount,
    GetCurTxAccount,
    GetContractRegId,
    GetCurRunEnvHeight,
    GetCurTxHash,
    GetBlockTimestamp,
    GetBlockHash(u32),
    GetTxRegId([u8; 32]),
    GetTxConfirmHeight([u8; 32]),
    /// Arguments of a confirmed contract invocation, or of this run's own
    /// transaction.
    GetTxContract([u8; 32]),
    GetAccountPublicKey(AccountRef),
    GetBase58Addr(RegId),
    /// Checks a DER signature over the double SHA-256 of `data`.
    VerifySignature {
        data: Vec<u8>,
        public_key: Vec<u8>,
        signature: Vec<u8>,
    },
    QueryAccountBalance(AccountRef),
    WriteData { key: Vec<u8>, value: Vec<u8> },
    ModifyData { key: Vec<u8>, value: Vec<u8> },
    DeleteData { key: Vec<u8> },
    ReadData { key: Vec<u8> },
    GetContractData { contract: RegId, key: Vec<u8> },
    WriteOutput(AccountDelta),
    WriteOutAppOperate(Vec<AppOperate>),
    GetUserAppAccValue { owner: Vec<u8> },
    GetUserAppAccFundWithTag { owner: Vec<u8>, tag: Vec<u8>, maturity_height: u32 },
    TransferContractAsset { to: Vec<u8> },
    TransferSomeAsset { to: Vec<u8>, amount: u64, tag: Vec<u8>, maturity_height: u32 },
}

impl HostCall {
    pub fn name(&self) -> &'static str {
        match self {
            HostCall::Int64Mul(..) => "Int64Mul",
            HostCall::Int64Add(..) => "Int64Add",
            HostCall::Int64Sub(..) => "Int64Sub",
            HostCall::Int64Div(..) => "Int64Div",
            HostCall::ByteToInteger(_) => "ByteToInteger",
            HostCall::IntegerToByte4(_) => "IntegerToByte4",
            HostCall::IntegerToByte8(_) => "IntegerToByte8",
            HostCall::Sha256(_) => "Sha256",
            HostCall::Sha256Once(_) => "Sha256Once",
            HostCall::LogPrint(_) => "LogPrint",
            HostCall::GetCurTxPayAmount => "GetCurTxPayAmount",
            HostCall::GetCurTxAccount => "GetCurTxAccount",
            HostCall::GetContractRegId => "GetContractRegId",
            HostCall::GetCurRunEnvHeight => "GetCurRunEnvHeight",
            HostCall::GetCurTxHash => "GetCurTxHash",
            HostCall::GetBlockTimestamp => "GetBlockTimestamp",
            HostCall::GetBlockHash(_) => "GetBlockHash",
            HostCall::GetTxRegId(_) => "GetTxRegId",
            HostCall::GetTxConfirmHeight(_) => "GetTxConfirmHeight",
            HostCall::GetTxContract(_) => "GetTxContract",
            HostCall::GetAccountPublicKey(_) => "GetAccountPublicKey",
            HostCall::GetBase58Addr(_) => "GetBase58Addr",
            HostCall::VerifySignature { .. } => "VerifySignature",
            HostCall::QueryAccountBalance(_) => "QueryAccountBalance",
            HostCall::WriteData { .. } => "WriteData",
            HostCall::ModifyData { .. } => "ModifyData",
            HostCall::DeleteData { .. } => "DeleteData",
            HostCall::ReadData { .. } => "ReadData",
            HostCall::GetContractData { .. } => "GetContractData",
            HostCall::WriteOutput(_) => "WriteOutput",
            HostCall::WriteOutAppOperate(_) => "WriteOutAppOperate",
            HostCall::GetUserAppAccValue { .. } => "GetUserAppAccValue",
            HostCall::GetUserAppAccFundWithTag { .. } => "GetUserAppAccFundWithTag",
            HostCall::TransferContractAsset { .. } => "TransferContractAsset",
            HostCall::TransferSomeAsset { .. } => "TransferSomeAsset",
        }
    }
}

/// Mutable state of one run, owned by the driver.
#[derive(Debug)]
pub struct RunState {
    pub(crate) meter: FuelMeter,
    pub(crate) effects: EffectCollector,
    pub(crate) logs: Vec<String>,
    pub(crate) fatal: Option<ExecError>,
}

impl RunState {
    /// `meter` must already be started.
    pub fn new(meter: FuelMeter, max_outputs: usize) -> Self {
        Self {
            meter,
            effects: EffectCollector::new(max_outputs),
            logs: Vec::new(),
            fatal: None,
        }
    }

    pub fn meter(&self) -> &FuelMeter {
        &self.meter
    }

    pub fn effects(&self) -> &EffectCollector {
        &self.effects
    }

    pub fn logs(&self) -> &[String] {
        &self.logs
    }

    /// The error that ended the run, if one did.
    pub fn fatal(&self) -> Option<&ExecError> {
        self.fatal.as_ref()
    }
}

/// The interpreter's handle on the node for one run.
pub struct HostBridge<'r, L: Ledger> {
    ctx: &'r ExecutionContext,
    ledger: &'r L,
    state: &'r mut RunState,
}

impl<'r, L: Ledger> HostBridge<'r, L> {
    pub fn new(ctx: &'r ExecutionContext, ledger: &'r L, state: &'r mut RunState) -> Self {
        Self { ctx, ledger, state }
    }

    pub fn context(&self) -> &ExecutionContext {
        self.ctx
    }

    pub fn meter(&self) -> &FuelMeter {
        &self.state.meter
    }

    pub fn is_halted(&self) -> bool {
        self.state.fatal.is_some()
    }

    /// Step fuel, burned by the interpreter loop.
    pub fn burn_step(&mut self, n: u64) -> ExecResult<()> {
        self.metered(|meter| meter.burn_step(n))
    }

    /// Opcode fuel, burned by the interpreter loop.
    pub fn burn_opcode(&mut self, code: u8) -> ExecResult<()> {
        self.metered(|meter| meter.burn_opcode(code))
    }

    /// Memory fuel, burned by the interpreter's allocator.
    pub fn burn_memory(&mut self, delta_bytes: i64) -> ExecResult<()> {
        self.metered(|meter| meter.burn_memory(delta_bytes))
    }

    /// Performs one host call.
    pub fn dispatch(&mut self, call: HostCall) -> ExecResult<HostValue> {
        if let Some(fatal) = &self.state.fatal {
            return Err(fatal.clone());
        }
        let name = call.name();
        let result = self.execute(call);
        if let Err(error) = &result {
            if error.is_recoverable() {
                debug!(call = name, error = %error, "host call rejected");
            } else {
                debug!(call = name, error = %error, "host call halted the run");
                self.state.fatal = Some(error.clone());
            }
        }
        result
    }

    fn metered(&mut self, burn: impl FnOnce(&mut FuelMeter) -> FuelResult<()>) -> ExecResult<()> {
        if let Some(fatal) = &self.state.fatal {
            return Err(fatal.clone());
        }
        if let Err(error) = burn(&mut self.state.meter) {
            let error = ExecError::from(error);
            self.state.fatal = Some(error.clone());
            return Err(error);
        }
        Ok(())
    }

    fn burn(&mut self, burn: impl FnOnce(&mut FuelMeter) -> FuelResult<()>) -> ExecResult<()> {
        burn(&mut self.state.meter).map_err(ExecError::from)
    }

    fn execute(&mut self, call: HostCall) -> ExecResult<HostValue> {
        match call {
            HostCall::Int64Mul(a, b) => {
                self.burn(|m| m.burn_call(FUEL_CALL_INT64_MUL))?;
                int_result(a.checked_mul(b), "Int64Mul")
            }
            HostCall::Int64Add(a, b) => {
                self.burn(|m| m.burn_call(FUEL_CALL_INT64_ADD))?;
                int_result(a.checked_add(b), "Int64Add")
            }
            HostCall::Int64Sub(a, b) => {
                self.burn(|m| m.burn_call(FUEL_CALL_INT64_SUB))?;
                int_result(a.checked_sub(b), "Int64Sub")
            }
            HostCall::Int64Div(a, b) => {
                if b == 0 {
                    return Err(ExecError::param("Int64Div by zero"));
                }
                self.burn(|m| m.burn_call(FUEL_CALL_INT64_DIV))?;
                int_result(a.checked_div(b), "Int64Div")
            }
            HostCall::ByteToInteger(bytes) => {
                let value = match bytes.as_slice() {
                    [a, b, c, d] => i64::from(u32::from_le_bytes([*a, *b, *c, *d])),
                    [a, b, c, d, e, f, g, h] => i64::from_le_bytes([*a, *b, *c, *d, *e, *f, *g, *h]),
                    _ => {
                        return Err(ExecError::param(format!(
                            "ByteToInteger takes 4 or 8 bytes, got {}",
                            bytes.len()
                        )))
                    }
                };
                self.burn(|m| m.burn_call(FUEL_CALL_BYTE_TO_INTEGER))?;
                Ok(HostValue::Int(value))
            }
            HostCall::IntegerToByte4(value) => {
                self.burn(|m| m.burn_call(FUEL_CALL_INTEGER_TO_BYTE4))?;
                Ok(HostValue::Bytes(value.to_le_bytes().to_vec()))
            }
            HostCall::IntegerToByte8(value) => {
                self.burn(|m| m.burn_call(FUEL_CALL_INTEGER_TO_BYTE8))?;
                Ok(HostValue::Bytes(value.to_le_bytes().to_vec()))
            }
            HostCall::Sha256(data) => {
                self.burn(|m| {
                    m.burn_call_with_data(FUEL_CALL_SHA256, data.len() as u64, 32, FUEL_DATA32_SHA256)
                })?;
                let once = Sha256::digest(&data);
                Ok(HostValue::Bytes(Sha256::digest(once).to_vec()))
            }
            HostCall::Sha256Once(data) => {
                self.burn(|m| {
                    m.burn_call_with_data(
                        FUEL_CALL_SHA256_ONCE,
                        data.len() as u64,
                        32,
                        FUEL_DATA32_SHA256_ONCE,
                    )
                })?;
                Ok(HostValue::Bytes(Sha256::digest(&data).to_vec()))
            }
            HostCall::LogPrint(data) => {
                self.burn(|m| {
                    m.burn_call_with_data(FUEL_CALL_LOG_PRINT, data.len() as u64, 1, FUEL_DATA1_LOG_PRINT)
                })?;
                let line = String::from_utf8_lossy(&data).into_owned();
                info!(contract = %self.ctx.contract, message = %line, "contract log");
                self.state.logs.push(line);
                Ok(HostValue::Bool(true))
            }
            HostCall::GetCurTxPayAmount => {
                self.burn(|m| m.burn_call(FUEL_CALL_GET_CUR_TX_PAY_AMOUNT))?;
                Ok(HostValue::Amount(self.ctx.tx.coin_amount))
            }
            HostCall::GetCurTxAccount => {
                self.burn(|m| m.burn_call(FUEL_CALL_GET_CUR_TX_ACCOUNT))?;
                Ok(HostValue::Bytes(self.ctx.tx.sender.to_raw().to_vec()))
            }
            HostCall::GetContractRegId => {
                self.burn(|m| m.burn_call(FUEL_CALL_GET_CONTRACT_REG_ID))?;
                Ok(HostValue::Bytes(self.ctx.contract.to_raw().to_vec()))
            }
            HostCall::GetCurRunEnvHeight => {
                self.burn(|m| m.burn_call(FUEL_CALL_GET_CUR_RUN_ENV_HEIGHT))?;
                Ok(HostValue::Int(i64::from(self.ctx.height)))
            }
            HostCall::GetCurTxHash => {
                self.burn(|m| m.burn_call(FUEL_CALL_GET_CUR_TX_HASH))?;
                Ok(HostValue::Bytes(self.ctx.tx.hash.to_vec()))
            }
            HostCall::GetBlockTimestamp => {
                self.burn(|m| m.burn_call(FUEL_CALL_GET_BLOCK_TIMESTAMP))?;
                Ok(HostValue::Int(self.ctx.tx.block_timestamp))
            }
            HostCall::GetBlockHash(height) => {
                if height == 0 || height >= self.ctx.height {
                    return Err(ExecError::param(format!(
                        "block hash only for heights 1..{}, got {}",
                        self.ctx.height, height
                    )));
                }
                self.burn(|m| m.burn_call(FUEL_CALL_GET_BLOCK_HASH))?;
                self.ledger
                    .get_block_hash(height)?
                    .map(|hash| HostValue::Bytes(hash.to_vec()))
                    .ok_or_else(|| ExecError::param(format!("no block at height {}", height)))
            }
            HostCall::GetTxRegId(hash) => {
                self.burn(|m| m.burn_call(FUEL_CALL_GET_TX_REG_ID))?;
                match self.ledger.get_transaction(&hash)? {
                    Some(tx) => tx
                        .sender
                        .map(|id| HostValue::Bytes(id.to_raw().to_vec()))
                        .ok_or_else(|| ExecError::param("transaction sender is not registered")),
                    None => Ok(HostValue::Nil),
                }
            }
            HostCall::GetTxConfirmHeight(hash) => {
                self.burn(|m| m.burn_call(FUEL_CALL_GET_TX_CONFIRM_HEIGHT))?;
                self.ledger
                    .get_transaction(&hash)?
                    .map(|tx| HostValue::Int(i64::from(tx.confirm_height)))
                    .ok_or_else(|| ExecError::param(format!("unknown transaction {}", hex::encode(hash))))
            }
            HostCall::GetTxContract(hash) => self.tx_contract(hash),
            HostCall::GetAccountPublicKey(account) => {
                account.validate()?;
                self.burn(|m| m.burn_call(FUEL_CALL_GET_ACCOUNT_PUBLIC_KEY))?;
                let found = self
                    .ledger
                    .get_account(&account)?
                    .ok_or_else(|| ExecError::param(format!("no account {}", account)))?;
                found
                    .public_key
                    .map(HostValue::Bytes)
                    .ok_or_else(|| ExecError::param(format!("account {} has no public key", account)))
            }
            HostCall::GetBase58Addr(id) => {
                if id.is_empty() {
                    return Err(ExecError::param("empty reg id"));
                }
                self.burn(|m| m.burn_call(FUEL_CALL_GET_BASE58_ADDR))?;
                match self.ledger.get_account(&AccountRef::RegId(id))? {
                    Some(found) if is_valid_address(&found.address) => {
                        Ok(HostValue::Bytes(found.address.into_bytes()))
                    }
                    _ => Err(ExecError::param(format!("reg id {} has no address", id))),
                }
            }
            HostCall::VerifySignature {
                data,
                public_key,
                signature,
            } => {
                if public_key.len() != PUBLIC_KEY_SIZE {
                    return Err(ExecError::param(format!(
                        "public key must be {} bytes, got {}",
                        PUBLIC_KEY_SIZE,
                        public_key.len()
                    )));
                }
                self.burn(|m| {
                    m.burn_call_with_data(
                        FUEL_CALL_VERIFY_SIGNATURE,
                        data.len() as u64,
                        32,
                        FUEL_DATA32_VERIFY_SIGNATURE,
                    )
                })?;
                let valid = verify_signature(&data, &public_key, &signature);
                if !valid {
                    debug!(contract = %self.ctx.contract, "signature did not verify");
                }
                Ok(HostValue::Bool(valid))
            }
            HostCall::QueryAccountBalance(account) => {
                account.validate()?;
                self.burn(|m| m.burn_account_get(FUEL_ACCOUNT_GET_VALUE))?;
                Ok(match self.ledger.get_account(&account)? {
                    Some(found) => HostValue::Amount(found.balance),
                    None => HostValue::Nil,
                })
            }
            HostCall::WriteData { key, value } => {
                check_key(&key)?;
                check_value(&value)?;
                let old = self.read_own_data(&key)?;
                let old_len = old.map_or(0, |v| v.len()) as u64;
                self.burn(|m| m.burn_storage_set(key.len() as u64, old_len, value.len() as u64))?;
                self.state.effects.put_data(key, value);
                Ok(HostValue::Bool(true))
            }
            HostCall::ModifyData { key, value } => {
                check_key(&key)?;
                check_value(&value)?;
                match self.read_own_data(&key)? {
                    Some(old) => {
                        self.burn(|m| {
                            m.burn_storage_set(key.len() as u64, old.len() as u64, value.len() as u64)
                        })?;
                        self.state.effects.put_data(key, value);
                        Ok(HostValue::Bool(true))
                    }
                    None => {
                        self.burn(|m| m.burn_storage_unchanged(key.len() as u64, value.len() as u64))?;
                        Ok(HostValue::Bool(false))
                    }
                }
            }
            HostCall::DeleteData { key } => {
                check_key(&key)?;
                match self.read_own_data(&key)? {
                    Some(old) => {
                        self.burn(|m| m.burn_storage_set(key.len() as u64, old.len() as u64, 0))?;
                        self.state.effects.erase_data(key);
                        Ok(HostValue::Bool(true))
                    }
                    None => {
                        self.burn(|m| m.burn_storage_unchanged(key.len() as u64, 0))?;
                        Ok(HostValue::Bool(false))
                    }
                }
            }
            HostCall::ReadData { key } => {
                check_key(&key)?;
                let found = self.read_own_data(&key)?;
                self.storage_read(&key, found)
            }
            HostCall::GetContractData { contract, key } => {
                check_key(&key)?;
                if contract.is_empty() {
                    return Err(ExecError::param("empty contract id"));
                }
                let found = if contract == self.ctx.contract {
                    self.read_own_data(&key)?
                } else {
                    self.ledger.get_contract_data(&contract, &key)?
                };
                self.storage_read(&key, found)
            }
            HostCall::WriteOutput(delta) => {
                self.burn(|m| m.burn_account_op(1))?;
                self.state.effects.push_account_delta(delta)?;
                Ok(HostValue::Bool(true))
            }
            HostCall::WriteOutAppOperate(operations) => {
                if operations.is_empty() {
                    return Err(ExecError::param("no sub-account operations"));
                }
                let deltas = operations
                    .iter()
                    .map(AppOperate::to_delta)
                    .collect::<ExecResult<Vec<_>>>()?;
                self.burn(|m| m.burn_account_op(deltas.len() as u64))?;
                for delta in deltas {
                    self.state.effects.push_fund_delta(delta);
                }
                Ok(HostValue::Bool(true))
            }
            HostCall::GetUserAppAccValue { owner } => {
                let owner = OwnerId::new(owner)?;
                self.burn(|m| m.burn_account_get(FUEL_ACCOUNT_GET_VALUE))?;
                Ok(match self.load_sub_account(&owner)? {
                    Some(sub) => HostValue::Amount(sub.free),
                    None => HostValue::Nil,
                })
            }
            HostCall::GetUserAppAccFundWithTag {
                owner,
                tag,
                maturity_height,
            } => {
                let owner = OwnerId::new(owner)?;
                let tag = FundTag::new(tag)?;
                self.burn(|m| m.burn_account_get(FUEL_ACCOUNT_GET_FUND_TAG))?;
                match self.load_sub_account(&owner)? {
                    Some(sub) => sub
                        .fund_value(&tag, maturity_height)
                        .map(HostValue::Amount)
                        .ok_or_else(|| {
                            ExecError::param(format!("no fund {}@{} for {}", tag, maturity_height, owner))
                        }),
                    None => Ok(HostValue::Nil),
                }
            }
            HostCall::TransferContractAsset { to } => self.transfer_contract_asset(to),
            HostCall::TransferSomeAsset {
                to,
                amount,
                tag,
                maturity_height,
            } => self.transfer_some_asset(to, amount, tag, maturity_height),
        }
    }

    /// This run's arguments when `hash` is the current transaction, otherwise
    /// those of a confirmed invocation. Unknown hashes burn nothing.
    fn tx_contract(&mut self, hash: [u8; 32]) -> ExecResult<HostValue> {
        if hash == self.ctx.tx.hash {
            let len = self.ctx.arguments.len() as u64;
            self.burn(|m| {
                m.burn_call_with_data(FUEL_CALL_GET_CUR_TX_CONTRACT, len, 32, FUEL_DATA32_GET_TX_CONTRACT)
            })?;
            return Ok(HostValue::Bytes(self.ctx.arguments.clone()));
        }
        match self.ledger.get_transaction(&hash)? {
            Some(tx) => match tx.arguments {
                Some(arguments) => {
                    let len = arguments.len() as u64;
                    self.burn(|m| {
                        m.burn_call_with_data(FUEL_CALL_GET_TX_CONTRACT, len, 32, FUEL_DATA32_GET_TX_CONTRACT)
                    })?;
                    Ok(HostValue::Bytes(arguments))
                }
                None => {
                    self.burn(|m| m.burn_call(FUEL_CALL_GET_TX_CONTRACT))?;
                    Err(ExecError::param("transaction is not a contract invocation"))
                }
            },
            None => Ok(HostValue::Nil),
        }
    }

    /// The executing contract's value for `key`, as of this point in the run.
    fn read_own_data(&self, key: &[u8]) -> ExecResult<Option<Vec<u8>>> {
        match self.state.effects.pending_data(key) {
            Some(StorageWrite::Put(value)) => Ok(Some(value.clone())),
            Some(StorageWrite::Erase) => Ok(None),
            None => Ok(self.ledger.get_contract_data(&self.ctx.contract, key)?),
        }
    }

    fn storage_read(&mut self, key: &[u8], found: Option<Vec<u8>>) -> ExecResult<HostValue> {
        match found {
            Some(value) => {
                self.burn(|m| m.burn_storage_get(key.len() as u64, value.len() as u64))?;
                Ok(HostValue::Bytes(value))
            }
            None => {
                self.burn(|m| m.burn_storage_unchanged(key.len() as u64, 0))?;
                Ok(HostValue::Nil)
            }
        }
    }

    /// Stored sub-account of the executing contract, matured at the run's height.
    fn load_sub_account(&self, owner: &OwnerId) -> ExecResult<Option<SubAccount>> {
        match self.ledger.get_sub_account(&self.ctx.contract, owner)? {
            Some(mut sub) => {
                sub.mature(self.ctx.height)?;
                Ok(Some(sub))
            }
            None => Ok(None),
        }
    }

    /// Receiver of a transfer: a valid address other than the sender's.
    fn transfer_receiver(&self, to: &[u8]) -> ExecResult<OwnerId> {
        if to.len() != ADDRESS_SIZE {
            return Err(ExecError::param(format!(
                "receiver must be a {}-byte address",
                ADDRESS_SIZE
            )));
        }
        if to == self.ctx.tx.sender_address.as_bytes() {
            return Err(ExecError::param("sender and receiver are the same"));
        }
        Ok(OwnerId::new(to.to_vec())?)
    }

    /// Moves the sender's whole sub-account, free and frozen, to `to`.
    fn transfer_contract_asset(&mut self, to: Vec<u8>) -> ExecResult<HostValue> {
        let receiver = self.transfer_receiver(&to)?;
        let address_ok = std::str::from_utf8(&to).map(is_valid_address).unwrap_or(false);
        if !address_ok {
            self.burn(|m| m.burn_account_get(FUEL_ACCOUNT_UNCHANGED))?;
            return Err(ExecError::param("receiver is not a valid address"));
        }

        let sender = self.ctx.tx.sender_owner()?;
        let sub = match self.load_sub_account(&sender)? {
            Some(sub) => sub,
            None => {
                self.burn(|m| m.burn_account_get(FUEL_ACCOUNT_UNCHANGED))?;
                return Err(ExecError::param(format!("no sub-account for {}", sender)));
            }
        };

        let mut deltas = Vec::new();
        if sub.free > 0 {
            deltas.push(FundDelta::debit_free(sender.clone(), sub.free));
            deltas.push(FundDelta::credit_free(receiver.clone(), sub.free));
        }
        for fund in sub.frozen() {
            deltas.push(FundDelta::debit_tag(
                sender.clone(),
                fund.value,
                fund.tag.clone(),
                fund.maturity_height,
            ));
            deltas.push(FundDelta::credit_tag(
                receiver.clone(),
                fund.value,
                fund.tag.clone(),
                fund.maturity_height,
            ));
        }

        self.burn(|m| m.burn_account_op(deltas.len() as u64))?;
        for delta in deltas {
            self.state.effects.push_fund_delta(delta);
        }
        Ok(HostValue::Bool(true))
    }

    /// Moves `amount` from the sender's sub-account to `to`; frozen when
    /// `maturity_height > 0`, free otherwise.
    fn transfer_some_asset(
        &mut self,
        to: Vec<u8>,
        amount: u64,
        tag: Vec<u8>,
        maturity_height: u32,
    ) -> ExecResult<HostValue> {
        let receiver = self.transfer_receiver(&to)?;
        if !std::str::from_utf8(&to).map(is_valid_address).unwrap_or(false) {
            return Err(ExecError::param("receiver is not a valid address"));
        }
        if amount == 0 {
            return Err(ExecError::param("transfer amount is zero"));
        }
        let tag = FundTag::new(tag)?;
        let sender = self.ctx.tx.sender_owner()?;

        let (debit, credit) = if maturity_height > 0 {
            (
                FundDelta::debit_tag(sender, amount, tag.clone(), maturity_height),
                FundDelta::credit_tag(receiver, amount, tag, maturity_height),
            )
        } else {
            (
                FundDelta::debit_free(sender, amount),
                FundDelta::credit_free(receiver, amount),
            )
        };

        self.burn(|m| m.burn_account_op(2))?;
        self.state.effects.push_fund_delta(debit);
        self.state.effects.push_fund_delta(credit);
        Ok(HostValue::Bool(true))
    }
}

/// Unparseable keys or signatures verify as false. High-S signatures are
/// normalized before checking.
fn verify_signature(data: &[u8], public_key: &[u8], signature: &[u8]) -> bool {
    let digest = Sha256::digest(Sha256::digest(data));
    let (Ok(message), Ok(key), Ok(mut signature)) = (
        Message::from_digest_slice(&digest),
        PublicKey::from_slice(public_key),
        Signature::from_der(signature),
    ) else {
        return false;
    };
    signature.normalize_s();
    Secp256k1::verification_only()
        .verify_ecdsa(&message, &signature, &key)
        .is_ok()
}

fn int_result(value: Option<i64>, call: &str) -> ExecResult<HostValue> {
    value
        .map(HostValue::Int)
        .ok_or_else(|| ExecError::param(format!("{} overflows", call)))
}

fn check_key(key: &[u8]) -> ExecResult<()> {
    if key.is_empty() || key.len() > MAX_HOST_BUFFER_SIZE {
        return Err(ExecError::param(format!(
            "storage key must be 1..={} bytes, got {}",
            MAX_HOST_BUFFER_SIZE,
            key.len()
        )));
    }
    Ok(())
}

fn check_value(value: &[u8]) -> ExecResult<()> {
    if value.is_empty() || value.len() > MAX_HOST_BUFFER_SIZE {
        return Err(ExecError::param(format!(
            "storage value must be 1..={} bytes, got {}",
            MAX_HOST_BUFFER_SIZE,
            value.len()
        )));
    }
    Ok(())
}
