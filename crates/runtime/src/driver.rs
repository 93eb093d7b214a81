//! Execution driver.
//!
//! Sequences one contract call: load the code and start the meter, hand
//! control to the interpreter, check the recorded effects, and apply them to
//! the ledger through an overlay that is committed only if every step
//! succeeded.
//!
//! ```text
//! Init -> Loaded -> Running -> Committed
//!   \        \          \
//!    +--------+----------+---> Aborted(reason)
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

use crate::context::ExecutionContext;
use crate::effects::{EffectCollector, StorageWrite};
use crate::error::{ExecError, ExecResult};
use crate::fee::fee_for;
use crate::host::{HostBridge, RunState};
use crate::interpreter::{Interpreter, ScriptExit};
use crate::overlay::LedgerOverlay;
use crate::receipt::Receipt;
use crate::validator::InvariantValidator;
use sandbox_accounts::Ledger;
use sandbox_config::{AbortFeePolicy, SandboxConfig};
use sandbox_fuel::{BurnReport, FuelMeter};

/// Where a run is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverState {
    Init,
    Loaded,
    Running,
    Committed,
    Aborted(ExecError),
}

impl DriverState {
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, DriverState::Committed | DriverState::Aborted(_))
    }

    #[inline]
    pub fn is_committed(&self) -> bool {
        matches!(self, DriverState::Committed)
    }

    #[inline]
    pub fn is_aborted(&self) -> bool {
        matches!(self, DriverState::Aborted(_))
    }

    pub fn abort_reason(&self) -> Option<&ExecError> {
        match self {
            DriverState::Aborted(reason) => Some(reason),
            _ => None,
        }
    }
}

impl fmt::Display for DriverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverState::Init => f.write_str("init"),
            DriverState::Loaded => f.write_str("loaded"),
            DriverState::Running => f.write_str("running"),
            DriverState::Committed => f.write_str("committed"),
            DriverState::Aborted(reason) => write!(f, "aborted({})", reason.kind()),
        }
    }
}

/// Result of a run, handed back to the caller for fee accounting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub state: DriverState,
    pub fuel_used: u64,
    pub fee_charged: u64,
    /// Present for committed runs when contract logging is enabled.
    pub receipt: Option<Receipt>,
    pub logs: Vec<String>,
    /// Absent when the run never started running.
    pub report: Option<BurnReport>,
}

impl RunOutcome {
    fn rejected(error: ExecError) -> Self {
        Self {
            state: DriverState::Aborted(error),
            fuel_used: 0,
            fee_charged: 0,
            receipt: None,
            logs: Vec::new(),
            report: None,
        }
    }

    pub fn is_committed(&self) -> bool {
        self.state.is_committed()
    }

    pub fn error(&self) -> Option<&ExecError> {
        self.state.abort_reason()
    }
}

/// Runs one contract call against a ledger.
pub struct ExecutionDriver<'a, L: Ledger, I: Interpreter> {
    config: &'a SandboxConfig,
    ledger: &'a mut L,
    interpreter: I,
    ctx: ExecutionContext,
    state: DriverState,
    run: Option<RunState>,
    validator: Option<InvariantValidator>,
}

impl<'a, L: Ledger, I: Interpreter> ExecutionDriver<'a, L, I> {
    pub fn new(config: &'a SandboxConfig, ledger: &'a mut L, interpreter: I, ctx: ExecutionContext) -> Self {
        Self {
            config,
            ledger,
            interpreter,
            ctx,
            state: DriverState::Init,
            run: None,
            validator: None,
        }
    }

    pub fn state(&self) -> &DriverState {
        &self.state
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.ctx
    }

    pub fn interpreter(&self) -> &I {
        &self.interpreter
    }

    /// Loads, runs and settles the call.
    pub fn execute(mut self) -> RunOutcome {
        if let Err(error) = self.load() {
            return RunOutcome::rejected(error);
        }
        match self.run() {
            Ok(outcome) => outcome,
            Err(error) => RunOutcome::rejected(error),
        }
    }

    /// `Init -> Loaded`: checks input sizes, derives the fuel limit and
    /// starts the meter.
    pub fn load(&mut self) -> ExecResult<()> {
        if self.state != DriverState::Init {
            return Err(ExecError::internal(format!("load in state {}", self.state)));
        }
        match self.prepare() {
            Ok((run, validator)) => {
                debug!(
                    contract = %self.ctx.contract,
                    tx = %self.ctx.tx.tx_hash_hex(),
                    limit = run.meter().limit(),
                    "contract loaded"
                );
                self.run = Some(run);
                self.validator = Some(validator);
                self.state = DriverState::Loaded;
                Ok(())
            }
            Err(error) => {
                warn!(contract = %self.ctx.contract, error = %error, "contract rejected");
                self.state = DriverState::Aborted(error.clone());
                Err(error)
            }
        }
    }

    fn prepare(&self) -> ExecResult<(RunState, InvariantValidator)> {
        let code = &self.ctx.code;
        if code.is_empty() {
            return Err(ExecError::malformed("empty code"));
        }
        if code.len() > self.config.max_code_size {
            return Err(ExecError::oversized("code", code.len(), self.config.max_code_size));
        }
        let arguments = &self.ctx.arguments;
        if arguments.len() >= self.config.max_argument_size {
            return Err(ExecError::oversized(
                "arguments",
                arguments.len(),
                self.config.max_argument_size,
            ));
        }
        self.interpreter.validate(code)?;

        let limit = self.ctx.fuel_limit(self.config)?;
        if limit == 0 {
            return Err(ExecError::fee("fee buys no fuel"));
        }

        let contract = self
            .ledger
            .get_account(&self.ctx.contract_ref())?
            .ok_or_else(|| ExecError::ledger(format!("contract {} is not registered", self.ctx.contract)))?;
        let validator = InvariantValidator::new(self.ctx.contract, self.config.max_output_count)
            .with_contract_account(&contract);

        let mut meter = FuelMeter::new();
        meter.start(limit, self.config.burn_version)?;
        Ok((RunState::new(meter, self.config.max_output_count), validator))
    }

    /// `Loaded -> Running -> {Committed, Aborted}`.
    ///
    /// Errors only when the driver is not loaded; the run's own failure is
    /// reported in the outcome.
    pub fn run(&mut self) -> ExecResult<RunOutcome> {
        if self.state != DriverState::Loaded {
            return Err(ExecError::internal(format!("run in state {}", self.state)));
        }
        let (mut run, validator) = match (self.run.take(), self.validator.take()) {
            (Some(run), Some(validator)) => (run, validator),
            _ => return Err(ExecError::internal("loaded driver without run state")),
        };

        self.state = DriverState::Running;
        let result = {
            let mut host = HostBridge::new(&self.ctx, &*self.ledger, &mut run);
            self.interpreter
                .run(&self.ctx.code, &self.ctx.arguments, &mut host)
        };

        let settled = self.settle(&run, &validator, result);
        let fuel_used = run.meter().total_burned();
        let report = run.meter().report();

        let outcome = match settled {
            Ok((fee_charged, receipt)) => {
                self.state = DriverState::Committed;
                RunOutcome {
                    state: DriverState::Committed,
                    fuel_used,
                    fee_charged,
                    receipt,
                    logs: run.logs,
                    report: Some(report),
                }
            }
            Err(error) => {
                warn!(contract = %self.ctx.contract, error = %error, "run aborted");
                let fee_charged = match self.config.abort_fee_policy {
                    AbortFeePolicy::Reject => 0,
                    AbortFeePolicy::ChargeConsumed => fuel_used.saturating_mul(self.ctx.tx.fuel_rate),
                };
                self.state = DriverState::Aborted(error.clone());
                RunOutcome {
                    state: DriverState::Aborted(error),
                    fuel_used,
                    fee_charged,
                    receipt: None,
                    logs: run.logs,
                    report: Some(report),
                }
            }
        };

        if let Some(report) = &outcome.report {
            log_burn_report(&self.ctx.tx.tx_hash_hex(), &outcome.state, report);
        }
        Ok(outcome)
    }

    /// Checks the finished run and applies its effects. Returns the fee and
    /// the receipt.
    fn settle(
        &mut self,
        run: &RunState,
        validator: &InvariantValidator,
        result: ExecResult<ScriptExit>,
    ) -> ExecResult<(u64, Option<Receipt>)> {
        if let Some(fatal) = run.fatal() {
            return Err(fatal.clone());
        }
        let exit = result?;
        if run.meter().is_exhausted() {
            return Err(ExecError::FuelExhausted {
                burned: run.meter().total_burned(),
                limit: run.meter().limit(),
            });
        }

        let effects = run.effects();
        validator.check_operate(effects.account_deltas(), &*self.ledger)?;
        if exit.check_account && self.ctx.transfers_native(self.config) {
            validator.check_app_account_operate(effects, self.ctx.tx.coin_amount)?;
        }

        let fee = fee_for(run.meter().total_burned(), self.ctx.tx.fuel_rate)?;
        apply_effects(self.ledger, &self.ctx, effects)?;

        let receipt = self.config.contract_log_enabled.then(|| {
            Receipt::from_records(
                self.ctx.tx.tx_hash_hex(),
                self.ctx.contract,
                &self.config.native_symbol,
                &effects.records(),
            )
        });
        Ok((fee, receipt))
    }
}

/// Applies native deltas, then storage writes, then each owner's sub-account
/// deltas after maturing it. Either every write reaches `ledger` or none does.
fn apply_effects<L: Ledger>(ledger: &mut L, ctx: &ExecutionContext, effects: &EffectCollector) -> ExecResult<()> {
    let mut overlay = LedgerOverlay::new(ledger);
    match stage_effects(&mut overlay, ctx, effects) {
        Ok(()) => {
            overlay.commit()?;
            Ok(())
        }
        Err(error) => {
            overlay.discard();
            Err(error)
        }
    }
}

fn stage_effects<L: Ledger>(
    overlay: &mut LedgerOverlay<'_, L>,
    ctx: &ExecutionContext,
    effects: &EffectCollector,
) -> ExecResult<()> {
    for delta in effects.account_deltas() {
        overlay.apply_account_delta(&delta.account, delta.op, delta.amount)?;
    }
    for (key, write) in effects.storage_writes() {
        match write {
            StorageWrite::Put(value) => overlay.set_contract_data(&ctx.contract, key, value)?,
            StorageWrite::Erase => overlay.erase_contract_data(&ctx.contract, key)?,
        }
    }
    for (owner, deltas) in effects.fund_deltas() {
        let mut sub_account = overlay.get_or_create_sub_account(&ctx.contract, owner, ctx.height)?;
        for delta in deltas {
            sub_account.apply(delta)?;
        }
        overlay.set_sub_account(&ctx.contract, &sub_account)?;
    }
    Ok(())
}

fn log_burn_report(run_id: &str, state: &DriverState, report: &BurnReport) {
    info!(
        run = run_id,
        state = %state,
        version = %report.version,
        limit = report.limit,
        burned = report.total_burned,
        step = report.step,
        refund = report.refund,
        alloc = report.memory_alloc,
        memory = report.memory_fuel,
        opcode = report.opcode,
        storage = report.storage,
        account = report.account,
        function = report.function,
        "burn report"
    );
}
