//! The seam between the driver and a bytecode interpreter.

use serde::{Deserialize, Serialize};

use crate::error::{ExecError, ExecResult};
use crate::host::{HostBridge, HostCall, HostValue};
use sandbox_accounts::Ledger;

/// How a script finished.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptExit {
    /// The script asked for its sub-account operations to be checked
    /// against the native coin it received.
    pub check_account: bool,
}

/// A bytecode interpreter.
///
/// `run` executes `code` to completion. It must burn step, opcode and memory
/// fuel through `host` and stop as soon as any burn or host call returns a
/// non-recoverable error, returning that error.
pub trait Interpreter {
    /// Rejects code this interpreter cannot load.
    fn validate(&self, code: &[u8]) -> ExecResult<()> {
        if code.is_empty() {
            return Err(ExecError::malformed("empty code"));
        }
        Ok(())
    }

    fn run<L: Ledger>(
        &mut self,
        code: &[u8],
        arguments: &[u8],
        host: &mut HostBridge<'_, L>,
    ) -> ExecResult<ScriptExit>;
}

/// One step of a replayed script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptStep {
    Steps(u64),
    Opcode(u8),
    Memory(i64),
    Call(HostCall),
    /// The script raises an error.
    Fail(String),
}

/// Interpreter that ignores the code and replays a fixed list of steps.
///
/// Rejected host calls are recorded and the replay continues, the way a
/// script continues after a call returns false.
#[derive(Debug, Clone, Default)]
pub struct ReplayInterpreter {
    steps: Vec<ScriptStep>,
    check_account: bool,
    results: Vec<ExecResult<HostValue>>,
}

impl ReplayInterpreter {
    pub fn new(steps: Vec<ScriptStep>) -> Self {
        Self {
            steps,
            check_account: false,
            results: Vec::new(),
        }
    }

    pub fn from_calls(calls: impl IntoIterator<Item = HostCall>) -> Self {
        Self::new(calls.into_iter().map(ScriptStep::Call).collect())
    }

    pub fn check_account(mut self, check_account: bool) -> Self {
        self.check_account = check_account;
        self
    }

    /// Results of the host calls made by the last run, in order.
    pub fn results(&self) -> &[ExecResult<HostValue>] {
        &self.results
    }
}

impl Interpreter for ReplayInterpreter {
    fn run<L: Ledger>(
        &mut self,
        _code: &[u8],
        _arguments: &[u8],
        host: &mut HostBridge<'_, L>,
    ) -> ExecResult<ScriptExit> {
        self.results.clear();
        for step in &self.steps {
            match step {
                ScriptStep::Steps(n) => host.burn_step(*n)?,
                ScriptStep::Opcode(code) => host.burn_opcode(*code)?,
                ScriptStep::Memory(delta) => host.burn_memory(*delta)?,
                ScriptStep::Call(call) => {
                    let result = host.dispatch(call.clone());
                    let fatal = matches!(&result, Err(e) if !e.is_recoverable());
                    self.results.push(result.clone());
                    if fatal {
                        return result.map(|_| ScriptExit::default());
                    }
                }
                ScriptStep::Fail(message) => return Err(ExecError::script(message.clone())),
            }
        }
        Ok(ScriptExit {
            check_account: self.check_account,
        })
    }
}
