//! Fuel meter.
//!
//! Tracks gross fuel, storage refunds, allocated memory and per-category
//! counters for one run, and enforces the run's limit on every burn.

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::error::{FuelError, FuelResult};
use crate::opcode::OpCostTable;
use crate::prices::{
    FUEL_ACCOUNT_OPERATE, FUEL_MEM_ADDED, FUEL_STEP, FUEL_STORE_ADDED, FUEL_STORE_GET, FUEL_STORE_REFUND,
    FUEL_STORE_RESET, FUEL_STORE_UNCHANGED, MEM_UNIT_SIZE,
};
use crate::report::BurnReport;
use sandbox_config::BurnVersion;

/// Fuel for `size` bytes priced per started `unit`; 0 when `unit` is 0.
pub fn cost_by_size(size: u64, unit: u64, per_unit: u64) -> u64 {
    if unit == 0 {
        return 0;
    }
    size.div_ceil(unit).saturating_mul(per_unit)
}

/// Per-category fuel counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuelCounters {
    /// Fuel burned by interpreter steps.
    pub step: u64,
    /// Fuel burned by priced opcodes.
    pub opcode: u64,
    /// Bytes allocated (not fuel; see [`FuelMeter::memory_fuel`]).
    pub memory_alloc: u64,
    /// Fuel burned by storage reads and writes.
    pub storage: u64,
    /// Fuel burned by account reads and operations.
    pub account: u64,
    /// Fuel burned by host function calls.
    pub function: u64,
}

/// Fuel meter for a single run.
///
/// A meter is started exactly once. After a burn reports exhaustion the meter
/// is latched and every later burn fails without changing any counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuelMeter {
    started: bool,
    exhausted: bool,
    version: BurnVersion,
    limit: u64,
    gross: u64,
    refund: u64,
    counters: FuelCounters,
}

#[derive(Clone, Copy)]
enum Category {
    Step,
    Opcode,
    Storage,
    Account,
    Function,
}

impl FuelMeter {
    /// Creates a meter that has not been started.
    pub fn new() -> Self {
        Self {
            started: false,
            exhausted: false,
            version: BurnVersion::NEWEST,
            limit: 0,
            gross: 0,
            refund: 0,
            counters: FuelCounters::default(),
        }
    }

    /// Creates a meter already started with `limit` and `version`.
    pub fn started(limit: u64, version: BurnVersion) -> Self {
        let mut meter = Self::new();
        meter.started = true;
        meter.limit = limit;
        meter.version = version;
        meter
    }

    /// Starts metering. Fails if the meter was already started.
    pub fn start(&mut self, limit: u64, version: BurnVersion) -> FuelResult<()> {
        if self.started {
            return Err(FuelError::AlreadyStarted);
        }
        *self = Self::started(limit, version);
        Ok(())
    }

    /// True once `start` has run.
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Burn version the meter was started with.
    pub fn version(&self) -> BurnVersion {
        self.version
    }

    /// Fuel limit of the run.
    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Fuel burned before memory and refunds are taken into account.
    pub fn gross(&self) -> u64 {
        self.gross
    }

    /// Raw accumulated refund, before the half-of-gross cap.
    pub fn raw_refund(&self) -> u64 {
        self.refund
    }

    /// Per-category counters.
    pub fn counters(&self) -> &FuelCounters {
        &self.counters
    }

    /// Fuel charged for the memory allocated so far.
    pub fn memory_fuel(&self) -> u64 {
        cost_by_size(self.counters.memory_alloc, MEM_UNIT_SIZE, FUEL_MEM_ADDED)
    }

    /// Refund actually credited: at most half of gross plus memory fuel.
    pub fn refund_applied(&self) -> u64 {
        let fuel = self.gross.saturating_add(self.memory_fuel());
        (fuel / 2).min(self.refund)
    }

    /// Total fuel burned by the run.
    pub fn total_burned(&self) -> u64 {
        if !self.started {
            return 0;
        }
        let fuel = self.gross.saturating_add(self.memory_fuel());
        fuel - (fuel / 2).min(self.refund)
    }

    /// True once the total has crossed the limit.
    pub fn is_exhausted(&self) -> bool {
        self.started && self.total_burned() > self.limit
    }

    /// Fuel left before the limit, 0 once exhausted.
    pub fn remaining(&self) -> u64 {
        self.limit.saturating_sub(self.total_burned())
    }

    /// Burns `n` interpreter steps.
    pub fn burn_step(&mut self, n: u64) -> FuelResult<()> {
        if !self.admit(BurnVersion::V1)? {
            return Ok(());
        }
        self.charge(Category::Step, n.saturating_mul(FUEL_STEP));
        self.settle("burn_step")
    }

    /// Burns the price of instruction `code`. Unknown codes cost nothing.
    pub fn burn_opcode(&mut self, code: u8) -> FuelResult<()> {
        if !self.admit(BurnVersion::V2)? {
            return Ok(());
        }
        match OpCostTable::cost(code) {
            Some(fuel) => self.charge(Category::Opcode, fuel),
            None => warn!(code, "burn_opcode: unknown opcode"),
        }
        self.settle("burn_opcode")
    }

    /// Records an allocation. Only growth is charged.
    pub fn burn_memory(&mut self, delta_bytes: i64) -> FuelResult<()> {
        if !self.admit(BurnVersion::V2)? {
            return Ok(());
        }
        if delta_bytes > 0 {
            self.counters.memory_alloc = self
                .counters
                .memory_alloc
                .saturating_add(delta_bytes.unsigned_abs());
            trace!(delta_bytes, alloc = self.counters.memory_alloc, "burn_memory");
        }
        self.settle("burn_memory")
    }

    /// Burns for a storage write replacing `old_len` bytes with `new_len` bytes.
    pub fn burn_storage_set(&mut self, key_len: u64, old_len: u64, new_len: u64) -> FuelResult<()> {
        if !self.admit(BurnVersion::V2)? {
            return Ok(());
        }
        let (fuel, refund, action) = if new_len == old_len {
            (new_len.saturating_mul(FUEL_STORE_RESET), 0, "reset")
        } else if new_len > old_len {
            if old_len == 0 {
                let fuel = key_len.saturating_add(new_len).saturating_mul(FUEL_STORE_ADDED);
                (fuel, 0, "new")
            } else {
                let fuel = (new_len - old_len)
                    .saturating_mul(FUEL_STORE_ADDED)
                    .saturating_add(old_len.saturating_mul(FUEL_STORE_RESET));
                (fuel, 0, "increase")
            }
        } else if new_len == 0 {
            (0, old_len.saturating_mul(FUEL_STORE_REFUND), "delete")
        } else {
            let refund = (old_len - new_len).saturating_mul(FUEL_STORE_REFUND);
            (new_len.saturating_mul(FUEL_STORE_RESET), refund, "decrease")
        };

        self.charge(Category::Storage, fuel);
        self.refund = self.refund.saturating_add(refund);
        trace!(action, key_len, old_len, new_len, fuel, refund, "burn_storage_set");
        self.settle("burn_storage_set")
    }

    /// Burns for a storage access that did not change anything.
    pub fn burn_storage_unchanged(&mut self, key_len: u64, data_len: u64) -> FuelResult<()> {
        if !self.admit(BurnVersion::V2)? {
            return Ok(());
        }
        let fuel = key_len
            .saturating_add(data_len)
            .saturating_mul(FUEL_STORE_UNCHANGED);
        self.charge(Category::Storage, fuel);
        self.settle("burn_storage_unchanged")
    }

    /// Burns for a storage read.
    pub fn burn_storage_get(&mut self, key_len: u64, data_len: u64) -> FuelResult<()> {
        if !self.admit(BurnVersion::V2)? {
            return Ok(());
        }
        let fuel = key_len.saturating_add(data_len).saturating_mul(FUEL_STORE_GET);
        self.charge(Category::Storage, fuel);
        self.settle("burn_storage_get")
    }

    /// Burns for `count` recorded balance operations.
    pub fn burn_account_op(&mut self, count: u64) -> FuelResult<()> {
        if !self.admit(BurnVersion::V2)? {
            return Ok(());
        }
        self.charge(Category::Account, count.saturating_mul(FUEL_ACCOUNT_OPERATE));
        self.settle("burn_account_op")
    }

    /// Burns a fixed account read cost.
    pub fn burn_account_get(&mut self, fuel: u64) -> FuelResult<()> {
        if !self.admit(BurnVersion::V2)? {
            return Ok(());
        }
        self.charge(Category::Account, fuel);
        self.settle("burn_account_get")
    }

    /// Burns a fixed host call cost.
    pub fn burn_call(&mut self, fuel: u64) -> FuelResult<()> {
        if !self.admit(BurnVersion::V2)? {
            return Ok(());
        }
        self.charge(Category::Function, fuel);
        self.settle("burn_call")
    }

    /// Burns a host call cost plus a price per started unit of data.
    pub fn burn_call_with_data(
        &mut self,
        fuel: u64,
        data_len: u64,
        unit_size: u64,
        per_unit: u64,
    ) -> FuelResult<()> {
        if !self.admit(BurnVersion::V2)? {
            return Ok(());
        }
        let total = fuel.saturating_add(cost_by_size(data_len, unit_size, per_unit));
        self.charge(Category::Function, total);
        self.settle("burn_call_with_data")
    }

    /// Snapshot of every counter.
    pub fn report(&self) -> BurnReport {
        BurnReport {
            version: self.version,
            limit: self.limit,
            total_burned: self.total_burned(),
            gross: self.gross,
            refund: self.refund,
            refund_applied: self.refund_applied(),
            memory_alloc: self.counters.memory_alloc,
            memory_fuel: self.memory_fuel(),
            step: self.counters.step,
            opcode: self.counters.opcode,
            storage: self.counters.storage,
            account: self.counters.account,
            function: self.counters.function,
        }
    }

    /// Returns whether a burn requiring `required` applies to this run.
    fn admit(&self, required: BurnVersion) -> FuelResult<bool> {
        if !self.started {
            return Err(FuelError::NotStarted);
        }
        if self.exhausted {
            return Err(FuelError::exhausted(
                "latched",
                self.total_burned(),
                self.limit,
            ));
        }
        Ok(self.version.enables(required))
    }

    fn charge(&mut self, category: Category, fuel: u64) {
        self.gross = self.gross.saturating_add(fuel);
        let counter = match category {
            Category::Step => &mut self.counters.step,
            Category::Opcode => &mut self.counters.opcode,
            Category::Storage => &mut self.counters.storage,
            Category::Account => &mut self.counters.account,
            Category::Function => &mut self.counters.function,
        };
        *counter = counter.saturating_add(fuel);
    }

    fn settle(&mut self, operation: &'static str) -> FuelResult<()> {
        let burned = self.total_burned();
        if burned > self.limit {
            self.exhausted = true;
            return Err(FuelError::exhausted(operation, burned, self.limit));
        }
        Ok(())
    }
}

impl Default for FuelMeter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcode::OpCode;

    fn meter(limit: u64) -> FuelMeter {
        FuelMeter::started(limit, BurnVersion::V2)
    }

    #[test]
    fn test_start_twice_fails() {
        let mut meter = FuelMeter::new();
        assert!(meter.start(10, BurnVersion::V2).is_ok());
        assert_eq!(meter.start(10, BurnVersion::V2), Err(FuelError::AlreadyStarted));
    }

    #[test]
    fn test_burn_before_start_fails() {
        let mut meter = FuelMeter::new();
        assert_eq!(meter.burn_step(1), Err(FuelError::NotStarted));
        assert_eq!(meter.total_burned(), 0);
    }

    #[test]
    fn test_cost_by_size() {
        assert_eq!(cost_by_size(0, 32, 3), 0);
        assert_eq!(cost_by_size(1, 32, 3), 3);
        assert_eq!(cost_by_size(32, 32, 3), 3);
        assert_eq!(cost_by_size(33, 32, 3), 6);
        assert_eq!(cost_by_size(100, 0, 3), 0);
    }

    #[test]
    fn test_opcode_burns() {
        let mut meter = meter(1_000);
        meter.burn_opcode(OpCode::Add as u8).unwrap();
        meter.burn_opcode(OpCode::Len as u8).unwrap();
        meter.burn_opcode(OpCode::Jmp as u8).unwrap();
        meter.burn_opcode(250).unwrap();
        assert_eq!(meter.counters().opcode, 35);
        assert_eq!(meter.total_burned(), 35);
    }

    #[test]
    fn test_memory_charged_on_growth_only() {
        let mut meter = meter(1_000);
        meter.burn_memory(20).unwrap();
        meter.burn_memory(-500).unwrap();
        meter.burn_memory(20).unwrap();
        assert_eq!(meter.counters().memory_alloc, 40);
        // 40 bytes is two started 32-byte units
        assert_eq!(meter.memory_fuel(), 6);
        assert_eq!(meter.total_burned(), 6);
        assert_eq!(meter.gross(), 0);
    }

    #[test]
    fn test_storage_set_policy() {
        // unchanged size
        let mut m = meter(u64::MAX);
        m.burn_storage_set(4, 10, 10).unwrap();
        assert_eq!(m.gross(), 10 * FUEL_STORE_RESET);

        // growth from zero includes the key
        let mut m = meter(u64::MAX);
        m.burn_storage_set(4, 0, 10).unwrap();
        assert_eq!(m.gross(), 14 * FUEL_STORE_ADDED);

        // growth from nonzero
        let mut m = meter(u64::MAX);
        m.burn_storage_set(4, 6, 10).unwrap();
        assert_eq!(m.gross(), 4 * FUEL_STORE_ADDED + 6 * FUEL_STORE_RESET);

        // shrink to zero is a pure refund
        let mut m = meter(u64::MAX);
        m.burn_storage_set(4, 10, 0).unwrap();
        assert_eq!(m.gross(), 0);
        assert_eq!(m.raw_refund(), 10 * FUEL_STORE_REFUND);

        // partial shrink
        let mut m = meter(u64::MAX);
        m.burn_storage_set(4, 10, 3).unwrap();
        assert_eq!(m.gross(), 3 * FUEL_STORE_RESET);
        assert_eq!(m.raw_refund(), 7 * FUEL_STORE_REFUND);
        assert_eq!(m.counters().storage, 3 * FUEL_STORE_RESET);
    }

    #[test]
    fn test_refund_capped_at_half() {
        let mut m = meter(u64::MAX);
        m.burn_call(100).unwrap();
        m.burn_storage_set(1, 50, 0).unwrap();
        assert_eq!(m.raw_refund(), 50 * FUEL_STORE_REFUND);
        assert_eq!(m.refund_applied(), 50);
        assert_eq!(m.total_burned(), 50);
    }

    #[test]
    fn test_storage_reads() {
        let mut m = meter(u64::MAX);
        m.burn_storage_get(2, 8).unwrap();
        m.burn_storage_unchanged(2, 0).unwrap();
        assert_eq!(m.counters().storage, 10 * FUEL_STORE_GET + 2 * FUEL_STORE_UNCHANGED);
        assert_eq!(m.gross(), m.counters().storage);
    }

    #[test]
    fn test_exhaustion_latches() {
        let mut m = meter(100);
        m.burn_call(40).unwrap();
        m.burn_call(40).unwrap();
        let err = m.burn_call(40).unwrap_err();
        assert!(err.is_exhausted());
        assert_eq!(m.gross(), 120);

        // no further charge once exhausted
        assert!(m.burn_step(1).unwrap_err().is_exhausted());
        assert_eq!(m.gross(), 120);
        assert!(m.is_exhausted());
    }

    #[test]
    fn test_limit_is_inclusive() {
        let mut m = meter(10);
        m.burn_step(10).unwrap();
        assert!(!m.is_exhausted());
        assert_eq!(m.remaining(), 0);
        assert!(m.burn_step(1).is_err());
    }

    #[test]
    fn test_v1_meters_steps_only() {
        let mut m = FuelMeter::started(1_000, BurnVersion::V1);
        m.burn_step(5).unwrap();
        m.burn_call(500).unwrap();
        m.burn_account_op(1).unwrap();
        m.burn_memory(4096).unwrap();
        assert_eq!(m.total_burned(), 5);
        assert_eq!(m.counters().function, 0);
    }

    #[test]
    fn test_call_with_data() {
        let mut m = meter(u64::MAX);
        m.burn_call_with_data(375, 10, 1, 8).unwrap();
        assert_eq!(m.counters().function, 375 + 80);
        m.burn_call_with_data(30, 64, 0, 6).unwrap();
        assert_eq!(m.counters().function, 375 + 80 + 30);
    }

    #[test]
    fn test_report_snapshot() {
        let mut m = meter(10_000);
        m.burn_step(3).unwrap();
        m.burn_account_op(1).unwrap();
        let report = m.report();
        assert_eq!(report.total_burned, 3 + FUEL_ACCOUNT_OPERATE);
        assert_eq!(report.step, 3);
        assert_eq!(report.account, FUEL_ACCOUNT_OPERATE);
        assert_eq!(report.limit, 10_000);
    }
}
