//! Execution driver integration tests.
//!
//! Each test drives a full run over a [`MemoryLedger`] with a scripted
//! interpreter and checks the terminal state, the fee and what reached the
//! ledger.

use proptest::prelude::*;
use sandbox_accounts::{
    Account, AccountRef, FundOp, FundTag, Ledger, MemoryLedger, OwnerId, RegId, SubAccount,
};
use sandbox_config::{AbortFeePolicy, SandboxConfig, DEFAULT_MIN_TX_FEE};
use sandbox_fuel::prices::*;
use sandbox_runtime::{
    AccountDelta, AppOperate, DriverState, ErrorKind, ExecError, ExecutionContext,
    ExecutionDriver, HostCall, HostValue, ReceiptKind, ReplayInterpreter, RunOutcome, ScriptStep,
    TxMeta,
};

const CONTRACT: RegId = RegId::new(100, 1);
const CONTRACT_ADDRESS: &str = "wLKf2NqwtHk3BfzK5wMDfbKYN1SC3weyR4";
const SENDER: RegId = RegId::new(50, 2);
const SENDER_ADDRESS: &str = "wNDue1jHcgRSioSDL4o1AzXz3D72gCMkP6";
const BOB_ADDRESS: &str = "wZb1YP9cLfGzFFMwfUo3A5jLkEXZzyo7Mp";
const HEIGHT: u32 = 200;
const FUEL_RATE: u64 = 100;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn ledger() -> MemoryLedger {
    MemoryLedger::new(HEIGHT)
        .with_account(
            Account::new(CONTRACT_ADDRESS)
                .with_reg_id(CONTRACT)
                .with_balance(1_000),
        )
        .with_account(Account::new(SENDER_ADDRESS).with_reg_id(SENDER).with_balance(500))
}

/// Context whose fee buys exactly `fuel` when `fuel` is a multiple of 100.
fn context(fuel: u64, coin_amount: u64) -> ExecutionContext {
    ExecutionContext {
        tx: TxMeta {
            hash: [0xab; 32],
            sender: SENDER,
            sender_address: SENDER_ADDRESS.to_string(),
            fees: DEFAULT_MIN_TX_FEE + fuel,
            fuel_rate: FUEL_RATE,
            valid_height: HEIGHT,
            coin_amount,
            coin_symbol: "WICC".to_string(),
            block_timestamp: 1_600_000_000,
        },
        contract: CONTRACT,
        code: vec![0x1b, 0x4c, 0x75, 0x61],
        arguments: vec![0x01],
        height: HEIGHT,
    }
}

fn owner(address: &str) -> OwnerId {
    OwnerId::new(address.as_bytes().to_vec()).unwrap()
}

fn tag(name: &str) -> FundTag {
    FundTag::new(name.as_bytes().to_vec()).unwrap()
}

fn bob() -> AccountRef {
    AccountRef::Address(BOB_ADDRESS.to_string())
}

fn run(ledger: &mut MemoryLedger, ctx: ExecutionContext, steps: Vec<ScriptStep>) -> RunOutcome {
    let config = SandboxConfig::default();
    ExecutionDriver::new(&config, ledger, ReplayInterpreter::new(steps), ctx).execute()
}

fn write(key: &[u8], value: &[u8]) -> ScriptStep {
    ScriptStep::Call(HostCall::WriteData {
        key: key.to_vec(),
        value: value.to_vec(),
    })
}

// ============================================================================
// Fuel
// ============================================================================

#[test]
fn test_third_step_exhausts_limit_of_100() {
    init_tracing();
    let mut ledger = ledger();
    let before = ledger.clone();
    let outcome = run(
        &mut ledger,
        context(100, 0),
        vec![ScriptStep::Steps(40), ScriptStep::Steps(40), ScriptStep::Steps(40)],
    );

    assert_eq!(
        outcome.state,
        DriverState::Aborted(ExecError::FuelExhausted {
            burned: 120,
            limit: 100
        })
    );
    assert_eq!(outcome.fuel_used, 120);
    assert_eq!(outcome.fee_charged, 0);
    assert!(outcome.receipt.is_none());
    assert_eq!(outcome.report.as_ref().unwrap().step, 120);
    assert_eq!(ledger, before);
}

#[test]
fn test_exhaustion_discards_recorded_writes() {
    let mut ledger = ledger();
    let before = ledger.clone();
    let outcome = run(
        &mut ledger,
        context(10_000, 0),
        vec![
            write(b"k", b"v"),
            ScriptStep::Steps(4_000),
            ScriptStep::Steps(4_000),
            ScriptStep::Steps(4_000),
        ],
    );

    assert_eq!(outcome.error().unwrap().kind(), ErrorKind::FuelExhausted);
    assert_eq!(outcome.report.unwrap().storage, 2 * FUEL_STORE_ADDED);
    assert_eq!(ledger.get_contract_data(&CONTRACT, b"k").unwrap(), None);
    assert_eq!(ledger, before);
}

#[test]
fn test_abort_fee_policy_charges_consumed_fuel() {
    let config = SandboxConfig {
        abort_fee_policy: AbortFeePolicy::ChargeConsumed,
        ..SandboxConfig::default()
    };
    let mut ledger = ledger();
    let script = ReplayInterpreter::new(vec![
        ScriptStep::Steps(25),
        ScriptStep::Fail("assertion failed".into()),
    ]);
    let outcome = ExecutionDriver::new(&config, &mut ledger, script, context(10_000, 0)).execute();

    assert_eq!(outcome.error().unwrap().kind(), ErrorKind::Script);
    assert_eq!(outcome.fuel_used, 25);
    assert_eq!(outcome.fee_charged, 25 * FUEL_RATE);
}

#[test]
fn test_empty_script_commits_with_zero_fuel() {
    let mut ledger = ledger();
    let before = ledger.clone();
    let outcome = run(&mut ledger, context(1_000, 0), Vec::new());

    assert!(outcome.is_committed());
    assert_eq!(outcome.fuel_used, 0);
    assert_eq!(outcome.fee_charged, 0);
    assert!(outcome.receipt.unwrap().is_empty());
    assert_eq!(ledger, before);
}

// ============================================================================
// Load
// ============================================================================

#[test]
fn test_load_rejections() {
    let cases: Vec<(ExecutionContext, ErrorKind)> = vec![
        (
            ExecutionContext {
                code: Vec::new(),
                ..context(1_000, 0)
            },
            ErrorKind::MalformedBytecode,
        ),
        (
            ExecutionContext {
                code: vec![0; 65_537],
                ..context(1_000, 0)
            },
            ErrorKind::OversizedInput,
        ),
        (
            ExecutionContext {
                arguments: vec![0; 4_096],
                ..context(1_000, 0)
            },
            ErrorKind::OversizedInput,
        ),
        (context(0, 0), ErrorKind::Fee),
        (
            ExecutionContext {
                contract: RegId::new(7, 7),
                ..context(1_000, 0)
            },
            ErrorKind::Ledger,
        ),
    ];

    for (ctx, kind) in cases {
        let mut ledger = ledger();
        let before = ledger.clone();
        let outcome = run(&mut ledger, ctx, vec![ScriptStep::Steps(1)]);
        assert_eq!(outcome.error().map(ExecError::kind), Some(kind));
        assert_eq!(outcome.fuel_used, 0);
        assert!(outcome.report.is_none());
        assert_eq!(ledger, before);
    }
}

#[test]
fn test_argument_just_under_limit_loads() {
    let mut ledger = ledger();
    let ctx = ExecutionContext {
        arguments: vec![0; 4_095],
        ..context(1_000, 0)
    };
    assert!(run(&mut ledger, ctx, Vec::new()).is_committed());
}

#[test]
fn test_driver_is_single_use() {
    let config = SandboxConfig::default();
    let mut ledger = ledger();
    let mut driver = ExecutionDriver::new(
        &config,
        &mut ledger,
        ReplayInterpreter::default(),
        context(1_000, 0),
    );

    assert!(driver.run().is_err());
    driver.load().unwrap();
    assert_eq!(driver.state(), &DriverState::Loaded);
    assert!(driver.load().is_err());

    let outcome = driver.run().unwrap();
    assert!(outcome.is_committed());
    assert!(driver.state().is_terminal());

    let again = driver.run().unwrap_err();
    assert_eq!(again.kind(), ErrorKind::Internal);
    assert_eq!(driver.state(), &DriverState::Committed);
}

// ============================================================================
// Native outputs
// ============================================================================

#[test]
fn test_unbalanced_credit_leaves_ledger_untouched() {
    let mut ledger = ledger();
    let before = ledger.clone();
    let outcome = run(
        &mut ledger,
        context(100_000, 0),
        vec![
            write(b"k", b"v"),
            ScriptStep::Call(HostCall::WriteOutput(AccountDelta::credit(bob(), 1_000))),
        ],
    );

    assert_eq!(outcome.error().unwrap().kind(), ErrorKind::InvariantViolation);
    assert_eq!(ledger, before);
}

#[test]
fn test_debit_from_other_account_is_rejected() {
    let mut ledger = ledger();
    let before = ledger.clone();
    let outcome = run(
        &mut ledger,
        context(100_000, 0),
        vec![
            ScriptStep::Call(HostCall::WriteOutput(AccountDelta::debit(
                AccountRef::RegId(SENDER),
                5,
            ))),
            ScriptStep::Call(HostCall::WriteOutput(AccountDelta::credit(
                AccountRef::RegId(CONTRACT),
                5,
            ))),
        ],
    );

    assert_eq!(outcome.error().unwrap().kind(), ErrorKind::InvariantViolation);
    assert_eq!(ledger, before);
}

#[test]
fn test_balanced_payout_commits() {
    init_tracing();
    let mut ledger = ledger();
    let outcome = run(
        &mut ledger,
        context(100_000, 0),
        vec![
            ScriptStep::Call(HostCall::WriteOutput(AccountDelta::debit(
                AccountRef::RegId(CONTRACT),
                300,
            ))),
            ScriptStep::Call(HostCall::WriteOutput(AccountDelta::credit(bob(), 300))),
        ],
    );

    assert!(outcome.is_committed(), "{:?}", outcome.state);
    assert_eq!(outcome.fuel_used, 2 * FUEL_ACCOUNT_OPERATE);
    assert_eq!(outcome.fee_charged, 2 * FUEL_ACCOUNT_OPERATE * FUEL_RATE);
    assert_eq!(ledger.balance_of(CONTRACT_ADDRESS), 700);
    assert_eq!(ledger.balance_of(BOB_ADDRESS), 300);

    let receipt = outcome.receipt.unwrap();
    assert_eq!(receipt.tx_hash, hex::encode([0xab; 32]));
    let kinds: Vec<_> = receipt.entries.iter().map(|e| e.kind).collect();
    assert_eq!(kinds, vec![ReceiptKind::AccountDebit, ReceiptKind::AccountCredit]);
}

#[test]
fn test_payout_beyond_contract_balance_aborts() {
    let mut ledger = ledger();
    let before = ledger.clone();
    let outcome = run(
        &mut ledger,
        context(100_000, 0),
        vec![
            ScriptStep::Call(HostCall::WriteOutput(AccountDelta::debit(
                AccountRef::RegId(CONTRACT),
                5_000,
            ))),
            ScriptStep::Call(HostCall::WriteOutput(AccountDelta::credit(bob(), 5_000))),
        ],
    );

    assert_eq!(outcome.error().unwrap().kind(), ErrorKind::InsufficientBalance);
    assert_eq!(ledger, before);
}

#[test]
fn test_payout_to_unregistered_reg_id_aborts_before_apply() {
    let mut ledger = ledger();
    let before = ledger.clone();
    let outcome = run(
        &mut ledger,
        context(100_000, 0),
        vec![
            ScriptStep::Call(HostCall::WriteOutput(AccountDelta::debit(
                AccountRef::RegId(CONTRACT),
                10,
            ))),
            ScriptStep::Call(HostCall::WriteOutput(AccountDelta::credit(
                AccountRef::RegId(RegId::new(999, 9)),
                10,
            ))),
        ],
    );

    let error = outcome.error().unwrap();
    assert_eq!(error.kind(), ErrorKind::InvariantViolation);
    assert!(!error.is_recoverable());
    assert_eq!(ledger, before);
}

#[test]
fn test_payout_to_registered_reg_id_commits() {
    let mut ledger = ledger();
    let outcome = run(
        &mut ledger,
        context(100_000, 0),
        vec![
            ScriptStep::Call(HostCall::WriteOutput(AccountDelta::debit(
                AccountRef::RegId(CONTRACT),
                10,
            ))),
            ScriptStep::Call(HostCall::WriteOutput(AccountDelta::credit(
                AccountRef::RegId(SENDER),
                10,
            ))),
        ],
    );

    assert!(outcome.is_committed(), "{:?}", outcome.state);
    assert_eq!(ledger.balance_of(SENDER_ADDRESS), 510);
}

#[test]
fn test_output_limit_rejects_only_the_extra_call() {
    let config = SandboxConfig {
        max_output_count: 2,
        ..SandboxConfig::default()
    };
    let mut ledger = ledger();
    let script = ReplayInterpreter::from_calls([
        HostCall::WriteOutput(AccountDelta::debit(AccountRef::RegId(CONTRACT), 5)),
        HostCall::WriteOutput(AccountDelta::credit(bob(), 5)),
        HostCall::WriteOutput(AccountDelta::credit(bob(), 5)),
    ]);
    let mut driver = ExecutionDriver::new(&config, &mut ledger, script, context(100_000, 0));
    driver.load().unwrap();
    let outcome = driver.run().unwrap();

    assert!(outcome.is_committed());
    let results = driver.interpreter().results();
    assert!(results[1].is_ok());
    assert_eq!(results[2].as_ref().unwrap_err().kind(), ErrorKind::Param);
    drop(driver);
    assert_eq!(ledger.balance_of(BOB_ADDRESS), 5);
}

// ============================================================================
// Sub-accounts
// ============================================================================

fn deposit(owner_address: &str, amount: u64) -> ScriptStep {
    ScriptStep::Call(HostCall::WriteOutAppOperate(vec![AppOperate {
        owner: owner_address.as_bytes().to_vec(),
        op: FundOp::CreditFree,
        amount,
        tag: Vec::new(),
        maturity_height: 0,
    }]))
}

#[test]
fn test_deposit_must_match_coin_paid_in() {
    let config = SandboxConfig::default();

    let mut paid = ledger();
    let script = ReplayInterpreter::new(vec![deposit(SENDER_ADDRESS, 250)]).check_account(true);
    let outcome = ExecutionDriver::new(&config, &mut paid, script, context(100_000, 250)).execute();
    assert!(outcome.is_committed());
    let sub = paid
        .get_sub_account(&CONTRACT, &owner(SENDER_ADDRESS))
        .unwrap()
        .unwrap();
    assert_eq!(sub.free, 250);

    let mut short = ledger();
    let before = short.clone();
    let script = ReplayInterpreter::new(vec![deposit(SENDER_ADDRESS, 250)]).check_account(true);
    let outcome = ExecutionDriver::new(&config, &mut short, script, context(100_000, 200)).execute();
    assert_eq!(outcome.error().unwrap().kind(), ErrorKind::InvariantViolation);
    assert_eq!(short, before);
}

#[test]
fn test_sub_account_check_skipped_for_other_symbols() {
    let config = SandboxConfig::default();
    let mut ledger = ledger();
    let mut ctx = context(100_000, 250);
    ctx.tx.coin_symbol = "USD".to_string();
    let script = ReplayInterpreter::new(vec![deposit(SENDER_ADDRESS, 1)]).check_account(true);
    assert!(ExecutionDriver::new(&config, &mut ledger, script, ctx)
        .execute()
        .is_committed());
}

#[test]
fn test_transfer_some_asset_then_mature() {
    let mut sender_sub = SubAccount::new(owner(SENDER_ADDRESS));
    sender_sub.credit_tag(tag("lock"), 100, 300).unwrap();
    let mut ledger = ledger().with_sub_account(CONTRACT, sender_sub);

    let outcome = run(
        &mut ledger,
        context(100_000, 0),
        vec![ScriptStep::Call(HostCall::TransferSomeAsset {
            to: BOB_ADDRESS.as_bytes().to_vec(),
            amount: 60,
            tag: b"lock".to_vec(),
            maturity_height: 300,
        })],
    );
    assert!(outcome.is_committed(), "{:?}", outcome.state);
    assert_eq!(outcome.fuel_used, 2 * FUEL_ACCOUNT_OPERATE);

    let sender = ledger
        .get_sub_account(&CONTRACT, &owner(SENDER_ADDRESS))
        .unwrap()
        .unwrap();
    assert_eq!(sender.fund_value(&tag("lock"), 300), Some(40));
    let receiver = ledger
        .get_sub_account(&CONTRACT, &owner(BOB_ADDRESS))
        .unwrap()
        .unwrap();
    assert_eq!(receiver.free, 0);
    assert_eq!(receiver.fund_value(&tag("lock"), 300), Some(60));

    // at the maturity height the fund reads as free balance
    let ctx = ExecutionContext {
        height: 300,
        ..context(100_000, 0)
    };
    let config = SandboxConfig::default();
    let script = ReplayInterpreter::from_calls([HostCall::GetUserAppAccValue {
        owner: BOB_ADDRESS.as_bytes().to_vec(),
    }]);
    let mut driver = ExecutionDriver::new(&config, &mut ledger, script, ctx);
    driver.load().unwrap();
    assert!(driver.run().unwrap().is_committed());
    assert_eq!(driver.interpreter().results()[0], Ok(HostValue::Amount(60)));
}

#[test]
fn test_transfer_contract_asset_moves_everything() {
    let mut sender_sub = SubAccount::new(owner(SENDER_ADDRESS)).with_free(50);
    sender_sub.credit_tag(tag("lock"), 20, 500).unwrap();
    let mut ledger = ledger().with_sub_account(CONTRACT, sender_sub);

    let outcome = run(
        &mut ledger,
        context(100_000, 0),
        vec![ScriptStep::Call(HostCall::TransferContractAsset {
            to: BOB_ADDRESS.as_bytes().to_vec(),
        })],
    );
    assert!(outcome.is_committed(), "{:?}", outcome.state);
    assert_eq!(outcome.fuel_used, 4 * FUEL_ACCOUNT_OPERATE);

    let sender = ledger
        .get_sub_account(&CONTRACT, &owner(SENDER_ADDRESS))
        .unwrap()
        .unwrap();
    assert!(sender.is_empty());
    let receiver = ledger
        .get_sub_account(&CONTRACT, &owner(BOB_ADDRESS))
        .unwrap()
        .unwrap();
    assert_eq!(receiver.free, 50);
    assert_eq!(receiver.fund_value(&tag("lock"), 500), Some(20));

    let kinds: Vec<_> = outcome.receipt.unwrap().entries.iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ReceiptKind::FreeDebit,
            ReceiptKind::TagDebit,
            ReceiptKind::FreeCredit,
            ReceiptKind::TagCredit
        ]
    );
}

#[test]
fn test_transfer_to_self_costs_nothing() {
    let config = SandboxConfig::default();
    let mut ledger = ledger();
    let script = ReplayInterpreter::from_calls([HostCall::TransferContractAsset {
        to: SENDER_ADDRESS.as_bytes().to_vec(),
    }]);
    let mut driver = ExecutionDriver::new(&config, &mut ledger, script, context(100_000, 0));
    driver.load().unwrap();
    let outcome = driver.run().unwrap();

    assert!(outcome.is_committed());
    assert_eq!(outcome.fuel_used, 0);
    assert_eq!(
        driver.interpreter().results()[0].as_ref().unwrap_err().kind(),
        ErrorKind::Param
    );
}

#[test]
fn test_overdrawn_sub_account_aborts_at_apply() {
    let mut ledger = ledger().with_sub_account(CONTRACT, SubAccount::new(owner(SENDER_ADDRESS)).with_free(10));
    let before = ledger.clone();
    let outcome = run(
        &mut ledger,
        context(100_000, 0),
        vec![ScriptStep::Call(HostCall::TransferSomeAsset {
            to: BOB_ADDRESS.as_bytes().to_vec(),
            amount: 11,
            tag: Vec::new(),
            maturity_height: 0,
        })],
    );

    assert_eq!(outcome.error().unwrap().kind(), ErrorKind::InsufficientBalance);
    assert_eq!(ledger, before);
}

// ============================================================================
// Storage and receipts
// ============================================================================

#[test]
fn test_storage_reads_see_own_writes() {
    let config = SandboxConfig::default();
    let mut ledger = ledger().with_contract_data(CONTRACT, b"old", b"1");
    let script = ReplayInterpreter::from_calls([
        HostCall::WriteData {
            key: b"k".to_vec(),
            value: b"v1".to_vec(),
        },
        HostCall::ReadData { key: b"k".to_vec() },
        HostCall::DeleteData { key: b"k".to_vec() },
        HostCall::ReadData { key: b"k".to_vec() },
        HostCall::ModifyData {
            key: b"missing".to_vec(),
            value: b"x".to_vec(),
        },
        HostCall::ModifyData {
            key: b"old".to_vec(),
            value: b"22".to_vec(),
        },
    ]);
    let mut driver = ExecutionDriver::new(&config, &mut ledger, script, context(100_000, 0));
    driver.load().unwrap();
    assert!(driver.run().unwrap().is_committed());

    let results = driver.interpreter().results().to_vec();
    assert_eq!(
        results,
        vec![
            Ok(HostValue::Bool(true)),
            Ok(HostValue::Bytes(b"v1".to_vec())),
            Ok(HostValue::Bool(true)),
            Ok(HostValue::Nil),
            Ok(HostValue::Bool(false)),
            Ok(HostValue::Bool(true)),
        ]
    );
    drop(driver);
    assert_eq!(ledger.get_contract_data(&CONTRACT, b"k").unwrap(), None);
    assert_eq!(ledger.get_contract_data(&CONTRACT, b"old").unwrap(), Some(b"22".to_vec()));
}

#[test]
fn test_recoverable_errors_do_not_abort() {
    let mut ledger = ledger();
    let outcome = run(
        &mut ledger,
        context(100_000, 0),
        vec![
            ScriptStep::Call(HostCall::Int64Div(1, 0)),
            ScriptStep::Call(HostCall::LogPrint(b"still running".to_vec())),
        ],
    );

    assert!(outcome.is_committed());
    assert_eq!(outcome.logs, vec!["still running".to_string()]);
    assert_eq!(
        outcome.fuel_used,
        FUEL_CALL_LOG_PRINT + 13 * FUEL_DATA1_LOG_PRINT
    );
}

#[test]
fn test_receipts_can_be_disabled() {
    let config = SandboxConfig {
        contract_log_enabled: false,
        ..SandboxConfig::default()
    };
    let mut ledger = ledger();
    let script = ReplayInterpreter::from_calls([
        HostCall::WriteOutput(AccountDelta::debit(AccountRef::RegId(CONTRACT), 1)),
        HostCall::WriteOutput(AccountDelta::credit(bob(), 1)),
    ]);
    let outcome = ExecutionDriver::new(&config, &mut ledger, script, context(100_000, 0)).execute();
    assert!(outcome.is_committed());
    assert!(outcome.receipt.is_none());
}

#[test]
fn test_outcome_serializes() {
    let mut ledger = ledger();
    let outcome = run(&mut ledger, context(100, 0), vec![ScriptStep::Steps(200)]);
    let json = serde_json::to_string(&outcome).unwrap();
    let back: RunOutcome = serde_json::from_str(&json).unwrap();
    assert_eq!(back, outcome);
}

// ============================================================================
// Properties
// ============================================================================

fn native_total(ledger: &MemoryLedger) -> u64 {
    [CONTRACT_ADDRESS, SENDER_ADDRESS, BOB_ADDRESS]
        .iter()
        .map(|address| ledger.balance_of(address))
        .sum()
}

fn script_step() -> impl Strategy<Value = ScriptStep> {
    let key = prop::collection::vec(any::<u8>(), 1..8);
    prop_oneof![
        (1u64..500).prop_map(ScriptStep::Steps),
        (any::<i32>(), any::<i32>())
            .prop_map(|(a, b)| ScriptStep::Call(HostCall::Int64Add(i64::from(a), i64::from(b)))),
        (key.clone(), prop::collection::vec(any::<u8>(), 1..16))
            .prop_map(|(key, value)| ScriptStep::Call(HostCall::WriteData { key, value })),
        key.prop_map(|key| ScriptStep::Call(HostCall::DeleteData { key })),
        (0u64..400).prop_map(|amount| ScriptStep::Call(HostCall::WriteOutput(
            AccountDelta::debit(AccountRef::RegId(CONTRACT), amount)
        ))),
        (0u64..400).prop_map(|amount| ScriptStep::Call(HostCall::WriteOutput(
            AccountDelta::credit(AccountRef::Address(BOB_ADDRESS.to_string()), amount)
        ))),
    ]
}

proptest! {
    #[test]
    fn prop_runs_are_deterministic(steps in prop::collection::vec(script_step(), 0..20)) {
        let mut first = ledger();
        let mut second = ledger();
        let a = run(&mut first, context(500_000, 0), steps.clone());
        let b = run(&mut second, context(500_000, 0), steps);
        prop_assert_eq!(a, b);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_native_coin_is_conserved(steps in prop::collection::vec(script_step(), 0..20)) {
        let initial = ledger();
        let mut ledger = initial.clone();
        let outcome = run(&mut ledger, context(500_000, 0), steps);
        prop_assert_eq!(native_total(&ledger), native_total(&initial));
        if !outcome.is_committed() {
            prop_assert_eq!(ledger, initial);
        }
    }
}
