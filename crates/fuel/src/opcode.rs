//! Opcode cost table.
//!
//! Instruction codes of the register-based interpreter and the fuel each one
//! burns. Loads, moves, table access and control flow are not separately
//! metered; they are paid for through step fuel.

use serde::{Deserialize, Serialize};

/// Number of instruction codes.
pub const OPCODE_COUNT: usize = 47;

/// Interpreter instruction codes.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpCode {
    Move = 0,
    LoadK = 1,
    LoadKx = 2,
    LoadBool = 3,
    LoadNil = 4,
    GetUpval = 5,
    GetTabUp = 6,
    GetTable = 7,
    SetTabUp = 8,
    SetUpval = 9,
    SetTable = 10,
    NewTable = 11,
    SelfOp = 12,
    Add = 13,
    Sub = 14,
    Mul = 15,
    Mod = 16,
    Pow = 17,
    Div = 18,
    IDiv = 19,
    BAnd = 20,
    BOr = 21,
    BXor = 22,
    Shl = 23,
    Shr = 24,
    Unm = 25,
    BNot = 26,
    Not = 27,
    Len = 28,
    Concat = 29,
    Jmp = 30,
    Eq = 31,
    Lt = 32,
    Le = 33,
    Test = 34,
    TestSet = 35,
    Call = 36,
    TailCall = 37,
    Return = 38,
    ForLoop = 39,
    ForPrep = 40,
    TForCall = 41,
    TForLoop = 42,
    SetList = 43,
    Closure = 44,
    Vararg = 45,
    ExtraArg = 46,
}

/// Pricing category of an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpCategory {
    Arithmetic,
    Bitwise,
    Comparison,
    Logical,
    Length,
    Concatenation,
    /// Loads, stores, calls and jumps.
    Unmetered,
}

impl OpCode {
    /// Every instruction code in numeric order.
    pub const ALL: [OpCode; OPCODE_COUNT] = [
        OpCode::Move,
        OpCode::LoadK,
        OpCode::LoadKx,
        OpCode::LoadBool,
        OpCode::LoadNil,
        OpCode::GetUpval,
        OpCode::GetTabUp,
        OpCode::GetTable,
        OpCode::SetTabUp,
        OpCode::SetUpval,
        OpCode::SetTable,
        OpCode::NewTable,
        OpCode::SelfOp,
        OpCode::Add,
        OpCode::Sub,
        OpCode::Mul,
        OpCode::Mod,
        OpCode::Pow,
        OpCode::Div,
        OpCode::IDiv,
        OpCode::BAnd,
        OpCode::BOr,
        OpCode::BXor,
        OpCode::Shl,
        OpCode::Shr,
        OpCode::Unm,
        OpCode::BNot,
        OpCode::Not,
        OpCode::Len,
        OpCode::Concat,
        OpCode::Jmp,
        OpCode::Eq,
        OpCode::Lt,
        OpCode::Le,
        OpCode::Test,
        OpCode::TestSet,
        OpCode::Call,
        OpCode::TailCall,
        OpCode::Return,
        OpCode::ForLoop,
        OpCode::ForPrep,
        OpCode::TForCall,
        OpCode::TForLoop,
        OpCode::SetList,
        OpCode::Closure,
        OpCode::Vararg,
        OpCode::ExtraArg,
    ];

    /// Decodes an instruction code.
    pub fn from_u8(code: u8) -> Option<OpCode> {
        Self::ALL.get(code as usize).copied()
    }

    /// Returns the pricing category.
    pub fn category(self) -> OpCategory {
        match self {
            OpCode::Add
            | OpCode::Sub
            | OpCode::Mul
            | OpCode::Mod
            | OpCode::Pow
            | OpCode::Div
            | OpCode::IDiv
            | OpCode::Unm => OpCategory::Arithmetic,
            OpCode::BAnd
            | OpCode::BOr
            | OpCode::BXor
            | OpCode::Shl
            | OpCode::Shr
            | OpCode::BNot => OpCategory::Bitwise,
            OpCode::Eq | OpCode::Lt | OpCode::Le => OpCategory::Comparison,
            OpCode::Not | OpCode::Test | OpCode::TestSet => OpCategory::Logical,
            OpCode::Len => OpCategory::Length,
            OpCode::Concat => OpCategory::Concatenation,
            _ => OpCategory::Unmetered,
        }
    }

    /// Returns the fuel this instruction burns.
    pub fn cost(self) -> u64 {
        OP_COSTS[self as usize]
    }
}

impl TryFrom<u8> for OpCode {
    type Error = u8;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        OpCode::from_u8(code).ok_or(code)
    }
}

const OP_COSTS: [u64; OPCODE_COUNT] = build_costs();

const fn build_costs() -> [u64; OPCODE_COUNT] {
    let mut table = [0u64; OPCODE_COUNT];
    table[OpCode::Add as usize] = 3;
    table[OpCode::Sub as usize] = 3;
    table[OpCode::Mul as usize] = 5;
    table[OpCode::Mod as usize] = 8;
    table[OpCode::Pow as usize] = 10;
    table[OpCode::Div as usize] = 5;
    table[OpCode::IDiv as usize] = 5;
    table[OpCode::BAnd as usize] = 3;
    table[OpCode::BOr as usize] = 3;
    table[OpCode::BXor as usize] = 3;
    table[OpCode::Shl as usize] = 3;
    table[OpCode::Shr as usize] = 3;
    table[OpCode::Unm as usize] = 3;
    table[OpCode::BNot as usize] = 3;
    table[OpCode::Not as usize] = 3;
    table[OpCode::Len as usize] = 32;
    table[OpCode::Concat as usize] = 3;
    table[OpCode::Eq as usize] = 3;
    table[OpCode::Lt as usize] = 3;
    table[OpCode::Le as usize] = 3;
    table[OpCode::Test as usize] = 3;
    table[OpCode::TestSet as usize] = 3;
    table
}

/// Read-only lookup over the opcode prices.
pub struct OpCostTable;

impl OpCostTable {
    /// Returns the full price table indexed by instruction code.
    pub fn price_table() -> &'static [u64; OPCODE_COUNT] {
        &OP_COSTS
    }

    /// Returns the cost of `code`, or `None` if the code is unknown.
    #[inline]
    pub fn cost(code: u8) -> Option<u64> {
        OP_COSTS.get(code as usize).copied()
    }
}
