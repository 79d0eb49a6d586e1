//! Shared instruction-set enumerations.
//!
//! This is the single declaration file consumed by both `coder-asm` and
//! the VM in [`crate::vm`]: the numeric values below are the on-disk
//! contract between the two. Changing a discriminant here changes what
//! both sides agree an image means.

use crate::Cell;
use num_traits::FromPrimitive;

/// Reserved pass/fail target meaning "fall through". Chosen as `-1`
/// because it can never be a legal memory index.
pub const TAKE_NO_JUMP: Cell = -1;

/// Every instruction opcode understood by the VM. The operand layout
/// following each opcode cell is fixed and documented on the variant.
#[derive(Clone, Copy, PartialEq, Eq, Debug, FromPrimitive, ToPrimitive)]
pub enum OpCode {
    /// `src-operand(2), dst-operand(2)`
    Copy = 0,
    /// `lhs-operand(2), rhs-operand(2), dst-operand(2)`
    Add = 1,
    Sub = 2,
    Mul = 3,
    Div = 4,
    /// `lhs-operand(2), test-op(1), rhs-operand(2), pass-addr(1), fail-addr(1)`
    Test = 5,
    /// `target-addr(1)`
    Jump = 6,
    /// `target-operand(2)`
    Jsub = 7,
    /// `src-operand(2)`
    Push = 8,
    /// `dst-operand(2)`
    Pop = 9,
    /// no operands
    Return = 10,
    /// `lhs-operand(2), rhs-operand(2), dst-operand(2)`
    And = 11,
    Or = 12,
    /// no operands
    Halt = 13,
    /// `interrupt-number(1)`
    Interrupt = 14,
}

impl OpCode {
    pub fn decode(value: Cell) -> Option<OpCode> {
        FromPrimitive::from_i32(value)
    }
}

/// Tag cell preceding every two-cell operand.
#[derive(Clone, Copy, PartialEq, Eq, Debug, FromPrimitive, ToPrimitive)]
pub enum AddrMode {
    /// The address cell *is* the literal value. Read-only.
    Value = 0,
    /// The address cell is a memory index; the operand reads/writes that cell.
    Immediate = 1,
    /// The address cell holds the address of a cell holding the effective address.
    Pointer = 2,
}

impl AddrMode {
    pub fn decode(value: Cell) -> Option<AddrMode> {
        FromPrimitive::from_i32(value)
    }
}

/// Comparison codes understood by the `test` instruction.
#[derive(Clone, Copy, PartialEq, Eq, Debug, FromPrimitive, ToPrimitive)]
pub enum TestCode {
    Eq = 0,
    Ne = 1,
    Gt = 2,
    Lt = 3,
    Ge = 4,
    Le = 5,
}

impl TestCode {
    pub fn decode(value: Cell) -> Option<TestCode> {
        FromPrimitive::from_i32(value)
    }

    /// Evaluates this test against `diff = rhs - lhs` (note the order:
    /// the operand that was parsed second is the minuend). This mirrors
    /// the reference implementation exactly, including the
    /// counter-intuitive operand order called out in the spec.
    pub fn evaluate(self, diff: Cell) -> bool {
        match self {
            TestCode::Eq => diff == 0,
            TestCode::Ne => diff != 0,
            TestCode::Gt => diff > 0,
            TestCode::Lt => diff < 0,
            TestCode::Ge => diff >= 0,
            TestCode::Le => diff <= 0,
        }
    }
}

/// Interrupt numbers dispatched by the `interrupt` instruction.
#[derive(Clone, Copy, PartialEq, Eq, Debug, FromPrimitive, ToPrimitive)]
pub enum Interrupt {
    Screen = 0,
    Input = 1,
    Timeout = 2,
}

impl Interrupt {
    pub fn decode(value: Cell) -> Option<Interrupt> {
        FromPrimitive::from_i32(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opcode_decodes_every_declared_value() {
        for v in 0..=14 {
            assert!(OpCode::decode(v).is_some(), "opcode {} should decode", v);
        }
        assert!(OpCode::decode(15).is_none());
        assert!(OpCode::decode(-1).is_none());
    }

    #[test]
    fn addr_mode_decodes_three_values() {
        assert_eq!(AddrMode::decode(0), Some(AddrMode::Value));
        assert_eq!(AddrMode::decode(1), Some(AddrMode::Immediate));
        assert_eq!(AddrMode::decode(2), Some(AddrMode::Pointer));
        assert_eq!(AddrMode::decode(3), None);
    }

    #[test]
    fn test_code_table_matches_diff_sign() {
        assert!(TestCode::Eq.evaluate(0));
        assert!(!TestCode::Eq.evaluate(1));
        assert!(TestCode::Gt.evaluate(5));
        assert!(!TestCode::Gt.evaluate(-5));
        assert!(TestCode::Lt.evaluate(-5));
        assert!(TestCode::Ge.evaluate(0));
        assert!(TestCode::Le.evaluate(0));
    }

    #[test]
    fn take_no_jump_is_not_a_legal_index() {
        assert!(TAKE_NO_JUMP < 0);
    }
}
