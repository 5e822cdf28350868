use std::convert::TryFrom;

use crate::error::{Result, VmError};
use crate::memory::Byte;
use crate::processor::Instruction;
use crate::registers::{Flags, Registers};

/// Operations the ALU knows how to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
    Add,
    Sub,
    Mul,
    Inc,
    Dec,
    Cmp,
}

impl AluOp {
    pub fn name(&self) -> &'static str {
        match self {
            AluOp::Add => "ADD",
            AluOp::Sub => "SUB",
            AluOp::Mul => "MUL",
            AluOp::Inc => "INC",
            AluOp::Dec => "DEC",
            AluOp::Cmp => "CMP",
        }
    }
}

impl TryFrom<Instruction> for AluOp {
    type Error = VmError;

    fn try_from(instruction: Instruction) -> Result<Self> {
        match instruction {
            Instruction::ADD => Ok(AluOp::Add),
            Instruction::SUB => Ok(AluOp::Sub),
            Instruction::MUL => Ok(AluOp::Mul),
            Instruction::INC => Ok(AluOp::Inc),
            Instruction::DEC => Ok(AluOp::Dec),
            Instruction::CMP => Ok(AluOp::Cmp),
            other => Err(VmError::UnsupportedOperation(other.name())),
        }
    }
}

/// Runs a two operand operation. The result lands in `reg_a`, or in the
/// flags for CMP. `reg_b` is never written.
pub fn binary(
    op: AluOp,
    reg_a: Byte,
    reg_b: Byte,
    registers: &mut Registers,
    flags: &mut Flags,
) -> Result<()> {
    let a = registers.get(reg_a)?;
    let b = registers.get(reg_b)?;

    let result = match op {
        AluOp::Add => a.wrapping_add(b),
        AluOp::Sub => a.wrapping_sub(b),
        AluOp::Mul => a.wrapping_mul(b),
        AluOp::Cmp => {
            flags.set_comparison(a.cmp(&b));
            return Ok(());
        }
        AluOp::Inc | AluOp::Dec => return Err(VmError::UnsupportedOperation(op.name())),
    };

    registers.set(reg_a, result)
}

/// Runs a single operand operation in place on `reg`
pub fn unary(op: AluOp, reg: Byte, registers: &mut Registers) -> Result<()> {
    let value = registers.get(reg)?;

    let result = match op {
        AluOp::Inc => value.wrapping_add(1),
        AluOp::Dec => value.wrapping_sub(1),
        _ => return Err(VmError::UnsupportedOperation(op.name())),
    };

    registers.set(reg, result)
}
