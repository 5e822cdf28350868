use std::fmt;
use std::io;

use thiserror::Error;

use crate::memory::{Address, Byte};

pub type Result<T, E = VmError> = std::result::Result<T, E>;

/// Which part of memory an out of bounds access was aimed at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Memory,
    Stack,
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Region::Memory => f.write_str("memory"),
            Region::Stack => f.write_str("stack"),
        }
    }
}

/// Fatal machine errors. None of them can be recovered from inside the
/// execution loop.
#[derive(Debug, Error)]
pub enum VmError {
    #[error("invalid opcode 0x{opcode:02X} at 0x{pc:02X}")]
    InvalidOpcode { opcode: Byte, pc: Address },
    /// For [`Region::Stack`] the address is the stack pointer that would
    /// have left the stack region.
    #[error("{region} access at 0x{address:02X} is out of bounds")]
    OutOfBounds { region: Region, address: Address },
    #[error("invalid register R{index}")]
    InvalidRegister { index: Byte },
    #[error("unsupported ALU operation: {0}")]
    UnsupportedOperation(&'static str),
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

impl VmError {
    pub(crate) fn memory(address: Address) -> Self {
        VmError::OutOfBounds {
            region: Region::Memory,
            address,
        }
    }

    pub(crate) fn stack(sp: Byte) -> Self {
        VmError::OutOfBounds {
            region: Region::Stack,
            address: sp as Address,
        }
    }
}
