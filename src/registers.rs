use std::cmp::Ordering;

use crate::error::{Result, VmError};
use crate::memory::Byte;

/// Number of general purpose registers
pub const REGISTER_COUNT: usize = 8;
/// Index of the register holding the stack pointer
pub const SP: Byte = 7;
/// Initial stack pointer. The stack grows down from here.
pub const STACK_TOP: Byte = 0xF4;

/// The general purpose registers R0 - R7
///
/// R7 is the stack pointer, but the ISA does not hide it: instructions may
/// read and write it like any other register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Registers {
    data: [Byte; REGISTER_COUNT],
}

impl Default for Registers {
    fn default() -> Self {
        let mut data = [0; REGISTER_COUNT];
        data[SP as usize] = STACK_TOP;
        Self { data }
    }
}

impl Registers {
    pub fn get(&self, index: Byte) -> Result<Byte> {
        self.data
            .get(index as usize)
            .copied()
            .ok_or(VmError::InvalidRegister { index })
    }

    pub fn set(&mut self, index: Byte, value: Byte) -> Result<()> {
        let slot = self
            .data
            .get_mut(index as usize)
            .ok_or(VmError::InvalidRegister { index })?;
        *slot = value;

        Ok(())
    }

    /// Current stack pointer
    pub fn sp(&self) -> Byte {
        self.data[SP as usize]
    }

    pub fn set_sp(&mut self, value: Byte) {
        self.data[SP as usize] = value;
    }

    pub fn as_slice(&self) -> &[Byte] {
        &self.data
    }
}

/// Condition flags, laid out as `00000LGE`
///
/// Only CMP writes them, and exactly one of the three is set afterwards.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Flags(Byte);

impl Flags {
    pub const LESS_THAN: Byte = 0b0000_0100;
    pub const GREATER_THAN: Byte = 0b0000_0010;
    pub const EQUAL: Byte = 0b0000_0001;

    /// Sets the flag matching `ordering` and clears the others
    pub fn set_comparison(&mut self, ordering: Ordering) {
        self.0 = match ordering {
            Ordering::Less => Self::LESS_THAN,
            Ordering::Greater => Self::GREATER_THAN,
            Ordering::Equal => Self::EQUAL,
        };
    }

    pub fn less_than(&self) -> bool {
        self.0 & Self::LESS_THAN != 0
    }

    pub fn greater_than(&self) -> bool {
        self.0 & Self::GREATER_THAN != 0
    }

    pub fn equal(&self) -> bool {
        self.0 & Self::EQUAL != 0
    }

    pub fn bits(&self) -> Byte {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use color_eyre::eyre::Result;

    #[test]
    fn test_initial_state() -> Result<()> {
        let regs = Registers::default();

        for index in 0..SP {
            assert_eq!(regs.get(index)?, 0);
        }
        assert_eq!(regs.get(SP)?, 0xF4);
        assert_eq!(regs.sp(), STACK_TOP);

        Ok(())
    }

    #[test]
    fn test_set_get_every_register() -> Result<()> {
        let mut regs = Registers::default();

        for index in 0..REGISTER_COUNT as Byte {
            regs.set(index, index * 3 + 1)?;
        }
        for index in 0..REGISTER_COUNT as Byte {
            assert_eq!(regs.get(index)?, index * 3 + 1);
        }
        assert_eq!(regs.sp(), 22);

        Ok(())
    }

    #[test]
    fn test_invalid_register() -> Result<()> {
        let mut regs = Registers::default();

        assert!(matches!(
            regs.get(8),
            Err(VmError::InvalidRegister { index: 8 })
        ));
        assert!(matches!(
            regs.set(0xFF, 1),
            Err(VmError::InvalidRegister { index: 0xFF })
        ));
        assert_eq!(regs, Registers::default());

        Ok(())
    }

    #[test]
    fn test_flags_are_exclusive() -> Result<()> {
        let mut flags = Flags::default();
        assert_eq!(flags.bits(), 0);

        flags.set_comparison(Ordering::Less);
        assert!(flags.less_than() && !flags.greater_than() && !flags.equal());
        assert_eq!(flags.bits(), 0b100);

        flags.set_comparison(Ordering::Greater);
        assert!(!flags.less_than() && flags.greater_than() && !flags.equal());
        assert_eq!(flags.bits(), 0b010);

        flags.set_comparison(Ordering::Equal);
        assert!(!flags.less_than() && !flags.greater_than() && flags.equal());
        assert_eq!(flags.bits(), 0b001);

        Ok(())
    }
}
