use std::fmt::Write as _;

use log::debug;

use crate::error::{Result, VmError};

pub mod parse;

pub type Byte = u8; // 1 byte
pub type Address = usize;

/// Size of the LS-8 address space
pub const RAM_SIZE: usize = 0x100;

/// Default memory
pub type StdMem = Memory<RAM_SIZE>;

/// Emulates memory for use with the CPU
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Memory<const S: usize> {
    /// The actual data of the memory
    pub data: [Byte; S],
}

impl<const S: usize> Default for Memory<S> {
    /// Initializes the memory
    fn default() -> Self {
        Memory { data: [0; S] }
    }
}

impl<const S: usize> Memory<S> {
    /// Reads a byte from the memory
    pub fn read_byte(&self, position: Address) -> Result<Byte> {
        self.data
            .get(position)
            .copied()
            .ok_or_else(|| VmError::memory(position))
    }

    /// Writes a byte to the memory
    pub fn write_byte(&mut self, position: Address, value: Byte) -> Result<()> {
        let slot = self
            .data
            .get_mut(position)
            .ok_or_else(|| VmError::memory(position))?;
        *slot = value;

        Ok(())
    }

    /// Writes an array of bytes to the memory
    pub fn write_array(&mut self, position: Address, data: &[Byte]) -> Result<()> {
        let end = position + data.len();
        if end > S {
            return Err(VmError::memory(end - 1));
        }
        self.data[position..end].copy_from_slice(data);

        Ok(())
    }

    /// Logs the memory contents as hex, 16 bytes per row
    pub fn dump(&self) {
        for (row, chunk) in self.data.chunks(16).enumerate() {
            let mut line = format!("{:02X}:", row * 16);
            for byte in chunk {
                let _ = write!(line, " {:02X}", byte);
            }
            debug!("{}", line);
        }
    }
}

/// Writes a block of instructions directly into the memory
#[macro_export]
macro_rules! write_instructions {
    ( $mem:ident : $pos:expr => $( $byte:expr ),+ ) => {
        $mem.write_array($pos, &[
            $(
                $byte as $crate::memory::Byte,
            )+
        ])
    };
}

#[cfg(test)]
mod tests {
    use crate::error::Region;
    use crate::processor::Instruction;

    use super::*;
    use color_eyre::eyre::Result;

    #[test]
    fn test_read_byte() -> Result<()> {
        let mut mem = StdMem::default();
        mem.data[0x2] = 0x12;
        assert_eq!(mem.read_byte(0x2)?, 0x12);

        Ok(())
    }

    #[test]
    fn test_write_byte() -> Result<()> {
        let mut mem = StdMem::default();
        mem.write_byte(0x44, 12)?;
        assert_eq!(mem.data[0x44], 12);

        Ok(())
    }

    #[test]
    fn test_last_address() -> Result<()> {
        let mut mem = StdMem::default();
        mem.write_byte(0xFF, 0xAB)?;
        assert_eq!(mem.read_byte(0xFF)?, 0xAB);

        Ok(())
    }

    #[test]
    fn test_out_of_bounds() -> Result<()> {
        let mut mem = StdMem::default();

        assert!(matches!(
            mem.read_byte(0x100),
            Err(VmError::OutOfBounds {
                region: Region::Memory,
                address: 0x100
            })
        ));
        assert!(matches!(
            mem.write_byte(0x1234, 1),
            Err(VmError::OutOfBounds { address: 0x1234, .. })
        ));
        assert_eq!(mem, StdMem::default());

        Ok(())
    }

    #[test]
    fn test_write_array() -> Result<()> {
        let mut mem = StdMem::default();
        mem.write_array(0x44, &[0x12, 0x34, 0x56, 0x78])?;
        assert_eq!(mem.data[0x44], 0x12);
        assert_eq!(mem.data[0x45], 0x34);
        assert_eq!(mem.data[0x46], 0x56);
        assert_eq!(mem.data[0x47], 0x78);

        Ok(())
    }

    #[test]
    fn test_write_array_past_end() -> Result<()> {
        let mut mem = StdMem::default();

        assert!(mem.write_array(0xFE, &[1, 2, 3]).is_err());
        assert_eq!(mem, StdMem::default());

        Ok(())
    }

    #[test]
    fn test_write_instructions() -> Result<()> {
        let mut mem = StdMem::default();

        mem.write_array(
            0x10,
            &[
                Instruction::LDI as Byte,
                0,
                42,
                Instruction::PRN as Byte,
                0,
                Instruction::HLT as Byte,
            ],
        )?;

        let mut mem2 = StdMem::default();
        use crate::processor::Instruction::*;
        write_instructions!(mem2 : 0x10 => LDI, 0, 42, PRN, 0, HLT)?;

        assert_eq!(mem, mem2);

        Ok(())
    }
}
