//! An emulator for the LS-8, a tiny 8-bit CPU with 256 bytes of memory,
//! eight registers and a downward growing stack.

pub mod alu;
pub mod error;
pub mod memory;
pub mod processor;
pub mod registers;

pub use error::{Result, VmError};
pub use memory::{Memory, StdMem};
pub use processor::{Instruction, Processor};
