use std::convert::TryFrom;
use std::fmt::Write as _;
use std::io::Write;

use crate::alu::{self, AluOp};
use crate::error::{Result, VmError};
use crate::memory::{Address, Byte, StdMem};
use crate::registers::{Flags, Registers, STACK_TOP};
use log::*;
use num_enum::IntoPrimitive;
use num_enum::TryFromPrimitive;

/// Emulates the LS-8 CPU together with the memory it owns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Processor {
    /// Program counter
    pub pc: Address,
    /// General purpose registers, R7 is the stack pointer
    pub registers: Registers,
    /// Condition flags set by CMP
    pub flags: Flags,
    /// Main memory
    pub memory: StdMem,
    /// Set by HLT or by a fatal error. There is no way back.
    pub halted: bool,
}

impl Default for Processor {
    fn default() -> Self {
        Self::new(StdMem::default())
    }
}

impl Processor {
    /// Creates a CPU around an already loaded memory image. Execution
    /// starts at address 0.
    pub fn new(memory: StdMem) -> Self {
        Self {
            pc: 0,
            registers: Registers::default(),
            flags: Flags::default(),
            memory,
            halted: false,
        }
    }

    pub fn is_running(&self) -> bool {
        !self.halted
    }

    /// Reads the `n`th operand of the current instruction
    fn operand(&self, n: Address) -> Result<Byte> {
        self.memory.read_byte(self.pc + n)
    }

    /// Pushes a computed value onto the stack
    pub fn push_value(&mut self, value: Byte) -> Result<()> {
        let sp = self.registers.sp();
        if sp == 0 || sp > STACK_TOP {
            return Err(VmError::stack(sp));
        }

        let sp = sp - 1;
        self.memory.write_byte(sp as Address, value)?;
        self.registers.set_sp(sp);

        Ok(())
    }

    /// Pushes the contents of register `reg` onto the stack
    pub fn push_register(&mut self, reg: Byte) -> Result<()> {
        let value = self.registers.get(reg)?;
        self.push_value(value)
    }

    /// Pops the top of the stack
    pub fn pop_value(&mut self) -> Result<Byte> {
        let sp = self.registers.sp();
        if sp >= STACK_TOP {
            return Err(VmError::stack(sp));
        }

        let value = self.memory.read_byte(sp as Address)?;
        self.registers.set_sp(sp + 1);

        Ok(value)
    }

    /// Pops the top of the stack into register `reg`
    pub fn pop_register(&mut self, reg: Byte) -> Result<()> {
        let sp = self.registers.sp();
        if sp >= STACK_TOP {
            return Err(VmError::stack(sp));
        }

        let value = self.memory.read_byte(sp as Address)?;
        self.registers.set(reg, value)?;
        // R7 may have just been overwritten by the popped value
        let sp = self.registers.sp();
        self.registers.set_sp(sp.wrapping_add(1));

        Ok(())
    }

    /// Executes a single instruction
    pub fn execute_instruction<W: Write>(
        &mut self,
        instruction: Instruction,
        out: &mut W,
    ) -> Result<()> {
        match instruction {
            Instruction::HLT => {
                self.halted = true;

                debug!("HLT");
            }
            Instruction::LDI => {
                let reg = self.operand(1)?;
                let value = self.operand(2)?;
                self.registers.set(reg, value)?;

                debug!("LDI R{} {}", reg, value);
            }
            Instruction::PRN => {
                let reg = self.operand(1)?;
                let value = self.registers.get(reg)?;
                writeln!(out, "{}", value)?;

                debug!("PRN R{}: {}", reg, value);
            }
            Instruction::ADD | Instruction::SUB | Instruction::MUL | Instruction::CMP => {
                let op = AluOp::try_from(instruction)?;
                let reg_a = self.operand(1)?;
                let reg_b = self.operand(2)?;
                alu::binary(op, reg_a, reg_b, &mut self.registers, &mut self.flags)?;

                debug!("{} R{} R{}", instruction, reg_a, reg_b);
            }
            Instruction::INC | Instruction::DEC => {
                let op = AluOp::try_from(instruction)?;
                let reg = self.operand(1)?;
                alu::unary(op, reg, &mut self.registers)?;

                debug!("{} R{}", instruction, reg);
            }
            Instruction::PUSH => {
                let reg = self.operand(1)?;
                self.push_register(reg)?;

                debug!("PUSH R{}: SP 0x{:02X}", reg, self.registers.sp());
            }
            Instruction::POP => {
                let reg = self.operand(1)?;
                self.pop_register(reg)?;

                debug!("POP R{}: SP 0x{:02X}", reg, self.registers.sp());
            }
            Instruction::CALL => {
                let reg = self.operand(1)?;
                let target = self.registers.get(reg)?;
                let return_address = self.pc + instruction.width();
                let return_address =
                    Byte::try_from(return_address).map_err(|_| VmError::memory(return_address))?;
                self.push_value(return_address)?;
                self.pc = target as Address;

                debug!("CALL R{}: 0x{:02X}", reg, target);
            }
            Instruction::RET => {
                self.pc = self.pop_value()? as Address;

                debug!("RET 0x{:02X}", self.pc);
            }
        }

        if !instruction.sets_pc() {
            self.pc += instruction.width();
        }

        Ok(())
    }

    /// Runs one fetch, decode, execute cycle
    ///
    /// A failing cycle halts the processor.
    pub fn execute<W: Write>(&mut self, out: &mut W) -> Result<()> {
        let result = self.fetch().and_then(|instruction| {
            trace!("{}", self.trace());
            self.execute_instruction(instruction, out)
        });

        if let Err(err) = &result {
            debug!("Processor fault at 0x{:02X}: {}", self.pc, err);
            self.halted = true;
        }

        result
    }

    fn fetch(&self) -> Result<Instruction> {
        let opcode = self.memory.read_byte(self.pc)?; // Read opcode where PC is
        Instruction::try_from(opcode).map_err(|_| VmError::InvalidOpcode {
            opcode,
            pc: self.pc,
        })
    }

    /// Run program until HLT or a fatal error
    pub fn run<W: Write>(&mut self, out: &mut W) -> Result<()> {
        while !self.halted {
            self.execute(out)?;
        }

        info!("Program halted at 0x{:02X}", self.pc);

        Ok(())
    }

    /// Formats the current machine state on one line:
    /// `TRACE: PC | M[PC] M[PC+1] M[PC+2] | R0 .. R7`
    pub fn trace(&self) -> String {
        let peek = |offset: Address| self.memory.read_byte(self.pc + offset).unwrap_or(0);

        let mut line = format!(
            "TRACE: {:02X} | {:02X} {:02X} {:02X} |",
            self.pc,
            peek(0),
            peek(1),
            peek(2)
        );
        for value in self.registers.as_slice() {
            let _ = write!(line, " {:02X}", value);
        }

        line
    }
}

macro_rules! instructions {
    ( $( $( #[doc = $doc:expr] )+ $name:ident = $repr:literal , )+ ) => {
        /// The LS-8 instruction set
        ///
        /// Opcodes are laid out as `AABCDDDD`: `AA` is the operand count and
        /// `C` marks instructions that set the program counter themselves.
        #[repr(u8)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
        #[derive(TryFromPrimitive, IntoPrimitive)]
        pub enum Instruction {
            $(
                $( #[doc = $doc] )+
                $name = $repr,
            )+
        }

        impl Instruction {
            pub const ALL: &'static [Self] = &[
                $( Self::$name , )+
            ];

            pub fn name(&self) -> &'static str {
                match self {
                    $( Self::$name => stringify!($name) , )+
                }
            }
        }

        impl ::std::fmt::Display for Instruction {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                match self {
                    $( Self::$name => f.write_str(stringify!($name)) , )+
                }
            }
        }
    }
}

instructions! {
    /// Halt the CPU
    HLT = 0b0000_0001,
    /// Pop the return address off the stack and jump to it
    RET = 0b0001_0001,
    /// Push a register onto the stack
    /// @param reg
    PUSH = 0b0100_0101,
    /// Pop the top of the stack into a register
    /// @param reg
    POP = 0b0100_0110,
    /// Print the decimal value of a register
    /// @param reg
    PRN = 0b0100_0111,
    /// Push the address of the next instruction and jump to the address in a register
    /// @param reg Holds the call target
    CALL = 0b0101_0000,
    /// Increment a register
    /// @param reg
    INC = 0b0110_0101,
    /// Decrement a register
    /// @param reg
    DEC = 0b0110_0110,
    /// Load an immediate into a register
    /// @param reg
    /// @param value
    LDI = 0b1000_0010,
    /// reg_a += reg_b
    /// @param reg_a
    /// @param reg_b
    ADD = 0b1010_0000,
    /// reg_a -= reg_b
    /// @param reg_a
    /// @param reg_b
    SUB = 0b1010_0001,
    /// reg_a *= reg_b
    /// @param reg_a
    /// @param reg_b
    MUL = 0b1010_0010,
    /// Compare two registers and set the flags
    /// @param reg_a
    /// @param reg_b
    CMP = 0b1010_0111,
}

impl Instruction {
    /// Number of operand bytes following the opcode
    pub fn operand_count(&self) -> Address {
        (u8::from(*self) >> 6) as Address
    }

    /// Total size of the instruction in bytes
    pub fn width(&self) -> Address {
        self.operand_count() + 1
    }

    /// Whether the instruction moves the program counter on its own
    pub fn sets_pc(&self) -> bool {
        u8::from(*self) & 0b0001_0000 != 0
    }
}
