//! Loader for LS-8 program images.
//!
//! ```text
//! 10000010 # LDI R0,8
//! 00000000
//! 00001000
//! 01000111 # PRN R0
//! 00000000
//! 00000001 # HLT
//! ```
//!
//! Only lines starting with `0` or `1` carry a byte. Everything from `#`
//! onward is a comment. All other lines are skipped.

use std::borrow::Cow;
use std::path::Path;
use std::str::{FromStr, Lines};
use std::{fmt, fs, io};

use thiserror::Error;

use super::{Address, Byte, Memory};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    InvalidAddress { address: Address },
    InvalidLiteral,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::InvalidAddress { address } => {
                write!(f, "memory has no address `0x{:x}`", address)
            }
            ParseErrorKind::InvalidLiteral => f.write_str("invalid literal"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    kind: ParseErrorKind,
    context: Option<Cow<'static, str>>,
    line_nr: usize,
}

impl ParseError {
    fn new<C, S>(kind: ParseErrorKind, context: C, line_nr: usize) -> Self
    where
        C: Into<Option<S>>,
        S: Into<Cow<'static, str>>,
    {
        Self {
            kind,
            context: context.into().map(|inner| inner.into()),
            line_nr,
        }
    }

    pub fn kind(&self) -> ParseErrorKind {
        self.kind
    }

    pub fn line_nr(&self) -> usize {
        self.line_nr
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(context) = &self.context {
            write!(
                f,
                "error [ln: {}]: {} - {}",
                self.line_nr, self.kind, context
            )
        } else {
            write!(f, "error [ln: {}]: {}", self.line_nr, self.kind)
        }
    }
}

impl std::error::Error for ParseError {}

pub type Result<T, E = ParseError> = std::result::Result<T, E>;

/// Failure to turn a program file into memory
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read program: {0}")]
    Io(#[from] io::Error),
    #[error("program has {} malformed line(s), first: {}", .0.len(), first_error(.0))]
    Parse(Vec<ParseError>),
}

fn first_error(errors: &[ParseError]) -> String {
    errors
        .first()
        .map(ToString::to_string)
        .unwrap_or_default()
}

#[derive(Debug, Clone)]
pub struct Parser<'a, const S: usize> {
    lines: Lines<'a>,
    line_nr: usize,
    position: Address,
    memory: Memory<S>,
}

impl<'a, const S: usize> Parser<'a, S> {
    /// Creates a new parser for `data` which will populate `memory` starting
    /// at address 0.
    pub fn new(data: &'a str, memory: Memory<S>) -> Self {
        Self {
            lines: data.lines(),
            line_nr: 0,
            position: 0,
            memory,
        }
    }

    /// Consumes `self` and tries to parse all of the data into memory.
    ///
    /// # Errors
    ///
    /// All errors which may occur are collected and returned at the end.
    pub fn parse(mut self) -> Result<Memory<S>, Vec<ParseError>> {
        let mut errors = Vec::new();

        while let Some(res) = self.parse_next_line() {
            if let Err(err) = res {
                log::error!("{}", err);
                errors.push(err);
            }
        }

        if errors.is_empty() {
            log::debug!("Loaded {} bytes", self.position);
            Ok(self.memory)
        } else {
            Err(errors)
        }
    }

    fn parse_next_line(&mut self) -> Option<Result<()>> {
        let line = self.lines.next()?;
        self.line_nr += 1;

        if line.starts_with('0') || line.starts_with('1') {
            Some(self.parse_literal(line))
        } else {
            // Blank, comment or anything else; skip
            Some(Ok(()))
        }
    }

    /// Tries to parse line as a binary byte literal. The `line` should be the
    /// whole line whithout any modifications.
    ///
    /// # Examples
    ///
    /// - `10000010 # LDI R0,8`
    /// - `00000001`
    fn parse_literal(&mut self, line: &str) -> Result<()> {
        let literal = line.split('#').next().unwrap_or_default().trim();

        let byte = Byte::from_str_radix(literal, 2).map_err(|_| {
            ParseError::new(
                ParseErrorKind::InvalidLiteral,
                format!("`{}` is not an 8-bit binary number", literal),
                self.line_nr,
            )
        })?;

        self.write_byte(byte)
    }

    /// Writes `byte` into memory at the current position, then advances the
    /// position by one.
    ///
    /// # Errors
    ///
    /// This will return an error if the program does not fit into memory.
    fn write_byte(&mut self, byte: Byte) -> Result<()> {
        let address = self.position;
        self.memory.write_byte(address, byte).map_err(|_| {
            ParseError::new(
                ParseErrorKind::InvalidAddress { address },
                "program does not fit into memory",
                self.line_nr,
            )
        })?;
        self.position += 1;

        Ok(())
    }
}

impl<const S: usize> FromStr for Memory<S> {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Parser::new(s, Memory::default())
            .parse()
            .map_err(LoadError::Parse)
    }
}

impl<const S: usize> Memory<S> {
    /// Reads a program image from `path` into a fresh memory
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let data = fs::read_to_string(path)?;
        data.parse()
    }
}
