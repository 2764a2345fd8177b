use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors that stop an operation without touching machine state.
#[derive(Debug, Error)]
pub enum Error {
    #[error("program too large: {len} bytes, at most {max} fit above 0x200")]
    ProgramTooLarge { len: usize, max: usize },
    #[error("memory access out of bounds: {len} byte(s) at 0x{addr:04x}")]
    AddressOutOfBounds { addr: usize, len: usize },
    #[error("sound device: {0}")]
    Sound(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Recoverable conditions reported by a single step. The machine keeps
/// running; the driver decides what to do with them.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Diagnostic {
    #[error("unknown instruction 0x{word:04x} at 0x{pc:03x}")]
    UnknownInstruction { word: u16, pc: u16 },
    #[error("stack overflow calling from 0x{pc:03x}, call dropped")]
    StackOverflow { pc: u16 },
    #[error("stack underflow returning from 0x{pc:03x}, return dropped")]
    StackUnderflow { pc: u16 },
}
