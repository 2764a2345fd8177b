//! # instruction set
//!
//! Every CHIP-8 instruction is one big-endian 16-bit word. Operand fields are
//! named the usual way:
//!
//!   nnn  low 12 bits, an address
//!   kk   low byte, an immediate
//!   x    bits 8-11, a register index
//!   y    bits 4-7, a register index
//!   n    low nibble
//!
//! Decoding is done once, into a closed enum, so the interpreter never has to
//! pick bits out of the word itself.
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0
    ClearScreen,
    /// 00EE
    Return,
    /// 1nnn
    Jump { addr: u16 },
    /// 2nnn
    Call { addr: u16 },
    /// 3xkk
    SkipEqImm { x: u8, kk: u8 },
    /// 4xkk
    SkipNeImm { x: u8, kk: u8 },
    /// 5xy0
    SkipEqReg { x: u8, y: u8 },
    /// 6xkk
    LoadImm { x: u8, kk: u8 },
    /// 7xkk
    AddImm { x: u8, kk: u8 },
    /// 8xy0
    Move { x: u8, y: u8 },
    /// 8xy1
    Or { x: u8, y: u8 },
    /// 8xy2
    And { x: u8, y: u8 },
    /// 8xy3
    Xor { x: u8, y: u8 },
    /// 8xy4
    Add { x: u8, y: u8 },
    /// 8xy5
    Sub { x: u8, y: u8 },
    /// 8xy6
    ShiftRight { x: u8, y: u8 },
    /// 8xy7
    SubReverse { x: u8, y: u8 },
    /// 8xyE
    ShiftLeft { x: u8, y: u8 },
    /// 9xy0
    SkipNeReg { x: u8, y: u8 },
    /// Annn
    LoadIndex { addr: u16 },
    /// Bnnn
    JumpOffset { addr: u16 },
    /// Cxkk
    Random { x: u8, kk: u8 },
    /// Dxyn
    Draw { x: u8, y: u8, n: u8 },
    /// Ex9E
    SkipKeyPressed { x: u8 },
    /// ExA1
    SkipKeyNotPressed { x: u8 },
    /// Fx07
    LoadDelay { x: u8 },
    /// Fx0A
    WaitKey { x: u8 },
    /// Fx15
    SetDelay { x: u8 },
    /// Fx18
    SetSound { x: u8 },
    /// Fx1E
    AddIndex { x: u8 },
    /// Fx29
    LoadGlyph { x: u8 },
    /// Fx33
    StoreBcd { x: u8 },
    /// Fx55
    StoreRegs { x: u8 },
    /// Fx65
    LoadRegs { x: u8 },
}

impl Instruction {
    /// decode an instruction word; `None` for anything outside the set
    ///
    /// Only exact encodings match: `00E0` and `00EE` but no other `0nnn`
    /// (so `0000` and machine-code `SYS` calls are unknown), and `5xy0` /
    /// `9xy0` only with a zero low nibble. Looser decoders treat any `0nn0`
    /// as CLS, any `0nnE` as RET and ignore the low nibble of `5xyN`/`9xyN`.
    pub fn decode(word: u16) -> Option<Instruction> {
        use Instruction::*;

        let nibbles = (
            (word >> 12) as u8,
            (word >> 8 & 0xf) as u8,
            (word >> 4 & 0xf) as u8,
            (word & 0xf) as u8,
        );
        let addr = word & 0x0fff;
        let kk = (word & 0x00ff) as u8;

        let instruction = match nibbles {
            (0x0, 0x0, 0xe, 0x0) => ClearScreen,
            (0x0, 0x0, 0xe, 0xe) => Return,
            (0x1, _, _, _) => Jump { addr },
            (0x2, _, _, _) => Call { addr },
            (0x3, x, _, _) => SkipEqImm { x, kk },
            (0x4, x, _, _) => SkipNeImm { x, kk },
            (0x5, x, y, 0x0) => SkipEqReg { x, y },
            (0x6, x, _, _) => LoadImm { x, kk },
            (0x7, x, _, _) => AddImm { x, kk },
            (0x8, x, y, 0x0) => Move { x, y },
            (0x8, x, y, 0x1) => Or { x, y },
            (0x8, x, y, 0x2) => And { x, y },
            (0x8, x, y, 0x3) => Xor { x, y },
            (0x8, x, y, 0x4) => Add { x, y },
            (0x8, x, y, 0x5) => Sub { x, y },
            (0x8, x, y, 0x6) => ShiftRight { x, y },
            (0x8, x, y, 0x7) => SubReverse { x, y },
            (0x8, x, y, 0xe) => ShiftLeft { x, y },
            (0x9, x, y, 0x0) => SkipNeReg { x, y },
            (0xa, _, _, _) => LoadIndex { addr },
            (0xb, _, _, _) => JumpOffset { addr },
            (0xc, x, _, _) => Random { x, kk },
            (0xd, x, y, n) => Draw { x, y, n },
            (0xe, x, 0x9, 0xe) => SkipKeyPressed { x },
            (0xe, x, 0xa, 0x1) => SkipKeyNotPressed { x },
            (0xf, x, 0x0, 0x7) => LoadDelay { x },
            (0xf, x, 0x0, 0xa) => WaitKey { x },
            (0xf, x, 0x1, 0x5) => SetDelay { x },
            (0xf, x, 0x1, 0x8) => SetSound { x },
            (0xf, x, 0x1, 0xe) => AddIndex { x },
            (0xf, x, 0x2, 0x9) => LoadGlyph { x },
            (0xf, x, 0x3, 0x3) => StoreBcd { x },
            (0xf, x, 0x5, 0x5) => StoreRegs { x },
            (0xf, x, 0x6, 0x5) => LoadRegs { x },
            _ => return None,
        };
        Some(instruction)
    }
}

/// Cowgod-style mnemonics
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;

        match *self {
            ClearScreen => write!(f, "CLS"),
            Return => write!(f, "RET"),
            Jump { addr } => write!(f, "JP 0x{:03x}", addr),
            Call { addr } => write!(f, "CALL 0x{:03x}", addr),
            SkipEqImm { x, kk } => write!(f, "SE V{:X}, 0x{:02x}", x, kk),
            SkipNeImm { x, kk } => write!(f, "SNE V{:X}, 0x{:02x}", x, kk),
            SkipEqReg { x, y } => write!(f, "SE V{:X}, V{:X}", x, y),
            LoadImm { x, kk } => write!(f, "LD V{:X}, 0x{:02x}", x, kk),
            AddImm { x, kk } => write!(f, "ADD V{:X}, 0x{:02x}", x, kk),
            Move { x, y } => write!(f, "LD V{:X}, V{:X}", x, y),
            Or { x, y } => write!(f, "OR V{:X}, V{:X}", x, y),
            And { x, y } => write!(f, "AND V{:X}, V{:X}", x, y),
            Xor { x, y } => write!(f, "XOR V{:X}, V{:X}", x, y),
            Add { x, y } => write!(f, "ADD V{:X}, V{:X}", x, y),
            Sub { x, y } => write!(f, "SUB V{:X}, V{:X}", x, y),
            ShiftRight { x, y } => write!(f, "SHR V{:X}, V{:X}", x, y),
            SubReverse { x, y } => write!(f, "SUBN V{:X}, V{:X}", x, y),
            ShiftLeft { x, y } => write!(f, "SHL V{:X}, V{:X}", x, y),
            SkipNeReg { x, y } => write!(f, "SNE V{:X}, V{:X}", x, y),
            LoadIndex { addr } => write!(f, "LD I, 0x{:03x}", addr),
            JumpOffset { addr } => write!(f, "JP V0, 0x{:03x}", addr),
            Random { x, kk } => write!(f, "RND V{:X}, 0x{:02x}", x, kk),
            Draw { x, y, n } => write!(f, "DRW V{:X}, V{:X}, {}", x, y, n),
            SkipKeyPressed { x } => write!(f, "SKP V{:X}", x),
            SkipKeyNotPressed { x } => write!(f, "SKNP V{:X}", x),
            LoadDelay { x } => write!(f, "LD V{:X}, DT", x),
            WaitKey { x } => write!(f, "LD V{:X}, K", x),
            SetDelay { x } => write!(f, "LD DT, V{:X}", x),
            SetSound { x } => write!(f, "LD ST, V{:X}", x),
            AddIndex { x } => write!(f, "ADD I, V{:X}", x),
            LoadGlyph { x } => write!(f, "LD F, V{:X}", x),
            StoreBcd { x } => write!(f, "LD B, V{:X}", x),
            StoreRegs { x } => write!(f, "LD [I], V{:X}", x),
            LoadRegs { x } => write!(f, "LD V{:X}, [I]", x),
        }
    }
}

/// walk a program image two bytes at a time, starting at `base`. A trailing
/// odd byte is ignored.
pub fn disassemble(
    program: &[u8],
    base: u16,
) -> impl Iterator<Item = (u16, u16, Option<Instruction>)> + '_ {
    program.chunks_exact(2).enumerate().map(move |(i, pair)| {
        let word = u16::from_be_bytes([pair[0], pair[1]]);
        let addr = base.wrapping_add(2 * i as u16);
        (addr, word, Instruction::decode(word))
    })
}
