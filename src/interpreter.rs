//! # interpreter
//!
//! One call to `step()` is one machine cycle:
//!
//!  1. fetch the big-endian word at PC
//!  2. decode it into an `Instruction`
//!  3. execute it against the machine
//!  4. move PC on (by 2, by 4 for a taken skip, not at all for jumps and an
//!     unsatisfied key wait)
//!  5. tick both timers
//!
//! The interpreter keeps nothing between steps. A key wait is just PC not
//! moving until a key is down, so the caller gets control back every cycle
//! and can poll input, draw or stop as it likes.
//!
//! Instructions that set VF read all their operands first, write the
//! destination, and write VF last.
use crate::error::{Diagnostic, Result};
use crate::instruction::Instruction;
use crate::machine::{Machine, DISPLAY_WIDTH, FLAG_REGISTER, FRAMEBUFFER_LEN};
use crate::memory::{glyph_addr, MemoryMap};
use std::io;

/// what happens to PC after an instruction
enum Flow {
    Next,
    Skip,
    Jump(u16),
    Hold,
    Dropped(Diagnostic),
}

impl Flow {
    fn skip_if(condition: bool) -> Flow {
        if condition {
            Flow::Skip
        } else {
            Flow::Next
        }
    }
}

pub struct Chip8Interpreter {
    machine: Machine,
}

impl Default for Chip8Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Chip8Interpreter {
    pub fn new() -> Self {
        Chip8Interpreter {
            machine: Machine::new(),
        }
    }

    /// deterministic random-byte instruction, for tests and replays
    pub fn with_seed(seed: u64) -> Self {
        Chip8Interpreter {
            machine: Machine::with_seed(seed),
        }
    }

    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    pub fn machine_mut(&mut self) -> &mut Machine {
        &mut self.machine
    }

    pub fn reset(&mut self) {
        self.machine.reset()
    }

    /// load a chip8 program image from anything readable
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<()> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        self.load_bytes(&buf)
    }

    pub fn load_bytes(&mut self, program: &[u8]) -> Result<()> {
        self.machine.load_program(program)
    }

    /// run one fetch/decode/execute/tick cycle.
    ///
    /// `Err` means a memory access fell outside the address space; the
    /// machine is left as it was before the step. `Ok(Some(_))` reports a
    /// recoverable problem that was handled as a no-op.
    pub fn step(&mut self) -> Result<Option<Diagnostic>> {
        let pc = self.machine.program_counter;
        let word = self.machine.fetch()?;

        let flow = match Instruction::decode(word) {
            Some(instruction) => self.execute(instruction, pc)?,
            None => Flow::Dropped(Diagnostic::UnknownInstruction { word, pc }),
        };

        let mut diagnostic = None;
        self.machine.program_counter = match flow {
            Flow::Next => pc.wrapping_add(2),
            Flow::Skip => pc.wrapping_add(4),
            Flow::Jump(addr) => addr,
            Flow::Hold => pc,
            Flow::Dropped(d) => {
                diagnostic = Some(d);
                pc.wrapping_add(2)
            }
        };

        self.machine.tick_timers();
        Ok(diagnostic)
    }

    fn v(&self, r: u8) -> u8 {
        self.machine.registers[r as usize]
    }

    fn set_v(&mut self, r: u8, value: u8) {
        self.machine.registers[r as usize] = value;
    }

    /// write a result register, then the flag
    fn set_v_with_flag(&mut self, r: u8, value: u8, flag: bool) {
        self.set_v(r, value);
        self.set_v(FLAG_REGISTER, flag as u8);
    }

    fn execute(&mut self, instruction: Instruction, pc: u16) -> Result<Flow> {
        use Instruction::*;

        let flow = match instruction {
            ClearScreen => {
                self.machine.framebuffer.fill(0);
                self.machine.render_needed = true;
                Flow::Next
            }
            Return => match self.machine.pop_return() {
                Some(addr) => Flow::Jump(addr.wrapping_add(2)),
                None => Flow::Dropped(Diagnostic::StackUnderflow { pc }),
            },
            Jump { addr } => Flow::Jump(addr),
            Call { addr } => {
                if self.machine.push_return(pc) {
                    Flow::Jump(addr)
                } else {
                    Flow::Dropped(Diagnostic::StackOverflow { pc })
                }
            }
            SkipEqImm { x, kk } => Flow::skip_if(self.v(x) == kk),
            SkipNeImm { x, kk } => Flow::skip_if(self.v(x) != kk),
            SkipEqReg { x, y } => Flow::skip_if(self.v(x) == self.v(y)),
            SkipNeReg { x, y } => Flow::skip_if(self.v(x) != self.v(y)),
            LoadImm { x, kk } => {
                self.set_v(x, kk);
                Flow::Next
            }
            AddImm { x, kk } => {
                self.set_v(x, self.v(x).wrapping_add(kk));
                Flow::Next
            }
            Move { x, y } => {
                self.set_v(x, self.v(y));
                Flow::Next
            }
            Or { x, y } => {
                self.set_v(x, self.v(x) | self.v(y));
                Flow::Next
            }
            And { x, y } => {
                self.set_v(x, self.v(x) & self.v(y));
                Flow::Next
            }
            Xor { x, y } => {
                self.set_v(x, self.v(x) ^ self.v(y));
                Flow::Next
            }
            Add { x, y } => {
                let (sum, carry) = self.v(x).overflowing_add(self.v(y));
                self.set_v_with_flag(x, sum, carry);
                Flow::Next
            }
            Sub { x, y } => {
                let (vx, vy) = (self.v(x), self.v(y));
                self.set_v_with_flag(x, vx.wrapping_sub(vy), vx >= vy);
                Flow::Next
            }
            SubReverse { x, y } => {
                let (vx, vy) = (self.v(x), self.v(y));
                self.set_v_with_flag(x, vy.wrapping_sub(vx), vy >= vx);
                Flow::Next
            }
            // shifts work on Vx alone; y is decoded but unused
            ShiftRight { x, .. } => {
                let vx = self.v(x);
                self.set_v_with_flag(x, vx >> 1, vx & 0x01 != 0);
                Flow::Next
            }
            ShiftLeft { x, .. } => {
                let vx = self.v(x);
                self.set_v_with_flag(x, vx << 1, vx & 0x80 != 0);
                Flow::Next
            }
            LoadIndex { addr } => {
                self.machine.index = addr;
                Flow::Next
            }
            JumpOffset { addr } => Flow::Jump(addr.wrapping_add(self.v(0) as u16)),
            Random { x, kk } => {
                let byte = self.machine.random_byte();
                self.set_v(x, byte & kk);
                Flow::Next
            }
            Draw { x, y, n } => {
                let (vx, vy) = (self.v(x) as usize, self.v(y) as usize);
                let m = &mut self.machine;
                let rows = m.memory.get_ro_slice(m.index as usize, n as usize)?;
                let collided = draw_sprite(&mut m.framebuffer, vx, vy, rows);
                m.registers[FLAG_REGISTER as usize] = collided as u8;
                m.render_needed = true;
                Flow::Next
            }
            SkipKeyPressed { x } => Flow::skip_if(self.key(x)),
            SkipKeyNotPressed { x } => Flow::skip_if(!self.key(x)),
            LoadDelay { x } => {
                self.set_v(x, self.machine.delay_timer);
                Flow::Next
            }
            // the highest pressed key wins when several are down
            WaitKey { x } => match self.machine.keys.iter().rposition(|&k| k) {
                Some(key) => {
                    self.set_v(x, key as u8);
                    Flow::Next
                }
                None => Flow::Hold,
            },
            SetDelay { x } => {
                self.machine.delay_timer = self.v(x);
                Flow::Next
            }
            SetSound { x } => {
                self.machine.sound_timer = self.v(x);
                Flow::Next
            }
            AddIndex { x } => {
                let sum = self.machine.index as u32 + self.v(x) as u32;
                self.machine.index = sum as u16;
                self.set_v(FLAG_REGISTER, (sum > 0xfff) as u8);
                Flow::Next
            }
            LoadGlyph { x } => {
                self.machine.index = glyph_addr(self.v(x));
                Flow::Next
            }
            StoreBcd { x } => {
                let vx = self.v(x);
                let digits = [vx / 100, vx / 10 % 10, vx % 10];
                let addr = self.machine.index as usize;
                self.machine.memory.write(&digits, addr)?;
                Flow::Next
            }
            StoreRegs { x } => {
                let m = &mut self.machine;
                m.memory
                    .write(&m.registers[..=x as usize], m.index as usize)?;
                Flow::Next
            }
            LoadRegs { x } => {
                let m = &mut self.machine;
                let src = m.memory.get_ro_slice(m.index as usize, x as usize + 1)?;
                m.registers[..=x as usize].copy_from_slice(src);
                Flow::Next
            }
        };
        Ok(flow)
    }

    /// key state named by Vx; only the low nibble selects a key
    fn key(&self, x: u8) -> bool {
        self.machine.keys[(self.v(x) & 0xf) as usize]
    }
}

/// XOR a sprite into the framebuffer with its top-left corner at (x, y).
///
/// Coordinates are not wrapped: each pixel lands at the flat index
/// `x + col + (y + row) * 64`, and anything at or past the end of the
/// framebuffer is dropped. A pixel running off the right edge therefore
/// shows up at the left of the next row down. Returns true if any lit
/// pixel was switched off.
pub fn draw_sprite(
    framebuffer: &mut [u8; FRAMEBUFFER_LEN],
    x: usize,
    y: usize,
    rows: &[u8],
) -> bool {
    let mut collided = false;
    for (row, bits) in rows.iter().enumerate() {
        for col in 0..8 {
            if bits & (0x80 >> col) == 0 {
                continue;
            }
            let target = x + col + (y + row) * DISPLAY_WIDTH;
            if let Some(pixel) = framebuffer.get_mut(target) {
                if *pixel != 0 {
                    collided = true;
                }
                *pixel ^= 1;
            }
        }
    }
    collided
}
