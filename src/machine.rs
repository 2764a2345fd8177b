//! Complete architectural state of the machine: memory, registers, stack,
//! timers, framebuffer, keys and the two output signals.
//!
//! Nothing in here decodes or executes instructions; see `interpreter`.
use crate::error::{Error, Result};
use crate::memory::{Chip8MemoryMap, MemoryMap, CHIP8_MAX_PROGRAM_LEN, CHIP8_PROGRAM_ADDR};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;
pub const FRAMEBUFFER_LEN: usize = DISPLAY_WIDTH * DISPLAY_HEIGHT;

pub const REGISTER_COUNT: usize = 16;
pub const KEY_COUNT: usize = 16;
pub const STACK_DEPTH: usize = 16;

/// VF doubles as the carry/borrow/collision flag
pub const FLAG_REGISTER: u8 = 0xf;

pub struct Machine {
    pub(crate) memory: Chip8MemoryMap,
    pub(crate) registers: [u8; REGISTER_COUNT],
    pub(crate) index: u16,
    pub(crate) program_counter: u16,
    stack: [u16; STACK_DEPTH],
    // number of live entries; 0 is the empty stack
    stack_pointer: usize,
    pub(crate) delay_timer: u8,
    pub(crate) sound_timer: u8,
    pub(crate) framebuffer: [u8; FRAMEBUFFER_LEN],
    pub(crate) keys: [bool; KEY_COUNT],
    pub(crate) render_needed: bool,
    pub(crate) sound_needed: bool,
    rng: StdRng,
    seed: Option<u64>,
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

impl Machine {
    /// a freshly reset machine with an entropy-seeded random source
    pub fn new() -> Self {
        Self::build(None)
    }

    /// a freshly reset machine whose random source replays the same bytes
    /// after every reset
    pub fn with_seed(seed: u64) -> Self {
        Self::build(Some(seed))
    }

    fn build(seed: Option<u64>) -> Self {
        Machine {
            memory: Chip8MemoryMap::new(),
            registers: [0; REGISTER_COUNT],
            index: 0,
            program_counter: CHIP8_PROGRAM_ADDR as u16,
            stack: [0; STACK_DEPTH],
            stack_pointer: 0,
            delay_timer: 0,
            sound_timer: 0,
            framebuffer: [0; FRAMEBUFFER_LEN],
            keys: [false; KEY_COUNT],
            render_needed: true,
            sound_needed: false,
            rng: seeded_rng(seed),
            seed,
        }
    }

    /// back to power-on state: zeroed everything, glyphs at 0x000, PC at
    /// 0x200. The first frame after a reset always wants drawing.
    pub fn reset(&mut self) {
        self.memory.clear();
        self.registers = [0; REGISTER_COUNT];
        self.index = 0;
        self.program_counter = CHIP8_PROGRAM_ADDR as u16;
        self.stack = [0; STACK_DEPTH];
        self.stack_pointer = 0;
        self.delay_timer = 0;
        self.sound_timer = 0;
        self.framebuffer = [0; FRAMEBUFFER_LEN];
        self.keys = [false; KEY_COUNT];
        self.render_needed = true;
        self.sound_needed = false;
        self.rng = seeded_rng(self.seed);
    }

    /// reset, then copy the program to 0x200. An oversized image is
    /// rejected before anything is touched.
    pub fn load_program(&mut self, program: &[u8]) -> Result<()> {
        if program.len() > CHIP8_MAX_PROGRAM_LEN {
            return Err(Error::ProgramTooLarge {
                len: program.len(),
                max: CHIP8_MAX_PROGRAM_LEN,
            });
        }
        self.reset();
        self.memory.load_program(program)
    }

    /// the instruction word the next step would execute
    pub fn fetch(&self) -> Result<u16> {
        self.memory.get_word(self.program_counter as usize)
    }

    pub(crate) fn push_return(&mut self, addr: u16) -> bool {
        if self.stack_pointer == STACK_DEPTH {
            return false;
        }
        self.stack[self.stack_pointer] = addr;
        self.stack_pointer += 1;
        true
    }

    pub(crate) fn pop_return(&mut self) -> Option<u16> {
        if self.stack_pointer == 0 {
            return None;
        }
        self.stack_pointer -= 1;
        Some(self.stack[self.stack_pointer])
    }

    pub(crate) fn random_byte(&mut self) -> u8 {
        self.rng.gen()
    }

    /// one timer tick; the sound timer running out raises sound-needed
    pub(crate) fn tick_timers(&mut self) {
        if self.delay_timer > 0 {
            self.delay_timer -= 1;
        }
        if self.sound_timer > 0 {
            if self.sound_timer == 1 {
                self.sound_needed = true;
            }
            self.sound_timer -= 1;
        }
    }

    pub fn memory(&self) -> &[u8] {
        self.memory.as_slice()
    }

    pub fn write_memory(&mut self, addr: u16, data: &[u8]) -> Result<()> {
        self.memory.write(data, addr as usize)
    }

    pub fn registers(&self) -> &[u8; REGISTER_COUNT] {
        &self.registers
    }

    pub fn register(&self, r: u8) -> u8 {
        self.registers[r as usize & 0xf]
    }

    pub fn set_register(&mut self, r: u8, value: u8) {
        self.registers[r as usize & 0xf] = value;
    }

    pub fn index(&self) -> u16 {
        self.index
    }

    pub fn set_index(&mut self, value: u16) {
        self.index = value;
    }

    pub fn program_counter(&self) -> u16 {
        self.program_counter
    }

    pub fn set_program_counter(&mut self, value: u16) {
        self.program_counter = value;
    }

    pub fn stack_depth(&self) -> usize {
        self.stack_pointer
    }

    /// live return addresses, oldest first
    pub fn stack(&self) -> &[u16] {
        &self.stack[..self.stack_pointer]
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    pub fn set_delay_timer(&mut self, value: u8) {
        self.delay_timer = value;
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    pub fn set_sound_timer(&mut self, value: u8) {
        self.sound_timer = value;
    }

    /// row-major, one byte per pixel, nonzero is lit
    pub fn framebuffer(&self) -> &[u8; FRAMEBUFFER_LEN] {
        &self.framebuffer
    }

    /// whether (x, y) is lit; `None` off the 64x32 display
    pub fn pixel(&self, x: usize, y: usize) -> Option<bool> {
        if x >= DISPLAY_WIDTH || y >= DISPLAY_HEIGHT {
            return None;
        }
        Some(self.framebuffer[y * DISPLAY_WIDTH + x] != 0)
    }

    pub fn keys(&self) -> &[bool; KEY_COUNT] {
        &self.keys
    }

    pub fn set_keys(&mut self, keys: [bool; KEY_COUNT]) {
        self.keys = keys;
    }

    pub fn set_key(&mut self, key: u8, pressed: bool) {
        self.keys[key as usize & 0xf] = pressed;
    }

    pub fn render_needed(&self) -> bool {
        self.render_needed
    }

    /// read and clear render-needed
    pub fn take_render_needed(&mut self) -> bool {
        std::mem::take(&mut self.render_needed)
    }

    pub fn sound_needed(&self) -> bool {
        self.sound_needed
    }

    /// read and clear sound-needed
    pub fn take_sound_needed(&mut self) -> bool {
        std::mem::take(&mut self.sound_needed)
    }
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::CHIP8_FONT;

    #[test]
    fn test_power_on_state() {
        let m = Machine::new();
        assert_eq!(m.memory()[..80], CHIP8_FONT);
        assert!(m.memory()[80..].iter().all(|&b| b == 0));
        assert_eq!(m.program_counter(), 0x200);
        assert_eq!(m.stack_depth(), 0);
        assert!(m.render_needed());
        assert!(!m.sound_needed());
    }

    #[test]
    fn test_reset_clears_everything() -> Result<()> {
        let mut m = Machine::new();
        m.write_memory(0x300, &[1, 2, 3])?;
        m.set_register(3, 9);
        m.set_index(0x123);
        m.set_delay_timer(4);
        m.set_sound_timer(5);
        m.set_key(0xa, true);
        m.framebuffer[7] = 1;
        m.push_return(0x202);
        m.take_render_needed();

        m.reset();
        assert_eq!(m.memory()[..80], CHIP8_FONT);
        assert!(m.memory()[80..].iter().all(|&b| b == 0));
        assert_eq!(m.registers(), &[0; 16]);
        assert_eq!(m.index(), 0);
        assert_eq!(m.delay_timer(), 0);
        assert_eq!(m.sound_timer(), 0);
        assert_eq!(m.keys(), &[false; 16]);
        assert!(m.framebuffer().iter().all(|&p| p == 0));
        assert_eq!(m.stack_depth(), 0);
        assert!(m.render_needed());
        Ok(())
    }

    #[test]
    fn test_load_program_resets() -> Result<()> {
        let mut m = Machine::new();
        m.write_memory(0x800, &[0xee])?;
        m.set_program_counter(0x400);
        m.load_program(&[0x6a, 0x05])?;
        assert_eq!(&m.memory()[0x200..0x202], &[0x6a, 0x05]);
        assert_eq!(m.memory()[0x800], 0);
        assert_eq!(m.program_counter(), 0x200);
        Ok(())
    }

    #[test]
    fn test_load_too_large_leaves_state_alone() -> Result<()> {
        let mut m = Machine::new();
        m.write_memory(0x300, &[0xab])?;
        m.set_register(1, 7);
        let err = m.load_program(&vec![0u8; 3585]);
        assert!(matches!(err, Err(Error::ProgramTooLarge { .. })));
        assert_eq!(m.memory()[0x300], 0xab);
        assert_eq!(m.register(1), 7);
        Ok(())
    }

    #[test]
    fn test_stack_bounds() {
        let mut m = Machine::new();
        assert_eq!(m.pop_return(), None);
        for i in 0..STACK_DEPTH as u16 {
            assert!(m.push_return(0x200 + 2 * i));
        }
        assert!(!m.push_return(0x400));
        assert_eq!(m.stack_depth(), STACK_DEPTH);
        assert_eq!(m.pop_return(), Some(0x21e));
        assert_eq!(m.stack().len(), STACK_DEPTH - 1);
    }

    #[test]
    fn test_timers_tick_down_and_stop() {
        let mut m = Machine::new();
        m.set_delay_timer(2);
        m.set_sound_timer(2);
        m.tick_timers();
        assert_eq!((m.delay_timer(), m.sound_timer()), (1, 1));
        assert!(!m.sound_needed());
        m.tick_timers();
        assert_eq!((m.delay_timer(), m.sound_timer()), (0, 0));
        assert!(m.take_sound_needed());
        m.tick_timers();
        assert_eq!((m.delay_timer(), m.sound_timer()), (0, 0));
        assert!(!m.sound_needed());
    }

    #[test]
    fn test_seeded_random_repeats_after_reset() {
        let mut m = Machine::with_seed(0xc8);
        let first: Vec<u8> = (0..8).map(|_| m.random_byte()).collect();
        m.reset();
        let again: Vec<u8> = (0..8).map(|_| m.random_byte()).collect();
        assert_eq!(first, again);
    }

    #[test]
    fn test_pixel_off_display() {
        let mut m = Machine::new();
        m.framebuffer[FRAMEBUFFER_LEN - 1] = 1;
        assert_eq!(m.pixel(63, 31), Some(true));
        assert_eq!(m.pixel(62, 31), Some(false));
        assert_eq!(m.pixel(64, 0), None);
        assert_eq!(m.pixel(0, 32), None);
    }

    #[test]
    fn test_fetch_bounds() {
        let mut m = Machine::new();
        m.set_program_counter(0xffe);
        assert!(m.fetch().is_ok());
        m.set_program_counter(0xfff);
        assert!(m.fetch().is_err());
    }
}
