use crate::error::{Error, Result};

// NB. addresses are usize here; the machine widens its 16-bit registers
//     before touching memory so I + offset can't wrap silently

/// Represents addressable memory
pub trait MemoryMap {
    /// write a chunk of bytes into "RAM"
    fn write(&mut self, data: &[u8], addr: usize) -> Result<()> {
        let bytes = self.get_rw_slice(addr, data.len())?;
        bytes.copy_from_slice(data);
        Ok(())
    }

    /// get a big-endian two-byte word (instruction fetch)
    fn get_word(&self, addr: usize) -> Result<u16> {
        let word = self.get_ro_slice(addr, 2)?;
        Ok(u16::from_be_bytes([word[0], word[1]]))
    }

    /// get a r/w slice of the underlying memory
    fn get_rw_slice(&mut self, addr: usize, len: usize) -> Result<&mut [u8]>;

    /// get a r/o slice of the underlying memory
    fn get_ro_slice(&self, addr: usize, len: usize) -> Result<&[u8]>;
}

/// how much RAM we have
pub const CHIP8_RAM_SIZE_BYTES: usize = 4096;

/// where the program is loaded
pub const CHIP8_PROGRAM_ADDR: usize = 0x0200;

/// biggest program image that fits between 0x200 and the top of RAM
pub const CHIP8_MAX_PROGRAM_LEN: usize = CHIP8_RAM_SIZE_BYTES - CHIP8_PROGRAM_ADDR;

/// where the hex digit glyphs live, and how tall each one is
pub const CHIP8_FONT_ADDR: usize = 0x000;
pub const CHIP8_GLYPH_BYTES: usize = 5;

/// Defines the CHIP-8 memory map used by this machine:
///   0x0000-0x004f  hex digit glyphs
///   0x0050-0x01ff  zero (the interpreter lived here on real hardware)
///   0x0200-0x0fff  program
///
/// the stack, registers and display are kept outside of addressable memory
pub struct Chip8MemoryMap {
    bytes: Box<[u8]>,
}

impl MemoryMap for Chip8MemoryMap {
    fn get_rw_slice(&mut self, addr: usize, len: usize) -> Result<&mut [u8]> {
        check_bounds(addr, len)?;
        Ok(&mut self.bytes[addr..addr + len])
    }
    fn get_ro_slice(&self, addr: usize, len: usize) -> Result<&[u8]> {
        check_bounds(addr, len)?;
        Ok(&self.bytes[addr..addr + len])
    }
}

fn check_bounds(addr: usize, len: usize) -> Result<()> {
    match addr.checked_add(len) {
        Some(end) if end <= CHIP8_RAM_SIZE_BYTES => Ok(()),
        _ => Err(Error::AddressOutOfBounds { addr, len }),
    }
}

impl Default for Chip8MemoryMap {
    fn default() -> Self {
        Self::new()
    }
}

impl Chip8MemoryMap {
    /// zeroed memory with the glyph table baked in
    pub fn new() -> Self {
        let mut mm = Chip8MemoryMap {
            bytes: vec![0u8; CHIP8_RAM_SIZE_BYTES].into_boxed_slice(),
        };
        mm.clear();
        mm
    }

    /// zero everything and rewrite the glyph table
    pub fn clear(&mut self) {
        self.bytes.fill(0);
        self.bytes[CHIP8_FONT_ADDR..CHIP8_FONT_ADDR + CHIP8_FONT.len()]
            .copy_from_slice(&CHIP8_FONT);
    }

    /// copy a program image to 0x200. Nothing is written if it doesn't fit.
    pub fn load_program(&mut self, program: &[u8]) -> Result<()> {
        if program.len() > CHIP8_MAX_PROGRAM_LEN {
            return Err(Error::ProgramTooLarge {
                len: program.len(),
                max: CHIP8_MAX_PROGRAM_LEN,
            });
        }
        self.write(program, CHIP8_PROGRAM_ADDR)
    }

    /// the whole address space, for dumps and tests
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}

/// address of the glyph for a hex digit; only the low nibble is meaningful
/// but the multiplication is kept as-is for compatibility
pub fn glyph_addr(digit: u8) -> u16 {
    (CHIP8_FONT_ADDR + digit as usize * CHIP8_GLYPH_BYTES) as u16
}

pub const CHIP8_FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_layout() {
        let m = Chip8MemoryMap::new();
        assert_eq!(m.bytes[..80], CHIP8_FONT);
        assert!(m.bytes[80..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_write_slice_ok() -> Result<()> {
        let mut dst = Chip8MemoryMap::new();
        dst.write(&[0, 1, 2, 3, 4, 5, 6, 7], 0x308)?;
        assert_eq!(
            dst.bytes[0x300..0x310],
            [0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 2, 3, 4, 5, 6, 7]
        );
        Ok(())
    }

    #[test]
    fn test_read_word() -> Result<()> {
        let mut m = Chip8MemoryMap::new();
        m.write(&[0, 1, 2, 3, 4, 5, 6, 7], 0x300)?;
        assert_eq!(m.get_word(0x304)?, 0x0405);
        Ok(())
    }

    #[test]
    fn test_read_past_end_fails() {
        let m = Chip8MemoryMap::new();
        assert!(m.get_word(0xfff).is_err());
        assert!(m.get_ro_slice(0xfff, 1).is_ok());
        assert!(matches!(
            m.get_ro_slice(0x1000, 1),
            Err(Error::AddressOutOfBounds { addr: 0x1000, len: 1 })
        ));
    }

    #[test]
    fn test_write_too_much_fails() {
        let mut dst = Chip8MemoryMap::new();
        assert!(dst.write(&[0; 8], 4089).is_err());
        assert!(dst.bytes[4089..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_program_load_ok() -> Result<()> {
        let mut dst = Chip8MemoryMap::new();
        dst.load_program(&[0x00, 0xe0])?; // clear screen
        assert_eq!(dst.get_ro_slice(0x200, 2)?, &[0x00, 0xe0]);
        Ok(())
    }

    #[test]
    fn test_program_load_max_size() -> Result<()> {
        let mut dst = Chip8MemoryMap::new();
        dst.load_program(&[0xaa; CHIP8_MAX_PROGRAM_LEN])?;
        assert_eq!(dst.get_ro_slice(0xfff, 1)?, &[0xaa]);
        Ok(())
    }

    #[test]
    fn test_program_too_large() {
        let mut dst = Chip8MemoryMap::new();
        let err = dst.load_program(&[0xaa; CHIP8_MAX_PROGRAM_LEN + 1]);
        assert!(matches!(
            err,
            Err(Error::ProgramTooLarge { len: 3585, max: 3584 })
        ));
        assert!(dst.bytes[0x200..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_glyph_addr() {
        assert_eq!(glyph_addr(0x0), 0x000);
        assert_eq!(glyph_addr(0xa), 0x032);
    }
}
