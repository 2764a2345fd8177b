use crate::machine::KEY_COUNT;
use crossterm::event::{poll, read, Event, KeyCode, KeyModifiers};
use crossterm::terminal;
use std::collections::HashMap;
use std::io;
use std::time::Duration;

/// map of characters read from the keyboard to the hex key they stand for,
/// using the left-hand side of a qwerty keyboard:
///
///   1 2 3 4      1 2 3 C
///   q w e r  ->  4 5 6 D
///   a s d f      7 8 9 E
///   z x c v      A 0 B F
const CHIP8_CONVENTIONAL_KEYMAP: [(char, u8); 17] = [
    ('x', 0x00),
    ('1', 0x01),
    ('2', 0x02),
    ('3', 0x03),
    ('q', 0x04),
    ('w', 0x05),
    ('e', 0x06),
    ('a', 0x07),
    ('s', 0x08),
    ('d', 0x09),
    ('z', 0x0a),
    ('y', 0x0a), // qwertz
    ('c', 0x0b),
    ('4', 0x0c),
    ('r', 0x0d),
    ('f', 0x0e),
    ('v', 0x0f),
];

/// terminals only report presses (and auto-repeat), never releases, so a key
/// counts as down for this many scans after it was last seen
const CHIP8_KEY_HOLD_SCANS: u8 = 8;

/// one look at the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyScan {
    pub keys: [bool; KEY_COUNT],
    pub quit: bool,
}

/// reads keypresses
pub trait Input {
    /// the current state of all 16 keys, plus whether the user asked to stop
    fn scan(&mut self) -> Result<KeyScan, io::Error>;
}

/// turns a stream of press events into held keys
#[derive(Debug, Clone)]
pub struct KeyLatch {
    remaining: [u8; KEY_COUNT],
    hold_scans: u8,
}

impl KeyLatch {
    pub fn new(hold_scans: u8) -> Self {
        KeyLatch {
            remaining: [0; KEY_COUNT],
            hold_scans,
        }
    }

    pub fn press(&mut self, key: u8) {
        self.remaining[key as usize & 0xf] = self.hold_scans;
    }

    /// which keys are down now; every call ages the presses by one scan
    pub fn scan(&mut self) -> [bool; KEY_COUNT] {
        let mut keys = [false; KEY_COUNT];
        for (held, remaining) in keys.iter_mut().zip(self.remaining.iter_mut()) {
            *held = *remaining > 0;
            *remaining = remaining.saturating_sub(1);
        }
        keys
    }
}

/// implementation of Input on the terminal, using crossterm in raw mode.
/// Esc or ctrl-c asks to quit.
pub struct StdinInput {
    keymap: HashMap<char, u8>,
    latch: KeyLatch,
}

impl StdinInput {
    pub fn new() -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        Ok(StdinInput {
            keymap: HashMap::from(CHIP8_CONVENTIONAL_KEYMAP),
            latch: KeyLatch::new(CHIP8_KEY_HOLD_SCANS),
        })
    }

    /// drain pending events without blocking; true if quit was asked for
    fn read_stdin(&mut self) -> Result<bool, io::Error> {
        let mut quit = false;
        while poll(Duration::from_millis(0))? {
            if let Event::Key(evt) = read()? {
                match evt.code {
                    KeyCode::Esc => quit = true,
                    KeyCode::Char('c') if evt.modifiers.contains(KeyModifiers::CONTROL) => {
                        quit = true
                    }
                    KeyCode::Char(c) => {
                        if let Some(key) = map_key(&self.keymap, c) {
                            self.latch.press(key);
                        }
                    }
                    _ => {}
                }
            }
        }
        Ok(quit)
    }
}

fn map_key(keymap: &HashMap<char, u8>, c: char) -> Option<u8> {
    keymap.get(&c.to_ascii_lowercase()).copied()
}

impl Drop for StdinInput {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

impl Input for StdinInput {
    fn scan(&mut self) -> Result<KeyScan, io::Error> {
        let quit = self.read_stdin()?;
        Ok(KeyScan {
            keys: self.latch.scan(),
            quit,
        })
    }
}

/// dummy Input implementation for testing: the same keys, forever
pub struct DummyInput {
    keys: [bool; KEY_COUNT],
}

impl DummyInput {
    pub fn new(pressed: &[u8]) -> Self {
        let mut keys = [false; KEY_COUNT];
        for &key in pressed {
            keys[key as usize & 0xf] = true;
        }
        DummyInput { keys }
    }
}

impl Input for DummyInput {
    fn scan(&mut self) -> Result<KeyScan, io::Error> {
        Ok(KeyScan {
            keys: self.keys,
            quit: false,
        })
    }
}
