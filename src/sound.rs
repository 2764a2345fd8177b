use beep::beep;
use std::error::Error;
use std::io::{self, Write};

pub trait Sound {
    fn beep(&mut self) -> Result<(), Box<dyn Error>>;
    fn stop(&mut self) -> Result<(), Box<dyn Error>>;
}

const SIMPLEBEEP_PITCH: u16 = 2093; // C

/// tone through the PC speaker. If the speaker can't be opened (usually a
/// permissions problem) it falls back to ringing the terminal bell.
pub struct SimpleBeep {
    is_beeping: bool,
    use_bell: bool,
}

impl SimpleBeep {
    pub fn new() -> Self {
        SimpleBeep {
            is_beeping: false,
            use_bell: false,
        }
    }

    fn bell() -> Result<(), Box<dyn Error>> {
        let mut stdout = io::stdout();
        stdout.write_all(b"\x07")?;
        stdout.flush()?;
        Ok(())
    }
}

impl Default for SimpleBeep {
    fn default() -> Self {
        Self::new()
    }
}

impl Sound for SimpleBeep {
    fn beep(&mut self) -> Result<(), Box<dyn Error>> {
        if !self.use_bell && beep(SIMPLEBEEP_PITCH).is_err() {
            self.use_bell = true;
        }
        if self.use_bell {
            return Self::bell();
        }
        self.is_beeping = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Box<dyn Error>> {
        if self.is_beeping {
            beep(0)?;
            self.is_beeping = false;
        }
        Ok(())
    }
}

/// silence; counts the beeps it was asked for
#[derive(Default)]
pub struct Mute {
    pub beeps: usize,
    pub sounding: bool,
}

impl Mute {
    pub fn new() -> Self {
        Mute::default()
    }
}

impl Sound for Mute {
    fn beep(&mut self) -> Result<(), Box<dyn Error>> {
        self.beeps += 1;
        self.sounding = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Box<dyn Error>> {
        self.sounding = false;
        Ok(())
    }
}
