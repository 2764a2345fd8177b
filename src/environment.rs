//! The environment owns an interpreter, borrows a display, an input and a
//! sound device, and runs the main loop:
//!
//!   scan input -> copy keys into the machine -> step -> draw if the
//!   framebuffer changed -> beep if the sound timer ran out -> sleep until
//!   the next frame
//!
//! One instruction runs per frame, so the timers count down at the frame
//! rate.
use crate::display::Display;
use crate::error::{Diagnostic, Error, Result};
use crate::input::Input;
use crate::instruction::Instruction;
use crate::interpreter::Chip8Interpreter;
use crate::sound::Sound;
use spin_sleep::LoopHelper;
use std::collections::VecDeque;
use std::fmt;

/// how many executed instructions `--trace` keeps
const TRACE_LEN: usize = 64;

/// how many diagnostics are kept; older ones are counted and dropped
const DIAGNOSTIC_LEN: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentConfig {
    /// steps (and timer ticks) per second
    pub rate_hz: f64,
    /// how long a beep lasts, in frames
    pub tone_frames: u32,
    /// stop after this many frames
    pub max_frames: Option<u64>,
    /// remember the last few executed instructions
    pub trace: bool,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        EnvironmentConfig {
            rate_hz: 60.0,
            tone_frames: 6,
            max_frames: None,
            trace: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    Running,
    Quit,
}

/// one executed instruction, as seen just before it ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceEntry {
    pub pc: u16,
    pub word: u16,
}

impl fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03x}: {:04x}", self.pc, self.word)?;
        match Instruction::decode(self.word) {
            Some(instruction) => write!(f, "  {}", instruction),
            None => write!(f, "  ???"),
        }
    }
}

pub struct Environment<'a> {
    interpreter: Chip8Interpreter,
    display: &'a mut dyn Display,
    input: &'a mut dyn Input,
    sound: &'a mut dyn Sound,
    config: EnvironmentConfig,
    frames: u64,
    tone_remaining: u32,
    diagnostics: VecDeque<Diagnostic>,
    dropped_diagnostics: u64,
    trace: VecDeque<TraceEntry>,
}

impl<'a> Environment<'a> {
    pub fn new(
        interpreter: Chip8Interpreter,
        display: &'a mut dyn Display,
        input: &'a mut dyn Input,
        sound: &'a mut dyn Sound,
        config: EnvironmentConfig,
    ) -> Self {
        Environment {
            interpreter,
            display,
            input,
            sound,
            config,
            frames: 0,
            tone_remaining: 0,
            diagnostics: VecDeque::with_capacity(DIAGNOSTIC_LEN),
            dropped_diagnostics: 0,
            trace: VecDeque::with_capacity(TRACE_LEN),
        }
    }

    pub fn interpreter(&self) -> &Chip8Interpreter {
        &self.interpreter
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// the most recent diagnostics, oldest first
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// how many diagnostics fell off the front since the last take
    pub fn dropped_diagnostics(&self) -> u64 {
        self.dropped_diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        self.dropped_diagnostics = 0;
        self.diagnostics.drain(..).collect()
    }

    /// the last executed instructions, oldest first
    pub fn trace(&self) -> impl Iterator<Item = &TraceEntry> {
        self.trace.iter()
    }

    /// one frame: input, one step, then whatever output the step asked for
    pub fn run_frame(&mut self) -> Result<FrameStatus> {
        let scan = self.input.scan()?;
        if scan.quit {
            return Ok(FrameStatus::Quit);
        }
        self.interpreter.machine_mut().set_keys(scan.keys);

        if self.config.trace {
            self.record_trace();
        }
        if let Some(diagnostic) = self.interpreter.step()? {
            self.record_diagnostic(diagnostic);
        }

        let machine = self.interpreter.machine_mut();
        if machine.take_render_needed() {
            self.display.draw(machine.framebuffer())?;
        }
        if machine.take_sound_needed() {
            self.sound.beep().map_err(sound_error)?;
            self.tone_remaining = self.config.tone_frames;
        } else if self.tone_remaining > 0 {
            self.tone_remaining -= 1;
            if self.tone_remaining == 0 {
                self.sound.stop().map_err(sound_error)?;
            }
        }

        self.frames += 1;
        match self.config.max_frames {
            Some(max) if self.frames >= max => Ok(FrameStatus::Quit),
            _ => Ok(FrameStatus::Running),
        }
    }

    /// run frames at the configured rate until quit, the frame limit, or an
    /// error. Returns the number of frames run.
    pub fn main_loop(&mut self) -> Result<u64> {
        let mut loop_helper = LoopHelper::builder()
            .build_with_target_rate(self.config.rate_hz);
        let result = loop {
            loop_helper.loop_start();
            match self.run_frame() {
                Ok(FrameStatus::Running) => {}
                Ok(FrameStatus::Quit) => break Ok(self.frames),
                Err(e) => break Err(e),
            }
            loop_helper.loop_sleep();
        };
        self.sound.stop().map_err(sound_error)?;
        result
    }

    fn record_diagnostic(&mut self, diagnostic: Diagnostic) {
        if self.diagnostics.len() == DIAGNOSTIC_LEN {
            self.diagnostics.pop_front();
            self.dropped_diagnostics += 1;
        }
        self.diagnostics.push_back(diagnostic);
    }

    fn record_trace(&mut self) {
        let machine = self.interpreter.machine();
        if let Ok(word) = machine.fetch() {
            if self.trace.len() == TRACE_LEN {
                self.trace.pop_front();
            }
            self.trace.push_back(TraceEntry {
                pc: machine.program_counter(),
                word,
            });
        }
    }
}

fn sound_error(e: Box<dyn std::error::Error>) -> Error {
    Error::Sound(e.to_string())
}
