//! # chip8vm
//!
//! A CHIP-8 virtual machine: 4K of memory, sixteen 8-bit registers, a
//! 16-level call stack, delay and sound timers, a 64x32 monochrome
//! framebuffer and a 16-key hex keypad.
//!
//! ## Design
//!
//! * the core is the machine state plus a single-step interpreter; it never
//!   touches a screen, a speaker or a keyboard
//! * one `step()` is one instruction and one timer tick; the caller decides
//!   the cadence (60 Hz by default)
//! * render-needed and sound-needed are one-shot signals for whoever drives
//!   the machine to consume
//! * recoverable oddities (unknown words, stack over/underflow) come back as
//!   `Diagnostic`s, memory accesses outside 4K as `Error`s
//! * display, input and sound are traits, so the terminal versions used by
//!   the binary can be swapped for dummies in tests
//!
//! Model
//!
//! Environment
//!  |-- display, input, sound, config
//!  |-- interpreter
//!  |    |-- instruction set (decode)
//!  |    `-- machine (memory, registers, stack, timers, framebuffer, keys)
//!  `-- main loop
//!       |-- keys = input.scan()
//!       |-- interpreter.step()
//!       |-- if render-needed: display.draw(framebuffer)
//!       |-- if sound-needed: sound.beep()
//!       `-- sleep until the next frame
//!
//! ```
//! use chip8vm::interpreter::Chip8Interpreter;
//!
//! let mut interpreter = Chip8Interpreter::with_seed(0);
//! interpreter.load_bytes(&[0x6a, 0x05]).unwrap(); // LD VA, 5
//! interpreter.step().unwrap();
//! assert_eq!(interpreter.machine().register(0xa), 5);
//! ```
pub mod display;
pub mod environment;
pub mod error;
pub mod input;
pub mod instruction;
pub mod interpreter;
pub mod machine;
pub mod memory;
pub mod sound;

pub use error::{Diagnostic, Error, Result};
