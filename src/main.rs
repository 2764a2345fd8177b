use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Parser;

use chip8vm::display::MonoTermDisplay;
use chip8vm::environment::{Environment, EnvironmentConfig, TraceEntry};
use chip8vm::input::StdinInput;
use chip8vm::instruction::disassemble;
use chip8vm::interpreter::Chip8Interpreter;
use chip8vm::memory::CHIP8_PROGRAM_ADDR;
use chip8vm::sound::{Mute, SimpleBeep, Sound};
use chip8vm::Diagnostic;

/// Run a CHIP-8 program in the terminal.
///
/// Keys: 1234 / qwer / asdf / zxcv map onto the hex keypad. Esc quits.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// program image, loaded at 0x200
    rom: PathBuf,

    /// instructions (and timer ticks) per second
    #[arg(long, default_value_t = 60.0)]
    rate: f64,

    /// seed for the random-byte instruction
    #[arg(long)]
    seed: Option<u64>,

    /// no sound
    #[arg(long)]
    mute: bool,

    /// stop after this many instructions
    #[arg(long)]
    frames: Option<u64>,

    /// print a listing of the program and exit
    #[arg(long)]
    disassemble: bool,

    /// print the last instructions executed when the program stops
    #[arg(long)]
    trace: bool,
}

impl Args {
    fn environment_config(&self) -> EnvironmentConfig {
        EnvironmentConfig {
            rate_hz: self.rate,
            max_frames: self.frames,
            trace: self.trace,
            ..Default::default()
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let program = fs::read(&args.rom)?;

    if args.disassemble {
        for (addr, word, instruction) in disassemble(&program, CHIP8_PROGRAM_ADDR as u16) {
            match instruction {
                Some(instruction) => println!("{:03x}: {:04x}  {}", addr, word, instruction),
                None => println!("{:03x}: {:04x}  .word", addr, word),
            }
        }
        return Ok(());
    }

    let mut interpreter = match args.seed {
        Some(seed) => Chip8Interpreter::with_seed(seed),
        None => Chip8Interpreter::new(),
    };
    interpreter.load_bytes(&program)?;

    // the terminal is only restored once the collaborators are dropped, so
    // anything worth printing is carried out of this block
    let (result, dropped, diagnostics, trace) = {
        let mut input = StdinInput::new()?;
        let mut display = MonoTermDisplay::chip8()?;
        let mut beeper = SimpleBeep::new();
        let mut mute = Mute::new();
        let sound: &mut dyn Sound = if args.mute { &mut mute } else { &mut beeper };

        let mut env = Environment::new(
            interpreter,
            &mut display,
            &mut input,
            sound,
            args.environment_config(),
        );
        let result = env.main_loop();
        let trace: Vec<TraceEntry> = env.trace().copied().collect();
        (result, env.dropped_diagnostics(), env.take_diagnostics(), trace)
    };

    report(dropped, &diagnostics, &trace);
    let frames = result?;
    eprintln!("stopped after {} instructions", frames);
    Ok(())
}

fn report(dropped: u64, diagnostics: &[Diagnostic], trace: &[TraceEntry]) {
    if dropped > 0 {
        eprintln!("Warning: {} earlier warnings not shown", dropped);
    }
    for d in diagnostics {
        eprintln!("Warning: {}", d);
    }
    if !trace.is_empty() {
        eprintln!("last {} instructions:", trace.len());
        for entry in trace {
            eprintln!("  {}", entry);
        }
    }
}
