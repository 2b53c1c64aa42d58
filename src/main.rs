use std::error::Error;
use std::fs::File;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use clap::Parser;
use log::info;

use chip8::display::{Display, DummyDisplay, MonoTermDisplay};
use chip8::input::TerminalKeypad;
use chip8::interpreter::Chip8Interpreter;
use chip8::pacer::DEFAULT_CYCLE_HZ;
use chip8::sound::{Mute, SimpleBeep, Sound};
use chip8::Config;

/// Run a CHIP-8 ROM in the terminal. Esc or Ctrl-C quits.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// path to the ROM file to run
    rom: PathBuf,

    /// instructions per second
    #[arg(short, long, default_value_t = DEFAULT_CYCLE_HZ)]
    ips: u32,

    /// seed for the random number instruction
    #[arg(short, long)]
    seed: Option<u64>,

    /// stop after this many instructions
    #[arg(short, long)]
    cycles: Option<u64>,

    /// no beeping
    #[arg(long)]
    mute: bool,

    /// don't draw anything
    #[arg(long)]
    headless: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let config = Config {
        cycle_hz: args.ips,
        rng_seed: args.seed,
        ..Config::default()
    };

    // initialise
    let quit = Arc::new(AtomicBool::new(false));
    let mut display: Box<dyn Display> = if args.headless {
        Box::new(DummyDisplay::new())
    } else {
        Box::new(MonoTermDisplay::new()?)
    };
    let mut input = TerminalKeypad::new(Arc::clone(&quit))?;
    let mut sound: Box<dyn Sound> = if args.mute {
        Box::new(Mute::new())
    } else {
        Box::new(SimpleBeep::new())
    };

    let mut interpreter =
        Chip8Interpreter::with_config(config, display.as_mut(), &mut input, sound.as_mut())?
            .with_quit_flag(quit);

    // load a program
    let mut f = File::open(&args.rom)?;
    interpreter.load_program(&mut f)?;
    // run leaves the tone off; SimpleBeep's drop covers anything earlier
    let cycles = interpreter.run(args.cycles)?;

    // shove some junk on stdout to stop the cli messing up the last frame
    for _ in 0..12 {
        println!();
    }
    info!("ran {} cycles of {}", cycles, args.rom.display());
    Ok(())
}
