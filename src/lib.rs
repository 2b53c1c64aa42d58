//! # chip8
//!
//! A CHIP-8 interpreter core with pluggable host devices.
//!
//! ## Design
//!
//! * fixed instruction rate (500Hz by default), paced per cycle rather than
//!   sleeping before each instruction, so slow instructions don't drift
//! * delay and sound timers tick at 60Hz on their own schedule, including
//!   while FX0A is waiting for a key
//! * display, keypad and tone are traits, so the interpreter doesn't need
//!   to know how the screen, keyboard or speaker work; the terminal ones use
//!   tui/crossterm and beep
//! * every failure is fatal for the run and comes back as a `Chip8Error`
//!
//! Model
//!
//! ```text
//! host (main.rs)
//!  |-- display, keypad, sound, config
//!  |-- interpreter(display, keypad, sound, config)
//!  |    |-- memory + font, registers, stack
//!  |    |-- framebuffer
//!  |    |-- timers (delay, sound(sound device), 60Hz ticker)
//!  |    `-- cycle pacer
//!  `-- interpreter.run()
//!       |-- mark cycle start
//!       |-- fetch / decode / execute
//!       |-- service timers
//!       `-- wait out the cycle
//! ```
pub mod config;
pub mod display;
pub mod error;
pub mod font;
pub mod framebuffer;
pub mod input;
pub mod interpreter;
pub mod memory;
pub mod opcode;
pub mod pacer;
pub mod sound;
pub mod stack;
pub mod timer;

pub use config::Config;
pub use error::{Chip8Error, Result};
pub use interpreter::Chip8Interpreter;
