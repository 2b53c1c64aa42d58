/// # interpreter
///
/// Machine state, as seen by a CHIP-8 program:
///  - 4K of byte-addressed memory; 0x000-0x1ff reserved (font), programs from 0x200
///  - V0-VF, sixteen 8-bit registers. VF doubles as the carry / borrow /
///    shift-out / collision flag, so programs can't expect it to survive
///    arithmetic or drawing
///  - I, a 16-bit address register
///  - PC, advanced by 2 on every fetch
///  - a 16-level return stack
///  - delay and sound timers, counting down at 60Hz
///
/// Each cycle fetches the big-endian word at PC, decodes it and runs it,
/// then the run loop services the timers and sleeps out the rest of the
/// cycle. FX0A is the only instruction that can hold the loop up.
use crate::config::Config;
use crate::display::Display;
use crate::error::{Chip8Error, Result};
use crate::font::{FontTable, FONT_ADDR};
use crate::framebuffer::Framebuffer;
use crate::input::Keypad;
use crate::memory::{Chip8MemoryMap, MemoryMap};
use crate::opcode::{Opcode, CLEAR_SCREEN, RETURN};
use crate::pacer::CyclePacer;
use crate::sound::Sound;
use crate::stack::Stack;
use crate::timer::Timers;
use log::{debug, error, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// VF, the flag register
const VF: usize = 0xf;

pub struct Chip8Interpreter<'a> {
    memory: Chip8MemoryMap,
    font: FontTable,
    v: [u8; 16],
    i: u16,
    program_counter: u16,
    stack: Stack,
    framebuffer: Framebuffer,
    timers: Timers<&'a mut dyn Sound>,
    display: &'a mut dyn Display,
    input: &'a mut dyn Keypad,
    pacer: CyclePacer,
    rng: StdRng,
    quit: Arc<AtomicBool>,
    config: Config,
}

impl<'a> Chip8Interpreter<'a> {
    pub fn new(
        display: &'a mut dyn Display,
        input: &'a mut dyn Keypad,
        sound: &'a mut dyn Sound,
    ) -> Result<Chip8Interpreter<'a>> {
        Self::with_config(Config::default(), display, input, sound)
    }

    pub fn with_config(
        config: Config,
        display: &'a mut dyn Display,
        input: &'a mut dyn Keypad,
        sound: &'a mut dyn Sound,
    ) -> Result<Chip8Interpreter<'a>> {
        let mut memory = Chip8MemoryMap::new();
        let font = FontTable::load(&mut memory, FONT_ADDR)?;
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Chip8Interpreter {
            memory,
            font,
            v: [0; 16],
            i: 0,
            program_counter: config.load_addr,
            stack: Stack::new(),
            framebuffer: Framebuffer::new(),
            timers: Timers::new(sound, config.timer_hz),
            display,
            input,
            pacer: CyclePacer::new(),
            rng,
            quit: Arc::new(AtomicBool::new(false)),
            config,
        })
    }

    /// share a quit flag with the host; raising it stops `run` before the
    /// next cycle
    pub fn with_quit_flag(mut self, quit: Arc<AtomicBool>) -> Self {
        self.quit = quit;
        self
    }

    pub fn quit_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.quit)
    }

    /// copy a ROM image to the configured load address and start there
    pub fn load_rom(&mut self, data: &[u8]) -> Result<()> {
        self.load_rom_at(data, self.config.load_addr)
    }

    pub fn load_rom_at(&mut self, data: &[u8], start: u16) -> Result<()> {
        self.memory.load_rom(data, start)?;
        self.program_counter = start;
        debug!("loaded {} byte ROM at {:#05x}", data.len(), start);
        Ok(())
    }

    /// load a chip8 program from a reader
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<()> {
        let start = self.config.load_addr;
        let len = self.memory.load_program(reader, start)?;
        self.program_counter = start;
        debug!("loaded {} byte ROM at {:#05x}", len, start);
        Ok(())
    }

    /// Run until the quit flag goes up, `limit` cycles have run, or an
    /// instruction fails. Returns the number of cycles executed. The tone
    /// is off when this returns, however it returns.
    pub fn run(&mut self, limit: Option<u64>) -> Result<u64> {
        debug!(
            "running from {:#05x} at {}Hz",
            self.program_counter, self.config.cycle_hz
        );
        let outcome = self.run_cycles(limit);
        let silenced = self.timers.sound.silence();
        let cycles = outcome?;
        silenced?;
        debug!("stopped after {} cycles", cycles);
        Ok(cycles)
    }

    fn run_cycles(&mut self, limit: Option<u64>) -> Result<u64> {
        let cycle_time = CyclePacer::cycle_time(self.config.cycle_hz);
        let mut cycles = 0u64;
        loop {
            self.input.poll_events()?;
            if self.quit.load(Ordering::SeqCst) || limit.map_or(false, |n| cycles >= n) {
                return Ok(cycles);
            }
            self.pacer.mark_cycle_start();
            if let Err(e) = self.cycle() {
                error!("halted at {:#05x}: {}", self.program_counter, e);
                return Err(e);
            }
            self.timers.service(Instant::now())?;
            cycles += 1;
            self.pacer.wait_until(cycle_time)?;
        }
    }

    /// fetch, decode and execute one instruction
    pub fn cycle(&mut self) -> Result<()> {
        let addr = self.program_counter;
        let word = self.memory.get_word(addr)?;
        self.program_counter = addr.wrapping_add(2);
        let op = Opcode::decode(word)?;
        trace!("{:#05x} {:04x} {:?}", addr, word, op.operands());
        self.execute(word, op)
    }

    fn execute(&mut self, word: u16, op: Opcode) -> Result<()> {
        match op.id() {
            CLEAR_SCREEN => {
                self.framebuffer.clear();
                self.refresh_display()?;
            }
            RETURN => self.program_counter = self.stack.pop()?,
            0x0 => return Err(Chip8Error::UnsupportedInstruction { word }),
            0x1 => self.program_counter = op.nnn()?,
            0x2 => {
                self.stack.push(self.program_counter)?;
                self.program_counter = op.nnn()?;
            }
            0x3 | 0x4 | 0x50 | 0x90 => self.skip_if(word, op)?,
            0x6 => self.v[op.x()? as usize] = op.nn()?,
            0x7 => {
                let x = op.x()? as usize;
                self.v[x] = self.v[x].wrapping_add(op.nn()?);
            }
            0x80..=0x8e => self.alu(word, op)?,
            0xa => self.i = op.nnn()?,
            0xb => self.program_counter = op.nnn()? + self.v[0] as u16,
            0xc => {
                let byte: u8 = self.rng.gen();
                self.v[op.x()? as usize] = byte & op.nn()?;
            }
            0xd => self.draw_sprite(op)?,
            0xe9e | 0xea1 => {
                let key = self.v[op.x()? as usize];
                let pressed = self.input.is_key_pressed(key)?;
                if pressed == (op.id() == 0xe9e) {
                    self.skip();
                }
            }
            0xf07 => self.v[op.x()? as usize] = self.timers.delay.get(),
            0xf0a => self.wait_for_key(op.x()? as usize)?,
            0xf15 => self.timers.delay.set(self.v[op.x()? as usize]),
            0xf18 => self.timers.sound.set(self.v[op.x()? as usize])?,
            0xf1e => self.i = self.i.wrapping_add(self.v[op.x()? as usize] as u16),
            0xf29 => self.i = self.font.glyph_addr(self.v[op.x()? as usize]),
            0xf33 => {
                let value = self.v[op.x()? as usize];
                self.memory
                    .write(&[value / 100, value / 10 % 10, value % 10], self.i)?;
            }
            0xf55 => {
                let x = op.x()? as usize;
                self.memory.write(&self.v[..=x], self.i)?;
            }
            0xf65 => {
                let x = op.x()? as usize;
                let bytes = self.memory.get_ro_slice(self.i, x + 1)?;
                self.v[..=x].copy_from_slice(bytes);
            }
            _ => return Err(Chip8Error::Decode { word }),
        }
        Ok(())
    }

    /// 3XNN 4XNN 5XY0 9XY0
    fn skip_if(&mut self, word: u16, op: Opcode) -> Result<()> {
        let vx = self.v[op.x()? as usize];
        let take = match op.id() {
            0x3 => vx == op.nn()?,
            0x4 => vx != op.nn()?,
            0x50 => vx == self.v[op.y()? as usize],
            0x90 => vx != self.v[op.y()? as usize],
            _ => return Err(Chip8Error::Decode { word }),
        };
        if take {
            self.skip();
        }
        Ok(())
    }

    /// 8XY_ register arithmetic
    fn alu(&mut self, word: u16, op: Opcode) -> Result<()> {
        let x = op.x()? as usize;
        let y = op.y()? as usize;
        let (vx, vy) = (self.v[x], self.v[y]);
        match op.id() {
            0x80 => self.v[x] = vy,
            0x81 => self.v[x] = vx | vy,
            0x82 => self.v[x] = vx & vy,
            0x83 => self.v[x] = vx ^ vy,
            0x84 => {
                let (sum, carry) = vx.overflowing_add(vy);
                self.v[x] = sum;
                self.v[VF] = carry as u8;
            }
            0x85 => {
                let (diff, borrow) = vx.overflowing_sub(vy);
                self.v[x] = diff;
                self.v[VF] = !borrow as u8;
            }
            0x87 => {
                let (diff, borrow) = vy.overflowing_sub(vx);
                self.v[x] = diff;
                self.v[VF] = !borrow as u8;
            }
            0x86 => {
                self.v[x] = vx >> 1;
                self.v[VF] = vx & 0x1;
            }
            0x8e => {
                self.v[x] = vx << 1;
                self.v[VF] = vx >> 7;
            }
            _ => return Err(Chip8Error::Decode { word }),
        }
        Ok(())
    }

    /// DXYN: sprite rows from memory at I, VF = collision
    fn draw_sprite(&mut self, op: Opcode) -> Result<()> {
        let x = self.v[op.x()? as usize];
        let y = self.v[op.y()? as usize];
        let n = op.n()?;
        let sprite = self.memory.get_ro_slice(self.i, n as usize)?;
        let collided = self.framebuffer.draw(x, y, n, sprite);
        self.v[VF] = collided as u8;
        self.refresh_display()
    }

    /// FX0A: hold the loop until a key goes down, keeping the timers
    /// ticking. If the quit flag goes up first the instruction is left
    /// unfinished, with PC still on it.
    fn wait_for_key(&mut self, x: usize) -> Result<()> {
        loop {
            if self.quit.load(Ordering::SeqCst) {
                self.program_counter = self.program_counter.wrapping_sub(2);
                return Ok(());
            }
            let now = Instant::now();
            self.timers.service(now)?;
            let timeout = self.timers.until_next_tick(now);
            if let Some(key) = self.input.await_next_key(timeout)? {
                self.v[x] = key;
                return Ok(());
            }
        }
    }

    fn skip(&mut self) {
        self.program_counter = self.program_counter.wrapping_add(2);
    }

    fn refresh_display(&mut self) -> Result<()> {
        self.display
            .draw(self.framebuffer.buffer(), self.framebuffer.changed())
    }

    pub fn pc(&self) -> u16 {
        self.program_counter
    }

    pub fn v(&self, x: usize) -> u8 {
        self.v[x]
    }

    pub fn i(&self) -> u16 {
        self.i
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn delay_timer(&self) -> u8 {
        self.timers.delay.get()
    }

    pub fn sound_timer(&self) -> u8 {
        self.timers.sound.get()
    }
}
