use crate::error::{Chip8Error, Result};
use crossterm::event::{poll, read, Event, KeyCode, KeyModifiers};
use crossterm::terminal;
use log::warn;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// left-hand side of a qwerty keyboard standing in for the hex keypad
///
/// ```text
/// |1|2|3|C|      |1|2|3|4|
/// |4|5|6|D|  ->  |Q|W|E|R|
/// |7|8|9|E|  ->  |A|S|D|F|
/// |A|0|B|F|      |Z|X|C|V|
/// ```
const CHIP8_CONVENTIONAL_KEYMAP: [(char, u8); 16] = [
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
    ('c', 0x0b),
    ('4', 0x0c),
    ('r', 0x0d),
    ('f', 0x0e),
    ('v', 0x0f),
];

/// terminals only report presses, so a key counts as held for this long
/// after its last press (or auto-repeat)
const KEY_HOLD: Duration = Duration::from_millis(150);

/// The 16-key hex keypad.
pub trait Keypad {
    /// is `key` (0x0-0xf) held down right now
    fn is_key_pressed(&mut self, key: u8) -> Result<bool>;

    /// wait up to `timeout` for a key to go down and return its code, or
    /// `None` if nothing was pressed in time
    fn await_next_key(&mut self, timeout: Duration) -> Result<Option<u8>>;

    /// take in whatever the host has queued up without blocking; called
    /// between cycles
    fn poll_events(&mut self) -> Result<()> {
        Ok(())
    }
}

fn check_key(key: u8) -> Result<usize> {
    if key > 0xf {
        return Err(Chip8Error::KeyOutOfRange { key });
    }
    Ok(key as usize)
}

/// Keypad read from the terminal with crossterm. Esc or Ctrl-C raises the
/// shared quit flag.
pub struct TerminalKeypad {
    keymap: HashMap<char, u8>,
    last_pressed: [Option<Instant>; 16],
    quit: Arc<AtomicBool>,
}

impl TerminalKeypad {
    pub fn new(quit: Arc<AtomicBool>) -> Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(TerminalKeypad {
            keymap: HashMap::from(CHIP8_CONVENTIONAL_KEYMAP),
            last_pressed: [None; 16],
            quit,
        })
    }

    /// handle one pending event, returning the keypad code if it was a
    /// mapped key
    fn read_event(&mut self) -> Result<Option<u8>> {
        match read()? {
            Event::Key(evt) => match evt.code {
                // raw mode swallows the signal
                KeyCode::Char('c') if evt.modifiers.contains(KeyModifiers::CONTROL) => {
                    self.quit.store(true, Ordering::SeqCst);
                    Ok(None)
                }
                KeyCode::Char(key) => match self.keymap.get(&key.to_ascii_lowercase()) {
                    Some(&mapped_key) => {
                        self.last_pressed[mapped_key as usize] = Some(Instant::now());
                        Ok(Some(mapped_key))
                    }
                    None => {
                        warn!("can't map {:?} to a COSMAC key", key);
                        Ok(None)
                    }
                },
                KeyCode::Esc => {
                    self.quit.store(true, Ordering::SeqCst);
                    Ok(None)
                }
                _ => Ok(None),
            },
            _ => Ok(None),
        }
    }

}

impl Drop for TerminalKeypad {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

impl Keypad for TerminalKeypad {
    fn is_key_pressed(&mut self, key: u8) -> Result<bool> {
        let k = check_key(key)?;
        self.poll_events()?;
        Ok(matches!(self.last_pressed[k], Some(at) if at.elapsed() < KEY_HOLD))
    }

    fn await_next_key(&mut self, timeout: Duration) -> Result<Option<u8>> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if !poll(remaining)? {
                return Ok(None);
            }
            if let Some(key) = self.read_event()? {
                return Ok(Some(key));
            }
            if self.quit.load(Ordering::SeqCst) {
                return Ok(None);
            }
        }
    }

    fn poll_events(&mut self) -> Result<()> {
        while poll(Duration::from_millis(0))? {
            self.read_event()?;
        }
        Ok(())
    }
}

/// Scripted keypad for tests and headless runs: a fixed set of held keys
/// plus a queue of presses handed out one per wait.
#[derive(Debug, Default)]
pub struct DummyInput {
    held: [bool; 16],
    presses: VecDeque<u8>,
}

impl DummyInput {
    pub fn new(held: &[u8]) -> Self {
        let mut input = DummyInput::default();
        for &key in held {
            input.held[(key & 0xf) as usize] = true;
        }
        input
    }

    /// queue a press for the next `await_next_key`
    pub fn press(&mut self, key: u8) {
        self.presses.push_back(key);
    }
}

impl Keypad for DummyInput {
    fn is_key_pressed(&mut self, key: u8) -> Result<bool> {
        Ok(self.held[check_key(key)?])
    }

    fn await_next_key(&mut self, _timeout: Duration) -> Result<Option<u8>> {
        Ok(self.presses.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keymap_covers_every_key() {
        let mut codes: Vec<u8> = CHIP8_CONVENTIONAL_KEYMAP.iter().map(|(_, k)| *k).collect();
        codes.sort_unstable();
        assert_eq!(codes, (0x0..=0xf).collect::<Vec<u8>>());
    }

    #[test]
    fn test_dummy_held_keys() -> Result<()> {
        let mut input = DummyInput::new(&[0x3, 0xe]);
        assert!(input.is_key_pressed(0x3)?);
        assert!(input.is_key_pressed(0xe)?);
        assert!(!input.is_key_pressed(0x4)?);
        Ok(())
    }

    #[test]
    fn test_key_out_of_range() {
        let mut input = DummyInput::new(&[]);
        assert!(matches!(
            input.is_key_pressed(0x10),
            Err(Chip8Error::KeyOutOfRange { key: 0x10 })
        ));
    }

    #[test]
    fn test_dummy_presses_in_order() -> Result<()> {
        let mut input = DummyInput::new(&[]);
        input.press(0xa);
        input.press(0x1);
        assert_eq!(input.await_next_key(Duration::ZERO)?, Some(0xa));
        assert_eq!(input.await_next_key(Duration::ZERO)?, Some(0x1));
        assert_eq!(input.await_next_key(Duration::ZERO)?, None);
        Ok(())
    }

    #[test]
    fn test_dummy_poll_leaves_presses_queued() -> Result<()> {
        let mut input = DummyInput::new(&[]);
        input.press(0x2);
        input.poll_events()?;
        assert_eq!(input.await_next_key(Duration::ZERO)?, Some(0x2));
        Ok(())
    }
}
