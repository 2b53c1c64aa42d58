use crate::error::{Chip8Error, Result};
use beep::beep;
use log::warn;

/// The tone device. CHIP-8 sound is either on or off; both calls must be
/// safe to repeat.
pub trait Sound {
    fn start_sound(&mut self) -> Result<()>;
    fn stop_sound(&mut self) -> Result<()>;
}

impl<S: Sound + ?Sized> Sound for &mut S {
    fn start_sound(&mut self) -> Result<()> {
        (**self).start_sound()
    }

    fn stop_sound(&mut self) -> Result<()> {
        (**self).stop_sound()
    }
}

const SIMPLEBEEP_PITCH: u16 = 2093; // C

/// square wave through the PC speaker
pub struct SimpleBeep {
    is_beeping: bool,
}

impl SimpleBeep {
    pub fn new() -> Self {
        SimpleBeep { is_beeping: false }
    }
}

impl Default for SimpleBeep {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SimpleBeep {
    fn drop(&mut self) {
        // the speaker keeps going after we exit unless told otherwise
        if self.stop_sound().is_err() {
            warn!("couldn't silence the speaker");
        }
    }
}

impl Sound for SimpleBeep {
    fn start_sound(&mut self) -> Result<()> {
        if !self.is_beeping {
            beep(SIMPLEBEEP_PITCH).map_err(|e| Chip8Error::Audio(e.to_string()))?;
            self.is_beeping = true;
        }
        Ok(())
    }

    fn stop_sound(&mut self) -> Result<()> {
        if self.is_beeping {
            beep(0).map_err(|e| Chip8Error::Audio(e.to_string()))?;
            self.is_beeping = false;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct Mute;

impl Mute {
    pub fn new() -> Self {
        Mute
    }
}

impl Sound for Mute {
    fn start_sound(&mut self) -> Result<()> {
        Ok(())
    }

    fn stop_sound(&mut self) -> Result<()> {
        Ok(())
    }
}

/// counts calls, for checking the sound timer drives the device properly
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RecordingSound {
    pub starts: usize,
    pub stops: usize,
}

impl Sound for RecordingSound {
    fn start_sound(&mut self) -> Result<()> {
        self.starts += 1;
        Ok(())
    }

    fn stop_sound(&mut self) -> Result<()> {
        self.stops += 1;
        Ok(())
    }
}
