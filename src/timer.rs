//! # timers
//!
//! Two 8-bit countdowns run at 60Hz whatever the instruction rate is. They
//! are ticked from a `Ticker`, a periodic task the run loop checks between
//! cycles and while it waits for a key, so a blocked FX0A never stalls them.

use crate::error::Result;
use crate::sound::Sound;
use std::time::{Duration, Instant};

/// the timers tick at 60Hz
pub const TIMER_HZ: u32 = 60;

/// Delay timer: counts down to zero and stays there until written again.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DelayTimer {
    value: u8,
}

impl DelayTimer {
    pub fn new() -> Self {
        DelayTimer { value: 0 }
    }

    pub fn get(&self) -> u8 {
        self.value
    }

    /// any non-zero write restarts the countdown
    pub fn set(&mut self, value: u8) {
        self.value = value;
    }

    pub fn is_running(&self) -> bool {
        self.value != 0
    }

    /// one 60Hz period has passed
    pub fn tick(&mut self) {
        if self.value != 0 {
            self.value -= 1;
        }
    }
}

/// Sound timer: a delay timer that holds the tone on while it is non-zero.
pub struct SoundTimer<S: Sound> {
    timer: DelayTimer,
    device: S,
    playing: bool,
}

impl<S: Sound> SoundTimer<S> {
    pub fn new(device: S) -> Self {
        SoundTimer {
            timer: DelayTimer::new(),
            device,
            playing: false,
        }
    }

    pub fn get(&self) -> u8 {
        self.timer.get()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn device(&self) -> &S {
        &self.device
    }

    pub fn set(&mut self, value: u8) -> Result<()> {
        self.timer.set(value);
        self.sync_tone()
    }

    pub fn tick(&mut self) -> Result<()> {
        self.timer.tick();
        self.sync_tone()
    }

    /// turn the tone off without touching the countdown; the next `set` or
    /// `tick` turns it back on if the timer is still running
    pub fn silence(&mut self) -> Result<()> {
        if self.playing {
            self.device.stop_sound()?;
            self.playing = false;
        }
        Ok(())
    }

    fn sync_tone(&mut self) -> Result<()> {
        match (self.timer.is_running(), self.playing) {
            (true, false) => {
                self.device.start_sound()?;
                self.playing = true;
            }
            (false, true) => {
                self.device.stop_sound()?;
                self.playing = false;
            }
            _ => {}
        }
        Ok(())
    }
}

/// Fixed-rate periodic trigger. Reports how many whole periods have gone
/// by since it was last asked, so late polling never loses ticks.
#[derive(Debug, Clone)]
pub struct Ticker {
    period: Duration,
    next: Option<Instant>,
}

impl Ticker {
    pub fn new(hz: u32) -> Self {
        Ticker {
            period: Duration::from_secs(1) / hz.max(1),
            next: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// periods elapsed up to `now`; the first call just starts the clock
    pub fn due(&mut self, now: Instant) -> u32 {
        let mut next = match self.next {
            Some(next) => next,
            None => {
                self.next = Some(now + self.period);
                return 0;
            }
        };
        let mut count = 0;
        while now >= next {
            count += 1;
            next += self.period;
        }
        self.next = Some(next);
        count
    }

    /// time left until the next tick is due
    pub fn until_next(&self, now: Instant) -> Duration {
        match self.next {
            Some(next) => next.saturating_duration_since(now),
            None => self.period,
        }
    }
}

/// Both timers and the trigger that drives them.
pub struct Timers<S: Sound> {
    pub delay: DelayTimer,
    pub sound: SoundTimer<S>,
    ticker: Ticker,
}

impl<S: Sound> Timers<S> {
    pub fn new(device: S, hz: u32) -> Self {
        Timers {
            delay: DelayTimer::new(),
            sound: SoundTimer::new(device),
            ticker: Ticker::new(hz),
        }
    }

    /// apply every tick that has fallen due by `now`
    pub fn service(&mut self, now: Instant) -> Result<()> {
        for _ in 0..self.ticker.due(now) {
            self.delay.tick();
            self.sound.tick()?;
        }
        Ok(())
    }

    pub fn until_next_tick(&self, now: Instant) -> Duration {
        self.ticker.until_next(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sound::RecordingSound;

    #[test]
    fn test_delay_counts_down_to_zero_and_stops() {
        let mut t = DelayTimer::new();
        t.set(60);
        for _ in 0..60 {
            t.tick();
        }
        assert_eq!(t.get(), 0);
        t.tick();
        assert_eq!(t.get(), 0);
        assert!(!t.is_running());
    }

    #[test]
    fn test_delay_restarts_after_write() {
        let mut t = DelayTimer::new();
        t.set(1);
        t.tick();
        t.tick();
        t.set(3);
        assert!(t.is_running());
        t.tick();
        assert_eq!(t.get(), 2);
    }

    #[test]
    fn test_sound_start_stop_once_per_transition() -> Result<()> {
        let mut t = SoundTimer::new(RecordingSound::default());
        t.set(3)?;
        assert_eq!(t.device().starts, 1);
        t.tick()?;
        t.tick()?;
        assert_eq!(*t.device(), RecordingSound { starts: 1, stops: 0 });
        t.tick()?;
        assert_eq!(*t.device(), RecordingSound { starts: 1, stops: 1 });
        t.tick()?;
        assert_eq!(t.device().stops, 1);
        assert!(!t.is_playing());
        Ok(())
    }

    #[test]
    fn test_sound_rewrite_while_playing_does_not_restart() -> Result<()> {
        let mut t = SoundTimer::new(RecordingSound::default());
        t.set(5)?;
        t.set(10)?;
        assert_eq!(t.device().starts, 1);
        t.set(0)?;
        assert_eq!(*t.device(), RecordingSound { starts: 1, stops: 1 });
        Ok(())
    }

    #[test]
    fn test_silence_then_resume() -> Result<()> {
        let mut t = SoundTimer::new(RecordingSound::default());
        t.set(5)?;
        t.silence()?;
        t.silence()?;
        assert_eq!(*t.device(), RecordingSound { starts: 1, stops: 1 });
        assert_eq!(t.get(), 5);
        t.tick()?;
        assert_eq!(t.device().starts, 2);
        assert!(t.is_playing());
        Ok(())
    }

    #[test]
    fn test_sound_through_borrowed_device() -> Result<()> {
        let mut rec = RecordingSound::default();
        {
            let mut t = SoundTimer::new(&mut rec as &mut dyn Sound);
            t.set(1)?;
            t.tick()?;
        }
        assert_eq!(rec, RecordingSound { starts: 1, stops: 1 });
        Ok(())
    }

    #[test]
    fn test_ticker_counts_elapsed_periods() {
        let mut ticker = Ticker::new(60);
        let start = Instant::now();
        assert_eq!(ticker.due(start), 0);
        assert_eq!(ticker.due(start + ticker.period() / 2), 0);
        assert_eq!(ticker.due(start + ticker.period()), 1);
        assert_eq!(ticker.due(start + ticker.period() * 4), 3);
    }

    #[test]
    fn test_timers_service_ticks_both() -> Result<()> {
        let mut timers = Timers::new(RecordingSound::default(), TIMER_HZ);
        let start = Instant::now();
        timers.service(start)?;
        timers.delay.set(10);
        timers.sound.set(2)?;
        timers.service(start + Duration::from_secs(1) / 60 * 3)?;
        assert_eq!(timers.delay.get(), 7);
        assert_eq!(timers.sound.get(), 0);
        assert_eq!(timers.sound.device().stops, 1);
        Ok(())
    }
}
