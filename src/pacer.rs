use crate::error::{Chip8Error, Result};
use std::time::{Duration, Instant};

/// the COSMAC VIP managed roughly 500 instructions a second
pub const DEFAULT_CYCLE_HZ: u32 = 500;

/// Holds each instruction cycle to a fixed length. Mark the start of a
/// cycle, do the work, then wait out whatever is left of the cycle; slow
/// instructions simply eat into the wait.
#[derive(Debug, Default)]
pub struct CyclePacer {
    cycle_start: Option<Instant>,
}

impl CyclePacer {
    pub fn new() -> Self {
        CyclePacer { cycle_start: None }
    }

    /// length of one cycle at `hz` instructions per second
    pub fn cycle_time(hz: u32) -> Duration {
        Duration::from_secs(1) / hz.max(1)
    }

    pub fn mark_cycle_start(&mut self) {
        self.cycle_start = Some(Instant::now());
    }

    /// block until `target` has passed since the last `mark_cycle_start`;
    /// each mark is good for one wait
    pub fn wait_until(&mut self, target: Duration) -> Result<()> {
        let start = self.cycle_start.take().ok_or(Chip8Error::PacerNotStarted)?;
        let elapsed = start.elapsed();
        if elapsed < target {
            spin_sleep::sleep(target - elapsed);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wait_without_start_fails() {
        let mut pacer = CyclePacer::new();
        assert!(matches!(
            pacer.wait_until(Duration::from_millis(1)),
            Err(Chip8Error::PacerNotStarted)
        ));
    }

    #[test]
    fn test_waits_at_least_target() -> Result<()> {
        let mut pacer = CyclePacer::new();
        let before = Instant::now();
        pacer.mark_cycle_start();
        pacer.wait_until(Duration::from_millis(20))?;
        assert!(before.elapsed() >= Duration::from_millis(20));
        Ok(())
    }

    #[test]
    fn test_no_wait_once_target_passed() -> Result<()> {
        let mut pacer = CyclePacer::new();
        pacer.mark_cycle_start();
        std::thread::sleep(Duration::from_millis(5));
        let before = Instant::now();
        pacer.wait_until(Duration::from_millis(1))?;
        assert!(before.elapsed() < Duration::from_millis(100));
        Ok(())
    }

    #[test]
    fn test_mark_used_up_by_wait() -> Result<()> {
        let mut pacer = CyclePacer::new();
        pacer.mark_cycle_start();
        pacer.wait_until(Duration::ZERO)?;
        assert!(matches!(
            pacer.wait_until(Duration::ZERO),
            Err(Chip8Error::PacerNotStarted)
        ));
        pacer.mark_cycle_start();
        pacer.wait_until(Duration::ZERO)
    }

    #[test]
    fn test_cycle_time() {
        assert_eq!(CyclePacer::cycle_time(500), Duration::from_millis(2));
    }
}
