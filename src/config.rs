use crate::memory::CHIP8_PROGRAM_ADDR;
use crate::pacer::DEFAULT_CYCLE_HZ;
use crate::timer::TIMER_HZ;

/// Knobs for one interpreter run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// instructions per second
    pub cycle_hz: u32,
    /// delay/sound timer rate
    pub timer_hz: u32,
    /// where the ROM goes and where execution starts
    pub load_addr: u16,
    /// fixed seed for CXNN, for reproducible runs
    pub rng_seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            cycle_hz: DEFAULT_CYCLE_HZ,
            timer_hz: TIMER_HZ,
            load_addr: CHIP8_PROGRAM_ADDR,
            rng_seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = Config::default();
        assert_eq!(c.cycle_hz, 500);
        assert_eq!(c.timer_hz, 60);
        assert_eq!(c.load_addr, 0x200);
        assert_eq!(c.rng_seed, None);
    }
}
