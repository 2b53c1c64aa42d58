use crate::error::Result;
use crate::memory::MemoryMap;

/// where the glyphs start in the reserved low page
pub const FONT_ADDR: u16 = 0x050;

/// bytes per glyph; each glyph is 4 pixels wide and 5 tall
pub const GLYPH_BYTES: usize = 5;

#[rustfmt::skip]
const GLYPHS: [[u8; GLYPH_BYTES]; 16] = [
    [0xf0, 0x90, 0x90, 0x90, 0xf0], // 0
    [0x20, 0x60, 0x20, 0x20, 0x70], // 1
    [0xf0, 0x10, 0xf0, 0x80, 0xf0], // 2
    [0xf0, 0x10, 0xf0, 0x10, 0xf0], // 3
    [0x90, 0x90, 0xf0, 0x10, 0x10], // 4
    [0xf0, 0x80, 0xf0, 0x10, 0xf0], // 5
    [0xf0, 0x80, 0xf0, 0x90, 0xf0], // 6
    [0xf0, 0x10, 0x20, 0x40, 0x40], // 7
    [0xf0, 0x90, 0xf0, 0x90, 0xf0], // 8
    [0xf0, 0x90, 0xf0, 0x10, 0xf0], // 9
    [0xf0, 0x90, 0xf0, 0x90, 0x90], // A
    [0xe0, 0x90, 0xe0, 0x90, 0xe0], // B
    [0xf0, 0x80, 0x80, 0x80, 0xf0], // C
    [0xe0, 0x90, 0x90, 0x90, 0xe0], // D
    [0xf0, 0x80, 0xf0, 0x80, 0xf0], // E
    [0xf0, 0x80, 0xf0, 0x80, 0x80], // F
];

/// Hex digit glyphs, and where each one ended up in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontTable {
    addrs: [u16; 16],
}

impl FontTable {
    /// write all 16 glyphs back to back starting at `addr`
    pub fn load(memory: &mut impl MemoryMap, addr: u16) -> Result<FontTable> {
        let mut addrs = [0u16; 16];
        let mut next = addr;
        for (digit, glyph) in GLYPHS.iter().enumerate() {
            memory.write(glyph, next)?;
            addrs[digit] = next;
            next += GLYPH_BYTES as u16;
        }
        Ok(FontTable { addrs })
    }

    /// address of the glyph for the low nibble of `digit`
    pub fn glyph_addr(&self, digit: u8) -> u16 {
        self.addrs[(digit & 0xf) as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::Chip8MemoryMap;

    #[test]
    fn test_glyphs_laid_out_contiguously() -> Result<()> {
        let mut m = Chip8MemoryMap::new();
        let font = FontTable::load(&mut m, FONT_ADDR)?;
        assert_eq!(font.glyph_addr(0x0), 0x050);
        assert_eq!(font.glyph_addr(0x1), 0x055);
        assert_eq!(font.glyph_addr(0xf), 0x050 + 15 * 5);
        assert_eq!(m.get_ro_slice(0x055, 5)?, &[0x20, 0x60, 0x20, 0x20, 0x70]);
        Ok(())
    }

    #[test]
    fn test_glyph_addr_ignores_high_nibble() -> Result<()> {
        let mut m = Chip8MemoryMap::new();
        let font = FontTable::load(&mut m, FONT_ADDR)?;
        assert_eq!(font.glyph_addr(0x1a), font.glyph_addr(0xa));
        Ok(())
    }
}
