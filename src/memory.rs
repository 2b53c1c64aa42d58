use crate::error::{Chip8Error, Result};
use std::io;

// NB. addresses are u16 as per the chip-8; lengths are usize to stop endless casting

/// Represents memory map, ROM, RAM etc.
pub trait MemoryMap {
    /// write a chunk of bytes into "RAM"
    fn write(&mut self, data: &[u8], addr: u16) -> Result<()> {
        self.get_rw_slice(addr, data.len())?.copy_from_slice(data);
        Ok(())
    }

    /// get a big-endian two-byte word (instruction fetch)
    fn get_word(&self, addr: u16) -> Result<u16> {
        let word = self.get_ro_slice(addr, 2)?;
        Ok(u16::from_be_bytes([word[0], word[1]]))
    }

    /// get a r/w slice of the underlying memory
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> Result<&mut [u8]>;

    /// get a r/o slice of the underlying memory
    fn get_ro_slice(&self, addr: u16, len: usize) -> Result<&[u8]>;
}

/// how much RAM we have
pub const CHIP8_RAM_SIZE_BYTES: usize = 4096;

/// where programs are loaded, by convention
pub const CHIP8_PROGRAM_ADDR: u16 = 0x0200;

/// Defines the CHIP-8 4K memory map
///   0x000-0x1ff  interpreter (font lives here)
///   0x200-0xfff  program and data
///
/// chip-8 programs *should* not touch the low page directly
pub struct Chip8MemoryMap {
    bytes: Box<[u8]>,
}

impl MemoryMap for Chip8MemoryMap {
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> Result<&mut [u8]> {
        let a = addr as usize;
        self.bytes
            .get_mut(a..a + len)
            .ok_or(Chip8Error::MemoryOutOfRange { addr, len })
    }

    fn get_ro_slice(&self, addr: u16, len: usize) -> Result<&[u8]> {
        let a = addr as usize;
        self.bytes
            .get(a..a + len)
            .ok_or(Chip8Error::MemoryOutOfRange { addr, len })
    }
}

impl Chip8MemoryMap {
    /// zeroed 4K of RAM
    pub fn new() -> Self {
        Chip8MemoryMap {
            bytes: vec![0u8; CHIP8_RAM_SIZE_BYTES].into_boxed_slice(),
        }
    }

    /// copy a ROM image verbatim into memory at `addr`
    pub fn load_rom(&mut self, data: &[u8], addr: u16) -> Result<()> {
        if addr as usize + data.len() > CHIP8_RAM_SIZE_BYTES {
            return Err(Chip8Error::RomTooLarge {
                len: data.len(),
                addr,
            });
        }
        self.write(data, addr)
    }

    /// read a whole ROM image and load it at `addr`
    pub fn load_program(&mut self, reader: &mut impl io::Read, addr: u16) -> Result<usize> {
        let mut buf = Vec::new();
        let len = reader.read_to_end(&mut buf)?;
        self.load_rom(&buf, addr)?;
        Ok(len)
    }
}

impl Default for Chip8MemoryMap {
    fn default() -> Self {
        Self::new()
    }
}
