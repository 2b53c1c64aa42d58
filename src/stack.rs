use crate::error::{Chip8Error, Result};

/// CHIP-8 supports 16 levels of nested subroutine calls
pub const STACK_DEPTH: usize = 16;

/// Return-address stack, kept as raw bytes the way the interpreter stored
/// it in RAM: each push writes a big-endian address and moves the pointer
/// on by 2. Overflow and underflow are fatal.
#[derive(Debug, Clone)]
pub struct Stack {
    bytes: [u8; STACK_DEPTH * 2],
    pointer: usize,
}

impl Stack {
    pub fn new() -> Self {
        Stack {
            bytes: [0; STACK_DEPTH * 2],
            pointer: 0,
        }
    }

    pub fn push(&mut self, addr: u16) -> Result<()> {
        if self.pointer == self.bytes.len() {
            return Err(Chip8Error::StackOverflow);
        }
        self.bytes[self.pointer..self.pointer + 2].copy_from_slice(&addr.to_be_bytes());
        self.pointer += 2;
        Ok(())
    }

    pub fn pop(&mut self) -> Result<u16> {
        if self.pointer == 0 {
            return Err(Chip8Error::StackUnderflow);
        }
        self.pointer -= 2;
        Ok(u16::from_be_bytes([
            self.bytes[self.pointer],
            self.bytes[self.pointer + 1],
        ]))
    }

    /// number of return addresses held
    pub fn depth(&self) -> usize {
        self.pointer / 2
    }
}

impl Default for Stack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop_lifo() -> Result<()> {
        let mut s = Stack::new();
        s.push(0x0202)?;
        s.push(0x0abc)?;
        assert_eq!(s.depth(), 2);
        assert_eq!(s.pop()?, 0x0abc);
        assert_eq!(s.pop()?, 0x0202);
        assert_eq!(s.depth(), 0);
        Ok(())
    }

    #[test]
    fn test_stored_big_endian() -> Result<()> {
        let mut s = Stack::new();
        s.push(0x0abc)?;
        assert_eq!(s.bytes[..2], [0x0a, 0xbc]);
        Ok(())
    }

    #[test]
    fn test_overflow() -> Result<()> {
        let mut s = Stack::new();
        for addr in 0..STACK_DEPTH as u16 {
            s.push(addr)?;
        }
        assert!(matches!(s.push(0x200), Err(Chip8Error::StackOverflow)));
        Ok(())
    }

    #[test]
    fn test_underflow() {
        let mut s = Stack::new();
        assert!(matches!(s.pop(), Err(Chip8Error::StackUnderflow)));
    }
}
