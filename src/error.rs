use std::io;
use thiserror::Error;

/// Everything that can stop a run. None of these are retried; the caller
/// builds a fresh interpreter to start over.
#[derive(Debug, Error)]
pub enum Chip8Error {
    #[error("unrecognised instruction word {word:#06x}")]
    Decode { word: u16 },

    #[error("opcode {id:#05x} has no {field} operand")]
    MissingOperand { id: u16, field: &'static str },

    #[error("machine code routine call {word:#06x} is not supported")]
    UnsupportedInstruction { word: u16 },

    #[error("cycle pacer waited on before a cycle start was marked")]
    PacerNotStarted,

    #[error("key {key:#04x} is outside the keypad range 0x0-0xf")]
    KeyOutOfRange { key: u8 },

    #[error("call stack overflow")]
    StackOverflow,

    #[error("return with an empty call stack")]
    StackUnderflow,

    #[error("ROM of {len} bytes does not fit in memory at {addr:#05x}")]
    RomTooLarge { len: usize, addr: u16 },

    #[error("memory access of {len} bytes at {addr:#05x} is out of range")]
    MemoryOutOfRange { addr: u16, len: usize },

    #[error("audio device: {0}")]
    Audio(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Chip8Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_names_word() {
        let e = Chip8Error::Decode { word: 0x5121 };
        assert_eq!(e.to_string(), "unrecognised instruction word 0x5121");
    }

    #[test]
    fn test_io_error_converts() {
        let e: Chip8Error = io::Error::new(io::ErrorKind::Other, "gone").into();
        assert!(matches!(e, Chip8Error::Io(_)));
    }
}
