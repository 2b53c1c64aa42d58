use crate::error::{Chip8Error, Result};

/// # Opcodes
///
/// Every instruction is one big-endian 16-bit word, read as four nibbles
/// `p0 p1 p2 p3` (high to low). The leading nibble picks an instruction
/// family; families that share a leading nibble are told apart by folding
/// the distinguishing nibbles into the identifier:
///
/// ```text
///  p0           id                      operands
///  0 (literal)  00E0 / 00EE             -
///  0            0                       NNN
///  1 2 A B      p0                      NNN
///  3 4 6 7 C    p0                      X NN
///  5 8 9        p0 << 4 | p3            X Y
///  D            p0                      X Y N
///  E F          p0 << 8 | p2 << 4 | p3  X
/// ```
///
/// The identifier is the key the interpreter dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode {
    id: u16,
    operands: Operands,
}

/// Operand fields, one variant per instruction shape. A field that a shape
/// doesn't carry is absent rather than zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operands {
    None,
    /// `_NNN`
    Address { nnn: u16 },
    /// `_XNN`
    RegisterByte { x: u8, nn: u8 },
    /// `_XY_`
    RegisterPair { x: u8, y: u8 },
    /// `_XYN`
    Sprite { x: u8, y: u8, n: u8 },
    /// `_X__`
    Register { x: u8 },
}

pub const CLEAR_SCREEN: u16 = 0x00e0;
pub const RETURN: u16 = 0x00ee;

impl Opcode {
    /// Decode one raw instruction word.
    pub fn decode(word: u16) -> Result<Opcode> {
        // the only words whose identifier is the whole word
        if word == CLEAR_SCREEN || word == RETURN {
            return Ok(Opcode {
                id: word,
                operands: Operands::None,
            });
        }

        let (p0, p1, p2, p3) = nibbles(word);
        let nnn = word & 0x0fff;
        let nn = (word & 0x00ff) as u8;

        let (id, operands) = match p0 {
            0x0 | 0x1 | 0x2 | 0xa | 0xb => (p0 as u16, Operands::Address { nnn }),
            0x3 | 0x4 | 0x6 | 0x7 | 0xc => (p0 as u16, Operands::RegisterByte { x: p1, nn }),
            0x5 | 0x8 | 0x9 => (
                (p0 as u16) << 4 | p3 as u16,
                Operands::RegisterPair { x: p1, y: p2 },
            ),
            0xd => (
                p0 as u16,
                Operands::Sprite {
                    x: p1,
                    y: p2,
                    n: p3,
                },
            ),
            0xe | 0xf => (
                (p0 as u16) << 8 | (p2 as u16) << 4 | p3 as u16,
                Operands::Register { x: p1 },
            ),
            _ => return Err(Chip8Error::Decode { word }),
        };
        Ok(Opcode { id, operands })
    }

    /// dispatch key
    pub fn id(&self) -> u16 {
        self.id
    }

    pub fn operands(&self) -> Operands {
        self.operands
    }

    /// 12-bit address
    pub fn nnn(&self) -> Result<u16> {
        match self.operands {
            Operands::Address { nnn } => Ok(nnn),
            _ => Err(self.missing("NNN")),
        }
    }

    /// 8-bit immediate
    pub fn nn(&self) -> Result<u8> {
        match self.operands {
            Operands::RegisterByte { nn, .. } => Ok(nn),
            _ => Err(self.missing("NN")),
        }
    }

    /// 4-bit immediate
    pub fn n(&self) -> Result<u8> {
        match self.operands {
            Operands::Sprite { n, .. } => Ok(n),
            _ => Err(self.missing("N")),
        }
    }

    /// first register index
    pub fn x(&self) -> Result<u8> {
        match self.operands {
            Operands::RegisterByte { x, .. }
            | Operands::RegisterPair { x, .. }
            | Operands::Sprite { x, .. }
            | Operands::Register { x } => Ok(x),
            _ => Err(self.missing("X")),
        }
    }

    /// second register index
    pub fn y(&self) -> Result<u8> {
        match self.operands {
            Operands::RegisterPair { y, .. } | Operands::Sprite { y, .. } => Ok(y),
            _ => Err(self.missing("Y")),
        }
    }

    fn missing(&self, field: &'static str) -> Chip8Error {
        Chip8Error::MissingOperand { id: self.id, field }
    }
}

/// split a word into its nibbles, most significant first
pub fn nibbles(word: u16) -> (u8, u8, u8, u8) {
    (
        (word >> 12) as u8,
        ((word >> 8) & 0xf) as u8,
        ((word >> 4) & 0xf) as u8,
        (word & 0xf) as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nibbles() {
        assert_eq!(nibbles(0xabcd), (0xa, 0xb, 0xc, 0xd));
    }

    #[test]
    fn test_literals_short_circuit() -> Result<()> {
        for word in [CLEAR_SCREEN, RETURN] {
            let op = Opcode::decode(word)?;
            assert_eq!(op.id(), word);
            assert_eq!(op.operands(), Operands::None);
            assert!(op.nnn().is_err());
        }
        Ok(())
    }

    #[test]
    fn test_machine_code_call() -> Result<()> {
        let op = Opcode::decode(0x0123)?;
        assert_eq!(op.id(), 0x0);
        assert_eq!(op.nnn()?, 0x123);
        Ok(())
    }

    #[test]
    fn test_address_family() -> Result<()> {
        for (word, id) in [(0x1123, 0x1), (0x2123, 0x2), (0xa123, 0xa), (0xb123, 0xb)] {
            let op = Opcode::decode(word)?;
            assert_eq!(op.id(), id);
            assert_eq!(op.operands(), Operands::Address { nnn: 0x123 });
        }
        Ok(())
    }

    #[test]
    fn test_register_byte_family() -> Result<()> {
        for p0 in [0x3u16, 0x4, 0x6, 0x7, 0xc] {
            let op = Opcode::decode(p0 << 12 | 0x0a12)?;
            assert_eq!(op.id(), p0);
            assert_eq!(op.x()?, 0xa);
            assert_eq!(op.nn()?, 0x12);
            assert!(op.y().is_err());
            assert!(op.n().is_err());
        }
        Ok(())
    }

    #[test]
    fn test_register_pair_family_all_words() -> Result<()> {
        for p0 in [0x5u16, 0x8, 0x9] {
            for low in 0..=0x0fffu16 {
                let word = p0 << 12 | low;
                let (_, p1, p2, p3) = nibbles(word);
                let op = Opcode::decode(word)?;
                assert_eq!(op.id(), p0 << 4 | p3 as u16);
                assert_eq!(op.operands(), Operands::RegisterPair { x: p1, y: p2 });
            }
        }
        Ok(())
    }

    #[test]
    fn test_sprite() -> Result<()> {
        let op = Opcode::decode(0xd123)?;
        assert_eq!(op.id(), 0xd);
        assert_eq!((op.x()?, op.y()?, op.n()?), (0x1, 0x2, 0x3));
        Ok(())
    }

    #[test]
    fn test_e_f_families() -> Result<()> {
        for (word, id) in [
            (0xe19e, 0xe9e),
            (0xe1a1, 0xea1),
            (0xf107, 0xf07),
            (0xf10a, 0xf0a),
            (0xf115, 0xf15),
            (0xf118, 0xf18),
            (0xf11e, 0xf1e),
            (0xf129, 0xf29),
            (0xf133, 0xf33),
            (0xf155, 0xf55),
            (0xf165, 0xf65),
        ] {
            let op = Opcode::decode(word)?;
            assert_eq!(op.id(), id);
            assert_eq!(op.operands(), Operands::Register { x: 0x1 });
        }
        Ok(())
    }

    #[test]
    fn test_missing_operand_names_field() -> Result<()> {
        let op = Opcode::decode(0x1234)?;
        match op.x() {
            Err(Chip8Error::MissingOperand { id, field }) => {
                assert_eq!(id, 0x1);
                assert_eq!(field, "X");
            }
            other => panic!("expected missing operand, got {:?}", other),
        }
        Ok(())
    }
}
