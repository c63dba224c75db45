//! # Opcode Table
//!
//! Every instruction is one opcode byte followed by its operands. Instead of
//! deriving operand lengths from control flow, each opcode maps to an
//! [`Action`] that names what it does and how many operand bytes it reads.
//!
//! | Byte | Opcode | Command operand | Data operand |
//! |------|--------|-----------------|--------------|
//! | 0 | `Begin` | - | - |
//! | 1 | `Command8` | u8 | - |
//! | 2 | `Command16` | u16 (BE) | - |
//! | 3 | `CommandBytes` | len + bytes | - |
//! | 4 | `Data8` | - | 1 byte |
//! | 5 | `Data16` | - | 2 bytes |
//! | 6 | `DataBytes` | - | len + bytes |
//! | 7 | `Command8Data8` | u8 | 1 byte |
//! | 8 | `Command8Data16` | u8 | 2 bytes |
//! | 9 | `Command8Bytes` | u8 | len + bytes |
//! | 10 | `Command16Data16` | u16 (BE) | 2 bytes |
//! | 11 | `End` | - | - |
//! | 12 | `Delay` | - | - (1 byte of ms) |

/// Instruction opcodes, with their wire byte as discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    /// Start a write session (CS low)
    Begin = 0,
    /// One command byte
    Command8 = 1,
    /// Two command bytes, big-endian
    Command16 = 2,
    /// Length-prefixed command bytes
    CommandBytes = 3,
    /// One data byte
    Data8 = 4,
    /// Two data bytes
    Data16 = 5,
    /// Length-prefixed data bytes
    DataBytes = 6,
    Command8Data8 = 7,
    Command8Data16 = 8,
    Command8Bytes = 9,
    Command16Data16 = 10,
    /// Flush and end the write session (CS high)
    End = 11,
    /// Block for N milliseconds
    Delay = 12,
}

/// Command part of a transfer instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOperand {
    None,
    /// One byte
    Byte,
    /// Two bytes forming a big-endian word
    Word,
    /// Length byte followed by that many bytes
    Prefixed,
}

/// Data part of a transfer instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataOperand {
    None,
    /// A fixed number of bytes
    Fixed(usize),
    /// Length byte followed by that many bytes
    Prefixed,
}

/// What an opcode does once decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Begin,
    End,
    /// One operand byte: milliseconds
    Delay,
    /// An optional immediate command followed by optional buffered data
    Transfer {
        command: CommandOperand,
        data: DataOperand,
    },
}

impl Opcode {
    pub const ALL: [Self; 13] = [
        Self::Begin,
        Self::Command8,
        Self::Command16,
        Self::CommandBytes,
        Self::Data8,
        Self::Data16,
        Self::DataBytes,
        Self::Command8Data8,
        Self::Command8Data16,
        Self::Command8Bytes,
        Self::Command16Data16,
        Self::End,
        Self::Delay,
    ];

    /// Decode an opcode byte. `None` for bytes with no defined meaning.
    pub fn from_byte(byte: u8) -> Option<Self> {
        Self::ALL.get(byte as usize).copied()
    }

    #[inline]
    pub fn as_byte(self) -> u8 {
        self as u8
    }

    /// The opcode's entry in the dispatch table.
    pub const fn action(self) -> Action {
        use CommandOperand as C;
        use DataOperand as D;

        match self {
            Self::Begin => Action::Begin,
            Self::End => Action::End,
            Self::Delay => Action::Delay,
            Self::Command8 => transfer(C::Byte, D::None),
            Self::Command16 => transfer(C::Word, D::None),
            Self::CommandBytes => transfer(C::Prefixed, D::None),
            Self::Data8 => transfer(C::None, D::Fixed(1)),
            Self::Data16 => transfer(C::None, D::Fixed(2)),
            Self::DataBytes => transfer(C::None, D::Prefixed),
            Self::Command8Data8 => transfer(C::Byte, D::Fixed(1)),
            Self::Command8Data16 => transfer(C::Byte, D::Fixed(2)),
            Self::Command8Bytes => transfer(C::Byte, D::Prefixed),
            Self::Command16Data16 => transfer(C::Word, D::Fixed(2)),
        }
    }
}

const fn transfer(command: CommandOperand, data: DataOperand) -> Action {
    Action::Transfer { command, data }
}

impl TryFrom<u8> for Opcode {
    type Error = u8;

    fn try_from(byte: u8) -> Result<Self, u8> {
        Self::from_byte(byte).ok_or(byte)
    }
}

impl From<Opcode> for u8 {
    fn from(op: Opcode) -> u8 {
        op as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_byte_matches_discriminant() {
        for op in Opcode::ALL {
            assert_eq!(Opcode::from_byte(op.as_byte()), Some(op));
        }
    }

    #[test]
    fn test_undefined_bytes() {
        assert_eq!(Opcode::from_byte(13), None);
        assert_eq!(Opcode::from_byte(0xFF), None);
        assert_eq!(Opcode::try_from(0x80), Err(0x80));
    }

    #[test]
    fn test_composite_actions() {
        assert_eq!(
            Opcode::Command8Data16.action(),
            Action::Transfer {
                command: CommandOperand::Byte,
                data: DataOperand::Fixed(2)
            }
        );
        assert_eq!(
            Opcode::Command16Data16.action(),
            Action::Transfer {
                command: CommandOperand::Word,
                data: DataOperand::Fixed(2)
            }
        );
    }
}
