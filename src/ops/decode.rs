//! # Stream Decoder
//!
//! Walks an operation stream left to right, one instruction at a time.
//! The cursor always moves past the opcode byte plus exactly the operand
//! bytes the opcode's [`Action`] calls for. Unknown opcodes consume only
//! their own byte, so decoding resumes at the very next byte.

use super::opcode::{Action, CommandOperand, DataOperand, Opcode};
use crate::error::PanelError;

/// Command part of a decoded instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    Byte(u8),
    /// Reassembled from two stream bytes, first byte most significant
    Word(u16),
    Bytes(&'a [u8]),
}

impl Command<'_> {
    /// Bytes in wire order
    pub fn wire_bytes(&self) -> CommandBytes<'_> {
        match self {
            Command::Byte(b) => CommandBytes::Inline([*b, 0], 1),
            Command::Word(w) => CommandBytes::Inline(w.to_be_bytes(), 2),
            Command::Bytes(bytes) => CommandBytes::Borrowed(*bytes),
        }
    }
}

/// Wire bytes of a [`Command`] without allocating
#[derive(Debug, Clone, Copy)]
pub enum CommandBytes<'a> {
    Inline([u8; 2], usize),
    Borrowed(&'a [u8]),
}

impl AsRef<[u8]> for CommandBytes<'_> {
    fn as_ref(&self) -> &[u8] {
        match self {
            CommandBytes::Inline(buf, len) => &buf[..*len],
            CommandBytes::Borrowed(bytes) => bytes,
        }
    }
}

/// One decoded instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction<'a> {
    Begin,
    End,
    /// Milliseconds
    Delay(u8),
    /// Immediate command (if any) followed by buffered data (possibly empty)
    Transfer {
        command: Option<Command<'a>>,
        data: &'a [u8],
    },
    /// Byte with no defined meaning; skipped
    Unknown(u8),
}

/// An instruction and where it started in the stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded<'a> {
    pub offset: usize,
    pub instruction: Instruction<'a>,
}

/// Iterator over the instructions of a stream.
///
/// Yields `Err(TruncatedInstruction)` once if an instruction's operands run
/// past the end of the stream, then stops.
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    stream: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(stream: &'a [u8]) -> Self {
        Self { stream, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(n)?;
        let bytes = self.stream.get(self.pos..end)?;
        self.pos = end;
        Some(bytes)
    }

    fn take_byte(&mut self) -> Option<u8> {
        self.take(1).map(|b| b[0])
    }

    fn take_prefixed(&mut self) -> Option<&'a [u8]> {
        let len = self.take_byte()? as usize;
        self.take(len)
    }

    fn decode_operands(&mut self, action: Action) -> Option<Instruction<'a>> {
        let instruction = match action {
            Action::Begin => Instruction::Begin,
            Action::End => Instruction::End,
            Action::Delay => Instruction::Delay(self.take_byte()?),
            Action::Transfer { command, data } => {
                let command = match command {
                    CommandOperand::None => None,
                    CommandOperand::Byte => Some(Command::Byte(self.take_byte()?)),
                    CommandOperand::Word => {
                        let b = self.take(2)?;
                        Some(Command::Word(u16::from_be_bytes([b[0], b[1]])))
                    }
                    CommandOperand::Prefixed => Some(Command::Bytes(self.take_prefixed()?)),
                };
                let data = match data {
                    DataOperand::None => &[][..],
                    DataOperand::Fixed(n) => self.take(n)?,
                    DataOperand::Prefixed => self.take_prefixed()?,
                };
                Instruction::Transfer { command, data }
            }
        };
        Some(instruction)
    }
}

impl<'a> Iterator for Decoder<'a> {
    type Item = Result<Decoded<'a>, PanelError>;

    fn next(&mut self) -> Option<Self::Item> {
        let offset = self.pos;
        let byte = self.take_byte()?;

        let Some(opcode) = Opcode::from_byte(byte) else {
            return Some(Ok(Decoded {
                offset,
                instruction: Instruction::Unknown(byte),
            }));
        };

        match self.decode_operands(opcode.action()) {
            Some(instruction) => Some(Ok(Decoded {
                offset,
                instruction,
            })),
            None => {
                self.pos = self.stream.len();
                Some(Err(PanelError::TruncatedInstruction {
                    offset,
                    opcode: byte,
                }))
            }
        }
    }
}

/// Decode a whole stream.
pub fn decode(stream: &[u8]) -> Result<Vec<Decoded<'_>>, PanelError> {
    Decoder::new(stream).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instructions(stream: &[u8]) -> Vec<Instruction<'_>> {
        decode(stream).unwrap().into_iter().map(|d| d.instruction).collect()
    }

    #[test]
    fn test_decode_simple_session() {
        let stream = [0, 4, 0x11, 4, 0x22, 11];
        let decoded = decode(&stream).unwrap();

        let offsets: Vec<usize> = decoded.iter().map(|d| d.offset).collect();
        assert_eq!(offsets, vec![0, 1, 3, 5]);
        assert_eq!(
            decoded[1].instruction,
            Instruction::Transfer {
                command: None,
                data: &[0x11]
            }
        );
    }

    #[test]
    fn test_decode_command16_is_big_endian() {
        assert_eq!(
            instructions(&[2, 0x12, 0x34]),
            vec![Instruction::Transfer {
                command: Some(Command::Word(0x1234)),
                data: &[]
            }]
        );
        assert_eq!(Command::Word(0x1234).wire_bytes().as_ref(), &[0x12, 0x34]);
    }

    #[test]
    fn test_decode_prefixed_operands() {
        let stream = [3, 2, 0xAA, 0xBB, 9, 0xE0, 3, 1, 2, 3];
        assert_eq!(
            instructions(&stream),
            vec![
                Instruction::Transfer {
                    command: Some(Command::Bytes(&[0xAA, 0xBB])),
                    data: &[]
                },
                Instruction::Transfer {
                    command: Some(Command::Byte(0xE0)),
                    data: &[1, 2, 3]
                },
            ]
        );
    }

    #[test]
    fn test_decode_zero_length_prefix() {
        assert_eq!(
            instructions(&[6, 0, 11]),
            vec![
                Instruction::Transfer {
                    command: None,
                    data: &[]
                },
                Instruction::End
            ]
        );
    }

    #[test]
    fn test_unknown_consumes_one_byte() {
        assert_eq!(
            instructions(&[0xFF, 12, 5, 0x42]),
            vec![
                Instruction::Unknown(0xFF),
                Instruction::Delay(5),
                Instruction::Unknown(0x42)
            ]
        );
    }

    #[test]
    fn test_truncated_stream() {
        let mut decoder = Decoder::new(&[0, 6, 5, 1, 2]);
        assert!(matches!(decoder.next(), Some(Ok(_))));
        assert!(matches!(
            decoder.next(),
            Some(Err(PanelError::TruncatedInstruction { offset: 1, opcode: 6 }))
        ));
        assert!(decoder.next().is_none());
    }

    #[test]
    fn test_truncated_fixed_operand() {
        assert!(matches!(
            decode(&[10, 0x00, 0x2A, 0x01]),
            Err(PanelError::TruncatedInstruction { offset: 0, opcode: 10 })
        ));
    }

    #[test]
    fn test_empty_stream() {
        assert!(decode(&[]).unwrap().is_empty());
    }
}
