//! # Stream Builder
//!
//! Typed producer for operation streams, so callers don't hand-assemble
//! opcode bytes.
//!
//! ```
//! use panelbus::ops::OpStream;
//!
//! let mut ops = OpStream::new();
//! ops.begin().command_data(0x3A, 0x55).command(0x29).end().delay(120);
//!
//! assert_eq!(ops.as_bytes(), &[0, 7, 0x3A, 0x55, 1, 0x29, 11, 12, 120]);
//! ```

use super::opcode::Opcode;

/// Longest operand a length prefix can describe
pub const MAX_PREFIXED_LEN: usize = u8::MAX as usize;

/// An encoded operation stream under construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpStream {
    bytes: Vec<u8>,
}

impl OpStream {
    pub fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    fn op(&mut self, opcode: Opcode) -> &mut Self {
        self.bytes.push(opcode.as_byte());
        self
    }

    fn prefixed(&mut self, bytes: &[u8]) -> &mut Self {
        assert!(
            bytes.len() <= MAX_PREFIXED_LEN,
            "operand of {} bytes exceeds length prefix",
            bytes.len()
        );
        self.bytes.push(bytes.len() as u8);
        self.bytes.extend_from_slice(bytes);
        self
    }

    // ========== Session ==========

    pub fn begin(&mut self) -> &mut Self {
        self.op(Opcode::Begin)
    }

    pub fn end(&mut self) -> &mut Self {
        self.op(Opcode::End)
    }

    pub fn delay(&mut self, ms: u8) -> &mut Self {
        self.op(Opcode::Delay);
        self.bytes.push(ms);
        self
    }

    // ========== Commands ==========

    pub fn command(&mut self, cmd: u8) -> &mut Self {
        self.op(Opcode::Command8);
        self.bytes.push(cmd);
        self
    }

    pub fn command16(&mut self, cmd: u16) -> &mut Self {
        self.op(Opcode::Command16);
        self.bytes.extend_from_slice(&cmd.to_be_bytes());
        self
    }

    /// Multi-byte command. Panics past 255 bytes.
    pub fn command_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.op(Opcode::CommandBytes);
        self.prefixed(bytes)
    }

    // ========== Data ==========

    pub fn data(&mut self, byte: u8) -> &mut Self {
        self.op(Opcode::Data8);
        self.bytes.push(byte);
        self
    }

    /// Two data bytes, most significant first
    pub fn data16(&mut self, word: u16) -> &mut Self {
        self.op(Opcode::Data16);
        self.bytes.extend_from_slice(&word.to_be_bytes());
        self
    }

    /// Data bytes of any length, split into several instructions as needed.
    pub fn data_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        for chunk in bytes.chunks(MAX_PREFIXED_LEN) {
            self.op(Opcode::DataBytes);
            self.prefixed(chunk);
        }
        self
    }

    // ========== Composites ==========

    pub fn command_data(&mut self, cmd: u8, byte: u8) -> &mut Self {
        self.op(Opcode::Command8Data8);
        self.bytes.extend_from_slice(&[cmd, byte]);
        self
    }

    pub fn command_data16(&mut self, cmd: u8, word: u16) -> &mut Self {
        self.op(Opcode::Command8Data16);
        self.bytes.push(cmd);
        self.bytes.extend_from_slice(&word.to_be_bytes());
        self
    }

    /// Command followed by up to 255 data bytes. Panics past 255 bytes.
    pub fn command_with_bytes(&mut self, cmd: u8, bytes: &[u8]) -> &mut Self {
        self.op(Opcode::Command8Bytes);
        self.bytes.push(cmd);
        self.prefixed(bytes)
    }

    pub fn command16_data16(&mut self, cmd: u16, word: u16) -> &mut Self {
        self.op(Opcode::Command16Data16);
        self.bytes.extend_from_slice(&cmd.to_be_bytes());
        self.bytes.extend_from_slice(&word.to_be_bytes());
        self
    }

    // ========== Access ==========

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl From<OpStream> for Vec<u8> {
    fn from(stream: OpStream) -> Self {
        stream.bytes
    }
}

impl AsRef<[u8]> for OpStream {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}
