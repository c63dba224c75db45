//! # Operation Interpreter
//!
//! Executes operation streams against the bus, driving the two side-channel
//! pins around each transfer.
//!
//! ## Signalling
//!
//! ```text
//! BEGIN        DC ─ high        CS ─ low
//! COMMAND      DC ─ low  → [cmd bytes] → DC ─ high
//! DATA         (appended to the coalescing buffer)
//! END          [flush] →        CS ─ high
//! ```
//!
//! DC goes back to "data" after every command, even for commands that take
//! no data. Controller init tables rely on this.
//!
//! ## Coalescing Buffer
//!
//! Data bytes collect in a one-chunk buffer and go out as a single transfer
//! when:
//!
//! - the buffer fills up;
//! - an immediate command is about to be sent;
//! - the session ends;
//! - a bulk pixel write starts.
//!
//! ## Failure
//!
//! A transport error stops interpretation on the spot and is returned. Pins
//! are left where they were; callers end the session or re-initialise.

use tracing::{trace, warn};

use crate::delay::Delay;
use crate::error::PanelError;
use crate::ops::{Command, Decoder, Instruction};
use crate::pins::{Level, PanelPin, PinControl};
use crate::transport::{ChunkedTransfer, MAX_CHUNK_SIZE, SpiPrimitive};

/// What happened during one [`Interpreter::run`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Recognised instructions executed
    pub executed: usize,
    /// Opcodes that were skipped, as
    /// [`PanelError::UnknownInstruction`] diagnostics
    pub unknown: Vec<UnknownOp>,
}

/// A skipped opcode byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownOp {
    pub offset: usize,
    pub opcode: u8,
}

impl UnknownOp {
    pub fn to_error(self) -> PanelError {
        PanelError::UnknownInstruction {
            offset: self.offset,
            opcode: self.opcode,
        }
    }
}

impl RunReport {
    pub fn is_clean(&self) -> bool {
        self.unknown.is_empty()
    }
}

/// # Bus Interpreter
///
/// Owns the chunked sender, the pin collaborator, the delay provider and the
/// coalescing buffer. One interpreter drives one panel from one thread.
///
/// ## Example
///
/// ```
/// use panelbus::interpreter::Interpreter;
/// use panelbus::mock::{EventLog, RecordingBus, RecordingDelay, RecordingPins};
/// use panelbus::ops::OpStream;
/// use panelbus::transport::{BusSettings, ChunkedTransfer};
///
/// let log = EventLog::new();
/// let bus = ChunkedTransfer::open(RecordingBus::new(&log), BusSettings::default(), 1024)?;
/// let mut interp = Interpreter::new(bus, RecordingPins::new(&log), RecordingDelay::new(&log));
///
/// let mut ops = OpStream::new();
/// ops.begin().command_data(0x3A, 0x55).end();
/// let report = interp.run(ops.as_bytes())?;
///
/// assert!(report.is_clean());
/// assert_eq!(log.transfers(), vec![vec![0x3A], vec![0x55]]);
/// # Ok::<(), panelbus::PanelError>(())
/// ```
pub struct Interpreter<S: SpiPrimitive, P: PinControl, D: Delay> {
    bus: ChunkedTransfer<S>,
    pins: P,
    delay: D,
    buffer: Vec<u8>,
}

impl<S: SpiPrimitive, P: PinControl, D: Delay> Interpreter<S, P, D> {
    pub fn new(bus: ChunkedTransfer<S>, pins: P, delay: D) -> Self {
        Self {
            bus,
            pins,
            delay,
            buffer: Vec::with_capacity(MAX_CHUNK_SIZE),
        }
    }

    /// Execute every instruction in `stream`.
    ///
    /// Unknown opcodes are skipped and reported; transport failures and
    /// truncated instructions abort the run.
    pub fn run(&mut self, stream: &[u8]) -> Result<RunReport, PanelError> {
        let mut report = RunReport::default();

        for decoded in Decoder::new(stream) {
            let decoded = decoded?;
            match decoded.instruction {
                Instruction::Unknown(opcode) => {
                    warn!(
                        offset = decoded.offset,
                        "unknown operation 0x{:02X}, skipping", opcode
                    );
                    report.unknown.push(UnknownOp {
                        offset: decoded.offset,
                        opcode,
                    });
                }
                instruction => {
                    self.execute(instruction)?;
                    report.executed += 1;
                }
            }
        }

        Ok(report)
    }

    /// Execute one decoded instruction.
    pub fn execute(&mut self, instruction: Instruction<'_>) -> Result<(), PanelError> {
        trace!(?instruction, "execute");
        match instruction {
            Instruction::Begin => self.begin_write(),
            Instruction::End => self.end_write()?,
            Instruction::Delay(ms) => self.delay_ms(ms as u32),
            Instruction::Transfer { command, data } => {
                if let Some(command) = command {
                    self.send_command(command)?;
                }
                self.write_bytes(data)?;
            }
            Instruction::Unknown(opcode) => {
                warn!("unknown operation 0x{:02X}, skipping", opcode);
            }
        }
        Ok(())
    }

    // ========== Session ==========

    /// Reset the buffer, DC to data, CS asserted.
    pub fn begin_write(&mut self) {
        self.buffer.clear();
        self.pins.set_pin(PanelPin::DataCommand, Level::High);
        self.pins.set_pin(PanelPin::ChipSelect, Level::Low);
    }

    /// Flush pending data, then release CS.
    pub fn end_write(&mut self) -> Result<(), PanelError> {
        self.flush()?;
        self.pins.set_pin(PanelPin::ChipSelect, Level::High);
        Ok(())
    }

    pub fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }

    // ========== Commands ==========

    pub fn write_command(&mut self, cmd: u8) -> Result<(), PanelError> {
        self.send_command(Command::Byte(cmd))
    }

    /// Sent most significant byte first
    pub fn write_command16(&mut self, cmd: u16) -> Result<(), PanelError> {
        self.send_command(Command::Word(cmd))
    }

    pub fn write_command_bytes(&mut self, bytes: &[u8]) -> Result<(), PanelError> {
        self.send_command(Command::Bytes(bytes))
    }

    fn send_command(&mut self, command: Command<'_>) -> Result<(), PanelError> {
        self.flush()?;

        self.pins.set_pin(PanelPin::DataCommand, Level::Low);
        self.bus.send_immediate(command.wire_bytes().as_ref())?;
        self.pins.set_pin(PanelPin::DataCommand, Level::High);
        Ok(())
    }

    // ========== Data ==========

    pub fn write_data(&mut self, byte: u8) -> Result<(), PanelError> {
        self.write_bytes(&[byte])
    }

    /// Buffered most significant byte first
    pub fn write_data16(&mut self, word: u16) -> Result<(), PanelError> {
        self.write_bytes(&word.to_be_bytes())
    }

    /// Append to the coalescing buffer, flushing each time it fills up.
    pub fn write_bytes(&mut self, mut bytes: &[u8]) -> Result<(), PanelError> {
        while !bytes.is_empty() {
            let room = MAX_CHUNK_SIZE - self.buffer.len();
            let (head, tail) = bytes.split_at(room.min(bytes.len()));
            self.buffer.extend_from_slice(head);
            bytes = tail;

            if self.buffer.len() == MAX_CHUNK_SIZE {
                self.flush()?;
            }
        }
        Ok(())
    }

    /// Flush pending data and send `payload` as one chunked transfer.
    ///
    /// Used for frame data, which is far larger than the coalescing buffer.
    pub fn write_pixels(&mut self, payload: &[u8]) -> Result<(), PanelError> {
        self.flush()?;
        self.bus.send(payload)
    }

    /// Send whatever is in the coalescing buffer.
    pub fn flush(&mut self) -> Result<(), PanelError> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let result = self.bus.send_immediate(&self.buffer);
        self.buffer.clear();
        result
    }

    /// Bytes waiting in the coalescing buffer
    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }

    // ========== Collaborators ==========

    pub fn pins_mut(&mut self) -> &mut P {
        &mut self.pins
    }

    pub fn bus(&self) -> &ChunkedTransfer<S> {
        &self.bus
    }

    /// Take the interpreter apart.
    pub fn into_parts(self) -> (ChunkedTransfer<S>, P, D) {
        (self.bus, self.pins, self.delay)
    }
}

// ============================================================================
// TESTS
// ============================================================================
