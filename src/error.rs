//! # Error Types
//!
//! This module defines error types used throughout the panelbus library.

use thiserror::Error;

/// Main error type for panelbus operations
#[derive(Debug, Error)]
pub enum PanelError {
    /// The SPI device could not be opened or configured (speed, word size, mode)
    #[error("Transport unavailable: {0}")]
    TransportUnavailable(String),

    /// Payload exceeds the capacity declared when the bus was opened.
    /// Rejected before any bus activity.
    #[error("Buffer too large: {len} bytes exceeds bus capacity of {capacity} bytes")]
    BufferTooLarge { len: usize, capacity: usize },

    /// A chunk group failed. `sent` counts the bytes confirmed by the
    /// groups submitted before it.
    #[error("Transfer failed in chunk group {group} after {sent} bytes: {source}")]
    TransferFailed {
        group: usize,
        sent: usize,
        #[source]
        source: std::io::Error,
    },

    /// Unrecognised opcode in an operation stream. Never returned by the
    /// interpreter, only recorded in its run report.
    #[error("Unknown instruction 0x{opcode:02X} at offset {offset}")]
    UnknownInstruction { offset: usize, opcode: u8 },

    /// Operands of the instruction at `offset` run past the end of the stream
    #[error("Truncated instruction 0x{opcode:02X} at offset {offset}")]
    TruncatedInstruction { offset: usize, opcode: u8 },

    /// GPIO line request or release failed
    #[error("Pin error: {0}")]
    Pins(String),

    /// Frame data doesn't match the panel geometry
    #[error("Frame error: {0}")]
    Frame(String),

    /// Invalid or unreadable configuration
    #[error("Config error: {0}")]
    Config(String),

    /// Image loading error
    #[error("Image error: {0}")]
    Image(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
