//! # Operation Streams
//!
//! A compact bytecode for panel bus traffic. Init tables and drawing code
//! produce a stream; the [`Interpreter`](crate::interpreter::Interpreter)
//! executes it.
//!
//! ## Example
//!
//! ```
//! use panelbus::ops::{Instruction, OpStream, decode};
//!
//! let mut ops = OpStream::new();
//! ops.begin().command(0x11).end();
//!
//! let decoded = decode(ops.as_bytes())?;
//! assert_eq!(decoded[0].instruction, Instruction::Begin);
//! assert_eq!(decoded.len(), 3);
//! # Ok::<(), panelbus::PanelError>(())
//! ```

pub mod decode;
pub mod opcode;
pub mod stream;

pub use decode::{Command, Decoded, Decoder, Instruction, decode};
pub use opcode::{Action, CommandOperand, DataOperand, Opcode};
pub use stream::OpStream;
