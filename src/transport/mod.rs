//! # Bus Transport Layer
//!
//! Everything between a byte payload and the SPI wire.
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ ChunkedTransfer  │ ──► │  BusAdapter  │ ──► │ SpiPrimitive │
//! │ (split payload)  │     │ (group calls)│     │  (spidev)    │
//! └──────────────────┘     └──────────────┘     └──────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`primitive`]: the block-transfer trait and chunk descriptors
//! - [`adapter`]: bus handle, chunk limits, grouped dispatch
//! - [`chunked`]: payload splitting
//! - [`spidev`]: Linux `/dev/spidev*` backend

pub mod adapter;
pub mod chunked;
pub mod primitive;
pub mod spidev;

pub use adapter::{BusAdapter, MAX_CHUNK_SIZE, MAX_CHUNKS_PER_CALL, chunks_for};
pub use chunked::ChunkedTransfer;
pub use primitive::{BusSettings, ChunkDescriptor, SpiMode, SpiPrimitive};
pub use spidev::Spidev;
