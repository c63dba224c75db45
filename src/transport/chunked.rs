//! # Chunked Transfer Engine
//!
//! Splits an arbitrary payload into [`MAX_CHUNK_SIZE`] slices and hands the
//! whole descriptor list to the [`BusAdapter`], which packs them into
//! transport calls.
//!
//! ## Descriptor Planning
//!
//! All descriptors for a payload are filled before the first transport call.
//! The adapter then packs up to
//! [`MAX_CHUNKS_PER_CALL`](super::MAX_CHUNKS_PER_CALL) neighbouring chunks
//! into each call, so a full frame spans several calls.
//!
//! ```text
//! payload (600 bytes)
//! ├── c0: [0, 256)
//! ├── c1: [256, 512)
//! └── c2: [512, 600)
//! ```

use super::adapter::{BusAdapter, MAX_CHUNK_SIZE, chunks_for};
use super::primitive::{BusSettings, ChunkDescriptor, SpiPrimitive};
use crate::error::PanelError;

/// Payload sender built on an open [`BusAdapter`].
pub struct ChunkedTransfer<P: SpiPrimitive> {
    adapter: BusAdapter<P>,
}

impl<P: SpiPrimitive> ChunkedTransfer<P> {
    pub fn new(adapter: BusAdapter<P>) -> Self {
        Self { adapter }
    }

    /// Open a bus and wrap it. See [`BusAdapter::open`].
    pub fn open(
        primitive: P,
        settings: BusSettings,
        max_total_bytes: usize,
    ) -> Result<Self, PanelError> {
        BusAdapter::open(primitive, settings, max_total_bytes).map(Self::new)
    }

    /// Largest payload accepted by [`Self::send`]
    pub fn capacity(&self) -> usize {
        self.adapter.max_total_bytes()
    }

    pub fn adapter(&self) -> &BusAdapter<P> {
        &self.adapter
    }

    /// Close the underlying bus. See [`BusAdapter::close`].
    pub fn close(self) -> P {
        self.adapter.close()
    }

    /// Send `buffer` as one logical transfer.
    ///
    /// Empty buffers are a no-op. Buffers larger than [`Self::capacity`] fail
    /// with [`PanelError::BufferTooLarge`] before anything touches the bus.
    pub fn send(&mut self, buffer: &[u8]) -> Result<(), PanelError> {
        let len = buffer.len();
        if len == 0 {
            return Ok(());
        }

        let capacity = self.capacity();
        if len > capacity {
            return Err(PanelError::BufferTooLarge { len, capacity });
        }

        let count = plan_chunks(len, self.adapter.descriptors_mut());
        self.adapter.transfer(count, buffer)?;
        Ok(())
    }

    /// Send a short payload through the adapter's scratch buffer.
    ///
    /// Used for command bytes and coalesced data flushes. Neither counts
    /// against the declared capacity. Anything longer than one chunk takes
    /// the regular [`Self::send`] path.
    pub fn send_immediate(&mut self, bytes: &[u8]) -> Result<(), PanelError> {
        if bytes.len() > MAX_CHUNK_SIZE {
            return self.send(bytes);
        }
        self.adapter.transfer_scratch(bytes)?;
        Ok(())
    }
}

/// Fill `descriptors` so they partition `[0, len)` into chunk-sized ranges.
///
/// Returns the number of descriptors used. The caller guarantees there are
/// enough descriptors for `len`.
fn plan_chunks(len: usize, descriptors: &mut [ChunkDescriptor]) -> usize {
    let total_chunks = chunks_for(len);

    for (i, desc) in descriptors[..total_chunks].iter_mut().enumerate() {
        let offset = i * MAX_CHUNK_SIZE;
        desc.offset = offset;
        desc.len = (len - offset).min(MAX_CHUNK_SIZE);
    }

    total_chunks
}

// ============================================================================
// TESTS
// ============================================================================
