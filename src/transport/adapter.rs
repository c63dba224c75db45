//! # Transport Adapter
//!
//! Owns an open [`SpiPrimitive`] together with the two limits the kernel
//! imposes on it:
//!
//! - [`MAX_CHUNK_SIZE`]: bytes per transfer chunk
//! - [`MAX_CHUNKS_PER_CALL`]: chunks per `SPI_IOC_MESSAGE` ioctl
//!
//! The descriptor array and a one-chunk scratch buffer are allocated once at
//! [`BusAdapter::open`] and reused for every transfer.
//!
//! ## Grouping
//!
//! ```text
//! descriptors: [c0 c1 c2 ... c9 | c10 ... c19 | c20 ... c24]
//!               └── group 0 ──┘   └─ group 1 ─┘  └ group 2 ┘
//! ```
//!
//! Groups are submitted in order. The first failing group aborts the
//! transfer; nothing after it is submitted.

use tracing::{debug, error};

use super::primitive::{BusSettings, ChunkDescriptor, SpiPrimitive};
use crate::error::PanelError;

/// Maximum bytes in one transfer chunk
pub const MAX_CHUNK_SIZE: usize = 256;

/// Maximum chunks submitted in one transport call
pub const MAX_CHUNKS_PER_CALL: usize = 10;

/// Number of chunks needed to cover `len` bytes
#[inline]
pub fn chunks_for(len: usize) -> usize {
    len.div_ceil(MAX_CHUNK_SIZE)
}

/// # Bus Handle
///
/// An open, configured transport with pre-allocated chunk descriptors.
///
/// ## Example
///
/// ```
/// use panelbus::mock::{EventLog, RecordingBus};
/// use panelbus::transport::{BusAdapter, BusSettings};
///
/// let log = EventLog::new();
/// let bus = BusAdapter::open(RecordingBus::new(&log), BusSettings::default(), 1000)?;
/// assert_eq!(bus.chunk_capacity(), 4);
/// # Ok::<(), panelbus::PanelError>(())
/// ```
pub struct BusAdapter<P: SpiPrimitive> {
    primitive: P,
    settings: BusSettings,
    max_total_bytes: usize,
    descriptors: Vec<ChunkDescriptor>,
    scratch: Vec<u8>,
}

impl<P: SpiPrimitive> BusAdapter<P> {
    /// Configure the primitive and allocate descriptors for payloads of up
    /// to `max_total_bytes`.
    ///
    /// At least one descriptor is always allocated so that commands and
    /// coalesced data flushes still go out on a bus opened with a zero
    /// capacity.
    ///
    /// ## Errors
    ///
    /// [`PanelError::TransportUnavailable`] if the primitive rejects the
    /// settings.
    pub fn open(
        mut primitive: P,
        settings: BusSettings,
        max_total_bytes: usize,
    ) -> Result<Self, PanelError> {
        primitive.configure(&settings).map_err(|e| {
            PanelError::TransportUnavailable(format!("Failed to configure bus: {}", e))
        })?;

        let chunk_count = chunks_for(max_total_bytes).max(1);
        let template = ChunkDescriptor {
            offset: 0,
            len: 0,
            speed_hz: settings.speed_hz,
            bits_per_word: settings.bits_per_word,
        };

        debug!(
            max_total_bytes,
            chunk_count,
            speed_hz = settings.speed_hz,
            "bus opened"
        );

        Ok(Self {
            primitive,
            settings,
            max_total_bytes,
            descriptors: vec![template; chunk_count],
            scratch: vec![0; MAX_CHUNK_SIZE],
        })
    }

    /// Release the descriptor and scratch arrays and hand back the primitive.
    pub fn close(self) -> P {
        debug!("bus closed");
        self.primitive
    }

    pub fn settings(&self) -> &BusSettings {
        &self.settings
    }

    /// Capacity in bytes declared at open time
    pub fn max_total_bytes(&self) -> usize {
        self.max_total_bytes
    }

    /// Number of pre-allocated chunk descriptors
    pub fn chunk_capacity(&self) -> usize {
        self.descriptors.len()
    }

    pub fn primitive(&self) -> &P {
        &self.primitive
    }

    /// Descriptor array for the engine to fill before [`Self::transfer`].
    pub(crate) fn descriptors_mut(&mut self) -> &mut [ChunkDescriptor] {
        &mut self.descriptors
    }

    /// Submit `descriptors[..count]` against `source`, at most
    /// [`MAX_CHUNKS_PER_CALL`] per call. Returns bytes sent.
    pub fn transfer(&mut self, count: usize, source: &[u8]) -> Result<usize, PanelError> {
        let count = count.min(self.descriptors.len());
        dispatch(&mut self.primitive, &self.descriptors[..count], source)
    }

    /// Copy `bytes` into the scratch buffer and send them as one chunk.
    ///
    /// `bytes` must fit in a single chunk.
    pub fn transfer_scratch(&mut self, bytes: &[u8]) -> Result<usize, PanelError> {
        if bytes.len() > MAX_CHUNK_SIZE {
            return Err(PanelError::BufferTooLarge {
                len: bytes.len(),
                capacity: MAX_CHUNK_SIZE,
            });
        }
        if bytes.is_empty() {
            return Ok(0);
        }

        let len = bytes.len();
        self.scratch[..len].copy_from_slice(bytes);
        self.descriptors[0].offset = 0;
        self.descriptors[0].len = len;

        dispatch(&mut self.primitive, &self.descriptors[..1], &self.scratch[..len])
    }
}

/// Walk `descriptors` in groups, stopping at the first failure.
fn dispatch<P: SpiPrimitive>(
    primitive: &mut P,
    descriptors: &[ChunkDescriptor],
    source: &[u8],
) -> Result<usize, PanelError> {
    let mut sent = 0;

    for (group, chunk_group) in descriptors.chunks(MAX_CHUNKS_PER_CALL).enumerate() {
        match primitive.submit(chunk_group, source) {
            Ok(n) => sent += n,
            Err(e) => {
                error!(
                    group,
                    chunks_in_group = chunk_group.len(),
                    total_chunks = descriptors.len(),
                    sent,
                    "chunk group failed: {}",
                    e
                );
                return Err(PanelError::TransferFailed {
                    group,
                    sent,
                    source: e,
                });
            }
        }
    }

    Ok(sent)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{BusEvent, EventLog, RecordingBus};

    fn fill(adapter: &mut BusAdapter<RecordingBus>, len: usize) -> usize {
        let count = chunks_for(len);
        for (i, desc) in adapter.descriptors_mut()[..count].iter_mut().enumerate() {
            desc.offset = i * MAX_CHUNK_SIZE;
            desc.len = (len - desc.offset).min(MAX_CHUNK_SIZE);
        }
        count
    }

    #[test]
    fn test_chunks_for() {
        assert_eq!(chunks_for(0), 0);
        assert_eq!(chunks_for(1), 1);
        assert_eq!(chunks_for(256), 1);
        assert_eq!(chunks_for(257), 2);
        assert_eq!(chunks_for(320 * 480 * 2), 1200);
    }

    #[test]
    fn test_open_allocates_descriptors() {
        let log = EventLog::new();
        let adapter = BusAdapter::open(RecordingBus::new(&log), BusSettings::default(), 1000).unwrap();
        assert_eq!(adapter.chunk_capacity(), 4);
        assert_eq!(adapter.max_total_bytes(), 1000);
        assert!(adapter.descriptors.iter().all(|d| d.speed_hz == 50_000_000));
        assert!(adapter.descriptors.iter().all(|d| d.bits_per_word == 8));
        assert_eq!(adapter.scratch.len(), MAX_CHUNK_SIZE);
    }

    #[test]
    fn test_open_zero_capacity_keeps_one_descriptor() {
        let log = EventLog::new();
        let adapter = BusAdapter::open(RecordingBus::new(&log), BusSettings::default(), 0).unwrap();
        assert_eq!(adapter.chunk_capacity(), 1);
    }

    #[test]
    fn test_open_configure_failure() {
        let log = EventLog::new();
        let bus = RecordingBus::new(&log).fail_configure();
        let result = BusAdapter::open(bus, BusSettings::default(), 1000);
        assert!(matches!(result, Err(PanelError::TransportUnavailable(_))));
    }

    #[test]
    fn test_open_records_settings() {
        let log = EventLog::new();
        let settings = BusSettings {
            speed_hz: 1_000_000,
            ..Default::default()
        };
        let adapter = BusAdapter::open(RecordingBus::new(&log), settings, 10).unwrap();
        assert_eq!(adapter.primitive().configured(), Some(settings));
    }

    #[test]
    fn test_groups_never_exceed_limit() {
        let log = EventLog::new();
        let len = 25 * MAX_CHUNK_SIZE;
        let mut adapter = BusAdapter::open(RecordingBus::new(&log), BusSettings::default(), len).unwrap();
        let data = vec![0xAB; len];

        let count = fill(&mut adapter, len);
        let sent = adapter.transfer(count, &data).unwrap();

        assert_eq!(sent, len);
        let sizes: Vec<usize> = log.groups().iter().map(|g| g.len()).collect();
        assert_eq!(sizes, vec![10, 10, 5]);
    }

    #[test]
    fn test_invocation_count_is_ceil() {
        for chunks in [1, 9, 10, 11, 20, 21, 37] {
            let log = EventLog::new();
            let len = chunks * MAX_CHUNK_SIZE;
            let mut adapter =
                BusAdapter::open(RecordingBus::new(&log), BusSettings::default(), len).unwrap();
            let data = vec![0; len];

            let count = fill(&mut adapter, len);
            adapter.transfer(count, &data).unwrap();

            assert_eq!(log.groups().len(), chunks.div_ceil(MAX_CHUNKS_PER_CALL));
        }
    }

    #[test]
    fn test_failure_on_second_group_stops() {
        let log = EventLog::new();
        let len = 25 * MAX_CHUNK_SIZE;
        let bus = RecordingBus::new(&log).fail_on_call(2);
        let mut adapter = BusAdapter::open(bus, BusSettings::default(), len).unwrap();
        let data = vec![0; len];

        let count = fill(&mut adapter, len);
        let err = adapter.transfer(count, &data).unwrap_err();

        match err {
            PanelError::TransferFailed { group, sent, .. } => {
                assert_eq!(group, 1);
                assert_eq!(sent, 10 * MAX_CHUNK_SIZE);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        // Only the first group made it onto the bus
        assert_eq!(log.groups().len(), 1);
    }

    #[test]
    fn test_transfer_scratch() {
        let log = EventLog::new();
        let mut adapter = BusAdapter::open(RecordingBus::new(&log), BusSettings::default(), 0).unwrap();

        let sent = adapter.transfer_scratch(&[0x2A, 0x00]).unwrap();

        assert_eq!(sent, 2);
        assert_eq!(log.events(), vec![BusEvent::Submit(vec![vec![0x2A, 0x00]])]);
    }

    #[test]
    fn test_transfer_scratch_too_large() {
        let log = EventLog::new();
        let mut adapter = BusAdapter::open(RecordingBus::new(&log), BusSettings::default(), 0).unwrap();

        let result = adapter.transfer_scratch(&[0; MAX_CHUNK_SIZE + 1]);

        assert!(matches!(result, Err(PanelError::BufferTooLarge { .. })));
        assert!(log.events().is_empty());
    }

    #[test]
    fn test_close_returns_primitive() {
        let log = EventLog::new();
        let adapter = BusAdapter::open(RecordingBus::new(&log), BusSettings::default(), 10).unwrap();
        let bus = adapter.close();
        assert!(bus.configured().is_some());
    }
}
