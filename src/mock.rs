//! # Recording Collaborators
//!
//! Hardware-free stand-ins for the SPI primitive, the pin lines and the
//! delay provider. All three append to one shared [`EventLog`] so tests can
//! assert on the exact interleaving of pin changes, bus traffic and waits.
//!
//! ```
//! use panelbus::mock::{BusEvent, EventLog, RecordingPins};
//! use panelbus::pins::{Level, PanelPin, PinControl};
//!
//! let log = EventLog::new();
//! let mut pins = RecordingPins::new(&log);
//! pins.set_pin(PanelPin::ChipSelect, Level::Low);
//! assert_eq!(log.events(), vec![BusEvent::Pin(PanelPin::ChipSelect, Level::Low)]);
//! ```

use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use crate::delay::Delay;
use crate::error::PanelError;
use crate::pins::{Level, PanelPin, PinControl};
use crate::transport::{BusSettings, ChunkDescriptor, SpiPrimitive};

/// Something observable that happened on the fake hardware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusEvent {
    /// A pin was driven to a level
    Pin(PanelPin, Level),
    /// One transport call; each inner vec is one chunk
    Submit(Vec<Vec<u8>>),
    /// A blocking delay in milliseconds
    Delay(u32),
}

/// Shared, ordered record of [`BusEvent`]s.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Rc<RefCell<Vec<BusEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: BusEvent) {
        self.events.borrow_mut().push(event);
    }

    /// Snapshot of everything recorded so far
    pub fn events(&self) -> Vec<BusEvent> {
        self.events.borrow().clone()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }

    /// Transport calls only, as chunk lists
    pub fn groups(&self) -> Vec<Vec<Vec<u8>>> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                BusEvent::Submit(chunks) => Some(chunks.clone()),
                _ => None,
            })
            .collect()
    }

    /// One entry per `send`-level transfer, with its chunks concatenated.
    ///
    /// Consecutive submits without a pin change or delay between them are
    /// treated as one transfer.
    pub fn transfers(&self) -> Vec<Vec<u8>> {
        let mut transfers = Vec::new();
        let mut current: Option<Vec<u8>> = None;

        for event in self.events.borrow().iter() {
            match event {
                BusEvent::Submit(chunks) => {
                    let buf = current.get_or_insert_with(Vec::new);
                    for chunk in chunks {
                        buf.extend_from_slice(chunk);
                    }
                }
                _ => {
                    if let Some(buf) = current.take() {
                        transfers.push(buf);
                    }
                }
            }
        }
        if let Some(buf) = current {
            transfers.push(buf);
        }

        transfers
    }

    /// Every byte that went over the bus, in order
    pub fn sent_bytes(&self) -> Vec<u8> {
        self.groups().into_iter().flatten().flatten().collect()
    }

    /// Pin changes only
    pub fn pin_changes(&self) -> Vec<(PanelPin, Level)> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                BusEvent::Pin(pin, level) => Some((*pin, *level)),
                _ => None,
            })
            .collect()
    }
}

// ============================================================================
// SPI PRIMITIVE
// ============================================================================

/// Records every submitted chunk group. Can be told to fail.
#[derive(Debug)]
pub struct RecordingBus {
    log: EventLog,
    configured: Option<BusSettings>,
    fail_configure: bool,
    fail_on_call: Option<usize>,
    calls: usize,
}

impl RecordingBus {
    pub fn new(log: &EventLog) -> Self {
        Self {
            log: log.clone(),
            configured: None,
            fail_configure: false,
            fail_on_call: None,
            calls: 0,
        }
    }

    /// Reject [`SpiPrimitive::configure`].
    pub fn fail_configure(mut self) -> Self {
        self.fail_configure = true;
        self
    }

    /// Fail the `n`th submit (1-based). Later calls succeed again.
    pub fn fail_on_call(mut self, n: usize) -> Self {
        self.fail_on_call = Some(n);
        self
    }

    /// Settings applied by the last successful configure
    pub fn configured(&self) -> Option<BusSettings> {
        self.configured
    }

    /// Number of submit calls, including failed ones
    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl SpiPrimitive for RecordingBus {
    fn configure(&mut self, settings: &BusSettings) -> io::Result<()> {
        if self.fail_configure {
            return Err(io::Error::new(io::ErrorKind::Unsupported, "mode rejected"));
        }
        self.configured = Some(*settings);
        Ok(())
    }

    fn submit(&mut self, group: &[ChunkDescriptor], source: &[u8]) -> io::Result<usize> {
        self.calls += 1;
        if self.fail_on_call == Some(self.calls) {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "injected failure"));
        }

        let chunks: Vec<Vec<u8>> = group.iter().map(|d| source[d.range()].to_vec()).collect();
        let sent = chunks.iter().map(|c| c.len()).sum();
        self.log.push(BusEvent::Submit(chunks));
        Ok(sent)
    }
}

// ============================================================================
// PINS
// ============================================================================

/// Records pin changes.
#[derive(Debug)]
pub struct RecordingPins {
    log: EventLog,
    initialized: bool,
    fail_init: bool,
}

impl RecordingPins {
    pub fn new(log: &EventLog) -> Self {
        Self {
            log: log.clone(),
            initialized: false,
            fail_init: false,
        }
    }

    /// Make [`PinControl::init`] fail.
    pub fn fail_init(mut self) -> Self {
        self.fail_init = true;
        self
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}

impl PinControl for RecordingPins {
    fn init(&mut self) -> Result<(), PanelError> {
        if self.fail_init {
            return Err(PanelError::Pins("injected failure".into()));
        }
        self.initialized = true;
        Ok(())
    }

    fn deinit(&mut self) {
        self.initialized = false;
    }

    fn set_pin(&mut self, pin: PanelPin, level: Level) {
        self.log.push(BusEvent::Pin(pin, level));
    }
}

// ============================================================================
// DELAY
// ============================================================================

/// Records delays instead of sleeping.
#[derive(Debug)]
pub struct RecordingDelay {
    log: EventLog,
}

impl RecordingDelay {
    pub fn new(log: &EventLog) -> Self {
        Self { log: log.clone() }
    }
}

impl Delay for RecordingDelay {
    fn delay_ms(&mut self, ms: u32) {
        self.log.push(BusEvent::Delay(ms));
    }
}
