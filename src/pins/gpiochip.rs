//! # GPIO Character Device Lines
//!
//! Drives the panel's side-channel pins through `/dev/gpiochipN` using the
//! [`gpio_cdev`] crate:
//!
//! 1. [`Chip::new`] opens `/dev/gpiochipN`
//! 2. `get_lines(..).request(..)` claims all four lines as outputs in one
//!    handle, with their idle levels as defaults
//! 3. [`MultiLineHandle::set_values`] writes all four values at once
//!
//! The handle keeps the last written level of every line, so changing one
//! pin rewrites the others with their current values.

use std::fmt;
use std::path::{Path, PathBuf};

use gpio_cdev::{Chip, LineRequestFlags, MultiLineHandle};
use tracing::{debug, warn};

use super::{Level, PanelPin, PinControl};
use crate::error::PanelError;

/// Default GPIO chip path
pub const DEFAULT_CHIP: &str = "/dev/gpiochip0";

/// Consumer label shown by `gpioinfo`
const CONSUMER_LABEL: &str = "panelbus";

/// Line offsets of each panel pin on the chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineOffsets {
    pub reset: u32,
    pub backlight: u32,
    pub data_command: u32,
    pub chip_select: u32,
}

impl Default for LineOffsets {
    fn default() -> Self {
        Self {
            reset: 69,
            backlight: 70,
            data_command: 72,
            chip_select: 74,
        }
    }
}

impl LineOffsets {
    pub fn offset(&self, pin: PanelPin) -> u32 {
        match pin {
            PanelPin::Reset => self.reset,
            PanelPin::Backlight => self.backlight,
            PanelPin::DataCommand => self.data_command,
            PanelPin::ChipSelect => self.chip_select,
        }
    }

    /// Offsets in handle slot order
    fn by_slot(&self) -> [u32; 4] {
        let mut offsets = [0; 4];
        for pin in PanelPin::ALL {
            offsets[slot(pin)] = self.offset(pin);
        }
        offsets
    }
}

/// Slot of `pin` inside the line handle
fn slot(pin: PanelPin) -> usize {
    match pin {
        PanelPin::Reset => 0,
        PanelPin::Backlight => 1,
        PanelPin::DataCommand => 2,
        PanelPin::ChipSelect => 3,
    }
}

/// Idle levels in handle slot order
fn idle_values() -> [u8; 4] {
    let mut values = [0; 4];
    for pin in PanelPin::ALL {
        values[slot(pin)] = pin.idle_level().as_u8();
    }
    values
}

/// # Panel Pins on a GPIO Chip
///
/// ## Example
///
/// ```no_run
/// use panelbus::pins::{GpioLines, Level, PanelPin, PinControl};
/// use panelbus::pins::gpiochip::LineOffsets;
///
/// let mut pins = GpioLines::new("/dev/gpiochip0", LineOffsets::default());
/// pins.init()?;
/// pins.set_pin(PanelPin::Backlight, Level::High);
/// # Ok::<(), panelbus::PanelError>(())
/// ```
pub struct GpioLines {
    chip_path: PathBuf,
    offsets: LineOffsets,
    handle: Option<MultiLineHandle>,
    values: [u8; 4],
}

impl fmt::Debug for GpioLines {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GpioLines")
            .field("chip_path", &self.chip_path)
            .field("offsets", &self.offsets)
            .field("open", &self.is_open())
            .field("values", &self.values)
            .finish()
    }
}

impl GpioLines {
    pub fn new<P: AsRef<Path>>(chip: P, offsets: LineOffsets) -> Self {
        Self {
            chip_path: chip.as_ref().to_path_buf(),
            offsets,
            handle: None,
            values: [0; 4],
        }
    }

    pub fn offsets(&self) -> &LineOffsets {
        &self.offsets
    }

    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }
}

impl PinControl for GpioLines {
    fn init(&mut self) -> Result<(), PanelError> {
        if self.is_open() {
            return Ok(());
        }

        let mut chip = Chip::new(&self.chip_path).map_err(|e| {
            PanelError::Pins(format!(
                "Failed to open {}: {} (check `ls -la /dev/gpiochip*`)",
                self.chip_path.display(),
                e
            ))
        })?;

        let defaults = idle_values();
        let handle = chip
            .get_lines(&self.offsets.by_slot())
            .and_then(|lines| lines.request(LineRequestFlags::OUTPUT, &defaults, CONSUMER_LABEL))
            .map_err(|e| {
                PanelError::Pins(format!(
                    "Failed to request GPIO lines: {} (line busy or root required)",
                    e
                ))
            })?;

        self.values = defaults;
        self.handle = Some(handle);

        debug!(
            chip = %self.chip_path.display(),
            offsets = ?self.offsets,
            "GPIO lines requested"
        );
        Ok(())
    }

    fn deinit(&mut self) {
        // Dropping the handle releases the lines
        if self.handle.take().is_some() {
            debug!("GPIO lines released");
        }
    }

    fn set_pin(&mut self, pin: PanelPin, level: Level) {
        let Some(handle) = &self.handle else {
            warn!(?pin, ?level, "set_pin on unopened GPIO lines");
            return;
        };

        self.values[slot(pin)] = level.as_u8();
        if let Err(e) = handle.set_values(&self.values) {
            warn!(?pin, ?level, "failed to set pin: {}", e);
        }
    }
}
