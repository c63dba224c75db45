//! # Side-Channel Pins
//!
//! The panel needs four GPIO lines next to the SPI bus:
//!
//! | Pin | Role | Idle level |
//! |-----|------|------------|
//! | `Reset` | Hardware reset, active low | High |
//! | `Backlight` | Backlight enable | Low |
//! | `DataCommand` | Low = command byte, high = data byte | Low |
//! | `ChipSelect` | Bus enable, active low | High |
//!
//! Pin writes are fire-and-forget: implementations log failures instead of
//! returning them.

pub mod gpiochip;

pub use gpiochip::GpioLines;

use crate::error::PanelError;

/// Logical pins the driver cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelPin {
    Reset,
    Backlight,
    DataCommand,
    ChipSelect,
}

impl PanelPin {
    pub const ALL: [Self; 4] = [
        Self::Reset,
        Self::Backlight,
        Self::DataCommand,
        Self::ChipSelect,
    ];

    /// Level the line is driven to when first requested
    pub fn idle_level(self) -> Level {
        match self {
            Self::Reset | Self::ChipSelect => Level::High,
            Self::Backlight | Self::DataCommand => Level::Low,
        }
    }
}

/// Logic level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

impl Level {
    pub fn as_u8(self) -> u8 {
        match self {
            Self::Low => 0,
            Self::High => 1,
        }
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high { Level::High } else { Level::Low }
    }
}

/// Pin collaborator driven by the interpreter and panel driver.
pub trait PinControl {
    /// Request the lines and drive them to their idle levels.
    fn init(&mut self) -> Result<(), PanelError>;

    /// Release the lines.
    fn deinit(&mut self);

    /// Drive `pin` to `level`. Failures are logged, not returned.
    fn set_pin(&mut self, pin: PanelPin, level: Level);
}

impl<T: PinControl + ?Sized> PinControl for &mut T {
    fn init(&mut self) -> Result<(), PanelError> {
        (**self).init()
    }

    fn deinit(&mut self) {
        (**self).deinit()
    }

    fn set_pin(&mut self, pin: PanelPin, level: Level) {
        (**self).set_pin(pin, level)
    }
}
