//! # Block-Transfer Primitive
//!
//! The lowest layer of the bus: something that can be configured once and
//! then asked to clock out a group of chunks in a single call.
//!
//! On Linux this is the `spidev` character device, where one group maps to
//! one `SPI_IOC_MESSAGE(n)` ioctl. Chip-select stays active for the whole
//! group, so a group is atomic as far as the panel is concerned.

use std::io;

/// SPI clock polarity/phase mode (0-3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpiMode {
    /// CPOL=0, CPHA=0
    #[default]
    Mode0,
    /// CPOL=0, CPHA=1
    Mode1,
    /// CPOL=1, CPHA=0
    Mode2,
    /// CPOL=1, CPHA=1
    Mode3,
}

impl SpiMode {
    /// Mode bits as written by `SPI_IOC_WR_MODE`
    pub fn bits(self) -> u8 {
        match self {
            Self::Mode0 => 0,
            Self::Mode1 => 1,
            Self::Mode2 => 2,
            Self::Mode3 => 3,
        }
    }

    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(Self::Mode0),
            1 => Some(Self::Mode1),
            2 => Some(Self::Mode2),
            3 => Some(Self::Mode3),
            _ => None,
        }
    }
}

/// Fixed transport parameters, applied once at open time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusSettings {
    /// Maximum SCLK frequency in Hz
    pub speed_hz: u32,
    /// Word size in bits
    pub bits_per_word: u8,
    pub mode: SpiMode,
}

impl Default for BusSettings {
    fn default() -> Self {
        Self {
            speed_hz: 50_000_000,
            bits_per_word: 8,
            mode: SpiMode::Mode0,
        }
    }
}

/// One contiguous slice of a payload, at most one chunk long.
///
/// `offset` is relative to the source buffer handed to
/// [`SpiPrimitive::submit`]. Speed and word size are filled in once when the
/// descriptor array is allocated and never change afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChunkDescriptor {
    pub offset: usize,
    pub len: usize,
    pub speed_hz: u32,
    pub bits_per_word: u8,
}

impl ChunkDescriptor {
    /// Byte range covered in the source buffer
    pub fn range(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.len
    }
}

/// Raw block-transfer device.
///
/// Implementations must submit the whole group in one underlying call and
/// report how many bytes the device confirmed.
pub trait SpiPrimitive {
    /// Apply speed, word size and mode.
    fn configure(&mut self, settings: &BusSettings) -> io::Result<()>;

    /// Clock out every chunk of `group`, slicing data from `source`.
    ///
    /// Every descriptor range lies within `source`.
    fn submit(&mut self, group: &[ChunkDescriptor], source: &[u8]) -> io::Result<usize>;
}

impl<T: SpiPrimitive + ?Sized> SpiPrimitive for &mut T {
    fn configure(&mut self, settings: &BusSettings) -> io::Result<()> {
        (**self).configure(settings)
    }

    fn submit(&mut self, group: &[ChunkDescriptor], source: &[u8]) -> io::Result<usize> {
        (**self).submit(group, source)
    }
}
