//! # Linux spidev Transport
//!
//! Talks to the kernel SPI driver through `/dev/spidevB.C` using the
//! [`spidev`](::spidev) crate.
//!
//! | Step | Call |
//! |------|------|
//! | Mode, word size, clock | [`SpidevOptions`] + `configure` |
//! | One chunk group | `transfer_multiple` (one `SPI_IOC_MESSAGE`) |
//!
//! Within one message the kernel keeps chip-select active between transfers.
//! The panel's own CS line is driven separately through GPIO, so a message
//! boundary is invisible to the panel.
//!
//! ## Kernel Limits
//!
//! spidev rejects transfers larger than its `bufsiz` module parameter
//! (4096 by default). Callers hand it pre-split chunk groups.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use ::spidev::{SpiModeFlags, Spidev as SpidevDevice, SpidevOptions, SpidevTransfer};
use tracing::debug;

use super::primitive::{BusSettings, ChunkDescriptor, SpiMode, SpiPrimitive};
use crate::error::PanelError;

/// Default spidev device path
pub const DEFAULT_DEVICE: &str = "/dev/spidev1.1";

fn mode_flags(mode: SpiMode) -> SpiModeFlags {
    match mode {
        SpiMode::Mode0 => SpiModeFlags::SPI_MODE_0,
        SpiMode::Mode1 => SpiModeFlags::SPI_MODE_1,
        SpiMode::Mode2 => SpiModeFlags::SPI_MODE_2,
        SpiMode::Mode3 => SpiModeFlags::SPI_MODE_3,
    }
}

/// # spidev Block Transfer
///
/// ## Example
///
/// ```no_run
/// use panelbus::transport::{BusSettings, ChunkedTransfer, Spidev};
///
/// let spi = Spidev::open("/dev/spidev1.1")?;
/// let mut bus = ChunkedTransfer::open(spi, BusSettings::default(), 4096)?;
/// bus.send(&[0x00; 4096])?;
/// # Ok::<(), panelbus::PanelError>(())
/// ```
pub struct Spidev {
    path: PathBuf,
    device: SpidevDevice,
}

impl fmt::Debug for Spidev {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Spidev").field("path", &self.path).finish()
    }
}

impl Spidev {
    /// Open the spidev character device.
    ///
    /// ## Errors
    ///
    /// [`PanelError::TransportUnavailable`] if the device doesn't exist or
    /// permission is denied (usually needs root or the `spi` group).
    pub fn open<P: AsRef<Path>>(device: P) -> Result<Self, PanelError> {
        let path = device.as_ref();

        let device = SpidevDevice::open(path).map_err(|e| {
            PanelError::TransportUnavailable(format!("Failed to open {}: {}", path.display(), e))
        })?;

        debug!(device = %path.display(), "spidev opened");

        Ok(Self {
            path: path.to_path_buf(),
            device,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SpiPrimitive for Spidev {
    fn configure(&mut self, settings: &BusSettings) -> io::Result<()> {
        let options = SpidevOptions::new()
            .bits_per_word(settings.bits_per_word)
            .max_speed_hz(settings.speed_hz)
            .mode(mode_flags(settings.mode))
            .build();
        self.device.configure(&options)
    }

    fn submit(&mut self, group: &[ChunkDescriptor], source: &[u8]) -> io::Result<usize> {
        if group.is_empty() {
            return Ok(0);
        }

        let mut transfers = Vec::with_capacity(group.len());
        let mut total = 0;
        for desc in group {
            let chunk = source.get(desc.range()).ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("chunk {:?} outside source of {} bytes", desc.range(), source.len()),
                )
            })?;

            let mut transfer = SpidevTransfer::write(chunk);
            transfer.speed_hz = desc.speed_hz;
            transfer.bits_per_word = desc.bits_per_word;
            transfers.push(transfer);
            total += chunk.len();
        }

        self.device.transfer_multiple(&mut transfers)?;
        Ok(total)
    }
}
