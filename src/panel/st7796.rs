//! # ST7796 Controller
//!
//! Driver for ST7796-based 320x480 TFT panels on 4-wire SPI.
//!
//! ## Power-Up
//!
//! ```text
//! BLK high ─► RST high ─100ms─► RST low ─120ms─► RST high ─120ms─►
//! INIT_SEQUENCE (pixel format, gamma, sleep out, 120ms, display on, 120ms)
//! ```
//!
//! ## Writing Pixels
//!
//! ```text
//! CASET x0..x1 ─► RASET y0..y1 ─► RAMWR ─► pixel data (RGB565, MSB first)
//! ```

use std::fmt;

use tracing::{debug, info};

use super::config::{BYTES_PER_PIXEL, PanelConfig};
use crate::delay::{Delay, ThreadDelay};
use crate::error::PanelError;
use crate::interpreter::{Interpreter, RunReport};
use crate::ops::Opcode;
use crate::pins::{GpioLines, Level, PanelPin, PinControl};
use crate::render::Framebuffer;
use crate::transport::{ChunkedTransfer, Spidev, SpiPrimitive};

// ============================================================================
// COMMANDS
// ============================================================================

/// Sleep out
pub const SLPOUT: u8 = 0x11;
/// Display inversion off
pub const INVOFF: u8 = 0x20;
/// Display inversion on
pub const INVON: u8 = 0x21;
/// Display off
pub const DISPOFF: u8 = 0x28;
/// Display on
pub const DISPON: u8 = 0x29;
/// Column address set
pub const CASET: u8 = 0x2A;
/// Row address set
pub const RASET: u8 = 0x2B;
/// Memory write
pub const RAMWR: u8 = 0x2C;
/// Memory read
pub const RAMRD: u8 = 0x2E;
/// Idle mode off
pub const IDMOFF: u8 = 0x38;
/// Interface pixel format
pub const COLMOD: u8 = 0x3A;
/// Display inversion control
pub const DIC: u8 = 0xB4;
/// Display function control
pub const DFC: u8 = 0xB6;
/// Power control 2
pub const PWR2: u8 = 0xC1;
/// Power control 3
pub const PWR3: u8 = 0xC2;
/// VCOM control
pub const VCMPCTL: u8 = 0xC5;
/// Positive gamma control
pub const PGC: u8 = 0xE0;
/// Negative gamma control
pub const NGC: u8 = 0xE1;
/// Display output ctrl adjust
pub const DOCA: u8 = 0xE8;
/// Command set control
pub const CSCON: u8 = 0xF0;

/// Wait after reset edges, sleep out and display on
pub const INIT_DELAY_MS: u8 = 120;

const BEGIN: u8 = Opcode::Begin as u8;
const END: u8 = Opcode::End as u8;
const DELAY: u8 = Opcode::Delay as u8;
const CMD: u8 = Opcode::Command8 as u8;
const CMD_DATA: u8 = Opcode::Command8Data8 as u8;
const DATA_BYTES: u8 = Opcode::DataBytes as u8;

/// Controller init table as an operation stream.
#[rustfmt::skip]
pub const INIT_SEQUENCE: &[u8] = &[
    BEGIN,
    CMD_DATA, COLMOD, 0x55, // 16 bits per pixel

    CMD_DATA, CSCON, 0xC3,  // unlock command set part 1
    CMD_DATA, CSCON, 0x96,  // unlock command set part 2

    CMD_DATA, DIC, 0x01,

    CMD, DFC,
    DATA_BYTES, 3, 0x80, 0x22, 0x3B,

    CMD, DOCA,
    DATA_BYTES, 8, 0x40, 0x8A, 0x00, 0x00, 0x29, 0x19, 0xA5, 0x33,

    CMD_DATA, PWR2, 0x06,
    CMD_DATA, PWR3, 0xA7,
    CMD_DATA, VCMPCTL, 0x18,

    CMD, PGC,
    DATA_BYTES, 14,
    0xF0, 0x09, 0x0B, 0x06, 0x04, 0x15, 0x2F,
    0x54, 0x42, 0x3C, 0x17, 0x14, 0x18, 0x1B,

    CMD, NGC,
    DATA_BYTES, 14,
    0xE0, 0x09, 0x0B, 0x06, 0x04, 0x03, 0x2B,
    0x43, 0x42, 0x3B, 0x16, 0x14, 0x17, 0x1B,

    CMD_DATA, CSCON, 0x3C,  // lock command set part 1
    CMD_DATA, CSCON, 0x69,  // lock command set part 2

    CMD, SLPOUT,
    END,

    DELAY, INIT_DELAY_MS,

    BEGIN,
    CMD, IDMOFF,
    CMD, DISPON,
    END,

    DELAY, INIT_DELAY_MS,
];

// ============================================================================
// DRIVER
// ============================================================================

/// # ST7796 Panel
///
/// ## Example
///
/// ```no_run
/// use panelbus::panel::{PanelConfig, St7796};
/// use panelbus::render::{Framebuffer, Rgb565};
///
/// let config = PanelConfig::default();
/// let mut panel = St7796::open(&config)?;
/// panel.init()?;
///
/// let frame = Framebuffer::filled(320, 480, config.color_order, Rgb565::NAVY);
/// panel.push_framebuffer(&frame)?;
/// panel.shutdown();
/// # Ok::<(), panelbus::PanelError>(())
/// ```
pub struct St7796<S: SpiPrimitive, P: PinControl, D: Delay> {
    interp: Interpreter<S, P, D>,
    width: u16,
    height: u16,
}

impl St7796<Spidev, GpioLines, ThreadDelay> {
    /// Open the SPI device and GPIO lines named in `config`.
    ///
    /// The bus is sized for exactly one full frame.
    pub fn open(config: &PanelConfig) -> Result<Self, PanelError> {
        config.validate()?;

        let spi = Spidev::open(&config.spi.device)?;
        let bus = ChunkedTransfer::open(spi, config.bus_settings(), config.frame_bytes())?;

        let mut pins = GpioLines::new(&config.gpio.chip, config.line_offsets());
        pins.init()?;

        info!(panel = %config.name, "panel opened");
        Ok(Self::new(
            Interpreter::new(bus, pins, ThreadDelay),
            config.width,
            config.height,
        ))
    }
}

impl<S: SpiPrimitive, P: PinControl, D: Delay> St7796<S, P, D> {
    pub fn new(interp: Interpreter<S, P, D>, width: u16, height: u16) -> Self {
        Self {
            interp,
            width,
            height,
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn frame_bytes(&self) -> usize {
        self.width as usize * self.height as usize * BYTES_PER_PIXEL
    }

    pub fn interpreter_mut(&mut self) -> &mut Interpreter<S, P, D> {
        &mut self.interp
    }

    /// Hardware reset pulse with the backlight switched on.
    pub fn reset(&mut self) {
        self.backlight(true);

        self.interp.pins_mut().set_pin(PanelPin::Reset, Level::High);
        self.interp.delay_ms(100);
        self.interp.pins_mut().set_pin(PanelPin::Reset, Level::Low);
        self.interp.delay_ms(INIT_DELAY_MS as u32);
        self.interp.pins_mut().set_pin(PanelPin::Reset, Level::High);
        self.interp.delay_ms(INIT_DELAY_MS as u32);
    }

    /// Reset and run [`INIT_SEQUENCE`].
    pub fn init(&mut self) -> Result<RunReport, PanelError> {
        self.reset();
        let report = self.interp.run(INIT_SEQUENCE)?;
        info!(instructions = report.executed, "panel initialised");
        Ok(report)
    }

    /// Execute an arbitrary operation stream.
    pub fn run(&mut self, stream: &[u8]) -> Result<RunReport, PanelError> {
        self.interp.run(stream)
    }

    /// Select the RAM window for the next pixel write.
    ///
    /// Must be called inside a write session; ends with RAMWR.
    pub fn set_addr_window(&mut self, x: u16, y: u16, w: u16, h: u16) -> Result<(), PanelError> {
        let window = self.check_window(x, y, w, h)?;
        debug!(%window, "address window");

        self.interp.write_command(CASET)?;
        self.interp.write_data16(x)?;
        self.interp.write_data16(x + w - 1)?;

        self.interp.write_command(RASET)?;
        self.interp.write_data16(y)?;
        self.interp.write_data16(y + h - 1)?;

        self.interp.write_command(RAMWR)
    }

    fn check_window(&self, x: u16, y: u16, w: u16, h: u16) -> Result<Window, PanelError> {
        let window = Window { x, y, w, h };
        if w == 0
            || h == 0
            || x as u32 + w as u32 > self.width as u32
            || y as u32 + h as u32 > self.height as u32
        {
            return Err(PanelError::Frame(format!(
                "Window {} outside {}x{} panel",
                window, self.width, self.height
            )));
        }
        Ok(window)
    }

    /// Write wire-ready pixels to a window in one session.
    ///
    /// The window and pixel length are checked before CS is asserted.
    pub fn push_window(
        &mut self,
        x: u16,
        y: u16,
        w: u16,
        h: u16,
        pixels: &[u8],
    ) -> Result<(), PanelError> {
        let expected = w as usize * h as usize * BYTES_PER_PIXEL;
        if pixels.len() != expected {
            return Err(PanelError::Frame(format!(
                "Pixel data is {} bytes, window {}x{} needs {}",
                pixels.len(),
                w,
                h,
                expected
            )));
        }
        self.check_window(x, y, w, h)?;

        self.interp.begin_write();
        self.set_addr_window(x, y, w, h)?;
        self.interp.write_pixels(pixels)?;
        self.interp.end_write()
    }

    /// Write a full frame of wire-ready RGB565 bytes.
    pub fn push_frame(&mut self, frame: &[u8]) -> Result<(), PanelError> {
        self.push_window(0, 0, self.width, self.height, frame)
    }

    pub fn push_framebuffer(&mut self, fb: &Framebuffer) -> Result<(), PanelError> {
        if fb.width() != self.width as usize || fb.height() != self.height as usize {
            return Err(PanelError::Frame(format!(
                "Framebuffer is {}x{}, panel is {}x{}",
                fb.width(),
                fb.height(),
                self.width,
                self.height
            )));
        }
        self.push_frame(fb.as_bytes())
    }

    pub fn invert(&mut self, on: bool) -> Result<(), PanelError> {
        self.single_command(if on { INVON } else { INVOFF })
    }

    pub fn display_on(&mut self, on: bool) -> Result<(), PanelError> {
        self.single_command(if on { DISPON } else { DISPOFF })
    }

    pub fn backlight(&mut self, on: bool) {
        self.interp
            .pins_mut()
            .set_pin(PanelPin::Backlight, Level::from(on));
    }

    fn single_command(&mut self, cmd: u8) -> Result<(), PanelError> {
        self.interp.begin_write();
        self.interp.write_command(cmd)?;
        self.interp.end_write()
    }

    /// Backlight off, then release the bus and the GPIO lines.
    pub fn shutdown(mut self) -> (S, P) {
        self.backlight(false);
        let (bus, mut pins, _) = self.interp.into_parts();
        let primitive = bus.close();
        pins.deinit();
        info!("panel shut down");
        (primitive, pins)
    }
}

#[derive(Debug, Clone, Copy)]
struct Window {
    x: u16,
    y: u16,
    w: u16,
    h: u16,
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.w, self.h, self.x, self.y)
    }
}

// ============================================================================
// TESTS
// ============================================================================
