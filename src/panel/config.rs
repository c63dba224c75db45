//! # Panel Configuration
//!
//! Hardware description of a panel and the Linux devices it hangs off.
//!
//! ## Defaults (ST7796, 320x480)
//!
//! | Setting | Value |
//! |---------|-------|
//! | SPI device | `/dev/spidev1.1` |
//! | SPI clock | 50 MHz, mode 0, 8-bit words |
//! | GPIO chip | `/dev/gpiochip0` |
//! | RST / BLK / DC / CS | 69 / 70 / 72 / 74 |
//! | Color order | BGR |
//!
//! ## JSON Files
//!
//! Any subset of keys may be given; the rest keep their defaults.
//!
//! ```
//! use panelbus::panel::PanelConfig;
//!
//! let config = PanelConfig::from_json(r#"{ "spi": { "speed_hz": 32000000 } }"#)?;
//! assert_eq!(config.spi.speed_hz, 32_000_000);
//! assert_eq!(config.spi.device, "/dev/spidev1.1");
//! # Ok::<(), panelbus::PanelError>(())
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PanelError;
use crate::pins::gpiochip::{self, LineOffsets};
use crate::render::ColorOrder;
use crate::transport::{BusSettings, SpiMode, spidev};

/// Bytes per RGB565 pixel
pub const BYTES_PER_PIXEL: usize = 2;

/// Full panel description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Human-readable model name
    pub name: String,

    /// Visible columns
    pub width: u16,

    /// Visible rows
    pub height: u16,

    /// Subpixel order expected by the controller
    pub color_order: ColorOrder,

    pub spi: SpiConfig,

    pub gpio: GpioConfig,
}

/// SPI device settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpiConfig {
    pub device: String,
    pub speed_hz: u32,
    /// SPI mode 0-3
    pub mode: u8,
    pub bits_per_word: u8,
}

/// GPIO chip and line offsets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GpioConfig {
    pub chip: String,
    pub reset: u32,
    pub backlight: u32,
    pub data_command: u32,
    pub chip_select: u32,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self::st7796()
    }
}

impl Default for SpiConfig {
    fn default() -> Self {
        let bus = BusSettings::default();
        Self {
            device: spidev::DEFAULT_DEVICE.to_string(),
            speed_hz: bus.speed_hz,
            mode: bus.mode.bits(),
            bits_per_word: bus.bits_per_word,
        }
    }
}

impl Default for GpioConfig {
    fn default() -> Self {
        let lines = LineOffsets::default();
        Self {
            chip: gpiochip::DEFAULT_CHIP.to_string(),
            reset: lines.reset,
            backlight: lines.backlight,
            data_command: lines.data_command,
            chip_select: lines.chip_select,
        }
    }
}

impl PanelConfig {
    /// # ST7796 3.5" Panel
    ///
    /// 320x480 RGB565 over 4-wire SPI.
    pub fn st7796() -> Self {
        Self {
            name: "ST7796 320x480".to_string(),
            width: 320,
            height: 480,
            color_order: ColorOrder::Bgr,
            spi: SpiConfig::default(),
            gpio: GpioConfig::default(),
        }
    }

    /// Parse a JSON document. Missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, PanelError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| PanelError::Config(format!("Invalid panel config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PanelError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            PanelError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, PanelError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| PanelError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Reject values the hardware can't be configured with.
    pub fn validate(&self) -> Result<(), PanelError> {
        if self.width == 0 || self.height == 0 {
            return Err(PanelError::Config(format!(
                "Panel size {}x{} is empty",
                self.width, self.height
            )));
        }
        if SpiMode::from_bits(self.spi.mode).is_none() {
            return Err(PanelError::Config(format!(
                "Invalid SPI mode {} (expected 0-3)",
                self.spi.mode
            )));
        }
        if self.spi.speed_hz == 0 {
            return Err(PanelError::Config("SPI speed must be non-zero".to_string()));
        }
        Ok(())
    }

    /// Size of one full frame in bytes
    #[inline]
    pub fn frame_bytes(&self) -> usize {
        self.width as usize * self.height as usize * BYTES_PER_PIXEL
    }

    /// Transport settings for [`BusAdapter::open`](crate::transport::BusAdapter::open)
    pub fn bus_settings(&self) -> BusSettings {
        BusSettings {
            speed_hz: self.spi.speed_hz,
            bits_per_word: self.spi.bits_per_word,
            mode: SpiMode::from_bits(self.spi.mode).unwrap_or_default(),
        }
    }

    pub fn line_offsets(&self) -> LineOffsets {
        LineOffsets {
            reset: self.gpio.reset,
            backlight: self.gpio.backlight,
            data_command: self.gpio.data_command,
            chip_select: self.gpio.chip_select,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_st7796() {
        let config = PanelConfig::default();
        assert_eq!(config.width, 320);
        assert_eq!(config.height, 480);
        assert_eq!(config.color_order, ColorOrder::Bgr);
        assert_eq!(config.spi.device, "/dev/spidev1.1");
        assert_eq!(config.gpio.chip, "/dev/gpiochip0");
    }

    #[test]
    fn test_frame_bytes() {
        assert_eq!(PanelConfig::st7796().frame_bytes(), 320 * 480 * 2);
    }

    #[test]
    fn test_bus_settings() {
        let settings = PanelConfig::default().bus_settings();
        assert_eq!(settings, BusSettings::default());
    }

    #[test]
    fn test_line_offsets_roundtrip_defaults() {
        assert_eq!(PanelConfig::default().line_offsets(), LineOffsets::default());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config =
            PanelConfig::from_json(r#"{ "width": 240, "gpio": { "chip": "/dev/gpiochip1" } }"#).unwrap();
        assert_eq!(config.width, 240);
        assert_eq!(config.height, 480);
        assert_eq!(config.gpio.chip, "/dev/gpiochip1");
        assert_eq!(config.gpio.reset, 69);
    }

    #[test]
    fn test_color_order_json() {
        let config = PanelConfig::from_json(r#"{ "color_order": "rgb" }"#).unwrap();
        assert_eq!(config.color_order, ColorOrder::Rgb);
    }

    #[test]
    fn test_invalid_mode_rejected() {
        let result = PanelConfig::from_json(r#"{ "spi": { "mode": 7 } }"#);
        assert!(matches!(result, Err(PanelError::Config(_))));
    }

    #[test]
    fn test_empty_size_rejected() {
        let result = PanelConfig::from_json(r#"{ "height": 0 }"#);
        assert!(matches!(result, Err(PanelError::Config(_))));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            PanelConfig::from_json("{ not json"),
            Err(PanelError::Config(_))
        ));
    }

    #[test]
    fn test_json_roundtrip() {
        let config = PanelConfig::default();
        let json = config.to_json().unwrap();
        assert_eq!(PanelConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            PanelConfig::load("/nonexistent/panel.json"),
            Err(PanelError::Config(_))
        ));
    }
}
