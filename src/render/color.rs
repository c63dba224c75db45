//! # RGB565 Colors
//!
//! The panel runs in 16-bit color mode (COLMOD 0x55):
//!
//! ```text
//! bit  15 ─────── 11 10 ──────── 5 4 ─────── 0
//!      │  red (5)   │ green (6)   │ blue (5)  │
//! ```
//!
//! Pixels go over the wire most significant byte first. Panels wired BGR
//! expect red and blue swapped, see [`Rgb565::to_bgr`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Subpixel order of the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorOrder {
    Rgb,
    Bgr,
}

/// A 16-bit RGB565 color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb565(pub u16);

impl Rgb565 {
    pub const BLACK: Self = Self(0x0000);
    pub const NAVY: Self = Self(0x000F);
    pub const DARK_GREEN: Self = Self(0x03E0);
    pub const DARK_CYAN: Self = Self(0x03EF);
    pub const MAROON: Self = Self(0x7800);
    pub const PURPLE: Self = Self(0x780F);
    pub const OLIVE: Self = Self(0x7BE0);
    pub const LIGHT_GREY: Self = Self(0xD69A);
    pub const LIME: Self = Self(0xA7E0);
    pub const DARK_GREY: Self = Self(0x3186);
    pub const GREY: Self = Self(0xAD55);
    pub const BLUE: Self = Self(0x001F);
    pub const GREEN: Self = Self(0x07E0);
    pub const CYAN: Self = Self(0x07FF);
    pub const RED: Self = Self(0xF800);
    pub const MAGENTA: Self = Self(0xF81F);
    pub const YELLOW: Self = Self(0xFFE0);
    pub const WHITE: Self = Self(0xFFFF);
    pub const ORANGE: Self = Self(0xFDA0);
    pub const GREEN_YELLOW: Self = Self(0xB7E0);
    pub const PINK: Self = Self(0xFE19);
    pub const BROWN: Self = Self(0x9A60);
    pub const GOLD: Self = Self(0xFEA0);
    pub const SILVER: Self = Self(0xC618);
    pub const SKY_BLUE: Self = Self(0x867D);
    pub const VIOLET: Self = Self(0x915C);

    /// Named colors accepted by [`FromStr`]
    pub const NAMED: &'static [(&'static str, Self)] = &[
        ("black", Self::BLACK),
        ("navy", Self::NAVY),
        ("darkgreen", Self::DARK_GREEN),
        ("darkcyan", Self::DARK_CYAN),
        ("maroon", Self::MAROON),
        ("purple", Self::PURPLE),
        ("olive", Self::OLIVE),
        ("lightgrey", Self::LIGHT_GREY),
        ("lime", Self::LIME),
        ("darkgrey", Self::DARK_GREY),
        ("grey", Self::GREY),
        ("blue", Self::BLUE),
        ("green", Self::GREEN),
        ("cyan", Self::CYAN),
        ("red", Self::RED),
        ("magenta", Self::MAGENTA),
        ("yellow", Self::YELLOW),
        ("white", Self::WHITE),
        ("orange", Self::ORANGE),
        ("greenyellow", Self::GREEN_YELLOW),
        ("pink", Self::PINK),
        ("brown", Self::BROWN),
        ("gold", Self::GOLD),
        ("silver", Self::SILVER),
        ("skyblue", Self::SKY_BLUE),
        ("violet", Self::VIOLET),
    ];

    /// Quantise 8-bit channels.
    #[inline]
    pub const fn from_rgb888(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u16 & 0xF8) << 8) | ((g as u16 & 0xFC) << 3) | (b as u16 >> 3))
    }

    #[inline]
    pub const fn red(self) -> u8 {
        ((self.0 >> 11) & 0x1F) as u8
    }

    #[inline]
    pub const fn green(self) -> u8 {
        ((self.0 >> 5) & 0x3F) as u8
    }

    #[inline]
    pub const fn blue(self) -> u8 {
        (self.0 & 0x1F) as u8
    }

    /// Swap the red and blue fields.
    #[inline]
    pub const fn to_bgr(self) -> Self {
        Self(((self.blue() as u16) << 11) | ((self.green() as u16) << 5) | self.red() as u16)
    }

    /// Value for a panel with the given subpixel order
    #[inline]
    pub const fn for_order(self, order: ColorOrder) -> Self {
        match order {
            ColorOrder::Rgb => self,
            ColorOrder::Bgr => self.to_bgr(),
        }
    }

    /// Bytes in wire order (most significant first)
    #[inline]
    pub const fn to_be_bytes(self) -> [u8; 2] {
        self.0.to_be_bytes()
    }
}

impl fmt::Display for Rgb565 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04X}", self.0)
    }
}

impl FromStr for Rgb565 {
    type Err = String;

    /// Accepts a color name (`"yellow"`), `0xRRRR` RGB565 hex, or `#rrggbb`.
    fn from_str(s: &str) -> Result<Self, String> {
        let lower = s.trim().to_lowercase();

        if let Some((_, color)) = Self::NAMED.iter().find(|(name, _)| *name == lower) {
            return Ok(*color);
        }

        if let Some(hex) = lower.strip_prefix("0x") {
            return u16::from_str_radix(hex, 16)
                .map(Self)
                .map_err(|_| format!("Invalid RGB565 value: {}", s));
        }

        if let Some(hex) = lower.strip_prefix('#') {
            if hex.len() == 6 {
                if let Ok(rgb) = u32::from_str_radix(hex, 16) {
                    return Ok(Self::from_rgb888((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8));
                }
            }
            return Err(format!("Invalid #rrggbb color: {}", s));
        }

        Err(format!(
            "Unknown color '{}'. Use a name, 0xRRRR (RGB565) or #rrggbb",
            s
        ))
    }
}
