//! # Rendering Module
//!
//! Pixel data preparation for RGB565 panels.
//!
//! ## Modules
//!
//! - [`color`]: RGB565 colors and subpixel order
//! - [`framebuffer`]: Wire-ready frames (fills, test bars, images)
//!
//! ## Usage Example
//!
//! ```
//! use panelbus::render::{ColorOrder, Framebuffer, Rgb565};
//!
//! let frame = Framebuffer::bars(320, 480, ColorOrder::Bgr, Rgb565::BLUE, Rgb565::YELLOW);
//! assert_eq!(frame.as_bytes().len(), 320 * 480 * 2);
//! ```

pub mod color;
pub mod framebuffer;

pub use color::{ColorOrder, Rgb565};
pub use framebuffer::Framebuffer;
