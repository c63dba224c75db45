//! # Panelbus - SPI Display Panel Driver
//!
//! Panelbus drives small SPI TFT panels (ST7796 and friends) from Linux
//! userspace. It provides:
//!
//! - **Operation streams**: a compact bytecode for command/data sequences
//! - **Interpreter**: executes streams against a bus, pins and a delay
//! - **Chunked transfers**: large payloads split to fit the SPI driver
//! - **Transport**: spidev ioctls and GPIO character device lines
//!
//! ## Quick Start
//!
//! ```no_run
//! use panelbus::{
//!     panel::{PanelConfig, St7796},
//!     render::{Framebuffer, Rgb565},
//! };
//!
//! let config = PanelConfig::default();
//! let mut panel = St7796::open(&config)?;
//! panel.init()?;
//!
//! let frame = Framebuffer::bars(
//!     config.width as usize,
//!     config.height as usize,
//!     config.color_order,
//!     Rgb565::BLUE,
//!     Rgb565::YELLOW,
//! );
//! panel.push_framebuffer(&frame)?;
//!
//! # Ok::<(), panelbus::PanelError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`ops`] | Opcodes, stream builder and decoder |
//! | [`interpreter`] | Operation interpreter and write session |
//! | [`transport`] | Chunked transfer engine and SPI backends |
//! | [`pins`] | Control lines (RST, BLK, DC, CS) |
//! | [`delay`] | Blocking millisecond delays |
//! | [`panel`] | Panel configuration and ST7796 driver |
//! | [`render`] | RGB565 colors and framebuffers |
//! | [`mock`] | Recording fakes for hardware-free testing |
//! | [`error`] | Error types |

pub mod delay;
pub mod error;
pub mod interpreter;
pub mod mock;
pub mod ops;
pub mod panel;
pub mod pins;
pub mod render;
pub mod transport;

// Re-exports for convenience
pub use error::PanelError;
pub use interpreter::{Interpreter, RunReport};
pub use panel::PanelConfig;
