//! # Panel Drivers
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Panel geometry, SPI and GPIO settings (JSON) |
//! | [`st7796`] | ST7796 init table and driver |

pub mod config;
pub mod st7796;

pub use config::PanelConfig;
pub use st7796::St7796;
