//! # Framebuffer
//!
//! A full frame of wire-ready RGB565 bytes, row-major, two bytes per pixel in
//! the order the panel expects. Pushing a frame is then a single chunked
//! transfer with no per-pixel work.

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};

use super::color::{ColorOrder, Rgb565};
use crate::error::PanelError;
use crate::panel::config::BYTES_PER_PIXEL;

/// Wire-ready frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    width: usize,
    height: usize,
    order: ColorOrder,
    data: Vec<u8>,
}

impl Framebuffer {
    /// Black frame
    pub fn new(width: usize, height: usize, order: ColorOrder) -> Self {
        Self {
            width,
            height,
            order,
            data: vec![0; width * height * BYTES_PER_PIXEL],
        }
    }

    /// Frame filled with one color
    pub fn filled(width: usize, height: usize, order: ColorOrder, color: Rgb565) -> Self {
        let mut fb = Self::new(width, height, order);
        fb.fill(color);
        fb
    }

    /// Top half `top`, bottom half `bottom`.
    pub fn bars(width: usize, height: usize, order: ColorOrder, top: Rgb565, bottom: Rgb565) -> Self {
        let mut fb = Self::new(width, height, order);
        let split = height / 2;
        fb.fill_rows(0..split, top);
        fb.fill_rows(split..height, bottom);
        fb
    }

    /// Scale an image to the frame size (aspect ratio not preserved).
    pub fn from_image(image: &DynamicImage, width: usize, height: usize, order: ColorOrder) -> Self {
        let resized = if image.dimensions() == (width as u32, height as u32) {
            image.to_rgb8()
        } else {
            image
                .resize_exact(width as u32, height as u32, FilterType::Triangle)
                .to_rgb8()
        };

        let mut fb = Self::new(width, height, order);
        for (x, y, pixel) in resized.enumerate_pixels() {
            let [r, g, b] = pixel.0;
            fb.set_pixel(x as usize, y as usize, Rgb565::from_rgb888(r, g, b));
        }
        fb
    }

    /// Load and scale an image file.
    pub fn open_image<P: AsRef<std::path::Path>>(
        path: P,
        width: usize,
        height: usize,
        order: ColorOrder,
    ) -> Result<Self, PanelError> {
        let path = path.as_ref();
        let image = image::open(path)
            .map_err(|e| PanelError::Image(format!("Failed to open {}: {}", path.display(), e)))?;
        Ok(Self::from_image(&image, width, height, order))
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn fill(&mut self, color: Rgb565) {
        self.fill_rows(0..self.height, color);
    }

    /// Fill whole rows. Rows past the bottom are ignored.
    pub fn fill_rows(&mut self, rows: std::ops::Range<usize>, color: Rgb565) {
        let bytes = color.for_order(self.order).to_be_bytes();
        let start = rows.start.min(self.height) * self.width * BYTES_PER_PIXEL;
        let end = rows.end.min(self.height) * self.width * BYTES_PER_PIXEL;
        if start >= end {
            return;
        }
        for px in self.data[start..end].chunks_exact_mut(BYTES_PER_PIXEL) {
            px.copy_from_slice(&bytes);
        }
    }

    /// Set one pixel. Out-of-bounds writes are ignored.
    pub fn set_pixel(&mut self, x: usize, y: usize, color: Rgb565) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = (y * self.width + x) * BYTES_PER_PIXEL;
        self.data[idx..idx + BYTES_PER_PIXEL].copy_from_slice(&color.for_order(self.order).to_be_bytes());
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}
