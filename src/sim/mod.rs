// Simulation module - Drive both clock domains from a single thread
//
// This module provides:
// - Scheduler: interleaves compute and display ticks from two frequencies
// - Frame: a captured active area
// - Configuration persistence
// - PNG capture of displayed frames

pub mod capture;
pub mod config;
pub mod scheduler;

pub use capture::{save_capture, save_png, CaptureError};
pub use config::{AppConfig, SimConfig};
pub use scheduler::Scheduler;

use thiserror::Error;

use crate::memory::SourceError;
use crate::pipeline::ConfigError;
use crate::pixel::Rgb;

/// Errors raised while building a simulation from configuration
#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("startup data: {0}")]
    Source(#[from] SourceError),
}

/// One displayed frame, as seen at the output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Frames completed before this one
    pub number: u64,
    /// Display width
    pub width: usize,
    /// Display height
    pub height: usize,
    /// Channel width of `pixels`
    pub chan_bits: u32,
    /// Pixels in raster order
    pub pixels: Vec<Rgb>,
}

impl Frame {
    /// Pixel at display position `(x, y)`
    pub fn get(&self, x: usize, y: usize) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(y * self.width + x).copied()
    }

    /// Undo integer scaling by sampling the top-left of every block
    pub fn unscaled(&self, scale: usize) -> Vec<Rgb> {
        let scale = scale.max(1);
        (0..self.height / scale)
            .flat_map(|y| (0..self.width / scale).map(move |x| (x * scale, y * scale)))
            .filter_map(|(x, y)| self.get(x, y))
            .collect()
    }

    /// Pixels widened to 8 bits per channel, packed RGB
    pub fn to_rgb888(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.pixels.len() * 3);
        for pixel in &self.pixels {
            data.extend_from_slice(&pixel.to_rgb888(self.chan_bits));
        }
        data
    }
}
