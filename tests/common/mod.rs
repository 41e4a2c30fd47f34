// Common test utilities for scheduler-level integration tests
//
// This module provides shared functionality for building small pipelines,
// running them through both clock domains and predicting what they display.

#![allow(dead_code)]

use fbpipe::memory::greyscale_palette;
use fbpipe::pipeline::{ConfigError, Framebuffer, PipelineConfig};
use fbpipe::pixel::{ColourIndex, Rgb};
use fbpipe::sim::Scheduler;
use fbpipe::timing::DisplayTiming;

/// Blanking ticks per line used by the test rasters
pub const H_BLANK: usize = 12;

/// Blanking lines per frame used by the test rasters
pub const V_BLANK: usize = 2;

/// Small pipeline description for a test run
#[derive(Debug, Clone)]
pub struct Rig {
    pub width: usize,
    pub height: usize,
    pub scale: usize,
    pub compute_hz: u64,
    pub display_hz: u64,
    pub h_blank: usize,
    pub image: Vec<ColourIndex>,
}

impl Rig {
    /// A `width` x `height` blank framebuffer, unscaled, compute at twice the display clock
    pub fn new(width: usize, height: usize) -> Self {
        Rig {
            width,
            height,
            scale: 1,
            compute_hz: 2,
            display_hz: 1,
            h_blank: H_BLANK,
            image: vec![0; width * height],
        }
    }

    pub fn scale(mut self, scale: usize) -> Self {
        self.scale = scale;
        self
    }

    pub fn clocks(mut self, compute_hz: u64, display_hz: u64) -> Self {
        self.compute_hz = compute_hz;
        self.display_hz = display_hz;
        self
    }

    pub fn blanking(mut self, h_blank: usize) -> Self {
        self.h_blank = h_blank;
        self
    }

    pub fn image(mut self, image: Vec<ColourIndex>) -> Self {
        self.image = image;
        self
    }

    pub fn config(&self) -> PipelineConfig {
        PipelineConfig::new(self.width, self.height).with_scale(self.scale)
    }

    /// Build the scheduler with a 4-bit greyscale palette
    pub fn build(&self) -> Scheduler {
        self.try_build().expect("Failed to build scheduler")
    }

    pub fn try_build(&self) -> Result<Scheduler, ConfigError> {
        let config = self.config();
        let fb = Framebuffer::new(config.clone(), self.image.clone(), palette())?;
        let timing = DisplayTiming::for_pipeline(&config, self.h_blank, V_BLANK)?;
        Scheduler::new(fb, timing, self.compute_hz, self.display_hz)
    }
}

/// Palette used by every rig
pub fn palette() -> Vec<Rgb> {
    greyscale_palette(4, 4)
}

/// Colours an image of indices should display as, before scaling
pub fn colours(image: &[ColourIndex]) -> Vec<Rgb> {
    let palette = palette();
    image.iter().map(|&i| palette[i as usize]).collect()
}

/// Row-major ramp of colour indices
pub fn ramp(pixels: usize) -> Vec<ColourIndex> {
    (0..pixels).map(|i| (i % 16) as ColourIndex).collect()
}
