//! Cycle-level pipeline tests
//!
//! These drive a complete `Framebuffer` through both clock domains with a
//! real raster, organised by the property under test.

use super::*;
use crate::memory::greyscale_palette;
use crate::timing::{DisplaySignals, DisplayTiming};
use std::collections::VecDeque;

// ========================================
// Test Constants
// ========================================

pub(crate) const WHITE: Rgb = Rgb::new(15, 15, 15);

/// Blanking ticks per line in the test rasters
pub(crate) const H_BLANK: usize = 12;

/// Blanking lines per frame in the test rasters
pub(crate) const V_BLANK: usize = 2;

// ========================================
// Test Helper Functions
// ========================================

/// 4x2 framebuffer with a black/white palette, all pixels 0
pub(crate) fn small_framebuffer(scale: usize) -> Framebuffer {
    let config = PipelineConfig::new(4, 2).with_cidx_bits(1).with_scale(scale);
    Framebuffer::new(config, vec![0; 8], vec![Rgb::BLACK, WHITE]).expect("valid framebuffer")
}

/// Row-major ramp of colour indices, wrapping at 16
pub(crate) fn ramp(pixels: usize) -> Vec<ColourIndex> {
    (0..pixels).map(|i| (i % 16) as ColourIndex).collect()
}

/// Framebuffer holding a ramp, with a greyscale palette and custom read latencies
pub(crate) fn ramp_framebuffer(width: usize, height: usize, latency: LatencyConfig) -> Framebuffer {
    let config = PipelineConfig::new(width, height)
        .with_scale(1)
        .with_latency(latency);
    Framebuffer::new(config, ramp(width * height), greyscale_palette(4, 4))
        .expect("valid framebuffer")
}

/// Colours a ramp image should display as
pub(crate) fn ramp_colours(pixels: usize) -> Vec<Rgb> {
    let palette = greyscale_palette(4, 4);
    ramp(pixels).iter().map(|&i| palette[i as usize]).collect()
}

pub(crate) fn timing_for(fb: &Framebuffer) -> DisplayTiming {
    DisplayTiming::for_pipeline(fb.config(), H_BLANK, V_BLANK).expect("valid timing")
}

/// Both clock domains, driven in lock step
pub(crate) struct Rig {
    pub fb: Framebuffer,
    pub timing: DisplayTiming,
    /// Compute ticks per display tick
    pub ratio: usize,
    pub writes: VecDeque<WriteRequest>,
    /// Every compute tick so far
    pub compute: Vec<ComputeSignals>,
    position: DelayLine<DisplaySignals>,
}

impl Rig {
    pub fn new(fb: Framebuffer, ratio: usize) -> Self {
        let timing = timing_for(&fb);
        let position = DelayLine::new(fb.display_latency(), DisplaySignals::default());
        Rig {
            fb,
            timing,
            ratio,
            writes: VecDeque::new(),
            compute: Vec::new(),
            position,
        }
    }

    /// Run display ticks until one full active area has been output
    ///
    /// # Returns
    /// The active area in raster order, and every display output seen
    pub fn run_frame(&mut self) -> (Vec<Rgb>, Vec<(DisplaySignals, DisplayOutputs)>) {
        let active = self.timing.config().h_active * self.timing.config().v_active;
        let mut pixels = Vec::with_capacity(active);
        let mut outputs = Vec::new();

        while pixels.len() < active {
            let signals = self.timing.tick();
            let out = self.fb.tick_display(signals.into());
            let at = self.position.tick(signals);
            if at.de {
                pixels.push(out.colour);
            }
            outputs.push((at, out));

            for _ in 0..self.ratio {
                let request = self.writes.pop_front().unwrap_or(WriteRequest::IDLE);
                let signals = self.fb.tick_compute(request);
                self.compute.push(signals);
            }
        }

        (pixels, outputs)
    }

    /// Present `requests` on consecutive compute ticks, with no display ticks
    pub fn write_now(&mut self, requests: &[WriteRequest]) -> Vec<ComputeSignals> {
        requests
            .iter()
            .chain(std::iter::repeat(&WriteRequest::IDLE).take(WritePipeline::LATENCY + 1))
            .map(|&r| self.fb.tick_compute(r))
            .collect()
    }
}

/// Expected active area with `scale` applied to a row-major colour image
pub(crate) fn scaled(image: &[Rgb], width: usize, scale: usize) -> Vec<Rgb> {
    image
        .chunks(width)
        .flat_map(|row| {
            let line: Vec<Rgb> = row
                .iter()
                .flat_map(|&c| std::iter::repeat(c).take(scale))
                .collect();
            std::iter::repeat(line).take(scale).flatten()
        })
        .collect()
}

// ========================================
// Test Modules
// ========================================

mod scan;
