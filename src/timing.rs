// Display timing - Raster generator for the display domain
//
// Each line is `h_blank` blanking ticks followed by `h_active` active ticks;
// each frame is `v_blank` blanking lines followed by `v_active` active lines.
// Beam coordinates are negative during blanking, so the active area is
// exactly `0 <= sx < h_active, 0 <= sy < v_active`.

use serde::{Deserialize, Serialize};

use crate::pipeline::{ConfigError, DisplayInputs, PipelineConfig};

/// Raster extents in display ticks and lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingConfig {
    pub h_active: usize,
    pub h_blank: usize,
    pub v_active: usize,
    pub v_blank: usize,
}

/// Timing signals for one display tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplaySignals {
    /// Inside the active area
    pub de: bool,
    /// First tick of the frame
    pub frame: bool,
    /// First tick of a line
    pub line: bool,
    /// Horizontal beam position
    pub sx: i64,
    /// Vertical beam position
    pub sy: i64,
}

impl From<DisplaySignals> for DisplayInputs {
    fn from(signals: DisplaySignals) -> Self {
        DisplayInputs {
            de: signals.de,
            frame: signals.frame,
            line: signals.line,
        }
    }
}

/// Raster generator
#[derive(Debug, Clone)]
pub struct DisplayTiming {
    config: TimingConfig,
    /// Position within the line, 0 is the first blanking tick
    h: usize,
    /// Line within the frame, 0 is the first blanking line
    v: usize,
    frames: u64,
}

impl DisplayTiming {
    /// Create a raster generator positioned at the start of a frame
    ///
    /// # Arguments
    /// * `config` - Raster extents; every extent must be at least 1
    pub fn new(config: TimingConfig) -> Result<Self, ConfigError> {
        if config.h_active == 0 || config.v_active == 0 {
            return Err(ConfigError::Timing(format!(
                "active area {}x{} is empty",
                config.h_active, config.v_active
            )));
        }
        if config.h_blank == 0 || config.v_blank == 0 {
            return Err(ConfigError::Timing(format!(
                "blanking {}x{} must be at least one tick and one line",
                config.h_blank, config.v_blank
            )));
        }

        Ok(DisplayTiming {
            config,
            h: 0,
            v: 0,
            frames: 0,
        })
    }

    /// Create a raster whose active area is the scaled framebuffer
    ///
    /// # Arguments
    /// * `pipeline` - Framebuffer geometry and scale
    /// * `h_blank` - Blanking ticks per line
    /// * `v_blank` - Blanking lines per frame
    pub fn for_pipeline(
        pipeline: &PipelineConfig,
        h_blank: usize,
        v_blank: usize,
    ) -> Result<Self, ConfigError> {
        Self::new(TimingConfig {
            h_active: pipeline.scaled_width(),
            h_blank,
            v_active: pipeline.scaled_height(),
            v_blank,
        })
    }

    /// Check that the active area matches the scaled framebuffer
    pub fn check_pipeline(&self, pipeline: &PipelineConfig) -> Result<(), ConfigError> {
        let (w, h) = (pipeline.scaled_width(), pipeline.scaled_height());
        if self.config.h_active != w || self.config.v_active != h {
            return Err(ConfigError::Timing(format!(
                "active area {}x{} does not match scaled framebuffer {}x{}",
                self.config.h_active, self.config.v_active, w, h
            )));
        }
        Ok(())
    }

    pub fn config(&self) -> &TimingConfig {
        &self.config
    }

    /// Ticks per line
    pub fn h_total(&self) -> usize {
        self.config.h_blank + self.config.h_active
    }

    /// Lines per frame
    pub fn v_total(&self) -> usize {
        self.config.v_blank + self.config.v_active
    }

    /// Ticks per frame
    pub fn ticks_per_frame(&self) -> usize {
        self.h_total() * self.v_total()
    }

    /// Completed frames
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Signals for the current tick, without advancing
    pub fn signals(&self) -> DisplaySignals {
        let sx = self.h as i64 - self.config.h_blank as i64;
        let sy = self.v as i64 - self.config.v_blank as i64;
        DisplaySignals {
            de: sx >= 0 && sy >= 0,
            frame: self.h == 0 && self.v == 0,
            line: self.h == 0,
            sx,
            sy,
        }
    }

    /// Advance one display tick
    ///
    /// # Returns
    /// Signals for this tick, from the position before the advance
    pub fn tick(&mut self) -> DisplaySignals {
        let signals = self.signals();

        self.h += 1;
        if self.h == self.h_total() {
            self.h = 0;
            self.v += 1;
            if self.v == self.v_total() {
                self.v = 0;
                self.frames += 1;
            }
        }

        signals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timing() -> DisplayTiming {
        DisplayTiming::new(TimingConfig {
            h_active: 4,
            h_blank: 3,
            v_active: 2,
            v_blank: 2,
        })
        .expect("valid timing")
    }

    #[test]
    fn test_frame_and_line_pulses() {
        let mut t = timing();
        let frame: Vec<DisplaySignals> = (0..t.ticks_per_frame()).map(|_| t.tick()).collect();

        assert_eq!(frame.len(), 28);
        assert_eq!(frame.iter().filter(|s| s.frame).count(), 1);
        assert!(frame[0].frame);
        assert_eq!(frame.iter().filter(|s| s.line).count(), 4);
        assert_eq!(frame.iter().filter(|s| s.de).count(), 8);
        assert_eq!(t.frames(), 1);
    }

    #[test]
    fn test_blanking_precedes_active_area() {
        let mut t = timing();
        let first = t.tick();
        assert_eq!((first.sx, first.sy), (-3, -2));

        let active: Vec<(i64, i64)> = (1..t.ticks_per_frame())
            .map(|_| t.tick())
            .filter(|s| s.de)
            .map(|s| (s.sx, s.sy))
            .collect();
        assert_eq!(active[0], (0, 0));
        assert_eq!(active[7], (3, 1));
    }

    #[test]
    fn test_rejects_empty_extents() {
        let config = TimingConfig {
            h_active: 4,
            h_blank: 0,
            v_active: 2,
            v_blank: 2,
        };
        assert!(matches!(DisplayTiming::new(config), Err(ConfigError::Timing(_))));
    }

    #[test]
    fn test_active_area_must_match_pipeline() {
        let pipeline = PipelineConfig::new(4, 2).with_scale(2);
        let t = DisplayTiming::for_pipeline(&pipeline, 4, 2).expect("valid timing");
        assert_eq!(t.check_pipeline(&pipeline), Ok(()));
        assert!(t.check_pipeline(&PipelineConfig::new(4, 2).with_scale(1)).is_err());
    }
}
