// Pipeline configuration
//
// Everything here is fixed when a `Framebuffer` is built. Nothing can be
// changed while the pipeline runs.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cdc::MIN_SYNC_STAGES;

/// Widest supported coordinate
pub const MAX_COORD_BITS: u32 = 32;

/// Widest supported colour index
pub const MAX_CIDX_BITS: u32 = 16;

/// Widest supported colour channel
pub const MAX_CHAN_BITS: u32 = 8;

/// Errors raised when a configuration or its startup data is inconsistent
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("framebuffer must be at least 1x1, got {width}x{height}")]
    EmptyFramebuffer { width: usize, height: usize },

    #[error("coordinate width {0} is outside 2..=32 bits")]
    CoordBits(u32),

    #[error("{bits}-bit signed coordinates cannot address a {width}x{height} framebuffer")]
    CoordTooNarrow {
        bits: u32,
        width: usize,
        height: usize,
    },

    #[error("colour index width {0} is outside 1..=16 bits")]
    IndexBits(u32),

    #[error("channel width {0} is outside 1..=8 bits")]
    ChannelBits(u32),

    #[error("scale factor must be at least 1")]
    ZeroScale,

    #[error("at least {min} synchroniser stages are required, got {got}")]
    SyncStages { min: usize, got: usize },

    #[error("memory read latency must be at least 1 tick")]
    MemoryLatency,

    #[error("image has {got} entries, framebuffer needs {expected}")]
    ImageSize { expected: usize, got: usize },

    #[error("palette has {got} entries, {cidx_bits}-bit indices allow at most {max}")]
    PaletteSize {
        got: usize,
        max: usize,
        cidx_bits: u32,
    },

    #[error("memory holds {got} entries, framebuffer needs {expected}")]
    MemoryDepth { expected: usize, got: usize },

    #[error("memory reports read latency {got}, configuration expects {expected}")]
    MemoryLatencyMismatch { expected: usize, got: usize },

    #[error("line buffer scales by {got}, configuration expects {expected}")]
    LineBufferScale { expected: usize, got: usize },

    #[error("line buffer request latency {request} is shorter than frame latency {frame}")]
    RequestBeforeFrame { request: usize, frame: usize },

    #[error("display timing is invalid: {0}")]
    Timing(String),

    #[error("clock frequencies must be non-zero, got {compute_hz} Hz and {display_hz} Hz")]
    ClockFrequency { compute_hz: u64, display_hz: u64 },
}

/// Registers on the read path between the scan address and the palette
///
/// The sum of the three parts is the depth of the shift register that
/// delays the line buffer's input enable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatencyConfig {
    /// Registers between the scan address and the memory read port
    pub address_stages: usize,

    /// Read latency of the framebuffer memory
    pub memory_read: usize,

    /// Registers between the memory data and the palette lookup
    pub palette_stages: usize,
}

impl LatencyConfig {
    /// Total ticks from a scan address to its palette colour
    pub fn read_path(&self) -> usize {
        self.address_stages + self.memory_read + self.palette_stages
    }
}

impl Default for LatencyConfig {
    fn default() -> Self {
        LatencyConfig {
            address_stages: 1,
            memory_read: 1,
            palette_stages: 1,
        }
    }
}

/// Framebuffer pipeline configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Framebuffer width in pixels
    pub width: usize,

    /// Framebuffer height in pixels
    pub height: usize,

    /// Signed coordinate width
    pub coord_bits: u32,

    /// Colour index width
    pub cidx_bits: u32,

    /// Colour channel width
    pub chan_bits: u32,

    /// Integer scale factor from framebuffer to display, both axes
    pub scale: usize,

    /// Synchroniser registers for pulses entering the compute domain
    pub sync_stages: usize,

    /// Read path registers
    pub latency: LatencyConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            width: 160,
            height: 120,
            coord_bits: 16,
            cidx_bits: 4,
            chan_bits: 4,
            scale: 4,
            sync_stages: MIN_SYNC_STAGES,
            latency: LatencyConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Create a configuration for a `width` x `height` framebuffer
    ///
    /// Other fields take their default values.
    pub fn new(width: usize, height: usize) -> Self {
        PipelineConfig {
            width,
            height,
            ..Self::default()
        }
    }

    /// Set the coordinate width
    pub fn with_coord_bits(mut self, bits: u32) -> Self {
        self.coord_bits = bits;
        self
    }

    /// Set the colour index width
    pub fn with_cidx_bits(mut self, bits: u32) -> Self {
        self.cidx_bits = bits;
        self
    }

    /// Set the channel width
    pub fn with_chan_bits(mut self, bits: u32) -> Self {
        self.chan_bits = bits;
        self
    }

    /// Set the scale factor
    pub fn with_scale(mut self, scale: usize) -> Self {
        self.scale = scale;
        self
    }

    /// Set the synchroniser depth
    pub fn with_sync_stages(mut self, stages: usize) -> Self {
        self.sync_stages = stages;
        self
    }

    /// Set the read path latency
    pub fn with_latency(mut self, latency: LatencyConfig) -> Self {
        self.latency = latency;
        self
    }

    /// Number of framebuffer pixels
    pub fn pixels(&self) -> usize {
        self.width * self.height
    }

    /// Maximum number of palette entries
    pub fn palette_entries(&self) -> usize {
        1usize << self.cidx_bits
    }

    /// Display width after scaling
    pub fn scaled_width(&self) -> usize {
        self.width * self.scale
    }

    /// Display height after scaling
    pub fn scaled_height(&self) -> usize {
        self.height * self.scale
    }

    /// Check the configuration for internal consistency
    ///
    /// # Returns
    /// `Ok(())` or the first problem found
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyFramebuffer {
                width: self.width,
                height: self.height,
            });
        }
        if !(2..=MAX_COORD_BITS).contains(&self.coord_bits) {
            return Err(ConfigError::CoordBits(self.coord_bits));
        }

        // The largest in-range coordinate must be a positive signed value
        let max_positive = (1i64 << (self.coord_bits - 1)) - 1;
        if self.width as i64 - 1 > max_positive || self.height as i64 - 1 > max_positive {
            return Err(ConfigError::CoordTooNarrow {
                bits: self.coord_bits,
                width: self.width,
                height: self.height,
            });
        }

        if !(1..=MAX_CIDX_BITS).contains(&self.cidx_bits) {
            return Err(ConfigError::IndexBits(self.cidx_bits));
        }
        if !(1..=MAX_CHAN_BITS).contains(&self.chan_bits) {
            return Err(ConfigError::ChannelBits(self.chan_bits));
        }
        if self.scale == 0 {
            return Err(ConfigError::ZeroScale);
        }
        if self.sync_stages < MIN_SYNC_STAGES {
            return Err(ConfigError::SyncStages {
                min: MIN_SYNC_STAGES,
                got: self.sync_stages,
            });
        }
        if self.latency.memory_read == 0 {
            return Err(ConfigError::MemoryLatency);
        }

        Ok(())
    }
}
