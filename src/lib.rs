// Framebuffer Pipeline Library
// Cycle-stepped model of an indexed-colour framebuffer spanning two clock domains

// Public modules
pub mod cdc;
pub mod debug;
pub mod delay;
pub mod draw;
pub mod linebuffer;
pub mod memory;
pub mod pipeline;
pub mod pixel;
pub mod sim;
pub mod timing;

// Re-export main types for convenience
pub use cdc::{pulse_sync, PulseReceiver, PulseSender};
pub use debug::{LogFilter, SignalEvent, SignalLog};
pub use delay::DelayLine;
pub use linebuffer::{LineBuffer, ScalingLineBuffer};
pub use memory::{FrameMemory, IndexedMemory, PaletteMemory, PaletteRom};
pub use pipeline::{
    ComputeSignals, ConfigError, DisplayInputs, DisplayOutputs, Framebuffer, LatencyConfig,
    PipelineConfig, WriteRequest,
};
pub use pixel::{ColourIndex, Coord, Rgb};
pub use sim::{AppConfig, Frame, Scheduler, SimConfig};
pub use timing::{DisplaySignals, DisplayTiming, TimingConfig};
