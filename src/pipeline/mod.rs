// Pipeline module - Indexed-colour framebuffer core
//
// The core spans two clock domains:
// - Compute: write pipeline, scan pipeline, read path latency matching and
//   both memory ports. Advanced by `Framebuffer::tick_compute`.
// - Display: frame pulse sender and output stage. Advanced by
//   `Framebuffer::tick_display`.
//
// The only state shared between the two is the frame pulse crossing and the
// line buffer, which synchronises its own requests.
//
// ```text
//            compute                                           | display
//  request -> write -> memory write port                        |
//  frame_rx -> scan -> [addr] -> memory read -> [pal] -> palette -> line buffer -> output -> rgb
//                  \-------------- enable delay --------------/ |
// ```

pub mod config;
pub mod output;
pub mod scan;
pub mod write;

#[cfg(test)]
mod tests;

pub use config::{ConfigError, LatencyConfig, PipelineConfig};
pub use output::OutputStage;
pub use scan::{ScanOutputs, ScanPipeline};
pub use write::{WriteOutputs, WritePipeline, WriteRequest};

use tracing::{debug, info, trace};

use crate::cdc::{pulse_sync, PulseReceiver, PulseSender};
use crate::delay::DelayLine;
use crate::linebuffer::{LineBuffer, LineInput, LineOutputControl, ScalingLineBuffer};
use crate::memory::{FrameMemory, IndexedMemory, MemoryWrite, PaletteMemory, PaletteRom};
use crate::pixel::{ColourIndex, Rgb};

/// Signals observed in the compute domain during one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComputeSignals {
    /// The write requested on the previous tick was clipped
    pub clip: bool,
    /// Write port drive
    pub write: Option<MemoryWrite>,
    /// Scan pipeline drive, before latency matching
    pub scan: ScanOutputs,
    /// Address on the memory read port
    pub read_address: usize,
    /// Frame pulse after the domain crossing
    pub frame: bool,
    /// Line buffer request for a new line
    pub data_request: bool,
    /// Latency-matched enable presented to the line buffer
    pub line_enable: bool,
    /// Palette colour presented to the line buffer
    pub colour: Rgb,
}

/// Display-domain inputs for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayInputs {
    /// Data enable, high inside the active area
    pub de: bool,
    /// First tick of the frame
    pub frame: bool,
    /// First tick of the line
    pub line: bool,
}

/// Display-domain outputs for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayOutputs {
    /// Data enable delayed to line up with `colour`
    pub enable: bool,
    /// Pixel colour, black outside the active area
    pub colour: Rgb,
}

/// Dual-domain indexed-colour framebuffer
pub struct Framebuffer {
    config: PipelineConfig,

    // ========================================
    // Compute domain
    // ========================================
    write: WritePipeline,
    scan: ScanPipeline,
    /// Scan address on its way to the memory read port
    address_pipe: DelayLine<usize>,
    /// Memory data on its way to the palette
    palette_pipe: DelayLine<ColourIndex>,
    /// Scan enable, delayed to line up with the palette colour
    enable_pipe: DelayLine<bool>,
    frame_rx: PulseReceiver,
    memory: Box<dyn IndexedMemory + Send>,
    palette: Box<dyn PaletteMemory + Send>,
    compute_ticks: u64,

    // ========================================
    // Display domain
    // ========================================
    frame_tx: PulseSender,
    output: OutputStage,
    display_ticks: u64,

    line_buffer: Box<dyn LineBuffer + Send>,
}

impl Framebuffer {
    /// Create a framebuffer with the reference memories and line buffer
    ///
    /// # Arguments
    /// * `config` - Pipeline configuration
    /// * `image` - Initial colour index per pixel, row-major
    /// * `palette` - Colour per index, at most `2^cidx_bits` entries
    ///
    /// # Returns
    /// The framebuffer, or the first configuration problem found
    ///
    /// # Example
    ///
    /// ```
    /// use fbpipe::memory::greyscale_palette;
    /// use fbpipe::pipeline::{Framebuffer, PipelineConfig};
    ///
    /// let config = PipelineConfig::new(4, 2).with_cidx_bits(1).with_scale(1);
    /// let fb = Framebuffer::new(config, vec![0; 8], greyscale_palette(1, 4)).unwrap();
    /// assert_eq!(fb.enable_delay(), 3);
    /// ```
    pub fn new(
        config: PipelineConfig,
        image: Vec<ColourIndex>,
        palette: Vec<Rgb>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        if image.len() != config.pixels() {
            return Err(ConfigError::ImageSize {
                expected: config.pixels(),
                got: image.len(),
            });
        }

        let memory = FrameMemory::new(image, config.latency.memory_read, config.cidx_bits);
        let palette = PaletteRom::new(palette, config.cidx_bits, config.chan_bits);
        let line_buffer = ScalingLineBuffer::new(config.width, config.scale, config.sync_stages);

        Self::with_parts(
            config,
            Box::new(memory),
            Box::new(palette),
            Box::new(line_buffer),
        )
    }

    /// Create a framebuffer around caller-supplied collaborators
    ///
    /// The enable delay is derived from the memory's reported read latency,
    /// which must agree with `config.latency.memory_read`. The line buffer's
    /// requests must not reach the compute domain ahead of the frame pulse:
    /// a request seen before the frame would start from the previous
    /// frame's exhausted address, and line 0 would never be fetched.
    pub fn with_parts(
        config: PipelineConfig,
        memory: Box<dyn IndexedMemory + Send>,
        palette: Box<dyn PaletteMemory + Send>,
        line_buffer: Box<dyn LineBuffer + Send>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        if memory.depth() != config.pixels() {
            return Err(ConfigError::MemoryDepth {
                expected: config.pixels(),
                got: memory.depth(),
            });
        }
        if memory.read_latency() != config.latency.memory_read {
            return Err(ConfigError::MemoryLatencyMismatch {
                expected: config.latency.memory_read,
                got: memory.read_latency(),
            });
        }
        if palette.len() > config.palette_entries() {
            return Err(ConfigError::PaletteSize {
                got: palette.len(),
                max: config.palette_entries(),
                cidx_bits: config.cidx_bits,
            });
        }
        if line_buffer.scale() != config.scale {
            return Err(ConfigError::LineBufferScale {
                expected: config.scale,
                got: line_buffer.scale(),
            });
        }

        let (frame_tx, frame_rx) = pulse_sync(config.sync_stages);
        if line_buffer.request_latency() < frame_rx.latency() {
            return Err(ConfigError::RequestBeforeFrame {
                request: line_buffer.request_latency(),
                frame: frame_rx.latency(),
            });
        }

        let latency = config.latency;
        let enable_delay = latency.address_stages + memory.read_latency() + latency.palette_stages;

        info!(
            width = config.width,
            height = config.height,
            scale = config.scale,
            cidx_bits = config.cidx_bits,
            chan_bits = config.chan_bits,
            enable_delay,
            "framebuffer pipeline created"
        );

        Ok(Framebuffer {
            write: WritePipeline::new(
                config.width,
                config.height,
                config.coord_bits,
                config.cidx_bits,
            ),
            scan: ScanPipeline::new(config.width, config.height),
            address_pipe: DelayLine::new(latency.address_stages, 0),
            palette_pipe: DelayLine::new(latency.palette_stages, 0),
            enable_pipe: DelayLine::new(enable_delay, false),
            frame_rx,
            memory,
            palette,
            compute_ticks: 0,
            frame_tx,
            output: OutputStage::new(line_buffer.read_latency()),
            display_ticks: 0,
            line_buffer,
            config,
        })
    }

    /// Advance the compute domain one tick
    ///
    /// # Arguments
    /// * `request` - Pixel write presented this tick
    ///
    /// # Returns
    /// Signals driven during this tick
    pub fn tick_compute(&mut self, request: WriteRequest) -> ComputeSignals {
        let frame = self.frame_rx.tick();
        let data_request = self.line_buffer.data_request();

        let WriteOutputs { clip, write } = self.write.tick(request);
        let scan = self.scan.tick(data_request, frame);

        let read_address = self.address_pipe.tick(scan.address);
        let index = self.memory.tick(read_address, write);
        let index = self.palette_pipe.tick(index);
        let colour = self.palette.lookup(index);

        let line_enable = self.enable_pipe.tick(scan.enable);
        if frame {
            // Reads in flight belong to the previous frame
            self.enable_pipe.fill(false);
        }

        self.line_buffer.tick_input(LineInput {
            enable: line_enable,
            frame,
            colour,
        });

        if frame {
            debug!(tick = self.compute_ticks, "compute frame start");
        }
        if data_request {
            debug!(
                tick = self.compute_ticks,
                address = self.scan.address(),
                "line data request"
            );
        }
        if let Some(w) = write {
            trace!(address = w.address, index = w.index, "pixel write");
        }
        if clip {
            trace!(tick = self.compute_ticks, "write clipped");
        }

        self.compute_ticks += 1;

        ComputeSignals {
            clip,
            write,
            scan,
            read_address,
            frame,
            data_request,
            line_enable,
            colour,
        }
    }

    /// Advance the display domain one tick
    ///
    /// # Arguments
    /// * `inputs` - Raster timing signals for this tick
    ///
    /// # Returns
    /// The pixel driven during this tick
    pub fn tick_display(&mut self, inputs: DisplayInputs) -> DisplayOutputs {
        self.frame_tx.tick(inputs.frame);

        let colour = self.line_buffer.tick_output(LineOutputControl {
            enable: inputs.de,
            frame: inputs.frame,
            line: inputs.line,
        });
        let (enable, colour) = self.output.tick(inputs.de, colour);

        if inputs.frame {
            debug!(tick = self.display_ticks, "display frame start");
        }
        self.display_ticks += 1;

        DisplayOutputs { enable, colour }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Colour index stored for `(x, y)`, bypassing the ports
    pub fn pixel(&self, x: usize, y: usize) -> Option<ColourIndex> {
        if x >= self.config.width || y >= self.config.height {
            return None;
        }
        self.memory.peek(y * self.config.width + x)
    }

    /// Colour the palette maps `index` to
    pub fn colour_of(&self, index: ColourIndex) -> Rgb {
        self.palette.lookup(index)
    }

    pub fn memory(&self) -> &dyn IndexedMemory {
        self.memory.as_ref()
    }

    pub fn line_buffer(&self) -> &dyn LineBuffer {
        self.line_buffer.as_ref()
    }

    /// Depth of the line buffer input enable delay
    pub fn enable_delay(&self) -> usize {
        self.enable_pipe.depth()
    }

    /// Display ticks from data enable to the matching output pixel
    pub fn display_latency(&self) -> usize {
        self.output.latency()
    }

    /// Compute ticks from a frame pulse to the core seeing it
    pub fn frame_latency(&self) -> usize {
        self.frame_rx.latency()
    }

    /// Compute ticks elapsed
    pub fn compute_ticks(&self) -> u64 {
        self.compute_ticks
    }

    /// Display ticks elapsed
    pub fn display_ticks(&self) -> u64 {
        self.display_ticks
    }

    /// Scan pipeline state
    pub fn scan(&self) -> &ScanPipeline {
        &self.scan
    }
}
