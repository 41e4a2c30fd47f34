// Scheduler - Interleave the compute and display clocks
//
// Edge k of a domain clocked at f Hz happens at time k / f. The scheduler
// always fires the earliest pending edge, comparing times exactly by
// cross-multiplication; when both edges coincide the display edge goes first.

use std::collections::VecDeque;

use tracing::{debug, info};

use super::{AppConfig, Frame, SimError};
use crate::debug::{Domain, SignalEvent, SignalLog};
use crate::delay::DelayLine;
use crate::memory::{greyscale_palette, load_image_hex, load_palette_hex};
use crate::pipeline::{ComputeSignals, ConfigError, Framebuffer, WritePipeline, WriteRequest};
use crate::pixel::Rgb;
use crate::timing::{DisplaySignals, DisplayTiming};

/// Single-threaded driver for a `Framebuffer`
pub struct Scheduler {
    fb: Framebuffer,
    timing: DisplayTiming,
    compute_hz: u64,
    display_hz: u64,
    compute_edges: u64,
    display_edges: u64,

    /// Writes waiting for a compute tick, one admitted per tick
    writes: VecDeque<WriteRequest>,
    /// Request presented on the previous compute tick
    last_request: WriteRequest,
    clips: u64,
    writes_landed: u64,

    /// Beam position, delayed to line up with the output pixel
    position: DelayLine<DisplaySignals>,
    current: Vec<Rgb>,
    frames_completed: u64,

    log: Option<SignalLog>,
}

impl Scheduler {
    /// Create a scheduler
    ///
    /// # Arguments
    /// * `fb` - The framebuffer to drive
    /// * `timing` - Raster generator; its active area must match the scaled framebuffer
    /// * `compute_hz` - Compute clock frequency
    /// * `display_hz` - Display clock frequency
    pub fn new(
        fb: Framebuffer,
        timing: DisplayTiming,
        compute_hz: u64,
        display_hz: u64,
    ) -> Result<Self, ConfigError> {
        if compute_hz == 0 || display_hz == 0 {
            return Err(ConfigError::ClockFrequency {
                compute_hz,
                display_hz,
            });
        }
        timing.check_pipeline(fb.config())?;
        check_refill(&fb, &timing, compute_hz, display_hz)?;

        info!(
            compute_hz,
            display_hz,
            h_total = timing.h_total(),
            v_total = timing.v_total(),
            "scheduler ready"
        );

        let position = DelayLine::new(fb.display_latency(), DisplaySignals::default());
        let active = timing.config().h_active * timing.config().v_active;

        Ok(Scheduler {
            fb,
            timing,
            compute_hz,
            display_hz,
            compute_edges: 0,
            display_edges: 0,
            writes: VecDeque::new(),
            last_request: WriteRequest::IDLE,
            clips: 0,
            writes_landed: 0,
            position,
            current: Vec::with_capacity(active),
            frames_completed: 0,
            log: None,
        })
    }

    /// Build a scheduler, framebuffer and raster from configuration
    ///
    /// Missing image or palette files fall back to a blank image and a
    /// greyscale palette.
    pub fn from_config(config: &AppConfig) -> Result<Self, SimError> {
        let pipeline = config.pipeline.clone();
        pipeline.validate()?;

        let image = match &config.sim.image {
            Some(path) => load_image_hex(path, pipeline.cidx_bits)?,
            None => vec![0; pipeline.pixels()],
        };
        let palette = match &config.sim.palette {
            Some(path) => load_palette_hex(path, pipeline.chan_bits)?,
            None => greyscale_palette(pipeline.cidx_bits, pipeline.chan_bits),
        };

        let timing =
            DisplayTiming::for_pipeline(&pipeline, config.sim.h_blank, config.sim.v_blank)?;
        let fb = Framebuffer::new(pipeline, image, palette)?;

        Ok(Self::new(
            fb,
            timing,
            config.sim.compute_hz,
            config.sim.display_hz,
        )?)
    }

    /// Record pipeline events into `log` from now on
    pub fn attach_signal_log(&mut self, log: SignalLog) {
        self.log = Some(log);
    }

    pub fn signal_log(&self) -> Option<&SignalLog> {
        self.log.as_ref()
    }

    pub fn take_signal_log(&mut self) -> Option<SignalLog> {
        self.log.take()
    }

    /// Queue a write for the next free compute tick
    pub fn queue_write(&mut self, request: WriteRequest) {
        self.writes.push_back(request);
    }

    /// Queue writes in order, one per compute tick
    pub fn queue_writes<I: IntoIterator<Item = WriteRequest>>(&mut self, requests: I) {
        self.writes.extend(requests);
    }

    /// Writes not yet presented to the pipeline
    pub fn pending_writes(&self) -> usize {
        self.writes.len()
    }

    /// Fire the earliest pending clock edge
    ///
    /// # Returns
    /// The frame completed by this edge, if any
    pub fn step(&mut self) -> Option<Frame> {
        let display_at = u128::from(self.display_edges) * u128::from(self.compute_hz);
        let compute_at = u128::from(self.compute_edges) * u128::from(self.display_hz);

        if display_at <= compute_at {
            self.tick_display()
        } else {
            self.tick_compute();
            None
        }
    }

    /// Run until the next frame has been output in full
    pub fn run_frame(&mut self) -> Frame {
        loop {
            if let Some(frame) = self.step() {
                return frame;
            }
        }
    }

    /// Run `count` complete frames
    pub fn run_frames(&mut self, count: usize) -> Vec<Frame> {
        (0..count).map(|_| self.run_frame()).collect()
    }

    /// Run until every queued write has reached memory
    pub fn flush_writes(&mut self) {
        while !self.writes.is_empty() {
            self.step();
        }
        let target = self.compute_edges + WritePipeline::LATENCY as u64;
        while self.compute_edges < target {
            self.step();
        }
    }

    fn tick_compute(&mut self) -> ComputeSignals {
        let tick = self.compute_edges;
        let request = self.writes.pop_front().unwrap_or(WriteRequest::IDLE);
        let signals = self.fb.tick_compute(request);
        self.compute_edges += 1;

        // `clip` answers the request from the previous tick
        if signals.clip && self.last_request.enable {
            self.clips += 1;
            self.record(SignalEvent::Clip {
                tick,
                x: self.last_request.x,
                y: self.last_request.y,
            });
        }
        if let Some(write) = signals.write {
            self.writes_landed += 1;
            self.record(SignalEvent::Write {
                tick,
                address: write.address,
                index: write.index,
            });
        }
        if signals.frame {
            self.record(SignalEvent::FrameStart {
                tick,
                domain: Domain::Compute,
            });
        }
        if signals.data_request {
            let address = self.fb.scan().address();
            self.record(SignalEvent::DataRequest { tick, address });
        }

        self.last_request = request;
        signals
    }

    fn tick_display(&mut self) -> Option<Frame> {
        let tick = self.display_edges;
        let signals = self.timing.tick();
        let output = self.fb.tick_display(signals.into());
        let at = self.position.tick(signals);
        self.display_edges += 1;

        if signals.frame {
            self.record(SignalEvent::FrameStart {
                tick,
                domain: Domain::Display,
            });
        }
        if !at.de {
            return None;
        }

        if at.sx == 0 && at.sy == 0 {
            self.current.clear();
        }
        self.current.push(output.colour);

        let config = *self.timing.config();
        let last_x = config.h_active as i64 - 1;
        let last_y = config.v_active as i64 - 1;
        if at.sx != last_x || at.sy != last_y {
            return None;
        }

        let active = config.h_active * config.v_active;
        let pixels = std::mem::replace(&mut self.current, Vec::with_capacity(active));
        if pixels.len() != active {
            // Started mid-frame
            return None;
        }

        let number = self.frames_completed;
        self.frames_completed += 1;
        debug!(frame = number, tick, "frame complete");
        self.record(SignalEvent::FrameComplete {
            tick,
            frame: number,
        });

        Some(Frame {
            number,
            width: config.h_active,
            height: config.v_active,
            chan_bits: self.fb.config().chan_bits,
            pixels,
        })
    }

    fn record(&mut self, event: SignalEvent) {
        if let Some(log) = self.log.as_mut() {
            log.record(event);
        }
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.fb
    }

    pub fn timing(&self) -> &DisplayTiming {
        &self.timing
    }

    /// Enabled writes that were clipped
    pub fn clips(&self) -> u64 {
        self.clips
    }

    /// Writes that reached the memory port
    pub fn writes_landed(&self) -> u64 {
        self.writes_landed
    }

    pub fn frames_completed(&self) -> u64 {
        self.frames_completed
    }

    pub fn compute_ticks(&self) -> u64 {
        self.compute_edges
    }

    pub fn display_ticks(&self) -> u64 {
        self.display_edges
    }
}

/// Check that every line can be refilled before the display needs it
///
/// A request raised on display tick `t` reaches the scan after the line
/// buffer's request latency, and the scanned pixels reach the line buffer
/// one enable delay later. Requests are one scaled line apart, or the
/// vertical blanking plus one horizontal blanking apart at the top of a
/// frame. For each gap:
/// - the previous line's last pixel must be written before the next
///   request restarts the bank
/// - pixel `p` must be written before display tick `gap + p * scale` reads it
fn check_refill(
    fb: &Framebuffer,
    timing: &DisplayTiming,
    compute_hz: u64,
    display_hz: u64,
) -> Result<(), ConfigError> {
    let config = fb.config();
    let raster = timing.config();
    let (fc, fd) = (u128::from(compute_hz), u128::from(display_hz));
    let width = config.width as u128;
    let scale = config.scale as u128;
    let h_total = timing.h_total() as u128;
    let enable_delay = fb.enable_delay() as u128;

    // Compute ticks between requests never fall below floor(gap * fc / fd)
    let busy = width + enable_delay + 1;
    // The first compute edge after a display edge may lag it by up to one tick
    let first_pixel = fb.line_buffer().request_latency() as u128 + enable_delay + 1;

    let gaps = [
        scale * h_total,
        raster.v_blank as u128 * h_total + raster.h_blank as u128,
    ];
    for gap in gaps {
        let restart_ok = gap * fc >= busy * fd;
        let read_ok = [0, width - 1]
            .iter()
            .all(|&p| (first_pixel + p) * fd <= (gap + p * scale) * fc);

        if !restart_ok || !read_ok {
            return Err(ConfigError::Timing(format!(
                "{} display ticks between line requests cannot refill {} pixels \
                 at {} Hz compute / {} Hz display",
                gap, width, compute_hz, display_hz
            )));
        }
    }

    Ok(())
}
