// Line buffer - Re-times one scanline at a time from compute to display
//
// The pipeline core only relies on the `LineBuffer` trait: the compute side
// fills a line when the buffer raises `data_request`, and the display side
// reads it back, scaled, one pixel per display tick.
//
// `ScalingLineBuffer` is the reference implementation: two line banks, one
// being displayed while the other is filled. Requests for the next line are
// raised in the display domain and carried into the compute domain by the
// buffer's own pulse synchroniser.

use tracing::trace;

use crate::cdc::{pulse_sync, PulseReceiver, PulseSender};
use crate::delay::DelayLine;
use crate::pixel::Rgb;

/// Compute-domain inputs for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineInput {
    /// Accept `colour` this tick
    pub enable: bool,
    /// Start of frame, already crossed into the compute domain
    pub frame: bool,
    /// Pixel colour from the palette
    pub colour: Rgb,
}

/// Display-domain controls for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineOutputControl {
    /// Emit a pixel this tick (the display data enable)
    pub enable: bool,
    /// Start of frame
    pub frame: bool,
    /// Start of line
    pub line: bool,
}

/// Scanline buffer between the compute and display domains
pub trait LineBuffer {
    /// Integer scale factor applied on both axes
    fn scale(&self) -> usize;

    /// Display ticks from an enabled output tick to its pixel
    fn read_latency(&self) -> usize;

    /// Compute ticks from a request raised on a display tick to
    /// `data_request` going high
    ///
    /// The first compute tick after the display edge counts as 1. A frame's
    /// first request must not reach the compute domain before the crossed
    /// frame pulse does, so this must be at least the core's frame latency.
    fn request_latency(&self) -> usize;

    /// Request for a new line, as seen by the compute domain this tick
    fn data_request(&self) -> bool;

    /// Advance one compute tick
    fn tick_input(&mut self, input: LineInput);

    /// Advance one display tick, returning the pixel presented this tick
    fn tick_output(&mut self, control: LineOutputControl) -> Rgb;
}

/// Reference double-buffered scaling line buffer
pub struct ScalingLineBuffer {
    banks: [Vec<Rgb>; 2],
    len: usize,
    scale: usize,

    // ========================================
    // Compute side
    // ========================================
    request_rx: PulseReceiver,
    /// Registered request output
    request: bool,
    write_bank: usize,
    write_pos: usize,

    // ========================================
    // Display side
    // ========================================
    request_tx: PulseSender,
    read_bank: usize,
    read_pos: usize,
    /// Output ticks spent on the current source pixel
    h_repeat: usize,
    /// Display lines shown from the current source line
    v_repeat: usize,
    /// Swap banks at the start of the next active line
    swap_due: bool,
    /// A line pulse arrived and its first active tick is still ahead
    line_pending: bool,
    output: DelayLine<Rgb>,
}

impl ScalingLineBuffer {
    /// Create a line buffer
    ///
    /// # Arguments
    /// * `len` - Source pixels per line
    /// * `scale` - Scale factor on both axes (at least 1)
    /// * `sync_stages` - Synchroniser depth for requests crossing into the compute domain
    pub fn new(len: usize, scale: usize, sync_stages: usize) -> Self {
        let (request_tx, request_rx) = pulse_sync(sync_stages);

        ScalingLineBuffer {
            banks: [vec![Rgb::BLACK; len], vec![Rgb::BLACK; len]],
            len,
            scale: scale.max(1),
            request_rx,
            request: false,
            write_bank: 1,
            // Nothing is accepted until the first request
            write_pos: len,
            request_tx,
            read_bank: 0,
            read_pos: 0,
            h_repeat: 0,
            v_repeat: 0,
            swap_due: true,
            line_pending: false,
            output: DelayLine::new(1, Rgb::BLACK),
        }
    }

    /// Source pixels per line
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Contents of the bank currently being displayed
    pub fn displayed_line(&self) -> &[Rgb] {
        &self.banks[self.read_bank]
    }
}

impl LineBuffer for ScalingLineBuffer {
    fn scale(&self) -> usize {
        self.scale
    }

    fn read_latency(&self) -> usize {
        self.output.depth()
    }

    fn request_latency(&self) -> usize {
        // Crossing, then the request register
        self.request_rx.latency() + 1
    }

    fn data_request(&self) -> bool {
        self.request
    }

    fn tick_input(&mut self, input: LineInput) {
        if self.request {
            self.write_bank = self.read_bank ^ 1;
            self.write_pos = 0;
        } else if input.frame {
            // Drop whatever is left of a line cut short by the new frame
            self.write_pos = self.len;
        } else if input.enable && self.write_pos < self.len {
            self.banks[self.write_bank][self.write_pos] = input.colour;
            self.write_pos += 1;
        }

        self.request = self.request_rx.tick();
    }

    fn tick_output(&mut self, control: LineOutputControl) -> Rgb {
        let mut request = false;

        if control.frame {
            self.v_repeat = 0;
            self.swap_due = true;
            request = true;
        }
        if control.line {
            self.line_pending = true;
            self.read_pos = 0;
            self.h_repeat = 0;
        }

        let pixel = if control.enable {
            if self.line_pending {
                self.line_pending = false;
                if self.swap_due {
                    self.read_bank ^= 1;
                    self.swap_due = false;
                    self.v_repeat = 0;
                    request = true;
                    trace!(bank = self.read_bank, "line buffer swap");
                }
                self.v_repeat += 1;
                if self.v_repeat >= self.scale {
                    self.swap_due = true;
                }
            }

            let pixel = self.banks[self.read_bank]
                .get(self.read_pos)
                .copied()
                .unwrap_or(Rgb::BLACK);

            self.h_repeat += 1;
            if self.h_repeat >= self.scale {
                self.h_repeat = 0;
                self.read_pos += 1;
            }

            pixel
        } else {
            Rgb::BLACK
        };

        self.request_tx.tick(request);
        self.output.tick(pixel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgb = Rgb::new(15, 0, 0);
    const GREEN: Rgb = Rgb::new(0, 15, 0);
    const BLUE: Rgb = Rgb::new(0, 0, 15);

    /// Serve requests on the compute side by streaming `line` straight in
    fn fill_on_request(lb: &mut ScalingLineBuffer, line: &[Rgb], ticks: usize) {
        let mut queue: Vec<Rgb> = Vec::new();
        for _ in 0..ticks {
            if lb.data_request() {
                lb.tick_input(LineInput::default());
                queue = line.iter().rev().copied().collect();
                continue;
            }
            match queue.pop() {
                Some(colour) => lb.tick_input(LineInput {
                    enable: true,
                    frame: false,
                    colour,
                }),
                None => lb.tick_input(LineInput::default()),
            }
        }
    }

    /// Display one line: a line pulse, some blanking, then `active` enabled ticks
    fn display_line(lb: &mut ScalingLineBuffer, blank: usize, active: usize) -> Vec<Rgb> {
        let mut out = Vec::new();
        lb.tick_output(LineOutputControl {
            enable: false,
            frame: false,
            line: true,
        });
        for _ in 1..blank {
            lb.tick_output(LineOutputControl::default());
        }
        for _ in 0..active {
            out.push(lb.tick_output(LineOutputControl {
                enable: true,
                frame: false,
                line: false,
            }));
        }
        // flush the output register
        out.push(lb.tick_output(LineOutputControl::default()));
        out.remove(0);
        out
    }

    #[test]
    fn test_frame_raises_request() {
        let mut lb = ScalingLineBuffer::new(3, 1, 2);
        lb.tick_output(LineOutputControl {
            enable: false,
            frame: true,
            line: true,
        });

        let mut seen = 0;
        for _ in 0..8 {
            if lb.data_request() {
                seen += 1;
            }
            lb.tick_input(LineInput::default());
        }
        assert_eq!(seen, 1);
    }

    #[test]
    fn test_line_is_displayed_after_fill() {
        let mut lb = ScalingLineBuffer::new(3, 1, 2);
        lb.tick_output(LineOutputControl {
            enable: false,
            frame: true,
            line: false,
        });
        fill_on_request(&mut lb, &[RED, GREEN, BLUE], 12);

        let out = display_line(&mut lb, 2, 3);
        assert_eq!(out, vec![RED, GREEN, BLUE]);
    }

    #[test]
    fn test_horizontal_and_vertical_scaling() {
        let mut lb = ScalingLineBuffer::new(2, 2, 2);
        lb.tick_output(LineOutputControl {
            enable: false,
            frame: true,
            line: false,
        });
        fill_on_request(&mut lb, &[RED, BLUE], 12);

        let first = display_line(&mut lb, 2, 4);
        assert_eq!(first, vec![RED, RED, BLUE, BLUE]);

        // The swap raised a request for the next line; serve it with green
        fill_on_request(&mut lb, &[GREEN, GREEN], 12);

        // Second display line repeats the same source line
        let second = display_line(&mut lb, 2, 4);
        assert_eq!(second, vec![RED, RED, BLUE, BLUE]);

        // Third display line swaps to the newly filled bank
        let third = display_line(&mut lb, 2, 4);
        assert_eq!(third, vec![GREEN; 4]);
    }

    #[test]
    fn test_disabled_output_is_black() {
        let mut lb = ScalingLineBuffer::new(2, 1, 2);
        for _ in 0..4 {
            assert_eq!(lb.tick_output(LineOutputControl::default()), Rgb::BLACK);
        }
    }

    #[test]
    fn test_request_wins_over_input() {
        let mut lb = ScalingLineBuffer::new(2, 1, 2);
        lb.tick_output(LineOutputControl {
            enable: false,
            frame: true,
            line: false,
        });
        while !lb.data_request() {
            lb.tick_input(LineInput::default());
        }
        // Input presented on the request tick is dropped
        lb.tick_input(LineInput {
            enable: true,
            frame: false,
            colour: BLUE,
        });
        lb.tick_input(LineInput {
            enable: true,
            frame: false,
            colour: RED,
        });
        lb.tick_input(LineInput {
            enable: true,
            frame: false,
            colour: GREEN,
        });

        let out = display_line(&mut lb, 1, 2);
        assert_eq!(out, vec![RED, GREEN]);
    }

    #[test]
    fn test_request_latency_counts_register() {
        for stages in 2..6 {
            let mut lb = ScalingLineBuffer::new(3, 1, stages);
            assert_eq!(lb.request_latency(), stages + 2);

            lb.tick_output(LineOutputControl {
                enable: false,
                frame: true,
                line: false,
            });
            let seen = (1..=20).find(|_| {
                lb.tick_input(LineInput::default());
                lb.data_request()
            });
            // data_request is read before the tick that follows
            assert_eq!(seen.map(|t| t + 1), Some(lb.request_latency()));
        }
    }

    #[test]
    fn test_read_latency_is_one() {
        let lb = ScalingLineBuffer::new(4, 1, 2);
        assert_eq!(lb.read_latency(), 1);
        assert_eq!(lb.scale(), 1);
        assert_eq!(lb.len(), 4);
    }
}
