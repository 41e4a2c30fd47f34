// Write pipeline - Clip, address and deliver pixel writes
//
// Two register stages sit between a write request and the memory write port:
//
// ```text
// tick n    request (we, x, y, cidx) presented
// edge n    stage 1: clip, row_offset = y * WIDTH, x, we, cidx
// tick n+1  clip visible
// edge n+1  stage 2: address = row_offset + x, we && !clip, cidx
// tick n+2  write port driven
// edge n+2  write lands in memory
// ```
//
// The multiply and the add get a stage each, and the colour index travels
// alongside the write enable so both reach the port on the same tick.

use crate::memory::MemoryWrite;
use crate::pixel::{mask_index, wrap_signed, ColourIndex, Coord};

/// A pixel write presented to the pipeline for one compute tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteRequest {
    /// Write enable
    pub enable: bool,
    pub x: Coord,
    pub y: Coord,
    /// Colour index to store
    pub index: ColourIndex,
}

impl WriteRequest {
    /// A tick with no write
    pub const IDLE: WriteRequest = WriteRequest {
        enable: false,
        x: 0,
        y: 0,
        index: 0,
    };

    /// An enabled write of `index` at `(x, y)`
    pub const fn new(x: Coord, y: Coord, index: ColourIndex) -> Self {
        WriteRequest {
            enable: true,
            x,
            y,
            index,
        }
    }
}

/// Write pipeline outputs during one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOutputs {
    /// The request from the previous tick was outside the framebuffer
    pub clip: bool,
    /// Write port drive for this tick
    pub write: Option<MemoryWrite>,
}

/// Two-stage write address pipeline
#[derive(Debug, Clone)]
pub struct WritePipeline {
    width: usize,
    height: usize,
    coord_bits: u32,
    cidx_bits: u32,

    // Stage 1
    clip: bool,
    row_offset: usize,
    x: usize,
    enable_p1: bool,
    index_p1: ColourIndex,

    // Stage 2
    address: usize,
    write_enable: bool,
    write_index: ColourIndex,
}

impl WritePipeline {
    /// Create an idle write pipeline
    pub fn new(width: usize, height: usize, coord_bits: u32, cidx_bits: u32) -> Self {
        WritePipeline {
            width,
            height,
            coord_bits,
            cidx_bits,
            clip: false,
            row_offset: 0,
            x: 0,
            enable_p1: false,
            index_p1: 0,
            address: 0,
            write_enable: false,
            write_index: 0,
        }
    }

    /// Ticks from a request to its write reaching the memory port
    pub const LATENCY: usize = 2;

    /// True when `(x, y)` falls outside the framebuffer
    pub fn is_clipped(&self, x: Coord, y: Coord) -> bool {
        let x = wrap_signed(x, self.coord_bits);
        let y = wrap_signed(y, self.coord_bits);
        x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height
    }

    /// Advance one compute tick
    ///
    /// # Arguments
    /// * `request` - Write presented this tick
    ///
    /// # Returns
    /// Outputs driven during this tick, from the current registers
    #[inline]
    pub fn tick(&mut self, request: WriteRequest) -> WriteOutputs {
        let outputs = WriteOutputs {
            clip: self.clip,
            write: self.write_enable.then_some(MemoryWrite {
                address: self.address,
                index: self.write_index,
            }),
        };

        // Stage 2 consumes stage 1 before it is overwritten
        self.address = self.row_offset + self.x;
        self.write_enable = self.enable_p1 && !self.clip;
        self.write_index = self.index_p1;

        // Stage 1
        self.clip = self.is_clipped(request.x, request.y);
        if self.clip {
            self.row_offset = 0;
            self.x = 0;
        } else {
            let x = wrap_signed(request.x, self.coord_bits) as usize;
            let y = wrap_signed(request.y, self.coord_bits) as usize;
            self.row_offset = y * self.width;
            self.x = x;
        }
        self.enable_p1 = request.enable;
        self.index_p1 = mask_index(request.index, self.cidx_bits);

        outputs
    }

    /// Current clip output
    pub fn clip(&self) -> bool {
        self.clip
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipeline() -> WritePipeline {
        WritePipeline::new(4, 2, 16, 4)
    }

    #[test]
    fn test_address_after_two_ticks() {
        let mut wp = pipeline();
        assert_eq!(wp.tick(WriteRequest::new(2, 1, 5)).write, None);
        assert_eq!(wp.tick(WriteRequest::IDLE).write, None);
        assert_eq!(
            wp.tick(WriteRequest::IDLE).write,
            Some(MemoryWrite {
                address: 6,
                index: 5
            })
        );
        assert_eq!(wp.tick(WriteRequest::IDLE).write, None);
    }

    #[test]
    fn test_clip_one_tick_later() {
        let mut wp = pipeline();
        assert!(!wp.tick(WriteRequest::new(-1, 0, 1)).clip);
        assert!(wp.tick(WriteRequest::IDLE).clip);
        assert!(!wp.tick(WriteRequest::IDLE).clip);
    }

    #[test]
    fn test_clipped_write_never_reaches_port() {
        let mut wp = pipeline();
        let outputs: Vec<WriteOutputs> = [
            WriteRequest::new(4, 0, 1),
            WriteRequest::IDLE,
            WriteRequest::IDLE,
            WriteRequest::IDLE,
        ]
        .iter()
        .map(|&r| wp.tick(r))
        .collect();

        assert!(outputs.iter().all(|o| o.write.is_none()));
        assert!(outputs[1].clip);
    }

    #[test]
    fn test_back_to_back_writes() {
        let mut wp = pipeline();
        let requests = [
            WriteRequest::new(0, 0, 1),
            WriteRequest::new(3, 1, 2),
            WriteRequest::new(9, 9, 3),
            WriteRequest::new(1, 0, 4),
            WriteRequest::IDLE,
            WriteRequest::IDLE,
        ];
        let writes: Vec<Option<MemoryWrite>> = requests.iter().map(|&r| wp.tick(r).write).collect();

        assert_eq!(
            writes,
            vec![
                None,
                None,
                Some(MemoryWrite { address: 0, index: 1 }),
                Some(MemoryWrite { address: 7, index: 2 }),
                None,
                Some(MemoryWrite { address: 1, index: 4 }),
            ]
        );
    }

    #[test]
    fn test_disabled_request_is_not_written() {
        let mut wp = pipeline();
        let request = WriteRequest {
            enable: false,
            ..WriteRequest::new(1, 1, 3)
        };
        wp.tick(request);
        wp.tick(WriteRequest::IDLE);
        assert_eq!(wp.tick(WriteRequest::IDLE).write, None);
    }

    #[test]
    fn test_coordinates_wrap_to_coord_bits() {
        // 65538 wraps to 2 in 16 bits
        let mut wp = pipeline();
        wp.tick(WriteRequest::new(65538, 1, 1));
        assert!(!wp.tick(WriteRequest::IDLE).clip);
        assert_eq!(
            wp.tick(WriteRequest::IDLE).write,
            Some(MemoryWrite { address: 6, index: 1 })
        );

        // 32768 wraps to -32768 and is clipped
        assert!(wp.is_clipped(32768, 0));
    }

    #[test]
    fn test_index_is_masked() {
        let mut wp = WritePipeline::new(4, 2, 16, 1);
        wp.tick(WriteRequest::new(0, 0, 0b11));
        wp.tick(WriteRequest::IDLE);
        assert_eq!(
            wp.tick(WriteRequest::IDLE).write,
            Some(MemoryWrite { address: 0, index: 1 })
        );
    }
}
