// Frame memory - Simple dual-port RAM of colour indices
//
// Holds one colour index per framebuffer pixel, addressed linearly as
// `y * width + x`. The read port is registered: data for an address
// presented at one edge is available `read_latency` ticks later.

use super::{IndexedMemory, MemoryWrite};
use crate::delay::DelayLine;
use crate::pixel::{mask_index, ColourIndex};

/// Reference framebuffer memory
///
/// # Example
///
/// ```
/// use fbpipe::memory::{FrameMemory, IndexedMemory, MemoryWrite};
///
/// let mut mem = FrameMemory::new(vec![0; 8], 1, 4);
/// mem.tick(0, Some(MemoryWrite { address: 6, index: 1 }));
/// mem.tick(6, None);
/// assert_eq!(mem.tick(0, None), 1);
/// ```
#[derive(Debug, Clone)]
pub struct FrameMemory {
    /// Colour index per address
    cells: Vec<ColourIndex>,

    /// Read data on its way to the port
    read_pipe: DelayLine<ColourIndex>,

    /// Width of the stored indices
    cidx_bits: u32,
}

impl FrameMemory {
    /// Create a memory initialised with `contents`
    ///
    /// # Arguments
    /// * `contents` - Initial colour index per address; its length is the memory depth
    /// * `read_latency` - Ticks from address to data; a latency of 0 models an asynchronous read
    /// * `cidx_bits` - Width of stored indices; wider values are masked
    pub fn new(contents: Vec<ColourIndex>, read_latency: usize, cidx_bits: u32) -> Self {
        let cells = contents
            .into_iter()
            .map(|index| mask_index(index, cidx_bits))
            .collect();

        FrameMemory {
            cells,
            read_pipe: DelayLine::new(read_latency, 0),
            cidx_bits,
        }
    }

    /// Create a memory of `depth` entries, all holding `index`
    pub fn filled(depth: usize, index: ColourIndex, read_latency: usize, cidx_bits: u32) -> Self {
        Self::new(vec![index; depth], read_latency, cidx_bits)
    }

    /// Raw contents in address order
    pub fn as_slice(&self) -> &[ColourIndex] {
        &self.cells
    }

    /// Overwrite every cell with `index`, bypassing the ports
    pub fn clear(&mut self, index: ColourIndex) {
        self.cells.fill(mask_index(index, self.cidx_bits));
    }
}

impl IndexedMemory for FrameMemory {
    fn read_latency(&self) -> usize {
        self.read_pipe.depth()
    }

    fn depth(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    fn tick(&mut self, read_address: usize, write: Option<MemoryWrite>) -> ColourIndex {
        // Read first: a collision returns the old contents
        let sampled = self.cells.get(read_address).copied().unwrap_or(0);
        let data = self.read_pipe.tick(sampled);

        if let Some(MemoryWrite { address, index }) = write {
            if let Some(cell) = self.cells.get_mut(address) {
                *cell = mask_index(index, self.cidx_bits);
            }
        }

        data
    }

    fn peek(&self, address: usize) -> Option<ColourIndex> {
        self.cells.get(address).copied()
    }
}
