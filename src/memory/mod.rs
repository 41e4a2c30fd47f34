// Memory module - Framebuffer and palette storage seams
//
// The pipeline core talks to its two memories only through the traits in
// this module:
// - `IndexedMemory`: one read port, one write port, fixed read latency
// - `PaletteMemory`: combinational colour lookup
//
// Reference implementations live in the submodules, together with loaders
// for the startup data they are initialised from.

pub mod frame;
pub mod palette;
pub mod source;

pub use frame::FrameMemory;
pub use palette::{greyscale_palette, PaletteRom};
pub use source::{load_image_hex, load_palette_hex, parse_hex_words, SourceError};

use crate::pixel::{ColourIndex, Rgb};

/// A write presented to the memory's write port for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryWrite {
    pub address: usize,
    pub index: ColourIndex,
}

/// Double-ported storage of colour indices
///
/// Each call to [`IndexedMemory::tick`] is one clock edge. The read port
/// samples `read_address` at that edge and the data appears
/// [`IndexedMemory::read_latency`] ticks later. On an address collision the
/// read port returns the contents from before the write.
pub trait IndexedMemory {
    /// Ticks from address presentation to data at the read port
    fn read_latency(&self) -> usize;

    /// Number of addressable entries
    fn depth(&self) -> usize;

    /// Advance one clock edge
    ///
    /// # Arguments
    /// * `read_address` - Address on the read port this tick
    /// * `write` - Write applied at this edge, if the write port is enabled
    ///
    /// # Returns
    /// Data on the read port during this tick
    fn tick(&mut self, read_address: usize, write: Option<MemoryWrite>) -> ColourIndex;

    /// Inspect a cell without touching the ports
    fn peek(&self, address: usize) -> Option<ColourIndex>;
}

/// Colour lookup table
pub trait PaletteMemory {
    /// Colour for `index`; combinational
    fn lookup(&self, index: ColourIndex) -> Rgb;

    /// Number of populated entries
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
