// Palette ROM - Colour index to RGB lookup
//
// The palette is loaded once at startup and never written afterwards. It can
// hold up to 2^cidx_bits entries; any index past the populated entries reads
// as black, the same as an uninitialised ROM word.

use super::PaletteMemory;
use crate::pixel::{channel_mask, mask_index, ColourIndex, Rgb};

/// Reference palette memory
///
/// # Example
///
/// ```
/// use fbpipe::memory::{PaletteMemory, PaletteRom};
/// use fbpipe::pixel::Rgb;
///
/// let palette = PaletteRom::new(vec![Rgb::BLACK, Rgb::grey(15)], 1, 4);
/// assert_eq!(palette.lookup(1), Rgb::grey(15));
/// ```
#[derive(Debug, Clone)]
pub struct PaletteRom {
    entries: Vec<Rgb>,
    cidx_bits: u32,
}

impl PaletteRom {
    /// Create a palette from `entries`
    ///
    /// # Arguments
    /// * `entries` - One colour per index, starting at index 0
    /// * `cidx_bits` - Width of the colour index
    /// * `chan_bits` - Width of each colour channel; wider values are masked
    pub fn new(entries: Vec<Rgb>, cidx_bits: u32, chan_bits: u32) -> Self {
        let entries = entries.into_iter().map(|c| c.masked(chan_bits)).collect();
        PaletteRom { entries, cidx_bits }
    }

    /// Populated entries in index order
    pub fn entries(&self) -> &[Rgb] {
        &self.entries
    }
}

impl PaletteMemory for PaletteRom {
    #[inline]
    fn lookup(&self, index: ColourIndex) -> Rgb {
        let index = mask_index(index, self.cidx_bits) as usize;
        self.entries.get(index).copied().unwrap_or(Rgb::BLACK)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Build a greyscale ramp covering every colour index
///
/// Index 0 is black and the last index is full-scale white; used when no
/// palette file is configured.
///
/// # Arguments
/// * `cidx_bits` - Width of the colour index
/// * `chan_bits` - Width of each colour channel
pub fn greyscale_palette(cidx_bits: u32, chan_bits: u32) -> Vec<Rgb> {
    let count = 1usize << cidx_bits;
    let max_level = u32::from(channel_mask(chan_bits));

    (0..count)
        .map(|i| {
            let level = if count == 1 {
                0
            } else {
                (i as u32 * max_level) / (count as u32 - 1)
            };
            Rgb::grey(level as u8)
        })
        .collect()
}
