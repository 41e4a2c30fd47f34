// Pixel types - Colour indices, RGB triples and fixed-width helpers
//
// Every value that crosses a pipeline register has a fixed bit width in the
// configuration. Inputs are masked (unsigned) or wrapped (signed) to that
// width as they enter, so downstream stages never see an out-of-range value.

use serde::{Deserialize, Serialize};

/// Index into the palette, `cidx_bits` wide
pub type ColourIndex = u16;

/// Signed pixel coordinate, `coord_bits` wide
pub type Coord = i32;

/// One RGB triple with `chan_bits` per channel (at most 8)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Blanking colour, all channels zero
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// Grey level with the same value on every channel
    pub const fn grey(level: u8) -> Self {
        Rgb {
            r: level,
            g: level,
            b: level,
        }
    }

    /// Mask every channel to `chan_bits`
    pub fn masked(self, chan_bits: u32) -> Self {
        let mask = channel_mask(chan_bits);
        Rgb {
            r: self.r & mask,
            g: self.g & mask,
            b: self.b & mask,
        }
    }

    /// Unpack a word holding `chan_bits` per channel, red most significant
    ///
    /// This is the layout used by palette hex files: with 4-bit channels the
    /// word `0xF80` is bright red-orange, `(15, 8, 0)`.
    pub fn from_packed(word: u32, chan_bits: u32) -> Self {
        let mask = u32::from(channel_mask(chan_bits));
        Rgb {
            r: ((word >> (2 * chan_bits)) & mask) as u8,
            g: ((word >> chan_bits) & mask) as u8,
            b: (word & mask) as u8,
        }
    }

    /// Pack into a word with `chan_bits` per channel, red most significant
    pub fn to_packed(self, chan_bits: u32) -> u32 {
        let c = self.masked(chan_bits);
        (u32::from(c.r) << (2 * chan_bits)) | (u32::from(c.g) << chan_bits) | u32::from(c.b)
    }

    /// Expand `chan_bits` channels to 8-bit channels by bit replication
    ///
    /// A full-scale channel maps to 0xFF and zero stays zero, so 4-bit
    /// `(15, 8, 0)` becomes `(0xFF, 0x88, 0x00)`.
    pub fn to_rgb888(self, chan_bits: u32) -> [u8; 3] {
        let c = self.masked(chan_bits);
        [
            expand_channel(c.r, chan_bits),
            expand_channel(c.g, chan_bits),
            expand_channel(c.b, chan_bits),
        ]
    }
}

/// Mask with the low `chan_bits` bits set (saturates at 8 bits)
#[inline]
pub fn channel_mask(chan_bits: u32) -> u8 {
    if chan_bits >= 8 {
        0xFF
    } else {
        ((1u16 << chan_bits) - 1) as u8
    }
}

/// Mask a colour index to `cidx_bits`
#[inline]
pub fn mask_index(index: ColourIndex, cidx_bits: u32) -> ColourIndex {
    if cidx_bits >= 16 {
        index
    } else {
        index & ((1u16 << cidx_bits) - 1)
    }
}

/// Reinterpret `value` as a `bits`-wide two's-complement number
///
/// Mirrors what happens when a wider value is driven onto a narrower signed
/// port: the high bits are dropped and the new top bit becomes the sign.
#[inline]
pub fn wrap_signed(value: Coord, bits: u32) -> Coord {
    if bits >= 32 {
        return value;
    }
    let shift = 32 - bits;
    (value << shift) >> shift
}

fn expand_channel(value: u8, chan_bits: u32) -> u8 {
    if chan_bits >= 8 {
        return value;
    }
    let mut out: u32 = 0;
    let mut filled = 0;
    while filled < 8 {
        out = (out << chan_bits) | u32::from(value);
        filled += chan_bits;
    }
    (out >> (filled - 8)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packed_round_trip_4bit() {
        let c = Rgb::from_packed(0xF80, 4);
        assert_eq!(c, Rgb::new(15, 8, 0));
        assert_eq!(c.to_packed(4), 0xF80);
    }

    #[test]
    fn test_masked_drops_high_bits() {
        assert_eq!(Rgb::new(0x1F, 0x10, 0x0F).masked(4), Rgb::new(0x0F, 0x00, 0x0F));
    }

    #[test]
    fn test_rgb888_expansion() {
        assert_eq!(Rgb::new(15, 8, 0).to_rgb888(4), [0xFF, 0x88, 0x00]);
        assert_eq!(Rgb::new(1, 0, 1).to_rgb888(1), [0xFF, 0x00, 0xFF]);
        assert_eq!(Rgb::new(4, 2, 7).to_rgb888(3), [0x92, 0x49, 0xFF]);
        assert_eq!(Rgb::new(0x12, 0x34, 0x56).to_rgb888(8), [0x12, 0x34, 0x56]);
    }

    #[test]
    fn test_mask_index() {
        assert_eq!(mask_index(0b1011, 2), 0b11);
        assert_eq!(mask_index(0xFFFF, 16), 0xFFFF);
    }

    #[test]
    fn test_wrap_signed() {
        assert_eq!(wrap_signed(-1, 16), -1);
        assert_eq!(wrap_signed(0x7FFF, 16), 0x7FFF);
        assert_eq!(wrap_signed(0x8000, 16), -0x8000);
        assert_eq!(wrap_signed(40000, 16), 40000 - 65536);
        assert_eq!(wrap_signed(i32::MIN, 32), i32::MIN);
    }
}
