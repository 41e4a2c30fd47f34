// Output stage - Blank everything outside the latency-matched data enable

use crate::delay::DelayLine;
use crate::pixel::Rgb;

/// Display-side output gate
#[derive(Debug, Clone)]
pub struct OutputStage {
    enable: DelayLine<bool>,
}

impl OutputStage {
    /// Create an output stage
    ///
    /// # Arguments
    /// * `latency` - Read latency of the line buffer's output side
    pub fn new(latency: usize) -> Self {
        OutputStage {
            enable: DelayLine::new(latency, false),
        }
    }

    /// Depth of the data enable delay
    pub fn latency(&self) -> usize {
        self.enable.depth()
    }

    /// Advance one display tick
    ///
    /// # Arguments
    /// * `data_enable` - Display data enable this tick
    /// * `colour` - Line buffer output this tick
    ///
    /// # Returns
    /// The delayed data enable and the gated colour
    #[inline]
    pub fn tick(&mut self, data_enable: bool, colour: Rgb) -> (bool, Rgb) {
        let enable = self.enable.tick(data_enable);
        (enable, if enable { colour } else { Rgb::BLACK })
    }
}
