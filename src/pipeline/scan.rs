// Scan pipeline - Sequential read addresses, one line per request
//
// The read address is cumulative: it advances exactly WIDTH times for each
// line the line buffer asks for, so HEIGHT requests sweep the whole buffer.
// Only a new frame brings it back to zero. Once the last pixel has been
// issued, further requests fetch nothing until the next frame.

/// Scan pipeline outputs during one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOutputs {
    /// Address driven towards the memory read port
    pub address: usize,
    /// `address` is part of the line being fetched
    pub enable: bool,
}

/// Read address generator
#[derive(Debug, Clone)]
pub struct ScanPipeline {
    width: usize,
    pixels: usize,
    /// Next address to issue
    address: usize,
    /// Pixels requested so far on the current line
    cursor: usize,
}

impl ScanPipeline {
    /// Create an idle scan pipeline
    ///
    /// The cursor starts at `width`, so nothing is fetched until the first
    /// data request.
    pub fn new(width: usize, height: usize) -> Self {
        ScanPipeline {
            width,
            pixels: width * height,
            address: 0,
            cursor: width,
        }
    }

    /// Advance one compute tick
    ///
    /// # Arguments
    /// * `data_request` - The line buffer wants a new line
    /// * `frame` - Start of frame, crossed into the compute domain
    ///
    /// # Returns
    /// Outputs driven during this tick, from the current registers
    #[inline]
    pub fn tick(&mut self, data_request: bool, frame: bool) -> ScanOutputs {
        let outputs = ScanOutputs {
            address: self.address.min(self.pixels.saturating_sub(1)),
            enable: self.is_fetching(),
        };

        if data_request {
            let start = if frame { 0 } else { self.address };
            self.cursor = if start < self.pixels { 0 } else { self.width };
        } else if frame {
            // Abandon a line still in flight
            self.cursor = self.width;
        } else if self.cursor < self.width {
            self.cursor += 1;
            self.address += 1;
            if self.address >= self.pixels {
                self.cursor = self.width;
            }
        }

        if frame {
            self.address = 0;
        }

        outputs
    }

    /// Next address to be issued
    pub fn address(&self) -> usize {
        self.address
    }

    /// Current scanline cursor
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// True while a line is being fetched
    pub fn is_fetching(&self) -> bool {
        self.cursor < self.width
    }

    /// True once every pixel of the frame has been issued
    pub fn is_exhausted(&self) -> bool {
        self.address >= self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Raise a data request, then collect the enabled addresses that follow
    fn fetch_line(scan: &mut ScanPipeline, frame: bool, ticks: usize) -> Vec<usize> {
        scan.tick(true, frame);
        (0..ticks)
            .map(|_| scan.tick(false, false))
            .filter(|o| o.enable)
            .map(|o| o.address)
            .collect()
    }

    #[test]
    fn test_idle_until_request() {
        let mut scan = ScanPipeline::new(4, 2);
        for _ in 0..10 {
            assert!(!scan.tick(false, false).enable);
        }
        assert_eq!(scan.address(), 0);
    }

    #[test]
    fn test_one_line_per_request() {
        let mut scan = ScanPipeline::new(4, 2);
        assert_eq!(fetch_line(&mut scan, false, 8), vec![0, 1, 2, 3]);
        assert_eq!(scan.address(), 4);
        assert_eq!(fetch_line(&mut scan, false, 8), vec![4, 5, 6, 7]);
        assert!(scan.is_exhausted());
    }

    #[test]
    fn test_request_does_not_reset_address() {
        let mut scan = ScanPipeline::new(4, 2);
        scan.tick(true, false);
        scan.tick(false, false);
        scan.tick(false, false);
        // Cut the line short after two pixels
        assert_eq!(fetch_line(&mut scan, false, 6), vec![2, 3, 4, 5]);
    }

    #[test]
    fn test_frame_resets_address_and_abandons_line() {
        let mut scan = ScanPipeline::new(4, 2);
        scan.tick(true, false);
        scan.tick(false, false); // address 0
        scan.tick(false, false); // address 1
        assert!(scan.tick(false, true).enable); // address 2, then frame
        assert_eq!(scan.address(), 0);
        assert!(!scan.is_fetching());
        assert!(!scan.tick(false, false).enable);
    }

    #[test]
    fn test_frame_and_request_together_start_line_zero() {
        let mut scan = ScanPipeline::new(4, 2);
        fetch_line(&mut scan, false, 6);
        assert_eq!(fetch_line(&mut scan, true, 6), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_requests_past_last_line_fetch_nothing() {
        let mut scan = ScanPipeline::new(2, 2);
        assert_eq!(fetch_line(&mut scan, false, 4), vec![0, 1]);
        assert_eq!(fetch_line(&mut scan, false, 4), vec![2, 3]);
        assert_eq!(fetch_line(&mut scan, false, 4), Vec::<usize>::new());

        // A new frame re-arms the scan
        assert_eq!(fetch_line(&mut scan, true, 4), vec![0, 1]);
    }
}
