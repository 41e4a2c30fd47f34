// Delay line - Fixed-depth shift register used for latency matching
//
// A `DelayLine<T>` of depth N presents, during tick t, the value that was
// shifted in during tick t-N. Depth 0 is a plain wire: the input is the
// output in the same tick.

use std::collections::VecDeque;

/// Fixed-depth shift register
///
/// # Example
///
/// ```
/// use fbpipe::delay::DelayLine;
///
/// let mut line = DelayLine::new(2, 0u32);
/// assert_eq!(line.tick(7), 0);
/// assert_eq!(line.tick(8), 0);
/// assert_eq!(line.tick(9), 7);
/// ```
#[derive(Debug, Clone)]
pub struct DelayLine<T> {
    stages: VecDeque<T>,
    depth: usize,
}

impl<T: Clone> DelayLine<T> {
    /// Create a delay line with every stage holding `reset`
    pub fn new(depth: usize, reset: T) -> Self {
        let mut stages = VecDeque::with_capacity(depth);
        stages.extend(std::iter::repeat_n(reset, depth));
        DelayLine { stages, depth }
    }

    /// Number of registers in the line
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Value presented at the output during the current tick
    ///
    /// For depth 0 there is no register to show, so this returns `None`.
    pub fn output(&self) -> Option<&T> {
        self.stages.front()
    }

    /// Advance one tick
    ///
    /// Returns the output for this tick, then shifts `input` in.
    #[inline]
    pub fn tick(&mut self, input: T) -> T {
        match self.stages.pop_front() {
            Some(out) => {
                self.stages.push_back(input);
                out
            }
            None => input,
        }
    }

    /// Set every stage to `value`
    pub fn fill(&mut self, value: T) {
        for stage in self.stages.iter_mut() {
            *stage = value.clone();
        }
    }
}
