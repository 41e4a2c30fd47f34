// Clock domain crossing - Toggle-and-resample pulse synchroniser
//
// A single-tick pulse in the producing domain flips a shared level. The
// consuming domain samples that level through a chain of synchroniser
// registers and regenerates one pulse for every edge it sees at the end of
// the chain. The two sides never need to agree on frequency or phase; the
// only cost is a few ticks of latency in the consuming domain.
//
// ```text
//  producer           |  consumer
//  pulse --> [toggle] ---> [s0] -> [s1] -> ... -> [sN-1] -> [prev]
//                     |                              \________/
//                     |                                  XOR --> pulse
// ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Minimum number of synchroniser registers in the consuming domain
pub const MIN_SYNC_STAGES: usize = 2;

/// Create a connected sender/receiver pair
///
/// # Arguments
///
/// * `sync_stages` - Synchroniser registers in the consuming domain (clamped to at least 2)
///
/// # Example
///
/// ```
/// use fbpipe::cdc::pulse_sync;
///
/// let (mut tx, mut rx) = pulse_sync(2);
/// tx.tick(true);
/// let pulses: Vec<bool> = (0..6).map(|_| rx.tick()).collect();
/// assert_eq!(pulses.iter().filter(|&&p| p).count(), 1);
/// ```
pub fn pulse_sync(sync_stages: usize) -> (PulseSender, PulseReceiver) {
    let level = Arc::new(AtomicBool::new(false));
    let stages = sync_stages.max(MIN_SYNC_STAGES);

    let sender = PulseSender {
        level: Arc::clone(&level),
        toggle: false,
    };
    let receiver = PulseReceiver {
        level,
        sync: vec![false; stages],
        prev: false,
    };

    (sender, receiver)
}

/// Producer half of a pulse synchroniser
#[derive(Debug)]
pub struct PulseSender {
    level: Arc<AtomicBool>,
    toggle: bool,
}

impl PulseSender {
    /// Advance one producer tick
    ///
    /// A `true` input flips the shared level at this tick's edge.
    #[inline]
    pub fn tick(&mut self, pulse: bool) {
        if pulse {
            self.toggle = !self.toggle;
            self.level.store(self.toggle, Ordering::Release);
        }
    }
}

/// Consumer half of a pulse synchroniser
#[derive(Debug)]
pub struct PulseReceiver {
    level: Arc<AtomicBool>,
    sync: Vec<bool>,
    prev: bool,
}

impl PulseReceiver {
    /// Advance one consumer tick
    ///
    /// Returns the regenerated pulse for this tick, then samples the
    /// producer's level into the first synchroniser register.
    #[inline]
    pub fn tick(&mut self) -> bool {
        let last = self.sync[self.sync.len() - 1];
        let pulse = last != self.prev;

        self.prev = last;
        self.sync.rotate_right(1);
        self.sync[0] = self.level.load(Ordering::Acquire);

        pulse
    }

    /// Number of synchroniser registers
    pub fn stages(&self) -> usize {
        self.sync.len()
    }

    /// Consumer ticks from the producer edge to the regenerated pulse
    pub fn latency(&self) -> usize {
        self.sync.len() + 1
    }
}
