// Signal Log - Record pipeline events tick by tick
//
// Provides:
// - Pixel write and clip tracking
// - Frame boundaries in both clock domains
// - Line buffer data requests
// - Circular buffer with configurable size
// - Text and JSON export

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::pixel::{ColourIndex, Coord};

/// Clock domain an event was observed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Compute,
    Display,
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Domain::Compute => write!(f, "compute"),
            Domain::Display => write!(f, "display"),
        }
    }
}

/// One logged event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SignalEvent {
    /// A write reached the memory port
    Write {
        tick: u64,
        address: usize,
        index: ColourIndex,
    },
    /// An enabled write fell outside the framebuffer
    Clip { tick: u64, x: Coord, y: Coord },
    /// A frame started in one of the domains
    FrameStart { tick: u64, domain: Domain },
    /// The line buffer asked for a new line
    DataRequest { tick: u64, address: usize },
    /// The last active pixel of a frame was output
    FrameComplete { tick: u64, frame: u64 },
}

impl SignalEvent {
    /// Tick the event happened on, in its own domain
    pub fn tick(&self) -> u64 {
        match self {
            SignalEvent::Write { tick, .. } => *tick,
            SignalEvent::Clip { tick, .. } => *tick,
            SignalEvent::FrameStart { tick, .. } => *tick,
            SignalEvent::DataRequest { tick, .. } => *tick,
            SignalEvent::FrameComplete { tick, .. } => *tick,
        }
    }

    /// Check if this event matches the search query
    pub fn matches_search(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        self.to_string()
            .to_lowercase()
            .contains(&query.to_lowercase())
    }
}

impl std::fmt::Display for SignalEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalEvent::Write {
                tick,
                address,
                index,
            } => write!(f, "[{:08}] WRITE  @{:06} = {:#x}", tick, address, index),
            SignalEvent::Clip { tick, x, y } => write!(f, "[{:08}] CLIP   ({}, {})", tick, x, y),
            SignalEvent::FrameStart { tick, domain } => {
                write!(f, "[{:08}] FRAME  start ({})", tick, domain)
            }
            SignalEvent::DataRequest { tick, address } => {
                write!(f, "[{:08}] REQ    line from @{:06}", tick, address)
            }
            SignalEvent::FrameComplete { tick, frame } => {
                write!(f, "[{:08}] FRAME  {} complete", tick, frame)
            }
        }
    }
}

/// Filter settings for the signal log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogFilter {
    pub show_writes: bool,
    pub show_clips: bool,
    pub show_frames: bool,
    pub show_requests: bool,
}

impl Default for LogFilter {
    fn default() -> Self {
        Self {
            show_writes: true,
            show_clips: true,
            show_frames: true,
            show_requests: false,
        }
    }
}

impl LogFilter {
    /// Everything passes
    pub fn all() -> Self {
        Self {
            show_writes: true,
            show_clips: true,
            show_frames: true,
            show_requests: true,
        }
    }

    /// Check if an event passes the filter
    pub fn passes(&self, event: &SignalEvent) -> bool {
        match event {
            SignalEvent::Write { .. } => self.show_writes,
            SignalEvent::Clip { .. } => self.show_clips,
            SignalEvent::FrameStart { .. } | SignalEvent::FrameComplete { .. } => self.show_frames,
            SignalEvent::DataRequest { .. } => self.show_requests,
        }
    }
}

/// Pipeline event log
///
/// Keeps the most recent events in a circular buffer.
pub struct SignalLog {
    /// Log entries (circular buffer)
    entries: VecDeque<SignalEvent>,
    /// Maximum number of entries (0 = unlimited)
    max_entries: usize,
    /// Events accepted into the log
    record: LogFilter,
}

impl SignalLog {
    /// Create a new signal log recording every event kind
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
            max_entries: 10000,
            record: LogFilter::all(),
        }
    }

    /// Set maximum number of entries
    ///
    /// # Arguments
    ///
    /// * `max` - Maximum number of entries (0 = unlimited)
    pub fn set_max_entries(&mut self, max: usize) {
        self.max_entries = max;
        self.trim_if_needed();
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Only record events passing `filter` from now on
    pub fn set_record_filter(&mut self, filter: LogFilter) {
        self.record = filter;
    }

    /// Record an event
    pub fn record(&mut self, event: SignalEvent) {
        if !self.record.passes(&event) {
            return;
        }
        self.entries.push_back(event);
        self.trim_if_needed();
    }

    fn trim_if_needed(&mut self) {
        if self.max_entries > 0 {
            while self.entries.len() > self.max_entries {
                self.entries.pop_front();
            }
        }
    }

    pub fn entries(&self) -> &VecDeque<SignalEvent> {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Export the log as text, one event per line
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the output file
    /// * `filter` - Optional filter to apply
    pub fn export_to_file<P: AsRef<Path>>(
        &self,
        path: P,
        filter: Option<&LogFilter>,
    ) -> std::io::Result<()> {
        let mut file = BufWriter::new(File::create(path)?);

        for entry in &self.entries {
            if let Some(filter) = filter {
                if !filter.passes(entry) {
                    continue;
                }
            }

            writeln!(file, "{}", entry)?;
        }

        file.flush()
    }

    /// Export the log as a JSON array
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the output file
    /// * `filter` - Optional filter to apply
    pub fn export_json<P: AsRef<Path>>(
        &self,
        path: P,
        filter: Option<&LogFilter>,
    ) -> std::io::Result<()> {
        let entries: Vec<&SignalEvent> = self
            .entries
            .iter()
            .filter(|entry| filter.is_none_or(|f| f.passes(entry)))
            .collect();

        let mut file = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut file, &entries)?;
        file.flush()
    }

    /// Get filtered entries matching a search query
    pub fn get_filtered_entries(&self, query: &str, filter: &LogFilter) -> Vec<&SignalEvent> {
        self.entries
            .iter()
            .filter(|entry| filter.passes(entry) && entry.matches_search(query))
            .collect()
    }
}

impl Default for SignalLog {
    fn default() -> Self {
        Self::new()
    }
}
