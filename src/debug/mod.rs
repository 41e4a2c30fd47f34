// Debug module - Pipeline inspection tools
//
// Everything here is optional: the scheduler only records into a signal log
// when one is attached.

pub mod signal_log;

pub use signal_log::{Domain, LogFilter, SignalEvent, SignalLog};
