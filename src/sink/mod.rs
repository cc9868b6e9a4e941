//! # Reading Sinks
//!
//! Consumers of decoded readings.
//!
//! This module handles:
//! - The [`ReadingSink`] interface a link delivers readings to
//! - Logging readings through `tracing`
//! - Fanning one reading out to several sinks
//! - Reporting readings as a Linux virtual joystick ([`uinput`])

pub mod uinput;

use tracing::{info, trace};

use crate::fmspic::decoder::Reading;

/// Receives each reading as soon as its frame completes.
///
/// Called inline from the byte-processing path, so implementations should
/// not block.
#[cfg_attr(test, mockall::automock)]
pub trait ReadingSink {
    /// Handle one decoded reading.
    fn on_reading(&mut self, reading: &Reading);
}

impl<F> ReadingSink for F
where
    F: FnMut(&Reading),
{
    fn on_reading(&mut self, reading: &Reading) {
        self(reading)
    }
}

/// Logs readings through `tracing`.
///
/// Every reading is logged at trace level; a summary line is logged at info
/// level every `summary_interval` readings.
#[derive(Debug, Clone)]
pub struct TracingSink {
    summary_interval: u64,
    count: u64,
}

impl TracingSink {
    /// Creates a sink that summarizes every `summary_interval` readings.
    ///
    /// An interval of zero disables the summary.
    pub fn new(summary_interval: u64) -> Self {
        Self {
            summary_interval,
            count: 0,
        }
    }

    /// Readings seen so far.
    pub fn count(&self) -> u64 {
        self.count
    }
}

impl ReadingSink for TracingSink {
    fn on_reading(&mut self, reading: &Reading) {
        self.count += 1;
        trace!("Reading #{}: {:02X?}", self.count, reading.channels());

        if self.summary_interval > 0 && self.count % self.summary_interval == 0 {
            info!(
                "Received {} readings ({} channels, last {:02X?})",
                self.count,
                reading.len(),
                reading.channels()
            );
        }
    }
}

/// Delivers every reading to each contained sink in order.
#[derive(Default)]
pub struct SinkSet {
    sinks: Vec<Box<dyn ReadingSink + Send>>,
}

impl std::fmt::Debug for SinkSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SinkSet")
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

impl SinkSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sink to the end of the set.
    pub fn push<S>(&mut self, sink: S)
    where
        S: ReadingSink + Send + 'static,
    {
        self.sinks.push(Box::new(sink));
    }

    /// Number of sinks in the set.
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// True when the set holds no sinks.
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl ReadingSink for SinkSet {
    fn on_reading(&mut self, reading: &Reading) {
        for sink in &mut self.sinks {
            sink.on_reading(reading);
        }
    }
}
