//! # FMS-PIC Link
//!
//! Per-link decoder state bound to a reading sink.
//!
//! One [`FmsPicLink`] exists per attached serial link; links never share
//! state. Bytes are processed strictly one at a time and a completed frame is
//! decoded and delivered to the sink before `feed` returns.
//!
//! When bytes for the same link may arrive from several threads, wrap it in a
//! [`SharedLink`], which holds one lock for the duration of each byte.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};

use super::decoder::decode;
use super::synchronizer::{FrameSynchronizer, SyncStats};
use crate::sink::ReadingSink;

/// Decoder state for one serial link.
///
/// # Examples
///
/// ```
/// use fmspic_bridge::fmspic::decoder::Reading;
/// use fmspic_bridge::fmspic::link::FmsPicLink;
///
/// let mut readings = Vec::new();
/// let mut link = FmsPicLink::attach(|r: &Reading| readings.push(*r));
/// link.feed_slice(&[0xF6, 0x00, 0x10, 0x20, 0x30, 0x40]);
/// link.detach();
///
/// assert_eq!(readings.len(), 1);
/// assert_eq!(readings[0].channels(), &[0x10, 0x20, 0x30, 0x40]);
/// ```
#[derive(Debug)]
pub struct FmsPicLink<S: ReadingSink> {
    synchronizer: FrameSynchronizer,
    sink: S,
}

impl<S: ReadingSink> FmsPicLink<S> {
    /// Binds fresh synchronizer state to a sink.
    pub fn attach(sink: S) -> Self {
        debug!("FMS-PIC link attached");
        Self {
            synchronizer: FrameSynchronizer::new(),
            sink,
        }
    }

    /// Processes one received byte.
    ///
    /// If the byte completes a frame, the decoded reading is handed to the
    /// sink before this returns.
    pub fn feed(&mut self, byte: u8) {
        if let Some(frame) = self.synchronizer.on_byte(byte) {
            let reading = decode(&frame);
            self.sink.on_reading(&reading);
        }
    }

    /// Processes a run of received bytes in order.
    pub fn feed_slice(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.feed(byte);
        }
    }

    /// Synchronizer counters for this link.
    pub fn stats(&self) -> SyncStats {
        self.synchronizer.stats()
    }

    /// Borrow the sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Releases the link state and returns the sink.
    pub fn detach(self) -> S {
        let stats = self.synchronizer.stats();
        info!(
            "FMS-PIC link detached: {} bytes, {} frames, {} aborted, {} discarded, {} dropped",
            stats.bytes_seen,
            stats.frames_completed,
            stats.frames_aborted,
            stats.discarded_bytes,
            stats.dropped_bytes
        );
        self.sink
    }

    /// Moves the link behind a lock for use from several threads.
    pub fn into_shared(self) -> SharedLink<S> {
        SharedLink {
            inner: Arc::new(Mutex::new(self)),
        }
    }
}

/// Lock-protected handle to a link, cloneable across threads.
#[derive(Debug)]
pub struct SharedLink<S: ReadingSink> {
    inner: Arc<Mutex<FmsPicLink<S>>>,
}

impl<S: ReadingSink> Clone for SharedLink<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: ReadingSink> SharedLink<S> {
    /// Processes one byte while holding the link lock.
    pub fn feed(&self, byte: u8) {
        self.lock().feed(byte);
    }

    /// Synchronizer counters for this link.
    pub fn stats(&self) -> SyncStats {
        self.lock().stats()
    }

    /// Detaches the link if this is the last handle to it.
    ///
    /// Returns the handle back unchanged while other clones are alive.
    pub fn detach(self) -> std::result::Result<S, Self> {
        match Arc::try_unwrap(self.inner) {
            Ok(mutex) => Ok(mutex
                .into_inner()
                .unwrap_or_else(PoisonError::into_inner)
                .detach()),
            Err(inner) => Err(Self { inner }),
        }
    }

    // A sink that panicked mid-frame leaves the synchronizer consistent,
    // so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, FmsPicLink<S>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fmspic::decoder::Reading;
    use crate::sink::MockReadingSink;
    use std::thread;

    #[derive(Debug, Default)]
    struct Collect(Vec<Reading>);

    impl ReadingSink for Collect {
        fn on_reading(&mut self, reading: &Reading) {
            self.0.push(*reading);
        }
    }

    #[test]
    fn test_feed_delivers_reading_inline() {
        let mut sink = MockReadingSink::new();
        sink.expect_on_reading()
            .withf(|r: &Reading| r.channels() == [0x10, 0x20, 0x30, 0x40])
            .times(1)
            .return_const(());

        let mut link = FmsPicLink::attach(sink);
        link.feed_slice(&[0xF6, 0x00, 0x10, 0x20, 0x30, 0x40]);
        link.detach().checkpoint();
    }

    #[test]
    fn test_noise_never_reaches_sink() {
        let mut sink = MockReadingSink::new();
        sink.expect_on_reading().never();

        let mut link = FmsPicLink::attach(sink);
        let noise: Vec<u8> = (0..=0xEFu8).cycle().take(1000).collect();
        link.feed_slice(&noise);
        assert_eq!(link.stats().discarded_bytes, 1000);
    }

    #[test]
    fn test_replayed_frame_yields_two_readings() {
        let frame = [0xF5, 0x00, 0x21, 0x22, 0x23];
        let mut link = FmsPicLink::attach(Collect::default());
        link.feed_slice(&frame);
        link.feed_slice(&frame);

        let readings = link.detach().0;
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0], readings[1]);
        assert_eq!(readings[0].channels(), &[0x21, 0x22, 0x23]);
    }

    #[test]
    fn test_spurious_sync_restarts_frame() {
        let mut link = FmsPicLink::attach(Collect::default());
        link.feed_slice(&[0xF6, 0x00, 0x10, 0xF4, 0x00, 0x31, 0x32]);

        let readings = link.detach().0;
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].channels(), &[0x31, 0x32]);
    }

    #[test]
    fn test_closure_sink() {
        let mut count = 0;
        let mut link = FmsPicLink::attach(|_: &Reading| count += 1);
        link.feed_slice(&[0xF3, 0x00, 0x01, 0xF3, 0x00, 0x02]);
        link.detach();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_reattach_starts_fresh() {
        let mut link = FmsPicLink::attach(Collect::default());
        link.feed_slice(&[0xF6, 0x00, 0x10]);
        let sink = link.detach();

        // Trailing bytes of the old frame must not complete anything.
        let mut link = FmsPicLink::attach(sink);
        link.feed_slice(&[0x20, 0x30, 0x40]);
        assert!(link.sink().0.is_empty());
        assert_eq!(link.stats().bytes_seen, 3);
    }

    #[test]
    fn test_shared_link_across_threads() {
        let shared = FmsPicLink::attach(Collect::default()).into_shared();
        let frame = [0xF4u8, 0x00, 0x11, 0x22];

        // Frames from different threads may interleave and abort each other;
        // every frame that does complete still carries two channels.
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let link = shared.clone();
                thread::spawn(move || {
                    for &b in &frame {
                        link.feed(b);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(shared.stats().bytes_seen, 16);
        let sink = shared.detach().unwrap();
        assert!(sink.0.len() <= 4);
        for reading in &sink.0 {
            assert_eq!(reading.len(), 2);
        }
    }

    #[test]
    fn test_shared_detach_with_live_clone() {
        let shared = FmsPicLink::attach(Collect::default()).into_shared();
        let other = shared.clone();
        let shared = shared.detach().unwrap_err();
        drop(other);
        assert!(shared.detach().is_ok());
    }
}
