//! # FMS-PIC Frame Synchronizer
//!
//! Classifies each incoming byte and drives the frame lifecycle.
//!
//! ## States
//!
//! | State | Entered on | Data byte handling |
//! |-------|------------|--------------------|
//! | `AwaitingSync` | start, or sync with length nibble 1 | discarded |
//! | `InFrame` | any other sync byte | stored, cursor advanced |
//! | `Idle` | frame completion | discarded |
//!
//! A sync byte is recognized in every state and always restarts framing,
//! abandoning whatever frame was in progress. Nothing is ever reported as an
//! error; loss of framing only shows up as missing frames.

use super::protocol::{declared_length, is_sync_byte, FMSPIC_FRAME_CAPACITY};

/// Synchronizer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// No usable sync byte seen yet.
    AwaitingSync,

    /// Accumulating a frame.
    InFrame {
        /// Data bytes expected after the sync byte; `None` when the length
        /// nibble was 0 and the frame can only be ended by the next sync.
        declared_length: Option<usize>,
        /// Data bytes received since the sync byte.
        cursor: usize,
    },

    /// Last frame completed; waiting for the next sync byte.
    Idle,
}

/// Counters kept by the synchronizer for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Every byte passed to `on_byte`
    pub bytes_seen: u64,
    /// Sync bytes recognized
    pub sync_bytes: u64,
    /// Data bytes thrown away while not in a frame
    pub discarded_bytes: u64,
    /// Data bytes beyond the buffer capacity
    pub dropped_bytes: u64,
    /// Frames handed out for decoding
    pub frames_completed: u64,
    /// Frames cut short by a new sync byte
    pub frames_aborted: u64,
}

/// A fully received frame.
///
/// Holds a copy of the link buffer, so it stays valid after the synchronizer
/// moves on to the next frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletedFrame {
    buffer: [u8; FMSPIC_FRAME_CAPACITY],
    declared_length: usize,
    bytes_received: usize,
}

impl CompletedFrame {
    /// Data bytes the sync byte announced.
    pub fn declared_length(&self) -> usize {
        self.declared_length
    }

    /// Data bytes received, including ones dropped for lack of space.
    pub fn bytes_received(&self) -> usize {
        self.bytes_received
    }

    /// Stored byte at a frame position.
    ///
    /// Position 0 (the button byte) is never stored. Positions at or beyond
    /// the buffer capacity or the received count return `None`.
    pub fn byte(&self, position: usize) -> Option<u8> {
        if position == 0 || position >= self.bytes_received {
            return None;
        }
        self.buffer.get(position).copied()
    }
}

/// Byte-at-a-time frame synchronizer for one serial link.
///
/// # Examples
///
/// ```
/// use fmspic_bridge::fmspic::synchronizer::FrameSynchronizer;
///
/// let mut sync = FrameSynchronizer::new();
/// let mut frames = [0xF4u8, 0x00, 0x11, 0x22]
///     .iter()
///     .filter_map(|&b| sync.on_byte(b));
///
/// let frame = frames.next().unwrap();
/// assert_eq!(frame.declared_length(), 3);
/// assert_eq!(frame.byte(1), Some(0x11));
/// assert_eq!(frame.byte(2), Some(0x22));
/// ```
#[derive(Debug, Clone)]
pub struct FrameSynchronizer {
    state: SyncState,
    buffer: [u8; FMSPIC_FRAME_CAPACITY],
    stats: SyncStats,
}

impl Default for FrameSynchronizer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSynchronizer {
    /// Creates a synchronizer waiting for its first sync byte.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: SyncState::AwaitingSync,
            buffer: [0; FMSPIC_FRAME_CAPACITY],
            stats: SyncStats::default(),
        }
    }

    /// Current state.
    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Counters since creation.
    pub fn stats(&self) -> SyncStats {
        self.stats
    }

    /// Processes one byte from the transport.
    ///
    /// Returns the completed frame when this byte was the last one the sync
    /// byte announced, `None` otherwise.
    pub fn on_byte(&mut self, byte: u8) -> Option<CompletedFrame> {
        self.stats.bytes_seen += 1;

        if is_sync_byte(byte) {
            self.start_frame(byte);
            return None;
        }

        let SyncState::InFrame {
            declared_length,
            cursor,
        } = self.state
        else {
            self.stats.discarded_bytes += 1;
            return None;
        };

        // Position 0 is the button byte and is not kept.
        if cursor >= FMSPIC_FRAME_CAPACITY {
            self.stats.dropped_bytes += 1;
        } else if cursor > 0 {
            self.buffer[cursor] = byte;
        }

        let cursor = cursor.saturating_add(1);

        if declared_length == Some(cursor) {
            self.stats.frames_completed += 1;
            self.state = SyncState::Idle;
            return Some(CompletedFrame {
                buffer: self.buffer,
                declared_length: cursor,
                bytes_received: cursor,
            });
        }

        self.state = SyncState::InFrame {
            declared_length,
            cursor,
        };
        None
    }

    fn start_frame(&mut self, sync: u8) {
        self.stats.sync_bytes += 1;

        if let SyncState::InFrame { cursor, .. } = self.state {
            self.stats.frames_aborted += 1;
            tracing::trace!(
                "Sync byte 0x{:02X} aborted frame after {} bytes",
                sync,
                cursor
            );
        }

        self.state = match declared_length(sync) {
            Some(0) => SyncState::AwaitingSync,
            declared_length => SyncState::InFrame {
                declared_length,
                cursor: 0,
            },
        };
    }
}
