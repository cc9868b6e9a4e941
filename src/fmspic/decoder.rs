//! # FMS-PIC Frame Decoder
//!
//! Maps a completed frame's stored bytes to channel readings.

use super::protocol::{Axis, FMSPIC_MAX_CHANNELS};
use super::synchronizer::CompletedFrame;

/// Channel values decoded from one frame.
///
/// Only channels the frame actually carried are present; a transmitter
/// sending four channels yields a reading of length four, not six with
/// trailing zeros. Values are passed through unscaled. A channel byte of
/// 0xF0 or above is a sync byte on the wire, so it never reaches the decoder
/// and stored values are at most 0xEF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Reading {
    channels: [u8; FMSPIC_MAX_CHANNELS],
    len: usize,
}

impl Reading {
    /// Builds a reading from channel values in channel order.
    ///
    /// For sink implementors that need readings without a serial stream,
    /// e.g. to replay recorded values. Values beyond the sixth channel are
    /// ignored.
    pub fn from_channels(values: &[u8]) -> Self {
        let mut reading = Self::default();
        for &value in values.iter().take(FMSPIC_MAX_CHANNELS) {
            reading.channels[reading.len] = value;
            reading.len += 1;
        }
        reading
    }

    /// Number of channels present.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when the frame carried no channel bytes.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Present channel values in channel order.
    pub fn channels(&self) -> &[u8] {
        &self.channels[..self.len]
    }

    /// Value of a 1-based channel, if present.
    pub fn channel(&self, channel: usize) -> Option<u8> {
        channel
            .checked_sub(1)
            .and_then(|i| self.channels().get(i).copied())
    }

    /// Value reported for an axis, if present.
    pub fn axis(&self, axis: Axis) -> Option<u8> {
        self.channel(axis.channel())
    }

    /// Present channels paired with their axes.
    pub fn iter(&self) -> impl Iterator<Item = (Axis, u8)> + '_ {
        Axis::ALL.iter().copied().zip(self.channels().iter().copied())
    }
}

/// Decode a completed frame into a reading
///
/// Channel `i` (1-based) is taken from frame position `i`, for every `i`
/// up to the declared length minus the button byte, capped at six channels.
///
/// # Examples
///
/// ```
/// use fmspic_bridge::fmspic::decoder::decode;
/// use fmspic_bridge::fmspic::protocol::Axis;
/// use fmspic_bridge::fmspic::synchronizer::FrameSynchronizer;
///
/// let mut sync = FrameSynchronizer::new();
/// let frame = [0xF6u8, 0x00, 0x10, 0x20, 0x30, 0x40]
///     .iter()
///     .find_map(|&b| sync.on_byte(b))
///     .unwrap();
///
/// let reading = decode(&frame);
/// assert_eq!(reading.channels(), &[0x10, 0x20, 0x30, 0x40]);
/// assert_eq!(reading.axis(Axis::PrimaryHorizontal), Some(0x20));
/// ```
pub fn decode(frame: &CompletedFrame) -> Reading {
    let mut reading = Reading::default();

    for channel in 1..=FMSPIC_MAX_CHANNELS {
        if channel >= frame.declared_length() {
            break;
        }
        match frame.byte(channel) {
            Some(value) => {
                reading.channels[reading.len] = value;
                reading.len += 1;
            }
            None => break,
        }
    }

    reading
}
