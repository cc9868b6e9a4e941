//! # FMS-PIC Protocol Constants and Types
//!
//! Wire format:
//!
//! ```text
//! byte 0   sync      0xF0 | L   (L = frame length including the sync byte)
//! byte 1   buttons   always observed as 0x00, not reported
//! byte 2   channel 1 0x00-0xEF
//! byte 3   channel 2
//! ...
//! ```
//!
//! No data byte ever carries 0xF in its upper nibble, so a sync byte is a
//! reliable resynchronization point.

use std::fmt;

/// Upper-nibble mask identifying a sync byte
pub const FMSPIC_SYNC_MASK: u8 = 0xF0;

/// Mask extracting the frame length from a sync byte
pub const FMSPIC_LENGTH_MASK: u8 = 0x0F;

/// Capacity of the per-link frame buffer (index 0 reserved)
pub const FMSPIC_FRAME_CAPACITY: usize = 8;

/// Number of channels mapped onto axes
pub const FMSPIC_MAX_CHANNELS: usize = 6;

/// Largest channel value that can arrive as data.
///
/// Transmitters scale channels to 0x00-0xFE, but anything from 0xF0 up has
/// the sync nibble and restarts framing instead of being stored.
pub const FMSPIC_CHANNEL_VALUE_MAX: u8 = 0xEF;

/// Axis maximum advertised by the original joystick driver
pub const FMSPIC_DEFAULT_AXIS_MAX: u8 = 0xF0;

/// Serial speed of the "9600 F0" protocol
pub const FMSPIC_BAUD_RATE: u32 = 9600;

/// Returns true if `byte` is a sync marker.
#[inline]
pub fn is_sync_byte(byte: u8) -> bool {
    byte & FMSPIC_SYNC_MASK == FMSPIC_SYNC_MASK
}

/// Number of data bytes following a sync byte.
///
/// Computed as `(byte & 0x0F) - 1`. A length nibble of 0 underflows; that
/// frame has no reachable end and `None` is returned. A nibble of 1 gives
/// `Some(0)`, which accepts no data at all.
///
/// # Examples
///
/// ```
/// use fmspic_bridge::fmspic::protocol::declared_length;
///
/// assert_eq!(declared_length(0xF6), Some(5));
/// assert_eq!(declared_length(0xF1), Some(0));
/// assert_eq!(declared_length(0xF0), None);
/// ```
#[inline]
pub fn declared_length(sync: u8) -> Option<usize> {
    usize::from(sync & FMSPIC_LENGTH_MASK).checked_sub(1)
}

/// Physical axis assigned to each channel position.
///
/// The order is fixed: downstream consumers rely on channel 1 being the
/// primary vertical stick, channel 2 the primary horizontal one, and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Channel 1
    PrimaryVertical,
    /// Channel 2
    PrimaryHorizontal,
    /// Channel 3
    SecondaryVertical,
    /// Channel 4
    SecondaryHorizontal,
    /// Channel 5
    AuxA,
    /// Channel 6
    AuxB,
}

impl Axis {
    /// All axes in channel order.
    pub const ALL: [Axis; FMSPIC_MAX_CHANNELS] = [
        Axis::PrimaryVertical,
        Axis::PrimaryHorizontal,
        Axis::SecondaryVertical,
        Axis::SecondaryHorizontal,
        Axis::AuxA,
        Axis::AuxB,
    ];

    /// Axis for a 1-based channel number.
    pub fn from_channel(channel: usize) -> Option<Axis> {
        channel.checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }

    /// 1-based channel number of this axis.
    pub fn channel(self) -> usize {
        self as usize + 1
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Axis::PrimaryVertical => "primary-vertical",
            Axis::PrimaryHorizontal => "primary-horizontal",
            Axis::SecondaryVertical => "secondary-vertical",
            Axis::SecondaryHorizontal => "secondary-horizontal",
            Axis::AuxA => "aux-a",
            Axis::AuxB => "aux-b",
        };
        f.write_str(name)
    }
}
