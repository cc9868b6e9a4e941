//! # Virtual Joystick Sink
//!
//! Reports readings as absolute axis events on a Linux uinput device, so the
//! transmitter shows up as an ordinary joystick.
//!
//! ## Axis Assignments
//!
//! | Channel | Axis | evdev Code |
//! |---------|------|------------|
//! | CH1 | primary vertical | ABS_Y |
//! | CH2 | primary horizontal | ABS_X |
//! | CH3 | secondary vertical | ABS_RY |
//! | CH4 | secondary horizontal | ABS_RX |
//! | CH5 | aux A | ABS_Z |
//! | CH6 | aux B | ABS_RZ |
//!
//! Each reading emits one event per present channel followed by a
//! `SYN_REPORT`. Requires write access to `/dev/uinput`.

use evdev::uinput::{VirtualDevice, VirtualDeviceBuilder};
use evdev::{AbsInfo, AbsoluteAxisType, BusType, EventType, InputEvent, InputId, UinputAbsSetup};
use tracing::{info, warn};

use crate::config::InputConfig;
use crate::error::{FmsPicError, Result};
use crate::fmspic::decoder::Reading;
use crate::fmspic::protocol::Axis;
use crate::sink::ReadingSink;

/// Bus vendor id shared with the Zhen Hua serio protocol
const FMSPIC_VENDOR_ID: u16 = 0x0036;

/// Product id of the virtual device
const FMSPIC_PRODUCT_ID: u16 = 0x0001;

/// Version reported by the virtual device
const FMSPIC_VERSION: u16 = 0x0100;

/// evdev axis for a channel position.
pub fn axis_code(axis: Axis) -> AbsoluteAxisType {
    match axis {
        Axis::PrimaryVertical => AbsoluteAxisType::ABS_Y,
        Axis::PrimaryHorizontal => AbsoluteAxisType::ABS_X,
        Axis::SecondaryVertical => AbsoluteAxisType::ABS_RY,
        Axis::SecondaryHorizontal => AbsoluteAxisType::ABS_RX,
        Axis::AuxA => AbsoluteAxisType::ABS_Z,
        Axis::AuxB => AbsoluteAxisType::ABS_RZ,
    }
}

/// Absolute axis events for the channels present in a reading.
pub fn axis_events(reading: &Reading) -> Vec<InputEvent> {
    reading
        .iter()
        .map(|(axis, value)| {
            InputEvent::new(EventType::ABSOLUTE, axis_code(axis).0, i32::from(value))
        })
        .collect()
}

/// Virtual joystick fed by decoded readings.
pub struct UinputSink {
    device: VirtualDevice,
    emit_errors: u64,
}

impl std::fmt::Debug for UinputSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UinputSink")
            .field("emit_errors", &self.emit_errors)
            .finish_non_exhaustive()
    }
}

impl UinputSink {
    /// Registers the virtual device.
    ///
    /// # Errors
    ///
    /// Returns `Input` if `/dev/uinput` cannot be opened or the device
    /// cannot be created.
    pub fn create(config: &InputConfig) -> Result<Self> {
        let abs = AbsInfo::new(0, 0, i32::from(config.axis_max), 0, 0, 0);

        let mut builder = VirtualDeviceBuilder::new()
            .map_err(|e| FmsPicError::Input(format!("Failed to open uinput: {}", e)))?
            .name(&config.device_name)
            .input_id(InputId::new(
                BusType::BUS_RS232,
                FMSPIC_VENDOR_ID,
                FMSPIC_PRODUCT_ID,
                FMSPIC_VERSION,
            ));

        for axis in Axis::ALL {
            builder = builder
                .with_absolute_axis(&UinputAbsSetup::new(axis_code(axis), abs))
                .map_err(|e| FmsPicError::Input(format!("Failed to add axis {}: {}", axis, e)))?;
        }

        let device = builder
            .build()
            .map_err(|e| FmsPicError::Input(format!("Failed to create device: {}", e)))?;

        info!("Created virtual joystick \"{}\"", config.device_name);
        Ok(Self {
            device,
            emit_errors: 0,
        })
    }

    /// Events that could not be written.
    pub fn emit_errors(&self) -> u64 {
        self.emit_errors
    }
}

impl ReadingSink for UinputSink {
    fn on_reading(&mut self, reading: &Reading) {
        let events = axis_events(reading);

        // emit() appends the SYN_REPORT itself.
        if let Err(e) = self.device.emit(&events) {
            self.emit_errors += 1;
            if self.emit_errors == 1 || self.emit_errors % 1000 == 0 {
                warn!("Failed to emit joystick events ({} total): {}", self.emit_errors, e);
            }
        }
    }
}
