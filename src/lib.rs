//! # FMS-PIC Bridge Library
//!
//! Use an RC transmitter with an FMS-PIC "9600 F0" serial dongle as a joystick.
//!
//! This library provides the frame synchronizer and decoder for the FMS-PIC
//! byte stream, plus the serial transport and output sinks used by the
//! `fmspic-bridge` binary.

pub mod config;
pub mod error;
pub mod fmspic;
pub mod serial;
pub mod sink;
pub mod telemetry;
