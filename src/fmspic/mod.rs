//! # FMS-PIC Protocol Module
//!
//! Implementation of the FMS-PIC "9600 F0" serial protocol spoken by RC
//! transmitter dongles.
//!
//! This module handles:
//! - Sync byte detection and frame length extraction
//! - Byte-by-byte frame accumulation with silent resynchronization
//! - Positional decoding of channel bytes into readings
//! - Per-link state with attach / feed / detach lifecycle
//!
//! The "19200 FF" variant (0xFF as sync byte) is not supported.

pub mod protocol;
pub mod synchronizer;
pub mod decoder;
pub mod link;
