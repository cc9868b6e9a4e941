//! # Telemetry Module
//!
//! Records decoded readings to JSONL files with rotation.
//!
//! This module handles:
//! - Formatting each reading as one JSON line
//! - Writing to rotating log files (max N records per file)
//! - Retaining only the last M files

pub mod logger;
