//! # Serial Communication Module
//!
//! Handles the serial link to the FMS-PIC transmitter dongle.
//!
//! This module handles:
//! - Opening the serial port at 9600 baud, 8N1, no flow control
//! - Async reads of the continuous byte stream
//! - Pumping every received byte into a [`FmsPicLink`]

pub mod port_trait;

use crate::config::SerialConfig;
use crate::error::{FmsPicError, Result};
use crate::fmspic::link::FmsPicLink;
use crate::fmspic::protocol::FMSPIC_BAUD_RATE;
use crate::sink::ReadingSink;
use port_trait::{SerialPortIO, TokioSerialPort};
use tokio_serial::SerialPortBuilderExt;
use tracing::{debug, info, warn};

/// Default FMS-PIC device paths to try (in order of preference)
const DEFAULT_DEVICE_PATHS: &[&str] = &[
    "/dev/ttyUSB0", // USB-to-serial dongles (most common)
    "/dev/ttyS0",   // On-board UART
];

/// Read buffer size; the dongle sends at most a few hundred bytes per second
const READ_CHUNK_SIZE: usize = 64;

/// FMS-PIC Serial Port Handler
///
/// Manages the connection to the transmitter dongle.
pub struct FmsPicSerial {
    /// Serial port handle
    port: TokioSerialPort,
    /// Device path (e.g., /dev/ttyUSB0)
    device_path: String,
}

impl std::fmt::Debug for FmsPicSerial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FmsPicSerial")
            .field("device_path", &self.device_path)
            .finish_non_exhaustive()
    }
}

impl FmsPicSerial {
    /// Open the dongle on one of the default device paths
    ///
    /// # Errors
    ///
    /// Returns error if no device could be opened
    pub fn open() -> Result<Self> {
        Self::open_with_paths(DEFAULT_DEVICE_PATHS, FMSPIC_BAUD_RATE)
    }

    /// Open the dongle on the configured port
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use fmspic_bridge::config::SerialConfig;
    /// use fmspic_bridge::serial::FmsPicSerial;
    ///
    /// let serial = FmsPicSerial::open_config(&SerialConfig::default())?;
    /// println!("Connected to: {}", serial.device_path());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn open_config(config: &SerialConfig) -> Result<Self> {
        Self::open_with_paths(&[config.port.as_str()], config.baud_rate)
    }

    /// Open the dongle on the first path that works
    ///
    /// # Arguments
    ///
    /// * `paths` - Device paths to try (e.g., &["/dev/ttyUSB0"])
    /// * `baud_rate` - Line speed
    ///
    /// # Returns
    ///
    /// * `Result<FmsPicSerial>` - Connected serial port or error
    pub fn open_with_paths(paths: &[&str], baud_rate: u32) -> Result<Self> {
        for path in paths {
            debug!("Trying to open serial port: {}", path);

            match Self::open_port(path, baud_rate) {
                Ok(port) => {
                    info!("Successfully opened FMS-PIC device at {}", path);
                    return Ok(Self {
                        port: TokioSerialPort::new(port),
                        device_path: path.to_string(),
                    });
                }
                Err(e) => {
                    warn!("Failed to open {}: {}", path, e);
                    continue;
                }
            }
        }

        Err(FmsPicError::SerialPortNotFound(paths.join(", ")))
    }

    /// Open a specific serial port with FMS-PIC settings
    fn open_port(path: &str, baud_rate: u32) -> Result<tokio_serial::SerialStream> {
        let port = tokio_serial::new(path, baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()
            .map_err(|e| FmsPicError::Serial(format!("Failed to open {}: {}", path, e)))?;

        Ok(port)
    }

    /// Get the device path of the opened serial port
    pub fn device_path(&self) -> &str {
        &self.device_path
    }

    /// Mutable access to the byte source for [`pump`]
    pub fn port_mut(&mut self) -> &mut TokioSerialPort {
        &mut self.port
    }
}

/// Feed every byte read from `port` into `link` until the port closes
///
/// Readings are delivered to the link's sink as frames complete.
///
/// # Returns
///
/// * `Result<u64>` - Number of bytes consumed before the port closed
///
/// # Errors
///
/// Returns `Serial` if a read fails. Bytes read before the failure have
/// already been fed.
pub async fn pump<P, S>(port: &mut P, link: &mut FmsPicLink<S>) -> Result<u64>
where
    P: SerialPortIO + ?Sized,
    S: ReadingSink,
{
    let mut buf = [0u8; READ_CHUNK_SIZE];
    let mut total: u64 = 0;

    loop {
        let n = port
            .read(&mut buf)
            .await
            .map_err(|e| FmsPicError::Serial(format!("Failed to read: {}", e)))?;

        if n == 0 {
            debug!("Serial port closed after {} bytes", total);
            return Ok(total);
        }

        link.feed_slice(&buf[..n]);
        total += n as u64;
    }
}
