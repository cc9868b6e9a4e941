//! # FMS-PIC Bridge
//!
//! Use an RC transmitter with an FMS-PIC serial dongle as a Linux joystick.
//!
//! This application reads the dongle's "9600 F0" byte stream, decodes each
//! frame into channel readings, and reports them through a virtual uinput
//! joystick and optional JSONL telemetry.

use anyhow::{Context, Result};
use tokio::time::{sleep, Duration};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use fmspic_bridge::config::{Config, LoggingConfig};
use fmspic_bridge::fmspic::link::FmsPicLink;
use fmspic_bridge::serial::{pump, FmsPicSerial};
use fmspic_bridge::sink::uinput::UinputSink;
use fmspic_bridge::sink::{SinkSet, TracingSink};
use fmspic_bridge::telemetry::logger::ReadingLogger;

/// File name of the rolling diagnostic log
const LOG_FILE_NAME: &str = "fmspic-bridge.log";

/// Main entry point for FMS-PIC Bridge application
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Load configuration (first argument, or built-in defaults)
///    - Set up logging with tracing subscriber
///    - Create the virtual joystick and telemetry recorder
///
/// 2. **Main Loop**
///    - Open the serial port and attach a fresh link
///    - Feed every received byte through the link until the port closes
///    - Detach, wait `reconnect_interval_ms`, and try again
///
/// 3. **Graceful Shutdown**
///    - Ctrl+C stops reading, detaches the link and exits
///
/// # Errors
///
/// Returns error if the configuration is invalid or an enabled output
/// (virtual joystick, telemetry directory) cannot be created.
///
/// # Examples
///
/// ```bash
/// cargo run --release -- config/default.toml
/// ```
#[tokio::main]
async fn main() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(&path)
            .with_context(|| format!("Failed to load configuration from {}", path))?,
        None => Config::default(),
    };

    let _log_guard = init_logging(&config.logging);

    info!("FMS-PIC Bridge v{} starting...", env!("CARGO_PKG_VERSION"));

    let mut sinks = build_sinks(&config)?;
    let reconnect = Duration::from_millis(config.serial.reconnect_interval_ms);

    loop {
        match FmsPicSerial::open_config(&config.serial) {
            Ok(mut serial) => {
                info!("Reading FMS-PIC frames from {}", serial.device_path());

                let mut link = FmsPicLink::attach(sinks);
                let outcome = tokio::select! {
                    result = pump(serial.port_mut(), &mut link) => Some(result),
                    _ = tokio::signal::ctrl_c() => None,
                };
                sinks = link.detach();

                match outcome {
                    Some(Ok(total)) => warn!("Serial port closed after {} bytes", total),
                    Some(Err(e)) => warn!("Serial link lost: {}", e),
                    None => {
                        info!("Received Ctrl+C, shutting down...");
                        break;
                    }
                }
            }
            Err(e) => warn!("{}", e),
        }

        tokio::select! {
            _ = sleep(reconnect) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                break;
            }
        }
    }

    Ok(())
}

/// Console logging, plus a daily rolling file when `log_dir` is set.
///
/// `RUST_LOG` takes precedence over the configured level. The returned guard
/// must be kept alive for file output to be flushed.
fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_writer(writer).with_ansi(false)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .init();

    guard
}

/// Outputs every reading is delivered to, in order.
fn build_sinks(config: &Config) -> Result<SinkSet> {
    let mut sinks = SinkSet::new();
    sinks.push(TracingSink::new(config.logging.summary_interval));

    if config.input.enabled {
        let joystick = UinputSink::create(&config.input)
            .context("Failed to create virtual joystick (is /dev/uinput writable?)")?;
        sinks.push(joystick);
    }

    if config.telemetry.enabled {
        let logger = ReadingLogger::new(&config.telemetry).with_context(|| {
            format!("Failed to open telemetry directory {}", config.telemetry.log_dir)
        })?;
        sinks.push(logger);
    }

    Ok(sinks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_file_name() {
        assert_eq!(LOG_FILE_NAME, "fmspic-bridge.log");
    }

    #[test]
    fn test_build_sinks_tracing_only() {
        let mut config = Config::default();
        config.input.enabled = false;
        config.telemetry.enabled = false;

        let sinks = build_sinks(&config).unwrap();
        assert_eq!(sinks.len(), 1);
    }

    #[test]
    fn test_build_sinks_with_telemetry() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = Config::default();
        config.input.enabled = false;
        config.telemetry.enabled = true;
        config.telemetry.log_dir = dir.path().to_string_lossy().into_owned();

        let sinks = build_sinks(&config).unwrap();
        assert_eq!(sinks.len(), 2);
    }
}
