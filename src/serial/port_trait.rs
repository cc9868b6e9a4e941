//! Trait abstraction for serial port reads to enable testing

use async_trait::async_trait;
use std::io;

/// Trait for the byte source a link is fed from
#[async_trait]
pub trait SerialPortIO: Send {
    /// Read available bytes into `buf`; `Ok(0)` means the port closed
    async fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

/// Wrapper around tokio_serial::SerialStream that implements SerialPortIO
pub struct TokioSerialPort {
    port: tokio_serial::SerialStream,
}

impl TokioSerialPort {
    pub fn new(port: tokio_serial::SerialStream) -> Self {
        Self { port }
    }
}

#[async_trait]
impl SerialPortIO for TokioSerialPort {
    async fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        use tokio::io::AsyncReadExt;
        self.port.read(buf).await
    }
}

#[cfg(test)]
pub mod mocks {
    use super::*;
    use std::collections::VecDeque;

    /// Mock serial port replaying scripted reads
    ///
    /// Each queued chunk is returned by one `read` call; once the script is
    /// exhausted the port reports closed.
    #[derive(Default)]
    pub struct MockSerialPort {
        pub chunks: VecDeque<io::Result<Vec<u8>>>,
        pub reads: usize,
    }

    impl MockSerialPort {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_chunks<I>(chunks: I) -> Self
        where
            I: IntoIterator<Item = Vec<u8>>,
        {
            Self {
                chunks: chunks.into_iter().map(Ok).collect(),
                reads: 0,
            }
        }

        pub fn push_error(&mut self, kind: io::ErrorKind) {
            self.chunks
                .push_back(Err(io::Error::new(kind, "Mock read error")));
        }
    }

    #[async_trait]
    impl SerialPortIO for MockSerialPort {
        async fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.reads += 1;
            match self.chunks.pop_front() {
                Some(Ok(chunk)) => {
                    let n = chunk.len().min(buf.len());
                    buf[..n].copy_from_slice(&chunk[..n]);
                    if n < chunk.len() {
                        self.chunks.push_front(Ok(chunk[n..].to_vec()));
                    }
                    Ok(n)
                }
                Some(Err(e)) => Err(e),
                None => Ok(0),
            }
        }
    }
}
