// TeleSift - app/source.rs
//
// Log sources: where the raw telemetry buffer comes from.
//
// Every source honours the same contract: one complete byte buffer per
// run, or an error. A transfer that fails part-way returns nothing.
//
// Transient file I/O errors are retried with capped backoff; socket errors
// are not, since a half-delivered dump cannot be resumed.

use crate::util::constants;
use crate::util::error::SourceError;
use std::io::{self, Read};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Retry limits for transient file I/O errors.
const MAX_RETRIES: u32 = 3;
const RETRY_DELAYS_MS: [u64; 3] = [50, 100, 200];

/// Supplies one opaque telemetry buffer per call.
pub trait LogSource {
    fn fetch(&mut self) -> Result<Vec<u8>, SourceError>;

    /// Short human-readable description for logs and summaries.
    fn describe(&self) -> String;
}

// =============================================================================
// TCP
// =============================================================================

/// Reads a dump from the controller PC: connect, read until the peer
/// closes, done.
#[derive(Debug, Clone)]
pub struct TcpSource {
    pub address: String,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub max_bytes: usize,
}

impl TcpSource {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            connect_timeout: Duration::from_millis(constants::DEFAULT_CONNECT_TIMEOUT_MS),
            read_timeout: Duration::from_millis(constants::DEFAULT_READ_TIMEOUT_MS),
            max_bytes: constants::DEFAULT_MAX_TRANSFER_BYTES,
        }
    }

    fn resolve(&self) -> Result<Vec<SocketAddr>, SourceError> {
        let addrs: Vec<SocketAddr> = self
            .address
            .to_socket_addrs()
            .map_err(|e| SourceError::Resolve {
                address: self.address.clone(),
                source: e,
            })?
            .collect();
        if addrs.is_empty() {
            return Err(SourceError::Resolve {
                address: self.address.clone(),
                source: io::Error::new(io::ErrorKind::NotFound, "no addresses found"),
            });
        }
        Ok(addrs)
    }

    fn connect(&self) -> Result<TcpStream, SourceError> {
        let mut last_err = None;
        for addr in self.resolve()? {
            match TcpStream::connect_timeout(&addr, self.connect_timeout) {
                Ok(stream) => return Ok(stream),
                Err(e) => {
                    tracing::debug!(%addr, error = %e, "Connect attempt failed");
                    last_err = Some(e);
                }
            }
        }
        Err(SourceError::Connect {
            address: self.address.clone(),
            source: last_err
                .unwrap_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no addresses")),
        })
    }
}

impl LogSource for TcpSource {
    fn fetch(&mut self) -> Result<Vec<u8>, SourceError> {
        let mut stream = self.connect()?;
        tracing::info!(address = %self.address, "Connected to telemetry source");

        let read_err = |received: usize, e: io::Error| SourceError::Read {
            address: self.address.clone(),
            bytes_received: received,
            source: e,
        };
        stream
            .set_read_timeout(Some(self.read_timeout))
            .map_err(|e| read_err(0, e))?;

        let mut buffer = Vec::new();
        let mut chunk = [0u8; constants::SOURCE_READ_CHUNK_SIZE];
        loop {
            match stream.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => {
                    if buffer.len() + n > self.max_bytes {
                        return Err(SourceError::TooLarge {
                            address: self.address.clone(),
                            max_bytes: self.max_bytes,
                        });
                    }
                    buffer.extend_from_slice(&chunk[..n]);
                    tracing::trace!(received = buffer.len(), "Chunk received");
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(read_err(buffer.len(), e)),
            }
        }

        tracing::info!(address = %self.address, bytes = buffer.len(), "Transfer complete");
        Ok(buffer)
    }

    fn describe(&self) -> String {
        format!("tcp://{}", self.address)
    }
}

// =============================================================================
// File
// =============================================================================

/// Reads a previously captured dump from disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    pub path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl LogSource for FileSource {
    fn fetch(&mut self) -> Result<Vec<u8>, SourceError> {
        let file_err = |e| SourceError::File {
            path: self.path.clone(),
            source: e,
        };
        let size = std::fs::metadata(&self.path).map_err(file_err)?.len();

        let bytes = if size > constants::LARGE_FILE_THRESHOLD {
            tracing::debug!(file = %self.path.display(), size, "Memory-mapping large dump");
            read_large_file(&self.path).map_err(file_err)?
        } else {
            read_small_file_with_retry(&self.path).map_err(file_err)?
        };

        tracing::info!(file = %self.path.display(), bytes = bytes.len(), "Dump loaded");
        Ok(bytes)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Read using `memmap2` for large files.
fn read_large_file(path: &Path) -> io::Result<Vec<u8>> {
    let file = std::fs::File::open(path)?;
    // SAFETY: the map is read-only and copied out immediately; a dump being
    // rewritten underneath us is outside what this tool supports.
    let mmap = unsafe { memmap2::Mmap::map(&file)? };
    Ok(mmap.to_vec())
}

/// Read a small file with transient-error retries.
fn read_small_file_with_retry(path: &Path) -> io::Result<Vec<u8>> {
    let mut last_err: Option<io::Error> = None;

    for attempt in 0..MAX_RETRIES {
        match std::fs::read(path) {
            Ok(content) => return Ok(content),
            Err(e) if is_transient_error(&e) => {
                tracing::debug!(
                    file = %path.display(),
                    attempt = attempt + 1,
                    error = %e,
                    "Transient I/O error, retrying"
                );
                std::thread::sleep(Duration::from_millis(RETRY_DELAYS_MS[attempt as usize]));
                last_err = Some(e);
            }
            Err(e) => return Err(e),
        }
    }

    Err(last_err.unwrap_or_else(|| io::Error::other("Unknown read error")))
}

/// Returns true for transient I/O errors that are worth retrying.
fn is_transient_error(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted | io::ErrorKind::TimedOut
    )
}

// =============================================================================
// Memory
// =============================================================================

/// A fixed in-memory buffer. Used by tests and library callers that already
/// hold the dump.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    pub bytes: Vec<u8>,
}

impl MemorySource {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }
}

impl LogSource for MemorySource {
    fn fetch(&mut self) -> Result<Vec<u8>, SourceError> {
        Ok(self.bytes.clone())
    }

    fn describe(&self) -> String {
        format!("memory ({} bytes)", self.bytes.len())
    }
}
