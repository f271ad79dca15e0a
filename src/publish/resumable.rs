//! Resumable chunked upload state machine.
//!
//! The server acknowledges each non-final chunk with `308 Resume Incomplete` and a `Range`
//! header naming the bytes it holds. After a transport failure the client asks for that range
//! with an empty `bytes */total` request and resumes from there.

use std::io::{Read, Seek, SeekFrom};
use std::time::Duration;

use crate::foundation::error::{SpotDiffError, SpotDiffResult};

/// Chunk sizes must be a multiple of this.
pub const CHUNK_GRANULE: usize = 256 * 1024;
pub const DEFAULT_CHUNK_SIZE: usize = 32 * CHUNK_GRANULE;
const MAX_BACKOFF: Duration = Duration::from_secs(32);

/// Server reply to a chunk upload or a status query.
#[derive(Clone, Debug, PartialEq)]
pub enum ChunkOutcome {
    /// Upload finished; carries the response body.
    Complete(serde_json::Value),
    /// The server holds bytes `[0, next_offset)`.
    Incomplete { next_offset: u64 },
    /// Transient failure (network error, 5xx, 429).
    Retryable(String),
}

/// One resumable upload session on the wire.
pub trait UploadTransport {
    fn put_chunk(&mut self, offset: u64, bytes: &[u8], total: u64) -> SpotDiffResult<ChunkOutcome>;

    fn query_status(&mut self, total: u64) -> SpotDiffResult<ChunkOutcome>;
}

#[derive(Clone, Debug)]
pub struct ResumableUpload {
    chunk_size: usize,
    max_retries: u32,
    base_backoff: Duration,
}

impl Default for ResumableUpload {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_retries: 5,
            base_backoff: Duration::from_secs(1),
        }
    }
}

impl ResumableUpload {
    /// Create an uploader. `chunk_size` must be a positive multiple of [`CHUNK_GRANULE`].
    pub fn new(chunk_size: usize, max_retries: u32, base_backoff: Duration) -> SpotDiffResult<Self> {
        if chunk_size == 0 || !chunk_size.is_multiple_of(CHUNK_GRANULE) {
            return Err(SpotDiffError::validation(format!(
                "upload chunk size must be a positive multiple of {CHUNK_GRANULE} bytes (got {chunk_size})"
            )));
        }
        Ok(Self {
            chunk_size,
            max_retries,
            base_backoff,
        })
    }

    /// Bytes sent per chunk request.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Send `total` bytes of `reader` through `transport`, returning the final response body.
    ///
    /// Consecutive failures without progress are bounded by `max_retries`.
    pub fn run<R, T>(&self, reader: &mut R, total: u64, transport: &mut T) -> SpotDiffResult<serde_json::Value>
    where
        R: Read + Seek,
        T: UploadTransport + ?Sized,
    {
        if total == 0 {
            return Err(SpotDiffError::publish("refusing to upload an empty file"));
        }

        let mut buf = vec![0u8; self.chunk_size];
        let mut offset = 0u64;
        let mut failures = 0u32;

        loop {
            let len = (total - offset).min(self.chunk_size as u64) as usize;
            reader
                .seek(SeekFrom::Start(offset))
                .and_then(|_| reader.read_exact(&mut buf[..len]))
                .map_err(|e| SpotDiffError::publish(format!("read upload source at {offset}: {e}")))?;

            let mut outcome = transport.put_chunk(offset, &buf[..len], total)?;
            if let ChunkOutcome::Retryable(reason) = &outcome {
                failures += 1;
                self.check_failures(failures, reason)?;
                tracing::warn!(offset, failures, reason = %reason, "chunk upload failed, querying status");
                std::thread::sleep(self.backoff(failures));
                outcome = transport.query_status(total)?;
            }

            match outcome {
                ChunkOutcome::Complete(body) => {
                    tracing::info!(bytes = total, "upload complete");
                    return Ok(body);
                }
                ChunkOutcome::Incomplete { next_offset } => {
                    if next_offset > total {
                        return Err(SpotDiffError::publish(format!(
                            "server acknowledged {next_offset} bytes of a {total}-byte upload"
                        )));
                    }
                    if next_offset > offset {
                        failures = 0;
                        tracing::debug!(next_offset, total, "chunk acknowledged");
                    } else {
                        failures += 1;
                        self.check_failures(failures, "no upload progress")?;
                    }
                    offset = next_offset;
                }
                ChunkOutcome::Retryable(reason) => {
                    failures += 1;
                    self.check_failures(failures, &reason)?;
                    std::thread::sleep(self.backoff(failures));
                }
            }
        }
    }

    fn check_failures(&self, failures: u32, reason: &str) -> SpotDiffResult<()> {
        if failures > self.max_retries {
            return Err(SpotDiffError::publish(format!(
                "upload gave up after {} retries: {reason}",
                self.max_retries
            )));
        }
        Ok(())
    }

    fn backoff(&self, failures: u32) -> Duration {
        let factor = 1u32 << failures.saturating_sub(1).min(16);
        self.base_backoff.saturating_mul(factor).min(MAX_BACKOFF)
    }
}

/// Next byte offset from a `Range: bytes=0-N` header; `None` header means nothing was stored.
pub fn next_offset_from_range(range: Option<&str>) -> SpotDiffResult<u64> {
    let Some(range) = range else {
        return Ok(0);
    };
    let end = range
        .trim()
        .strip_prefix("bytes=")
        .and_then(|r| r.split_once('-'))
        .and_then(|(start, end)| (start.trim() == "0").then_some(end))
        .and_then(|end| end.trim().parse::<u64>().ok())
        .ok_or_else(|| SpotDiffError::publish(format!("unexpected Range header '{range}'")))?;
    Ok(end + 1)
}

#[cfg(test)]
#[path = "../../tests/unit/publish/resumable.rs"]
mod tests;
