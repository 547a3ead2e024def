//! Per-transfer progress bookkeeping.
//!
//! This module contains the [`TransferRecord`] struct, the mutable state that
//! follows a single download from its first byte to a terminal outcome. The
//! record owns the output file handle exclusively; it is created when a
//! transfer begins, mutated only by the worker driving that transfer, and
//! dropped when the transfer succeeds, fails fatally, or the resume
//! orchestrator gives up.

use crate::error::Result;

use reqwest::Url;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncSeekExt, AsyncWriteExt};

/// Mutable progress state for one in-flight download.
#[derive(Debug)]
pub struct TransferRecord {
    /// URL the bytes are coming from.
    pub url: Url,
    /// Destination path on disk.
    path: PathBuf,
    /// Exclusively owned output handle, opened for writing.
    file: File,
    /// Expected total size. `None` for chunked/streamed responses where the
    /// server declared no length.
    total: Option<u64>,
    /// Bytes written so far. Monotonically non-decreasing except across
    /// [`TransferRecord::reset_file`].
    received: u64,
    /// Number of resume attempts performed so far.
    reattempts: u32,
}

impl TransferRecord {
    /// Creates a record for a fresh transfer, opening (and truncating) the
    /// destination file.
    pub async fn create(url: Url, path: impl AsRef<Path>, total: Option<u64>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).await?;
        Ok(Self {
            url,
            path,
            file,
            total,
            received: 0,
            reattempts: 0,
        })
    }

    /// Destination path of this transfer.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Expected total size, if the server declared one.
    pub fn total(&self) -> Option<u64> {
        self.total
    }

    /// Replaces the expected total size.
    ///
    /// Used when a server restarts a transfer with a fresh full response:
    /// the resource may have changed length, and completeness must be
    /// judged against what the restarted response declares.
    pub fn set_total(&mut self, total: Option<u64>) {
        self.total = total;
    }

    /// Bytes received so far.
    pub fn received(&self) -> u64 {
        self.received
    }

    /// Number of resume attempts performed so far.
    pub fn reattempts(&self) -> u32 {
        self.reattempts
    }

    /// Consumes one unit of the resume budget.
    pub fn begin_reattempt(&mut self) {
        self.reattempts += 1;
    }

    /// Returns `true` iff the expected size is known and not yet reached.
    ///
    /// A transfer of unknown size is never reported incomplete; it is done
    /// when its stream runs to the natural end.
    pub fn is_incomplete(&self) -> bool {
        match self.total {
            Some(total) => self.received < total,
            None => false,
        }
    }

    /// Appends a chunk to the output file and advances the received count.
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> Result<()> {
        self.file.write_all(chunk).await?;
        self.received += chunk.len() as u64;
        Ok(())
    }

    /// Rewinds the output to byte zero and truncates it.
    ///
    /// Used only when a server answered a resume request with a plain 200,
    /// i.e. it ignored the Range header and is restarting from scratch.
    pub async fn reset_file(&mut self) -> Result<()> {
        self.file.rewind().await?;
        self.file.set_len(0).await?;
        self.received = 0;
        Ok(())
    }

    /// Flushes buffered bytes to disk.
    pub async fn flush(&mut self) -> Result<()> {
        self.file.flush().await?;
        Ok(())
    }

    /// Drops the file handle and removes the partial output from disk.
    pub async fn discard(self) -> Result<()> {
        let path = self.path;
        drop(self.file);
        tokio::fs::remove_file(&path).await?;
        Ok(())
    }
}
