//! Resume orchestration.
//!
//! The [`ResumeOrchestrator`] drives exactly one transfer to completion or
//! terminal failure. It runs the initial response body, then — for transfers
//! whose total size is known — keeps issuing ranged resume requests until
//! the byte count matches or the resume budget is exhausted. Callers never
//! see the resume/restart distinction: a server that answers a resume
//! request with a plain 200 is handled here by truncating the output and
//! adopting the fresh response as the new baseline.
//!
//! Retries and reattempts share one budget: the counter is bumped before a
//! resume request is issued, so a purely transient network failure consumes
//! the same budget as an incomplete response body.

use crate::error::{Error, Result};
use crate::http::response::FetchResponse;
use crate::http::transport::HttpTransport;
use crate::transfer::TransferRecord;

use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use tracing::{debug, warn};

/// Pluggable chunk-processing strategy.
///
/// Invoked after every chunk lands on disk. Batch workers use this to feed
/// the aggregate progress tracker and to re-check the shared error flag;
/// returning an error aborts the transfer immediately (it is never retried).
pub trait ChunkObserver: Send + Sync {
    /// Called with the size of each chunk written.
    fn on_chunk(&self, len: u64) -> Result<()>;

    /// Called when a server-side restart discarded previously received
    /// bytes, so progress trackers can wind back.
    fn on_reset(&self, _discarded: u64) {}
}

/// Observer that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl ChunkObserver for NullObserver {
    fn on_chunk(&self, _len: u64) -> Result<()> {
        Ok(())
    }
}

/// How a single pass over a response body ended.
enum StreamEnd {
    /// The body ran to its natural end.
    Finished,
    /// The connection dropped or a read timed out mid-body.
    Dropped(Error),
}

/// Stateless algorithm object driving one transfer per invocation.
pub struct ResumeOrchestrator<'a> {
    transport: &'a HttpTransport,
    max_retries: u32,
}

impl<'a> ResumeOrchestrator<'a> {
    /// Creates an orchestrator bound to a transport and a resume budget.
    pub fn new(transport: &'a HttpTransport, max_retries: u32) -> Self {
        Self {
            transport,
            max_retries,
        }
    }

    /// Runs `transfer` to completion or terminal failure.
    ///
    /// On success the completed record is handed back (with its file
    /// flushed); on any terminal failure the partial output file has been
    /// removed from disk before the error is returned.
    pub async fn run(
        &self,
        mut transfer: TransferRecord,
        mut response: FetchResponse,
        observer: &dyn ChunkObserver,
    ) -> Result<TransferRecord> {
        // First pass over the initial response.
        match stream_body(&mut transfer, &mut response, observer).await {
            Ok(StreamEnd::Finished) => {}
            Ok(StreamEnd::Dropped(err)) => {
                if transfer.total().is_none() {
                    // Without a known total there is no offset the server
                    // will honor; the interruption is fatal.
                    return fail(transfer, err).await;
                }
                warn!(
                    "transfer of {} interrupted at byte {}; will resume",
                    transfer.url,
                    transfer.received()
                );
            }
            Err(err) => return fail(transfer, err).await,
        }

        let mut baseline: HeaderMap = response.headers().clone();

        // Resume loop.
        while transfer.reattempts() < self.max_retries && transfer.is_incomplete() {
            transfer.begin_reattempt();
            debug!(
                "resume attempt {}/{} for {} at byte {}",
                transfer.reattempts(),
                self.max_retries,
                transfer.url,
                transfer.received()
            );

            let mut resumed = match self.transport.get_resume(&transfer, &baseline).await {
                Ok(res) => res,
                Err(err) if is_transient(&err) => {
                    warn!("resume request for {} failed: {}", transfer.url, err);
                    continue;
                }
                Err(err) => return fail(transfer, err).await,
            };

            if resumed.status() == StatusCode::OK {
                // The server ignored the range and is restarting from
                // byte zero; the fresh response becomes the new baseline,
                // including its declared length, which may differ if the
                // resource changed.
                debug!("{} ignored the range request; restarting", transfer.url);
                let discarded = transfer.received();
                if let Err(err) = transfer.reset_file().await {
                    return fail(transfer, err).await;
                }
                observer.on_reset(discarded);
                transfer.set_total(resumed.total_size());
                baseline = resumed.headers().clone();
            }

            match stream_body(&mut transfer, &mut resumed, observer).await {
                Ok(StreamEnd::Finished) => {}
                Ok(StreamEnd::Dropped(err)) => {
                    warn!("transfer of {} interrupted again: {}", transfer.url, err);
                }
                Err(err) => return fail(transfer, err).await,
            }
        }

        if transfer.is_incomplete() {
            let url = transfer.url.to_string();
            let received = transfer.received();
            let expected = transfer.total().unwrap_or(received);
            if let Err(err) = transfer.discard().await {
                warn!("could not remove partial file for {}: {}", url, err);
            }
            return Err(Error::IncompleteTransfer {
                url,
                received,
                expected,
            });
        }

        if let Err(err) = transfer.flush().await {
            return fail(transfer, err).await;
        }

        // A completion that needed at least one reattempt was assembled from
        // multiple responses, which the cache layer will not have stored.
        if transfer.reattempts() > 0 {
            self.transport
                .cache_resumed_download(&transfer, &baseline)
                .await?;
        }

        Ok(transfer)
    }
}

/// Streams one response body into the transfer record.
///
/// Read errors are reported as [`StreamEnd::Dropped`] for the caller to
/// classify; write and observer errors are fatal and returned as `Err`.
async fn stream_body(
    transfer: &mut TransferRecord,
    response: &mut FetchResponse,
    observer: &dyn ChunkObserver,
) -> Result<StreamEnd> {
    loop {
        match response.chunk().await {
            Ok(Some(chunk)) => {
                transfer.write_chunk(&chunk).await?;
                observer.on_chunk(chunk.len() as u64)?;
            }
            Ok(None) => return Ok(StreamEnd::Finished),
            Err(err) => return Ok(StreamEnd::Dropped(err)),
        }
    }
}

/// Removes the partial output and propagates a fatal error.
async fn fail(transfer: TransferRecord, err: Error) -> Result<TransferRecord> {
    let url = transfer.url.to_string();
    if let Err(cleanup) = transfer.discard().await {
        warn!("could not remove partial file for {}: {}", url, cleanup);
    }
    Err(err)
}

/// Transport-level request and read errors are transient; everything else
/// (I/O, connectivity statuses, observer aborts) is fatal.
fn is_transient(err: &Error) -> bool {
    matches!(err, Error::Request { .. } | Error::Reqwest { .. })
}
