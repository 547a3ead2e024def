//! Batch retrieval with bounded parallelism and first-error-wins semantics.
//!
//! [`Fetcher::fetch_all`] turns a list of locators into a lazy, one-shot
//! stream of results in completion order. Every piece of shared batch state
//! — the set-once error flag, the completion channel, the concurrency
//! semaphore, and the progress display — lives in a session constructed
//! fresh per call, so concurrent batches from the same process cannot
//! interfere.
//!
//! Cancellation is cooperative: workers check the error flag before touching
//! the network and between successive chunks, and are never torn down
//! mid-write. The coordinator awaits every worker before surfacing the first
//! recorded error, so no task outlives the batch.

use super::fetcher::{Fetched, Fetcher, ProgressObserver};
use crate::error::{Error, Result};
use crate::http::transport::RemoteInfo;
use crate::http::HttpTransport;
use crate::progress::ProgressDisplay;

use futures::Stream;
use reqwest::Url;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Lazy, one-shot sequence of batch results in completion order.
///
/// Yields one `Ok` per fetched file. If any worker failed, exactly one `Err`
/// (the first recorded) is yielded after every worker has stopped, and the
/// stream ends. Completion order is inherently non-deterministic and must
/// not be relied upon.
pub struct BatchStream {
    inner: mpsc::Receiver<Result<Fetched>>,
}

impl Stream for BatchStream {
    type Item = Result<Fetched>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().inner.poll_recv(cx)
    }
}

impl std::fmt::Debug for BatchStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchStream").finish_non_exhaustive()
    }
}

/// Shared state of one batch call, torn down when the stream ends.
struct BatchSession {
    abort: Arc<AtomicBool>,
    first_error: Arc<Mutex<Option<Error>>>,
    gate: Arc<Semaphore>,
}

impl BatchSession {
    fn new(max_parallelism: usize) -> Self {
        Self {
            abort: Arc::new(AtomicBool::new(false)),
            first_error: Arc::new(Mutex::new(None)),
            gate: Arc::new(Semaphore::new(max_parallelism)),
        }
    }

    /// Records `err` as the batch outcome if it is the first, and trips the
    /// abort flag either way.
    fn record_failure(&self, err: Error) {
        if !matches!(err, Error::Aborted) {
            let mut slot = self.first_error.lock().unwrap();
            if slot.is_none() {
                *slot = Some(err);
            }
        }
        self.abort.store(true, Ordering::Relaxed);
    }
}

impl Fetcher {
    /// Fetches many URLs with bounded parallelism.
    ///
    /// Returns a lazy stream of results in completion order (see
    /// [`BatchStream`]). Fails synchronously with
    /// [`Error::Configuration`] when `max_parallelism` is zero, before any
    /// network activity.
    pub async fn fetch_all(&self, urls: &[Url]) -> Result<BatchStream> {
        if self.max_parallelism() < 1 {
            return Err(Error::Configuration(
                "max_parallelism must be at least 1".into(),
            ));
        }

        let transport = self.build_transport()?;
        tokio::fs::create_dir_all(self.directory()).await?;

        // Probe every locator so the scheduler can order by size.
        let probes = futures::future::join_all(
            urls.iter()
                .map(|url| async { (url.clone(), transport.head_content_info(url).await) }),
        )
        .await;

        let mut entries: Vec<(Url, RemoteInfo)> = Vec::with_capacity(probes.len());
        for (url, probe) in probes {
            entries.push((url, probe?));
        }

        // Largest transfers first, so they start earliest and finish closest
        // together. With any unknown size the ordering heuristic and the
        // aggregate byte total are both meaningless and get skipped.
        let all_sizes_known = entries.iter().all(|(_, info)| info.size.is_some());
        let total_bytes = if all_sizes_known {
            entries.sort_by(|a, b| b.1.size.cmp(&a.1.size));
            Some(entries.iter().filter_map(|(_, info)| info.size).sum())
        } else {
            None
        };

        let display = ProgressDisplay::new(self.config.style_options(), total_bytes);
        let session = Arc::new(BatchSession::new(self.max_parallelism()));
        let worker_count = entries.len();
        let (done_tx, mut done_rx) = mpsc::channel::<Fetched>(worker_count.max(1));

        let mut workers: Vec<JoinHandle<()>> = Vec::with_capacity(worker_count);
        for (url, info) in entries {
            workers.push(tokio::spawn(run_worker(
                self.clone(),
                transport.clone(),
                display.clone(),
                Arc::clone(&session),
                url,
                info,
                done_tx.clone(),
            )));
        }
        drop(done_tx);

        let (out_tx, out_rx) = mpsc::channel::<Result<Fetched>>(worker_count.max(1));
        let coordinator_session = Arc::clone(&session);
        tokio::spawn(async move {
            let mut remaining = worker_count;
            while remaining > 0 && !coordinator_session.abort.load(Ordering::Relaxed) {
                match done_rx.recv().await {
                    Some(fetched) => {
                        remaining -= 1;
                        if out_tx.send(Ok(fetched)).await.is_err() {
                            // The consumer dropped the stream; treat it like
                            // an external error and let workers wind down.
                            coordinator_session.abort.store(true, Ordering::Relaxed);
                            break;
                        }
                    }
                    None => break,
                }
            }

            // Quiesce every worker before surfacing anything.
            for worker in workers {
                if let Err(err) = worker.await {
                    warn!("batch worker panicked: {}", err);
                }
            }
            display.finish();

            // Take the error before awaiting; the guard must not be held
            // across a suspension point.
            let first_error = coordinator_session.first_error.lock().unwrap().take();
            if let Some(err) = first_error {
                let _ = out_tx.send(Err(err)).await;
            }
        });

        Ok(BatchStream { inner: out_rx })
    }
}

/// One bounded worker: gate, flag check, transfer, report.
async fn run_worker(
    fetcher: Fetcher,
    transport: HttpTransport,
    display: ProgressDisplay,
    session: Arc<BatchSession>,
    url: Url,
    info: RemoteInfo,
    done: mpsc::Sender<Fetched>,
) {
    let Ok(_permit) = session.gate.clone().acquire_owned().await else {
        return;
    };
    if session.abort.load(Ordering::Relaxed) {
        debug!("skipping {}: batch already failed", url);
        return;
    }

    match run_transfer(&fetcher, &transport, &display, &session, &url, &info).await {
        Ok(fetched) => {
            let _ = done.send(fetched).await;
        }
        Err(err) => {
            debug!("transfer of {} failed: {}", url, err);
            session.record_failure(err);
        }
    }
}

async fn run_transfer(
    fetcher: &Fetcher,
    transport: &HttpTransport,
    display: &ProgressDisplay,
    session: &BatchSession,
    url: &Url,
    info: &RemoteInfo,
) -> Result<Fetched> {
    let response = transport.get(url, fetcher.headers()).await?;
    let size = response.total_size().or(info.size);

    let child = display.create_child_progress(size, 0);
    let observer = ProgressObserver::new(
        child.clone(),
        display.clone(),
        Some(Arc::clone(&session.abort)),
    );

    let result = fetcher
        .run_transfer(transport, url, response, info.filename.as_deref(), &observer)
        .await;
    display.finish_child(child);
    result
}
