// src/core/scanner/worker_pool.rs

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::core::errors::PoolError;
use crate::core::models::Record;
use crate::core::scanner::domain_client::DomainClient;
use crate::core::scanner::http::{BodyFetcher, HttpFetcher};

// --- Fatal signal ---

/// Sending half of the run-wide fatal channel. Only the first signal is
/// delivered; later ones are dropped.
#[derive(Debug, Clone)]
pub struct FatalSignal {
    fired: Arc<AtomicBool>,
    tx: mpsc::Sender<PoolError>,
}

/// Creates the fatal channel. The receiver yields at most one error.
pub fn fatal_channel() -> (FatalSignal, mpsc::Receiver<PoolError>) {
    let (tx, rx) = mpsc::channel(1);
    (FatalSignal { fired: Arc::new(AtomicBool::new(false)), tx }, rx)
}

impl FatalSignal {
    pub fn signal(&self, err: PoolError) {
        if self.fired.swap(true, Ordering::SeqCst) {
            debug!(error = %err, "fatal error already signalled, dropping");
            return;
        }
        error!(error = %err, "fatal error");
        // Capacity 1 and a single sender that gets through, so this only
        // fails if nobody is listening any more.
        let _ = self.tx.try_send(err);
    }

    pub fn is_fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }
}

// --- Stats ---

/// What the workers did with the domains they pulled.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    pub processed: usize,
    pub found: usize,
    pub not_found: usize,
    pub failed: usize,
}

impl PoolStats {
    fn merge(&mut self, other: PoolStats) {
        self.processed += other.processed;
        self.found += other.found;
        self.not_found += other.not_found;
        self.failed += other.failed;
    }
}

// --- Pool ---

/// A fixed number of workers draining one shared domain queue.
#[derive(Debug)]
pub struct WorkerPool<F = HttpFetcher> {
    client: Arc<DomainClient<F>>,
    size: usize,
}

impl<F> WorkerPool<F>
where
    F: BodyFetcher + 'static,
{
    pub fn new(client: DomainClient<F>, size: usize) -> Result<Self, PoolError> {
        if size == 0 {
            return Err(PoolError::NoWorkers);
        }
        Ok(Self { client: Arc::new(client), size })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Runs the workers until `input` is closed and drained, or until
    /// `cancel` fires.
    ///
    /// Records are pushed to `output` in completion order. `output` closes
    /// once the last worker has exited, because every worker owns one clone
    /// of the sender and this function drops its own before waiting.
    ///
    /// # Arguments
    ///
    /// * `input` - Domains to scan. Shared by all workers.
    /// * `output` - Where found records go.
    /// * `fatal` - Signalled when the output is gone or a domain client
    ///   error makes further work pointless. Workers that see it fired
    ///   finish their current domain and stop pulling new ones.
    /// * `cancel` - Aborts in-flight probes. A cancelled worker returns
    ///   without sending the record it was working on.
    pub async fn run(
        &self,
        input: mpsc::Receiver<String>,
        output: mpsc::Sender<Record>,
        fatal: FatalSignal,
        cancel: CancellationToken,
    ) -> PoolStats {
        let input = Arc::new(Mutex::new(input));
        let mut workers = JoinSet::new();

        for id in 0..self.size {
            workers.spawn(worker(
                id,
                Arc::clone(&self.client),
                Arc::clone(&input),
                output.clone(),
                fatal.clone(),
                cancel.clone(),
            ));
        }
        drop(output);

        let mut stats = PoolStats::default();
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(worker_stats) => stats.merge(worker_stats),
                Err(e) => error!(error = %e, "worker task failed"),
            }
        }

        info!(
            processed = stats.processed,
            found = stats.found,
            not_found = stats.not_found,
            failed = stats.failed,
            "worker pool finished"
        );
        stats
    }
}

async fn worker<F: BodyFetcher>(
    id: usize,
    client: Arc<DomainClient<F>>,
    input: Arc<Mutex<mpsc::Receiver<String>>>,
    output: mpsc::Sender<Record>,
    fatal: FatalSignal,
    cancel: CancellationToken,
) -> PoolStats {
    let mut stats = PoolStats::default();

    loop {
        if fatal.is_fired() {
            debug!(worker = id, "fatal error signalled, stopping");
            break;
        }

        let next = tokio::select! {
            _ = cancel.cancelled() => None,
            domain = async { input.lock().await.recv().await } => domain,
        };
        let Some(domain) = next else {
            break;
        };
        if fatal.is_fired() {
            debug!(worker = id, domain = %domain, "fatal error signalled, dropping domain");
            break;
        }

        let result = tokio::select! {
            _ = cancel.cancelled() => {
                debug!(worker = id, domain = %domain, "cancelled");
                break;
            }
            result = client.get_security_txt(&domain) => result,
        };
        stats.processed += 1;

        match result {
            Ok(Some(record)) => {
                stats.found += 1;
                if output.send(record).await.is_err() {
                    fatal.signal(PoolError::OutputClosed);
                    break;
                }
            }
            Ok(None) => stats.not_found += 1,
            Err(e) if e.is_fatal() => {
                stats.failed += 1;
                fatal.signal(PoolError::Scan(e));
                break;
            }
            Err(e) => {
                stats.failed += 1;
                warn!(worker = id, domain = %domain, error = %e, "skipping domain");
            }
        }
    }

    debug!(worker = id, processed = stats.processed, "worker exiting");
    stats
}
