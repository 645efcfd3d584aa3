// src/app/mod.rs

//! Wiring of a whole run: input reader, worker pool and output writer.

pub mod disclosure;
pub mod reader;
pub mod writer;

use std::io::Write;
use std::path::PathBuf;

use thiserror::Error;
use tokio::io::AsyncRead;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::core::config::ClientConfig;
use crate::core::errors::{PoolError, ScanError};
use crate::core::scanner::{BodyFetcher, DomainClient, HttpFetcher, PoolStats, WorkerPool, fatal_channel};

use self::reader::read_domains;
use self::writer::{Writer, WriterStats};

// --- Configuration ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub workers: usize,
    /// Capacity of both the domain queue and the record queue.
    pub queue_capacity: usize,
    /// Where to mirror non-compliant records, if anywhere.
    pub non_compliant_output: Option<PathBuf>,
    pub client: ClientConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self { workers: 8, queue_capacity: 64, non_compliant_output: None, client: ClientConfig::default() }
    }
}

// --- Errors ---

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Client(#[from] ScanError),

    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error("output error: {0}")]
    Output(#[from] std::io::Error),

    #[error("task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

// --- Summary ---

/// End-of-run counts.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub domains_read: usize,
    pub records_found: usize,
    pub compliant: usize,
    pub non_compliant: usize,
    pub not_found: usize,
    pub failed: usize,
}

impl RunSummary {
    fn new(domains_read: usize, pool: PoolStats, writer: WriterStats) -> Self {
        Self {
            domains_read,
            records_found: writer.written,
            compliant: writer.compliant,
            non_compliant: writer.non_compliant,
            not_found: pool.not_found,
            failed: pool.failed,
        }
    }
}

// --- App ---

#[derive(Debug)]
pub struct App<F = HttpFetcher> {
    config: RunConfig,
    pool: WorkerPool<F>,
}

impl App<HttpFetcher> {
    pub fn new(config: RunConfig) -> Result<Self, AppError> {
        let client = DomainClient::new(&config.client)?;
        Self::with_client(config, client)
    }
}

impl<F> App<F>
where
    F: BodyFetcher + 'static,
{
    pub fn with_client(config: RunConfig, client: DomainClient<F>) -> Result<Self, AppError> {
        let pool = WorkerPool::new(client, config.workers)?;
        Ok(Self { config, pool })
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Scans every domain read from `input` and writes the records to `out`.
    ///
    /// Returns once the input is exhausted and every record has been
    /// written, or once `cancel` fires and in-flight work has wound down.
    /// Both output arrays are closed either way.
    ///
    /// The first fatal pool error stops the reader, so no new domains are
    /// queued, but workers finish the domain they are on. It is returned
    /// after the writer has finished. Only `cancel` aborts in-flight probes.
    pub async fn run<R, W>(&self, input: R, out: W, cancel: CancellationToken) -> Result<RunSummary, AppError>
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: Write + Send + 'static,
    {
        let cancel = cancel.child_token();
        let stop_reading = cancel.child_token();
        let capacity = self.config.queue_capacity.max(1);
        let (domain_tx, domain_rx) = mpsc::channel(capacity);
        let (record_tx, record_rx) = mpsc::channel(capacity);
        let (fatal, mut fatal_rx) = fatal_channel();

        let writer = Writer::new(out, self.config.non_compliant_output.as_deref())?;
        let writer = tokio::spawn(writer.drain(record_rx));
        let reader = tokio::spawn(read_domains(input, domain_tx, stop_reading.clone()));

        info!(workers = self.pool.size(), "scan started");
        let pool = self.pool.run(domain_rx, record_tx, fatal, cancel.clone());
        tokio::pin!(pool);

        let (pool_stats, fatal_error) = tokio::select! {
            stats = &mut pool => (stats, fatal_rx.try_recv().ok()),
            Some(err) = fatal_rx.recv() => {
                // Closing the domain queue releases workers idling on it.
                warn!("fatal error, waiting for in-flight domains");
                stop_reading.cancel();
                (pool.await, Some(err))
            }
        };

        if fatal_error.is_some() {
            stop_reading.cancel();
        }
        let domains_read = reader.await?;
        let (writer_stats, _) = writer.await??;

        if let Some(err) = fatal_error {
            return Err(err.into());
        }

        let summary = RunSummary::new(domains_read, pool_stats, writer_stats);
        info!(
            domains = summary.domains_read,
            found = summary.records_found,
            compliant = summary.compliant,
            non_compliant = summary.non_compliant,
            "all done"
        );
        Ok(summary)
    }
}
