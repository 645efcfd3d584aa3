// src/core/scanner/mod.rs

// Retrieval side of the pipeline: probing candidate URLs for one domain,
// and fanning many domains out over a fixed set of workers.
pub mod domain_client;
pub mod http;
pub mod worker_pool;

pub use domain_client::{DomainBody, DomainClient, candidate_urls, strip_domain};
pub use http::{BodyFetcher, FetchedBody, HttpFetcher};
pub use worker_pool::{FatalSignal, PoolStats, WorkerPool, fatal_channel};
