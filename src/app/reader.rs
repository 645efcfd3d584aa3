// src/app/reader.rs

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

/// Reads newline-delimited domains from `input` into `domains`.
///
/// Lines are trimmed and blank lines skipped. The queue is closed by
/// dropping `domains` when the input ends, the reader is cancelled, or the
/// pool has gone away.
///
/// # Returns
/// The number of domains queued.
pub async fn read_domains<R>(input: R, domains: mpsc::Sender<String>, cancel: CancellationToken) -> usize
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(input).lines();
    let mut count = 0;

    loop {
        let line = tokio::select! {
            _ = cancel.cancelled() => {
                debug!(count, "input reader cancelled");
                break;
            }
            line = lines.next_line() => line,
        };

        let domain = match line {
            Ok(Some(line)) => line.trim().to_string(),
            Ok(None) => break,
            Err(e) => {
                error!(error = %e, "error reading input");
                break;
            }
        };
        if domain.is_empty() {
            continue;
        }

        if domains.send(domain).await.is_err() {
            debug!(count, "domain queue closed, stopping input reader");
            break;
        }
        count += 1;
    }

    debug!(count, "input exhausted");
    count
}
