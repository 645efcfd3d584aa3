// src/app/writer.rs

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::app::disclosure::Disclosure;
use crate::core::models::Record;

/// Counts of what went through the writer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WriterStats {
    pub written: usize,
    pub compliant: usize,
    pub non_compliant: usize,
}

/// A JSON array written one element at a time.
#[derive(Debug)]
struct JsonArray<W: Write> {
    out: W,
    len: usize,
}

impl<W: Write> JsonArray<W> {
    fn open(mut out: W) -> io::Result<Self> {
        out.write_all(b"[\n")?;
        Ok(Self { out, len: 0 })
    }

    fn push(&mut self, element: &str) -> io::Result<()> {
        if self.len > 0 {
            self.out.write_all(b",\n")?;
        }
        write!(self.out, "  {element}")?;
        self.len += 1;
        self.out.flush()
    }

    fn close(mut self) -> io::Result<W> {
        self.out.write_all(b"\n]\n")?;
        self.out.flush()?;
        Ok(self.out)
    }
}

/// Renders records as a streaming JSON array, optionally mirroring the
/// non-compliant ones into a second array on disk.
#[derive(Debug)]
pub struct Writer<W: Write> {
    out: JsonArray<W>,
    non_compliant: Option<JsonArray<BufWriter<File>>>,
    stats: WriterStats,
}

impl<W: Write> Writer<W> {
    /// Opens the output array on `out`, and creates the file at
    /// `non_compliant_path` when one is given.
    pub fn new(out: W, non_compliant_path: Option<&Path>) -> io::Result<Self> {
        let non_compliant = match non_compliant_path {
            Some(path) => Some(JsonArray::open(BufWriter::new(File::create(path)?))?),
            None => None,
        };

        Ok(Self { out: JsonArray::open(out)?, non_compliant, stats: WriterStats::default() })
    }

    pub fn write_record(&mut self, record: &Record) -> io::Result<()> {
        let domain = record.domain();
        info!(domain, url = %record.retrieved_from(), "security.txt found");
        for err in record.errors() {
            info!(domain, error = %err, "security.txt error");
        }

        let disclosure = Disclosure::from_record(record, Utc::now());
        let json = indent(&serde_json::to_string_pretty(&disclosure)?);
        self.out.push(&json)?;
        self.stats.written += 1;

        if record.is_rfc_compliant() {
            self.stats.compliant += 1;
            return Ok(());
        }

        self.stats.non_compliant += 1;
        info!(domain, issues = record.compliance_issues().len(), "security.txt is not RFC 9116 compliant");
        if let Some(file) = self.non_compliant.as_mut() {
            if let Err(e) = file.push(&json) {
                warn!(domain, error = %e, "error writing to non-compliant output file");
            }
        }
        Ok(())
    }

    /// Closes both arrays.
    ///
    /// # Returns
    /// The stats and the primary output, so callers can inspect what was written.
    pub fn finish(self) -> io::Result<(WriterStats, W)> {
        if let Some(Err(e)) = self.non_compliant.map(JsonArray::close) {
            warn!(error = %e, "error finalizing non-compliant output file");
        }
        let out = self.out.close()?;
        Ok((self.stats, out))
    }

    /// Writes every record received on `records` until the queue closes.
    pub async fn drain(mut self, mut records: mpsc::Receiver<Record>) -> io::Result<(WriterStats, W)> {
        while let Some(record) = records.recv().await {
            self.write_record(&record)?;
        }
        self.finish()
    }
}

/// Shifts every line after the first by two spaces so a pretty-printed
/// object nests inside the array.
fn indent(json: &str) -> String {
    json.replace('\n', "\n  ")
}
