//! Bounded fetch-then-write fan-out
//!
//! One concurrent task per configured resource: the task lists the resource's
//! keys through a [`KeySource`], then stores each mapped key through a
//! [`SecretSink`]. Tasks within a batch run concurrently up to a bound, the
//! batch is joined before the caller moves on, and per-task errors are
//! collected into a [`RunReport`] instead of aborting siblings.

use crate::{Error, Result, SecretWrite};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};

/// Default bound on concurrent fetch+write tasks within a batch.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Trait for listing the keys of one resource kind.
///
/// Implementors provide the resource entry type (parsed from that kind's
/// manifest) and a [`collect`](KeySource::collect) operation that performs a
/// single external "list keys" call and maps the returned key fields to the
/// configured destination names.
#[async_trait]
pub trait KeySource: Send + Sync {
    /// Manifest entry type for this resource kind.
    type Entry: Send + Sync;

    /// Human-readable resource kind, used in logs and error messages.
    /// Examples: `"function app"`, `"cosmos account"`.
    fn kind(&self) -> &'static str;

    /// The resource name of an entry, used to label failures.
    fn resource(entry: &Self::Entry) -> &str;

    /// List the entry's keys and map them to pending secret writes.
    async fn collect(&self, entry: &Self::Entry) -> Result<Vec<SecretWrite>>;
}

/// Trait for storing secrets in a vault.
#[async_trait]
pub trait SecretSink: Send + Sync {
    /// Upsert a single named secret.
    async fn put(&self, write: &SecretWrite) -> Result<()>;
}

/// A single recorded propagation failure.
#[derive(Debug)]
pub struct Failure {
    /// The resource (or secret name, for inline writes) that failed
    pub resource: String,
    /// The error that occurred
    pub error: Error,
}

/// Outcome of one or more propagation batches.
///
/// Failures are isolated per task and collected here; the caller decides the
/// process exit code from [`is_clean`](RunReport::is_clean).
#[derive(Debug, Default)]
pub struct RunReport {
    written: Vec<String>,
    failures: Vec<Failure>,
}

impl RunReport {
    /// Create an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed secret write.
    pub fn record_write(&mut self, name: String) {
        self.written.push(name);
    }

    /// Record a failed fetch or write.
    pub fn record_failure(&mut self, resource: impl Into<String>, error: Error) {
        self.failures.push(Failure {
            resource: resource.into(),
            error,
        });
    }

    /// Names of the secrets written so far.
    #[must_use]
    pub fn written(&self) -> &[String] {
        &self.written
    }

    /// Failures recorded so far.
    #[must_use]
    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }

    /// Whether the run completed without any failure.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Fold another report into this one.
    pub fn merge(&mut self, other: Self) {
        self.written.extend(other.written);
        self.failures.extend(other.failures);
    }
}

/// Fan out fetch+write tasks for a batch of entries of one resource kind.
///
/// At most `limit` entries are in flight at a time (a limit of 0 is treated
/// as 1). The returned report contains every write and every failure; a
/// failing entry never prevents its siblings from completing.
pub async fn propagate<K, S>(source: &K, sink: &S, entries: &[K::Entry], limit: usize) -> RunReport
where
    K: KeySource,
    S: SecretSink,
{
    let kind = source.kind();
    tracing::debug!(kind, entries = entries.len(), "starting batch");

    let reports: Vec<RunReport> = stream::iter(entries.iter())
        .map(|entry| async move {
            let resource = K::resource(entry);
            let mut report = RunReport::new();
            match source.collect(entry).await {
                Ok(writes) => {
                    for write in &writes {
                        match sink.put(write).await {
                            Ok(()) => {
                                tracing::info!(kind, resource, secret = %write.name, "stored secret");
                                report.record_write(write.name.clone());
                            }
                            Err(error) => report.record_failure(resource, error),
                        }
                    }
                }
                Err(error) => report.record_failure(resource, error),
            }
            report
        })
        .buffer_unordered(limit.max(1))
        .collect()
        .await;

    merge_all(reports)
}

/// Store a batch of already-materialized writes, such as inline
/// `name:=value` secrets, with the same bounded concurrency and error
/// isolation as [`propagate`].
pub async fn push_all<S: SecretSink>(sink: &S, writes: &[SecretWrite], limit: usize) -> RunReport {
    let reports: Vec<RunReport> = stream::iter(writes.iter())
        .map(|write| async move {
            let mut report = RunReport::new();
            match sink.put(write).await {
                Ok(()) => {
                    tracing::info!(secret = %write.name, "stored secret");
                    report.record_write(write.name.clone());
                }
                Err(error) => report.record_failure(write.name.clone(), error),
            }
            report
        })
        .buffer_unordered(limit.max(1))
        .collect()
        .await;

    merge_all(reports)
}

fn merge_all(reports: Vec<RunReport>) -> RunReport {
    reports.into_iter().fold(RunReport::new(), |mut acc, r| {
        acc.merge(r);
        acc
    })
}
