//! Batched sink writer: buffers documents and bulk-inserts them
//!
//! The adapter owns one writer per destination collection. It appends
//! documents, checks [`BatchWriter::is_full`], and calls
//! [`BatchWriter::flush`] at batch boundaries and once more at end of input.

use std::time::{Duration, Instant};

use indicatif::ProgressBar;

use crate::progress::fmt_num;
use crate::retry::{RetryPolicy, retry_with_backoff};
use crate::store::{DocumentStore, StoreError};
use crate::value::Document;

/// Per-collection statistics after the final flush
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkStats {
    pub collection: String,
    pub documents: usize,
    /// Flush checkpoints, including empty ones
    pub flushes: usize,
    pub elapsed: Duration,
}

/// Buffering bulk writer for one destination collection.
pub struct BatchWriter<'s, S: DocumentStore + ?Sized> {
    store: &'s S,
    collection: String,
    buffer: Vec<Document>,
    batch_size: usize,
    retry: RetryPolicy,
    progress: ProgressBar,
    announce: bool,
    written: usize,
    flushes: usize,
    started: Instant,
}

impl<S: DocumentStore + ?Sized> std::fmt::Debug for BatchWriter<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchWriter")
            .field("collection", &self.collection)
            .field("buffered", &self.buffer.len())
            .field("batch_size", &self.batch_size)
            .field("written", &self.written)
            .finish_non_exhaustive()
    }
}

impl<'s, S: DocumentStore + ?Sized> BatchWriter<'s, S> {
    pub fn new(store: &'s S, collection: impl Into<String>, batch_size: usize) -> Self {
        let batch_size = batch_size.max(1);
        Self {
            store,
            collection: collection.into(),
            buffer: Vec::with_capacity(batch_size.min(65_536)),
            batch_size,
            retry: RetryPolicy::default(),
            progress: ProgressBar::hidden(),
            announce: false,
            written: 0,
            flushes: 0,
            started: Instant::now(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Status line updated at every flush
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Log every flush at info level instead of debug (high-volume outputs)
    pub fn announce_flushes(mut self, announce: bool) -> Self {
        self.announce = announce;
        self
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn append(&mut self, doc: Document) {
        self.buffer.push(doc);
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.buffer.len() >= self.batch_size
    }

    /// Documents successfully written so far
    pub fn written(&self) -> usize {
        self.written
    }

    /// Bulk-insert everything buffered and clear the buffer.
    ///
    /// An empty buffer still counts as a checkpoint but makes no store call.
    /// Returns the number of documents written by this flush.
    pub fn flush(&mut self) -> Result<usize, StoreError> {
        let n = self.buffer.len();
        if n > 0 {
            let label = format!("{} flush #{}", self.collection, self.flushes + 1);
            let (store, collection, buffer) = (self.store, &self.collection, &self.buffer);
            // After a dropped connection part of the batch may be stored
            let mut resend = false;
            retry_with_backoff(&label, &self.retry, || {
                let result = if resend {
                    store.resume_insert(collection, buffer)
                } else {
                    store.insert_many(collection, buffer)
                };
                resend = true;
                result
            })?;
            self.buffer.clear();
        }
        self.written += n;
        self.flushes += 1;

        let elapsed = self.started.elapsed().as_secs_f64();
        self.progress
            .set_message(format!("{} documents", fmt_num(self.written)));
        if self.announce {
            log::info!(
                "{}: {} documents, {elapsed:.1}s elapsed",
                self.collection,
                fmt_num(self.written)
            );
        } else {
            log::debug!(
                "{}: {} documents, {elapsed:.1}s elapsed",
                self.collection,
                fmt_num(self.written)
            );
        }
        Ok(n)
    }

    /// Final flush of the remainder, then statistics
    pub fn finish(mut self) -> Result<SinkStats, StoreError> {
        self.flush()?;
        self.progress.finish_and_clear();
        Ok(SinkStats {
            collection: self.collection,
            documents: self.written,
            flushes: self.flushes,
            elapsed: self.started.elapsed(),
        })
    }
}
