//! Document store capability: count, bulk insert, delete
//!
//! The loader only ever needs these three operations. [`MemoryStore`] backs
//! tests and dry runs; [`crate::mongo::MongoStore`] is the real destination.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use rustc_hash::FxHashSet;

use crate::value::Document;

/// Error from a document store call.
#[derive(Debug)]
pub enum StoreError {
    /// Store unreachable or connection dropped; worth retrying
    Connection(String),
    /// Store answered and refused the operation
    Rejected(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connection(msg) => write!(f, "store connection: {msg}"),
            Self::Rejected(msg) => write!(f, "store rejected write: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl StoreError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}

/// Minimal capability the loader needs from a document database.
///
/// Methods take `&self` so several sink writers can share one connection.
pub trait DocumentStore {
    /// Number of documents currently in `collection`
    fn count(&self, collection: &str) -> Result<u64, StoreError>;

    /// Insert `docs` into `collection` as one bulk write
    fn insert_many(&self, collection: &str, docs: &[Document]) -> Result<(), StoreError>;

    /// Re-send a batch whose `insert_many` failed with a connection error.
    ///
    /// Part of the batch may already be stored; documents whose `_id`
    /// exists are skipped instead of rejected.
    fn resume_insert(&self, collection: &str, docs: &[Document]) -> Result<(), StoreError>;

    /// Delete every document in `collection`, returning how many were removed
    fn delete_all(&self, collection: &str) -> Result<u64, StoreError>;
}

/// In-process store used by tests and `--dry-run`.
///
/// Loads run on one thread, so interior state lives in `RefCell`s.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RefCell<BTreeMap<String, Vec<Document>>>,
    ids: RefCell<BTreeMap<String, FxHashSet<u64>>>,
    inserts: RefCell<BTreeMap<String, Vec<usize>>>,
    failures: Cell<u32>,
    partial: Cell<Option<usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` inserts fail with a retryable connection error
    pub fn fail_next_inserts(&self, n: u32) {
        self.failures.set(n);
    }

    /// Make the next insert store only its first `n` documents, then fail
    /// with a retryable connection error
    pub fn fail_next_insert_after(&self, n: usize) {
        self.partial.set(Some(n));
    }

    /// Seed `collection` with pre-existing documents
    pub fn seed(&self, collection: &str, docs: Vec<Document>) {
        self.ids
            .borrow_mut()
            .entry(collection.to_string())
            .or_default()
            .extend(docs.iter().map(|d| d.id));
        self.collections
            .borrow_mut()
            .entry(collection.to_string())
            .or_default()
            .extend(docs);
    }

    /// Snapshot of the documents in `collection`
    pub fn documents(&self, collection: &str) -> Vec<Document> {
        self.collections
            .borrow()
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    /// Sizes of every successful bulk insert into `collection`, in order
    pub fn insert_sizes(&self, collection: &str) -> Vec<usize> {
        self.inserts
            .borrow()
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    /// Names of all collections holding at least one document
    pub fn collection_names(&self) -> Vec<String> {
        self.collections
            .borrow()
            .iter()
            .filter(|(_, docs)| !docs.is_empty())
            .map(|(name, _)| name.clone())
            .collect()
    }
}

impl MemoryStore {
    fn injected_failure(&self) -> Result<(), StoreError> {
        let pending = self.failures.get();
        if pending > 0 {
            self.failures.set(pending - 1);
            return Err(StoreError::Connection("injected failure".to_string()));
        }
        Ok(())
    }

    /// Ids of `docs` already present in `collection`
    fn stored_ids(&self, collection: &str, docs: &[Document]) -> Vec<u64> {
        let ids = self.ids.borrow();
        let Some(known) = ids.get(collection) else {
            return Vec::new();
        };
        docs.iter()
            .map(|d| d.id)
            .filter(|id| known.contains(id))
            .collect()
    }

    fn store(&self, collection: &str, docs: &[Document]) {
        self.ids
            .borrow_mut()
            .entry(collection.to_string())
            .or_default()
            .extend(docs.iter().map(|d| d.id));
        self.collections
            .borrow_mut()
            .entry(collection.to_string())
            .or_default()
            .extend_from_slice(docs);
        self.inserts
            .borrow_mut()
            .entry(collection.to_string())
            .or_default()
            .push(docs.len());
    }
}

impl DocumentStore for MemoryStore {
    fn count(&self, collection: &str) -> Result<u64, StoreError> {
        Ok(self
            .collections
            .borrow()
            .get(collection)
            .map_or(0, |docs| docs.len() as u64))
    }

    fn insert_many(&self, collection: &str, docs: &[Document]) -> Result<(), StoreError> {
        self.injected_failure()?;
        if let Some(dup) = self.stored_ids(collection, docs).first() {
            return Err(StoreError::Rejected(format!(
                "duplicate key _id {dup} in {collection}"
            )));
        }
        if let Some(n) = self.partial.take() {
            self.store(collection, &docs[..n.min(docs.len())]);
            return Err(StoreError::Connection(format!(
                "injected failure after {n} documents"
            )));
        }
        self.store(collection, docs);
        Ok(())
    }

    fn resume_insert(&self, collection: &str, docs: &[Document]) -> Result<(), StoreError> {
        self.injected_failure()?;
        let stored: FxHashSet<u64> = self.stored_ids(collection, docs).into_iter().collect();
        let remaining: Vec<Document> = docs
            .iter()
            .filter(|d| !stored.contains(&d.id))
            .cloned()
            .collect();
        self.store(collection, &remaining);
        Ok(())
    }

    fn delete_all(&self, collection: &str) -> Result<u64, StoreError> {
        self.ids.borrow_mut().remove(collection);
        Ok(self
            .collections
            .borrow_mut()
            .remove(collection)
            .map_or(0, |docs| docs.len() as u64))
    }
}
