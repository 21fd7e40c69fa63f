//! Destination resolution: never append into a populated collection
//!
//! - empty requested collection → use it as-is
//! - populated, no reset → write into a fresh `trace-<uuid>` collection
//! - reset → delete everything in the requested collection, then use it

use uuid::Uuid;

use crate::retry::{RetryPolicy, retry_with_backoff};
use crate::store::{DocumentStore, StoreError};

/// Fresh names are re-drawn this many times if one is somehow taken
const MAX_FRESH_ATTEMPTS: usize = 8;

/// Physical collection chosen for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    /// Collection name the caller asked for
    pub requested: String,
    /// Collection the run actually writes into
    pub collection: String,
    /// Documents deleted by a reset
    pub cleared: u64,
}

impl Destination {
    pub fn is_renamed(&self) -> bool {
        self.requested != self.collection
    }
}

/// Collision-resistant collection name
pub fn fresh_collection_name() -> String {
    format!("trace-{}", Uuid::new_v4().simple())
}

/// Decide which physical collection a run writes into.
pub fn resolve<S: DocumentStore + ?Sized>(
    store: &S,
    requested: &str,
    reset: bool,
    retry: &RetryPolicy,
) -> Result<Destination, StoreError> {
    if reset {
        let cleared = retry_with_backoff(requested, retry, || store.delete_all(requested))?;
        log::info!("Dropped {cleared} documents from {requested}");
        return Ok(Destination {
            requested: requested.to_string(),
            collection: requested.to_string(),
            cleared,
        });
    }

    let existing = retry_with_backoff(requested, retry, || store.count(requested))?;
    if existing == 0 {
        return Ok(Destination {
            requested: requested.to_string(),
            collection: requested.to_string(),
            cleared: 0,
        });
    }

    for _ in 0..MAX_FRESH_ATTEMPTS {
        let candidate = fresh_collection_name();
        if retry_with_backoff(&candidate, retry, || store.count(&candidate))? == 0 {
            log::warn!(
                "{requested} already holds {existing} documents, writing to {candidate} instead"
            );
            return Ok(Destination {
                requested: requested.to_string(),
                collection: candidate,
                cleared: 0,
            });
        }
    }
    Err(StoreError::Rejected(format!(
        "no unused collection name found for {requested}"
    )))
}
