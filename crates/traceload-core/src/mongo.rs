//! MongoDB backend (blocking driver API)

use mongodb::bson::{Bson, DateTime as BsonDateTime, Document as BsonDocument, doc};
use mongodb::error::{Error as MongoError, ErrorKind};
use mongodb::sync::{Client, Database};

use crate::store::{DocumentStore, StoreError};
use crate::value::{Document, Fields, TypedValue};

/// Error label the server attaches to writes that are safe to retry
const RETRYABLE_WRITE_LABEL: &str = "RetryableWriteError";

/// Server code for a duplicate key write error
const DUPLICATE_KEY: i32 = 11000;

/// Document store backed by one MongoDB database.
pub struct MongoStore {
    database: Database,
}

impl std::fmt::Debug for MongoStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MongoStore")
            .field("database", &self.database.name())
            .finish_non_exhaustive()
    }
}

impl MongoStore {
    /// Open a client for `uri` and select `database`.
    ///
    /// The driver connects lazily; an unreachable server surfaces on the
    /// first store call as a retryable [`StoreError::Connection`].
    pub fn connect(uri: &str, database: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(uri).map_err(map_error)?;
        Ok(Self {
            database: client.database(database),
        })
    }

    fn collection(&self, name: &str) -> mongodb::sync::Collection<BsonDocument> {
        self.database.collection::<BsonDocument>(name)
    }
}

impl DocumentStore for MongoStore {
    fn count(&self, collection: &str) -> Result<u64, StoreError> {
        self.collection(collection)
            .count_documents(doc! {})
            .run()
            .map_err(map_error)
    }

    fn insert_many(&self, collection: &str, docs: &[Document]) -> Result<(), StoreError> {
        if docs.is_empty() {
            return Ok(());
        }
        let bson_docs: Vec<BsonDocument> = docs.iter().map(to_bson_document).collect();
        self.collection(collection)
            .insert_many(bson_docs)
            .run()
            .map(|_| ())
            .map_err(map_error)
    }

    fn resume_insert(&self, collection: &str, docs: &[Document]) -> Result<(), StoreError> {
        if docs.is_empty() {
            return Ok(());
        }
        let bson_docs: Vec<BsonDocument> = docs.iter().map(to_bson_document).collect();
        // Unordered, so documents after an already stored `_id` still land
        match self
            .collection(collection)
            .insert_many(bson_docs)
            .ordered(false)
            .run()
        {
            Ok(_) => Ok(()),
            Err(e) if only_duplicate_keys(&e) => {
                log::debug!("{collection}: skipped documents stored before the retry");
                Ok(())
            }
            Err(e) => Err(map_error(e)),
        }
    }

    fn delete_all(&self, collection: &str) -> Result<u64, StoreError> {
        self.collection(collection)
            .delete_many(doc! {})
            .run()
            .map(|r| r.deleted_count)
            .map_err(map_error)
    }
}

fn map_error(e: MongoError) -> StoreError {
    let transient = matches!(
        *e.kind,
        ErrorKind::Io(_) | ErrorKind::ServerSelection { .. } | ErrorKind::ConnectionPoolCleared { .. }
    ) || e.contains_label(RETRYABLE_WRITE_LABEL);
    if transient {
        StoreError::Connection(e.to_string())
    } else {
        StoreError::Rejected(e.to_string())
    }
}

/// Whether every write error of a bulk insert is a duplicate `_id`.
///
/// Loads only write to empty or freshly named collections, so the only
/// unique index is `_id` and a duplicate is a document already written.
fn only_duplicate_keys(e: &MongoError) -> bool {
    match &*e.kind {
        ErrorKind::InsertMany(failure) => {
            failure.write_concern_error.is_none()
                && failure
                    .write_errors
                    .as_ref()
                    .is_some_and(|errors| errors.iter().all(|w| w.code == DUPLICATE_KEY))
        }
        _ => false,
    }
}

/// BSON form of a document; the sequential id becomes `_id`.
pub fn to_bson_document(doc: &Document) -> BsonDocument {
    let mut out = BsonDocument::new();
    out.insert("_id", Bson::Int64(doc.id as i64));
    append_fields(&mut out, &doc.fields);
    out
}

fn append_fields(out: &mut BsonDocument, fields: &Fields) {
    for (name, value) in fields {
        out.insert(name.clone(), to_bson(value));
    }
}

/// BSON datetimes are UTC milliseconds; naive timestamps are taken as UTC.
fn to_bson(value: &TypedValue) -> Bson {
    match value {
        TypedValue::Null => Bson::Null,
        TypedValue::Integer(n) => Bson::Int64(*n),
        TypedValue::Float(f) => Bson::Double(*f),
        TypedValue::Timestamp(ts) => Bson::DateTime(BsonDateTime::from_millis(ts.timestamp_millis())),
        TypedValue::LocalTimestamp(ts) => {
            Bson::DateTime(BsonDateTime::from_millis(ts.and_utc().timestamp_millis()))
        }
        TypedValue::String(s) => Bson::String(s.clone()),
        TypedValue::Map(fields) => {
            let mut nested = BsonDocument::new();
            append_fields(&mut nested, fields);
            Bson::Document(nested)
        }
        TypedValue::Array(items) => Bson::Array(items.iter().map(to_bson).collect()),
    }
}
