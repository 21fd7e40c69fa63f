//! Traceload Core - Common infrastructure for trace ingestion
//!
//! This crate provides the pieces every format adapter shares: value
//! coercion and field classification, the typed document model, the
//! document store capability, batched sink writing and destination
//! resolution.

pub mod classify;
pub mod coerce;
pub mod destination;
pub mod logging;
pub mod mongo;
pub mod output;
pub mod progress;
pub mod retry;
pub mod sink;
pub mod store;
pub mod value;
pub mod xml;

// Re-exports for convenience
pub use classify::{DeclaredType, FieldCoercer, FieldOverrides, FieldTable, TraceFormat};
pub use coerce::{CoerceError, Coercer, TimestampFormat};
pub use destination::{Destination, resolve};
pub use logging::{IndicatifLogger, init_logging};
pub use mongo::MongoStore;
pub use output::{CollectionSummary, LoadSummary, OutputSpec, RunOptions};
pub use progress::{ProgressContext, SharedProgress, fmt_num};
pub use retry::{RetryPolicy, retry_with_backoff};
pub use sink::{BatchWriter, SinkStats};
pub use store::{DocumentStore, MemoryStore, StoreError};
pub use value::{Document, Fields, IdSequence, TypedValue};
