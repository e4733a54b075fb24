//! 🔌 Backends — where the real I/O happens.
//!
//! 🚰 The file backend pours records in from disk. The OpenSearch backend
//! slurps them up over HTTP. And in between, we panic! (kidding, we use anyhow)
//!
//! 🦆 The duck is here because every file must have one. This is law. Do not question the duck.

pub mod file;
pub mod opensearch;

// 🎯 Re-exports so callers can do `backends::OpenSearchClient`
// instead of spelunking into `backends::opensearch::OpenSearchClient`.
pub use file::load_records;
pub use opensearch::{ItemError, OpenSearchClient, OpenSearchConfig, UploadOutcome};
