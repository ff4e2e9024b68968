//! Wikidata label resolution
//!
//! This module provides:
//! - Entity id and label record types
//! - SPARQL query building, batching and result decoding
//! - Client for the Wikidata query service

pub mod client;
pub mod query;
pub mod types;

pub use client::{LabelSource, WikidataClient};
pub use query::{batches, build_label_query, decode_labels, BATCH_SIZE};
pub use types::*;
