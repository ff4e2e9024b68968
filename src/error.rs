//! Error types for the wikidata label import
//!
//! Each stage owns its own error enum; `ImportError` is what the
//! orchestrator hands back to the binary.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for an import run
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("No tables to scan: pass a tileset file or at least one explicit table")]
    NoTableSource,

    #[error("No tables with an hstore `tags` field were found in {}", .tileset.display())]
    NoTablesFound { tileset: PathBuf },

    #[error("Tileset error: {0}")]
    Tileset(#[from] TilesetError),

    #[error("Wikidata query failed: {0}")]
    Resolve(#[from] ResolveError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

/// Errors raised while loading tileset, layer and mapping files
#[derive(Error, Debug)]
pub enum TilesetError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", .path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Layer '{layer}' references missing mapping file {}", .path.display())]
    MissingMapping { layer: String, path: PathBuf },
}

/// Errors from the remote SPARQL endpoint
///
/// Every variant carries the query that failed so the operator can replay it.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Request to the query service failed: {source}\nquery={query}")]
    Transport {
        query: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Query service returned {status} {reason}: {body}\nquery={query}")]
    Status {
        status: u16,
        reason: String,
        body: String,
        query: String,
    },

    #[error("Unexpected response shape: {message}\nquery={query}")]
    Decode { query: String, message: String },
}

impl ResolveError {
    /// The SPARQL text that produced this error
    pub fn query(&self) -> &str {
        match self {
            Self::Transport { query, .. } | Self::Status { query, .. } | Self::Decode { query, .. } => {
                query
            }
        }
    }
}

/// Errors from the label store
#[derive(Error, Debug)]
pub enum StoreError {
    #[cfg(feature = "database")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid table name '{0}'")]
    InvalidTableName(String),
}
