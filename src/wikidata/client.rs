//! Wikidata query service client
//!
//! Posts one SPARQL query per batch and decodes the JSON results.
//! There is no retry: a failed batch fails the run.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Client;

use super::query::{build_label_query, decode_labels};
use super::types::{EntityId, LabelBatch};
use crate::config::ResolverConfig;
use crate::error::ResolveError;

const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

/// Characters of an error body kept in logs and errors
const ERROR_BODY_LIMIT: usize = 500;

/// Source of labels for a batch of entities
#[async_trait]
pub trait LabelSource: Send + Sync {
    /// Resolve labels for `ids`. Ids without labels are absent from the result.
    async fn fetch_labels(&self, ids: &[EntityId]) -> Result<LabelBatch, ResolveError>;
}

pub struct WikidataClient {
    http: Client,
    endpoint: url::Url,
}

impl WikidataClient {
    pub fn new(config: &ResolverConfig) -> reqwest::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(SPARQL_RESULTS_JSON));

        let http = Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &url::Url {
        &self.endpoint
    }

    async fn post_query(&self, query: &str) -> Result<String, ResolveError> {
        let transport = |source: reqwest::Error| ResolveError::Transport {
            query: query.to_string(),
            source,
        };

        // The response is dropped at the end of this scope on every path,
        // which hands the connection back to the pool.
        let response = self
            .http
            .post(self.endpoint.clone())
            .form(&[("query", query)])
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            let body: String = response
                .text()
                .await
                .unwrap_or_default()
                .chars()
                .take(ERROR_BODY_LIMIT)
                .collect();
            let reason = status.canonical_reason().unwrap_or("Unknown").to_string();
            tracing::error!(
                status = status.as_u16(),
                reason = %reason,
                body = %body,
                query = %query,
                "Wikidata query failed"
            );
            return Err(ResolveError::Status {
                status: status.as_u16(),
                reason,
                body,
                query: query.to_string(),
            });
        }

        response.text().await.map_err(transport)
    }
}

#[async_trait]
impl LabelSource for WikidataClient {
    async fn fetch_labels(&self, ids: &[EntityId]) -> Result<LabelBatch, ResolveError> {
        let query = build_label_query(ids);
        tracing::debug!(ids = ids.len(), query = %query, "Querying Wikidata");

        let body = self.post_query(&query).await?;
        decode_labels(&body, &query).inspect_err(|e| {
            tracing::error!(error = %e, "Failed to decode Wikidata response");
        })
    }
}
