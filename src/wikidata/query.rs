//! SPARQL query construction and result decoding

use super::types::{EntityId, LabelBatch, SparqlResponse};
use crate::error::ResolveError;

/// Ids per SPARQL request
pub const BATCH_SIZE: usize = 5000;

/// Split sorted ids into consecutive request batches, preserving order
pub fn batches(ids: &[EntityId]) -> std::slice::Chunks<'_, EntityId> {
    ids.chunks(BATCH_SIZE)
}

/// Query asking for every `rdfs:label` of the given entities
pub fn build_label_query(ids: &[EntityId]) -> String {
    let values = ids
        .iter()
        .map(|id| id.prefixed())
        .collect::<Vec<_>>()
        .join(" ");
    format!(
        "SELECT ?id ?label WHERE {{ VALUES ?id {{ {} }} ?id rdfs:label ?label. }}",
        values
    )
}

/// Decode a SPARQL JSON body into per-entity label records.
///
/// Any binding that does not carry an entity URI plus a language-tagged
/// literal fails the whole batch.
pub fn decode_labels(body: &str, query: &str) -> Result<LabelBatch, ResolveError> {
    let response: SparqlResponse =
        serde_json::from_str(body).map_err(|e| ResolveError::Decode {
            query: query.to_string(),
            message: e.to_string(),
        })?;

    let mut labels = LabelBatch::new();
    for binding in response.results.bindings {
        let id = EntityId::from_uri(&binding.id.value).ok_or_else(|| ResolveError::Decode {
            query: query.to_string(),
            message: format!("not a wikidata entity uri: {}", binding.id.value),
        })?;
        labels
            .entry(id)
            .or_default()
            .insert(&binding.label.lang, binding.label.value);
    }

    Ok(labels)
}
