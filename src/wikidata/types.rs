//! Wikidata identifier and label types

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

/// `Q` followed by 1-19 digits, no leading zero
static QID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^Q[1-9][0-9]{0,18}$").unwrap());

/// Prefix of entity URIs returned by the query service
pub const ENTITY_URI_PREFIX: &str = "http://www.wikidata.org/entity/";

/// Numeric Wikidata entity id (`Q42` -> 42)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(i64);

impl EntityId {
    pub fn new(id: i64) -> Option<Self> {
        (id > 0).then_some(Self(id))
    }

    /// Parse a `Q<digits>` tag value.
    ///
    /// Returns `None` for anything malformed, including values whose digits
    /// do not fit in an `i64`. Callers drop those rather than fail.
    pub fn parse(value: &str) -> Option<Self> {
        if !QID_RE.is_match(value) {
            return None;
        }
        value[1..].parse::<i64>().ok().map(Self)
    }

    /// Parse a full entity URI (`http://www.wikidata.org/entity/Q42`)
    pub fn from_uri(uri: &str) -> Option<Self> {
        uri.strip_prefix(ENTITY_URI_PREFIX).and_then(Self::parse)
    }

    pub fn value(self) -> i64 {
        self.0
    }

    /// Prefixed form used inside SPARQL VALUES lists
    pub fn prefixed(self) -> String {
        format!("wd:Q{}", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{}", self.0)
    }
}

/// Language-keyed labels for one entity (`name:en` -> "Douglas Adams")
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelRecord {
    labels: BTreeMap<String, String>,
}

impl LabelRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a label for `lang`. A repeated language overwrites the earlier value.
    pub fn insert(&mut self, lang: &str, label: impl Into<String>) {
        self.labels.insert(format!("name:{}", lang), label.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.labels.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Labels resolved for one batch, ordered by id
pub type LabelBatch = BTreeMap<EntityId, LabelRecord>;

/// SPARQL JSON results document (`application/sparql-results+json`)
#[derive(Debug, Clone, Deserialize)]
pub struct SparqlResponse {
    pub results: SparqlResults,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SparqlResults {
    pub bindings: Vec<LabelBinding>,
}

/// One `?id ?label` solution
#[derive(Debug, Clone, Deserialize)]
pub struct LabelBinding {
    pub id: UriTerm,
    pub label: LiteralTerm,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UriTerm {
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LiteralTerm {
    pub value: String,
    #[serde(rename = "xml:lang")]
    pub lang: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_canonical_ids() {
        assert_eq!(EntityId::parse("Q42").map(EntityId::value), Some(42));
        assert_eq!(EntityId::parse("Q1").map(EntityId::value), Some(1));
        assert_eq!(
            EntityId::parse("Q9223372036854775807").map(EntityId::value),
            Some(i64::MAX)
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in [
            "",
            "Q",
            "Q0",
            "Q01",
            "QABC",
            "q42",
            "42",
            " Q42",
            "Q42 ",
            "Q7786526-garbage",
            "Q42;Q43",
            // 20 digits
            "Q12345678901234567890",
        ] {
            assert_eq!(EntityId::parse(bad), None, "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_parse_rejects_i64_overflow() {
        // 19 digits, matches the pattern but exceeds i64::MAX
        assert_eq!(EntityId::parse("Q9223372036854775808"), None);
        assert_eq!(EntityId::parse("Q9999999999999999999"), None);
    }

    #[test]
    fn test_from_uri() {
        assert_eq!(
            EntityId::from_uri("http://www.wikidata.org/entity/Q64"),
            EntityId::new(64)
        );
        assert_eq!(EntityId::from_uri("https://www.wikidata.org/entity/Q64"), None);
        assert_eq!(EntityId::from_uri("http://www.wikidata.org/entity/P31"), None);
    }

    #[test]
    fn test_display_and_prefixed() {
        let id = EntityId::new(7786526).unwrap();
        assert_eq!(id.to_string(), "Q7786526");
        assert_eq!(id.prefixed(), "wd:Q7786526");
        assert_eq!(EntityId::new(0), None);
    }

    #[test]
    fn test_label_record_last_write_wins() {
        let mut record = LabelRecord::new();
        record.insert("en", "Berlin");
        record.insert("de", "Berlin");
        record.insert("en", "City of Berlin");

        assert_eq!(record.len(), 2);
        assert_eq!(record.get("name:en"), Some("City of Berlin"));
        assert_eq!(record.get("name:de"), Some("Berlin"));
        assert_eq!(record.get("en"), None);
    }
}
