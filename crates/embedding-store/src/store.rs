use crate::embedding::Embedding;
use crate::error::{Result, StoreError};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

/// One persisted record: a table name plus its embedding vector.
///
/// Embedding files may carry additional descriptive fields (tags, category,
/// column lists); only these two participate in selection and the rest are
/// ignored on load.
#[derive(Debug, Deserialize)]
struct PersistedRecord {
    table: String,
    embedding: Vec<f32>,
}

/// Immutable mapping from table name to embedding, with one fixed
/// dimensionality across all records.
///
/// A store is built once per retrieval session from a persisted embedding
/// file and never mutated afterwards, so sharing it across threads needs no
/// synchronization. Records iterate in ascending name order.
#[derive(Debug, Clone, Default)]
pub struct EmbeddingStore {
    records: BTreeMap<String, Embedding>,
}

impl EmbeddingStore {
    /// Read and parse an embedding file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("Loading embedding store from {}", path.display());
        let bytes = std::fs::read(path)?;
        let store = Self::from_slice(&bytes)?;
        log::info!(
            "Loaded {} embeddings from {}",
            store.len(),
            path.display()
        );
        Ok(store)
    }

    /// Parse an embedding store from any byte source.
    pub fn from_reader(mut reader: impl Read) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::from_slice(&bytes)
    }

    /// Parse an embedding store from bytes already in memory.
    ///
    /// Every record must carry a non-empty vector, and all vectors must
    /// agree on dimensionality. When the same table name appears more than
    /// once, the later record wins.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let raw: Vec<PersistedRecord> = serde_json::from_slice(bytes)?;

        let mut records = BTreeMap::new();
        let mut dimension: Option<usize> = None;
        for (position, record) in raw.into_iter().enumerate() {
            if record.embedding.is_empty() {
                return Err(StoreError::MalformedRecord {
                    position,
                    identifier: record.table,
                    reason: "embedding vector is empty".to_string(),
                });
            }
            match dimension {
                None => dimension = Some(record.embedding.len()),
                Some(expected) if record.embedding.len() != expected => {
                    return Err(StoreError::MalformedRecord {
                        position,
                        identifier: record.table,
                        reason: format!(
                            "dimension {} disagrees with {expected} used by earlier records",
                            record.embedding.len()
                        ),
                    });
                }
                Some(_) => {}
            }
            if records
                .insert(record.table.clone(), Embedding::new(record.embedding))
                .is_some()
            {
                log::warn!("Duplicate table '{}', keeping the later record", record.table);
            }
        }

        Ok(Self { records })
    }

    /// Number of records in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Shared dimensionality of all records, or `None` for an empty store.
    #[must_use]
    pub fn dimension(&self) -> Option<usize> {
        self.records.values().next().map(Embedding::dimension)
    }

    #[must_use]
    pub fn get(&self, table: &str) -> Option<&Embedding> {
        self.records.get(table)
    }

    /// Table names in ascending order.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    /// All records in ascending name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Embedding)> {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn store_json() -> &'static str {
        r#"[
            {"table": "students", "embedding": [1.0, 0.0]},
            {"table": "grades", "embedding": [0.0, 1.0]}
        ]"#
    }

    #[test]
    fn loads_records_keyed_by_table() {
        let store = EmbeddingStore::from_slice(store_json().as_bytes()).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.dimension(), Some(2));
        assert_eq!(
            store.get("students").map(Embedding::as_slice),
            Some(&[1.0, 0.0][..])
        );
        assert!(store.get("missing").is_none());
    }

    #[test]
    fn iteration_is_in_ascending_name_order() {
        let store = EmbeddingStore::from_slice(store_json().as_bytes()).unwrap();
        let names: Vec<&str> = store.identifiers().collect();
        assert_eq!(names, vec!["grades", "students"]);
    }

    #[test]
    fn extra_descriptive_fields_are_ignored() {
        let json = r#"[
            {"table": "a", "embedding": [1.0], "tags": ["x"], "category": "ops"}
        ]"#;
        let store = EmbeddingStore::from_slice(json.as_bytes()).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn rejects_unparseable_source() {
        let err = EmbeddingStore::from_slice(b"{not json").unwrap_err();
        assert!(matches!(err, StoreError::Malformed(_)));
    }

    #[test]
    fn rejects_record_missing_a_field() {
        let json = r#"[{"table": "a"}]"#;
        let err = EmbeddingStore::from_slice(json.as_bytes()).unwrap_err();
        assert!(matches!(err, StoreError::Malformed(_)));
    }

    #[test]
    fn rejects_empty_vector() {
        let json = r#"[{"table": "a", "embedding": []}]"#;
        let err = EmbeddingStore::from_slice(json.as_bytes()).unwrap_err();
        match err {
            StoreError::MalformedRecord {
                position,
                identifier,
                ..
            } => {
                assert_eq!(position, 0);
                assert_eq!(identifier, "a");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_inconsistent_dimensions() {
        let json = r#"[
            {"table": "a", "embedding": [1.0, 0.0]},
            {"table": "b", "embedding": [1.0]}
        ]"#;
        let err = EmbeddingStore::from_slice(json.as_bytes()).unwrap_err();
        match err {
            StoreError::MalformedRecord {
                position,
                identifier,
                reason,
            } => {
                assert_eq!(position, 1);
                assert_eq!(identifier, "b");
                assert!(reason.contains("dimension 1"), "reason: {reason}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn duplicate_table_keeps_the_later_record() {
        let json = r#"[
            {"table": "a", "embedding": [1.0, 0.0]},
            {"table": "a", "embedding": [0.0, 1.0]}
        ]"#;
        let store = EmbeddingStore::from_slice(json.as_bytes()).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(
            store.get("a").map(Embedding::as_slice),
            Some(&[0.0, 1.0][..])
        );
    }

    #[test]
    fn empty_file_yields_empty_store() {
        let store = EmbeddingStore::from_slice(b"[]").unwrap();
        assert!(store.is_empty());
        assert_eq!(store.dimension(), None);
    }

    #[test]
    fn load_reads_from_disk() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("embeddings.json");
        std::fs::write(&path, store_json()).unwrap();

        let store = EmbeddingStore::load(&path).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn from_reader_matches_from_slice() {
        let store = EmbeddingStore::from_reader(store_json().as_bytes()).unwrap();
        assert_eq!(store.len(), 2);
    }
}
