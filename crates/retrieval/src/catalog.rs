use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Enriched description of one database table, as produced by the upstream
/// documentation pipeline.
///
/// Only `table` is mandatory; the descriptive fields default to empty so
/// the pre-enrichment skeleton file is also valid input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableContext {
    pub table: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub column_descriptions: BTreeMap<String, String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub example_queries: Vec<String>,
    #[serde(default)]
    pub category: String,
}

impl TableContext {
    /// Canonical text rendition fed to the embedding provider.
    ///
    /// The same rendering must be used when building the embedding file and
    /// when reasoning about what a stored vector represents.
    #[must_use]
    pub fn embedding_text(&self) -> String {
        let mut text = format!("Table: {}\n", self.table);
        text.push_str(&format!("Description: {}\n", self.description));
        text.push_str(&format!("Category: {}\n", self.category));
        if !self.tags.is_empty() {
            text.push_str(&format!("Tags: {}\n", self.tags.join(", ")));
        }
        text.push_str("Columns and Descriptions:\n");
        for column in &self.columns {
            let description = self
                .column_descriptions
                .get(column)
                .map(String::as_str)
                .unwrap_or("");
            text.push_str(&format!("- {column}: {description}\n"));
        }
        text
    }
}

/// Lookup table from table name to its enriched context record.
///
/// Loaded once from the enriched-schema JSON file; selection only returns
/// table names, and the catalog supplies the richer records afterwards.
#[derive(Debug, Clone, Default)]
pub struct SchemaCatalog {
    tables: BTreeMap<String, TableContext>,
}

impl SchemaCatalog {
    /// Read and parse an enriched-schema file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("Loading schema catalog from {}", path.display());
        let bytes = std::fs::read(path)?;
        let catalog = Self::from_slice(&bytes)?;
        log::info!(
            "Loaded {} table contexts from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Parse a catalog from bytes already in memory.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let raw: Vec<TableContext> = serde_json::from_slice(bytes)?;
        let mut tables = BTreeMap::new();
        for context in raw {
            tables.insert(context.table.clone(), context);
        }
        Ok(Self { tables })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    #[must_use]
    pub fn get(&self, table: &str) -> Option<&TableContext> {
        self.tables.get(table)
    }

    /// Contexts for the requested tables, in request order.
    ///
    /// Names with no catalog entry are skipped with a warning.
    pub fn fetch<S: AsRef<str>>(&self, names: &[S]) -> Vec<&TableContext> {
        names
            .iter()
            .filter_map(|name| {
                let name = name.as_ref();
                let context = self.tables.get(name);
                if context.is_none() {
                    log::warn!("Table '{name}' has no catalog entry");
                }
                context
            })
            .collect()
    }

    /// All contexts in ascending table-name order.
    pub fn tables(&self) -> impl Iterator<Item = &TableContext> {
        self.tables.values()
    }
}
