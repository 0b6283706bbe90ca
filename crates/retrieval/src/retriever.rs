use crate::catalog::SchemaCatalog;
use crate::error::{Result, RetrievalError};
use crate::prompt::build_sql_prompt;
use crate::provider::EmbeddingProvider;
use insight_embedding_store::{EmbeddingStore, ScoredMatch};

/// Default number of tables pulled into a generated prompt.
pub const DEFAULT_TOP_K: usize = 3;

/// One retrieval session over a loaded store and catalog.
///
/// The caller loads both files once, then issues any number of queries
/// against the same session; neither file is re-read per call.
pub struct TableRetriever {
    store: EmbeddingStore,
    catalog: SchemaCatalog,
    provider: Box<dyn EmbeddingProvider>,
}

impl TableRetriever {
    #[must_use]
    pub fn new(
        store: EmbeddingStore,
        catalog: SchemaCatalog,
        provider: Box<dyn EmbeddingProvider>,
    ) -> Self {
        Self {
            store,
            catalog,
            provider,
        }
    }

    /// Embed `query` and return the `k` most similar tables.
    pub async fn related_tables(&self, query: &str, k: usize) -> Result<Vec<ScoredMatch>> {
        if query.trim().is_empty() {
            return Err(RetrievalError::EmptyQuery);
        }

        let query_embedding = self.provider.embed(query).await?;
        let matches = self.store.select_top_k(&query_embedding, k)?;
        log::debug!(
            "Query matched {} of {} tables",
            matches.len(),
            self.store.len()
        );
        Ok(matches)
    }

    /// Build the SQL-generation prompt for `query` from its top-`k` tables.
    pub async fn sql_prompt(&self, query: &str, k: usize) -> Result<String> {
        let matches = self.related_tables(query, k).await?;
        let names: Vec<&str> = matches.iter().map(|m| m.identifier.as_str()).collect();
        let contexts = self.catalog.fetch(&names);
        build_sql_prompt(query, &contexts)
    }

    #[must_use]
    pub fn store(&self) -> &EmbeddingStore {
        &self.store
    }

    #[must_use]
    pub fn catalog(&self) -> &SchemaCatalog {
        &self.catalog
    }
}
