use crate::catalog::SchemaCatalog;
use crate::error::Result;
use crate::provider::EmbeddingProvider;
use insight_embedding_store::Embedding;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Serialize)]
struct PersistedEmbedding<'a> {
    table: &'a str,
    embedding: &'a Embedding,
}

/// Embed every table description in `catalog` and write the embedding
/// store file to `path`. Returns the number of records written.
///
/// Tables are embedded in ascending name order and the file is written
/// atomically (temp file + rename), so a deterministic provider yields a
/// byte-identical file on re-runs.
pub async fn build_embedding_file(
    catalog: &SchemaCatalog,
    provider: &dyn EmbeddingProvider,
    path: impl AsRef<Path>,
) -> Result<usize> {
    let path = path.as_ref();

    let mut embedded: Vec<(String, Embedding)> = Vec::with_capacity(catalog.len());
    for context in catalog.tables() {
        let embedding = provider.embed(&context.embedding_text()).await?;
        log::debug!(
            "Embedded table '{}' ({} dims)",
            context.table,
            embedding.dimension()
        );
        embedded.push((context.table.clone(), embedding));
    }

    let records: Vec<PersistedEmbedding> = embedded
        .iter()
        .map(|(table, embedding)| PersistedEmbedding { table, embedding })
        .collect();
    let bytes = serde_json::to_vec_pretty(&records)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await?;

    log::info!(
        "Wrote {} table embeddings to {}",
        records.len(),
        path.display()
    );
    Ok(records.len())
}
