use crate::error::{Result, RetrievalError};
use std::path::{Path, PathBuf};

/// Locate the embedding file inside a per-database directory.
///
/// Picks the lexicographically first regular file whose name contains
/// "embedding", so repeated runs resolve the same file even when the
/// directory also holds summaries and enriched-schema exports.
pub fn find_embedding_file(dir: impl AsRef<Path>) -> Result<PathBuf> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(RetrievalError::NotFound(format!(
            "Database directory {}",
            dir.display()
        )));
    }

    let mut candidates: Vec<PathBuf> = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_ascii_lowercase();
        if name.contains("embedding") {
            candidates.push(entry.path());
        }
    }
    candidates.sort();

    candidates.into_iter().next().ok_or_else(|| {
        RetrievalError::NotFound(format!("Embedding file in {}", dir.display()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn picks_the_first_embedding_file_by_name() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("school_tables_summary.json"), "[]").unwrap();
        std::fs::write(tmp.path().join("school_embeddings_b.json"), "[]").unwrap();
        std::fs::write(tmp.path().join("school_embeddings_a.json"), "[]").unwrap();

        let found = find_embedding_file(tmp.path()).unwrap();
        assert_eq!(
            found.file_name().unwrap().to_string_lossy(),
            "school_embeddings_a.json"
        );
    }

    #[test]
    fn errors_when_no_candidate_exists() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("summary.json"), "[]").unwrap();

        let err = find_embedding_file(tmp.path()).unwrap_err();
        assert!(matches!(err, RetrievalError::NotFound(_)));
    }

    #[test]
    fn errors_on_missing_directory() {
        let tmp = TempDir::new().unwrap();
        let err = find_embedding_file(tmp.path().join("absent")).unwrap_err();
        assert!(matches!(err, RetrievalError::NotFound(_)));
    }
}
