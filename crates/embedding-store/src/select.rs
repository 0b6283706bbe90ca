use crate::embedding::Embedding;
use crate::error::{Result, StoreError};
use crate::store::EmbeddingStore;
use std::cmp::Ordering;

/// One scored table from a selection pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredMatch {
    pub identifier: String,
    pub score: f32,
}

impl EmbeddingStore {
    /// Score every record against `query` by cosine similarity and return
    /// the `min(k, len)` best matches, descending by score.
    ///
    /// Equal scores order by ascending table name, so repeated calls return
    /// identical sequences across runs. The query must share the store's
    /// dimensionality; an empty store or `k = 0` yields an empty result.
    pub fn select_top_k(&self, query: &Embedding, k: usize) -> Result<Vec<ScoredMatch>> {
        let Some(expected) = self.dimension() else {
            return Ok(Vec::new());
        };
        if k == 0 {
            return Ok(Vec::new());
        }
        if query.dimension() != expected {
            return Err(StoreError::DimensionMismatch {
                expected,
                actual: query.dimension(),
            });
        }

        // Brute-force scan: O(n*d) over tens-to-thousands of records.
        let mut scored: Vec<ScoredMatch> = self
            .iter()
            .map(|(identifier, embedding)| ScoredMatch {
                identifier: identifier.clone(),
                score: query.cosine_similarity(embedding),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.identifier.cmp(&b.identifier))
        });
        scored.truncate(k);

        Ok(scored)
    }
}
