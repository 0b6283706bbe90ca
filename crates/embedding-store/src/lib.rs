//! # Insight Embedding Store
//!
//! In-memory store of table embeddings with top-k cosine-similarity
//! selection, used to pick the database tables most relevant to a
//! natural-language request.
//!
//! ## Architecture
//!
//! ```text
//! embeddings.json
//!     │
//!     ├──> EmbeddingStore (load once per session)
//!     │      └─> table name -> Embedding[d]
//!     │
//!     └──> select_top_k(query, k)
//!            └─> ScoredMatch[] (descending score, name tie-break)
//! ```
//!
//! Loading is an explicit caller-controlled step, and selection is a pure
//! function over the loaded store, so the scoring algorithm is testable
//! without touching the file system.
//!
//! ## Example
//!
//! ```no_run
//! use insight_embedding_store::{Embedding, EmbeddingStore};
//!
//! fn main() -> insight_embedding_store::Result<()> {
//!     let store = EmbeddingStore::load("school_db/embeddings.json")?;
//!     let query = Embedding::new(vec![0.1; 384]);
//!
//!     for m in store.select_top_k(&query, 3)? {
//!         println!("{}: {:.3}", m.identifier, m.score);
//!     }
//!
//!     Ok(())
//! }
//! ```

mod embedding;
mod error;
mod select;
mod store;

pub use embedding::Embedding;
pub use error::{Result, StoreError};
pub use select::ScoredMatch;
pub use store::EmbeddingStore;
