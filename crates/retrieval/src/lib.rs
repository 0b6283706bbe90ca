//! # Insight Retrieval
//!
//! The retrieval pipeline around the embedding store: schema catalog,
//! embedding provider boundary, embedding-file builder, and SQL prompt
//! assembly.
//!
//! ```text
//! enriched_schema.json ──> SchemaCatalog ──┐
//!                                          ├──> build_embedding_file ──> embeddings.json
//! EmbeddingProvider (api | stub) ──────────┘
//!
//! user request ──> TableRetriever::related_tables ──> top-k tables
//!                                 └─ sql_prompt ────> SQL-generation prompt
//! ```
//!
//! The store and catalog are loaded once per session; all scoring happens
//! in memory against that snapshot.

mod catalog;
mod error;
mod paths;
mod pipeline;
mod prompt;
mod provider;
mod retriever;

pub use catalog::{SchemaCatalog, TableContext};
pub use error::{Result, RetrievalError};
pub use paths::find_embedding_file;
pub use pipeline::build_embedding_file;
pub use prompt::build_sql_prompt;
pub use provider::{
    provider_from_env, ApiConfig, ApiProvider, EmbeddingProvider, ProviderMode, StubProvider,
};
pub use retriever::{TableRetriever, DEFAULT_TOP_K};

// Re-export store types for convenience
pub use insight_embedding_store::{Embedding, EmbeddingStore, ScoredMatch, StoreError};
