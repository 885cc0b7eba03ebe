//! Memory system for cortex.
//!
//! - [`ShortTermMemory`]: the in-session turn log.
//! - [`LongTermMemory`]: persisted facts, searched by embedding similarity.
//! - [`DocumentIndex`]: the persisted document collection behind the retriever.
//! - [`FactExtractor`]: rule-based fact capture from raw user input.

pub mod documents;
pub mod embedder;
pub mod facts;
pub mod long_term;
pub mod short_term;
pub mod store;
pub mod vector;

pub use documents::{DocumentIndex, load_text_files};
pub use embedder::{HashEmbedder, ProviderEmbedder};
pub use facts::{FactExtractor, FactRule};
pub use long_term::LongTermMemory;
pub use short_term::{ShortTermMemory, Turn, TurnRole};
pub use store::{VectorRecord, VectorStore};
pub use vector::{cosine_similarity, rank_by_similarity};
