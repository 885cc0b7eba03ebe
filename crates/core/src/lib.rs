//! # Cortex Core
//!
//! Domain types, traits, and error definitions for the cortex conversational
//! agent. This crate performs **no I/O**; it defines the domain model that
//! all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator (generation backend, embedding model,
//! similarity-search store, capability) is a trait here. Implementations live
//! in their respective crates, which keeps tests free to swap in scripted
//! stand-ins.

pub mod error;
pub mod memory;
pub mod message;
pub mod provider;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result};
pub use memory::{Embedder, SimilaritySearch};
pub use message::{Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse};
pub use tool::{CapabilityKind, Tool, ToolRegistry};
