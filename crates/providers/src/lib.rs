//! Generation backends for cortex.
//!
//! All backends implement the `cortex_core::Provider` trait.
//! The router selects the correct one based on configuration.

pub mod openai_compat;
pub mod router;

pub use openai_compat::OpenAiCompatProvider;
pub use router::{ProviderRouter, build_from_config};
