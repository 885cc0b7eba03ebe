//! Per-step context: the step history of the current turn and the bundle
//! rendered for the generation backend.
//!
//! The bundle is rebuilt from scratch before every backend call.

pub mod bundle;
pub mod scratchpad;

pub use bundle::{ContextBundle, DEFAULT_INSTRUCTIONS};
pub use scratchpad::AgentStep;
