//! The cortex agent: a think/act/observe loop over a capability registry.
//!
//! Each turn:
//!
//! 1. **Capture facts** from the raw input into long-term memory
//! 2. **Build context** (instructions + tools + history + known facts + steps)
//! 3. **Ask the backend** for either an action or a final answer
//! 4. **If an action**: run the capability, record the observation, go to 2
//! 5. **If a final answer**: append the exchange to short-term memory
//!
//! The loop stops after `max_steps` actions whatever the backend says.

pub mod context;
pub mod loop_runner;
pub mod parser;
pub mod session;

#[cfg(test)]
mod test_helpers;

pub use context::{AgentStep, ContextBundle, DEFAULT_INSTRUCTIONS};
pub use loop_runner::{AgentLoop, FinishReason, TurnOutcome};
pub use parser::{ParsedOutput, parse};
pub use session::Session;
