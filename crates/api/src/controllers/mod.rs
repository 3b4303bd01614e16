//! One method per endpoint. Responses come back unaltered so the caller
//! decides what to assert.

pub mod llm;
pub mod posts;

pub use llm::LlmController;
pub use posts::JsonPlaceholderController;
