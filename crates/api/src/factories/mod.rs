//! Generated request payloads

pub mod data;
pub mod llm;

pub use data::{CommentOverrides, DataFactory, InvalidPost, PostOverrides, UserOverrides};
pub use llm::{LlmDataFactory, Scenario, ValidationCase};
