//! Response validators
//!
//! Each validator either returns `Ok` or the first violated condition as an
//! assertion failure. None of them perform I/O.

pub mod llm;
pub mod response;

pub use llm::CompleteOptions;
