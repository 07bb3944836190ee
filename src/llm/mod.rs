//! Language-model integration.
//!
//! The model is an opaque text-completion oracle: a function from
//! (system prompt, user content) to text. Its output is treated as
//! unreliable input everywhere it is parsed.

pub mod client;
pub mod prompt;

pub use client::{EXTRACTION_TEMPERATURE, LlmClient, NL_QUERY_TEMPERATURE, strip_code_fences};
