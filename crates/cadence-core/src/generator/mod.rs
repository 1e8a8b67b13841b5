//! The generation boundary: prompt construction, the object-safe
//! [`Generator`] trait, the Claude HTTP client, and tolerant parsing of
//! model output.

pub mod claude;
pub mod parse;
pub mod prompt;
pub mod trait_def;

pub use claude::ClaudeGenerator;
pub use parse::{parse_single_post, parse_weeks, repair_json, strip_code_fences};
pub use prompt::{single_post_prompt, weeks_prompt, PromptContext, PERSONA_PROMPT};
pub use trait_def::{GenerateError, GenerationRequest, Generator};
