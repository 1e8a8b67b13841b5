//! The `Generator` trait -- the adapter interface around the LLM.
//!
//! The deterministic scheduling core never touches the network; everything
//! non-deterministic funnels through this one async method. The trait is
//! intentionally object-safe so orchestration code can hold an
//! `Arc<dyn Generator>` and tests can inject stubs.

use async_trait::async_trait;
use thiserror::Error;

/// One structured request to the external content-generation capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Fixed persona/style prompt plus the output-shape contract.
    pub system_prompt: String,
    /// Practice facts, scheduling facts, and free-text context.
    pub user_prompt: String,
}

/// Errors from the generation boundary.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The capability returned no text at all.
    #[error("generator returned an empty response")]
    EmptyResponse,

    /// The returned text failed to parse even after the one permitted
    /// repair attempt, or parsed but lacked required keys.
    #[error("malformed generator response: expected {expected}, found {found}")]
    MalformedResponse { expected: String, found: String },

    /// Transport-level failure reaching the capability.
    #[error("generator request failed: {0}")]
    Http(String),

    /// No API key configured for a real client.
    #[error("no API key configured (set CADENCE_API_KEY or add one to the config file)")]
    MissingApiKey,
}

/// Adapter interface for the external content-generation capability.
///
/// Implementors take a structured request and return raw response text. The
/// caller owns parsing and validation, so stub implementations in tests can
/// echo back whatever shape the test needs.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Human-readable name for this generator (e.g. "claude").
    fn name(&self) -> &str;

    /// Send one generation request and return the raw response text.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerateError>;
}

// Compile-time assertion: Generator must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn Generator) {}
};

#[cfg(test)]
mod tests {
    use super::*;

    /// A trivial generator that replies with a fixed string, used only to
    /// prove the trait can be implemented and used as `dyn Generator`.
    struct EchoGenerator;

    #[async_trait]
    impl Generator for EchoGenerator {
        fn name(&self) -> &str {
            "echo"
        }

        async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerateError> {
            Ok(format!("echo:{}", request.user_prompt))
        }
    }

    #[test]
    fn generator_is_object_safe() {
        let g: Box<dyn Generator> = Box::new(EchoGenerator);
        assert_eq!(g.name(), "echo");
    }

    #[tokio::test]
    async fn echo_generator_round_trip() {
        let g: Box<dyn Generator> = Box::new(EchoGenerator);
        let req = GenerationRequest {
            system_prompt: "sys".into(),
            user_prompt: "hello".into(),
        };
        assert_eq!(g.generate(&req).await.unwrap(), "echo:hello");
    }
}
