//! The research boundary: practice grounding lookups and their cache.
//!
//! Research failures never abort a plan; they degrade to a placeholder
//! string. The cache is an injected get/put store keyed by the practice's
//! website so sessions and tests can supply their own, and a miss is a
//! cold start rather than an error.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::{debug, warn};

/// Text substituted when the research capability fails or is absent.
pub const RESEARCH_UNAVAILABLE: &str =
    "Research unavailable. Write from the practice facts and context provided.";

/// Adapter interface for the external research capability.
#[async_trait]
pub trait Researcher: Send + Sync {
    /// Produce free-text research notes for a practice. Errors are
    /// stringly-typed because every failure is handled the same way:
    /// degrade to the placeholder.
    async fn research(&self, name: &str, website: &str) -> Result<String, String>;
}

/// Injected key-value store for the most recent research result per
/// practice identity.
pub trait ResearchStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn put(&self, key: &str, value: String);
}

/// In-memory store; one writer per identity in intended usage, readers
/// tolerate misses.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResearchStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.lock().ok()?.get(key).cloned()
    }

    fn put(&self, key: &str, value: String) {
        if let Ok(mut map) = self.inner.lock() {
            map.insert(key.to_string(), value);
        }
    }
}

/// A researcher that always degrades; used when no capability is wired up.
pub struct NoopResearcher;

#[async_trait]
impl Researcher for NoopResearcher {
    async fn research(&self, _name: &str, _website: &str) -> Result<String, String> {
        Err("no research capability configured".to_string())
    }
}

/// A researcher that asks the content generator itself for grounding notes.
pub struct GeneratorResearcher {
    generator: std::sync::Arc<dyn crate::generator::Generator>,
}

impl GeneratorResearcher {
    pub fn new(generator: std::sync::Arc<dyn crate::generator::Generator>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl Researcher for GeneratorResearcher {
    async fn research(&self, name: &str, website: &str) -> Result<String, String> {
        let request = crate::generator::GenerationRequest {
            system_prompt: "You research local businesses for a content writer. \
                            Reply with a short factual summary, plain text only."
                .to_string(),
            user_prompt: format!(
                "Summarize what a content writer should know about the practice \
                 {name:?} (website: {website}): services, tone, community ties, \
                 anything distinctive. If you know nothing reliable, say so."
            ),
        };
        self.generator
            .generate(&request)
            .await
            .map_err(|e| e.to_string())
    }
}

/// Resolve the grounding summary for a practice: cache consult first, then
/// a fresh lookup stored on success, then the placeholder on failure.
pub async fn grounding_summary(
    store: &dyn ResearchStore,
    researcher: &dyn Researcher,
    name: &str,
    website: &str,
) -> String {
    if let Some(cached) = store.get(website) {
        debug!(website, "research cache hit");
        return cached;
    }
    match researcher.research(name, website).await {
        Ok(summary) => {
            store.put(website, summary.clone());
            summary
        }
        Err(reason) => {
            warn!(website, reason, "research unavailable, using placeholder");
            RESEARCH_UNAVAILABLE.to_string()
        }
    }
}
