use anyhow::Result;
use async_trait::async_trait;

use crate::config::{Config, SessionCredentials};
use crate::prefs::ImagePayload;

pub mod openai;
pub mod serpapi;

/// The three outbound capabilities the pipeline depends on. Each call is a
/// fallible request/response over the network; nothing here assumes ordering
/// beyond "returns after completion or fails".
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Vision call: describe the garden photo.
    async fn analyze_image(&self, image: &ImagePayload, instructions: &str) -> Result<String>;

    /// Search-augmented call: `query` drives the web search, `prompt` drives
    /// the summarization into titled markdown links.
    async fn search_and_summarize(&self, prompt: &str, query: &str) -> Result<String>;

    /// Text-synthesis call: fill in the report skeleton.
    async fn synthesize_report(&self, prompt: &str) -> Result<String>;
}

pub type DynBackend = Box<dyn InferenceBackend + Send + Sync>;

pub fn make_backend(creds: SessionCredentials, cfg: &Config, debug: bool) -> DynBackend {
    Box::new(openai::OpenAiBackend::new(creds, cfg, debug))
}
