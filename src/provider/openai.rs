use anyhow::{anyhow, Result};
use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use crate::config::{Config, SessionCredentials};
use crate::prefs::ImagePayload;
use crate::provider::serpapi::SerpApiClient;

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Concrete backend binding all three capabilities to OpenAI chat
/// completions, with SerpAPI supplying the web results for the research
/// call.
pub struct OpenAiBackend {
    client: Client,
    llm_key: String,
    search: SerpApiClient,
    vision_model: String,
    research_model: String,
    synthesis_model: String,
    search_results: usize,
    timeout_secs: u64,
    debug: bool,
}

impl OpenAiBackend {
    pub fn new(creds: SessionCredentials, cfg: &Config, debug: bool) -> Self {
        Self {
            client: Client::new(),
            llm_key: creds.llm_key,
            search: SerpApiClient::new(creds.search_key, cfg.stage_timeout_secs, debug),
            vision_model: cfg.vision_model.clone(),
            research_model: cfg.research_model.clone(),
            synthesis_model: cfg.synthesis_model.clone(),
            search_results: cfg.search_results,
            timeout_secs: cfg.stage_timeout_secs,
            debug,
        }
    }

    /// Single user message, no added scaffolding. `content` is either a
    /// plain string or a vision content-part array.
    async fn chat(&self, model: &str, content: Value) -> Result<String> {
        let body = json!({
            "model": model,
            "messages": [
                { "role": "user", "content": content }
            ]
        });

        if self.debug {
            eprintln!("debug[openai]: HTTP POST {CHAT_COMPLETIONS_URL} model={model}");
        }

        let resp = self
            .client
            .post(CHAT_COMPLETIONS_URL)
            .bearer_auth(&self.llm_key)
            .timeout(Duration::from_secs(self.timeout_secs))
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        if self.debug {
            eprintln!("debug[openai]: raw status: {}", status);
            eprintln!("debug[openai]: raw response:\n{}", &text);
        }

        if !status.is_success() {
            return Err(anyhow!("OpenAI API error ({}): {}", status, text));
        }

        #[derive(Deserialize)]
        struct ChatMessage {
            content: String,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: ChatMessage,
        }
        #[derive(Deserialize)]
        struct ChatResponse {
            choices: Vec<Choice>,
        }

        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("failed to parse OpenAI response: {e}\nRaw: {text}"))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| anyhow!("OpenAI response contained no choices"))
    }
}

#[async_trait]
impl super::InferenceBackend for OpenAiBackend {
    async fn analyze_image(&self, image: &ImagePayload, instructions: &str) -> Result<String> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(&image.bytes);
        let data_url = format!("data:{};base64,{}", image.format.mime(), encoded);
        let content = json!([
            { "type": "text", "text": instructions },
            { "type": "image_url", "image_url": { "url": data_url } }
        ]);
        self.chat(&self.vision_model, content).await
    }

    async fn search_and_summarize(&self, prompt: &str, query: &str) -> Result<String> {
        let hits = self.search.search(query, self.search_results).await?;
        let full = format!(
            "{prompt}\n\nWeb Search Results:\n{}",
            SerpApiClient::render_hits(&hits)
        );
        self.chat(&self.research_model, json!(full)).await
    }

    async fn synthesize_report(&self, prompt: &str) -> Result<String> {
        self.chat(&self.synthesis_model, json!(prompt)).await
    }
}
