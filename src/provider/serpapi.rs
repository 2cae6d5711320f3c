use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const SEARCH_URL: &str = "https://serpapi.com/search.json";

#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub snippet: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    organic_results: Vec<SearchHit>,
    #[serde(default)]
    error: Option<String>,
}

/// Thin SerpAPI client used by the research stage. Quota and auth failures
/// come back as errors so the pipeline can attribute them to research.
pub struct SerpApiClient {
    client: Client,
    api_key: String,
    timeout_secs: u64,
    debug: bool,
}

impl SerpApiClient {
    pub fn new(api_key: String, timeout_secs: u64, debug: bool) -> Self {
        Self {
            client: Client::new(),
            api_key,
            timeout_secs,
            debug,
        }
    }

    pub async fn search(&self, query: &str, count: usize) -> Result<Vec<SearchHit>> {
        if self.debug {
            eprintln!("debug[serpapi]: GET {SEARCH_URL} q={query}");
        }

        let resp = self
            .client
            .get(SEARCH_URL)
            .query(&[
                ("engine", "google"),
                ("q", query),
                ("num", &count.to_string()),
                ("api_key", &self.api_key),
            ])
            .timeout(Duration::from_secs(self.timeout_secs))
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(anyhow!("SerpAPI error ({}): {}", status, text));
        }

        let parsed: SearchResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("failed to parse SerpAPI response: {e}"))?;

        if let Some(err) = parsed.error {
            return Err(anyhow!("SerpAPI reported: {err}"));
        }
        if parsed.organic_results.is_empty() {
            return Err(anyhow!("SerpAPI returned no organic results for: {query}"));
        }

        let mut hits = parsed.organic_results;
        hits.truncate(count);
        Ok(hits)
    }

    /// Format hits as the context block handed to the research model.
    pub fn render_hits(hits: &[SearchHit]) -> String {
        hits.iter()
            .map(|h| format!("- [{}]({}): {}", h.title, h.link, h.snippet))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_organic_results_and_surfaces_api_errors() {
        let raw = r#"{
            "organic_results": [
                {"title": "Xeriscaping 101", "link": "https://example.com/xeri", "snippet": "dry gardens"},
                {"title": "Herb Beds", "link": "https://example.com/herbs"}
            ]
        }"#;
        let parsed: SearchResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.organic_results.len(), 2);
        assert_eq!(parsed.organic_results[1].snippet, "");

        let err: SearchResponse =
            serde_json::from_str(r#"{"error": "Invalid API key"}"#).unwrap();
        assert_eq!(err.error.as_deref(), Some("Invalid API key"));
    }

    #[test]
    fn rendered_hits_are_markdown_links() {
        let hits = vec![SearchHit {
            title: "Xeriscaping 101".into(),
            link: "https://example.com/xeri".into(),
            snippet: "dry gardens".into(),
        }];
        let rendered = SerpApiClient::render_hits(&hits);
        assert!(rendered.contains("[Xeriscaping 101](https://example.com/xeri)"));
    }
}
