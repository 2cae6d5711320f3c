use serde::{Deserialize, Serialize};

use crate::errors::PipelineError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub schema_version: String,
    /// Model driving the multimodal vision call.
    pub vision_model: String,
    /// Model summarizing web search results into titled links.
    pub research_model: String,
    /// Model filling in the final report skeleton.
    pub synthesis_model: String,
    /// Upper bound per outbound stage call.
    pub stage_timeout_secs: u64,
    /// Extra attempts per stage on top of the first (0 = no retry).
    pub retries: u32,
    /// How many search results to hand the research model.
    pub search_results: usize,
    /// Where per-transaction prompt/output artifacts land.
    pub artifact_dir: String,
    /// Default path the finished report is written to.
    pub output_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: "2026-03-01".into(),
            vision_model: "gpt-4o".into(),
            research_model: "gpt-4o".into(),
            synthesis_model: "o3-mini".into(),
            stage_timeout_secs: 180,
            retries: 0,
            search_results: 7,
            artifact_dir: ".greenprint".into(),
            output_path: "garden_design_recommendation.md".into(),
        }
    }
}

impl Config {
    /// Defaults overlaid with an optional TOML file.
    pub fn load(path: Option<&str>) -> anyhow::Result<Self> {
        match path {
            Some(p) => {
                let raw = fs_err::read_to_string(p)?;
                Ok(toml::from_str(&raw)?)
            }
            None => Ok(Self::default()),
        }
    }
}

/// The two secrets held for the duration of one session. Resolved once and
/// threaded by value into the backend factory; nothing downstream reads the
/// environment.
#[derive(Debug, Clone)]
pub struct SessionCredentials {
    pub llm_key: String,
    pub search_key: String,
}

impl SessionCredentials {
    pub fn resolve(
        llm_flag: Option<String>,
        search_flag: Option<String>,
    ) -> Result<Self, PipelineError> {
        let llm_key = llm_flag
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .filter(|k| !k.trim().is_empty())
            .ok_or(PipelineError::MissingCredentials(
                "OpenAI API key (pass --openai-key or set OPENAI_API_KEY)",
            ))?;
        let search_key = search_flag
            .or_else(|| std::env::var("SERPAPI_API_KEY").ok())
            .filter(|k| !k.trim().is_empty())
            .ok_or(PipelineError::MissingCredentials(
                "SerpAPI key (pass --serp-key or set SERPAPI_API_KEY)",
            ))?;
        Ok(Self { llm_key, search_key })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn overlay_keeps_defaults_for_missing_keys() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "vision_model = \"gpt-4o-mini\"\nretries = 2").unwrap();
        let cfg = Config::load(Some(f.path().to_str().unwrap())).unwrap();
        assert_eq!(cfg.vision_model, "gpt-4o-mini");
        assert_eq!(cfg.retries, 2);
        assert_eq!(cfg.synthesis_model, "o3-mini");
    }

    #[test]
    fn explicit_flags_win_over_environment() {
        let creds =
            SessionCredentials::resolve(Some("sk-test".into()), Some("serp-test".into())).unwrap();
        assert_eq!(creds.llm_key, "sk-test");
        assert_eq!(creds.search_key, "serp-test");
    }

    #[test]
    fn blank_flag_does_not_count_as_a_key() {
        let err = SessionCredentials::resolve(Some("   ".into()), Some("serp".into()))
            .unwrap_err();
        assert!(matches!(err, PipelineError::MissingCredentials(_)));
    }
}
