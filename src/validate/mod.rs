use regex::Regex;
use std::sync::OnceLock;

use crate::errors::{PipelineError, Stage};

fn markdown_link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[[^\]]+\]\(https?://[^)\s]+\)").unwrap())
}

/// Post-call check at each stage boundary. The inter-stage contract is loose
/// by design (model outputs are unstructured text), so this enforces only the
/// minimum each downstream consumer depends on:
/// - analysis: non-empty insights,
/// - research: non-empty and at least one titled markdown link,
/// - synthesis: none — an empty-but-successful report is preserved as-is.
pub fn check_stage_output(stage: Stage, text: &str) -> Result<(), PipelineError> {
    match stage {
        Stage::Analysis => {
            if text.trim().is_empty() {
                return Err(PipelineError::ValidationFailed {
                    stage,
                    reason: "model returned no visual insights".into(),
                });
            }
        }
        Stage::Research => {
            if text.trim().is_empty() {
                return Err(PipelineError::ValidationFailed {
                    stage,
                    reason: "model returned no research links".into(),
                });
            }
            if !markdown_link_re().is_match(text) {
                return Err(PipelineError::ValidationFailed {
                    stage,
                    reason: "research output contains no markdown links".into(),
                });
            }
        }
        Stage::Synthesis => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_analysis_is_rejected() {
        let err = check_stage_output(Stage::Analysis, "  \n").unwrap_err();
        assert!(matches!(
            err,
            PipelineError::ValidationFailed { stage: Stage::Analysis, .. }
        ));
    }

    #[test]
    fn research_needs_a_markdown_link() {
        assert!(check_stage_output(Stage::Research, "see https://example.com").is_err());
        assert!(check_stage_output(
            Stage::Research,
            "- [Xeriscaping Tips](https://example.com/xeriscape)"
        )
        .is_ok());
    }

    #[test]
    fn empty_synthesis_passes_through() {
        assert!(check_stage_output(Stage::Synthesis, "").is_ok());
    }
}
