use serde::Serialize;
use thiserror::Error;

/// Which pipeline stage an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Analysis,
    Research,
    Synthesis,
}

impl Stage {
    /// Short name used for artifact file names.
    pub fn slug(&self) -> &'static str {
        match self {
            Stage::Analysis => "analysis",
            Stage::Research => "research",
            Stage::Synthesis => "synthesis",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Analysis => write!(f, "visual analysis"),
            Stage::Research => write!(f, "garden research"),
            Stage::Synthesis => write!(f, "report synthesis"),
        }
    }
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("missing credentials: {0}")] MissingCredentials(&'static str),
    #[error("missing input: {0}")] MissingInput(String),
    #[error("visual analysis failed: {0}")] AnalysisFailed(String),
    #[error("garden research failed: {0}")] ResearchFailed(String),
    #[error("report synthesis failed: {0}")] SynthesisFailed(String),
    #[error("{stage} output rejected: {reason}")] ValidationFailed { stage: Stage, reason: String },
}

impl PipelineError {
    /// Stage the error originated from, if it arose past input validation.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineError::AnalysisFailed(_) => Some(Stage::Analysis),
            PipelineError::ResearchFailed(_) => Some(Stage::Research),
            PipelineError::SynthesisFailed(_) => Some(Stage::Synthesis),
            PipelineError::ValidationFailed { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Wrap a provider-layer failure in the typed error for `stage`.
    pub fn stage_failure(stage: Stage, cause: impl std::fmt::Display) -> Self {
        let msg = cause.to_string();
        match stage {
            Stage::Analysis => PipelineError::AnalysisFailed(msg),
            Stage::Research => PipelineError::ResearchFailed(msg),
            Stage::Synthesis => PipelineError::SynthesisFailed(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_attribute_their_originating_stage() {
        assert_eq!(
            PipelineError::ResearchFailed("quota".into()).stage(),
            Some(Stage::Research)
        );
        assert_eq!(
            PipelineError::ValidationFailed { stage: Stage::Analysis, reason: "empty".into() }
                .stage(),
            Some(Stage::Analysis)
        );
        assert!(PipelineError::MissingInput("no photo".into()).stage().is_none());
        assert!(PipelineError::MissingCredentials("key").stage().is_none());
    }

    #[test]
    fn stage_failure_round_trips_the_stage() {
        for stage in [Stage::Analysis, Stage::Research, Stage::Synthesis] {
            assert_eq!(PipelineError::stage_failure(stage, "boom").stage(), Some(stage));
        }
    }
}
