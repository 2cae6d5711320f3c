use std::future::Future;
use std::time::Duration;

use crate::config::{Config, SessionCredentials};
use crate::errors::{PipelineError, Stage};
use crate::prefs::GardenPreferences;
use crate::prompt;
use crate::provider::{make_backend, InferenceBackend};
use crate::validate;

/// One stage's prompt and verbatim output, kept for the artifact log.
#[derive(Debug, Clone)]
pub struct StageRecord {
    pub stage: Stage,
    pub prompt: String,
    pub output: String,
}

/// The finished report: the synthesis output verbatim, plus the trail of
/// stage records that produced it.
#[derive(Debug, Clone)]
pub struct ReportDocument {
    pub markdown: String,
    pub trail: Vec<StageRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    NotStarted,
    AnalyzingImage,
    Researching,
    Synthesizing,
    Complete,
    Failed(Stage),
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Complete | PipelineState::Failed(_))
    }
}

/// Presentation hook for progress rendering. The core never touches a
/// terminal; the observer does.
pub trait StageObserver: Send + Sync {
    fn on_transition(&self, state: PipelineState);
}

struct NoopObserver;

impl StageObserver for NoopObserver {
    fn on_transition(&self, _state: PipelineState) {}
}

/// Retry is a deployment concern, so the policy is pluggable at the
/// orchestrator boundary rather than hard-coded.
pub trait RetryPolicy: Send + Sync {
    /// Delay before retry number `attempt` (1-based), or `None` to give up.
    fn backoff(&self, attempt: u32) -> Option<Duration>;
}

pub struct NoRetry;

impl RetryPolicy for NoRetry {
    fn backoff(&self, _attempt: u32) -> Option<Duration> {
        None
    }
}

pub struct FixedRetry {
    pub attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy for FixedRetry {
    fn backoff(&self, attempt: u32) -> Option<Duration> {
        (attempt <= self.attempts).then_some(self.delay)
    }
}

/// Sequences the three stages, owns failure short-circuiting: the first
/// failing stage aborts the run and later stages are never invoked.
pub struct Pipeline<'a> {
    backend: &'a dyn InferenceBackend,
    stage_timeout: Duration,
    retry: Box<dyn RetryPolicy>,
    observer: Box<dyn StageObserver>,
    state: PipelineState,
}

impl<'a> Pipeline<'a> {
    pub fn new(backend: &'a dyn InferenceBackend, cfg: &Config) -> Self {
        let retry: Box<dyn RetryPolicy> = if cfg.retries > 0 {
            Box::new(FixedRetry { attempts: cfg.retries, delay: Duration::from_secs(1) })
        } else {
            Box::new(NoRetry)
        };
        Self {
            backend,
            stage_timeout: Duration::from_secs(cfg.stage_timeout_secs),
            retry,
            observer: Box::new(NoopObserver),
            state: PipelineState::NotStarted,
        }
    }

    pub fn with_retry_policy(mut self, retry: Box<dyn RetryPolicy>) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_observer(mut self, observer: Box<dyn StageObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Run one report request to a terminal state. Input validation happens
    /// before any backend call; after that each stage output is checked at
    /// the boundary and handed verbatim to the next prompt builder.
    pub async fn generate_report(
        &mut self,
        prefs: &GardenPreferences,
    ) -> Result<ReportDocument, PipelineError> {
        let image = prefs.validate()?;
        let backend = self.backend;
        let mut trail = Vec::with_capacity(3);

        self.transition(PipelineState::AnalyzingImage);
        let analysis_instructions = prompt::analysis_instructions();
        let visual_insights = self
            .run_stage(Stage::Analysis, || {
                backend.analyze_image(image, &analysis_instructions)
            })
            .await?;
        trail.push(StageRecord {
            stage: Stage::Analysis,
            prompt: analysis_instructions,
            output: visual_insights.clone(),
        });

        self.transition(PipelineState::Researching);
        let research_prompt = prompt::research_prompt(prefs, &visual_insights);
        let query = prompt::search_query(prefs);
        let research_links = self
            .run_stage(Stage::Research, || {
                backend.search_and_summarize(&research_prompt, &query)
            })
            .await?;
        trail.push(StageRecord {
            stage: Stage::Research,
            prompt: research_prompt,
            output: research_links.clone(),
        });

        self.transition(PipelineState::Synthesizing);
        let synthesis_prompt = prompt::synthesis_prompt(&visual_insights, &research_links);
        let markdown = self
            .run_stage(Stage::Synthesis, || {
                backend.synthesize_report(&synthesis_prompt)
            })
            .await?;
        trail.push(StageRecord {
            stage: Stage::Synthesis,
            prompt: synthesis_prompt,
            output: markdown.clone(),
        });

        self.transition(PipelineState::Complete);
        Ok(ReportDocument { markdown, trail })
    }

    fn transition(&mut self, next: PipelineState) {
        self.state = next;
        self.observer.on_transition(next);
    }

    /// One stage call under the timeout and retry policy, with the boundary
    /// check applied to whatever the backend returned.
    async fn run_stage<F, Fut>(&mut self, stage: Stage, call: F) -> Result<String, PipelineError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = anyhow::Result<String>>,
    {
        let mut attempt = 0u32;
        loop {
            let failure = match tokio::time::timeout(self.stage_timeout, call()).await {
                Ok(Ok(text)) => match validate::check_stage_output(stage, &text) {
                    Ok(()) => return Ok(text),
                    Err(e) => e,
                },
                Ok(Err(e)) => PipelineError::stage_failure(stage, format!("{e:#}")),
                Err(_) => PipelineError::stage_failure(
                    stage,
                    format!("timed out after {}s", self.stage_timeout.as_secs()),
                ),
            };
            attempt += 1;
            match self.retry.backoff(attempt) {
                Some(delay) => {
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
                None => {
                    self.transition(PipelineState::Failed(stage));
                    return Err(failure);
                }
            }
        }
    }
}

/// The inbound operation: validate inputs, bind the backend to this
/// session's credentials, run the pipeline.
pub async fn generate_report(
    prefs: &GardenPreferences,
    creds: SessionCredentials,
    cfg: &Config,
    debug: bool,
) -> Result<ReportDocument, PipelineError> {
    prefs.validate()?;
    let backend = make_backend(creds, cfg, debug);
    Pipeline::new(backend.as_ref(), cfg).generate_report(prefs).await
}
