use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::errors::PipelineError;
use crate::pipeline::{PipelineState, StageObserver};
use crate::prefs::GardenPreferences;

pub fn show_preferences(prefs: &GardenPreferences) {
    println!("\n=== GARDEN BRIEF ===");
    println!("{}  {}", "[LIGHTING]".yellow().bold(), prefs.lighting);
    println!("{}  {}", "[CLIMATE] ".cyan().bold(), prefs.climate);
    println!("{}  {}", "[USE]     ".green().bold(), prefs.garden_use);
    println!("{}  {}", "[WATERING]".blue().bold(), prefs.watering);
    println!();
}

/// Spinner bound to pipeline transitions, driven through the observer hook
/// so the pipeline itself never touches the terminal.
pub struct StageSpinner {
    bar: ProgressBar,
}

impl StageSpinner {
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.enable_steady_tick(Duration::from_millis(120));
        Self { bar }
    }
}

impl StageObserver for StageSpinner {
    fn on_transition(&self, state: PipelineState) {
        match state {
            PipelineState::NotStarted => {}
            PipelineState::AnalyzingImage => self.bar.set_message("Analyzing your garden photo..."),
            PipelineState::Researching => {
                self.bar.set_message("Researching plants and layout ideas...")
            }
            PipelineState::Synthesizing => {
                self.bar.set_message("Writing your personalized design report...")
            }
            PipelineState::Complete | PipelineState::Failed(_) => self.bar.finish_and_clear(),
        }
    }
}

pub fn print_report(markdown: &str) {
    println!("\n{}", "━━━━━━━━━━━━━━━ Garden Design Report ━━━━━━━━━━━━━━━".bold());
    println!("{markdown}");
    println!("{}", "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━".bold());
}

pub fn print_saved_report(path: &str) {
    println!("\n{} report saved to {}", "✔".green().bold(), path.bold());
}

/// Stage-specific message, never a raw error trace.
pub fn print_failure(err: &PipelineError) {
    let headline = match err {
        PipelineError::MissingCredentials(_) => "Credentials needed before we can start",
        PipelineError::MissingInput(_) => "Something is missing from your garden brief",
        PipelineError::AnalysisFailed(_) => "We couldn't analyze your garden photo",
        PipelineError::ResearchFailed(_) => "We couldn't gather gardening research",
        PipelineError::SynthesisFailed(_) => "We couldn't write your design report",
        PipelineError::ValidationFailed { .. } => "A stage returned unusable output",
    };
    eprintln!("\n{} {}", "✘".red().bold(), headline.bold());
    if let Some(stage) = err.stage() {
        eprintln!("  stage: {stage}");
    }
    eprintln!("  {err}");
}
