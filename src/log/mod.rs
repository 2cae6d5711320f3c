use chrono::Utc;
use fs_err as fs;
use serde_json::json;
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::config::Config;
use crate::pipeline::StageRecord;
use crate::prefs::GardenPreferences;

pub struct SavedPaths {
    pub dir: PathBuf,
    pub prompt: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

fn tx_dir(artifact_dir: &Path, tx: Uuid) -> PathBuf {
    artifact_dir.join("tx").join(tx.to_string())
}

/// Persist one stage's prompt and raw output. The inter-stage contract is
/// untyped text, so this trail is the only place it can be inspected after
/// the fact.
pub fn save_stage(
    record: &StageRecord,
    tx: Uuid,
    cfg: &Config,
    save_prompt: bool,
    save_output: bool,
) -> anyhow::Result<SavedPaths> {
    let dir = tx_dir(Path::new(&cfg.artifact_dir), tx);
    fs::create_dir_all(&dir)?;

    let slug = record.stage.slug();
    let mut prompt_path = None;
    let mut output_path = None;

    if save_prompt {
        let p = dir.join(format!("{slug}.prompt.txt"));
        fs::write(&p, &record.prompt)?;
        prompt_path = Some(p);
    }

    if save_output {
        let p = dir.join(format!("{slug}.output.md"));
        fs::write(&p, &record.output)?;
        output_path = Some(p);
    }

    Ok(SavedPaths { dir, prompt: prompt_path, output: output_path })
}

/// One manifest per run: transaction id, timestamp and the preference
/// selections that drove it.
pub fn save_manifest(tx: Uuid, prefs: &GardenPreferences, cfg: &Config) -> anyhow::Result<PathBuf> {
    let dir = tx_dir(Path::new(&cfg.artifact_dir), tx);
    fs::create_dir_all(&dir)?;
    let manifest = json!({
        "transaction": tx,
        "timestamp": Utc::now(),
        "lighting": prefs.lighting.to_string(),
        "climate": prefs.climate.to_string(),
        "garden_use": prefs.garden_use.to_string(),
        "watering": prefs.watering.to_string(),
    });
    let p = dir.join("run.json");
    fs::write(&p, serde_json::to_string_pretty(&manifest)?)?;
    Ok(p)
}

pub fn print_planned_paths(artifact_dir: &Path, tx: Uuid) {
    let dir = tx_dir(artifact_dir, tx);
    println!("debug: planned artifacts directory: {}", dir.display());
    println!("debug: planned prompt path: {}", dir.join("analysis.prompt.txt").display());
    println!("debug: planned output path: {}", dir.join("analysis.output.md").display());
    std::io::stdout().flush().ok();
}

pub fn print_saved_paths(stage: &str, saved: &SavedPaths) {
    println!("debug[{stage}]: artifacts directory: {}", saved.dir.display());
    if let Some(p) = &saved.prompt {
        println!("debug[{stage}]: prompt saved at: {}", p.display());
    } else {
        println!("debug[{stage}]: prompt not saved (flag off)");
    }
    if let Some(p) = &saved.output {
        println!("debug[{stage}]: output saved at: {}", p.display());
    } else {
        println!("debug[{stage}]: output not saved (flag off)");
    }
    std::io::stdout().flush().ok();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Stage;

    #[test]
    fn stage_artifacts_land_in_the_tx_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = Config {
            artifact_dir: tmp.path().to_string_lossy().into_owned(),
            ..Config::default()
        };
        let tx = Uuid::new_v4();
        let record = StageRecord {
            stage: Stage::Research,
            prompt: "prompt body".into(),
            output: "- [link](https://example.com)".into(),
        };

        let saved = save_stage(&record, tx, &cfg, true, true).unwrap();
        let prompt = saved.prompt.unwrap();
        assert!(prompt.ends_with("research.prompt.txt"));
        assert_eq!(fs::read_to_string(prompt).unwrap(), "prompt body");
        assert!(saved.output.unwrap().exists());

        let skipped = save_stage(&record, tx, &cfg, false, false).unwrap();
        assert!(skipped.prompt.is_none());
        assert!(skipped.output.is_none());
    }
}
