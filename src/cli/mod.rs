use bytes::Bytes;
use clap::Parser;
use fs_err as fs;

use crate::errors::PipelineError;
use crate::prefs::{Climate, GardenPreferences, GardenUse, ImagePayload, Lighting, Watering};

#[derive(Parser, Debug)]
#[command(
    name = "greenprint",
    version,
    about = "Turns a backyard photo plus a few preferences into a markdown garden design report"
)]
pub struct Args {
    /// Path to a jpg/png photo of the garden area.
    #[arg(long)]
    pub image: Option<String>,

    #[arg(long, value_enum, default_value_t = Lighting::FullSun)]
    pub lighting: Lighting,

    #[arg(long, value_enum, default_value_t = Climate::Temperate)]
    pub climate: Climate,

    #[arg(long = "use", value_enum, default_value_t = GardenUse::Relaxation)]
    pub garden_use: GardenUse,

    #[arg(long, value_enum, default_value_t = Watering::Moderate)]
    pub watering: Watering,

    /// OpenAI API key; falls back to OPENAI_API_KEY.
    #[arg(long)]
    pub openai_key: Option<String>,

    /// SerpAPI key; falls back to SERPAPI_API_KEY.
    #[arg(long)]
    pub serp_key: Option<String>,

    /// Override the vision-stage model.
    #[arg(long)]
    pub vision_model: Option<String>,

    /// Override the research-stage model.
    #[arg(long)]
    pub research_model: Option<String>,

    /// Override the synthesis-stage model.
    #[arg(long)]
    pub synthesis_model: Option<String>,

    /// Per-stage timeout override.
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Extra attempts per stage on transient failure.
    #[arg(long)]
    pub retries: Option<u32>,

    /// Where to write the finished report.
    #[arg(long)]
    pub output: Option<String>,

    #[arg(long, default_value_t = true)]
    pub save_request: bool,

    #[arg(long, default_value_t = true)]
    pub save_response: bool,

    #[arg(long, default_value_t = false)]
    pub debug: bool,

    #[arg(long)]
    pub config: Option<String>,
}

impl Args {
    /// Flag overrides win over the config file, which wins over defaults.
    pub fn overlay(&self, cfg: &mut crate::config::Config) {
        if let Some(m) = &self.vision_model {
            cfg.vision_model = m.clone();
        }
        if let Some(m) = &self.research_model {
            cfg.research_model = m.clone();
        }
        if let Some(m) = &self.synthesis_model {
            cfg.synthesis_model = m.clone();
        }
        if let Some(t) = self.timeout_secs {
            cfg.stage_timeout_secs = t;
        }
        if let Some(r) = self.retries {
            cfg.retries = r;
        }
        if let Some(o) = &self.output {
            cfg.output_path = o.clone();
        }
    }
}

/// Assemble one request's preferences from the flags. A missing photo is
/// left as `None` so the pipeline reports it as `MissingInput` with the
/// stage-specific message.
pub fn collect_preferences(args: &Args) -> Result<GardenPreferences, PipelineError> {
    let image = match &args.image {
        Some(path) => {
            let bytes = fs::read(path).map_err(|e| {
                PipelineError::MissingInput(format!("could not read garden photo {path}: {e}"))
            })?;
            Some(ImagePayload::from_bytes(Bytes::from(bytes))?)
        }
        None => None,
    };
    Ok(GardenPreferences {
        image,
        lighting: args.lighting,
        climate: args.climate,
        garden_use: args.garden_use,
        watering: args.watering,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn base_args(image: Option<String>) -> Args {
        Args::parse_from(
            ["greenprint"]
                .into_iter()
                .map(String::from)
                .chain(image.into_iter().flat_map(|p| vec!["--image".to_string(), p])),
        )
    }

    #[test]
    fn defaults_match_the_original_preselected_options() {
        let args = base_args(None);
        assert_eq!(args.lighting, Lighting::FullSun);
        assert_eq!(args.climate, Climate::Temperate);
        assert_eq!(args.garden_use, GardenUse::Relaxation);
        assert_eq!(args.watering, Watering::Moderate);
    }

    #[test]
    fn collect_reads_the_photo_from_disk() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10]).unwrap();
        let args = base_args(Some(f.path().to_string_lossy().into_owned()));
        let prefs = collect_preferences(&args).unwrap();
        assert!(prefs.image.is_some());
    }

    #[test]
    fn model_flags_overlay_the_config() {
        let args = Args::parse_from([
            "greenprint",
            "--vision-model",
            "gpt-4o-mini",
            "--synthesis-model",
            "o4-mini",
            "--timeout-secs",
            "30",
        ]);
        let mut cfg = crate::config::Config::default();
        args.overlay(&mut cfg);
        assert_eq!(cfg.vision_model, "gpt-4o-mini");
        assert_eq!(cfg.synthesis_model, "o4-mini");
        assert_eq!(cfg.stage_timeout_secs, 30);
        // untouched flags keep their config values
        assert_eq!(cfg.research_model, "gpt-4o");
    }

    #[test]
    fn unreadable_photo_is_missing_input() {
        let args = base_args(Some("/nonexistent/garden.jpg".into()));
        let err = collect_preferences(&args).unwrap_err();
        assert!(matches!(err, PipelineError::MissingInput(_)));
    }
}
