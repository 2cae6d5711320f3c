use bytes::Bytes;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::errors::PipelineError;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Lighting {
    FullSun,
    PartialSun,
    DappledLight,
    MostlyShaded,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Climate {
    Tropical,
    Subtropical,
    Temperate,
    Arid,
    Mountainous,
    Coastal,
    NotSure,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GardenUse {
    Relaxation,
    FoodGrowing,
    PlayArea,
    Entertaining,
    MultiPurpose,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Watering {
    Low,
    Moderate,
    High,
}

impl std::fmt::Display for Lighting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Lighting::FullSun => "Full sun",
            Lighting::PartialSun => "Partial sun",
            Lighting::DappledLight => "Dappled light",
            Lighting::MostlyShaded => "Mostly shaded",
        })
    }
}

impl std::fmt::Display for Climate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Climate::Tropical => "Tropical",
            Climate::Subtropical => "Subtropical",
            Climate::Temperate => "Temperate",
            Climate::Arid => "Arid/Desert",
            Climate::Mountainous => "Mountainous",
            Climate::Coastal => "Coastal",
            Climate::NotSure => "Not sure",
        })
    }
}

impl std::fmt::Display for GardenUse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            GardenUse::Relaxation => "Relaxation/sitting area",
            GardenUse::FoodGrowing => "Food growing (herbs/vegetables)",
            GardenUse::PlayArea => "Kids or pet play area",
            GardenUse::Entertaining => "Entertaining guests",
            GardenUse::MultiPurpose => "Multi-purpose",
        })
    }
}

impl std::fmt::Display for Watering {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Watering::Low => "Low (drought-tolerant)",
            Watering::Moderate => "Moderate",
            Watering::High => "High (lush garden)",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

impl ImageFormat {
    pub fn mime(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
        }
    }
}

/// Raw photo bytes forwarded to the vision model. The only inspection done
/// here is a magic-byte sniff so undecodable files are rejected before any
/// outbound call.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    pub bytes: Bytes,
    pub format: ImageFormat,
}

impl ImagePayload {
    pub fn from_bytes(bytes: Bytes) -> Result<Self, PipelineError> {
        let format = sniff_format(&bytes).ok_or_else(|| {
            PipelineError::MissingInput("garden photo is not a decodable jpg/png image".into())
        })?;
        Ok(Self { bytes, format })
    }
}

fn sniff_format(bytes: &[u8]) -> Option<ImageFormat> {
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some(ImageFormat::Jpeg);
    }
    if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Some(ImageFormat::Png);
    }
    None
}

/// One report request's worth of user input. Immutable once handed to the
/// pipeline; nothing is retained past the current report.
#[derive(Debug, Clone)]
pub struct GardenPreferences {
    pub image: Option<ImagePayload>,
    pub lighting: Lighting,
    pub climate: Climate,
    pub garden_use: GardenUse,
    pub watering: Watering,
}

impl GardenPreferences {
    /// Checked before any external call is attempted.
    pub fn validate(&self) -> Result<&ImagePayload, PipelineError> {
        match &self.image {
            Some(img) if !img.bytes.is_empty() => Ok(img),
            Some(_) => Err(PipelineError::MissingInput("garden photo is empty".into())),
            None => Err(PipelineError::MissingInput(
                "upload a garden photo before generating the report".into(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JPEG_HEADER: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00];

    #[test]
    fn sniffs_jpeg_and_png() {
        let jpg = ImagePayload::from_bytes(Bytes::from_static(JPEG_HEADER)).unwrap();
        assert_eq!(jpg.format, ImageFormat::Jpeg);
        assert_eq!(jpg.format.mime(), "image/jpeg");

        let png = ImagePayload::from_bytes(Bytes::from_static(PNG_HEADER)).unwrap();
        assert_eq!(png.format, ImageFormat::Png);
    }

    #[test]
    fn rejects_undecodable_bytes() {
        let err = ImagePayload::from_bytes(Bytes::from_static(b"GIF89a...")).unwrap_err();
        assert!(matches!(err, PipelineError::MissingInput(_)));
    }

    #[test]
    fn validate_requires_an_image() {
        let prefs = GardenPreferences {
            image: None,
            lighting: Lighting::FullSun,
            climate: Climate::Temperate,
            garden_use: GardenUse::Relaxation,
            watering: Watering::Moderate,
        };
        assert!(matches!(
            prefs.validate(),
            Err(PipelineError::MissingInput(_))
        ));
    }

    #[test]
    fn labels_match_the_selector_options() {
        assert_eq!(Climate::Arid.to_string(), "Arid/Desert");
        assert_eq!(Watering::Low.to_string(), "Low (drought-tolerant)");
        assert_eq!(
            GardenUse::FoodGrowing.to_string(),
            "Food growing (herbs/vegetables)"
        );
    }
}
