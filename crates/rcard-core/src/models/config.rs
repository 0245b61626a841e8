//! Configuration structures for the card pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::sheet::MAX_LOG_LINES;
use crate::error::CardError;

/// Main configuration for the rcard pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CardConfig {
    /// OCR provider configuration.
    pub ocr: OcrConfig,

    /// Image enhancement configuration.
    pub preprocess: PreprocessConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Workbook output configuration.
    pub sheets: SheetConfig,
}

/// OCR provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Annotate endpoint of the Vision API.
    pub endpoint: String,

    /// API key. When unset the key is read from `api_key_env`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Environment variable holding the API key.
    pub api_key_env: String,

    /// Language hints sent with every request.
    pub language_hints: Vec<String>,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://vision.googleapis.com/v1/images:annotate".to_string(),
            api_key: None,
            api_key_env: "GOOGLE_VISION_API_KEY".to_string(),
            language_hints: vec!["ja".to_string(), "en".to_string()],
            timeout_secs: 60,
        }
    }
}

impl OcrConfig {
    /// Resolve the API key from the config or the environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|k| !k.trim().is_empty())
    }
}

/// Image enhancement configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Enhance images before OCR.
    pub enabled: bool,

    /// Gaussian blur sigma for denoising (0 disables).
    pub denoise_sigma: f32,

    /// CLAHE clip limit, relative to the uniform histogram height.
    pub clahe_clip_limit: f32,

    /// CLAHE tile grid size (tiles per side).
    pub clahe_tile_grid: u32,

    /// JPEG quality of the re-encoded image.
    pub jpeg_quality: u8,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            denoise_sigma: 1.0,
            clahe_clip_limit: 3.0,
            clahe_tile_grid: 8,
            jpeg_quality: 90,
        }
    }
}

/// How detected dates are assigned to check-in and check-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateOrder {
    /// First date in the text is check-in, second is check-out.
    #[default]
    Document,
    /// Dates are sorted by calendar value before assignment.
    Calendar,
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// How many lines below a header are scanned for its value. Values
    /// above 8 are capped at 8.
    pub lookahead: usize,

    /// Date role assignment policy.
    pub date_order: DateOrder,

    /// Minimum number of card keywords before the text is trusted as a card.
    pub guard_min_keywords: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            lookahead: 8,
            date_order: DateOrder::Document,
            guard_min_keywords: 2,
        }
    }
}

/// Workbook output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    /// Primary sheet (one row per card).
    pub primary_path: PathBuf,

    /// Raw OCR log sheet.
    pub log_path: PathBuf,

    /// Maximum OCR line cells per log row.
    pub max_log_lines: usize,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            primary_path: PathBuf::from("reservations.csv"),
            log_path: PathBuf::from("ocr_log.csv"),
            max_log_lines: MAX_LOG_LINES,
        }
    }
}

impl CardConfig {
    /// Load and validate configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject settings that would silently disable part of the pipeline.
    pub fn validate(&self) -> crate::Result<()> {
        if self.extraction.lookahead == 0 {
            return Err(CardError::Config(
                "extraction.lookahead must be at least 1".to_string(),
            ));
        }
        if self.sheets.max_log_lines == 0 {
            return Err(CardError::Config(
                "sheets.max_log_lines must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
