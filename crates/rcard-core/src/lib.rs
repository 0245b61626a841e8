//! Core library for hotel reservation card OCR.
//!
//! This crate provides:
//! - Field extraction from OCR text of Japanese/English reservation cards
//!   (header scan, prefecture fallback, phone/email/date patterns)
//! - A document guard warning about text that does not look like a card
//! - Image enhancement before OCR (grayscale, denoise, CLAHE)
//! - A Google Cloud Vision text detection client (`vision` feature)
//! - Row models for the reservation sheet and the OCR log sheet

pub mod card;
pub mod error;
pub mod models;
pub mod ocr;

pub use card::{
    extract, looks_like_reservation_card, CardParser, ExtractionResult, LineSequence,
    RecordExtractor, RuleBasedCardParser,
};
pub use error::{CardError, OcrError, PreprocessError, Result};
pub use models::config::{CardConfig, DateOrder};
pub use models::record::{ExtractedRecord, FieldKey};
pub use models::sheet::{OcrLogRow, SheetRow};
pub use ocr::{CardPreprocessor, OcrProvider, OcrText};
#[cfg(feature = "vision")]
pub use ocr::VisionClient;
