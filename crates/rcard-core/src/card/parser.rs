//! Card parser: tokenizer, extractor and document guard in one call.

use std::collections::BTreeMap;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::OcrError;
use crate::models::config::ExtractionConfig;
use crate::models::record::{ExtractedRecord, FieldKey};
use crate::ocr::OcrText;

use super::extractor::{RecordExtractor, ValueSource};
use super::guard::{looks_like_reservation_card, DEFAULT_MIN_KEYWORDS};
use super::tokenizer::{tokenize, LineSequence};

/// Result of parsing one card.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    /// Extracted fields.
    pub record: ExtractedRecord,
    /// Where each filled field came from.
    pub sources: BTreeMap<FieldKey, ValueSource>,
    /// Tokenized OCR lines.
    pub lines: LineSequence,
    /// Raw OCR text.
    pub raw_text: String,
    /// Whether the text looks like a reservation card.
    pub looks_like_card: bool,
    /// Messages for the operator.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

impl ExtractionResult {
    /// Fields the operator has to fill in by hand.
    pub fn missing_fields(&self) -> Vec<FieldKey> {
        self.record.missing_fields()
    }
}

/// Trait for card parsing.
pub trait CardParser {
    /// Parse a card from OCR text. Parsing never fails; unresolved fields are
    /// left empty.
    fn parse(&self, text: &str) -> ExtractionResult;

    /// Parse the outcome of an OCR call.
    ///
    /// A failed OCR call yields an empty record with a warning instead of an
    /// error, so the operator can still fill the form by hand.
    fn parse_ocr_outcome(
        &self,
        outcome: std::result::Result<OcrText, OcrError>,
    ) -> ExtractionResult {
        match outcome {
            Ok(ocr) => {
                let mut result = self.parse(&ocr.text);
                if ocr.text.trim().is_empty() {
                    result.warnings.insert(0, "OCR returned no text".to_string());
                }
                result
            }
            Err(e) => {
                warn!("OCR failed: {}", e);
                let mut result = self.parse("");
                result.warnings.insert(0, format!("OCR failed: {}", e));
                result
            }
        }
    }
}

/// Rule-based parser built from the header scan and pattern fallbacks.
#[derive(Debug, Clone)]
pub struct RuleBasedCardParser {
    extractor: RecordExtractor,
    /// Minimum keyword count for the document guard.
    guard_min_keywords: usize,
}

impl RuleBasedCardParser {
    /// Create a new parser with default settings.
    pub fn new() -> Self {
        Self {
            extractor: RecordExtractor::new(),
            guard_min_keywords: DEFAULT_MIN_KEYWORDS,
        }
    }

    /// Create a parser from configuration.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            extractor: RecordExtractor::from_config(config),
            guard_min_keywords: config.guard_min_keywords,
        }
    }

    /// Replace the record extractor.
    pub fn with_extractor(mut self, extractor: RecordExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Set the guard threshold.
    pub fn with_guard_min_keywords(mut self, min_keywords: usize) -> Self {
        self.guard_min_keywords = min_keywords;
        self
    }
}

impl Default for RuleBasedCardParser {
    fn default() -> Self {
        Self::new()
    }
}

impl CardParser for RuleBasedCardParser {
    fn parse(&self, text: &str) -> ExtractionResult {
        let start = Instant::now();
        let mut warnings = Vec::new();

        info!("Parsing card from {} characters of text", text.len());

        let looks_like_card = looks_like_reservation_card(text, self.guard_min_keywords);
        if !looks_like_card && !text.trim().is_empty() {
            warn!("Text does not look like a reservation card");
            warnings.push(
                "This document may not be a reservation card, or its layout differs a lot"
                    .to_string(),
            );
        }

        let lines = tokenize(text);
        debug!("Tokenized {} lines", lines.len());

        let extraction = self.extractor.extract_traced(&lines, text);

        for key in extraction.record.missing_fields() {
            warnings.push(format!("Could not extract {}", key));
        }

        debug!(
            "Extracted {}/8 fields",
            8 - extraction.record.missing_fields().len()
        );

        ExtractionResult {
            record: extraction.record,
            sources: extraction.sources,
            lines,
            raw_text: text.to_string(),
            looks_like_card,
            warnings,
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CARD: &str = "宿泊カード\n氏名\n田中太郎\n年齢\n35\n職業\n会社員\n住所\n沖縄県那覇市1-2-3\n\
                        電話番号\n090-1234-5678\nメール\ntaro@example.jp\n\
                        チェックイン\n2024/05/01\nチェックアウト\n2024/05/03";

    #[test]
    fn test_parse_full_card() {
        let result = RuleBasedCardParser::new().parse(CARD);
        let r = &result.record;

        assert_eq!(r.name, "田中太郎");
        assert_eq!(r.age, "35");
        assert_eq!(r.occupation, "会社員");
        assert_eq!(r.address, "沖縄県那覇市1-2-3");
        assert_eq!(r.phone, "090-1234-5678");
        assert_eq!(r.email, "taro@example.jp");
        assert_eq!(r.checkin_date, "2024/05/01");
        assert_eq!(r.checkout_date, "2024/05/03");
        assert!(result.looks_like_card);
        assert!(result.warnings.is_empty());
        assert_eq!(result.lines.len(), 17);
    }

    #[test]
    fn test_missing_fields_are_warned() {
        let result = RuleBasedCardParser::new().parse("氏名\n田中太郎\n住所");
        assert!(result.missing_fields().contains(&FieldKey::Email));
        assert!(result.warnings.iter().any(|w| w.contains("メールアドレス")));
    }

    #[test]
    fn test_non_card_is_warned_but_parsed() {
        let result = RuleBasedCardParser::new().parse("領収書\ninfo@shop.example.com");
        assert!(!result.looks_like_card);
        assert!(result.warnings[0].contains("reservation card"));
        assert_eq!(result.record.email, "info@shop.example.com");
    }

    #[test]
    fn test_ocr_failure_gives_empty_record() {
        let parser = RuleBasedCardParser::new();
        let result = parser.parse_ocr_outcome(Err(OcrError::Api("quota exceeded".to_string())));

        assert_eq!(result.record, ExtractedRecord::new());
        assert!(result.warnings[0].contains("quota exceeded"));
        assert_eq!(result.missing_fields().len(), 8);
    }

    #[test]
    fn test_empty_ocr_text() {
        let parser = RuleBasedCardParser::new();
        let result = parser.parse_ocr_outcome(Ok(OcrText::new("")));

        assert_eq!(result.record, ExtractedRecord::new());
        assert_eq!(result.warnings[0], "OCR returned no text");
    }
}
