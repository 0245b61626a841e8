//! OCR collaborators: image enhancement and the text-detection provider.

mod preprocessing;
#[cfg(feature = "vision")]
mod vision;

pub use preprocessing::{save_enhanced, CardPreprocessor};
#[cfg(feature = "vision")]
pub use vision::{parse_response, VisionClient};

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::OcrError;

/// Full text returned by an OCR provider, in reading order with lines
/// separated by newlines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrText {
    pub text: String,
}

impl OcrText {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Whether the provider found no text at all.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Source of OCR text for an encoded image.
pub trait OcrProvider {
    /// Recognize the text in an encoded image (JPEG or PNG bytes).
    fn recognize(&self, image: &[u8]) -> impl Future<Output = Result<OcrText, OcrError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{CardParser, RuleBasedCardParser};

    struct FixedText(&'static str);

    impl OcrProvider for FixedText {
        async fn recognize(&self, _image: &[u8]) -> Result<OcrText, OcrError> {
            Ok(OcrText::new(self.0))
        }
    }

    struct Unreachable;

    impl OcrProvider for Unreachable {
        async fn recognize(&self, _image: &[u8]) -> Result<OcrText, OcrError> {
            Err(OcrError::Request("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_provider_output_feeds_parser() {
        let parser = RuleBasedCardParser::new();

        let outcome = FixedText("氏名\n山田花子\n年齢\n28").recognize(b"jpeg").await;
        let result = parser.parse_ocr_outcome(outcome);
        assert_eq!(result.record.name, "山田花子");
        assert_eq!(result.record.age, "28");

        let outcome = Unreachable.recognize(b"jpeg").await;
        let result = parser.parse_ocr_outcome(outcome);
        assert!(result.record.name.is_empty());
        assert!(result.warnings[0].contains("connection refused"));
    }

    #[test]
    fn test_blank_text() {
        assert!(OcrText::new(" \n ").is_blank());
        assert!(!OcrText::new("氏名").is_blank());
    }
}
