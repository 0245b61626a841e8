//! Email address detection.

use super::patterns::EMAIL;
use super::{ExtractionMatch, FieldExtractor};

/// Email extractor.
#[derive(Debug, Default)]
pub struct EmailExtractor;

impl EmailExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl FieldExtractor for EmailExtractor {
    type Output = ExtractionMatch<String>;

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        EMAIL
            .find_iter(text)
            .map(|m| ExtractionMatch::new(m.as_str().to_string(), m.start(), m.end(), m.as_str()))
            .collect()
    }
}
