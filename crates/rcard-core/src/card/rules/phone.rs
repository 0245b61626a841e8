//! Japanese phone number detection over free text.

use super::patterns::{is_digit_bounded, DIGIT_RUN, PHONE_PREFIX};
use super::{ExtractionMatch, FieldExtractor};

/// Smallest and largest digit count of a domestic number.
const MIN_DIGITS: usize = 9;
const MAX_DIGITS: usize = 11;

/// Phone number extractor.
#[derive(Debug, Default)]
pub struct PhoneExtractor;

impl PhoneExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Match a phone number starting exactly at `start`.
    fn match_at(&self, text: &str, start: usize) -> Option<ExtractionMatch<String>> {
        let shape = PHONE_PREFIX.find(&text[start..])?;
        let candidate = shape.as_str();

        // Longest run of digit groups whose digit count fits; trailing groups
        // may belong to a neighbouring number.
        let mut digits = 0;
        let mut best = None;
        for run in DIGIT_RUN.find_iter(candidate) {
            digits += run.len();
            if digits > MAX_DIGITS {
                break;
            }
            if digits >= MIN_DIGITS {
                best = Some(run.end());
            }
        }

        let end = start + best?;
        if !is_digit_bounded(text, start, end) {
            return None;
        }
        let value = &text[start..end];
        Some(ExtractionMatch::new(value.to_string(), start, end, value))
    }
}

impl FieldExtractor for PhoneExtractor {
    type Output = ExtractionMatch<String>;

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();
        let mut resume = 0;

        for (i, c) in text.char_indices() {
            if i < resume || c != '0' {
                continue;
            }
            if text[..i].chars().next_back().is_some_and(|p| p.is_ascii_digit()) {
                continue;
            }
            if let Some(found) = self.match_at(text, i) {
                resume = found.position.1;
                results.push(found);
            }
        }

        results
    }
}

/// Extract the first phone number from text.
pub fn extract_phone(text: &str) -> Option<String> {
    PhoneExtractor::new().extract(text).map(|m| m.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mobile_number() {
        assert_eq!(
            extract_phone("電話 090-1234-5678").as_deref(),
            Some("090-1234-5678")
        );
    }

    #[test]
    fn test_landline_and_compact_forms() {
        assert_eq!(extract_phone("TEL 098(861)1234").as_deref(), Some("098(861)1234"));
        assert_eq!(extract_phone("09012345678").as_deref(), Some("09012345678"));
        assert_eq!(extract_phone("03 1234 5678").as_deref(), Some("03 1234 5678"));
    }

    #[test]
    fn test_rejects_short_and_embedded_numbers() {
        assert_eq!(extract_phone("部屋 0123"), None);
        assert_eq!(extract_phone("2024-05-01"), None);
        assert_eq!(extract_phone("123090-1234-5678"), None);
    }

    #[test]
    fn test_postal_code_is_not_a_phone() {
        let text = "〒900-0001 沖縄県那覇市 098-123-4567";
        assert_eq!(extract_phone(text).as_deref(), Some("098-123-4567"));
    }

    #[test]
    fn test_trailing_number_is_not_swallowed() {
        assert_eq!(
            extract_phone("090-1234-5678 2024").as_deref(),
            Some("090-1234-5678")
        );
    }
}
