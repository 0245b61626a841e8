//! Rule-based field recognizers for reservation cards.

pub mod clean;
pub mod dates;
pub mod email;
pub mod headers;
pub mod patterns;
pub mod phone;
pub mod prefectures;
pub mod validators;

pub use clean::clean_value;
pub use dates::{assign_dates, DateExtractor};
pub use email::EmailExtractor;
pub use headers::{match_header, matches_other_header, strip_all_headers, HeaderPattern, HeaderToken};
pub use phone::PhoneExtractor;
pub use prefectures::{PrefectureExtractor, PREFECTURES};
pub use validators::{accepts, validator_for, Validator};

/// Trait for pattern-based fallback extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the first occurrence of the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    /// Extract all occurrences of the field, in document order.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// A value found in text together with where it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Byte range in the source text.
    pub position: (usize, usize),
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, start: usize, end: usize, source: impl Into<String>) -> Self {
        Self {
            value,
            position: (start, end),
            source: source.into(),
        }
    }
}
