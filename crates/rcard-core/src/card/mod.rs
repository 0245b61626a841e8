//! Reservation card field extraction.

pub mod extractor;
pub mod guard;
mod parser;
pub mod rules;
pub mod tokenizer;

pub use extractor::{extract, Extraction, RecordExtractor, ValueSource};
pub use guard::{keyword_count, looks_like_reservation_card};
pub use parser::{CardParser, ExtractionResult, RuleBasedCardParser};
pub use tokenizer::{tokenize, LineSequence};
