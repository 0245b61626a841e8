//! Final cleanup of extracted values.

use crate::models::record::FieldKey;

use super::headers::strip_all_headers;
use super::patterns::{LEADING_PUNCT, NAME_HONORIFIC};

/// Remove residual labels, leading punctuation and, for names, honorifics.
pub fn clean_value(key: FieldKey, value: &str) -> String {
    let stripped = strip_all_headers(value);
    let stripped = LEADING_PUNCT.replace(stripped.trim(), "");
    let mut cleaned = stripped.trim().to_string();

    if key == FieldKey::Name {
        cleaned = NAME_HONORIFIC.replace(&cleaned, "").trim().to_string();
    }

    cleaned
}
