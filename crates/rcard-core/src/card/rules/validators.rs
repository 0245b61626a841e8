//! Candidate validators for the header scan.
//!
//! A validator rejects lines that obviously cannot be the value of a field,
//! e.g. a line without digits below an "Age" header.

use crate::models::record::FieldKey;

use super::patterns::FOUR_DIGITS;

/// Predicate over a candidate line.
pub type Validator = fn(&str) -> bool;

/// The validator for `key`, if the field has one.
///
/// Name and Address accept any non-header line.
pub fn validator_for(key: FieldKey) -> Option<Validator> {
    match key {
        FieldKey::Name | FieldKey::Address => None,
        FieldKey::Age => Some(has_digit),
        FieldKey::Occupation => Some(is_not_all_digits),
        FieldKey::Phone => Some(has_phone_digit_count),
        FieldKey::Email => Some(has_at_sign),
        FieldKey::CheckinDate | FieldKey::CheckoutDate => Some(has_year),
    }
}

/// Whether `candidate` is acceptable as a value for `key`.
pub fn accepts(key: FieldKey, candidate: &str) -> bool {
    validator_for(key).is_none_or(|v| v(candidate))
}

/// Number of ASCII digits in `text`.
pub fn digit_count(text: &str) -> usize {
    text.chars().filter(|c| c.is_ascii_digit()).count()
}

fn has_digit(candidate: &str) -> bool {
    candidate.chars().any(|c| c.is_ascii_digit())
}

fn is_not_all_digits(candidate: &str) -> bool {
    !candidate.chars().all(|c| c.is_ascii_digit())
}

fn has_phone_digit_count(candidate: &str) -> bool {
    digit_count(candidate) >= 9
}

fn has_at_sign(candidate: &str) -> bool {
    candidate.contains('@')
}

fn has_year(candidate: &str) -> bool {
    FOUR_DIGITS.is_match(candidate)
}
