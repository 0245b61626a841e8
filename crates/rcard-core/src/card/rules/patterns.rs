//! Common regex patterns for reservation card extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Email pattern (local@domain.tld)
    pub static ref EMAIL: Regex = Regex::new(
        r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}"
    ).unwrap();

    // Japanese phone shape anchored at a candidate start: 0 plus a non-zero
    // digit (00 is an international prefix), then digit groups with optional
    // separators. Digit count and boundaries are checked by the phone extractor.
    pub static ref PHONE_PREFIX: Regex = Regex::new(
        r"^0[1-9][0-9]{0,3}(?:[-‐－ー−―ｰ 　()（）]{0,2}[0-9]{1,4}){1,3}"
    ).unwrap();

    // YYYY.M.D / YYYY/MM/DD / YYYY-M-DD
    pub static ref DATE_YMD: Regex = Regex::new(
        r"([0-9]{4})[./\-]([0-9]{1,2})[./\-]([0-9]{1,2})"
    ).unwrap();

    pub static ref FOUR_DIGITS: Regex = Regex::new(r"[0-9]{4}").unwrap();

    pub static ref DIGIT_RUN: Regex = Regex::new(r"[0-9]+").unwrap();

    // Label residue left at the start of a value: colons, separators, spaces.
    pub static ref LEADING_PUNCT: Regex = Regex::new(
        r"^[\s:：;；,、・\-－=＝]+"
    ).unwrap();

    // Honorifics written after a guest name.
    pub static ref NAME_HONORIFIC: Regex = Regex::new(
        r"[\s]*(?:様|殿|さま)$"
    ).unwrap();
}

/// Whether the match at `start..end` is not glued to other ASCII digits.
pub(crate) fn is_digit_bounded(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(|c| c.is_ascii_digit()) && !after.is_some_and(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_pattern() {
        let m = EMAIL.find("連絡先 taro.tanaka@example.co.jp まで").unwrap();
        assert_eq!(m.as_str(), "taro.tanaka@example.co.jp");
    }

    #[test]
    fn test_date_pattern_separators() {
        for text in ["2024/05/01", "2024-5-1", "2024.05.1"] {
            assert!(DATE_YMD.is_match(text), "{}", text);
        }
        assert!(!DATE_YMD.is_match("24/05/01"));
    }

    #[test]
    fn test_digit_bounded() {
        let text = "12024/05/01";
        assert!(!is_digit_bounded(text, 1, text.len()));
        assert!(is_digit_bounded("到着2024/05/01", 6, 16));
    }

    #[test]
    fn test_leading_punct() {
        assert_eq!(LEADING_PUNCT.replace("：　田中", ""), "田中");
        assert_eq!(LEADING_PUNCT.replace(": 090", ""), "090");
    }
}
