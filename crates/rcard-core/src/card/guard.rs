//! Document-type guard: does the OCR text look like a reservation card?

/// Words that appear on reservation cards.
pub const CARD_KEYWORDS: &[&str] = &[
    "氏名", "名前", "Name", "Guest",
    "住所", "Address", "住 所",
    "電話", "Tel", "Phone", "Mobile",
    "チェックイン", "Check-in",
    "チェックアウト", "Check-out",
    "メール", "Email", "E-mail",
    "宿泊", "Stay", "泊",
    "署名", "Signature", "Sign",
    "Age", "年齢",
];

/// Default number of keywords required.
pub const DEFAULT_MIN_KEYWORDS: usize = 2;

/// Number of distinct card keywords occurring in `text`.
pub fn keyword_count(text: &str) -> usize {
    CARD_KEYWORDS.iter().filter(|kw| text.contains(*kw)).count()
}

/// Whether `text` contains at least `min_keywords` card keywords.
///
/// A `false` result is only a warning for the operator; extraction still
/// runs.
pub fn looks_like_reservation_card(text: &str, min_keywords: usize) -> bool {
    keyword_count(text) >= min_keywords
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_text_passes() {
        assert!(looks_like_reservation_card("氏名\n田中\n住所\n沖縄県", DEFAULT_MIN_KEYWORDS));
    }

    #[test]
    fn test_receipt_text_fails() {
        let receipt = "領収書\n合計 3,300円\nありがとうございました";
        assert!(!looks_like_reservation_card(receipt, DEFAULT_MIN_KEYWORDS));
        assert!(!looks_like_reservation_card("", DEFAULT_MIN_KEYWORDS));
    }

    #[test]
    fn test_keywords_are_counted_once() {
        assert_eq!(keyword_count("氏名 氏名 氏名"), 1);
        // "Signature" also contains "Sign".
        assert_eq!(keyword_count("Signature"), 2);
    }

    #[test]
    fn test_threshold_is_configurable() {
        assert!(looks_like_reservation_card("宿泊", 1));
        assert!(!looks_like_reservation_card("宿泊", 3));
    }
}
