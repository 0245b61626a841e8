//! Header (label) patterns printed on reservation cards.
//!
//! Japanese tokens are matched anywhere in a line. Latin tokens are matched
//! case-insensitively and only as whole words: the surrounding characters must
//! not continue a word or an email address, so "Manager" does not contain the
//! "Age" header and "taro@mail.com" does not contain "Mail".

use std::ops::Range;

use lazy_static::lazy_static;

use crate::models::record::FieldKey;

/// A single header token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderToken {
    /// Japanese label, matched as a literal substring.
    Cjk(&'static str),
    /// Latin label, matched case-insensitively as a whole word.
    Latin(&'static str),
}

impl HeaderToken {
    fn text(self) -> &'static str {
        match self {
            HeaderToken::Cjk(t) | HeaderToken::Latin(t) => t,
        }
    }

    /// Byte ranges where this token occurs in `line`.
    pub fn spans(self, line: &str) -> Vec<Range<usize>> {
        match self {
            HeaderToken::Cjk(token) => line
                .match_indices(token)
                .map(|(start, m)| start..start + m.len())
                .collect(),
            HeaderToken::Latin(token) => {
                // ASCII lowercasing keeps byte offsets intact.
                let haystack = line.to_ascii_lowercase();
                let needle = token.to_ascii_lowercase();
                haystack
                    .match_indices(&needle)
                    .map(|(start, m)| start..start + m.len())
                    .filter(|r| is_word_boundary(line, r.start, r.end))
                    .collect()
            }
        }
    }
}

fn is_word_boundary(line: &str, start: usize, end: usize) -> bool {
    let before = line[..start].chars().next_back();
    let mut rest = line[end..].chars();
    let after = rest.next();

    let before_ok = !before.is_some_and(|c| c.is_ascii_alphanumeric() || "@._-+".contains(c));
    let after_ok = match after {
        None => true,
        // "Tel." is a label, "mail.com" is not.
        Some('.') => !rest.next().is_some_and(|c| c.is_ascii_alphanumeric()),
        Some(c) => !(c.is_ascii_alphanumeric() || "@_-+".contains(c)),
    };
    before_ok && after_ok
}

use HeaderToken::{Cjk, Latin};

const NAME_TOKENS: &[HeaderToken] = &[
    Cjk("お名前"),
    Cjk("ご氏名"),
    Cjk("氏名"),
    Cjk("名前"),
    Latin("Guest Name"),
    Latin("Name"),
];

const AGE_TOKENS: &[HeaderToken] = &[Cjk("年齢"), Latin("Age")];

const OCCUPATION_TOKENS: &[HeaderToken] = &[
    Cjk("ご職業"),
    Cjk("職業"),
    Latin("Occupation"),
    Latin("Job"),
];

const ADDRESS_TOKENS: &[HeaderToken] = &[
    Cjk("ご住所"),
    Cjk("住所"),
    Cjk("住 所"),
    Latin("Address"),
];

const PHONE_TOKENS: &[HeaderToken] = &[
    Cjk("電話番号"),
    Cjk("携帯電話"),
    Cjk("電話"),
    Latin("Mobile"),
    Latin("Phone"),
    Latin("Cell"),
    Latin("Tel"),
];

const EMAIL_TOKENS: &[HeaderToken] = &[
    Cjk("メールアドレス"),
    Cjk("メール"),
    Latin("E-mail"),
    Latin("Email"),
    Latin("Mail"),
];

const CHECKIN_TOKENS: &[HeaderToken] = &[
    Cjk("チェックイン日"),
    Cjk("チェックイン"),
    Cjk("到着日"),
    Latin("Check-in"),
    Latin("Check in"),
];

const CHECKOUT_TOKENS: &[HeaderToken] = &[
    Cjk("チェックアウト日"),
    Cjk("チェックアウト"),
    Cjk("出発日"),
    Latin("Check-out"),
    Latin("Check out"),
];

/// Header tokens recognized for one field.
#[derive(Debug, Clone, Copy)]
pub struct HeaderPattern {
    pub key: FieldKey,
    pub tokens: &'static [HeaderToken],
}

impl HeaderPattern {
    /// The static pattern for `key`.
    pub fn for_key(key: FieldKey) -> Self {
        let tokens = match key {
            FieldKey::Name => NAME_TOKENS,
            FieldKey::Age => AGE_TOKENS,
            FieldKey::Occupation => OCCUPATION_TOKENS,
            FieldKey::Address => ADDRESS_TOKENS,
            FieldKey::Phone => PHONE_TOKENS,
            FieldKey::Email => EMAIL_TOKENS,
            FieldKey::CheckinDate => CHECKIN_TOKENS,
            FieldKey::CheckoutDate => CHECKOUT_TOKENS,
        };
        Self { key, tokens }
    }

    /// Whether any token of this pattern occurs in `line`.
    pub fn matches(&self, line: &str) -> bool {
        self.tokens.iter().any(|t| !t.spans(line).is_empty())
    }

    /// Remove this pattern's tokens from `line`.
    pub fn strip(&self, line: &str) -> String {
        strip_tokens(line, self.tokens.iter().copied())
    }
}

lazy_static! {
    /// Every header token of every field, longest first.
    static ref ALL_TOKENS: Vec<HeaderToken> = {
        let mut tokens: Vec<HeaderToken> = FieldKey::ALL
            .iter()
            .flat_map(|k| HeaderPattern::for_key(*k).tokens.iter().copied())
            .collect();
        tokens.sort_by_key(|t| std::cmp::Reverse(t.text().chars().count()));
        tokens
    };
}

/// The anchor key for a line: the first key in header priority whose pattern
/// matches.
pub fn match_header(line: &str) -> Option<FieldKey> {
    FieldKey::HEADER_PRIORITY
        .into_iter()
        .find(|k| HeaderPattern::for_key(*k).matches(line))
}

/// Whether the line carries the header of any field other than `key`.
pub fn matches_other_header(line: &str, key: FieldKey) -> bool {
    FieldKey::HEADER_PRIORITY
        .into_iter()
        .any(|k| k != key && HeaderPattern::for_key(k).matches(line))
}

/// Remove every field's header tokens from `text`.
pub fn strip_all_headers(text: &str) -> String {
    strip_tokens(text, ALL_TOKENS.iter().copied())
}

fn strip_tokens(text: &str, tokens: impl Iterator<Item = HeaderToken>) -> String {
    let mut tokens: Vec<HeaderToken> = tokens.collect();
    tokens.sort_by_key(|t| std::cmp::Reverse(t.text().chars().count()));

    let mut out = text.to_string();
    for token in tokens {
        let spans = token.spans(&out);
        if spans.is_empty() {
            continue;
        }
        let mut rebuilt = String::with_capacity(out.len());
        let mut last = 0;
        for span in spans {
            rebuilt.push_str(&out[last..span.start]);
            last = span.end;
        }
        rebuilt.push_str(&out[last..]);
        out = rebuilt;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_japanese_headers() {
        assert_eq!(match_header("氏名"), Some(FieldKey::Name));
        assert_eq!(match_header("ご住所"), Some(FieldKey::Address));
        assert_eq!(match_header("電話番号"), Some(FieldKey::Phone));
        assert_eq!(match_header("チェックアウト日"), Some(FieldKey::CheckoutDate));
        assert_eq!(match_header("田中太郎"), None);
    }

    #[test]
    fn test_latin_headers_are_case_insensitive_words() {
        assert_eq!(match_header("GUEST NAME"), Some(FieldKey::Name));
        assert_eq!(match_header("Tel."), Some(FieldKey::Phone));
        assert_eq!(match_header("Check-out"), Some(FieldKey::CheckoutDate));
        assert_eq!(match_header("Manager"), None);
        assert_eq!(match_header("taro@mail.com"), None);
        assert_eq!(match_header("hotel"), None);
    }

    #[test]
    fn test_priority_breaks_ties() {
        // Matches both Occupation and Name.
        assert_eq!(match_header("職業 / Name"), Some(FieldKey::Name));
        // Matches both Age and Address.
        assert_eq!(match_header("年齢・住所"), Some(FieldKey::Address));
    }

    #[test]
    fn test_other_header_ignores_own_tokens() {
        assert!(matches_other_header("住所", FieldKey::Name));
        assert!(matches_other_header("年齢・住所", FieldKey::Address));
        assert!(!matches_other_header("お名前 田中太郎", FieldKey::Name));
        assert!(!matches_other_header("Tel 090-1234-5678", FieldKey::Phone));
        assert!(!matches_other_header("田中太郎", FieldKey::Name));
    }

    #[test]
    fn test_strip_all_headers() {
        assert_eq!(strip_all_headers("住所沖縄県那覇市"), "沖縄県那覇市");
        assert_eq!(strip_all_headers("Tel: 090-1234-5678"), ": 090-1234-5678");
        assert_eq!(strip_all_headers("電話番号 03-1234-5678"), " 03-1234-5678");
        assert_eq!(strip_all_headers("佐藤　建築士"), "佐藤　建築士");
        assert_eq!(strip_all_headers("taro@mail.com"), "taro@mail.com");
    }

    #[test]
    fn test_pattern_strip_only_own_tokens() {
        let pattern = HeaderPattern::for_key(FieldKey::Address);
        assert_eq!(pattern.strip("ご住所 東京都 電話"), " 東京都 電話");
    }
}
