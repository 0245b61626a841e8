//! Three-pass field extraction over OCR lines.
//!
//! 1. Header anchors: a line carrying a field label claims the first
//!    acceptable line within the look-ahead window below it.
//! 2. Address fallback: the first unused line naming a prefecture.
//! 3. Pattern fallback over the whole raw text for phone, email and dates.
//!
//! All state lives in the call; a line index feeds at most one field.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::models::config::{DateOrder, ExtractionConfig};
use crate::models::record::{ExtractedRecord, FieldKey};

use super::rules::{
    accepts, assign_dates, clean_value, match_header, matches_other_header, EmailExtractor,
    FieldExtractor, HeaderPattern, PhoneExtractor, PrefectureExtractor,
};
use super::tokenizer::{tokenize, LineSequence};

/// Number of lines scanned below a header, and the upper bound for the
/// configured window.
pub const DEFAULT_LOOKAHEAD: usize = 8;

/// Where an extracted value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValueSource {
    /// A whole line of the line sequence.
    Line { index: usize },
    /// A byte range of the raw text (pattern fallback).
    Text { start: usize, end: usize },
}

/// Extracted record plus the provenance of each filled field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub record: ExtractedRecord,
    pub sources: BTreeMap<FieldKey, ValueSource>,
}

#[derive(Default)]
struct PassState {
    record: ExtractedRecord,
    sources: BTreeMap<FieldKey, ValueSource>,
    used: HashSet<usize>,
}

impl PassState {
    fn assign_line(&mut self, key: FieldKey, index: usize, value: impl Into<String>) {
        let value = value.into();
        debug!("{} <- line {}: {:?}", key, index, value);
        self.record.set(key, value);
        self.sources.insert(key, ValueSource::Line { index });
        self.used.insert(index);
    }

    fn assign_text(&mut self, key: FieldKey, start: usize, end: usize, value: impl Into<String>) {
        let value = value.into();
        debug!("{} <- text {}..{}: {:?}", key, start, end, value);
        self.record.set(key, value);
        self.sources.insert(key, ValueSource::Text { start, end });
    }
}

/// Heuristic extractor turning OCR lines into an [`ExtractedRecord`].
#[derive(Debug, Clone)]
pub struct RecordExtractor {
    /// Lines scanned below a header anchor.
    lookahead: usize,
    /// Date role assignment policy for the pattern fallback.
    date_order: DateOrder,
}

impl RecordExtractor {
    /// Create an extractor with default settings.
    pub fn new() -> Self {
        Self {
            lookahead: DEFAULT_LOOKAHEAD,
            date_order: DateOrder::Document,
        }
    }

    /// Create an extractor from configuration.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new()
            .with_lookahead(config.lookahead)
            .with_date_order(config.date_order)
    }

    /// Set the look-ahead window. The window can only be narrowed; larger
    /// values are capped at [`DEFAULT_LOOKAHEAD`].
    pub fn with_lookahead(mut self, lookahead: usize) -> Self {
        if lookahead > DEFAULT_LOOKAHEAD {
            warn!(
                "Look-ahead {} exceeds the maximum of {}, capping",
                lookahead, DEFAULT_LOOKAHEAD
            );
        }
        self.lookahead = lookahead.min(DEFAULT_LOOKAHEAD);
        self
    }

    /// Set the date assignment policy.
    pub fn with_date_order(mut self, order: DateOrder) -> Self {
        self.date_order = order;
        self
    }

    /// Extract a record from already tokenized lines and the raw text they
    /// came from.
    pub fn extract(&self, lines: &LineSequence, raw: &str) -> ExtractedRecord {
        self.extract_traced(lines, raw).record
    }

    /// Tokenize `raw` and extract a record from it.
    pub fn extract_text(&self, raw: &str) -> ExtractedRecord {
        self.extract(&tokenize(raw), raw)
    }

    /// Like [`extract`](Self::extract), also reporting where each value came
    /// from.
    pub fn extract_traced(&self, lines: &LineSequence, raw: &str) -> Extraction {
        let mut state = PassState::default();

        self.anchor_pass(lines, &mut state);
        self.address_pass(lines, &mut state);
        self.pattern_pass(raw, &mut state);

        state.record.map_values(clean_value);

        Extraction {
            record: state.record,
            sources: state.sources,
        }
    }

    fn anchor_pass(&self, lines: &LineSequence, state: &mut PassState) {
        for (i, line) in lines.iter().enumerate() {
            if state.used.contains(&i) {
                continue;
            }
            let Some(key) = match_header(line) else {
                continue;
            };
            state.used.insert(i);

            if state.record.is_set(key) {
                trace!("{} header at line {} ignored, already filled", key, i);
                continue;
            }

            for offset in 1..=self.lookahead {
                let j = i + offset;
                let Some(candidate) = lines.get(j) else {
                    break;
                };
                if matches_other_header(candidate, key) || state.used.contains(&j) {
                    continue;
                }
                if accepts(key, candidate) {
                    state.assign_line(key, j, candidate);
                    break;
                }
                trace!("{} rejects line {}: {:?}", key, j, candidate);
            }
        }
    }

    fn address_pass(&self, lines: &LineSequence, state: &mut PassState) {
        if state.record.is_set(FieldKey::Address) {
            return;
        }

        let prefectures = PrefectureExtractor::new();
        let found = lines
            .iter()
            .enumerate()
            .find(|(i, line)| !state.used.contains(i) && prefectures.contains(line));

        if let Some((i, line)) = found {
            let value = HeaderPattern::for_key(FieldKey::Address).strip(line);
            state.assign_line(FieldKey::Address, i, value);
        }
    }

    fn pattern_pass(&self, raw: &str, state: &mut PassState) {
        if !state.record.is_set(FieldKey::Phone) {
            if let Some(m) = PhoneExtractor::new().extract(raw) {
                state.assign_text(FieldKey::Phone, m.position.0, m.position.1, m.value);
            }
        }

        if !state.record.is_set(FieldKey::Email) {
            if let Some(m) = EmailExtractor::new().extract(raw) {
                state.assign_text(FieldKey::Email, m.position.0, m.position.1, m.value);
            }
        }

        let date_keys = [FieldKey::CheckinDate, FieldKey::CheckoutDate];
        if date_keys.iter().all(|k| state.record.is_set(*k)) {
            return;
        }

        let assigned: Vec<String> = date_keys
            .iter()
            .map(|k| state.record.get(*k).to_string())
            .filter(|v| !v.is_empty())
            .collect();
        let assigned: Vec<&str> = assigned.iter().map(String::as_str).collect();

        let mut dates = assign_dates(raw, self.date_order, &assigned).into_iter();
        for key in date_keys {
            if state.record.is_set(key) {
                continue;
            }
            let Some(date) = dates.next() else {
                break;
            };
            state.assign_text(key, date.position.0, date.position.1, date.source);
        }
    }
}

impl Default for RecordExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract a record from lines with default settings.
pub fn extract(lines: &LineSequence, raw: &str) -> ExtractedRecord {
    RecordExtractor::new().extract(lines, raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn run(lines: &[&str]) -> ExtractedRecord {
        let raw = lines.join("\n");
        RecordExtractor::new().extract_text(&raw)
    }

    #[test]
    fn test_basic_card() {
        let record = run(&[
            "氏名",
            "田中太郎",
            "住所",
            "沖縄県那覇市1-2-3",
            "電話",
            "090-1234-5678",
        ]);

        let mut expected = ExtractedRecord::new();
        expected.set(FieldKey::Name, "田中太郎");
        expected.set(FieldKey::Address, "沖縄県那覇市1-2-3");
        expected.set(FieldKey::Phone, "090-1234-5678");
        assert_eq!(record, expected);
    }

    #[test]
    fn test_unlabeled_dates_follow_document_order() {
        let record = run(&["宿泊予約", "2024/05/03 まで", "開始 2024/05/01"]);
        assert_eq!(record.checkin_date, "2024/05/03");
        assert_eq!(record.checkout_date, "2024/05/01");

        let record = run(&["2024/05/01", "メモ", "2024/05/03"]);
        assert_eq!(record.checkin_date, "2024/05/01");
        assert_eq!(record.checkout_date, "2024/05/03");
    }

    #[test]
    fn test_calendar_order_option() {
        let raw = "2024/05/03\n2024/05/01";
        let record = RecordExtractor::new()
            .with_date_order(DateOrder::Calendar)
            .extract_text(raw);
        assert_eq!(record.checkin_date, "2024/05/01");
        assert_eq!(record.checkout_date, "2024/05/03");
    }

    #[test]
    fn test_occupation_kept_verbatim() {
        let record = run(&["職業", "佐藤　建築士"]);
        assert_eq!(record.occupation, "佐藤　建築士");
    }

    #[test]
    fn test_header_below_anchor_is_skipped() {
        let record = run(&["氏名", "住所", "山田花子", "東京都港区1-1"]);
        // "住所" is not a name; the name is the next line.
        assert_eq!(record.name, "山田花子");
        // The address header claims the line after the name.
        assert_eq!(record.address, "東京都港区1-1");
    }

    #[test]
    fn test_no_address_anywhere() {
        let record = run(&["氏名", "田中太郎", "電話", "090-1234-5678"]);
        assert_eq!(record.address, "");
    }

    #[test]
    fn test_address_prefecture_fallback() {
        let record = run(&["田中太郎", "北海道札幌市中央区1-1", "090-1234-5678"]);
        assert_eq!(record.address, "北海道札幌市中央区1-1");
        assert_eq!(record.phone, "090-1234-5678");

        // A labeled line is an anchor, so the fallback never reads it.
        let record = run(&["ご住所 北海道札幌市"]);
        assert_eq!(record.address, "");
    }

    #[test]
    fn test_validators_skip_wrong_lines() {
        let record = run(&["年齢", "会社員", "35"]);
        assert_eq!(record.age, "35");
        assert_eq!(record.occupation, "");

        let record = run(&["Email", "田中", "taro@example.jp"]);
        assert_eq!(record.email, "taro@example.jp");
    }

    #[test]
    fn test_lookahead_bound() {
        let mut lines = vec!["年齢"];
        lines.extend(std::iter::repeat_n("なし", 8));
        lines.push("42");
        let record = run(&lines);
        assert_eq!(record.age, "");

        let mut lines = vec!["年齢"];
        lines.extend(std::iter::repeat_n("なし", 7));
        lines.push("42");
        let record = run(&lines);
        assert_eq!(record.age, "42");
    }

    #[test]
    fn test_lookahead_cannot_be_widened() {
        let mut lines = vec!["年齢"];
        lines.extend(std::iter::repeat_n("なし", 10));
        lines.push("42");
        let raw = lines.join("\n");

        let record = RecordExtractor::new().with_lookahead(20).extract_text(&raw);
        assert_eq!(record.age, "");

        let record = RecordExtractor::new().with_lookahead(2).extract_text("年齢\nなし\nなし\n42");
        assert_eq!(record.age, "");
    }

    #[test]
    fn test_same_field_label_below_anchor_is_a_candidate() {
        let record = run(&["氏名", "お名前 田中太郎"]);
        assert_eq!(record.name, "田中太郎");

        let record = run(&["Phone", "Tel 090-1234-5678"]);
        assert_eq!(record.phone, "090-1234-5678");
    }

    #[test]
    fn test_fallback_date_source_points_at_match() {
        // The first occurrence of the date text is part of a longer number.
        let raw = "予約番号 12024/05/03\n2024/05/03";
        let extraction = RecordExtractor::new().extract_traced(&tokenize(raw), raw);

        assert_eq!(extraction.record.checkin_date, "2024/05/03");
        let start = raw.rfind("2024/05/03").unwrap();
        assert_eq!(
            extraction.sources.get(&FieldKey::CheckinDate),
            Some(&ValueSource::Text { start, end: start + 10 })
        );
    }

    #[test]
    fn test_email_without_header() {
        let record = run(&["予約カード", "連絡先 hanako.yamada@example.com", "ありがとう"]);
        assert_eq!(record.email, "hanako.yamada@example.com");
    }

    #[test]
    fn test_phone_fallback_searches_raw_text() {
        let record = run(&["田中太郎", "連絡先 098-861-1234 (自宅)"]);
        assert_eq!(record.phone, "098-861-1234");
    }

    #[test]
    fn test_labeled_checkin_and_fallback_checkout() {
        let record = run(&["チェックイン", "2024/05/01", "予定 2024/05/03"]);
        assert_eq!(record.checkin_date, "2024/05/01");
        assert_eq!(record.checkout_date, "2024/05/03");
    }

    #[test]
    fn test_source_lines_are_unique() {
        let lines = tokenize("氏名\n職業\n田中太郎\n会社員\n年齢\n住所\n42\n沖縄県");
        let extraction = RecordExtractor::new().extract_traced(&lines, "");

        let mut seen = HashSet::new();
        for source in extraction.sources.values() {
            if let ValueSource::Line { index } = source {
                assert!(seen.insert(*index), "line {} used twice", index);
            }
        }
        assert_eq!(extraction.record.name, "田中太郎");
        assert_eq!(extraction.record.occupation, "会社員");
        assert_eq!(extraction.record.age, "42");
        assert_eq!(extraction.record.address, "沖縄県");
    }

    #[test]
    fn test_empty_input_gives_empty_record() {
        let record = RecordExtractor::new().extract_text("");
        assert_eq!(record, ExtractedRecord::new());
    }

    #[test]
    fn test_idempotent() {
        let raw = "氏名\n田中太郎\nTel\n090-1234-5678\n2024/05/01";
        let extractor = RecordExtractor::new();
        assert_eq!(extractor.extract_text(raw), extractor.extract_text(raw));
    }

    #[test]
    fn test_honorific_removed_from_name() {
        let record = run(&["お名前", "田中太郎 様"]);
        assert_eq!(record.name, "田中太郎");
    }
}
