//! Japanese prefecture detection, used to spot unlabeled addresses.

use lazy_static::lazy_static;
use regex::Regex;

use super::{ExtractionMatch, FieldExtractor};

/// The 47 prefectures, north to south.
pub const PREFECTURES: [&str; 47] = [
    "北海道", "青森県", "岩手県", "宮城県", "秋田県", "山形県", "福島県",
    "茨城県", "栃木県", "群馬県", "埼玉県", "千葉県", "東京都", "神奈川県",
    "新潟県", "富山県", "石川県", "福井県", "山梨県", "長野県", "岐阜県",
    "静岡県", "愛知県", "三重県", "滋賀県", "京都府", "大阪府", "兵庫県",
    "奈良県", "和歌山県", "鳥取県", "島根県", "岡山県", "広島県", "山口県",
    "徳島県", "香川県", "愛媛県", "高知県", "福岡県", "佐賀県", "長崎県",
    "熊本県", "大分県", "宮崎県", "鹿児島県", "沖縄県",
];

lazy_static! {
    static ref PREFECTURE: Regex = Regex::new(&PREFECTURES.join("|")).unwrap();
}

/// Finds prefecture names in text.
#[derive(Debug, Default)]
pub struct PrefectureExtractor;

impl PrefectureExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Whether the text mentions any prefecture.
    pub fn contains(&self, text: &str) -> bool {
        PREFECTURE.is_match(text)
    }
}

impl FieldExtractor for PrefectureExtractor {
    type Output = ExtractionMatch<&'static str>;

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        PREFECTURE
            .find_iter(text)
            .filter_map(|m| {
                let name = PREFECTURES.iter().find(|p| **p == m.as_str())?;
                Some(ExtractionMatch::new(*name, m.start(), m.end(), m.as_str()))
            })
            .collect()
    }
}
