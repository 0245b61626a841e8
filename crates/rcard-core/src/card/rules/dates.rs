//! Date detection for check-in and check-out.

use chrono::NaiveDate;

use crate::models::config::DateOrder;

use super::patterns::{is_digit_bounded, DATE_YMD};
use super::{ExtractionMatch, FieldExtractor};

/// Year-first date extractor (`YYYY/MM/DD`, `YYYY-M-D`, `YYYY.MM.DD`).
///
/// The value is the calendar date when the digits form a valid one.
#[derive(Debug, Default)]
pub struct DateExtractor;

impl DateExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl FieldExtractor for DateExtractor {
    type Output = ExtractionMatch<Option<NaiveDate>>;

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        DATE_YMD
            .captures_iter(text)
            .filter_map(|caps| {
                let full = caps.get(0)?;
                if !is_digit_bounded(text, full.start(), full.end()) {
                    return None;
                }
                let year: i32 = caps[1].parse().ok()?;
                let month: u32 = caps[2].parse().ok()?;
                let day: u32 = caps[3].parse().ok()?;
                let date = NaiveDate::from_ymd_opt(year, month, day);
                Some(ExtractionMatch::new(date, full.start(), full.end(), full.as_str()))
            })
            .collect()
    }
}

/// Date matches found in `text`, in the order they should fill check-in
/// then check-out.
///
/// Dates whose text is contained in one of `already_assigned` are skipped.
/// With [`DateOrder::Calendar`], valid dates are sorted ascending and any
/// impossible dates (e.g. month 13) follow them in document order.
pub fn assign_dates(
    text: &str,
    order: DateOrder,
    already_assigned: &[&str],
) -> Vec<ExtractionMatch<Option<NaiveDate>>> {
    let mut found: Vec<_> = DateExtractor::new()
        .extract_all(text)
        .into_iter()
        .filter(|m| !already_assigned.iter().any(|a| a.contains(m.source.as_str())))
        .collect();

    if order == DateOrder::Calendar {
        // Stable sort keeps document order among equal keys.
        found.sort_by_key(|m| (m.value.is_none(), m.value));
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sources(found: Vec<ExtractionMatch<Option<NaiveDate>>>) -> Vec<String> {
        found.into_iter().map(|m| m.source).collect()
    }

    #[test]
    fn test_extract_dates_in_document_order() {
        let text = "到着 2024/05/03\n予約日 2024-4-20";
        let dates = DateExtractor::new().extract_all(text);

        assert_eq!(dates.len(), 2);
        assert_eq!(dates[0].source, "2024/05/03");
        assert_eq!(dates[1].value, NaiveDate::from_ymd_opt(2024, 4, 20));
    }

    #[test]
    fn test_invalid_calendar_date_is_still_found() {
        let dates = DateExtractor::new().extract_all("2024/13/40");
        assert_eq!(dates.len(), 1);
        assert_eq!(dates[0].value, None);
    }

    #[test]
    fn test_document_order_policy() {
        let text = "2024/05/03 2024/05/01";
        assert_eq!(
            sources(assign_dates(text, DateOrder::Document, &[])),
            vec!["2024/05/03", "2024/05/01"]
        );
    }

    #[test]
    fn test_calendar_order_policy() {
        let text = "2024/13/01 2024/05/03 2024/05/01";
        assert_eq!(
            sources(assign_dates(text, DateOrder::Calendar, &[])),
            vec!["2024/05/01", "2024/05/03", "2024/13/01"]
        );
    }

    #[test]
    fn test_skips_assigned_dates() {
        let text = "チェックイン 2024/05/01\n2024/05/03";
        assert_eq!(
            sources(assign_dates(text, DateOrder::Document, &["2024/05/01"])),
            vec!["2024/05/03"]
        );
    }

    #[test]
    fn test_match_positions_survive_ordering() {
        let text = "2024/05/03 2024/05/01";
        let found = assign_dates(text, DateOrder::Calendar, &[]);
        assert_eq!(found[0].position, (11, 21));
        assert_eq!(found[1].position, (0, 10));
    }
}
