//! Row shapes for the primary reservation sheet and the raw OCR log sheet.

use chrono::NaiveDateTime;

use super::record::{ExtractedRecord, FieldKey};

/// Maximum number of OCR line cells in one log row.
pub const MAX_LOG_LINES: usize = 49;

/// Timestamp format of the log sheet's first column.
pub const LOG_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One row of the primary sheet, columns A..H.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRow {
    pub cells: Vec<String>,
}

impl SheetRow {
    /// Header row used when the sheet is created.
    pub fn header() -> Vec<String> {
        FieldKey::ALL.iter().map(|k| k.label().to_string()).collect()
    }
}

impl From<&ExtractedRecord> for SheetRow {
    fn from(record: &ExtractedRecord) -> Self {
        Self {
            cells: record.iter().map(|(_, v)| v.to_string()).collect(),
        }
    }
}

/// One row of the OCR log sheet: a timestamp followed by the raw lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrLogRow {
    pub timestamp: NaiveDateTime,
    pub lines: Vec<String>,
}

impl OcrLogRow {
    /// Build a log row, keeping at most `max_lines` lines.
    pub fn new(timestamp: NaiveDateTime, lines: &[String], max_lines: usize) -> Self {
        Self {
            timestamp,
            lines: lines.iter().take(max_lines).cloned().collect(),
        }
    }

    /// Header row used when the log sheet is created.
    pub fn header(max_lines: usize) -> Vec<String> {
        std::iter::once("タイムスタンプ".to_string())
            .chain((1..=max_lines).map(|i| format!("Line {}", i)))
            .collect()
    }

    /// Cells in sheet order.
    pub fn cells(&self) -> Vec<String> {
        std::iter::once(self.timestamp.format(LOG_TIMESTAMP_FORMAT).to_string())
            .chain(self.lines.iter().cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_sheet_row_order() {
        let mut record = ExtractedRecord::new();
        record.set(FieldKey::Name, "田中太郎");
        record.set(FieldKey::CheckoutDate, "2024/05/03");

        let row = SheetRow::from(&record);
        assert_eq!(row.cells.len(), 8);
        assert_eq!(row.cells[0], "田中太郎");
        assert_eq!(row.cells[7], "2024/05/03");
        assert_eq!(SheetRow::header()[3], "住所");
    }

    #[test]
    fn test_log_row_caps_lines() {
        let ts = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        let lines: Vec<String> = (0..60).map(|i| format!("line{}", i)).collect();

        let row = OcrLogRow::new(ts, &lines, MAX_LOG_LINES);
        let cells = row.cells();

        assert_eq!(cells.len(), 50);
        assert_eq!(cells[0], "2024-05-01 09:30:00");
        assert_eq!(cells[49], "line48");
    }

    #[test]
    fn test_log_header() {
        let header = OcrLogRow::header(MAX_LOG_LINES);
        assert_eq!(header.len(), 50);
        assert_eq!(header[0], "タイムスタンプ");
        assert_eq!(header[49], "Line 49");
    }
}
