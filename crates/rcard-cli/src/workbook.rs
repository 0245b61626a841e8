//! CSV-backed workbook: the reservation sheet and the raw OCR log sheet.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{debug, info};

use rcard_core::models::config::SheetConfig;
use rcard_core::models::record::ExtractedRecord;
use rcard_core::models::sheet::{OcrLogRow, SheetRow};

/// Append-only workbook made of two CSV files.
pub struct CsvWorkbook {
    primary: PathBuf,
    log: PathBuf,
    max_log_lines: usize,
}

impl CsvWorkbook {
    pub fn from_config(config: &SheetConfig) -> Self {
        Self {
            primary: config.primary_path.clone(),
            log: config.log_path.clone(),
            max_log_lines: config.max_log_lines,
        }
    }

    /// Override the reservation sheet path.
    pub fn with_primary(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.primary = path;
        }
        self
    }

    /// Override the OCR log sheet path.
    pub fn with_log(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.log = path;
        }
        self
    }

    pub fn primary_path(&self) -> &Path {
        &self.primary
    }

    /// Append the confirmed record and, when OCR lines are available, a
    /// timestamped backup row of them.
    pub fn append(&self, record: &ExtractedRecord, lines: &[String]) -> anyhow::Result<()> {
        append_row(&self.primary, &SheetRow::header(), &SheetRow::from(record).cells)?;
        info!("Appended reservation row to {}", self.primary.display());

        if !lines.is_empty() {
            let row = OcrLogRow::new(Local::now().naive_local(), lines, self.max_log_lines);
            append_row(&self.log, &OcrLogRow::header(self.max_log_lines), &row.cells())?;
            info!("Appended OCR log row to {}", self.log.display());
        }

        Ok(())
    }
}

/// Append one row, writing the header first when the file is new or empty.
fn append_row(path: &Path, header: &[String], cells: &[String]) -> anyhow::Result<()> {
    let is_new = fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(file);

    if is_new {
        debug!("Creating {} with header row", path.display());
        wtr.write_record(header)?;
    }
    wtr.write_record(cells)?;
    wtr.flush()?;

    Ok(())
}
