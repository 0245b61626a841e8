//! Process command - read one reservation card.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use rcard_core::card::{CardParser, ExtractionResult, RuleBasedCardParser};
use rcard_core::models::config::CardConfig;
use rcard_core::models::record::{ExtractedRecord, FieldKey};
use rcard_core::models::sheet::SheetRow;
use rcard_core::ocr::{save_enhanced, CardPreprocessor, OcrProvider, VisionClient};

use super::config::load_config;
use crate::workbook::CsvWorkbook;

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (card image, or a .txt file with OCR text)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Send the image to OCR without enhancement
    #[arg(long)]
    no_enhance: bool,

    /// Save the enhanced image to this path
    #[arg(long)]
    save_enhanced: Option<PathBuf>,

    /// Append the record to the reservation sheet
    #[arg(long)]
    append: bool,

    /// Reservation sheet CSV (overrides sheets.primary_path)
    #[arg(long)]
    sheet: Option<PathBuf>,

    /// OCR log sheet CSV (overrides sheets.log_path)
    #[arg(long)]
    log_sheet: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

/// How an input file is read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputKind {
    /// Already-recognized OCR text.
    Text,
    /// Card image sent to OCR.
    Image,
}

impl InputKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "txt" => Some(InputKind::Text),
            "png" | "jpg" | "jpeg" => Some(InputKind::Image),
            _ => None,
        }
    }
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {msg}")?
            .progress_chars("##-"),
    );

    let result = read_card(
        &args.input,
        &config,
        !args.no_enhance,
        args.save_enhanced.as_deref(),
        &pb,
    )
    .await?;

    pb.finish_and_clear();

    for warning in &result.warnings {
        eprintln!("{} {}", style("⚠").yellow(), warning);
    }

    let output = format_result(&result, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.append {
        ensure_appendable(&result)?;
        let workbook = CsvWorkbook::from_config(&config.sheets)
            .with_primary(args.sheet.clone())
            .with_log(args.log_sheet.clone());
        workbook.append(&result.record, &result.lines)?;
        println!(
            "{} Appended to {}",
            style("✓").green(),
            workbook.primary_path().display()
        );
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Read one card: OCR the image (or load the text file) and extract fields.
///
/// OCR failures do not abort; they surface as warnings on an empty record.
pub async fn read_card(
    path: &Path,
    config: &CardConfig,
    enhance: bool,
    save_enhanced_to: Option<&Path>,
    pb: &ProgressBar,
) -> anyhow::Result<ExtractionResult> {
    let parser = RuleBasedCardParser::from_config(&config.extraction);

    let kind = InputKind::from_path(path).ok_or_else(|| {
        anyhow::anyhow!("Unsupported file format: {}", path.display())
    })?;

    match kind {
        InputKind::Text => {
            pb.set_message("Reading OCR text...");
            pb.set_position(30);
            let text = fs::read_to_string(path)?;

            pb.set_message("Extracting fields...");
            pb.set_position(70);
            Ok(parser.parse(&text))
        }
        InputKind::Image => {
            let image = if enhance && config.preprocess.enabled {
                pb.set_message("Enhancing image...");
                pb.set_position(20);
                let (encoded, enhanced) =
                    CardPreprocessor::from_config(&config.preprocess).process_file(path)?;
                if let Some(target) = save_enhanced_to {
                    save_enhanced(&enhanced, target)?;
                }
                encoded
            } else {
                pb.set_message("Loading image...");
                pb.set_position(10);
                fs::read(path)?
            };

            // A missing key is a setup problem, not an OCR outcome.
            let client = VisionClient::new(&config.ocr)?;

            pb.set_message("Running OCR...");
            pb.set_position(40);
            let outcome = client.recognize(&image).await;

            pb.set_message("Extracting fields...");
            pb.set_position(70);
            Ok(parser.parse_ocr_outcome(outcome))
        }
    }
}

/// Refuse to put a record on the sheet when OCR gave no text at all; the
/// row would be blank. Failed OCR reaches here as blank text too.
pub fn ensure_appendable(result: &ExtractionResult) -> anyhow::Result<()> {
    if result.raw_text.trim().is_empty() {
        anyhow::bail!("Nothing to append: OCR produced no text");
    }
    Ok(())
}

pub fn format_result(result: &ExtractionResult, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Csv => format_csv(&result.record),
        OutputFormat::Text => Ok(format_text(result)),
    }
}

fn format_csv(record: &ExtractedRecord) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(SheetRow::header())?;
    wtr.write_record(SheetRow::from(record).cells)?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

/// Verification view: one line per field, empty fields marked for the
/// operator to fill in.
fn format_text(result: &ExtractionResult) -> String {
    let mut output = String::new();

    for key in FieldKey::ALL {
        let value = result.record.get(key);
        if value.is_empty() {
            output.push_str(&format!("{}: [missing]\n", key));
        } else {
            output.push_str(&format!("{}: {}\n", key, value));
        }
    }

    if !result.looks_like_card {
        output.push_str("\nNote: text does not look like a reservation card\n");
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_kind() {
        assert_eq!(InputKind::from_path(Path::new("card.JPG")), Some(InputKind::Image));
        assert_eq!(InputKind::from_path(Path::new("scan.txt")), Some(InputKind::Text));
        assert_eq!(InputKind::from_path(Path::new("card.pdf")), None);
    }

    #[test]
    fn test_blank_text_is_not_appendable() {
        let parser = RuleBasedCardParser::new();

        assert!(ensure_appendable(&parser.parse(" \n\t\n")).is_err());
        assert!(ensure_appendable(&parser.parse("氏名\n田中太郎")).is_ok());
        // Text without any recognised field still goes to the sheet.
        assert!(ensure_appendable(&parser.parse("メモ")).is_ok());
    }

    #[test]
    fn test_text_output_marks_missing() {
        let result = RuleBasedCardParser::new().parse("氏名\n田中太郎");
        let text = format_text(&result);

        assert!(text.starts_with("氏名: 田中太郎\n"));
        assert!(text.contains("年齢: [missing]"));
    }
}
