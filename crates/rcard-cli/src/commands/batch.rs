//! Batch processing command for many reservation cards.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use rcard_core::card::ExtractionResult;
use rcard_core::models::record::FieldKey;

use super::config::load_config;
use super::process::{ensure_appendable, format_result, read_card, InputKind, OutputFormat};
use crate::workbook::CsvWorkbook;

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern matching card images or OCR text files
    #[arg(required = true)]
    input: String,

    /// Output directory for per-card results
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each card
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    /// Send images to OCR without enhancement
    #[arg(long)]
    no_enhance: bool,

    /// Append every successful record to the reservation sheet; cards whose
    /// OCR produced no text count as failed
    #[arg(long)]
    append: bool,
}

/// Outcome for a single file.
struct CardOutcome {
    path: PathBuf,
    result: Option<ExtractionResult>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| InputKind::from_path(p).is_some())
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let workbook = args
        .append
        .then(|| CsvWorkbook::from_config(&config.sheets));

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} cards")?
            .progress_chars("=>-"),
    );

    // One OCR request at a time; the provider is the bottleneck.
    let quiet = ProgressBar::hidden();
    let mut outcomes = Vec::with_capacity(files.len());

    for path in files {
        let file_start = Instant::now();
        let result = read_card(&path, &config, !args.no_enhance, None, &quiet)
            .await
            .and_then(|result| {
                if workbook.is_some() {
                    ensure_appendable(&result)?;
                }
                Ok(result)
            });
        let processing_time_ms = file_start.elapsed().as_millis() as u64;

        match result {
            Ok(result) => {
                if let Some(workbook) = &workbook {
                    workbook.append(&result.record, &result.lines)?;
                }
                outcomes.push(CardOutcome {
                    path,
                    result: Some(result),
                    error: None,
                    processing_time_ms,
                });
            }
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to process {}: {}", path.display(), error_msg);
                    outcomes.push(CardOutcome {
                        path,
                        result: None,
                        error: Some(error_msg),
                        processing_time_ms,
                    });
                } else {
                    error!("Failed to process {}: {}", path.display(), error_msg);
                    anyhow::bail!("Processing failed for {}: {}", path.display(), error_msg);
                }
            }
        }

        overall_pb.inc(1);
    }

    overall_pb.finish_with_message("Complete");

    if let Some(output_dir) = &args.output_dir {
        for outcome in &outcomes {
            if let Some(result) = &outcome.result {
                let stem = outcome
                    .path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("card");
                let output_path =
                    output_dir.join(format!("{}.{}", stem, args.format.extension()));

                fs::write(&output_path, format_result(result, args.format)?)?;
                debug!("Wrote output to {}", output_path.display());
            }
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &outcomes)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let successful = outcomes.iter().filter(|o| o.result.is_some()).count();
    let incomplete = outcomes
        .iter()
        .filter_map(|o| o.result.as_ref())
        .filter(|r| !r.missing_fields().is_empty())
        .count();
    let failed: Vec<_> = outcomes.iter().filter(|o| o.error.is_some()).collect();

    println!();
    println!(
        "{} Processed {} cards in {:?}",
        style("✓").green(),
        outcomes.len(),
        start.elapsed()
    );
    println!(
        "   {} read, {} need manual completion, {} failed",
        style(successful).green(),
        style(incomplete).yellow(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for outcome in &failed {
            println!(
                "  - {}: {}",
                outcome.path.display(),
                outcome.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn write_summary(path: &Path, outcomes: &[CardOutcome]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    let mut header = vec!["filename".to_string(), "status".to_string()];
    header.extend(FieldKey::ALL.iter().map(|k| k.label().to_string()));
    header.extend(["missing", "warnings", "processing_time_ms", "error"].map(String::from));
    wtr.write_record(&header)?;

    for outcome in outcomes {
        let filename = outcome
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_string();

        let mut row = vec![filename];
        match &outcome.result {
            Some(result) => {
                row.push("success".to_string());
                row.extend(result.record.iter().map(|(_, v)| v.to_string()));
                row.push(result.missing_fields().len().to_string());
                row.push(result.warnings.join("; "));
                row.push(outcome.processing_time_ms.to_string());
                row.push(String::new());
            }
            None => {
                row.push("error".to_string());
                row.extend(std::iter::repeat_n(String::new(), FieldKey::ALL.len() + 2));
                row.push(outcome.processing_time_ms.to_string());
                row.push(outcome.error.clone().unwrap_or_default());
            }
        }
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}
