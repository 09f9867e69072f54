//! Batch extraction over a glob of documents.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, ValueEnum};
use console::style;
use fitcert_core::CertificateRecord;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use tracing::warn;

use super::extract;

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern selecting input documents, e.g. "scans/*.md"
    pub pattern: String,

    /// Write output to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = BatchFormat::Csv)]
    pub format: BatchFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BatchFormat {
    /// One summary row per document
    Csv,
    /// One full JSON record per line
    Jsonl,
}

pub fn run(args: BatchArgs) -> Result<()> {
    let paths: Vec<PathBuf> = glob(&args.pattern)
        .with_context(|| format!("invalid glob pattern '{}'", args.pattern))?
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file())
        .collect();
    if paths.is_empty() {
        bail!("no files match pattern '{}'", args.pattern);
    }

    let progress = ProgressBar::new(paths.len() as u64).with_style(
        ProgressStyle::with_template("{bar:30} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut extracted: Vec<(PathBuf, CertificateRecord)> = Vec::new();
    let mut failed = 0usize;
    for path in paths {
        progress.set_message(path.display().to_string());
        match extract::extract_path(&path) {
            Ok(record) => extracted.push((path, record)),
            Err(e) => {
                warn!(input = %path.display(), error = %e, "skipping document");
                failed += 1;
            }
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    let rendered = match args.format {
        BatchFormat::Csv => render_csv(&extracted)?,
        BatchFormat::Jsonl => render_jsonl(&extracted)?,
    };
    match &args.output {
        Some(path) => {
            fs::write(path, rendered.as_bytes())
                .with_context(|| format!("failed to write output to {}", path.display()))?;
            eprintln!(
                "{} {} document(s) -> {} ({failed} failed)",
                style("Processed:").green().bold(),
                extracted.len(),
                path.display(),
            );
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

fn render_csv(extracted: &[(PathBuf, CertificateRecord)]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "file",
        "name",
        "id_number",
        "company",
        "job",
        "examination_type",
        "exam_date",
        "expiry_date",
        "fitness_declaration",
        "review_date",
    ])?;
    for (path, record) in extracted {
        let file = path.display().to_string();
        writer.write_record([
            file.as_str(),
            record.name.as_str(),
            record.id_number.as_str(),
            record.company.as_str(),
            record.job.as_str(),
            record.examination_type.as_str(),
            record.exam_date.as_str(),
            record.expiry_date.as_str(),
            record.fitness_declaration.as_str(),
            record.review_date.as_str(),
        ])?;
    }
    let bytes = writer.into_inner().context("failed to flush csv output")?;
    String::from_utf8(bytes).context("csv output is not valid utf-8")
}

fn render_jsonl(extracted: &[(PathBuf, CertificateRecord)]) -> Result<String> {
    let mut out = String::new();
    for (path, record) in extracted {
        let line = json!({
            "file": path.display().to_string(),
            "record": record,
        });
        out.push_str(&serde_json::to_string(&line)?);
        out.push('\n');
    }
    Ok(out)
}
