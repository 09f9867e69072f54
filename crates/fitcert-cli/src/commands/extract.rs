//! Single-document extraction.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use console::style;
use fitcert_core::{CertificateExtractor, CertificateParser, CertificateRecord, DocumentEnvelope};
use tracing::info;

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input document: markdown/text, or a JSON envelope (`.json`)
    pub input: PathBuf,

    /// Write output to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}

pub fn run(args: ExtractArgs) -> Result<()> {
    let record = extract_path(&args.input)?;
    let rendered = render(&record, args.format, args.pretty)?;

    match &args.output {
        Some(path) => {
            fs::write(path, rendered.as_bytes())
                .with_context(|| format!("failed to write output to {}", path.display()))?;
            eprintln!("{} {}", style("Saved:").green().bold(), path.display());
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

/// Reads and extracts one document. `.json` inputs are treated as
/// evidence envelopes, anything else as raw document text.
pub(crate) fn extract_path(path: &Path) -> Result<CertificateRecord> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    info!(input = %path.display(), "extracting certificate");

    let parser = CertificateParser::new();
    let record = if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json")) {
        let envelope: DocumentEnvelope = serde_json::from_str(&text)
            .with_context(|| format!("{} is not a valid document envelope", path.display()))?;
        parser.extract(&envelope)
    } else {
        parser.extract_from_text(&text)
    };
    Ok(record)
}

pub(crate) fn render(
    record: &CertificateRecord,
    format: OutputFormat,
    pretty: bool,
) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let json = if pretty {
                serde_json::to_string_pretty(record)?
            } else {
                serde_json::to_string(record)?
            };
            Ok(json)
        }
        OutputFormat::Text => Ok(render_text(record)),
    }
}

fn render_text(record: &CertificateRecord) -> String {
    let mut out = String::new();
    let scalar = |label: &str, value: &str| {
        if value.is_empty() {
            format!("{label}: -\n")
        } else {
            format!("{label}: {value}\n")
        }
    };
    out.push_str(&scalar("Name", &record.name));
    out.push_str(&scalar("ID number", &record.id_number));
    out.push_str(&scalar("Company", &record.company));
    out.push_str(&scalar("Job", &record.job));
    out.push_str(&scalar("Examination type", &record.examination_type));
    out.push_str(&scalar("Exam date", &record.exam_date));
    out.push_str(&scalar("Expiry date", &record.expiry_date));
    out.push_str(&scalar("Fitness declaration", &record.fitness_declaration));

    let done: Vec<String> = record
        .medical_exams
        .iter()
        .filter(|(_, done)| **done)
        .map(|(test, _)| match record.medical_results.get(test) {
            Some(result) => format!("{test} ({result})"),
            None => test.to_string(),
        })
        .collect();
    out.push_str(&scalar("Tests done", &done.join(", ")));

    let applied: Vec<String> = record
        .restrictions
        .iter()
        .filter(|(_, applied)| **applied)
        .map(|(restriction, _)| restriction.to_string())
        .collect();
    out.push_str(&scalar("Restrictions", &applied.join(", ")));
    out.push_str(&scalar("Referral", &record.referral));
    out.push_str(&scalar("Review date", &record.review_date));
    out.push_str(&scalar("Comments", &record.comments));
    out
}
