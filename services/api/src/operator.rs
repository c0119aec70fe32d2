use crate::infra::{build_pipeline, load_index};
use clap::Args;
use retention_agent::config::AppConfig;
use retention_agent::error::AppError;
use retention_agent::telemetry::{self, LogSink};
use retention_agent::workflows::retention::{
    ComplaintIngestor, CustomerId, GeminiClient, IngestReport, PipelineRecord, RetentionAction,
};
use std::fmt::Write as _;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct AnalyzeArgs {
    /// Customer identifier, e.g. 3668-QPYBK
    pub(crate) customer_id: String,
}

#[derive(Args, Debug)]
pub(crate) struct IngestArgs {
    /// Directory holding `<customer_id>_complaint.txt` transcripts
    #[arg(long)]
    pub(crate) dir: PathBuf,
    /// Snapshot to update (defaults to RETENTION_INDEX_PATH)
    #[arg(long)]
    pub(crate) index: Option<PathBuf>,
}

pub(crate) fn run_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry, LogSink::Stderr)?;

    let pipeline = build_pipeline(&config)?;
    let record = pipeline.run(CustomerId(args.customer_id))?;

    print!("{}", render_decision_report(&record));
    Ok(())
}

pub(crate) fn run_ingest(args: IngestArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    telemetry::init(&config.telemetry, LogSink::Stderr)?;

    if let Some(index_path) = args.index {
        config.knowledge.index_path = index_path;
    }

    let gemini = GeminiClient::from_config(&config.gemini)?;
    let mut index = load_index(&config.knowledge)?;
    let report = ComplaintIngestor::new(&gemini).ingest_dir(&args.dir, &mut index)?;
    index.save(&config.knowledge.index_path)?;

    print!(
        "{}",
        render_ingest_summary(&report, index.len(), &config.knowledge.index_path)
    );
    Ok(())
}

fn render_decision_report(record: &PipelineRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Retention decision for {}", record.customer_id());

    if let Some(profile) = record.profile() {
        if profile.is_unknown() {
            let _ = writeln!(out, "- Profile: not on file");
        } else {
            let _ = writeln!(
                out,
                "- Profile: {} months tenure | ${:.2}/month | {}",
                profile.tenure_months, profile.monthly_charge, profile.service_type
            );
        }
    }
    if let Some(summary) = record.complaint_summary() {
        let _ = writeln!(out, "- Complaint: {summary}");
    }
    if let Some(risk) = record.risk() {
        let _ = writeln!(out, "- Risk score: {} ({})", risk.score, risk.reason);
        if let Some(offer) = record.recommended_offer() {
            let _ = writeln!(out, "- Offer: {offer}");
        }
        let _ = writeln!(out, "- Action: {}", RetentionAction::for_score(risk.score));
    }
    out
}

fn render_ingest_summary(report: &IngestReport, documents: usize, path: &std::path::Path) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Ingested {} of {} complaint files into {} ({} documents)",
        report.stored.len(),
        report.processed,
        path.display(),
        documents
    );
    for skipped in &report.skipped {
        let _ = writeln!(out, "  skipped {}: {}", skipped.file.display(), skipped.reason);
    }
    out
}
