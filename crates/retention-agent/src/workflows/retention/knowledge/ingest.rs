use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{info, warn};

use super::index::{InMemoryVectorIndex, StoredDocument};
use crate::workflows::retention::backend::EmbeddingModel;

/// File-name suffix identifying complaint transcripts.
pub const COMPLAINT_FILE_SUFFIX: &str = "_complaint.txt";

const COMPLAINT_DOCUMENT_KIND: &str = "complaint_log";

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to scan complaint directory {path}: {source}")]
    ScanDirectory {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A complaint file that was not stored, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedComplaint {
    pub file: PathBuf,
    pub reason: String,
}

/// Outcome of one ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub processed: usize,
    pub stored: Vec<String>,
    pub skipped: Vec<SkippedComplaint>,
}

/// Embeds complaint transcripts and stores them in the customer's partition.
pub struct ComplaintIngestor<'a> {
    embedder: &'a dyn EmbeddingModel,
}

impl<'a> ComplaintIngestor<'a> {
    pub fn new(embedder: &'a dyn EmbeddingModel) -> Self {
        Self { embedder }
    }

    pub fn ingest_dir(
        &self,
        dir: &Path,
        index: &mut InMemoryVectorIndex,
    ) -> Result<IngestReport, IngestError> {
        let files = complaint_files(dir)?;
        if files.is_empty() {
            warn!(dir = %dir.display(), "no complaint transcripts found");
        }

        let mut report = IngestReport::default();
        for file in files {
            report.processed += 1;
            match self.ingest_file(&file, index) {
                Ok(customer_id) => {
                    info!(%customer_id, "stored complaint context");
                    report.stored.push(customer_id);
                }
                Err(reason) => {
                    warn!(file = %file.display(), %reason, "skipping complaint");
                    report.skipped.push(SkippedComplaint { file, reason });
                }
            }
        }

        Ok(report)
    }

    fn ingest_file(&self, file: &Path, index: &mut InMemoryVectorIndex) -> Result<String, String> {
        let customer_id = customer_id_for(file).ok_or("file name carries no customer id")?;
        let text_content = fs::read_to_string(file).map_err(|err| format!("read failed: {err}"))?;
        if text_content.trim().is_empty() {
            return Err("empty transcript".to_string());
        }

        let embedding = self
            .embedder
            .embed(&text_content)
            .map_err(|err| format!("embedding failed: {err}"))?;

        index
            .upsert(StoredDocument {
                id: format!("{customer_id}_doc"),
                customer_id: customer_id.clone(),
                kind: COMPLAINT_DOCUMENT_KIND.to_string(),
                text_content,
                embedding,
                ingested_at: Utc::now(),
            })
            .map_err(|err| err.to_string())?;

        Ok(customer_id)
    }
}

fn complaint_files(dir: &Path) -> Result<Vec<PathBuf>, IngestError> {
    let scan_error = |source| IngestError::ScanDirectory {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(scan_error)? {
        let path = entry.map_err(scan_error)?.path();
        let is_complaint = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(COMPLAINT_FILE_SUFFIX));
        if is_complaint && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Customer id is the file-name prefix before the first underscore.
fn customer_id_for(file: &Path) -> Option<String> {
    let name = file.file_name()?.to_str()?;
    let prefix = name.split('_').next()?.trim();
    if prefix.is_empty() {
        None
    } else {
        Some(prefix.to_string())
    }
}
