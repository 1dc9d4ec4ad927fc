//! Per-file and per-directory ingestion driver.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use netcdf_parser::{assemble_profile, open_profile_file, ProfileFile};
use storage::ProfileStore;
use tracing::{error, info, instrument, warn};

use crate::config::{IngestConfig, DEFAULT_CHUNK_SIZE, DEFAULT_EXTENSION};
use crate::error::{IngestionError, Result};
use crate::transaction::{IngestionTransaction, TransactionOutcome};

/// Options for ingestion operations.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Measurement rows per insert statement
    pub chunk_size: usize,
    /// Extension of files picked up by directory scans, without the dot
    pub extension: String,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }
}

impl From<&IngestConfig> for IngestOptions {
    fn from(config: &IngestConfig) -> Self {
        Self {
            chunk_size: config.chunk_size,
            extension: config.extension.clone(),
        }
    }
}

/// What happened to one input file.
#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    Committed { profile_id: i64, measurements: usize },
    /// Already ingested under this profile id.
    Skipped { profile_id: i64 },
    Failed(String),
}

impl From<TransactionOutcome> for FileOutcome {
    fn from(outcome: TransactionOutcome) -> Self {
        match outcome {
            TransactionOutcome::Committed {
                profile_id,
                measurements,
            } => FileOutcome::Committed {
                profile_id,
                measurements,
            },
            TransactionOutcome::Skipped { profile_id } => FileOutcome::Skipped { profile_id },
        }
    }
}

/// Outcomes of a directory run, in processing order.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub files: Vec<(PathBuf, FileOutcome)>,
    pub committed: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BatchReport {
    fn record(&mut self, path: PathBuf, outcome: FileOutcome) {
        match outcome {
            FileOutcome::Committed { .. } => self.committed += 1,
            FileOutcome::Skipped { .. } => self.skipped += 1,
            FileOutcome::Failed(_) => self.failed += 1,
        }
        self.files.push((path, outcome));
    }

    pub fn total(&self) -> usize {
        self.files.len()
    }
}

/// Core ingester for Argo profile files.
pub struct Ingester<S> {
    store: Arc<S>,
    options: IngestOptions,
}

impl<S: ProfileStore> Ingester<S> {
    pub fn new(store: Arc<S>, options: IngestOptions) -> Self {
        Self { store, options }
    }

    pub fn options(&self) -> &IngestOptions {
        &self.options
    }

    /// Ingest every matching file in `dir`, one after another.
    ///
    /// Only a failure to list the directory is an error; individual files
    /// report their own outcome.
    pub async fn ingest_directory(&self, dir: &Path) -> Result<BatchReport> {
        let files = scan_directory(dir, &self.options.extension).await?;
        info!(dir = %dir.display(), files = files.len(), "Starting batch ingestion");

        let mut report = BatchReport::default();
        for path in files {
            let outcome = self.ingest_file(&path).await;
            report.record(path, outcome);
        }

        info!(
            committed = report.committed,
            skipped = report.skipped,
            failed = report.failed,
            "Batch ingestion complete"
        );
        Ok(report)
    }

    /// Open, parse and persist one file.
    #[instrument(skip(self, path), fields(file = %path.display()))]
    pub async fn ingest_file(&self, path: &Path) -> FileOutcome {
        let owned = path.to_path_buf();
        let opened = tokio::task::spawn_blocking(move || open_profile_file(owned)).await;

        let file = match opened {
            Ok(Ok(file)) => file,
            Ok(Err(e)) => return failed(path, &IngestionError::Parse(e)),
            Err(e) => {
                error!(file = %path.display(), error = %e, "Reader task failed");
                return FileOutcome::Failed(e.to_string());
            }
        };

        self.ingest_profile_file(&file).await
    }

    /// Parse and persist an already opened file catalog.
    pub async fn ingest_profile_file(&self, file: &ProfileFile) -> FileOutcome {
        let path = Path::new(&file.path);

        let profile = match assemble_profile(file) {
            Ok(profile) => profile,
            Err(e) => return failed(path, &IngestionError::Parse(e)),
        };

        let transaction = IngestionTransaction::new(self.store.as_ref(), self.options.chunk_size);
        match transaction.run(&profile).await {
            Ok(TransactionOutcome::Committed {
                profile_id,
                measurements,
            }) => {
                info!(
                    file = %display_name(path),
                    profile_id = profile_id,
                    measurements = measurements,
                    "Ingested profile"
                );
                FileOutcome::Committed {
                    profile_id,
                    measurements,
                }
            }
            Ok(TransactionOutcome::Skipped { profile_id }) => {
                info!(
                    file = %display_name(path),
                    profile_id = profile_id,
                    "Skipped (already ingested)"
                );
                FileOutcome::Skipped { profile_id }
            }
            Err(e) => failed(path, &e),
        }
    }
}

fn failed(path: &Path, err: &IngestionError) -> FileOutcome {
    match err.stage() {
        Some(stage) => error!(
            file = %path.display(),
            stage = %stage,
            error = %err,
            "Failed to ingest"
        ),
        None => error!(file = %path.display(), error = %err, "Failed to ingest"),
    }
    FileOutcome::Failed(err.to_string())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Regular files directly inside `dir` whose extension matches, sorted by path.
async fn scan_directory(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let read_error = |source: std::io::Error| IngestionError::DirectoryRead {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(read_error)?;
    let mut files = Vec::new();

    while let Some(entry) = entries.next_entry().await.map_err(read_error)? {
        let path = entry.path();
        let is_file = match entry.file_type().await {
            Ok(kind) => kind.is_file(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Cannot stat entry, skipping");
                continue;
            }
        };
        if is_file && has_extension(&path, extension) {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}
