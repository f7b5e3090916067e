//! Rendered label files: relocation and deletion.
//!
//! The record list is the source of truth; the PNGs are derived from it via
//! [`LabelRecord::output_path`]. Both operations work item by item and never
//! stop on one file's failure. A file that is already gone counts as
//! [`ArtifactStatus::Missing`], which is the state the operation wanted
//! anyway, so repeating an operation is harmless.

use crate::error::LabelError;
use crate::output::LabelRecord;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// What happened to one label file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ArtifactStatus {
    Moved { to: PathBuf },
    Deleted,
    /// The source file was not there.
    Missing,
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactOutcome {
    pub path: PathBuf,
    #[serde(flatten)]
    pub status: ArtifactStatus,
}

/// Per-file results of one relocate or delete run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactReport {
    pub items: Vec<ArtifactOutcome>,
}

impl ArtifactReport {
    /// Files moved or deleted.
    pub fn applied(&self) -> usize {
        self.items
            .iter()
            .filter(|i| matches!(i.status, ArtifactStatus::Moved { .. } | ArtifactStatus::Deleted))
            .count()
    }

    pub fn missing(&self) -> usize {
        self.items
            .iter()
            .filter(|i| i.status == ArtifactStatus::Missing)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.items
            .iter()
            .filter(|i| matches!(i.status, ArtifactStatus::Failed { .. }))
            .count()
    }
}

/// Delete the PNG of every record in `dir`.
pub fn delete_artifacts(records: &[LabelRecord], dir: &Path) -> ArtifactReport {
    let items: Vec<ArtifactOutcome> = records
        .iter()
        .map(|record| {
            let path = record.output_path(dir);
            let status = match std::fs::remove_file(&path) {
                Ok(()) => ArtifactStatus::Deleted,
                Err(e) if e.kind() == ErrorKind::NotFound => ArtifactStatus::Missing,
                Err(e) => {
                    warn!("Could not delete {}: {}", path.display(), e);
                    ArtifactStatus::Failed {
                        reason: e.to_string(),
                    }
                }
            };
            debug!("delete {} → {:?}", path.display(), status);
            ArtifactOutcome { path, status }
        })
        .collect();

    let report = ArtifactReport { items };
    info!(
        "Deleted {} label images ({} already gone, {} failed)",
        report.applied(),
        report.missing(),
        report.failed()
    );
    report
}

/// Move the PNG of every record from `dir` into `destination`.
///
/// `destination` is created if needed; if that fails nothing is moved and a
/// single [`LabelError::DestinationUnavailable`] is returned.
pub fn relocate_artifacts(
    records: &[LabelRecord],
    dir: &Path,
    destination: &Path,
) -> Result<ArtifactReport, LabelError> {
    std::fs::create_dir_all(destination).map_err(|e| LabelError::DestinationUnavailable {
        path: destination.to_path_buf(),
        source: e,
    })?;

    let items: Vec<ArtifactOutcome> = records
        .iter()
        .map(|record| {
            let from = record.output_path(dir);
            let to = record.output_path(destination);
            let status = if !from.exists() {
                ArtifactStatus::Missing
            } else {
                match move_file(&from, &to) {
                    Ok(()) => ArtifactStatus::Moved { to },
                    Err(e) => {
                        warn!("Could not move {}: {}", from.display(), e);
                        ArtifactStatus::Failed {
                            reason: e.to_string(),
                        }
                    }
                }
            };
            debug!("relocate {} → {:?}", from.display(), status);
            ArtifactOutcome { path: from, status }
        })
        .collect();

    let report = ArtifactReport { items };
    info!(
        "Moved {} label images to {} ({} already gone, {} failed)",
        report.applied(),
        destination.display(),
        report.missing(),
        report.failed()
    );
    Ok(report)
}

/// Rename, or copy + remove when the rename crosses filesystems.
fn move_file(from: &Path, to: &Path) -> std::io::Result<()> {
    if from == to {
        return Ok(());
    }
    match std::fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            debug!(
                "rename {} failed ({}), copying instead",
                from.display(),
                rename_err
            );
            std::fs::copy(from, to)?;
            std::fs::remove_file(from)
        }
    }
}
