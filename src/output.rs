//! Output types: extracted records, per-page outcomes and batch statistics.

use crate::error::{ExtractionError, PageError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Stem prefix used when an order item has no filesystem-safe characters.
pub const FALLBACK_STEM_PREFIX: &str = "etiqueta";

/// One label, as extracted from one page.
///
/// Immutable once created. The session's ordered list is the owner; PNGs on
/// disk are derived from it and can always be re-rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRecord {
    /// First non-blank line of the page, stripped. Never empty.
    pub title: String,
    /// The whole `Cód.:` line, or `"Cód.: N/A"`.
    pub code: String,
    /// The whole `Cód.Cliente:` line, or the bare marker.
    pub client_code: String,
    /// Order/item identifier, or a generated `OSnnn/001`.
    pub order_item: String,
    /// 1-indexed position this record takes in its batch.
    pub sequence: usize,
}

impl LabelRecord {
    /// Filesystem-safe stem for this record's image.
    ///
    /// Keeps alphanumerics, space, `-` and `_` from `order_item` and trims
    /// trailing whitespace. Falls back to `etiqueta_{sequence}` when nothing
    /// survives.
    pub fn safe_filename(&self) -> String {
        let stem = sanitize_stem(&self.order_item);
        if stem.is_empty() {
            format!("{}_{}", FALLBACK_STEM_PREFIX, self.sequence)
        } else {
            stem
        }
    }

    /// `{dir}/{safe_filename}.png`
    pub fn output_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}.png", self.safe_filename()))
    }
}

/// Strip everything but alphanumerics, space, `-` and `_`, then trim the end.
pub fn sanitize_stem(raw: &str) -> String {
    let kept: String = raw
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();
    kept.trim_end().to_string()
}

/// What happened to one retained page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PageOutcome {
    /// The label was saved and appended to the batch.
    Rendered {
        page: usize,
        record: LabelRecord,
        path: PathBuf,
    },
    /// The page carried no record.
    Skipped { page: usize, reason: ExtractionError },
    /// A record was extracted but its image could not be produced.
    Failed { page: usize, error: PageError },
}

impl PageOutcome {
    /// 1-indexed page number among retained pages.
    pub fn page(&self) -> usize {
        match self {
            PageOutcome::Rendered { page, .. }
            | PageOutcome::Skipped { page, .. }
            | PageOutcome::Failed { page, .. } => *page,
        }
    }

    /// `false` only for unexpected failures (I/O, encoding).
    pub fn is_expected(&self) -> bool {
        !matches!(self, PageOutcome::Failed { .. })
    }
}

/// Counters for one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStats {
    /// Retained (non-blank) pages.
    pub total_pages: usize,
    pub rendered: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Saved labels that replaced a file written earlier in the same batch.
    pub overwritten: usize,
    pub duration_ms: u64,
}

/// The result of processing one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutput {
    /// Directory the labels were written to.
    pub base_dir: PathBuf,
    /// Successfully rendered records, in page order.
    pub records: Vec<LabelRecord>,
    /// One entry per retained page.
    pub pages: Vec<PageOutcome>,
    pub stats: BatchStats,
}

impl BatchOutput {
    /// Number of labels produced.
    pub fn count(&self) -> usize {
        self.records.len()
    }
}
