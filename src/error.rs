//! Error types for the edgequake-pdf2label library.
//!
//! Four error types reflect four distinct failure modes:
//!
//! * [`LabelError`]: **Fatal** for one operation. The document cannot be
//!   turned into text at all (missing `pdftotext`, non-zero exit, unreadable
//!   file), or a batch-wide artifact operation cannot start (destination
//!   directory cannot be created, nothing to act on, confirmation declined).
//!
//! * [`ExtractionError`]: **Expected, non-fatal**. A page carried no usable
//!   title. The page is skipped and the batch continues.
//!
//! * [`RenderError`]: **Unexpected, non-fatal**. Encoding or saving one label
//!   failed. Wrapped in [`PageError`] with the page number and file stem,
//!   stored in [`crate::output::PageOutcome`], and the batch continues.
//!
//! * [`AssetError`]: never propagated. A missing or corrupt logo/font only
//!   produces a log line and a fallback.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the edgequake-pdf2label library.
///
/// Page-level failures use [`PageError`] and are stored in
/// [`crate::output::PageOutcome`] rather than propagated here.
#[derive(Debug, Error)]
pub enum LabelError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input document was not found at the given path.
    #[error("Document not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Could not read the document or the text produced for it.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── External tool errors ──────────────────────────────────────────────
    /// The text-extraction utility could not be started.
    #[error(
        "'{tool}' was not found or could not be started: {source}\n\n\
Install poppler-utils:\n\
  • Debian/Ubuntu: sudo apt-get install poppler-utils\n\
  • macOS:         brew install poppler\n\
  • Windows:       https://github.com/oschwartz10612/poppler-windows/releases\n\
Or point --pdftotext at an existing binary."
    )]
    ToolNotFound {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// The text-extraction utility ran but exited with a failure status.
    #[error("'{tool}' failed on '{path}' ({status}): {stderr}")]
    ToolFailed {
        tool: String,
        path: PathBuf,
        status: String,
        stderr: String,
    },

    /// The utility exited cleanly but the expected text file is missing.
    #[error("No text was produced for '{path}' (expected '{expected}')")]
    TextNotProduced { path: PathBuf, expected: PathBuf },

    // ── Artifact errors ───────────────────────────────────────────────────
    /// The destination directory for relocated labels could not be created.
    #[error("Cannot use destination directory '{path}': {source}")]
    DestinationUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The session holds no rendered labels to act on.
    #[error("No labels to {action}")]
    NoLabels { action: &'static str },

    /// A destructive operation was requested without confirmation.
    #[error("Deleting {count} label images was not confirmed")]
    NotConfirmed { count: usize },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl LabelError {
    /// `true` for failures of the external text-extraction step.
    pub fn is_external_tool(&self) -> bool {
        matches!(
            self,
            LabelError::ToolNotFound { .. }
                | LabelError::ToolFailed { .. }
                | LabelError::TextNotProduced { .. }
        )
    }
}

/// Why a page produced no record. Both cases are expected and non-fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum ExtractionError {
    /// The page had no lines at all.
    #[error("page has no lines")]
    EmptyPage,

    /// The first line of the page is blank, so there is no title.
    #[error("page has no title line")]
    MissingTitle,
}

/// Drawing, encoding or saving a single label failed.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The composed canvas could not be encoded as PNG.
    #[error("PNG encoding failed: {0}")]
    Encode(#[source] image::ImageError),

    /// The PNG could not be written to disk.
    #[error("Failed to save '{path}': {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A non-fatal error for a single page.
///
/// Stored in [`crate::output::PageOutcome::Failed`]. The batch continues
/// with the next page.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum PageError {
    /// Rendering or saving the label image failed.
    #[error("Page {page}: label '{stem}' could not be rendered: {detail}")]
    RenderFailed {
        page: usize,
        stem: String,
        detail: String,
    },
}

impl PageError {
    pub(crate) fn render(page: usize, stem: &str, err: &RenderError) -> Self {
        PageError::RenderFailed {
            page,
            stem: stem.to_string(),
            detail: err.to_string(),
        }
    }
}

/// An optional asset (logo or font) could not be used.
///
/// Never returned from a public operation; callers fall back or omit the
/// element and log the reason.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("'{0}' does not exist")]
    NotFound(PathBuf),

    #[error("'{path}' could not be read: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{path}' could not be decoded: {detail}")]
    Undecodable { path: PathBuf, detail: String },
}
