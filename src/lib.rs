//! # edgequake-pdf2label
//!
//! Turn label PDFs into fixed-template 640×400 PNG labels.
//!
//! ## Why this crate?
//!
//! The source PDFs are generated reports: every page describes one part
//! (title, internal code, client code, order/item) at fixed positions.
//! `pdftotext -fixed` flattens each page into predictable lines, a handful
//! of marker heuristics recover the fields, and a deterministic renderer
//! draws them onto a branded template ready for a label printer.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Text     pdftotext -fixed 800 → text blob (lenient UTF-8)
//!  ├─ 2. Split    form feeds → pages, blank edges trimmed
//!  ├─ 3. Extract  title / Cód. / Cód.Cliente / O.S./Item per page
//!  ├─ 4. Render   640×400 PNG per record, named after the order item
//!  └─ 5. Output   ordered records + per-page outcomes + stats
//! ```
//!
//! Afterwards the same [`LabelSession`] can move the PNGs elsewhere or
//! delete them.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_pdf2label::{process_document, LabelConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = LabelConfig::default();
//!     let output = process_document("labels.pdf", &config)?;
//!     println!("{} labels in {}", output.count(), output.base_dir.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2label` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! edgequake-pdf2label = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod artifacts;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod session;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use artifacts::{
    delete_artifacts, relocate_artifacts, ArtifactOutcome, ArtifactReport, ArtifactStatus,
};
pub use config::{Footer, LabelConfig, LabelConfigBuilder};
pub use error::{AssetError, ExtractionError, LabelError, PageError, RenderError};
pub use output::{BatchOutput, BatchStats, LabelRecord, PageOutcome};
pub use progress::{LabelProgressCallback, NoopProgressCallback, ProgressCallback};
pub use session::{process_document, BatchPhase, Command, CommandOutcome, LabelSession};
