//! Batch orchestration: one document in, one list of rendered labels out.
//!
//! [`LabelSession`] owns the state a batch leaves behind (the ordered record
//! list, the directory the PNGs went to, the current phase) so later
//! commands can relocate or delete exactly what the last batch produced.
//! Everything runs synchronously on the caller's thread.
//!
//! ```text
//! Idle ──process──▶ Splitting ──▶ Rendering{1..n} ──▶ Done
//!                       ▲                                │
//!                       └────────── process again ───────┘
//! ```

use crate::artifacts::{self, ArtifactReport};
use crate::config::LabelConfig;
use crate::error::{LabelError, PageError};
use crate::output::{BatchOutput, BatchStats, LabelRecord, PageOutcome};
use crate::pipeline::{assets::LabelAssets, extract, render, split, text};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Where a session is in its current batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum BatchPhase {
    Idle,
    Splitting,
    /// Working on retained page `page` (1-indexed).
    Rendering { page: usize },
    Done,
}

/// A request a front end can hand to [`LabelSession::dispatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Convert a document (PDF or pre-extracted `.txt`) into labels.
    Process { document: PathBuf },
    /// Move the last batch's PNGs into `destination`.
    Relocate { destination: PathBuf },
    /// Delete the last batch's PNGs. Refused unless `confirmed`.
    Delete { confirmed: bool },
}

/// Result of a successful [`Command`].
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum CommandOutcome {
    Processed(BatchOutput),
    Relocated(ArtifactReport),
    Deleted(ArtifactReport),
}

/// Caller-owned state for a sequence of batches.
pub struct LabelSession {
    config: LabelConfig,
    base_dir: Option<PathBuf>,
    records: Vec<LabelRecord>,
    phase: BatchPhase,
}

impl LabelSession {
    pub fn new(config: LabelConfig) -> Self {
        Self {
            config,
            base_dir: None,
            records: Vec::new(),
            phase: BatchPhase::Idle,
        }
    }

    pub fn config(&self) -> &LabelConfig {
        &self.config
    }

    /// Records rendered by the last batch, in page order.
    pub fn records(&self) -> &[LabelRecord] {
        &self.records
    }

    /// Number of labels rendered by the last batch.
    pub fn count(&self) -> usize {
        self.records.len()
    }

    /// Directory the last batch wrote into.
    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    pub fn phase(&self) -> BatchPhase {
        self.phase
    }

    /// Run one command against this session.
    pub fn dispatch(&mut self, command: Command) -> Result<CommandOutcome, LabelError> {
        debug!("dispatch {:?}", command);
        match command {
            Command::Process { document } => {
                self.process_document(&document).map(CommandOutcome::Processed)
            }
            Command::Relocate { destination } => self
                .relocate_artifacts(&destination)
                .map(CommandOutcome::Relocated),
            Command::Delete { confirmed } => {
                self.delete_artifacts(confirmed).map(CommandOutcome::Deleted)
            }
        }
    }

    /// Turn `path` into labels written next to it (or into the configured
    /// output directory).
    ///
    /// # Errors
    /// Only text acquisition is fatal: a missing document, a missing or
    /// failing `pdftotext`, or unreadable text. Pages that yield nothing or
    /// fail to save are reported in the returned [`BatchOutput`].
    pub fn process_document(&mut self, path: &Path) -> Result<BatchOutput, LabelError> {
        info!("Processing {}", path.display());
        self.reset();
        let base_dir = self.output_dir_for(path);
        let text = match text::load_document_text(path, &self.config) {
            Ok(text) => text,
            Err(e) => {
                self.phase = BatchPhase::Idle;
                return Err(e);
            }
        };
        Ok(self.process_text(&text, &base_dir))
    }

    /// Split `text` into pages and render one label per usable page into
    /// `base_dir`. Never fails as a whole.
    pub fn process_text(&mut self, text: &str, base_dir: &Path) -> BatchOutput {
        let start = Instant::now();
        self.reset();
        self.base_dir = Some(base_dir.to_path_buf());

        let pages = split::split_pages(text);
        let total = pages.len();
        info!("{} retained pages, writing labels to {}", total, base_dir.display());

        let assets = LabelAssets::resolve(&self.config, base_dir);
        let cb = self.config.progress_callback.clone();
        if let Some(ref cb) = cb {
            cb.on_batch_start(total);
        }

        let mut outcomes = Vec::with_capacity(total);
        let mut stems: HashSet<String> = HashSet::new();
        let mut stats = BatchStats {
            total_pages: total,
            ..BatchStats::default()
        };

        for (idx, lines) in pages.iter().enumerate() {
            let page = idx + 1;
            self.phase = BatchPhase::Rendering { page };

            let record = match extract::extract_fields(lines, self.records.len()) {
                Ok(record) => record,
                Err(reason) => {
                    warn!("Page {}/{} skipped: {}", page, total, reason);
                    if let Some(ref cb) = cb {
                        cb.on_page_skipped(page, total, &reason.to_string());
                    }
                    stats.skipped += 1;
                    outcomes.push(PageOutcome::Skipped { page, reason });
                    continue;
                }
            };

            let stem = record.safe_filename();
            match render::render_label(&record, &assets, &self.config.footer, base_dir) {
                Ok(path) => {
                    debug!("Page {}/{} → {}", page, total, path.display());
                    if !stems.insert(stem) {
                        warn!(
                            "Page {}: {} replaced a label written earlier in this batch",
                            page,
                            path.display()
                        );
                        stats.overwritten += 1;
                    }
                    if let Some(ref cb) = cb {
                        cb.on_label_rendered(page, total, &record);
                    }
                    stats.rendered += 1;
                    self.records.push(record.clone());
                    outcomes.push(PageOutcome::Rendered { page, record, path });
                }
                Err(e) => {
                    let error = PageError::render(page, &stem, &e);
                    warn!("{}", error);
                    if let Some(ref cb) = cb {
                        cb.on_page_failed(page, total, &error.to_string());
                    }
                    stats.failed += 1;
                    outcomes.push(PageOutcome::Failed { page, error });
                }
            }
        }

        self.phase = BatchPhase::Done;
        stats.duration_ms = start.elapsed().as_millis() as u64;
        if let Some(ref cb) = cb {
            cb.on_batch_complete(total, stats.rendered);
        }
        info!(
            "Batch done: {} rendered, {} skipped, {} failed in {}ms",
            stats.rendered, stats.skipped, stats.failed, stats.duration_ms
        );

        BatchOutput {
            base_dir: base_dir.to_path_buf(),
            records: self.records.clone(),
            pages: outcomes,
            stats,
        }
    }

    /// Move the last batch's PNGs into `destination`.
    ///
    /// The record list is kept, so a later delete still knows what the
    /// batch produced; the files it looks for are simply gone.
    pub fn relocate_artifacts(&self, destination: &Path) -> Result<ArtifactReport, LabelError> {
        let dir = self.require_labels("save")?;
        artifacts::relocate_artifacts(&self.records, dir, destination)
    }

    /// Delete the last batch's PNGs and forget the batch.
    pub fn delete_artifacts(&mut self, confirmed: bool) -> Result<ArtifactReport, LabelError> {
        let dir = self.require_labels("delete")?.to_path_buf();
        if !confirmed {
            return Err(LabelError::NotConfirmed {
                count: self.records.len(),
            });
        }
        let report = artifacts::delete_artifacts(&self.records, &dir);
        self.records.clear();
        Ok(report)
    }

    fn require_labels(&self, action: &'static str) -> Result<&Path, LabelError> {
        match self.base_dir.as_deref() {
            Some(dir) if !self.records.is_empty() => Ok(dir),
            _ => Err(LabelError::NoLabels { action }),
        }
    }

    fn output_dir_for(&self, document: &Path) -> PathBuf {
        if let Some(ref dir) = self.config.output_dir {
            return dir.clone();
        }
        document
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    fn reset(&mut self) {
        self.records.clear();
        self.phase = BatchPhase::Splitting;
    }
}

/// Process `path` in a fresh session.
///
/// Convenience for one-shot callers that never relocate or delete.
pub fn process_document(path: impl AsRef<Path>, config: &LabelConfig) -> Result<BatchOutput, LabelError> {
    LabelSession::new(config.clone()).process_document(path.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::LabelProgressCallback;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const TWO_LABELS: &str = "WIDGET X\nCód.: 123\nCód.Cliente: 999\nO.S./Item:\n9988/001\n\x0c\
                              \n\n\x0c\
                              GADGET Y\nCód.: 456\n";

    fn isolated(dir: &Path) -> LabelConfig {
        LabelConfig::builder()
            .asset_dirs(vec![dir.to_path_buf()])
            .build()
            .unwrap()
    }

    #[test]
    fn new_session_is_idle_and_empty() {
        let session = LabelSession::new(LabelConfig::default());
        assert_eq!(session.phase(), BatchPhase::Idle);
        assert_eq!(session.count(), 0);
        assert!(session.base_dir().is_none());
    }

    #[test]
    fn process_text_renders_each_titled_page() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = LabelSession::new(isolated(dir.path()));
        let out = session.process_text(TWO_LABELS, dir.path());

        assert_eq!(out.count(), 2);
        assert_eq!(out.stats.total_pages, 2);
        assert_eq!(out.stats.rendered, 2);
        assert_eq!(session.phase(), BatchPhase::Done);
        assert_eq!(session.records()[1].order_item, "OS002/001");
        assert!(dir.path().join("9988001.png").exists());
        assert!(dir.path().join("OS002001.png").exists());
    }

    #[test]
    fn blank_edges_are_trimmed_before_extraction() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = LabelSession::new(isolated(dir.path()));
        let out = session.process_text("   \nCód.: 1\n", dir.path());
        assert_eq!(out.count(), 1);
        assert_eq!(out.records[0].title, "Cód.: 1");

        let out = session.process_text("", dir.path());
        assert_eq!(out.count(), 0);
        assert!(out.pages.is_empty());
    }

    #[test]
    fn save_failure_is_recorded_not_appended() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone");
        let mut session = LabelSession::new(isolated(dir.path()));
        let out = session.process_text(TWO_LABELS, &missing);

        assert_eq!(out.count(), 0);
        assert_eq!(out.stats.failed, 2);
        assert!(out.pages.iter().all(|p| !p.is_expected()));
        // every page failed, so the fallback sequence never advanced
        assert!(matches!(
            &out.pages[1],
            PageOutcome::Failed { error: PageError::RenderFailed { stem, .. }, .. } if stem == "OS001001"
        ));
    }

    #[test]
    fn repeated_stem_counts_as_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = LabelSession::new(isolated(dir.path()));
        let text = "A\nO.S./Item: 7/1\n\x0cB\nO.S./Item: 7/1\n\x0cC\nO.S./Item: 8/1\n";
        let out = session.process_text(text, dir.path());

        assert_eq!(out.count(), 3);
        assert_eq!(out.stats.overwritten, 1);
    }

    #[test]
    fn failed_save_is_not_an_earlier_write() {
        let dir = tempfile::tempdir().unwrap();
        // a directory in the way makes every save of this stem fail
        std::fs::create_dir(dir.path().join("71.png")).unwrap();
        let mut session = LabelSession::new(isolated(dir.path()));
        let text = "A\nO.S./Item: 7/1\n\x0cB\nO.S./Item: 7/1\n";
        let out = session.process_text(text, dir.path());

        assert_eq!(out.stats.failed, 2);
        assert_eq!(out.stats.overwritten, 0);
    }

    #[test]
    fn reprocessing_resets_the_list() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = LabelSession::new(isolated(dir.path()));
        session.process_text(TWO_LABELS, dir.path());
        session.process_text("ONLY\n", dir.path());
        assert_eq!(session.count(), 1);
        assert_eq!(session.records()[0].sequence, 1);
    }

    #[test]
    fn delete_requires_labels_and_confirmation() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = LabelSession::new(isolated(dir.path()));
        assert!(matches!(
            session.delete_artifacts(true),
            Err(LabelError::NoLabels { .. })
        ));

        session.process_text(TWO_LABELS, dir.path());
        assert!(matches!(
            session.delete_artifacts(false),
            Err(LabelError::NotConfirmed { count: 2 })
        ));
        assert!(dir.path().join("9988001.png").exists());

        let report = session.delete_artifacts(true).unwrap();
        assert_eq!(report.applied(), 2);
        assert_eq!(session.count(), 0);
        assert!(!dir.path().join("9988001.png").exists());
    }

    #[test]
    fn dispatch_relocate_then_delete() {
        let dir = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        let doc = dir.path().join("labels.txt");
        std::fs::write(&doc, TWO_LABELS).unwrap();

        let mut session = LabelSession::new(isolated(dir.path()));
        let out = session
            .dispatch(Command::Process { document: doc })
            .unwrap();
        assert!(matches!(out, CommandOutcome::Processed(ref b) if b.count() == 2));

        let moved = session
            .dispatch(Command::Relocate {
                destination: dest.path().to_path_buf(),
            })
            .unwrap();
        assert!(matches!(moved, CommandOutcome::Relocated(ref r) if r.applied() == 2));
        assert!(dest.path().join("9988001.png").exists());

        let deleted = session
            .dispatch(Command::Delete { confirmed: true })
            .unwrap();
        assert!(matches!(deleted, CommandOutcome::Deleted(ref r) if r.missing() == 2));
        assert!(dest.path().join("9988001.png").exists());
    }

    #[test]
    fn failed_text_load_leaves_session_idle() {
        let mut session = LabelSession::new(LabelConfig::default());
        let err = session
            .process_document(Path::new("/definitely/not/here.pdf"))
            .unwrap_err();
        assert!(matches!(err, LabelError::FileNotFound { .. }));
        assert_eq!(session.phase(), BatchPhase::Idle);
    }

    #[test]
    fn output_dir_overrides_document_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("labels.txt");
        std::fs::write(&doc, "ONE\nO.S./Item: 7/1\n").unwrap();

        let config = LabelConfig::builder()
            .asset_dirs(vec![dir.path().to_path_buf()])
            .output_dir(out_dir.path())
            .build()
            .unwrap();
        let out = process_document(&doc, &config).unwrap();
        assert_eq!(out.base_dir, out_dir.path());
        assert!(out_dir.path().join("71.png").exists());
    }

    #[derive(Default)]
    struct Counter {
        started: AtomicUsize,
        rendered: AtomicUsize,
        completed: AtomicUsize,
    }

    impl LabelProgressCallback for Counter {
        fn on_batch_start(&self, total_pages: usize) {
            self.started.store(total_pages, Ordering::SeqCst);
        }
        fn on_label_rendered(&self, _page: usize, _total: usize, _record: &LabelRecord) {
            self.rendered.fetch_add(1, Ordering::SeqCst);
        }
        fn on_batch_complete(&self, _total_pages: usize, rendered: usize) {
            self.completed.store(rendered, Ordering::SeqCst);
        }
    }

    #[test]
    fn progress_callback_sees_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        let counter = Arc::new(Counter::default());
        let config = LabelConfig::builder()
            .asset_dirs(vec![dir.path().to_path_buf()])
            .progress_callback(counter.clone())
            .build()
            .unwrap();
        LabelSession::new(config).process_text(TWO_LABELS, dir.path());

        assert_eq!(counter.started.load(Ordering::SeqCst), 2);
        assert_eq!(counter.rendered.load(Ordering::SeqCst), 2);
        assert_eq!(counter.completed.load(Ordering::SeqCst), 2);
    }
}
