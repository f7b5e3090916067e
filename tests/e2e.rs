//! End-to-end integration tests for edgequake-pdf2label.
//!
//! Most tests feed pre-extracted text (a `.txt` document) through the whole
//! pipeline, so they need nothing but a temp directory. The tests that go
//! through a real PDF are skipped unless `pdftotext` can be started.
//!
//! Run with:
//!   cargo test --test e2e -- --nocapture

use edgequake_pdf2label::pipeline::text::check_tool;
use edgequake_pdf2label::{
    process_document, BatchPhase, Command, CommandOutcome, LabelConfig, LabelError,
    LabelProgressCallback, LabelRecord, LabelSession, PageOutcome,
};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Three retained pages: full record, record with footer lines between the
/// order marker and its value, and a page with only a title.
const BATCH_TEXT: &str = "\
   WIDGET X
   Cód.: 123
   Cód.Cliente: 999
   O.S./Item:
   9988/001
\u{0c}

\u{0c}   GADGET Y
   Cód.: 456
   O.S./Item:
   Matriz: Sapucaia do Sul/RS (51)3451.5100
   Filial: São Paulo/SP (11)5571.6329
   www.projelmec.com.br
   7001/002
\u{0c}   BARE TITLE
";

/// Config that never looks outside `dir` for assets, so every run uses the
/// builtin face and no logo.
fn isolated(dir: &Path) -> LabelConfig {
    LabelConfig::builder()
        .asset_dirs(vec![dir.to_path_buf()])
        .build()
        .expect("valid config")
}

fn write_doc(dir: &Path, name: &str, text: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, text).expect("write document");
    path
}

/// Skip this test unless `pdftotext` can be started.
macro_rules! skip_unless_pdftotext {
    () => {{
        if check_tool(&LabelConfig::default()).is_err() {
            println!("SKIP: pdftotext is not installed");
            return;
        }
    }};
}

/// A minimal PDF with one Helvetica text block per page.
fn minimal_pdf(pages: &[&[&str]]) -> Vec<u8> {
    let font_id = 3 + 2 * pages.len();
    let mut objects: Vec<String> = Vec::new();
    objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_string());
    let kids: Vec<String> = (0..pages.len())
        .map(|i| format!("{} 0 R", 3 + 2 * i))
        .collect();
    objects.push(format!(
        "<< /Type /Pages /Kids [{}] /Count {} >>",
        kids.join(" "),
        pages.len()
    ));
    for (i, lines) in pages.iter().enumerate() {
        let mut content = String::from("BT /F1 14 Tf 50 760 Td 18 TL\n");
        for line in lines.iter() {
            content.push_str(&format!("({}) Tj T*\n", line));
        }
        content.push_str("ET");
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
             /Resources << /Font << /F1 {} 0 R >> >> /Contents {} 0 R >>",
            font_id,
            4 + 2 * i
        ));
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            content.len(),
            content
        ));
    }
    objects.push("<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string());

    let mut pdf = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
    }
    let xref = pdf.len();
    pdf.extend_from_slice(format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).as_bytes());
    for off in offsets {
        pdf.extend_from_slice(format!("{:010} 00000 n \n", off).as_bytes());
    }
    pdf.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref
        )
        .as_bytes(),
    );
    pdf
}

// ── Text-driven pipeline tests ───────────────────────────────────────────────

#[test]
fn test_batch_from_text_document() {
    let dir = tempfile::tempdir().unwrap();
    let doc = write_doc(dir.path(), "batch.txt", BATCH_TEXT);

    let out = process_document(&doc, &isolated(dir.path())).expect("batch should run");

    assert_eq!(out.base_dir, dir.path());
    assert_eq!(out.stats.total_pages, 3, "blank page is not retained");
    assert_eq!(out.count(), 3);

    let first = &out.records[0];
    assert_eq!(first.title, "WIDGET X");
    assert_eq!(first.code, "Cód.: 123");
    assert_eq!(first.client_code, "Cód.Cliente: 999");
    assert_eq!(first.order_item, "9988/001");

    let second = &out.records[1];
    assert_eq!(second.client_code, "Cód.Cliente:");
    assert_eq!(second.order_item, "7001/002", "footer lines are skipped");

    let third = &out.records[2];
    assert_eq!(third.code, "Cód.: N/A");
    assert_eq!(third.order_item, "OS003/001");

    for name in ["9988001.png", "7001002.png", "OS003001.png"] {
        let png = image::open(dir.path().join(name)).expect("label is a readable PNG");
        assert_eq!((png.width(), png.height()), (640, 400));
    }
}

#[test]
fn test_unwritable_output_dir_yields_zero_labels() {
    let dir = tempfile::tempdir().unwrap();
    let doc = write_doc(dir.path(), "batch.txt", BATCH_TEXT);
    let config = LabelConfig::builder()
        .asset_dirs(vec![dir.path().to_path_buf()])
        .output_dir(dir.path().join("missing"))
        .build()
        .unwrap();

    let out = process_document(&doc, &config).expect("page failures are not fatal");
    assert_eq!(out.count(), 0);
    assert_eq!(out.stats.failed, 3);
    assert!(out
        .pages
        .iter()
        .all(|p| matches!(p, PageOutcome::Failed { .. })));
}

#[test]
fn test_rendering_is_deterministic() {
    let a = tempfile::tempdir().unwrap();
    let b = tempfile::tempdir().unwrap();
    LabelSession::new(isolated(a.path())).process_text(BATCH_TEXT, a.path());
    LabelSession::new(isolated(b.path())).process_text(BATCH_TEXT, b.path());

    for name in ["9988001.png", "7001002.png", "OS003001.png"] {
        let left = std::fs::read(a.path().join(name)).unwrap();
        let right = std::fs::read(b.path().join(name)).unwrap();
        assert_eq!(left, right, "{name} differs between runs");
    }
}

#[test]
fn test_fallback_order_items_follow_rendered_count() {
    let dir = tempfile::tempdir().unwrap();
    let text = "ONE\n\u{0c}   \n\u{0c}TWO\n\u{0c}THREE\nO.S./Item: 5/5\n\u{0c}FOUR\n";
    let out = LabelSession::new(isolated(dir.path())).process_text(text, dir.path());

    let items: Vec<&str> = out.records.iter().map(|r| r.order_item.as_str()).collect();
    assert_eq!(items, vec!["OS001/001", "OS002/001", "5/5", "OS004/001"]);
}

#[test]
fn test_relocate_then_delete() {
    let dir = tempfile::tempdir().unwrap();
    let dest = tempfile::tempdir().unwrap();
    let doc = write_doc(dir.path(), "batch.txt", BATCH_TEXT);
    let spool = dest.path().join("spool");

    let mut session = LabelSession::new(isolated(dir.path()));
    session
        .dispatch(Command::Process { document: doc })
        .expect("process");
    assert_eq!(session.phase(), BatchPhase::Done);

    match session.dispatch(Command::Relocate {
        destination: spool.clone(),
    }) {
        Ok(CommandOutcome::Relocated(report)) => assert_eq!(report.applied(), 3),
        other => panic!("unexpected: {other:?}"),
    }
    assert!(spool.join("9988001.png").exists());
    assert!(!dir.path().join("9988001.png").exists());

    // the moved files are no longer in the batch directory
    match session.dispatch(Command::Delete { confirmed: true }) {
        Ok(CommandOutcome::Deleted(report)) => {
            assert_eq!(report.missing(), 3);
            assert_eq!(report.failed(), 0);
        }
        other => panic!("unexpected: {other:?}"),
    }
    assert_eq!(session.count(), 0);
    assert!(spool.join("9988001.png").exists());

    assert!(matches!(
        session.dispatch(Command::Delete { confirmed: true }),
        Err(LabelError::NoLabels { .. })
    ));
}

#[test]
fn test_missing_tool_is_reported_for_pdf_input() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("labels.pdf");
    std::fs::write(&pdf, minimal_pdf(&[&["WIDGET X"]])).unwrap();

    let config = LabelConfig::builder()
        .pdftotext(dir.path().join("no-such-pdftotext"))
        .build()
        .unwrap();
    let err = process_document(&pdf, &config).unwrap_err();
    assert!(err.is_external_tool());
    assert!(matches!(err, LabelError::ToolNotFound { .. }), "got: {err:?}");
}

#[test]
fn test_callback_is_send_sync_across_threads() {
    #[derive(Default)]
    struct Counter(AtomicUsize);
    impl LabelProgressCallback for Counter {
        fn on_label_rendered(&self, _page: usize, _total: usize, _record: &LabelRecord) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    let counter = Arc::new(Counter::default());
    let cb = counter.clone();
    let handle = std::thread::spawn(move || {
        let dir = tempfile::tempdir().unwrap();
        let config = LabelConfig::builder()
            .asset_dirs(vec![dir.path().to_path_buf()])
            .progress_callback(cb)
            .build()
            .unwrap();
        LabelSession::new(config)
            .process_text(BATCH_TEXT, dir.path())
            .count()
    });
    assert_eq!(handle.join().unwrap(), 3);
    assert_eq!(counter.0.load(Ordering::SeqCst), 3);
}

#[test]
fn test_batch_output_is_json_serialisable() {
    let dir = tempfile::tempdir().unwrap();
    let out = LabelSession::new(isolated(dir.path())).process_text(BATCH_TEXT, dir.path());
    let json = serde_json::to_value(&out).expect("serialise");
    assert_eq!(json["stats"]["rendered"], 3);
    assert_eq!(json["pages"][0]["status"], "rendered");
    assert_eq!(json["records"][1]["order_item"], "7001/002");
}

// ── pdftotext tests (need poppler-utils) ─────────────────────────────────────

#[test]
fn test_pdf_document_end_to_end() {
    skip_unless_pdftotext!();
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("labels.pdf");
    std::fs::write(
        &pdf,
        minimal_pdf(&[&["WIDGET X", "Part one"], &["GADGET Y", "Part two"]]),
    )
    .unwrap();

    let out = process_document(&pdf, &isolated(dir.path())).expect("pdf batch");
    assert_eq!(out.count(), 2, "pages: {:?}", out.pages);
    assert!(out.records[0].title.starts_with("WIDGET"));
    assert!(out.records[1].title.starts_with("GADGET"));
    assert!(dir.path().join("labels.txt").exists(), "text file is kept by default");
    assert!(dir.path().join("OS001001.png").exists());
}

#[test]
fn test_pdf_text_file_can_be_removed() {
    skip_unless_pdftotext!();
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("labels.pdf");
    std::fs::write(&pdf, minimal_pdf(&[&["WIDGET X"]])).unwrap();

    let config = LabelConfig::builder()
        .asset_dirs(vec![dir.path().to_path_buf()])
        .keep_text_file(false)
        .build()
        .unwrap();
    let out = process_document(&pdf, &config).expect("pdf batch");
    assert_eq!(out.count(), 1);
    assert!(!dir.path().join("labels.txt").exists());
}

#[test]
fn test_corrupt_pdf_is_tool_failure() {
    skip_unless_pdftotext!();
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("broken.pdf");
    std::fs::write(&pdf, b"this is not a pdf at all").unwrap();

    let err = process_document(&pdf, &isolated(dir.path())).unwrap_err();
    assert!(err.is_external_tool(), "got: {err:?}");
}
