//! Text source: turn a document into the flattened fixed-width text blob.
//!
//! ## Why shell out to pdftotext?
//!
//! The label PDFs are generated reports whose fields sit at fixed horizontal
//! positions. `pdftotext -fixed 800` keeps one field per physical line and
//! marks every page with a form feed, which is exactly the shape the
//! [`super::split`] and [`super::extract`] heuristics expect. Re-deriving that
//! layout from raw PDF operators is out of scope for this crate.
//!
//! Decoding is lenient: invalid UTF-8 is dropped, never fatal.

use crate::config::LabelConfig;
use crate::error::LabelError;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, warn};

/// Confirm the configured `pdftotext` can be started.
///
/// Runs `pdftotext -v`. Older poppler builds print the version on stderr and
/// some exit with status 99, so only a spawn failure counts as missing.
pub fn check_tool(config: &LabelConfig) -> Result<(), LabelError> {
    let tool = config.pdftotext.display().to_string();
    let output = Command::new(&config.pdftotext)
        .arg("-v")
        .output()
        .map_err(|e| LabelError::ToolNotFound {
            tool: tool.clone(),
            source: e,
        })?;
    debug!(
        "{} -v → {} ({})",
        tool,
        output.status,
        String::from_utf8_lossy(&output.stderr).lines().next().unwrap_or("")
    );
    Ok(())
}

/// Load the text of `path`.
///
/// A `.txt` input is read as-is; anything else is run through
/// [`extract_text`].
pub fn load_document_text(path: &Path, config: &LabelConfig) -> Result<String, LabelError> {
    if !path.exists() {
        return Err(LabelError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    if is_text_file(path) {
        debug!("Reading pre-extracted text: {}", path.display());
        return read_lossy(path);
    }
    extract_text(path, config)
}

/// Run `pdftotext -fixed <width> <pdf> <pdf-stem>.txt` and read the result.
pub fn extract_text(pdf: &Path, config: &LabelConfig) -> Result<String, LabelError> {
    let tool = config.pdftotext.display().to_string();
    let txt = text_path_for(pdf);
    info!("Extracting text: {} → {}", pdf.display(), txt.display());

    let output = Command::new(&config.pdftotext)
        .arg("-fixed")
        .arg(config.fixed_width.to_string())
        .arg(pdf)
        .arg(&txt)
        .output()
        .map_err(|e| LabelError::ToolNotFound {
            tool: tool.clone(),
            source: e,
        })?;

    if !output.status.success() {
        return Err(LabelError::ToolFailed {
            tool,
            path: pdf.to_path_buf(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    if !txt.exists() {
        return Err(LabelError::TextNotProduced {
            path: pdf.to_path_buf(),
            expected: txt,
        });
    }

    let text = read_lossy(&txt)?;

    if !config.keep_text_file {
        if let Err(e) = std::fs::remove_file(&txt) {
            warn!("Could not remove intermediate {}: {}", txt.display(), e);
        }
    }

    Ok(text)
}

/// Where `pdftotext` writes the text for `pdf`.
pub fn text_path_for(pdf: &Path) -> PathBuf {
    pdf.with_extension("txt")
}

/// Decode bytes as UTF-8, dropping invalid byte runs. Valid text, including
/// a literal U+FFFD, is kept as-is.
pub fn decode_lenient(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        out.push_str(chunk.valid());
    }
    out
}

fn read_lossy(path: &Path) -> Result<String, LabelError> {
    let bytes = std::fs::read(path).map_err(|e| LabelError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(decode_lenient(&bytes))
}

fn is_text_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("txt"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_utf8_is_untouched() {
        assert_eq!(decode_lenient("Cód.: 1".as_bytes()), "Cód.: 1");
    }

    #[test]
    fn invalid_bytes_are_dropped() {
        let bytes = [b'A', 0xff, b'B', 0xc3, b'\n'];
        assert_eq!(decode_lenient(&bytes), "AB\n");
    }

    #[test]
    fn literal_replacement_char_survives_invalid_bytes() {
        let mut bytes = "\u{FFFD} ok ".as_bytes().to_vec();
        bytes.push(0xff);
        assert_eq!(decode_lenient(&bytes), "\u{FFFD} ok ");
    }

    #[test]
    fn text_path_replaces_extension() {
        assert_eq!(
            text_path_for(Path::new("/docs/labels.pdf")),
            PathBuf::from("/docs/labels.txt")
        );
    }

    #[test]
    fn txt_input_skips_the_tool() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pages.TXT");
        std::fs::write(&path, b"TITLE\n\x0cOTHER\n").unwrap();

        let config = LabelConfig::builder()
            .pdftotext(dir.path().join("does-not-exist"))
            .build()
            .unwrap();
        let text = load_document_text(&path, &config).unwrap();
        assert_eq!(text, "TITLE\n\x0cOTHER\n");
    }

    #[test]
    fn missing_document_is_file_not_found() {
        let config = LabelConfig::default();
        let err = load_document_text(Path::new("/definitely/not/here.pdf"), &config).unwrap_err();
        assert!(matches!(err, LabelError::FileNotFound { .. }));
    }

    #[test]
    fn missing_tool_is_tool_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("doc.pdf");
        std::fs::write(&pdf, b"%PDF-1.4\n").unwrap();

        let config = LabelConfig::builder()
            .pdftotext(dir.path().join("no-such-pdftotext"))
            .build()
            .unwrap();

        let err = load_document_text(&pdf, &config).unwrap_err();
        assert!(matches!(err, LabelError::ToolNotFound { .. }), "got: {err:?}");
        assert!(check_tool(&config).is_err());
    }
}
