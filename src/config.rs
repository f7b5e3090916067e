//! Configuration types for label extraction and rendering.
//!
//! All pipeline behaviour is controlled through [`LabelConfig`], built via its
//! [`LabelConfigBuilder`]. The defaults reproduce the fixed label template:
//! `pdftotext -fixed 800`, the `projelmec.png` logo, the Arial bold/regular
//! pair and the company footer lines.
//!
//! # Asset search
//! Logo and fonts are optional. When `asset_dirs` is `None` they are looked up
//! in the executable's directory, the working directory, the bare relative
//! name, and finally the document's directory (fonts additionally in the
//! usual system font folders). Setting `asset_dirs` replaces that list, which
//! is how tests pin rendering to the builtin fallback face.

use crate::error::LabelError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Configuration for one label-processing session.
///
/// Built via [`LabelConfig::builder()`] or using [`LabelConfig::default()`].
///
/// # Example
/// ```rust
/// use edgequake_pdf2label::LabelConfig;
///
/// let config = LabelConfig::builder()
///     .pdftotext("/usr/local/bin/pdftotext")
///     .keep_text_file(false)
///     .build()
///     .unwrap();
/// assert_eq!(config.fixed_width, 800);
/// ```
#[derive(Clone)]
pub struct LabelConfig {
    /// Path or bare name of the `pdftotext` binary. Default: `"pdftotext"`.
    pub pdftotext: PathBuf,

    /// Value passed to `pdftotext -fixed`. Default: 800.
    ///
    /// Large values keep every label field on its own physical line, which is
    /// what the prefix heuristics in [`crate::pipeline::extract`] rely on.
    pub fixed_width: u32,

    /// Keep the intermediate `.txt` beside the PDF. Default: true.
    pub keep_text_file: bool,

    /// Directory the PNGs are written to. Default: the document's directory.
    pub output_dir: Option<PathBuf>,

    /// Explicit logo file, tried before any search location.
    pub logo_path: Option<PathBuf>,

    /// File name searched for in the asset locations. Default: `"projelmec.png"`.
    pub logo_file_name: String,

    /// Bold TrueType file name. Default: `"arialbd.ttf"`.
    pub bold_font_file: String,

    /// Regular TrueType file name. Default: `"arial.ttf"`.
    pub regular_font_file: String,

    /// Replaces the default asset search locations when set.
    pub asset_dirs: Option<Vec<PathBuf>>,

    /// Footer lines printed on every label.
    pub footer: Footer,

    /// Per-page progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            pdftotext: PathBuf::from("pdftotext"),
            fixed_width: 800,
            keep_text_file: true,
            output_dir: None,
            logo_path: None,
            logo_file_name: "projelmec.png".to_string(),
            bold_font_file: "arialbd.ttf".to_string(),
            regular_font_file: "arial.ttf".to_string(),
            asset_dirs: None,
            footer: Footer::default(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for LabelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LabelConfig")
            .field("pdftotext", &self.pdftotext)
            .field("fixed_width", &self.fixed_width)
            .field("keep_text_file", &self.keep_text_file)
            .field("output_dir", &self.output_dir)
            .field("logo_path", &self.logo_path)
            .field("logo_file_name", &self.logo_file_name)
            .field("bold_font_file", &self.bold_font_file)
            .field("regular_font_file", &self.regular_font_file)
            .field("asset_dirs", &self.asset_dirs)
            .field("footer", &self.footer)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn LabelProgressCallback>"),
            )
            .finish()
    }
}

impl LabelConfig {
    /// Create a new builder for `LabelConfig`.
    pub fn builder() -> LabelConfigBuilder {
        LabelConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`LabelConfig`].
#[derive(Debug)]
pub struct LabelConfigBuilder {
    config: LabelConfig,
}

impl LabelConfigBuilder {
    pub fn pdftotext(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdftotext = path.into();
        self
    }

    pub fn fixed_width(mut self, width: u32) -> Self {
        self.config.fixed_width = width;
        self
    }

    pub fn keep_text_file(mut self, keep: bool) -> Self {
        self.config.keep_text_file = keep;
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = Some(dir.into());
        self
    }

    pub fn logo_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.logo_path = Some(path.into());
        self
    }

    pub fn logo_file_name(mut self, name: impl Into<String>) -> Self {
        self.config.logo_file_name = name.into();
        self
    }

    pub fn bold_font_file(mut self, name: impl Into<String>) -> Self {
        self.config.bold_font_file = name.into();
        self
    }

    pub fn regular_font_file(mut self, name: impl Into<String>) -> Self {
        self.config.regular_font_file = name.into();
        self
    }

    /// Restrict asset lookup to these directories, in order.
    pub fn asset_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.config.asset_dirs = Some(dirs);
        self
    }

    pub fn footer(mut self, footer: Footer) -> Self {
        self.config.footer = footer;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<LabelConfig, LabelError> {
        let c = &self.config;
        if c.fixed_width == 0 {
            return Err(LabelError::InvalidConfig(
                "fixed width must be ≥ 1".into(),
            ));
        }
        if c.pdftotext.as_os_str().is_empty() {
            return Err(LabelError::InvalidConfig(
                "pdftotext path must not be empty".into(),
            ));
        }
        for (what, name) in [
            ("logo file name", &c.logo_file_name),
            ("bold font file", &c.bold_font_file),
            ("regular font file", &c.regular_font_file),
        ] {
            if name.trim().is_empty() {
                return Err(LabelError::InvalidConfig(format!("{what} must not be empty")));
            }
        }
        Ok(self.config)
    }
}

/// The three contact lines printed at the bottom of every label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Footer {
    /// Left-aligned head-office line.
    pub matriz: String,
    /// Right-aligned branch line.
    pub filial: String,
    /// Centred website line.
    pub website: String,
}

impl Default for Footer {
    fn default() -> Self {
        Self {
            matriz: "Matriz: Sapucaia do Sul/RS (51)3451.5100".to_string(),
            filial: "Filial: São Paulo/SP (11)5571.6329".to_string(),
            website: "www.projelmec.com.br".to_string(),
        }
    }
}
