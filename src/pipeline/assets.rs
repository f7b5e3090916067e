//! Optional assets: logo image and TrueType fonts.
//!
//! Both are looked up through [`resolve_with_fallbacks`]: an ordered list of
//! candidates is tried in turn and the first one that loads wins. Failures
//! are logged at debug level and never surface as errors; a missing logo is
//! simply not drawn and missing fonts select [`FontSet::builtin`].

use crate::config::LabelConfig;
use crate::error::AssetError;
use crate::pipeline::font::FontSet;
use image::imageops::FilterType;
use image::RgbaImage;
use rusttype::Font;
use std::fmt::{Debug, Display};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Logo size on the label.
pub const LOGO_WIDTH: u32 = 320;
pub const LOGO_HEIGHT: u32 = 93;

/// Folders where TrueType files usually live.
const SYSTEM_FONT_DIRS: [&str; 6] = [
    "/usr/share/fonts/truetype/msttcorefonts",
    "/usr/share/fonts/TTF",
    "/usr/share/fonts/truetype",
    "/Library/Fonts",
    "/System/Library/Fonts/Supplemental",
    "C:\\Windows\\Fonts",
];

/// Try `candidates` in order and return the first that `load` accepts.
///
/// Each rejection is logged with `what` as context. Returns `None` when every
/// candidate fails (or there are none).
pub fn resolve_with_fallbacks<C, T, E, I, F>(what: &str, candidates: I, mut load: F) -> Option<(C, T)>
where
    C: Debug,
    E: Display,
    I: IntoIterator<Item = C>,
    F: FnMut(&C) -> Result<T, E>,
{
    for candidate in candidates {
        match load(&candidate) {
            Ok(value) => {
                debug!("{}: using {:?}", what, candidate);
                return Some((candidate, value));
            }
            Err(e) => debug!("{}: skipping {:?}: {}", what, candidate, e),
        }
    }
    debug!("{}: no candidate could be loaded", what);
    None
}

/// Everything the renderer needs besides the record itself.
#[derive(Debug, Clone)]
pub struct LabelAssets {
    /// Logo already resized to [`LOGO_WIDTH`]×[`LOGO_HEIGHT`].
    pub logo: Option<RgbaImage>,
    pub fonts: FontSet,
}

impl LabelAssets {
    /// No logo, builtin face. Rendering with these is fully deterministic.
    pub fn fallback() -> Self {
        Self {
            logo: None,
            fonts: FontSet::builtin(),
        }
    }

    /// Resolve logo and fonts for a batch writing into `base_dir`.
    pub fn resolve(config: &LabelConfig, base_dir: &Path) -> Self {
        let logo = resolve_logo(config, base_dir);
        let fonts = resolve_fonts(config, base_dir);
        info!(
            "Assets: logo {}, fonts {}",
            if logo.is_some() { "found" } else { "absent" },
            if fonts.is_builtin() { "builtin" } else { "truetype" }
        );
        Self { logo, fonts }
    }
}

/// Directories searched for assets, in order.
///
/// Executable directory, working directory, the bare relative name (empty
/// path), then `base_dir`. `config.asset_dirs` replaces this list.
pub fn asset_dirs(config: &LabelConfig, base_dir: &Path) -> Vec<PathBuf> {
    if let Some(ref dirs) = config.asset_dirs {
        return dirs.clone();
    }
    let mut dirs = Vec::with_capacity(4);
    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
    {
        dirs.push(exe_dir);
    }
    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd);
    }
    dirs.push(PathBuf::new());
    dirs.push(base_dir.to_path_buf());
    dirs
}

/// Ordered logo candidates: explicit path first, then each asset dir.
pub fn logo_candidates(config: &LabelConfig, base_dir: &Path) -> Vec<PathBuf> {
    config
        .logo_path
        .iter()
        .cloned()
        .chain(
            asset_dirs(config, base_dir)
                .into_iter()
                .map(|d| d.join(&config.logo_file_name)),
        )
        .collect()
}

/// Find, decode and resize the logo.
pub fn resolve_logo(config: &LabelConfig, base_dir: &Path) -> Option<RgbaImage> {
    resolve_with_fallbacks("logo", logo_candidates(config, base_dir), |path| load_logo(path))
        .map(|(_, logo)| logo)
}

/// Decode `path` and scale it to the logo box.
pub fn load_logo(path: &Path) -> Result<RgbaImage, AssetError> {
    if !path.is_file() {
        return Err(AssetError::NotFound(path.to_path_buf()));
    }
    let img = image::open(path).map_err(|e| AssetError::Undecodable {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;
    Ok(image::imageops::resize(
        &img.to_rgba8(),
        LOGO_WIDTH,
        LOGO_HEIGHT,
        FilterType::Lanczos3,
    ))
}

/// Find the bold/regular pair, or fall back to the builtin face.
pub fn resolve_fonts(config: &LabelConfig, base_dir: &Path) -> FontSet {
    let mut dirs = asset_dirs(config, base_dir);
    if config.asset_dirs.is_none() {
        dirs.extend(SYSTEM_FONT_DIRS.iter().map(PathBuf::from));
    }
    resolve_with_fallbacks("fonts", dirs, |dir| {
        let bold = load_font(&dir.join(&config.bold_font_file))?;
        let regular = load_font(&dir.join(&config.regular_font_file))?;
        Ok::<_, AssetError>(FontSet::from_pair(bold, regular))
    })
    .map(|(_, set)| set)
    .unwrap_or_else(FontSet::builtin)
}

/// Read and parse one TrueType/OpenType file.
pub fn load_font(path: &Path) -> Result<Font<'static>, AssetError> {
    if !path.is_file() {
        return Err(AssetError::NotFound(path.to_path_buf()));
    }
    let bytes = std::fs::read(path).map_err(|e| AssetError::Unreadable {
        path: path.to_path_buf(),
        source: e,
    })?;
    Font::try_from_vec(bytes).ok_or_else(|| AssetError::Undecodable {
        path: path.to_path_buf(),
        detail: "not a TrueType/OpenType font".to_string(),
    })
}
