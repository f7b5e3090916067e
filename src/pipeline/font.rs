//! Text faces used to draw label text onto the canvas.
//!
//! Two kinds of face exist:
//!
//! * [`Face::TrueType`]: a `rusttype` font at a pixel size. Glyph coverage is
//!   alpha-blended onto the canvas.
//! * [`Face::Bitmap`]: a builtin 5×8 ASCII bitmap font drawn at an integer
//!   scale. It needs no file on disk, so rendering never fails for lack of
//!   fonts. Latin accented letters are folded to their base letter and any
//!   other character is drawn as `?`.
//!
//! Text is positioned by its top-left corner (ascender line), like the label
//! template's coordinates.

use image::{Rgba, RgbaImage};
use rusttype::{point, Font, Scale};
use std::sync::Arc;

/// Uniform scale of the builtin face: 10×16 px cells.
pub const BITMAP_SCALE: u32 = 2;

const GLYPH_COLUMNS: u32 = 5;
const GLYPH_ROWS: u32 = 8;
const GLYPH_ADVANCE: u32 = GLYPH_COLUMNS + 1;

/// A font at one size.
#[derive(Clone)]
pub enum Face {
    TrueType { font: Arc<Font<'static>>, px: f32 },
    Bitmap { scale: u32 },
}

impl std::fmt::Debug for Face {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Face::TrueType { px, .. } => write!(f, "TrueType({px}px)"),
            Face::Bitmap { scale } => write!(f, "Bitmap(x{scale})"),
        }
    }
}

impl Face {
    /// The builtin fallback face.
    pub fn builtin() -> Self {
        Face::Bitmap {
            scale: BITMAP_SCALE,
        }
    }

    /// Width of `text` in pixels.
    ///
    /// `None` when the face has no glyph for some visible character, in which
    /// case callers fall back to a fixed position.
    pub fn measure(&self, text: &str) -> Option<f32> {
        match self {
            Face::TrueType { font, px } => {
                let scale = Scale::uniform(*px);
                let missing = text
                    .chars()
                    .any(|c| !c.is_whitespace() && font.glyph(c).id().0 == 0);
                if missing {
                    return None;
                }
                let width = font
                    .layout(text, scale, point(0.0, 0.0))
                    .last()
                    .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
                    .unwrap_or(0.0);
                width.is_finite().then_some(width)
            }
            Face::Bitmap { scale } => {
                let n = text.chars().count() as u32;
                Some((n * GLYPH_ADVANCE * scale).saturating_sub(*scale) as f32)
            }
        }
    }

    /// Draw `text` with its top-left corner at `(x, y)`.
    pub fn draw(&self, canvas: &mut RgbaImage, x: i32, y: i32, text: &str, color: Rgba<u8>) {
        match self {
            Face::TrueType { font, px } => {
                let scale = Scale::uniform(*px);
                let baseline = y as f32 + font.v_metrics(scale).ascent;
                for glyph in font.layout(text, scale, point(x as f32, baseline)) {
                    if let Some(bb) = glyph.pixel_bounding_box() {
                        glyph.draw(|gx, gy, coverage| {
                            blend(
                                canvas,
                                bb.min.x + gx as i32,
                                bb.min.y + gy as i32,
                                color,
                                coverage,
                            );
                        });
                    }
                }
            }
            Face::Bitmap { scale } => {
                let s = *scale as i32;
                for (i, c) in text.chars().enumerate() {
                    let columns = bitmap_glyph(c);
                    let origin_x = x + (i as u32 * GLYPH_ADVANCE) as i32 * s;
                    for (col, bits) in columns.iter().enumerate() {
                        for row in 0..GLYPH_ROWS {
                            if bits & (1 << row) == 0 {
                                continue;
                            }
                            for dy in 0..s {
                                for dx in 0..s {
                                    blend(
                                        canvas,
                                        origin_x + col as i32 * s + dx,
                                        y + row as i32 * s + dy,
                                        color,
                                        1.0,
                                    );
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Blend `color` over the pixel at `(x, y)` with the given coverage.
/// Out-of-canvas coordinates are ignored.
fn blend(canvas: &mut RgbaImage, x: i32, y: i32, color: Rgba<u8>, coverage: f32) {
    if x < 0 || y < 0 || x >= canvas.width() as i32 || y >= canvas.height() as i32 {
        return;
    }
    let coverage = coverage.clamp(0.0, 1.0);
    let px = canvas.get_pixel_mut(x as u32, y as u32);
    for i in 0..3 {
        px[i] = (color[i] as f32 * coverage + px[i] as f32 * (1.0 - coverage)).round() as u8;
    }
    px[3] = 255;
}

/// The five faces the label template uses.
#[derive(Debug, Clone)]
pub struct FontSet {
    /// Product title, 30 px bold.
    pub title: Face,
    /// 22 px bold.
    pub large: Face,
    /// Code, client code and order item, 18 px regular.
    pub medium: Face,
    /// Footer contact lines, 14 px regular.
    pub small: Face,
    /// Website line, 16 px bold.
    pub website: Face,
}

impl FontSet {
    /// Build the template's sizes from a bold/regular pair.
    pub fn from_pair(bold: Font<'static>, regular: Font<'static>) -> Self {
        let bold = Arc::new(bold);
        let regular = Arc::new(regular);
        let tt = |font: &Arc<Font<'static>>, px: f32| Face::TrueType {
            font: Arc::clone(font),
            px,
        };
        Self {
            title: tt(&bold, 30.0),
            large: tt(&bold, 22.0),
            medium: tt(&regular, 18.0),
            small: tt(&regular, 14.0),
            website: tt(&bold, 16.0),
        }
    }

    /// One uniform builtin face for every role.
    pub fn builtin() -> Self {
        let face = Face::builtin();
        Self {
            title: face.clone(),
            large: face.clone(),
            medium: face.clone(),
            small: face.clone(),
            website: face,
        }
    }

    /// `true` when the builtin fallback is in use.
    pub fn is_builtin(&self) -> bool {
        matches!(self.title, Face::Bitmap { .. })
    }
}

/// Column bitmaps (bit 0 = top row) for the builtin face.
fn bitmap_glyph(c: char) -> [u8; 5] {
    let c = fold_latin(c);
    let index = match c {
        ' '..='~' => c as usize - ' ' as usize,
        _ => '?' as usize - ' ' as usize,
    };
    ASCII_5X8[index]
}

/// Map common Latin-1 letters to their unaccented ASCII base.
fn fold_latin(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' | 'ª' => 'a',
        'Á' | 'À' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'A',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'É' | 'È' | 'Ê' | 'Ë' => 'E',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' | 'º' => 'o',
        'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'O',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
        'ç' => 'c',
        'Ç' => 'C',
        'ñ' => 'n',
        'Ñ' => 'N',
        '\t' | '\u{a0}' => ' ',
        other => other,
    }
}

#[rustfmt::skip]
const ASCII_5X8: [[u8; 5]; 95] = [
    [0x00, 0x00, 0x00, 0x00, 0x00], // ' '
    [0x00, 0x00, 0x5F, 0x00, 0x00], // !
    [0x00, 0x07, 0x00, 0x07, 0x00], // "
    [0x14, 0x7F, 0x14, 0x7F, 0x14], // #
    [0x24, 0x2A, 0x7F, 0x2A, 0x12], // $
    [0x23, 0x13, 0x08, 0x64, 0x62], // %
    [0x36, 0x49, 0x56, 0x20, 0x50], // &
    [0x00, 0x05, 0x03, 0x00, 0x00], // '
    [0x00, 0x1C, 0x22, 0x41, 0x00], // (
    [0x00, 0x41, 0x22, 0x1C, 0x00], // )
    [0x2A, 0x1C, 0x7F, 0x1C, 0x2A], // *
    [0x08, 0x08, 0x3E, 0x08, 0x08], // +
    [0x00, 0x50, 0x30, 0x00, 0x00], // ,
    [0x08, 0x08, 0x08, 0x08, 0x08], // -
    [0x00, 0x60, 0x60, 0x00, 0x00], // .
    [0x20, 0x10, 0x08, 0x04, 0x02], // /
    [0x3E, 0x51, 0x49, 0x45, 0x3E], // 0
    [0x00, 0x42, 0x7F, 0x40, 0x00], // 1
    [0x42, 0x61, 0x51, 0x49, 0x46], // 2
    [0x21, 0x41, 0x45, 0x4B, 0x31], // 3
    [0x18, 0x14, 0x12, 0x7F, 0x10], // 4
    [0x27, 0x45, 0x45, 0x45, 0x39], // 5
    [0x3C, 0x4A, 0x49, 0x49, 0x30], // 6
    [0x01, 0x71, 0x09, 0x05, 0x03], // 7
    [0x36, 0x49, 0x49, 0x49, 0x36], // 8
    [0x06, 0x49, 0x49, 0x29, 0x1E], // 9
    [0x00, 0x36, 0x36, 0x00, 0x00], // :
    [0x00, 0x56, 0x36, 0x00, 0x00], // ;
    [0x08, 0x14, 0x22, 0x41, 0x00], // <
    [0x14, 0x14, 0x14, 0x14, 0x14], // =
    [0x00, 0x41, 0x22, 0x14, 0x08], // >
    [0x02, 0x01, 0x51, 0x09, 0x06], // ?
    [0x32, 0x49, 0x79, 0x41, 0x3E], // @
    [0x7E, 0x11, 0x11, 0x11, 0x7E], // A
    [0x7F, 0x49, 0x49, 0x49, 0x36], // B
    [0x3E, 0x41, 0x41, 0x41, 0x22], // C
    [0x7F, 0x41, 0x41, 0x22, 0x1C], // D
    [0x7F, 0x49, 0x49, 0x49, 0x41], // E
    [0x7F, 0x09, 0x09, 0x09, 0x01], // F
    [0x3E, 0x41, 0x49, 0x49, 0x7A], // G
    [0x7F, 0x08, 0x08, 0x08, 0x7F], // H
    [0x00, 0x41, 0x7F, 0x41, 0x00], // I
    [0x20, 0x40, 0x41, 0x3F, 0x01], // J
    [0x7F, 0x08, 0x14, 0x22, 0x41], // K
    [0x7F, 0x40, 0x40, 0x40, 0x40], // L
    [0x7F, 0x02, 0x0C, 0x02, 0x7F], // M
    [0x7F, 0x04, 0x08, 0x10, 0x7F], // N
    [0x3E, 0x41, 0x41, 0x41, 0x3E], // O
    [0x7F, 0x09, 0x09, 0x09, 0x06], // P
    [0x3E, 0x41, 0x51, 0x21, 0x5E], // Q
    [0x7F, 0x09, 0x19, 0x29, 0x46], // R
    [0x46, 0x49, 0x49, 0x49, 0x31], // S
    [0x01, 0x01, 0x7F, 0x01, 0x01], // T
    [0x3F, 0x40, 0x40, 0x40, 0x3F], // U
    [0x1F, 0x20, 0x40, 0x20, 0x1F], // V
    [0x3F, 0x40, 0x38, 0x40, 0x3F], // W
    [0x63, 0x14, 0x08, 0x14, 0x63], // X
    [0x07, 0x08, 0x70, 0x08, 0x07], // Y
    [0x61, 0x51, 0x49, 0x45, 0x43], // Z
    [0x00, 0x7F, 0x41, 0x41, 0x00], // [
    [0x02, 0x04, 0x08, 0x10, 0x20], // \
    [0x00, 0x41, 0x41, 0x7F, 0x00], // ]
    [0x04, 0x02, 0x01, 0x02, 0x04], // ^
    [0x80, 0x80, 0x80, 0x80, 0x80], // _
    [0x00, 0x01, 0x02, 0x04, 0x00], // `
    [0x20, 0x54, 0x54, 0x54, 0x78], // a
    [0x7F, 0x48, 0x44, 0x44, 0x38], // b
    [0x38, 0x44, 0x44, 0x44, 0x20], // c
    [0x38, 0x44, 0x44, 0x48, 0x7F], // d
    [0x38, 0x54, 0x54, 0x54, 0x18], // e
    [0x08, 0x7E, 0x09, 0x01, 0x02], // f
    [0x18, 0xA4, 0xA4, 0xA4, 0x7C], // g
    [0x7F, 0x08, 0x04, 0x04, 0x78], // h
    [0x00, 0x44, 0x7D, 0x40, 0x00], // i
    [0x40, 0x80, 0x84, 0x7D, 0x00], // j
    [0x7F, 0x10, 0x28, 0x44, 0x00], // k
    [0x00, 0x41, 0x7F, 0x40, 0x00], // l
    [0x7C, 0x04, 0x18, 0x04, 0x78], // m
    [0x7C, 0x08, 0x04, 0x04, 0x78], // n
    [0x38, 0x44, 0x44, 0x44, 0x38], // o
    [0xFC, 0x24, 0x24, 0x24, 0x18], // p
    [0x18, 0x24, 0x24, 0x18, 0xFC], // q
    [0x7C, 0x08, 0x04, 0x04, 0x08], // r
    [0x48, 0x54, 0x54, 0x54, 0x20], // s
    [0x04, 0x3F, 0x44, 0x40, 0x20], // t
    [0x3C, 0x40, 0x40, 0x20, 0x7C], // u
    [0x1C, 0x20, 0x40, 0x20, 0x1C], // v
    [0x3C, 0x40, 0x30, 0x40, 0x3C], // w
    [0x44, 0x28, 0x10, 0x28, 0x44], // x
    [0x1C, 0xA0, 0xA0, 0xA0, 0x7C], // y
    [0x44, 0x64, 0x54, 0x4C, 0x44], // z
    [0x00, 0x08, 0x36, 0x41, 0x00], // {
    [0x00, 0x00, 0x7F, 0x00, 0x00], // |
    [0x00, 0x41, 0x36, 0x08, 0x00], // }
    [0x08, 0x04, 0x08, 0x10, 0x08], // ~
];
