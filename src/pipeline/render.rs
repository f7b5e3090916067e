//! Label rendering: [`LabelRecord`] → 640×400 PNG.
//!
//! [`compose`] lays out the fixed template and is a pure function of the
//! record, the resolved [`LabelAssets`] and the footer, so the same inputs
//! always give the same pixels. [`encode_png`] and [`save_label`] are the
//! only steps that can fail.
//!
//! ## Template
//!
//! ```text
//!  ┌──────────────────────────────────────────────┐  y
//!  │                [   logo 320×93   ]           │  15
//!  │ TITLE                                        │  120
//!  │ Cód.: …                       Cód.Cliente: … │  165
//!  │ O.S./Item: …                                 │  195
//!  │                                              │
//!  │ Matriz: …                          Filial: … │  H-60
//!  │                 www.…                        │  H-25
//!  └──────────────────────────────────────────────┘
//! ```

use crate::config::Footer;
use crate::error::RenderError;
use crate::output::LabelRecord;
use crate::pipeline::assets::{LabelAssets, LOGO_WIDTH};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const LABEL_WIDTH: u32 = 640;
pub const LABEL_HEIGHT: u32 = 400;

const MARGIN: i32 = 25;
const BORDER_INSET: u32 = 5;
const BORDER_WIDTH: u32 = 2;
const LOGO_Y: i64 = 15;
const TITLE_Y: i32 = 120;
const CODE_Y: i32 = TITLE_Y + 45;
const ORDER_ITEM_Y: i32 = CODE_Y + 30;
const CONTACT_Y: i32 = LABEL_HEIGHT as i32 - 60;
const WEBSITE_Y: i32 = LABEL_HEIGHT as i32 - 25;

// Used when a face has no glyph for some character and cannot measure.
const CLIENT_CODE_FALLBACK_X: i32 = LABEL_WIDTH as i32 / 2;
const FILIAL_FALLBACK_X: i32 = LABEL_WIDTH as i32 - 300;
const WEBSITE_FALLBACK_X: i32 = LABEL_WIDTH as i32 / 2 - 100;

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Draw the label for `record`.
pub fn compose(record: &LabelRecord, assets: &LabelAssets, footer: &Footer) -> RgbaImage {
    let fonts = &assets.fonts;
    let mut canvas = RgbaImage::from_pixel(LABEL_WIDTH, LABEL_HEIGHT, WHITE);

    draw_border(&mut canvas);

    if let Some(ref logo) = assets.logo {
        let x = ((LABEL_WIDTH - LOGO_WIDTH) / 2) as i64;
        image::imageops::overlay(&mut canvas, logo, x, LOGO_Y);
    }

    fonts
        .title
        .draw(&mut canvas, MARGIN, TITLE_Y, &record.title, BLACK);

    fonts
        .medium
        .draw(&mut canvas, MARGIN, CODE_Y, &record.code, BLACK);
    let client_x = right_x(fonts.medium.measure(&record.client_code), CLIENT_CODE_FALLBACK_X);
    fonts
        .medium
        .draw(&mut canvas, client_x, CODE_Y, &record.client_code, BLACK);

    let order_item = format!("O.S./Item: {}", record.order_item);
    fonts
        .medium
        .draw(&mut canvas, MARGIN, ORDER_ITEM_Y, &order_item, BLACK);

    fonts
        .small
        .draw(&mut canvas, MARGIN, CONTACT_Y, &footer.matriz, BLACK);
    let filial_x = right_x(fonts.small.measure(&footer.filial), FILIAL_FALLBACK_X);
    fonts
        .small
        .draw(&mut canvas, filial_x, CONTACT_Y, &footer.filial, BLACK);

    let website_x = centred_x(fonts.website.measure(&footer.website));
    fonts
        .website
        .draw(&mut canvas, website_x, WEBSITE_Y, &footer.website, BLACK);

    canvas
}

/// x such that a run `measured` px wide ends `MARGIN` px from the right
/// edge, or `fallback` when the face could not measure it.
fn right_x(measured: Option<f32>, fallback: i32) -> i32 {
    match measured {
        Some(width) => (LABEL_WIDTH as f32 - MARGIN as f32 - width) as i32,
        None => fallback,
    }
}

/// x that centres a run `measured` px wide, floored.
fn centred_x(measured: Option<f32>) -> i32 {
    match measured {
        Some(width) => ((LABEL_WIDTH as f32 - width) / 2.0).floor() as i32,
        None => WEBSITE_FALLBACK_X,
    }
}

/// 2 px black outline whose outer edge sits 5 px in from the canvas edge.
fn draw_border(canvas: &mut RgbaImage) {
    let (x0, y0) = (BORDER_INSET, BORDER_INSET);
    let (x1, y1) = (LABEL_WIDTH - BORDER_INSET, LABEL_HEIGHT - BORDER_INSET);
    for y in y0..=y1 {
        for x in x0..=x1 {
            let on_edge = x < x0 + BORDER_WIDTH
                || x + BORDER_WIDTH > x1
                || y < y0 + BORDER_WIDTH
                || y + BORDER_WIDTH > y1;
            if on_edge {
                canvas.put_pixel(x, y, BLACK);
            }
        }
    }
}

/// Encode the canvas as an RGB PNG.
pub fn encode_png(canvas: &RgbaImage) -> Result<Vec<u8>, RenderError> {
    let rgb = DynamicImage::ImageRgba8(canvas.clone()).to_rgb8();
    let mut buf = Vec::new();
    rgb.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(RenderError::Encode)?;
    Ok(buf)
}

/// Encode and write `canvas` to `path`, replacing any existing file.
pub fn save_label(canvas: &RgbaImage, path: &Path) -> Result<(), RenderError> {
    let bytes = encode_png(canvas)?;
    std::fs::write(path, &bytes).map_err(|e| RenderError::Save {
        path: path.to_path_buf(),
        source: e,
    })?;
    debug!("Saved {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

/// Compose `record` and save it as `{dir}/{safe_filename}.png`.
pub fn render_label(
    record: &LabelRecord,
    assets: &LabelAssets,
    footer: &Footer,
    dir: &Path,
) -> Result<PathBuf, RenderError> {
    let path = record.output_path(dir);
    let canvas = compose(record, assets, footer);
    save_label(&canvas, &path)?;
    Ok(path)
}
