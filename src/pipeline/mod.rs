//! Pipeline stages for PDF-to-label conversion.
//!
//! Each submodule implements exactly one transformation step, so each can be
//! tested on its own.
//!
//! ## Data Flow
//!
//! ```text
//! text ──▶ split ──▶ extract ──▶ render
//! (pdftotext) (form feed) (markers)  (PNG)
//!                                      ▲
//!                     assets ──────────┘ (logo, fonts)
//! ```
//!
//! 1. [`text`]    run `pdftotext -fixed 800` and decode leniently
//! 2. [`split`]   cut the blob into pages on form feeds, trim blank edges
//! 3. [`extract`] recover title / code / client code / order item
//! 4. [`assets`]  resolve logo and fonts once per batch, with fallbacks
//! 5. [`render`]  compose the 640×400 template and save the PNG
//!
//! [`font`] holds the faces [`render`] draws with.

pub mod assets;
pub mod extract;
pub mod font;
pub mod render;
pub mod split;
pub mod text;
