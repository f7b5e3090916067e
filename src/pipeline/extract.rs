//! Field extraction: one page's lines → [`LabelRecord`].
//!
//! The fixed-width layout puts each field on its own line behind a literal
//! marker. The first line is the product title. The order/item value usually
//! sits on a line of its own *after* the `O.S./Item:` marker, sometimes with
//! footer lines (`Matriz:`, `Filial:`, `www.`) in between, so the marker
//! triggers a look-ahead and then ends the scan.
//!
//! Repeated `Cód.:` / `Cód.Cliente:` lines overwrite earlier ones, and
//! anything after `O.S./Item:` is ignored even if it carries a marker.

use crate::error::ExtractionError;
use crate::output::LabelRecord;

pub const CODE_MARKER: &str = "Cód.:";
pub const CLIENT_CODE_MARKER: &str = "Cód.Cliente:";
pub const ORDER_ITEM_MARKER: &str = "O.S./Item:";

/// Value used when a page has no `Cód.:` line.
pub const DEFAULT_CODE: &str = "Cód.: N/A";

/// Lines that may sit between the order/item marker and its value.
const LOOKAHEAD_SKIP_PREFIXES: [&str; 3] = ["Matriz:", "Filial:", "www."];

/// Extract a record from a page.
///
/// `rendered` is the number of labels already produced in this batch. It
/// seeds both the generated `OSnnn/001` order item and the record's
/// `sequence`.
pub fn extract_fields<S: AsRef<str>>(
    lines: &[S],
    rendered: usize,
) -> Result<LabelRecord, ExtractionError> {
    let (first, rest) = lines.split_first().ok_or(ExtractionError::EmptyPage)?;
    let title = first.as_ref().trim();
    if title.is_empty() {
        return Err(ExtractionError::MissingTitle);
    }

    let mut code: Option<&str> = None;
    let mut client_code: Option<&str> = None;
    let mut order_item: Option<String> = None;

    for (i, raw) in rest.iter().enumerate() {
        let line = raw.as_ref().trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with(CODE_MARKER) {
            code = Some(line);
        } else if line.starts_with(CLIENT_CODE_MARKER) {
            client_code = Some(line);
        } else if line.starts_with(ORDER_ITEM_MARKER) {
            order_item = Some(match lookahead_value(&rest[i + 1..]) {
                Some(value) => value.to_string(),
                None => line.replace(ORDER_ITEM_MARKER, "").trim().to_string(),
            });
            break;
        }
    }

    let sequence = rendered + 1;
    Ok(LabelRecord {
        title: title.to_string(),
        code: code.unwrap_or(DEFAULT_CODE).to_string(),
        client_code: client_code.unwrap_or(CLIENT_CODE_MARKER).to_string(),
        order_item: order_item
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| default_order_item(sequence)),
        sequence,
    })
}

/// Generated order item for the `sequence`-th label: `OS001/001`, `OS002/001`, …
pub fn default_order_item(sequence: usize) -> String {
    format!("OS{:03}/001", sequence)
}

fn lookahead_value<S: AsRef<str>>(lines: &[S]) -> Option<&str> {
    lines.iter().map(|l| l.as_ref().trim()).find(|l| {
        !l.is_empty() && !LOOKAHEAD_SKIP_PREFIXES.iter().any(|p| l.starts_with(p))
    })
}
