//! Page splitting: form-feed separated text → trimmed per-page line lists.

/// Page separator emitted by `pdftotext`.
pub const FORM_FEED: char = '\u{000C}';

/// Split `text` into pages of lines.
///
/// Leading and trailing whitespace-only lines are dropped from each page;
/// interior blank lines are kept. Pages left empty are omitted, so the
/// result holds only pages that can carry a label. Lines themselves are not
/// trimmed.
pub fn split_pages(text: &str) -> Vec<Vec<&str>> {
    text.split(FORM_FEED)
        .filter_map(|block| {
            let lines: Vec<&str> = block.lines().collect();
            let start = lines.iter().position(|l| !l.trim().is_empty())?;
            let end = lines.iter().rposition(|l| !l.trim().is_empty())?;
            Some(lines[start..=end].to_vec())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_form_feed_in_order() {
        let pages = split_pages("A\nB\x0cC\n\x0cD");
        assert_eq!(pages, vec![vec!["A", "B"], vec!["C"], vec!["D"]]);
    }

    #[test]
    fn trims_blank_edges_but_keeps_interior_blanks() {
        let pages = split_pages("\n   \n  TITLE  \n\n  body\n \t \n");
        assert_eq!(pages, vec![vec!["  TITLE  ", "", "  body"]]);
    }

    #[test]
    fn blank_pages_are_dropped() {
        let pages = split_pages("\x0c   \n\n\x0cONE\x0c\n\t\n\x0c");
        assert_eq!(pages, vec![vec!["ONE"]]);
    }

    #[test]
    fn crlf_line_endings() {
        let pages = split_pages("A\r\nB\r\n\x0c");
        assert_eq!(pages, vec![vec!["A", "B"]]);
    }

    #[test]
    fn empty_input_has_no_pages() {
        assert!(split_pages("").is_empty());
    }

    #[test]
    fn splitting_is_repeatable() {
        let text = "X\nCód.: 1\x0c\nY\n";
        assert_eq!(split_pages(text), split_pages(text));
    }
}
