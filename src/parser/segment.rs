//! Header / body / footer segmentation.

use crate::rules::patterns::{match_count, BODY_START, TABLE_HEADER_KEYWORD, TOTALS_KEYWORD};

/// How deep the header scan looks before giving up.
const HEADER_SCAN_LIMIT: usize = 25;

/// Default header length when no body-start line is found.
const DEFAULT_HEADER_LINES: usize = 8;

/// Lines a table row must share with the header vocabulary to count as a
/// column-header row.
const HEADER_KEYWORD_MIN: usize = 2;

/// The three regions of a document, as sub-slices of the normalized
/// non-empty line array.
#[derive(Debug)]
pub struct Segments<'a> {
    pub header: &'a [String],
    pub body: &'a [String],
    pub footer: &'a [String],
}

/// Split `lines` into header, body, and footer.
///
/// The header ends at the first line (within the scan limit) that matches
/// a body-start keyword or carries two or more table-header keywords,
/// defaulting to eight lines. The footer starts at the first totals
/// keyword past 35% of the document; a column-header row does not count
/// (its "Total" column label is not a totals line). Fallback footer start
/// is max(75%, len - 15).
pub fn segment(lines: &[String]) -> Segments<'_> {
    let n = lines.len();
    if n == 0 {
        return Segments {
            header: &[],
            body: &[],
            footer: &[],
        };
    }

    let header_end = lines
        .iter()
        .take(HEADER_SCAN_LIMIT)
        .position(|line| {
            BODY_START.is_match(line)
                || match_count(&TABLE_HEADER_KEYWORD, line) >= HEADER_KEYWORD_MIN
        })
        .unwrap_or_else(|| DEFAULT_HEADER_LINES.min(n));

    let after = (n * 35) / 100;
    let footer_start = lines
        .iter()
        .enumerate()
        .skip(after.max(header_end))
        .find(|(_, line)| {
            TOTALS_KEYWORD.is_match(line)
                && match_count(&TABLE_HEADER_KEYWORD, line) < HEADER_KEYWORD_MIN
        })
        .map(|(i, _)| i)
        .unwrap_or_else(|| ((n * 3) / 4).max(n.saturating_sub(15)));

    let footer_start = footer_start.clamp(header_end, n);

    Segments {
        header: &lines[..header_end],
        body: &lines[header_end..footer_start],
        footer: &lines[footer_start..],
    }
}
