//! Column-aligned table extraction.
//!
//! Handles the classic invoice body: a header row naming the columns,
//! item rows beneath it, terminated by the totals block.

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use tracing::debug;

use crate::rules::patterns::{
    match_count, ALPHA_RUN, PURE_CODE, TABLE_HEADER_KEYWORD, TOTALS_KEYWORD,
};

use super::row::{parse_line_item, RowParse};

lazy_static! {
    static ref COLUMN_SPLIT: Regex = Regex::new(r"[ \t]{2,}").unwrap();
    static ref AMOUNT_SHAPE: Regex = Regex::new(r"^\$?\d[\d,]*(?:\.\d+)?%?$").unwrap();
}

/// Extract items from a column-aligned table in the body. Returns an empty
/// list when no header row is present.
pub fn extract(body: &[String], default_tax_pct: Option<Decimal>) -> Vec<RowParse> {
    let Some(header_idx) = body
        .iter()
        .position(|line| match_count(&TABLE_HEADER_KEYWORD, line) >= 2)
    else {
        return Vec::new();
    };

    debug!(header_idx, "column table header found");

    let mut items: Vec<RowParse> = Vec::new();
    let mut i = header_idx + 1;
    while i < body.len() {
        let line = &body[i];

        if TOTALS_KEYWORD.is_match(line) && match_count(&TABLE_HEADER_KEYWORD, line) < 2 {
            break;
        }

        if let Some(mut row) = parse_line_item(line, i, default_tax_pct) {
            apply_part_number_columns(line, &mut row);

            // A purely alphabetic follow-up line is this item's description.
            if let Some(next) = body.get(i + 1) {
                if is_description_line(next) {
                    row.part.description = Some(next.trim().to_string());
                    i += 1;
                }
            }

            if ALPHA_RUN.is_match(&row.part.item_name) {
                items.push(row);
            }
        }
        i += 1;
    }

    items
}

/// When a pure item-code segment sits alongside a separate alphabetic name
/// segment, the code is the part number and the name segment is the name.
fn apply_part_number_columns(line: &str, row: &mut RowParse) {
    let segments: Vec<&str> = COLUMN_SPLIT.split(line.trim()).collect();

    let code_idx = segments.iter().position(|s| {
        PURE_CODE.is_match(s)
            && s.chars().any(|c| c.is_ascii_digit())
            && !AMOUNT_SHAPE.is_match(s)
    });
    let Some(code_idx) = code_idx else { return };

    let name = segments.iter().enumerate().find_map(|(i, s)| {
        (i != code_idx && ALPHA_RUN.is_match(s) && !AMOUNT_SHAPE.is_match(s)).then_some(*s)
    });
    if let Some(name) = name {
        row.part.part_number = Some(segments[code_idx].to_string());
        row.part.item_name = name.trim().to_string();
    }
}

fn is_description_line(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty()
        && ALPHA_RUN.is_match(trimmed)
        && !trimmed.chars().any(|c| c.is_ascii_digit())
        && !TOTALS_KEYWORD.is_match(trimmed)
        && match_count(&TABLE_HEADER_KEYWORD, trimmed) < 2
}
