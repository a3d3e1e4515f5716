//! Line-item extraction strategies.
//!
//! Five strategies run in strict order; the first to produce a non-empty
//! list wins. Column-aligned tables are the most reliable signal, so they
//! go first; the whole-document sweep is the last resort.

pub mod row;
pub mod table;
pub mod vertical;

use rust_decimal::Decimal;
use tracing::debug;

use crate::models::Part;
use crate::rules::patterns::{match_count, SKU_LABELED, TABLE_HEADER_KEYWORD, TOTALS_KEYWORD};
use crate::rules::patterns::ALPHA_RUN;

use row::{parse_line_item, RowParse};

/// Which strategy produced the items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    ColumnTable,
    MultiLine,
    VerticalForm,
    PerLine,
    WholeDocument,
}

/// Result of the strategy chain.
#[derive(Debug)]
pub struct ItemExtraction {
    pub parts: Vec<Part>,
    pub strategy: Strategy,
    /// True when any row needed the positional quantity/price fallback.
    pub positional_fallback: bool,
}

impl ItemExtraction {
    fn from_rows(rows: Vec<RowParse>, strategy: Strategy) -> Self {
        let positional_fallback = rows.iter().any(|r| r.positional_fallback);
        Self {
            parts: rows.into_iter().map(|r| r.part).collect(),
            strategy,
            positional_fallback,
        }
    }
}

/// Run the strategy chain over the segmented document.
pub fn extract_parts(
    all_lines: &[String],
    body: &[String],
    default_tax_pct: Option<Decimal>,
) -> ItemExtraction {
    let rows = table::extract(body, default_tax_pct);
    if !rows.is_empty() {
        debug!(count = rows.len(), "items from column table");
        return ItemExtraction::from_rows(rows, Strategy::ColumnTable);
    }

    let rows = multi_line(body, default_tax_pct);
    if !rows.is_empty() {
        debug!(count = rows.len(), "items from multi-line layout");
        return ItemExtraction::from_rows(rows, Strategy::MultiLine);
    }

    let parts = vertical::extract(all_lines);
    if !parts.is_empty() {
        debug!(count = parts.len(), "items from vertical form");
        return ItemExtraction {
            parts,
            strategy: Strategy::VerticalForm,
            positional_fallback: false,
        };
    }

    let rows = per_line(body, default_tax_pct);
    if !rows.is_empty() {
        debug!(count = rows.len(), "items from per-line heuristic");
        return ItemExtraction::from_rows(rows, Strategy::PerLine);
    }

    let rows = per_line(all_lines, default_tax_pct);
    debug!(count = rows.len(), "items from whole-document fallback");
    ItemExtraction::from_rows(rows, Strategy::WholeDocument)
}

/// Body lines where items span multiple lines: a parsed row followed by a
/// description line or an SKU-labeled line. Yields nothing when no row
/// actually used its following line, leaving plain bodies to the later
/// strategies.
fn multi_line(body: &[String], default_tax_pct: Option<Decimal>) -> Vec<RowParse> {
    let mut rows: Vec<RowParse> = Vec::new();
    let mut attached_any = false;

    let mut i = 0;
    while i < body.len() {
        let Some(mut row) = parse_line_item(&body[i], i, default_tax_pct) else {
            i += 1;
            continue;
        };

        if let Some(next) = body.get(i + 1) {
            if is_description_line(next) {
                row.part.description = Some(next.trim().to_string());
                attached_any = true;
                i += 1;
            } else if row.part.sku.is_none() && is_sku_only_line(next) {
                if let Some(caps) = SKU_LABELED.captures(next) {
                    row.part.sku = Some(caps[1].to_string());
                    attached_any = true;
                    i += 1;
                }
            }
        }

        rows.push(row);
        i += 1;
    }

    if attached_any {
        rows
    } else {
        Vec::new()
    }
}

fn per_line(lines: &[String], default_tax_pct: Option<Decimal>) -> Vec<RowParse> {
    lines
        .iter()
        .enumerate()
        .filter_map(|(i, line)| parse_line_item(line, i, default_tax_pct))
        .collect()
}

fn is_description_line(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty()
        && ALPHA_RUN.is_match(trimmed)
        && !trimmed.chars().any(|c| c.is_ascii_digit())
        && !TOTALS_KEYWORD.is_match(trimmed)
        && match_count(&TABLE_HEADER_KEYWORD, trimmed) < 2
}

fn is_sku_only_line(line: &str) -> bool {
    SKU_LABELED
        .find(line)
        .map_or(false, |m| m.as_str().trim().len() == line.trim().len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(rows: &[&str]) -> Vec<String> {
        rows.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_table_strategy_wins() {
        let body = lines(&[
            "Description  Qty  Unit Price  Total",
            "Widget A  5  $12.50  $62.50",
        ]);
        let result = extract_parts(&body, &body, None);
        assert_eq!(result.strategy, Strategy::ColumnTable);
        assert_eq!(result.parts.len(), 1);
    }

    #[test]
    fn test_multi_line_strategy() {
        let body = lines(&[
            "Compressor Unit  1  450.00  450.00",
            "Industrial grade, refurbished",
        ]);
        let result = extract_parts(&body, &body, None);
        assert_eq!(result.strategy, Strategy::MultiLine);
        assert_eq!(
            result.parts[0].description.as_deref(),
            Some("Industrial grade, refurbished")
        );
    }

    #[test]
    fn test_sku_line_attaches() {
        let body = lines(&[
            "Brake Pad Set  1  89.99",
            "SKU: BRK-PD-2214",
        ]);
        let result = extract_parts(&body, &body, None);
        assert_eq!(result.strategy, Strategy::MultiLine);
        assert_eq!(result.parts[0].sku.as_deref(), Some("BRK-PD-2214"));
    }

    #[test]
    fn test_plain_body_uses_per_line() {
        let body = lines(&["GREAT VALUE MILK 3.48", "BANANAS 1.32"]);
        let result = extract_parts(&body, &body, None);
        assert_eq!(result.strategy, Strategy::PerLine);
        assert_eq!(result.parts.len(), 2);
    }

    #[test]
    fn test_vertical_form_beats_per_line() {
        let all = lines(&[
            "Part Number",
            "90-27-3325",
            "Description",
            "Alternator",
            "Total",
            "211.98",
        ]);
        // Body excludes the useful lines entirely.
        let result = extract_parts(&all, &[], None);
        assert_eq!(result.strategy, Strategy::VerticalForm);
    }

    #[test]
    fn test_whole_document_fallback() {
        let all = lines(&["header junk", "ITEM ONE 9.99", "footer junk"]);
        let result = extract_parts(&all, &[], None);
        assert_eq!(result.strategy, Strategy::WholeDocument);
        assert_eq!(result.parts.len(), 1);
    }
}
