//! Buyer block isolation.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::{Address, Buyer, Contact};
use crate::rules::patterns::{match_count, ALPHA_RUN, SUMMARY_LINE, TABLE_HEADER_KEYWORD};
use crate::rules::{extract_email, extract_phone};

/// Lines of buyer context examined past the label.
const BLOCK_SPAN: usize = 4;

lazy_static! {
    // Section label with an optional inline value: "Bill To: XYZ Inc."
    static ref BUYER_LABEL: Regex = Regex::new(
        r"(?i)^[ \t]*(?:bill[ \t]+to|invoice[ \t]+to|sold[ \t]+to|customer[ \t]+name|customer|client|buyer)\b[ \t]*[:.]?[ \t]*(.*)$"
    ).unwrap();

    // Bare section labels to skip while hunting for the name line.
    static ref SECTION_LABEL: Regex = Regex::new(
        r"(?i)^[ \t]*(?:bill[ \t]+to|invoice[ \t]+to|sold[ \t]+to|ship[ \t]+to|customer|client|buyer|attn|attention)[ \t]*[:.]?[ \t]*$"
    ).unwrap();

    static ref ATTN_PREFIX: Regex = Regex::new(
        r"(?i)^attn(?:ention)?[:.]?[ \t]*"
    ).unwrap();
}

/// Isolate the buyer. Returns `None` when no buyer section exists.
pub fn build_buyer(lines: &[String]) -> Option<Buyer> {
    let label_idx = lines.iter().position(|l| BUYER_LABEL.is_match(l))?;

    let inline_value = BUYER_LABEL
        .captures(&lines[label_idx])
        .and_then(|caps| {
            let value = caps[1].trim().to_string();
            (!value.is_empty()).then_some(value)
        });

    let (name, name_idx) = match inline_value {
        Some(value) => (Some(strip_attn(&value)), label_idx),
        None => {
            let found = lines
                .iter()
                .enumerate()
                .skip(label_idx + 1)
                .take(BLOCK_SPAN)
                .find(|(_, l)| is_name_line(l));
            match found {
                Some((i, l)) => (Some(strip_attn(l.trim())), i),
                None => (None, label_idx),
            }
        }
    };

    let name = name.filter(|n| !n.is_empty())?;

    // Address lines: whatever addressy text follows the name before the
    // table or totals begin. Only the flattened form is kept.
    let address_lines: Vec<&str> = lines
        .iter()
        .skip(name_idx + 1)
        .take(BLOCK_SPAN)
        .map(|l| l.trim())
        .take_while(|l| is_block_line(l))
        .collect();

    let address = (!address_lines.is_empty()).then(|| Address {
        full_address: Some(address_lines.join(", ")),
        ..Address::default()
    });

    let block = lines
        .iter()
        .skip(label_idx)
        .take(BLOCK_SPAN + 2)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n");
    let contact = Contact {
        phone: extract_phone(&block),
        email: extract_email(&block),
        website: None,
    };
    let contact = (!contact.is_empty()).then_some(contact);

    Some(Buyer {
        name: Some(name),
        address,
        contact,
    })
}

fn strip_attn(value: &str) -> String {
    ATTN_PREFIX.replace(value, "").trim().to_string()
}

fn is_name_line(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty()
        && ALPHA_RUN.is_match(trimmed)
        && !SECTION_LABEL.is_match(trimmed)
        && !SUMMARY_LINE.is_match(trimmed)
        && match_count(&TABLE_HEADER_KEYWORD, trimmed) < 2
}

fn is_block_line(line: &str) -> bool {
    !line.is_empty()
        && !SECTION_LABEL.is_match(line)
        && !SUMMARY_LINE.is_match(line)
        && match_count(&TABLE_HEADER_KEYWORD, line) < 2
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(rows: &[&str]) -> Vec<String> {
        rows.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_name_on_following_line() {
        let doc = lines(&[
            "Bill To:",
            "XYZ Supplies Inc.",
            "Description  Qty  Unit Price  Total",
        ]);
        let buyer = build_buyer(&doc).unwrap();
        assert_eq!(buyer.name.as_deref(), Some("XYZ Supplies Inc."));
        assert!(buyer.address.is_none());
    }

    #[test]
    fn test_inline_label_value() {
        let doc = lines(&["Customer Name: Jane Contractor"]);
        let buyer = build_buyer(&doc).unwrap();
        assert_eq!(buyer.name.as_deref(), Some("Jane Contractor"));
    }

    #[test]
    fn test_attn_prefix_stripped() {
        let doc = lines(&["Bill To:", "Attn: Procurement Office", "45 Depot Rd"]);
        let buyer = build_buyer(&doc).unwrap();
        assert_eq!(buyer.name.as_deref(), Some("Procurement Office"));
        assert_eq!(
            buyer.address.unwrap().full_address.as_deref(),
            Some("45 Depot Rd")
        );
    }

    #[test]
    fn test_no_buyer_section() {
        let doc = lines(&["ACME Corporation", "Widget A  5  12.50  62.50"]);
        assert!(build_buyer(&doc).is_none());
    }

    #[test]
    fn test_buyer_address_flattened() {
        let doc = lines(&[
            "Bill To:",
            "XYZ Supplies Inc.",
            "88 Commerce Park",
            "Springfield, IL 62701",
            "Subtotal  96.65",
        ]);
        let buyer = build_buyer(&doc).unwrap();
        assert_eq!(
            buyer.address.unwrap().full_address.as_deref(),
            Some("88 Commerce Park, Springfield, IL 62701")
        );
    }
}
