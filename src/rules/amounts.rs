//! Monetary amount parsing and label-anchored amount lookup.

use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::{AMOUNT_LINE, TOTALS_KEYWORD};
use super::{ExtractionMatch, FieldExtractor};

/// How many lines below a lone label a value may sit.
const LOOKAHEAD_LINES: usize = 4;

/// Parse an amount string like "1,234.56", "$ 96.65", or "-5.00".
/// Thousands separators and currency symbols are stripped; anything that
/// still fails to parse is "no value", never an error.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if cleaned.is_empty() || !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}

/// A monetary value anchored to a label, e.g. `Subtotal  $96.65`.
///
/// Lookup runs in two phases. Same-line first, permitting a parenthesized
/// qualifier between label and value ("Tax (8%)  $7.73"). If the label
/// sits alone on its line, a value is accepted from a standalone amount
/// line up to four lines below, stopping early at any totals keyword.
///
/// Values for positive-valued labels are returned as absolute amounts, so
/// "Discount  -$5.00" yields 5.00.
pub struct LabeledAmount {
    inline: Regex,
    label_only: Regex,
}

impl LabeledAmount {
    /// Build the two phase patterns for `label`, a regex alternation using
    /// `[ \t]` for internal whitespace.
    pub fn new(label: &str) -> Self {
        let inline = Regex::new(&format!(
            r"(?i)\b(?:{label})\b[ \t]*(?:\([^)\n]*\))?[ \t]*[:=\-]?[ \t]*\(?[$\u{{20AC}}\u{{00A3}}\u{{20B9}}\u{{00A5}}]?[ \t]*(-?[\d,]+(?:\.\d{{1,4}})?)\)?"
        ))
        .unwrap();
        let label_only = Regex::new(&format!(
            r"(?i)^[ \t]*(?:{label})\b[ \t]*(?:\([^)\n]*\))?[ \t]*[:.]?[ \t]*$"
        ))
        .unwrap();
        Self { inline, label_only }
    }

    fn extract_multiline(&self, text: &str) -> Option<ExtractionMatch<Decimal>> {
        let lines: Vec<&str> = text.lines().collect();
        for (i, line) in lines.iter().enumerate() {
            if !self.label_only.is_match(line) {
                continue;
            }
            for ahead in lines.iter().skip(i + 1).take(LOOKAHEAD_LINES) {
                if TOTALS_KEYWORD.is_match(ahead) {
                    break;
                }
                if AMOUNT_LINE.is_match(ahead) {
                    if let Some(value) = parse_amount(ahead) {
                        return Some(ExtractionMatch::new(value.abs(), ahead.trim()));
                    }
                }
            }
        }
        None
    }
}

impl FieldExtractor for LabeledAmount {
    type Output = ExtractionMatch<Decimal>;

    /// Same-line lookup first; the multi-line phase only runs when no
    /// inline match exists anywhere in the text.
    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text)
            .into_iter()
            .next()
            .or_else(|| self.extract_multiline(text))
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        self.inline
            .captures_iter(text)
            .filter_map(|caps| {
                let value = parse_amount(&caps[1])?;
                let full_match = caps.get(0).unwrap();
                Some(
                    ExtractionMatch::new(value.abs(), full_match.as_str())
                        .with_position(full_match.start(), full_match.end()),
                )
            })
            .collect()
    }
}
