//! Labeled date extraction and numeric-date disambiguation.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

use super::patterns::{DATE_ISO, DATE_LONG, DATE_LONG_REV, DATE_NUMERIC};
use super::{ExtractionMatch, FieldExtractor};

lazy_static! {
    static ref INVOICE_DATE_LABEL: Regex = Regex::new(
        r"(?i)\b(?:invoice[ \t]+date|date[ \t]+issued|issued|date)\b[ \t]*[:.]?[ \t]*(.*)$"
    ).unwrap();

    static ref DUE_DATE_LABEL: Regex = Regex::new(
        r"(?i)\b(?:due[ \t]+date|payment[ \t]+due|pay[ \t]+by)\b[ \t]*[:.]?[ \t]*(.*)$"
    ).unwrap();

    static ref TRANSACTION_DATE_LABEL: Regex = Regex::new(
        r"(?i)\b(?:transaction|sale|purchase|order)[ \t]+date\b[ \t]*[:.]?[ \t]*(.*)$"
    ).unwrap();
}

/// Date field extractor over the ISO, numeric, and month-name forms.
pub struct DateExtractor;

impl DateExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateExtractor {
    type Output = ExtractionMatch<NaiveDate>;

    /// Matches are collected form by form - ISO, then numeric, then the
    /// month-name variants - so an unambiguous ISO date always outranks a
    /// numeric reading of the same text. Duplicate values are skipped.
    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results: Vec<Self::Output> = Vec::new();

        for caps in DATE_ISO.captures_iter(text) {
            let year: i32 = caps[1].parse().unwrap_or(0);
            let month: u32 = caps[2].parse().unwrap_or(0);
            let day: u32 = caps[3].parse().unwrap_or(0);
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                push_unique(&mut results, date, caps.get(0).unwrap());
            }
        }

        for caps in DATE_NUMERIC.captures_iter(text) {
            let a: u32 = caps[1].parse().unwrap_or(0);
            let b: u32 = caps[2].parse().unwrap_or(0);
            let year = expand_year(caps[3].parse().unwrap_or(0));
            if let Some(date) = resolve_numeric_date(a, b, year) {
                push_unique(&mut results, date, caps.get(0).unwrap());
            }
        }

        for caps in DATE_LONG.captures_iter(text) {
            let day: u32 = caps[1].parse().unwrap_or(0);
            let month = month_to_number(&caps[2]).unwrap_or(0);
            let year: i32 = caps[3].parse().unwrap_or(0);
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                push_unique(&mut results, date, caps.get(0).unwrap());
            }
        }

        for caps in DATE_LONG_REV.captures_iter(text) {
            let month = month_to_number(&caps[1]).unwrap_or(0);
            let day: u32 = caps[2].parse().unwrap_or(0);
            let year = expand_year(caps[3].parse().unwrap_or(0));
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                push_unique(&mut results, date, caps.get(0).unwrap());
            }
        }

        results
    }
}

fn push_unique(
    results: &mut Vec<ExtractionMatch<NaiveDate>>,
    date: NaiveDate,
    full_match: regex::Match<'_>,
) {
    if results.iter().any(|r| r.value == date) {
        return;
    }
    results.push(
        ExtractionMatch::new(date, full_match.as_str())
            .with_position(full_match.start(), full_match.end()),
    );
}

/// The labeled dates found on a document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentDates {
    pub invoice_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub transaction_date: Option<NaiveDate>,
}

/// Extract labeled dates line by line. The bare `date` label only counts
/// for the invoice date when the line is not a due-date or
/// transaction-date line, since those labels contain the word.
pub fn extract_dates(text: &str) -> DocumentDates {
    let mut dates = DocumentDates::default();
    let extractor = DateExtractor::new();

    for line in text.lines() {
        if dates.due_date.is_none() {
            if let Some(caps) = DUE_DATE_LABEL.captures(line) {
                dates.due_date = extractor.extract(&caps[1]).map(|m| m.value);
            }
        }
        if dates.transaction_date.is_none() {
            if let Some(caps) = TRANSACTION_DATE_LABEL.captures(line) {
                dates.transaction_date = extractor.extract(&caps[1]).map(|m| m.value);
            }
        }
        if dates.invoice_date.is_none()
            && !DUE_DATE_LABEL.is_match(line)
            && !TRANSACTION_DATE_LABEL.is_match(line)
        {
            if let Some(caps) = INVOICE_DATE_LABEL.captures(line) {
                dates.invoice_date = extractor.extract(&caps[1]).map(|m| m.value);
            }
        }
    }

    // Receipts often carry one unlabeled timestamp line; treat the first
    // date anywhere as the transaction date when no label matched at all.
    if dates.invoice_date.is_none()
        && dates.due_date.is_none()
        && dates.transaction_date.is_none()
    {
        dates.transaction_date = extractor.extract(text).map(|m| m.value);
    }

    dates
}

/// Parse the first date in `s`, trying ISO, numeric, then the two
/// month-name forms.
pub fn parse_date_str(s: &str) -> Option<NaiveDate> {
    DateExtractor::new().extract(s).map(|m| m.value)
}

/// Resolve an ambiguous `a/b/year` date.
///
/// The bias is day-first: `a` is the day unless it cannot be (a ≤ 12 while
/// b > 12 forces month-first). `01/02/2024` therefore reads as 1 February,
/// not January 2 - the international bias of the original heuristic, kept
/// deliberately.
pub(crate) fn resolve_numeric_date(a: u32, b: u32, year: i32) -> Option<NaiveDate> {
    let (day, month) = if a > 12 {
        (a, b)
    } else if b > 12 {
        (b, a)
    } else {
        (a, b)
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Two-digit years always expand into the 2000s.
fn expand_year(y: i32) -> i32 {
    if y < 100 {
        2000 + y
    } else {
        y
    }
}

fn month_to_number(name: &str) -> Option<u32> {
    let prefix: String = name.to_lowercase().chars().take(3).collect();
    match prefix.as_str() {
        "jan" => Some(1),
        "feb" => Some(2),
        "mar" => Some(3),
        "apr" => Some(4),
        "may" => Some(5),
        "jun" => Some(6),
        "jul" => Some(7),
        "aug" => Some(8),
        "sep" => Some(9),
        "oct" => Some(10),
        "nov" => Some(11),
        "dec" => Some(12),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_iso() {
        assert_eq!(parse_date_str("2024-01-15"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_date_str("2024/03/05"), Some(ymd(2024, 3, 5)));
    }

    #[test]
    fn test_numeric_day_first_bias() {
        // First component over 12 is a day.
        assert_eq!(parse_date_str("15/01/2024"), Some(ymd(2024, 1, 15)));
        // Second component over 12 forces month-first.
        assert_eq!(parse_date_str("01/15/2024"), Some(ymd(2024, 1, 15)));
        // Both plausible: day-first wins.
        assert_eq!(parse_date_str("01/02/2024"), Some(ymd(2024, 2, 1)));
    }

    #[test]
    fn test_two_digit_year_expands_to_2000s() {
        assert_eq!(parse_date_str("15/01/24"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_date_str("15/01/99"), Some(ymd(2099, 1, 15)));
    }

    #[test]
    fn test_month_name_forms() {
        assert_eq!(parse_date_str("15 January 2024"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_date_str("3rd Mar 2024"), Some(ymd(2024, 3, 3)));
        assert_eq!(parse_date_str("January 15, 2024"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_date_str("Sept 9 2023"), Some(ymd(2023, 9, 9)));
    }

    #[test]
    fn test_labeled_dates() {
        let text = "Invoice Date: 01/15/2024\nDue Date: 02/15/2024\nOrder Date: 2024-01-10";
        let dates = extract_dates(text);
        assert_eq!(dates.invoice_date, Some(ymd(2024, 1, 15)));
        assert_eq!(dates.due_date, Some(ymd(2024, 2, 15)));
        assert_eq!(dates.transaction_date, Some(ymd(2024, 1, 10)));
    }

    #[test]
    fn test_due_date_line_does_not_claim_invoice_date() {
        let text = "Due Date: 02/15/2024";
        let dates = extract_dates(text);
        assert_eq!(dates.invoice_date, None);
        assert_eq!(dates.due_date, Some(ymd(2024, 2, 15)));
    }

    #[test]
    fn test_unlabeled_date_becomes_transaction_date() {
        let dates = extract_dates("WALMART\n01/20/2024 09:45 AM\nTotal 21.88");
        assert_eq!(dates.transaction_date, Some(ymd(2024, 1, 20)));
        assert_eq!(dates.invoice_date, None);
    }

    #[test]
    fn test_garbage_returns_none() {
        assert_eq!(parse_date_str("99/99/9999"), None);
        assert_eq!(parse_date_str("no date here"), None);
    }

    #[test]
    fn test_extract_all_dedupes_and_positions() {
        let text = "issued 15.01.2024, due 29.01.2024, again 15.01.2024";
        let all = DateExtractor::new().extract_all(text);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].value, ymd(2024, 1, 15));
        let (start, end) = all[0].position.unwrap();
        assert_eq!(&text[start..end], "15.01.2024");
    }
}
