//! Common regex patterns for document field extraction.
//!
//! Every pattern is compiled once and reused for the life of the process.
//! Same-line patterns glue labels to values with `[ \t]` rather than `\s`,
//! so a match can never span a newline. The month-name alternation is
//! static; no locale database is consulted.

use lazy_static::lazy_static;
use regex::Regex;

/// Static month-name alternation shared by the long date patterns.
const MONTHS: &str = "jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|jun(?:e)?|jul(?:y)?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?";

lazy_static! {
    // Phone numbers, international and local. Separators are mandatory so
    // bare digit runs (store IDs, dates like 20231120) never qualify. The
    // character classes exclude newlines, so matches stay on one line.
    pub static ref PHONE: Regex = Regex::new(
        r"(?:\+\d{1,3}[ .\-]?)?(?:\(\d{2,5}\)[ .\-]?|\d{2,5}[ .\-])\d{3,4}(?:[ .\-]\d{3,5}){0,2}"
    ).unwrap();

    /// US ZIP+4 shape; anything matching this exactly is never a phone.
    pub static ref ZIP_PLUS4: Regex = Regex::new(r"^\d{5}-\d{4}$").unwrap();

    pub static ref EMAIL: Regex = Regex::new(
        r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}"
    ).unwrap();

    // URLs with a scheme, or www-prefixed without one.
    pub static ref URL: Regex = Regex::new(
        r"https?://[^\s]+|\bwww\.[A-Za-z0-9\-]+(?:\.[A-Za-z0-9\-]+)+(?:/[^\s]*)?"
    ).unwrap();

    // Dates.
    pub static ref DATE_ISO: Regex = Regex::new(
        r"\b(\d{4})[-/](\d{1,2})[-/](\d{1,2})\b"
    ).unwrap();

    // Numeric day/month or month/day with a 2-4 digit year; which component
    // is the day is decided by the caller (see rules::dates).
    pub static ref DATE_NUMERIC: Regex = Regex::new(
        r"\b(\d{1,2})[./\-](\d{1,2})[./\-](\d{2,4})\b"
    ).unwrap();

    // "15 January 2024", "3rd Mar 2024"
    pub static ref DATE_LONG: Regex = Regex::new(&format!(
        r"(?i)\b(\d{{1,2}})(?:st|nd|rd|th)?[ \t]+({MONTHS})\.?,?[ \t]+(\d{{4}})"
    )).unwrap();

    // "January 15, 2024", "Mar 3 2024"
    pub static ref DATE_LONG_REV: Regex = Regex::new(&format!(
        r"(?i)\b({MONTHS})\.?[ \t]+(\d{{1,2}})(?:st|nd|rd|th)?,?[ \t]+(\d{{2,4}})"
    )).unwrap();

    // Amounts.
    pub static ref AMOUNT: Regex = Regex::new(
        r"[$\u{20AC}\u{00A3}\u{20B9}\u{00A5}][ \t]?(-?[\d,]+(?:\.\d{1,4})?)"
    ).unwrap();

    pub static ref AMOUNT_BARE: Regex = Regex::new(
        r"-?(?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d{1,4})?"
    ).unwrap();

    // A line that is nothing but one amount (used by multi-line lookups).
    pub static ref AMOUNT_LINE: Regex = Regex::new(
        r"(?m)^[ \t]*\(?[$\u{20AC}\u{00A3}\u{20B9}\u{00A5}]?[ \t]*-?[\d,]+(?:\.\d{1,4})?\)?[ \t]*$"
    ).unwrap();

    // Tax and business identifiers.
    pub static ref ABN: Regex = Regex::new(
        r"(?i)\bABN[ \t]*:?[ \t]*(\d{2}[ ]?\d{3}[ ]?\d{3}[ ]?\d{3})\b"
    ).unwrap();

    pub static ref ACN: Regex = Regex::new(
        r"(?i)\bACN[ \t]*:?[ \t]*(\d{3}[ ]?\d{3}[ ]?\d{3})\b"
    ).unwrap();

    // Australian GST registration; the qualifier is mandatory so tax lines
    // like "GST 10%" never match.
    pub static ref GST_AU: Regex = Regex::new(
        r"(?i)\bGST[ \t]*(?:No\.?|Number|#|Reg(?:istration)?)[ \t]*:?[ \t]*(\d[\d \-]{7,14}\d)"
    ).unwrap();

    pub static ref EIN: Regex = Regex::new(
        r"(?i)\bEIN[ \t]*:?[ \t]*(\d{2}-?\d{7})\b"
    ).unwrap();

    pub static ref TAX_ID_LABELED: Regex = Regex::new(
        r"(?i)\b(?:Federal[ \t]+Tax[ \t]+ID|Tax[ \t]+ID(?:entification)?(?:[ \t]+(?:No\.?|Number))?)[ \t]*:?[ \t]*([A-Za-z0-9][A-Za-z0-9\-]{4,})"
    ).unwrap();

    pub static ref VAT: Regex = Regex::new(
        r"(?i)\bVAT[ \t]*(?:No\.?|Number|Reg(?:istration)?(?:[ \t]*No\.?)?)[ \t]*:?[ \t]*([A-Z]{2}[ ]?\d{8,12}|\d{8,12})\b"
    ).unwrap();

    // Indian GSTIN: 15 characters, fixed shape.
    pub static ref GSTIN: Regex = Regex::new(
        r"(?i)\bGSTIN[ \t]*:?[ \t]*(\d{2}[A-Z]{5}\d{4}[A-Z]\d[A-Z][A-Z\d])\b"
    ).unwrap();

    // SKUs and part numbers.
    pub static ref SKU_LABELED: Regex = Regex::new(
        r"(?i)\b(?:SKU|P/N|PN|MPN|Part[ \t]*(?:No\.?|#|Number)|Item[ \t]*(?:No\.?|#|Code))[ \t]*[:#]?[ \t]*([A-Za-z0-9][A-Za-z0-9\-/.]+)"
    ).unwrap();

    // Bare tri-segment hyphenated code, e.g. "90-27-3325".
    pub static ref SKU_BARE: Regex = Regex::new(
        r"\b[A-Z0-9]{2,6}-[A-Z0-9]{2,6}-[A-Z0-9]{2,6}\b"
    ).unwrap();

    // "Tax (8%)", "GST 10%", "VAT: 20%"
    pub static ref TAX_PERCENT: Regex = Regex::new(
        r"(?i)\b(?:tax|gst|vat|hst)[ \t]*\(?[ \t]*(\d{1,2}(?:\.\d{1,2})?)[ \t]*%"
    ).unwrap();

    // Time of day: "09:45 AM", "14:30:05"
    pub static ref TIME_OF_DAY: Regex = Regex::new(
        r"\b(\d{1,2}:\d{2}(?::\d{2})?(?:[ \t]?[AaPp][Mm])?)"
    ).unwrap();

    // Keyword patterns shared by the segmenter and the line-item extractors.

    // A line that is a totals/summary row rather than a line item.
    pub static ref SUMMARY_LINE: Regex = Regex::new(
        r"(?i)^[ \t]*(?:\d+[.)][ \t]*)?(?:sub[ \t]?-?total|total|tax(?:es)?|gst|vat|hst|shipping|freight|delivery|discount|savings|balance|amount[ \t]+due|amount[ \t]+paid|paid|payment|change|cash|credit|debit|tendered|due|net[ \t]+amount|gross[ \t]+amount|grand[ \t]+total|rounding|tip|gratuity|service[ \t]+charge)\b"
    ).unwrap();

    // Table column-header vocabulary; a row carrying two or more of these
    // is a header row.
    pub static ref TABLE_HEADER_KEYWORD: Regex = Regex::new(
        r"(?i)\b(?:description|item|qty|quantity|unit[ \t]*price|price|amount|total|sku|part[ \t]*(?:no\.?|#|number)?|product|service|rate|each|unit|hours|hrs|ext(?:ended)?)\b"
    ).unwrap();

    // First line of the document body per the segmenter.
    pub static ref BODY_START: Regex = Regex::new(
        r"(?i)\b(?:description|item|qty|quantity|part[ \t]*(?:no|#)|sku|unit[ \t]+price|amount|total|bill[ \t]+to|ship[ \t]+to|customer|product|service|particular|rate|no\.?)\b"
    ).unwrap();

    // Totals vocabulary marking the footer region.
    pub static ref TOTALS_KEYWORD: Regex = Regex::new(
        r"(?i)\b(?:sub[ \t]?total|subtotal|total|tax|gst|vat|shipping|discount|balance|amount[ \t]+due|net[ \t]+amount|gross[ \t]+amount|grand[ \t]+total)\b"
    ).unwrap();

    // Address shapes, shared by the address parser and the line-item
    // filter (an address line is never a line item).

    // Australian "Suburb STATE 4-digit-postcode".
    pub static ref AU_CITY_STATE_POSTCODE: Regex = Regex::new(
        r"\b([A-Za-z][A-Za-z ]*?)[ \t]+(NSW|VIC|QLD|WA|SA|TAS|ACT|NT)[ \t]+(\d{4})\b"
    ).unwrap();

    // US "City, ST 12345" or "City, ST 12345-6789".
    pub static ref US_CITY_STATE_ZIP: Regex = Regex::new(
        r"([A-Za-z][A-Za-z .]*?),[ \t]*([A-Z]{2})[ \t]+(\d{5}(?:-\d{4})?)\b"
    ).unwrap();

    // A segment that is purely an item code: letters/digits/-/./ with at
    // least three characters, starting with a digit or capital.
    pub static ref PURE_CODE: Regex = Regex::new(
        r"^[\dA-Z][\w\-/.]{2,}$"
    ).unwrap();

    // A leading row number like "1." / "2)" on a line item.
    pub static ref ROW_NUMBER: Regex = Regex::new(
        r"^\d+[.)][ \t]+"
    ).unwrap();

    // Two-or-more alphabetic characters in a row; the minimum for a
    // candidate item name.
    pub static ref ALPHA_RUN: Regex = Regex::new(r"[A-Za-z]{2}").unwrap();
}

/// Count distinct positions at which `re` matches in `line`.
pub fn match_count(re: &Regex, line: &str) -> usize {
    re.find_iter(line).count()
}
