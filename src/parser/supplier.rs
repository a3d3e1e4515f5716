//! Supplier construction from the document header.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::{Contact, Supplier};
use crate::rules::patterns::ALPHA_RUN;
use crate::rules::{extract_email, extract_phone, extract_website, parse_address};

lazy_static! {
    // Standalone document-title lines are never the supplier name.
    static ref DOC_TITLE: Regex = Regex::new(
        r"(?i)^[ \t]*(?:tax[ \t]+invoice|invoice|receipt|quote|quotation|estimate|statement|purchase[ \t]+order|work[ \t]+order|bill|credit[ \t]+note)[ \t]*$"
    ).unwrap();

    // Lines that start with a field label carry data, not the name.
    static ref LABELED_LINE: Regex = Regex::new(
        r"(?i)^[ \t]*(?:tel|phone|fax|email|e-mail|web|www|tax[ \t]+id|abn|acn|gst|gstin|vat|ein|date|invoice|account)\b"
    ).unwrap();
}

/// Build the supplier from the header block. `name_hint` (from the caller
/// or an outer provider) overrides name detection when present.
pub fn build_supplier(header: &[String], name_hint: Option<&str>) -> Supplier {
    let block = header.join("\n");

    let name = name_hint
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty())
        .or_else(|| detect_name(header))
        .unwrap_or_default();

    let contact = Contact {
        phone: extract_phone(&block),
        email: extract_email(&block),
        website: extract_website(&block),
    };

    Supplier {
        name,
        address: parse_address(&block),
        contact,
        tax_information: None,
        coordinates: None,
    }
}

/// The supplier name is the first header line that reads like a name:
/// it has letters, is not a document title, and is not a labeled field.
fn detect_name(header: &[String]) -> Option<String> {
    header
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .filter(|l| ALPHA_RUN.is_match(l))
        .find(|l| !DOC_TITLE.is_match(l) && !LABELED_LINE.is_match(l))
        .map(|l| l.to_string())
}
