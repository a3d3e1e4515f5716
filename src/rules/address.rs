//! Multi-line address block parsing.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::Address;
use crate::rules::patterns::{AU_CITY_STATE_POSTCODE, US_CITY_STATE_ZIP};

lazy_static! {
    // A street line: leading number, then a word.
    static ref STREET_LINE: Regex = Regex::new(r"^\d+[ \t]+[A-Za-z]").unwrap();
}

/// Country names recognized in address blocks. The bare token "au" is
/// deliberately absent: it false-positives on words like "auto".
const COUNTRY_NAMES: &[(&str, &str)] = &[
    ("australia", "AU"),
    ("united states", "US"),
    ("u.s.a", "US"),
    ("usa", "US"),
    ("united kingdom", "GB"),
    ("great britain", "GB"),
    ("canada", "CA"),
    ("new zealand", "NZ"),
    ("india", "IN"),
    ("germany", "DE"),
    ("france", "FR"),
    ("singapore", "SG"),
    ("ireland", "IE"),
    ("mexico", "MX"),
    ("japan", "JP"),
];

const AU_STATES: &[&str] = &["NSW", "VIC", "QLD", "WA", "SA", "TAS", "ACT", "NT"];

const US_STATES: &[&str] = &[
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "FL", "GA", "HI", "ID", "IL", "IN", "IA",
    "KS", "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH", "NJ",
    "NM", "NY", "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VT",
    "VA", "WA", "WV", "WI", "WY", "DC",
];

/// Parse street, city, state, postal code, and country out of a multi-line
/// block. `full_address` is always rebuilt from whatever was found.
pub fn parse_address(block: &str) -> Address {
    let mut address = Address::default();

    let au = AU_CITY_STATE_POSTCODE.captures(block);
    let us = US_CITY_STATE_ZIP.captures(block);

    // When both jurisdictions signal, a US state that is not also an AU
    // state settles it; WA and SA stay Australian.
    let prefer_us = match (&au, &us) {
        (Some(_), Some(us_caps)) => {
            let st = &us_caps[2];
            US_STATES.contains(&st) && !AU_STATES.contains(&st)
        }
        (None, Some(us_caps)) => US_STATES.contains(&&us_caps[2]),
        _ => false,
    };

    if prefer_us {
        let caps = us.as_ref().unwrap();
        address.city = Some(caps[1].trim().to_string());
        address.state = Some(caps[2].to_string());
        address.postal_code = Some(caps[3].to_string());
        address.country = Some("US".to_string());
    } else if let Some(caps) = &au {
        address.city = Some(caps[1].trim().to_string());
        address.state = Some(caps[2].to_string());
        address.postal_code = Some(caps[3].to_string());
        address.country = Some("AU".to_string());
    } else if let Some(caps) = &us {
        // A "City, XX 12345" with an unknown state code still carries the
        // city and postal data, just no country conclusion.
        address.city = Some(caps[1].trim().to_string());
        address.state = Some(caps[2].to_string());
        address.postal_code = Some(caps[3].to_string());
    }

    // An explicit country name overrides the jurisdiction inference.
    let lower = block.to_lowercase();
    for (name, code) in COUNTRY_NAMES {
        if contains_word(&lower, name) {
            address.country = Some((*code).to_string());
            break;
        }
    }

    for line in block.lines() {
        let line = line.trim();
        if line.len() > 5 && STREET_LINE.is_match(line) {
            let street = line.split(',').next().unwrap_or(line).trim();
            address.street = Some(street.to_string());
            break;
        }
    }

    address.flatten();
    address
}

/// Word-boundary containment without regex compilation per name.
fn contains_word(haystack: &str, needle: &str) -> bool {
    let mut from = 0;
    while let Some(pos) = haystack[from..].find(needle) {
        let start = from + pos;
        let end = start + needle.len();
        let before_ok = start == 0
            || !haystack.as_bytes()[start - 1].is_ascii_alphanumeric();
        let after_ok = end == haystack.len()
            || !haystack.as_bytes()[end].is_ascii_alphanumeric();
        if before_ok && after_ok {
            return true;
        }
        from = end;
    }
    false
}
