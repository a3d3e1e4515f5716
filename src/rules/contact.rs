//! Phone, email, and website extraction.

use super::patterns::{EMAIL, PHONE, URL, ZIP_PLUS4};
use super::{ExtractionMatch, FieldExtractor};

/// Minimum digits for a plausible phone number.
const MIN_PHONE_DIGITS: usize = 7;

/// First email address in the text, if any.
pub fn extract_email(text: &str) -> Option<String> {
    EMAIL.find(text).map(|m| m.as_str().to_string())
}

/// First website URL in the text, if any. Email hosts are not URLs.
pub fn extract_website(text: &str) -> Option<String> {
    for m in URL.find_iter(text) {
        let preceded_by_at = text[..m.start()].ends_with('@');
        if !preceded_by_at {
            return Some(m.as_str().trim_end_matches(['.', ',']).to_string());
        }
    }
    None
}

/// Phone field extractor.
///
/// Candidates must carry at least seven digits, never span a newline, and
/// never take the exact US ZIP+4 shape.
pub struct PhoneExtractor;

impl PhoneExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PhoneExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for PhoneExtractor {
    type Output = ExtractionMatch<String>;

    /// Among the candidates, a formatted one - separators present, ten or
    /// more digits, and no run of eight consecutive digits - wins over a
    /// raw digit run, which keeps store IDs and dates like 20231120 out
    /// of the phone field.
    fn extract(&self, text: &str) -> Option<Self::Output> {
        let candidates = self.extract_all(text);
        match candidates.iter().position(|c| is_formatted_phone(&c.value)) {
            Some(i) => candidates.into_iter().nth(i),
            None => candidates.into_iter().next(),
        }
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let bytes = text.as_bytes();
        PHONE
            .find_iter(text)
            .filter(|m| {
                // Matches embedded in a longer digit sequence are not phones.
                let before_digit = m.start() > 0 && bytes[m.start() - 1].is_ascii_digit();
                let after_digit = m.end() < bytes.len() && bytes[m.end()].is_ascii_digit();
                !before_digit && !after_digit
            })
            .filter(|m| {
                let c = m.as_str().trim();
                !c.contains('\n') && digit_count(c) >= MIN_PHONE_DIGITS && !ZIP_PLUS4.is_match(c)
            })
            .map(|m| {
                ExtractionMatch::new(m.as_str().trim().to_string(), m.as_str())
                    .with_position(m.start(), m.end())
            })
            .collect()
    }
}

/// Best phone candidate in the text.
pub fn extract_phone(text: &str) -> Option<String> {
    PhoneExtractor::new().extract(text).map(|m| m.value)
}

fn is_formatted_phone(candidate: &str) -> bool {
    let has_separator = candidate.chars().any(|c| "()-. ".contains(c));
    has_separator && digit_count(candidate) >= 10 && longest_digit_run(candidate) < 8
}

fn digit_count(s: &str) -> usize {
    s.chars().filter(|c| c.is_ascii_digit()).count()
}

fn longest_digit_run(s: &str) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for c in s.chars() {
        if c.is_ascii_digit() {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email() {
        assert_eq!(
            extract_email("Contact: billing@acme.example.com for help"),
            Some("billing@acme.example.com".to_string())
        );
        assert_eq!(extract_email("no email"), None);
    }

    #[test]
    fn test_website_skips_email_hosts() {
        assert_eq!(
            extract_website("info@acme.com www.acme.com"),
            Some("www.acme.com".to_string())
        );
        assert_eq!(
            extract_website("see https://acme.example.com/shop"),
            Some("https://acme.example.com/shop".to_string())
        );
    }

    #[test]
    fn test_phone_basic() {
        assert_eq!(
            extract_phone("Tel: (312) 555-0100"),
            Some("(312) 555-0100".to_string())
        );
    }

    #[test]
    fn test_phone_needs_seven_digits() {
        assert_eq!(extract_phone("ext 12-345"), None);
    }

    #[test]
    fn test_phone_rejects_zip_plus4() {
        assert_eq!(extract_phone("Greenville SC 29651-1500"), None);
    }

    #[test]
    fn test_phone_never_crosses_lines() {
        let text = "order 312\n555-0100 ignored";
        // "555-0100" alone has 7 digits and is a valid local candidate;
        // nothing stitches the two lines together.
        assert_eq!(extract_phone(text), Some("555-0100".to_string()));
    }

    #[test]
    fn test_formatted_wins_over_raw_run() {
        let text = "Store 20231120 555\nPhone (312) 555-0100";
        assert_eq!(extract_phone(text), Some("(312) 555-0100".to_string()));
    }

    #[test]
    fn test_extract_all_keeps_positions() {
        let text = "Tel: (312) 555-0100 or 555-0199";
        let all = PhoneExtractor::new().extract_all(text);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].value, "(312) 555-0100");
        let (start, end) = all[0].position.unwrap();
        assert_eq!(&text[start..end], "(312) 555-0100");
    }

    #[test]
    fn test_tax_id_not_a_phone() {
        // "12-3456789" is a tax ID; the embedded-digit boundary check
        // keeps the partial match "12-3456" from surfacing.
        assert_eq!(extract_phone("Tax ID: 12-3456789"), None);
    }
}
