//! OCR text repair.
//!
//! Fixes the handful of artifacts OCR engines reliably produce on business
//! documents without altering document semantics. Transforms never add or
//! remove newlines, so line indices stay valid for the segmenter and the
//! line-item extractors downstream. Normalization is idempotent.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // "$l2.50" / "$I2.50" - lowercase L or uppercase I misread as 1 after
    // a currency symbol.
    static ref CURRENCY_L_FOR_ONE: Regex = Regex::new(r"\$[lI](\d)").unwrap();

    // "1O5" / "1o5" - letter O misread as 0 inside a numeric run.
    static ref O_FOR_ZERO: Regex = Regex::new(r"(\d)[Oo](\d)").unwrap();

    // " S12.50" - S misread as $ in front of a monetary value.
    static ref S_FOR_DOLLAR: Regex = Regex::new(r"(?m)(^|\s)S(\d+\.\d{2})\b").unwrap();

    // Runs of horizontal whitespace collapse to exactly two spaces so the
    // column separation used by the table extractor survives.
    static ref SPACE_RUN: Regex = Regex::new(r"[ \t]{2,}").unwrap();

    // "1 234.56" - OCR-inserted space inside a monetary value. Only when
    // the three digits end the group: followed by punctuation or a word
    // boundary, never a fourth digit.
    static ref SPLIT_THOUSANDS: Regex = Regex::new(r"(\d) (\d{3})(?:([.,])|\b)").unwrap();

    static ref ZERO_WIDTH: Regex = Regex::new("[\u{200B}\u{200C}\u{200D}\u{FEFF}]").unwrap();
}

/// Repair frequent OCR artifacts in `raw`.
///
/// The transforms run in a fixed order; the digit-run repairs iterate to a
/// fixpoint so `normalize(normalize(s)) == normalize(s)` holds for every
/// input. The newline count of the output always equals the input's.
pub fn normalize(raw: &str) -> String {
    let mut text = CURRENCY_L_FOR_ONE
        .replace_all(raw, |caps: &regex::Captures| format!("$1{}", &caps[1]))
        .into_owned();

    text = replace_to_fixpoint(&O_FOR_ZERO, &text, |caps| {
        format!("{}0{}", &caps[1], &caps[2])
    });

    text = S_FOR_DOLLAR
        .replace_all(&text, |caps: &regex::Captures| {
            format!("{}${}", &caps[1], &caps[2])
        })
        .into_owned();

    text = SPACE_RUN.replace_all(&text, "  ").into_owned();

    text = replace_to_fixpoint(&SPLIT_THOUSANDS, &text, |caps| {
        let tail = caps.get(3).map(|m| m.as_str()).unwrap_or("");
        format!("{}{}{}", &caps[1], &caps[2], tail)
    });

    text = text.replace(['\u{2013}', '\u{2014}'], "-");
    text = ZERO_WIDTH.replace_all(&text, "").into_owned();

    text.split('\n')
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Repeatedly apply a replacement until the text stops changing.
///
/// Regex replacement does not revisit text it already passed over, so
/// overlapping artifacts like "1O2O3" need a second sweep. Each sweep
/// strictly shrinks the number of matches, so this terminates.
fn replace_to_fixpoint<F>(re: &Regex, text: &str, replacer: F) -> String
where
    F: Fn(&regex::Captures) -> String + Copy,
{
    let mut current = text.to_string();
    loop {
        let next = re.replace_all(&current, |caps: &regex::Captures| replacer(caps));
        if next == current {
            return current;
        }
        current = next.into_owned();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_letter_for_one() {
        assert_eq!(normalize("$l2.50"), "$12.50");
        assert_eq!(normalize("$I9.99"), "$19.99");
    }

    #[test]
    fn test_o_for_zero_in_numeric_runs() {
        assert_eq!(normalize("1O5"), "105");
        assert_eq!(normalize("2o24"), "2024");
        // Overlapping artifacts resolve in one normalize call.
        assert_eq!(normalize("1O2O3"), "10203");
        // Letters outside numeric runs are untouched.
        assert_eq!(normalize("Oil Box o ring"), "Oil Box o ring");
    }

    #[test]
    fn test_s_for_dollar() {
        assert_eq!(normalize("Total  S12.50"), "Total  $12.50");
        assert_eq!(normalize("S45.00 due"), "$45.00 due");
        // S glued to a word stays alone.
        assert_eq!(normalize("CLASS12.50x"), "CLASS12.50x");
    }

    #[test]
    fn test_space_runs_collapse_to_two() {
        assert_eq!(normalize("Widget A      5     $12.50"), "Widget A  5  $12.50");
        assert_eq!(normalize("a\t\tb"), "a  b");
    }

    #[test]
    fn test_split_thousands() {
        assert_eq!(normalize("1 234.56"), "1234.56");
        assert_eq!(normalize("12 345 678.90"), "12345678.90");
        // A fourth digit means it was not a thousands split.
        assert_eq!(normalize("call 1 2345"), "call 1 2345");
    }

    #[test]
    fn test_dashes_and_zero_width() {
        assert_eq!(normalize("2024\u{2013}01"), "2024-01");
        assert_eq!(normalize("a\u{2014}b"), "a-b");
        assert_eq!(normalize("IN\u{200B}V"), "INV");
    }

    #[test]
    fn test_trailing_whitespace_trimmed_per_line() {
        assert_eq!(normalize("abc   \ndef\t\n"), "abc\ndef\n");
    }

    #[test]
    fn test_newline_count_preserved() {
        let samples = [
            "a\nb\nc",
            "$l2.50\n1O5\n S9.99 \n\n1 234.56\n",
            "",
            "\n\n\n",
            "x \u{2013} y\u{200B}\n 1 234,00",
        ];
        for s in &samples {
            let n_before = s.matches('\n').count();
            let n_after = normalize(s).matches('\n').count();
            assert_eq!(n_before, n_after, "newline count changed for {s:?}");
        }
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "$l2.50 and 1O2O3 plus  S45.00",
            "Widget A      5     $12.50       $62.50",
            "1 234 567.89 total\u{2014}due",
            "",
        ];
        for s in &samples {
            let once = normalize(s);
            let twice = normalize(&once);
            assert_eq!(once, twice, "normalize not idempotent for {s:?}");
        }
    }
}
