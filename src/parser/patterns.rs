//! Ordered pattern tables for the field extractor.
//!
//! Within each table the first pattern that matches wins, so entries run from
//! most specific to most permissive. Every pattern captures the field value in
//! group 1.

use std::sync::LazyLock;

use regex::Regex;

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(&format!("(?i){}", p)).unwrap())
        .collect()
}

pub static DURATION: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        // "Duration: 3 years"
        r"duration[:\s]*(\d+(?:\.\d+)?\s*(?:years?|months?|semesters?))",
        // "3 years full-time"
        r"(\d+(?:\.\d+)?\s*(?:years?|months?))\s*(?:full[- ]?time|part[- ]?time|programme|program|course)",
        r"(\d+\s*(?:years?|months?))\s",
    ])
});

// At least 3 digits after the symbol, so stray "$5" style amounts are skipped.
pub static FEES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?:tuition|fee|cost)[^.]{0,50}([£$€₹]\s*[\d,]{3,}(?:\.\d+)?)",
        r"([£$€₹]\s*[\d,]{3,}(?:\.\d+)?)\s*(?:per\s*(?:annum|year|semester)|tuition|fee)",
        r"([£$€₹]\s*[\d,]{3,}(?:\.\d+)?)",
    ])
});

pub static LEVEL: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[concat!(
        r"\b(bachelor'?s?|master'?s?|undergraduate|postgraduate|doctoral|ph\.?d|diploma|",
        r"professional\s*graduate|juris\s*doctor|doctor\s*of\s*medicine)\b"
    )])
});

pub static ELIGIBILITY: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?:eligib\w+|entry\s*requirement|admission\s*requirement)[:\s]*([^.]{10,120})",
        r"(?:applicants?\s*(?:must|should|need)|minimum\s*qualification)[:\s]*([^.]{10,120})",
        // A-Level offers: "A*AA at A-Level", "AAA including Mathematics"
        r"(A[\*]?[A-Z]{2,3}\s*(?:at\s*A[- ]?Level|including)[^.]{5,80})",
        r"(10\+2\s*[^.]{5,80})",
    ])
});

/// Degree abbreviations in course titles, checked in order. Matched against the
/// title with dots removed.
pub static DEGREE_ABBREVIATIONS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"\b(?:phd|dphil|doctorate)\b", "Doctoral"),
        (r"\b(?:msc|ma|meng|mba|llm|mphil|mtech|mres|mst|mcom|mpharm)\b", "Master's"),
        (r"\b(?:bsc|ba|beng|llb|btech|bcom|bba|bpharm|bds|barch|bms|mbbs)\b", "Bachelor's"),
    ]
    .into_iter()
    .map(|(p, level)| (Regex::new(&format!("(?i){}", p)).unwrap(), level))
    .collect()
});

/// First capture of the first pattern in `table` that matches `text`.
pub fn first_capture<'t>(table: &[Regex], text: &'t str) -> Option<&'t str> {
    table
        .iter()
        .find_map(|re| re.captures(text).and_then(|c| c.get(1)))
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_prefers_labelled_value() {
        let text = "Study 2 months abroad. Duration: 3 years full-time";
        assert_eq!(first_capture(&DURATION, text), Some("3 years"));
    }

    #[test]
    fn duration_programme_word_fallback() {
        assert_eq!(first_capture(&DURATION, "A 4 years programme in law"), Some("4 years"));
    }

    #[test]
    fn duration_bare_needs_trailing_space() {
        assert_eq!(first_capture(&DURATION, "lasts 18 months then"), Some("18 months"));
        assert_eq!(first_capture(&DURATION, "lasts 18 months"), None);
    }

    #[test]
    fn fees_need_three_digits() {
        assert_eq!(first_capture(&FEES, "coffee costs $5 here"), None);
        assert_eq!(first_capture(&FEES, "Tuition fee: £15,000 per annum"), Some("£15,000"));
    }

    #[test]
    fn fees_fall_back_to_any_amount() {
        assert_eq!(first_capture(&FEES, "Budget around €9,250.50. Thanks."), Some("€9,250.50"));
    }

    #[test]
    fn level_is_word_bounded() {
        assert_eq!(first_capture(&LEVEL, "A Master's degree"), Some("Master's"));
        assert_eq!(first_capture(&LEVEL, "diplomatic relations"), None);
        assert_eq!(first_capture(&LEVEL, "a ph.d programme"), Some("ph.d"));
    }

    #[test]
    fn eligibility_order() {
        let text = "Applicants must hold a degree in physics. Entry requirement: A*AA at A-Level";
        assert_eq!(first_capture(&ELIGIBILITY, text), Some("A*AA at A-Level"));
        assert_eq!(
            first_capture(&ELIGIBILITY, "Passed 10+2 with 50% marks in PCM."),
            Some("10+2 with 50% marks in PCM")
        );
    }
}
