pub mod discipline;
pub mod patterns;

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Node, Selector};
use tracing::debug;

use patterns::{first_capture, DEGREE_ABBREVIATIONS, DURATION, ELIGIBILITY, FEES, LEVEL};

static BODY: LazyLock<Selector> = LazyLock::new(|| Selector::parse("body").unwrap());
static H1: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1").unwrap());
static H2: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h2").unwrap());

const HIDDEN_TAGS: &[&str] = &["script", "style", "noscript", "template"];
const MAX_ELIGIBILITY_CHARS: usize = 150;

/// Fields recovered from one page. `None` means no pattern matched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Details {
    pub duration: Option<String>,
    pub fees: Option<String>,
    pub level: Option<String>,
    pub eligibility: Option<String>,
}

/// Visible body text, one space between text nodes.
pub fn page_text(doc: &Html) -> Option<String> {
    let body = doc.select(&BODY).next()?;
    let mut parts: Vec<&str> = Vec::new();
    for node in body.descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node
            .parent()
            .and_then(|p| p.value().as_element().map(|e| HIDDEN_TAGS.contains(&e.name())))
            .unwrap_or(false);
        if !hidden {
            parts.push(text);
        }
    }
    Some(normalize_ws(&parts.join(" ")))
}

pub fn extract(doc: &Html) -> Details {
    match page_text(doc) {
        Some(text) => extract_from_text(&text),
        None => Details::default(),
    }
}

pub fn extract_from_text(text: &str) -> Details {
    let details = Details {
        duration: first_capture(&DURATION, text).map(|m| title_case(m.trim())),
        fees: first_capture(&FEES, text).map(|m| m.trim().trim_end_matches(',').to_string()),
        level: first_capture(&LEVEL, text).map(|m| title_case(m.trim())),
        eligibility: first_capture(&ELIGIBILITY, text)
            .map(|m| m.trim().chars().take(MAX_ELIGIBILITY_CHARS).collect()),
    };
    debug!(?details, "extracted");
    details
}

/// First `h1`, then first `h2`, whose text is 6..=119 characters long.
pub fn extract_title(doc: &Html) -> Option<String> {
    [&*H1, &*H2].into_iter().find_map(|sel| {
        let text = element_text(doc.select(sel).next()?);
        let len = text.chars().count();
        (len > 5 && len < 120).then_some(text)
    })
}

/// Whitespace-normalized text of an element and its descendants.
pub fn element_text(el: ElementRef) -> String {
    normalize_ws(&el.text().collect::<Vec<_>>().join(" "))
}

pub fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Capitalize letters that start a word; whitespace, digits, `.` and `-` separate words.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_start = true;
    for c in s.chars() {
        if at_start {
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
        at_start = c.is_whitespace() || c.is_ascii_digit() || c == '.' || c == '-';
    }
    out
}

/// Degree level implied by abbreviations in a course title ("BSc", "M.Tech", "DPhil").
pub fn infer_level(course_name: &str) -> Option<&'static str> {
    let undotted = course_name.replace('.', "");
    DEGREE_ABBREVIATIONS
        .iter()
        .find(|(re, _)| re.is_match(&undotted))
        .map(|(_, level)| *level)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(name: &str) -> Html {
        let html = std::fs::read_to_string(format!("tests/fixtures/{}.html", name)).unwrap();
        Html::parse_document(&html)
    }

    #[test]
    fn course_page_fields() {
        let doc = fixture("course_page");
        let d = extract(&doc);
        assert_eq!(d.duration.as_deref(), Some("3 Years"));
        assert_eq!(d.fees.as_deref(), Some("£15,000"));
        // the degree only appears as "BSc" in the heading
        assert_eq!(d.level, None);
        assert_eq!(
            d.eligibility.as_deref(),
            Some("A*AA at A-Level, including Mathematics and Further Mathematics")
        );
        assert_eq!(extract_title(&doc).as_deref(), Some("BSc Computer Science"));
    }

    #[test]
    fn level_keyword_is_title_cased() {
        let d = extract_from_text("A four-year undergraduate degree, then a master's");
        assert_eq!(d.level.as_deref(), Some("Undergraduate"));
    }

    #[test]
    fn extraction_is_deterministic() {
        let doc = fixture("course_page");
        assert_eq!(extract(&doc), extract(&doc));
    }

    #[test]
    fn script_text_is_not_visible() {
        let doc = Html::parse_document(
            "<html><body><script>var fee = '$99,999';</script><p>Open day</p></body></html>",
        );
        assert_eq!(page_text(&doc).as_deref(), Some("Open day"));
        assert_eq!(extract(&doc).fees, None);
    }

    #[test]
    fn missing_fields_stay_none() {
        let doc = Html::parse_document("<p>Welcome to our campus</p>");
        assert_eq!(extract(&doc), Details::default());
        assert_eq!(extract_title(&doc), None);
    }

    #[test]
    fn title_falls_back_to_h2() {
        let doc = Html::parse_document("<h1>Home</h1><h2>  MSc   Data\nScience </h2>");
        assert_eq!(extract_title(&doc).as_deref(), Some("MSc Data Science"));
    }

    #[test]
    fn eligibility_is_capped() {
        let long = format!("Eligibility: {}", "x".repeat(200));
        let d = extract_from_text(&long);
        assert_eq!(d.eligibility.map(|e| e.chars().count()), Some(120));
    }

    #[test]
    fn title_case_keeps_apostrophes() {
        assert_eq!(title_case("bachelor's"), "Bachelor's");
        assert_eq!(title_case("3 YEARS"), "3 Years");
        assert_eq!(title_case("ph.d"), "Ph.D");
        assert_eq!(title_case("juris doctor"), "Juris Doctor");
    }

    #[test]
    fn letters_after_digits_start_a_word() {
        assert_eq!(title_case("3years"), "3Years");
        let d = extract_from_text("Duration:3years then placement");
        assert_eq!(d.duration.as_deref(), Some("3Years"));
    }

    #[test]
    fn level_from_abbreviation() {
        assert_eq!(infer_level("BSc Computer Science"), Some("Bachelor's"));
        assert_eq!(infer_level("M.Tech (Civil)"), Some("Master's"));
        assert_eq!(infer_level("DPhil in History"), Some("Doctoral"));
        assert_eq!(infer_level("Classics"), None);
    }
}
