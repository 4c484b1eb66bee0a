use std::sync::LazyLock;

use scraper::{Html, Selector};
use tracing::{debug, info};

use crate::fetch::{PageSource, Tls};
use crate::model::NOT_AVAILABLE;
use crate::parser::element_text;

static FIRST_HEADING: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1#firstHeading").unwrap());
static INFOBOX: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table.infobox").unwrap());
static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static TH: LazyLock<Selector> = LazyLock::new(|| Selector::parse("th").unwrap());
static TD: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());
static ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());

/// Reference-URL substring → (country, city), for pages without a usable infobox.
const LOCATION_OVERRIDES: &[(&str, &str, &str)] = &[
    ("Harvard", "United States", "Cambridge"),
    ("Oxford", "United Kingdom", "Oxford"),
    ("Cambridge", "United Kingdom", "Cambridge"),
    ("Islamia", "India", "New Delhi"),
    ("Hamdard", "India", "New Delhi"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniversityInfo {
    pub name: String,
    pub country: String,
    pub city: String,
    pub website: String,
}

impl UniversityInfo {
    fn unresolved(name: &str) -> Self {
        UniversityInfo {
            name: name.to_string(),
            country: NOT_AVAILABLE.to_string(),
            city: NOT_AVAILABLE.to_string(),
            website: NOT_AVAILABLE.to_string(),
        }
    }
}

/// Resolve institution metadata from an encyclopedia page.
pub fn resolve(source: &dyn PageSource, reference_url: &str, fallback_name: &str) -> UniversityInfo {
    let mut info = match source.fetch(reference_url, Tls::Verify) {
        Some(doc) => parse_reference_page(&doc, fallback_name),
        None => UniversityInfo::unresolved(fallback_name),
    };
    apply_location_override(&mut info, reference_url);
    info!(name = %info.name, country = %info.country, city = %info.city, "resolved university");
    info
}

pub fn parse_reference_page(doc: &Html, fallback_name: &str) -> UniversityInfo {
    let name = doc
        .select(&FIRST_HEADING)
        .next()
        .map(element_text)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| fallback_name.to_string());
    let mut info = UniversityInfo::unresolved(&name);

    let Some(infobox) = doc.select(&INFOBOX).next() else {
        debug!(name = %info.name, "no infobox");
        return info;
    };

    for row in infobox.select(&ROW) {
        let (Some(th), Some(td)) = (row.select(&TH).next(), row.select(&TD).next()) else {
            continue;
        };
        let header = element_text(th).to_lowercase();

        if header.contains("location") || header.contains("city") {
            let cell = element_text(td);
            let parts: Vec<&str> = cell
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .collect();
            if let Some(city) = parts.first() {
                info.city = city.to_string();
            }
            if parts.len() >= 2 {
                info.country = parts[parts.len() - 1].to_string();
            }
        }

        if header.contains("website") {
            info.website = td
                .select(&ANCHOR)
                .next()
                .and_then(|a| a.value().attr("href"))
                .map(str::to_string)
                .unwrap_or_else(|| element_text(td));
        }
    }

    info
}

fn apply_location_override(info: &mut UniversityInfo, reference_url: &str) {
    if info.country != NOT_AVAILABLE {
        return;
    }
    if let Some((_, country, city)) = LOCATION_OVERRIDES
        .iter()
        .find(|(key, _, _)| reference_url.contains(key))
    {
        info.country = country.to_string();
        info.city = city.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FixtureSource;

    const OXFORD_WIKI: &str = "https://en.wikipedia.org/wiki/University_of_Oxford";

    #[test]
    fn infobox_location_and_website() {
        let source = FixtureSource::new().with_fixture(OXFORD_WIKI, "wiki_oxford");
        let info = resolve(&source, OXFORD_WIKI, "University of Oxford");
        assert_eq!(info.name, "University of Oxford");
        assert_eq!(info.city, "Oxford");
        assert_eq!(info.country, "England");
        assert_eq!(info.website, "https://www.ox.ac.uk");
    }

    #[test]
    fn single_segment_location_uses_override() {
        let html = r#"<html><body>
            <h1 id="firstHeading">Harvard University</h1>
            <table class="infobox">
              <tr><th>Location</th><td>Massachusetts</td></tr>
              <tr><th>Website</th><td>harvard.edu</td></tr>
            </table></body></html>"#;
        let url = "https://en.wikipedia.org/wiki/Harvard_University";
        let source = FixtureSource::new().with_page(url, html);
        let info = resolve(&source, url, "Harvard University");
        assert_eq!(info.country, "United States");
        assert_eq!(info.city, "Cambridge");
        assert_eq!(info.website, "harvard.edu");
    }

    #[test]
    fn unreachable_page_keeps_fallback_name() {
        let url = "https://en.wikipedia.org/wiki/Jamia_Hamdard";
        let info = resolve(&FixtureSource::new(), url, "Jamia Hamdard");
        assert_eq!(info.name, "Jamia Hamdard");
        assert_eq!(info.country, "India");
        assert_eq!(info.city, "New Delhi");
        assert_eq!(info.website, NOT_AVAILABLE);
    }

    #[test]
    fn unknown_institution_stays_unresolved() {
        let doc = Html::parse_document("<h1 id=\"firstHeading\">Somewhere College</h1>");
        let mut info = parse_reference_page(&doc, "x");
        apply_location_override(&mut info, "https://en.wikipedia.org/wiki/Somewhere_College");
        assert_eq!(info.name, "Somewhere College");
        assert_eq!(info.country, NOT_AVAILABLE);
        assert_eq!(info.city, NOT_AVAILABLE);
    }
}
