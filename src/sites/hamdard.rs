use std::collections::HashSet;
use std::sync::LazyLock;

use scraper::{Html, Selector};
use tracing::info;

use super::{ProgrammeScan, SiteAdapter};
use crate::fetch::{PageSource, Tls};
use crate::model::CourseDraft;
use crate::parser::{self, element_text};

const SCHOOLS_URL: &str = "https://www.jamiahamdard.ac.in/new-school313";
const SITE_DOMAIN: &str = "jamiahamdard.ac.in";

const SCHOOL_SCAN: ProgrammeScan = ProgrammeScan {
    elements: "li, h3, h4, h5, h6, strong, b",
    min_len: 6,
    max_len: 79,
    keywords: &[
        "b.pharm", "d.pharm", "b.tech", "m.tech", "mba", "bba", "b.com", "b.sc", "m.sc",
        "ba.ll.b", "ll.m", "ph.d", "bachelor", "master", "diploma", "nursing",
        "hotel management", "bms",
    ],
    exclusions: &[
        "to offer", "to provide", "to develop", "to use", "ambassador", "research", "vision",
        "mission",
    ],
    master_markers: &["m.tech", "m.sc", "master", "mba", "ll.m"],
};

static LINKS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

pub struct JamiaHamdard;

impl SiteAdapter for JamiaHamdard {
    fn key(&self) -> &'static str {
        "hamdard"
    }

    fn label(&self) -> &'static str {
        "Jamia Hamdard"
    }

    fn reference_url(&self) -> &'static str {
        "https://en.wikipedia.org/wiki/Jamia_Hamdard"
    }

    fn fallback_name(&self) -> &'static str {
        "Jamia Hamdard"
    }

    fn gather(&self, source: &dyn PageSource, max: usize) -> Vec<CourseDraft> {
        let schools = source
            .fetch(SCHOOLS_URL, Tls::Insecure)
            .map(|doc| school_links(&doc))
            .unwrap_or_default();
        info!("Found {} school pages to scan", schools.len());

        let mut drafts = Vec::new();
        let mut seen = HashSet::new();
        for (url, name) in schools {
            if drafts.len() >= max {
                break;
            }
            info!("Scraping: {}", name.chars().take(50).collect::<String>());
            let Some(doc) = source.fetch(&url, Tls::Insecure) else {
                continue;
            };

            let details = parser::extract(&doc);
            let mut found = SCHOOL_SCAN.scan(&doc, &mut seen, max - drafts.len());
            for d in found.iter_mut() {
                if let Some(v) = &details.duration {
                    d.duration = v.clone();
                }
                if let Some(v) = &details.fees {
                    d.fees = v.clone();
                }
                if let Some(v) = &details.eligibility {
                    d.eligibility = v.clone();
                }
            }
            drafts.extend(found);
            source.pause();
        }
        drafts
    }
}

/// On-site school and institute pages listed on the schools index, in page order.
fn school_links(doc: &Html) -> Vec<(String, String)> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for a in doc.select(&LINKS) {
        let href = a.value().attr("href").unwrap_or("").trim();
        let text = element_text(a);
        let lower = href.to_lowercase();
        if !(lower.contains("school-of") || lower.contains("institute")) || !lower.contains(SITE_DOMAIN) {
            continue;
        }
        if text.chars().count() > 5 && seen.insert(href.to_string()) {
            out.push((href.to_string(), text));
        }
    }
    out
}
