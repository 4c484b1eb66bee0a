use std::collections::HashSet;

use tracing::info;

use super::{fill_missing, scrape_course_page, ProgrammeScan, SiteAdapter};
use crate::fetch::{PageSource, Tls};
use crate::model::CourseDraft;
use crate::parser;

const FET_URL: &str = "https://www.jmi.ac.in/fet";

/// Faculty pages visited when the engineering faculty lists too few programmes.
const EXTRA_URLS: &[&str] = &[
    "https://www.jmi.ac.in/fdn",
    "https://www.jmi.ac.in/fae",
    "https://www.jmi.ac.in/ajkmcrc",
];
const EXTRA_FALLBACK: &str = "JMI Programme";

const FET_SCAN: ProgrammeScan = ProgrammeScan {
    elements: "li, h2, h3, h4, h5, h6, p, strong, b",
    min_len: 8,
    max_len: 100,
    keywords: &[
        "b.tech", "m.tech", "b.sc", "m.sc", "mba", "bds", "b.arch", "diploma",
        "civil engineering", "mechanical engineering", "electrical engineering",
        "computer engineering", "electronics", "environmental", "aeronautic",
    ],
    exclusions: &[],
    master_markers: &["m.tech", "m.sc", "master", "mba"],
};

pub struct JamiaMilliaIslamia;

impl SiteAdapter for JamiaMilliaIslamia {
    fn key(&self) -> &'static str {
        "jmi"
    }

    fn label(&self) -> &'static str {
        "JMI"
    }

    fn reference_url(&self) -> &'static str {
        "https://en.wikipedia.org/wiki/Jamia_Millia_Islamia"
    }

    fn fallback_name(&self) -> &'static str {
        "Jamia Millia Islamia"
    }

    fn gather(&self, source: &dyn PageSource, max: usize) -> Vec<CourseDraft> {
        let mut drafts = Vec::new();

        // The FET site is served with an incomplete certificate chain.
        if let Some(doc) = source.fetch(FET_URL, Tls::Insecure) {
            drafts = FET_SCAN.scan(&doc, &mut HashSet::new(), max);
            for d in drafts.iter_mut() {
                if d.course_name.to_lowercase().contains("b.tech") {
                    d.duration = "4 Years (8 Semesters)".to_string();
                }
            }
            let details = parser::extract(&doc);
            fill_missing(&mut drafts, details.fees.as_deref(), details.eligibility.as_deref());
        }

        for url in EXTRA_URLS {
            if drafts.len() >= max {
                break;
            }
            info!("Scraping: {}", url);
            let draft = scrape_course_page(source, url, EXTRA_FALLBACK, Tls::Insecure);
            if draft.course_name != EXTRA_FALLBACK {
                drafts.push(draft);
            }
            source.pause();
        }
        drafts
    }
}
