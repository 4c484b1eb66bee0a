use std::collections::HashSet;
use std::sync::LazyLock;

use scraper::{Html, Selector};
use tracing::info;

use super::{fill_missing, SiteAdapter};
use crate::fetch::{PageSource, Tls};
use crate::model::CourseDraft;
use crate::parser::{self, discipline};

const CONCENTRATIONS_URL: &str = "https://en.wikipedia.org/wiki/Harvard_College";
const COST_URL: &str = "https://college.harvard.edu/financial-aid/how-aid-works/cost-attendance";

/// Link titles that name an academic subject rather than a person or place.
const SUBJECT_KEYWORDS: &[&str] = &[
    "science", "math", "engineer", "history", "econom", "computer", "physic", "chemi", "biolog",
    "literature", "philosophy", "politic", "psycholog", "sociolog", "statistic", "linguist",
    "music",
];

static LIST_LINKS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("ul li a[title]").unwrap());

pub struct Harvard;

impl SiteAdapter for Harvard {
    fn key(&self) -> &'static str {
        "harvard"
    }

    fn label(&self) -> &'static str {
        "Harvard"
    }

    fn reference_url(&self) -> &'static str {
        "https://en.wikipedia.org/wiki/Harvard_University"
    }

    fn fallback_name(&self) -> &'static str {
        "Harvard University"
    }

    fn gather(&self, source: &dyn PageSource, max: usize) -> Vec<CourseDraft> {
        let mut drafts = source
            .fetch(CONCENTRATIONS_URL, Tls::Verify)
            .map(|doc| concentrations(&doc, max))
            .unwrap_or_default();

        info!("Extracting fees from Harvard cost of attendance page");
        if let Some(doc) = source.fetch(COST_URL, Tls::Verify) {
            let details = parser::extract(&doc);
            fill_missing(&mut drafts, details.fees.as_deref(), None);
        }
        drafts
    }
}

/// Subject-like list links on the college page, one draft per distinct title.
fn concentrations(doc: &Html, max: usize) -> Vec<CourseDraft> {
    let mut seen = HashSet::new();
    let mut drafts = Vec::new();

    for a in doc.select(&LIST_LINKS) {
        if drafts.len() >= max {
            break;
        }
        let title = a.value().attr("title").unwrap_or("").trim();
        let len = title.chars().count();
        if !(5..=60).contains(&len) {
            continue;
        }
        let lower = title.to_lowercase();
        if !SUBJECT_KEYWORDS.iter().any(|k| lower.contains(k)) || lower.contains("university") {
            continue;
        }
        if !seen.insert(title.to_string()) {
            continue;
        }

        let mut draft = CourseDraft::named(format!("Concentration in {}", title));
        draft.level = "Bachelor's".to_string();
        draft.discipline = discipline::classify(title).to_string();
        draft.duration = "4 Years".to_string();
        drafts.push(draft);
    }
    drafts
}
