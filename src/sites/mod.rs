//! Per-institution course collection.
//!
//! Every adapter gathers course drafts from its own site layout using one or
//! both shared strategies below, and `collect` normalizes the result to a
//! fixed-size batch. Adapters never fail: an unreachable page only means fewer
//! real courses, and the gap is filled with placeholders.

mod cambridge;
mod hamdard;
mod harvard;
mod jmi;
mod oxford;

use std::collections::HashSet;

use scraper::{Html, Selector};
use tracing::{debug, info};
use url::Url;

use crate::fetch::{PageSource, Tls};
use crate::model::{normalize_batch, CourseDraft, NOT_AVAILABLE};
use crate::parser::{self, discipline, element_text, Details};

pub use cambridge::Cambridge;
pub use hamdard::JamiaHamdard;
pub use harvard::Harvard;
pub use jmi::JamiaMilliaIslamia;
pub use oxford::Oxford;

pub trait SiteAdapter {
    /// Short identifier used on the command line.
    fn key(&self) -> &'static str;
    /// Prefix for placeholder course names.
    fn label(&self) -> &'static str;
    /// Encyclopedia page describing the institution.
    fn reference_url(&self) -> &'static str;
    /// Display name used when the reference page cannot be read.
    fn fallback_name(&self) -> &'static str;

    /// Site-specific discovery; returns at most `max` drafts.
    fn gather(&self, source: &dyn PageSource, max: usize) -> Vec<CourseDraft>;

    /// Exactly `max` drafts, real ones first.
    fn collect(&self, source: &dyn PageSource, max: usize) -> Vec<CourseDraft> {
        let drafts = self.gather(source, max);
        info!(site = self.key(), found = drafts.len(), "gathered courses");
        normalize_batch(drafts, self.label(), max)
    }
}

/// All institutions, in processing order.
pub fn registry() -> Vec<Box<dyn SiteAdapter>> {
    vec![
        Box::new(JamiaHamdard),
        Box::new(JamiaMilliaIslamia),
        Box::new(Harvard),
        Box::new(Cambridge),
        Box::new(Oxford),
    ]
}

pub fn keys() -> Vec<&'static str> {
    registry().iter().map(|a| a.key()).collect()
}

pub fn labels() -> Vec<&'static str> {
    registry().iter().map(|a| a.label()).collect()
}

/// Link-discovery strategy: course links on a listing page, each visited in turn.
pub struct LinkDiscovery {
    pub listing_url: &'static str,
    pub base_url: &'static str,
    /// CSS selector for candidate anchors.
    pub selector: &'static str,
    pub path_contains: Option<&'static str>,
    /// At least one must appear in the lowercased href, when non-empty.
    pub href_keywords: &'static [&'static str],
    pub min_text_len: usize,
    pub tls: Tls,
}

impl LinkDiscovery {
    /// Candidate (url, link text) pairs, resolved and deduplicated, in page order.
    pub fn links(&self, doc: &Html) -> Vec<(String, String)> {
        let Ok(selector) = Selector::parse(self.selector) else {
            return Vec::new();
        };
        let mut seen = HashSet::new();
        let mut out = Vec::new();

        for a in doc.select(&selector) {
            let href = a.value().attr("href").unwrap_or("").trim();
            let text = element_text(a);
            if href.is_empty() || text.chars().count() < self.min_text_len {
                continue;
            }
            if let Some(path) = self.path_contains {
                if !href.contains(path) {
                    continue;
                }
            }
            let lower = href.to_lowercase();
            if !self.href_keywords.is_empty() && !self.href_keywords.iter().any(|k| lower.contains(k)) {
                continue;
            }
            let Some(url) = resolve_link(self.base_url, href) else {
                continue;
            };
            if seen.insert(url.clone()) {
                out.push((url, text));
            }
        }
        out
    }

    /// Visit up to `max` discovered course pages.
    pub fn scrape(&self, source: &dyn PageSource, max: usize) -> Vec<CourseDraft> {
        let Some(doc) = source.fetch(self.listing_url, self.tls) else {
            return Vec::new();
        };
        let links = self.links(&doc);
        debug!(listing = self.listing_url, candidates = links.len(), "discovered links");

        let mut drafts = Vec::new();
        for (url, text) in links.into_iter().take(max) {
            info!("Scraping: {} ({})", truncate(&text, 50), url);
            drafts.push(scrape_course_page(source, &url, &text, self.tls));
            source.pause();
        }
        drafts
    }
}

/// Absolute links pass through; anything else is joined onto `base`.
pub fn resolve_link(base: &str, href: &str) -> Option<String> {
    if href.starts_with("http") {
        return Some(href.to_string());
    }
    Url::parse(base).ok()?.join(href).ok().map(String::from)
}

/// Build a draft from one course page. An unreachable page yields the fallback
/// name with every other field unavailable.
pub fn scrape_course_page(source: &dyn PageSource, url: &str, fallback_name: &str, tls: Tls) -> CourseDraft {
    let mut draft = CourseDraft::named(fallback_name);
    let Some(doc) = source.fetch(url, tls) else {
        return draft;
    };

    if let Some(title) = parser::extract_title(&doc) {
        draft.course_name = title;
    }

    let Details {
        duration,
        fees,
        level,
        eligibility,
    } = parser::extract(&doc);
    let level = level.or_else(|| parser::infer_level(&draft.course_name).map(str::to_string));
    fill(&mut draft.level, level);
    fill(&mut draft.duration, duration);
    fill(&mut draft.fees, fees);
    fill(&mut draft.eligibility, eligibility);

    draft.discipline = discipline::classify(&draft.course_name).to_string();
    draft
}

fn fill(slot: &mut String, value: Option<String>) {
    if let Some(v) = value {
        *slot = v;
    }
}

/// Copy a page-level value into drafts that still hold the sentinel.
pub fn fill_missing(drafts: &mut [CourseDraft], fees: Option<&str>, eligibility: Option<&str>) {
    for d in drafts.iter_mut() {
        if let Some(f) = fees {
            if d.fees == NOT_AVAILABLE {
                d.fees = f.to_string();
            }
        }
        if let Some(e) = eligibility {
            if d.eligibility == NOT_AVAILABLE {
                d.eligibility = e.to_string();
            }
        }
    }
}

/// Text-scan strategy: programme names spotted in headings, list items and emphasis.
pub struct ProgrammeScan {
    /// Comma-separated CSS selector of elements whose text is a candidate.
    pub elements: &'static str,
    /// Inclusive character bounds on candidate text.
    pub min_len: usize,
    pub max_len: usize,
    pub keywords: &'static [&'static str],
    /// Text containing any of these reads like prose, not a programme.
    pub exclusions: &'static [&'static str],
    pub master_markers: &'static [&'static str],
}

impl ProgrammeScan {
    /// Programme names on `doc`, skipping names already in `seen`.
    pub fn scan(&self, doc: &Html, seen: &mut HashSet<String>, max: usize) -> Vec<CourseDraft> {
        let Ok(selector) = Selector::parse(self.elements) else {
            return Vec::new();
        };
        let mut drafts = Vec::new();

        for el in doc.select(&selector) {
            if drafts.len() >= max {
                break;
            }
            let text = element_text(el);
            let len = text.chars().count();
            if len < self.min_len || len > self.max_len {
                continue;
            }
            let lower = text.to_lowercase();
            if !self.keywords.iter().any(|k| lower.contains(k)) {
                continue;
            }
            if self.exclusions.iter().any(|k| lower.contains(k)) {
                continue;
            }
            if !seen.insert(text.clone()) {
                continue;
            }

            let mut draft = CourseDraft::named(text.as_str());
            draft.level = self.level_of(&lower).to_string();
            draft.discipline = discipline::classify(&text).to_string();
            drafts.push(draft);
        }
        drafts
    }

    /// Master markers, then doctoral, then diploma; bachelor's otherwise.
    pub fn level_of(&self, lower: &str) -> &'static str {
        if self.master_markers.iter().any(|k| lower.contains(k)) {
            "Master's"
        } else if lower.contains("ph.d") {
            "Doctoral"
        } else if lower.contains("diploma") {
            "Diploma"
        } else {
            "Bachelor's"
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
