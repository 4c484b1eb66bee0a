use super::{LinkDiscovery, SiteAdapter};
use crate::fetch::{PageSource, Tls};
use crate::model::CourseDraft;

const LISTING: LinkDiscovery = LinkDiscovery {
    listing_url: "https://www.ox.ac.uk/admissions/undergraduate/courses/course-listing",
    base_url: "https://www.ox.ac.uk",
    selector: "a[href*='/courses/course-listing/']",
    path_contains: None,
    href_keywords: &[],
    min_text_len: 3,
    tls: Tls::Verify,
};

pub struct Oxford;

impl SiteAdapter for Oxford {
    fn key(&self) -> &'static str {
        "oxford"
    }

    fn label(&self) -> &'static str {
        "Oxford"
    }

    fn reference_url(&self) -> &'static str {
        "https://en.wikipedia.org/wiki/University_of_Oxford"
    }

    fn fallback_name(&self) -> &'static str {
        "University of Oxford"
    }

    fn gather(&self, source: &dyn PageSource, max: usize) -> Vec<CourseDraft> {
        LISTING.scrape(source, max)
    }
}
