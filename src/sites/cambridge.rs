use super::{LinkDiscovery, SiteAdapter};
use crate::fetch::{PageSource, Tls};
use crate::model::CourseDraft;

// Course pages carry the award in their slug, e.g. /courses/architecture-ba-hons-march
const LISTING: LinkDiscovery = LinkDiscovery {
    listing_url: "https://www.undergraduate.study.cam.ac.uk/courses/search",
    base_url: "https://www.undergraduate.study.cam.ac.uk/courses/search",
    selector: "a[href]",
    path_contains: Some("/courses/"),
    href_keywords: &["-ba-", "-bsc-", "-meng-", "-hons", "-mmath", "-msci"],
    min_text_len: 6,
    tls: Tls::Verify,
};

pub struct Cambridge;

impl SiteAdapter for Cambridge {
    fn key(&self) -> &'static str {
        "cambridge"
    }

    fn label(&self) -> &'static str {
        "Cambridge"
    }

    fn reference_url(&self) -> &'static str {
        "https://en.wikipedia.org/wiki/University_of_Cambridge"
    }

    fn fallback_name(&self) -> &'static str {
        "University of Cambridge"
    }

    fn gather(&self, source: &dyn PageSource, max: usize) -> Vec<CourseDraft> {
        LISTING.scrape(source, max)
    }
}
