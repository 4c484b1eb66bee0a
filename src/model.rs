use serde::Serialize;

/// Marker stored in place of any field that could not be determined.
pub const NOT_AVAILABLE: &str = "Not Available";

pub const DEFAULT_DISCIPLINE: &str = "General";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct University {
    pub id: String,
    pub name: String,
    pub country: String,
    pub city: String,
    pub website: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Course {
    pub id: String,
    pub university_id: String,
    pub course_name: String,
    pub level: String,
    pub discipline: String,
    pub duration: String,
    pub fees: String,
    pub eligibility: String,
}

/// A course as produced by a site adapter, before ids are assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseDraft {
    pub course_name: String,
    pub level: String,
    pub discipline: String,
    pub duration: String,
    pub fees: String,
    pub eligibility: String,
}

impl CourseDraft {
    /// A draft with every optional field set to the sentinel.
    pub fn named(course_name: impl Into<String>) -> Self {
        CourseDraft {
            course_name: course_name.into(),
            level: NOT_AVAILABLE.to_string(),
            discipline: NOT_AVAILABLE.to_string(),
            duration: NOT_AVAILABLE.to_string(),
            fees: NOT_AVAILABLE.to_string(),
            eligibility: NOT_AVAILABLE.to_string(),
        }
    }

    pub fn placeholder(label: &str, n: usize) -> Self {
        CourseDraft {
            discipline: DEFAULT_DISCIPLINE.to_string(),
            ..CourseDraft::named(format!("{} Course {}", label, n))
        }
    }

    pub fn into_course(self, id: String, university_id: &str) -> Course {
        Course {
            id,
            university_id: university_id.to_string(),
            course_name: self.course_name,
            level: self.level,
            discipline: self.discipline,
            duration: self.duration,
            fees: self.fees,
            eligibility: self.eligibility,
        }
    }
}

/// Both record sets, in table order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    pub universities: Vec<University>,
    pub courses: Vec<Course>,
}

impl Dataset {
    pub fn is_empty(&self) -> bool {
        self.universities.is_empty() && self.courses.is_empty()
    }
}

pub fn is_missing(value: &str) -> bool {
    value.trim().is_empty()
}

/// Replace an empty cell with the sentinel.
pub fn or_sentinel(value: String) -> String {
    if is_missing(&value) {
        NOT_AVAILABLE.to_string()
    } else {
        value
    }
}

/// Whether `name` is exactly "<label> Course <n>" for one of `labels`.
pub fn is_placeholder(name: &str, labels: &[&str]) -> bool {
    labels.iter().any(|label| {
        name.strip_prefix(label)
            .and_then(|rest| rest.strip_prefix(" Course "))
            .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
    })
}

/// Pad with placeholders or truncate so exactly `count` drafts remain.
pub fn normalize_batch(mut drafts: Vec<CourseDraft>, label: &str, count: usize) -> Vec<CourseDraft> {
    while drafts.len() < count {
        let n = drafts.len() + 1;
        drafts.push(CourseDraft::placeholder(label, n));
    }
    drafts.truncate(count);
    drafts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_with_numbered_placeholders() {
        let drafts = vec![CourseDraft::named("Law")];
        let out = normalize_batch(drafts, "Oxford", 5);
        assert_eq!(out.len(), 5);
        assert_eq!(out[0].course_name, "Law");
        assert_eq!(out[1].course_name, "Oxford Course 2");
        assert_eq!(out[4].course_name, "Oxford Course 5");
        assert_eq!(out[4].discipline, "General");
        assert_eq!(out[4].level, NOT_AVAILABLE);
    }

    #[test]
    fn truncates_long_batches() {
        let drafts = (0..8).map(|i| CourseDraft::named(format!("C{}", i))).collect();
        let out = normalize_batch(drafts, "X", 5);
        assert_eq!(out.len(), 5);
        assert_eq!(out[4].course_name, "C4");
    }

    #[test]
    fn placeholder_shape_is_exact() {
        let labels = ["Oxford", "JMI"];
        assert!(is_placeholder("Oxford Course 2", &labels));
        assert!(is_placeholder("JMI Course 12", &labels));
        assert!(is_placeholder(&CourseDraft::placeholder("JMI", 5).course_name, &labels));
        assert!(!is_placeholder("Foundation Course 1", &labels));
        assert!(!is_placeholder("Oxford Course 2 (Part II)", &labels));
        assert!(!is_placeholder("Oxford Course ", &labels));
    }

    #[test]
    fn empty_cells_become_sentinel() {
        assert_eq!(or_sentinel("  ".into()), NOT_AVAILABLE);
        assert_eq!(or_sentinel("x".into()), "x");
    }
}
