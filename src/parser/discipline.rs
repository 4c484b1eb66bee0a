use crate::model::DEFAULT_DISCIPLINE;

/// Keyword → discipline, checked in order; the first contained keyword wins.
pub const DISCIPLINES: &[(&str, &str)] = &[
    ("computer", "Computer Science"),
    ("engineering", "Engineering"),
    ("law", "Law"),
    ("medicine", "Medicine"),
    ("medic", "Medicine"),
    ("business", "Business"),
    ("management", "Management"),
    ("mba", "Management"),
    ("pharm", "Pharmacy"),
    ("nurs", "Nursing"),
    ("architect", "Architecture"),
    ("math", "Mathematics"),
    ("econom", "Economics"),
    ("dent", "Dentistry"),
    ("communi", "Communication"),
    ("history", "History"),
    ("archaeol", "Archaeology"),
    ("data science", "Data Science"),
    ("arts", "Arts"),
    ("science", "Sciences"),
    ("hotel", "Hotel Management"),
    ("commerce", "Commerce"),
];

pub fn classify(course_name: &str) -> &'static str {
    let lower = course_name.to_lowercase();
    DISCIPLINES
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, label)| *label)
        .unwrap_or(DEFAULT_DISCIPLINE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_keyword_in_table_order_wins() {
        assert_eq!(classify("BSc Computer Science"), "Computer Science");
        assert_eq!(classify("Computer Engineering"), "Computer Science");
        assert_eq!(classify("Mechanical Engineering"), "Engineering");
    }

    #[test]
    fn case_insensitive() {
        assert_eq!(classify("B.PHARM"), "Pharmacy");
        assert_eq!(classify("master of business administration (MBA)"), "Business");
        assert_eq!(classify("MBA"), "Management");
    }

    #[test]
    fn substring_matches_inside_words() {
        // "dent" sits inside "student"
        assert_eq!(classify("Student Exchange"), "Dentistry");
        assert_eq!(classify("Economics and Management"), "Management");
    }

    #[test]
    fn total_with_default() {
        assert_eq!(classify(""), "General");
        assert_eq!(classify("Classics"), "General");
        assert_eq!(classify("Data Science"), "Data Science");
    }
}
