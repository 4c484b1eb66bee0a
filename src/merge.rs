//! Folding a fresh scrape into the persisted dataset.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::Result;
use tracing::{info, warn};
use uuid::Uuid;

use crate::db;
use crate::model::{or_sentinel, Course, Dataset, University};

/// Eight lowercase hex characters.
pub fn short_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

fn unused_id(taken: &HashSet<String>) -> String {
    loop {
        let id = short_id();
        if !taken.contains(&id) {
            return id;
        }
    }
}

/// Give fresh records new ids wherever they collide with ids already taken.
/// Courses follow their university's new id.
fn reissue_colliding(prior: &Dataset, fresh: &mut Dataset) {
    let mut taken: HashSet<String> = prior.universities.iter().map(|u| u.id.clone()).collect();
    let mut renamed = HashMap::new();
    for u in fresh.universities.iter_mut() {
        if !taken.insert(u.id.clone()) {
            let id = unused_id(&taken);
            taken.insert(id.clone());
            renamed.insert(std::mem::replace(&mut u.id, id.clone()), id);
        }
    }

    let mut taken: HashSet<String> = prior.courses.iter().map(|c| c.id.clone()).collect();
    for c in fresh.courses.iter_mut() {
        if let Some(id) = renamed.get(&c.university_id) {
            c.university_id = id.clone();
        }
        if !taken.insert(c.id.clone()) {
            let id = unused_id(&taken);
            taken.insert(id.clone());
            c.id = id;
        }
    }
}

/// Keep the last record per key; survivors keep their relative order.
fn dedup_last<T, K, F>(rows: Vec<T>, key: F) -> Vec<T>
where
    K: std::hash::Hash + Eq,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::new();
    let mut kept: Vec<T> = rows.into_iter().rev().filter(|r| seen.insert(key(r))).collect();
    kept.reverse();
    kept
}

/// Combine `prior` and `fresh` (fresh after prior). Universities are unique by
/// name and courses by (name, university), later records winning. Every
/// returned course points at a returned university.
pub fn merge(prior: Dataset, mut fresh: Dataset) -> Dataset {
    reissue_colliding(&prior, &mut fresh);

    let universities: Vec<University> = prior.universities.into_iter().chain(fresh.universities).collect();
    let mut winner: HashMap<&str, &str> = HashMap::new();
    for u in &universities {
        winner.insert(u.name.as_str(), u.id.as_str());
    }
    let remap: HashMap<String, String> = universities
        .iter()
        .filter(|u| winner[u.name.as_str()] != u.id)
        .map(|u| (u.id.clone(), winner[u.name.as_str()].to_string()))
        .collect();

    let universities = dedup_last(universities, |u| u.name.clone());
    let known: HashSet<&str> = universities.iter().map(|u| u.id.as_str()).collect();

    let mut courses: Vec<Course> = prior.courses.into_iter().chain(fresh.courses).collect();
    for c in courses.iter_mut() {
        if let Some(id) = remap.get(&c.university_id) {
            c.university_id = id.clone();
        }
    }
    let mut courses = dedup_last(courses, |c| (c.course_name.clone(), c.university_id.clone()));

    let before = courses.len();
    courses.retain(|c| known.contains(c.university_id.as_str()));
    if courses.len() < before {
        warn!("Dropped {} courses with no matching university", before - courses.len());
    }

    let universities: Vec<University> = universities
        .into_iter()
        .map(|u| University {
            id: u.id,
            name: or_sentinel(u.name),
            country: or_sentinel(u.country),
            city: or_sentinel(u.city),
            website: or_sentinel(u.website),
        })
        .collect();
    let courses = courses
        .into_iter()
        .map(|c| Course {
            id: c.id,
            university_id: c.university_id,
            course_name: or_sentinel(c.course_name),
            level: or_sentinel(c.level),
            discipline: or_sentinel(c.discipline),
            duration: or_sentinel(c.duration),
            fees: or_sentinel(c.fees),
            eligibility: or_sentinel(c.eligibility),
        })
        .collect();

    Dataset { universities, courses }
}

/// Load whatever is at `path`, merge `fresh` into it and write the result back.
/// An unreadable artifact is backed up when possible and replaced either way.
pub fn merge_and_persist(path: &Path, fresh: Dataset, keep_backup: bool) -> Result<Dataset> {
    let prior = if path.exists() {
        match db::load(path) {
            Ok(prior) => prior,
            Err(e) => {
                warn!("Could not read existing {}: {:#}. Starting fresh.", path.display(), e);
                if let Err(e) = db::backup(path) {
                    warn!("Replacing {} without a backup: {:#}", path.display(), e);
                }
                Dataset::default()
            }
        }
    } else {
        Dataset::default()
    };
    if !prior.is_empty() {
        info!(
            prior_universities = prior.universities.len(),
            prior_courses = prior.courses.len(),
            "merging into existing artifact"
        );
    }

    let merged = merge(prior, fresh);
    db::save(path, &merged, keep_backup)?;
    info!(
        universities = merged.universities.len(),
        courses = merged.courses.len(),
        path = %path.display(),
        "saved"
    );
    Ok(merged)
}
