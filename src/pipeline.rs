use anyhow::{bail, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::fetch::PageSource;
use crate::merge::short_id;
use crate::model::{Dataset, University};
use crate::sites::{self, SiteAdapter};
use crate::university;

/// Adapters named in `only`, in registry order; all of them when `only` is empty.
pub fn select(only: &[String]) -> Result<Vec<Box<dyn SiteAdapter>>> {
    let known = sites::keys();
    if let Some(unknown) = only.iter().find(|k| !known.contains(&k.as_str())) {
        bail!("Unknown institution '{}' (expected one of: {})", unknown, known.join(", "));
    }
    Ok(sites::registry()
        .into_iter()
        .filter(|a| only.is_empty() || only.iter().any(|k| k == a.key()))
        .collect())
}

/// One university plus exactly `batch_size` courses per adapter.
pub fn scrape_all(source: &dyn PageSource, adapters: &[Box<dyn SiteAdapter>], batch_size: usize) -> Dataset {
    let pb = ProgressBar::new(adapters.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    let mut data = Dataset::default();
    for adapter in adapters {
        pb.set_message(adapter.label());
        info!("Processing {}", adapter.label());

        let info = university::resolve(source, adapter.reference_url(), adapter.fallback_name());
        let uni = University {
            id: short_id(),
            name: info.name,
            country: info.country,
            city: info.city,
            website: info.website,
        };

        let drafts = adapter.collect(source, batch_size);
        data.courses
            .extend(drafts.into_iter().map(|d| d.into_course(short_id(), &uni.id)));
        data.universities.push(uni);
        pb.inc(1);
    }

    pb.finish_and_clear();
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FixtureSource;
    use crate::merge::merge_and_persist;
    use crate::verify::verify;

    #[test]
    fn select_filters_in_registry_order() {
        let picked = select(&["oxford".into(), "hamdard".into()]).unwrap();
        let keys: Vec<_> = picked.iter().map(|a| a.key()).collect();
        assert_eq!(keys, vec!["hamdard", "oxford"]);
        assert_eq!(select(&[]).unwrap().len(), 5);
        assert!(select(&["mit".into()]).is_err());
    }

    #[test]
    fn offline_run_yields_full_batches() {
        let source = FixtureSource::new();
        let data = scrape_all(&source, &select(&[]).unwrap(), 5);

        assert_eq!(data.universities.len(), 5);
        assert_eq!(data.courses.len(), 25);
        let names: Vec<_> = data.universities.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Jamia Hamdard",
                "Jamia Millia Islamia",
                "Harvard University",
                "University of Cambridge",
                "University of Oxford",
            ]
        );
        for (i, uni) in data.universities.iter().enumerate() {
            let courses: Vec<_> = data.courses.iter().filter(|c| c.university_id == uni.id).collect();
            assert_eq!(courses.len(), 5, "{}", uni.name);
            assert_eq!(courses[0].university_id, data.universities[i].id);
        }
        assert_eq!(data.courses[5].course_name, "JMI Course 1");
    }

    #[test]
    fn offline_runs_merge_and_verify() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.sqlite");
        let adapters = select(&[]).unwrap();

        for _ in 0..2 {
            let fresh = scrape_all(&FixtureSource::new(), &adapters, 5);
            let merged = merge_and_persist(&path, fresh, false).unwrap();
            assert_eq!(merged.universities.len(), 5);
            assert_eq!(merged.courses.len(), 25);
        }
        assert_eq!(verify(&path), Ok(()));
    }
}
