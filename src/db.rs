use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags};
use serde::Serialize;
use tracing::{debug, info};

use crate::model::{is_placeholder, Course, Dataset, University};

pub const UNIVERSITY_COLUMNS: &[&str] = &["university_id", "university_name", "country", "city", "website"];
pub const COURSE_COLUMNS: &[&str] = &[
    "course_id",
    "university_id",
    "course_name",
    "level",
    "discipline",
    "duration",
    "fees",
    "eligibility",
];

/// Open an existing artifact without creating one.
pub fn open(path: &Path) -> Result<Connection> {
    let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA foreign_keys=ON;

        CREATE TABLE IF NOT EXISTS Universities (
            university_id   TEXT PRIMARY KEY,
            university_name TEXT NOT NULL,
            country         TEXT NOT NULL,
            city            TEXT NOT NULL,
            website         TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS Courses (
            course_id     TEXT PRIMARY KEY,
            university_id TEXT NOT NULL REFERENCES Universities(university_id),
            course_name   TEXT NOT NULL,
            level         TEXT NOT NULL,
            discipline    TEXT NOT NULL,
            duration      TEXT NOT NULL,
            fees          TEXT NOT NULL,
            eligibility   TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_courses_university ON Courses(university_id);
        ",
    )?;
    Ok(())
}

// ── Load / save ──

/// Both tables in stored order.
pub fn load(path: &Path) -> Result<Dataset> {
    let conn = open(path)?;

    let mut stmt = conn.prepare(
        "SELECT university_id, university_name, country, city, website
         FROM Universities ORDER BY rowid",
    )?;
    let universities = stmt
        .query_map([], |row| {
            Ok(University {
                id: row.get(0)?,
                name: row.get(1)?,
                country: row.get(2)?,
                city: row.get(3)?,
                website: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut stmt = conn.prepare(
        "SELECT course_id, university_id, course_name, level, discipline, duration, fees, eligibility
         FROM Courses ORDER BY rowid",
    )?;
    let courses = stmt
        .query_map([], |row| {
            Ok(Course {
                id: row.get(0)?,
                university_id: row.get(1)?,
                course_name: row.get(2)?,
                level: row.get(3)?,
                discipline: row.get(4)?,
                duration: row.get(5)?,
                fees: row.get(6)?,
                eligibility: row.get(7)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    debug!(
        path = %path.display(),
        universities = universities.len(),
        courses = courses.len(),
        "loaded artifact"
    );
    Ok(Dataset { universities, courses })
}

/// Write `data` into a new database file at `path`, replacing anything there.
fn write_fresh(path: &Path, data: &Dataset) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove stale {}", path.display()))?;
    }
    let conn = Connection::open(path)?;
    init_schema(&conn)?;

    let tx = conn.unchecked_transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO Universities (university_id, university_name, country, city, website)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        for u in &data.universities {
            stmt.execute(rusqlite::params![u.id, u.name, u.country, u.city, u.website])?;
        }

        let mut stmt = tx.prepare(
            "INSERT INTO Courses (course_id, university_id, course_name, level, discipline, duration, fees, eligibility)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )?;
        for c in &data.courses {
            stmt.execute(rusqlite::params![
                c.id,
                c.university_id,
                c.course_name,
                c.level,
                c.discipline,
                c.duration,
                c.fees,
                c.eligibility,
            ])?;
        }
    }
    tx.commit()?;
    Ok(())
}

/// `<path>.<suffix>`, keeping the original extension in front.
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

pub fn backup_path(path: &Path) -> PathBuf {
    backup_path_at(path, chrono::Local::now())
}

pub fn backup_path_at(path: &Path, at: chrono::DateTime<chrono::Local>) -> PathBuf {
    sibling(path, &format!("{}.bak", at.format("%Y%m%d%H%M%S")))
}

/// Copy `path` aside under a timestamped name.
pub fn backup(path: &Path) -> Result<PathBuf> {
    let dest = backup_path(path);
    fs::copy(path, &dest)
        .with_context(|| format!("Failed to back up {} to {}", path.display(), dest.display()))?;
    info!("Backed up {} to {}", path.display(), dest.display());
    Ok(dest)
}

/// Write to `<path>.tmp`, then rename over `path`. With `keep_backup` the
/// previous artifact is copied aside first.
pub fn save(path: &Path, data: &Dataset, keep_backup: bool) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let tmp = sibling(path, "tmp");
    write_fresh(&tmp, data).with_context(|| format!("Failed to write {}", tmp.display()))?;

    if keep_backup && path.exists() {
        backup(path)?;
    }
    fs::rename(&tmp, path)
        .with_context(|| format!("Failed to move {} into place", tmp.display()))?;
    Ok(())
}

// ── Overview ──

#[derive(Debug, Serialize)]
pub struct OverviewRow {
    pub university: String,
    pub course_name: String,
    pub level: String,
    pub discipline: String,
    pub duration: String,
    pub fees: String,
}

pub fn fetch_overview(
    conn: &Connection,
    university: Option<&str>,
    level: Option<&str>,
    limit: usize,
) -> Result<Vec<OverviewRow>> {
    let mut conditions = Vec::new();
    let mut params: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

    if let Some(u) = university {
        conditions.push(format!("u.university_name LIKE ?{}", params.len() + 1));
        params.push(Box::new(format!("%{}%", u)));
    }
    if let Some(l) = level {
        conditions.push(format!("c.level = ?{}", params.len() + 1));
        params.push(Box::new(l.to_string()));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    };

    let sql = format!(
        "SELECT u.university_name, c.course_name, c.level, c.discipline, c.duration, c.fees
         FROM Courses c JOIN Universities u ON u.university_id = c.university_id{}
         ORDER BY c.rowid
         LIMIT {}",
        where_clause, limit
    );

    let mut stmt = conn.prepare(&sql)?;
    let param_refs: Vec<&dyn rusqlite::types::ToSql> = params.iter().map(|p| p.as_ref()).collect();
    let rows = stmt
        .query_map(param_refs.as_slice(), |row| {
            Ok(OverviewRow {
                university: row.get(0)?,
                course_name: row.get(1)?,
                level: row.get(2)?,
                discipline: row.get(3)?,
                duration: row.get(4)?,
                fees: row.get(5)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ── Stats ──

pub struct Stats {
    pub universities: usize,
    pub courses: usize,
    pub placeholders: usize,
    /// (university name, course count), in stored order.
    pub per_university: Vec<(String, usize)>,
}

/// `labels` are the adapter labels placeholder names are built from.
pub fn get_stats(conn: &Connection, labels: &[&str]) -> Result<Stats> {
    let count = |sql: &str| -> Result<usize> {
        let n: i64 = conn.query_row(sql, [], |row| row.get(0))?;
        Ok(n as usize)
    };

    let mut stmt = conn.prepare(
        "SELECT u.university_name, COUNT(c.course_id)
         FROM Universities u LEFT JOIN Courses c ON c.university_id = u.university_id
         GROUP BY u.university_id
         ORDER BY u.rowid",
    )?;
    let per_university = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as usize)))?
        .collect::<Result<Vec<_>, _>>()?;

    let mut stmt = conn.prepare("SELECT course_name FROM Courses")?;
    let placeholders = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?
        .iter()
        .filter(|name| is_placeholder(name, labels))
        .count();

    Ok(Stats {
        universities: count("SELECT COUNT(*) FROM Universities")?,
        courses: count("SELECT COUNT(*) FROM Courses")?,
        placeholders,
        per_university,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NOT_AVAILABLE;

    fn sample() -> Dataset {
        Dataset {
            universities: vec![University {
                id: "a1b2c3d4".into(),
                name: "University of Oxford".into(),
                country: "United Kingdom".into(),
                city: "Oxford".into(),
                website: "https://www.ox.ac.uk".into(),
            }],
            courses: vec![
                Course {
                    id: "00000001".into(),
                    university_id: "a1b2c3d4".into(),
                    course_name: "Law".into(),
                    level: "Bachelor's".into(),
                    discipline: "Law".into(),
                    duration: "3 Years".into(),
                    fees: "£9,250".into(),
                    eligibility: NOT_AVAILABLE.into(),
                },
                Course {
                    id: "00000002".into(),
                    university_id: "a1b2c3d4".into(),
                    course_name: "Oxford Course 2".into(),
                    level: NOT_AVAILABLE.into(),
                    discipline: "General".into(),
                    duration: NOT_AVAILABLE.into(),
                    fees: NOT_AVAILABLE.into(),
                    eligibility: NOT_AVAILABLE.into(),
                },
            ],
        }
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.sqlite");
        save(&path, &sample(), false).unwrap();
        assert_eq!(load(&path).unwrap(), sample());
        assert!(!sibling(&path, "tmp").exists());
    }

    #[test]
    fn backup_only_when_asked() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.sqlite");
        let backups = || {
            fs::read_dir(dir.path())
                .unwrap()
                .filter(|e| e.as_ref().unwrap().file_name().to_string_lossy().ends_with(".bak"))
                .count()
        };

        save(&path, &sample(), true).unwrap();
        assert_eq!(backups(), 0);
        save(&path, &sample(), false).unwrap();
        assert_eq!(backups(), 0);
        save(&path, &Dataset::default(), true).unwrap();
        assert_eq!(backups(), 1);
        assert!(load(&path).unwrap().is_empty());
    }

    #[test]
    fn garbage_file_fails_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.sqlite");
        fs::write(&path, "this is not a database").unwrap();
        assert!(load(&path).is_err());
        assert!(load(&dir.path().join("missing.sqlite")).is_err());
    }

    #[test]
    fn overview_filters_and_stats() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.sqlite");
        save(&path, &sample(), false).unwrap();
        let conn = open(&path).unwrap();

        let rows = fetch_overview(&conn, Some("oxford"), None, 50).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].university, "University of Oxford");
        let rows = fetch_overview(&conn, None, Some("Bachelor's"), 50).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].course_name, "Law");
        assert!(fetch_overview(&conn, Some("Harvard"), None, 50).unwrap().is_empty());

        let s = get_stats(&conn, &["Oxford"]).unwrap();
        assert_eq!(s.universities, 1);
        assert_eq!(s.courses, 2);
        assert_eq!(s.placeholders, 1);
        assert_eq!(s.per_university, vec![("University of Oxford".to_string(), 2)]);
    }

    #[test]
    fn course_names_resembling_placeholders_are_real() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.sqlite");
        let mut data = sample();
        data.courses[0].course_name = "Foundation Course 1".into();
        save(&path, &data, false).unwrap();

        let s = get_stats(&open(&path).unwrap(), &["Oxford", "Cambridge"]).unwrap();
        assert_eq!(s.courses, 2);
        assert_eq!(s.placeholders, 1);
    }
}
