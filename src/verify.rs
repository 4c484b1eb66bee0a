use std::path::Path;

use rusqlite::Connection;
use thiserror::Error;

use crate::db::{self, COURSE_COLUMNS, UNIVERSITY_COLUMNS};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerifyError {
    #[error("cannot open artifact: {0}")]
    Unreadable(String),
    #[error("table {0} is missing")]
    MissingTable(&'static str),
    #[error("table {table} is missing column {column}")]
    MissingColumn { table: &'static str, column: &'static str },
    #[error("{table}.{column} has {count} duplicated values")]
    DuplicateIds {
        table: &'static str,
        column: &'static str,
        count: usize,
    },
    #[error("table {table} has {count} fully duplicated rows")]
    DuplicateRows { table: &'static str, count: usize },
    #[error("{0} courses reference an unknown university_id")]
    DanglingCourses(usize),
}

const TABLES: &[(&str, &[&str])] = &[("Universities", UNIVERSITY_COLUMNS), ("Courses", COURSE_COLUMNS)];

/// Run every integrity check in order, stopping at the first failure.
pub fn verify(path: &Path) -> Result<(), VerifyError> {
    let conn = db::open(path).map_err(|e| VerifyError::Unreadable(format!("{:#}", e)))?;
    check(&conn).map_err(|e| match e {
        Failure::Check(v) => v,
        Failure::Sql(e) => VerifyError::Unreadable(e.to_string()),
    })
}

enum Failure {
    Check(VerifyError),
    Sql(rusqlite::Error),
}

impl From<rusqlite::Error> for Failure {
    fn from(e: rusqlite::Error) -> Self {
        Failure::Sql(e)
    }
}

impl From<VerifyError> for Failure {
    fn from(e: VerifyError) -> Self {
        Failure::Check(e)
    }
}

fn check(conn: &Connection) -> Result<(), Failure> {
    for &(table, _) in TABLES {
        let present: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [table],
            |row| row.get(0),
        )?;
        if present == 0 {
            return Err(VerifyError::MissingTable(table).into());
        }
    }

    for &(table, columns) in TABLES {
        let mut stmt = conn.prepare(&format!("SELECT name FROM pragma_table_info('{}')", table))?;
        let actual = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        if let Some(column) = columns.iter().copied().find(|c| !actual.iter().any(|a| a == c)) {
            return Err(VerifyError::MissingColumn { table, column }.into());
        }
    }

    for &(table, columns) in TABLES {
        let cols = columns.join(", ");
        let count = count(
            conn,
            &format!(
                "SELECT COUNT(*) FROM (SELECT {c} FROM {t} GROUP BY {c} HAVING COUNT(*) > 1)",
                c = cols,
                t = table
            ),
        )?;
        if count > 0 {
            return Err(VerifyError::DuplicateRows { table, count }.into());
        }
    }

    for &(table, columns) in TABLES {
        let column = columns[0];
        let count = count(
            conn,
            &format!(
                "SELECT COUNT(*) FROM (SELECT {c} FROM {t} GROUP BY {c} HAVING COUNT(*) > 1)",
                c = column,
                t = table
            ),
        )?;
        if count > 0 {
            return Err(VerifyError::DuplicateIds { table, column, count }.into());
        }
    }

    let dangling = count(
        conn,
        "SELECT COUNT(*) FROM Courses c
         WHERE NOT EXISTS (SELECT 1 FROM Universities u WHERE u.university_id = c.university_id)",
    )?;
    if dangling > 0 {
        return Err(VerifyError::DanglingCourses(dangling).into());
    }
    Ok(())
}

fn count(conn: &Connection, sql: &str) -> Result<usize, rusqlite::Error> {
    let n: i64 = conn.query_row(sql, [], |row| row.get(0))?;
    Ok(n as usize)
}
