//! Schema versioning for the cars database.
//!
//! The version lives in the `metadata` table under `schema_version`.

use std::cmp::Ordering;

use rusqlite::{Connection, OptionalExtension};
use tracing::debug;

use crate::error::{Error, Result};

use super::schema::SCHEMA_STATEMENTS;

/// The current schema version.
pub const CURRENT_VERSION: i32 = 1;

/// Key used to store the schema version in the metadata table.
const VERSION_KEY: &str = "schema_version";

/// Create missing tables and bring the schema up to [`CURRENT_VERSION`].
///
/// Safe to call on every startup; existing rows are never touched. A
/// database written by a newer build is refused rather than opened.
///
/// # Errors
///
/// Returns an error if schema creation or migration fails, or if the stored
/// version is unreadable or newer than this build supports.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    for statement in SCHEMA_STATEMENTS {
        conn.execute(statement, [])?;
    }

    let stored = get_schema_version(conn)?;
    match stored.cmp(&CURRENT_VERSION) {
        Ordering::Equal => Ok(()),
        Ordering::Less => upgrade(conn, stored),
        Ordering::Greater => Err(Error::DatabaseMigration {
            message: format!(
                "database schema version {stored} is newer than supported version {CURRENT_VERSION}"
            ),
        }),
    }
}

/// Stored schema version, or 0 when none has been recorded yet.
fn get_schema_version(conn: &Connection) -> Result<i32> {
    let stored: Option<String> = conn
        .query_row(
            "SELECT value FROM metadata WHERE key = ?1",
            [VERSION_KEY],
            |row| row.get(0),
        )
        .optional()?;

    let Some(value) = stored else {
        return Ok(0);
    };
    value.parse().map_err(|_| Error::DatabaseMigration {
        message: format!("invalid schema version: {value}"),
    })
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
        (VERSION_KEY, version.to_string()),
    )?;
    Ok(())
}

/// Apply each step after `stored`, recording the version as it goes.
fn upgrade(conn: &Connection, stored: i32) -> Result<()> {
    for version in stored + 1..=CURRENT_VERSION {
        debug!("Applying schema migration {}", version);
        apply_step(conn, version)?;
        set_schema_version(conn, version)?;
    }
    Ok(())
}

fn apply_step(_conn: &Connection, version: i32) -> Result<()> {
    match version {
        // the `auta` table comes from SCHEMA_STATEMENTS
        1 => Ok(()),
        _ => Err(Error::DatabaseMigration {
            message: format!("unknown migration version: {version}"),
        }),
    }
}
