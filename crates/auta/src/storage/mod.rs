//! Storage layer for auta.
//!
//! This module provides `SQLite`-based persistent storage for car records.
//! Every mutation is a single statement that commits immediately.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::car::{Car, CarDraft};
use crate::error::{Error, Result};

/// How long a connection waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Column list shared by every `SELECT`.
const CAR_COLUMNS: &str = "id, nazev, popis, datum_uvedeni, cena, barva";

/// A connection to the cars database.
///
/// Dropping the value closes the connection.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist
    /// and initializes the schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema
    /// initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let storage = Self::connect(&path)?;

        // WAL lets readers proceed while another request writes
        storage
            .conn
            .execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        storage.initialize()?;

        info!("Database opened successfully at {}", path.display());
        Ok(storage)
    }

    /// Open a connection to an existing database without touching the schema.
    ///
    /// This is the per-request acquisition path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn connect(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        Ok(Self { path, conn })
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        let storage = Self {
            path: PathBuf::from(":memory:"),
            conn,
        };
        storage.initialize()?;
        Ok(storage)
    }

    /// Create the schema if it is missing. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if schema creation or migration fails.
    pub fn initialize(&self) -> Result<()> {
        migrations::initialize_schema(&self.conn)
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every stored car, in id order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_all(&self) -> Result<Vec<Car>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {CAR_COLUMNS} FROM auta ORDER BY id"))?;

        let cars = stmt
            .query_map([], Self::row_to_car)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(cars)
    }

    /// Get a car by its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get(&self, id: i64) -> Result<Option<Car>> {
        let car = self
            .conn
            .query_row(
                &format!("SELECT {CAR_COLUMNS} FROM auta WHERE id = ?1"),
                [id],
                Self::row_to_car,
            )
            .optional()?;
        Ok(car)
    }

    /// Insert a new car and return its assigned ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn insert(&self, draft: &CarDraft) -> Result<i64> {
        self.conn.execute(
            r"
            INSERT INTO auta (nazev, popis, datum_uvedeni, cena, barva)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ",
            params![
                draft.name,
                draft.description,
                draft.release_date,
                draft.price,
                draft.color,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!("Inserted car with id {}", id);
        Ok(id)
    }

    /// Overwrite every mutable field of the car with the given ID.
    ///
    /// Returns `true` if a car was updated, `false` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn update(&self, id: i64, draft: &CarDraft) -> Result<bool> {
        let affected = self.conn.execute(
            r"
            UPDATE auta
            SET nazev = ?1, popis = ?2, datum_uvedeni = ?3, cena = ?4, barva = ?5
            WHERE id = ?6
            ",
            params![
                draft.name,
                draft.description,
                draft.release_date,
                draft.price,
                draft.color,
                id,
            ],
        )?;
        Ok(affected > 0)
    }

    /// Delete a car by ID.
    ///
    /// Returns `true` if a car was deleted, `false` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete(&self, id: i64) -> Result<bool> {
        let affected = self.conn.execute("DELETE FROM auta WHERE id = ?1", [id])?;
        Ok(affected > 0)
    }

    /// Count stored cars.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM auta", [], |row| row.get(0))?;
        Ok(count)
    }

    fn row_to_car(row: &rusqlite::Row) -> rusqlite::Result<Car> {
        Ok(Car {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            release_date: row.get(3)?,
            price: row.get(4)?,
            color: row.get(5)?,
        })
    }
}

/// Location of the cars database, shared by every request.
///
/// Holds no connection itself; each request calls [`Database::connect`] and
/// drops the returned [`Storage`] when it is done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    /// Create a handle for the database at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the database file and schema if needed.
    ///
    /// Returns `true` if the file did not exist before.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be created or initialized.
    pub fn initialize(&self) -> Result<bool> {
        let created = !self.path.exists();
        Storage::open(&self.path)?;
        if created {
            info!("Created database at {}", self.path.display());
        }
        Ok(created)
    }

    /// Acquire a connection for one request.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn connect(&self) -> Result<Storage> {
        Storage::connect(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_storage() -> Storage {
        Storage::open_in_memory().expect("failed to create test storage")
    }

    fn octavia() -> CarDraft {
        CarDraft {
            name: "Škoda Octavia".to_string(),
            description: "Rodinné auto".to_string(),
            release_date: "2024-01-01".to_string(),
            price: Some("599000".to_string()),
            color: Some("#003da5".to_string()),
        }
    }

    fn fabia() -> CarDraft {
        CarDraft {
            name: "Škoda Fabia".to_string(),
            description: "Malé auto".to_string(),
            release_date: "1999".to_string(),
            price: None,
            color: None,
        }
    }

    #[test]
    fn test_open_in_memory() {
        let storage = Storage::open_in_memory();
        assert!(storage.is_ok());
        assert_eq!(storage.unwrap().path(), Path::new(":memory:"));
    }

    #[test]
    fn test_insert_and_get_round_trip() {
        let storage = create_test_storage();

        let id = storage.insert(&octavia()).unwrap();
        let car = storage.get(id).unwrap().unwrap();

        assert_eq!(car, octavia().into_car(id));
    }

    #[test]
    fn test_absent_optional_fields_round_trip() {
        let storage = create_test_storage();

        let id = storage.insert(&fabia()).unwrap();
        let car = storage.get(id).unwrap().unwrap();

        assert_eq!(car.price, None);
        assert_eq!(car.color, None);
    }

    #[test]
    fn test_price_kept_verbatim() {
        let storage = create_test_storage();
        let mut draft = octavia();
        draft.price = Some("12.".to_string());

        let id = storage.insert(&draft).unwrap();
        let car = storage.get(id).unwrap().unwrap();
        assert_eq!(car.price.as_deref(), Some("12."));
    }

    #[test]
    fn test_ids_are_assigned_sequentially() {
        let storage = create_test_storage();

        let first = storage.insert(&octavia()).unwrap();
        let second = storage.insert(&fabia()).unwrap();
        assert!(second > first);
    }

    #[test]
    fn test_ids_are_not_reused_after_delete() {
        let storage = create_test_storage();

        let first = storage.insert(&octavia()).unwrap();
        storage.delete(first).unwrap();
        let second = storage.insert(&fabia()).unwrap();
        assert!(second > first);
    }

    #[test]
    fn test_get_nonexistent() {
        let storage = create_test_storage();
        assert!(storage.get(9999).unwrap().is_none());
    }

    #[test]
    fn test_list_all_in_insertion_order() {
        let storage = create_test_storage();
        assert!(storage.list_all().unwrap().is_empty());

        storage.insert(&octavia()).unwrap();
        storage.insert(&fabia()).unwrap();

        let names: Vec<String> = storage
            .list_all()
            .unwrap()
            .into_iter()
            .map(|car| car.name)
            .collect();
        assert_eq!(names, vec!["Škoda Octavia", "Škoda Fabia"]);
    }

    #[test]
    fn test_update_overwrites_all_fields() {
        let storage = create_test_storage();
        let id = storage.insert(&octavia()).unwrap();

        assert!(storage.update(id, &fabia()).unwrap());

        let car = storage.get(id).unwrap().unwrap();
        assert_eq!(car, fabia().into_car(id));
    }

    #[test]
    fn test_update_nonexistent_is_noop() {
        let storage = create_test_storage();
        storage.insert(&octavia()).unwrap();

        assert!(!storage.update(9999, &fabia()).unwrap());
        assert_eq!(storage.count().unwrap(), 1);
        assert!(storage.get(9999).unwrap().is_none());
    }

    #[test]
    fn test_delete() {
        let storage = create_test_storage();
        let id = storage.insert(&octavia()).unwrap();

        assert!(storage.delete(id).unwrap());
        assert!(storage.get(id).unwrap().is_none());
        assert!(!storage.delete(id).unwrap());
    }

    #[test]
    fn test_count() {
        let storage = create_test_storage();
        assert_eq!(storage.count().unwrap(), 0);

        storage.insert(&octavia()).unwrap();
        storage.insert(&fabia()).unwrap();
        assert_eq!(storage.count().unwrap(), 2);
    }

    #[test]
    fn test_initialize_twice_keeps_data() {
        let storage = create_test_storage();
        let id = storage.insert(&octavia()).unwrap();

        storage.initialize().unwrap();
        storage.initialize().unwrap();

        assert_eq!(storage.count().unwrap(), 1);
        assert!(storage.get(id).unwrap().is_some());
    }

    #[test]
    fn test_open_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("auta.db");

        let storage = Storage::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(storage.path(), path.as_path());
    }

    #[test]
    fn test_data_persists_across_connections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auta.db");

        let id = {
            let storage = Storage::open(&path).unwrap();
            storage.insert(&octavia()).unwrap()
        };

        let storage = Storage::connect(&path).unwrap();
        assert_eq!(storage.get(id).unwrap(), Some(octavia().into_car(id)));
    }

    #[test]
    fn test_database_initialize_reports_creation() {
        let dir = tempfile::tempdir().unwrap();
        let database = Database::new(dir.path().join("auta.db"));

        assert!(database.initialize().unwrap());
        assert!(!database.initialize().unwrap());

        let storage = database.connect().unwrap();
        assert_eq!(storage.count().unwrap(), 0);
    }
}
