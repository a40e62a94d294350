//! `SQLite` schema definitions for auta.

/// SQL statement to create the cars table.
///
/// `cena` keeps the price exactly as it was accepted, so it is declared
/// `TEXT` rather than `REAL`.
pub const CREATE_CARS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS auta (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    nazev TEXT NOT NULL,
    popis TEXT NOT NULL,
    datum_uvedeni TEXT NOT NULL,
    cena TEXT,
    barva TEXT
)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[CREATE_CARS_TABLE, CREATE_METADATA_TABLE];
