//! SQL schema for the submissions table.
//!
//! There are no migrations; the DDL only ever creates what is missing.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS instruktors (
    id       INTEGER PRIMARY KEY AUTOINCREMENT,
    datum    TEXT NOT NULL,   -- 'YYYY-MM-DD HH:MM', server local time
    ime      TEXT NOT NULL,
    priimek  TEXT NOT NULL,
    email    TEXT NOT NULL,
    razred   TEXT NOT NULL,   -- '1. letnik' .. '4. letnik'
    oddelek  TEXT NOT NULL,   -- 'a' .. 'f'
    predmeti TEXT NOT NULL    -- 'Label (Teacher); ...' or the placeholder
);
";

/// How long a connection waits on a locked database before giving up, in
/// milliseconds.
pub const BUSY_TIMEOUT_MS: u64 = 5_000;
