use std::path::Path;
use std::time::Duration;

use rusqlite::Connection;

use super::DatabaseError;

/// Ordered migrations for the relational store.
pub const RELATIONAL_MIGRATIONS: &[(i64, &str)] = &[
    (1, include_str!("../../resources/migrations/001_users.sql")),
    (2, include_str!("../../resources/migrations/002_patients.sql")),
];

/// Ordered migrations for the document store.
pub const DOCUMENT_MIGRATIONS: &[(i64, &str)] = &[(
    1,
    include_str!("../../resources/migrations/documents/001_documents.sql"),
)];

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open the relational store at `path` and run pending migrations
pub fn open_database(path: &Path) -> Result<Connection, DatabaseError> {
    open_with_migrations(path, RELATIONAL_MIGRATIONS)
}

/// Open the document store at `path` and run pending migrations
pub fn open_document_database(path: &Path) -> Result<Connection, DatabaseError> {
    open_with_migrations(path, DOCUMENT_MIGRATIONS)
}

/// Open an in-memory relational database (for testing)
pub fn open_memory_database() -> Result<Connection, DatabaseError> {
    let conn = Connection::open_in_memory()?;
    configure_pragmas(&conn)?;
    run_migrations(&conn, RELATIONAL_MIGRATIONS)?;
    Ok(conn)
}

fn open_with_migrations(
    path: &Path,
    migrations: &[(i64, &str)],
) -> Result<Connection, DatabaseError> {
    let conn = Connection::open(path)?;
    configure_pragmas(&conn)?;
    run_migrations(&conn, migrations)?;
    Ok(conn)
}

fn configure_pragmas(conn: &Connection) -> Result<(), DatabaseError> {
    conn.busy_timeout(BUSY_TIMEOUT)?;
    conn.execute_batch(
        "PRAGMA journal_mode=DELETE;
         PRAGMA foreign_keys=ON;"
    )?;
    Ok(())
}

/// Run all pending migrations
pub fn run_migrations(conn: &Connection, migrations: &[(i64, &str)]) -> Result<(), DatabaseError> {
    let current_version = get_current_version(conn);

    for &(version, sql) in migrations {
        if version > current_version {
            tracing::info!("Running migration v{version}");
            conn.execute_batch(sql).map_err(|e| DatabaseError::MigrationFailed {
                version,
                reason: e.to_string(),
            })?;
        }
    }

    Ok(())
}

/// Get the current schema version (0 if no schema exists yet)
fn get_current_version(conn: &Connection) -> i64 {
    conn.query_row(
        "SELECT MAX(version) FROM schema_version",
        [],
        |row| row.get::<_, i64>(0),
    )
    .unwrap_or(0)
}

/// Count tables in the database (for verification)
pub fn count_tables(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |row| row.get::<_, i64>(0),
    )?;
    Ok(count)
}
