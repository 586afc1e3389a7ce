use anyhow::{Context, Result};
use rusqlite::Connection;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::database::{Database, create_database_with_connection};

/// Opens the database file, creating its directory if needed, and brings
/// the schema up to date.
pub fn conn(database_url: &str) -> Result<Connection> {
    if let Some(parent) = Path::new(database_url).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }

    let conn = Connection::open(database_url)
        .with_context(|| format!("opening {}", database_url))?;

    // Initialize the database tables
    create_database_with_connection(&conn)?;

    info!("database ready at {}", database_url);
    Ok(conn)
}

pub fn open_database(database_url: &str) -> Result<Database> {
    Ok(Database::new(conn(database_url)?))
}
