use rusqlite::Connection;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::error::Result;

pub const SCHEMA_VERSION: i32 = 3;

/// Brings `conn` up to [`SCHEMA_VERSION`], running only the missing steps.
pub fn create_database_with_connection(conn: &Connection) -> Result<()> {
    let mut version = user_version(conn)?;

    if version < 1 {
        create_base_schema(conn)?;
        version = set_user_version(conn, 1)?;
    }
    if version < 2 {
        migrate_1_2(conn)?;
        version = set_user_version(conn, 2)?;
    }
    if version < 3 {
        migrate_2_3(conn)?;
        version = set_user_version(conn, 3)?;
    }

    debug!("database schema at version {}", version);
    Ok(())
}

pub fn user_version(conn: &Connection) -> Result<i32> {
    Ok(conn.query_row("PRAGMA user_version", [], |row| row.get(0))?)
}

fn set_user_version(conn: &Connection, version: i32) -> Result<i32> {
    conn.pragma_update(None, "user_version", version)?;
    Ok(version)
}

fn create_base_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS history_entries (
            id TEXT NOT NULL PRIMARY KEY,
            lotteryTypeId TEXT NOT NULL,
            lotteryTypeName TEXT NOT NULL,
            mainNumbers TEXT NOT NULL,
            bonusNumbers TEXT NOT NULL,
            timestamp INTEGER NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS preferences (
            key TEXT NOT NULL PRIMARY KEY,
            value TEXT NOT NULL
        )",
        [],
    )?;

    Ok(())
}

fn migrate_1_2(conn: &Connection) -> Result<()> {
    info!("migrating database 1 -> 2: custom lottery types");
    conn.execute(
        "CREATE TABLE IF NOT EXISTS custom_lottery_types (
            id TEXT NOT NULL PRIMARY KEY,
            name TEXT NOT NULL,
            displayName TEXT NOT NULL,
            mainNumberCount INTEGER NOT NULL,
            mainNumberMax INTEGER NOT NULL,
            bonusNumberCount INTEGER NOT NULL,
            bonusNumberMax INTEGER NOT NULL,
            createdAt INTEGER NOT NULL,
            updatedAt INTEGER NOT NULL
        )",
        [],
    )?;
    Ok(())
}

/// Adds the format snapshot columns to history rows and backfills the games
/// that existed before the snapshot was stored.
fn migrate_2_3(conn: &Connection) -> Result<()> {
    info!("migrating database 2 -> 3: history format snapshot");
    let tx = conn.unchecked_transaction()?;

    for column in [
        "lotteryTypeMainNumberCount",
        "lotteryTypeMainNumberMax",
        "lotteryTypeBonusNumberCount",
        "lotteryTypeBonusNumberMax",
        "isCustomLotteryType",
    ] {
        tx.execute(
            &format!(
                "ALTER TABLE history_entries ADD COLUMN {} INTEGER NOT NULL DEFAULT 0",
                column
            ),
            [],
        )?;
    }

    tx.execute(
        "UPDATE history_entries SET
            lotteryTypeMainNumberCount = CASE lotteryTypeId
                WHEN 'powerball' THEN 5
                WHEN 'mega_millions' THEN 5
                WHEN 'lotto_6_49' THEN 6
                ELSE lotteryTypeMainNumberCount
            END,
            lotteryTypeMainNumberMax = CASE lotteryTypeId
                WHEN 'powerball' THEN 69
                WHEN 'mega_millions' THEN 70
                WHEN 'lotto_6_49' THEN 49
                ELSE lotteryTypeMainNumberMax
            END,
            lotteryTypeBonusNumberCount = CASE lotteryTypeId
                WHEN 'powerball' THEN 1
                WHEN 'mega_millions' THEN 1
                WHEN 'lotto_6_49' THEN 0
                ELSE lotteryTypeBonusNumberCount
            END,
            lotteryTypeBonusNumberMax = CASE lotteryTypeId
                WHEN 'powerball' THEN 26
                WHEN 'mega_millions' THEN 25
                WHEN 'lotto_6_49' THEN 0
                ELSE lotteryTypeBonusNumberMax
            END,
            isCustomLotteryType = CASE
                WHEN lotteryTypeId IN ('powerball', 'mega_millions', 'lotto_6_49') THEN 0
                ELSE isCustomLotteryType
            END",
        [],
    )?;

    tx.commit()?;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    History,
    CustomTypes,
    Preferences,
}

struct ChangeTracker {
    history: watch::Sender<u64>,
    custom_types: watch::Sender<u64>,
    preferences: watch::Sender<u64>,
}

impl ChangeTracker {
    fn new() -> Self {
        Self {
            history: watch::channel(0).0,
            custom_types: watch::channel(0).0,
            preferences: watch::channel(0).0,
        }
    }

    fn sender(&self, table: Table) -> &watch::Sender<u64> {
        match table {
            Table::History => &self.history,
            Table::CustomTypes => &self.custom_types,
            Table::Preferences => &self.preferences,
        }
    }
}

/// Shared handle to the single SQLite connection.
///
/// The connection is only locked inside blocking closures. Every write
/// through [`Database::write`] bumps a per-table counter that observed feeds
/// wait on.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
    changes: Arc<ChangeTracker>,
}

impl Database {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            changes: Arc::new(ChangeTracker::new()),
        }
    }

    /// Migrated in-memory database.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        create_database_with_connection(&conn)?;
        Ok(Self::new(conn))
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        // A panic while holding the lock cannot leave SQLite half written.
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = self.lock();
        f(&conn)
    }

    pub fn write<T>(&self, table: Table, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let result = self.with_conn(f)?;
        self.notify(table);
        Ok(result)
    }

    pub fn notify(&self, table: Table) {
        self.changes.sender(table).send_modify(|version| *version += 1);
    }

    pub fn subscribe(&self, table: Table) -> watch::Receiver<u64> {
        self.changes.sender(table).subscribe()
    }
}
