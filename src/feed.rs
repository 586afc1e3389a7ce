use rusqlite::Connection;
use std::sync::Arc;
use tokio::sync::watch;

use crate::database::{Database, Table};
use crate::error::{LottoError, Result};

type Query<T> = Arc<dyn Fn(&Connection) -> Result<T> + Send + Sync>;

/// A continuously updating read.
///
/// The first call to [`Feed::next`] yields the current value; every later
/// call waits for a write to the watched table and re-runs the query on the
/// blocking pool. Dropping the feed ends the subscription.
pub struct Feed<T> {
    db: Database,
    changes: watch::Receiver<u64>,
    query: Query<T>,
    primed: bool,
}

impl<T: Send + 'static> Feed<T> {
    pub fn new<F>(db: Database, table: Table, query: F) -> Self
    where
        F: Fn(&Connection) -> Result<T> + Send + Sync + 'static,
    {
        let changes = db.subscribe(table);
        Self {
            db,
            changes,
            query: Arc::new(query),
            primed: false,
        }
    }

    /// Next snapshot, or `None` once the database handle is gone.
    pub async fn next(&mut self) -> Option<Result<T>> {
        if self.primed {
            self.changes.changed().await.ok()?;
        }
        self.changes.borrow_and_update();
        self.primed = true;

        let db = self.db.clone();
        let query = Arc::clone(&self.query);
        let snapshot = tokio::task::spawn_blocking(move || db.with_conn(|conn| query(conn)))
            .await
            .unwrap_or_else(|e| Err(LottoError::Task(e.to_string())));
        Some(snapshot)
    }

    /// The value right now, read on the blocking pool. Consumes the feed.
    pub async fn first(mut self) -> Result<T> {
        match self.next().await {
            Some(snapshot) => snapshot,
            None => Err(LottoError::Task("feed closed".to_string())),
        }
    }

    /// Current value without waiting and without consuming a change. Blocks
    /// on the connection.
    pub fn current(&self) -> Result<T> {
        self.db.with_conn(|conn| (self.query)(conn))
    }

    /// Transforms every snapshot with `f`.
    pub fn map<U, F>(self, f: F) -> Feed<U>
    where
        U: Send + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let query = self.query;
        Feed {
            db: self.db,
            changes: self.changes,
            query: Arc::new(move |conn: &Connection| query(conn).map(&f)),
            primed: self.primed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn count_rows(conn: &Connection) -> Result<i64> {
        Ok(conn.query_row("SELECT COUNT(*) FROM preferences", [], |row| row.get(0))?)
    }

    #[tokio::test]
    async fn emits_current_value_then_each_change() {
        let db = Database::in_memory().unwrap();
        let mut feed = Feed::new(db.clone(), Table::Preferences, count_rows);

        assert_eq!(feed.next().await.unwrap().unwrap(), 0);

        db.write(Table::Preferences, |conn| {
            conn.execute("INSERT INTO preferences VALUES ('k', 'v')", [])?;
            Ok(())
        })
        .unwrap();

        assert_eq!(feed.next().await.unwrap().unwrap(), 1);
    }

    #[tokio::test]
    async fn waits_while_nothing_changes() {
        let db = Database::in_memory().unwrap();
        let mut feed = Feed::new(db.clone(), Table::Preferences, count_rows);
        feed.next().await.unwrap().unwrap();

        let waited = tokio::time::timeout(Duration::from_millis(50), feed.next()).await;
        assert!(waited.is_err());
    }

    #[tokio::test]
    async fn other_tables_do_not_wake_the_feed() {
        let db = Database::in_memory().unwrap();
        let mut feed = Feed::new(db.clone(), Table::Preferences, count_rows).map(|n| n * 10);
        assert_eq!(feed.next().await.unwrap().unwrap(), 0);

        db.notify(Table::History);
        let waited = tokio::time::timeout(Duration::from_millis(50), feed.next()).await;
        assert!(waited.is_err());
        assert_eq!(feed.current().unwrap(), 0);
    }
}
