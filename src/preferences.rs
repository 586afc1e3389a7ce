use rusqlite::{Connection, OptionalExtension};
use std::collections::BTreeSet;
use tracing::warn;

use crate::error::Result;

pub const DISCLAIMER_ACCEPTED: &str = "disclaimer_accepted";
pub const SELECTED_LOTTERY_TYPE_ID: &str = "selected_lottery_type_id";
pub const LAST_GENERATED_NUMBERS_ID: &str = "last_generated_numbers_id";
pub const CONFETTI_SHOWN_FOR_TYPES: &str = "confetti_shown_for_types";

pub fn get_preference(conn: &Connection, key: &str) -> Result<Option<String>> {
    Ok(conn
        .query_row(
            "SELECT value FROM preferences WHERE key = ?1",
            [key],
            |row| row.get(0),
        )
        .optional()?)
}

pub fn set_preference(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO preferences (key, value) VALUES (?1, ?2)",
        [key, value],
    )?;
    Ok(())
}

pub fn remove_preference(conn: &Connection, key: &str) -> Result<()> {
    conn.execute("DELETE FROM preferences WHERE key = ?1", [key])?;
    Ok(())
}

pub fn get_flag(conn: &Connection, key: &str) -> Result<bool> {
    Ok(get_preference(conn, key)?.is_some_and(|value| value == "true"))
}

pub fn set_flag(conn: &Connection, key: &str, value: bool) -> Result<()> {
    set_preference(conn, key, if value { "true" } else { "false" })
}

/// String sets are stored as a JSON array. A value that does not parse reads
/// as an empty set and is replaced by the next insert.
pub fn get_string_set(conn: &Connection, key: &str) -> Result<BTreeSet<String>> {
    let Some(raw) = get_preference(conn, key)? else {
        return Ok(BTreeSet::new());
    };

    Ok(serde_json::from_str(&raw).unwrap_or_else(|e| {
        warn!("Discarding unreadable {} value '{}': {}", key, raw, e);
        BTreeSet::new()
    }))
}

pub fn insert_into_string_set(conn: &Connection, key: &str, value: &str) -> Result<()> {
    let mut set = get_string_set(conn, key)?;
    if set.insert(value.to_string()) {
        set_preference(conn, key, &serde_json::to_string(&set)?)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::create_database_with_connection;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        create_database_with_connection(&conn).unwrap();
        conn
    }

    #[test]
    fn missing_values_read_as_defaults() {
        let conn = conn();
        assert_eq!(get_preference(&conn, SELECTED_LOTTERY_TYPE_ID).unwrap(), None);
        assert!(!get_flag(&conn, DISCLAIMER_ACCEPTED).unwrap());
        assert!(get_string_set(&conn, CONFETTI_SHOWN_FOR_TYPES).unwrap().is_empty());
    }

    #[test]
    fn last_write_wins() {
        let conn = conn();
        set_preference(&conn, SELECTED_LOTTERY_TYPE_ID, "powerball").unwrap();
        set_preference(&conn, SELECTED_LOTTERY_TYPE_ID, "pick_3").unwrap();
        assert_eq!(
            get_preference(&conn, SELECTED_LOTTERY_TYPE_ID).unwrap(),
            Some("pick_3".to_string())
        );
        remove_preference(&conn, SELECTED_LOTTERY_TYPE_ID).unwrap();
        assert_eq!(get_preference(&conn, SELECTED_LOTTERY_TYPE_ID).unwrap(), None);
    }

    #[test]
    fn string_set_accumulates() {
        let conn = conn();
        insert_into_string_set(&conn, CONFETTI_SHOWN_FOR_TYPES, "powerball").unwrap();
        insert_into_string_set(&conn, CONFETTI_SHOWN_FOR_TYPES, "pick_3").unwrap();
        insert_into_string_set(&conn, CONFETTI_SHOWN_FOR_TYPES, "powerball").unwrap();
        let set = get_string_set(&conn, CONFETTI_SHOWN_FOR_TYPES).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.contains("pick_3"));
    }

    #[test]
    fn damaged_string_set_starts_over() {
        let conn = conn();
        set_preference(&conn, CONFETTI_SHOWN_FOR_TYPES, "[\"powerball\"").unwrap();
        assert!(get_string_set(&conn, CONFETTI_SHOWN_FOR_TYPES).unwrap().is_empty());

        insert_into_string_set(&conn, CONFETTI_SHOWN_FOR_TYPES, "pick_3").unwrap();

        let set = get_string_set(&conn, CONFETTI_SHOWN_FOR_TYPES).unwrap();
        assert_eq!(set.into_iter().collect::<Vec<_>>(), vec!["pick_3".to_string()]);
    }

    #[test]
    fn flag_round_trips() {
        let conn = conn();
        set_flag(&conn, DISCLAIMER_ACCEPTED, true).unwrap();
        assert!(get_flag(&conn, DISCLAIMER_ACCEPTED).unwrap());
    }
}
