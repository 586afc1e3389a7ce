use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::error::Result;
use crate::types::HistoryEntryEntity;

const HISTORY_COLUMNS: &str = "id, lotteryTypeId, lotteryTypeName, lotteryTypeMainNumberCount,
     lotteryTypeMainNumberMax, lotteryTypeBonusNumberCount, lotteryTypeBonusNumberMax,
     isCustomLotteryType, mainNumbers, bonusNumbers, timestamp";

fn history_row(row: &Row<'_>) -> rusqlite::Result<HistoryEntryEntity> {
    Ok(HistoryEntryEntity {
        id: row.get(0)?,
        lottery_type_id: row.get(1)?,
        lottery_type_name: row.get(2)?,
        lottery_type_main_number_count: row.get(3)?,
        lottery_type_main_number_max: row.get(4)?,
        lottery_type_bonus_number_count: row.get(5)?,
        lottery_type_bonus_number_max: row.get(6)?,
        is_custom_lottery_type: row.get(7)?,
        main_numbers: row.get(8)?,
        bonus_numbers: row.get(9)?,
        timestamp: row.get(10)?,
    })
}

pub fn insert_history(conn: &Connection, entry: &HistoryEntryEntity) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO history_entries (
            id, lotteryTypeId, lotteryTypeName, lotteryTypeMainNumberCount,
            lotteryTypeMainNumberMax, lotteryTypeBonusNumberCount, lotteryTypeBonusNumberMax,
            isCustomLotteryType, mainNumbers, bonusNumbers, timestamp
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            entry.id,
            entry.lottery_type_id,
            entry.lottery_type_name,
            entry.lottery_type_main_number_count,
            entry.lottery_type_main_number_max,
            entry.lottery_type_bonus_number_count,
            entry.lottery_type_bonus_number_max,
            entry.is_custom_lottery_type,
            entry.main_numbers,
            entry.bonus_numbers,
            entry.timestamp,
        ],
    )?;
    Ok(())
}

pub fn get_all_history(conn: &Connection) -> Result<Vec<HistoryEntryEntity>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM history_entries ORDER BY timestamp DESC, rowid DESC",
        HISTORY_COLUMNS
    ))?;
    let history_iter = stmt.query_map([], history_row)?;

    let mut results = Vec::new();
    for entry in history_iter {
        results.push(entry?);
    }
    Ok(results)
}

pub fn get_history_by_type(
    conn: &Connection,
    lottery_type_id: &str,
) -> Result<Vec<HistoryEntryEntity>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM history_entries
         WHERE lotteryTypeId = ?1
         ORDER BY timestamp DESC, rowid DESC",
        HISTORY_COLUMNS
    ))?;
    let history_iter = stmt.query_map([lottery_type_id], history_row)?;

    let mut results = Vec::new();
    for entry in history_iter {
        results.push(entry?);
    }
    Ok(results)
}

pub fn get_history_paged(
    conn: &Connection,
    limit: u32,
    offset: u32,
) -> Result<Vec<HistoryEntryEntity>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM history_entries
         ORDER BY timestamp DESC, rowid DESC
         LIMIT ?1 OFFSET ?2",
        HISTORY_COLUMNS
    ))?;
    let history_iter = stmt.query_map([limit, offset], history_row)?;

    let mut results = Vec::new();
    for entry in history_iter {
        results.push(entry?);
    }
    Ok(results)
}

pub fn get_history_by_id(conn: &Connection, id: &str) -> Result<Option<HistoryEntryEntity>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM history_entries WHERE id = ?1",
        HISTORY_COLUMNS
    ))?;
    Ok(stmt.query_row([id], history_row).optional()?)
}

/// Returns the number of rows removed; an unknown id removes nothing.
pub fn delete_history_by_id(conn: &Connection, id: &str) -> Result<usize> {
    Ok(conn.execute("DELETE FROM history_entries WHERE id = ?1", [id])?)
}

pub fn clear_all_history(conn: &Connection) -> Result<usize> {
    Ok(conn.execute("DELETE FROM history_entries", [])?)
}

pub fn get_history_count(conn: &Connection) -> Result<u32> {
    Ok(conn.query_row("SELECT COUNT(*) FROM history_entries", [], |row| row.get(0))?)
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

    fn entry(id: &str, lottery_type_id: &str, timestamp: i64) -> HistoryEntryEntity {
        HistoryEntryEntity {
            id: id.to_string(),
            lottery_type_id: lottery_type_id.to_string(),
            lottery_type_name: lottery_type_id.to_string(),
            lottery_type_main_number_count: 5,
            lottery_type_main_number_max: 69,
            lottery_type_bonus_number_count: 1,
            lottery_type_bonus_number_max: 26,
            is_custom_lottery_type: false,
            main_numbers: "1,2,3,4,5".to_string(),
            bonus_numbers: "6".to_string(),
            timestamp,
        }
    }

    fn ids(entries: &[HistoryEntryEntity]) -> Vec<&str> {
        entries.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn lists_newest_first() {
        let conn = conn();
        insert_history(&conn, &entry("a", "powerball", 100)).unwrap();
        insert_history(&conn, &entry("b", "powerball", 300)).unwrap();
        insert_history(&conn, &entry("c", "pick_3", 200)).unwrap();

        assert_eq!(ids(&get_all_history(&conn).unwrap()), vec!["b", "c", "a"]);
        assert_eq!(
            ids(&get_history_by_type(&conn, "powerball").unwrap()),
            vec!["b", "a"]
        );
        assert_eq!(get_history_count(&conn).unwrap(), 3);
    }

    #[test]
    fn reads_back_the_row() {
        let conn = conn();
        let row = entry("a", "powerball", 100);
        insert_history(&conn, &row).unwrap();
        assert_eq!(get_history_by_id(&conn, "a").unwrap(), Some(row));
        assert_eq!(get_history_by_id(&conn, "missing").unwrap(), None);
    }

    #[test]
    fn deleting_unknown_id_changes_nothing() {
        let conn = conn();
        insert_history(&conn, &entry("a", "powerball", 100)).unwrap();
        assert_eq!(delete_history_by_id(&conn, "nope").unwrap(), 0);
        assert_eq!(get_history_count(&conn).unwrap(), 1);
        assert_eq!(delete_history_by_id(&conn, "a").unwrap(), 1);
        assert_eq!(get_history_count(&conn).unwrap(), 0);
    }

    #[test]
    fn pages_past_the_end_are_empty() {
        let conn = conn();
        for i in 0..5 {
            insert_history(&conn, &entry(&format!("e{}", i), "powerball", i)).unwrap();
        }
        assert_eq!(ids(&get_history_paged(&conn, 2, 0).unwrap()), vec!["e4", "e3"]);
        assert_eq!(ids(&get_history_paged(&conn, 2, 4).unwrap()), vec!["e0"]);
        assert!(get_history_paged(&conn, 10, 50).unwrap().is_empty());
    }

    #[test]
    fn clear_removes_everything() {
        let conn = conn();
        insert_history(&conn, &entry("a", "powerball", 1)).unwrap();
        insert_history(&conn, &entry("b", "pick_4", 2)).unwrap();
        assert_eq!(clear_all_history(&conn).unwrap(), 2);
        assert!(get_all_history(&conn).unwrap().is_empty());
    }
}
