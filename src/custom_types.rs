use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::error::Result;
use crate::types::CustomLotteryTypeEntity;

const CUSTOM_TYPE_COLUMNS: &str = "id, name, displayName, mainNumberCount, mainNumberMax,
     bonusNumberCount, bonusNumberMax, createdAt, updatedAt";

fn custom_type_row(row: &Row<'_>) -> rusqlite::Result<CustomLotteryTypeEntity> {
    Ok(CustomLotteryTypeEntity {
        id: row.get(0)?,
        name: row.get(1)?,
        display_name: row.get(2)?,
        main_number_count: row.get(3)?,
        main_number_max: row.get(4)?,
        bonus_number_count: row.get(5)?,
        bonus_number_max: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

/// All custom types in the order they were created.
pub fn get_all_custom_types(conn: &Connection) -> Result<Vec<CustomLotteryTypeEntity>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM custom_lottery_types ORDER BY createdAt ASC, rowid ASC",
        CUSTOM_TYPE_COLUMNS
    ))?;
    let type_iter = stmt.query_map([], custom_type_row)?;

    let mut results = Vec::new();
    for custom_type in type_iter {
        results.push(custom_type?);
    }
    Ok(results)
}

pub fn get_custom_type_by_id(
    conn: &Connection,
    id: &str,
) -> Result<Option<CustomLotteryTypeEntity>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM custom_lottery_types WHERE id = ?1",
        CUSTOM_TYPE_COLUMNS
    ))?;
    Ok(stmt.query_row([id], custom_type_row).optional()?)
}

pub fn upsert_custom_type(conn: &Connection, entity: &CustomLotteryTypeEntity) -> Result<()> {
    conn.execute(
        "INSERT INTO custom_lottery_types (
            id, name, displayName, mainNumberCount, mainNumberMax,
            bonusNumberCount, bonusNumberMax, createdAt, updatedAt
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            displayName = excluded.displayName,
            mainNumberCount = excluded.mainNumberCount,
            mainNumberMax = excluded.mainNumberMax,
            bonusNumberCount = excluded.bonusNumberCount,
            bonusNumberMax = excluded.bonusNumberMax,
            createdAt = excluded.createdAt,
            updatedAt = excluded.updatedAt",
        params![
            entity.id,
            entity.name,
            entity.display_name,
            entity.main_number_count,
            entity.main_number_max,
            entity.bonus_number_count,
            entity.bonus_number_max,
            entity.created_at,
            entity.updated_at,
        ],
    )?;
    Ok(())
}

pub fn delete_custom_type_by_id(conn: &Connection, id: &str) -> Result<usize> {
    Ok(conn.execute("DELETE FROM custom_lottery_types WHERE id = ?1", [id])?)
}

pub fn custom_type_exists(conn: &Connection, id: &str) -> Result<bool> {
    Ok(conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM custom_lottery_types WHERE id = ?1)",
        [id],
        |row| row.get(0),
    )?)
}

pub fn get_custom_types_count(conn: &Connection) -> Result<u32> {
    Ok(conn.query_row("SELECT COUNT(*) FROM custom_lottery_types", [], |row| {
        row.get(0)
    })?)
}
