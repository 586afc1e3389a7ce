use rusqlite::{Connection, params};
use std::time::Duration;
use tempfile::tempdir;

use lotto_lib::api::StubbedLotteryApi;
use lotto_lib::connection::open_database;
use lotto_lib::database::{SCHEMA_VERSION, user_version};
use lotto_lib::{LotteryTypes, UseCases};

fn use_cases_at(path: &str) -> UseCases {
    let db = open_database(path).unwrap();
    UseCases::new(StubbedLotteryApi::new(Duration::ZERO), db)
}

#[tokio::test]
async fn history_and_preferences_survive_a_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("lotto.db");
    let path = path.to_str().unwrap();

    let generated = {
        let use_cases = use_cases_at(path);
        let numbers = use_cases
            .generate_numbers
            .execute(LotteryTypes::mega_millions())
            .await
            .unwrap();
        use_cases
            .save_selected_lottery_type_id
            .execute("mega_millions")
            .await
            .unwrap();
        use_cases.accept_disclaimer.execute().await.unwrap();
        use_cases
            .mark_confetti_shown
            .execute("mega_millions")
            .await
            .unwrap();
        numbers
    };

    let use_cases = use_cases_at(path);
    let stored = use_cases
        .get_history_detail
        .execute(&generated.id)
        .await
        .unwrap();
    assert_eq!(stored, generated);
    assert_eq!(
        use_cases
            .get_selected_lottery_type_id
            .execute()
            .first()
            .await
            .unwrap()
            .as_deref(),
        Some("mega_millions")
    );
    assert!(use_cases.get_disclaimer_accepted.execute().first().await.unwrap());
    assert!(
        use_cases
            .check_confetti_shown
            .execute("mega_millions")
            .await
            .unwrap()
    );
    assert!(!use_cases.check_confetti_shown.execute("powerball").await.unwrap());
}

#[tokio::test]
async fn version_one_history_is_backfilled() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("lotto.db");

    {
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE history_entries (
                id TEXT NOT NULL PRIMARY KEY,
                lotteryTypeId TEXT NOT NULL,
                lotteryTypeName TEXT NOT NULL,
                mainNumbers TEXT NOT NULL,
                bonusNumbers TEXT NOT NULL,
                timestamp INTEGER NOT NULL
            );
            CREATE TABLE preferences (
                key TEXT NOT NULL PRIMARY KEY,
                value TEXT NOT NULL
            );
            PRAGMA user_version = 1;",
        )
        .unwrap();
        conn.execute(
            "INSERT INTO history_entries VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params!["old", "powerball", "Powerball", "3,14,15,26,59", "7", 1_600_000_000_000i64],
        )
        .unwrap();
    }

    let path = path.to_str().unwrap();
    let db = open_database(path).unwrap();
    let version = db.with_conn(user_version).unwrap();
    assert_eq!(version, SCHEMA_VERSION);

    let use_cases = UseCases::new(StubbedLotteryApi::new(Duration::ZERO), db);
    let entry = use_cases.get_history_detail.execute("old").await.unwrap();
    assert_eq!(entry.lottery_type, LotteryTypes::powerball());
    assert_eq!(entry.main_numbers, vec![3, 14, 15, 26, 59]);
    assert_eq!(entry.bonus_numbers, vec![7]);
    assert_eq!(entry.timestamp, 1_600_000_000_000);

    let custom = use_cases.get_custom_lottery_types.execute().first().await.unwrap();
    assert!(custom.is_empty());
}
