//! Repositories turn store rows into domain values. Every method blocks on
//! SQLite (and the generator on its simulated latency), so callers run them
//! on the blocking pool; the `observe_*` methods return [`Feed`]s instead.

use chrono::Utc;
use tracing::info;

use crate::api::StubbedLotteryApi;
use crate::custom_types;
use crate::database::{Database, Table};
use crate::error::Result;
use crate::feed::Feed;
use crate::history;
use crate::mapper;
use crate::model::{GeneratedNumbers, LotteryType};
use crate::preferences::{self, CONFETTI_SHOWN_FOR_TYPES, DISCLAIMER_ACCEPTED};
use crate::preferences::{LAST_GENERATED_NUMBERS_ID, SELECTED_LOTTERY_TYPE_ID};
use crate::types::HistoryEntryEntity;

fn to_domain_list(entities: Vec<HistoryEntryEntity>) -> Vec<GeneratedNumbers> {
    entities
        .iter()
        .map(mapper::history_entity_to_domain)
        .collect()
}

#[derive(Clone)]
pub struct LotteryRepository {
    api: StubbedLotteryApi,
    db: Database,
}

impl LotteryRepository {
    pub fn new(api: StubbedLotteryApi, db: Database) -> Self {
        Self { api, db }
    }

    /// Draws numbers and records them in history before returning.
    pub fn generate_numbers(&self, lottery_type: &LotteryType) -> Result<GeneratedNumbers> {
        let generated = self.api.generate_numbers(&mapper::to_dto(lottery_type))?;

        let entity = mapper::to_history_entity(&generated);
        self.db
            .write(Table::History, |conn| history::insert_history(conn, &entity))?;

        Ok(mapper::generated_to_domain(generated))
    }

    pub fn get_lottery_types(&self) -> Result<Vec<LotteryType>> {
        Ok(self
            .api
            .get_lottery_types()?
            .iter()
            .map(mapper::to_domain)
            .collect())
    }

    pub fn observe_history(&self) -> Feed<Vec<GeneratedNumbers>> {
        Feed::new(self.db.clone(), Table::History, |conn| {
            history::get_all_history(conn).map(to_domain_list)
        })
    }

    pub fn observe_history_by_type(&self, lottery_type_id: &str) -> Feed<Vec<GeneratedNumbers>> {
        let lottery_type_id = lottery_type_id.to_string();
        Feed::new(self.db.clone(), Table::History, move |conn| {
            history::get_history_by_type(conn, &lottery_type_id).map(to_domain_list)
        })
    }

    pub fn observe_history_paged(&self, limit: u32, offset: u32) -> Feed<Vec<GeneratedNumbers>> {
        Feed::new(self.db.clone(), Table::History, move |conn| {
            history::get_history_paged(conn, limit, offset).map(to_domain_list)
        })
    }

    pub fn get_history_by_id(&self, id: &str) -> Result<Option<GeneratedNumbers>> {
        Ok(self
            .db
            .with_conn(|conn| history::get_history_by_id(conn, id))?
            .as_ref()
            .map(mapper::history_entity_to_domain))
    }

    pub fn delete_history(&self, id: &str) -> Result<()> {
        self.db
            .write(Table::History, |conn| history::delete_history_by_id(conn, id))?;
        Ok(())
    }

    pub fn clear_all_history(&self) -> Result<()> {
        let removed = self
            .db
            .write(Table::History, history::clear_all_history)?;
        info!("cleared {} history entries", removed);
        Ok(())
    }

    pub fn get_history_count(&self) -> Result<u32> {
        self.db.with_conn(history::get_history_count)
    }
}

#[derive(Clone)]
pub struct CustomLotteryTypeRepository {
    db: Database,
}

impl CustomLotteryTypeRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn observe_custom_lottery_types(&self) -> Feed<Vec<LotteryType>> {
        Feed::new(self.db.clone(), Table::CustomTypes, |conn| {
            Ok(custom_types::get_all_custom_types(conn)?
                .iter()
                .map(mapper::custom_entity_to_domain)
                .collect())
        })
    }

    pub fn observe_custom_lottery_types_count(&self) -> Feed<u32> {
        Feed::new(
            self.db.clone(),
            Table::CustomTypes,
            custom_types::get_custom_types_count,
        )
    }

    pub fn get_custom_lottery_type_by_id(&self, id: &str) -> Result<Option<LotteryType>> {
        Ok(self
            .db
            .with_conn(|conn| custom_types::get_custom_type_by_id(conn, id))?
            .as_ref()
            .map(mapper::custom_entity_to_domain))
    }

    /// Inserts or replaces by id. An update keeps the original creation time
    /// and always moves `updated_at` forward.
    pub fn save_custom_lottery_type(&self, lottery_type: &LotteryType) -> Result<()> {
        let now = Utc::now().timestamp_millis();
        self.db.write(Table::CustomTypes, |conn| {
            let tx = conn.unchecked_transaction()?;
            let existing = custom_types::get_custom_type_by_id(&tx, &lottery_type.id)?;
            let (created_at, updated_at) = match existing {
                Some(existing) => (existing.created_at, now.max(existing.updated_at + 1)),
                None => (now, now),
            };
            let entity = mapper::to_custom_entity(lottery_type, created_at, updated_at);
            custom_types::upsert_custom_type(&tx, &entity)?;
            tx.commit()?;
            Ok(())
        })
    }

    pub fn delete_custom_lottery_type(&self, id: &str) -> Result<()> {
        self.db.write(Table::CustomTypes, |conn| {
            custom_types::delete_custom_type_by_id(conn, id)
        })?;
        Ok(())
    }

    pub fn custom_lottery_type_exists(&self, id: &str) -> Result<bool> {
        self.db
            .with_conn(|conn| custom_types::custom_type_exists(conn, id))
    }
}

#[derive(Clone)]
pub struct UserPreferencesRepository {
    db: Database,
}

impl UserPreferencesRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn observe_disclaimer_accepted(&self) -> Feed<bool> {
        Feed::new(self.db.clone(), Table::Preferences, |conn| {
            preferences::get_flag(conn, DISCLAIMER_ACCEPTED)
        })
    }

    pub fn accept_disclaimer(&self) -> Result<()> {
        self.db.write(Table::Preferences, |conn| {
            preferences::set_flag(conn, DISCLAIMER_ACCEPTED, true)
        })
    }

    pub fn observe_selected_lottery_type_id(&self) -> Feed<Option<String>> {
        Feed::new(self.db.clone(), Table::Preferences, |conn| {
            preferences::get_preference(conn, SELECTED_LOTTERY_TYPE_ID)
        })
    }

    pub fn save_selected_lottery_type_id(&self, type_id: &str) -> Result<()> {
        self.db.write(Table::Preferences, |conn| {
            preferences::set_preference(conn, SELECTED_LOTTERY_TYPE_ID, type_id)
        })
    }

    pub fn observe_last_generated_numbers_id(&self) -> Feed<Option<String>> {
        Feed::new(self.db.clone(), Table::Preferences, |conn| {
            preferences::get_preference(conn, LAST_GENERATED_NUMBERS_ID)
        })
    }

    pub fn save_last_generated_numbers_id(&self, numbers_id: &str) -> Result<()> {
        self.db.write(Table::Preferences, |conn| {
            preferences::set_preference(conn, LAST_GENERATED_NUMBERS_ID, numbers_id)
        })
    }

    pub fn clear_last_generated_numbers(&self) -> Result<()> {
        self.db.write(Table::Preferences, |conn| {
            preferences::remove_preference(conn, LAST_GENERATED_NUMBERS_ID)
        })
    }

    pub fn has_shown_confetti_for_type(&self, type_id: &str) -> Result<bool> {
        Ok(self
            .db
            .with_conn(|conn| preferences::get_string_set(conn, CONFETTI_SHOWN_FOR_TYPES))?
            .contains(type_id))
    }

    pub fn mark_confetti_shown_for_type(&self, type_id: &str) -> Result<()> {
        self.db.write(Table::Preferences, |conn| {
            preferences::insert_into_string_set(conn, CONFETTI_SHOWN_FOR_TYPES, type_id)
        })
    }
}
