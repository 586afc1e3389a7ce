//! One operation object per application action.
//!
//! This is the only layer that catches errors: every blocking repository call
//! runs on the blocking pool and comes back as an [`Outcome`]. Observed reads
//! hand out [`Feed`]s directly.

use tracing::{error, warn};
use uuid::Uuid;

use crate::api::StubbedLotteryApi;
use crate::database::Database;
use crate::error::{Failure, LottoError, Outcome, Result};
use crate::feed::Feed;
use crate::model::{GeneratedNumbers, LotteryType};
use crate::repository::{
    CustomLotteryTypeRepository, LotteryRepository, UserPreferencesRepository,
};

pub const CUSTOM_ID_PREFIX: &str = "custom_";

async fn run_blocking<T, F>(fallback: &'static str, work: F) -> Outcome<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    match tokio::task::spawn_blocking(work).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => {
            warn!("{}: {}", fallback, e);
            Err(Failure::from_error(&e, fallback))
        }
        Err(e) => {
            error!("{}: {}", fallback, e);
            Err(Failure::unexpected(fallback))
        }
    }
}

#[derive(Clone)]
pub struct GenerateNumbers {
    repository: LotteryRepository,
}

impl GenerateNumbers {
    pub fn new(repository: LotteryRepository) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, lottery_type: LotteryType) -> Outcome<GeneratedNumbers> {
        let repository = self.repository.clone();
        run_blocking("Failed to generate numbers", move || {
            repository.generate_numbers(&lottery_type)
        })
        .await
    }
}

/// Predefined types first, then custom types in creation order.
#[derive(Clone)]
pub struct GetLotteryTypes {
    repository: LotteryRepository,
    custom_repository: CustomLotteryTypeRepository,
}

impl GetLotteryTypes {
    pub fn new(
        repository: LotteryRepository,
        custom_repository: CustomLotteryTypeRepository,
    ) -> Self {
        Self {
            repository,
            custom_repository,
        }
    }

    pub async fn execute(&self) -> Outcome<Vec<LotteryType>> {
        let repository = self.repository.clone();
        let custom_repository = self.custom_repository.clone();
        run_blocking("Failed to get lottery types", move || {
            let mut types = repository.get_lottery_types()?;
            types.extend(custom_repository.observe_custom_lottery_types().current()?);
            Ok(types)
        })
        .await
    }
}

#[derive(Clone)]
pub struct GetHistory {
    repository: LotteryRepository,
}

impl GetHistory {
    pub fn new(repository: LotteryRepository) -> Self {
        Self { repository }
    }

    pub fn all(&self) -> Feed<Vec<GeneratedNumbers>> {
        self.repository.observe_history()
    }

    pub fn by_type(&self, lottery_type_id: &str) -> Feed<Vec<GeneratedNumbers>> {
        self.repository.observe_history_by_type(lottery_type_id)
    }
}

#[derive(Clone)]
pub struct GetHistoryPage {
    repository: LotteryRepository,
}

impl GetHistoryPage {
    pub fn new(repository: LotteryRepository) -> Self {
        Self { repository }
    }

    pub fn observe(&self, limit: u32, offset: u32) -> Feed<Vec<GeneratedNumbers>> {
        self.repository.observe_history_paged(limit, offset)
    }

    /// A page past the end is empty, not an error.
    pub async fn execute(&self, limit: u32, offset: u32) -> Outcome<Vec<GeneratedNumbers>> {
        let feed = self.observe(limit, offset);
        run_blocking("Failed to get history", move || feed.current()).await
    }
}

#[derive(Clone)]
pub struct GetHistoryCount {
    repository: LotteryRepository,
}

impl GetHistoryCount {
    pub fn new(repository: LotteryRepository) -> Self {
        Self { repository }
    }

    pub async fn execute(&self) -> Outcome<u32> {
        let repository = self.repository.clone();
        run_blocking("Failed to count history", move || {
            repository.get_history_count()
        })
        .await
    }
}

#[derive(Clone)]
pub struct GetHistoryDetail {
    repository: LotteryRepository,
}

impl GetHistoryDetail {
    pub fn new(repository: LotteryRepository) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, id: &str) -> Outcome<GeneratedNumbers> {
        let repository = self.repository.clone();
        let id = id.to_string();
        run_blocking("Failed to get history entry", move || {
            repository
                .get_history_by_id(&id)?
                .ok_or_else(|| LottoError::NotFound("Entry not found".to_string()))
        })
        .await
    }
}

#[derive(Clone)]
pub struct DeleteHistory {
    repository: LotteryRepository,
}

impl DeleteHistory {
    pub fn new(repository: LotteryRepository) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, id: &str) -> Outcome<()> {
        let repository = self.repository.clone();
        let id = id.to_string();
        run_blocking("Failed to delete history entry", move || {
            repository.delete_history(&id)
        })
        .await
    }
}

#[derive(Clone)]
pub struct ClearHistory {
    repository: LotteryRepository,
}

impl ClearHistory {
    pub fn new(repository: LotteryRepository) -> Self {
        Self { repository }
    }

    pub async fn execute(&self) -> Outcome<()> {
        let repository = self.repository.clone();
        run_blocking("Failed to clear history", move || {
            repository.clear_all_history()
        })
        .await
    }
}

#[derive(Clone)]
pub struct GetCustomLotteryTypes {
    repository: CustomLotteryTypeRepository,
}

impl GetCustomLotteryTypes {
    pub fn new(repository: CustomLotteryTypeRepository) -> Self {
        Self { repository }
    }

    pub fn execute(&self) -> Feed<Vec<LotteryType>> {
        self.repository.observe_custom_lottery_types()
    }
}

#[derive(Clone)]
pub struct GetCustomLotteryTypesCount {
    repository: CustomLotteryTypeRepository,
}

impl GetCustomLotteryTypesCount {
    pub fn new(repository: CustomLotteryTypeRepository) -> Self {
        Self { repository }
    }

    pub fn execute(&self) -> Feed<u32> {
        self.repository.observe_custom_lottery_types_count()
    }
}

#[derive(Clone)]
pub struct GetCustomLotteryTypeById {
    repository: CustomLotteryTypeRepository,
}

impl GetCustomLotteryTypeById {
    pub fn new(repository: CustomLotteryTypeRepository) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, id: &str) -> Outcome<Option<LotteryType>> {
        let repository = self.repository.clone();
        let id = id.to_string();
        run_blocking("Failed to get custom lottery type", move || {
            repository.get_custom_lottery_type_by_id(&id)
        })
        .await
    }
}

/// Checks a custom format before it is stored. The first violated rule wins.
pub fn validate_custom_lottery_type(lottery_type: &LotteryType) -> Result<()> {
    fn require(ok: bool, message: &str) -> Result<()> {
        if ok {
            Ok(())
        } else {
            Err(LottoError::Validation(message.to_string()))
        }
    }

    require(!lottery_type.name.trim().is_empty(), "Name cannot be blank")?;
    require(
        (1..=10).contains(&lottery_type.main_number_count),
        "Main number count must be between 1 and 10",
    )?;
    require(
        (1..=99).contains(&lottery_type.main_number_max),
        "Main number max must be between 1 and 99",
    )?;
    require(
        lottery_type.main_number_count <= lottery_type.main_number_max,
        "Main number count cannot exceed maximum value",
    )?;
    require(
        lottery_type.bonus_number_count <= 3,
        "Bonus number count must be between 0 and 3",
    )?;

    if lottery_type.bonus_number_count > 0 {
        require(
            (1..=99).contains(&lottery_type.bonus_number_max),
            "Bonus number max must be between 1 and 99",
        )?;
        require(
            lottery_type.bonus_number_count <= lottery_type.bonus_number_max,
            "Bonus number count cannot exceed maximum value",
        )?;
    }

    Ok(())
}

/// Validates, assigns an id to new formats and upserts. Returns what was
/// stored. A given id must carry [`CUSTOM_ID_PREFIX`] or name a custom type
/// that is already stored, so predefined and pick ids stay reserved.
#[derive(Clone)]
pub struct SaveCustomLotteryType {
    repository: CustomLotteryTypeRepository,
}

impl SaveCustomLotteryType {
    pub fn new(repository: CustomLotteryTypeRepository) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, lottery_type: LotteryType) -> Outcome<LotteryType> {
        let repository = self.repository.clone();
        run_blocking("Failed to save custom lottery type", move || {
            validate_custom_lottery_type(&lottery_type)?;

            let mut to_save = lottery_type;
            if to_save.id.trim().is_empty() {
                to_save.id = format!("{}{}", CUSTOM_ID_PREFIX, Uuid::new_v4());
            } else if !to_save.id.starts_with(CUSTOM_ID_PREFIX)
                && !repository.custom_lottery_type_exists(&to_save.id)?
            {
                return Err(LottoError::Validation(format!(
                    "Custom lottery type id must start with {}",
                    CUSTOM_ID_PREFIX
                )));
            }
            to_save.is_custom = true;

            repository.save_custom_lottery_type(&to_save)?;
            Ok(to_save)
        })
        .await
    }
}

#[derive(Clone)]
pub struct DeleteCustomLotteryType {
    repository: CustomLotteryTypeRepository,
}

impl DeleteCustomLotteryType {
    pub fn new(repository: CustomLotteryTypeRepository) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, id: &str) -> Outcome<()> {
        let repository = self.repository.clone();
        let id = id.to_string();
        run_blocking("Failed to delete custom lottery type", move || {
            repository.delete_custom_lottery_type(&id)
        })
        .await
    }
}

#[derive(Clone)]
pub struct GetSelectedLotteryTypeId {
    repository: UserPreferencesRepository,
}

impl GetSelectedLotteryTypeId {
    pub fn new(repository: UserPreferencesRepository) -> Self {
        Self { repository }
    }

    pub fn execute(&self) -> Feed<Option<String>> {
        self.repository.observe_selected_lottery_type_id()
    }
}

#[derive(Clone)]
pub struct SaveSelectedLotteryTypeId {
    repository: UserPreferencesRepository,
}

impl SaveSelectedLotteryTypeId {
    pub fn new(repository: UserPreferencesRepository) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, type_id: &str) -> Outcome<()> {
        let repository = self.repository.clone();
        let type_id = type_id.to_string();
        run_blocking("Failed to save selected lottery type", move || {
            repository.save_selected_lottery_type_id(&type_id)
        })
        .await
    }
}

#[derive(Clone)]
pub struct GetLastGeneratedNumbersId {
    repository: UserPreferencesRepository,
}

impl GetLastGeneratedNumbersId {
    pub fn new(repository: UserPreferencesRepository) -> Self {
        Self { repository }
    }

    pub fn execute(&self) -> Feed<Option<String>> {
        self.repository.observe_last_generated_numbers_id()
    }
}

#[derive(Clone)]
pub struct SaveLastGeneratedNumbersId {
    repository: UserPreferencesRepository,
}

impl SaveLastGeneratedNumbersId {
    pub fn new(repository: UserPreferencesRepository) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, numbers_id: &str) -> Outcome<()> {
        let repository = self.repository.clone();
        let numbers_id = numbers_id.to_string();
        run_blocking("Failed to save last generated numbers", move || {
            repository.save_last_generated_numbers_id(&numbers_id)
        })
        .await
    }
}

#[derive(Clone)]
pub struct ClearLastGeneratedNumbers {
    repository: UserPreferencesRepository,
}

impl ClearLastGeneratedNumbers {
    pub fn new(repository: UserPreferencesRepository) -> Self {
        Self { repository }
    }

    pub async fn execute(&self) -> Outcome<()> {
        let repository = self.repository.clone();
        run_blocking("Failed to clear last generated numbers", move || {
            repository.clear_last_generated_numbers()
        })
        .await
    }
}

#[derive(Clone)]
pub struct CheckConfettiShown {
    repository: UserPreferencesRepository,
}

impl CheckConfettiShown {
    pub fn new(repository: UserPreferencesRepository) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, type_id: &str) -> Outcome<bool> {
        let repository = self.repository.clone();
        let type_id = type_id.to_string();
        run_blocking("Failed to read confetti state", move || {
            repository.has_shown_confetti_for_type(&type_id)
        })
        .await
    }
}

#[derive(Clone)]
pub struct MarkConfettiShown {
    repository: UserPreferencesRepository,
}

impl MarkConfettiShown {
    pub fn new(repository: UserPreferencesRepository) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, type_id: &str) -> Outcome<()> {
        let repository = self.repository.clone();
        let type_id = type_id.to_string();
        run_blocking("Failed to save confetti state", move || {
            repository.mark_confetti_shown_for_type(&type_id)
        })
        .await
    }
}

#[derive(Clone)]
pub struct GetDisclaimerAccepted {
    repository: UserPreferencesRepository,
}

impl GetDisclaimerAccepted {
    pub fn new(repository: UserPreferencesRepository) -> Self {
        Self { repository }
    }

    pub fn execute(&self) -> Feed<bool> {
        self.repository.observe_disclaimer_accepted()
    }
}

#[derive(Clone)]
pub struct AcceptDisclaimer {
    repository: UserPreferencesRepository,
}

impl AcceptDisclaimer {
    pub fn new(repository: UserPreferencesRepository) -> Self {
        Self { repository }
    }

    pub async fn execute(&self) -> Outcome<()> {
        let repository = self.repository.clone();
        run_blocking("Failed to accept disclaimer", move || {
            repository.accept_disclaimer()
        })
        .await
    }
}

/// Every use case, wired against one database.
#[derive(Clone)]
pub struct UseCases {
    pub generate_numbers: GenerateNumbers,
    pub get_lottery_types: GetLotteryTypes,
    pub get_history: GetHistory,
    pub get_history_page: GetHistoryPage,
    pub get_history_count: GetHistoryCount,
    pub get_history_detail: GetHistoryDetail,
    pub delete_history: DeleteHistory,
    pub clear_history: ClearHistory,
    pub get_custom_lottery_types: GetCustomLotteryTypes,
    pub get_custom_lottery_types_count: GetCustomLotteryTypesCount,
    pub get_custom_lottery_type_by_id: GetCustomLotteryTypeById,
    pub save_custom_lottery_type: SaveCustomLotteryType,
    pub delete_custom_lottery_type: DeleteCustomLotteryType,
    pub get_selected_lottery_type_id: GetSelectedLotteryTypeId,
    pub save_selected_lottery_type_id: SaveSelectedLotteryTypeId,
    pub get_last_generated_numbers_id: GetLastGeneratedNumbersId,
    pub save_last_generated_numbers_id: SaveLastGeneratedNumbersId,
    pub clear_last_generated_numbers: ClearLastGeneratedNumbers,
    pub check_confetti_shown: CheckConfettiShown,
    pub mark_confetti_shown: MarkConfettiShown,
    pub get_disclaimer_accepted: GetDisclaimerAccepted,
    pub accept_disclaimer: AcceptDisclaimer,
}

impl UseCases {
    pub fn new(api: StubbedLotteryApi, db: Database) -> Self {
        let lottery = LotteryRepository::new(api, db.clone());
        let custom = CustomLotteryTypeRepository::new(db.clone());
        let prefs = UserPreferencesRepository::new(db);

        Self {
            generate_numbers: GenerateNumbers::new(lottery.clone()),
            get_lottery_types: GetLotteryTypes::new(lottery.clone(), custom.clone()),
            get_history: GetHistory::new(lottery.clone()),
            get_history_page: GetHistoryPage::new(lottery.clone()),
            get_history_count: GetHistoryCount::new(lottery.clone()),
            get_history_detail: GetHistoryDetail::new(lottery.clone()),
            delete_history: DeleteHistory::new(lottery.clone()),
            clear_history: ClearHistory::new(lottery),
            get_custom_lottery_types: GetCustomLotteryTypes::new(custom.clone()),
            get_custom_lottery_types_count: GetCustomLotteryTypesCount::new(custom.clone()),
            get_custom_lottery_type_by_id: GetCustomLotteryTypeById::new(custom.clone()),
            save_custom_lottery_type: SaveCustomLotteryType::new(custom.clone()),
            delete_custom_lottery_type: DeleteCustomLotteryType::new(custom),
            get_selected_lottery_type_id: GetSelectedLotteryTypeId::new(prefs.clone()),
            save_selected_lottery_type_id: SaveSelectedLotteryTypeId::new(prefs.clone()),
            get_last_generated_numbers_id: GetLastGeneratedNumbersId::new(prefs.clone()),
            save_last_generated_numbers_id: SaveLastGeneratedNumbersId::new(prefs.clone()),
            clear_last_generated_numbers: ClearLastGeneratedNumbers::new(prefs.clone()),
            check_confetti_shown: CheckConfettiShown::new(prefs.clone()),
            mark_confetti_shown: MarkConfettiShown::new(prefs.clone()),
            get_disclaimer_accepted: GetDisclaimerAccepted::new(prefs.clone()),
            accept_disclaimer: AcceptDisclaimer::new(prefs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use crate::model::LotteryTypes;
    use std::time::Duration;

    fn use_cases() -> UseCases {
        UseCases::new(
            StubbedLotteryApi::new(Duration::ZERO),
            Database::in_memory().unwrap(),
        )
    }

    fn custom(main_count: u32, main_max: u32, bonus_count: u32, bonus_max: u32) -> LotteryType {
        LotteryType {
            id: String::new(),
            name: "weekend_draw".to_string(),
            display_name: "Weekend Draw".to_string(),
            main_number_count: main_count,
            main_number_max: main_max,
            bonus_number_count: bonus_count,
            bonus_number_max: bonus_max,
            is_custom: false,
        }
    }

    fn validation_message(lottery_type: &LotteryType) -> Option<String> {
        match validate_custom_lottery_type(lottery_type) {
            Ok(()) => None,
            Err(LottoError::Validation(message)) => Some(message),
            Err(other) => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn validation_rules() {
        assert_eq!(validation_message(&custom(5, 50, 0, 0)), None);
        assert_eq!(validation_message(&custom(3, 3, 3, 3)), None);

        let mut blank = custom(5, 50, 0, 0);
        blank.name = "   ".to_string();
        let cases = [
            (blank, "Name cannot be blank"),
            (custom(0, 50, 0, 0), "Main number count must be between 1 and 10"),
            (custom(11, 50, 0, 0), "Main number count must be between 1 and 10"),
            (custom(5, 100, 0, 0), "Main number max must be between 1 and 99"),
            (custom(6, 5, 0, 0), "Main number count cannot exceed maximum value"),
            (custom(5, 50, 4, 10), "Bonus number count must be between 0 and 3"),
            (custom(5, 50, 1, 0), "Bonus number max must be between 1 and 99"),
            (custom(5, 50, 3, 2), "Bonus number count cannot exceed maximum value"),
        ];
        for (lottery_type, expected) in cases {
            assert_eq!(validation_message(&lottery_type).as_deref(), Some(expected));
        }
    }

    #[test]
    fn bonus_max_is_ignored_without_bonus_numbers() {
        assert_eq!(validation_message(&custom(5, 50, 0, 500)), None);
    }

    #[tokio::test]
    async fn rejected_format_is_not_stored() {
        let use_cases = use_cases();

        let failure = use_cases
            .save_custom_lottery_type
            .execute(custom(12, 50, 0, 0))
            .await
            .unwrap_err();

        assert_eq!(failure.kind, FailureKind::Validation);
        assert_eq!(failure.message, "Main number count must be between 1 and 10");
        let count = use_cases.get_custom_lottery_types_count.execute().current().unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn new_formats_get_a_custom_id() {
        let use_cases = use_cases();

        let saved = use_cases
            .save_custom_lottery_type
            .execute(custom(6, 40, 1, 10))
            .await
            .unwrap();

        assert!(saved.id.starts_with(CUSTOM_ID_PREFIX));
        assert!(saved.is_custom);
        let loaded = use_cases
            .get_custom_lottery_type_by_id
            .execute(&saved.id)
            .await
            .unwrap();
        assert_eq!(loaded, Some(saved));
    }

    #[tokio::test]
    async fn reserved_ids_are_refused() {
        let use_cases = use_cases();

        for id in ["powerball", "pick_mine"] {
            let mut lottery_type = custom(10, 10, 0, 0);
            lottery_type.id = id.to_string();

            let failure = use_cases
                .save_custom_lottery_type
                .execute(lottery_type)
                .await
                .unwrap_err();

            assert_eq!(failure.kind, FailureKind::Validation);
            assert_eq!(failure.message, "Custom lottery type id must start with custom_");
        }

        let types = use_cases.get_lottery_types.execute().await.unwrap();
        assert_eq!(types, LotteryTypes::all());
    }

    #[tokio::test]
    async fn prefixed_id_draws_like_a_custom_format() {
        let use_cases = use_cases();
        let mut lottery_type = custom(10, 10, 0, 0);
        lottery_type.id = "custom_office".to_string();

        let saved = use_cases
            .save_custom_lottery_type
            .execute(lottery_type)
            .await
            .unwrap();
        let numbers = use_cases.generate_numbers.execute(saved).await.unwrap();

        assert_eq!(numbers.main_numbers, (1..=10).collect::<Vec<u32>>());
        assert_eq!(numbers.lottery_type.id, "custom_office");
    }

    #[tokio::test]
    async fn custom_types_follow_predefined_ones() {
        let use_cases = use_cases();
        let saved = use_cases
            .save_custom_lottery_type
            .execute(custom(6, 40, 0, 0))
            .await
            .unwrap();

        let types = use_cases.get_lottery_types.execute().await.unwrap();

        assert_eq!(types.len(), LotteryTypes::all().len() + 1);
        assert_eq!(types[0], LotteryTypes::powerball());
        assert_eq!(types.last(), Some(&saved));
    }

    #[tokio::test]
    async fn missing_entry_is_not_found() {
        let use_cases = use_cases();
        let failure = use_cases
            .get_history_detail
            .execute("missing")
            .await
            .unwrap_err();
        assert_eq!(failure, Failure::not_found("Entry not found"));
    }

    #[tokio::test]
    async fn deleting_unknown_entry_is_ok() {
        let use_cases = use_cases();
        use_cases
            .generate_numbers
            .execute(LotteryTypes::powerball())
            .await
            .unwrap();

        use_cases.delete_history.execute("nope").await.unwrap();

        assert_eq!(use_cases.get_history_count.execute().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn page_past_the_end_is_empty() {
        let use_cases = use_cases();
        for _ in 0..3 {
            use_cases
                .generate_numbers
                .execute(LotteryTypes::pick_4())
                .await
                .unwrap();
        }

        let page = use_cases.get_history_page.execute(10, 50).await.unwrap();
        assert!(page.is_empty());
        let page = use_cases.get_history_page.execute(2, 0).await.unwrap();
        assert_eq!(page.len(), 2);
    }

    #[tokio::test]
    async fn impossible_format_reports_the_fallback() {
        let use_cases = use_cases();
        let mut broken = LotteryTypes::lotto_6_49();
        broken.main_number_max = 3;

        let failure = use_cases
            .generate_numbers
            .execute(broken)
            .await
            .unwrap_err();

        assert_eq!(failure, Failure::unexpected("Failed to generate numbers"));
        assert_eq!(use_cases.get_history_count.execute().await.unwrap(), 0);
    }
}
