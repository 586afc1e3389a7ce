use std::ops::Deref;

use super::ViewModel;
use crate::model::GeneratedNumbers;
use crate::use_cases::UseCases;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryDetailState {
    pub entry: Option<GeneratedNumbers>,
    pub is_loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub enum HistoryDetailIntent {
    LoadEntry(String),
    DeleteEntry,
    NavigateBack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastMessage {
    EntryDeleted,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HistoryDetailEffect {
    NavigateBack,
    /// Show the toast, then leave the screen.
    DeleteSuccessAndNavigateBack(ToastMessage),
}

pub struct HistoryDetailViewModel {
    view_model: ViewModel<HistoryDetailState, HistoryDetailEffect>,
    use_cases: UseCases,
}

impl Deref for HistoryDetailViewModel {
    type Target = ViewModel<HistoryDetailState, HistoryDetailEffect>;

    fn deref(&self) -> &Self::Target {
        &self.view_model
    }
}

impl HistoryDetailViewModel {
    pub fn new(use_cases: UseCases) -> Self {
        Self {
            view_model: ViewModel::new(HistoryDetailState::default()),
            use_cases,
        }
    }

    pub async fn process(&self, intent: HistoryDetailIntent) {
        match intent {
            HistoryDetailIntent::LoadEntry(entry_id) => self.load_entry(&entry_id).await,
            HistoryDetailIntent::DeleteEntry => self.delete_entry().await,
            HistoryDetailIntent::NavigateBack => {
                self.send_effect(HistoryDetailEffect::NavigateBack)
            }
        }
    }

    async fn load_entry(&self, entry_id: &str) {
        self.set_state(|s| s.is_loading = true);

        match self.use_cases.get_history_detail.execute(entry_id).await {
            Ok(entry) => self.set_state(|s| {
                s.entry = Some(entry);
                s.is_loading = false;
                s.error = None;
            }),
            Err(failure) => self.set_state(|s| {
                s.is_loading = false;
                s.error = Some(failure.message);
            }),
        }
    }

    async fn delete_entry(&self) {
        let Some(entry) = self.state().entry else {
            return;
        };

        match self.use_cases.delete_history.execute(&entry.id).await {
            Ok(()) => self.send_effect(HistoryDetailEffect::DeleteSuccessAndNavigateBack(
                ToastMessage::EntryDeleted,
            )),
            Err(failure) => self.set_state(|s| s.error = Some(failure.message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LotteryTypes;
    use crate::presentation::testing;

    #[tokio::test]
    async fn loads_an_entry() {
        let use_cases = testing::use_cases();
        let generated = use_cases
            .generate_numbers
            .execute(LotteryTypes::mega_millions())
            .await
            .unwrap();
        let view_model = HistoryDetailViewModel::new(use_cases);

        view_model
            .process(HistoryDetailIntent::LoadEntry(generated.id.clone()))
            .await;

        let state = view_model.state();
        assert!(!state.is_loading);
        assert_eq!(state.entry, Some(generated));
        assert_eq!(state.error, None);
    }

    #[tokio::test]
    async fn missing_entry_shows_not_found() {
        let view_model = HistoryDetailViewModel::new(testing::use_cases());

        view_model
            .process(HistoryDetailIntent::LoadEntry("gone".to_string()))
            .await;

        let state = view_model.state();
        assert_eq!(state.entry, None);
        assert_eq!(state.error.as_deref(), Some("Entry not found"));
    }

    #[tokio::test]
    async fn delete_removes_and_navigates_back() {
        let use_cases = testing::use_cases();
        let generated = use_cases
            .generate_numbers
            .execute(LotteryTypes::pick_4())
            .await
            .unwrap();
        let view_model = HistoryDetailViewModel::new(use_cases.clone());
        view_model
            .process(HistoryDetailIntent::LoadEntry(generated.id))
            .await;

        view_model.process(HistoryDetailIntent::DeleteEntry).await;

        assert_eq!(
            view_model.try_next_effect(),
            Some(HistoryDetailEffect::DeleteSuccessAndNavigateBack(
                ToastMessage::EntryDeleted
            ))
        );
        assert_eq!(use_cases.get_history_count.execute().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn delete_without_an_entry_does_nothing() {
        let view_model = HistoryDetailViewModel::new(testing::use_cases());
        view_model.process(HistoryDetailIntent::DeleteEntry).await;
        assert_eq!(view_model.try_next_effect(), None);
    }
}
