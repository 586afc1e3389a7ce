use std::ops::Deref;

use super::{Subscription, ViewModel, observe};
use crate::error::Failure;
use crate::model::{GeneratedNumbers, LotteryType};
use crate::use_cases::UseCases;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryListState {
    pub history_entries: Vec<GeneratedNumbers>,
    pub is_loading: bool,
    pub is_empty: bool,
    pub selected_filter: Option<LotteryType>,
    pub available_filters: Vec<LotteryType>,
    pub show_clear_confirm_dialog: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub enum HistoryListIntent {
    LoadHistory,
    /// `None` shows every type.
    FilterByType(Option<LotteryType>),
    DeleteEntry(String),
    ShowClearAllDialog,
    DismissClearAllDialog,
    ConfirmClearAll,
    ViewDetail(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastMessage {
    EntryDeleted,
    HistoryCleared,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HistoryListEffect {
    NavigateToDetail(String),
    ShowToast(ToastMessage),
}

pub struct HistoryListViewModel {
    view_model: ViewModel<HistoryListState, HistoryListEffect>,
    use_cases: UseCases,
    history: Subscription,
}

impl Deref for HistoryListViewModel {
    type Target = ViewModel<HistoryListState, HistoryListEffect>;

    fn deref(&self) -> &Self::Target {
        &self.view_model
    }
}

impl HistoryListViewModel {
    pub fn new(use_cases: UseCases) -> Self {
        Self {
            view_model: ViewModel::new(HistoryListState::default()),
            use_cases,
            history: Subscription::default(),
        }
    }

    pub async fn process(&self, intent: HistoryListIntent) {
        match intent {
            HistoryListIntent::LoadHistory => {
                self.load_available_filters().await;
                self.observe_history();
            }
            HistoryListIntent::FilterByType(filter) => {
                self.set_state(|s| s.selected_filter = filter);
                self.observe_history();
            }
            HistoryListIntent::DeleteEntry(entry_id) => self.delete_entry(&entry_id).await,
            HistoryListIntent::ShowClearAllDialog => {
                self.set_state(|s| s.show_clear_confirm_dialog = true)
            }
            HistoryListIntent::DismissClearAllDialog => {
                self.set_state(|s| s.show_clear_confirm_dialog = false)
            }
            HistoryListIntent::ConfirmClearAll => self.confirm_clear_all().await,
            HistoryListIntent::ViewDetail(entry_id) => {
                self.send_effect(HistoryListEffect::NavigateToDetail(entry_id))
            }
        }
    }

    async fn load_available_filters(&self) {
        match self.use_cases.get_lottery_types.execute().await {
            Ok(types) => self.set_state(|s| {
                // A filter whose type no longer exists falls back to "all".
                s.selected_filter = s
                    .selected_filter
                    .take()
                    .and_then(|current| types.iter().find(|t| t.id == current.id).cloned());
                s.available_filters = types;
            }),
            Err(failure) => self.set_state(|s| s.error = Some(failure.message)),
        }
    }

    /// Starts a new history subscription for the current filter, cancelling
    /// the previous one.
    fn observe_history(&self) {
        self.set_state(|s| s.is_loading = true);

        let feed = match self.state().selected_filter {
            Some(filter) => self.use_cases.get_history.by_type(&filter.id),
            None => self.use_cases.get_history.all(),
        };

        let view_model = self.view_model.clone();
        self.history.replace(observe(feed, move |snapshot| match snapshot {
            Ok(entries) => view_model.set_state(|s| {
                s.is_empty = entries.is_empty();
                s.history_entries = entries;
                s.is_loading = false;
            }),
            Err(e) => view_model.set_state(|s| {
                s.is_loading = false;
                s.error = Some(Failure::from_error(&e, "Failed to load history").message);
            }),
        }));
    }

    async fn delete_entry(&self, entry_id: &str) {
        match self.use_cases.delete_history.execute(entry_id).await {
            Ok(()) => self.send_effect(HistoryListEffect::ShowToast(ToastMessage::EntryDeleted)),
            Err(failure) => self.set_state(|s| s.error = Some(failure.message)),
        }
    }

    async fn confirm_clear_all(&self) {
        self.set_state(|s| s.show_clear_confirm_dialog = false);

        match self.use_cases.clear_history.execute().await {
            Ok(()) => self.send_effect(HistoryListEffect::ShowToast(ToastMessage::HistoryCleared)),
            Err(failure) => self.set_state(|s| s.error = Some(failure.message)),
        }
    }
}
