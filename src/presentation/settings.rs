use std::ops::Deref;
use tracing::warn;

use super::{Subscription, ViewModel, observe};
use crate::model::LotteryType;
use crate::use_cases::UseCases;

#[derive(Debug, Clone, PartialEq)]
pub struct SettingsState {
    pub lottery_types: Vec<LotteryType>,
    pub custom_types_count: u32,
    pub is_loading: bool,
    pub app_version: String,
    pub error: Option<String>,
}

impl Default for SettingsState {
    fn default() -> Self {
        Self {
            lottery_types: Vec::new(),
            custom_types_count: 0,
            is_loading: false,
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            error: None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum SettingsIntent {
    LoadSettings,
    ViewLotteryTypeInfo(LotteryType),
    NavigateToCustomTypes,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SettingsEffect {
    ShowLotteryTypeInfo(LotteryType),
    NavigateToCustomTypes,
}

pub struct SettingsViewModel {
    view_model: ViewModel<SettingsState, SettingsEffect>,
    use_cases: UseCases,
    _custom_types_count: Subscription,
}

impl Deref for SettingsViewModel {
    type Target = ViewModel<SettingsState, SettingsEffect>;

    fn deref(&self) -> &Self::Target {
        &self.view_model
    }
}

impl SettingsViewModel {
    /// Starts watching the custom type count right away. Must be called from
    /// within a tokio runtime.
    pub fn new(use_cases: UseCases) -> Self {
        let view_model = ViewModel::new(SettingsState::default());

        let counts = Subscription::default();
        let target = view_model.clone();
        counts.replace(observe(
            use_cases.get_custom_lottery_types_count.execute(),
            move |snapshot| match snapshot {
                Ok(count) => target.set_state(|s| s.custom_types_count = count),
                Err(e) => warn!("could not count custom types: {}", e),
            },
        ));

        Self {
            view_model,
            use_cases,
            _custom_types_count: counts,
        }
    }

    pub async fn process(&self, intent: SettingsIntent) {
        match intent {
            SettingsIntent::LoadSettings => self.load_settings().await,
            SettingsIntent::ViewLotteryTypeInfo(lottery_type) => {
                self.send_effect(SettingsEffect::ShowLotteryTypeInfo(lottery_type))
            }
            SettingsIntent::NavigateToCustomTypes => {
                self.send_effect(SettingsEffect::NavigateToCustomTypes)
            }
        }
    }

    async fn load_settings(&self) {
        self.set_state(|s| s.is_loading = true);

        match self.use_cases.get_lottery_types.execute().await {
            Ok(types) => self.set_state(|s| {
                s.lottery_types = types;
                s.is_loading = false;
            }),
            Err(failure) => self.set_state(|s| {
                s.is_loading = false;
                s.error = Some(failure.message);
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LotteryTypes;
    use crate::presentation::testing::{self, wait_until};

    fn weekly() -> LotteryType {
        LotteryType {
            id: String::new(),
            name: "weekly".to_string(),
            display_name: "Weekly".to_string(),
            main_number_count: 4,
            main_number_max: 30,
            bonus_number_count: 0,
            bonus_number_max: 0,
            is_custom: true,
        }
    }

    #[tokio::test]
    async fn lists_every_type() {
        let use_cases = testing::use_cases();
        use_cases.save_custom_lottery_type.execute(weekly()).await.unwrap();
        let view_model = SettingsViewModel::new(use_cases);

        view_model.process(SettingsIntent::LoadSettings).await;

        let state = view_model.state();
        assert!(!state.is_loading);
        assert_eq!(state.lottery_types.len(), 9);
        assert_eq!(state.app_version, env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn custom_count_follows_the_store() {
        let use_cases = testing::use_cases();
        let view_model = SettingsViewModel::new(use_cases.clone());

        use_cases.save_custom_lottery_type.execute(weekly()).await.unwrap();
        wait_until(&view_model, |s| s.custom_types_count == 1).await;

        use_cases.save_custom_lottery_type.execute(weekly()).await.unwrap();
        wait_until(&view_model, |s| s.custom_types_count == 2).await;
    }

    #[tokio::test]
    async fn navigation_effects() {
        let view_model = SettingsViewModel::new(testing::use_cases());
        view_model
            .process(SettingsIntent::ViewLotteryTypeInfo(LotteryTypes::cash4life()))
            .await;
        view_model.process(SettingsIntent::NavigateToCustomTypes).await;

        assert_eq!(
            view_model.try_next_effect(),
            Some(SettingsEffect::ShowLotteryTypeInfo(LotteryTypes::cash4life()))
        );
        assert_eq!(
            view_model.try_next_effect(),
            Some(SettingsEffect::NavigateToCustomTypes)
        );
    }
}
