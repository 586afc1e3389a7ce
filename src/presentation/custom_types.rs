use std::ops::Deref;

use super::{Subscription, ViewModel, observe};
use crate::model::LotteryType;
use crate::use_cases::UseCases;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomTypesState {
    pub custom_types: Vec<LotteryType>,
    pub is_loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub enum CustomTypesIntent {
    LoadCustomTypes,
    AddCustomType,
    EditCustomType(String),
    DeleteCustomType(String),
    NavigateBack,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CustomTypesEffect {
    NavigateToAddType,
    NavigateToEditType(String),
    NavigateBack,
    /// Carries the display name of the deleted type.
    ShowDeleteSuccess(String),
    ShowError(String),
}

pub struct CustomTypesViewModel {
    view_model: ViewModel<CustomTypesState, CustomTypesEffect>,
    use_cases: UseCases,
    custom_types: Subscription,
}

impl Deref for CustomTypesViewModel {
    type Target = ViewModel<CustomTypesState, CustomTypesEffect>;

    fn deref(&self) -> &Self::Target {
        &self.view_model
    }
}

impl CustomTypesViewModel {
    pub fn new(use_cases: UseCases) -> Self {
        Self {
            view_model: ViewModel::new(CustomTypesState::default()),
            use_cases,
            custom_types: Subscription::default(),
        }
    }

    pub async fn process(&self, intent: CustomTypesIntent) {
        match intent {
            CustomTypesIntent::LoadCustomTypes => self.load_custom_types(),
            CustomTypesIntent::AddCustomType => {
                self.send_effect(CustomTypesEffect::NavigateToAddType)
            }
            CustomTypesIntent::EditCustomType(type_id) => {
                self.send_effect(CustomTypesEffect::NavigateToEditType(type_id))
            }
            CustomTypesIntent::DeleteCustomType(type_id) => {
                self.delete_custom_type(&type_id).await
            }
            CustomTypesIntent::NavigateBack => self.send_effect(CustomTypesEffect::NavigateBack),
        }
    }

    fn load_custom_types(&self) {
        self.set_state(|s| s.is_loading = true);

        let view_model = self.view_model.clone();
        self.custom_types.replace(observe(
            self.use_cases.get_custom_lottery_types.execute(),
            move |snapshot| match snapshot {
                Ok(types) => view_model.set_state(|s| {
                    s.custom_types = types;
                    s.is_loading = false;
                    s.error = None;
                }),
                Err(e) => view_model.set_state(|s| {
                    s.is_loading = false;
                    s.error = Some(e.to_string());
                }),
            },
        ));
    }

    async fn delete_custom_type(&self, type_id: &str) {
        let type_name = self
            .state()
            .custom_types
            .into_iter()
            .find(|t| t.id == type_id)
            .map(|t| t.display_name)
            .unwrap_or_default();

        match self.use_cases.delete_custom_lottery_type.execute(type_id).await {
            Ok(()) => self.send_effect(CustomTypesEffect::ShowDeleteSuccess(type_name)),
            Err(failure) => self.send_effect(CustomTypesEffect::ShowError(failure.message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::testing::{self, wait_until};

    fn draft(display_name: &str) -> LotteryType {
        LotteryType {
            id: String::new(),
            name: display_name.to_lowercase().replace(' ', "_"),
            display_name: display_name.to_string(),
            main_number_count: 5,
            main_number_max: 35,
            bonus_number_count: 1,
            bonus_number_max: 5,
            is_custom: true,
        }
    }

    #[tokio::test]
    async fn lists_types_in_creation_order() {
        let use_cases = testing::use_cases();
        use_cases.save_custom_lottery_type.execute(draft("First")).await.unwrap();
        use_cases.save_custom_lottery_type.execute(draft("Second")).await.unwrap();
        let view_model = CustomTypesViewModel::new(use_cases);

        view_model.process(CustomTypesIntent::LoadCustomTypes).await;

        let state = wait_until(&view_model, |s| !s.is_loading).await;
        let names: Vec<&str> = state
            .custom_types
            .iter()
            .map(|t| t.display_name.as_str())
            .collect();
        assert_eq!(names, vec!["First", "Second"]);
    }

    #[tokio::test]
    async fn delete_reports_the_display_name() {
        let use_cases = testing::use_cases();
        let saved = use_cases
            .save_custom_lottery_type
            .execute(draft("Office Pool"))
            .await
            .unwrap();
        let view_model = CustomTypesViewModel::new(use_cases);
        view_model.process(CustomTypesIntent::LoadCustomTypes).await;
        wait_until(&view_model, |s| s.custom_types.len() == 1).await;

        view_model
            .process(CustomTypesIntent::DeleteCustomType(saved.id))
            .await;

        assert_eq!(
            view_model.next_effect().await,
            Some(CustomTypesEffect::ShowDeleteSuccess("Office Pool".to_string()))
        );
        wait_until(&view_model, |s| s.custom_types.is_empty()).await;
    }

    #[tokio::test]
    async fn navigation_effects() {
        let view_model = CustomTypesViewModel::new(testing::use_cases());
        view_model.process(CustomTypesIntent::AddCustomType).await;
        view_model
            .process(CustomTypesIntent::EditCustomType("custom_1".to_string()))
            .await;
        view_model.process(CustomTypesIntent::NavigateBack).await;

        assert_eq!(
            view_model.try_next_effect(),
            Some(CustomTypesEffect::NavigateToAddType)
        );
        assert_eq!(
            view_model.try_next_effect(),
            Some(CustomTypesEffect::NavigateToEditType("custom_1".to_string()))
        );
        assert_eq!(
            view_model.try_next_effect(),
            Some(CustomTypesEffect::NavigateBack)
        );
    }
}
