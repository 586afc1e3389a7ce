use std::ops::Deref;

use super::ViewModel;
use crate::model::LotteryType;
use crate::use_cases::UseCases;

pub const NAME_REQUIRED: &str = "Name is required";

/// Form state for creating or editing a custom lottery type.
#[derive(Debug, Clone, PartialEq)]
pub struct AddEditState {
    /// Set when editing an existing type.
    pub type_id: Option<String>,
    pub name: String,
    pub main_number_count: u32,
    pub main_number_max: u32,
    pub bonus_number_count: u32,
    pub bonus_number_max: u32,
    pub is_loading: bool,
    pub is_saving: bool,
    pub name_error: Option<String>,
    pub error: Option<String>,
}

impl Default for AddEditState {
    fn default() -> Self {
        Self {
            type_id: None,
            name: String::new(),
            main_number_count: 5,
            main_number_max: 50,
            bonus_number_count: 0,
            bonus_number_max: 25,
            is_loading: false,
            is_saving: false,
            name_error: None,
            error: None,
        }
    }
}

impl AddEditState {
    pub fn is_edit_mode(&self) -> bool {
        self.type_id.is_some()
    }

    pub fn has_bonus_numbers(&self) -> bool {
        self.bonus_number_count > 0
    }

    pub fn is_valid(&self) -> bool {
        !self.name.trim().is_empty() && self.name_error.is_none()
    }

    pub fn preview_main_numbers(&self) -> String {
        format!(
            "{} numbers from 1-{}",
            self.main_number_count, self.main_number_max
        )
    }

    pub fn preview_bonus_numbers(&self) -> String {
        if self.has_bonus_numbers() {
            format!(
                "{} bonus from 1-{}",
                self.bonus_number_count, self.bonus_number_max
            )
        } else {
            "No bonus numbers".to_string()
        }
    }

    /// The type the form describes. The canonical name is the lowercased
    /// display name with spaces turned into underscores.
    fn to_lottery_type(&self) -> LotteryType {
        let display_name = self.name.trim().to_string();
        LotteryType {
            id: self.type_id.clone().unwrap_or_default(),
            name: display_name.to_lowercase().replace(' ', "_"),
            display_name,
            main_number_count: self.main_number_count,
            main_number_max: self.main_number_max,
            bonus_number_count: self.bonus_number_count,
            bonus_number_max: if self.has_bonus_numbers() {
                self.bonus_number_max
            } else {
                0
            },
            is_custom: true,
        }
    }
}

#[derive(Debug, Clone)]
pub enum AddEditIntent {
    LoadType(String),
    UpdateName(String),
    UpdateMainNumberCount(u32),
    UpdateMainNumberMax(u32),
    UpdateBonusNumberCount(u32),
    UpdateBonusNumberMax(u32),
    Save,
    NavigateBack,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AddEditEffect {
    NavigateBack,
    SaveSuccess,
    ShowError(String),
}

pub struct AddEditViewModel {
    view_model: ViewModel<AddEditState, AddEditEffect>,
    use_cases: UseCases,
}

impl Deref for AddEditViewModel {
    type Target = ViewModel<AddEditState, AddEditEffect>;

    fn deref(&self) -> &Self::Target {
        &self.view_model
    }
}

impl AddEditViewModel {
    pub fn new(use_cases: UseCases) -> Self {
        Self {
            view_model: ViewModel::new(AddEditState::default()),
            use_cases,
        }
    }

    pub async fn process(&self, intent: AddEditIntent) {
        match intent {
            AddEditIntent::LoadType(type_id) => self.load_type(type_id).await,
            AddEditIntent::UpdateName(name) => self.set_state(|s| {
                s.name = name;
                s.name_error = None;
            }),
            AddEditIntent::UpdateMainNumberCount(count) => self.set_state(|s| {
                s.main_number_count = count;
                s.main_number_max = s.main_number_max.max(count);
            }),
            AddEditIntent::UpdateMainNumberMax(max) => self.set_state(|s| s.main_number_max = max),
            AddEditIntent::UpdateBonusNumberCount(count) => self.set_state(|s| {
                s.bonus_number_count = count;
                if count > 0 {
                    s.bonus_number_max = s.bonus_number_max.max(count);
                }
            }),
            AddEditIntent::UpdateBonusNumberMax(max) => {
                self.set_state(|s| s.bonus_number_max = max)
            }
            AddEditIntent::Save => self.save().await,
            AddEditIntent::NavigateBack => self.send_effect(AddEditEffect::NavigateBack),
        }
    }

    async fn load_type(&self, type_id: String) {
        self.set_state(|s| {
            s.is_loading = true;
            s.type_id = Some(type_id.clone());
        });

        match self
            .use_cases
            .get_custom_lottery_type_by_id
            .execute(&type_id)
            .await
        {
            Ok(Some(lottery_type)) => self.set_state(|s| {
                s.is_loading = false;
                s.name = lottery_type.display_name;
                s.main_number_count = lottery_type.main_number_count;
                s.main_number_max = lottery_type.main_number_max;
                s.bonus_number_count = lottery_type.bonus_number_count;
                s.bonus_number_max = lottery_type.bonus_number_max;
            }),
            Ok(None) => {
                self.set_state(|s| s.is_loading = false);
                self.send_effect(AddEditEffect::ShowError("Type not found".to_string()));
            }
            Err(failure) => {
                self.set_state(|s| s.is_loading = false);
                self.send_effect(AddEditEffect::ShowError(failure.message));
            }
        }
    }

    async fn save(&self) {
        let mut draft = None;
        self.set_state(|s| {
            if s.name.trim().is_empty() {
                s.name_error = Some(NAME_REQUIRED.to_string());
            } else if s.is_valid() {
                s.is_saving = true;
                draft = Some(s.to_lottery_type());
            }
        });
        let Some(lottery_type) = draft else {
            return;
        };

        match self.use_cases.save_custom_lottery_type.execute(lottery_type).await {
            Ok(saved) => {
                self.set_state(|s| {
                    s.is_saving = false;
                    s.type_id = Some(saved.id);
                });
                self.send_effect(AddEditEffect::SaveSuccess);
            }
            Err(failure) => {
                self.set_state(|s| s.is_saving = false);
                self.send_effect(AddEditEffect::ShowError(failure.message));
            }
        }
    }
}
