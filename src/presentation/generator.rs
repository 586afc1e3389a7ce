use std::ops::Deref;
use tracing::{debug, warn};

use super::ViewModel;
use crate::model::{GeneratedNumbers, LotteryType, LotteryTypes};
use crate::use_cases::UseCases;

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorState {
    pub selected_lottery_type: LotteryType,
    pub available_lottery_types: Vec<LotteryType>,
    pub generated_numbers: Option<GeneratedNumbers>,
    pub is_loading: bool,
    pub is_animating: bool,
    pub show_confetti: bool,
    pub error: Option<String>,
}

impl Default for GeneratorState {
    fn default() -> Self {
        Self {
            selected_lottery_type: LotteryTypes::powerball(),
            available_lottery_types: Vec::new(),
            generated_numbers: None,
            is_loading: false,
            is_animating: false,
            show_confetti: false,
            error: None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum GeneratorIntent {
    LoadLotteryTypes,
    SelectLotteryType(LotteryType),
    GenerateNumbers,
    AnimationComplete,
    ConfettiComplete,
    DismissError,
    NavigateToHistory,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GeneratorEffect {
    NavigateToHistory,
    TriggerHapticFeedback,
}

pub struct GeneratorViewModel {
    view_model: ViewModel<GeneratorState, GeneratorEffect>,
    use_cases: UseCases,
}

impl Deref for GeneratorViewModel {
    type Target = ViewModel<GeneratorState, GeneratorEffect>;

    fn deref(&self) -> &Self::Target {
        &self.view_model
    }
}

impl GeneratorViewModel {
    pub fn new(use_cases: UseCases) -> Self {
        Self {
            view_model: ViewModel::new(GeneratorState::default()),
            use_cases,
        }
    }

    pub async fn process(&self, intent: GeneratorIntent) {
        match intent {
            GeneratorIntent::LoadLotteryTypes => self.load_lottery_types().await,
            GeneratorIntent::SelectLotteryType(lottery_type) => {
                self.select_lottery_type(lottery_type).await
            }
            GeneratorIntent::GenerateNumbers => self.generate_numbers().await,
            GeneratorIntent::AnimationComplete => self.on_animation_complete().await,
            GeneratorIntent::ConfettiComplete => self.set_state(|s| s.show_confetti = false),
            GeneratorIntent::DismissError => self.set_state(|s| s.error = None),
            GeneratorIntent::NavigateToHistory => {
                self.send_effect(GeneratorEffect::NavigateToHistory)
            }
        }
    }

    async fn load_lottery_types(&self) {
        let types = match self.use_cases.get_lottery_types.execute().await {
            Ok(types) => types,
            Err(failure) => {
                self.set_state(|s| s.error = Some(failure.message));
                return;
            }
        };

        let saved_id = self
            .use_cases
            .get_selected_lottery_type_id
            .execute()
            .first()
            .await
            .unwrap_or_else(|e| {
                warn!("could not read the saved lottery type: {}", e);
                None
            });

        self.set_state(|s| {
            let selected = saved_id
                .and_then(|id| types.iter().find(|t| t.id == id))
                .or_else(|| types.first())
                .cloned();
            if let Some(selected) = selected {
                s.selected_lottery_type = selected;
            }
            s.available_lottery_types = types;
        });

        self.load_last_generated_numbers().await;
    }

    /// Restores the previous result, but only when it belongs to the selected
    /// type. A result deleted from history in the meantime is skipped.
    async fn load_last_generated_numbers(&self) {
        let last_id = match self
            .use_cases
            .get_last_generated_numbers_id
            .execute()
            .first()
            .await
        {
            Ok(Some(id)) => id,
            Ok(None) => return,
            Err(e) => {
                warn!("could not read the last generated numbers: {}", e);
                return;
            }
        };

        match self.use_cases.get_history_detail.execute(&last_id).await {
            Ok(numbers) => self.set_state(|s| {
                if numbers.lottery_type.id == s.selected_lottery_type.id {
                    s.generated_numbers = Some(numbers);
                }
            }),
            Err(failure) => debug!("not restoring {}: {}", last_id, failure),
        }
    }

    async fn select_lottery_type(&self, lottery_type: LotteryType) {
        let type_id = lottery_type.id.clone();
        self.set_state(|s| {
            s.selected_lottery_type = lottery_type;
            s.generated_numbers = None;
        });

        if let Err(failure) = self
            .use_cases
            .save_selected_lottery_type_id
            .execute(&type_id)
            .await
        {
            warn!("{}", failure);
        }
        if let Err(failure) = self.use_cases.clear_last_generated_numbers.execute().await {
            warn!("{}", failure);
        }
    }

    async fn generate_numbers(&self) {
        // The loading check and the type capture happen in one update so a
        // second request cannot slip in between.
        let mut captured = None;
        self.update_if(|s| {
            if s.is_loading {
                return false;
            }
            captured = Some(s.selected_lottery_type.clone());
            s.is_loading = true;
            s.error = None;
            true
        });
        let Some(lottery_type) = captured else {
            debug!("generate ignored, already in flight");
            return;
        };

        match self.use_cases.generate_numbers.execute(lottery_type).await {
            Ok(numbers) => {
                let numbers_id = numbers.id.clone();
                self.set_state(|s| {
                    s.is_loading = false;
                    s.generated_numbers = Some(numbers);
                    s.is_animating = true;
                });
                if let Err(failure) = self
                    .use_cases
                    .save_last_generated_numbers_id
                    .execute(&numbers_id)
                    .await
                {
                    warn!("{}", failure);
                }
                self.send_effect(GeneratorEffect::TriggerHapticFeedback);
            }
            Err(failure) => self.set_state(|s| {
                s.is_loading = false;
                s.error = Some(failure.message);
            }),
        }
    }

    /// Confetti plays the first time each lottery type finishes animating.
    async fn on_animation_complete(&self) {
        let type_id = self.state().selected_lottery_type.id;

        let show_confetti = match self.use_cases.check_confetti_shown.execute(&type_id).await {
            Ok(shown) => !shown,
            Err(failure) => {
                warn!("{}", failure);
                false
            }
        };

        self.set_state(|s| {
            s.is_animating = false;
            s.show_confetti = show_confetti;
        });

        if show_confetti {
            if let Err(failure) = self.use_cases.mark_confetti_shown.execute(&type_id).await {
                warn!("{}", failure);
            }
        }
    }
}
