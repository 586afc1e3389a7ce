use std::convert::Infallible;
use std::ops::Deref;
use tracing::warn;

use super::{Subscription, ViewModel, observe};
use crate::use_cases::UseCases;

/// `Unknown` until the stored flag has been read. `Accepted` is final.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OnboardingState {
    #[default]
    Unknown,
    Pending,
    Accepted,
}

impl OnboardingState {
    fn with_flag(self, accepted: bool) -> Self {
        match (self, accepted) {
            (OnboardingState::Accepted, _) | (_, true) => OnboardingState::Accepted,
            _ => OnboardingState::Pending,
        }
    }
}

#[derive(Debug, Clone)]
pub enum OnboardingIntent {
    AcceptDisclaimer,
}

pub struct OnboardingViewModel {
    view_model: ViewModel<OnboardingState, Infallible>,
    use_cases: UseCases,
    _disclaimer: Subscription,
}

impl Deref for OnboardingViewModel {
    type Target = ViewModel<OnboardingState, Infallible>;

    fn deref(&self) -> &Self::Target {
        &self.view_model
    }
}

impl OnboardingViewModel {
    /// Must be called from within a tokio runtime.
    pub fn new(use_cases: UseCases) -> Self {
        let view_model = ViewModel::new(OnboardingState::Unknown);

        let disclaimer = Subscription::default();
        let target = view_model.clone();
        disclaimer.replace(observe(
            use_cases.get_disclaimer_accepted.execute(),
            move |snapshot| match snapshot {
                Ok(accepted) => target.set_state(|s| *s = s.with_flag(accepted)),
                Err(e) => warn!("could not read the disclaimer flag: {}", e),
            },
        ));

        Self {
            view_model,
            use_cases,
            _disclaimer: disclaimer,
        }
    }

    pub async fn process(&self, intent: OnboardingIntent) {
        match intent {
            OnboardingIntent::AcceptDisclaimer => {
                match self.use_cases.accept_disclaimer.execute().await {
                    Ok(()) => self.set_state(|s| *s = OnboardingState::Accepted),
                    Err(failure) => warn!("{}", failure),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::testing::{self, wait_until};

    #[test]
    fn accepted_is_final() {
        assert_eq!(
            OnboardingState::Accepted.with_flag(false),
            OnboardingState::Accepted
        );
        assert_eq!(
            OnboardingState::Unknown.with_flag(false),
            OnboardingState::Pending
        );
        assert_eq!(
            OnboardingState::Pending.with_flag(true),
            OnboardingState::Accepted
        );
    }

    #[tokio::test]
    async fn starts_unknown_then_pending() {
        let view_model = OnboardingViewModel::new(testing::use_cases());
        assert_eq!(view_model.state(), OnboardingState::Unknown);
        wait_until(&view_model, |s| *s == OnboardingState::Pending).await;
    }

    #[tokio::test]
    async fn acceptance_is_remembered() {
        let use_cases = testing::use_cases();
        let first = OnboardingViewModel::new(use_cases.clone());
        first.process(OnboardingIntent::AcceptDisclaimer).await;
        assert_eq!(first.state(), OnboardingState::Accepted);

        let second = OnboardingViewModel::new(use_cases);
        wait_until(&second, |s| *s == OnboardingState::Accepted).await;
    }
}
