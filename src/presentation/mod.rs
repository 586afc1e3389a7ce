//! Screen state holders.
//!
//! Each holder owns a [`ViewModel`]: the current state lives in a watch
//! channel, one-time effects (navigation, toasts) go through an unbounded
//! queue. Intents are handled by `process`, which returns once the intent's
//! work is done. Observed reads run as spawned tasks owned by a
//! [`Subscription`].

use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::warn;

use crate::error::Result;
use crate::feed::Feed;

pub mod add_edit;
pub mod custom_types;
pub mod generator;
pub mod history_detail;
pub mod history_list;
pub mod onboarding;
pub mod settings;

pub struct ViewModel<S, E> {
    state: Arc<watch::Sender<S>>,
    effects: mpsc::UnboundedSender<E>,
    effect_rx: Arc<tokio::sync::Mutex<mpsc::UnboundedReceiver<E>>>,
}

impl<S, E> Clone for ViewModel<S, E> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            effects: self.effects.clone(),
            effect_rx: Arc::clone(&self.effect_rx),
        }
    }
}

impl<S: Clone, E> ViewModel<S, E> {
    pub fn new(initial: S) -> Self {
        let (effects, effect_rx) = mpsc::unbounded_channel();
        Self {
            state: Arc::new(watch::channel(initial).0),
            effects,
            effect_rx: Arc::new(tokio::sync::Mutex::new(effect_rx)),
        }
    }

    pub fn state(&self) -> S {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<S> {
        self.state.subscribe()
    }

    pub fn set_state(&self, reducer: impl FnOnce(&mut S)) {
        self.state.send_modify(reducer);
    }

    /// Applies `reducer` and notifies subscribers only when it returns true.
    pub fn update_if(&self, reducer: impl FnOnce(&mut S) -> bool) -> bool {
        self.state.send_if_modified(reducer)
    }

    /// Queues `effect` until it is taken. Effects are never dropped while
    /// the view model is alive.
    pub fn send_effect(&self, effect: E) {
        if let Err(e) = self.effects.send(effect) {
            warn!("dropping effect: {}", e);
        }
    }

    /// Waits for the next effect.
    pub async fn next_effect(&self) -> Option<E> {
        self.effect_rx.lock().await.recv().await
    }

    pub fn try_next_effect(&self) -> Option<E> {
        self.effect_rx.try_lock().ok()?.try_recv().ok()
    }
}

/// A spawned observer task. Replacing or dropping it aborts the task.
#[derive(Default)]
pub struct Subscription {
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Subscription {
    fn lock(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.task.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn replace(&self, task: JoinHandle<()>) {
        if let Some(previous) = self.lock().replace(task) {
            previous.abort();
        }
    }

    pub fn cancel(&self) {
        if let Some(task) = self.lock().take() {
            task.abort();
        }
    }

    pub fn is_active(&self) -> bool {
        self.lock().as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Runs `on_snapshot` for every value the feed yields until it closes.
pub(crate) fn observe<T, F>(mut feed: Feed<T>, mut on_snapshot: F) -> JoinHandle<()>
where
    T: Send + 'static,
    F: FnMut(Result<T>) + Send + 'static,
{
    tokio::spawn(async move {
        while let Some(snapshot) = feed.next().await {
            on_snapshot(snapshot);
        }
    })
}
