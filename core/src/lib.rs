//! # Tasklist Core
//!
//! The small set of abstractions every tasklist feature is written against.
//!
//! ## Core Concepts
//!
//! - **State**: Owned, cloneable data for one feature (a session, a task list)
//! - **Action**: Every input a feature reacts to, user intents and effect results alike
//! - **Reducer**: `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: A description of I/O to perform; the runtime executes it
//! - **Environment**: Injected dependencies (identity provider, task store, clock)
//!
//! Reducers never perform I/O themselves. Anything that touches the network is
//! returned as an [`effect::Effect::Future`] whose output action is fed back
//! into the reducer by the runtime.
//!
//! ## Example
//!
//! ```
//! use tasklist_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
//!
//! #[derive(Clone, Debug, Default)]
//! struct Counter {
//!     count: i64,
//! }
//!
//! #[derive(Clone, Debug)]
//! enum CounterAction {
//!     Increment,
//! }
//!
//! struct CounterReducer;
//!
//! impl Reducer for CounterReducer {
//!     type State = Counter;
//!     type Action = CounterAction;
//!     type Environment = ();
//!
//!     fn reduce(
//!         &self,
//!         state: &mut Counter,
//!         action: CounterAction,
//!         _env: &(),
//!     ) -> SmallVec<[Effect<CounterAction>; 4]> {
//!         match action {
//!             CounterAction::Increment => state.count += 1,
//!         }
//!         smallvec![Effect::None]
//!     }
//! }
//!
//! let mut state = Counter::default();
//! let _ = CounterReducer.reduce(&mut state, CounterAction::Increment, &());
//! assert_eq!(state.count, 1);
//! ```

pub use smallvec::{smallvec, SmallVec};

/// Reducer module - the trait all feature logic implements
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for feature logic
    ///
    /// A reducer validates an action, updates state in place and returns
    /// descriptions of the side effects the action requires. It must be
    /// deterministic given the same state, action and environment.
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - side effect descriptions
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are values. The reducer returns them and the runtime `Store`
    /// executes them after the state lock has been released.
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Arbitrary async computation
        ///
        /// If the future resolves to `Some(action)` the action is fed back into
        /// the reducer and broadcast to observers.
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),
    }

    impl<Action> Effect<Action> {
        /// Wrap an async block as an [`Effect::Future`].
        pub fn future<F>(fut: F) -> Self
        where
            F: Future<Output = Option<Action>> + Send + 'static,
        {
            Self::Future(Box::pin(fut))
        }

        /// Returns `true` for [`Effect::None`].
        #[must_use]
        pub const fn is_none(&self) -> bool {
            matches!(self, Self::None)
        }
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action> std::fmt::Debug for Effect<Action> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Self::None => write!(f, "Effect::None"),
                Self::Future(_) => write!(f, "Effect::Future(<future>)"),
            }
        }
    }
}

/// Environment module - dependency injection traits shared by all features
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time for testability
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Wall clock backed by [`Utc::now`].
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}

/// User-visible notifications ("toasts")
///
/// Features report outcomes through a [`notify::Notifier`] instead of
/// returning display strings, so the shell decides how they are rendered.
pub mod notify {
    use std::sync::{Arc, Mutex};

    /// Sink for user-visible notification strings.
    pub trait Notifier: Send + Sync {
        /// Deliver one notification.
        fn notify(&self, message: &str);
    }

    impl<N: Notifier + ?Sized> Notifier for Arc<N> {
        fn notify(&self, message: &str) {
            (**self).notify(message);
        }
    }

    /// Notifier that writes every message to the log.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct TracingNotifier;

    impl Notifier for TracingNotifier {
        fn notify(&self, message: &str) {
            tracing::info!(notice = message, "Notification");
        }
    }

    /// Notifier that keeps messages in memory.
    ///
    /// Used per request by the HTTP shell and by tests.
    #[derive(Debug, Clone, Default)]
    pub struct RecordingNotifier {
        messages: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingNotifier {
        /// Create an empty recorder.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Snapshot of all messages delivered so far.
        #[must_use]
        pub fn messages(&self) -> Vec<String> {
            self.messages
                .lock()
                .map(|messages| messages.clone())
                .unwrap_or_default()
        }

        /// Remove and return all messages delivered so far.
        #[must_use]
        pub fn take(&self) -> Vec<String> {
            self.messages
                .lock()
                .map(|mut messages| std::mem::take(&mut *messages))
                .unwrap_or_default()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, message: &str) {
            if let Ok(mut messages) = self.messages.lock() {
                messages.push(message.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::effect::Effect;
    use super::notify::{Notifier, RecordingNotifier};
    use std::sync::Arc;

    #[test]
    fn recording_notifier_keeps_order_and_drains() {
        let notifier = RecordingNotifier::new();
        let shared: Arc<dyn Notifier> = Arc::new(notifier.clone());

        shared.notify("first");
        shared.notify("second");

        assert_eq!(notifier.messages(), vec!["first", "second"]);
        assert_eq!(notifier.take(), vec!["first", "second"]);
        assert!(notifier.messages().is_empty());
    }

    #[test]
    fn none_effect_is_none() {
        let effect: Effect<()> = Effect::None;
        assert!(effect.is_none());
        assert_eq!(format!("{effect:?}"), "Effect::None");
    }

    #[tokio::test]
    async fn future_effect_yields_action() {
        let effect = Effect::future(async { Some(7_u8) });
        assert!(!effect.is_none());

        let Effect::Future(fut) = effect else {
            unreachable!("constructed as a future");
        };
        assert_eq!(fut.await, Some(7));
    }
}
