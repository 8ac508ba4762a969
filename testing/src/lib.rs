//! # Tasklist Testing
//!
//! Testing utilities for tasklist reducers and stores:
//! - [`ReducerTest`]: drive one reducer by hand and settle its effects
//! - [`mocks::ManualClock`]: time that only moves when a test moves it
//! - [`effects::resolve`]: run the futures a reducer returned and collect the
//!   actions they produce, without a `Store`
//! - [`init_tracing`]: opt-in log output for a test run
//!
//! ## Example
//!
//! ```ignore
//! use tasklist_testing::ReducerTest;
//!
//! let mut test = ReducerTest::new(TaskListReducer::new(), env, TaskListState::default());
//! assert!(test.send(TaskListAction::DraftChanged("Buy milk".into())).is_noop());
//! assert_eq!(test.state().draft, "Buy milk");
//! ```

use chrono::{DateTime, Utc};
use tasklist_core::environment::Clock;

pub mod reducer_test;

pub use reducer_test::{ReducerTest, Reduction};

/// Mock implementations of shared environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};
    use std::sync::{Arc, Mutex, PoisonError};

    /// Clock that stands still until [`ManualClock::advance`] is called.
    ///
    /// Clones share the same time, so a test can keep one handle and give
    /// another to the code under test.
    ///
    /// ```
    /// use chrono::Duration;
    /// use tasklist_core::environment::Clock;
    /// use tasklist_testing::mocks::test_clock;
    ///
    /// let clock = test_clock();
    /// let start = clock.now();
    /// clock.advance(Duration::minutes(5));
    /// assert_eq!(clock.now() - start, Duration::minutes(5));
    /// ```
    #[derive(Debug, Clone)]
    pub struct ManualClock {
        time: Arc<Mutex<DateTime<Utc>>>,
    }

    impl ManualClock {
        /// Create a clock reading `time`.
        #[must_use]
        pub fn new(time: DateTime<Utc>) -> Self {
            Self {
                time: Arc::new(Mutex::new(time)),
            }
        }

        /// Move the clock forward by `by`.
        pub fn advance(&self, by: chrono::Duration) {
            let mut time = self.time.lock().unwrap_or_else(PoisonError::into_inner);
            *time += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.time.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    /// A manual clock starting at 2025-01-01 00:00:00 UTC
    #[must_use]
    pub fn test_clock() -> ManualClock {
        ManualClock::new(DateTime::<Utc>::from_timestamp(1_735_689_600, 0).unwrap_or_default())
    }
}

/// Helpers for driving effects by hand
pub mod effects {
    use tasklist_core::effect::Effect;

    /// Await every [`Effect::Future`] in order and collect the actions they
    /// produce. Follow-up actions are not reduced.
    pub async fn resolve<A, I>(effects: I) -> Vec<A>
    where
        I: IntoIterator<Item = Effect<A>>,
    {
        let mut actions = Vec::new();
        for effect in effects {
            if let Effect::Future(fut) = effect {
                if let Some(action) = fut.await {
                    actions.push(action);
                }
            }
        }
        actions
    }
}

/// Install a test subscriber honoring `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub use mocks::{ManualClock, test_clock};

#[cfg(test)]
mod tests {
    use super::*;
    use tasklist_core::effect::Effect;

    #[test]
    fn clones_share_one_time() {
        let clock = test_clock();
        let handle = clock.clone();
        assert_eq!(clock.now().to_rfc3339(), "2025-01-01T00:00:00+00:00");

        handle.advance(chrono::Duration::hours(24));

        assert_eq!(clock.now().to_rfc3339(), "2025-01-02T00:00:00+00:00");
    }

    #[tokio::test]
    async fn resolve_collects_future_actions() {
        let effects = vec![
            Effect::None,
            Effect::future(async { Some(1) }),
            Effect::future(async { None }),
            Effect::future(async { Some(2) }),
        ];

        assert_eq!(effects::resolve(effects).await, vec![1, 2]);
    }
}
