//! Driving a reducer by hand.
//!
//! [`ReducerTest`] owns one reducer, its environment and its state. Each
//! [`ReducerTest::send`] reduces a single action and hands back the
//! [`Reduction`]; [`ReducerTest::settle`] also runs the returned futures and
//! feeds their actions back until nothing is left, the way a `Store` would
//! but on the test's own task and in a fixed order.

#![allow(clippy::module_name_repetitions)]

use std::collections::VecDeque;
use tasklist_core::{SmallVec, effect::Effect, reducer::Reducer};

/// Upper bound on fed-back actions in one [`ReducerTest::settle`].
const MAX_FEEDBACK: usize = 64;

/// A reducer with its environment and current state.
///
/// ```ignore
/// let mut test = ReducerTest::new(TaskListReducer::new(), env, TaskListState::default());
///
/// let fed_back = test.settle(TaskListAction::SessionChanged(signed_in)).await;
/// assert!(matches!(fed_back.as_slice(), [TaskListAction::Loaded(_)]));
/// assert_eq!(test.state().view, View::Ready);
/// ```
pub struct ReducerTest<R: Reducer> {
    reducer: R,
    environment: R::Environment,
    state: R::State,
}

impl<R: Reducer> ReducerTest<R> {
    /// Start from `state`.
    #[must_use]
    pub const fn new(reducer: R, environment: R::Environment, state: R::State) -> Self {
        Self {
            reducer,
            environment,
            state,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &R::State {
        &self.state
    }

    /// Consume the harness and return the state.
    pub fn into_state(self) -> R::State {
        self.state
    }

    /// Reduce `action` without running its effects.
    pub fn send(&mut self, action: R::Action) -> Reduction<R::Action> {
        Reduction {
            effects: self
                .reducer
                .reduce(&mut self.state, action, &self.environment),
        }
    }

    /// Reduce `action`, then run every effect and reduce what it feeds back,
    /// breadth-first, until no effect is left.
    ///
    /// Returns the fed-back actions in the order they were reduced.
    ///
    /// # Panics
    ///
    /// Panics if more than 64 actions are fed back, which means the reducer
    /// loops.
    pub async fn settle(&mut self, action: R::Action) -> Vec<R::Action>
    where
        R::Action: Clone,
    {
        let mut queue = VecDeque::from([action]);
        let mut fed_back = Vec::new();
        let mut first = true;

        while let Some(action) = queue.pop_front() {
            if !first {
                assert!(
                    fed_back.len() < MAX_FEEDBACK,
                    "reducer fed back more than {MAX_FEEDBACK} actions"
                );
                fed_back.push(action.clone());
            }
            first = false;

            queue.extend(self.send(action).feedback().await);
        }

        fed_back
    }
}

/// Effects returned by one reduction.
pub struct Reduction<A> {
    effects: SmallVec<[Effect<A>; 4]>,
}

impl<A> Reduction<A> {
    /// `true` when every effect is [`Effect::None`], including when there are none.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.effects.iter().all(Effect::is_none)
    }

    /// Number of [`Effect::Future`]s.
    #[must_use]
    pub fn future_count(&self) -> usize {
        self.effects
            .iter()
            .filter(|effect| matches!(effect, Effect::Future(_)))
            .count()
    }

    /// Run the futures and collect the actions they produce.
    pub async fn feedback(self) -> Vec<A> {
        crate::effects::resolve(self.effects).await
    }
}

impl<A> std::fmt::Debug for Reduction<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reduction")
            .field("effects", &self.effects.len())
            .field("futures", &self.future_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tasklist_core::smallvec;

    #[derive(Clone, Debug, Default)]
    struct Counter {
        count: u32,
    }

    #[derive(Clone, Debug, PartialEq)]
    enum CounterAction {
        Increment,
        /// Count up to `n` one fed-back step at a time.
        CountTo(u32),
        Spin,
    }

    struct CounterReducer;

    impl Reducer for CounterReducer {
        type State = Counter;
        type Action = CounterAction;
        type Environment = ();

        fn reduce(
            &self,
            state: &mut Counter,
            action: CounterAction,
            _env: &(),
        ) -> SmallVec<[Effect<CounterAction>; 4]> {
            match action {
                CounterAction::Increment => {
                    state.count += 1;
                    smallvec![Effect::None]
                },
                CounterAction::CountTo(n) if state.count < n => smallvec![
                    Effect::future(async { Some(CounterAction::Increment) }),
                    Effect::future(async move { Some(CounterAction::CountTo(n)) }),
                ],
                CounterAction::CountTo(_) => smallvec![Effect::None],
                CounterAction::Spin => {
                    smallvec![Effect::future(async { Some(CounterAction::Spin) })]
                },
            }
        }
    }

    #[test]
    fn send_reduces_without_running_effects() {
        let mut test = ReducerTest::new(CounterReducer, (), Counter::default());

        assert!(test.send(CounterAction::Increment).is_noop());
        let reduction = test.send(CounterAction::CountTo(3));

        assert_eq!(reduction.future_count(), 2);
        assert_eq!(test.state().count, 1);
    }

    #[tokio::test]
    async fn settle_feeds_back_in_order() {
        let mut test = ReducerTest::new(CounterReducer, (), Counter::default());

        let fed_back = test.settle(CounterAction::CountTo(2)).await;

        assert_eq!(
            fed_back,
            vec![
                CounterAction::Increment,
                CounterAction::CountTo(2),
                CounterAction::Increment,
                CounterAction::CountTo(2),
            ]
        );
        assert_eq!(test.into_state().count, 2);
    }

    #[tokio::test]
    #[should_panic(expected = "fed back more than")]
    async fn settle_stops_a_looping_reducer() {
        let mut test = ReducerTest::new(CounterReducer, (), Counter::default());
        test.settle(CounterAction::Spin).await;
    }
}
