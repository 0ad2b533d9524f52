//! # Taskpad Core
//!
//! Core traits and types for the Taskpad state architecture.
//!
//! This crate holds the pure half of the system. Nothing here performs I/O;
//! the runtime crate executes what the types in this crate describe.
//!
//! ## Core Concepts
//!
//! - **State**: Owned, cloneable domain state
//! - **Action**: Closed set of inputs a reducer understands
//! - **Reducer**: Function `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: Side effect descriptions (not execution)
//! - **Environment**: Injected dependencies via traits
//! - **Storage**: String key-value persistence abstraction
//!
//! ## Example
//!
//! ```ignore
//! use taskpad_core::*;
//!
//! #[derive(Clone, Debug, Default)]
//! struct CounterState {
//!     count: i64,
//! }
//!
//! #[derive(Clone, Debug)]
//! enum CounterAction {
//!     Increment,
//! }
//!
//! impl Reducer for CounterReducer {
//!     type State = CounterState;
//!     type Action = CounterAction;
//!     type Environment = ();
//!
//!     fn reduce(
//!         &self,
//!         state: &mut CounterState,
//!         action: CounterAction,
//!         _env: &(),
//!     ) -> SmallVec<[Effect<CounterAction>; 4]> {
//!         match action {
//!             CounterAction::Increment => state.count += 1,
//!         }
//!         SmallVec::new()
//!     }
//! }
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};
pub use smallvec::{SmallVec, smallvec};

/// String key-value storage abstraction
pub mod storage;

/// Reducer module - The core trait for business logic
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`.
/// They contain all business logic and are deterministic and testable.
pub mod reducer {
    use super::SmallVec;
    use super::effect::Effect;

    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The domain state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// This is a pure function that:
        /// 1. Validates the action against the current state
        /// 2. Updates state in place
        /// 3. Returns effect descriptions to be executed
        ///
        /// Implementations must be total: every action yields a next state,
        /// even if that state is identical to the current one.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects describe side effects to be performed by the runtime.
/// They are values (not execution) and are composable.
pub mod effect {
    use futures::future::BoxFuture;
    use std::time::Duration;

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are descriptions of what
    /// should happen, returned from reducers and executed by the Store runtime.
    /// Any action an effect produces is fed back into the store.
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects in parallel
        Parallel(Vec<Effect<Action>>),

        /// Run effects sequentially
        Sequential(Vec<Effect<Action>>),

        /// Delayed action
        Delay {
            /// How long to wait
            duration: Duration,
            /// Action to dispatch after delay
            action: Box<Action>,
        },

        /// Arbitrary async computation
        ///
        /// Returns `Option<Action>` - if Some, the action is fed back into the reducer
        Future(BoxFuture<'static, Option<Action>>),
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Parallel(effects) => {
                    f.debug_tuple("Effect::Parallel").field(effects).finish()
                },
                Effect::Sequential(effects) => {
                    f.debug_tuple("Effect::Sequential").field(effects).finish()
                },
                Effect::Delay { duration, action } => f
                    .debug_struct("Effect::Delay")
                    .field("duration", duration)
                    .field("action", action)
                    .finish(),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Combine effects to run in parallel
        #[must_use]
        pub const fn merge(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Parallel(effects)
        }

        /// Chain effects to run sequentially
        #[must_use]
        pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Sequential(effects)
        }

        /// Wrap an async block that may produce a follow-up action
        pub fn future<F>(fut: F) -> Effect<Action>
        where
            F: std::future::Future<Output = Option<Action>> + Send + 'static,
        {
            Effect::Future(Box::pin(fut))
        }

        /// Returns `true` for `Effect::None`
        #[must_use]
        pub const fn is_none(&self) -> bool {
            matches!(self, Effect::None)
        }
    }
}

/// Environment module - Dependency injection traits
///
/// All nondeterministic inputs (time, identifiers) are abstracted behind
/// traits and injected via the Environment parameter, so reducers stay pure.
pub mod environment {
    use chrono::{DateTime, Local, NaiveDate, Utc};
    use uuid::Uuid;

    /// Clock trait - abstracts time operations for testability
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;

        /// Current calendar day in the local time zone
        fn today(&self) -> NaiveDate {
            self.now().with_timezone(&Local).date_naive()
        }
    }

    /// Production clock backed by the system time
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }

    /// Source of fresh identifiers
    pub trait IdGenerator: Send + Sync {
        /// Produce an identifier not returned before by this generator
        fn next_id(&self) -> Uuid;
    }

    /// Production generator producing random (v4) UUIDs
    #[derive(Debug, Clone, Copy, Default)]
    pub struct RandomIds;

    impl IdGenerator for RandomIds {
        fn next_id(&self) -> Uuid {
            Uuid::new_v4()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::effect::Effect;
    use super::environment::{Clock, IdGenerator, RandomIds, SystemClock};

    #[test]
    fn effect_debug_hides_future() {
        let effect: Effect<u8> = Effect::future(async { Some(1) });
        assert_eq!(format!("{effect:?}"), "Effect::Future(<future>)");
    }

    #[test]
    fn merge_and_chain_wrap_effects() {
        let merged: Effect<u8> = Effect::merge(vec![Effect::None, Effect::None]);
        assert!(matches!(merged, Effect::Parallel(ref e) if e.len() == 2));

        let chained: Effect<u8> = Effect::chain(vec![Effect::None]);
        assert!(matches!(chained, Effect::Sequential(ref e) if e.len() == 1));
        assert!(Effect::<u8>::None.is_none());
    }

    #[test]
    fn future_effect_yields_its_action() {
        let effect: Effect<u8> = Effect::future(async { Some(7) });
        let Effect::Future(fut) = effect else {
            unreachable!("constructed as a future effect");
        };
        assert_eq!(tokio_test::block_on(fut), Some(7));
    }

    #[test]
    fn random_ids_are_distinct() {
        let ids = RandomIds;
        assert_ne!(ids.next_id(), ids.next_id());
    }

    #[test]
    fn system_clock_today_is_consistent_with_now() {
        let clock = SystemClock;
        let today = clock.today();
        let now_local = clock.now().with_timezone(&chrono::Local).date_naive();
        // A day boundary between the two calls is the only way these differ
        assert!((now_local - today).num_days().abs() <= 1);
    }
}
