//! # Taskpad Testing
//!
//! Testing utilities and helpers for the Taskpad state architecture.
//!
//! This crate provides:
//! - Deterministic implementations of Environment traits
//! - [`ReducerTest`], a Given-When-Then harness for reducers
//! - [`InMemoryStore`], a key-value store with failure and latency injection
//!
//! ## Example
//!
//! ```ignore
//! use taskpad_testing::{ReducerTest, SequentialIds, test_clock};
//!
//! ReducerTest::new(TodoReducer::new())
//!     .with_env(TodoEnvironment::new(Arc::new(test_clock()), Arc::new(SequentialIds::new())))
//!     .given_state(AppState::default())
//!     .when_action(TodoAction::Complete { id })
//!     .then_state(|state| assert!(state.todos[0].completed))
//!     .run();
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use taskpad_core::environment::{Clock, IdGenerator};


/// In-memory storage for fast, deterministic persistence tests
pub mod storage_mocks;

/// Deterministic implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, IdGenerator, NaiveDate, Utc};
    use std::sync::atomic::{AtomicU64, Ordering};
    use uuid::Uuid;

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, and reports the UTC calendar day as
    /// "today" so date-sensitive logic does not depend on the host time zone.
    ///
    /// # Example
    ///
    /// ```
    /// use taskpad_testing::mocks::FixedClock;
    /// use taskpad_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }

        /// Create a clock fixed at noon UTC on the given day
        #[must_use]
        pub fn on_day(day: NaiveDate) -> Self {
            Self::new(day.and_hms_opt(12, 0, 0).unwrap_or_default().and_utc())
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }

        fn today(&self) -> NaiveDate {
            self.time.date_naive()
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 12:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::on_day(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default())
    }

    /// Predictable identifiers: `00000000-0000-0000-0000-000000000001`, `...02`, ...
    #[derive(Debug, Default)]
    pub struct SequentialIds {
        next: AtomicU64,
    }

    impl SequentialIds {
        /// Start counting at 1
        #[must_use]
        pub const fn new() -> Self {
            Self {
                next: AtomicU64::new(0),
            }
        }

        /// The `n`th identifier this generator hands out (1-based)
        #[must_use]
        pub fn nth(n: u64) -> Uuid {
            Uuid::from_u128(u128::from(n))
        }
    }

    impl IdGenerator for SequentialIds {
        fn next_id(&self) -> Uuid {
            let n = self.next.fetch_add(1, Ordering::SeqCst) + 1;
            Self::nth(n)
        }
    }
}

// Re-export commonly used items
pub use mocks::{FixedClock, SequentialIds, test_clock};
pub use reducer_test::{ReducerTest, assertions};
pub use storage_mocks::InMemoryStore;
