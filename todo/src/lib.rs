//! Taskpad: the state core of a mobile todo list.
//!
//! The list lives in an [`AppState`] that only the [`TodoReducer`] changes,
//! through the five [`TodoAction`]s. A [`TodoApp`] owns the store that runs
//! the reducer and persists every new list to a key-value store under one
//! key, so the app reopens with the todos it had.
//!
//! - [`types`]: items, colors, due dates and actions
//! - [`reducer`]: ADD / EDIT / COMPLETE / REMOVE / SET_ITEM_TO_EDIT
//! - [`filter`]: All, Active, Completed, Overdue and By Color views
//! - [`draft`]: the typed add/edit form
//! - [`persistence`]: load on start, latest-wins saves after every action
//! - [`app`]: the owned handle tying them together
//!
//! # Quick Start
//!
//! ```no_run
//! use taskpad::{Filter, FilterMode, NewTodo, TodoAction, TodoApp};
//! use taskpad_runtime::FileStore;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = FileStore::open("./taskpad-data").await?;
//! let app = TodoApp::open(Arc::new(storage), "todoItems").await;
//!
//! app.dispatch(TodoAction::Add {
//!     todo: NewTodo::new("Buy milk", "2%"),
//! })
//! .await?;
//!
//! let active = app.visible(&Filter::new(FilterMode::InProgress)).await;
//! println!("Active todos: {}", active.len());
//!
//! app.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod config;
pub mod draft;
pub mod filter;
pub mod persistence;
pub mod reducer;
pub mod types;

// Re-export commonly used types
pub use app::{AppError, TodoApp, TodoStore};
pub use config::{Config, ConfigError};
pub use draft::{DraftError, DraftField, TodoDraft};
pub use filter::{Filter, FilterMode, filter_todos};
pub use persistence::{DEFAULT_STORAGE_KEY, PersistenceError, TodoPersistence};
pub use reducer::{TodoEnvironment, TodoReducer};
pub use types::{
    AppState, Color, DueDate, NewTodo, PhotoSource, TodoAction, TodoError, TodoId, TodoItem,
};
