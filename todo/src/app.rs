//! The application handle.
//!
//! [`TodoApp`] owns the store, its environment and the persistence observer.
//! The UI layer keeps one `TodoApp` for the lifetime of the app and talks to
//! the todo list only through it.

use crate::config::{Config, ConfigError};
use crate::draft::{DraftError, TodoDraft};
use crate::filter::Filter;
use crate::persistence::{PersistenceError, TodoPersistence};
use crate::reducer::{TodoEnvironment, TodoReducer};
use crate::types::{AppState, TodoAction, TodoError, TodoId, TodoItem};
use std::sync::Arc;
use std::time::Duration;
use taskpad_core::environment::Clock;
use taskpad_core::storage::{KeyValueStore, StorageError};
use taskpad_runtime::{FileStore, StateObserver, Store, StoreError};
use thiserror::Error;

/// Store specialized to the todo list
pub type TodoStore = Store<AppState, TodoAction, TodoEnvironment, TodoReducer>;

/// How long [`TodoApp::close`] waits for in-flight effects
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors surfaced by [`TodoApp`]
#[derive(Error, Debug)]
pub enum AppError {
    /// The store rejected the action
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A submitted form was incomplete
    #[error(transparent)]
    Draft(#[from] DraftError),

    /// Flushing or closing persistence failed
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// The storage backend could not be opened
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Invalid configuration
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Explicitly owned todo list: state, reducer and persistence
pub struct TodoApp {
    store: TodoStore,
    persistence: Arc<TodoPersistence>,
    clock: Arc<dyn Clock>,
}

impl TodoApp {
    /// Load the list stored under `key` and start the app with a system
    /// clock and random ids.
    pub async fn open(storage: Arc<dyn KeyValueStore>, key: &str) -> Self {
        Self::open_with_env(storage, key, TodoEnvironment::production()).await
    }

    /// Load the list stored under `key` and start the app with `environment`.
    ///
    /// A missing or unreadable record starts an empty list.
    #[tracing::instrument(skip(storage, environment))]
    pub async fn open_with_env(
        storage: Arc<dyn KeyValueStore>,
        key: &str,
        environment: TodoEnvironment,
    ) -> Self {
        let persistence = Arc::new(TodoPersistence::new(storage, key));
        let todos = persistence.load().await;
        let clock = Arc::clone(&environment.clock);

        let observer: Arc<dyn StateObserver<AppState>> = persistence.clone();
        let store = Store::new(AppState::with_todos(todos), TodoReducer::new(), environment)
            .with_observer(observer);

        Self {
            store,
            persistence,
            clock,
        }
    }

    /// Open the file-backed store described by `config`
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] for an invalid storage key and
    /// [`AppError::Storage`] if the data directory cannot be created.
    pub async fn from_config(config: &Config) -> Result<Self, AppError> {
        config.validate()?;
        let storage = FileStore::open(config.data_dir.clone()).await?;
        Ok(Self::open(Arc::new(storage), &config.storage_key).await)
    }

    /// Apply `action` and queue the resulting list for saving
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] once the app is closing.
    pub async fn dispatch(&self, action: TodoAction) -> Result<(), AppError> {
        self.store.send(action).await?;
        Ok(())
    }

    /// Snapshot of the whole state
    pub async fn state(&self) -> AppState {
        self.store.state(AppState::clone).await
    }

    /// All todos in order
    pub async fn todos(&self) -> Vec<TodoItem> {
        self.store.state(|s| s.todos.clone()).await
    }

    /// The item whose edit form is open, if it still exists
    pub async fn editing_item(&self) -> Option<TodoItem> {
        self.store.state(|s| s.editing_item().cloned()).await
    }

    /// Error from the last action that could not be applied
    pub async fn last_error(&self) -> Option<TodoError> {
        self.store.state(|s| s.last_error.clone()).await
    }

    /// Todos visible under `filter`, judged against today's date
    pub async fn visible(&self, filter: &Filter) -> Vec<TodoItem> {
        let today = self.clock.today();
        self.store
            .state(|s| filter.apply(&s.todos, today).into_iter().cloned().collect())
            .await
    }

    /// Open the edit form for `id` and return it prefilled
    ///
    /// Returns `None`, and leaves the form closed, if no such todo exists.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] once the app is closing.
    pub async fn start_editing(&self, id: TodoId) -> Result<Option<TodoDraft>, AppError> {
        self.dispatch(TodoAction::SetItemToEdit { id: Some(id) }).await?;
        let draft = self.editing_item().await.as_ref().map(TodoDraft::from_item);
        if draft.is_none() {
            tracing::debug!(%id, "No todo to edit");
            self.cancel_editing().await?;
        }
        Ok(draft)
    }

    /// Close the edit form without saving
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] once the app is closing.
    pub async fn cancel_editing(&self) -> Result<(), AppError> {
        self.dispatch(TodoAction::SetItemToEdit { id: None }).await
    }

    /// Submit the form: edit the open item, or add a new one.
    ///
    /// An edit reference whose item has since been removed counts as no
    /// reference, so the draft is added. Closes the edit form afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Draft`] if a required field is blank; nothing is
    /// dispatched in that case.
    pub async fn submit_draft(&self, draft: TodoDraft) -> Result<(), AppError> {
        let (editing, dangling) = self
            .store
            .state(|s| {
                let editing = s.editing_item().map(|t| t.id);
                (editing, editing.is_none() && s.item_to_edit.is_some())
            })
            .await;
        let action = draft.submit(editing)?;
        self.dispatch(action).await?;
        if editing.is_some() || dangling {
            self.cancel_editing().await?;
        }
        Ok(())
    }

    /// Wait until every state change so far has reached storage
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Persistence`] if the writer stopped.
    pub async fn flush(&self) -> Result<(), AppError> {
        Ok(self.persistence.flush().await?)
    }

    /// Stop accepting actions and write the final state
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] if effects did not finish in time and
    /// [`AppError::Persistence`] if the final write could not settle.
    #[tracing::instrument(skip(self))]
    pub async fn close(&self) -> Result<(), AppError> {
        self.store.shutdown(SHUTDOWN_TIMEOUT).await?;
        self.persistence.close().await?;
        tracing::info!("Todo app closed");
        Ok(())
    }
}

impl std::fmt::Debug for TodoApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoApp")
            .field("persistence", &self.persistence)
            .finish_non_exhaustive()
    }
}
