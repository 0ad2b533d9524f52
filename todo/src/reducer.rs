//! Reducer logic for the todo list.
//!
//! Every action is applied synchronously to [`AppState`]; the reducer never
//! returns effects. Persistence observes the resulting state from outside
//! (see [`crate::persistence`]).

use crate::types::{AppState, TodoAction, TodoError, TodoId};
use std::sync::Arc;
use taskpad_core::{
    SmallVec,
    effect::Effect,
    environment::{Clock, IdGenerator, RandomIds, SystemClock},
    reducer::Reducer,
};

/// Environment dependencies for the todo reducer
#[derive(Clone)]
pub struct TodoEnvironment {
    /// Clock used to decide which todos are overdue
    pub clock: Arc<dyn Clock>,
    /// Source of ids for todos added without one
    pub ids: Arc<dyn IdGenerator>,
}

impl TodoEnvironment {
    /// Creates a new `TodoEnvironment`
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>) -> Self {
        Self { clock, ids }
    }

    /// System clock and random v4 ids
    #[must_use]
    pub fn production() -> Self {
        Self::new(Arc::new(SystemClock), Arc::new(RandomIds))
    }
}

impl std::fmt::Debug for TodoEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoEnvironment").finish_non_exhaustive()
    }
}

/// Reducer for the todo list
#[derive(Clone, Debug, Default)]
pub struct TodoReducer;

impl TodoReducer {
    /// Creates a new `TodoReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn not_found(state: &mut AppState, action: &'static str, id: TodoId) {
        tracing::warn!(%id, action, "Ignoring action for unknown todo");
        state.last_error = Some(TodoError::NotFound(id));
    }
}

impl Reducer for TodoReducer {
    type State = AppState;
    type Action = TodoAction;
    type Environment = TodoEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let name = action.name();

        match action {
            TodoAction::Add { todo } => {
                let id = todo
                    .id
                    .unwrap_or_else(|| TodoId::from_uuid(env.ids.next_id()));
                tracing::debug!(%id, "Adding todo");
                state.todos.push(todo.into_item(id));
                state.last_error = None;
            },
            TodoAction::Edit { todo } => match state.position(&todo.id) {
                Some(index) => {
                    tracing::debug!(id = %todo.id, "Editing todo");
                    state.todos[index] = todo;
                    state.last_error = None;
                },
                None => Self::not_found(state, name, todo.id),
            },
            TodoAction::Complete { id } => match state.position(&id) {
                Some(index) => {
                    state.todos[index].toggle_completed();
                    tracing::debug!(%id, completed = state.todos[index].completed, "Toggled todo");
                    state.last_error = None;
                },
                None => Self::not_found(state, name, id),
            },
            TodoAction::Remove { id } => {
                if let Some(index) = state.position(&id) {
                    tracing::debug!(%id, "Removing todo");
                    state.todos.remove(index);
                } else {
                    tracing::debug!(%id, "Remove of unknown todo is a no-op");
                }
            },
            TodoAction::SetItemToEdit { id } => {
                state.item_to_edit = id;
            },
        }

        SmallVec::new()
    }
}
