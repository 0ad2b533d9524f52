//! Property tests for the reducer, the filters and persistence.

#![allow(clippy::unwrap_used)] // Tests can unwrap

use chrono::NaiveDate;
use proptest::prelude::*;
use std::sync::Arc;
use taskpad::{
    AppState, Color, DueDate, FilterMode, NewTodo, TodoAction, TodoEnvironment, TodoId, TodoItem,
    TodoPersistence, TodoReducer, filter_todos,
};
use taskpad_core::reducer::Reducer;
use taskpad_testing::{InMemoryStore, SequentialIds, test_clock};
use uuid::Uuid;

fn env() -> TodoEnvironment {
    TodoEnvironment::new(Arc::new(test_clock()), Arc::new(SequentialIds::new()))
}

fn reduce(mut state: AppState, action: TodoAction) -> AppState {
    let effects = TodoReducer::new().reduce(&mut state, action, &env());
    assert!(effects.is_empty());
    state
}

fn arb_color() -> impl Strategy<Value = Color> {
    prop::sample::select(Color::PALETTE.to_vec())
}

fn arb_date() -> impl Strategy<Value = Option<DueDate>> {
    prop::option::of((1970i32..2100, 1u32..=12, 1u32..=28).prop_map(|(y, m, d)| {
        DueDate::new(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }))
}

fn arb_new_todo() -> impl Strategy<Value = NewTodo> {
    ("\\PC{0,20}", "\\PC{0,40}", arb_date(), arb_color()).prop_map(
        |(title, description, date, color)| {
            let mut todo = NewTodo::new(title, description).with_color(color);
            todo.date = date;
            todo
        },
    )
}

/// Lists with distinct ids well clear of the ones `SequentialIds` hands out
fn arb_todos() -> impl Strategy<Value = Vec<TodoItem>> {
    prop::collection::vec((arb_new_todo(), any::<bool>()), 0..12).prop_map(|entries| {
        entries
            .into_iter()
            .enumerate()
            .map(|(i, (todo, completed))| {
                let id = TodoId::from_uuid(Uuid::from_u128(1_000 + i as u128));
                TodoItem {
                    completed,
                    ..todo.into_item(id)
                }
            })
            .collect()
    })
}

/// A non-empty list and the index of one of its items
fn arb_todos_with_index() -> impl Strategy<Value = (Vec<TodoItem>, usize)> {
    arb_todos()
        .prop_filter("needs an item", |todos| !todos.is_empty())
        .prop_flat_map(|todos| {
            let len = todos.len();
            (Just(todos), 0..len)
        })
}

proptest! {
    #[test]
    fn add_appends_without_touching_others(todos in arb_todos(), todo in arb_new_todo()) {
        let before = AppState::with_todos(todos.clone());
        let after = reduce(before, TodoAction::Add { todo: todo.clone() });

        prop_assert_eq!(after.todos.len(), todos.len() + 1);
        prop_assert_eq!(&after.todos[..todos.len()], &todos[..]);
        let added = after.todos.last().unwrap();
        prop_assert_eq!(added, &todo.into_item(TodoId::from_uuid(SequentialIds::nth(1))));
    }

    #[test]
    fn complete_toggles_exactly_one_item((todos, index) in arb_todos_with_index()) {
        let id = todos[index].id;
        let before = AppState::with_todos(todos.clone());
        let after = reduce(before.clone(), TodoAction::Complete { id });

        prop_assert_eq!(after.todos.len(), todos.len());
        for (i, (old, new)) in todos.iter().zip(&after.todos).enumerate() {
            if i == index {
                prop_assert_eq!(new.completed, !old.completed);
                prop_assert_eq!(&TodoItem { completed: old.completed, ..new.clone() }, old);
            } else {
                prop_assert_eq!(new, old);
            }
        }

        let twice = reduce(after, TodoAction::Complete { id });
        prop_assert_eq!(twice, before);
    }

    #[test]
    fn remove_drops_exactly_that_id((todos, index) in arb_todos_with_index()) {
        let id = todos[index].id;
        let after = reduce(AppState::with_todos(todos.clone()), TodoAction::Remove { id });

        prop_assert_eq!(after.todos.len(), todos.len() - 1);
        prop_assert!(after.todos.iter().all(|t| t.id != id));
    }

    #[test]
    fn remove_unknown_is_identity(todos in arb_todos()) {
        let before = AppState::with_todos(todos);
        let unknown = TodoId::from_uuid(Uuid::from_u128(1));
        prop_assert_eq!(reduce(before.clone(), TodoAction::Remove { id: unknown }), before);
    }

    #[test]
    fn all_is_identity_and_modes_partition(todos in arb_todos(), color in prop::option::of(arb_color())) {
        let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();

        let all: Vec<TodoItem> = filter_todos(&todos, FilterMode::All, color, today)
            .into_iter()
            .cloned()
            .collect();
        prop_assert_eq!(&all, &todos);

        let active = filter_todos(&todos, FilterMode::InProgress, color, today);
        prop_assert!(filter_todos(active, FilterMode::Completed, color, today).is_empty());
    }

    #[test]
    fn save_then_load_round_trips(todos in arb_todos()) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        let loaded = runtime.block_on(async {
            let persistence = TodoPersistence::new(Arc::new(InMemoryStore::new()), "todoItems");
            persistence.save(&todos).await.unwrap();
            persistence.load().await
        });

        prop_assert_eq!(loaded, todos);
    }
}
