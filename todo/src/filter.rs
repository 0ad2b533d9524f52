//! Visible-list filtering.
//!
//! Filtering is a pure view over the todo list: it never changes state and
//! keeps the relative order of the items it selects.

use crate::types::{Color, TodoItem};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Which subset of todos is shown
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterMode {
    /// Every todo
    #[default]
    All,
    /// Todos not yet completed
    InProgress,
    /// Completed todos
    Completed,
    /// Todos whose date lies before today
    Overdue,
    /// Todos tagged with the selected color
    ByColor,
}

impl FilterMode {
    /// Modes in menu order
    pub const MODES: [Self; 5] = [
        Self::All,
        Self::InProgress,
        Self::Completed,
        Self::Overdue,
        Self::ByColor,
    ];

    /// Menu label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::InProgress => "Active",
            Self::Completed => "Completed",
            Self::Overdue => "Overdue",
            Self::ByColor => "By Color",
        }
    }

    /// Mode for a menu label; anything unrecognized shows everything
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        Self::MODES
            .into_iter()
            .find(|mode| mode.label() == label)
            .unwrap_or_default()
    }

    fn matches(self, item: &TodoItem, selected_color: Option<Color>, today: NaiveDate) -> bool {
        match self {
            Self::All => true,
            Self::InProgress => !item.completed,
            Self::Completed => item.completed,
            Self::Overdue => item.is_overdue(today),
            Self::ByColor => selected_color.is_some_and(|color| item.color == color),
        }
    }
}

/// Items matching `mode`, in list order.
///
/// `selected_color` only matters for [`FilterMode::ByColor`]; without one that
/// mode selects nothing. `today` only matters for [`FilterMode::Overdue`].
///
/// Accepts anything that yields item references, so filters compose:
///
/// ```
/// use taskpad::filter::{FilterMode, filter_todos};
/// # let items: Vec<taskpad::TodoItem> = Vec::new();
/// # let today = chrono::NaiveDate::MIN;
/// let active = filter_todos(&items, FilterMode::InProgress, None, today);
/// let none = filter_todos(active, FilterMode::Completed, None, today);
/// assert!(none.is_empty());
/// ```
pub fn filter_todos<'a, I>(
    items: I,
    mode: FilterMode,
    selected_color: Option<Color>,
    today: NaiveDate,
) -> Vec<&'a TodoItem>
where
    I: IntoIterator<Item = &'a TodoItem>,
{
    items
        .into_iter()
        .filter(|item| mode.matches(item, selected_color, today))
        .collect()
}

/// A filter mode together with the color picked for [`FilterMode::ByColor`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    /// Active mode
    pub mode: FilterMode,
    /// Color selected in the color menu
    pub color: Option<Color>,
}

impl Filter {
    /// Filter with the given mode and no color
    #[must_use]
    pub const fn new(mode: FilterMode) -> Self {
        Self { mode, color: None }
    }

    /// Show everything
    #[must_use]
    pub const fn all() -> Self {
        Self::new(FilterMode::All)
    }

    /// Show todos tagged `color`
    #[must_use]
    pub const fn by_color(color: Color) -> Self {
        Self {
            mode: FilterMode::ByColor,
            color: Some(color),
        }
    }

    /// Whether `item` is visible under this filter
    #[must_use]
    pub fn matches(&self, item: &TodoItem, today: NaiveDate) -> bool {
        self.mode.matches(item, self.color, today)
    }

    /// Visible items, in order
    #[must_use]
    pub fn apply<'a>(&self, items: &'a [TodoItem], today: NaiveDate) -> Vec<&'a TodoItem> {
        filter_todos(items, self.mode, self.color, today)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can unwrap
mod tests {
    use super::*;
    use crate::types::{DueDate, NewTodo, TodoId};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    fn todo(title: &str, color: Color, date: Option<&str>, completed: bool) -> TodoItem {
        let mut item = NewTodo::new(title, "").with_color(color).into_item(TodoId::new());
        item.date = date.map(|d| d.parse::<DueDate>().unwrap());
        item.completed = completed;
        item
    }

    fn titles(items: &[&TodoItem]) -> Vec<String> {
        items.iter().map(|t| t.title.clone()).collect()
    }

    fn sample() -> Vec<TodoItem> {
        vec![
            todo("past", Color::Red, Some("01-01-2020"), false),
            todo("future", Color::Blue, Some("01-01-2099"), true),
            todo("undated", Color::Blue, None, false),
            todo("today", Color::Green, Some("01-01-2025"), false),
        ]
    }

    #[test]
    fn all_is_identity() {
        let items = sample();
        let visible = filter_todos(&items, FilterMode::All, None, today());
        assert_eq!(visible.len(), items.len());
        assert!(visible.iter().zip(&items).all(|(a, b)| std::ptr::eq(*a, b)));
    }

    #[test]
    fn in_progress_and_completed_partition() {
        let items = sample();
        let active = filter_todos(&items, FilterMode::InProgress, None, today());
        let done = filter_todos(&items, FilterMode::Completed, None, today());

        assert_eq!(titles(&active), ["past", "undated", "today"]);
        assert_eq!(titles(&done), ["future"]);
        assert!(filter_todos(active, FilterMode::Completed, None, today()).is_empty());
    }

    #[test]
    fn overdue_is_strictly_before_today() {
        let items = sample();
        let overdue = filter_todos(&items, FilterMode::Overdue, None, today());
        assert_eq!(titles(&overdue), ["past"]);
    }

    #[test]
    fn by_color_needs_a_selection() {
        let items = sample();
        assert!(filter_todos(&items, FilterMode::ByColor, None, today()).is_empty());

        let blue = Filter::by_color(Color::Blue).apply(&items, today());
        assert_eq!(titles(&blue), ["future", "undated"]);
    }

    #[test]
    fn labels_round_trip_and_unknown_falls_back() {
        for mode in FilterMode::MODES {
            assert_eq!(FilterMode::from_label(mode.label()), mode);
        }
        assert_eq!(FilterMode::from_label("Active"), FilterMode::InProgress);
        assert_eq!(FilterMode::from_label("Someday"), FilterMode::All);
    }

    #[test]
    fn filter_struct_matches_single_items() {
        let item = todo("x", Color::Yellow, None, false);
        assert!(Filter::all().matches(&item, today()));
        assert!(Filter::new(FilterMode::InProgress).matches(&item, today()));
        assert!(!Filter::by_color(Color::Red).matches(&item, today()));
    }
}
