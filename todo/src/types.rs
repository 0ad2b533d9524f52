//! Domain types for the todo list.
//!
//! A todo list is an ordered sequence of items that can be added, edited,
//! completed and removed. The JSON shape of [`TodoItem`] is the persisted
//! record format: `id, title, description, date, color, photoSource, completed`.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for a todo item
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(Uuid);

impl TodoId {
    /// Creates a new random `TodoId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a `TodoId` from a UUID
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TodoId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Color tag from the fixed five-color palette
///
/// Serialized as the hex value the tag is drawn with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    /// `#D50000`
    #[default]
    #[serde(rename = "#D50000")]
    Red,
    /// `#0B8043`
    #[serde(rename = "#0B8043")]
    Green,
    /// `#F6BF26`
    #[serde(rename = "#F6BF26")]
    Yellow,
    /// `#8E44AD`
    #[serde(rename = "#8E44AD")]
    Purple,
    /// `#2980B9`
    #[serde(rename = "#2980B9")]
    Blue,
}

impl Color {
    /// The palette in picker order
    pub const PALETTE: [Self; 5] = [Self::Red, Self::Green, Self::Yellow, Self::Purple, Self::Blue];

    /// Hex value of the color
    #[must_use]
    pub const fn hex(self) -> &'static str {
        match self {
            Self::Red => "#D50000",
            Self::Green => "#0B8043",
            Self::Yellow => "#F6BF26",
            Self::Purple => "#8E44AD",
            Self::Blue => "#2980B9",
        }
    }

    /// Lowercase color name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Purple => "purple",
            Self::Blue => "blue",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Error parsing a [`Color`] from a name or hex value
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown color {0:?}")]
pub struct ColorParseError(String);

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::PALETTE
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s) || c.hex().eq_ignore_ascii_case(s))
            .ok_or_else(|| ColorParseError(s.to_string()))
    }
}

/// Due date of a todo, at day granularity
///
/// Text form is `DD-MM-YYYY`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DueDate(NaiveDate);

/// Error parsing a [`DueDate`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid due date {0:?}, expected DD-MM-YYYY")]
pub struct DateParseError(String);

impl DueDate {
    /// Text format of due dates
    pub const FORMAT: &'static str = "%d-%m-%Y";

    /// Wraps a calendar day
    #[must_use]
    pub const fn new(day: NaiveDate) -> Self {
        Self(day)
    }

    /// Builds a due date from day, month and year, if it exists
    #[must_use]
    pub fn from_dmy(day: u32, month: u32, year: i32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// The calendar day
    #[must_use]
    pub const fn day(self) -> NaiveDate {
        self.0
    }

    /// Whether this date lies strictly before `today`
    #[must_use]
    pub fn is_before(self, today: NaiveDate) -> bool {
        self.0 < today
    }
}

impl FromStr for DueDate {
    type Err = DateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), Self::FORMAT)
            .map(Self)
            .map_err(|_| DateParseError(s.to_string()))
    }
}

impl fmt::Display for DueDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(Self::FORMAT))
    }
}

impl Serialize for DueDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DueDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Optional due date where `null`, a missing field and `""` all mean "none"
mod optional_due_date {
    use super::DueDate;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[allow(clippy::ref_option)] // signature required by `serde(with)`
    pub fn serialize<S: Serializer>(date: &Option<DueDate>, serializer: S) -> Result<S::Ok, S::Error> {
        date.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<DueDate>, D::Error> {
        match Option::<String>::deserialize(deserializer)?.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => text.parse().map(Some).map_err(serde::de::Error::custom),
        }
    }
}

/// Reference to a locally picked image
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhotoSource {
    /// Location of the image on the device
    pub uri: String,
}

impl PhotoSource {
    /// Creates a photo reference
    #[must_use]
    pub fn new(uri: impl Into<String>) -> Self {
        Self { uri: uri.into() }
    }
}

/// A single todo item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    /// Unique identifier, fixed at creation
    pub id: TodoId,
    /// Short title
    pub title: String,
    /// Longer description
    pub description: String,
    /// Deadline, if any
    #[serde(default, with = "optional_due_date")]
    pub date: Option<DueDate>,
    /// Color tag
    #[serde(default)]
    pub color: Color,
    /// Attached photo, if any
    #[serde(default)]
    pub photo_source: Option<PhotoSource>,
    /// Whether the todo is done
    #[serde(default)]
    pub completed: bool,
}

impl TodoItem {
    /// Whether the item has a deadline strictly before `today`
    #[must_use]
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.date.is_some_and(|date| date.is_before(today))
    }

    /// Flip the completed flag
    pub const fn toggle_completed(&mut self) {
        self.completed = !self.completed;
    }
}

/// Payload of an ADD action: a todo that may not have an id yet
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTodo {
    /// Pre-assigned id; the reducer generates one when absent
    #[serde(default)]
    pub id: Option<TodoId>,
    /// Short title
    pub title: String,
    /// Longer description
    pub description: String,
    /// Deadline, if any
    #[serde(default, with = "optional_due_date")]
    pub date: Option<DueDate>,
    /// Color tag
    #[serde(default)]
    pub color: Color,
    /// Attached photo, if any
    #[serde(default)]
    pub photo_source: Option<PhotoSource>,
}

impl NewTodo {
    /// A red, undated todo without an id
    #[must_use]
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            description: description.into(),
            date: None,
            color: Color::default(),
            photo_source: None,
        }
    }

    /// Pre-assign the id
    #[must_use]
    pub const fn with_id(mut self, id: TodoId) -> Self {
        self.id = Some(id);
        self
    }

    /// Set the color tag
    #[must_use]
    pub const fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Set the deadline
    #[must_use]
    pub const fn with_date(mut self, date: DueDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Attach a photo
    #[must_use]
    pub fn with_photo(mut self, photo: PhotoSource) -> Self {
        self.photo_source = Some(photo);
        self
    }

    /// Turn into a stored, not yet completed item with the given id
    #[must_use]
    pub fn into_item(self, id: TodoId) -> TodoItem {
        TodoItem {
            id,
            title: self.title,
            description: self.description,
            date: self.date,
            color: self.color,
            photo_source: self.photo_source,
            completed: false,
        }
    }
}

/// Errors the reducer records for actions it could not apply
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TodoError {
    /// The action referenced an id that is not in the list
    #[error("Todo with ID {0} not found")]
    NotFound(TodoId),
}

/// State of the todo list
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppState {
    /// All todos in insertion order
    pub todos: Vec<TodoItem>,
    /// Id of the item whose edit form is open
    ///
    /// Only a reference: the item itself always lives in `todos`.
    pub item_to_edit: Option<TodoId>,
    /// Error from the last action that could not be applied
    pub last_error: Option<TodoError>,
}

impl AppState {
    /// Creates a new empty state
    #[must_use]
    pub const fn new() -> Self {
        Self {
            todos: Vec::new(),
            item_to_edit: None,
            last_error: None,
        }
    }

    /// Creates a state holding previously persisted todos
    #[must_use]
    pub const fn with_todos(todos: Vec<TodoItem>) -> Self {
        Self {
            todos,
            item_to_edit: None,
            last_error: None,
        }
    }

    /// Returns the number of todos
    #[must_use]
    pub fn count(&self) -> usize {
        self.todos.len()
    }

    /// Returns the number of completed todos
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.todos.iter().filter(|t| t.completed).count()
    }

    /// Position of the first todo with `id`
    #[must_use]
    pub fn position(&self, id: &TodoId) -> Option<usize> {
        self.todos.iter().position(|t| t.id == *id)
    }

    /// Returns a todo by ID
    #[must_use]
    pub fn get(&self, id: &TodoId) -> Option<&TodoItem> {
        self.todos.iter().find(|t| t.id == *id)
    }

    /// Checks if a todo exists
    #[must_use]
    pub fn exists(&self, id: &TodoId) -> bool {
        self.position(id).is_some()
    }

    /// The item whose edit form is open, if it still exists
    #[must_use]
    pub fn editing_item(&self) -> Option<&TodoItem> {
        self.item_to_edit.as_ref().and_then(|id| self.get(id))
    }
}

/// Actions accepted by the todo reducer
///
/// Serialized with a `type` tag (`ADD`, `EDIT`, `COMPLETE`, `REMOVE`,
/// `SET_ITEM_TO_EDIT`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TodoAction {
    /// Append a new todo
    Add {
        /// The todo to append
        todo: NewTodo,
    },

    /// Replace the todo with the same id, keeping its position
    Edit {
        /// The full replacement item
        todo: TodoItem,
    },

    /// Toggle the completed flag of a todo
    Complete {
        /// Todo to toggle
        id: TodoId,
    },

    /// Remove a todo
    Remove {
        /// Todo to remove
        id: TodoId,
    },

    /// Open (`Some`) or close (`None`) the edit form for a todo
    SetItemToEdit {
        /// Todo being edited
        id: Option<TodoId>,
    },
}

impl TodoAction {
    /// Short name used in logs
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::Edit { .. } => "edit",
            Self::Complete { .. } => "complete",
            Self::Remove { .. } => "remove",
            Self::SetItemToEdit { .. } => "set_item_to_edit",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can unwrap
mod tests {
    use super::*;

    fn item(id: TodoId) -> TodoItem {
        NewTodo::new("Buy milk", "2%").into_item(id)
    }

    #[test]
    fn todo_id_display() {
        let id = TodoId::from_uuid(Uuid::from_u128(1));
        assert_eq!(format!("{id}"), "00000000-0000-0000-0000-000000000001");
    }

    #[test]
    fn color_round_trips_through_hex() {
        let json = serde_json::to_string(&Color::Purple).unwrap();
        assert_eq!(json, "\"#8E44AD\"");
        assert_eq!(serde_json::from_str::<Color>(&json).unwrap(), Color::Purple);
        assert!(serde_json::from_str::<Color>("\"#000000\"").is_err());
    }

    #[test]
    fn color_parses_names_and_hex() {
        assert_eq!("green".parse::<Color>().unwrap(), Color::Green);
        assert_eq!("#2980b9".parse::<Color>().unwrap(), Color::Blue);
        assert!("orange".parse::<Color>().is_err());
        assert_eq!(Color::default(), Color::Red);
    }

    #[test]
    fn due_date_text_format() {
        let date: DueDate = "01-02-2020".parse().unwrap();
        assert_eq!(date.day(), NaiveDate::from_ymd_opt(2020, 2, 1).unwrap());
        assert_eq!(date.to_string(), "01-02-2020");
        assert!("2020-02-01".parse::<DueDate>().is_err());
        assert!("31-02-2020".parse::<DueDate>().is_err());
    }

    #[test]
    fn item_uses_camel_case_record_layout() {
        let id = TodoId::from_uuid(Uuid::from_u128(7));
        let mut todo = item(id);
        todo.date = DueDate::from_dmy(1, 1, 2020);
        todo.photo_source = Some(PhotoSource::new("file:///photo.jpg"));

        let value = serde_json::to_value(&todo).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": "00000000-0000-0000-0000-000000000007",
                "title": "Buy milk",
                "description": "2%",
                "date": "01-01-2020",
                "color": "#D50000",
                "photoSource": { "uri": "file:///photo.jpg" },
                "completed": false
            })
        );
    }

    #[test]
    fn empty_or_missing_date_means_no_deadline() {
        let with_empty = r##"{"id":"00000000-0000-0000-0000-000000000001","title":"a","description":"b","date":"","color":"#0B8043","photoSource":null,"completed":true}"##;
        let todo: TodoItem = serde_json::from_str(with_empty).unwrap();
        assert_eq!(todo.date, None);
        assert_eq!(todo.color, Color::Green);
        assert!(todo.completed);

        let minimal = r#"{"id":"00000000-0000-0000-0000-000000000001","title":"a","description":"b"}"#;
        let todo: TodoItem = serde_json::from_str(minimal).unwrap();
        assert_eq!(todo.date, None);
        assert_eq!(todo.color, Color::Red);
        assert!(!todo.completed);
    }

    #[test]
    fn overdue_is_strictly_before_today() {
        let today = NaiveDate::from_ymd_opt(2021, 6, 15).unwrap();
        let mut todo = item(TodoId::new());

        assert!(!todo.is_overdue(today));
        todo.date = DueDate::from_dmy(15, 6, 2021);
        assert!(!todo.is_overdue(today));
        todo.date = DueDate::from_dmy(14, 6, 2021);
        assert!(todo.is_overdue(today));
    }

    #[test]
    fn state_lookup_and_weak_edit_reference() {
        let id = TodoId::new();
        let mut state = AppState::with_todos(vec![item(id)]);
        assert!(state.exists(&id));
        assert_eq!(state.editing_item(), None);

        state.item_to_edit = Some(id);
        assert_eq!(state.editing_item().map(|t| t.id), Some(id));

        state.todos.clear();
        assert_eq!(state.editing_item(), None);
    }

    #[test]
    fn actions_are_tagged_by_type() {
        let id = TodoId::from_uuid(Uuid::from_u128(3));
        let json = serde_json::to_value(TodoAction::Complete { id }).unwrap();
        assert_eq!(json["type"], "COMPLETE");

        let json = serde_json::to_value(TodoAction::SetItemToEdit { id: None }).unwrap();
        assert_eq!(json["type"], "SET_ITEM_TO_EDIT");
        assert_eq!(TodoAction::SetItemToEdit { id: None }.name(), "set_item_to_edit");
    }
}
