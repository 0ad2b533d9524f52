//! Typed add/edit form.
//!
//! A [`TodoDraft`] holds what the user has typed so far. Submitting a draft
//! validates it and produces the ADD or EDIT action to dispatch.

use crate::types::{Color, DueDate, NewTodo, PhotoSource, TodoAction, TodoId, TodoItem};
use std::fmt;
use thiserror::Error;

/// A required form field
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DraftField {
    /// Title input
    Title,
    /// Description input
    Description,
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Title => "title",
            Self::Description => "description",
        })
    }
}

/// Required fields left blank
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Missing required fields: {}", list(.invalid))]
pub struct DraftError {
    /// Fields that failed validation, in form order
    pub invalid: Vec<DraftField>,
}

fn list(fields: &[DraftField]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Contents of the add/edit form
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TodoDraft {
    /// Title input
    pub title: String,
    /// Description input
    pub description: String,
    /// Picked date
    pub date: Option<DueDate>,
    /// Picked color, red until changed
    pub color: Color,
    /// Attached photo
    pub photo_source: Option<PhotoSource>,
}

impl TodoDraft {
    /// An empty form
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A form prefilled from an existing item
    #[must_use]
    pub fn from_item(item: &TodoItem) -> Self {
        Self {
            title: item.title.clone(),
            description: item.description.clone(),
            date: item.date,
            color: item.color,
            photo_source: item.photo_source.clone(),
        }
    }

    /// Set the title
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the description
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the date
    #[must_use]
    pub const fn date(mut self, date: Option<DueDate>) -> Self {
        self.date = date;
        self
    }

    /// Set the color
    #[must_use]
    pub const fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Attach or detach a photo
    #[must_use]
    pub fn photo(mut self, photo: Option<PhotoSource>) -> Self {
        self.photo_source = photo;
        self
    }

    /// Check that title and description are not blank
    ///
    /// # Errors
    ///
    /// Returns [`DraftError`] listing every blank required field.
    pub fn validate(&self) -> Result<(), DraftError> {
        let invalid: Vec<_> = [
            (DraftField::Title, &self.title),
            (DraftField::Description, &self.description),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect();

        if invalid.is_empty() {
            Ok(())
        } else {
            Err(DraftError { invalid })
        }
    }

    /// Validate and build the action for this draft.
    ///
    /// With `editing` set the draft replaces that item, otherwise it is
    /// added. Either way the resulting item is not completed.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError`] if a required field is blank.
    pub fn submit(self, editing: Option<TodoId>) -> Result<TodoAction, DraftError> {
        self.validate()?;

        let todo = NewTodo {
            id: None,
            title: self.title,
            description: self.description,
            date: self.date,
            color: self.color,
            photo_source: self.photo_source,
        };

        Ok(match editing {
            Some(id) => TodoAction::Edit {
                todo: todo.into_item(id),
            },
            None => TodoAction::Add { todo },
        })
    }
}
