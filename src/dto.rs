use crate::domain;
use chrono::NaiveDate;
use derive_more::Display;
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

/// Form body for registering a new account. The Display impl deliberately
/// omits the password so the DTO is safe to log.
#[derive(Deserialize, Display, Validate)]
#[display("registration for {username}")]
#[cfg_attr(test, derive(Serialize))]
pub struct RegisterForm {
    #[validate(length(min = 1, max = 50))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Form body for logging in
#[derive(Deserialize)]
#[cfg_attr(test, derive(Serialize))]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Form body for creating an item. A blank `due_date` field arrives as an
/// empty string and deserializes to None.
#[derive(Deserialize, Validate)]
#[cfg_attr(test, derive(Serialize))]
pub struct NewItemForm {
    #[validate(length(min = 1))]
    pub content: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub due_date: Option<NaiveDate>,
    pub list: String,
}

/// Form body for updating an item's content
#[derive(Deserialize, Validate)]
#[cfg_attr(test, derive(Serialize))]
pub struct EditItemForm {
    #[validate(length(min = 1))]
    pub content: String,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref() {
        None | Some("") => Ok(None),
        Some(text) => text
            .parse::<NaiveDate>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// A single item as rendered in views
#[derive(Serialize)]
#[cfg_attr(test, derive(Deserialize, PartialEq, Eq, Debug))]
pub struct TodoItemView {
    pub id: i32,
    pub content: String,
    pub due_date: Option<NaiveDate>,
}

impl From<domain::task::TodoItem> for TodoItemView {
    fn from(value: domain::task::TodoItem) -> Self {
        TodoItemView {
            id: value.id,
            content: value.content,
            due_date: value.due_date,
        }
    }
}

/// The items sharing one list title on the home view
#[derive(Serialize)]
#[cfg_attr(test, derive(Deserialize, PartialEq, Eq, Debug))]
pub struct TaskGroupView {
    pub list_title: String,
    pub items: Vec<TodoItemView>,
}

impl From<domain::task::TaskGroup> for TaskGroupView {
    fn from(value: domain::task::TaskGroup) -> Self {
        TaskGroupView {
            list_title: value.list_title,
            items: value.items.into_iter().map(TodoItemView::from).collect(),
        }
    }
}

/// Home view: the acting user's items grouped by list title
#[derive(Serialize)]
#[cfg_attr(test, derive(Deserialize, Debug))]
pub struct IndexView {
    pub flash: Option<String>,
    pub username: String,
    pub groups: Vec<TaskGroupView>,
}

/// Create view: the titles available in the list picker
#[derive(Serialize)]
#[cfg_attr(test, derive(Deserialize, Debug))]
pub struct CreateView {
    pub flash: Option<String>,
    pub list_titles: Vec<String>,
}

/// Edit view: the item being edited
#[derive(Serialize)]
#[cfg_attr(test, derive(Deserialize, Debug))]
pub struct EditView {
    pub flash: Option<String>,
    pub task: TodoItemView,
}

/// Login and registration pages carry nothing but the flash notice
#[derive(Serialize)]
#[cfg_attr(test, derive(Deserialize, Debug))]
pub struct AuthView {
    pub flash: Option<String>,
}
