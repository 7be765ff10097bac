use crate::domain::list::driven_ports::ListReader;
use crate::external_connections::ExternalConnectivity;
use anyhow::Context;
use chrono::NaiveDate;

/// A single to-do item owned by a user
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct TodoItem {
    pub id: i32,
    pub content: String,
    pub due_date: Option<NaiveDate>,
}

/// An item paired with the title of the list it lives in, as read back
/// from storage
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct ListedItem {
    pub list_title: String,
    pub item: TodoItem,
}

/// The items sharing one list title on the home view
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct TaskGroup {
    pub list_title: String,
    pub items: Vec<TodoItem>,
}

/// Data needed to create an item. The list is addressed by title because
/// that is what the create form submits.
#[cfg_attr(test, derive(Clone))]
pub struct NewItem {
    pub content: String,
    pub due_date: Option<NaiveDate>,
    pub list_title: String,
}

/// Collapses a run of items into groups by merging adjacent rows that share a
/// list title. The input must already be sorted by title, which the reader
/// guarantees; unsorted input would fragment a title into several groups.
pub fn group_listed_items(items: Vec<ListedItem>) -> Vec<TaskGroup> {
    let mut groups: Vec<TaskGroup> = Vec::new();
    for listed_item in items {
        match groups.last_mut() {
            Some(group) if group.list_title == listed_item.list_title => {
                group.items.push(listed_item.item);
            }
            _ => groups.push(TaskGroup {
                list_title: listed_item.list_title,
                items: vec![listed_item.item],
            }),
        }
    }

    groups
}

pub mod driven_ports {
    use super::*;

    pub trait TaskReader {
        /// Every item the user owns. Returned rows MUST be sorted by list
        /// title so [group_listed_items] can merge them in one pass.
        async fn items_for_user_sorted(
            &self,
            user_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Vec<ListedItem>, anyhow::Error>;
        /// One item by id, only if the given user owns it
        async fn user_item_by_id(
            &self,
            item_id: i32,
            user_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<TodoItem>, anyhow::Error>;
    }

    pub trait TaskWriter {
        async fn create_item(
            &self,
            user_id: i32,
            list_id: i32,
            item: &NewItem,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<i32, anyhow::Error>;
        /// Rewrites an item's content if the user owns it, returning the
        /// number of rows touched
        async fn update_item_content(
            &self,
            item_id: i32,
            user_id: i32,
            new_content: &str,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<u64, anyhow::Error>;
        async fn delete_item(
            &self,
            item_id: i32,
            user_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<(), anyhow::Error>;
    }
}

pub mod driving_ports {
    use super::*;
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum CreateItemError {
        #[error("no list is titled \"{0}\"")]
        UnknownList(String),
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }

    #[derive(Debug, Error)]
    pub enum UpdateItemError {
        /// The row either does not exist or belongs to someone else. The two
        /// are indistinguishable on purpose so the response cannot leak
        /// whether another user's item id exists.
        #[error("the item does not exist or is not owned by the acting user")]
        NotFoundOrNotOwned,
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }


    pub trait TaskPort {
        async fn grouped_items_for_user(
            &self,
            user_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
            t_reader: &impl driven_ports::TaskReader,
        ) -> Result<Vec<TaskGroup>, anyhow::Error>;
        async fn item_for_edit(
            &self,
            item_id: i32,
            user_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
            t_reader: &impl driven_ports::TaskReader,
        ) -> Result<Option<TodoItem>, anyhow::Error>;
        async fn create_item(
            &self,
            user_id: i32,
            item: &NewItem,
            ext_cxn: &mut impl ExternalConnectivity,
            l_reader: &impl ListReader,
            t_writer: &impl driven_ports::TaskWriter,
        ) -> Result<i32, CreateItemError>;
        async fn update_item_content(
            &self,
            item_id: i32,
            user_id: i32,
            new_content: &str,
            ext_cxn: &mut impl ExternalConnectivity,
            t_writer: &impl driven_ports::TaskWriter,
        ) -> Result<(), UpdateItemError>;
        async fn delete_item(
            &self,
            item_id: i32,
            user_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
            t_writer: &impl driven_ports::TaskWriter,
        ) -> Result<(), anyhow::Error>;
    }
}

pub struct TaskService {}

impl driving_ports::TaskPort for TaskService {
    async fn grouped_items_for_user(
        &self,
        user_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
        t_reader: &impl driven_ports::TaskReader,
    ) -> Result<Vec<TaskGroup>, anyhow::Error> {
        let items = t_reader
            .items_for_user_sorted(user_id, &mut *ext_cxn)
            .await
            .context("listing a user's items")?;

        Ok(group_listed_items(items))
    }

    async fn item_for_edit(
        &self,
        item_id: i32,
        user_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
        t_reader: &impl driven_ports::TaskReader,
    ) -> Result<Option<TodoItem>, anyhow::Error> {
        t_reader
            .user_item_by_id(item_id, user_id, &mut *ext_cxn)
            .await
            .context("fetching an item for editing")
    }

    async fn create_item(
        &self,
        user_id: i32,
        item: &NewItem,
        ext_cxn: &mut impl ExternalConnectivity,
        l_reader: &impl ListReader,
        t_writer: &impl driven_ports::TaskWriter,
    ) -> Result<i32, driving_ports::CreateItemError> {
        let list_lookup = l_reader
            .id_by_title(&item.list_title, &mut *ext_cxn)
            .await
            .context("resolving a list title at item creation")?;
        let Some(list_id) = list_lookup else {
            return Err(driving_ports::CreateItemError::UnknownList(
                item.list_title.clone(),
            ));
        };

        let new_id = t_writer
            .create_item(user_id, list_id, item, &mut *ext_cxn)
            .await
            .context("persisting a new item")?;

        Ok(new_id)
    }

    async fn update_item_content(
        &self,
        item_id: i32,
        user_id: i32,
        new_content: &str,
        ext_cxn: &mut impl ExternalConnectivity,
        t_writer: &impl driven_ports::TaskWriter,
    ) -> Result<(), driving_ports::UpdateItemError> {
        let rows_touched = t_writer
            .update_item_content(item_id, user_id, new_content, &mut *ext_cxn)
            .await
            .context("updating an item's content")?;
        if rows_touched == 0 {
            return Err(driving_ports::UpdateItemError::NotFoundOrNotOwned);
        }

        Ok(())
    }

    async fn delete_item(
        &self,
        item_id: i32,
        user_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
        t_writer: &impl driven_ports::TaskWriter,
    ) -> Result<(), anyhow::Error> {
        // Deleting an item that is gone or never existed is a silent no-op,
        // which makes the operation idempotent.
        t_writer
            .delete_item(item_id, user_id, &mut *ext_cxn)
            .await
            .context("deleting an item")
    }
}
