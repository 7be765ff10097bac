use super::NewId;
use crate::domain::task::driven_ports::{TaskReader, TaskWriter};
use crate::domain::task::{ListedItem, NewItem, TodoItem};
use crate::external_connections::{ConnectionHandle, ExternalConnectivity};
use anyhow::Context;
use chrono::NaiveDate;

#[derive(sqlx::FromRow)]
struct ListedItemRow {
    id: i32,
    content: String,
    due_date: Option<NaiveDate>,
    title: String,
}

impl From<ListedItemRow> for ListedItem {
    fn from(value: ListedItemRow) -> Self {
        ListedItem {
            list_title: value.title,
            item: TodoItem {
                id: value.id,
                content: value.content,
                due_date: value.due_date,
            },
        }
    }
}

/// Retrieves to-do items from the database
pub struct DbTaskReader {}

impl TaskReader for DbTaskReader {
    async fn items_for_user_sorted(
        &self,
        user_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Vec<ListedItem>, anyhow::Error> {
        let mut cxn = ext_cxn
            .database_cxn()
            .await
            .context("getting connectivity for item listing")?;
        // The ORDER BY keeps every row of a list adjacent, which the grouping
        // pass downstream relies on
        let item_rows = sqlx::query_as::<_, ListedItemRow>(
            r#"
                SELECT i.id, i.content, i.due_date, l.title
                FROM items i
                JOIN lists l ON i.list_id = l.id
                WHERE i.user_id = $1
                ORDER BY l.title, i.id
            "#,
        )
        .bind(user_id)
        .fetch_all(cxn.borrow_connection())
        .await
        .context("listing a user's items")?;

        Ok(item_rows.into_iter().map(ListedItem::from).collect())
    }

    async fn user_item_by_id(
        &self,
        item_id: i32,
        user_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<TodoItem>, anyhow::Error> {
        let mut cxn = ext_cxn
            .database_cxn()
            .await
            .context("getting connectivity for item fetch")?;
        // Ownership is part of the lookup, so another user's item id behaves
        // exactly like a missing one
        let fetched_item = sqlx::query_as::<_, ListedItemRow>(
            r#"
                SELECT i.id, i.content, i.due_date, l.title
                FROM items i
                JOIN lists l ON i.list_id = l.id
                WHERE i.id = $1 AND i.user_id = $2
            "#,
        )
        .bind(item_id)
        .bind(user_id)
        .fetch_optional(cxn.borrow_connection())
        .await
        .context("fetching an item by id")?;

        Ok(fetched_item.map(|row| ListedItem::from(row).item))
    }
}

/// Saves, rewrites, and removes to-do items in the database
pub struct DbTaskWriter {}

impl TaskWriter for DbTaskWriter {
    async fn create_item(
        &self,
        user_id: i32,
        list_id: i32,
        item: &NewItem,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<i32, anyhow::Error> {
        let mut cxn = ext_cxn
            .database_cxn()
            .await
            .context("getting connectivity for item insert")?;
        let created_id = sqlx::query_as::<_, NewId>(
            r#"
                INSERT INTO items (content, due_date, list_id, user_id)
                VALUES ($1, $2, $3, $4)
                RETURNING items.id
            "#,
        )
        .bind(&item.content)
        .bind(item.due_date)
        .bind(list_id)
        .bind(user_id)
        .fetch_one(cxn.borrow_connection())
        .await
        .context("inserting an item")?;

        Ok(created_id.id)
    }

    async fn update_item_content(
        &self,
        item_id: i32,
        user_id: i32,
        new_content: &str,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<u64, anyhow::Error> {
        let mut cxn = ext_cxn
            .database_cxn()
            .await
            .context("getting connectivity for item update")?;
        let update_result =
            sqlx::query("UPDATE items SET content = $1 WHERE id = $2 AND user_id = $3")
                .bind(new_content)
                .bind(item_id)
                .bind(user_id)
                .execute(cxn.borrow_connection())
                .await
                .context("updating an item's content")?;

        Ok(update_result.rows_affected())
    }

    async fn delete_item(
        &self,
        item_id: i32,
        user_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<(), anyhow::Error> {
        let mut cxn = ext_cxn
            .database_cxn()
            .await
            .context("getting connectivity for item delete")?;
        sqlx::query("DELETE FROM items WHERE id = $1 AND user_id = $2")
            .bind(item_id)
            .bind(user_id)
            .execute(cxn.borrow_connection())
            .await
            .context("deleting an item")?;

        Ok(())
    }
}
