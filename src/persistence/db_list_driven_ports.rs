use super::NewId;
use crate::domain::list::driven_ports::ListReader;
use crate::external_connections::{ConnectionHandle, ExternalConnectivity};
use anyhow::Context;

#[derive(sqlx::FromRow)]
struct TitleRow {
    title: String,
}

/// Retrieves the shared named lists from the database
pub struct DbReadLists {}

impl ListReader for DbReadLists {
    async fn all_titles(
        &self,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Vec<String>, anyhow::Error> {
        let mut cxn = ext_cxn
            .database_cxn()
            .await
            .context("getting connectivity for list titles fetch")?;
        let title_rows =
            sqlx::query_as::<_, TitleRow>("SELECT l.title FROM lists l ORDER BY l.title")
                .fetch_all(cxn.borrow_connection())
                .await
                .context("fetching list titles")?;

        Ok(title_rows.into_iter().map(|row| row.title).collect())
    }

    async fn id_by_title(
        &self,
        title: &str,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<i32>, anyhow::Error> {
        let mut cxn = ext_cxn
            .database_cxn()
            .await
            .context("getting connectivity for list lookup")?;
        let matching_list =
            sqlx::query_as::<_, NewId>("SELECT l.id FROM lists l WHERE l.title = $1")
                .bind(title)
                .fetch_optional(cxn.borrow_connection())
                .await
                .context("looking up a list by title")?;

        Ok(matching_list.map(|row| row.id))
    }
}
