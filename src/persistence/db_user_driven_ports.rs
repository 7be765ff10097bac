use super::{Count, NewId};
use crate::domain::user::AppUser;
use crate::domain::user::driven_ports::{DetectUser, UserReader, UserWriter};
use crate::external_connections::{ConnectionHandle, ExternalConnectivity};
use anyhow::Context;

#[derive(sqlx::FromRow)]
struct AppUserRow {
    id: i32,
    username: String,
    password_hash: String,
}

impl From<AppUserRow> for AppUser {
    fn from(value: AppUserRow) -> Self {
        AppUser {
            id: value.id,
            username: value.username,
            password_hash: value.password_hash,
        }
    }
}

/// Retrieves user accounts from the database
pub struct DbReadUsers {}

impl UserReader for DbReadUsers {
    async fn get_by_id(
        &self,
        id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<AppUser>, anyhow::Error> {
        let mut cxn = ext_cxn
            .database_cxn()
            .await
            .context("getting connectivity for user fetch")?;
        let fetched_user = sqlx::query_as::<_, AppUserRow>(
            "SELECT id, username, password_hash FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(cxn.borrow_connection())
        .await
        .context("fetching a user by id")?;

        Ok(fetched_user.map(AppUser::from))
    }

    async fn get_by_username(
        &self,
        username: &str,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<AppUser>, anyhow::Error> {
        let mut cxn = ext_cxn
            .database_cxn()
            .await
            .context("getting connectivity for user fetch")?;
        let fetched_user = sqlx::query_as::<_, AppUserRow>(
            "SELECT id, username, password_hash FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(cxn.borrow_connection())
        .await
        .context("fetching a user by username")?;

        Ok(fetched_user.map(AppUser::from))
    }
}

/// Saves new user accounts to the database
pub struct DbWriteUsers {}

impl UserWriter for DbWriteUsers {
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<i32, anyhow::Error> {
        let mut cxn = ext_cxn
            .database_cxn()
            .await
            .context("getting connectivity for user insert")?;
        let created_id = sqlx::query_as::<_, NewId>(
            "INSERT INTO users (username, password_hash) VALUES ($1, $2) RETURNING users.id",
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(cxn.borrow_connection())
        .await
        .context("inserting a user")?;

        Ok(created_id.id)
    }
}

/// Answers whether user accounts exist in the database
pub struct DbDetectUsers {}

impl DetectUser for DbDetectUsers {
    async fn username_exists(
        &self,
        username: &str,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<bool, anyhow::Error> {
        let mut cxn = ext_cxn
            .database_cxn()
            .await
            .context("getting connectivity for username detection")?;
        let matching_users = sqlx::query_as::<_, Count>(
            "SELECT count(*) AS count FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_one(cxn.borrow_connection())
        .await
        .context("counting users by username")?;

        Ok(matching_users.count() > 0)
    }
}
