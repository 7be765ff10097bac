use crate::external_connections;
use anyhow::Context;
use sqlx::PgConnection;
use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgPool, Postgres};

pub mod bootstrap;
pub mod db_list_driven_ports;
pub mod db_task_driven_ports;
pub mod db_user_driven_ports;

/// Production connectivity to external systems, backed by a connection pool
#[derive(Clone)]
pub struct ExternalConnectivity {
    db: PgPool,
}

impl ExternalConnectivity {
    pub fn new(db: PgPool) -> ExternalConnectivity {
        ExternalConnectivity { db }
    }
}

/// A live connection checked out of the pool for one operation. Dropping the
/// handle returns the connection.
pub struct PoolConnectionHandle {
    active_connection: PoolConnection<Postgres>,
}

impl external_connections::ConnectionHandle for PoolConnectionHandle {
    fn borrow_connection(&mut self) -> &mut PgConnection {
        &mut self.active_connection
    }
}

impl external_connections::ExternalConnectivity for ExternalConnectivity {
    type DbHandle<'cxn_borrow> = PoolConnectionHandle;

    async fn database_cxn(&mut self) -> Result<PoolConnectionHandle, anyhow::Error> {
        let connection = self
            .db
            .acquire()
            .await
            .context("acquiring a database connection from the pool")?;

        Ok(PoolConnectionHandle {
            active_connection: connection,
        })
    }
}

/// The ID of an inserted record
#[derive(sqlx::FromRow)]
struct NewId {
    id: i32,
}

/// A count of matching records
#[derive(sqlx::FromRow)]
struct Count {
    count: Option<i64>,
}

impl Count {
    /// Unwraps the count. count(*) always produces a row, so the inner option
    /// is only None if the query never selected a count at all.
    fn count(&self) -> i64 {
        self.count
            .expect("a counting query did not actually select a count")
    }
}
