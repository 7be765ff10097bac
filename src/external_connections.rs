use sqlx::PgConnection;

/// Owns the means of reaching external systems (currently just the database)
/// so business logic stays agnostic of what it communicates with and driven
/// adapters can be swapped out for other implementations.
///
/// Connections are scoped to a single operation: acquired through
/// [database_cxn][ExternalConnectivity::database_cxn] and released when the
/// returned handle drops, on every exit path.
pub trait ExternalConnectivity {
    type DbHandle<'cxn_borrow>: ConnectionHandle
    where
        Self: 'cxn_borrow;

    /// Acquires a database connection for the duration of one operation
    async fn database_cxn(&mut self) -> Result<Self::DbHandle<'_>, anyhow::Error>;
}

/// A handle from [ExternalConnectivity] which holds a live database connection
pub trait ConnectionHandle {
    fn borrow_connection(&mut self) -> &mut PgConnection;
}
