use supabase_orm_core::{SupabaseClient, SupabaseError, SupabaseResult};

use crate::builder::QueryBuilder;

/// Header value asking PostgREST to commit the request's transaction.
pub const TX_COMMIT: &str = "tx=commit";

/// Groups queries that carry `Prefer: tx=commit`.
///
/// PostgREST runs each request in its own transaction, so this does not span
/// requests: `commit` has nothing to do and `rollback` cannot be honoured.
#[derive(Debug, Clone)]
pub struct Transaction {
    client: SupabaseClient,
}

impl Transaction {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    /// Start a query on `table` inside this transaction.
    pub fn table(&self, table: &str) -> QueryBuilder {
        QueryBuilder::new(self.client.clone(), table).header("Prefer", TX_COMMIT)
    }

    pub fn commit(self) -> SupabaseResult<()> {
        Ok(())
    }

    /// Always fails: the REST API has no cross-request rollback.
    pub fn rollback(self) -> SupabaseResult<()> {
        Err(SupabaseError::unsupported(
            "rollback not supported in the current Supabase REST API",
        ))
    }
}
