//! Fluent PostgREST query builder.
//!
//! `client.table("users")` starts a [`QueryBuilder`]; chained calls collect
//! select/filter/order/paging/join state which a terminal call compiles into
//! `/rest/v1/<table>?...` and sends.

pub mod builder;
pub mod execute;
pub mod filter;
pub mod postgrest;
pub mod transaction;
pub mod value;

pub use builder::{Join, QueryBuilder};
pub use execute::dispatch;
pub use filter::{build_filter_condition, operator_keyword, Condition, FilterGroup};
pub use postgrest::CompiledRequest;
pub use transaction::Transaction;
pub use value::FilterValue;

use supabase_orm_core::SupabaseClient;

/// Extension trait adding query builder methods to SupabaseClient.
pub trait SupabaseClientQueryExt {
    /// Start a query on a table. Pass `""` together with `.raw(sql)` for raw SQL.
    fn table(&self, table: &str) -> QueryBuilder;

    /// Start a transaction whose queries carry `Prefer: tx=commit`.
    fn begin(&self) -> Transaction;
}

impl SupabaseClientQueryExt for SupabaseClient {
    fn table(&self, table: &str) -> QueryBuilder {
        QueryBuilder::new(self.clone(), table)
    }

    fn begin(&self) -> Transaction {
        Transaction::new(self.clone())
    }
}
