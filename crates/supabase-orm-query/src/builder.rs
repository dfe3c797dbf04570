use supabase_orm_core::SupabaseClient;

use crate::filter::{Condition, Filter, FilterGroup};
use crate::value::FilterValue;

/// A relation embedded through `join`, rendered as `<foreign_table>(*)` in `select`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    pub foreign_table: String,
    pub local_column: String,
    pub operator: String,
    pub foreign_column: String,
}

/// Fluent query against one table, created by `client.table("name")`.
///
/// Every configuration call takes the builder by value and hands it back, so
/// a query reads as one chain ending in a terminal call (`get`, `first`,
/// `insert`, `update`, `delete`, `count`) that consumes it.
///
/// ```ignore
/// let adults: Vec<User> = client
///     .table("users")
///     .select(["id", "name"])
///     .where_("age", ">=", 18)
///     .order("name", "asc")
///     .limit(10)
///     .get()
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    pub(crate) client: SupabaseClient,
    pub(crate) table: String,
    pub(crate) columns: Vec<String>,
    pub(crate) filters: Vec<Filter>,
    pub(crate) orders: Vec<(String, String)>,
    pub(crate) limit: u64,
    pub(crate) offset: u64,
    pub(crate) range: Option<(u64, u64)>,
    pub(crate) joins: Vec<Join>,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) raw_sql: Option<String>,
}

impl QueryBuilder {
    pub fn new(client: SupabaseClient, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
            columns: Vec::new(),
            filters: Vec::new(),
            orders: Vec::new(),
            limit: 0,
            offset: 0,
            range: None,
            joins: Vec::new(),
            headers: Vec::new(),
            raw_sql: None,
        }
    }

    /// Replace the selected columns.
    pub fn select<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// AND a `column op value` condition onto the query.
    pub fn where_(mut self, column: &str, operator: &str, value: impl Into<FilterValue>) -> Self {
        self.filters.push(Filter::Standard {
            condition: Condition::new(column, operator, value),
            disjunctive: false,
        });
        self
    }

    /// Add a condition emitted as `and=or(column.op.value)`.
    ///
    /// Each call is its own one-member OR group, so consecutive `or_where`
    /// calls are still AND'ed together. Use [`QueryBuilder::or_group`] for a
    /// disjunction across several conditions.
    pub fn or_where(mut self, column: &str, operator: &str, value: impl Into<FilterValue>) -> Self {
        self.filters.push(Filter::Standard {
            condition: Condition::new(column, operator, value),
            disjunctive: true,
        });
        self
    }

    /// AND a raw PostgREST condition string, emitted verbatim as `and=<condition>`.
    pub fn where_raw(mut self, condition: impl Into<String>) -> Self {
        self.filters.push(Filter::Complex(condition.into()));
        self
    }

    /// OR together every condition added inside the closure.
    ///
    /// ```ignore
    /// client.table("users").or_group(|g| g.eq("role", "admin").where_("age", "<", 18))
    /// // or=(role.eq."admin",age.lt.18)
    /// ```
    pub fn or_group(mut self, f: impl FnOnce(FilterGroup) -> FilterGroup) -> Self {
        let group = f(FilterGroup::new());
        if !group.is_empty() {
            self.filters.push(Filter::Group(group.into_conditions()));
        }
        self
    }

    /// Append an ordering; `direction` is forwarded as given (`asc`, `desc`, `desc.nullslast`, ...).
    pub fn order(mut self, column: impl Into<String>, direction: impl Into<String>) -> Self {
        self.orders.push((column.into(), direction.into()));
        self
    }

    /// Limit the number of rows. Zero leaves the query unlimited.
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    /// Skip rows. Zero means no offset.
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    /// Request rows `start..=end` through the `Range` header.
    pub fn range(mut self, start: u64, end: u64) -> Self {
        self.range = Some((start, end));
        self
    }

    /// Set a request header, replacing any earlier value for the same name.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match self
            .headers
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(&key))
        {
            Some(entry) => entry.1 = value,
            None => self.headers.push((key, value)),
        }
        self
    }

    /// Embed a related table.
    pub fn join(
        mut self,
        foreign_table: impl Into<String>,
        local_column: impl Into<String>,
        operator: &str,
        foreign_column: impl Into<String>,
    ) -> Self {
        self.joins.push(Join {
            foreign_table: foreign_table.into(),
            local_column: local_column.into(),
            operator: operator.to_string(),
            foreign_column: foreign_column.into(),
        });
        self
    }

    /// Embed a related table on `local_column = foreign_column`.
    pub fn inner_join(
        self,
        foreign_table: impl Into<String>,
        local_column: impl Into<String>,
        foreign_column: impl Into<String>,
    ) -> Self {
        self.join(foreign_table, local_column, "eq", foreign_column)
    }

    /// Like [`QueryBuilder::inner_join`], keeping rows without a match (`Prefer: missing=null`).
    pub fn left_join(
        self,
        foreign_table: impl Into<String>,
        local_column: impl Into<String>,
        foreign_column: impl Into<String>,
    ) -> Self {
        self.inner_join(foreign_table, local_column, foreign_column)
            .header("Prefer", "missing=null")
    }

    /// Run `sql` through the `execute_sql` RPC instead of querying the table.
    ///
    /// Select, filter, order and paging state is ignored in this mode. The
    /// text is forwarded as is.
    pub fn raw(mut self, sql: impl Into<String>) -> Self {
        self.raw_sql = Some(sql.into());
        self
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    pub fn joins(&self) -> &[Join] {
        &self.joins
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn is_raw(&self) -> bool {
        self.raw_sql.is_some()
    }
}
