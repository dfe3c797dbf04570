use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde_json::{json, Value as JsonValue};
use url::Url;

use supabase_orm_core::{SupabaseError, SupabaseResult};

use crate::builder::QueryBuilder;

/// Path of the RPC used for raw SQL queries.
pub const EXECUTE_SQL_PATH: &str = "/rest/v1/rpc/execute_sql";

/// A query compiled to everything needed for one HTTP call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledRequest {
    pub method: Method,
    /// Endpoint URL without the query string.
    pub url: Url,
    /// Query parameters in emission order. Keys may repeat (`and`).
    pub query: Vec<(String, String)>,
    /// Per-request headers, on top of the client's defaults.
    pub headers: Vec<(String, String)>,
    pub body: Option<JsonValue>,
}

impl CompiledRequest {
    /// The endpoint with the query string attached (form-encoded).
    pub fn full_url(&self) -> Url {
        let mut url = self.url.clone();
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.query);
        }
        url
    }

    /// Every value of query parameter `key`, in order.
    pub fn query_values(&self, key: &str) -> Vec<&str> {
        self.query
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// A request header by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Validate the headers into a `HeaderMap`.
    pub fn header_map(&self) -> SupabaseResult<HeaderMap> {
        let mut map = HeaderMap::with_capacity(self.headers.len());
        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                SupabaseError::config(format!("Invalid header name {:?}: {}", name, e))
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                SupabaseError::config(format!("Invalid header value for {}: {}", name, e))
            })?;
            map.insert(name, value);
        }
        Ok(map)
    }
}

impl QueryBuilder {
    /// Compile the accumulated state into a request for `method`.
    ///
    /// Raw-SQL mode always compiles to `POST /rest/v1/rpc/execute_sql` with
    /// body `{"query": sql}`, whatever `method` and `body` were given.
    pub fn to_request(&self, method: Method, body: Option<JsonValue>) -> SupabaseResult<CompiledRequest> {
        let headers = self.headers.clone();

        if let Some(sql) = &self.raw_sql {
            return Ok(CompiledRequest {
                method: Method::POST,
                url: self.client.rest_url(EXECUTE_SQL_PATH)?,
                query: Vec::new(),
                headers,
                body: Some(json!({ "query": sql })),
            });
        }

        let url = self.client.rest_url(&format!("/rest/v1/{}", self.table))?;
        let query = self.query_params();
        tracing::trace!(table = %self.table, ?query, "Compiled PostgREST query");

        let mut headers = headers;
        if let Some((start, end)) = self.range {
            headers.push(("Range".to_string(), format!("{}-{}", start, end)));
        }

        Ok(CompiledRequest {
            method,
            url,
            query,
            headers,
            body,
        })
    }

    /// The PostgREST query parameters for table mode.
    pub(crate) fn query_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();

        // Select, with embedded joins appended in insertion order
        let mut select = self.columns.join(",");
        if !self.joins.is_empty() {
            if select.is_empty() {
                select.push('*');
            }
            for join in &self.joins {
                select.push_str(&format!(",{}(*)", join.foreign_table));
            }
        }
        if !select.is_empty() {
            params.push(("select".to_string(), select));
        }

        for filter in &self.filters {
            let (key, value) = filter.to_param();
            params.push((key.to_string(), value));
        }

        if !self.orders.is_empty() {
            let order = self
                .orders
                .iter()
                .map(|(column, direction)| format!("{}.{}", column, direction))
                .collect::<Vec<_>>()
                .join(",");
            params.push(("order".to_string(), order));
        }

        if self.limit > 0 {
            params.push(("limit".to_string(), self.limit.to_string()));
        }
        if self.offset > 0 {
            params.push(("offset".to_string(), self.offset.to_string()));
        }

        params
    }
}
