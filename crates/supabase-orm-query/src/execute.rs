use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::debug;

use supabase_orm_core::{Response, SupabaseClient, SupabaseError, SupabaseResult};

use crate::builder::QueryBuilder;
use crate::postgrest::CompiledRequest;

/// Send a compiled request and read the response.
///
/// Only GET, POST, PATCH and DELETE are dispatched. Any status >= 400 becomes
/// [`SupabaseError::Api`] with the raw body text.
pub async fn dispatch(client: &SupabaseClient, request: CompiledRequest) -> SupabaseResult<Response> {
    const DISPATCHABLE: [Method; 4] = [Method::GET, Method::POST, Method::PATCH, Method::DELETE];
    if !DISPATCHABLE.contains(&request.method) {
        return Err(SupabaseError::UnsupportedMethod(request.method.to_string()));
    }

    let headers = request.header_map()?;
    let url = request.full_url();
    debug!(method = %request.method, url = %url, "Executing PostgREST request");

    let mut builder = client.http().request(request.method, url).headers(headers);
    if let Some(body) = &request.body {
        builder = builder.json(body);
    }

    let response = Response::from_reqwest(builder.send().await?).await?;
    if response.is_error() {
        debug!(status = response.status, "PostgREST request failed");
        return Err(SupabaseError::Api {
            status: response.status,
            body: response.text(),
        });
    }
    Ok(response)
}

impl QueryBuilder {
    /// Compile for `method` and send, returning the raw response.
    pub async fn execute(self, method: Method) -> SupabaseResult<Response> {
        self.send(method, None).await
    }

    /// Fetch the matching rows, decoded into `T` (usually a `Vec` of rows).
    pub async fn get<T: DeserializeOwned>(self) -> SupabaseResult<T> {
        self.execute(Method::GET).await?.json()
    }

    /// Like [`QueryBuilder::get`] with the limit set to 1.
    pub async fn first<T: DeserializeOwned>(self) -> SupabaseResult<T> {
        self.limit(1).get().await
    }

    /// Insert `row`.
    ///
    /// When the server echoes the stored row (`Prefer: return=representation`)
    /// it is decoded back into `T`, otherwise `row` is returned unchanged.
    pub async fn insert<T>(self, row: T) -> SupabaseResult<T>
    where
        T: Serialize + DeserializeOwned,
    {
        let body = serde_json::to_value(&row)?;
        let response = self.send(Method::POST, Some(body)).await?;
        if response.is_empty() {
            return Ok(row);
        }
        Ok(decode_echo(&response)?.unwrap_or(row))
    }

    /// Update the matching rows with the fields of `row`.
    pub async fn update<T: Serialize + ?Sized>(self, row: &T) -> SupabaseResult<()> {
        let body = serde_json::to_value(row)?;
        self.send(Method::PATCH, Some(body)).await?;
        Ok(())
    }

    /// Delete the matching rows.
    pub async fn delete(self) -> SupabaseResult<()> {
        self.execute(Method::DELETE).await?;
        Ok(())
    }

    /// Count the matching rows using `Prefer: count=exact`.
    ///
    /// Returns the total from the `Content-Range` response header, or 0 when
    /// the server did not report one.
    pub async fn count(self) -> SupabaseResult<i64> {
        let response = self.header("Prefer", "count=exact").execute(Method::GET).await?;
        Ok(response
            .content_range()
            .and_then(|range| range.total)
            .unwrap_or(0))
    }

    async fn send(self, method: Method, body: Option<JsonValue>) -> SupabaseResult<Response> {
        let request = self.to_request(method, body)?;
        dispatch(&self.client, request).await
    }
}

/// Decode an echoed insert: a single object, or the first element of an array.
fn decode_echo<T: DeserializeOwned>(response: &Response) -> SupabaseResult<Option<T>> {
    let value: JsonValue = response.json()?;
    match value {
        JsonValue::Array(items) => match items.into_iter().next() {
            Some(first) => Ok(Some(serde_json::from_value(first)?)),
            None => Ok(None),
        },
        other => Ok(Some(serde_json::from_value(other)?)),
    }
}
