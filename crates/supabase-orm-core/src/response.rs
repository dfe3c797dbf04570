use reqwest::header::{HeaderMap, CONTENT_RANGE};
use serde::de::DeserializeOwned;

use crate::error::SupabaseResult;

/// A fully read HTTP response: status, headers and raw body bytes.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl Response {
    /// Read a transport response to completion.
    pub async fn from_reqwest(response: reqwest::Response) -> SupabaseResult<Self> {
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();
        Ok(Self {
            status,
            headers,
            body,
        })
    }

    /// True for any status >= 400.
    pub fn is_error(&self) -> bool {
        self.status >= 400
    }

    /// The body decoded as UTF-8, lossily.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> SupabaseResult<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Whether the body is empty or only whitespace.
    pub fn is_empty(&self) -> bool {
        self.body.iter().all(u8::is_ascii_whitespace)
    }

    /// The parsed `Content-Range` header, if present and well formed.
    pub fn content_range(&self) -> Option<ContentRange> {
        let value = self.headers.get(CONTENT_RANGE)?.to_str().ok()?;
        let parsed = ContentRange::parse(value);
        if parsed.is_none() {
            tracing::warn!(content_range = value, "Unparsable Content-Range header");
        }
        parsed
    }
}

/// A PostgREST `Content-Range` header, e.g. `0-9/42` or `items 0-9/42`.
///
/// `start`/`end` are `None` for an unsatisfiable range (`*/42`) and `total`
/// is `None` when the server did not count (`0-9/*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentRange {
    pub start: Option<i64>,
    pub end: Option<i64>,
    pub total: Option<i64>,
}

impl ContentRange {
    pub fn parse(header: &str) -> Option<Self> {
        let header = header.trim();
        let header = header.strip_prefix("items").unwrap_or(header).trim_start();
        let (range, total) = header.split_once('/')?;

        let total = match total.trim() {
            "*" => None,
            t => Some(t.parse::<i64>().ok()?),
        };

        let (start, end) = match range.trim() {
            "*" => (None, None),
            r => {
                let (s, e) = r.split_once('-')?;
                (Some(s.trim().parse().ok()?), Some(e.trim().parse().ok()?))
            }
        };

        Some(Self { start, end, total })
    }
}
