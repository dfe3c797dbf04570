//! End-to-end tests for the query dispatcher and auth calls.
//!
//! Each test starts a loopback HTTP stub on an ephemeral port that answers
//! with canned responses and records every request it receives, so the exact
//! method, path, query parameters, headers and body can be asserted.
//!
//! Run with: cargo test -p supabase-orm --test integration

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

use supabase_orm::prelude::*;

// ─── Loopback stub ─────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Canned {
    status: u16,
    headers: Vec<(&'static str, String)>,
    body: String,
}

impl Canned {
    fn json(status: u16, body: JsonValue) -> Self {
        Self {
            status,
            headers: vec![("Content-Type", "application/json".to_string())],
            body: body.to_string(),
        }
    }

    fn empty(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: String::new(),
        }
    }

    fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    fn with_header(mut self, name: &'static str, value: &str) -> Self {
        self.headers.push((name, value.to_string()));
        self
    }
}

#[derive(Debug, Clone)]
struct Recorded {
    method: String,
    target: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl Recorded {
    fn path(&self) -> &str {
        self.target.split('?').next().unwrap_or_default()
    }

    fn query_pairs(&self) -> Vec<(String, String)> {
        let url = url::Url::parse(&format!("http://stub{}", self.target)).unwrap();
        url.query_pairs().into_owned().collect()
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn json(&self) -> JsonValue {
        serde_json::from_slice(&self.body).unwrap()
    }
}

struct Stub {
    base_url: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl Stub {
    /// Serve `responses` in order, one per connection.
    async fn start(responses: Vec<Canned>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);

        tokio::spawn(async move {
            let mut responses = responses.into_iter();
            while let Ok((mut stream, _)) = listener.accept().await {
                let Ok(request) = read_request(&mut stream).await else {
                    continue;
                };
                recorded.lock().await.push(request);
                let canned = responses
                    .next()
                    .unwrap_or_else(|| Canned::text(500, "no canned response left"));
                let _ = write_response(&mut stream, &canned).await;
            }
        });

        Self {
            base_url: format!("http://{}", addr),
            requests,
        }
    }

    fn client(&self) -> SupabaseClient {
        SupabaseClient::new(
            SupabaseConfig::new(&self.base_url, "test-key")
                .timeout(Duration::from_secs(5))
                .header("X-Client-Info", "supabase-orm-tests"),
        )
        .unwrap()
    }

    async fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().await.clone()
    }

    async fn only_request(&self) -> Recorded {
        let requests = self.requests().await;
        assert_eq!(requests.len(), 1, "expected exactly one request: {:?}", requests);
        requests.into_iter().next().unwrap()
    }
}

async fn read_request(stream: &mut TcpStream) -> std::io::Result<Recorded> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let head_end = loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Err(std::io::ErrorKind::UnexpectedEof.into());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).into_owned();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next().unwrap_or_default().split_whitespace();
    let method = request_line.next().unwrap_or_default().to_string();
    let target = request_line.next().unwrap_or_default().to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(k, _)| k == "content-length")
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);
    let mut body = buf[head_end..].to_vec();
    while body.len() < content_length {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }

    Ok(Recorded {
        method,
        target,
        headers,
        body,
    })
}

async fn write_response(stream: &mut TcpStream, canned: &Canned) -> std::io::Result<()> {
    let mut head = format!(
        "HTTP/1.1 {} Stub\r\nContent-Length: {}\r\nConnection: close\r\n",
        canned.status,
        canned.body.len()
    );
    for (name, value) in &canned.headers {
        head.push_str(&format!("{}: {}\r\n", name, value));
    }
    head.push_str("\r\n");
    stream.write_all(head.as_bytes()).await?;
    stream.write_all(canned.body.as_bytes()).await?;
    stream.shutdown().await
}

fn pair(key: &str, value: &str) -> (String, String) {
    (key.to_string(), value.to_string())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Person {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<i64>,
    name: String,
    age: i32,
}

// ─── Query dispatch ────────────────────────────────────────────

#[tokio::test]
async fn get_sends_compiled_query_with_default_headers() {
    let stub = Stub::start(vec![Canned::json(
        200,
        json!([{"id": 1, "name": "Ann", "age": 30}]),
    )])
    .await;

    let users: Vec<Person> = stub
        .client()
        .table("x")
        .select(["a", "b"])
        .where_("c", "eq", 1)
        .get()
        .await
        .unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].name, "Ann");

    let req = stub.only_request().await;
    assert_eq!(req.method, "GET");
    assert_eq!(req.path(), "/rest/v1/x");
    assert_eq!(req.query_pairs(), vec![pair("select", "a,b"), pair("and", "c.eq.1")]);
    assert_eq!(req.header("apikey"), Some("test-key"));
    assert_eq!(req.header("authorization"), Some("Bearer test-key"));
    assert_eq!(req.header("content-type"), Some("application/json"));
    assert_eq!(req.header("x-client-info"), Some("supabase-orm-tests"));
    assert!(req.body.is_empty());
}

#[tokio::test]
async fn get_with_order_paging_and_range() {
    let stub = Stub::start(vec![Canned::json(200, json!([]))]).await;

    let rows: Vec<JsonValue> = stub
        .client()
        .table("users")
        .where_("age", ">=", 18)
        .or_where("name", "like", "A%")
        .order("name", "asc")
        .limit(10)
        .offset(5)
        .range(5, 14)
        .get()
        .await
        .unwrap();
    assert!(rows.is_empty());

    let req = stub.only_request().await;
    assert_eq!(
        req.query_pairs(),
        vec![
            pair("and", "age.gte.18"),
            pair("and", r#"or(name.like."A%")"#),
            pair("order", "name.asc"),
            pair("limit", "10"),
            pair("offset", "5"),
        ]
    );
    assert_eq!(req.header("range"), Some("5-14"));
}

#[tokio::test]
async fn or_group_is_one_or_param() {
    let stub = Stub::start(vec![Canned::json(200, json!([]))]).await;

    let _: Vec<JsonValue> = stub
        .client()
        .table("users")
        .or_group(|g| g.eq("role", "admin").where_("age", "<", 18))
        .get()
        .await
        .unwrap();

    let req = stub.only_request().await;
    assert_eq!(
        req.query_pairs(),
        vec![pair("or", r#"(role.eq."admin",age.lt.18)"#)]
    );
}

#[tokio::test]
async fn first_limits_to_one() {
    let stub = Stub::start(vec![Canned::json(
        200,
        json!([{"id": 3, "name": "Bo", "age": 41}]),
    )])
    .await;

    let users: Vec<Person> = stub
        .client()
        .table("users")
        .where_("name", "=", "Bo")
        .limit(50)
        .first()
        .await
        .unwrap();
    assert_eq!(users[0].id, Some(3));

    let req = stub.only_request().await;
    assert!(req.query_pairs().contains(&pair("limit", "1")));
}

#[tokio::test]
async fn joins_render_in_select_and_left_join_prefers_missing_null() {
    let stub = Stub::start(vec![Canned::json(200, json!([]))]).await;

    let _: Vec<JsonValue> = stub
        .client()
        .table("users")
        .select(["id", "name"])
        .inner_join("posts", "id", "user_id")
        .left_join("comments", "id", "user_id")
        .get()
        .await
        .unwrap();

    let req = stub.only_request().await;
    assert_eq!(
        req.query_pairs(),
        vec![pair("select", "id,name,posts(*),comments(*)")]
    );
    assert_eq!(req.header("prefer"), Some("missing=null"));
}

#[tokio::test]
async fn insert_decodes_echoed_row() {
    let stub = Stub::start(vec![Canned::json(
        201,
        json!([{"id": 7, "name": "Cy", "age": 22}]),
    )])
    .await;

    let new_user = Person {
        id: None,
        name: "Cy".into(),
        age: 22,
    };
    let stored = stub
        .client()
        .table("users")
        .header("Prefer", "return=representation")
        .insert(new_user)
        .await
        .unwrap();
    assert_eq!(stored.id, Some(7));

    let req = stub.only_request().await;
    assert_eq!(req.method, "POST");
    assert_eq!(req.path(), "/rest/v1/users");
    assert_eq!(req.json(), json!({"name": "Cy", "age": 22}));
    assert_eq!(req.header("prefer"), Some("return=representation"));
}

#[tokio::test]
async fn insert_without_echo_returns_row() {
    let stub = Stub::start(vec![Canned::empty(201)]).await;

    let new_user = Person {
        id: None,
        name: "Di".into(),
        age: 19,
    };
    let stored = stub
        .client()
        .table("users")
        .insert(new_user.clone())
        .await
        .unwrap();
    assert_eq!(stored, new_user);
}

#[tokio::test]
async fn update_patches_matching_rows() {
    let stub = Stub::start(vec![Canned::empty(204)]).await;

    stub.client()
        .table("users")
        .where_("id", "=", 7)
        .update(&json!({"age": 23}))
        .await
        .unwrap();

    let req = stub.only_request().await;
    assert_eq!(req.method, "PATCH");
    assert_eq!(req.query_pairs(), vec![pair("and", "id.eq.7")]);
    assert_eq!(req.json(), json!({"age": 23}));
}

#[tokio::test]
async fn delete_sends_no_body() {
    let stub = Stub::start(vec![Canned::empty(204)]).await;

    stub.client()
        .table("users")
        .where_("id", "in", vec![1, 2])
        .delete()
        .await
        .unwrap();

    let req = stub.only_request().await;
    assert_eq!(req.method, "DELETE");
    assert_eq!(req.query_pairs(), vec![pair("and", "id.in.{1,2}")]);
    assert!(req.body.is_empty());
}

#[tokio::test]
async fn count_reads_content_range_total() {
    let stub = Stub::start(vec![
        Canned::json(200, json!([{"id": 1}])).with_header("Content-Range", "0-0/42"),
        Canned::json(200, json!([])).with_header("Content-Range", "*/*"),
        Canned::json(200, json!([])),
    ])
    .await;
    let client = stub.client();

    let total = client.table("users").where_("age", ">", 18).count().await.unwrap();
    assert_eq!(total, 42);
    assert_eq!(client.table("users").count().await.unwrap(), 0);
    assert_eq!(client.table("users").count().await.unwrap(), 0);

    let requests = stub.requests().await;
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].header("prefer"), Some("count=exact"));
    assert_eq!(requests[0].query_pairs(), vec![pair("and", "age.gt.18")]);
}

#[tokio::test]
async fn raw_sql_goes_to_execute_sql_rpc() {
    let stub = Stub::start(vec![Canned::json(200, json!([{"?column?": 1}]))]).await;

    let rows: Vec<JsonValue> = stub
        .client()
        .table("")
        .select(["ignored"])
        .where_("ignored", "=", 1)
        .raw("SELECT 1")
        .get()
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);

    let req = stub.only_request().await;
    assert_eq!(req.method, "POST");
    assert_eq!(req.target, "/rest/v1/rpc/execute_sql");
    assert_eq!(req.json(), json!({"query": "SELECT 1"}));
}

#[tokio::test]
async fn error_status_carries_raw_body() {
    let body = r#"{"code":"42P01","message":"relation \"public.nope\" does not exist"}"#;
    let stub = Stub::start(vec![Canned::text(404, body)]).await;

    let err = stub
        .client()
        .table("nope")
        .get::<Vec<JsonValue>>()
        .await
        .unwrap_err();
    match err {
        SupabaseError::Api { status, body: text } => {
            assert_eq!(status, 404);
            assert_eq!(text, body);
        }
        other => panic!("expected API error, got {:?}", other),
    }
}

#[tokio::test]
async fn decode_failure_propagates() {
    let stub = Stub::start(vec![Canned::json(200, json!({"not": "a list"}))]).await;

    let err = stub
        .client()
        .table("users")
        .get::<Vec<Person>>()
        .await
        .unwrap_err();
    assert!(matches!(err, SupabaseError::Serialization(_)));
}

#[tokio::test]
async fn transport_failure_is_http_error() {
    // Bind then drop to get a port nobody listens on.
    let addr = TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap()
        .local_addr()
        .unwrap();
    let client =
        SupabaseClient::new(SupabaseConfig::new(format!("http://{}", addr), "k")).unwrap();

    let err = client.table("users").delete().await.unwrap_err();
    assert!(matches!(err, SupabaseError::Http(_)));
}

#[tokio::test]
async fn transaction_queries_prefer_commit() {
    let stub = Stub::start(vec![Canned::empty(204)]).await;
    let client = stub.client();

    let tx = client.begin();
    tx.table("accounts")
        .where_("id", "=", 1)
        .update(&json!({"balance": 0}))
        .await
        .unwrap();
    assert!(tx.clone().commit().is_ok());

    let err = tx.rollback().unwrap_err();
    assert!(matches!(err, SupabaseError::Unsupported(_)));

    let req = stub.only_request().await;
    assert_eq!(req.header("prefer"), Some("tx=commit"));
}

// ─── Auth ──────────────────────────────────────────────────────

fn session_json() -> JsonValue {
    json!({
        "access_token": "jwt-access",
        "token_type": "bearer",
        "expires_in": 3600,
        "refresh_token": "jwt-refresh",
        "user": {"id": "8c5c0a7e-0000-4000-8000-000000000001", "email": "user@example.com"}
    })
}

#[tokio::test]
async fn sign_in_computes_expiry() {
    let stub = Stub::start(vec![Canned::json(200, session_json())]).await;
    let client = stub.client();

    let before = Utc::now();
    let session = client
        .auth()
        .sign_in_with_password(&SignInRequest::password("user@example.com", "password123"))
        .await
        .unwrap();
    let after = Utc::now();

    assert_eq!(session.access_token, "jwt-access");
    assert_eq!(session.expires_in, 3600);
    let expires_at = session.expires_at.unwrap();
    assert!(expires_at >= before + TimeDelta::try_seconds(3600).unwrap());
    assert!(expires_at <= after + TimeDelta::try_seconds(3600).unwrap());
    assert_eq!(
        session.user.as_ref().and_then(|u| u.email.as_deref()),
        Some("user@example.com")
    );

    let req = stub.only_request().await;
    assert_eq!(req.method, "POST");
    assert_eq!(req.target, "/auth/v1/token?grant_type=password");
    assert_eq!(
        req.json(),
        json!({"email": "user@example.com", "password": "password123"})
    );
    assert_eq!(req.header("apikey"), Some("test-key"));
}

#[tokio::test]
async fn sign_up_verify_and_refresh_return_sessions() {
    let stub = Stub::start(vec![
        Canned::json(200, session_json()),
        Canned::json(200, session_json()),
        Canned::json(200, session_json()),
    ])
    .await;
    let auth = stub.client().auth().clone();

    let signed_up = auth
        .sign_up(&SignUpRequest::new("new@example.com", "password123"))
        .await
        .unwrap();
    assert!(signed_up.expires_at.is_some());

    let verified = auth
        .verify(&VerifyRequest::new("new@example.com", "123456", OtpType::Signup))
        .await
        .unwrap();
    assert!(verified.expires_at.is_some());

    let refreshed = auth
        .refresh_token(&RefreshTokenRequest {
            refresh_token: "jwt-refresh".into(),
        })
        .await
        .unwrap();
    assert_eq!(refreshed.refresh_token, "jwt-refresh");

    let requests = stub.requests().await;
    let targets: Vec<&str> = requests.iter().map(|r| r.target.as_str()).collect();
    assert_eq!(
        targets,
        vec![
            "/auth/v1/signup",
            "/auth/v1/verify",
            "/auth/v1/token?grant_type=refresh_token",
        ]
    );
    assert_eq!(requests[1].json()["type"], "signup");
}

#[tokio::test]
async fn token_calls_send_bearer() {
    let stub = Stub::start(vec![
        Canned::json(200, json!({"id": "u-1", "email": "user@example.com"})),
        Canned::json(200, json!({"id": "u-1"})),
        Canned::empty(204),
    ])
    .await;
    let client = stub.client();
    let auth = client.auth();

    let user = auth.get_user("user-jwt").await.unwrap();
    assert_eq!(user.id, "u-1");

    auth.update_password(
        &UpdatePasswordRequest {
            password: "new-password".into(),
        },
        "user-jwt",
    )
    .await
    .unwrap();
    auth.sign_out("user-jwt").await.unwrap();

    let requests = stub.requests().await;
    let calls: Vec<(&str, &str)> = requests
        .iter()
        .map(|r| (r.method.as_str(), r.target.as_str()))
        .collect();
    assert_eq!(
        calls,
        vec![
            ("GET", "/auth/v1/user"),
            ("PUT", "/auth/v1/user"),
            ("POST", "/auth/v1/logout"),
        ]
    );
    for req in &requests {
        assert_eq!(req.header("authorization"), Some("Bearer user-jwt"));
    }
    assert_eq!(requests[1].json(), json!({"password": "new-password"}));
}

#[tokio::test]
async fn otp_and_recover_ignore_body() {
    let stub = Stub::start(vec![Canned::json(200, json!({})), Canned::empty(200)]).await;
    let client = stub.client();

    client
        .auth()
        .sign_in_with_otp(&SignInRequest::otp("user@example.com"))
        .await
        .unwrap();
    client
        .auth()
        .reset_password(&ResetPasswordRequest {
            email: "user@example.com".into(),
        })
        .await
        .unwrap();

    let requests = stub.requests().await;
    assert_eq!(requests[0].target, "/auth/v1/otp");
    assert_eq!(requests[1].target, "/auth/v1/recover");
    assert_eq!(requests[1].json(), json!({"email": "user@example.com"}));
}

#[tokio::test]
async fn auth_error_status_and_body() {
    let stub = Stub::start(vec![Canned::text(
        400,
        r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#,
    )])
    .await;

    let err = stub
        .client()
        .auth()
        .sign_in_with_password(&SignInRequest::password("user@example.com", "wrong"))
        .await
        .unwrap_err();
    match err {
        AuthError::Api { status, body } => {
            assert_eq!(status, 400);
            assert!(body.contains("Invalid login credentials"));
        }
        other => panic!("expected auth API error, got {:?}", other),
    }

    // Converts into the workspace error with `?`
    let err: SupabaseError = AuthError::Api {
        status: 400,
        body: String::new(),
    }
    .into();
    assert_eq!(err.status(), Some(400));
}

// ─── Client construction ───────────────────────────────────────

#[test]
fn header_option_is_a_default_header() {
    let client = SupabaseClient::new(
        SupabaseConfig::new("https://example.supabase.co", "key")
            .header("X-Custom-Header", "custom-value"),
    )
    .unwrap();
    assert_eq!(
        client.default_headers().get("X-Custom-Header").unwrap(),
        "custom-value"
    );
    assert_eq!(client.api_key(), "key");
}
