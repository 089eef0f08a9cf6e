//! In-process fake of the hosted table and storage APIs.
//!
//! Tables live in memory and understand `eq`/`neq` filters, `order` and
//! `limit`. Responses can be scripted per method and path to exercise
//! provider failures. Every request is recorded for header assertions.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anchors_db::Backend;
use anchors_shared::{BackendConfig, BackendProvider};
use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use serde_json::{Map, Value, json};
use tokio::net::TcpListener;

/// A request as the fake provider saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[derive(Debug, Clone)]
struct Scripted {
    status: StatusCode,
    body: String,
}

#[derive(Debug, Default)]
struct Inner {
    tables: HashMap<String, Vec<Value>>,
    requests: Vec<Recorded>,
    scripted: HashMap<(Method, String), Scripted>,
    assigned_key: Option<String>,
    next_id: i64,
}

#[derive(Clone)]
struct AppState {
    provider: BackendProvider,
    inner: Arc<Mutex<Inner>>,
}

/// Handle to a running fake provider.
pub struct FakeProvider {
    pub base_url: String,
    provider: BackendProvider,
    inner: Arc<Mutex<Inner>>,
}

impl FakeProvider {
    /// Starts a fake on an ephemeral port.
    pub async fn spawn(provider: BackendProvider) -> Self {
        let inner = Arc::new(Mutex::new(Inner {
            next_id: 1,
            ..Inner::default()
        }));
        let state = AppState {
            provider,
            inner: Arc::clone(&inner),
        };
        let router = Router::new().fallback(handle).with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            provider,
            inner,
        }
    }

    /// Backend config pointing at this fake.
    pub fn config(&self) -> BackendConfig {
        BackendConfig {
            provider: self.provider,
            base_url: self.base_url.clone(),
            api_key: Some("anon-key".to_string()),
            service_key: None,
            table_prefix: None,
            session_dir: None,
        }
    }

    /// Connected adapter.
    pub fn backend(&self) -> Backend {
        Backend::connect(&self.config()).unwrap()
    }

    /// Seeds rows, assigning ids to rows that lack one.
    pub fn seed(&self, table: &str, rows: Vec<Value>) {
        let mut inner = self.inner.lock().unwrap();
        for mut row in rows {
            assign_id(&mut inner.next_id, &mut row);
            inner.tables.entry(table.to_string()).or_default().push(row);
        }
    }

    /// Current rows of a table.
    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.inner
            .lock()
            .unwrap()
            .tables
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    /// Answers `method path` with a fixed status and body.
    pub fn script(&self, method: Method, path: &str, status: u16, body: &str) {
        self.inner.lock().unwrap().scripted.insert(
            (method, path.to_string()),
            Scripted {
                status: StatusCode::from_u16(status).unwrap(),
                body: body.to_string(),
            },
        );
    }

    /// Makes storage uploads report a server-chosen key.
    pub fn assign_storage_key(&self, key: &str) {
        self.inner.lock().unwrap().assigned_key = Some(key.to_string());
    }

    /// Everything received so far.
    pub fn requests(&self) -> Vec<Recorded> {
        self.inner.lock().unwrap().requests.clone()
    }

    /// The most recent request.
    pub fn last_request(&self) -> Recorded {
        self.requests().pop().expect("no request recorded")
    }
}

fn assign_id(next_id: &mut i64, row: &mut Value) {
    if let Value::Object(map) = row {
        if !map.contains_key("id") {
            map.insert("id".to_string(), json!(*next_id));
            *next_id += 1;
        }
    }
}

async fn handle(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    let query = uri.query().unwrap_or("").to_string();
    let mut inner = state.inner.lock().unwrap();
    inner.requests.push(Recorded {
        method: method.clone(),
        path: path.clone(),
        query: query.clone(),
        headers,
        body: body.clone(),
    });

    if let Some(scripted) = inner.scripted.get(&(method.clone(), path.clone())).cloned() {
        return (scripted.status, scripted.body).into_response();
    }

    let (table_prefix, storage_prefix) = match state.provider {
        BackendProvider::Forge => ("/api/database/", "/api/storage/buckets/"),
        BackendProvider::Supabase => ("/rest/v1/", "/storage/v1/object/"),
    };

    if let Some(table) = path.strip_prefix(table_prefix) {
        let table = table.to_string();
        return table_op(&mut inner, &method, &table, &query, &body);
    }
    if let Some(rest) = path.strip_prefix(storage_prefix) {
        let segments: Vec<&str> = rest.split('/').collect();
        let key = segments.last().copied().unwrap_or_default();
        let bucket = segments.first().copied().unwrap_or_default();
        let key = inner.assigned_key.clone().unwrap_or_else(|| key.to_string());
        let body = match state.provider {
            BackendProvider::Forge => json!({ "key": key, "bucket": bucket }),
            BackendProvider::Supabase => json!({ "Key": format!("{bucket}/{key}") }),
        };
        return (StatusCode::OK, axum::Json(body)).into_response();
    }
    (StatusCode::NOT_FOUND, axum::Json(json!({ "message": "no such route" }))).into_response()
}

fn table_op(inner: &mut Inner, method: &Method, table: &str, query: &str, body: &Bytes) -> Response {
    let params: Vec<(String, String)> = url::form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect();

    match *method {
        Method::GET => {
            let mut rows: Vec<Value> = inner
                .tables
                .get(table)
                .map(|rows| rows.iter().filter(|r| matches(r, &params)).cloned().collect())
                .unwrap_or_default();
            if let Some((_, order)) = params.iter().find(|(k, _)| k == "order") {
                sort_rows(&mut rows, order);
            }
            if let Some((_, limit)) = params.iter().find(|(k, _)| k == "limit") {
                rows.truncate(limit.parse().unwrap_or(usize::MAX));
            }
            (StatusCode::OK, axum::Json(Value::Array(rows))).into_response()
        }
        Method::POST => {
            let Ok(Value::Array(new_rows)) = serde_json::from_slice::<Value>(body) else {
                return (StatusCode::BAD_REQUEST, axum::Json(json!({ "message": "expected an array" })))
                    .into_response();
            };
            let mut created = Vec::new();
            for mut row in new_rows {
                assign_id(&mut inner.next_id, &mut row);
                created.push(row.clone());
                inner.tables.entry(table.to_string()).or_default().push(row);
            }
            (StatusCode::CREATED, axum::Json(Value::Array(created))).into_response()
        }
        Method::PATCH => {
            let Ok(Value::Object(patch)) = serde_json::from_slice::<Value>(body) else {
                return (StatusCode::BAD_REQUEST, axum::Json(json!({ "message": "expected an object" })))
                    .into_response();
            };
            let mut updated = Vec::new();
            for row in inner.tables.entry(table.to_string()).or_default() {
                if matches(row, &params) {
                    merge(row, &patch);
                    updated.push(row.clone());
                }
            }
            (StatusCode::OK, axum::Json(Value::Array(updated))).into_response()
        }
        Method::DELETE => {
            if let Some(rows) = inner.tables.get_mut(table) {
                rows.retain(|r| !matches(r, &params));
            }
            StatusCode::NO_CONTENT.into_response()
        }
        _ => StatusCode::METHOD_NOT_ALLOWED.into_response(),
    }
}

fn merge(row: &mut Value, patch: &Map<String, Value>) {
    if let Value::Object(map) = row {
        for (k, v) in patch {
            map.insert(k.clone(), v.clone());
        }
    }
}

fn cell(row: &Value, column: &str) -> String {
    match row.get(column) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => "null".to_string(),
        Some(other) => other.to_string(),
    }
}

fn matches(row: &Value, params: &[(String, String)]) -> bool {
    params
        .iter()
        .filter(|(k, _)| !matches!(k.as_str(), "select" | "order" | "limit"))
        .all(|(column, filter)| {
            let actual = cell(row, column);
            match filter.split_once('.') {
                Some(("eq", value)) => actual == value,
                Some(("neq", value)) => actual != value,
                Some(("is", "null")) => actual == "null",
                _ => false,
            }
        })
}

fn sort_rows(rows: &mut [Value], order: &str) {
    let (column, direction) = order.split_once('.').unwrap_or((order, "asc"));
    rows.sort_by(|a, b| {
        let ord = cell(a, column).cmp(&cell(b, column));
        if direction == "desc" { ord.reverse() } else { ord }
    });
}
