//! CRUD client for the hosted table API.

use std::sync::Arc;

use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::error::ClientError;
use crate::provider::ProviderProfile;
use crate::query::{BuiltQuery, Filters, QueryBuilder, QuerySpec};
use crate::session::SessionStore;
use crate::signer::RequestSigner;

/// One record or several.
///
/// `insert` answers in the shape it was given: `One` in, `One` out;
/// `Many` in, `Many` out, even for a single element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Records<T> {
    /// A single record.
    One(T),
    /// A batch.
    Many(Vec<T>),
}

impl<T> Records<T> {
    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::One(_) => 1,
            Self::Many(rows) => rows.len(),
        }
    }

    /// True for an empty batch.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Records as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        match self {
            Self::One(row) => std::slice::from_ref(row),
            Self::Many(rows) => rows,
        }
    }

    /// Records as a vector.
    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(row) => vec![row],
            Self::Many(rows) => rows,
        }
    }
}

impl<T> From<Vec<T>> for Records<T> {
    fn from(rows: Vec<T>) -> Self {
        Self::Many(rows)
    }
}

/// State shared by the table and storage clients.
#[derive(Debug)]
pub(crate) struct Connection {
    pub(crate) http: reqwest::Client,
    pub(crate) base_url: Url,
    pub(crate) profile: ProviderProfile,
    pub(crate) signer: RequestSigner,
    pub(crate) sessions: SessionStore,
    pub(crate) queries: QueryBuilder,
}

impl Connection {
    /// Headers for one call, signed with the current session.
    pub(crate) fn headers(&self, overrides: &HeaderMap) -> HeaderMap {
        let session = self.sessions.get_session();
        self.signer.sign(session.as_ref(), overrides)
    }

    fn endpoint(&self, built: &BuiltQuery) -> Result<Url, ClientError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let raw = format!("{base}{}", built.path_and_query());
        Url::parse(&raw).map_err(|err| ClientError::InvalidUrl(format!("{raw}: {err}")))
    }
}

/// Typed select / insert / update / delete against provider tables.
///
/// Each call is a single attempt. Provider and transport failures come
/// back as [`ClientError`]; nothing panics across this boundary.
#[derive(Debug, Clone)]
pub struct TableClient {
    conn: Arc<Connection>,
}

impl TableClient {
    pub(crate) const fn new(conn: Arc<Connection>) -> Self {
        Self { conn }
    }

    /// Reads rows. An empty table or empty body yields an empty vector.
    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        spec: &QuerySpec,
    ) -> Result<Vec<T>, ClientError> {
        let built = self.conn.queries.build(table, spec);
        let body = self.send(Method::GET, table, &built, None).await?;
        decode_rows(parse_body(body.as_deref())?).map(Option::unwrap_or_default)
    }

    /// Inserts one or many records, answering in the same shape.
    ///
    /// The wire body is always an array.
    pub async fn insert<T: Serialize, R: DeserializeOwned>(
        &self,
        table: &str,
        records: Records<T>,
    ) -> Result<Records<R>, ClientError> {
        let payload = encode(records.as_slice())?;
        let built = self.conn.queries.build(table, &QuerySpec::new());
        let body = self.send(Method::POST, table, &built, Some(payload)).await?;
        let mut rows: Vec<R> = decode_rows(parse_body(body.as_deref())?)?.unwrap_or_default();

        match records {
            Records::Many(_) => Ok(Records::Many(rows)),
            Records::One(_) if rows.is_empty() => Err(ClientError::Parse(format!(
                "insert into '{table}' returned no row"
            ))),
            Records::One(_) => Ok(Records::One(rows.swap_remove(0))),
        }
    }

    /// Inserts a single record and returns the stored row.
    pub async fn insert_one<T: Serialize, R: DeserializeOwned>(
        &self,
        table: &str,
        record: &T,
    ) -> Result<R, ClientError> {
        match self.insert(table, Records::One(record)).await? {
            Records::One(row) => Ok(row),
            Records::Many(rows) => rows.into_iter().next().ok_or_else(|| {
                ClientError::Parse(format!("insert into '{table}' returned no row"))
            }),
        }
    }

    /// Inserts a batch and returns the stored rows.
    pub async fn insert_many<T: Serialize, R: DeserializeOwned>(
        &self,
        table: &str,
        records: &[T],
    ) -> Result<Vec<R>, ClientError> {
        let rows = records.iter().collect();
        Ok(self.insert(table, Records::Many(rows)).await?.into_vec())
    }

    /// Patches every row matching `filters`.
    ///
    /// Returns the updated rows, or `None` when the provider sends no body.
    /// Zero matching rows is success.
    pub async fn update<P: Serialize, R: DeserializeOwned>(
        &self,
        table: &str,
        filters: &Filters,
        patch: &P,
    ) -> Result<Option<Vec<R>>, ClientError> {
        guard_unbounded("update", table, filters)?;
        let payload = encode(patch)?;
        let built = self.conn.queries.build_filtered(table, filters);
        let body = self.send(Method::PATCH, table, &built, Some(payload)).await?;
        decode_rows(parse_body(body.as_deref())?)
    }

    /// Deletes every row matching `filters`. The response body is ignored.
    pub async fn delete(&self, table: &str, filters: &Filters) -> Result<(), ClientError> {
        guard_unbounded("delete", table, filters)?;
        let built = self.conn.queries.build_filtered(table, filters);
        self.send(Method::DELETE, table, &built, None).await?;
        Ok(())
    }

    /// Sends one request and returns the raw body of a 2xx response.
    async fn send(
        &self,
        method: Method,
        table: &str,
        built: &BuiltQuery,
        payload: Option<Vec<u8>>,
    ) -> Result<Option<String>, ClientError> {
        let url = self.conn.endpoint(built)?;
        debug!(%method, table, path = %url.path(), query = url.query().unwrap_or(""), "table request");

        let mut request = self
            .conn
            .http
            .request(method.clone(), url)
            .headers(self.conn.headers(&HeaderMap::new()));
        if let Some(payload) = payload {
            request = request.body(payload);
        }

        let response = request.send().await.map_err(|err| {
            warn!(%method, table, error = %err, "table request did not complete");
            ClientError::network(&err)
        })?;
        let status = response.status();
        let text = response.text().await.map_err(|err| ClientError::network(&err))?;

        if !status.is_success() {
            let err = ClientError::request_failed(status.as_u16(), &text);
            warn!(%method, table, status = status.as_u16(), message = %err.message(), "table request rejected");
            return Err(err);
        }
        if status == StatusCode::NO_CONTENT || text.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(text))
    }
}

fn guard_unbounded(verb: &'static str, table: &str, filters: &Filters) -> Result<(), ClientError> {
    if filters.is_empty() && !filters.allows_unbounded() {
        return Err(ClientError::UnboundedMutation {
            verb,
            table: table.to_string(),
        });
    }
    Ok(())
}

fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, ClientError> {
    serde_json::to_vec(value).map_err(|err| ClientError::Encode(format!("request body: {err}")))
}

fn parse_body(body: Option<&str>) -> Result<Option<Value>, ClientError> {
    body.map(|text| {
            serde_json::from_str(text)
                .map_err(|err| ClientError::Parse(format!("response body: {err}")))
        })
        .transpose()
}

/// Rows from a parsed body. A bare object counts as one row; `null` as none.
fn decode_rows<R: DeserializeOwned>(value: Option<Value>) -> Result<Option<Vec<R>>, ClientError> {
    let rows = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Array(rows)) => rows,
        Some(row @ Value::Object(_)) => vec![row],
        Some(other) => {
            return Err(ClientError::Parse(format!(
                "expected rows, got {other}"
            )));
        }
    };
    rows.into_iter()
        .map(|row| {
            serde_json::from_value(row).map_err(|err| ClientError::Parse(format!("row: {err}")))
        })
        .collect::<Result<Vec<R>, _>>()
        .map(Some)
}
