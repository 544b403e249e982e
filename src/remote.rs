//! Remote collections: one logical backend table per entity type.
//!
//! [`Entity`] describes how a record maps onto its table and how it is
//! searched and filtered locally. [`RemoteCollection`] is the list / create /
//! update / delete seam the view-models depend on; [`RestCollection`] is the
//! real implementation over [`SupabaseClient`].

use std::fmt::{Debug, Display};
use std::marker::PhantomData;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::api::SupabaseClient;
use crate::error::{RemoteError, ValidationError};
use crate::query::{key_params, ListQuery};

/// Which write a draft is being prepared for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteKind {
    Insert,
    Update,
}

/// A locally held, possibly incomplete record under edit.
pub trait Draft: Clone + Default + Debug + Send + Sync + 'static {
    /// Set one field from its form input. Only parsing happens here;
    /// required-field checks wait for [`Draft::validate`].
    fn set_field(&mut self, name: &str, value: &str) -> Result<(), ValidationError>;

    fn validate(&self, kind: WriteKind) -> Result<(), ValidationError>;

    /// JSON object sent on insert.
    fn insert_payload(&self) -> Value;

    /// JSON object sent as the patch on update.
    fn update_payload(&self) -> Value;
}

pub trait Entity: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    type Key: Clone + Eq + Debug + Display + Send + Sync + 'static;
    type Draft: Draft;

    const TABLE: &'static str;
    /// PostgREST select clause, including embedded joins.
    const SELECT: &'static str = "*";
    const KEY_COLUMN: &'static str = "id";
    const LIST_LIMIT: Option<usize> = None;
    /// Filters accepted by the list view, by name.
    const FILTERS: &'static [&'static str] = &[];
    /// Singular display name, e.g. "Employee".
    const NAME: &'static str;
    /// Plural lower-case name, e.g. "employees".
    const PLURAL: &'static str;

    fn key(&self) -> &Self::Key;

    fn created_at(&self) -> DateTime<Utc>;

    /// Fields matched by the free-text search box.
    fn search_fields(&self) -> Vec<&str>;

    /// Current value of a named filter for this record.
    fn filter_value(&self, name: &str) -> Option<String>;

    /// Column a named filter maps to on the backend. `None` keeps the filter
    /// local only.
    fn filter_column(name: &str) -> Option<&'static str> {
        Self::FILTERS.iter().copied().find(|f| *f == name)
    }

    /// Draft pre-filled from this record for edit mode.
    fn to_draft(&self) -> Self::Draft;
}

#[async_trait]
pub trait RemoteCollection<T: Entity>: Send + Sync {
    async fn list(&self, query: &ListQuery) -> Result<Vec<T>, RemoteError>;

    /// Insert one row; returns it with the server-assigned key and timestamp.
    async fn create(&self, draft: &T::Draft) -> Result<T, RemoteError>;

    async fn update(&self, key: &T::Key, patch: &T::Draft) -> Result<T, RemoteError>;

    async fn delete(&self, key: &T::Key) -> Result<(), RemoteError>;
}

// ---------------------------------------------------------------------------
// REST implementation
// ---------------------------------------------------------------------------

pub struct RestCollection<T> {
    client: SupabaseClient,
    _entity: PhantomData<fn() -> T>,
}

impl<T> RestCollection<T> {
    pub fn new(client: SupabaseClient) -> Self {
        Self {
            client,
            _entity: PhantomData,
        }
    }
}

fn decode_rows<T: Entity>(value: Value) -> Result<Vec<T>, RemoteError> {
    match value {
        Value::Array(_) => {
            serde_json::from_value(value).map_err(|e| RemoteError::decode(T::TABLE, &e))
        }
        single @ Value::Object(_) => serde_json::from_value(single)
            .map(|row| vec![row])
            .map_err(|e| RemoteError::decode(T::TABLE, &e)),
        other => Err(RemoteError::new(
            None,
            format!("Unexpected response for {}: {other}", T::TABLE),
        )),
    }
}

fn single_row<T: Entity>(value: Value, key: Option<&T::Key>) -> Result<T, RemoteError> {
    decode_rows::<T>(value)?.into_iter().next().ok_or_else(|| match key {
        Some(key) => RemoteError::not_found(T::TABLE, &key.to_string()),
        None => RemoteError::new(None, format!("Insert into {} returned no row", T::TABLE)),
    })
}

#[async_trait]
impl<T: Entity> RemoteCollection<T> for RestCollection<T> {
    async fn list(&self, query: &ListQuery) -> Result<Vec<T>, RemoteError> {
        let value = self
            .client
            .request(Method::GET, T::TABLE, &query.to_params(), None)
            .await?;
        let rows = decode_rows::<T>(value)?;
        info!(table = T::TABLE, rows = rows.len(), "collection listed");
        Ok(rows)
    }

    async fn create(&self, draft: &T::Draft) -> Result<T, RemoteError> {
        let body = Value::Array(vec![draft.insert_payload()]);
        let params = vec![("select".to_string(), T::SELECT.to_string())];
        let value = self
            .client
            .request(Method::POST, T::TABLE, &params, Some(&body))
            .await?;
        let row = single_row::<T>(value, None)?;
        info!(table = T::TABLE, key = %row.key(), "row created");
        Ok(row)
    }

    async fn update(&self, key: &T::Key, patch: &T::Draft) -> Result<T, RemoteError> {
        let params = key_params(T::KEY_COLUMN, &key.to_string(), Some(T::SELECT));
        let body = patch.update_payload();
        let value = self
            .client
            .request(Method::PATCH, T::TABLE, &params, Some(&body))
            .await?;
        let row = single_row::<T>(value, Some(key))?;
        info!(table = T::TABLE, key = %key, "row updated");
        Ok(row)
    }

    async fn delete(&self, key: &T::Key) -> Result<(), RemoteError> {
        let params = key_params(T::KEY_COLUMN, &key.to_string(), None);
        let value = self
            .client
            .request(Method::DELETE, T::TABLE, &params, None)
            .await?;
        match value {
            // 204 without a representation: the row is gone.
            Value::Null => {}
            // A missing key answers with an empty representation.
            rows => {
                if decode_rows::<T>(rows)?.is_empty() {
                    return Err(RemoteError::not_found(T::TABLE, &key.to_string()));
                }
            }
        }
        info!(table = T::TABLE, key = %key, "row deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DashboardConfig;
    use crate::models::{Employee, EmployeeDraft, EmployeeRole};
    use crate::notify::RecordingSink;
    use crate::view_model::ListViewModel;
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    fn employee_row(name: &str) -> Value {
        json!({
            "id": "6f1c2f4e-8a51-4b8e-9a4e-0f1b2c3d4e5f",
            "full_name": name,
            "pin": "1234",
            "rfid_code": null,
            "role": "cashier",
            "is_active": true,
            "created_at": "2024-03-01T08:00:00+00:00",
        })
    }

    #[test]
    fn decode_rows_handles_array_and_object() {
        let rows = decode_rows::<Employee>(json!([employee_row("Jane Doe")])).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].full_name, "Jane Doe");
        assert_eq!(rows[0].role, EmployeeRole::Cashier);

        let rows = decode_rows::<Employee>(employee_row("John Smith")).unwrap();
        assert_eq!(rows[0].full_name, "John Smith");

        assert!(decode_rows::<Employee>(json!([])).unwrap().is_empty());
        assert!(decode_rows::<Employee>(Value::Null).is_err());
        assert!(decode_rows::<Employee>(json!(42)).is_err());
    }

    #[test]
    fn empty_update_result_is_not_found() {
        let key = uuid::Uuid::nil();
        let err = single_row::<Employee>(json!([]), Some(&key)).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn malformed_row_is_a_decode_error() {
        let err = decode_rows::<Employee>(json!([{ "id": "not-a-uuid" }])).unwrap_err();
        assert_eq!(err.status, None);
        assert!(err.message.contains("employees"));
    }

    // -- HTTP round trips against a local stub server -------------------------

    /// Serves one canned response per connection, in order, and keeps the
    /// raw requests it received.
    struct StubServer {
        base_url: String,
        requests: Arc<Mutex<Vec<String>>>,
    }

    impl StubServer {
        async fn start(responses: Vec<String>) -> Self {
            let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
            let addr = listener.local_addr().expect("local addr");
            let requests = Arc::new(Mutex::new(Vec::new()));
            let seen = Arc::clone(&requests);
            tokio::spawn(async move {
                for response in responses {
                    let Ok((mut socket, _)) = listener.accept().await else {
                        return;
                    };
                    let request = read_request(&mut socket).await;
                    seen.lock().unwrap().push(request);
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                }
            });
            Self {
                base_url: format!("http://{addr}"),
                requests,
            }
        }

        fn collection(&self) -> RestCollection<Employee> {
            let config = DashboardConfig::new(&self.base_url, "test-anon-key").expect("config");
            RestCollection::new(SupabaseClient::new(&config).expect("client"))
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap_or(0);
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
                let body_len = head
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + body_len {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn respond(status: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    /// Announces a longer body than it sends, then hangs up.
    fn truncated() -> String {
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 500\r\nConnection: close\r\n\r\n[{\"id\":".to_string()
    }

    #[tokio::test]
    async fn list_sends_auth_headers_and_all_filters_in_one_request() {
        let body = json!([employee_row("John Smith")]).to_string();
        let server = StubServer::start(vec![respond("200 OK", &body)]).await;
        let query = ListQuery::new("*").eq("role", "manager").newest_first();

        let rows = server.collection().list(&query).await.expect("list");

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].full_name, "John Smith");
        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0]
            .starts_with("GET /rest/v1/employees?select=*&role=eq.manager&order=created_at.desc "));
        let lower = requests[0].to_ascii_lowercase();
        assert!(lower.contains("apikey: test-anon-key"));
        assert!(lower.contains("authorization: bearer test-anon-key"));
        assert!(!lower.contains("prefer:"));
    }

    #[tokio::test]
    async fn list_error_body_becomes_remote_error() {
        let body = r#"{"code":"42703","message":"column employees.salary does not exist","details":null,"hint":null}"#;
        let server = StubServer::start(vec![respond("400 Bad Request", body)]).await;

        let err = server
            .collection()
            .list(&ListQuery::new("*").eq("salary", "high"))
            .await
            .unwrap_err();

        assert_eq!(err.status, Some(400));
        assert_eq!(err.code.as_deref(), Some("42703"));
        assert_eq!(err.message, "column employees.salary does not exist");
    }

    #[tokio::test]
    async fn create_posts_one_row_and_returns_representation() {
        let body = json!([employee_row("Jane Doe")]).to_string();
        let server = StubServer::start(vec![respond("201 Created", &body)]).await;
        let mut draft = EmployeeDraft::default();
        draft.set_field("full_name", "Jane Doe").unwrap();
        draft.set_field("pin", "1234").unwrap();

        let created = server.collection().create(&draft).await.expect("create");

        assert_eq!(created.full_name, "Jane Doe");
        let request = &server.requests()[0];
        assert!(request.starts_with("POST /rest/v1/employees?select=* "));
        assert!(request
            .to_ascii_lowercase()
            .contains("prefer: return=representation"));
        assert!(request.contains(r#""full_name":"Jane Doe""#));
    }

    #[tokio::test]
    async fn update_and_delete_of_missing_key_are_not_found() {
        let server = StubServer::start(vec![respond("200 OK", "[]"), respond("200 OK", "[]")]).await;
        let collection = server.collection();
        let key = uuid::Uuid::new_v4();

        let update_err = collection
            .update(&key, &EmployeeDraft::default())
            .await
            .unwrap_err();
        let delete_err = collection.delete(&key).await.unwrap_err();

        assert!(update_err.is_not_found());
        assert!(delete_err.is_not_found());
        let requests = server.requests();
        assert!(requests[0].starts_with(&format!("PATCH /rest/v1/employees?id=eq.{key}&select=* ")));
        assert!(requests[1].starts_with(&format!("DELETE /rest/v1/employees?id=eq.{key} ")));
        for request in &requests {
            assert!(request
                .to_ascii_lowercase()
                .contains("prefer: return=representation"));
        }
    }

    #[tokio::test]
    async fn delete_without_representation_succeeds() {
        let server = StubServer::start(vec![
            "HTTP/1.1 204 No Content\r\nConnection: close\r\n\r\n".to_string(),
        ])
        .await;

        let result = server.collection().delete(&uuid::Uuid::new_v4()).await;

        assert_eq!(result, Ok(()));
    }

    #[tokio::test]
    async fn empty_list_body_is_an_error() {
        let server = StubServer::start(vec![respond("200 OK", "")]).await;

        let err = server
            .collection()
            .list(&ListQuery::new("*"))
            .await
            .unwrap_err();

        assert_eq!(err.status, Some(200));
    }

    #[tokio::test]
    async fn truncated_body_keeps_previous_snapshot() {
        let body = json!([employee_row("Jane Doe")]).to_string();
        let server = StubServer::start(vec![respond("200 OK", &body), truncated()]).await;
        let sink = Arc::new(RecordingSink::new());
        let mut vm: ListViewModel<Employee> =
            ListViewModel::new(Arc::new(server.collection()), sink.clone());

        assert_eq!(vm.refresh().await, Ok(1));
        let err = vm.refresh().await.unwrap_err();

        assert_eq!(err.status, None);
        assert_eq!(vm.snapshot().len(), 1);
        assert_eq!(vm.snapshot()[0].full_name, "Jane Doe");
        assert_eq!(vm.last_error(), Some(&err));
        assert!(sink.last().expect("error notification").is_error());
    }
}
