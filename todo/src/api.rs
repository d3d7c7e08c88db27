//! Remote store client.
//!
//! [`TodoApi`] is the seam between the reducer and the REST backend. Each
//! call is one best-effort attempt: no retries, no timeouts, no batching.
//! Failures are logged here, with the operation and target id, before they
//! are handed back to the caller.

use crate::types::{ColorTag, NewTodo, ServerId, TodoId, TodoItem, TodoPatch};
use reqwest::{Client, Response, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Default base address of the REST backend
pub const DEFAULT_BASE_URL: &str = "http://localhost:3001/api";

/// Any failure of a remote store call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request never got a response (connection refused, DNS, ...)
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The store answered with a non-success status
    #[error("Remote store returned status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, possibly empty
        body: String,
    },

    /// The response body was not what the store promised
    #[error("Response parsing failed: {0}")]
    ResponseParseFailed(String),
}

/// Boxed future returned by [`TodoApi`] methods
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, TransportError>> + Send + 'a>>;

/// Operations offered by the remote store
///
/// This trait uses explicit `Pin<Box<dyn Future>>` returns so it stays
/// object-safe and can live in the environment as `Arc<dyn TodoApi>`.
pub trait TodoApi: Send + Sync {
    /// Every item the store knows, in store order
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] on network, status, or decoding failure.
    fn list(&self) -> ApiFuture<'_, Vec<TodoItem>>;

    /// Creates an item and returns the store's record, with its id
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] on network, status, or decoding failure.
    fn create(&self, todo: NewTodo) -> ApiFuture<'_, TodoItem>;

    /// Replaces title and description of `id`
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] on failure, including an unknown id.
    fn update(&self, id: ServerId, patch: TodoPatch) -> ApiFuture<'_, TodoItem>;

    /// Removes `id`; the acknowledgement body is discarded
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] on failure, including an unknown id.
    fn delete(&self, id: ServerId) -> ApiFuture<'_, ()>;
}

/// A todo as the store sends it
#[derive(Debug, Deserialize)]
struct TodoRecord {
    #[serde(alias = "_id")]
    id: ServerId,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(rename = "dateTime", default)]
    date_time: Option<String>,
    #[serde(default)]
    color: Option<String>,
}

impl From<TodoRecord> for TodoItem {
    fn from(record: TodoRecord) -> Self {
        Self {
            id: record.id.into(),
            title: record.title,
            description: record.description,
            created_at: record.date_time,
            color: record.color.as_deref().and_then(ColorTag::from_hex),
        }
    }
}

/// [`TodoApi`] over HTTP + JSON
#[derive(Clone, Debug)]
pub struct HttpTodoApi {
    client: Client,
    base_url: String,
}

impl HttpTodoApi {
    /// Creates a client for the store rooted at `base_url`
    /// (for example `http://localhost:3001/api`)
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Creates a client reusing an existing `reqwest::Client`
    #[must_use]
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// Base address requests are sent to
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn todos_url(&self) -> String {
        format!("{}/todos", self.base_url)
    }

    /// Address of one todo; the id is percent-encoded as a single segment
    fn todo_url(&self, id: &ServerId) -> Result<Url, TransportError> {
        let mut url = Url::parse(&self.todos_url())
            .map_err(|e| TransportError::RequestFailed(format!("Invalid base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| TransportError::RequestFailed("Base URL has no path".to_string()))?
            .push(id.as_str());
        Ok(url)
    }

    async fn send(request: reqwest::RequestBuilder) -> Result<Response, TransportError> {
        let response = request
            .send()
            .await
            .map_err(|e| TransportError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(TransportError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, TransportError> {
        response
            .json::<T>()
            .await
            .map_err(|e| TransportError::ResponseParseFailed(e.to_string()))
    }
}

impl TodoApi for HttpTodoApi {
    fn list(&self) -> ApiFuture<'_, Vec<TodoItem>> {
        Box::pin(async move {
            let result: Result<Vec<TodoItem>, TransportError> = async {
                let response = Self::send(self.client.get(self.todos_url())).await?;
                let records: Vec<TodoRecord> = Self::decode(response).await?;
                Ok(records.into_iter().map(TodoItem::from).collect())
            }
            .await;

            result.inspect_err(|error| {
                tracing::error!(operation = "list", %error, "Error fetching todos");
            })
        })
    }

    fn create(&self, todo: NewTodo) -> ApiFuture<'_, TodoItem> {
        Box::pin(async move {
            let result: Result<TodoItem, TransportError> = async {
                let response = Self::send(self.client.post(self.todos_url()).json(&todo)).await?;
                let record: TodoRecord = Self::decode(response).await?;
                Ok(TodoItem::from(record))
            }
            .await;

            result.inspect_err(|error| {
                tracing::error!(
                    operation = "create",
                    title = %todo.title,
                    %error,
                    "Error creating todo"
                );
            })
        })
    }

    fn update(&self, id: ServerId, patch: TodoPatch) -> ApiFuture<'_, TodoItem> {
        Box::pin(async move {
            let result: Result<TodoItem, TransportError> = async {
                let url = self.todo_url(&id)?;
                let response = Self::send(self.client.put(url).json(&patch)).await?;
                let record: TodoRecord = Self::decode(response).await?;
                Ok(TodoItem::from(record))
            }
            .await;

            result.inspect_err(|error| {
                tracing::error!(operation = "update", %id, %error, "Error updating todo");
            })
        })
    }

    fn delete(&self, id: ServerId) -> ApiFuture<'_, ()> {
        Box::pin(async move {
            let result: Result<(), TransportError> = async {
                let url = self.todo_url(&id)?;
                Self::send(self.client.delete(url)).await.map(drop)
            }
            .await;

            result.inspect_err(|error| {
                tracing::error!(operation = "delete", %id, %error, "Error deleting todo");
            })
        })
    }
}

/// In-process [`TodoApi`] with sequential numeric ids
///
/// Used by the demo binary and by tests. [`InMemoryTodoApi::set_failing`]
/// makes every call fail with a 503 until switched back.
#[derive(Clone, Debug, Default)]
pub struct InMemoryTodoApi {
    inner: Arc<Mutex<InMemoryStore>>,
    failing: Arc<AtomicBool>,
}

#[derive(Debug, Default)]
struct InMemoryStore {
    records: Vec<TodoItem>,
    next_id: u64,
}

impl InMemoryTodoApi {
    /// Creates an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an `Arc`-wrapped instance for the environment
    #[must_use]
    pub fn shared(&self) -> Arc<dyn TodoApi> {
        Arc::new(self.clone())
    }

    /// Makes every subsequent call fail (or succeed again)
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Snapshot of the stored records
    #[must_use]
    pub fn records(&self) -> Vec<TodoItem> {
        self.inner
            .lock()
            .map(|store| store.records.clone())
            .unwrap_or_default()
    }

    fn with_store<T>(
        &self,
        operation: &'static str,
        f: impl FnOnce(&mut InMemoryStore) -> Result<T, TransportError>,
    ) -> Result<T, TransportError> {
        let result = if self.failing.load(Ordering::SeqCst) {
            Err(TransportError::Status {
                status: 503,
                body: "store unavailable".to_string(),
            })
        } else {
            self.inner.lock().map_or_else(
                |_| Err(TransportError::RequestFailed("store lock poisoned".to_string())),
                |mut store| f(&mut store),
            )
        };

        result.inspect_err(|error| {
            tracing::error!(operation, %error, "In-memory store call failed");
        })
    }
}

fn not_found(id: &ServerId) -> TransportError {
    TransportError::Status {
        status: 404,
        body: format!("todo {id} not found"),
    }
}

impl TodoApi for InMemoryTodoApi {
    fn list(&self) -> ApiFuture<'_, Vec<TodoItem>> {
        let result = self.with_store("list", |store| Ok(store.records.clone()));
        Box::pin(async move { result })
    }

    fn create(&self, todo: NewTodo) -> ApiFuture<'_, TodoItem> {
        let result = self.with_store("create", |store| {
            store.next_id += 1;
            let item = TodoItem {
                id: ServerId::new(store.next_id.to_string()).into(),
                title: todo.title,
                description: todo.description,
                created_at: todo.date_time,
                color: todo.color,
            };
            store.records.push(item.clone());
            Ok(item)
        });
        Box::pin(async move { result })
    }

    fn update(&self, id: ServerId, patch: TodoPatch) -> ApiFuture<'_, TodoItem> {
        let result = self.with_store("update", |store| {
            let target = TodoId::from(id.clone());
            let record = store
                .records
                .iter_mut()
                .find(|record| record.id == target)
                .ok_or_else(|| not_found(&id))?;
            record.title = patch.title;
            record.description = patch.description;
            Ok(record.clone())
        });
        Box::pin(async move { result })
    }

    fn delete(&self, id: ServerId) -> ApiFuture<'_, ()> {
        let result = self.with_store("delete", |store| {
            let target = TodoId::from(id.clone());
            let index = store
                .records
                .iter()
                .position(|record| record.id == target)
                .ok_or_else(|| not_found(&id))?;
            store.records.remove(index);
            Ok(())
        });
        Box::pin(async move { result })
    }
}
