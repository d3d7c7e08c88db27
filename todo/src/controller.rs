//! Async facade over the task list store.
//!
//! Each operation sends one command and waits until every effect it started,
//! including the store's answer, has been reduced. Callers that want to fire
//! and forget can use [`TodoController::send`] directly.

use crate::reducer::{TodoEnvironment, TodoReducer};
use crate::types::{EditSession, TodoAction, TodoId, TodoItem, TodoState};
use tasklist_runtime::{EffectHandle, Store, StoreError};

/// Store specialised for the task list
pub type TodoStore = Store<TodoState, TodoAction, TodoEnvironment, TodoReducer>;

/// User-facing operations on the task list
#[derive(Clone)]
pub struct TodoController {
    store: TodoStore,
}

impl TodoController {
    /// Controller over an empty collection
    #[must_use]
    pub fn new(env: TodoEnvironment) -> Self {
        Self::with_state(TodoState::new(), env)
    }

    /// Controller over an existing state
    #[must_use]
    pub fn with_state(state: TodoState, env: TodoEnvironment) -> Self {
        Self {
            store: Store::new(state, TodoReducer::new(), env),
        }
    }

    /// Underlying store
    #[must_use]
    pub const fn store(&self) -> &TodoStore {
        &self.store
    }

    /// Sends an action without waiting for its effects
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after shutdown.
    pub async fn send(&self, action: TodoAction) -> Result<EffectHandle, StoreError> {
        self.store.send(action).await
    }

    async fn dispatch(&self, action: TodoAction) -> Result<(), StoreError> {
        let mut handle = self.store.send(action).await?;
        handle.wait().await;
        Ok(())
    }

    /// Replaces the collection with the remote store's contents
    ///
    /// Does nothing offline. A failed fetch leaves the collection as it was.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after shutdown.
    pub async fn load_all(&self) -> Result<(), StoreError> {
        self.dispatch(TodoAction::LoadAll).await
    }

    /// Adds an item; blank titles are ignored
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after shutdown.
    pub async fn add(
        &self,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<(), StoreError> {
        self.dispatch(TodoAction::Add {
            title: title.into(),
            description: description.into(),
        })
        .await
    }

    /// Opens an edit session on `id`, replacing any previous one
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after shutdown.
    pub async fn begin_edit(&self, id: TodoId) -> Result<(), StoreError> {
        self.dispatch(TodoAction::BeginEdit { id }).await
    }

    /// Changes the draft of the active edit session
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after shutdown.
    pub async fn update_draft(
        &self,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<(), StoreError> {
        self.dispatch(TodoAction::UpdateDraft {
            title: title.into(),
            description: description.into(),
        })
        .await
    }

    /// Closes the edit session without saving
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after shutdown.
    pub async fn cancel_edit(&self) -> Result<(), StoreError> {
        self.dispatch(TodoAction::CancelEdit).await
    }

    /// Saves the active draft
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after shutdown.
    pub async fn commit_edit(&self) -> Result<(), StoreError> {
        self.dispatch(TodoAction::CommitEdit).await
    }

    /// Removes an item
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after shutdown.
    pub async fn delete(&self, id: TodoId) -> Result<(), StoreError> {
        self.dispatch(TodoAction::Delete { id }).await
    }

    /// Items whose title or description contains `query`, ignoring case,
    /// in collection order. An empty query returns everything.
    pub async fn search(&self, query: &str) -> Vec<TodoItem> {
        self.store
            .state(|state| state.search(query).into_iter().cloned().collect())
            .await
    }

    /// Snapshot of the collection
    pub async fn items(&self) -> Vec<TodoItem> {
        self.store.state(|state| state.items().to_vec()).await
    }

    /// Snapshot of the active edit session
    pub async fn edit_session(&self) -> Option<EditSession> {
        self.store.state(|state| state.edit_session().cloned()).await
    }

    /// Number of items in the collection
    pub async fn len(&self) -> usize {
        self.store.state(TodoState::len).await
    }

    /// Whether the collection is empty
    pub async fn is_empty(&self) -> bool {
        self.store.state(TodoState::is_empty).await
    }

    /// Creates still waiting on the remote store
    pub async fn pending_count(&self) -> usize {
        self.store.state(TodoState::pending_count).await
    }
}

impl std::fmt::Debug for TodoController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoController")
            .field("environment", self.store.environment())
            .finish_non_exhaustive()
    }
}
