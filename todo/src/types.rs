//! Domain types for the task list.
//!
//! A todo item carries one of two identities: a temporary id minted locally
//! from the creation timestamp, or the id the remote store assigned. Items
//! created offline keep their temporary id for the whole session; in remote
//! mode an item only joins the collection once the store has confirmed it.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use tasklist_macros::Action;

/// Client-generated identity, derived from the creation time in milliseconds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LocalId(i64);

impl LocalId {
    /// Creates a `LocalId` from epoch milliseconds
    #[must_use]
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Returns the epoch milliseconds this id was derived from
    #[must_use]
    pub const fn as_millis(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for LocalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity assigned by the remote store
///
/// Stores disagree on whether ids are numbers or strings, so both are
/// accepted on the wire and kept as text.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ServerId(String);

impl ServerId {
    /// Creates a `ServerId` from its textual form
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as it appears in request paths
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ServerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ServerId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(serde_json::Number),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Number(n) => Self(n.to_string()),
            RawId::Text(s) => Self(s),
        })
    }
}

/// Identity of a todo item
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TodoId {
    /// Minted locally, not (yet) known to the remote store
    Temporary(LocalId),
    /// Assigned by the remote store
    Confirmed(ServerId),
}

impl TodoId {
    /// Returns the server id for confirmed items
    #[must_use]
    pub const fn server_id(&self) -> Option<&ServerId> {
        match self {
            Self::Confirmed(id) => Some(id),
            Self::Temporary(_) => None,
        }
    }

    /// Returns true while the id is client-generated
    #[must_use]
    pub const fn is_temporary(&self) -> bool {
        matches!(self, Self::Temporary(_))
    }
}

impl std::fmt::Display for TodoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Temporary(id) => write!(f, "tmp-{id}"),
            Self::Confirmed(id) => write!(f, "{id}"),
        }
    }
}

impl From<ServerId> for TodoId {
    fn from(id: ServerId) -> Self {
        Self::Confirmed(id)
    }
}

impl From<LocalId> for TodoId {
    fn from(id: LocalId) -> Self {
        Self::Temporary(id)
    }
}

/// Card colour, picked once at creation from a fixed palette
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorTag {
    /// `#FCE4EC`
    #[serde(rename = "#FCE4EC")]
    Pink,
    /// `#E8F5E9`
    #[serde(rename = "#E8F5E9")]
    Green,
    /// `#FFFDE7`
    #[serde(rename = "#FFFDE7")]
    Yellow,
    /// `#E1F5FE`
    #[serde(rename = "#E1F5FE")]
    Blue,
    /// `#F3E5F5`
    #[serde(rename = "#F3E5F5")]
    Purple,
}

impl ColorTag {
    /// The whole palette, in display order
    pub const PALETTE: [Self; 5] = [
        Self::Pink,
        Self::Green,
        Self::Yellow,
        Self::Blue,
        Self::Purple,
    ];

    /// Hex code of the colour
    #[must_use]
    pub const fn hex(self) -> &'static str {
        match self {
            Self::Pink => "#FCE4EC",
            Self::Green => "#E8F5E9",
            Self::Yellow => "#FFFDE7",
            Self::Blue => "#E1F5FE",
            Self::Purple => "#F3E5F5",
        }
    }

    /// Looks up a palette entry by hex code (case-insensitive)
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        Self::PALETTE
            .into_iter()
            .find(|color| color.hex().eq_ignore_ascii_case(hex))
    }
}

impl std::fmt::Display for ColorTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.hex())
    }
}

/// Formats a creation time the way the cards display it
#[must_use]
pub fn display_timestamp(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local)
        .format("%-m/%-d/%Y, %-I:%M:%S %p")
        .to_string()
}

/// A single todo item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    /// Identity
    pub id: TodoId,
    /// Display title
    pub title: String,
    /// Free text, may be empty
    pub description: String,
    /// Human-readable creation time
    pub created_at: Option<String>,
    /// Card colour
    pub color: Option<ColorTag>,
}

impl TodoItem {
    /// Creates an item without creation metadata
    #[must_use]
    pub fn new(id: TodoId, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: description.into(),
            created_at: None,
            color: None,
        }
    }

    /// Case-insensitive substring match on title or description
    ///
    /// `needle` must already be lowercase.
    #[must_use]
    pub fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
    }

    /// Takes the server's record, keeping local creation metadata the
    /// server did not send back
    #[must_use]
    pub fn reconciled_with(self, local: &Self) -> Self {
        Self {
            created_at: self.created_at.or_else(|| local.created_at.clone()),
            color: self.color.or(local.color),
            ..self
        }
    }

    /// Create payload for this item (identity is never sent)
    #[must_use]
    pub fn to_new_todo(&self) -> NewTodo {
        NewTodo {
            title: self.title.clone(),
            description: self.description.clone(),
            date_time: self.created_at.clone(),
            color: self.color,
        }
    }
}

/// Body of a create request: an item without identity
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTodo {
    /// Display title
    pub title: String,
    /// Free text
    pub description: String,
    /// Human-readable creation time
    #[serde(rename = "dateTime", default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    /// Card colour
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorTag>,
}

/// Body of an update request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoPatch {
    /// New title
    pub title: String,
    /// New description
    pub description: String,
}

/// Draft state of the one item currently being edited
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditSession {
    /// Item being edited
    pub id: TodoId,
    /// Draft title
    pub title: String,
    /// Draft description
    pub description: String,
}

impl EditSession {
    /// Starts a session seeded from the item's current values
    #[must_use]
    pub fn for_item(item: &TodoItem) -> Self {
        Self {
            id: item.id.clone(),
            title: item.title.clone(),
            description: item.description.clone(),
        }
    }

    /// Update payload carrying the draft values
    #[must_use]
    pub fn to_patch(&self) -> TodoPatch {
        TodoPatch {
            title: self.title.clone(),
            description: self.description.clone(),
        }
    }
}

/// State of the task list
///
/// `items` is the collection rendered to the user, in insertion order.
/// Remote creates wait in `pending` until the store answers.
#[derive(Clone, Debug, Default)]
pub struct TodoState {
    pub(crate) items: Vec<TodoItem>,
    pub(crate) edit: Option<EditSession>,
    pub(crate) pending: Vec<TodoItem>,
    pub(crate) revisions: HashMap<TodoId, u64>,
    pub(crate) last_local_id: Option<LocalId>,
}

impl TodoState {
    /// Creates an empty state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a state holding `items`; later duplicates of an id are dropped
    #[must_use]
    pub fn with_items(items: Vec<TodoItem>) -> Self {
        let mut state = Self::new();
        state.replace_items(items);
        state
    }

    /// The collection, in insertion order
    #[must_use]
    pub fn items(&self) -> &[TodoItem] {
        &self.items
    }

    /// Number of items in the collection
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when the collection is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns an item by id
    #[must_use]
    pub fn get(&self, id: &TodoId) -> Option<&TodoItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Checks if an item exists
    #[must_use]
    pub fn exists(&self, id: &TodoId) -> bool {
        self.get(id).is_some()
    }

    /// The active edit, if any
    #[must_use]
    pub const fn edit_session(&self) -> Option<&EditSession> {
        self.edit.as_ref()
    }

    /// Creates still waiting for the remote store
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Items whose title or description contains `query`, ignoring case
    ///
    /// An empty query returns the whole collection. Order is preserved.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&TodoItem> {
        if query.is_empty() {
            return self.items.iter().collect();
        }
        let needle = query.to_lowercase();
        self.items.iter().filter(|item| item.matches(&needle)).collect()
    }

    pub(crate) fn get_mut(&mut self, id: &TodoId) -> Option<&mut TodoItem> {
        self.items.iter_mut().find(|item| &item.id == id)
    }

    /// Inserts `item`, or replaces the entry that already has its id
    pub(crate) fn upsert(&mut self, item: TodoItem) {
        match self.get_mut(&item.id) {
            Some(existing) => *existing = item,
            None => self.items.push(item),
        }
    }

    pub(crate) fn remove(&mut self, id: &TodoId) -> Option<TodoItem> {
        let index = self.items.iter().position(|item| &item.id == id)?;
        self.revisions.remove(id);
        if self.edit.as_ref().is_some_and(|edit| &edit.id == id) {
            self.edit = None;
        }
        Some(self.items.remove(index))
    }

    pub(crate) fn replace_items(&mut self, items: Vec<TodoItem>) {
        self.items.clear();
        for item in items {
            if !self.exists(&item.id) {
                self.items.push(item);
            }
        }
        if self.edit.as_ref().is_some_and(|edit| !self.exists(&edit.id)) {
            self.edit = None;
        }

        let items = &self.items;
        self.revisions.retain(|id, _| items.iter().any(|item| &item.id == id));

        let highest_temporary = self
            .items
            .iter()
            .filter_map(|item| match item.id {
                TodoId::Temporary(local) => Some(local),
                TodoId::Confirmed(_) => None,
            })
            .max();
        self.last_local_id = self.last_local_id.max(highest_temporary);
    }

    pub(crate) fn take_pending(&mut self, temp_id: LocalId) -> Option<TodoItem> {
        let id = TodoId::Temporary(temp_id);
        let index = self.pending.iter().position(|item| item.id == id)?;
        Some(self.pending.remove(index))
    }

    /// Mints a temporary id from `now`, bumped past the last one issued and
    /// past any temporary id still in the collection or awaiting the store
    pub(crate) fn next_local_id(&mut self, now: DateTime<Utc>) -> LocalId {
        let millis = now.timestamp_millis();
        let mut next = match self.last_local_id {
            Some(last) if last.as_millis() >= millis => LocalId::from_millis(last.as_millis() + 1),
            _ => LocalId::from_millis(millis),
        };
        while self.local_id_in_use(next) {
            next = LocalId::from_millis(next.as_millis() + 1);
        }
        self.last_local_id = Some(next);
        next
    }

    fn local_id_in_use(&self, local: LocalId) -> bool {
        let id = TodoId::Temporary(local);
        self.exists(&id) || self.pending.iter().any(|item| item.id == id)
    }

    /// Starts a new revision of `id` and returns it
    pub(crate) fn bump_revision(&mut self, id: &TodoId) -> u64 {
        let revision = self.revisions.entry(id.clone()).or_insert(0);
        *revision += 1;
        *revision
    }

    /// True if a newer revision of `id` has been issued since `revision`
    pub(crate) fn is_stale(&self, id: &TodoId, revision: u64) -> bool {
        self.revisions
            .get(id)
            .is_some_and(|&current| current > revision)
    }
}

/// Actions representing commands and remote outcomes for the task list
#[derive(Action, Clone, Debug, Serialize, Deserialize)]
pub enum TodoAction {
    // ========== Commands ==========
    /// Command: Replace the collection with the remote store's contents
    #[command]
    LoadAll,

    /// Command: Create an item
    #[command]
    Add {
        /// Title; blank titles are ignored
        title: String,
        /// Description
        description: String,
    },

    /// Command: Start editing an item
    #[command]
    BeginEdit {
        /// Item to edit
        id: TodoId,
    },

    /// Command: Replace the draft values of the active edit
    #[command]
    UpdateDraft {
        /// Draft title
        title: String,
        /// Draft description
        description: String,
    },

    /// Command: Drop the active edit without applying it
    #[command]
    CancelEdit,

    /// Command: Apply the active edit
    #[command]
    CommitEdit,

    /// Command: Delete an item
    #[command]
    Delete {
        /// Item to delete
        id: TodoId,
    },

    // ========== Events ==========
    /// Event: The remote store listed its items
    #[event]
    Loaded {
        /// Items in server order
        items: Vec<TodoItem>,
    },

    /// Event: Listing failed
    #[event]
    LoadFailed {
        /// Error message
        error: String,
    },

    /// Event: The remote store accepted a create
    #[event]
    Created {
        /// Temporary id the item had while pending
        temp_id: LocalId,
        /// Canonical record returned by the store
        item: TodoItem,
    },

    /// Event: A create was rejected or never arrived
    #[event]
    CreateFailed {
        /// Temporary id of the dropped item
        temp_id: LocalId,
        /// Error message
        error: String,
    },

    /// Event: The remote store accepted an update
    #[event]
    Updated {
        /// Item that was updated
        id: TodoId,
        /// Revision the request was issued at
        revision: u64,
        /// Canonical record returned by the store
        item: TodoItem,
    },

    /// Event: An update failed
    #[event]
    UpdateFailed {
        /// Item that was being updated
        id: TodoId,
        /// Revision the request was issued at
        revision: u64,
        /// The draft that could not be saved
        draft: EditSession,
        /// Error message
        error: String,
    },

    /// Event: The remote store deleted an item
    #[event]
    Deleted {
        /// Item that was deleted
        id: TodoId,
    },

    /// Event: A delete failed
    #[event]
    DeleteFailed {
        /// Item that is kept
        id: TodoId,
        /// Error message
        error: String,
    },
}
