//! Reducer logic for the task list.
//!
//! Commands validate against the current state and either change it
//! directly (offline) or start a remote call (remote). Remote outcomes come
//! back as event actions, which this reducer reconciles into the collection.

use crate::api::TodoApi;
use crate::types::{
    ColorTag, EditSession, LocalId, TodoAction, TodoId, TodoItem, TodoState, display_timestamp,
};
use rand::Rng;
use std::sync::Arc;
use tasklist_core::{SmallVec, effect::Effect, environment::Clock, reducer::Reducer, smallvec};

/// Picks the colour of a new card
pub trait ColorPicker: Send + Sync {
    /// Returns one palette entry
    fn pick(&self) -> ColorTag;
}

/// Uniformly random palette entry
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomColorPicker;

impl ColorPicker for RandomColorPicker {
    fn pick(&self) -> ColorTag {
        let index = rand::thread_rng().gen_range(0..ColorTag::PALETTE.len());
        ColorTag::PALETTE[index]
    }
}

/// Always the same colour
#[derive(Clone, Copy, Debug)]
pub struct FixedColorPicker(pub ColorTag);

impl ColorPicker for FixedColorPicker {
    fn pick(&self) -> ColorTag {
        self.0
    }
}

/// Where the collection is persisted
#[derive(Clone)]
pub enum SyncMode {
    /// In memory only; every command applies immediately
    Offline,
    /// Mirrored to a remote store; changes apply once the store confirms
    Remote(Arc<dyn TodoApi>),
}

impl std::fmt::Debug for SyncMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Offline => f.write_str("Offline"),
            Self::Remote(_) => f.write_str("Remote(<api>)"),
        }
    }
}

/// What happens to the draft when a remote update fails
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EditFailurePolicy {
    /// The draft is lost
    #[default]
    Discard,
    /// The draft becomes the active edit again, unless another edit has
    /// started since
    Restore,
}

/// Environment dependencies for the Todo reducer
#[derive(Clone)]
pub struct TodoEnvironment {
    /// Clock for timestamps and temporary ids
    pub clock: Arc<dyn Clock>,
    /// Colour choice for new items
    pub colors: Arc<dyn ColorPicker>,
    /// Persistence mode
    pub sync: SyncMode,
    /// Draft handling on update failure
    pub edit_failure: EditFailurePolicy,
}

impl TodoEnvironment {
    /// In-memory environment with random colours
    #[must_use]
    pub fn offline(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            colors: Arc::new(RandomColorPicker),
            sync: SyncMode::Offline,
            edit_failure: EditFailurePolicy::default(),
        }
    }

    /// Remote-backed environment with random colours
    #[must_use]
    pub fn remote(clock: Arc<dyn Clock>, api: Arc<dyn TodoApi>) -> Self {
        Self {
            sync: SyncMode::Remote(api),
            ..Self::offline(clock)
        }
    }

    /// Replaces the colour picker
    #[must_use]
    pub fn with_colors(mut self, colors: Arc<dyn ColorPicker>) -> Self {
        self.colors = colors;
        self
    }

    /// Replaces the edit failure policy
    #[must_use]
    pub const fn with_edit_failure(mut self, policy: EditFailurePolicy) -> Self {
        self.edit_failure = policy;
        self
    }
}

impl std::fmt::Debug for TodoEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoEnvironment")
            .field("sync", &self.sync)
            .field("edit_failure", &self.edit_failure)
            .finish_non_exhaustive()
    }
}

type Effects = SmallVec<[Effect<TodoAction>; 4]>;

/// Reducer for the task list
#[derive(Clone, Debug, Default)]
pub struct TodoReducer;

impl TodoReducer {
    /// Creates a new `TodoReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn load_all(env: &TodoEnvironment) -> Effects {
        let SyncMode::Remote(api) = &env.sync else {
            tracing::debug!("LoadAll ignored in offline mode");
            return SmallVec::new();
        };

        let api = Arc::clone(api);
        smallvec![Effect::future(async move {
            Some(match api.list().await {
                Ok(items) => TodoAction::Loaded { items },
                Err(error) => TodoAction::LoadFailed {
                    error: error.to_string(),
                },
            })
        })]
    }

    fn add(
        state: &mut TodoState,
        title: String,
        description: String,
        env: &TodoEnvironment,
    ) -> Effects {
        if title.trim().is_empty() {
            tracing::debug!("Ignoring todo with blank title");
            return SmallVec::new();
        }

        let now = env.clock.now();
        let temp_id = state.next_local_id(now);
        let item = TodoItem {
            id: TodoId::Temporary(temp_id),
            title,
            description,
            created_at: Some(display_timestamp(now)),
            color: Some(env.colors.pick()),
        };

        match &env.sync {
            SyncMode::Offline => {
                tracing::debug!(id = %item.id, "Todo added");
                state.items.push(item);
                SmallVec::new()
            }
            SyncMode::Remote(api) => {
                let api = Arc::clone(api);
                let new_todo = item.to_new_todo();
                state.pending.push(item);

                smallvec![Effect::future(async move {
                    Some(match api.create(new_todo).await {
                        Ok(item) => TodoAction::Created { temp_id, item },
                        Err(error) => TodoAction::CreateFailed {
                            temp_id,
                            error: error.to_string(),
                        },
                    })
                })]
            }
        }
    }

    fn commit_edit(state: &mut TodoState, env: &TodoEnvironment) -> Effects {
        let Some(draft) = state.edit.take() else {
            tracing::debug!("CommitEdit without an active edit");
            return SmallVec::new();
        };

        if !state.exists(&draft.id) {
            tracing::debug!(id = %draft.id, "Edited todo no longer exists");
            return SmallVec::new();
        }

        let remote = match (&env.sync, draft.id.server_id()) {
            (SyncMode::Remote(api), Some(server_id)) => {
                Some((Arc::clone(api), server_id.clone()))
            }
            (SyncMode::Remote(_), None) => {
                tracing::warn!(id = %draft.id, "Unsynced todo edited locally");
                None
            }
            (SyncMode::Offline, _) => None,
        };

        let Some((api, server_id)) = remote else {
            Self::apply_draft(state, &draft);
            return SmallVec::new();
        };

        let revision = state.bump_revision(&draft.id);
        let patch = draft.to_patch();

        smallvec![Effect::future(async move {
            Some(match api.update(server_id, patch).await {
                Ok(item) => TodoAction::Updated {
                    id: draft.id,
                    revision,
                    item,
                },
                Err(error) => TodoAction::UpdateFailed {
                    id: draft.id.clone(),
                    revision,
                    draft,
                    error: error.to_string(),
                },
            })
        })]
    }

    fn delete(state: &mut TodoState, id: TodoId, env: &TodoEnvironment) -> Effects {
        if !state.exists(&id) {
            tracing::debug!(%id, "Delete of unknown todo ignored");
            return SmallVec::new();
        }

        match (&env.sync, id.server_id()) {
            (SyncMode::Remote(api), Some(server_id)) => {
                let api = Arc::clone(api);
                let server_id = server_id.clone();

                smallvec![Effect::future(async move {
                    Some(match api.delete(server_id).await {
                        Ok(()) => TodoAction::Deleted { id },
                        Err(error) => TodoAction::DeleteFailed {
                            id,
                            error: error.to_string(),
                        },
                    })
                })]
            }
            _ => {
                state.remove(&id);
                SmallVec::new()
            }
        }
    }

    fn apply_draft(state: &mut TodoState, draft: &EditSession) {
        if let Some(item) = state.get_mut(&draft.id) {
            item.title.clone_from(&draft.title);
            item.description.clone_from(&draft.description);
            tracing::debug!(id = %draft.id, "Todo edited");
        }
    }

    fn created(state: &mut TodoState, temp_id: LocalId, item: TodoItem) {
        let item = match state.take_pending(temp_id) {
            Some(local) => item.reconciled_with(&local),
            None => {
                tracing::warn!(%temp_id, "Create confirmed for unknown pending todo");
                item
            }
        };
        tracing::debug!(%temp_id, id = %item.id, "Todo created");
        state.upsert(item);
    }

    fn updated(state: &mut TodoState, id: &TodoId, revision: u64, item: TodoItem) {
        if state.is_stale(id, revision) {
            tracing::debug!(%id, revision, "Discarding stale update");
            return;
        }

        match state.get_mut(id) {
            Some(existing) => {
                let reconciled = item.reconciled_with(existing);
                *existing = reconciled;
            }
            None => tracing::debug!(%id, "Update confirmed for removed todo"),
        }
    }

    fn update_failed(
        state: &mut TodoState,
        id: &TodoId,
        revision: u64,
        draft: EditSession,
        error: &str,
        env: &TodoEnvironment,
    ) {
        tracing::error!(operation = "update", %id, revision, %error, "Failed to update todo");

        if env.edit_failure == EditFailurePolicy::Restore
            && state.edit.is_none()
            && state.exists(id)
            && !state.is_stale(id, revision)
        {
            tracing::info!(%id, "Restoring draft after failed update");
            state.edit = Some(draft);
        }
    }
}

impl Reducer for TodoReducer {
    type State = TodoState;
    type Action = TodoAction;
    type Environment = TodoEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        tracing::trace!(action = action.name(), "Reducing todo action");

        match action {
            // ========== Commands ==========
            TodoAction::LoadAll => Self::load_all(env),

            TodoAction::Add { title, description } => Self::add(state, title, description, env),

            TodoAction::BeginEdit { id } => {
                match state.get(&id) {
                    Some(item) => state.edit = Some(EditSession::for_item(item)),
                    None => tracing::debug!(%id, "BeginEdit for unknown todo ignored"),
                }
                SmallVec::new()
            }

            TodoAction::UpdateDraft { title, description } => {
                if let Some(edit) = state.edit.as_mut() {
                    edit.title = title;
                    edit.description = description;
                }
                SmallVec::new()
            }

            TodoAction::CancelEdit => {
                state.edit = None;
                SmallVec::new()
            }

            TodoAction::CommitEdit => Self::commit_edit(state, env),

            TodoAction::Delete { id } => Self::delete(state, id, env),

            // ========== Events ==========
            TodoAction::Loaded { items } => {
                tracing::debug!(count = items.len(), "Todos loaded");
                state.replace_items(items);
                SmallVec::new()
            }

            TodoAction::LoadFailed { error } => {
                tracing::error!(operation = "list", %error, "Failed to load todos");
                SmallVec::new()
            }

            TodoAction::Created { temp_id, item } => {
                Self::created(state, temp_id, item);
                SmallVec::new()
            }

            TodoAction::CreateFailed { temp_id, error } => {
                state.take_pending(temp_id);
                tracing::error!(operation = "create", %temp_id, %error, "Failed to create todo");
                SmallVec::new()
            }

            TodoAction::Updated { id, revision, item } => {
                Self::updated(state, &id, revision, item);
                SmallVec::new()
            }

            TodoAction::UpdateFailed {
                id,
                revision,
                draft,
                error,
            } => {
                Self::update_failed(state, &id, revision, draft, &error, env);
                SmallVec::new()
            }

            TodoAction::Deleted { id } => {
                if state.remove(&id).is_some() {
                    tracing::debug!(%id, "Todo deleted");
                }
                SmallVec::new()
            }

            TodoAction::DeleteFailed { id, error } => {
                tracing::error!(operation = "delete", %id, %error, "Failed to delete todo");
                SmallVec::new()
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::api::InMemoryTodoApi;
    use crate::types::ServerId;
    use tasklist_testing::{ReducerTest, assertions, test_clock};

    fn offline_env() -> TodoEnvironment {
        TodoEnvironment::offline(Arc::new(test_clock()))
            .with_colors(Arc::new(FixedColorPicker(ColorTag::Green)))
    }

    fn remote_env() -> TodoEnvironment {
        TodoEnvironment::remote(Arc::new(test_clock()), InMemoryTodoApi::new().shared())
            .with_colors(Arc::new(FixedColorPicker(ColorTag::Green)))
    }

    fn confirmed(id: &str) -> TodoId {
        TodoId::Confirmed(ServerId::new(id))
    }

    fn seeded() -> TodoState {
        TodoState::with_items(vec![
            TodoItem::new(confirmed("1"), "Buy milk", "semi-skimmed"),
            TodoItem::new(confirmed("2"), "Write docs", ""),
            TodoItem::new(confirmed("3"), "Call mom", "Sunday"),
        ])
    }

    fn add(title: &str, description: &str) -> TodoAction {
        TodoAction::Add {
            title: title.to_string(),
            description: description.to_string(),
        }
    }

    #[test]
    fn test_add_offline() {
        let now = test_clock().now();
        ReducerTest::new(TodoReducer::new())
            .with_env(offline_env())
            .given_state(TodoState::new())
            .when_action(add("X", "Y"))
            .then_state(move |state| {
                assert_eq!(state.len(), 1);
                let item = &state.items()[0];
                assert_eq!(item.title, "X");
                assert_eq!(item.description, "Y");
                assert_eq!(
                    item.id,
                    TodoId::Temporary(LocalId::from_millis(now.timestamp_millis()))
                );
                assert_eq!(item.created_at, Some(display_timestamp(now)));
                assert_eq!(item.color, Some(ColorTag::Green));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_add_blank_title_is_ignored() {
        for title in ["", "   ", "\t\n"] {
            ReducerTest::new(TodoReducer::new())
                .with_env(remote_env())
                .given_state(seeded())
                .when_action(add(title, "description"))
                .then_state(|state| {
                    assert_eq!(state.len(), 3);
                    assert_eq!(state.pending_count(), 0);
                })
                .then_effects(assertions::assert_no_effects)
                .run();
        }
    }

    #[test]
    fn test_add_same_millisecond_gets_distinct_ids() {
        ReducerTest::new(TodoReducer::new())
            .with_env(offline_env())
            .given_state(TodoState::new())
            .when_action(add("First", ""))
            .when_action(add("Second", ""))
            .then_state(|state| {
                assert_eq!(state.len(), 2);
                assert_ne!(state.items()[0].id, state.items()[1].id);
            })
            .run();
    }

    #[test]
    fn test_add_never_reuses_a_seeded_temporary_id() {
        let seeded = TodoId::Temporary(LocalId::from_millis(test_clock().now().timestamp_millis()));

        ReducerTest::new(TodoReducer::new())
            .with_env(offline_env())
            .given_state(TodoState::with_items(vec![TodoItem::new(seeded.clone(), "Old", "")]))
            .when_action(add("New", ""))
            .then_state(move |state| {
                assert_eq!(state.len(), 2);
                assert_eq!(state.items()[0].id, seeded);
                assert_ne!(state.items()[1].id, seeded);
            })
            .run();
    }

    #[test]
    fn test_add_remote_waits_for_store() {
        ReducerTest::new(TodoReducer::new())
            .with_env(remote_env())
            .given_state(TodoState::new())
            .when_action(add("Buy milk", ""))
            .then_state(|state| {
                assert!(state.is_empty());
                assert_eq!(state.pending_count(), 1);
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn test_created_replaces_temporary_id() {
        let temp_id = LocalId::from_millis(test_clock().now().timestamp_millis());

        ReducerTest::new(TodoReducer::new())
            .with_env(remote_env())
            .given_state(TodoState::new())
            .when_action(add("Buy milk", "2 litres"))
            .when_action(TodoAction::Created {
                temp_id,
                item: TodoItem::new(confirmed("41"), "Buy milk", "2 litres"),
            })
            .then_state(|state| {
                assert_eq!(state.pending_count(), 0);
                assert_eq!(state.len(), 1);
                let item = &state.items()[0];
                assert_eq!(item.id, confirmed("41"));
                // Metadata the store did not echo is kept
                assert_eq!(item.color, Some(ColorTag::Green));
                assert!(item.created_at.is_some());
            })
            .run();
    }

    #[test]
    fn test_create_failed_drops_pending_item() {
        let temp_id = LocalId::from_millis(test_clock().now().timestamp_millis());

        ReducerTest::new(TodoReducer::new())
            .with_env(remote_env())
            .given_state(seeded())
            .when_action(add("Buy milk", ""))
            .when_action(TodoAction::CreateFailed {
                temp_id,
                error: "connection refused".to_string(),
            })
            .then_state(|state| {
                assert_eq!(state.len(), 3);
                assert_eq!(state.pending_count(), 0);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_begin_edit_unknown_id_is_noop() {
        ReducerTest::new(TodoReducer::new())
            .with_env(offline_env())
            .given_state(seeded())
            .when_action(TodoAction::BeginEdit { id: confirmed("99") })
            .then_state(|state| assert!(state.edit_session().is_none()))
            .run();
    }

    #[test]
    fn test_begin_edit_replaces_previous_session() {
        ReducerTest::new(TodoReducer::new())
            .with_env(offline_env())
            .given_state(seeded())
            .when_action(TodoAction::BeginEdit { id: confirmed("1") })
            .when_action(TodoAction::UpdateDraft {
                title: "Unsaved".to_string(),
                description: String::new(),
            })
            .when_action(TodoAction::BeginEdit { id: confirmed("3") })
            .then_state(|state| {
                let edit = state.edit_session().unwrap();
                assert_eq!(edit.id, confirmed("3"));
                assert_eq!(edit.title, "Call mom");
                assert_eq!(edit.description, "Sunday");
                // The abandoned draft was never applied
                assert_eq!(state.get(&confirmed("1")).unwrap().title, "Buy milk");
            })
            .run();
    }

    #[test]
    fn test_commit_edit_offline_changes_only_target() {
        let before = seeded();
        let expected_others: Vec<TodoItem> = before
            .items()
            .iter()
            .filter(|item| item.id != confirmed("2"))
            .cloned()
            .collect();

        ReducerTest::new(TodoReducer::new())
            .with_env(offline_env())
            .given_state(before)
            .when_action(TodoAction::BeginEdit { id: confirmed("2") })
            .when_action(TodoAction::UpdateDraft {
                title: "Z".to_string(),
                description: String::new(),
            })
            .when_action(TodoAction::CommitEdit)
            .then_state(move |state| {
                assert!(state.edit_session().is_none());
                assert_eq!(state.len(), 3);
                let edited = state.get(&confirmed("2")).unwrap();
                assert_eq!(edited.title, "Z");
                assert_eq!(edited.description, "");
                let others: Vec<TodoItem> = state
                    .items()
                    .iter()
                    .filter(|item| item.id != confirmed("2"))
                    .cloned()
                    .collect();
                assert_eq!(others, expected_others);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_commit_without_session_is_noop() {
        ReducerTest::new(TodoReducer::new())
            .with_env(remote_env())
            .given_state(seeded())
            .when_action(TodoAction::CommitEdit)
            .then_state(|state| assert_eq!(state.len(), 3))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_cancel_edit_discards_draft() {
        ReducerTest::new(TodoReducer::new())
            .with_env(offline_env())
            .given_state(seeded())
            .when_action(TodoAction::BeginEdit { id: confirmed("1") })
            .when_action(TodoAction::UpdateDraft {
                title: "Changed".to_string(),
                description: String::new(),
            })
            .when_action(TodoAction::CancelEdit)
            .then_state(|state| {
                assert!(state.edit_session().is_none());
                assert_eq!(state.get(&confirmed("1")).unwrap().title, "Buy milk");
            })
            .run();
    }

    #[test]
    fn test_commit_edit_remote_defers_to_store() {
        ReducerTest::new(TodoReducer::new())
            .with_env(remote_env())
            .given_state(seeded())
            .when_action(TodoAction::BeginEdit { id: confirmed("1") })
            .when_action(TodoAction::UpdateDraft {
                title: "Buy oat milk".to_string(),
                description: String::new(),
            })
            .when_action(TodoAction::CommitEdit)
            .then_state(|state| {
                assert!(state.edit_session().is_none());
                assert_eq!(state.get(&confirmed("1")).unwrap().title, "Buy milk");
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn test_updated_replaces_entry_with_store_record() {
        ReducerTest::new(TodoReducer::new())
            .with_env(remote_env())
            .given_state(seeded())
            .when_action(TodoAction::Updated {
                id: confirmed("1"),
                revision: 0,
                item: TodoItem::new(confirmed("1"), "Buy oat milk", "barista"),
            })
            .then_state(|state| {
                let item = state.get(&confirmed("1")).unwrap();
                assert_eq!(item.title, "Buy oat milk");
                assert_eq!(item.description, "barista");
                assert_eq!(state.items()[0].id, confirmed("1"));
            })
            .run();
    }

    #[test]
    fn test_stale_update_is_discarded() {
        let mut state = seeded();
        let id = confirmed("1");
        let older = state.bump_revision(&id);
        let newer = state.bump_revision(&id);

        ReducerTest::new(TodoReducer::new())
            .with_env(remote_env())
            .given_state(state)
            .when_action(TodoAction::Updated {
                id: id.clone(),
                revision: newer,
                item: TodoItem::new(id.clone(), "Second edit", ""),
            })
            .when_action(TodoAction::Updated {
                id: id.clone(),
                revision: older,
                item: TodoItem::new(id.clone(), "First edit", ""),
            })
            .then_state(move |state| {
                assert_eq!(state.get(&id).unwrap().title, "Second edit");
            })
            .run();
    }

    #[test]
    fn test_update_after_delete_does_not_resurrect() {
        ReducerTest::new(TodoReducer::new())
            .with_env(remote_env())
            .given_state(seeded())
            .when_action(TodoAction::Deleted { id: confirmed("2") })
            .when_action(TodoAction::Updated {
                id: confirmed("2"),
                revision: 0,
                item: TodoItem::new(confirmed("2"), "Ghost", ""),
            })
            .then_state(|state| {
                assert_eq!(state.len(), 2);
                assert!(!state.exists(&confirmed("2")));
            })
            .run();
    }

    fn failed_update(title: &str) -> TodoAction {
        TodoAction::UpdateFailed {
            id: confirmed("1"),
            revision: 1,
            draft: EditSession {
                id: confirmed("1"),
                title: title.to_string(),
                description: String::new(),
            },
            error: "503".to_string(),
        }
    }

    #[test]
    fn test_update_failed_discard_keeps_old_values() {
        ReducerTest::new(TodoReducer::new())
            .with_env(remote_env())
            .given_state(seeded())
            .when_action(failed_update("Lost"))
            .then_state(|state| {
                assert_eq!(state.get(&confirmed("1")).unwrap().title, "Buy milk");
                assert!(state.edit_session().is_none());
            })
            .run();
    }

    #[test]
    fn test_update_failed_restore_reopens_draft() {
        ReducerTest::new(TodoReducer::new())
            .with_env(remote_env().with_edit_failure(EditFailurePolicy::Restore))
            .given_state(seeded())
            .when_action(failed_update("Retry me"))
            .then_state(|state| {
                assert_eq!(state.get(&confirmed("1")).unwrap().title, "Buy milk");
                let edit = state.edit_session().unwrap();
                assert_eq!(edit.title, "Retry me");
            })
            .run();
    }

    #[test]
    fn test_update_failed_restore_respects_newer_session() {
        ReducerTest::new(TodoReducer::new())
            .with_env(remote_env().with_edit_failure(EditFailurePolicy::Restore))
            .given_state(seeded())
            .when_action(TodoAction::BeginEdit { id: confirmed("3") })
            .when_action(failed_update("Retry me"))
            .then_state(|state| {
                assert_eq!(state.edit_session().unwrap().id, confirmed("3"));
            })
            .run();
    }

    #[test]
    fn test_delete_offline_removes_exactly_one() {
        ReducerTest::new(TodoReducer::new())
            .with_env(offline_env())
            .given_state(seeded())
            .when_action(TodoAction::Delete { id: confirmed("2") })
            .then_state(|state| {
                let ids: Vec<_> = state.items().iter().map(|i| i.id.clone()).collect();
                assert_eq!(ids, vec![confirmed("1"), confirmed("3")]);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_delete_remote_waits_for_store() {
        ReducerTest::new(TodoReducer::new())
            .with_env(remote_env())
            .given_state(seeded())
            .when_action(TodoAction::Delete { id: confirmed("2") })
            .then_state(|state| assert_eq!(state.len(), 3))
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn test_delete_failed_keeps_item() {
        ReducerTest::new(TodoReducer::new())
            .with_env(remote_env())
            .given_state(seeded())
            .when_action(TodoAction::DeleteFailed {
                id: confirmed("2"),
                error: "timeout".to_string(),
            })
            .then_state(|state| assert!(state.exists(&confirmed("2"))))
            .run();
    }

    #[test]
    fn test_deleting_edited_item_clears_session() {
        ReducerTest::new(TodoReducer::new())
            .with_env(offline_env())
            .given_state(seeded())
            .when_action(TodoAction::BeginEdit { id: confirmed("2") })
            .when_action(TodoAction::Delete { id: confirmed("2") })
            .then_state(|state| assert!(state.edit_session().is_none()))
            .run();
    }

    #[test]
    fn test_load_all_offline_is_noop() {
        ReducerTest::new(TodoReducer::new())
            .with_env(offline_env())
            .given_state(seeded())
            .when_action(TodoAction::LoadAll)
            .then_state(|state| assert_eq!(state.len(), 3))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_loaded_replaces_collection_in_server_order() {
        ReducerTest::new(TodoReducer::new())
            .with_env(remote_env())
            .given_state(seeded())
            .when_action(TodoAction::Loaded {
                items: vec![
                    TodoItem::new(confirmed("9"), "Nine", ""),
                    TodoItem::new(confirmed("4"), "Four", ""),
                ],
            })
            .then_state(|state| {
                let titles: Vec<_> = state.items().iter().map(|i| i.title.as_str()).collect();
                assert_eq!(titles, vec!["Nine", "Four"]);
            })
            .run();
    }

    #[test]
    fn test_load_failed_leaves_collection() {
        ReducerTest::new(TodoReducer::new())
            .with_env(remote_env())
            .given_state(TodoState::new())
            .when_action(TodoAction::LoadFailed {
                error: "connection refused".to_string(),
            })
            .then_state(|state| assert!(state.is_empty()))
            .run();
    }
}
