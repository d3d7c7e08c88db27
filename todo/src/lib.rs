//! Task list controller with optional remote persistence.
//!
//! A collection of todo cards that can be added, edited, deleted and
//! searched. In offline mode every change applies immediately; in remote
//! mode changes are sent to a REST store and applied once it confirms.
//!
//! - [`types`] holds the domain model and the action enum
//! - [`reducer`] holds the state transitions and remote reconciliation
//! - [`api`] holds the remote store client (HTTP and in-memory)
//! - [`controller`] wraps the store in an async, call-and-wait API
//! - [`config`] reads the binary's environment configuration
//!
//! # Quick Start
//!
//! ```no_run
//! use tasklist::{TodoController, TodoEnvironment};
//! use tasklist_core::environment::SystemClock;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let controller = TodoController::new(TodoEnvironment::offline(Arc::new(SystemClock)));
//!
//! controller.add("Buy milk", "semi-skimmed").await?;
//! controller.add("Write docs", "").await?;
//!
//! for todo in controller.search("MILK").await {
//!     println!("{} {}", todo.id, todo.title);
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod controller;
pub mod reducer;
pub mod types;

// Re-export commonly used types
pub use api::{HttpTodoApi, InMemoryTodoApi, TodoApi, TransportError};
pub use config::{SyncModeSetting, TodoConfig};
pub use controller::{TodoController, TodoStore};
pub use reducer::{
    ColorPicker, EditFailurePolicy, FixedColorPicker, RandomColorPicker, SyncMode,
    TodoEnvironment, TodoReducer,
};
pub use types::{
    ColorTag, EditSession, LocalId, ServerId, TodoAction, TodoId, TodoItem, TodoState,
};
