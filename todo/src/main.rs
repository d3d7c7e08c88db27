//! Scripted demo of the task list controller.
//!
//! Persistence is chosen with `TASKLIST_SYNC_MODE` (`offline`, `remote` or
//! `memory`); see [`tasklist::TodoConfig`] for the other keys.

use std::sync::Arc;
use std::time::Duration;
use tasklist::{
    HttpTodoApi, InMemoryTodoApi, SyncModeSetting, TodoConfig, TodoController, TodoEnvironment,
};
use tasklist_core::environment::SystemClock;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = TodoConfig::from_env();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(mode = ?config.sync_mode, base_url = %config.api_base_url, "Starting tasklist");

    let clock = Arc::new(SystemClock);
    let env = match config.sync_mode {
        SyncModeSetting::Offline => TodoEnvironment::offline(clock),
        SyncModeSetting::Remote => {
            TodoEnvironment::remote(clock, Arc::new(HttpTodoApi::new(config.api_base_url.clone())))
        }
        SyncModeSetting::Memory => TodoEnvironment::remote(clock, InMemoryTodoApi::new().shared()),
    }
    .with_edit_failure(config.edit_failure);

    let controller = TodoController::new(env);

    println!("=== Tasklist ({:?}) ===\n", config.sync_mode);

    controller.load_all().await?;
    print_todos(&controller, "Loaded").await;

    println!("\nAdding todos...");
    controller.add("Buy milk", "semi-skimmed, 2 litres").await?;
    controller.add("Write documentation", "controller and api modules").await?;
    controller.add("Call the plumber", "kitchen sink").await?;
    controller.add("   ", "blank titles are ignored").await?;
    print_todos(&controller, "After adding").await;

    let Some(first) = controller.items().await.into_iter().next() else {
        anyhow::bail!("no todos were added; is the remote store reachable?");
    };

    println!("\nEditing '{}'...", first.title);
    controller.begin_edit(first.id.clone()).await?;
    controller.update_draft("Buy oat milk", first.description.clone()).await?;
    controller.commit_edit().await?;
    print_todos(&controller, "After editing").await;

    println!("\nSearching for 'DOC'...");
    for todo in controller.search("DOC").await {
        println!("  {} {}", todo.id, todo.title);
    }

    if let Some(last) = controller.items().await.pop() {
        println!("\nDeleting '{}'...", last.title);
        controller.delete(last.id).await?;
    }
    print_todos(&controller, "Final").await;

    controller.store().shutdown(Duration::from_secs(5)).await?;
    println!("\n=== Demo Complete ===");
    Ok(())
}

async fn print_todos(controller: &TodoController, heading: &str) {
    let todos = controller.items().await;
    println!("{heading}: {} todo(s)", todos.len());
    for todo in todos {
        let created = todo.created_at.as_deref().unwrap_or("-");
        let color = todo.color.map_or("-", |c| c.hex());
        println!("  [{color}] {} | {} | {} ({created})", todo.id, todo.title, todo.description);
    }
}
