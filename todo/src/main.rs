//! Scripted demo session for the todo list.
//!
//! Opens the file-backed list described by the `TASKPAD_*` environment
//! variables, runs a few actions through it and prints every filter view.
//! Run it twice to see the list reloaded from disk.

use taskpad::{
    Color, Config, DueDate, Filter, FilterMode, NewTodo, TodoAction, TodoApp, TodoDraft, TodoItem,
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn print_todos(heading: &str, todos: &[TodoItem]) {
    println!("{heading} ({})", todos.len());
    for todo in todos {
        let status = if todo.completed { "✓" } else { " " };
        let date = todo.date.map(|d| d.to_string()).unwrap_or_default();
        println!("  [{status}] {:<24} {:<7} {date}", todo.title, todo.color);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let metrics = if config.metrics {
        Some(taskpad_runtime::metrics::install_recorder()?)
    } else {
        None
    };

    tracing::info!(data_dir = %config.data_dir.display(), key = %config.storage_key, "Opening todo list");
    let app = TodoApp::from_config(&config).await?;
    print_todos("Loaded todos", &app.todos().await);

    println!("\nAdding todos...");
    app.submit_draft(
        TodoDraft::new()
            .title("Renew passport")
            .description("Appointment at city hall")
            .date("01-01-2020".parse::<DueDate>().ok())
            .color(Color::Purple),
    )
    .await?;
    app.dispatch(TodoAction::Add {
        todo: NewTodo::new("Buy milk", "2%").with_color(Color::Blue),
    })
    .await?;
    app.dispatch(TodoAction::Add {
        todo: NewTodo::new("Plan trip", "Book flights")
            .with_color(Color::Green)
            .with_date(DueDate::new(chrono::Local::now().date_naive())),
    })
    .await?;

    let todos = app.todos().await;
    if let Some(milk) = todos.iter().rev().find(|t| t.title == "Buy milk") {
        println!("Completing '{}'...", milk.title);
        app.dispatch(TodoAction::Complete { id: milk.id }).await?;
    }
    if let Some(trip) = todos.iter().rev().find(|t| t.title == "Plan trip") {
        println!("Editing '{}'...", trip.title);
        if let Some(draft) = app.start_editing(trip.id).await? {
            app.submit_draft(draft.description("Book flights and hotel"))
                .await?;
        }
    }

    println!();
    for mode in FilterMode::MODES {
        let filter = match mode {
            FilterMode::ByColor => Filter::by_color(Color::Blue),
            _ => Filter::new(mode),
        };
        print_todos(mode.label(), &app.visible(&filter).await);
    }

    if let Some(oldest) = app.todos().await.first() {
        println!("\nRemoving '{}'...", oldest.title);
        app.dispatch(TodoAction::Remove { id: oldest.id }).await?;
    }

    app.close().await?;
    print_todos("\nSaved todos", &app.todos().await);

    if let Some(handle) = metrics {
        println!("\n{}", handle.render());
    }
    Ok(())
}
