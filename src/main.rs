use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use dialoguer::Confirm;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{io, path::Path, path::PathBuf};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use taskdesk::app::App;
use taskdesk::task::{format_due_date, parse_due_date, Task, TaskStatus};
use taskdesk::{Config, TaskClient, TaskService};

#[derive(Parser, Debug)]
#[command(name = "taskdesk", version, about = "Terminal client for a task-management REST backend")]
struct Cli {
    #[arg(long = "config", value_name = "PATH", default_value = taskdesk::config::CONFIG_FILE)]
    config_path: PathBuf,
    /// Overrides the config file and TASKDESK_BASE_URL.
    #[arg(long = "base-url", value_name = "URL")]
    base_url: Option<String>,
    #[arg(long = "log-level", value_name = "LEVEL")]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a default config file in the current directory
    Init,
    /// Open the interactive task list (default)
    Tui {
        #[arg(long, value_parser = parse_status)]
        status: Option<TaskStatus>,
    },
    /// Print tasks, optionally filtered by status
    List {
        #[arg(long, value_parser = parse_status)]
        status: Option<TaskStatus>,
    },
    /// Print a single task
    Show { id: Uuid },
    /// Create a task
    Add(TaskFields),
    /// Replace a task; fields not given keep their current value
    Update {
        id: Uuid,
        #[command(flatten)]
        fields: TaskFields,
    },
    /// Delete a task after confirmation
    Delete {
        id: Uuid,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args, Debug)]
struct TaskFields {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long, value_parser = parse_status)]
    status: Option<TaskStatus>,
    /// YYYY-MM-DD or YYYY-MM-DDTHH:MM
    #[arg(long)]
    due: Option<String>,
}

impl TaskFields {
    fn apply(self, task: &mut Task) -> Result<()> {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(due) = self.due {
            task.due_date = parse_due_date(&due)?;
        }
        task.validate()?;
        Ok(())
    }
}

fn parse_status(s: &str) -> Result<TaskStatus, String> {
    s.parse().map_err(|err: taskdesk::task::ValidationError| err.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load(&cli.config_path).context("load config")?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    if let Some(log_level) = cli.log_level {
        config.log_level = log_level;
    }

    let command = cli.command.unwrap_or(Command::Tui { status: None });
    if let Command::Tui { status } = command {
        let _guard = init_file_tracing(&config)?;
        return run_tui(&config, status.or(config.default_status)).await;
    }

    init_stderr_tracing(&config.log_level)?;
    if let Command::Init = command {
        if Config::init(Path::new("."))? {
            println!("Config written to {}", taskdesk::config::CONFIG_FILE);
        } else {
            println!("Config already exists in this directory.");
        }
        return Ok(());
    }

    let client = TaskClient::new(&config.base_url).context("build task client")?;
    info!(base_url = %config.base_url, "using task backend");
    run_command(&client, command).await
}

async fn run_command(client: &TaskClient, command: Command) -> Result<()> {
    match command {
        Command::List { status } => {
            let tasks = client.list_tasks(status).await.context("list tasks")?;
            for task in &tasks {
                print_task_line(task);
            }
            println!("{} task(s)", tasks.len());
        }
        Command::Show { id } => {
            let task = client.get_task(id).await.context("get task")?;
            print_task_details(&task);
        }
        Command::Add(fields) => {
            if fields.title.is_none() {
                bail!("--title is required");
            }
            let mut task = Task::default();
            fields.apply(&mut task)?;
            let created = client.create_task(&task).await.context("create task")?;
            println!("Task created");
            print_task_details(&created);
        }
        Command::Update { id, fields } => {
            let mut task = client.get_task(id).await.context("get task")?;
            fields.apply(&mut task)?;
            let updated = client.update_task(id, &task).await.context("update task")?;
            println!("Task updated");
            print_task_details(&updated);
        }
        Command::Delete { id, yes } => {
            let confirmed = yes
                || Confirm::new()
                    .with_prompt("Are you sure you want to delete this task?")
                    .default(false)
                    .interact()
                    .context("read confirmation")?;
            if !confirmed {
                println!("Delete cancelled.");
                return Ok(());
            }
            client.delete_task(id).await.context("delete task")?;
            println!("Task deleted");
        }
        Command::Init | Command::Tui { .. } => unreachable!("handled before building the client"),
    }
    Ok(())
}

fn print_task_line(task: &Task) {
    let id = task.id.map_or_else(|| "-".to_string(), |id| id.to_string());
    let due = task
        .due_date
        .as_ref()
        .map(|d| format!(" (Due: {})", format_due_date(d)))
        .unwrap_or_default();
    println!("- [{}] {:<11} {}{}", id, task.status, task.title, due);
}

fn print_task_details(task: &Task) {
    let id = task.id.map_or_else(|| "-".to_string(), |id| id.to_string());
    println!("ID:          {}", id);
    println!("Title:       {}", task.title);
    println!("Description: {}", task.description);
    println!("Status:      {}", task.status);
    if let Some(due_date) = &task.due_date {
        println!("Due:         {}", format_due_date(due_date));
    }
    if let Some(updated_at) = &task.updated_at {
        println!("Updated:     {}", updated_at.format("%Y-%m-%d %H:%M"));
    }
}

async fn run_tui(config: &Config, filter: Option<TaskStatus>) -> Result<()> {
    let client = TaskClient::new(&config.base_url).context("build task client")?;
    info!(base_url = %config.base_url, filter = ?filter, "starting task list");

    // Terminal setup
    enable_raw_mode()?;
    let mut terminal = setup_or_restore(
        || {
            let mut stdout = io::stdout();
            execute!(stdout, EnterAlternateScreen)?;
            Terminal::new(CrosstermBackend::new(stdout))
        },
        restore_terminal,
    )?;

    let mut app = App::new(client, filter);
    let result = app.run(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result.context("run task list")
}

/// Runs the rest of terminal setup once raw mode is on; a failure hands the
/// terminal back before the error is returned.
fn setup_or_restore<T>(
    setup: impl FnOnce() -> io::Result<T>,
    restore: impl FnOnce(),
) -> io::Result<T> {
    setup().inspect_err(|_| restore())
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}

fn env_filter(log_level: &str) -> Result<EnvFilter> {
    match std::env::var("RUST_LOG") {
        Ok(directives) if !directives.is_empty() => {
            EnvFilter::try_new(directives).context("invalid RUST_LOG")
        }
        _ => EnvFilter::try_new(log_level).context("invalid log level"),
    }
}

fn init_stderr_tracing(log_level: &str) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(log_level)?)
        .with_writer(io::stderr)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")
}

/// The terminal belongs to the UI, so logs go to a file instead.
fn init_file_tracing(config: &Config) -> Result<WorkerGuard> {
    let directory = config
        .log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let file_name = config
        .log_file
        .file_name()
        .context("log_file must name a file")?;
    let appender = tracing_appender::rolling::never(directory, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(&config.log_level)?)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;
    Ok(guard)
}
