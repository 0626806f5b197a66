use clap::{CommandFactory, Parser};
use std::io::{self, Write};
use std::sync::Arc;
use tasknote_cli::cli::{Cli, Command, collect_overrides};
use tasknote_cli::render;
use tasknote_core::api::ApiClient;
use tasknote_core::assistant::{self, AssistantSession};
use tasknote_core::auth;
use tasknote_core::config::{self, Config, Palette, palette_for_theme};
use tasknote_core::dashboard::Dashboard;
use tasknote_core::error::AppError;
use tasknote_core::filter::TaskFilter;
use tasknote_core::model::{NewTask, Task, TaskId, TaskUpdate, due_date_from_day, parse_due_day};
use tasknote_core::storage::{FileTokenStore, SessionContext};
use tracing_subscriber::EnvFilter;

const LOG_ENV_VAR: &str = "TASKNOTE_LOG";

/// State shared by every command in one process, so the interactive shell
/// keeps a single dashboard alive.
struct App {
    base: Config,
    api: ApiClient,
    dashboard: Dashboard,
    chat: AssistantSession,
}

impl App {
    fn new(base: Config) -> Result<Self, AppError> {
        let tokens = FileTokenStore::from_env()?;
        let session = SessionContext::new(Arc::new(tokens));
        let api = ApiClient::new(&base, session)?;
        Ok(Self {
            base,
            api,
            dashboard: Dashboard::new(),
            chat: AssistantSession::new(),
        })
    }

    /// Makes sure `id` is in the local collection, reloading every note if needed.
    async fn ensure_task(&mut self, id: TaskId) -> Result<Task, AppError> {
        if self.dashboard.store().get(id).is_none() {
            self.dashboard.select_filter(&self.api, TaskFilter::All).await?;
        }
        self.dashboard
            .store()
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::invalid_input(format!("task not found: {id}")))
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn load_base_config() -> Config {
    let load = config::load_config_with_fallback();
    if let Some(err) = load.error {
        tracing::warn!(code = err.code(), message = err.message(), "using default configuration");
    }
    load.config
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        match ch {
            '\\' if in_quotes => escape = true,
            '"' => in_quotes = !in_quotes,
            ch if ch.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    args.push(std::mem::take(&mut current));
                }
            }
            ch => current.push(ch),
        }
    }

    if in_quotes {
        return Err(AppError::invalid_input("unterminated quote in command"));
    }

    if !current.is_empty() {
        args.push(current);
    }

    Ok(args)
}

fn read_line() -> Result<Option<String>, AppError> {
    let mut input = String::new();
    let bytes = io::stdin()
        .read_line(&mut input)
        .map_err(|err| AppError::io(err.to_string()))?;
    if bytes == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim().to_string()))
}

fn prompt(text: &str) -> Result<(), AppError> {
    let mut stdout = io::stdout();
    write!(stdout, "{text}").map_err(|err| AppError::io(err.to_string()))?;
    stdout.flush().map_err(|err| AppError::io(err.to_string()))
}

fn confirm_delete() -> Result<bool, AppError> {
    prompt("Delete this note? [y/N] ")?;
    Ok(matches!(
        read_line()?.as_deref().map(str::to_ascii_lowercase).as_deref(),
        Some("y" | "yes")
    ))
}

fn due_from_arg(raw: Option<&str>) -> Result<Option<String>, AppError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => due_date_from_day(parse_due_day(value)?).map(Some),
    }
}

/// Absent keeps the current due date; an empty value clears it.
fn edited_due(raw: Option<&str>, current: Option<String>) -> Result<Option<String>, AppError> {
    match raw {
        None => Ok(current),
        Some(value) => due_from_arg(Some(value)),
    }
}

fn print_task(verb: &str, task: &Task, json: bool, palette: &Palette) {
    if json {
        println!("{}", render::task_json(task));
    } else {
        println!("{}", render::task_line(verb, task, palette));
    }
}

async fn run_chat(app: &mut App, palette: &Palette) -> Result<(), AppError> {
    app.chat.open(&app.api).await;
    for message in app.chat.transcript() {
        println!("{}", render::message_line(message, palette));
    }

    loop {
        prompt(&palette.mutedize("you> "))?;
        let Some(line) = read_line()? else {
            break;
        };
        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }
        if line == "/reset" {
            app.chat.reset();
            println!("{}", palette.mutedize("(conversation cleared)"));
            continue;
        }
        if line.is_empty() {
            continue;
        }

        eprintln!("{}", palette.mutedize("assistant is typing..."));
        if let Some(reply) = app.chat.send(&app.api, &line).await {
            println!("{}", render::message_line(reply, palette));
        }
    }

    app.chat.close();
    Ok(())
}

async fn run_command(app: &mut App, cli: Cli) -> Result<(), AppError> {
    let overrides = collect_overrides(&cli.config_override).map_err(AppError::invalid_input)?;
    let config = config::merge_overrides(&app.base, &overrides)?;
    if config.api_url != app.api.base_url() {
        app.api = ApiClient::new(&config, app.api.session().clone())?;
        app.dashboard = Dashboard::new();
    }
    let palette = palette_for_theme(config.theme.as_deref());
    let json = cli.json;

    match cli.command {
        Command::Register {
            username,
            email,
            password,
        } => {
            let profile = auth::register(&app.api, &username, &email, &password).await?;
            if json {
                println!("{}", serde_json::json!(profile));
            } else {
                println!("Registered {}. You can log in now.", palette.accentize(&profile.username));
            }
        }
        Command::Login { username, password } => {
            auth::login(&app.api, &username, &password).await?;
            app.dashboard = Dashboard::new();
            if json {
                println!("{}", serde_json::json!({ "logged_in": true }));
            } else {
                println!("Logged in as {}", palette.accentize(username.trim()));
            }
        }
        Command::Logout => {
            auth::logout(&app.api)?;
            app.dashboard = Dashboard::new();
            app.chat = AssistantSession::new();
            if json {
                println!("{}", serde_json::json!({ "logged_in": false }));
            } else {
                println!("Logged out");
            }
        }
        Command::Status => {
            let logged_in = app.api.session().tokens().is_present();
            if json {
                println!(
                    "{}",
                    serde_json::json!({ "logged_in": logged_in, "api_url": app.api.base_url() })
                );
            } else {
                let state = if logged_in { "logged in" } else { "not logged in" };
                println!("{state} ({})", palette.mutedize(app.api.base_url()));
            }
        }
        Command::List { filter } => {
            let filter = match filter {
                Some(raw) => TaskFilter::parse(&raw, config.upcoming_days)?,
                None => TaskFilter::All,
            };
            app.dashboard.select_filter(&app.api, filter).await?;
            if json {
                println!("{}", render::tasks_json(app.dashboard.tasks()));
            } else {
                println!("{}", palette.accentize(&filter.to_string()));
                println!("{}", render::tasks_table(app.dashboard.tasks()));
            }
        }
        Command::Stats => {
            let snapshot = app.dashboard.refresh_statistics(&app.api).await?;
            if json {
                println!("{}", render::stats_json(&snapshot));
            } else {
                for line in render::stats_lines(&snapshot, &palette) {
                    println!("{line}");
                }
            }
        }
        Command::Add {
            title,
            description,
            due,
            draft,
        } => {
            let mut new_task = match draft {
                Some(text) => assistant::draft_task(&app.api, &text).await?.into_new_task()?,
                None => NewTask::default(),
            };
            if let Some(title) = title {
                new_task.title = title;
            }
            if description.is_some() {
                new_task.description = description;
            }
            if let Some(due) = due_from_arg(due.as_deref())? {
                new_task.due_date = Some(due);
            }

            let task = app.dashboard.create(&app.api, new_task).await?;
            print_task("Added note", &task, json, &palette);
        }
        Command::Edit {
            id,
            title,
            description,
            due,
        } => {
            tasknote_core::task_store::require_title(&title)?;
            due_from_arg(due.as_deref())?;
            let current = app.ensure_task(id).await?;
            let update = TaskUpdate {
                title,
                description: description.or(current.description),
                due_date: edited_due(due.as_deref(), current.due_date)?,
            };
            let task = app.dashboard.edit(&app.api, id, update).await?;
            print_task("Updated note", &task, json, &palette);
        }
        Command::Done { id } => {
            app.ensure_task(id).await?;
            let task = app.dashboard.complete(&app.api, id).await?;
            print_task("Completed note", &task, json, &palette);
        }
        Command::Reopen { id } => {
            app.ensure_task(id).await?;
            let task = app.dashboard.reopen(&app.api, id).await?;
            print_task("Reopened note", &task, json, &palette);
        }
        Command::Delete { id, yes } => {
            app.ensure_task(id).await?;
            if !yes && !confirm_delete()? {
                println!("Kept note {id}");
                return Ok(());
            }
            let task = app.dashboard.delete(&app.api, id).await?;
            print_task("Deleted note", &task, json, &palette);
        }
        Command::Assistant => run_chat(app, &palette).await?,
        Command::Summary => {
            let summary = assistant::summary(&app.api).await?;
            if json {
                println!("{}", serde_json::json!({ "summary": summary }));
            } else {
                println!("{summary}");
            }
        }
        Command::Plan => {
            let plan = assistant::daily_plan(&app.api).await?;
            if json {
                println!("{}", serde_json::json!({ "plan": plan }));
            } else {
                println!("{plan}");
            }
        }
        Command::Priorities => {
            let priorities = assistant::priorities(&app.api).await?;
            if json {
                println!("{}", serde_json::json!(priorities));
            } else {
                for line in render::priorities_lines(&priorities) {
                    println!("{line}");
                }
            }
        }
    }

    Ok(())
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

async fn run_interactive(app: &mut App) -> Result<(), AppError> {
    loop {
        prompt("tasknote> ")?;
        let Some(line) = read_line()? else {
            break;
        };

        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        let args = match split_command_line(&line) {
            Ok(args) if args.is_empty() => continue,
            Ok(args) => args,
            Err(err) => {
                eprintln!("ERROR: {err}");
                continue;
            }
        };

        let argv = std::iter::once("tasknote".to_string()).chain(args);
        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                continue;
            }
        };

        if let Err(err) = run_command(app, cli).await {
            eprintln!("ERROR: {err}");
        }
        if let Some(notice) = app.dashboard.dismiss_notice() {
            tracing::debug!(code = notice.code, "notice dismissed");
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    init_tracing();

    let mut args = std::env::args_os();
    args.next();
    let interactive = args.next().is_none();

    let cli = if interactive {
        None
    } else {
        match Cli::try_parse() {
            Ok(cli) => Some(cli),
            Err(err) if !err.use_stderr() => {
                // --help and --version
                let _ = err.print();
                return;
            }
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                std::process::exit(1);
            }
        }
    };

    let mut app = match App::new(load_base_config()) {
        Ok(app) => app,
        Err(err) => {
            eprintln!("ERROR: {err}");
            std::process::exit(1);
        }
    };

    let result = match cli {
        Some(cli) => run_command(&mut app, cli).await,
        None => run_interactive(&mut app).await,
    };

    if let Err(err) = result {
        eprintln!("ERROR: {err}");
        std::process::exit(1);
    }
}
