use std::path::{Path, PathBuf};

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::data_dir::{config_path, resolve_data_dir};
use crate::io::recovery;
use crate::io::state::{ThemeMode, read_ui_state, write_ui_state};
use crate::io::storage::JsonFileStorage;
use crate::model::config::Config;
use crate::model::task::{TaskPatch, TaskStatus};
use crate::ops::board::{board_stats, by_status, timeline_rows};
use crate::ops::store::TaskStore;
use crate::ops::task_ops::{self, TaskError};
use crate::ops::timeline::TimelineAxis;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;
    let data_dir = resolve_data_dir(cli.data_dir.as_deref());

    let Some(cmd) = cli.command else {
        return Ok(());
    };

    match cmd {
        // Settings and logs (no task store needed)
        Commands::Theme(args) => cmd_theme(&data_dir, args, json),
        Commands::Config(args) => cmd_config(&data_dir, args),
        Commands::Recovery(args) => cmd_recovery(&data_dir, args, json),

        // Read commands
        Commands::List(args) => cmd_list(&data_dir, args, json),
        Commands::Show(args) => cmd_show(&data_dir, args, json),
        Commands::Timeline => cmd_timeline(&data_dir, json),

        // Write commands
        Commands::Add(args) => cmd_add(&data_dir, args, json),
        Commands::Start(args) => mutate(&data_dir, &args.id, json, |s, id| s.promote(id)),
        Commands::Done(args) => mutate(&data_dir, &args.id, json, |s, id| s.complete(id)),
        Commands::Restore(args) => mutate(&data_dir, &args.id, json, |s, id| s.restore(id)),
        Commands::Archive(args) => mutate(&data_dir, &args.id, json, |s, id| s.archive(id)),
        Commands::Progress(args) => {
            let value = args.value;
            mutate(&data_dir, &args.id, json, move |s, id| {
                s.set_progress(id, value)
            })
        }
        Commands::Auto(args) => cmd_auto(&data_dir, args, json),
        Commands::Sub(args) => cmd_sub(&data_dir, args, json),
        Commands::Set(args) => cmd_set(&data_dir, args, json),
        Commands::Delete(args) => cmd_delete(&data_dir, args),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Session {
    config: Config,
    store: TaskStore,
}

fn open_session(data_dir: &Path) -> Result<Session, Box<dyn std::error::Error>> {
    let config = config_io::read_config(data_dir)?;
    let mut store = TaskStore::new(Box::new(JsonFileStorage::new(data_dir)))
        .with_id_prefix(&config.ids.prefix);
    store.load_from_storage();
    Ok(Session { config, store })
}

/// Print a task after a change: one line, or the full JSON object.
fn print_task(store: &TaskStore, id: &str, json: bool) -> CmdResult {
    let task = store
        .get(id)
        .ok_or_else(|| TaskError::NotFound(id.to_string()))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&TaskJson::new(task))?);
    } else {
        println!("{}", format_task_line(task));
    }
    Ok(())
}

/// Load, apply one store operation, print the result.
fn mutate(
    data_dir: &Path,
    id: &str,
    json: bool,
    op: impl FnOnce(&mut TaskStore, &str) -> Result<(), TaskError>,
) -> CmdResult {
    let mut session = open_session(data_dir)?;
    op(&mut session.store, id)?;
    print_task(&session.store, id, json)
}

/// `2` means subtask `<id>.2`; anything else is taken as a full subtask id.
fn resolve_subtask_id(task_id: &str, sub: &str) -> String {
    if sub.chars().all(|c| c.is_ascii_digit()) {
        format!("{}.{}", task_id, sub)
    } else {
        sub.to_string()
    }
}

fn parse_on_off(mode: &str) -> Result<bool, String> {
    match mode {
        "on" | "true" | "yes" => Ok(true),
        "off" | "false" | "no" => Ok(false),
        _ => Err(format!("expected on or off, got '{}'", mode)),
    }
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list(data_dir: &Path, args: ListArgs, json: bool) -> CmdResult {
    let session = open_session(data_dir)?;
    let tasks = session.store.tasks();
    let section = args.section.as_deref().unwrap_or("open");

    let listed = match section {
        "open" => timeline_rows(tasks),
        "all" => tasks.iter().collect(),
        other => {
            let status = TaskStatus::parse_status(other).ok_or_else(|| {
                format!(
                    "unknown section '{}' (expected: inbox, ongoing, completed, archived, all)",
                    other
                )
            })?;
            by_status(tasks, status)
        }
    };

    if json {
        let out = TaskListJson {
            section: section.to_string(),
            tasks: listed.iter().map(|t| TaskJson::new(t)).collect(),
            stats: board_stats(tasks),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for task in listed {
            println!("{}", format_task_line(task));
        }
    }
    Ok(())
}

fn cmd_show(data_dir: &Path, args: IdArg, json: bool) -> CmdResult {
    let session = open_session(data_dir)?;
    let task = session
        .store
        .get(&args.id)
        .ok_or_else(|| TaskError::NotFound(args.id.clone()))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&TaskJson::new(task))?);
    } else {
        for line in format_task_detail(task) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_timeline(data_dir: &Path, json: bool) -> CmdResult {
    let session = open_session(data_dir)?;
    let today = session.store.today();
    let axis = TimelineAxis::from_config(today, &session.config.timeline);
    let tasks = session.store.tasks();
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&timeline_json(tasks, &axis, today))?
        );
    } else {
        for line in format_timeline(tasks, &axis, today) {
            println!("{}", line);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_add(data_dir: &Path, args: AddArgs, json: bool) -> CmdResult {
    let title = args.title.trim();
    if title.is_empty() {
        return Err(TaskError::EmptyTitle.into());
    }
    let mut session = open_session(data_dir)?;
    let today = session.store.today();
    let end = args
        .end
        .as_deref()
        .map(|s| task_ops::parse_date_input(s, today))
        .transpose()?;
    let id = session.store.add_task(title, end);
    if json {
        print_task(&session.store, &id, true)
    } else {
        println!("{}", id);
        Ok(())
    }
}

fn cmd_auto(data_dir: &Path, args: AutoArgs, json: bool) -> CmdResult {
    let on = parse_on_off(&args.mode)?;
    mutate(data_dir, &args.id, json, |s, id| {
        s.update_task(id, TaskPatch::new().auto_progress(on))
    })
}

fn cmd_sub(data_dir: &Path, args: SubCmd, json: bool) -> CmdResult {
    let mut session = open_session(data_dir)?;
    let store = &mut session.store;
    let task_id = match args.action {
        SubAction::Add(a) => {
            let text = a.text.trim();
            if text.is_empty() {
                return Err("subtask text cannot be empty".into());
            }
            let sub_id = store.add_subtask(&a.id, text)?;
            if !json {
                println!("{}", sub_id);
                return Ok(());
            }
            a.id
        }
        SubAction::Toggle(a) => {
            store.toggle_subtask(&a.id, &resolve_subtask_id(&a.id, &a.sub))?;
            a.id
        }
        SubAction::Rm(a) => {
            store.remove_subtask(&a.id, &resolve_subtask_id(&a.id, &a.sub))?;
            a.id
        }
    };
    print_task(store, &task_id, json)
}

fn cmd_set(data_dir: &Path, args: SetArgs, json: bool) -> CmdResult {
    let mut session = open_session(data_dir)?;
    let today = session.store.today();
    let date = |s: &Option<String>| {
        s.as_deref()
            .map(|v| task_ops::parse_date_input(v, today))
            .transpose()
    };

    let mut patch = TaskPatch::new();
    if let Some(title) = &args.title {
        let title = title.trim();
        if title.is_empty() {
            return Err(TaskError::EmptyTitle.into());
        }
        patch = patch.title(title);
    }
    if let Some(desc) = args.description.clone() {
        patch = patch.description(desc);
    }
    if let Some(start) = date(&args.start)? {
        patch = patch.start_date(start);
    }
    if let Some(end) = date(&args.end)? {
        patch = patch.planned_end_date(end);
    }
    if let Some(deadline) = date(&args.deadline)? {
        patch = patch.hard_deadline(Some(deadline));
    }
    if args.clear_deadline {
        patch = patch.hard_deadline(None);
    }
    if patch.is_empty() {
        return Err("nothing to change (see fl set --help)".into());
    }

    session.store.update_task(&args.id, patch)?;
    print_task(&session.store, &args.id, json)
}

fn cmd_delete(data_dir: &Path, args: IdArg) -> CmdResult {
    let mut session = open_session(data_dir)?;
    let removed = session.store.delete_task(&args.id)?;
    recovery::log_task_deletion(data_dir, &removed);
    println!("deleted {}", removed.id);
    Ok(())
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

fn cmd_theme(data_dir: &Path, args: ThemeArgs, json: bool) -> CmdResult {
    let mut state = read_ui_state(data_dir).unwrap_or_default();
    if let Some(name) = args.theme {
        state.theme = ThemeMode::parse_theme(&name)
            .ok_or_else(|| format!("unknown theme '{}' (expected: light, dark)", name))?;
        write_ui_state(data_dir, &state)?;
    }
    if json {
        println!("{}", serde_json::to_string_pretty(&state)?);
    } else {
        println!("{}", state.theme.as_str());
    }
    Ok(())
}

fn cmd_config(data_dir: &Path, args: ConfigCmd) -> CmdResult {
    match args.action {
        ConfigAction::Get(a) => {
            let config = config_io::read_config(data_dir)?;
            println!("{}", config_io::get_value(&config, &a.key)?);
        }
        ConfigAction::Set(a) => {
            let mut doc = config_io::read_document(data_dir)?;
            config_io::set_value(&mut doc, &a.key, &a.value)?;
            config_io::write_document(data_dir, &doc)?;
        }
        ConfigAction::Path => {
            println!("{}", absolute(&config_path(data_dir)).display());
        }
    }
    Ok(())
}

fn cmd_recovery(data_dir: &Path, args: RecoveryCmd, json: bool) -> CmdResult {
    match args.action {
        Some(RecoveryAction::Path) => {
            println!(
                "{}",
                absolute(&recovery::recovery_log_path(data_dir)).display()
            );
        }
        Some(RecoveryAction::Prune(a)) => {
            let before = (!a.all).then(|| {
                chrono::Utc::now() - chrono::Duration::days(recovery::PRUNE_AGE_DAYS)
            });
            let removed = recovery::prune_recovery(data_dir, before)?;
            println!("removed {} entries", removed);
        }
        None => {
            let entries = recovery::read_recovery_entries(data_dir, Some(args.limit.unwrap_or(10)));
            if json {
                let values: Vec<serde_json::Value> = entries.iter().map(|e| e.to_json()).collect();
                println!("{}", serde_json::to_string_pretty(&values)?);
            } else if entries.is_empty() {
                println!("recovery log is empty");
            } else {
                for entry in &entries {
                    print!("{}", entry.to_text());
                }
            }
        }
    }
    Ok(())
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
