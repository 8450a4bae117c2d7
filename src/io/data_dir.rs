use std::path::{Path, PathBuf};

/// Resolve the data directory: the explicit `-d` flag, else `$FLOWLOG_HOME`,
/// else `$XDG_DATA_HOME/flowlog`, else `~/.local/share/flowlog`.
pub fn resolve_data_dir(explicit: Option<&Path>) -> PathBuf {
    resolve_with(explicit, |key| std::env::var(key).ok())
}

fn resolve_with(explicit: Option<&Path>, env: impl Fn(&str) -> Option<String>) -> PathBuf {
    if let Some(dir) = explicit {
        return dir.to_path_buf();
    }
    if let Some(dir) = env("FLOWLOG_HOME").filter(|s| !s.is_empty()) {
        return PathBuf::from(dir);
    }
    let data_home = env("XDG_DATA_HOME")
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| home_dir(&env).join(".local").join("share"));
    data_home.join("flowlog")
}

fn home_dir(env: &impl Fn(&str) -> Option<String>) -> PathBuf {
    env("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("/"))
}

pub fn tasks_path(data_dir: &Path) -> PathBuf {
    data_dir.join("tasks.json")
}

pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join("config.toml")
}

pub fn log_path(data_dir: &Path) -> PathBuf {
    data_dir.join("flowlog.log")
}
