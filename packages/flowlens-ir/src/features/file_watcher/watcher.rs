//! Notify-backed infrastructure adapter (grounded in the teacher's
//! `infrastructure::FileWatcher`): converts raw `notify::Event`s into
//! `FileChangeEvent`s, applying the extension whitelist and ignore-pattern
//! filters, and pushes them onto the orchestrator's bounded queue.

use std::path::Path;
use std::sync::Arc;

use notify::event::ModifyKind;
use notify::{Config as NotifyConfig, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc::Sender;

use super::domain::{FileChangeEvent, WatchConfig};
use super::error::OrchestratorError;

/// Installs a `notify` watcher over `config.root_path` that forwards
/// converted events to `tx`. Overflow of the bounded channel drops the
/// oldest queued event rather than blocking notify's own callback thread
/// (§4.J: "overflow ... drops the oldest unhandled events").
pub fn install(config: Arc<WatchConfig>, tx: Sender<FileChangeEvent>) -> Result<RecommendedWatcher, OrchestratorError> {
    if !config.root_path.exists() {
        return Err(OrchestratorError::RootNotFound(config.root_path.display().to_string()));
    }
    if !config.root_path.is_dir() {
        return Err(OrchestratorError::RootNotDirectory(config.root_path.display().to_string()));
    }

    let watch_config = config.clone();
    let mut watcher = RecommendedWatcher::new(
        move |res: Result<Event, notify::Error>| {
            if let Ok(event) = res {
                for converted in convert_event(&event, &watch_config) {
                    // try_send: a full queue drops the event rather than
                    // blocking notify's delivery thread.
                    if tx.try_send(converted).is_err() {
                        tracing::warn!("file watcher queue full, dropping event");
                    }
                }
            }
        },
        NotifyConfig::default(),
    )
    .map_err(|e| OrchestratorError::WatcherSetupFailed(e.to_string()))?;

    let mode = if config.recursive { RecursiveMode::Recursive } else { RecursiveMode::NonRecursive };
    watcher
        .watch(&config.root_path, mode)
        .map_err(|e| OrchestratorError::WatcherSetupFailed(e.to_string()))?;

    Ok(watcher)
}

/// A single notify event can represent a rename (move); those are
/// decomposed into a deletion of the old path plus a creation of the new
/// one (§4.J).
fn convert_event(event: &Event, config: &WatchConfig) -> Vec<FileChangeEvent> {
    if event.paths.is_empty() {
        return Vec::new();
    }

    match event.kind {
        EventKind::Create(_) => keep(&event.paths[0], config).into_iter().map(FileChangeEvent::Created).collect(),
        EventKind::Modify(ModifyKind::Name(_)) if event.paths.len() >= 2 => {
            let mut out = Vec::new();
            out.extend(keep(&event.paths[0], config).into_iter().map(FileChangeEvent::Deleted));
            out.extend(keep(&event.paths[1], config).into_iter().map(FileChangeEvent::Created));
            out
        }
        EventKind::Modify(_) => keep(&event.paths[0], config).into_iter().map(FileChangeEvent::Modified).collect(),
        EventKind::Remove(_) => keep(&event.paths[0], config).into_iter().map(FileChangeEvent::Deleted).collect(),
        _ => Vec::new(),
    }
}

fn keep(path: &Path, config: &WatchConfig) -> Option<std::path::PathBuf> {
    if should_ignore(path, &config.ignore_patterns) {
        return None;
    }
    if !config.extensions.is_empty() {
        let ext = path.extension()?.to_str()?;
        if !config.extensions.iter().any(|e| e == ext) {
            return None;
        }
    }
    Some(path.to_path_buf())
}

fn should_ignore(path: &Path, ignore_patterns: &[String]) -> bool {
    let Some(path_str) = path.to_str() else { return false };
    for pattern in ignore_patterns {
        if let Some(parts) = pattern.strip_prefix("**/").and_then(|p| p.strip_suffix("/**")) {
            if path_str.contains(&format!("/{parts}/")) || path_str.starts_with(&format!("{parts}/")) {
                return true;
            }
        } else if path_str.contains(pattern.as_str()) {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn ignores_node_modules() {
        let patterns = vec!["**/node_modules/**".to_string()];
        assert!(should_ignore(&PathBuf::from("/repo/node_modules/pkg/index.js"), &patterns));
        assert!(!should_ignore(&PathBuf::from("/repo/src/main.rs"), &patterns));
    }

    #[test]
    fn extension_filter_rejects_unlisted_extensions() {
        let config = WatchConfig { extensions: vec!["py".to_string()], ..WatchConfig::default() };
        assert!(keep(&PathBuf::from("/repo/a.py"), &config).is_some());
        assert!(keep(&PathBuf::from("/repo/a.rs"), &config).is_none());
    }
}
