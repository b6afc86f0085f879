//! Configuration file watcher for hot reload.
//!
//! # Design Decisions
//! - Watches the directory holding the file, not the file itself: editors
//!   save by renaming a temp file over the original, which replaces the
//!   inode a file watch would be bound to
//! - Events are filtered down to the config file name
//! - A file that fails to load is logged and the running config is kept

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::BlogConfig;

/// Watches a configuration file and sends every successfully loaded
/// version to its receiver.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<BlogConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and a receiver for configuration updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<BlogConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching in a background thread.
    ///
    /// The returned watcher must be kept alive for updates to flow.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let dir = watch_dir(&self.path);
        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .ok_or_else(|| notify::Error::generic("config path has no file name"))?;

        let path = self.path.clone();
        let tx = self.update_tx;

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if touches_config(&event, &file_name) => {
                    tracing::info!(kind = ?event.kind, "Config file change detected, reloading...");
                    reload(&path, &tx);
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = ?e, "Watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, dir = ?dir, "Config watcher started");
        Ok(watcher)
    }
}

/// Directory to watch for `path`; a bare file name lives in `.`.
fn watch_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Whether `event` may have changed the file called `file_name`.
fn touches_config(event: &Event, file_name: &OsStr) -> bool {
    matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Any
    ) && event
        .paths
        .iter()
        .any(|p| p.file_name() == Some(file_name))
}

fn reload(path: &Path, tx: &mpsc::UnboundedSender<BlogConfig>) {
    match load_config(path) {
        Ok(config) => {
            let _ = tx.send(config);
        }
        Err(e) => {
            tracing::error!(
                error = %e,
                "Failed to reload config, keeping current configuration"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind, RemoveKind, RenameMode};
    use std::ffi::OsString;
    use std::fs;

    fn event(kind: EventKind, paths: &[&str]) -> Event {
        let mut event = Event::new(kind);
        for p in paths {
            event = event.add_path(PathBuf::from(p));
        }
        event
    }

    #[test]
    fn test_touches_config_filters_by_name() {
        let name = OsString::from("blogd.toml");
        let rename = EventKind::Modify(ModifyKind::Name(RenameMode::Both));

        assert!(touches_config(
            &event(rename, &["/etc/blogd/.blogd.toml.swp", "/etc/blogd/blogd.toml"]),
            &name
        ));
        assert!(touches_config(
            &event(EventKind::Create(CreateKind::File), &["/etc/blogd/blogd.toml"]),
            &name
        ));
        assert!(!touches_config(
            &event(EventKind::Create(CreateKind::File), &["/etc/blogd/other.toml"]),
            &name
        ));
        assert!(!touches_config(
            &event(EventKind::Remove(RemoveKind::File), &["/etc/blogd/blogd.toml"]),
            &name
        ));
    }

    #[test]
    fn test_watch_dir() {
        assert_eq!(watch_dir(Path::new("blogd.toml")), PathBuf::from("."));
        assert_eq!(
            watch_dir(Path::new("/etc/blogd/blogd.toml")),
            PathBuf::from("/etc/blogd")
        );
    }

    /// Replace `path` the way editors save: write a sibling, rename it over.
    fn rename_save(path: &Path, contents: &str) {
        let tmp = path.with_file_name(".blogd.toml.tmp");
        fs::write(&tmp, contents).unwrap();
        fs::rename(&tmp, path).unwrap();
    }

    async fn next_page_size(
        rx: &mut mpsc::UnboundedReceiver<BlogConfig>,
        expected: usize,
    ) -> bool {
        let wait = async {
            while let Some(config) = rx.recv().await {
                if config.site.page_size == expected {
                    return true;
                }
            }
            false
        };
        tokio::time::timeout(Duration::from_secs(10), wait)
            .await
            .unwrap_or(false)
    }

    #[tokio::test]
    async fn test_reloads_after_repeated_rename_saves() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blogd.toml");
        fs::write(&path, "[site]\npage_size = 5\n").unwrap();

        let (watcher, mut rx) = ConfigWatcher::new(&path);
        let _watcher = watcher.run().unwrap();

        rename_save(&path, "[site]\npage_size = 6\n");
        assert!(next_page_size(&mut rx, 6).await, "first save not picked up");

        rename_save(&path, "[site]\npage_size = 7\n");
        assert!(next_page_size(&mut rx, 7).await, "second save not picked up");
    }
}
