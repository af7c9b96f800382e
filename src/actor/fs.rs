//! FileSystem Actor
//!
//! Watches the source tree and turns debounced batches into task runs.
//!
//! ```text
//! notify -> Debouncer (timing) -> WatchSet (glob -> task) -> TaskMsg::Run
//! ```
//!
//! The watcher is created before the actor runs, so changes made while the
//! rest of the system starts up are buffered rather than lost.

mod debouncer;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use rustc_hash::FxHashMap;
use tokio::sync::mpsc;

use self::debouncer::{ChangeKind, Debouncer};
use super::messages::TaskMsg;
use crate::config::PipelineConfig;
use crate::utils::path::normalize_path;
use crate::watch::WatchSet;

/// FileSystem Actor - watches for file changes
pub struct FsActor {
    /// Sync notify callback -> actor loop
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    /// Watcher handle (must be kept alive)
    _watcher: RecommendedWatcher,
    task_tx: mpsc::Sender<TaskMsg>,
    debouncer: Debouncer,
    router: Router,
}

impl FsActor {
    /// Start watching the source directory immediately.
    pub fn new(
        config: Arc<PipelineConfig>,
        watch_set: WatchSet,
        task_tx: mpsc::Sender<TaskMsg>,
    ) -> notify::Result<Self> {
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();

        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })?;
        watcher.watch(config.source_dir(), RecursiveMode::Recursive)?;
        crate::debug!("watch"; "watching {}", config.source_dir().display());

        Ok(Self {
            notify_rx,
            _watcher: watcher,
            task_tx,
            debouncer: Debouncer::new(),
            router: Router::new(&config, watch_set),
        })
    }

    /// Run the actor event loop
    pub async fn run(self) {
        let Self {
            notify_rx,
            _watcher,
            task_tx,
            mut debouncer,
            router,
        } = self;

        let (async_tx, mut async_rx) = mpsc::channel::<notify::Event>(64);

        // notify only offers a sync callback; bridge it onto the runtime
        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if async_tx.blocking_send(event).is_err() {
                            break;
                        }
                    }
                    Err(e) => crate::log!("watch"; "notify error: {}", e),
                }
            }
        });

        loop {
            tokio::select! {
                biased;
                event = async_rx.recv() => match event {
                    Some(event) => debouncer.add_event(&event),
                    None => break,
                },
                _ = tokio::time::sleep(debouncer.sleep_duration()) => {
                    let Some(changes) = debouncer.take_if_ready() else {
                        continue;
                    };
                    let Some(msg) = router.route(changes) else {
                        continue;
                    };
                    if task_tx.send(msg).await.is_err() {
                        break;
                    }
                }
            }
        }
        crate::debug!("watch"; "stopped");
    }
}

/// Maps absolute change paths to the tasks bound to them.
struct Router {
    source: PathBuf,
    output: PathBuf,
    watch_set: WatchSet,
}

impl Router {
    fn new(config: &PipelineConfig, watch_set: WatchSet) -> Self {
        Self {
            source: normalize_path(config.source_dir()),
            output: normalize_path(config.output_dir()),
            watch_set,
        }
    }

    /// Source-relative path, or `None` for paths the pipeline must ignore.
    fn relativize(&self, path: &Path) -> Option<PathBuf> {
        // the output dir may live inside the source dir
        if path.starts_with(&self.output) {
            return None;
        }
        path.strip_prefix(&self.source).ok().map(Path::to_path_buf)
    }

    fn route(&self, changes: FxHashMap<PathBuf, ChangeKind>) -> Option<TaskMsg> {
        let mut paths: Vec<PathBuf> = changes
            .iter()
            .filter_map(|(path, kind)| {
                let relative = self.relativize(path)?;
                crate::debug!("watch"; "{} {}", kind.label(), relative.display());
                Some(relative)
            })
            .collect();
        paths.sort();

        let tasks = self.watch_set.tasks_for(paths.iter().map(PathBuf::as_path));
        if tasks.is_empty() {
            return None;
        }
        Some(TaskMsg::Run { tasks, paths })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskName;

    fn router(source: &str, output: &str) -> Router {
        let config = PipelineConfig::default();
        Router {
            source: PathBuf::from(source),
            output: PathBuf::from(output),
            watch_set: WatchSet::from_config(&config).unwrap(),
        }
    }

    fn batch(paths: &[&str]) -> FxHashMap<PathBuf, ChangeKind> {
        paths
            .iter()
            .map(|p| (PathBuf::from(p), ChangeKind::Modified))
            .collect()
    }

    #[test]
    fn test_route_partial_to_styles() {
        let router = router("/p/src", "/p/app");
        match router.route(batch(&["/p/src/scss/parts/_vars.scss"])) {
            Some(TaskMsg::Run { tasks, paths }) => {
                assert_eq!(tasks, [TaskName::Styles]);
                assert_eq!(paths, [PathBuf::from("scss/parts/_vars.scss")]);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_unbound_batch_sends_nothing() {
        let router = router("/p/src", "/p/app");
        assert!(router.route(batch(&["/p/src/README.md", "/p/other/x.scss"])).is_none());
    }

    #[test]
    fn test_output_inside_source_is_ignored() {
        let router = router("/p", "/p/app");
        assert!(router.relativize(Path::new("/p/app/index.html")).is_none());
        assert!(router.route(batch(&["/p/app/index.html"])).is_none());
        assert_eq!(
            router.relativize(Path::new("/p/index.html")),
            Some(PathBuf::from("index.html"))
        );
    }
}
