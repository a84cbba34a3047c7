//! Version-control activity used for volatility and knowledge risk.
//!
//! The query runs on its own thread and is bounded by a timeout. Any failure
//! surfaces as `ExternalMetricUnavailable`; the scorer then treats every file
//! as having no recorded activity.

use crate::errors::{FragmapError, Result};
use crossbeam::channel;
use git2::{Repository, Sort};
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

const SECONDS_PER_DAY: i64 = 86_400;

/// Revisions and distinct contributors for one file inside the window
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileActivity {
    pub revisions: usize,
    pub contributors: BTreeSet<String>,
}

impl FileActivity {
    fn record(&mut self, author: &str) {
        self.revisions += 1;
        self.contributors.insert(author.to_string());
    }
}

pub type ActivityMap = HashMap<String, FileActivity>;

/// Source of per-file change history
pub trait VersionHistory: Send + Sync {
    /// Activity keyed by source identifier, over the trailing `window_days`
    fn file_activity(&self, window_days: u32) -> Result<ActivityMap>;
}

/// History provider for roots without version control
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHistory;

impl VersionHistory for NoHistory {
    fn file_activity(&self, _window_days: u32) -> Result<ActivityMap> {
        Ok(ActivityMap::new())
    }
}

/// git history read through libgit2
///
/// `git2::Repository` is not `Sync`, so the repository is reopened for each
/// query. Paths are reported relative to the ingestion root, and changes
/// outside that root are ignored.
#[derive(Debug, Clone)]
pub struct Git2History {
    root: PathBuf,
}

impl Git2History {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn open(&self) -> Result<(Repository, PathBuf)> {
        let repo = Repository::discover(&self.root)?;
        let workdir = repo
            .workdir()
            .ok_or_else(|| FragmapError::external("bare repositories are not supported"))?
            .to_path_buf();
        let prefix = root_prefix(&workdir, &self.root);
        Ok((repo, prefix))
    }
}

impl VersionHistory for Git2History {
    fn file_activity(&self, window_days: u32) -> Result<ActivityMap> {
        let (repo, prefix) = self.open()?;
        let cutoff = chrono::Utc::now().timestamp() - i64::from(window_days) * SECONDS_PER_DAY;

        let mut revwalk = repo.revwalk()?;
        revwalk.push_head()?;
        revwalk.set_sorting(Sort::TIME)?;

        let mut activity = ActivityMap::new();
        for oid in revwalk {
            let commit = repo.find_commit(oid?)?;
            if commit.time().seconds() < cutoff {
                break;
            }

            let signature = commit.author();
            let author = signature
                .email()
                .or_else(|| signature.name())
                .unwrap_or("unknown")
                .to_string();

            let tree = commit.tree()?;
            let parent_tree = commit.parents().next().and_then(|p| p.tree().ok());
            let diff = repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)?;

            for delta in diff.deltas() {
                let Some(path) = delta.new_file().path().or_else(|| delta.old_file().path()) else {
                    continue;
                };
                if let Some(source) = rebase(path, &prefix) {
                    activity.entry(source).or_default().record(&author);
                }
            }
        }

        log::debug!(
            "Collected history for {} files over {} days",
            activity.len(),
            window_days
        );
        Ok(activity)
    }
}

/// Ingestion root relative to the repository workdir, empty when they coincide
fn root_prefix(workdir: &Path, root: &Path) -> PathBuf {
    let workdir = workdir.canonicalize().unwrap_or_else(|_| workdir.to_path_buf());
    let root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
    root.strip_prefix(&workdir)
        .map(Path::to_path_buf)
        .unwrap_or_default()
}

fn rebase(path: &Path, prefix: &Path) -> Option<String> {
    let relative = path.strip_prefix(prefix).ok()?;
    Some(crate::io::relative_source(Path::new(""), relative))
}

/// Run a history query on a worker thread, giving up after `timeout`.
///
/// The worker is detached on timeout; its eventual result is discarded.
pub fn query_with_timeout(
    history: Arc<dyn VersionHistory>,
    window_days: u32,
    timeout: Duration,
) -> Result<ActivityMap> {
    let (tx, rx) = channel::bounded(1);

    std::thread::Builder::new()
        .name("fragmap-history".to_string())
        .spawn(move || {
            let _ = tx.send(history.file_activity(window_days));
        })?;

    match rx.recv_timeout(timeout) {
        Ok(result) => result.map_err(|e| match e {
            FragmapError::ExternalMetricUnavailable(_) => e,
            other => FragmapError::external(other.to_string()),
        }),
        Err(channel::RecvTimeoutError::Timeout) => Err(FragmapError::external(format!(
            "version history query timed out after {:?}",
            timeout
        ))),
        Err(channel::RecvTimeoutError::Disconnected) => Err(FragmapError::external(
            "version history worker exited without a result",
        )),
    }
}

/// Query history, logging and substituting an empty map on failure
pub fn activity_or_empty(
    history: Arc<dyn VersionHistory>,
    window_days: u32,
    timeout: Duration,
) -> (ActivityMap, Option<FragmapError>) {
    match query_with_timeout(history, window_days, timeout) {
        Ok(activity) => (activity, None),
        Err(e) => {
            log::warn!("{}; volatility and knowledge risk default to 0", e);
            (ActivityMap::new(), Some(e))
        }
    }
}
