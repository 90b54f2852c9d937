//! Synchronization of remote repositories into the local git cache.
//!
//! Each `(url, revision)` pair is synchronized at most once per process and
//! cache directory. The first caller performs the work, concurrent callers
//! wait for it and every caller observes the same outcome.

use crate::cancel::CancelToken;
use crate::constants::{FRESHNESS_WINDOW, ORIGIN};
use crate::error::{Error, Result};
use git2::build::{CheckoutBuilder, RepoBuilder};
use git2::{
    Commit, Config, Cred, CredentialType, ErrorClass, ErrorCode, FetchOptions, RemoteCallbacks,
    Repository,
};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, OnceLock};
use std::thread;
use std::time::Duration;
use url::Url;

const MAX_CREDENTIAL_ATTEMPTS: usize = 3;

/// How often a waiting caller checks its cancel token.
const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Failure shared between all callers waiting on the same synchronization.
#[derive(Debug, Clone)]
enum SyncFailure {
    RevisionNotFound,
    Transient(String),
    Cancelled,
    Failed(String),
}

impl SyncFailure {
    fn into_error(self, url: &Url, revision: &str) -> Error {
        let url = url.to_string();
        match self {
            SyncFailure::RevisionNotFound => {
                Error::RevisionNotFound { url, revision: revision.to_string() }
            }
            SyncFailure::Transient(message) => Error::NetworkTransient { url, message },
            SyncFailure::Cancelled => Error::Cancelled { url },
            SyncFailure::Failed(message) => Error::SyncFailed { url, message },
        }
    }
}

type SyncOutcome = std::result::Result<(), SyncFailure>;
type SyncKey = (String, String, PathBuf);
type SyncCells = Mutex<HashMap<SyncKey, Arc<OnceLock<SyncOutcome>>>>;

fn sync_cells() -> &'static SyncCells {
    static CELLS: OnceLock<SyncCells> = OnceLock::new();
    CELLS.get_or_init(Default::default)
}

/// Brings the cache at `cache_path` to `revision` of `url`, once per process.
pub fn synchronize_once(
    url: &Url,
    revision: &str,
    cache_path: &Path,
    cancel: &CancelToken,
) -> Result<()> {
    let cell = {
        let mut cells = sync_cells().lock().map_err(|_| Error::SyncFailed {
            url: url.to_string(),
            message: "synchronization state is poisoned".to_string(),
        })?;
        let key = (url.to_string(), revision.to_string(), cache_path.to_path_buf());
        Arc::clone(cells.entry(key).or_default())
    };

    cell.get_or_init(|| synchronize(url, revision, cache_path, cancel))
        .clone()
        .map_err(|failure| failure.into_error(url, revision))
}

/// Runs one synchronization and applies the failure policy.
///
/// A transient network error is tolerated when a cached copy already exists.
/// An unknown revision discards the cache so that no stale checkout remains.
fn synchronize(url: &Url, revision: &str, cache_path: &Path, cancel: &CancelToken) -> SyncOutcome {
    let (had_cache, result) = run_cancellable(url, revision, cache_path, cancel);
    match result {
        Ok(()) => Ok(()),
        Err(Error::NetworkTransient { message, .. }) => {
            if had_cache {
                warn!(
                    "Could not update '{url}' ({message}), using the cached copy in '{}'",
                    cache_path.display()
                );
                Ok(())
            } else {
                Err(SyncFailure::Transient(message))
            }
        }
        Err(Error::RevisionNotFound { .. }) => {
            remove_cache(cache_path);
            Err(SyncFailure::RevisionNotFound)
        }
        Err(Error::Cancelled { .. }) => Err(SyncFailure::Cancelled),
        Err(err) => Err(SyncFailure::Failed(err.to_string())),
    }
}

/// Runs the git work on a worker thread and waits for it until the token is
/// cancelled.
///
/// libgit2 only consults the token from progress callbacks, which never fire
/// while it waits on a silent server. A worker abandoned this way stays blocked
/// in the background; its cache is not touched by later callers because the
/// cancelled outcome is memoized.
fn run_cancellable(
    url: &Url,
    revision: &str,
    cache_path: &Path,
    cancel: &CancelToken,
) -> (bool, Result<()>) {
    let (sender, receiver) = mpsc::channel();
    let worker = {
        let (url, revision) = (url.clone(), revision.to_string());
        let (cache_path, cancel) = (cache_path.to_path_buf(), cancel.clone());
        move || {
            let mut had_cache = false;
            let result = try_synchronize(&url, &revision, &cache_path, &cancel, &mut had_cache);
            // The receiver is gone once the caller gave up on this worker.
            let _ = sender.send((had_cache, result));
        }
    };
    if let Err(err) = thread::Builder::new().name("skelly-git-sync".to_string()).spawn(worker) {
        return (false, Err(err.into()));
    }

    loop {
        match receiver.recv_timeout(CANCEL_POLL_INTERVAL) {
            Ok(outcome) => return outcome,
            Err(RecvTimeoutError::Timeout) if cancel.is_cancelled() => {
                if let Ok(outcome) = receiver.try_recv() {
                    return outcome;
                }
                warn!("Abandoning synchronization of '{url}' after cancellation");
                return (false, Err(Error::Cancelled { url: url.to_string() }));
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                return (
                    false,
                    Err(Error::SyncFailed {
                        url: url.to_string(),
                        message: "synchronization worker stopped unexpectedly".to_string(),
                    }),
                );
            }
        }
    }
}

fn try_synchronize(
    url: &Url,
    revision: &str,
    cache_path: &Path,
    cancel: &CancelToken,
    had_cache: &mut bool,
) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(Error::Cancelled { url: url.to_string() });
    }

    let repo = match open_cache(cache_path) {
        Some(repo) => {
            *had_cache = true;
            if is_stale(cache_path) {
                fetch(&repo, url, cancel)?;
            } else {
                debug!("Cache '{}' is fresh, skipping fetch", cache_path.display());
            }
            repo
        }
        None => clone(url, cache_path, cancel)?,
    };

    let commit = resolve_revision(&repo, revision).ok_or_else(|| Error::RevisionNotFound {
        url: url.to_string(),
        revision: revision.to_string(),
    })?;
    debug!("Checking out {} for '{url}' at '{revision}'", commit.id());
    checkout(&repo, &commit)
}

/// Opens an existing cache, discarding it when it is not a usable repository.
fn open_cache(cache_path: &Path) -> Option<Repository> {
    if !cache_path.exists() {
        return None;
    }
    match Repository::open(cache_path) {
        Ok(repo) => Some(repo),
        Err(err) => {
            warn!("Discarding unusable cache '{}': {}", cache_path.display(), err.message());
            remove_cache(cache_path);
            None
        }
    }
}

fn remove_cache(cache_path: &Path) {
    if cache_path.exists() {
        if let Err(err) = fs::remove_dir_all(cache_path) {
            warn!("Failed to remove cache '{}': {err}", cache_path.display());
        }
    }
}

/// The cache counts as stale once its last fetch is older than the freshness window.
fn is_stale(cache_path: &Path) -> bool {
    let fetch_head = cache_path.join(".git").join("FETCH_HEAD");
    let probe = if fetch_head.exists() { fetch_head } else { cache_path.to_path_buf() };
    match fs::metadata(&probe).and_then(|metadata| metadata.modified()) {
        Ok(modified) => modified.elapsed().map(|age| age > FRESHNESS_WINDOW).unwrap_or(false),
        Err(_) => true,
    }
}

fn clone(url: &Url, cache_path: &Path, cancel: &CancelToken) -> Result<Repository> {
    if let Some(parent) = cache_path.parent() {
        fs::create_dir_all(parent)?;
    }
    info!("Cloning '{url}' into '{}'", cache_path.display());

    let mut builder = RepoBuilder::new();
    builder.fetch_options(fetch_options(cancel));
    builder.clone(url.as_str(), cache_path).map_err(|err| git_error(err, url, cancel))
}

fn fetch(repo: &Repository, url: &Url, cancel: &CancelToken) -> Result<()> {
    info!("Fetching '{url}'");
    let mut remote = repo.find_remote(ORIGIN)?;
    let refspecs = [
        format!("+refs/heads/*:refs/remotes/{ORIGIN}/*"),
        "+refs/tags/*:refs/tags/*".to_string(),
    ];
    remote
        .fetch(&refspecs, Some(&mut fetch_options(cancel)), None)
        .map_err(|err| git_error(err, url, cancel))
}

/// Fetch options whose callbacks abort once the token is cancelled.
fn fetch_options(cancel: &CancelToken) -> FetchOptions<'static> {
    let mut callbacks = RemoteCallbacks::new();

    let token = cancel.clone();
    callbacks.transfer_progress(move |_| !token.is_cancelled());
    let token = cancel.clone();
    callbacks.sideband_progress(move |_| !token.is_cancelled());

    let mut attempts = 0;
    callbacks.credentials(move |url, username, allowed| {
        attempts += 1;
        if attempts > MAX_CREDENTIAL_ATTEMPTS {
            return Err(git2::Error::from_str("no usable credentials were found"));
        }
        if allowed.contains(CredentialType::SSH_KEY) {
            Cred::ssh_key_from_agent(username.unwrap_or("git"))
        } else if allowed.contains(CredentialType::USER_PASS_PLAINTEXT) {
            Config::open_default()
                .and_then(|config| Cred::credential_helper(&config, url, username))
        } else {
            Cred::default()
        }
    });

    let mut options = FetchOptions::new();
    options.remote_callbacks(callbacks);
    options
}

/// Classifies a failed clone or fetch.
///
/// Socket failures surface with the OS class, so they count as transient here
/// in addition to the network classes.
fn git_error(err: git2::Error, url: &Url, cancel: &CancelToken) -> Error {
    if cancel.is_cancelled() {
        Error::Cancelled { url: url.to_string() }
    } else if is_transient(&err) || err.class() == ErrorClass::Os {
        Error::NetworkTransient { url: url.to_string(), message: err.message().to_string() }
    } else {
        Error::Git2Error(err)
    }
}

/// Network, HTTP, TLS and SSH failures other than rejected credentials or
/// certificates may succeed on a later attempt.
pub fn is_transient(err: &git2::Error) -> bool {
    matches!(err.class(), ErrorClass::Net | ErrorClass::Http | ErrorClass::Ssl | ErrorClass::Ssh)
        && !matches!(err.code(), ErrorCode::Auth | ErrorCode::Certificate)
}

/// Resolves a revision as a full reference or commit id, then as a tag, then
/// as a branch of the origin remote.
fn resolve_revision<'r>(repo: &'r Repository, revision: &str) -> Option<Commit<'r>> {
    let by_reference = |name: &str| {
        repo.find_reference(name).and_then(|reference| reference.peel_to_commit()).ok()
    };

    by_reference(revision)
        .or_else(|| by_commit_id(repo, revision))
        .or_else(|| by_reference(&format!("refs/tags/{revision}")))
        .or_else(|| by_reference(&format!("refs/remotes/{ORIGIN}/{revision}")))
}

fn by_commit_id<'r>(repo: &'r Repository, revision: &str) -> Option<Commit<'r>> {
    if revision.len() < 4 || !revision.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    repo.revparse_single(revision).and_then(|object| object.peel_to_commit()).ok()
}

/// Forces the working tree to `commit`, dropping untracked files, and detaches HEAD.
fn checkout(repo: &Repository, commit: &Commit<'_>) -> Result<()> {
    let mut builder = CheckoutBuilder::new();
    builder.force().remove_untracked(true);
    repo.checkout_tree(commit.as_object(), Some(&mut builder))?;
    repo.set_head_detached(commit.id())?;
    Ok(())
}
