//! Repository discovery and git subprocess operations.

use std::path::{Path, PathBuf};
use std::process::Command;

use seekgits_core::{SeekgitsError, SeekgitsResult};

/// A located git repository.
///
/// The root is resolved once at process start; nothing else relies on
/// the ambient working directory.
pub struct GitRepo {
    root: PathBuf,
}

impl GitRepo {
    /// Walk up from the current directory until a `.git` entry is found.
    pub fn discover() -> SeekgitsResult<Self> {
        Self::discover_from(&std::env::current_dir()?)
    }

    /// Walk up from `start` until a `.git` entry is found.
    ///
    /// Both `.git` directories and `.git` files (worktrees, submodules)
    /// count.
    pub fn discover_from(start: &Path) -> SeekgitsResult<Self> {
        let mut dir = start.to_path_buf();
        loop {
            if dir.join(".git").exists() {
                return Ok(Self { root: dir });
            }
            if !dir.pop() {
                return Err(SeekgitsError::NotARepository);
            }
        }
    }

    /// Use a known root without discovery.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `git config <key> <value>` in the repository's local config.
    pub fn config_set(&self, key: &str, value: &str) -> SeekgitsResult<()> {
        self.run(&["config", key, value])
    }

    /// `git add -- <path>`
    pub fn stage(&self, path: &str) -> SeekgitsResult<()> {
        self.run(&["add", "--", path])
    }

    /// `git add --renormalize -- <path>`
    ///
    /// Re-runs the clean filter over the path even when the index
    /// already holds a cached (possibly unfiltered) entry for it.
    pub fn stage_renormalize(&self, path: &str) -> SeekgitsResult<()> {
        self.run(&["add", "--renormalize", "--", path])
    }

    /// Drop the index entry for `path`, leaving the working tree alone.
    ///
    /// `--force` skips git's modified-content check: by the time this
    /// runs the filter bookkeeping is already gone, so the cached
    /// (encrypted) entry never matches a re-clean of the working file.
    pub fn remove_cached(&self, path: &str) -> SeekgitsResult<()> {
        self.run(&["rm", "--cached", "--force", "--ignore-unmatch", "-q", "--", path])
    }

    fn run(&self, args: &[&str]) -> SeekgitsResult<()> {
        tracing::debug!(?args, root = %self.root.display(), "invoking git");

        let output = Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .output()?;

        if output.status.success() {
            Ok(())
        } else {
            Err(SeekgitsError::GitCommand {
                command: args.join(" "),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}
