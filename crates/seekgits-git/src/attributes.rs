//! `.gitattributes` maintenance.
//!
//! For every tracked path P the repository root attribute file carries
//! the line `P filter=seekgits diff=seekgits`. Matching is on whole
//! whitespace tokens, never substrings: a line for `tools/app/.env`
//! must not answer for `.env`.

use std::path::{Path, PathBuf};

use seekgits_core::SeekgitsResult;

pub const ATTRIBUTES_FILE: &str = ".gitattributes";

const FILTER_TOKEN: &str = "filter=seekgits";
const DIFF_TOKEN: &str = "diff=seekgits";

pub struct Attributes {
    path: PathBuf,
}

impl Attributes {
    pub fn in_repo(root: &Path) -> Self {
        Self {
            path: root.join(ATTRIBUTES_FILE),
        }
    }

    /// Location of the attribute file (for staging).
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The exact line maintained for a tracked path.
    pub fn line_for(path: &str) -> String {
        format!("{path} {FILTER_TOKEN} {DIFF_TOKEN}")
    }

    /// True iff the file holds exactly the seekgits line for `path`.
    pub fn has_filter(&self, path: &str) -> SeekgitsResult<bool> {
        let content = self.read()?;
        Ok(content.lines().any(|line| is_entry_for(line, path)))
    }

    /// Idempotently append the line for `path`, preserving existing
    /// content and the trailing newline.
    pub fn add_filter(&self, path: &str) -> SeekgitsResult<()> {
        let mut content = self.read()?;
        if content.lines().any(|line| is_entry_for(line, path)) {
            return Ok(());
        }
        if !content.is_empty() && !content.ends_with('\n') {
            content.push('\n');
        }
        content.push_str(&Self::line_for(path));
        content.push('\n');
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    /// Remove any line whose first token is `path` and which carries the
    /// seekgits filter token. Deletes the file when nothing remains.
    pub fn remove_filter(&self, path: &str) -> SeekgitsResult<()> {
        let content = self.read()?;

        let kept: Vec<&str> = content
            .lines()
            .filter(|line| {
                let mut tokens = line.split_whitespace();
                !(tokens.next() == Some(path)
                    && line.split_whitespace().any(|t| t == FILTER_TOKEN))
            })
            .collect();

        if kept.iter().all(|line| line.trim().is_empty()) {
            if self.path.exists() {
                std::fs::remove_file(&self.path)?;
            }
            return Ok(());
        }

        let mut rebuilt = kept.join("\n");
        rebuilt.push('\n');
        std::fs::write(&self.path, rebuilt)?;
        Ok(())
    }

    /// Paths of every line carrying the seekgits filter token.
    pub fn list_filtered(&self) -> SeekgitsResult<Vec<String>> {
        let content = self.read()?;

        Ok(content
            .lines()
            .filter(|line| line.split_whitespace().any(|t| t == FILTER_TOKEN))
            .filter_map(|line| line.split_whitespace().next())
            .map(str::to_string)
            .collect())
    }

    fn read(&self) -> SeekgitsResult<String> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Token-exact comparison against `P filter=seekgits diff=seekgits`.
fn is_entry_for(line: &str, path: &str) -> bool {
    let mut tokens = line.split_whitespace();
    tokens.next() == Some(path)
        && tokens.next() == Some(FILTER_TOKEN)
        && tokens.next() == Some(DIFF_TOKEN)
        && tokens.next().is_none()
}
