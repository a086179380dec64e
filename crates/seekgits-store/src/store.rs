//! Load/save/mutate operations over the manifest, plus key recovery.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use seekgits_core::{SeekgitsError, SeekgitsResult};
use seekgits_crypto::FileKey;
use seekgits_keyring::Keyring;

use crate::manifest::{Manifest, TrackedFile, MANIFEST_FILE};

/// Manifest access rooted at an explicit repository root.
///
/// Filter invocations only read; lifecycle commands mutate. Saves go
/// through a temp file and rename so a concurrent reader never sees a
/// half-written manifest.
pub struct ConfigStore {
    root: PathBuf,
}

impl ConfigStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE)
    }

    /// Load the manifest; `NotInitialized` when the file is absent.
    pub fn load(&self) -> SeekgitsResult<Manifest> {
        match std::fs::read(self.manifest_path()) {
            Ok(bytes) => Manifest::from_bytes(&bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(SeekgitsError::NotInitialized)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Atomically write the manifest (write-temp, rename).
    pub fn save(&self, manifest: &Manifest) -> SeekgitsResult<()> {
        let bytes = manifest.to_bytes()?;
        let mut tmp = tempfile::NamedTempFile::new_in(&self.root)?;
        tmp.write_all(&bytes)?;
        tmp.persist(self.manifest_path())
            .map_err(|e| SeekgitsError::Io(e.error))?;
        Ok(())
    }

    /// Write an empty manifest unless one already exists.
    pub fn init(&self) -> SeekgitsResult<()> {
        if self.manifest_path().exists() {
            return Ok(());
        }
        self.save(&Manifest::new())
    }

    /// Start tracking `path` with a single wrapped key.
    pub fn add_tracked_file(
        &self,
        path: &str,
        recipient: &str,
        wrapped: &[u8],
    ) -> SeekgitsResult<()> {
        let mut manifest = self.load()?;
        if manifest.files.contains_key(path) {
            return Err(SeekgitsError::AlreadyTracked(path.to_string()));
        }

        let mut keys = BTreeMap::new();
        keys.insert(recipient.to_string(), BASE64.encode(wrapped));
        manifest.files.insert(path.to_string(), TrackedFile { keys });
        self.save(&manifest)
    }

    /// Add one more wrapped key to an already-tracked path.
    pub fn add_recipient(
        &self,
        path: &str,
        recipient: &str,
        wrapped: &[u8],
    ) -> SeekgitsResult<()> {
        let mut manifest = self.load()?;
        let tracked = manifest
            .files
            .get_mut(path)
            .ok_or_else(|| SeekgitsError::NotTracked(path.to_string()))?;

        if tracked.keys.contains_key(recipient) {
            return Err(SeekgitsError::RecipientDuplicate {
                path: path.to_string(),
                recipient: recipient.to_string(),
            });
        }
        tracked
            .keys
            .insert(recipient.to_string(), BASE64.encode(wrapped));
        self.save(&manifest)
    }

    /// Stop tracking `path`.
    pub fn remove_tracked_file(&self, path: &str) -> SeekgitsResult<()> {
        let mut manifest = self.load()?;
        if manifest.files.remove(path).is_none() {
            return Err(SeekgitsError::NotTracked(path.to_string()));
        }
        self.save(&manifest)
    }

    /// Recover the raw file key for `path`: try each wrapped entry in
    /// recipient order, return the first unwrap that succeeds.
    pub fn get_file_key(&self, keyring: &dyn Keyring, path: &str) -> SeekgitsResult<FileKey> {
        let manifest = self.load()?;
        let tracked = manifest
            .files
            .get(path)
            .ok_or_else(|| SeekgitsError::NotTracked(path.to_string()))?;
        Self::unwrap_file_key(keyring, path, tracked)
    }

    /// As [`get_file_key`](Self::get_file_key), for callers that already
    /// hold a loaded manifest entry.
    pub fn unwrap_file_key(
        keyring: &dyn Keyring,
        path: &str,
        tracked: &TrackedFile,
    ) -> SeekgitsResult<FileKey> {
        for (recipient, blob) in &tracked.keys {
            let wrapped = BASE64.decode(blob).map_err(|e| {
                SeekgitsError::CorruptManifest(format!(
                    "wrapped key for `{path}` / `{recipient}` is not valid base64: {e}"
                ))
            })?;
            match keyring.unwrap(&wrapped) {
                Ok(key) => return Ok(key),
                Err(e) => {
                    tracing::debug!(path, recipient, error = %e, "unwrap attempt failed");
                }
            }
        }
        Err(SeekgitsError::NoAccess {
            path: path.to_string(),
            recipients: tracked.keys.keys().cloned().collect(),
        })
    }

    /// Recipients for `path`, sorted lexicographically.
    pub fn list_recipients(&self, path: &str) -> SeekgitsResult<Vec<String>> {
        let manifest = self.load()?;
        let tracked = manifest
            .files
            .get(path)
            .ok_or_else(|| SeekgitsError::NotTracked(path.to_string()))?;
        Ok(tracked.keys.keys().cloned().collect())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}
