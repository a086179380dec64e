//! Typed manifest model and its stable on-disk form.

use std::collections::BTreeMap;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use seekgits_core::{paths, SeekgitsError, SeekgitsResult};

/// Manifest file name, relative to the repository root.
pub const MANIFEST_FILE: &str = ".seekgits.json";

/// Current manifest schema version.
pub const MANIFEST_VERSION: u32 = 1;

/// One tracked path's recipient set.
///
/// Invariant: `keys` is non-empty; a tracked file nobody can unwrap is
/// invalid and is removed from the manifest instead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedFile {
    /// Recipient → base64-encoded wrapped file key.
    pub keys: BTreeMap<String, String>,
}

/// The committed manifest: schema version plus tracked paths.
///
/// `BTreeMap` keeps both path and recipient keys sorted so the stored
/// bytes only change when the content does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub version: u32,
    pub files: BTreeMap<String, TrackedFile>,
}

impl Default for Manifest {
    fn default() -> Self {
        Self::new()
    }
}

impl Manifest {
    /// An empty manifest at the current schema version.
    pub fn new() -> Self {
        Self {
            version: MANIFEST_VERSION,
            files: BTreeMap::new(),
        }
    }

    /// Parse and validate manifest bytes.
    pub fn from_bytes(data: &[u8]) -> SeekgitsResult<Self> {
        let manifest: Self = serde_json::from_slice(data)
            .map_err(|e| SeekgitsError::CorruptManifest(e.to_string()))?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Stable serialization: sorted keys, two-space indent, trailing
    /// newline.
    pub fn to_bytes(&self) -> SeekgitsResult<Vec<u8>> {
        let mut text =
            serde_json::to_string_pretty(self).context("serializing manifest")?;
        text.push('\n');
        Ok(text.into_bytes())
    }

    fn validate(&self) -> SeekgitsResult<()> {
        if self.version != MANIFEST_VERSION {
            return Err(SeekgitsError::CorruptManifest(format!(
                "unrecognized manifest version {}",
                self.version
            )));
        }
        for (path, tracked) in &self.files {
            let normalized = paths::normalize(path).map_err(|e| {
                SeekgitsError::CorruptManifest(format!("bad manifest path: {e}"))
            })?;
            if &normalized != path {
                return Err(SeekgitsError::CorruptManifest(format!(
                    "manifest path `{path}` is not normalized"
                )));
            }
            if tracked.keys.is_empty() {
                return Err(SeekgitsError::CorruptManifest(format!(
                    "`{path}` has an empty recipient set"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Manifest {
        let mut manifest = Manifest::new();
        let mut keys = BTreeMap::new();
        keys.insert("alice@example.org".to_string(), "d3JhcHBlZA==".to_string());
        manifest
            .files
            .insert("secrets/.env".to_string(), TrackedFile { keys });
        manifest
    }

    #[test]
    fn test_roundtrip() {
        let manifest = sample();
        let bytes = manifest.to_bytes().unwrap();
        let restored = Manifest::from_bytes(&bytes).unwrap();
        assert_eq!(restored, manifest);
    }

    #[test]
    fn test_serialization_is_stable() {
        let bytes = sample().to_bytes().unwrap();
        let again = Manifest::from_bytes(&bytes).unwrap().to_bytes().unwrap();
        assert_eq!(bytes, again, "reload-and-save must not churn bytes");
    }

    #[test]
    fn test_serialized_shape() {
        let text = String::from_utf8(sample().to_bytes().unwrap()).unwrap();
        assert!(text.starts_with("{\n  \"version\": 1,\n  \"files\": {"));
        assert!(text.ends_with("}\n"));
        assert!(text.contains("\"secrets/.env\""));
        assert!(text.contains("\"alice@example.org\""));
    }

    #[test]
    fn test_unparseable_bytes_are_corrupt() {
        let err = Manifest::from_bytes(b"not json at all").unwrap_err();
        assert!(matches!(err, SeekgitsError::CorruptManifest(_)));
    }

    #[test]
    fn test_unknown_version_is_corrupt() {
        let err = Manifest::from_bytes(br#"{"version": 99, "files": {}}"#).unwrap_err();
        assert!(matches!(err, SeekgitsError::CorruptManifest(_)));
    }

    #[test]
    fn test_empty_recipient_set_is_corrupt() {
        let data = br#"{"version": 1, "files": {"a.txt": {"keys": {}}}}"#;
        let err = Manifest::from_bytes(data).unwrap_err();
        assert!(matches!(err, SeekgitsError::CorruptManifest(_)));
    }

    #[test]
    fn test_non_normalized_path_is_corrupt() {
        for path in ["./a.txt", "/a.txt", "a/../b.txt"] {
            let data = format!(
                r#"{{"version": 1, "files": {{"{path}": {{"keys": {{"r": "eA=="}}}}}}}}"#
            );
            let err = Manifest::from_bytes(data.as_bytes()).unwrap_err();
            assert!(
                matches!(err, SeekgitsError::CorruptManifest(_)),
                "path {path} should be rejected"
            );
        }
    }
}
