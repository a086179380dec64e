//! Shared test fixtures.

use seekgits_core::{SeekgitsError, SeekgitsResult};
use seekgits_crypto::FileKey;
use seekgits_keyring::Keyring;
use seekgits_store::ConfigStore;

/// In-memory stand-in for gpg. A wrapped blob is the recipient name, a
/// newline, then the raw key bytes; unwrap succeeds only for identities
/// this keyring "holds" private material for.
pub struct FakeKeyring {
    held: Vec<String>,
}

impl FakeKeyring {
    pub fn holding(ids: &[&str]) -> Self {
        Self {
            held: ids.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Keyring for FakeKeyring {
    fn ensure_available(&self) -> SeekgitsResult<()> {
        Ok(())
    }

    fn wrap(&self, key: &FileKey, recipient: &str) -> SeekgitsResult<Vec<u8>> {
        let mut blob = recipient.as_bytes().to_vec();
        blob.push(b'\n');
        blob.extend_from_slice(&key.to_bytes());
        Ok(blob)
    }

    fn unwrap(&self, wrapped: &[u8]) -> SeekgitsResult<FileKey> {
        let split = wrapped
            .iter()
            .position(|&b| b == b'\n')
            .ok_or_else(|| SeekgitsError::UnwrapFailed("malformed blob".into()))?;
        let recipient = String::from_utf8_lossy(&wrapped[..split]).to_string();
        if !self.held.contains(&recipient) {
            return Err(SeekgitsError::NoPrivateKey);
        }
        FileKey::from_slice(&wrapped[split + 1..])
            .ok_or_else(|| SeekgitsError::UnwrapFailed("bad key length".into()))
    }

    fn default_recipient(&self) -> SeekgitsResult<Option<String>> {
        Ok(self.held.first().cloned())
    }

    fn recipient_exists(&self, _recipient: &str) -> SeekgitsResult<bool> {
        Ok(true)
    }
}

/// Track `path` in the manifest with a freshly generated key wrapped to
/// `recipient`; returns the raw key for assertions.
pub fn track(
    store: &ConfigStore,
    keyring: &FakeKeyring,
    path: &str,
    recipient: &str,
) -> FileKey {
    let key = FileKey::generate();
    let wrapped = keyring.wrap(&key, recipient).unwrap();
    store.add_tracked_file(path, recipient, &wrapped).unwrap();
    key
}
