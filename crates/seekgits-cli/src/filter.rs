//! Streaming clean/smudge transforms.
//!
//! One invocation handles exactly one logical file: git hands us the
//! path on the command line and the content on a stream. Every error
//! path degrades toward preserving content: clean falls back to
//! writing the input unchanged (git's `required=true` makes the
//! warning visible at commit time), and smudge substitutes a visible
//! placeholder rather than handing ciphertext to downstream tools.
//!
//! The whole input is buffered: the nonce is an HMAC over the full
//! plaintext, so nothing can be emitted before the last byte is read.

use std::io::{Read, Write};

use tracing::warn;

use seekgits_core::{SeekgitsError, SeekgitsResult};
use seekgits_crypto::{decrypt, encrypt, is_encrypted};
use seekgits_keyring::Keyring;
use seekgits_store::{ConfigStore, Manifest};

/// Clean filter: encrypt content on its way into the repository.
pub fn clean(
    store: &ConfigStore,
    keyring: &dyn Keyring,
    path: &str,
    input: &mut dyn Read,
    output: &mut dyn Write,
) -> SeekgitsResult<()> {
    let mut data = Vec::new();
    input.read_to_end(&mut data)?;

    // Already a frame: re-cleaning must be a no-op.
    if is_encrypted(&data) {
        return passthrough(output, &data);
    }

    let manifest = match load_for_filter(store, path) {
        Some(manifest) => manifest,
        None => return passthrough(output, &data),
    };
    let tracked = match manifest.files.get(path) {
        Some(tracked) => tracked,
        None => return passthrough(output, &data),
    };

    match ConfigStore::unwrap_file_key(keyring, path, tracked) {
        Ok(key) => {
            output.write_all(&encrypt(&key, &data))?;
            output.flush()?;
            Ok(())
        }
        Err(e) => {
            warn!(path, error = %e, "cannot obtain file key; storing plaintext unchanged");
            passthrough(output, &data)
        }
    }
}

/// Smudge filter and textconv: decrypt content on its way out.
pub fn smudge(
    store: &ConfigStore,
    keyring: &dyn Keyring,
    path: &str,
    input: &mut dyn Read,
    output: &mut dyn Write,
) -> SeekgitsResult<()> {
    let mut data = Vec::new();
    input.read_to_end(&mut data)?;

    // Plaintext from legacy history (or an untracked blob): hands off.
    if !is_encrypted(&data) {
        return passthrough(output, &data);
    }

    let key = load_for_filter(store, path)
        .and_then(|manifest| {
            manifest.files.get(path).cloned().or_else(|| {
                warn!(path, "encrypted frame for a path missing from the manifest");
                None
            })
        })
        .and_then(
            |tracked| match ConfigStore::unwrap_file_key(keyring, path, &tracked) {
                Ok(key) => Some(key),
                Err(e) => {
                    warn!(path, error = %e, "cannot obtain file key");
                    None
                }
            },
        );

    let Some(key) = key else {
        return placeholder(output, path);
    };

    match decrypt(&key, &data) {
        Ok(plaintext) => {
            output.write_all(&plaintext)?;
            output.flush()?;
            Ok(())
        }
        Err(SeekgitsError::NotEncrypted) => {
            // Magic marker present but the frame is truncated.
            warn!(path, "malformed frame");
            placeholder(output, path)
        }
        Err(e) => Err(e),
    }
}

fn load_for_filter(store: &ConfigStore, path: &str) -> Option<Manifest> {
    match store.load() {
        Ok(manifest) => Some(manifest),
        Err(SeekgitsError::NotInitialized) => None,
        Err(e) => {
            warn!(path, error = %e, "cannot load manifest");
            None
        }
    }
}

fn passthrough(output: &mut dyn Write, data: &[u8]) -> SeekgitsResult<()> {
    output.write_all(data)?;
    output.flush()?;
    Ok(())
}

fn placeholder(output: &mut dyn Write, path: &str) -> SeekgitsResult<()> {
    writeln!(output, "[ENCRYPTED: cannot decrypt {path}]")?;
    output.flush()?;
    Ok(())
}
