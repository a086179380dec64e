//! Lifecycle commands: init, encrypt (start tracking), share, remove,
//! status. These mutate the manifest and attribute file and drive git;
//! errors surface to the caller with a non-zero exit.

use std::path::Path;

use seekgits_core::{paths, SeekgitsError, SeekgitsResult};
use seekgits_crypto::FileKey;
use seekgits_git::attributes::ATTRIBUTES_FILE;
use seekgits_git::{Attributes, GitRepo};
use seekgits_keyring::Keyring;
use seekgits_store::{ConfigStore, MANIFEST_FILE};

/// Register the clean/smudge/textconv drivers and create the manifest.
///
/// The recorded binary path must be absolute: git invokes filters from
/// hooks and aliases that do not inherit an interactive PATH.
pub fn init(repo: &GitRepo, keyring: &dyn Keyring, binary: &Path) -> SeekgitsResult<()> {
    keyring.ensure_available()?;

    let binary = binary.display();
    let clean = format!("{binary} filter encrypt %f");
    let smudge = format!("{binary} filter decrypt %f");

    repo.config_set("filter.seekgits.clean", &clean)?;
    repo.config_set("filter.seekgits.smudge", &smudge)?;
    repo.config_set("filter.seekgits.required", "true")?;
    repo.config_set("diff.seekgits.textconv", &smudge)?;
    repo.config_set("diff.seekgits.binary", "true")?;

    let store = ConfigStore::new(repo.root());
    store.init()?;

    println!("seekgits initialized in {}", repo.root().display());
    Ok(())
}

/// Start tracking a file: fresh key, wrapped to the default identity.
pub fn encrypt(repo: &GitRepo, keyring: &dyn Keyring, path: &Path) -> SeekgitsResult<()> {
    let store = ConfigStore::new(repo.root());
    let manifest = store.load()?;

    let rel = paths::repo_relative(repo.root(), path)?;
    if !repo.root().join(&rel).exists() {
        return Err(SeekgitsError::InvalidPath {
            path: rel,
            reason: "no such file in the working tree".to_string(),
        });
    }
    if manifest.files.contains_key(&rel) {
        return Err(SeekgitsError::AlreadyTracked(rel));
    }

    let recipient = keyring
        .default_recipient()?
        .ok_or(SeekgitsError::NoIdentity)?;

    let key = FileKey::generate();
    let wrapped = keyring.wrap(&key, &recipient)?;
    store.add_tracked_file(&rel, &recipient, &wrapped)?;

    let attributes = Attributes::in_repo(repo.root());
    attributes.add_filter(&rel)?;

    // Stage the bookkeeping first, then renormalize the tracked path so
    // the freshly installed clean filter replaces any cached entry.
    repo.stage(ATTRIBUTES_FILE)?;
    repo.stage(MANIFEST_FILE)?;
    repo.stage_renormalize(&rel)?;

    println!("tracking {rel} (encrypted for {recipient})");
    Ok(())
}

/// Wrap an already-tracked file's key to one more recipient.
///
/// The caller must currently hold access: the raw key is recovered
/// through their own private material before being re-wrapped.
pub fn share(
    repo: &GitRepo,
    keyring: &dyn Keyring,
    path: &Path,
    recipient: &str,
) -> SeekgitsResult<()> {
    let store = ConfigStore::new(repo.root());
    let rel = paths::repo_relative(repo.root(), path)?;

    let key = store.get_file_key(keyring, &rel)?;

    if !keyring.recipient_exists(recipient)? {
        return Err(SeekgitsError::RecipientUnknown(recipient.to_string()));
    }
    let wrapped = keyring.wrap(&key, recipient)?;
    store.add_recipient(&rel, recipient, &wrapped)?;

    repo.stage(MANIFEST_FILE)?;

    println!("shared {rel} with {recipient}");
    Ok(())
}

/// Stop tracking a file and delete the plaintext working copy.
pub fn remove(repo: &GitRepo, path: &Path) -> SeekgitsResult<()> {
    let store = ConfigStore::new(repo.root());
    let rel = paths::repo_relative(repo.root(), path)?;

    store.remove_tracked_file(&rel)?;

    let attributes = Attributes::in_repo(repo.root());
    attributes.remove_filter(&rel)?;

    // Drop the cached index entry, then the working copy, so the next
    // add cannot silently re-commit plaintext.
    repo.remove_cached(&rel)?;
    let working = repo.root().join(&rel);
    if working.exists() {
        std::fs::remove_file(&working)?;
    }

    repo.stage(ATTRIBUTES_FILE)?;
    repo.stage(MANIFEST_FILE)?;

    println!("stopped tracking {rel}; working copy removed");
    Ok(())
}

/// Report recipients, working-copy presence, and access for tracked
/// paths.
pub fn status(repo: &GitRepo, keyring: &dyn Keyring, path: Option<&Path>) -> SeekgitsResult<()> {
    let store = ConfigStore::new(repo.root());
    let manifest = store.load()?;

    let targets: Vec<String> = match path {
        Some(p) => vec![paths::repo_relative(repo.root(), p)?],
        None => manifest.files.keys().cloned().collect(),
    };

    if targets.is_empty() {
        println!("no files are tracked");
        return Ok(());
    }

    for rel in targets {
        let tracked = manifest
            .files
            .get(&rel)
            .ok_or_else(|| SeekgitsError::NotTracked(rel.clone()))?;

        let recipients: Vec<&str> = tracked.keys.keys().map(String::as_str).collect();
        let present = repo.root().join(&rel).exists();
        let access = ConfigStore::unwrap_file_key(keyring, &rel, tracked).is_ok();

        println!(
            "{rel}: recipients=[{}] file={} access={}",
            recipients.join(", "),
            if present { "present" } else { "missing" },
            if access { "ok" } else { "unavailable" },
        );
    }
    Ok(())
}
