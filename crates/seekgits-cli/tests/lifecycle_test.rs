//! Integration tests: lifecycle commands against a real git repository.
//!
//! These shell out to `git` the way the commands do in production; the
//! keyring stays in-memory. Tests are skipped when git is unavailable.

mod common;

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

use common::FakeKeyring;
use seekgits_cli::commands;
use seekgits_core::SeekgitsError;
use seekgits_git::{Attributes, GitRepo};
use seekgits_store::ConfigStore;

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// A fresh `git init` repo with one plaintext secret file and an
/// initialized manifest.
fn setup() -> (TempDir, GitRepo, ConfigStore) {
    let dir = TempDir::new().unwrap();
    let status = Command::new("git")
        .args(["init", "-q"])
        .current_dir(dir.path())
        .status()
        .expect("running git init");
    assert!(status.success());

    std::fs::create_dir_all(dir.path().join("secrets")).unwrap();
    std::fs::write(dir.path().join("secrets/.env"), b"SECRET=hello123\n").unwrap();

    let repo = GitRepo::at(dir.path());
    let store = ConfigStore::new(dir.path());
    store.init().unwrap();
    (dir, repo, store)
}

/// Manifest entries and attribute entries must always name the same
/// path set.
fn assert_manifest_attributes_in_sync(root: &Path) {
    let store = ConfigStore::new(root);
    let attrs = Attributes::in_repo(root);

    let mut manifest_paths: Vec<String> =
        store.load().unwrap().files.keys().cloned().collect();
    let mut attr_paths = attrs.list_filtered().unwrap();
    manifest_paths.sort();
    attr_paths.sort();
    assert_eq!(manifest_paths, attr_paths);
}

#[test]
fn encrypt_tracks_a_file() {
    if !git_available() {
        eprintln!("git not available; skipping");
        return;
    }
    let (dir, repo, store) = setup();
    let keyring = FakeKeyring::holding(&["alice@example.org"]);

    commands::encrypt(&repo, &keyring, &dir.path().join("secrets/.env")).unwrap();

    let manifest = store.load().unwrap();
    let tracked = manifest.files.get("secrets/.env").expect("tracked entry");
    assert!(tracked.keys.contains_key("alice@example.org"));

    let attrs = Attributes::in_repo(dir.path());
    assert!(attrs.has_filter("secrets/.env").unwrap());

    // The working copy stays plaintext.
    let content = std::fs::read(dir.path().join("secrets/.env")).unwrap();
    assert_eq!(content, b"SECRET=hello123\n");

    assert_manifest_attributes_in_sync(dir.path());
}

#[test]
fn encrypt_twice_fails() {
    if !git_available() {
        eprintln!("git not available; skipping");
        return;
    }
    let (dir, repo, _store) = setup();
    let keyring = FakeKeyring::holding(&["alice@example.org"]);
    let path = dir.path().join("secrets/.env");

    commands::encrypt(&repo, &keyring, &path).unwrap();
    let err = commands::encrypt(&repo, &keyring, &path).unwrap_err();
    assert!(matches!(err, SeekgitsError::AlreadyTracked(_)));
}

#[test]
fn encrypt_requires_an_identity() {
    if !git_available() {
        eprintln!("git not available; skipping");
        return;
    }
    let (dir, repo, _store) = setup();
    let keyring = FakeKeyring::holding(&[]);

    let err = commands::encrypt(&repo, &keyring, &dir.path().join("secrets/.env")).unwrap_err();
    assert!(matches!(err, SeekgitsError::NoIdentity));
}

#[test]
fn encrypt_requires_the_file_to_exist() {
    if !git_available() {
        eprintln!("git not available; skipping");
        return;
    }
    let (dir, repo, _store) = setup();
    let keyring = FakeKeyring::holding(&["alice@example.org"]);

    let err = commands::encrypt(&repo, &keyring, &dir.path().join("missing.txt")).unwrap_err();
    assert!(matches!(err, SeekgitsError::InvalidPath { .. }));
}

#[test]
fn share_adds_a_recipient() {
    if !git_available() {
        eprintln!("git not available; skipping");
        return;
    }
    let (dir, repo, store) = setup();
    let keyring = FakeKeyring::holding(&["alice@example.org"]);
    let path = dir.path().join("secrets/.env");

    commands::encrypt(&repo, &keyring, &path).unwrap();
    commands::share(&repo, &keyring, &path, "bob@example.org").unwrap();

    assert_eq!(
        store.list_recipients("secrets/.env").unwrap(),
        vec!["alice@example.org", "bob@example.org"]
    );
}

#[test]
fn share_rejects_duplicate_recipient() {
    if !git_available() {
        eprintln!("git not available; skipping");
        return;
    }
    let (dir, repo, _store) = setup();
    let keyring = FakeKeyring::holding(&["alice@example.org"]);
    let path = dir.path().join("secrets/.env");

    commands::encrypt(&repo, &keyring, &path).unwrap();
    let err = commands::share(&repo, &keyring, &path, "alice@example.org").unwrap_err();
    assert!(matches!(err, SeekgitsError::RecipientDuplicate { .. }));
}

#[test]
fn share_requires_current_access() {
    if !git_available() {
        eprintln!("git not available; skipping");
        return;
    }
    let (dir, repo, _store) = setup();
    let keyring = FakeKeyring::holding(&["alice@example.org"]);
    let path = dir.path().join("secrets/.env");

    commands::encrypt(&repo, &keyring, &path).unwrap();

    // A caller without alice's private material cannot grant access.
    let stranger = FakeKeyring::holding(&["mallory@example.org"]);
    let err = commands::share(&repo, &stranger, &path, "mallory@example.org").unwrap_err();
    assert!(matches!(err, SeekgitsError::NoAccess { .. }));
}

#[test]
fn remove_stops_tracking_and_deletes_working_copy() {
    if !git_available() {
        eprintln!("git not available; skipping");
        return;
    }
    let (dir, repo, store) = setup();
    let keyring = FakeKeyring::holding(&["alice@example.org"]);
    let path = dir.path().join("secrets/.env");

    commands::encrypt(&repo, &keyring, &path).unwrap();
    commands::remove(&repo, &path).unwrap();

    assert!(store.load().unwrap().files.is_empty());
    assert!(!path.exists(), "working copy must be deleted");

    let attrs = Attributes::in_repo(dir.path());
    assert!(!attrs.has_filter("secrets/.env").unwrap());
    assert_manifest_attributes_in_sync(dir.path());
}

#[test]
fn remove_untracked_fails() {
    if !git_available() {
        eprintln!("git not available; skipping");
        return;
    }
    let (dir, repo, _store) = setup();

    let err = commands::remove(&repo, &dir.path().join("secrets/.env")).unwrap_err();
    assert!(matches!(err, SeekgitsError::NotTracked(_)));
}

#[test]
fn status_reports_tracked_files() {
    if !git_available() {
        eprintln!("git not available; skipping");
        return;
    }
    let (dir, repo, _store) = setup();
    let keyring = FakeKeyring::holding(&["alice@example.org"]);
    let path = dir.path().join("secrets/.env");

    commands::encrypt(&repo, &keyring, &path).unwrap();
    commands::status(&repo, &keyring, None).unwrap();
    commands::status(&repo, &keyring, Some(path.as_path())).unwrap();

    let err = commands::status(&repo, &keyring, Some(&dir.path().join("nope.txt"))).unwrap_err();
    assert!(matches!(err, SeekgitsError::NotTracked(_)));
}
