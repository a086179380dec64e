//! seekgits: transparent per-file encryption for git repositories
//!
//! User-facing commands:
//!   init                - register filters, create the manifest
//!   encrypt <path>      - start tracking a file
//!   share <path> <r>    - grant another recipient access
//!   remove <path>       - stop tracking a file
//!   status [path]       - show tracked files and access
//!
//! Git-facing entry points (installed by `init`, not typed by hand):
//!   filter encrypt <path> [file]  - clean filter
//!   filter decrypt <path> [file]  - smudge filter / diff textconv

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use seekgits_cli::{commands, filter};
use seekgits_core::paths;
use seekgits_git::GitRepo;
use seekgits_keyring::GpgKeyring;
use seekgits_store::ConfigStore;

#[derive(Parser, Debug)]
#[command(
    name = "seekgits",
    version,
    about = "Keep files plaintext in the working tree, encrypted in git history",
    long_about = "seekgits stores designated files encrypted in the repository while \
                  keeping them readable in the working tree. Encryption is deterministic, \
                  so unchanged files produce unchanged ciphertext; per-file keys are \
                  wrapped to recipients through the user's gpg keyring."
)]
struct Cli {
    /// Log level for diagnostics on stderr (trace, debug, info, warn, error)
    #[arg(long, env = "SEEKGITS_LOG", default_value = "warn", global = true)]
    log: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Register the seekgits filters in this repository and create the manifest
    Init,

    /// Start tracking a file: generate a key and wrap it to your identity
    Encrypt {
        /// File to track (relative to the current directory)
        path: PathBuf,
    },

    /// Wrap a tracked file's key to one more recipient
    Share {
        /// Tracked file
        path: PathBuf,
        /// Recipient identity (email, key id, or fingerprint)
        recipient: String,
    },

    /// Stop tracking a file and delete its plaintext working copy
    Remove {
        /// Tracked file
        path: PathBuf,
    },

    /// Show recipients, working-copy presence, and access per tracked file
    Status {
        /// Limit the report to one file
        path: Option<PathBuf>,
    },

    /// Filter entry points invoked by git (clean/smudge/textconv)
    #[command(subcommand)]
    Filter(FilterCommand),
}

#[derive(Subcommand, Debug)]
enum FilterCommand {
    /// Clean filter: encrypt repository-bound content
    Encrypt {
        /// Logical repository path of the file being filtered
        path: String,
        /// Read content from this file instead of stdin (textconv)
        file: Option<PathBuf>,
    },
    /// Smudge filter / textconv: decrypt checkout-bound content
    Decrypt {
        /// Logical repository path of the file being filtered
        path: String,
        /// Read content from this file instead of stdin (textconv)
        file: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log);

    match cli.command {
        Commands::Init => {
            let repo = GitRepo::discover()?;
            let binary =
                std::env::current_exe().context("resolving the seekgits binary path")?;
            commands::init(&repo, &GpgKeyring::from_env(), &binary)?;
        }
        Commands::Encrypt { path } => {
            let repo = GitRepo::discover()?;
            commands::encrypt(&repo, &GpgKeyring::from_env(), &path)?;
        }
        Commands::Share { path, recipient } => {
            let repo = GitRepo::discover()?;
            commands::share(&repo, &GpgKeyring::from_env(), &path, &recipient)?;
        }
        Commands::Remove { path } => {
            let repo = GitRepo::discover()?;
            commands::remove(&repo, &path)?;
        }
        Commands::Status { path } => {
            let repo = GitRepo::discover()?;
            commands::status(&repo, &GpgKeyring::from_env(), path.as_deref())?;
        }
        Commands::Filter(FilterCommand::Encrypt { path, file }) => {
            run_filter(FilterMode::Clean, &path, file.as_deref())?;
        }
        Commands::Filter(FilterCommand::Decrypt { path, file }) => {
            run_filter(FilterMode::Smudge, &path, file.as_deref())?;
        }
    }
    Ok(())
}

enum FilterMode {
    Clean,
    Smudge,
}

/// One filter invocation: content in, transformed content out.
///
/// Git runs filters from the repository toplevel with the logical path
/// in `%f`; textconv additionally hands a temp file to read instead of
/// stdin. Stdout carries nothing but the transformed bytes.
fn run_filter(mode: FilterMode, path: &str, file: Option<&Path>) -> Result<()> {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut output = stdout.lock();

    let mut input: Box<dyn std::io::Read> = match file {
        Some(file) => Box::new(
            std::fs::File::open(file)
                .with_context(|| format!("opening filter input {}", file.display()))?,
        ),
        None => Box::new(stdin.lock()),
    };

    // A filter must never eat content: without a repository to consult,
    // copy the stream through unchanged.
    let repo = match GitRepo::discover() {
        Ok(repo) => repo,
        Err(e) => {
            tracing::warn!(error = %e, "cannot locate repository; passing content through");
            std::io::copy(&mut input, &mut output)?;
            return Ok(());
        }
    };
    let store = ConfigStore::new(repo.root());
    let keyring = GpgKeyring::from_env();

    // %f is already root-relative; normalization only strips `./` noise.
    let path = paths::normalize(path).unwrap_or_else(|_| path.to_string());

    match mode {
        FilterMode::Clean => filter::clean(&store, &keyring, &path, &mut input, &mut output)?,
        FilterMode::Smudge => filter::smudge(&store, &keyring, &path, &mut input, &mut output)?,
    }
    Ok(())
}

fn init_logging(level: &str) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // Stdout belongs to the filter protocol; diagnostics go to stderr.
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).without_time())
        .init();
}
