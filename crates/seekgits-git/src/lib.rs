//! seekgits-git: the host-VCS boundary
//!
//! Everything that touches git lives here: finding the repository
//! root, shelling out to `git` for config/staging, and maintaining the
//! per-path filter lines in `.gitattributes`.

pub mod attributes;
pub mod repo;

pub use attributes::Attributes;
pub use repo::GitRepo;

/// Name registered for both the filter and the diff driver.
pub const DRIVER_NAME: &str = "seekgits";
