//! modcache - Local cache for remote debug-target modules
//!
//! Keeps shared libraries and executables fetched from a remote target on
//! local disk, so symbol and code analysis can run against a local copy
//! instead of re-fetching over a slow link on every session.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod filespec;
pub mod module;

pub use cache::{CacheOutcome, ModuleCache};
pub use error::{BoxError, CacheWarning, ModCacheError, ModCacheResult};
pub use module::{Module, ModuleSpec, ModuleUuid};
