//! Local cache for modules fetched from remote debug targets
//!
//! Each cached module is stored once in a UUID view and exposed through a
//! per-host sysroot view made of symlinks:
//!
//! ```text
//! <root>/<platform>/.cache/<uuid>-<disambiguator>/<filename>    module bytes
//! <root>/<platform>/.cache/<uuid>-<disambiguator>/<filename>.sym symbols (optional)
//! <root>/<platform>/<hostname>/<full target path>               symlink
//! ```
//!
//! # Lookup States
//!
//! | State | Description |
//! |-------|-------------|
//! | NotLoaded | Neither in memory nor in the UUID view |
//! | Loading | One caller is fetching; others for the same key wait |
//! | Loaded | Served from memory or the UUID view without a download |
//!
//! A failed fetch returns the key to NotLoaded; nothing records the failure.

pub mod download;
pub mod index;
pub mod inflight;
pub mod key;
pub mod layout;
pub mod manager;
pub mod store;

pub use download::{ContentDigestProbe, IdentityProbe, MirrorDownloader, ModuleDownloader, SymfileDownloader};
pub use index::ModuleIndex;
pub use key::CacheKey;
pub use manager::{CacheOutcome, ModuleCache};
pub use store::Placement;
