//! Static asset serving for the single-page application.
//!
//! - [`path`] — [`RequestPath`] normalization.
//! - [`store`] — the [`FileStore`] seam with disk and in-memory backends.
//! - [`resolver`] — [`StaticAssetResolver`], which decides between serving a
//!   file, deferring to the API, or serving the app shell.

pub mod path;
pub mod resolver;
pub mod store;

pub use path::RequestPath;
pub use resolver::{
    ExclusionPrefixes, Resolution, StaticAssetResolver, DEFAULT_EXCLUSION_PREFIXES,
    DEFAULT_FALLBACK_DOCUMENT,
};
pub use store::{Asset, DiskStore, FileStore, MemoryStore};
