//! Studio core library: SPA asset resolution and the search client.
//!
//! `studio-core` holds the logic of the admin front that does not depend on
//! any web framework, so it can be unit tested without a server.
//!
//! # Modules
//!
//! - [`assets`] — request path normalization, file stores, and the
//!   [`StaticAssetResolver`] that picks between a file, the API, or the app shell.
//! - [`search`] — connection settings and a pooled [`SearchClient`].
//! - [`error`] — unified error type ([`CoreError`]) and result alias ([`CoreResult`]).

pub mod assets;
pub mod error;
pub mod search;

pub use assets::{
    Asset, DiskStore, ExclusionPrefixes, FileStore, MemoryStore, RequestPath, Resolution,
    StaticAssetResolver,
};
pub use error::{CoreError, CoreResult};
pub use search::{SearchClient, SearchError, SearchSettings};
