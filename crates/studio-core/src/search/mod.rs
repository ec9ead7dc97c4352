//! Search engine client.
//!
//! [`SearchSettings`] carries the connection parameters; [`SearchClient`] is
//! built from them once at startup and shared by reference afterwards.

pub mod client;
pub mod settings;

pub use client::{
    ClusterHealth, ClusterInfo, HealthStatus, SearchClient, SearchEndpoint, SearchError,
    SearchHit, SearchResults, VersionInfo,
};
pub use settings::{ConnectionPoolSettings, SearchSettings};
