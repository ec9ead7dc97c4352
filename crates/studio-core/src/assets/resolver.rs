//! SPA-aware static asset resolution.
//!
//! Every request path is classified into exactly one [`Resolution`]:
//!
//! 1. the root path always forwards to the fallback document;
//! 2. a path under an exclusion prefix is [`Resolution::Excluded`] so other
//!    handlers (the API) can answer it;
//! 3. an existing, readable file is [`Resolution::Found`];
//! 4. anything else is [`Resolution::Fallback`], the app shell that performs
//!    client-side routing.
//!
//! The resolver holds no mutable state and only reads from its store.

use std::sync::Arc;

use super::path::RequestPath;
use super::store::{Asset, FileStore};
use crate::error::{CoreError, CoreResult};

/// Prefixes excluded from static handling, in matching order.
pub const DEFAULT_EXCLUSION_PREFIXES: [&str; 3] = ["console/v1/", "api/v1/", "api/"];

/// Document served for the root path and for every miss.
pub const DEFAULT_FALLBACK_DOCUMENT: &str = "index.html";

/// Ordered set of path prefixes that opt a request out of static handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionPrefixes(Vec<String>);

impl ExclusionPrefixes {
    /// Builds the set, dropping leading slashes and empty entries.
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            prefixes
                .into_iter()
                .map(|p| p.as_ref().trim_start_matches('/').to_string())
                .filter(|p| !p.is_empty())
                .collect(),
        )
    }

    /// First prefix (in configured order) that `path` starts with.
    pub fn matching(&self, path: &RequestPath) -> Option<&str> {
        self.0
            .iter()
            .map(String::as_str)
            .find(|prefix| path.as_str().starts_with(prefix))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for ExclusionPrefixes {
    fn default() -> Self {
        Self::new(DEFAULT_EXCLUSION_PREFIXES)
    }
}

/// Outcome of resolving one request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Not a static asset; defer to other handlers.
    Excluded { prefix: String },
    /// Serve this resource as-is.
    Found(RequestPath),
    /// Serve the fallback document.
    Fallback(RequestPath),
}

/// Classifies request paths against a [`FileStore`].
pub struct StaticAssetResolver {
    store: Arc<dyn FileStore>,
    exclusions: ExclusionPrefixes,
    fallback: RequestPath,
}

impl StaticAssetResolver {
    /// Creates a resolver with the default fallback document.
    pub fn new(store: Arc<dyn FileStore>, exclusions: ExclusionPrefixes) -> Self {
        Self {
            store,
            exclusions,
            fallback: RequestPath(DEFAULT_FALLBACK_DOCUMENT.to_string()),
        }
    }

    /// Replaces the fallback document.
    ///
    /// # Errors
    ///
    /// [`CoreError::InvalidPath`] if `document` is not a valid file path.
    pub fn with_fallback_document(mut self, document: &str) -> CoreResult<Self> {
        let path = RequestPath::parse(document)?;
        if path.is_root() || path.is_dir_like() {
            return Err(CoreError::InvalidPath(document.to_string()));
        }
        self.fallback = path;
        Ok(self)
    }

    pub fn fallback_document(&self) -> &RequestPath {
        &self.fallback
    }

    pub fn exclusions(&self) -> &ExclusionPrefixes {
        &self.exclusions
    }

    /// Classifies `path`.
    ///
    /// # Errors
    ///
    /// [`CoreError::StoreUnavailable`] if the store cannot be queried. A
    /// missing file is never an error.
    pub async fn resolve(&self, path: &RequestPath) -> CoreResult<Resolution> {
        if path.is_root() {
            return Ok(Resolution::Fallback(self.fallback.clone()));
        }

        if let Some(prefix) = self.exclusions.matching(path) {
            return Ok(Resolution::Excluded {
                prefix: prefix.to_string(),
            });
        }

        // Exists but unreadable counts as a miss.
        if self.store.exists(path).await? && self.store.is_readable(path).await? {
            return Ok(Resolution::Found(path.clone()));
        }

        Ok(Resolution::Fallback(self.fallback.clone()))
    }

    /// Resolves `path` and reads the selected content.
    ///
    /// Returns `None` when the path is excluded.
    pub async fn load(&self, path: &RequestPath) -> CoreResult<Option<Asset>> {
        match self.resolve(path).await? {
            Resolution::Excluded { .. } => Ok(None),
            Resolution::Found(found) => self.store.open(&found).await.map(Some),
            Resolution::Fallback(_) => self.load_fallback().await.map(Some),
        }
    }

    /// Reads the fallback document.
    pub async fn load_fallback(&self) -> CoreResult<Asset> {
        let mut asset = self.store.open(&self.fallback).await.map_err(|e| match e {
            CoreError::NotFound(_) => CoreError::MissingFallback(self.fallback.to_string()),
            other => other,
        })?;
        asset.fallback = true;
        Ok(asset)
    }

    /// Checks that the fallback document exists and is readable.
    ///
    /// # Errors
    ///
    /// [`CoreError::MissingFallback`] if it does not, or the store fault.
    pub async fn ensure_fallback(&self) -> CoreResult<()> {
        if self.store.exists(&self.fallback).await? && self.store.is_readable(&self.fallback).await?
        {
            Ok(())
        } else {
            Err(CoreError::MissingFallback(self.fallback.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::store::{DiskStore, MemoryStore};
    use std::fs;
    use tempfile::TempDir;

    fn p(raw: &str) -> RequestPath {
        RequestPath::parse(raw).unwrap()
    }

    fn shell_store() -> MemoryStore {
        MemoryStore::new()
            .with_file("index.html", "<html>shell</html>")
            .with_file("static/app.js", "console.log('app')")
            .with_file("api/v1/items", "not served")
            .with_file("console/v1/users", "not served")
            .with_unreadable("private/report.pdf", "locked")
    }

    fn resolver(store: MemoryStore) -> StaticAssetResolver {
        StaticAssetResolver::new(Arc::new(store), ExclusionPrefixes::default())
    }

    #[test]
    fn default_prefixes_keep_order() {
        let defaults = ExclusionPrefixes::default();
        let prefixes: Vec<&str> = defaults.iter().collect();
        assert_eq!(prefixes, vec!["console/v1/", "api/v1/", "api/"]);
    }

    #[test]
    fn first_matching_prefix_wins() {
        let prefixes = ExclusionPrefixes::default();
        assert_eq!(prefixes.matching(&p("api/v1/items")), Some("api/v1/"));
        assert_eq!(prefixes.matching(&p("api/v2/items")), Some("api/"));
        assert_eq!(prefixes.matching(&p("console/v1/users")), Some("console/v1/"));
        assert_eq!(prefixes.matching(&p("console/v2/users")), None);
    }

    #[test]
    fn prefixes_drop_leading_slash_and_blanks() {
        let prefixes = ExclusionPrefixes::new(["/internal/", "", "api/"]);
        assert_eq!(prefixes.len(), 2);
        assert_eq!(prefixes.matching(&p("internal/x")), Some("internal/"));
    }

    #[tokio::test]
    async fn api_paths_are_excluded_even_when_file_exists() {
        let resolver = resolver(shell_store());

        assert_eq!(
            resolver.resolve(&p("api/v1/items")).await.unwrap(),
            Resolution::Excluded {
                prefix: "api/v1/".to_string()
            }
        );
        assert_eq!(
            resolver.resolve(&p("console/v1/users")).await.unwrap(),
            Resolution::Excluded {
                prefix: "console/v1/".to_string()
            }
        );
        assert!(matches!(
            resolver.resolve(&p("/api/")).await.unwrap(),
            Resolution::Excluded { .. }
        ));
    }

    #[tokio::test]
    async fn bare_api_segment_is_not_excluded() {
        let resolver = resolver(shell_store());
        assert_eq!(
            resolver.resolve(&p("api")).await.unwrap(),
            Resolution::Fallback(p("index.html"))
        );
    }

    #[tokio::test]
    async fn readable_file_is_found() {
        let resolver = resolver(shell_store());
        assert_eq!(
            resolver.resolve(&p("static/app.js")).await.unwrap(),
            Resolution::Found(p("static/app.js"))
        );
    }

    #[tokio::test]
    async fn unknown_route_falls_back() {
        let resolver = resolver(shell_store());
        assert_eq!(
            resolver.resolve(&p("dashboard/settings")).await.unwrap(),
            Resolution::Fallback(p("index.html"))
        );
    }

    #[tokio::test]
    async fn directory_falls_back() {
        let resolver = resolver(shell_store());
        assert_eq!(
            resolver.resolve(&p("static")).await.unwrap(),
            Resolution::Fallback(p("index.html"))
        );
    }

    #[tokio::test]
    async fn unreadable_file_falls_back() {
        let resolver = resolver(shell_store());
        assert_eq!(
            resolver.resolve(&p("private/report.pdf")).await.unwrap(),
            Resolution::Fallback(p("index.html"))
        );
    }

    #[tokio::test]
    async fn root_always_falls_back() {
        let resolver = resolver(shell_store().with_file("", "root file"));

        assert_eq!(
            resolver.resolve(&p("")).await.unwrap(),
            Resolution::Fallback(p("index.html"))
        );
        assert_eq!(
            resolver.resolve(&p("/")).await.unwrap(),
            Resolution::Fallback(p("index.html"))
        );
    }

    #[tokio::test]
    async fn root_skips_the_store() {
        let store = shell_store();
        store.set_offline(true);
        let resolver = resolver(store);

        assert!(resolver.resolve(&RequestPath::root()).await.is_ok());
    }

    #[tokio::test]
    async fn resolution_is_idempotent() {
        let resolver = resolver(shell_store());
        for raw in ["static/app.js", "dashboard", "api/v1/items", "/"] {
            let first = resolver.resolve(&p(raw)).await.unwrap();
            let second = resolver.resolve(&p(raw)).await.unwrap();
            assert_eq!(first, second);
        }
    }

    #[tokio::test]
    async fn store_fault_is_not_a_fallback() {
        let store = shell_store();
        store.set_offline(true);
        let resolver = resolver(store);

        let err = resolver.resolve(&p("dashboard")).await.unwrap_err();
        assert!(matches!(err, CoreError::StoreUnavailable { .. }));
    }

    #[tokio::test]
    async fn excluded_paths_never_touch_the_store() {
        let store = shell_store();
        store.set_offline(true);
        let resolver = resolver(store);

        assert!(matches!(
            resolver.resolve(&p("api/v1/items")).await.unwrap(),
            Resolution::Excluded { .. }
        ));
    }

    #[tokio::test]
    async fn load_returns_content_for_each_outcome() {
        let resolver = resolver(shell_store());

        let found = resolver.load(&p("static/app.js")).await.unwrap().unwrap();
        assert_eq!(found.bytes, b"console.log('app')");
        assert!(!found.fallback);

        let shell = resolver.load(&p("dashboard/settings")).await.unwrap().unwrap();
        assert_eq!(shell.bytes, b"<html>shell</html>");
        assert!(shell.fallback);
        assert_eq!(shell.path, p("index.html"));

        assert!(resolver.load(&p("api/v1/items")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn custom_fallback_document() {
        let store = MemoryStore::new().with_file("app/shell.html", "custom");
        let resolver = resolver(store)
            .with_fallback_document("/app/shell.html")
            .unwrap();

        assert_eq!(resolver.fallback_document(), &p("app/shell.html"));
        let asset = resolver.load(&p("anything")).await.unwrap().unwrap();
        assert_eq!(asset.bytes, b"custom");
    }

    #[test]
    fn fallback_document_must_be_a_file_path() {
        let make = || resolver(MemoryStore::new());
        assert!(make().with_fallback_document("/").is_err());
        assert!(make().with_fallback_document("dist/").is_err());
        assert!(make().with_fallback_document("../index.html").is_err());
    }

    #[tokio::test]
    async fn ensure_fallback_detects_missing_shell() {
        let missing = resolver(MemoryStore::new().with_file("static/app.js", "x"));
        assert!(matches!(
            missing.ensure_fallback().await.unwrap_err(),
            CoreError::MissingFallback(_)
        ));

        let present = resolver(shell_store());
        assert!(present.ensure_fallback().await.is_ok());
    }

    #[tokio::test]
    async fn missing_shell_on_load_is_reported() {
        let resolver = resolver(MemoryStore::new());
        assert!(matches!(
            resolver.load(&p("dashboard")).await.unwrap_err(),
            CoreError::MissingFallback(_)
        ));
    }

    #[tokio::test]
    async fn resolves_against_disk() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("index.html"), "<html></html>").unwrap();
        fs::create_dir_all(tmp.path().join("static")).unwrap();
        fs::write(tmp.path().join("static").join("app.js"), "js").unwrap();
        fs::create_dir_all(tmp.path().join("api").join("v1")).unwrap();
        fs::write(tmp.path().join("api").join("v1").join("items"), "[]").unwrap();

        let store = DiskStore::new(tmp.path()).unwrap();
        let resolver = StaticAssetResolver::new(Arc::new(store), ExclusionPrefixes::default());

        assert!(resolver.ensure_fallback().await.is_ok());
        assert_eq!(
            resolver.resolve(&p("static/app.js")).await.unwrap(),
            Resolution::Found(p("static/app.js"))
        );
        assert!(matches!(
            resolver.resolve(&p("api/v1/items")).await.unwrap(),
            Resolution::Excluded { .. }
        ));
        assert_eq!(
            resolver.resolve(&p("dashboard/settings")).await.unwrap(),
            Resolution::Fallback(p("index.html"))
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_resolutions_agree() {
        let resolver = Arc::new(resolver(shell_store()));
        let mut handles = Vec::new();
        for i in 0..32 {
            let resolver = resolver.clone();
            handles.push(tokio::spawn(async move {
                let raw = if i % 2 == 0 { "static/app.js" } else { "users/42" };
                resolver.resolve(&RequestPath::parse(raw).unwrap()).await.unwrap()
            }));
        }
        for (i, handle) in handles.into_iter().enumerate() {
            let resolution = handle.await.unwrap();
            if i % 2 == 0 {
                assert!(matches!(resolution, Resolution::Found(_)));
            } else {
                assert!(matches!(resolution, Resolution::Fallback(_)));
            }
        }
    }
}
