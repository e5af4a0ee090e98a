//! Application state shared across handlers.

use std::sync::Arc;

use crate::catalog::PostCatalog;
use crate::config::SiteConfig;
use crate::directory::DirectoryClient;
use crate::identity::IdentityClient;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configuration, the post catalog, and the external service clients. The
/// clients are `None` when the identity service is not configured; callers
/// branch on that absence rather than failing at startup.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SiteConfig,
    catalog: PostCatalog,
    identity: Option<IdentityClient>,
    directory: Option<DirectoryClient>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: SiteConfig, catalog: PostCatalog) -> Self {
        let identity = config.identity.as_ref().map(IdentityClient::new);
        let directory = config.identity.as_ref().map(DirectoryClient::new);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                identity,
                directory,
            }),
        }
    }

    /// Get a reference to the site configuration.
    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.inner.config
    }

    /// Get a reference to the post catalog.
    #[must_use]
    pub fn catalog(&self) -> &PostCatalog {
        &self.inner.catalog
    }

    /// Get the identity client, if the service is configured.
    #[must_use]
    pub fn identity(&self) -> Option<&IdentityClient> {
        self.inner.identity.as_ref()
    }

    /// Get the directory client, if the service is configured.
    #[must_use]
    pub fn directory(&self) -> Option<&DirectoryClient> {
        self.inner.directory.as_ref()
    }
}
