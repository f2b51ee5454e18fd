use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::StatusCode;

use crate::text_manipulators::to_archive_path;

/// What an existence check against the mirror came back with.
#[derive(Debug, Clone)]
pub struct Probe {
    pub status: StatusCode,
    pub location: Option<String>,
}

/// The two things the crawl needs from the archive mirror. Paths are
/// relative to the mirror host.
#[async_trait]
pub trait ArchiveMirror: Send + Sync {
    async fn probe(&self, path: &str) -> anyhow::Result<Probe>;
    async fn fetch(&self, path: &str) -> anyhow::Result<String>;
}

/// Walks the mirror's redirect chain for a path and fetches whatever is at
/// the end of it. Every page the crawl reads goes through here.
pub struct RedirectResolver {
    mirror: Arc<dyn ArchiveMirror>,
    archive_base_url: String,
    max_redirects: usize,
}

impl RedirectResolver {
    pub fn new(
        mirror: Arc<dyn ArchiveMirror>,
        archive_base_url: impl Into<String>,
        max_redirects: usize,
    ) -> Self {
        Self {
            mirror,
            archive_base_url: archive_base_url.into(),
            max_redirects,
        }
    }

    pub fn archive_path(&self, href: &str) -> String {
        to_archive_path(&self.archive_base_url, href)
    }

    /// Returns the page content, or `None` when the page is missing or
    /// anything on the way fails.
    pub async fn resolve(&self, path: &str) -> Option<String> {
        let mut path = self.archive_path(path);
        let mut probe = self.probe(&path).await?;

        let mut hops = 0;
        while probe.status.is_redirection() {
            let Some(location) = probe.location.as_deref() else {
                warn!("skipping, {} without location: {}", probe.status, path);
                return None;
            };
            hops += 1;
            if hops > self.max_redirects {
                warn!("skipping, more than {} redirects: {}", self.max_redirects, path);
                return None;
            }
            path = self.archive_path(location);
            probe = self.probe(&path).await?;
        }

        if probe.status == StatusCode::NOT_FOUND {
            debug!("not archived: {}", path);
            return None;
        }
        if !probe.status.is_success() {
            warn!("skipping, {}: {}", probe.status, path);
            return None;
        }

        match self.mirror.fetch(&path).await {
            Ok(body) => Some(body),
            Err(e) => {
                warn!("skipping, fetch error {}: {:#}", path, e);
                None
            }
        }
    }

    async fn probe(&self, path: &str) -> Option<Probe> {
        match self.mirror.probe(path).await {
            Ok(probe) => Some(probe),
            Err(e) => {
                warn!("skipping, HEAD error {}: {:#}", path, e);
                None
            }
        }
    }
}
