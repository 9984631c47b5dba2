use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;

use crate::{domain::ApplicationId, errors::Error, Result};

/// Port for resolving the numeric application id required to address the
/// webhook endpoint.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve_application_id(&self) -> Result<ApplicationId>;
}

/// Single-flight memo over an [`IdentityResolver`].
///
/// The first caller triggers resolution; concurrent callers await the same
/// in-flight future. A successful result is cached for the cache's lifetime
/// and shared read-only by all responders of one client. A failed resolution
/// is not cached, so a later call may retry.
#[derive(Clone)]
pub struct ApplicationIdCache {
    inner: Arc<Inner>,
}

struct Inner {
    resolver: Option<Arc<dyn IdentityResolver>>,
    cell: OnceCell<ApplicationId>,
}

impl ApplicationIdCache {
    pub fn new(resolver: Arc<dyn IdentityResolver>) -> Self {
        ApplicationIdCache {
            inner: Arc::new(Inner {
                resolver: Some(resolver),
                cell: OnceCell::new(),
            }),
        }
    }

    /// Cache pre-filled with a known application id; never resolves.
    pub fn fixed(application_id: ApplicationId) -> Self {
        ApplicationIdCache {
            inner: Arc::new(Inner {
                resolver: None,
                cell: OnceCell::new_with(Some(application_id)),
            }),
        }
    }

    pub async fn get(&self) -> Result<ApplicationId> {
        let id = self
            .inner
            .cell
            .get_or_try_init(|| async {
                match &self.inner.resolver {
                    Some(resolver) => resolver.resolve_application_id().await,
                    None => Err(Error::Identity("no resolver configured".to_string())),
                }
            })
            .await?;
        Ok(*id)
    }
}
