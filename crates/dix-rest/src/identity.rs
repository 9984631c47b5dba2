use async_trait::async_trait;
use serde::Deserialize;

use dix_core::{domain::ApplicationId, errors::Error, identity::IdentityResolver, Result};

/// Resolves the application id via `GET /oauth2/applications/@me`.
///
/// Intended to sit behind `ApplicationIdCache` so the lookup happens at most
/// once per client.
pub struct RestIdentityResolver {
    http: reqwest::Client,
    api_base: String,
    bot_token: String,
}

#[derive(Deserialize)]
struct ApplicationInfo {
    id: ApplicationId,
}

impl RestIdentityResolver {
    pub fn new(
        http: reqwest::Client,
        api_base: impl Into<String>,
        bot_token: impl Into<String>,
    ) -> Self {
        RestIdentityResolver {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            bot_token: bot_token.into(),
        }
    }

    fn url(&self) -> String {
        format!("{}/oauth2/applications/@me", self.api_base)
    }
}

#[async_trait]
impl IdentityResolver for RestIdentityResolver {
    async fn resolve_application_id(&self) -> Result<ApplicationId> {
        tracing::debug!("resolving application id");
        let response = self
            .http
            .get(self.url())
            .header("Authorization", format!("Bot {}", self.bot_token))
            .send()
            .await
            .map_err(|e| Error::Identity(format!("application lookup failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Identity(format!(
                "application lookup returned {status}"
            )));
        }

        let info: ApplicationInfo = response
            .json()
            .await
            .map_err(|e| Error::Identity(format!("application payload: {e}")))?;
        Ok(info.id)
    }
}
