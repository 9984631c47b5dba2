use std::{env, time::Duration};

use dix_core::{errors::Error, Result};

use crate::{identity::RestIdentityResolver, RestWebhookTransport, DEFAULT_API_BASE};

/// Typed configuration for the REST adapter.
#[derive(Clone, Debug)]
pub struct RestConfig {
    pub bot_token: String,
    pub api_base: String,
    pub http_timeout: Duration,
}

impl RestConfig {
    pub fn load() -> Result<Self> {
        let bot_token = env_str("DISCORD_BOT_TOKEN").unwrap_or_default();
        if bot_token.trim().is_empty() {
            return Err(Error::Config(
                "DISCORD_BOT_TOKEN environment variable is required".to_string(),
            ));
        }

        let api_base = env_str("DISCORD_API_BASE")
            .and_then(non_empty)
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let http_timeout =
            Duration::from_millis(env_u64("DISCORD_HTTP_TIMEOUT_MS").unwrap_or(10_000));

        Ok(RestConfig {
            bot_token,
            api_base,
            http_timeout,
        })
    }

    pub fn client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.http_timeout)
            .build()
            .map_err(|e| Error::Config(format!("http client: {e}")))
    }

    pub fn transport(&self) -> Result<RestWebhookTransport> {
        Ok(RestWebhookTransport::new(self.client()?, &self.api_base))
    }

    pub fn identity_resolver(&self) -> Result<RestIdentityResolver> {
        Ok(RestIdentityResolver::new(
            self.client()?,
            &self.api_base,
            &self.bot_token,
        ))
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn env_u64(key: &str) -> Option<u64> {
    env_str(key).and_then(|s| s.trim().parse::<u64>().ok())
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
