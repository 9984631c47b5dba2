//! Discord REST adapter (reqwest).
//!
//! Implements the `dix-core` WebhookTransport port over the webhook HTTP API.
//! HTTP failures are mapped into `Error::Transport` and surfaced as-is; retry
//! and rate-limit policy is deliberately not implemented here.

use async_trait::async_trait;
use reqwest::multipart;

use dix_core::{
    domain::ApplicationId,
    errors::Error,
    interaction::{
        port::WebhookTransport,
        types::{FollowupRequest, Message, MessageEditRequest, MessageRef},
    },
    Result,
};

pub mod config;
pub mod identity;

pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";

const ERROR_BODY_MAX: usize = 300;

#[derive(Clone)]
pub struct RestWebhookTransport {
    http: reqwest::Client,
    api_base: String,
}

impl RestWebhookTransport {
    pub fn new(http: reqwest::Client, api_base: impl Into<String>) -> Self {
        let api_base = api_base.into().trim_end_matches('/').to_string();
        RestWebhookTransport { http, api_base }
    }

    fn webhook_url(&self, application_id: ApplicationId, token: &str) -> String {
        format!("{}/webhooks/{application_id}/{token}", self.api_base)
    }

    fn message_url(&self, application_id: ApplicationId, token: &str, message: MessageRef) -> String {
        format!("{}/messages/{message}", self.webhook_url(application_id, token))
    }

    fn map_err(e: reqwest::Error) -> Error {
        Error::Transport {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let mut message = response.text().await.unwrap_or_default();
        if message.len() > ERROR_BODY_MAX {
            let mut cut = ERROR_BODY_MAX;
            while !message.is_char_boundary(cut) {
                cut -= 1;
            }
            message.truncate(cut);
        }
        Err(Error::Transport {
            status: Some(status.as_u16()),
            message,
        })
    }

    /// `payload_json` part plus one `files[i]` part per attachment.
    fn multipart_form(request: &FollowupRequest) -> Result<multipart::Form> {
        let payload = serde_json::to_string(request)
            .map_err(|e| Error::Format(format!("followup payload: {e}")))?;
        let mut form = multipart::Form::new().text("payload_json", payload);
        for (idx, attachment) in request.attachments.iter().enumerate() {
            form = form.part(
                format!("files[{idx}]"),
                multipart::Part::bytes(attachment.bytes.clone())
                    .file_name(attachment.filename.clone()),
            );
        }
        Ok(form)
    }
}

#[async_trait]
impl WebhookTransport for RestWebhookTransport {
    async fn execute_webhook(
        &self,
        application_id: ApplicationId,
        token: &str,
        wait: bool,
        request: &FollowupRequest,
    ) -> Result<Option<Message>> {
        let url = self.webhook_url(application_id, token);
        tracing::debug!(%application_id, wait, "execute webhook");

        let builder = self.http.post(&url).query(&[("wait", wait)]);
        let builder = if request.attachments.is_empty() {
            builder.json(request)
        } else {
            builder.multipart(Self::multipart_form(request)?)
        };

        let response = Self::check(builder.send().await.map_err(Self::map_err)?).await?;
        if !wait {
            return Ok(None);
        }
        let message = response.json::<Message>().await.map_err(Self::map_err)?;
        Ok(Some(message))
    }

    async fn edit_message(
        &self,
        application_id: ApplicationId,
        token: &str,
        message: MessageRef,
        request: &MessageEditRequest,
    ) -> Result<Message> {
        let url = self.message_url(application_id, token, message);
        tracing::debug!(%application_id, target = %message, "edit webhook message");

        let response = self
            .http
            .patch(&url)
            .json(request)
            .send()
            .await
            .map_err(Self::map_err)?;
        let response = Self::check(response).await?;
        response.json().await.map_err(Self::map_err)
    }

    async fn delete_message(
        &self,
        application_id: ApplicationId,
        token: &str,
        message: MessageRef,
    ) -> Result<()> {
        let url = self.message_url(application_id, token, message);
        tracing::debug!(%application_id, target = %message, "delete webhook message");

        let response = self
            .http
            .delete(&url)
            .send()
            .await
            .map_err(Self::map_err)?;
        Self::check(response).await?;
        Ok(())
    }
}
