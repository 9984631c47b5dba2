use async_trait::async_trait;

use crate::{
    domain::ApplicationId,
    interaction::types::{FollowupRequest, Message, MessageEditRequest, MessageRef},
    Result,
};

/// Port for the webhook HTTP surface scoped by `(application_id, token)`.
///
/// Implementations own HTTP execution and map their failures into
/// `Error::Transport`; retry and rate-limit policy live behind this trait,
/// never in the lifecycle layer.
#[async_trait]
pub trait WebhookTransport: Send + Sync {
    /// Create a follow-up message. With `wait = false` the call is
    /// fire-and-forget and yields `None`; with `wait = true` it blocks for
    /// the created message.
    async fn execute_webhook(
        &self,
        application_id: ApplicationId,
        token: &str,
        wait: bool,
        request: &FollowupRequest,
    ) -> Result<Option<Message>>;

    /// Edit a previously sent message (`@original` or a follow-up id).
    async fn edit_message(
        &self,
        application_id: ApplicationId,
        token: &str,
        message: MessageRef,
        request: &MessageEditRequest,
    ) -> Result<Message>;

    /// Delete a previously sent message.
    async fn delete_message(
        &self,
        application_id: ApplicationId,
        token: &str,
        message: MessageRef,
    ) -> Result<()>;
}
