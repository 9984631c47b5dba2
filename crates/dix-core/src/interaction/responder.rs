use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::{
    domain::{ChannelId, GuildId, InteractionId, MessageId},
    errors::Error,
    identity::ApplicationIdCache,
    interaction::{
        member::InteractionMember,
        port::WebhookTransport,
        types::{
            CallbackData, CommandData, FollowupRequest, InteractionData, InteractionResponse,
            Message, MessageEditRequest, MessageRef, ResponseKind,
        },
    },
    Result,
};

/// Response lifecycle controller for a single interaction.
///
/// Enforces the one-shot initial response: exactly one of
/// [`acknowledge`](Self::acknowledge) / [`reply`](Self::reply) may succeed per
/// responder, and every webhook operation (edit/delete/follow-up) requires
/// that choice to have been made first. Webhook operations resolve the
/// application id and then issue exactly one transport call, composed as a
/// single future.
pub struct InteractionResponder {
    transport: Arc<dyn WebhookTransport>,
    application_id: ApplicationIdCache,
    data: InteractionData,
    responded: AtomicBool,
}

impl InteractionResponder {
    pub fn new(
        transport: Arc<dyn WebhookTransport>,
        application_id: ApplicationIdCache,
        data: InteractionData,
    ) -> Self {
        InteractionResponder {
            transport,
            application_id,
            data,
            responded: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> InteractionId {
        self.data.id
    }

    pub fn guild_id(&self) -> GuildId {
        self.data.guild_id
    }

    pub fn channel_id(&self) -> ChannelId {
        self.data.channel_id
    }

    pub fn token(&self) -> &str {
        &self.data.token
    }

    pub fn data(&self) -> &InteractionData {
        &self.data
    }

    pub fn command(&self) -> Result<&CommandData> {
        self.data
            .data
            .as_ref()
            .ok_or(Error::MissingData("interaction carries no command payload"))
    }

    pub fn member(&self) -> InteractionMember<'_> {
        InteractionMember::new(&self.data)
    }

    /// Winner of the compare-exchange owns the initial response slot.
    fn claim_first_response(&self, op: &str) -> Result<()> {
        if self
            .responded
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(Error::Protocol(format!(
                "{op}: an initial response was already chosen for this interaction"
            )));
        }
        Ok(())
    }

    fn require_responded(&self, op: &str) -> Result<()> {
        if !self.responded.load(Ordering::Acquire) {
            return Err(Error::Protocol(format!(
                "{op}: no initial response (acknowledge or reply) has been chosen yet"
            )));
        }
        Ok(())
    }

    /// Acknowledge without a visible message or "processing" indicator.
    pub fn acknowledge(&self) -> Result<FollowupHandle<'_>> {
        self.acknowledge_with_source(false)
    }

    /// Acknowledge; `with_source` selects whether the platform shows a
    /// "processing" indicator next to the triggering command.
    pub fn acknowledge_with_source(&self, with_source: bool) -> Result<FollowupHandle<'_>> {
        self.claim_first_response("acknowledge")?;
        let kind = if with_source {
            ResponseKind::AcknowledgeWithSource
        } else {
            ResponseKind::Acknowledge
        };
        Ok(FollowupHandle::new(
            self,
            InteractionResponse {
                kind,
                data: CallbackData::default(),
            },
        ))
    }

    /// Build the visible initial message.
    ///
    /// No network call happens here: the descriptor rides back on the
    /// returned handle and is flushed by the protocol layer that answers the
    /// triggering event.
    pub fn reply(&self, content: impl Into<String>, with_source: bool) -> Result<FollowupHandle<'_>> {
        self.reply_with(CallbackData::content(content), with_source)
    }

    pub fn reply_with(&self, data: CallbackData, with_source: bool) -> Result<FollowupHandle<'_>> {
        self.claim_first_response("reply")?;
        let kind = if with_source {
            ResponseKind::ChannelMessageWithSource
        } else {
            ResponseKind::ChannelMessage
        };
        Ok(FollowupHandle::new(self, InteractionResponse { kind, data }))
    }

    /// Edit the initial response, whichever kind it was. Always addresses the
    /// `@original` sentinel.
    pub async fn edit_initial_response(&self, request: &MessageEditRequest) -> Result<Message> {
        self.require_responded("edit_initial_response")?;
        let application_id = self.application_id.get().await?;
        self.transport
            .edit_message(application_id, &self.data.token, MessageRef::Original, request)
            .await
    }

    pub async fn delete_initial_response(&self) -> Result<()> {
        self.require_responded("delete_initial_response")?;
        let application_id = self.application_id.get().await?;
        self.transport
            .delete_message(application_id, &self.data.token, MessageRef::Original)
            .await
    }

    /// Create a follow-up with a minimal body, waiting for the created
    /// message.
    pub async fn create_followup(&self, content: impl Into<String>) -> Result<Message> {
        let request = FollowupRequest::content(content);
        let message = self.create_followup_with(&request, true).await?;
        message.ok_or(Error::Transport {
            status: None,
            message: "webhook returned no message despite wait=true".to_string(),
        })
    }

    /// General follow-up create; `wait = false` is fire-and-forget.
    pub async fn create_followup_with(
        &self,
        request: &FollowupRequest,
        wait: bool,
    ) -> Result<Option<Message>> {
        self.require_responded("create_followup")?;
        let application_id = self.application_id.get().await?;
        self.transport
            .execute_webhook(application_id, &self.data.token, wait, request)
            .await
    }

    /// Edit a previously created follow-up, addressed by its decimal id.
    pub async fn edit_followup(
        &self,
        message_id: MessageId,
        request: &MessageEditRequest,
    ) -> Result<Message> {
        self.require_responded("edit_followup")?;
        let application_id = self.application_id.get().await?;
        self.transport
            .edit_message(
                application_id,
                &self.data.token,
                MessageRef::Id(message_id),
                request,
            )
            .await
    }
}

type DeliveryHook = Box<
    dyn FnOnce(&InteractionResponse) -> Pin<Box<dyn Future<Output = Result<()>> + Send>> + Send,
>;

/// Capability handed back once the initial response has been chosen.
///
/// Carries the still-unsent Response Descriptor to the protocol layer that
/// answers the triggering event, and narrows the surface to the operations
/// legal after that choice. At most one handle exists per interaction since
/// only the winning first-response call mints it.
pub struct FollowupHandle<'a> {
    responder: &'a InteractionResponder,
    response: InteractionResponse,
    on_delivered: Option<DeliveryHook>,
}

impl<'a> FollowupHandle<'a> {
    fn new(responder: &'a InteractionResponder, response: InteractionResponse) -> Self {
        FollowupHandle {
            responder,
            response,
            on_delivered: None,
        }
    }

    pub fn response(&self) -> &InteractionResponse {
        &self.response
    }

    pub fn into_response(self) -> InteractionResponse {
        self.response
    }

    /// Register a hook run after the protocol layer has flushed the
    /// descriptor. Defaults to a no-op.
    pub fn on_delivered<F, Fut>(mut self, hook: F) -> Self
    where
        F: FnOnce(&InteractionResponse) -> Fut + Send + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.on_delivered = Some(Box::new(move |response| {
            Box::pin(hook(response)) as Pin<Box<dyn Future<Output = Result<()>> + Send>>
        }));
        self
    }

    /// Signal that the descriptor has been delivered; runs the registered
    /// hook once, if any.
    pub async fn delivered(&mut self) -> Result<()> {
        match self.on_delivered.take() {
            Some(hook) => hook(&self.response).await,
            None => Ok(()),
        }
    }

    pub async fn edit_initial_response(&self, request: &MessageEditRequest) -> Result<Message> {
        self.responder.edit_initial_response(request).await
    }

    pub async fn delete_initial_response(&self) -> Result<()> {
        self.responder.delete_initial_response().await
    }

    pub async fn create_followup(&self, content: impl Into<String>) -> Result<Message> {
        self.responder.create_followup(content).await
    }

    pub async fn create_followup_with(
        &self,
        request: &FollowupRequest,
        wait: bool,
    ) -> Result<Option<Message>> {
        self.responder.create_followup_with(request, wait).await
    }

    pub async fn edit_followup(
        &self,
        message_id: MessageId,
        request: &MessageEditRequest,
    ) -> Result<Message> {
        self.responder.edit_followup(message_id, request).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicU32;

    use crate::domain::Snowflake;

    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use crate::identity::IdentityResolver;

    use super::*;

    #[derive(Debug, PartialEq, Eq)]
    enum Call {
        Execute { wait: bool, content: Option<String> },
        Edit { target: String },
        Delete { target: String },
    }

    #[derive(Default)]
    struct RecordingTransport {
        calls: Mutex<Vec<Call>>,
    }

    impl RecordingTransport {
        async fn calls(&self) -> Vec<Call> {
            std::mem::take(&mut *self.calls.lock().await)
        }
    }

    #[async_trait]
    impl WebhookTransport for RecordingTransport {
        async fn execute_webhook(
            &self,
            _application_id: Snowflake,
            _token: &str,
            wait: bool,
            request: &FollowupRequest,
        ) -> Result<Option<Message>> {
            self.calls.lock().await.push(Call::Execute {
                wait,
                content: request.content.clone(),
            });
            Ok(wait.then(|| Message {
                id: Snowflake(500),
                channel_id: Snowflake(3),
                content: request.content.clone().unwrap_or_default(),
            }))
        }

        async fn edit_message(
            &self,
            _application_id: Snowflake,
            _token: &str,
            message: MessageRef,
            request: &MessageEditRequest,
        ) -> Result<Message> {
            self.calls.lock().await.push(Call::Edit {
                target: message.to_string(),
            });
            Ok(Message {
                id: Snowflake(500),
                channel_id: Snowflake(3),
                content: request.content.clone().unwrap_or_default(),
            })
        }

        async fn delete_message(
            &self,
            _application_id: Snowflake,
            _token: &str,
            message: MessageRef,
        ) -> Result<()> {
            self.calls.lock().await.push(Call::Delete {
                target: message.to_string(),
            });
            Ok(())
        }
    }

    struct FailingResolver;

    #[async_trait]
    impl IdentityResolver for FailingResolver {
        async fn resolve_application_id(&self) -> Result<Snowflake> {
            Err(Error::Identity("resolver down".to_string()))
        }
    }

    fn snapshot() -> InteractionData {
        serde_json::from_value(serde_json::json!({
            "id": "1",
            "guild_id": "2",
            "channel_id": "3",
            "token": "tok",
            "member": {
                "user": {"id": "4", "username": "someone"},
                "roles": ["5"],
                "permissions": "8"
            },
            "data": {"id": "6", "name": "ping"}
        }))
        .unwrap()
    }

    fn responder(transport: Arc<RecordingTransport>) -> InteractionResponder {
        InteractionResponder::new(
            transport,
            ApplicationIdCache::fixed(Snowflake(42)),
            snapshot(),
        )
    }

    #[test]
    fn only_one_initial_response_is_accepted() {
        let responder = responder(Arc::new(RecordingTransport::default()));
        responder.acknowledge().unwrap();
        assert!(matches!(responder.reply("hi", true), Err(Error::Protocol(_))));
        assert!(matches!(
            responder.acknowledge_with_source(true),
            Err(Error::Protocol(_))
        ));
    }

    #[test]
    fn reply_builds_channel_message_descriptors() {
        let responder = responder(Arc::new(RecordingTransport::default()));
        let handle = responder.reply("hi", true).unwrap();
        assert_eq!(handle.response().kind, ResponseKind::ChannelMessageWithSource);
        assert_eq!(handle.response().data.content.as_deref(), Some("hi"));

        let responder = self::responder(Arc::new(RecordingTransport::default()));
        let response = responder.reply("hi", false).unwrap().into_response();
        assert_eq!(response.kind, ResponseKind::ChannelMessage);
        assert_eq!(response.data.content.as_deref(), Some("hi"));
    }

    #[test]
    fn acknowledge_builds_empty_descriptors() {
        let responder = responder(Arc::new(RecordingTransport::default()));
        let handle = responder.acknowledge_with_source(false).unwrap();
        assert_eq!(handle.response().kind, ResponseKind::Acknowledge);
        assert!(handle.response().data.content.is_none());

        let responder = self::responder(Arc::new(RecordingTransport::default()));
        let handle = responder.acknowledge_with_source(true).unwrap();
        assert_eq!(handle.response().kind, ResponseKind::AcknowledgeWithSource);
        assert!(handle.response().data.content.is_none());
    }

    #[tokio::test]
    async fn initial_response_ops_address_the_original_sentinel() {
        let transport = Arc::new(RecordingTransport::default());
        let responder = responder(transport.clone());
        let handle = responder.acknowledge().unwrap();

        handle.create_followup("one").await.unwrap();
        handle
            .edit_initial_response(&MessageEditRequest::content("edited"))
            .await
            .unwrap();
        handle.delete_initial_response().await.unwrap();

        let calls = transport.calls().await;
        assert_eq!(
            calls,
            vec![
                Call::Execute {
                    wait: true,
                    content: Some("one".to_string())
                },
                Call::Edit {
                    target: "@original".to_string()
                },
                Call::Delete {
                    target: "@original".to_string()
                },
            ]
        );
    }

    #[tokio::test]
    async fn followup_edit_addresses_the_decimal_message_id() {
        let transport = Arc::new(RecordingTransport::default());
        let responder = responder(transport.clone());
        let handle = responder.acknowledge().unwrap();

        handle
            .edit_followup(Snowflake(123), &MessageEditRequest::content("x"))
            .await
            .unwrap();

        let calls = transport.calls().await;
        assert_eq!(
            calls,
            vec![Call::Edit {
                target: "123".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn webhook_ops_are_rejected_before_an_initial_response() {
        let transport = Arc::new(RecordingTransport::default());
        let responder = responder(transport.clone());

        assert!(matches!(
            responder.create_followup("nope").await,
            Err(Error::Protocol(_))
        ));
        assert!(matches!(
            responder
                .edit_initial_response(&MessageEditRequest::content("nope"))
                .await,
            Err(Error::Protocol(_))
        ));
        assert!(matches!(
            responder.delete_initial_response().await,
            Err(Error::Protocol(_))
        ));
        assert!(transport.calls().await.is_empty());
    }

    #[tokio::test]
    async fn identity_failure_surfaces_before_any_transport_call() {
        let transport = Arc::new(RecordingTransport::default());
        let responder = InteractionResponder::new(
            transport.clone(),
            ApplicationIdCache::new(Arc::new(FailingResolver)),
            snapshot(),
        );
        let handle = responder.acknowledge().unwrap();

        assert!(matches!(
            handle.create_followup("hi").await,
            Err(Error::Identity(_))
        ));
        assert!(transport.calls().await.is_empty());
    }

    #[tokio::test]
    async fn fire_and_forget_followup_yields_no_message() {
        let transport = Arc::new(RecordingTransport::default());
        let responder = responder(transport.clone());
        let handle = responder.acknowledge().unwrap();

        let request = FollowupRequest::content("quiet");
        assert!(handle.create_followup_with(&request, false).await.unwrap().is_none());
        assert_eq!(
            transport.calls().await,
            vec![Call::Execute {
                wait: false,
                content: Some("quiet".to_string())
            }]
        );
    }

    #[tokio::test]
    async fn delivery_hook_runs_once_and_defaults_to_noop() {
        let responder = responder(Arc::new(RecordingTransport::default()));
        let fired = Arc::new(AtomicU32::new(0));
        let fired_in_hook = fired.clone();

        let mut handle = responder.reply("hi", true).unwrap().on_delivered(move |response| {
            let fired = fired_in_hook.clone();
            let kind = response.kind;
            async move {
                assert_eq!(kind, ResponseKind::ChannelMessageWithSource);
                fired.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });

        handle.delivered().await.unwrap();
        handle.delivered().await.unwrap();
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        let responder = self::responder(Arc::new(RecordingTransport::default()));
        let mut plain = responder.acknowledge().unwrap();
        plain.delivered().await.unwrap();
    }

    #[test]
    fn snapshot_accessors_project_the_underlying_data() {
        let responder = responder(Arc::new(RecordingTransport::default()));
        assert_eq!(responder.id(), Snowflake(1));
        assert_eq!(responder.guild_id(), Snowflake(2));
        assert_eq!(responder.channel_id(), Snowflake(3));
        assert_eq!(responder.token(), "tok");
        assert_eq!(responder.command().unwrap().name, "ping");
        assert_eq!(responder.member().user_id().unwrap(), Snowflake(4));
    }

    #[test]
    fn missing_command_payload_surfaces_missing_data() {
        let data: InteractionData = serde_json::from_value(serde_json::json!({
            "id": "1",
            "guild_id": "2",
            "channel_id": "3",
            "token": "tok"
        }))
        .unwrap();
        let responder = InteractionResponder::new(
            Arc::new(RecordingTransport::default()),
            ApplicationIdCache::fixed(Snowflake(42)),
            data,
        );
        assert!(matches!(responder.command(), Err(Error::MissingData(_))));
    }
}
