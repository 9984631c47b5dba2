use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

use crate::domain::{ChannelId, GuildId, InteractionId, MessageId, RoleId, Snowflake, UserId};

/// Immutable snapshot of one inbound interaction, as delivered by the event
/// layer. Owned by a single responder for the interaction's lifetime.
///
/// The `token` is the capability scoping every webhook call tied to this
/// interaction; it is never reused across interactions.
#[derive(Clone, Debug, Deserialize)]
pub struct InteractionData {
    pub id: InteractionId,
    pub guild_id: GuildId,
    pub channel_id: ChannelId,
    pub token: String,
    #[serde(default)]
    pub member: Option<MemberData>,
    #[serde(default)]
    pub data: Option<CommandData>,
}

/// Guild member record embedded in the snapshot. Absent for interactions
/// invoked outside a guild (direct messages).
#[derive(Clone, Debug, Deserialize)]
pub struct MemberData {
    #[serde(default)]
    pub user: Option<UserData>,
    #[serde(default)]
    pub roles: Vec<RoleId>,
    /// Decimal-string-encoded 64-bit permission bitmask.
    #[serde(default)]
    pub permissions: Option<String>,
    #[serde(default)]
    pub nick: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct UserData {
    pub id: UserId,
    pub username: String,
}

/// Application command payload carried by a slash-command interaction.
#[derive(Clone, Debug, Deserialize)]
pub struct CommandData {
    pub id: Snowflake,
    pub name: String,
    #[serde(default)]
    pub options: Vec<CommandOption>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CommandOption {
    pub name: String,
    #[serde(default)]
    pub value: Option<serde_json::Value>,
    #[serde(default)]
    pub options: Vec<CommandOption>,
}

/// Callback type for the initial interaction response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseKind {
    Acknowledge,
    ChannelMessage,
    ChannelMessageWithSource,
    AcknowledgeWithSource,
}

impl ResponseKind {
    /// Numeric callback type on the wire.
    pub const fn value(self) -> u8 {
        match self {
            ResponseKind::Acknowledge => 2,
            ResponseKind::ChannelMessage => 3,
            ResponseKind::ChannelMessageWithSource => 4,
            ResponseKind::AcknowledgeWithSource => 5,
        }
    }
}

impl Serialize for ResponseKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.value())
    }
}

/// The one-shot payload answering the triggering event (Response Descriptor).
///
/// Built exactly once per interaction and delivered through the event-callback
/// channel, not as a separate HTTP request.
#[derive(Clone, Debug, Serialize)]
pub struct InteractionResponse {
    #[serde(rename = "type")]
    pub kind: ResponseKind,
    pub data: CallbackData,
}

/// Visible body of an initial response. Empty for acknowledgements.
#[derive(Clone, Debug, Default, Serialize)]
pub struct CallbackData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tts: Option<bool>,
}

impl CallbackData {
    pub fn content(text: impl Into<String>) -> Self {
        CallbackData {
            content: Some(text.into()),
            ..Default::default()
        }
    }
}

/// Body of a follow-up message create.
#[derive(Clone, Debug, Default, Serialize)]
pub struct FollowupRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tts: Option<bool>,
    /// Binary attachments, carried outside the JSON payload as multipart parts.
    #[serde(skip)]
    pub attachments: Vec<Attachment>,
}

impl FollowupRequest {
    pub fn content(text: impl Into<String>) -> Self {
        FollowupRequest {
            content: Some(text.into()),
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug)]
pub struct Attachment {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Body of a webhook message edit.
#[derive(Clone, Debug, Default, Serialize)]
pub struct MessageEditRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl MessageEditRequest {
    pub fn content(text: impl Into<String>) -> Self {
        MessageEditRequest {
            content: Some(text.into()),
        }
    }
}

/// Message representation returned by create/edit calls.
#[derive(Clone, Debug, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub channel_id: ChannelId,
    #[serde(default)]
    pub content: String,
}

/// Addressing for webhook message operations.
///
/// The initial response is always addressed by the `@original` sentinel,
/// follow-ups by their decimal message id. The two forms are never
/// interchangeable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageRef {
    Original,
    Id(MessageId),
}

impl fmt::Display for MessageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRef::Original => f.write_str("@original"),
            MessageRef::Id(id) => write!(f, "{id}"),
        }
    }
}
