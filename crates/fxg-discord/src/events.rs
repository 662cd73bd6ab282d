//! Discord Gateway payloads, opcodes and dispatch events.
//!
//! These types model the subset of the Gateway v10 protocol the relay
//! needs: session setup, heartbeats, `READY`, and `INTERACTION_CREATE`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{GuildMember, User};

// ── Gateway opcodes ─────────────────────────────────────────────────────

/// Opcode 0: Dispatch -- an event was dispatched.
pub const OP_DISPATCH: u8 = 0;

/// Opcode 1: Heartbeat -- keep the connection alive.
pub const OP_HEARTBEAT: u8 = 1;

/// Opcode 2: Identify -- start a new session.
pub const OP_IDENTIFY: u8 = 2;

/// Opcode 6: Resume -- resume a previous session.
pub const OP_RESUME: u8 = 6;

/// Opcode 7: Reconnect -- server is going away, client should reconnect.
pub const OP_RECONNECT: u8 = 7;

/// Opcode 9: Invalid Session -- the session has been invalidated.
pub const OP_INVALID_SESSION: u8 = 9;

/// Opcode 10: Hello -- sent on connection, contains heartbeat_interval.
pub const OP_HELLO: u8 = 10;

/// Opcode 11: Heartbeat ACK.
pub const OP_HEARTBEAT_ACK: u8 = 11;

// ── Interaction constants ───────────────────────────────────────────────

/// Interaction type: a button or select menu was used.
pub const INTERACTION_MESSAGE_COMPONENT: u8 = 3;

/// Interaction callback: acknowledge now, edit the reply later.
pub const CALLBACK_DEFERRED_CHANNEL_MESSAGE: u8 = 5;

// ── Payload types ───────────────────────────────────────────────────────

/// The Gateway envelope, used in both directions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayPayload {
    /// The opcode for this payload.
    pub op: u8,

    /// Event data. `null` for heartbeat ACKs.
    pub d: Option<Value>,

    /// Sequence number, only on dispatches.
    pub s: Option<u64>,

    /// Event name (e.g. `"READY"`), only on dispatches.
    pub t: Option<String>,
}

impl GatewayPayload {
    /// A heartbeat carrying the last seen sequence number (or `null`).
    pub fn heartbeat(seq: u64) -> Self {
        Self {
            op: OP_HEARTBEAT,
            d: (seq > 0).then(|| serde_json::json!(seq)),
            s: None,
            t: None,
        }
    }
}

/// The `d` field of an opcode 10 (Hello) payload.
#[derive(Debug, Clone, Deserialize)]
pub struct HelloData {
    /// Interval (in milliseconds) between heartbeats.
    pub heartbeat_interval: u64,
}

/// The `d` field of an opcode 2 (Identify) payload.
#[derive(Debug, Clone, Serialize)]
pub struct IdentifyPayload {
    pub token: String,
    pub intents: u32,
    pub properties: ConnectionProperties,
}

/// Connection properties sent in the Identify payload.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionProperties {
    pub os: String,
    pub browser: String,
    pub device: String,
}

/// The `d` field of an opcode 6 (Resume) payload.
#[derive(Debug, Clone, Serialize)]
pub struct ResumePayload {
    pub token: String,
    pub session_id: String,
    pub seq: u64,
}

/// The `d` field of a `READY` dispatch.
#[derive(Debug, Clone, Deserialize)]
pub struct ReadyEvent {
    /// Gateway version.
    pub v: u32,

    /// The bot user.
    pub user: User,

    /// Session ID for resuming.
    pub session_id: String,

    /// Gateway URL to use when resuming.
    pub resume_gateway_url: Option<String>,
}

/// The `d` field of an `INTERACTION_CREATE` dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    /// Interaction id, used for the callback.
    pub id: String,

    /// Application that owns the interaction, used for follow-ups.
    pub application_id: String,

    /// Interaction type.
    #[serde(rename = "type")]
    pub kind: u8,

    /// Continuation token for responding.
    pub token: String,

    /// Guild the interaction came from; absent in DMs.
    #[serde(default)]
    pub guild_id: Option<String>,

    /// Channel the interaction came from.
    #[serde(default)]
    pub channel_id: Option<String>,

    /// Invoking member, when sent from a guild.
    #[serde(default)]
    pub member: Option<GuildMember>,

    /// Invoking user, when sent from a DM.
    #[serde(default)]
    pub user: Option<User>,

    /// Component data.
    #[serde(default)]
    pub data: Option<InteractionData>,
}

/// Component data attached to an interaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionData {
    /// Developer-defined id of the clicked component.
    #[serde(default)]
    pub custom_id: Option<String>,

    /// Type of the clicked component.
    #[serde(default)]
    pub component_type: Option<u8>,
}

impl Interaction {
    /// The user who triggered the interaction, from `member.user` in guilds
    /// or `user` in DMs.
    pub fn user(&self) -> Option<&User> {
        self.member
            .as_ref()
            .and_then(|m| m.user.as_ref())
            .or(self.user.as_ref())
    }

    /// Custom id of the clicked component.
    pub fn custom_id(&self) -> Option<&str> {
        self.data.as_ref().and_then(|d| d.custom_id.as_deref())
    }

    /// Whether this is a button or select-menu interaction.
    pub fn is_component(&self) -> bool {
        self.kind == INTERACTION_MESSAGE_COMPONENT
    }
}

/// Rate limit information parsed from REST response headers.
#[derive(Debug, Clone)]
pub struct RateLimitInfo {
    /// Requests left in the current window.
    pub remaining: Option<u32>,

    /// Seconds until the window resets.
    pub reset_after: Option<f64>,

    /// Rate limit bucket identifier.
    pub bucket: Option<String>,
}

impl RateLimitInfo {
    /// Parse rate limit information from HTTP response headers.
    pub fn from_headers(headers: &reqwest::header::HeaderMap) -> Self {
        let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
        Self {
            remaining: header("x-ratelimit-remaining").and_then(|v| v.parse().ok()),
            reset_after: header("x-ratelimit-reset-after").and_then(|v| v.parse().ok()),
            bucket: header("x-ratelimit-bucket").map(String::from),
        }
    }

    /// `true` when the bucket is exhausted.
    pub fn is_limited(&self) -> bool {
        self.remaining == Some(0)
    }

    /// Milliseconds to wait before the bucket refills.
    pub fn retry_after_ms(&self) -> Option<u64> {
        self.reset_after.map(|s| (s * 1000.0) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_hello() {
        let json = r#"{"op": 10, "d": {"heartbeat_interval": 41250}, "s": null, "t": null}"#;
        let payload: GatewayPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.op, OP_HELLO);
        let hello: HelloData = serde_json::from_value(payload.d.unwrap()).unwrap();
        assert_eq!(hello.heartbeat_interval, 41250);
    }

    #[test]
    fn heartbeat_sequence() {
        let json = serde_json::to_value(GatewayPayload::heartbeat(42)).unwrap();
        assert_eq!(json["op"], 1);
        assert_eq!(json["d"], 42);

        let json = serde_json::to_value(GatewayPayload::heartbeat(0)).unwrap();
        assert!(json["d"].is_null());
    }

    #[test]
    fn serialize_identify() {
        let identify = IdentifyPayload {
            token: "my-token".into(),
            intents: 1,
            properties: ConnectionProperties {
                os: "linux".into(),
                browser: "fxg-relay".into(),
                device: "fxg-relay".into(),
            },
        };
        let json = serde_json::to_value(&identify).unwrap();
        assert_eq!(json["token"], "my-token");
        assert_eq!(json["intents"], 1);
        assert_eq!(json["properties"]["browser"], "fxg-relay");
    }

    #[test]
    fn deserialize_ready_event() {
        let json = r#"{
            "v": 10,
            "user": {"id": "1", "username": "fxg-bot", "discriminator": "4821", "bot": true},
            "session_id": "abc-def",
            "resume_gateway_url": "wss://gateway-resume.discord.gg",
            "guilds": [{"id": "900", "unavailable": true}]
        }"#;
        let ready: ReadyEvent = serde_json::from_str(json).unwrap();
        assert_eq!(ready.user.tag(), "fxg-bot#4821");
        assert_eq!(ready.session_id, "abc-def");
        assert!(ready.resume_gateway_url.is_some());
    }

    #[test]
    fn component_interaction_from_dm() {
        let json = r#"{
            "id": "int-1",
            "application_id": "app-1",
            "type": 3,
            "token": "tok",
            "channel_id": "dm-9",
            "user": {"id": "123", "username": "alex", "discriminator": "0"},
            "data": {"custom_id": "join_interview", "component_type": 2}
        }"#;
        let interaction: Interaction = serde_json::from_str(json).unwrap();
        assert!(interaction.is_component());
        assert_eq!(interaction.custom_id(), Some("join_interview"));
        assert_eq!(interaction.user().unwrap().id, "123");
        assert!(interaction.guild_id.is_none());
    }

    #[test]
    fn component_interaction_from_guild_uses_member_user() {
        let json = r#"{
            "id": "int-2",
            "application_id": "app-1",
            "type": 3,
            "token": "tok",
            "guild_id": "900",
            "member": {"user": {"id": "456", "username": "sam"}, "roles": []},
            "data": {"custom_id": "other"}
        }"#;
        let interaction: Interaction = serde_json::from_str(json).unwrap();
        assert_eq!(interaction.user().unwrap().id, "456");
        assert_eq!(interaction.custom_id(), Some("other"));
    }

    #[test]
    fn command_interaction_is_not_component() {
        let json = r#"{"id": "i", "application_id": "a", "type": 2, "token": "t"}"#;
        let interaction: Interaction = serde_json::from_str(json).unwrap();
        assert!(!interaction.is_component());
        assert!(interaction.custom_id().is_none());
        assert!(interaction.user().is_none());
    }

    #[test]
    fn rate_limit_info_from_headers() {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("x-ratelimit-remaining", "0".parse().unwrap());
        headers.insert("x-ratelimit-reset-after", "1.5".parse().unwrap());
        headers.insert("x-ratelimit-bucket", "abc123".parse().unwrap());

        let info = RateLimitInfo::from_headers(&headers);
        assert!(info.is_limited());
        assert_eq!(info.retry_after_ms(), Some(1500));
        assert_eq!(info.bucket.as_deref(), Some("abc123"));
    }

    #[test]
    fn rate_limit_info_malformed_headers() {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("x-ratelimit-remaining", "not-a-number".parse().unwrap());

        let info = RateLimitInfo::from_headers(&headers);
        assert!(info.remaining.is_none());
        assert!(!info.is_limited());
        assert!(info.retry_after_ms().is_none());
    }
}
