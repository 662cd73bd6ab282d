//! Discord REST object types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Channel type: guild text channel.
pub const CHANNEL_GUILD_TEXT: u8 = 0;

/// Permission overwrite target: a role (the guild id is the `@everyone` role).
pub const OVERWRITE_ROLE: u8 = 0;

/// Permission overwrite target: a single member.
pub const OVERWRITE_MEMBER: u8 = 1;

/// A Discord user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user ID (snowflake).
    pub id: String,

    /// Account username.
    pub username: String,

    /// Legacy four-digit discriminator, `"0"` for migrated accounts.
    #[serde(default)]
    pub discriminator: Option<String>,

    /// Display name, if set.
    #[serde(default)]
    pub global_name: Option<String>,

    /// Whether this user is a bot.
    #[serde(default)]
    pub bot: bool,
}

impl User {
    /// `username#discriminator`, or the bare username for accounts without
    /// a legacy discriminator.
    pub fn tag(&self) -> String {
        match self.discriminator.as_deref() {
            Some(d) if !d.is_empty() && d != "0" => format!("{}#{d}", self.username),
            _ => self.username.clone(),
        }
    }

    /// `<@id>` mention markup.
    pub fn mention(&self) -> String {
        format!("<@{}>", self.id)
    }
}

/// A user's membership in a guild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildMember {
    /// The member's user object. Absent in some gateway payloads.
    #[serde(default)]
    pub user: Option<User>,

    /// Guild nickname.
    #[serde(default)]
    pub nick: Option<String>,

    /// Role ids held by the member.
    #[serde(default)]
    pub roles: Vec<String>,
}

/// A guild channel (text channel or category).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildChannel {
    /// Unique channel ID.
    pub id: String,

    /// Channel type (see `CHANNEL_*` constants).
    #[serde(rename = "type")]
    pub kind: u8,

    /// Channel name.
    #[serde(default)]
    pub name: Option<String>,

    /// Parent category id.
    #[serde(default)]
    pub parent_id: Option<String>,

    /// Owning guild.
    #[serde(default)]
    pub guild_id: Option<String>,

    /// Explicit permission overwrites.
    #[serde(default)]
    pub permission_overwrites: Vec<PermissionOverwrite>,
}

impl GuildChannel {
    /// `<#id>` channel reference markup.
    pub fn mention(&self) -> String {
        channel_mention(&self.id)
    }
}

/// Whether `id` looks like a Discord snowflake: 1 to 20 ASCII digits.
pub fn is_snowflake(id: &str) -> bool {
    (1..=20).contains(&id.len()) && id.bytes().all(|b| b.is_ascii_digit())
}

/// `<#id>` channel reference markup for a bare channel id.
pub fn channel_mention(channel_id: &str) -> String {
    format!("<#{channel_id}>")
}

/// A permission overwrite on a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionOverwrite {
    /// Role or user id.
    pub id: String,

    /// [`OVERWRITE_ROLE`] or [`OVERWRITE_MEMBER`].
    #[serde(rename = "type")]
    pub kind: u8,

    /// Allowed permission bits, as a decimal string.
    #[serde(default)]
    pub allow: String,

    /// Denied permission bits, as a decimal string.
    #[serde(default)]
    pub deny: String,
}

impl PermissionOverwrite {
    /// Overwrite for a role.
    pub fn role(role_id: impl Into<String>, allow: Permissions, deny: Permissions) -> Self {
        Self {
            id: role_id.into(),
            kind: OVERWRITE_ROLE,
            allow: allow.to_string(),
            deny: deny.to_string(),
        }
    }

    /// Overwrite for a single member.
    pub fn member(user_id: impl Into<String>, allow: Permissions, deny: Permissions) -> Self {
        Self {
            id: user_id.into(),
            kind: OVERWRITE_MEMBER,
            allow: allow.to_string(),
            deny: deny.to_string(),
        }
    }
}

/// A permission bitset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Permissions(pub u64);

impl Permissions {
    /// No permissions.
    pub const NONE: Self = Self(0);
    /// See the channel.
    pub const VIEW_CHANNEL: Self = Self(1 << 10);
    /// Post messages.
    pub const SEND_MESSAGES: Self = Self(1 << 11);
    /// Read earlier messages.
    pub const READ_MESSAGE_HISTORY: Self = Self(1 << 16);
}

impl std::ops::BitOr for Permissions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Body of `POST /guilds/{guild.id}/channels`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateChannel {
    /// Channel name.
    pub name: String,

    /// Channel type.
    #[serde(rename = "type")]
    pub kind: u8,

    /// Parent category.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,

    /// Initial permission overwrites.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub permission_overwrites: Vec<PermissionOverwrite>,
}

impl CreateChannel {
    /// A text channel under `parent_id`.
    pub fn text(name: impl Into<String>, parent_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: CHANNEL_GUILD_TEXT,
            parent_id: Some(parent_id.into()),
            permission_overwrites: Vec::new(),
        }
    }

    /// Add a permission overwrite.
    pub fn overwrite(mut self, overwrite: PermissionOverwrite) -> Self {
        self.permission_overwrites.push(overwrite);
        self
    }
}

/// A message returned by the REST API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID.
    pub id: String,

    /// Channel where the message lives.
    pub channel_id: String,

    /// Message content.
    #[serde(default)]
    pub content: String,
}

/// A DM channel returned by `POST /users/@me/channels`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct DmChannel {
    pub id: String,
}
