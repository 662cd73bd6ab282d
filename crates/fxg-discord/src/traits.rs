//! Capability traits between the relay and the chat platform.
//!
//! - [`ChatPlatform`] -- the asynchronous operations the relay performs
//!   (implemented by [`DiscordApiClient`](crate::api::DiscordApiClient))
//! - [`GatewayEventHandler`] -- the events the relay reacts to
//!   (driven by [`DiscordGateway`](crate::gateway::DiscordGateway))

use async_trait::async_trait;

use fxg_types::PlatformError;

use crate::events::{Interaction, ReadyEvent};
use crate::message::MessagePayload;
use crate::model::{CreateChannel, GuildChannel, GuildMember, Message, User};

/// Operations the relay performs against the chat platform.
///
/// Every method may fail with a [`PlatformError`]. None of them retry.
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Look up a user by id.
    async fn fetch_user(&self, user_id: &str) -> Result<User, PlatformError>;

    /// Look up a user's membership in a guild.
    async fn fetch_member(&self, guild_id: &str, user_id: &str)
    -> Result<GuildMember, PlatformError>;

    /// Look up a channel. Returns `Ok(None)` when it no longer exists.
    async fn fetch_channel(&self, channel_id: &str) -> Result<Option<GuildChannel>, PlatformError>;

    /// List every channel in a guild.
    async fn list_guild_channels(&self, guild_id: &str) -> Result<Vec<GuildChannel>, PlatformError>;

    /// Create a guild channel.
    async fn create_channel(
        &self,
        guild_id: &str,
        channel: &CreateChannel,
    ) -> Result<GuildChannel, PlatformError>;

    /// Move a channel under another category.
    async fn move_channel(&self, channel_id: &str, parent_id: &str) -> Result<(), PlatformError>;

    /// Remove the explicit permission overwrite for a user or role.
    async fn delete_permission_overwrite(
        &self,
        channel_id: &str,
        overwrite_id: &str,
    ) -> Result<(), PlatformError>;

    /// Grant a role to a guild member.
    async fn add_member_role(
        &self,
        guild_id: &str,
        user_id: &str,
        role_id: &str,
    ) -> Result<(), PlatformError>;

    /// Send a direct message to a user.
    async fn send_direct_message(
        &self,
        user_id: &str,
        payload: &MessagePayload,
    ) -> Result<Message, PlatformError>;

    /// Post a message in a guild channel.
    async fn send_channel_message(
        &self,
        channel_id: &str,
        payload: &MessagePayload,
    ) -> Result<Message, PlatformError>;

    /// Acknowledge an interaction with a deferred reply only the clicking
    /// user can see.
    async fn defer_ephemeral(&self, interaction: &Interaction) -> Result<(), PlatformError>;

    /// Replace the deferred reply with its final text.
    async fn edit_interaction_reply(
        &self,
        interaction: &Interaction,
        content: &str,
    ) -> Result<(), PlatformError>;
}

/// Receives connection lifecycle and interaction events from the Gateway.
///
/// Lifecycle callbacks are awaited inline by the gateway loop. Each
/// interaction runs on its own task, so several may be in flight at once.
#[async_trait]
pub trait GatewayEventHandler: Send + Sync {
    /// A fresh session was established.
    async fn on_ready(&self, ready: ReadyEvent);

    /// A previous session was resumed after a reconnect.
    async fn on_resumed(&self);

    /// The connection dropped or was closed.
    async fn on_disconnect(&self);

    /// A user interacted with a component, command or modal.
    async fn on_interaction(&self, interaction: Interaction);
}
