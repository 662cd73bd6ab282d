//! Discord REST API client.
//!
//! [`DiscordApiClient`] implements [`ChatPlatform`] over the REST API v10
//! with Bot token authentication and basic rate limit tracking.
//!
//! Ids are checked to be snowflakes before they are placed in a URL path.
//! When a response reports an exhausted bucket, the wait is applied to the
//! next request rather than to the one that just succeeded.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

use fxg_types::{PlatformError, SecretString};

use crate::events::{CALLBACK_DEFERRED_CHANNEL_MESSAGE, Interaction, RateLimitInfo};
use crate::message::{FLAG_EPHEMERAL, MessagePayload};
use crate::model::{
    CreateChannel, DmChannel, GuildChannel, GuildMember, Message, User, is_snowflake,
};
use crate::traits::ChatPlatform;

/// Base URL for the Discord REST API v10.
pub const DISCORD_API_BASE: &str = "https://discord.com/api/v10";

/// Per-request deadline for REST calls.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// HTTP client for the Discord REST API.
pub struct DiscordApiClient {
    /// Shared HTTP client.
    http: Client,
    /// Bot token for API authorization.
    token: SecretString,
    /// Base URL for API calls, without a trailing slash.
    base_url: String,
    /// Earliest time the next request may go out.
    blocked_until: Mutex<Option<Instant>>,
}

impl DiscordApiClient {
    /// Create a client against the public Discord API.
    pub fn new(token: SecretString) -> Self {
        Self::with_base_url(token, DISCORD_API_BASE)
    }

    /// Create a client against a custom base URL (proxies, tests).
    pub fn with_base_url(token: SecretString, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            http,
            token,
            base_url: base_url.trim_end_matches('/').to_owned(),
            blocked_until: Mutex::new(None),
        }
    }

    /// Return the base URL used for API requests.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{path}", self.base_url))
            .header("Authorization", format!("Bot {}", self.token.expose()))
    }

    /// Send a request and turn non-success statuses into [`PlatformError`].
    async fn execute(&self, req: RequestBuilder, route: &str) -> Result<Response, PlatformError> {
        let pending = *self.blocked_until.lock().await;
        if let Some(until) = pending
            && until > Instant::now()
        {
            debug!(route = %route, "waiting for rate limit reset");
            tokio::time::sleep_until(until).await;
        }

        debug!(route = %route, "discord request");
        let resp = req
            .send()
            .await
            .map_err(|e| PlatformError::Http(e.to_string()))?;

        let rate_limit = RateLimitInfo::from_headers(resp.headers());
        if rate_limit.is_limited() {
            let wait_ms = rate_limit.retry_after_ms().unwrap_or(1000);
            warn!(
                route = %route,
                bucket = ?rate_limit.bucket,
                wait_ms,
                "Discord rate limit reached, delaying next request"
            );
            *self.blocked_until.lock().await =
                Some(Instant::now() + Duration::from_millis(wait_ms));
        }

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".into());
        let message = error_message(&body);
        if status == StatusCode::NOT_FOUND {
            return Err(PlatformError::NotFound(message));
        }
        Err(PlatformError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
        route: &str,
    ) -> Result<T, PlatformError> {
        self.execute(req, route)
            .await?
            .json()
            .await
            .map_err(|e| PlatformError::Decode(e.to_string()))
    }
}

/// Reject anything but a snowflake before it reaches a URL path.
fn snowflake(id: &str) -> Result<&str, PlatformError> {
    if is_snowflake(id) {
        Ok(id)
    } else {
        Err(PlatformError::InvalidId(id.to_owned()))
    }
}

/// Pull the human-readable `message` out of a Discord error body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
        .unwrap_or_else(|| body.to_owned())
}

#[async_trait]
impl ChatPlatform for DiscordApiClient {
    async fn fetch_user(&self, user_id: &str) -> Result<User, PlatformError> {
        let user_id = snowflake(user_id)?;
        let req = self.request(Method::GET, &format!("/users/{user_id}"));
        self.fetch_json(req, "GET /users/{id}").await
    }

    async fn fetch_member(
        &self,
        guild_id: &str,
        user_id: &str,
    ) -> Result<GuildMember, PlatformError> {
        let (guild_id, user_id) = (snowflake(guild_id)?, snowflake(user_id)?);
        let req = self.request(
            Method::GET,
            &format!("/guilds/{guild_id}/members/{user_id}"),
        );
        self.fetch_json(req, "GET /guilds/{id}/members/{id}").await
    }

    async fn fetch_channel(&self, channel_id: &str) -> Result<Option<GuildChannel>, PlatformError> {
        let channel_id = snowflake(channel_id)?;
        let req = self.request(Method::GET, &format!("/channels/{channel_id}"));
        match self.fetch_json(req, "GET /channels/{id}").await {
            Ok(channel) => Ok(Some(channel)),
            Err(PlatformError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn list_guild_channels(&self, guild_id: &str) -> Result<Vec<GuildChannel>, PlatformError> {
        let guild_id = snowflake(guild_id)?;
        let req = self.request(Method::GET, &format!("/guilds/{guild_id}/channels"));
        self.fetch_json(req, "GET /guilds/{id}/channels").await
    }

    async fn create_channel(
        &self,
        guild_id: &str,
        channel: &CreateChannel,
    ) -> Result<GuildChannel, PlatformError> {
        let guild_id = snowflake(guild_id)?;
        let req = self
            .request(Method::POST, &format!("/guilds/{guild_id}/channels"))
            .json(channel);
        self.fetch_json(req, "POST /guilds/{id}/channels").await
    }

    async fn move_channel(&self, channel_id: &str, parent_id: &str) -> Result<(), PlatformError> {
        let channel_id = snowflake(channel_id)?;
        let req = self
            .request(Method::PATCH, &format!("/channels/{channel_id}"))
            .json(&serde_json::json!({ "parent_id": parent_id }));
        self.execute(req, "PATCH /channels/{id}").await?;
        Ok(())
    }

    async fn delete_permission_overwrite(
        &self,
        channel_id: &str,
        overwrite_id: &str,
    ) -> Result<(), PlatformError> {
        let (channel_id, overwrite_id) = (snowflake(channel_id)?, snowflake(overwrite_id)?);
        let req = self.request(
            Method::DELETE,
            &format!("/channels/{channel_id}/permissions/{overwrite_id}"),
        );
        self.execute(req, "DELETE /channels/{id}/permissions/{id}")
            .await?;
        Ok(())
    }

    async fn add_member_role(
        &self,
        guild_id: &str,
        user_id: &str,
        role_id: &str,
    ) -> Result<(), PlatformError> {
        let (guild_id, user_id, role_id) =
            (snowflake(guild_id)?, snowflake(user_id)?, snowflake(role_id)?);
        let req = self.request(
            Method::PUT,
            &format!("/guilds/{guild_id}/members/{user_id}/roles/{role_id}"),
        );
        self.execute(req, "PUT /guilds/{id}/members/{id}/roles/{id}")
            .await?;
        Ok(())
    }

    async fn send_direct_message(
        &self,
        user_id: &str,
        payload: &MessagePayload,
    ) -> Result<Message, PlatformError> {
        let user_id = snowflake(user_id)?;
        let req = self
            .request(Method::POST, "/users/@me/channels")
            .json(&serde_json::json!({ "recipient_id": user_id }));
        let dm: DmChannel = self.fetch_json(req, "POST /users/@me/channels").await?;
        self.send_channel_message(&dm.id, payload).await
    }

    async fn send_channel_message(
        &self,
        channel_id: &str,
        payload: &MessagePayload,
    ) -> Result<Message, PlatformError> {
        let channel_id = snowflake(channel_id)?;
        let req = self
            .request(Method::POST, &format!("/channels/{channel_id}/messages"))
            .json(payload);
        self.fetch_json(req, "POST /channels/{id}/messages").await
    }

    async fn defer_ephemeral(&self, interaction: &Interaction) -> Result<(), PlatformError> {
        let req = self
            .request(
                Method::POST,
                &format!(
                    "/interactions/{}/{}/callback",
                    interaction.id, interaction.token
                ),
            )
            .json(&serde_json::json!({
                "type": CALLBACK_DEFERRED_CHANNEL_MESSAGE,
                "data": { "flags": FLAG_EPHEMERAL },
            }));
        self.execute(req, "POST /interactions/{id}/{token}/callback")
            .await?;
        Ok(())
    }

    async fn edit_interaction_reply(
        &self,
        interaction: &Interaction,
        content: &str,
    ) -> Result<(), PlatformError> {
        let req = self
            .request(
                Method::PATCH,
                &format!(
                    "/webhooks/{}/{}/messages/@original",
                    interaction.application_id, interaction.token
                ),
            )
            .json(&MessagePayload::text(content));
        self.execute(req, "PATCH /webhooks/{id}/{token}/messages/@original")
            .await?;
        Ok(())
    }
}
