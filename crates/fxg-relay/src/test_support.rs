//! In-memory [`ChatPlatform`] and fixtures for relay tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use fxg_discord::events::{INTERACTION_MESSAGE_COMPONENT, InteractionData};
use fxg_discord::message::COMPONENT_BUTTON;
use fxg_discord::{
    ChatPlatform, CreateChannel, GuildChannel, GuildMember, Interaction, Message, MessagePayload,
    ReadyEvent, User,
};
use fxg_types::{PlatformError, RelayConfig, SecretString};

use crate::service::RelayService;

pub(crate) const SECRET: &str = "s3cret";
pub(crate) const GUILD: &str = "guild-1";

#[derive(Default)]
struct FakeState {
    calls: Vec<String>,
    users: HashMap<String, User>,
    members: HashSet<String>,
    channels: Vec<GuildChannel>,
    next_channel: u64,
    dms: Vec<(String, MessagePayload)>,
    channel_messages: Vec<(String, MessagePayload)>,
    replies: Vec<String>,
}

/// Records every call and answers from in-memory users and channels.
#[derive(Default)]
pub(crate) struct FakePlatform {
    state: Mutex<FakeState>,
    failing: HashSet<&'static str>,
    hang_user_fetch: AtomicBool,
    create_latency: Option<Duration>,
}

pub(crate) fn user(id: &str, username: &str, discriminator: &str) -> User {
    User {
        id: id.into(),
        username: username.into(),
        discriminator: Some(discriminator.into()),
        global_name: None,
        bot: false,
    }
}

impl FakePlatform {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// A known user who is also a guild member.
    pub(crate) fn with_user(self, id: &str, username: &str, discriminator: &str) -> Self {
        let this = self.with_non_member(id, username, discriminator);
        this.state.lock().unwrap().members.insert(id.into());
        this
    }

    /// A known user who is not in the guild.
    pub(crate) fn with_non_member(self, id: &str, username: &str, discriminator: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .users
            .insert(id.into(), user(id, username, discriminator));
        self
    }

    pub(crate) fn with_channel(self, id: &str, name: &str, parent: &str) -> Self {
        self.state.lock().unwrap().channels.push(GuildChannel {
            id: id.into(),
            kind: fxg_discord::model::CHANNEL_GUILD_TEXT,
            name: Some(name.into()),
            parent_id: Some(parent.into()),
            guild_id: Some(GUILD.into()),
            permission_overwrites: Vec::new(),
        });
        self
    }

    /// Make `op` fail with a 500 from the platform.
    pub(crate) fn fail_on(mut self, op: &'static str) -> Self {
        self.failing.insert(op);
        self
    }

    /// Make `fetch_user` never complete.
    pub(crate) fn hang_user_fetch(self) -> Self {
        self.hang_user_fetch.store(true, Ordering::SeqCst);
        self
    }

    /// Make `create_channel` take `latency` before answering.
    pub(crate) fn slow_channel_creation(mut self, latency: Duration) -> Self {
        self.create_latency = Some(latency);
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Number of recorded calls to `op`.
    pub(crate) fn count(&self, op: &str) -> usize {
        let prefix = format!("{op}:");
        self.calls().iter().filter(|c| c.starts_with(&prefix)).count()
    }

    pub(crate) fn dms(&self) -> Vec<(String, MessagePayload)> {
        self.state.lock().unwrap().dms.clone()
    }

    pub(crate) fn channel_messages(&self) -> Vec<(String, MessagePayload)> {
        self.state.lock().unwrap().channel_messages.clone()
    }

    pub(crate) fn replies(&self) -> Vec<String> {
        self.state.lock().unwrap().replies.clone()
    }

    pub(crate) fn channel(&self, id: &str) -> Option<GuildChannel> {
        self.state
            .lock()
            .unwrap()
            .channels
            .iter()
            .find(|c| c.id == id)
            .cloned()
    }

    /// Simulate a channel being deleted out of band.
    pub(crate) fn delete_channel(&self, id: &str) {
        self.state.lock().unwrap().channels.retain(|c| c.id != id);
    }

    fn record(&self, op: &'static str, detail: &str) -> Result<(), PlatformError> {
        self.state
            .lock()
            .unwrap()
            .calls
            .push(format!("{op}:{detail}"));
        if self.failing.contains(op) {
            return Err(PlatformError::Api {
                status: 500,
                message: format!("{op} failed"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ChatPlatform for FakePlatform {
    async fn fetch_user(&self, user_id: &str) -> Result<User, PlatformError> {
        self.record("fetch_user", user_id)?;
        if self.hang_user_fetch.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        self.state
            .lock()
            .unwrap()
            .users
            .get(user_id)
            .cloned()
            .ok_or_else(|| PlatformError::NotFound("Unknown User".into()))
    }

    async fn fetch_member(
        &self,
        guild_id: &str,
        user_id: &str,
    ) -> Result<GuildMember, PlatformError> {
        self.record("fetch_member", user_id)?;
        let state = self.state.lock().unwrap();
        if guild_id != GUILD || !state.members.contains(user_id) {
            return Err(PlatformError::NotFound("Unknown Member".into()));
        }
        Ok(GuildMember {
            user: state.users.get(user_id).cloned(),
            nick: None,
            roles: Vec::new(),
        })
    }

    async fn fetch_channel(&self, channel_id: &str) -> Result<Option<GuildChannel>, PlatformError> {
        self.record("fetch_channel", channel_id)?;
        Ok(self.channel(channel_id))
    }

    async fn list_guild_channels(&self, guild_id: &str) -> Result<Vec<GuildChannel>, PlatformError> {
        self.record("list_guild_channels", guild_id)?;
        Ok(self.state.lock().unwrap().channels.clone())
    }

    async fn create_channel(
        &self,
        guild_id: &str,
        channel: &CreateChannel,
    ) -> Result<GuildChannel, PlatformError> {
        self.record("create_channel", &channel.name)?;
        if let Some(latency) = self.create_latency {
            tokio::time::sleep(latency).await;
        }
        let mut state = self.state.lock().unwrap();
        state.next_channel += 1;
        let created = GuildChannel {
            id: format!("ch-{}", state.next_channel),
            kind: channel.kind,
            name: Some(channel.name.clone()),
            parent_id: channel.parent_id.clone(),
            guild_id: Some(guild_id.into()),
            permission_overwrites: channel.permission_overwrites.clone(),
        };
        state.channels.push(created.clone());
        Ok(created)
    }

    async fn move_channel(&self, channel_id: &str, parent_id: &str) -> Result<(), PlatformError> {
        self.record("move_channel", &format!("{channel_id}:{parent_id}"))?;
        let mut state = self.state.lock().unwrap();
        let channel = state
            .channels
            .iter_mut()
            .find(|c| c.id == channel_id)
            .ok_or_else(|| PlatformError::NotFound("Unknown Channel".into()))?;
        channel.parent_id = Some(parent_id.into());
        Ok(())
    }

    async fn delete_permission_overwrite(
        &self,
        channel_id: &str,
        overwrite_id: &str,
    ) -> Result<(), PlatformError> {
        self.record(
            "delete_permission_overwrite",
            &format!("{channel_id}:{overwrite_id}"),
        )?;
        let mut state = self.state.lock().unwrap();
        if let Some(channel) = state.channels.iter_mut().find(|c| c.id == channel_id) {
            channel.permission_overwrites.retain(|o| o.id != overwrite_id);
        }
        Ok(())
    }

    async fn add_member_role(
        &self,
        _guild_id: &str,
        user_id: &str,
        role_id: &str,
    ) -> Result<(), PlatformError> {
        self.record("add_member_role", &format!("{user_id}:{role_id}"))
    }

    async fn send_direct_message(
        &self,
        user_id: &str,
        payload: &MessagePayload,
    ) -> Result<Message, PlatformError> {
        self.record("send_direct_message", user_id)?;
        let mut state = self.state.lock().unwrap();
        state.dms.push((user_id.into(), payload.clone()));
        Ok(Message {
            id: format!("msg-{}", state.dms.len()),
            channel_id: format!("dm-{user_id}"),
            content: payload.content.clone().unwrap_or_default(),
        })
    }

    async fn send_channel_message(
        &self,
        channel_id: &str,
        payload: &MessagePayload,
    ) -> Result<Message, PlatformError> {
        self.record("send_channel_message", channel_id)?;
        let mut state = self.state.lock().unwrap();
        state
            .channel_messages
            .push((channel_id.into(), payload.clone()));
        Ok(Message {
            id: format!("post-{}", state.channel_messages.len()),
            channel_id: channel_id.into(),
            content: payload.content.clone().unwrap_or_default(),
        })
    }

    async fn defer_ephemeral(&self, interaction: &Interaction) -> Result<(), PlatformError> {
        self.record("defer_ephemeral", &interaction.id)
    }

    async fn edit_interaction_reply(
        &self,
        interaction: &Interaction,
        content: &str,
    ) -> Result<(), PlatformError> {
        self.record("edit_interaction_reply", &interaction.id)?;
        self.state.lock().unwrap().replies.push(content.into());
        Ok(())
    }
}

pub(crate) fn test_config() -> RelayConfig {
    let mut config = RelayConfig::default();
    config.discord.token = SecretString::new("bot-token");
    config.api_secret = SecretString::new(SECRET);
    config.guild_id = GUILD.into();
    config.categories.pending = "cat-pending".into();
    config.categories.approved = "cat-approved".into();
    config.categories.denied = "cat-denied".into();
    config.roles.approved = "role-team".into();
    config.roles.staff = "role-staff".into();
    config.welcome_channel_id = "ch-welcome".into();
    config
}

/// A service over `fake` that has not seen READY yet.
pub(crate) fn service_with(fake: FakePlatform) -> (Arc<RelayService>, Arc<FakePlatform>) {
    let fake = Arc::new(fake);
    let svc = Arc::new(RelayService::new(test_config(), fake.clone()));
    (svc, fake)
}

/// A service over `fake` with the readiness flag raised.
pub(crate) fn ready_service(fake: FakePlatform) -> (Arc<RelayService>, Arc<FakePlatform>) {
    let (svc, fake) = service_with(fake);
    svc.set_ready(true);
    (svc, fake)
}

pub(crate) fn ready_event() -> ReadyEvent {
    ReadyEvent {
        v: 10,
        user: user("bot-1", "FxG Bot", "4821"),
        session_id: "session-1".into(),
        resume_gateway_url: None,
    }
}

/// A button click sent from the applicant's DM.
pub(crate) fn button_click(user_id: &str, custom_id: &str) -> Interaction {
    Interaction {
        id: format!("ix-{user_id}"),
        application_id: "app-1".into(),
        kind: INTERACTION_MESSAGE_COMPONENT,
        token: "ix-token".into(),
        guild_id: None,
        channel_id: Some(format!("dm-{user_id}")),
        member: None,
        user: Some(user(user_id, "applicant", "0")),
        data: Some(InteractionData {
            custom_id: Some(custom_id.into()),
            component_type: Some(COMPONENT_BUTTON),
        }),
    }
}
