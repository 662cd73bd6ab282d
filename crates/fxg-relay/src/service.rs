//! [`RelayService`] -- the relay's shared state and gateway event handler.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use fxg_discord::{ChatPlatform, GatewayEventHandler, Interaction, ReadyEvent, User};
use fxg_types::{PlatformError, RelayConfig};

use crate::error::RelayError;
use crate::registry::ChannelRegistry;

/// Shared state for every request handler and gateway event.
///
/// Constructed once at startup and passed around as `Arc<RelayService>`.
pub struct RelayService {
    config: RelayConfig,
    platform: Arc<dyn ChatPlatform>,
    /// Set on READY/RESUMED, cleared on disconnect.
    ready: AtomicBool,
    /// The bot's own tag, shown by the health endpoint.
    bot_tag: RwLock<Option<String>>,
    registry: ChannelRegistry,
    /// Held while a join click is processed, so clicks never interleave.
    join_lock: Mutex<()>,
}

impl RelayService {
    pub fn new(config: RelayConfig, platform: Arc<dyn ChatPlatform>) -> Self {
        let registry = ChannelRegistry::new(config.interview.channel_prefix.clone());
        Self {
            config,
            platform,
            ready: AtomicBool::new(false),
            bot_tag: RwLock::new(None),
            registry,
            join_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    pub fn registry(&self) -> &ChannelRegistry {
        &self.registry
    }

    pub(crate) fn platform(&self) -> &dyn ChatPlatform {
        self.platform.as_ref()
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    pub async fn bot_tag(&self) -> Option<String> {
        self.bot_tag.read().await.clone()
    }

    /// Fail with [`RelayError::NotReady`] unless the gateway session is up.
    pub fn ensure_ready(&self) -> Result<(), RelayError> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(RelayError::NotReady)
        }
    }

    /// Resolve an applicant id to a user, giving up after the configured
    /// timeout. The pending lookup is dropped when the deadline passes.
    pub async fn resolve_user(&self, user_id: &str) -> Result<User, PlatformError> {
        let limit = Duration::from_secs(self.config.interview.user_fetch_timeout_secs);
        match tokio::time::timeout(limit, self.platform.fetch_user(user_id)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(user_id = %user_id, timeout_secs = limit.as_secs(), "user fetch timed out");
                Err(PlatformError::Timeout {
                    operation: "user fetch".into(),
                })
            }
        }
    }

    /// Rebuild the channel counter from interview channels that already
    /// exist in the pending category.
    pub async fn scan_channel_counter(&self) -> Result<u64, PlatformError> {
        let category = self.config.categories.pending.as_str();
        let channels = self
            .platform
            .list_guild_channels(&self.config.guild_id)
            .await?;
        let names = channels
            .iter()
            .filter(|c| c.parent_id.as_deref() == Some(category))
            .filter_map(|c| c.name.as_deref());
        let counter = self.registry.seed_from_names(names);
        info!(counter, category = %category, "interview channel counter restored");
        Ok(counter)
    }

    pub(crate) fn join_lock(&self) -> &Mutex<()> {
        &self.join_lock
    }

    pub(crate) fn set_ready(&self, ready: bool) {
        let was = self.ready.swap(ready, Ordering::SeqCst);
        if was != ready {
            info!(ready, "bot readiness changed");
        }
    }
}

#[async_trait]
impl GatewayEventHandler for RelayService {
    async fn on_ready(&self, ready: ReadyEvent) {
        *self.bot_tag.write().await = Some(ready.user.tag());
        if let Err(e) = self.scan_channel_counter().await {
            warn!(error = %e, "channel scan failed, keeping current counter");
        }
        info!(bot = %ready.user.tag(), "bot logged in");
        self.set_ready(true);
    }

    async fn on_resumed(&self) {
        self.set_ready(true);
    }

    async fn on_disconnect(&self) {
        self.set_ready(false);
    }

    async fn on_interaction(&self, interaction: Interaction) {
        debug!(interaction_id = %interaction.id, "interaction received");
        self.handle_interaction(&interaction).await;
    }
}
