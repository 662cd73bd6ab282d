//! Interview channels opened from the "join interview" button.

use thiserror::Error;
use tracing::{debug, info, warn};

use fxg_discord::model::{Permissions, channel_mention};
use fxg_discord::{CreateChannel, GuildChannel, Interaction, PermissionOverwrite, User};
use fxg_types::PlatformError;

use crate::service::RelayService;
use crate::templates;

/// Result of a successful join request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
    /// A new channel was created for the applicant.
    Created(GuildChannel),
    /// The applicant already had a live channel with this id.
    Existing(String),
}

#[derive(Error, Debug)]
pub enum JoinError {
    /// The clicking user could not be resolved as a guild member.
    #[error("you need to be a member of the server to join an interview")]
    NotMember(#[source] PlatformError),

    #[error(transparent)]
    Platform(#[from] PlatformError),
}

impl RelayService {
    /// React to a component interaction.
    ///
    /// Only clicks on the configured join button are handled. The reply is
    /// deferred first and then edited with the outcome; failures are
    /// reported to the user in that reply and never propagate further.
    pub async fn handle_interaction(&self, interaction: &Interaction) {
        let button_id = self.config().interview.button_id.as_str();
        if !interaction.is_component() || interaction.custom_id() != Some(button_id) {
            debug!(
                interaction_id = %interaction.id,
                custom_id = ?interaction.custom_id(),
                "ignoring interaction"
            );
            return;
        }
        let Some(user) = interaction.user() else {
            warn!(interaction_id = %interaction.id, "interaction without a user");
            return;
        };

        if let Err(e) = self.platform().defer_ephemeral(interaction).await {
            warn!(error = %e, user_id = %user.id, "failed to acknowledge join click");
            return;
        }

        let reply = match self.open_interview_channel(user).await {
            Ok(JoinOutcome::Created(channel)) => {
                format!("✅ Your interview channel has been created: {}", channel.mention())
            }
            Ok(JoinOutcome::Existing(channel_id)) => format!(
                "You already have an interview channel: {}",
                channel_mention(&channel_id)
            ),
            Err(e @ JoinError::NotMember(_)) => {
                warn!(user_id = %user.id, error = ?e, "join click from non-member");
                format!("❌ Sorry, {e}.")
            }
            Err(e) => {
                warn!(user_id = %user.id, error = %e, "failed to open interview channel");
                format!("❌ Failed to create your interview channel: {e}")
            }
        };

        if let Err(e) = self
            .platform()
            .edit_interaction_reply(interaction, &reply)
            .await
        {
            warn!(error = %e, user_id = %user.id, "failed to edit join reply");
        }
    }

    /// Return the applicant's live interview channel, creating it if needed.
    ///
    /// Requests are processed one at a time. A registry entry whose channel
    /// was deleted is dropped and replaced.
    /// Nothing is rolled back if the notification DM fails after creation.
    pub async fn open_interview_channel(&self, user: &User) -> Result<JoinOutcome, JoinError> {
        let _serialized = self.join_lock().lock().await;
        let config = self.config();
        self.platform()
            .fetch_member(&config.guild_id, &user.id)
            .await
            .map_err(JoinError::NotMember)?;

        if let Some(existing) = self.registry().get(&user.id).await {
            if self.platform().fetch_channel(&existing).await?.is_some() {
                debug!(user_id = %user.id, channel_id = %existing, "interview channel already open");
                return Ok(JoinOutcome::Existing(existing));
            }
            info!(user_id = %user.id, channel_id = %existing, "dropping stale interview channel entry");
            self.registry().remove(&user.id).await;
        }

        let name = self.registry().next_channel_name();
        let request = CreateChannel::text(&name, &config.categories.pending)
            .overwrite(PermissionOverwrite::role(
                &config.guild_id,
                Permissions::NONE,
                Permissions::VIEW_CHANNEL,
            ))
            .overwrite(PermissionOverwrite::member(
                &user.id,
                Permissions::VIEW_CHANNEL
                    | Permissions::SEND_MESSAGES
                    | Permissions::READ_MESSAGE_HISTORY,
                Permissions::NONE,
            ));
        let channel = self
            .platform()
            .create_channel(&config.guild_id, &request)
            .await?;
        self.registry().insert(&user.id, &channel.id).await;
        info!(user_id = %user.id, channel = %name, channel_id = %channel.id, "interview channel created");

        let notice = templates::interview_channel_created(&channel.id, &config.branding.footer);
        self.platform().send_direct_message(&user.id, &notice).await?;

        Ok(JoinOutcome::Created(channel))
    }
}
