//! The five applicant actions behind the `POST /send-*-dm` endpoints.
//!
//! Each action resolves the applicant, performs its side effects in order,
//! and sends the DM last. The first failing platform call aborts the rest;
//! effects already applied stay applied.

use tracing::info;

use fxg_types::ApplicantRequest;

use crate::error::RelayError;
use crate::service::RelayService;
use crate::templates;

impl RelayService {
    /// DM an interview invitation with the join button.
    ///
    /// This is the only action that rejects requests with missing fields.
    pub async fn send_interview_invite(&self, req: &ApplicantRequest) -> Result<String, RelayError> {
        let missing = req.missing_fields();
        if !missing.is_empty() {
            return Err(RelayError::MissingFields(missing));
        }

        let config = self.config();
        let user = self.resolve_user(req.discord_id()).await?;
        let payload = templates::interview_invite(
            req.applicant_name(),
            req.application_type(),
            &config.interview.button_id,
            &config.branding.footer,
        );
        self.platform().send_direct_message(&user.id, &payload).await?;

        info!(user = %user.tag(), position = %req.application_type(), "interview invitation sent");
        Ok(format!("Interview DM sent to {}", user.tag()))
    }

    /// Grant the team roles, move the interview channel to the approved
    /// category, welcome helpers publicly, then DM the approval.
    pub async fn approve(&self, req: &ApplicantRequest) -> Result<String, RelayError> {
        let config = self.config();
        let user = self.resolve_user(req.discord_id()).await?;
        self.platform()
            .fetch_member(&config.guild_id, &user.id)
            .await?;

        let mut effects = Vec::with_capacity(3);
        for role in config.roles.all() {
            self.platform()
                .add_member_role(&config.guild_id, &user.id, role)
                .await?;
        }
        effects.push("roles added");

        if let Some(channel_id) = self.registry().get(&user.id).await {
            self.platform()
                .move_channel(&channel_id, &config.categories.approved)
                .await?;
            effects.push("channel moved to approved");
        }

        if req.is_helper() {
            let welcome =
                templates::welcome_announcement(&user, req.applicant_name(), &config.branding.footer);
            self.platform()
                .send_channel_message(&config.welcome_channel_id, &welcome)
                .await?;
            effects.push("welcome message sent");
        }

        let payload = templates::approval(
            req.applicant_name(),
            req.application_type(),
            &config.branding.footer,
        );
        self.platform().send_direct_message(&user.id, &payload).await?;

        info!(user = %user.tag(), effects = ?effects, "applicant approved");
        Ok(format!("Approval DM sent to {}, {}", user.tag(), effects.join(", ")))
    }

    /// Move the interview channel to the denied category, revoke the
    /// applicant's access to it, forget it, then DM the denial.
    pub async fn deny(&self, req: &ApplicantRequest) -> Result<String, RelayError> {
        let config = self.config();
        let user = self.resolve_user(req.discord_id()).await?;

        let mut moved = false;
        if let Some(channel_id) = self.registry().get(&user.id).await {
            self.platform()
                .move_channel(&channel_id, &config.categories.denied)
                .await?;
            self.platform()
                .delete_permission_overwrite(&channel_id, &user.id)
                .await?;
            self.registry().remove(&user.id).await;
            moved = true;
        }

        let payload = templates::denial(
            req.applicant_name(),
            req.application_type(),
            &config.branding.footer,
        );
        self.platform().send_direct_message(&user.id, &payload).await?;

        info!(user = %user.tag(), channel_moved = moved, "applicant denied");
        let mut message = format!("Denial DM sent to {}", user.tag());
        if moved {
            message.push_str(", channel moved to denied");
        }
        Ok(message)
    }

    /// Grant the team roles and DM the career approval. Never posts a
    /// welcome announcement.
    pub async fn approve_career(&self, req: &ApplicantRequest) -> Result<String, RelayError> {
        let config = self.config();
        let user = self.resolve_user(req.discord_id()).await?;
        self.platform()
            .fetch_member(&config.guild_id, &user.id)
            .await?;
        for role in config.roles.all() {
            self.platform()
                .add_member_role(&config.guild_id, &user.id, role)
                .await?;
        }

        let payload = templates::career_approval(
            req.applicant_name(),
            req.application_type(),
            &config.branding.footer,
        );
        self.platform().send_direct_message(&user.id, &payload).await?;

        info!(user = %user.tag(), track = %req.application_type(), "career applicant approved");
        Ok(format!("Career approval DM sent to {}, roles added", user.tag()))
    }

    pub async fn deny_career(&self, req: &ApplicantRequest) -> Result<String, RelayError> {
        let user = self.resolve_user(req.discord_id()).await?;
        let payload = templates::career_denial(
            req.applicant_name(),
            req.application_type(),
            &self.config().branding.footer,
        );
        self.platform().send_direct_message(&user.id, &payload).await?;

        info!(user = %user.tag(), track = %req.application_type(), "career applicant denied");
        Ok(format!("Career denial DM sent to {}", user.tag()))
    }
}
