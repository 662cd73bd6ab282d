//! Message templates for applicant DMs and announcements.

use chrono::Utc;

use fxg_discord::message::{ActionRow, BUTTON_SUCCESS, Button, Embed, MessagePayload};
use fxg_discord::model::{User, channel_mention};

/// Embed colour for invitations.
pub const COLOR_INTERVIEW: u32 = 0x8B5CF6;

/// Embed colour for approvals and welcomes.
pub const COLOR_APPROVED: u32 = 0x10B981;

/// Embed colour for denials.
pub const COLOR_DENIED: u32 = 0xEF4444;

/// Label of the button attached to interview invitations.
pub const JOIN_BUTTON_LABEL: &str = "Join Interview";

fn embed(title: &str, description: String, color: u32, footer: &str) -> Embed {
    Embed::new()
        .title(title)
        .description(description)
        .color(color)
        .footer(footer)
        .timestamp(Utc::now())
}

/// Interview invitation with the "join" button.
pub fn interview_invite(name: &str, position: &str, button_id: &str, footer: &str) -> MessagePayload {
    let description = format!(
        "Hi **{name}**!\n\n\
         Congratulations! You've been selected for an interview for the **{position}** position.\n\n\
         Click the button below to open your private interview channel. \
         Our team will meet you there.\n\n\
         Good luck! 🍀"
    );
    MessagePayload::embed(embed("🎉 Interview Invitation", description, COLOR_INTERVIEW, footer))
        .with_row(ActionRow::new(vec![Button::new(
            BUTTON_SUCCESS,
            JOIN_BUTTON_LABEL,
            button_id,
        )]))
}

pub fn approval(name: &str, position: &str, footer: &str) -> MessagePayload {
    let description = format!(
        "Hi **{name}**!\n\n\
         Congratulations! Your application for the **{position}** position has been **APPROVED**! 🎉\n\n\
         Welcome to the FxG team! We're excited to have you on board.\n\n\
         You'll receive further instructions soon."
    );
    MessagePayload::embed(embed("✅ Application Approved!", description, COLOR_APPROVED, footer))
}

pub fn denial(name: &str, position: &str, footer: &str) -> MessagePayload {
    let description = format!(
        "Hi **{name}**,\n\n\
         Thank you for your interest in the **{position}** position.\n\n\
         Unfortunately, we've decided to move forward with other candidates at this time.\n\n\
         We appreciate your time and encourage you to apply again in the future!"
    );
    MessagePayload::embed(embed("Application Update", description, COLOR_DENIED, footer))
}

pub fn career_approval(name: &str, track: &str, footer: &str) -> MessagePayload {
    let description = format!(
        "Hi **{name}**!\n\n\
         Great news! Your application for the **{track}** career track has been **APPROVED**! 🎉\n\n\
         Your new roles are already active. A team lead will reach out with onboarding details."
    );
    MessagePayload::embed(embed("✅ Career Application Approved!", description, COLOR_APPROVED, footer))
}

pub fn career_denial(name: &str, track: &str, footer: &str) -> MessagePayload {
    let description = format!(
        "Hi **{name}**,\n\n\
         Thank you for applying to the **{track}** career track.\n\n\
         After careful review we won't be moving forward with your application right now. \
         Keep building your experience and feel free to apply again later!"
    );
    MessagePayload::embed(embed("Career Application Update", description, COLOR_DENIED, footer))
}

/// Public welcome post for a newly approved helper.
pub fn welcome_announcement(user: &User, name: &str, footer: &str) -> MessagePayload {
    let description = format!(
        "Please welcome {mention} (**{name}**) as our newest **helper**! 👋",
        mention = user.mention()
    );
    MessagePayload::embed(embed("🎉 New Helper", description, COLOR_APPROVED, footer))
        .with_content(format!("Welcome {}!", user.mention()))
}

/// DM sent after an interview channel was opened.
pub fn interview_channel_created(channel_id: &str, footer: &str) -> MessagePayload {
    let description = format!(
        "Your private interview channel is ready: {}\n\n\
         Head over there and say hi. A team member will join you shortly.",
        channel_mention(channel_id)
    );
    MessagePayload::embed(embed("📋 Interview Channel Created", description, COLOR_INTERVIEW, footer))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alex() -> User {
        User {
            id: "123".into(),
            username: "Alex".into(),
            discriminator: Some("0001".into()),
            global_name: None,
            bot: false,
        }
    }

    #[test]
    fn invite_carries_join_button() {
        let payload = interview_invite("Alex", "helper", "join_interview", "FxG Team");
        let embed = &payload.embeds[0];
        assert_eq!(embed.color, Some(COLOR_INTERVIEW));
        assert!(embed.description.as_deref().unwrap().contains("**Alex**"));
        assert!(embed.description.as_deref().unwrap().contains("**helper**"));
        assert_eq!(embed.footer.as_ref().unwrap().text, "FxG Team");
        assert!(embed.timestamp.is_some());

        let button = &payload.components[0].components[0];
        assert_eq!(button.custom_id, "join_interview");
        assert_eq!(button.label, JOIN_BUTTON_LABEL);
    }

    #[test]
    fn outcome_templates_have_no_buttons_and_right_colours() {
        let cases = [
            (approval("A", "helper", "f"), COLOR_APPROVED),
            (denial("A", "helper", "f"), COLOR_DENIED),
            (career_approval("A", "Engineering", "f"), COLOR_APPROVED),
            (career_denial("A", "Engineering", "f"), COLOR_DENIED),
        ];
        for (payload, color) in cases {
            assert!(payload.components.is_empty());
            assert_eq!(payload.embeds[0].color, Some(color));
        }
    }

    #[test]
    fn welcome_mentions_user() {
        let payload = welcome_announcement(&alex(), "Alex", "FxG Team");
        assert_eq!(payload.content.as_deref(), Some("Welcome <@123>!"));
        assert!(
            payload.embeds[0]
                .description
                .as_deref()
                .unwrap()
                .contains("<@123>")
        );
    }

    #[test]
    fn channel_created_references_channel() {
        let payload = interview_channel_created("777", "FxG Team");
        assert!(
            payload.embeds[0]
                .description
                .as_deref()
                .unwrap()
                .contains("<#777>")
        );
    }
}
