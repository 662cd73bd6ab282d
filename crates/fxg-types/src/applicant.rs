//! The webhook body sent by the applicant-tracking system.

use serde::{Deserialize, Serialize};

/// Application type that triggers the public welcome announcement.
pub const HELPER_APPLICATION: &str = "helper";

/// Body of every `POST /send-*-dm` request.
///
/// All fields are optional at the deserialization layer so that the HTTP
/// gates (auth, readiness) run before any field is looked at. Endpoints
/// that require fields check them with [`missing_fields`](Self::missing_fields).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantRequest {
    /// Platform user identifier (snowflake) of the applicant.
    #[serde(default, alias = "discord_id")]
    pub discord_id: Option<String>,

    /// Display name used in message templates.
    #[serde(default, alias = "applicant_name")]
    pub applicant_name: Option<String>,

    /// Position label, e.g. `"helper"` or a career track name.
    #[serde(default, alias = "application_type")]
    pub application_type: Option<String>,
}

impl ApplicantRequest {
    /// Wire names of required fields that are absent or empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if is_blank(&self.discord_id) {
            missing.push("discordId");
        }
        if is_blank(&self.applicant_name) {
            missing.push("applicantName");
        }
        if is_blank(&self.application_type) {
            missing.push("applicationType");
        }
        missing
    }

    /// The applicant id, or `""` when absent.
    pub fn discord_id(&self) -> &str {
        self.discord_id.as_deref().unwrap_or_default()
    }

    /// The applicant name, or `""` when absent.
    pub fn applicant_name(&self) -> &str {
        self.applicant_name.as_deref().unwrap_or_default()
    }

    /// The application type, or `""` when absent.
    pub fn application_type(&self) -> &str {
        self.application_type.as_deref().unwrap_or_default()
    }

    /// Whether this is a helper application (exact, case-sensitive match).
    pub fn is_helper(&self) -> bool {
        self.application_type.as_deref() == Some(HELPER_APPLICATION)
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(str::is_empty)
}
