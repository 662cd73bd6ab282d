//! Outgoing message payloads: embeds and button components.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Component type: action row.
pub const COMPONENT_ACTION_ROW: u8 = 1;

/// Component type: button.
pub const COMPONENT_BUTTON: u8 = 2;

/// Button style: green.
pub const BUTTON_SUCCESS: u8 = 3;

/// Message flag: only the interacting user can see the message.
pub const FLAG_EPHEMERAL: u64 = 1 << 6;

/// A rich embed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Embed {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// RGB colour.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,

    /// ISO-8601 timestamp shown next to the footer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Embed footer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedFooter {
    pub text: String,
}

impl Embed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn color(mut self, color: u32) -> Self {
        self.color = Some(color);
        self
    }

    pub fn footer(mut self, text: impl Into<String>) -> Self {
        self.footer = Some(EmbedFooter { text: text.into() });
        self
    }

    pub fn timestamp(mut self, at: DateTime<Utc>) -> Self {
        self.timestamp = Some(at.to_rfc3339());
        self
    }
}

/// A row of interactive components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRow {
    #[serde(rename = "type")]
    pub kind: u8,
    pub components: Vec<Button>,
}

impl ActionRow {
    pub fn new(components: Vec<Button>) -> Self {
        Self {
            kind: COMPONENT_ACTION_ROW,
            components,
        }
    }
}

/// A clickable button that emits an interaction with `custom_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    #[serde(rename = "type")]
    pub kind: u8,
    pub style: u8,
    pub label: String,
    pub custom_id: String,
}

impl Button {
    pub fn new(style: u8, label: impl Into<String>, custom_id: impl Into<String>) -> Self {
        Self {
            kind: COMPONENT_BUTTON,
            style,
            label: label.into(),
            custom_id: custom_id.into(),
        }
    }
}

/// Body of a create-message (or edit-message) request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessagePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<Embed>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<ActionRow>,
}

impl MessagePayload {
    /// A plain-text message.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    /// A message carrying a single embed.
    pub fn embed(embed: Embed) -> Self {
        Self {
            embeds: vec![embed],
            ..Self::default()
        }
    }

    /// Set the text content shown above the embeds.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Append a row of buttons.
    pub fn with_row(mut self, row: ActionRow) -> Self {
        self.components.push(row);
        self
    }
}
