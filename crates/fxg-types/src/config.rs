//! Configuration schema.
//!
//! [`RelayConfig`] can be read from a JSON file (both `snake_case` and
//! `camelCase` keys are accepted) and is then overlaid with environment
//! variables via [`RelayConfig::apply_env`]. Unknown fields are ignored.
//!
//! | Field | Env var |
//! |---|---|
//! | `discord.token` | `DISCORD_BOT_TOKEN` |
//! | `discord.gateway_url` | `DISCORD_GATEWAY_URL` |
//! | `discord.api_base_url` | `DISCORD_API_BASE_URL` |
//! | `api_secret` | `API_SECRET` |
//! | `guild_id` | `GUILD_ID` |
//! | `categories.pending` | `INTERVIEW_CATEGORY_ID` |
//! | `categories.approved` | `APPROVED_CATEGORY_ID` |
//! | `categories.denied` | `DENIED_CATEGORY_ID` |
//! | `roles.approved` | `APPROVED_ROLE_ID` |
//! | `roles.staff` | `STAFF_ROLE_ID` |
//! | `welcome_channel_id` | `WELCOME_CHANNEL_ID` |
//! | `server.host` | `HOST` |
//! | `server.port` | `PORT` |

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::secret::SecretString;

// ── Root config ──────────────────────────────────────────────────────────

/// Root configuration for the relay.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RelayConfig {
    /// Bot credentials and connection endpoints.
    #[serde(default)]
    pub discord: DiscordConfig,

    /// Shared secret expected in `Authorization: Bearer <secret>`.
    #[serde(default, alias = "apiSecret")]
    pub api_secret: SecretString,

    /// Guild (server) every operation is scoped to.
    #[serde(default, alias = "guildId")]
    pub guild_id: String,

    /// Category containers for interview channels.
    #[serde(default)]
    pub categories: CategoryConfig,

    /// Roles granted on approval.
    #[serde(default)]
    pub roles: RoleConfig,

    /// Channel that receives the helper welcome announcement.
    #[serde(default, alias = "welcomeChannelId")]
    pub welcome_channel_id: String,

    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Interview channel naming and interaction settings.
    #[serde(default)]
    pub interview: InterviewConfig,

    /// Message styling.
    #[serde(default)]
    pub branding: BrandingConfig,
}

/// Discord bot settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    /// Bot token from the Discord Developer Portal.
    #[serde(default)]
    pub token: SecretString,

    /// Gateway WebSocket URL.
    #[serde(default = "default_gateway_url", alias = "gatewayUrl")]
    pub gateway_url: String,

    /// REST API base URL.
    #[serde(default = "default_api_base_url", alias = "apiBaseUrl")]
    pub api_base_url: String,

    /// Gateway intents bitmask.
    #[serde(default = "default_intents")]
    pub intents: u32,
}

fn default_gateway_url() -> String {
    "wss://gateway.discord.gg/?v=10&encoding=json".into()
}

fn default_api_base_url() -> String {
    "https://discord.com/api/v10".into()
}

fn default_intents() -> u32 {
    1 // GUILDS
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: SecretString::default(),
            gateway_url: default_gateway_url(),
            api_base_url: default_api_base_url(),
            intents: default_intents(),
        }
    }
}

/// Category identifiers for the interview channel lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CategoryConfig {
    /// New interview channels are created here; also scanned at startup.
    #[serde(default)]
    pub pending: String,

    /// Channels of approved applicants are moved here.
    #[serde(default)]
    pub approved: String,

    /// Channels of denied applicants are moved here.
    #[serde(default)]
    pub denied: String,
}

/// The two roles added to a member on approval.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RoleConfig {
    /// Primary team role.
    #[serde(default)]
    pub approved: String,

    /// Secondary staff role.
    #[serde(default)]
    pub staff: String,
}

impl RoleConfig {
    /// Both role ids, in the order they are added.
    pub fn all(&self) -> [&str; 2] {
        [&self.approved, &self.staff]
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,

    /// Listen port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origins. Empty = any origin.
    #[serde(default, alias = "corsOrigins")]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

/// Interview channel settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewConfig {
    /// Channel names are this prefix followed by the counter value.
    #[serde(default = "default_channel_prefix", alias = "channelPrefix")]
    pub channel_prefix: String,

    /// Custom id of the "join interview" button.
    #[serde(default = "default_button_id", alias = "buttonId")]
    pub button_id: String,

    /// Deadline for resolving an applicant id to a user.
    #[serde(
        default = "default_user_fetch_timeout_secs",
        alias = "userFetchTimeoutSecs"
    )]
    pub user_fetch_timeout_secs: u64,
}

fn default_channel_prefix() -> String {
    "int-".into()
}

fn default_button_id() -> String {
    "join_interview".into()
}

fn default_user_fetch_timeout_secs() -> u64 {
    10
}

impl Default for InterviewConfig {
    fn default() -> Self {
        Self {
            channel_prefix: default_channel_prefix(),
            button_id: default_button_id(),
            user_fetch_timeout_secs: default_user_fetch_timeout_secs(),
        }
    }
}

/// Message styling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandingConfig {
    /// Embed footer text.
    #[serde(default = "default_footer")]
    pub footer: String,
}

fn default_footer() -> String {
    "FxG Team".into()
}

impl Default for BrandingConfig {
    fn default() -> Self {
        Self {
            footer: default_footer(),
        }
    }
}

// ── Loading ──────────────────────────────────────────────────────────────

impl RelayConfig {
    /// Parse a JSON config document.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Overlay environment variables on top of the current values.
    ///
    /// `lookup` is usually `|k| std::env::var(k).ok()`. Empty values are
    /// treated as unset and leave the existing value in place.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("DISCORD_BOT_TOKEN") {
            self.discord.token = SecretString::new(v);
        }
        if let Some(v) = get("DISCORD_GATEWAY_URL") {
            self.discord.gateway_url = v;
        }
        if let Some(v) = get("DISCORD_API_BASE_URL") {
            self.discord.api_base_url = v;
        }
        if let Some(v) = get("API_SECRET") {
            self.api_secret = SecretString::new(v);
        }
        if let Some(v) = get("GUILD_ID") {
            self.guild_id = v;
        }
        if let Some(v) = get("INTERVIEW_CATEGORY_ID") {
            self.categories.pending = v;
        }
        if let Some(v) = get("APPROVED_CATEGORY_ID") {
            self.categories.approved = v;
        }
        if let Some(v) = get("DENIED_CATEGORY_ID") {
            self.categories.denied = v;
        }
        if let Some(v) = get("APPROVED_ROLE_ID") {
            self.roles.approved = v;
        }
        if let Some(v) = get("STAFF_ROLE_ID") {
            self.roles.staff = v;
        }
        if let Some(v) = get("WELCOME_CHANNEL_ID") {
            self.welcome_channel_id = v;
        }
        if let Some(v) = get("HOST") {
            self.server.host = v;
        }
        if let Some(v) = get("PORT") {
            self.server.port = v.trim().parse().map_err(|e| ConfigError::Invalid {
                key: "PORT",
                reason: format!("{e}"),
            })?;
        }
        Ok(())
    }

    /// Check that every value the relay cannot run without is present.
    ///
    /// All missing keys are reported at once, by env var name.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required: [(&'static str, bool); 10] = [
            ("DISCORD_BOT_TOKEN", self.discord.token.is_empty()),
            ("API_SECRET", self.api_secret.is_empty()),
            ("GUILD_ID", self.guild_id.is_empty()),
            ("INTERVIEW_CATEGORY_ID", self.categories.pending.is_empty()),
            ("APPROVED_CATEGORY_ID", self.categories.approved.is_empty()),
            ("DENIED_CATEGORY_ID", self.categories.denied.is_empty()),
            ("APPROVED_ROLE_ID", self.roles.approved.is_empty()),
            ("STAFF_ROLE_ID", self.roles.staff.is_empty()),
            ("WELCOME_CHANNEL_ID", self.welcome_channel_id.is_empty()),
            (
                "interview.channel_prefix",
                self.interview.channel_prefix.is_empty(),
            ),
        ];
        let missing: Vec<&'static str> = required
            .into_iter()
            .filter_map(|(key, absent)| absent.then_some(key))
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }
        if self.interview.user_fetch_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "interview.user_fetch_timeout_secs",
                reason: "must be greater than zero".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |k| map.get(k).cloned()
    }

    fn full_env() -> Vec<(&'static str, &'static str)> {
        vec![
            ("DISCORD_BOT_TOKEN", "bot-token"),
            ("API_SECRET", "s3cret"),
            ("GUILD_ID", "900"),
            ("INTERVIEW_CATEGORY_ID", "901"),
            ("APPROVED_CATEGORY_ID", "902"),
            ("DENIED_CATEGORY_ID", "903"),
            ("APPROVED_ROLE_ID", "904"),
            ("STAFF_ROLE_ID", "905"),
            ("WELCOME_CHANNEL_ID", "906"),
        ]
    }

    #[test]
    fn defaults() {
        let cfg = RelayConfig::default();
        assert_eq!(cfg.server.port, 3000);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.interview.channel_prefix, "int-");
        assert_eq!(cfg.interview.button_id, "join_interview");
        assert_eq!(cfg.interview.user_fetch_timeout_secs, 10);
        assert_eq!(cfg.discord.intents, 1);
        assert_eq!(cfg.branding.footer, "FxG Team");
    }

    #[test]
    fn env_overlay_fills_everything() {
        let mut cfg = RelayConfig::default();
        let mut pairs = full_env();
        pairs.push(("PORT", "8080"));
        cfg.apply_env(env(&pairs)).unwrap();

        assert_eq!(cfg.discord.token.expose(), "bot-token");
        assert_eq!(cfg.api_secret.expose(), "s3cret");
        assert_eq!(cfg.guild_id, "900");
        assert_eq!(cfg.categories.pending, "901");
        assert_eq!(cfg.categories.approved, "902");
        assert_eq!(cfg.categories.denied, "903");
        assert_eq!(cfg.roles.all(), ["904", "905"]);
        assert_eq!(cfg.welcome_channel_id, "906");
        assert_eq!(cfg.server.port, 8080);
        cfg.validate().unwrap();
    }

    #[test]
    fn empty_env_values_do_not_override_file() {
        let mut cfg = RelayConfig::from_json(r#"{"guildId": "42"}"#).unwrap();
        cfg.apply_env(env(&[("GUILD_ID", "  ")])).unwrap();
        assert_eq!(cfg.guild_id, "42");
    }

    #[test]
    fn invalid_port_is_rejected() {
        let mut cfg = RelayConfig::default();
        let err = cfg.apply_env(env(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));
    }

    #[test]
    fn validate_reports_all_missing() {
        let err = RelayConfig::default().validate().unwrap_err();
        match err {
            ConfigError::Missing(keys) => {
                assert_eq!(keys.len(), 9);
                assert!(keys.contains(&"API_SECRET"));
                assert!(keys.contains(&"WELCOME_CHANNEL_ID"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn zero_timeout_is_invalid() {
        let mut cfg = RelayConfig::default();
        cfg.apply_env(env(&full_env())).unwrap();
        cfg.interview.user_fetch_timeout_secs = 0;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn json_accepts_camel_case_and_nested_sections() {
        let cfg = RelayConfig::from_json(
            r#"{
                "discord": {"token": "t", "apiBaseUrl": "http://localhost:1"},
                "apiSecret": "x",
                "welcomeChannelId": "7",
                "categories": {"pending": "1", "approved": "2", "denied": "3"},
                "roles": {"approved": "4", "staff": "5"},
                "server": {"port": 9000, "corsOrigins": ["https://ats.example"]},
                "interview": {"channelPrefix": "iv-"},
                "somethingUnknown": true
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.discord.api_base_url, "http://localhost:1");
        assert_eq!(cfg.discord.gateway_url, default_gateway_url());
        assert_eq!(cfg.welcome_channel_id, "7");
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.server.cors_origins, vec!["https://ats.example"]);
        assert_eq!(cfg.interview.channel_prefix, "iv-");
        assert_eq!(cfg.interview.button_id, "join_interview");
    }

    #[test]
    fn serialized_config_redacts_secrets() {
        let mut cfg = RelayConfig::default();
        cfg.apply_env(env(&full_env())).unwrap();
        let json = serde_json::to_value(&cfg).unwrap();
        assert_eq!(json["discord"]["token"], "[REDACTED]");
        assert_eq!(json["api_secret"], "[REDACTED]");
    }
}
