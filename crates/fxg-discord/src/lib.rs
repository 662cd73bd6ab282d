//! Discord client for the FxG applicant relay.
//!
//! The relay only talks to Discord through the [`ChatPlatform`] trait, so
//! tests can swap in a fake. [`DiscordApiClient`] is the REST
//! implementation; [`DiscordGateway`] keeps the Gateway WebSocket open and
//! forwards lifecycle and interaction events to a [`GatewayEventHandler`].
//!
//! # Architecture
//!
//! ```text
//! DiscordGateway.run(handler, cancel)
//!        │ READY / RESUMED / INTERACTION_CREATE / disconnect
//!        ▼
//! Arc<dyn GatewayEventHandler> ──uses──> Arc<dyn ChatPlatform>
//!                                               │
//!                                        DiscordApiClient (REST v10)
//! ```
//!
//! # Modules
//!
//! - [`traits`] -- `ChatPlatform` and `GatewayEventHandler`
//! - [`model`] -- users, members, channels, permission overwrites
//! - [`message`] -- embeds, buttons and outgoing message payloads
//! - [`events`] -- Gateway payloads, opcodes and interactions
//! - [`api`] -- REST client
//! - [`gateway`] -- Gateway connection loop

pub mod api;
pub mod events;
pub mod gateway;
pub mod message;
pub mod model;
pub mod traits;

pub use api::DiscordApiClient;
pub use events::{Interaction, ReadyEvent};
pub use gateway::DiscordGateway;
pub use message::{ActionRow, Button, Embed, MessagePayload};
pub use model::{CreateChannel, GuildChannel, GuildMember, Message, PermissionOverwrite, User};
pub use traits::{ChatPlatform, GatewayEventHandler};

pub use fxg_types::PlatformError;
