//! Applicant relay for the FxG Discord server.
//!
//! Receives webhook calls from the applicant-tracking system and turns
//! them into direct messages, role grants and interview-channel moves.
//! Also reacts to the "join interview" button by opening a private
//! channel for the applicant.
//!
//! All state lives in one [`RelayService`], shared as `Arc<RelayService>`
//! by the HTTP router and the gateway event handler.
//!
//! # Request flow
//!
//! ```text
//! POST /send-*-dm ──> auth gate ──> readiness gate ──> field check
//!                                                         │
//!                                       RelayService action (DM, roles, channel)
//!                                                         │
//!                                            Arc<dyn ChatPlatform>
//! ```

pub mod actions;
pub mod api;
pub mod error;
pub mod interview;
pub mod registry;
pub mod service;
pub mod templates;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::RelayError;
pub use registry::ChannelRegistry;
pub use service::RelayService;
