//! # fxg-types
//!
//! Core type definitions for the FxG applicant relay.
//!
//! Every other crate in the workspace depends on this one. It contains:
//!
//! - **[`config`]** -- [`RelayConfig`] and its sections, with env overlay
//!   and validation
//! - **[`error`]** -- [`PlatformError`] and [`ConfigError`]
//! - **[`secret`]** -- [`SecretString`] for tokens that must never be logged
//! - **[`applicant`]** -- the [`ApplicantRequest`] webhook body

pub mod applicant;
pub mod config;
pub mod error;
pub mod secret;

pub use applicant::ApplicantRequest;
pub use config::RelayConfig;
pub use error::{ConfigError, PlatformError};
pub use secret::SecretString;
