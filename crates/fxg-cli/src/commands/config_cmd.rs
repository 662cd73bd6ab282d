//! `fxg config` -- display resolved configuration.
//!
//! Tokens and the shared secret serialize as `[REDACTED]`.
//!
//! ```text
//! fxg config
//! fxg config categories
//! ```

use fxg_types::RelayConfig;

/// Print the whole configuration as pretty JSON.
pub fn config_show(config: &RelayConfig) {
    match serde_json::to_string_pretty(config) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("error: failed to serialize config: {e}"),
    }
}

/// Print one top-level section.
pub fn config_section(config: &RelayConfig, section: &str) {
    let value = serde_json::to_value(config).unwrap_or_default();
    match value.get(section) {
        Some(v) => match serde_json::to_string_pretty(v) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("error: failed to serialize section: {e}"),
        },
        None => {
            let available: Vec<&str> = value
                .as_object()
                .map(|m| m.keys().map(String::as_str).collect())
                .unwrap_or_default();
            eprintln!("error: unknown section '{section}'");
            eprintln!("available sections: {}", available.join(", "));
        }
    }
}
