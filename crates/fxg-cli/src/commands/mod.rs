//! Subcommand implementations and shared config loading.

pub mod config_cmd;
pub mod serve;

use std::collections::HashMap;
use std::path::Path;

use fxg_types::RelayConfig;

/// Env var naming a config file when `--config` is not given.
pub const CONFIG_ENV: &str = "FXG_CONFIG";

/// Config file picked up from the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "fxg.json";

/// Dotenv file picked up from the working directory.
pub const DOTENV_FILE: &str = ".env";

/// Load the relay config.
///
/// The file is taken from `config_override`, then `FXG_CONFIG`, then
/// `./fxg.json`. With none of them present the defaults are used. Variables
/// are applied on top in every case: process environment first, then
/// `./.env` for keys the environment leaves unset.
pub async fn load_config(config_override: Option<&str>) -> anyhow::Result<RelayConfig> {
    let dotenv = read_dotenv(Path::new(DOTENV_FILE))?;
    let lookup = layered_lookup(|key| std::env::var(key).ok(), &dotenv);

    let path = match config_override {
        Some(path_str) => {
            if !Path::new(path_str).exists() {
                anyhow::bail!("config file not found: {path_str}");
            }
            Some(path_str.to_string())
        }
        None => lookup(CONFIG_ENV).or_else(|| {
            Path::new(DEFAULT_CONFIG_FILE)
                .exists()
                .then(|| DEFAULT_CONFIG_FILE.to_string())
        }),
    };

    let raw = match &path {
        Some(path) => Some(
            tokio::fs::read_to_string(path)
                .await
                .map_err(|e| anyhow::anyhow!("failed to read config {path}: {e}"))?,
        ),
        None => None,
    };

    resolve_config(raw.as_deref(), lookup)
}

/// Read `KEY=VALUE` pairs from a dotenv file without touching the process
/// environment. A missing file yields an empty map.
pub fn read_dotenv(path: &Path) -> anyhow::Result<HashMap<String, String>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let entries = dotenvy::from_path_iter(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    entries
        .map(|entry| entry.map_err(|e| anyhow::anyhow!("failed to parse {}: {e}", path.display())))
        .collect()
}

/// Look a key up in `primary`, falling back to `dotenv` when it is unset or
/// blank there.
pub fn layered_lookup<'a, F>(
    primary: F,
    dotenv: &'a HashMap<String, String>,
) -> impl Fn(&str) -> Option<String> + 'a
where
    F: Fn(&str) -> Option<String> + 'a,
{
    move |key| {
        primary(key)
            .filter(|v| !v.trim().is_empty())
            .or_else(|| dotenv.get(key).cloned())
            .filter(|v| !v.trim().is_empty())
    }
}

/// Parse `raw` (or start from defaults) and overlay `lookup`.
pub fn resolve_config<F>(raw: Option<&str>, lookup: F) -> anyhow::Result<RelayConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match raw {
        Some(raw) => RelayConfig::from_json(raw)
            .map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?,
        None => RelayConfig::default(),
    };
    config.apply_env(lookup)?;
    Ok(config)
}
