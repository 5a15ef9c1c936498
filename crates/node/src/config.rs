use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

/// Resolved node configuration: CLI flags win over the config file, which
/// wins over built-in defaults.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub port: u16,
    pub data_dir: PathBuf,
    pub node_name: String,
    pub cors_enabled: bool,
    pub metrics_port: u16,
    pub heartbeat_max_age_secs: u64,
    pub tick_interval_secs: u64,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        ResolvedConfig {
            port: 8080,
            data_dir: PathBuf::from("~/.nimbus/data"),
            node_name: "nimbus-node".to_string(),
            cors_enabled: false,
            metrics_port: 9090,
            heartbeat_max_age_secs: 30,
            tick_interval_secs: 5,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct RawConfig {
    port: Option<u16>,
    data_dir: Option<String>,
    node_name: Option<String>,
    cors_enabled: Option<bool>,
    metrics_port: Option<u16>,
    heartbeat_max_age_secs: Option<u64>,
    tick_interval_secs: Option<u64>,
}

/// CLI-supplied overrides. `None` means "the user did not pass this flag",
/// distinct from a value the user explicitly set to the default.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub port: Option<u16>,
    pub data_dir: Option<String>,
    pub node_name: Option<String>,
    pub cors_enabled: Option<bool>,
}

/// Loads `config_path` (or the default `~/.nimbus/node.toml` when `None`),
/// merges CLI overrides on top (CLI wins), and fills remaining fields with
/// built-in defaults.
pub fn load_config(config_path: Option<&str>, overrides: CliOverrides) -> Result<ResolvedConfig> {
    let path = resolve_config_path(config_path)?;
    let raw = if path.exists() {
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str::<RawConfig>(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))?
    } else {
        RawConfig::default()
    };

    let defaults = ResolvedConfig::default();

    let data_dir = overrides
        .data_dir
        .or(raw.data_dir)
        .map(|s| expand_path(&s))
        .transpose()?
        .unwrap_or(defaults.data_dir);

    Ok(ResolvedConfig {
        port: overrides.port.or(raw.port).unwrap_or(defaults.port),
        data_dir,
        node_name: overrides.node_name.or(raw.node_name).unwrap_or(defaults.node_name),
        cors_enabled: overrides.cors_enabled.or(raw.cors_enabled).unwrap_or(defaults.cors_enabled),
        metrics_port: raw.metrics_port.unwrap_or(defaults.metrics_port),
        heartbeat_max_age_secs: raw.heartbeat_max_age_secs.unwrap_or(defaults.heartbeat_max_age_secs),
        tick_interval_secs: raw.tick_interval_secs.unwrap_or(defaults.tick_interval_secs),
    })
}

fn resolve_config_path(path: Option<&str>) -> Result<PathBuf> {
    if let Some(custom) = path {
        return expand_path(custom);
    }
    if let Some(home) = dirs::home_dir() {
        Ok(home.join(".nimbus").join("node.toml"))
    } else {
        Err(anyhow!("unable to resolve home directory; pass --config explicitly"))
    }
}

pub fn expand_path(path: &str) -> Result<PathBuf> {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return Ok(home.join(stripped));
        }
        return Err(anyhow!("unable to resolve home directory for path {}", path));
    }
    Ok(Path::new(path).to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = load_config(Some("/nonexistent/path.toml"), CliOverrides::default()).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.node_name, "nimbus-node");
    }

    #[test]
    fn cli_overrides_win_over_defaults() {
        let overrides = CliOverrides {
            port: Some(9999),
            ..Default::default()
        };
        let config = load_config(Some("/nonexistent/path.toml"), overrides).unwrap();
        assert_eq!(config.port, 9999);
    }

    #[test]
    fn tilde_path_expands_to_home_dir() {
        if let Some(home) = dirs::home_dir() {
            let expanded = expand_path("~/.nimbus/data").unwrap();
            assert_eq!(expanded, home.join(".nimbus/data"));
        }
    }
}
