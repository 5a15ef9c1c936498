use std::path::PathBuf;

use anyhow::{anyhow, Result};

/// Resolved miner configuration. `wallet` is the only required field; every
/// other flag falls back to a sensible default.
#[derive(Debug, Clone)]
pub struct MinerConfig {
    pub wallet: String,
    pub node_url: String,
    pub port: u16,
    pub gpu_model: String,
    pub models: Vec<String>,
    pub cache_dir: PathBuf,
}

impl MinerConfig {
    pub fn new(
        wallet: Option<String>,
        node_url: Option<String>,
        port: Option<u16>,
        gpu_model: Option<String>,
        models: Option<String>,
        cache_dir: Option<String>,
    ) -> Result<Self> {
        let wallet = wallet.ok_or_else(|| anyhow!("missing required flag: --wallet"))?;
        Ok(MinerConfig {
            wallet,
            node_url: node_url.unwrap_or_else(|| "http://127.0.0.1:8080".to_string()),
            port: port.unwrap_or(9000),
            gpu_model: gpu_model.unwrap_or_else(|| "H100".to_string()),
            models: models
                .map(|m| m.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_else(|| vec!["llama-3.1-70b".to_string()]),
            cache_dir: cache_dir.map(PathBuf::from).unwrap_or_else(|| PathBuf::from("~/.nimbus/miner-cache")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_wallet_is_an_error() {
        let err = MinerConfig::new(None, None, None, None, None, None).unwrap_err();
        assert!(err.to_string().contains("wallet"));
    }

    #[test]
    fn defaults_apply_when_only_wallet_given() {
        let config = MinerConfig::new(Some("0xabc".into()), None, None, None, None, None).unwrap();
        assert_eq!(config.node_url, "http://127.0.0.1:8080");
        assert_eq!(config.port, 9000);
        assert_eq!(config.gpu_model, "H100");
        assert_eq!(config.models, vec!["llama-3.1-70b".to_string()]);
    }

    #[test]
    fn models_list_is_parsed_from_comma_string() {
        let config = MinerConfig::new(Some("0xabc".into()), None, None, None, Some("a, b,c".into()), None).unwrap();
        assert_eq!(config.models, vec!["a".to_string(), "b".to_string(), "c".to_string()]);
    }
}
