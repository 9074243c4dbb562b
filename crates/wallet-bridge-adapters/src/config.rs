use std::path::{Path, PathBuf};

use wallet_bridge_core::{NetworkConfig, PortError, DEFAULT_ORIGIN};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeProfile {
    Development,
    Production,
}

#[derive(Debug, Clone)]
pub struct BridgeAdapterConfig {
    pub runtime_profile: RuntimeProfile,
    pub origin: String,
    pub eip1193_proxy_url: Option<String>,
    pub proxy_timeout_ms: u64,
    pub network_config_path: Option<PathBuf>,
    pub deterministic_account: String,
    pub deterministic_balance_wei: String,
}

impl Default for BridgeAdapterConfig {
    fn default() -> Self {
        Self {
            runtime_profile: RuntimeProfile::Development,
            origin: DEFAULT_ORIGIN.to_owned(),
            eip1193_proxy_url: None,
            proxy_timeout_ms: 15_000,
            network_config_path: None,
            deterministic_account: "0x1000000000000000000000000000000000000001".to_owned(),
            // 1 ETH
            deterministic_balance_wei: "0x0de0b6b3a7640000".to_owned(),
        }
    }
}

impl BridgeAdapterConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(profile) = std::env::var("WALLET_BRIDGE_RUNTIME_PROFILE") {
            cfg.runtime_profile = match profile.to_ascii_lowercase().as_str() {
                "production" | "prod" => RuntimeProfile::Production,
                "development" | "dev" => RuntimeProfile::Development,
                other => {
                    tracing::warn!(profile = other, "unknown runtime profile, using development");
                    RuntimeProfile::Development
                }
            };
        }
        if let Some(origin) = non_empty_env("WALLET_BRIDGE_ORIGIN") {
            cfg.origin = origin;
        }
        cfg.eip1193_proxy_url = non_empty_env("WALLET_BRIDGE_PROXY_URL");
        if let Some(raw) = non_empty_env("WALLET_BRIDGE_PROXY_TIMEOUT_MS") {
            match raw.parse() {
                Ok(ms) => cfg.proxy_timeout_ms = ms,
                Err(e) => tracing::warn!(value = %raw, error = %e, "ignoring invalid proxy timeout"),
            }
        }
        cfg.network_config_path = non_empty_env("WALLET_BRIDGE_NETWORK_CONFIG").map(PathBuf::from);
        if let Some(account) = non_empty_env("WALLET_BRIDGE_DEFAULT_ACCOUNT") {
            cfg.deterministic_account = account;
        }
        if let Some(balance) = non_empty_env("WALLET_BRIDGE_DEFAULT_BALANCE_WEI") {
            cfg.deterministic_balance_wei = balance;
        }
        cfg
    }

    pub fn strict_runtime_required(&self) -> bool {
        self.runtime_profile == RuntimeProfile::Production
    }

    /// Network settings from `network_config_path`, or the built-in defaults.
    pub fn network_config(&self) -> Result<NetworkConfig, PortError> {
        match &self.network_config_path {
            Some(path) => load_network_config(path),
            None => Ok(NetworkConfig::default()),
        }
    }
}

pub fn load_network_config(path: &Path) -> Result<NetworkConfig, PortError> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        PortError::NotFound(format!("network config {} unreadable: {e}", path.display()))
    })?;
    let cfg: NetworkConfig = serde_json::from_str(&raw).map_err(|e| {
        PortError::Validation(format!("network config {} invalid: {e}", path.display()))
    })?;
    tracing::info!(path = %path.display(), network = %cfg.display_name(), "network config loaded");
    Ok(cfg)
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
