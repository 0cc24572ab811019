//! Client configuration

use std::path::Path;

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

use crate::{
    error::{Error, Result},
    tokens::parse_pubkey,
};

pub const DEVNET_RPC: &str = "https://api.devnet.solana.com";

pub const ENV_RPC_URL:       &str = "HOOKSWAP_RPC_URL";
pub const ENV_AMM_PROGRAM:   &str = "HOOKSWAP_AMM_PROGRAM_ID";
pub const ENV_TRANSFER_HOOK: &str = "HOOKSWAP_TRANSFER_HOOK_PROGRAM_ID";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// RPC URL for Solana cluster
    pub rpc_url: String,

    /// AMM program ID; only needed for reading AMM pool reserves
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amm_program_id: Option<String>,

    /// Transfer-hook program attached to every issued mint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfer_hook_program_id: Option<String>,

    /// Upper bound, in atomic units, on any demonstration transfer
    pub demo_transfer_cap: u64,

    /// Size of the placeholder pool account in bytes
    pub pool_account_space: u64,

    /// Statistics refresh period in seconds
    pub stats_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_devnet()
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// Keys missing from the file take their devnet defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config_str = std::fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("Failed to read config file {}: {e}", path.display()))
        })?;
        toml::from_str(&config_str)
            .map_err(|e| Error::Configuration(format!("Failed to parse config TOML {}: {e}", path.display())))
    }

    /// Defaults for devnet; program IDs are left unset.
    pub fn default_devnet() -> Self {
        Self {
            rpc_url:                  DEVNET_RPC.to_string(),
            amm_program_id:           None,
            transfer_hook_program_id: None,
            demo_transfer_cap:        100_000,
            pool_account_space:       1000,
            stats_interval_secs:      3,
        }
    }

    /// Write the default config to `path`.
    pub fn write_default(path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let toml_str = toml::to_string_pretty(&Self::default_devnet())
            .map_err(|e| Error::Configuration(format!("Failed to serialize config: {e}")))?;
        std::fs::write(path, toml_str).map_err(|e| {
            Error::Configuration(format!("Failed to write config to {}: {e}", path.display()))
        })?;

        log::info!("Created default config at {}", path.display());
        Ok(())
    }

    /// Overlay `HOOKSWAP_*` environment variables.
    pub fn apply_env(self) -> Self {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let set = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(url) = set(ENV_RPC_URL) {
            self.rpc_url = url;
        }
        if let Some(id) = set(ENV_AMM_PROGRAM) {
            self.amm_program_id = Some(id);
        }
        if let Some(id) = set(ENV_TRANSFER_HOOK) {
            self.transfer_hook_program_id = Some(id);
        }
        self
    }

    /// Transfer-hook program, required before any mint is built.
    pub fn transfer_hook_program_id(&self) -> Result<Pubkey> {
        program_id("transfer_hook_program_id", ENV_TRANSFER_HOOK, self.transfer_hook_program_id.as_deref())
    }

    pub fn amm_program_id(&self) -> Result<Pubkey> {
        program_id("amm_program_id", ENV_AMM_PROGRAM, self.amm_program_id.as_deref())
    }
}

fn program_id(field: &str, env: &str, value: Option<&str>) -> Result<Pubkey> {
    let value = value.map(str::trim).filter(|v| !v.is_empty()).ok_or_else(|| {
        Error::Configuration(format!(
            "{field} is not configured. Set it in the config file or via {env}."
        ))
    })?;
    parse_pubkey(value)
        .map_err(|e| Error::Configuration(format!("{field} is not a valid program ID: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;

    #[test]
    fn test_default_config_creation() {
        let config = Config::default_devnet();
        assert_eq!(config.rpc_url, "https://api.devnet.solana.com");
        assert_eq!(config.demo_transfer_cap, 100_000);
        assert_eq!(config.pool_account_space, 1000);
        assert_eq!(config.stats_interval_secs, 3);
    }

    #[test]
    fn missing_program_ids_are_configuration_errors() {
        let config = Config::default_devnet();
        let err = config.transfer_hook_program_id().unwrap_err();
        assert_eq!(err.kind(), FailureKind::ConfigurationError);
        assert!(err.to_string().contains(ENV_TRANSFER_HOOK));
        assert_eq!(config.amm_program_id().unwrap_err().kind(), FailureKind::ConfigurationError);
    }

    #[test]
    fn malformed_program_id_is_a_configuration_error() {
        let config = Config { transfer_hook_program_id: Some("nope".into()), ..Config::default_devnet() };
        assert_eq!(config.transfer_hook_program_id().unwrap_err().kind(), FailureKind::ConfigurationError);
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let hook = Pubkey::new_unique();
        let config: Config = toml::from_str(&format!(
            "transfer_hook_program_id = \"{hook}\"\ndemo_transfer_cap = 5\n"
        ))
        .unwrap();
        assert_eq!(config.transfer_hook_program_id().unwrap(), hook);
        assert_eq!(config.demo_transfer_cap, 5);
        assert_eq!(config.rpc_url, DEVNET_RPC);
    }

    #[test]
    fn env_overrides_win_and_blanks_are_ignored() {
        let amm = Pubkey::new_unique().to_string();
        let config = Config::default_devnet().apply_overrides(|key| match key {
            ENV_RPC_URL     => Some("http://localhost:8899".into()),
            ENV_AMM_PROGRAM => Some(amm.clone()),
            _               => Some("  ".into()),
        });
        assert_eq!(config.rpc_url, "http://localhost:8899");
        assert_eq!(config.amm_program_id.as_deref(), Some(amm.as_str()));
        assert_eq!(config.transfer_hook_program_id, None);
    }

    #[test]
    fn write_then_load() {
        let path = std::env::temp_dir().join(format!("hookswap-config-{}.toml", std::process::id()));
        Config::write_default(&path).unwrap();
        let loaded = Config::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, Config::default_devnet());
    }

    #[test]
    fn unreadable_file_is_a_configuration_error() {
        let err = Config::load("/definitely/not/here.toml").unwrap_err();
        assert_eq!(err.kind(), FailureKind::ConfigurationError);
    }
}
