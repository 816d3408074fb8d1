use crate::checksum::HashAlgorithm;
use crate::fetch::CurlOptions;
use crate::sync::TrustPolicy;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Public repository the default asset indexes point into.
pub const DEFAULT_ASSETS_REPO: &str = "https://resources.download.minecraft.net/";

/// Transfer tuning (optional section in config.toml). Unset values keep libcurl defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect_timeout_secs: Option<u64>,
    /// Abort a transfer slower than this many bytes/s for `low_speed_time_secs`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_speed_limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_speed_time_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl TransferConfig {
    pub fn curl_options(&self) -> CurlOptions {
        let low_speed = match (self.low_speed_limit, self.low_speed_time_secs) {
            (Some(limit), Some(secs)) => Some((limit, Duration::from_secs(secs))),
            (Some(limit), None) => Some((limit, Duration::from_secs(60))),
            _ => None,
        };
        CurlOptions {
            connect_timeout: self.connect_timeout_secs.map(Duration::from_secs),
            low_speed,
            user_agent: self.user_agent.clone(),
        }
    }
}

/// Global configuration loaded from `~/.config/assetsync/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetSyncConfig {
    /// Store root; `None` means `~/.local/share/assetsync/assets`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets_dir: Option<PathBuf>,
    /// Base URL objects are fetched from.
    pub assets_repo: String,
    #[serde(default)]
    pub hash_algorithm: HashAlgorithm,
    #[serde(default)]
    pub trust_policy: TrustPolicy,
    #[serde(default)]
    pub transfer: TransferConfig,
}

impl Default for AssetSyncConfig {
    fn default() -> Self {
        Self {
            assets_dir: None,
            assets_repo: DEFAULT_ASSETS_REPO.to_string(),
            hash_algorithm: HashAlgorithm::default(),
            trust_policy: TrustPolicy::default(),
            transfer: TransferConfig::default(),
        }
    }
}

impl AssetSyncConfig {
    /// Store root, falling back to the XDG data directory.
    pub fn assets_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.assets_dir {
            return Ok(dir.clone());
        }
        let xdg_dirs = xdg::BaseDirectories::with_prefix("assetsync")?;
        Ok(xdg_dirs.create_data_directory("assets")?)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("assetsync")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<AssetSyncConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = AssetSyncConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: AssetSyncConfig = toml::from_str(&data)?;
    Ok(cfg)
}
