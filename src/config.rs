use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::Path, time::Duration};

use crate::domain::allowance::{AllowanceType, PermitPolicy, ZRX_PERMIT2_SOURCE_ID};

pub const DEFAULT_BACKEND_URL: &str = "https://daemon.thorchain.shapeshift.com";
pub const DEFAULT_AFFILIATE_NAME: &str = "ss";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackendCfg {
    pub base_url: String,
    pub affiliate_name: String,
    pub timeout_ms: u64,
}

impl Default for BackendCfg {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BACKEND_URL.to_string(),
            affiliate_name: DEFAULT_AFFILIATE_NAME.to_string(),
            timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TradeCfg {
    pub affiliate_bps: u32,
    /// Blocks between sub-swaps; streaming is off when absent
    pub streaming_interval: Option<u32>,
    pub allowance_type: AllowanceType,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeaturesCfg {
    pub permit_enabled: bool,
    pub permit_sources: Vec<String>,
}

impl Default for FeaturesCfg {
    fn default() -> Self {
        Self {
            permit_enabled: false,
            permit_sources: vec![ZRX_PERMIT2_SOURCE_ID.to_string()],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WalletCfg {
    pub approval_timeout_ms: u64,
}

impl Default for WalletCfg {
    fn default() -> Self {
        Self { approval_timeout_ms: 60_000 }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: BackendCfg,
    pub trade: TradeCfg,
    pub features: FeaturesCfg,
    pub wallet: WalletCfg,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let s = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::parse(&s)
    }

    pub fn parse(s: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(s).context("parse Config.toml")?;
        Ok(cfg)
    }

    pub fn backend_timeout(&self) -> Duration {
        Duration::from_millis(self.backend.timeout_ms)
    }

    pub fn approval_timeout(&self) -> Duration {
        Duration::from_millis(self.wallet.approval_timeout_ms)
    }
}

/// Read-only view of the switches and settings the core consults
pub trait FeatureFlags {
    fn permit_enabled(&self) -> bool;
    fn permit_sources(&self) -> &[String];
    fn backend_base_url(&self) -> &str;

    fn permit_policy(&self) -> PermitPolicy {
        PermitPolicy::new(self.permit_enabled(), self.permit_sources().to_vec())
    }
}

impl FeatureFlags for Config {
    fn permit_enabled(&self) -> bool {
        self.features.permit_enabled
    }

    fn permit_sources(&self) -> &[String] {
        &self.features.permit_sources
    }

    fn backend_base_url(&self) -> &str {
        &self.backend.base_url
    }
}
