use anyhow::Context;
use pagecraft_blocks::BlockRegistry;
use pagecraft_client::{HttpPageApi, Tier};
use pagecraft_editor::Entitlement;
use pagecraft_renderer::HtmlOptions;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_NAME: &str = "pagecraft.config.json";

pub const ENV_API_URL: &str = "PAGECRAFT_API_URL";
pub const ENV_API_TOKEN: &str = "PAGECRAFT_API_TOKEN";

/// Pagecraft configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Backend base URL, e.g. `https://api.example.com/v1`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,

    pub request_timeout_secs: u64,

    /// Bounds the number of saved versions
    pub tier: Tier,

    /// Owner holds the Pro entitlement
    pub pro: bool,

    /// Per-kind caps by wire name; `null` lifts the cap
    pub block_limits: BTreeMap<String, Option<usize>>,

    /// Replaces the stock Pro-gated kinds when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pro_only: Option<Vec<String>>,

    pub render: RenderConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub pretty: bool,
    pub indent: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            pretty: true,
            indent: "  ".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: None,
            api_token: None,
            request_timeout_secs: 30,
            tier: Tier::Base,
            pro: false,
            block_limits: BTreeMap::new(),
            pro_only: None,
            render: RenderConfig::default(),
        }
    }
}

impl Config {
    /// Load config from a directory, then apply environment overrides
    pub fn load(cwd: &Path) -> anyhow::Result<Self> {
        let mut config = Self::load_file(cwd)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Config file alone; defaults when it does not exist
    pub fn load_file(cwd: &Path) -> anyhow::Result<Self> {
        let config_path = Self::path(cwd);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Invalid {}", config_path.display()))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn path(cwd: &Path) -> PathBuf {
        cwd.join(DEFAULT_CONFIG_NAME)
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.is_empty()) {
            self.api_base_url = Some(url);
        }
        if let Some(token) = lookup(ENV_API_TOKEN).filter(|v| !v.is_empty()) {
            self.api_token = Some(token);
        }
    }

    pub fn registry(&self) -> anyhow::Result<BlockRegistry> {
        let mut builder = BlockRegistry::builder();
        for (name, limit) in &self.block_limits {
            builder = builder.limit_named(name, *limit);
        }
        if let Some(names) = &self.pro_only {
            builder = builder.pro_only(names);
        }
        builder.build().context("Invalid block settings in config")
    }

    pub fn entitlement(&self) -> Entitlement {
        Entitlement::from_flag(self.pro)
    }

    pub fn html_options(&self) -> HtmlOptions {
        HtmlOptions {
            pretty: self.render.pretty,
            indent: self.render.indent.clone(),
        }
    }

    pub fn http_api(&self) -> anyhow::Result<HttpPageApi> {
        let base_url = self.api_base_url.as_deref().with_context(|| {
            format!(
                "No backend configured: set apiBaseUrl in {} or {}",
                DEFAULT_CONFIG_NAME, ENV_API_URL
            )
        })?;
        Ok(HttpPageApi::new(
            base_url,
            self.api_token.clone(),
            Duration::from_secs(self.request_timeout_secs),
        )?)
    }
}
