// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use marketdesk_app::TabKind;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use url::Url;

pub const APP_NAME: &str = "marketdesk";
pub const CONFIG_PATH_ENV: &str = "MARKETDESK_CONFIG_PATH";
pub const API_URL_ENV: &str = "MARKETDESK_API_URL";

const CONFIG_VERSION: i64 = 1;
const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub api: Api,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            api: Api::default(),
            ui: Ui::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Api {
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ui {
    pub start_tab: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Log {
    pub path: Option<String>,
    pub filter: Option<String>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set {CONFIG_PATH_ENV} to the config file")
        })?;
        Ok(config_root.join(APP_NAME).join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} has no `version`; add `version = 1` and put values under [api], [ui], and [log]",
                    path.display()
                )
            })?;
        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(base_url) = &self.api.base_url {
            validate_base_url(base_url)
                .with_context(|| format!("invalid api.base_url in {}", path.display()))?;
        }

        if let Some(tab) = &self.ui.start_tab
            && TabKind::parse(tab).is_none()
        {
            bail!(
                "ui.start_tab in {} must be one of buyers, sellers, fields; got {:?}",
                path.display(),
                tab
            );
        }

        if let Some(filter) = &self.log.filter
            && filter.trim().is_empty()
        {
            bail!("log.filter in {} must not be empty", path.display());
        }

        Ok(())
    }

    /// The file value wins, then `MARKETDESK_API_URL`, then the local
    /// default. Trailing slashes are dropped.
    pub fn api_base_url(&self) -> Result<String> {
        let raw = match &self.api.base_url {
            Some(url) => url.clone(),
            None => match env::var(API_URL_ENV) {
                Ok(url) if !url.trim().is_empty() => {
                    validate_base_url(&url)
                        .with_context(|| format!("invalid {API_URL_ENV}"))?;
                    url
                }
                _ => DEFAULT_API_BASE_URL.to_owned(),
            },
        };
        Ok(raw.trim().trim_end_matches('/').to_owned())
    }

    pub fn start_tab(&self) -> TabKind {
        self.ui
            .start_tab
            .as_deref()
            .and_then(TabKind::parse)
            .unwrap_or(TabKind::Buyers)
    }

    pub fn log_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.log.path {
            return Ok(PathBuf::from(path));
        }
        let data_root = dirs::data_local_dir().ok_or_else(|| {
            anyhow!("cannot resolve data directory; set [log].path in the config file")
        })?;
        Ok(data_root.join(APP_NAME).join("marketdesk.log"))
    }

    pub fn log_filter(&self) -> &str {
        self.log.filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# marketdesk config\n# Place this file at: {}\n\nversion = 1\n\n[api]\n# Falls back to $MARKETDESK_API_URL, then {}\nbase_url = \"{}\"\n\n[ui]\n# One of: buyers, sellers, fields\nstart_tab = \"buyers\"\n\n[log]\n# Default is the platform data dir (for example ~/.local/share/marketdesk/marketdesk.log)\n# path = \"/absolute/path/to/marketdesk.log\"\n# $MARKETDESK_LOG overrides this\nfilter = \"{}\"\n",
            path.display(),
            DEFAULT_API_BASE_URL,
            DEFAULT_API_BASE_URL,
            DEFAULT_LOG_FILTER,
        )
    }
}

fn validate_base_url(raw: &str) -> Result<()> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        bail!("base URL must not be empty");
    }
    let url = Url::parse(trimmed).with_context(|| format!("parse base URL {trimmed:?}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("base URL must use http or https, got {:?}", url.scheme());
    }
    if url.query().is_some() || url.fragment().is_some() {
        bail!("base URL {trimmed:?} must not carry a query or fragment");
    }
    Ok(())
}
