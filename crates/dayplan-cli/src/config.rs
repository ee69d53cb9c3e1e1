// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use dayplan_app::{DEFAULT_MAX_LOAD_ATTEMPTS, DEFAULT_NEXT_ROUTE, LoadPolicy, ScreenOptions};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::Level;

pub const APP_NAME: &str = "dayplan";
const CONFIG_VERSION: i64 = 1;
const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";
const DEFAULT_API_TIMEOUT: &str = "10s";
const DEFAULT_RETRY_DELAY: &str = "500ms";
const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub api: Api,
    #[serde(default)]
    pub catalog: Catalog,
    #[serde(default)]
    pub flow: Flow,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            api: Api::default(),
            catalog: Catalog::default(),
            flow: Flow::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Api {
    pub base_url: Option<String>,
    pub timeout: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Catalog {
    pub max_attempts: Option<i64>,
    pub retry_delay: Option<String>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            max_attempts: Some(i64::from(DEFAULT_MAX_LOAD_ATTEMPTS)),
            retry_delay: Some(DEFAULT_RETRY_DELAY.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Flow {
    pub next_route: Option<String>,
}

impl Default for Flow {
    fn default() -> Self {
        Self {
            next_route: Some(DEFAULT_NEXT_ROUTE.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Log {
    pub level: Option<String>,
}

impl Default for Log {
    fn default() -> Self {
        Self {
            level: Some(DEFAULT_LOG_LEVEL.to_owned()),
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("DAYPLAN_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set DAYPLAN_CONFIG_PATH to the config file")
        })?;

        let app_dir = config_root.join(APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
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
                    "config file {} has no version. Add `version = 1` at the top; settings live under [api], [catalog], [flow], and [log]",
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
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(base_url) = &self.api.base_url
            && base_url.trim().is_empty()
        {
            bail!("api.base_url in {} must not be empty", path.display());
        }

        if let Some(timeout) = &self.api.timeout {
            let parsed = parse_duration(timeout)
                .with_context(|| format!("api.timeout in {}", path.display()))?;
            if parsed <= Duration::ZERO {
                bail!(
                    "api.timeout in {} must be positive, got {}",
                    path.display(),
                    timeout
                );
            }
        }

        if let Some(attempts) = self.catalog.max_attempts
            && !(1..=i64::from(u32::MAX)).contains(&attempts)
        {
            bail!(
                "catalog.max_attempts in {} must be at least 1, got {}",
                path.display(),
                attempts
            );
        }

        if let Some(delay) = &self.catalog.retry_delay {
            parse_duration(delay)
                .with_context(|| format!("catalog.retry_delay in {}", path.display()))?;
        }

        self.load_budget().with_context(|| {
            format!(
                "api.timeout, catalog.retry_delay and catalog.max_attempts in {}",
                path.display()
            )
        })?;

        if let Some(route) = &self.flow.next_route
            && !route.starts_with('/')
        {
            bail!(
                "flow.next_route in {} must start with '/', got {:?}",
                path.display(),
                route
            );
        }

        if let Some(level) = &self.log.level {
            parse_level(level).with_context(|| format!("log.level in {}", path.display()))?;
        }

        Ok(())
    }

    /// `[api].base_url` wins, then `DAYPLAN_API_URL`, then the local default.
    pub fn api_base_url(&self) -> String {
        let raw = match &self.api.base_url {
            Some(url) => url.clone(),
            None => env::var("DAYPLAN_API_URL")
                .ok()
                .filter(|url| !url.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_owned()),
        };
        raw.trim_end_matches('/').to_owned()
    }

    pub fn api_timeout(&self) -> Result<Duration> {
        parse_duration(self.api.timeout.as_deref().unwrap_or(DEFAULT_API_TIMEOUT))
    }

    pub fn api_token(&self) -> Option<&str> {
        self.api.token.as_deref()
    }

    pub fn max_load_attempts(&self) -> u32 {
        self.catalog
            .max_attempts
            .and_then(|attempts| u32::try_from(attempts).ok())
            .unwrap_or(DEFAULT_MAX_LOAD_ATTEMPTS)
            .max(1)
    }

    pub fn retry_delay(&self) -> Result<Duration> {
        parse_duration(
            self.catalog
                .retry_delay
                .as_deref()
                .unwrap_or(DEFAULT_RETRY_DELAY),
        )
    }

    pub fn next_route(&self) -> &str {
        self.flow.next_route.as_deref().unwrap_or(DEFAULT_NEXT_ROUTE)
    }

    /// `DAYPLAN_LOG` overrides `[log].level`.
    pub fn log_level(&self) -> Result<Level> {
        if let Ok(level) = env::var("DAYPLAN_LOG")
            && !level.trim().is_empty()
        {
            return parse_level(&level).context("DAYPLAN_LOG");
        }
        parse_level(self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL))
    }

    pub fn screen_options(&self) -> Result<ScreenOptions> {
        Ok(ScreenOptions {
            next_route: self.next_route().to_owned(),
            load_policy: LoadPolicy {
                max_attempts: self.max_load_attempts(),
                retry_delay: self.retry_delay()?,
            },
        })
    }

    pub fn load_budget(&self) -> Result<Duration> {
        let attempts = self.max_load_attempts();
        let per_attempt = self.api_timeout()?;
        let delays = self
            .retry_delay()?
            .checked_mul(attempts.saturating_sub(1));
        per_attempt
            .checked_mul(attempts)
            .zip(delays)
            .and_then(|(fetching, waiting)| fetching.checked_add(waiting))
            .and_then(|total| total.checked_add(Duration::from_secs(1)))
            .ok_or_else(|| anyhow!("total load time overflows; lower the timeout or retry delay"))
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# dayplan config\n# Place this file at: {}\n\nversion = 1\n\n[api]\n# DAYPLAN_API_URL is used when base_url is not set here\nbase_url = \"{}\"\ntimeout = \"{}\"\n# token = \"...\"\n\n[catalog]\nmax_attempts = {}\nretry_delay = \"{}\"\n\n[flow]\nnext_route = \"{}\"\n\n[log]\n# one of: error, warn, info, debug, trace (DAYPLAN_LOG overrides)\nlevel = \"{}\"\n",
            path.display(),
            DEFAULT_API_BASE_URL,
            DEFAULT_API_TIMEOUT,
            DEFAULT_MAX_LOAD_ATTEMPTS,
            DEFAULT_RETRY_DELAY,
            DEFAULT_NEXT_ROUTE,
            DEFAULT_LOG_LEVEL,
        )
    }
}

fn parse_level(raw: &str) -> Result<Level> {
    Level::from_str(raw.trim()).map_err(|_| {
        anyhow!("invalid log level {raw:?}; use one of: error, warn, info, debug, trace")
    })
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        let secs = mins
            .checked_mul(60)
            .ok_or_else(|| anyhow!("invalid duration {raw:?}; too many minutes"))?;
        return Ok(Duration::from_secs(secs));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 5s)")
}
