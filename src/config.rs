use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;

use crate::api::DEFAULT_REQUEST_TIMEOUT;
use crate::loader::DEFAULT_SCRIPT_TIMEOUT;

/// Client configuration, read from `config.toml` and overridden by `BRAINBOX_*` env vars.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    /// Base of the public share links handed out to other people.
    pub share_base_url: String,
    /// Local session database; defaults to a SQLite file in the data directory.
    pub database_url: Option<String>,
    pub request_timeout_ms: u64,
    pub script_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:3000".to_string(),
            share_base_url: "http://localhost:5173".to_string(),
            database_url: None,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT.as_millis() as u64,
            script_timeout_ms: DEFAULT_SCRIPT_TIMEOUT.as_millis() as u64,
        }
    }
}

impl Config {
    /// Load from `path`, or from the default config file when `path` is None.
    /// A missing default file is not an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) => Some(p.to_path_buf()),
            None => default_config_path().filter(|p| p.exists()),
        };
        let mut cfg = match file {
            Some(p) => {
                let raw = std::fs::read_to_string(&p).with_context(|| format!("reading config {}", p.display()))?;
                Self::from_toml(&raw).with_context(|| format!("parsing config {}", p.display()))?
            }
            None => Self::default(),
        };
        cfg.apply_env(|k| std::env::var(k).ok());
        Ok(cfg)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Apply `BRAINBOX_*` overrides; unparsable numbers are ignored.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(v) = var("BRAINBOX_API_URL").filter(|v| !v.trim().is_empty()) { self.api_url = v; }
        if let Some(v) = var("BRAINBOX_SHARE_BASE_URL").filter(|v| !v.trim().is_empty()) { self.share_base_url = v; }
        if let Some(v) = var("BRAINBOX_DATABASE_URL").filter(|v| !v.trim().is_empty()) { self.database_url = Some(v); }
        if let Some(v) = var("BRAINBOX_REQUEST_TIMEOUT_MS").and_then(|s| s.parse().ok()) { self.request_timeout_ms = v; }
        if let Some(v) = var("BRAINBOX_SCRIPT_TIMEOUT_MS").and_then(|s| s.parse().ok()) { self.script_timeout_ms = v; }
    }

    pub fn request_timeout(&self) -> Duration { Duration::from_millis(self.request_timeout_ms) }
    pub fn script_timeout(&self) -> Duration { Duration::from_millis(self.script_timeout_ms) }

    pub fn share_url(&self, hash: &str) -> String {
        format!("{}/share/{}", self.share_base_url.trim_end_matches('/'), hash)
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("app", "brainbox", "brainbox").map(|p| p.config_dir().join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn partial_file_keeps_defaults() {
        let cfg = Config::from_toml("api_url = \"https://api.example.com\"\nscript_timeout_ms = 2500\n").unwrap();
        assert_eq!(cfg.api_url, "https://api.example.com");
        assert_eq!(cfg.script_timeout(), Duration::from_millis(2500));
        assert_eq!(cfg.request_timeout(), Duration::from_secs(5));
        assert_eq!(cfg.database_url, None);
    }

    #[test]
    fn env_overrides_file_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("BRAINBOX_API_URL", "https://env.example.com"),
            ("BRAINBOX_REQUEST_TIMEOUT_MS", "not-a-number"),
            ("BRAINBOX_SCRIPT_TIMEOUT_MS", "100"),
        ]);
        let mut cfg = Config::default();
        cfg.apply_env(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.api_url, "https://env.example.com");
        assert_eq!(cfg.request_timeout_ms, 5000);
        assert_eq!(cfg.script_timeout_ms, 100);
    }

    #[test]
    fn explicit_file_is_loaded() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "share_base_url = \"https://brainbox.app/\"\n").unwrap();
        let cfg = Config::load(Some(&path)).unwrap();
        assert_eq!(cfg.share_url("h4sh"), "https://brainbox.app/share/h4sh");
    }

    #[test]
    fn bad_toml_is_reported() {
        assert!(Config::from_toml("api_url = [").is_err());
    }
}
