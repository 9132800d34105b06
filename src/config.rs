use anyhow::{Context, Result, anyhow, bail};
use dirs::home_dir;
use serde::{Deserialize, Serialize};
use std::fs;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

const APP_DIR: &str = ".dailyreport";
const CONFIG_FILE: &str = "config.json";
const DRAFT_FILE: &str = "daily_report_draft.json";
pub const WEBHOOK_ENV: &str = "DAILYREPORT_WEBHOOK_URL";
pub const DEFAULT_NOTICE_SECONDS: u64 = 4;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub webhook_url: String,
    pub draft_path: PathBuf,
    pub report_dir: PathBuf,
    pub notice_seconds: u64,
    pub submit_timeout_seconds: Option<u64>,
    pub verify_status: bool,
    pub clear_after_submit: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            webhook_url: String::new(),
            draft_path: default_root_dir().join(DRAFT_FILE),
            report_dir: default_report_dir(),
            notice_seconds: DEFAULT_NOTICE_SECONDS,
            submit_timeout_seconds: None,
            verify_status: false,
            clear_after_submit: false,
        }
    }
}

impl Config {
    pub fn config_path() -> Result<PathBuf> {
        Ok(default_root_dir().join(CONFIG_FILE))
    }

    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        set_mode_600(path)?;

        Ok(())
    }

    /// Webhook endpoint, with the environment variable taking precedence.
    /// Blank values count as unset.
    pub fn resolve_webhook_url(&self) -> Option<String> {
        std::env::var(WEBHOOK_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .or_else(|| {
                Some(self.webhook_url.clone()).filter(|value| !value.trim().is_empty())
            })
            .map(|value| value.trim().to_string())
    }

    pub fn notice_duration(&self) -> Duration {
        Duration::from_secs(self.notice_seconds.max(1))
    }

    pub fn submit_timeout(&self) -> Option<Duration> {
        self.submit_timeout_seconds.map(Duration::from_secs)
    }

    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        match normalize_config_key(key) {
            "webhook_url" => {
                let trimmed = value.trim();
                if !trimmed.is_empty() {
                    parse_webhook_url(trimmed)?;
                }
                self.webhook_url = trimmed.to_string();
            }
            "draft_path" => {
                self.draft_path = expand_home(value);
            }
            "report_dir" => {
                self.report_dir = expand_home(value);
            }
            "notice_seconds" => {
                self.notice_seconds = value
                    .parse::<u64>()
                    .map_err(|_| anyhow!("notice_seconds must be a number"))?
                    .max(1);
            }
            "submit_timeout_seconds" => {
                self.submit_timeout_seconds = match value.trim() {
                    "" | "none" | "default" => None,
                    raw => Some(
                        raw.parse::<u64>()
                            .map_err(|_| anyhow!("submit_timeout_seconds must be a number"))?
                            .max(1),
                    ),
                };
            }
            "verify_status" => {
                self.verify_status = value
                    .parse::<bool>()
                    .map_err(|_| anyhow!("verify_status must be true/false"))?;
            }
            "clear_after_submit" => {
                self.clear_after_submit = value
                    .parse::<bool>()
                    .map_err(|_| anyhow!("clear_after_submit must be true/false"))?;
            }
            _ => {
                bail!(
                    "Unsupported config key: {key}. Supported keys: webhook_url|webhook.url, draft_path|draft.path, report_dir|report.dir, notice_seconds|notice.seconds, submit_timeout_seconds|submit.timeout_seconds, verify_status|submit.verify_status, clear_after_submit|submit.clear_after"
                );
            }
        }

        Ok(())
    }

    pub fn get_value(&self, key: &str) -> Option<String> {
        match normalize_config_key(key) {
            "webhook_url" => Some(
                Some(self.webhook_url.clone())
                    .filter(|value| !value.is_empty())
                    .unwrap_or_else(|| "not_set".to_string()),
            ),
            "draft_path" => Some(self.draft_path.display().to_string()),
            "report_dir" => Some(self.report_dir.display().to_string()),
            "notice_seconds" => Some(self.notice_seconds.to_string()),
            "submit_timeout_seconds" => Some(
                self.submit_timeout_seconds
                    .map(|seconds| seconds.to_string())
                    .unwrap_or_else(|| "default".to_string()),
            ),
            "verify_status" => Some(self.verify_status.to_string()),
            "clear_after_submit" => Some(self.clear_after_submit.to_string()),
            _ => None,
        }
    }
}

fn normalize_config_key(key: &str) -> &str {
    match key {
        "webhook_url" | "webhook.url" => "webhook_url",
        "draft_path" | "draft.path" => "draft_path",
        "report_dir" | "report.dir" => "report_dir",
        "notice_seconds" | "notice.seconds" => "notice_seconds",
        "submit_timeout_seconds" | "submit.timeout_seconds" => "submit_timeout_seconds",
        "verify_status" | "submit.verify_status" => "verify_status",
        "clear_after_submit" | "submit.clear_after" => "clear_after_submit",
        _ => key,
    }
}

pub fn parse_webhook_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .with_context(|| format!("Invalid webhook URL: {raw}. Example: https://example.com/exec"))?;

    if !matches!(url.scheme(), "http" | "https") {
        bail!("Webhook URL must use http or https: {raw}");
    }

    Ok(url)
}

pub fn expand_home(raw: &str) -> PathBuf {
    raw.strip_prefix("~/")
        .and_then(|stripped| home_dir().map(|home| home.join(stripped)))
        .unwrap_or_else(|| PathBuf::from(raw))
}

pub fn default_report_dir() -> PathBuf {
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("DailyReport")
        .join("reports")
}

fn default_root_dir() -> PathBuf {
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

pub fn set_mode_600(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))
            .with_context(|| format!("Failed to set file permissions: {}", path.display()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Config, parse_webhook_url};
    use std::time::Duration;

    #[test]
    fn dotted_aliases_set_the_same_key() {
        let mut config = Config::default();
        config
            .set_value("webhook.url", " https://example.com/exec ")
            .expect("valid url");
        config
            .set_value("submit.verify_status", "true")
            .expect("valid bool");

        assert_eq!(config.webhook_url, "https://example.com/exec");
        assert_eq!(
            config.get_value("webhook_url").as_deref(),
            Some("https://example.com/exec")
        );
        assert!(config.verify_status);
    }

    #[test]
    fn rejects_non_http_webhook() {
        assert!(parse_webhook_url("ftp://example.com").is_err());
        assert!(parse_webhook_url("not a url").is_err());

        let mut config = Config::default();
        assert!(config.set_value("webhook_url", "mailto:x@example.com").is_err());
        assert!(config.webhook_url.is_empty());
    }

    #[test]
    fn blank_webhook_clears_the_setting() {
        let mut config = Config {
            webhook_url: "https://example.com/exec".to_string(),
            ..Config::default()
        };
        config.set_value("webhook_url", "  ").expect("blank accepted");
        assert_eq!(config.get_value("webhook_url").as_deref(), Some("not_set"));
    }

    #[test]
    fn notice_duration_has_a_floor() {
        let mut config = Config::default();
        assert_eq!(config.notice_duration(), Duration::from_secs(4));

        config.notice_seconds = 0;
        assert_eq!(config.notice_duration(), Duration::from_secs(1));
    }

    #[test]
    fn config_round_trips_through_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("config.json");
        let config = Config {
            submit_timeout_seconds: Some(15),
            ..Config::default()
        };

        config.save_to(&path).expect("config saved");
        let loaded = Config::load_from(&path).expect("config loaded");

        assert_eq!(loaded.submit_timeout_seconds, Some(15));
        assert_eq!(loaded.notice_seconds, 4);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let mut config = Config::default();
        assert!(config.set_value("polling_seconds", "300").is_err());
        assert!(config.get_value("polling_seconds").is_none());
    }
}
