use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::extract::ExtensionMatch;
use crate::fetch::FetchProfile;
use crate::retry::RetryPolicy;

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per profile (including the first), so 4 = 3 retries.
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff.
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay_secs: 1.0,
            max_delay_secs: 120,
        }
    }
}

impl RetryConfig {
    /// Fails when `base_delay_secs` is negative, NaN, infinite, or too large for a `Duration`.
    pub fn to_policy(&self) -> Result<RetryPolicy> {
        let base_delay = Duration::try_from_secs_f64(self.base_delay_secs).map_err(|e| {
            anyhow::anyhow!("retry.base_delay_secs = {}: {}", self.base_delay_secs, e)
        })?;
        Ok(RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            base_delay,
            max_delay: Duration::from_secs(self.max_delay_secs),
        })
    }
}

/// What to do when the backup path for the rewritten document already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackupCollision {
    /// Pick the first free `<name>.backup.N`.
    #[default]
    Numbered,
    /// Replace the existing backup.
    Overwrite,
    /// Refuse to rewrite.
    Fail,
}

/// Global configuration loaded from `~/.config/imgsync/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImgsyncConfig {
    /// Image extension to collect, without the dot.
    pub target_extension: String,
    /// How `src` values are matched against `target_extension`.
    #[serde(default)]
    pub extension_match: ExtensionMatch,
    /// Pause between consecutive downloads, in milliseconds.
    pub download_pause_ms: u64,
    /// Pause before moving on to the next fetch profile, in milliseconds.
    pub fallback_pause_ms: u64,
    /// Whole-request timeout for the first two fetch profiles.
    pub default_timeout_secs: u64,
    /// Whole-request timeout for the last fetch profile.
    pub extended_timeout_secs: u64,
    /// TCP/TLS connect timeout for every profile.
    pub connect_timeout_secs: u64,
    #[serde(default)]
    pub backup_collision: BackupCollision,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

impl Default for ImgsyncConfig {
    fn default() -> Self {
        Self {
            target_extension: "png".to_string(),
            extension_match: ExtensionMatch::default(),
            download_pause_ms: 500,
            fallback_pause_ms: 1000,
            default_timeout_secs: 30,
            extended_timeout_secs: 60,
            connect_timeout_secs: 15,
            backup_collision: BackupCollision::default(),
            retry: None,
        }
    }
}

impl ImgsyncConfig {
    pub fn retry_policy(&self) -> Result<RetryPolicy> {
        self.retry.clone().unwrap_or_default().to_policy()
    }

    /// Checks values that only fail when used.
    pub fn validate(&self) -> Result<()> {
        self.retry_policy()?;
        Ok(())
    }

    /// The fallback sequence: verified, unverified, then verified with the extended timeout.
    pub fn fetch_profiles(&self) -> Vec<FetchProfile> {
        let connect = Duration::from_secs(self.connect_timeout_secs);
        let default_timeout = Duration::from_secs(self.default_timeout_secs);
        vec![
            FetchProfile {
                verify_tls: true,
                connect_timeout: connect,
                timeout: default_timeout,
            },
            FetchProfile {
                verify_tls: false,
                connect_timeout: connect,
                timeout: default_timeout,
            },
            FetchProfile {
                verify_tls: true,
                connect_timeout: connect,
                timeout: Duration::from_secs(self.extended_timeout_secs),
            },
        ]
    }

    pub fn download_pause(&self) -> Duration {
        Duration::from_millis(self.download_pause_ms)
    }

    pub fn fallback_pause(&self) -> Duration {
        Duration::from_millis(self.fallback_pause_ms)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("imgsync")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<ImgsyncConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = ImgsyncConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}

/// Load configuration from an explicit file. The file must exist.
pub fn load_from_path(path: &Path) -> Result<ImgsyncConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let cfg: ImgsyncConfig =
        toml::from_str(&data).with_context(|| format!("invalid config {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = ImgsyncConfig::default();
        assert_eq!(cfg.target_extension, "png");
        assert_eq!(cfg.download_pause_ms, 500);
        assert_eq!(cfg.fallback_pause_ms, 1000);
        assert_eq!(cfg.backup_collision, BackupCollision::Numbered);
        assert_eq!(cfg.extension_match, ExtensionMatch::Loose);
    }

    #[test]
    fn default_retry_is_three_retries() {
        let p = ImgsyncConfig::default().retry_policy().unwrap();
        assert_eq!(p.max_attempts, 4);
        assert_eq!(p.base_delay, Duration::from_secs(1));
    }

    #[test]
    fn fetch_profiles_order() {
        let profiles = ImgsyncConfig::default().fetch_profiles();
        assert_eq!(profiles.len(), 3);
        assert!(profiles[0].verify_tls);
        assert!(!profiles[1].verify_tls);
        assert!(profiles[2].verify_tls);
        assert_eq!(profiles[0].timeout, Duration::from_secs(30));
        assert_eq!(profiles[2].timeout, Duration::from_secs(60));
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = ImgsyncConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: ImgsyncConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.target_extension, cfg.target_extension);
        assert_eq!(parsed.fallback_pause_ms, cfg.fallback_pause_ms);
        assert_eq!(parsed.download_pause_ms, cfg.download_pause_ms);
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            target_extension = "webp"
            extension_match = "suffix"
            download_pause_ms = 0
            fallback_pause_ms = 0
            default_timeout_secs = 5
            extended_timeout_secs = 10
            connect_timeout_secs = 2
            backup_collision = "fail"

            [retry]
            max_attempts = 2
            base_delay_secs = 0.5
            max_delay_secs = 15
        "#;
        let cfg: ImgsyncConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.target_extension, "webp");
        assert_eq!(cfg.extension_match, ExtensionMatch::Suffix);
        assert_eq!(cfg.backup_collision, BackupCollision::Fail);
        let retry = cfg.retry.as_ref().unwrap();
        assert_eq!(retry.max_attempts, 2);
        assert!((retry.base_delay_secs - 0.5).abs() < 1e-9);
        assert_eq!(cfg.retry_policy().unwrap().base_delay, Duration::from_millis(500));
    }

    #[test]
    fn load_from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut cfg = ImgsyncConfig::default();
        cfg.target_extension = "webp".to_string();
        fs::write(&path, toml::to_string_pretty(&cfg).unwrap()).unwrap();
        let loaded = load_from_path(&path).unwrap();
        assert_eq!(loaded.target_extension, "webp");
    }

    #[test]
    fn load_from_missing_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_from_path(&dir.path().join("nope.toml")).is_err());
    }

    #[test]
    fn unrepresentable_base_delay_is_an_error() {
        for bad in [f64::INFINITY, f64::NAN, -1.0, 1e30] {
            let retry = RetryConfig {
                base_delay_secs: bad,
                ..RetryConfig::default()
            };
            assert!(retry.to_policy().is_err(), "{bad}");
        }
    }

    #[test]
    fn load_rejects_huge_base_delay() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut cfg = ImgsyncConfig::default();
        cfg.retry = Some(RetryConfig {
            base_delay_secs: 1e30,
            ..RetryConfig::default()
        });
        fs::write(&path, toml::to_string_pretty(&cfg).unwrap()).unwrap();
        let err = load_from_path(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("base_delay_secs"), "{err:#}");
    }
}
