//! Configuration module
//!
//! Settings for the ingest pipeline and its collaborators, read from the environment
//! (and a `.env` file when present). Command-line flags override these values.

use std::env;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::PathBuf;
use std::str::FromStr;

const UPLOAD_DIR: &str = "./uploads";
const FETCH_TIMEOUT_SECS: u64 = 60;
const MAX_REMOTE_BYTES: u64 = 20 * 1024 * 1024;

/// How the validator determines the true mime type of an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SniffStrategy {
    /// Inspect the magic-byte signature of the full buffer
    #[default]
    Buffer,
    /// Decode the container header, which also yields pixel dimensions
    Header,
}

impl FromStr for SniffStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "buffer" => Ok(SniffStrategy::Buffer),
            "header" => Ok(SniffStrategy::Header),
            _ => Err(anyhow::anyhow!("Invalid sniff strategy: {}", s)),
        }
    }
}

impl Display for SniffStrategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            SniffStrategy::Buffer => write!(f, "buffer"),
            SniffStrategy::Header => write!(f, "header"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(anyhow::anyhow!("Invalid log format: {}", s)),
        }
    }
}

/// Ingest configuration
#[derive(Clone, Debug)]
pub struct IngestConfig {
    /// Base directory of the default upload-directory provider
    pub upload_dir: PathBuf,
    /// Append `YYYY/MM` to the default upload directory
    pub dated_subdirs: bool,
    pub sniff_strategy: SniffStrategy,
    pub fetch_timeout_secs: u64,
    pub max_remote_bytes: u64,
    pub allow_private_urls: bool,
    // If set, remote origins must be on one of these hosts (or a subdomain)
    pub url_allowlist: Option<Vec<String>>,
    pub log_format: LogFormat,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from(UPLOAD_DIR),
            dated_subdirs: true,
            sniff_strategy: SniffStrategy::default(),
            fetch_timeout_secs: FETCH_TIMEOUT_SECS,
            max_remote_bytes: MAX_REMOTE_BYTES,
            allow_private_urls: false,
            url_allowlist: None,
            log_format: LogFormat::default(),
        }
    }
}

impl IngestConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let upload_dir = lookup("PICTOR_UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(UPLOAD_DIR));

        let dated_subdirs = parse_bool(&lookup, "PICTOR_UPLOAD_DATED_SUBDIRS", true)?;

        let sniff_strategy = match lookup("PICTOR_SNIFF_STRATEGY") {
            Some(v) => v.parse()?,
            None => SniffStrategy::default(),
        };

        let fetch_timeout_secs = lookup("PICTOR_FETCH_TIMEOUT_SECS")
            .unwrap_or_else(|| FETCH_TIMEOUT_SECS.to_string())
            .parse()
            .map_err(|_| anyhow::anyhow!("PICTOR_FETCH_TIMEOUT_SECS must be a valid number"))?;

        let max_remote_bytes = lookup("PICTOR_MAX_REMOTE_BYTES")
            .unwrap_or_else(|| MAX_REMOTE_BYTES.to_string())
            .parse()
            .map_err(|_| anyhow::anyhow!("PICTOR_MAX_REMOTE_BYTES must be a valid number"))?;

        let allow_private_urls = parse_bool(&lookup, "PICTOR_ALLOW_PRIVATE_URLS", false)?;

        let url_allowlist = lookup("PICTOR_URL_ALLOWLIST")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_lowercase())
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|hosts| !hosts.is_empty());

        let log_format = match lookup("PICTOR_LOG_FORMAT") {
            Some(v) => v.parse()?,
            None => LogFormat::default(),
        };

        let config = Self {
            upload_dir,
            dated_subdirs,
            sniff_strategy,
            fetch_timeout_secs,
            max_remote_bytes,
            allow_private_urls,
            url_allowlist,
            log_format,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.fetch_timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "PICTOR_FETCH_TIMEOUT_SECS must be greater than zero"
            ));
        }

        if self.max_remote_bytes == 0 {
            return Err(anyhow::anyhow!(
                "PICTOR_MAX_REMOTE_BYTES must be greater than zero"
            ));
        }

        if self.upload_dir.as_os_str().is_empty() {
            return Err(anyhow::anyhow!("PICTOR_UPLOAD_DIR must not be empty"));
        }

        Ok(())
    }

    pub fn url_allowlist(&self) -> Option<&[String]> {
        self.url_allowlist.as_deref()
    }
}

fn parse_bool<F>(lookup: &F, key: &str, default: bool) -> Result<bool, anyhow::Error>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(v) => v
            .trim()
            .to_lowercase()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} must be true or false, got '{}'", key, v)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = IngestConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.upload_dir, PathBuf::from("./uploads"));
        assert!(config.dated_subdirs);
        assert_eq!(config.sniff_strategy, SniffStrategy::Buffer);
        assert_eq!(config.fetch_timeout_secs, 60);
        assert!(!config.allow_private_urls);
        assert!(config.url_allowlist().is_none());
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_overrides() {
        let config = IngestConfig::from_lookup(lookup_from(&[
            ("PICTOR_UPLOAD_DIR", "/srv/media"),
            ("PICTOR_UPLOAD_DATED_SUBDIRS", "false"),
            ("PICTOR_SNIFF_STRATEGY", "Header"),
            ("PICTOR_URL_ALLOWLIST", "cdn.example.com, Images.example.com,"),
            ("PICTOR_LOG_FORMAT", "json"),
        ]))
        .unwrap();
        assert_eq!(config.upload_dir, PathBuf::from("/srv/media"));
        assert!(!config.dated_subdirs);
        assert_eq!(config.sniff_strategy, SniffStrategy::Header);
        assert_eq!(
            config.url_allowlist().unwrap(),
            &["cdn.example.com".to_string(), "images.example.com".to_string()]
        );
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_invalid_values_rejected() {
        for (key, value) in [
            ("PICTOR_SNIFF_STRATEGY", "magic"),
            ("PICTOR_FETCH_TIMEOUT_SECS", "0"),
            ("PICTOR_MAX_REMOTE_BYTES", "lots"),
        ] {
            assert!(
                IngestConfig::from_lookup(lookup_from(&[(key, value)])).is_err(),
                "{}={}",
                key,
                value
            );
        }
    }

    #[test]
    fn test_invalid_booleans_rejected() {
        let err =
            IngestConfig::from_lookup(lookup_from(&[("PICTOR_UPLOAD_DATED_SUBDIRS", "yes")]))
                .unwrap_err();
        assert!(err
            .to_string()
            .contains("PICTOR_UPLOAD_DATED_SUBDIRS must be true or false"));

        let err = IngestConfig::from_lookup(lookup_from(&[("PICTOR_ALLOW_PRIVATE_URLS", "1")]))
            .unwrap_err();
        assert!(err
            .to_string()
            .contains("PICTOR_ALLOW_PRIVATE_URLS must be true or false"));

        let config =
            IngestConfig::from_lookup(lookup_from(&[("PICTOR_ALLOW_PRIVATE_URLS", " TRUE ")]))
                .unwrap();
        assert!(config.allow_private_urls);
    }
}
