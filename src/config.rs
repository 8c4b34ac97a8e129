use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::Deserialize;

use crate::cli::Cli;
use crate::error::{Error, Result};
use crate::persist::TOKEN_FILE_NAME;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_LOG_FILTER: &str = "termexam=info";
const CONFIG_FILE_NAME: &str = "config.yaml";

/// Optional settings read from `config.yaml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub token_file: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
    pub log_filter: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub base_url: String,
    pub request_timeout: Duration,
    pub token_file: PathBuf,
    pub log_dir: PathBuf,
    pub log_filter: String,
}

impl Config {
    /// Defaults, then the config file, then command-line flags.
    pub fn load(cli: &Cli) -> Result<Self> {
        let dirs = ProjectDirs::from("", "", "termexam");

        let file = match (&cli.config, &dirs) {
            (Some(path), _) => read_file_config(path)?,
            (None, Some(d)) => {
                let path = d.config_dir().join(CONFIG_FILE_NAME);
                if path.exists() {
                    read_file_config(&path)?
                } else {
                    FileConfig::default()
                }
            }
            (None, None) => FileConfig::default(),
        };

        let data_dir = dirs.as_ref().map(|d| d.data_dir().to_path_buf());
        Self::resolve(file, cli, data_dir.as_deref())
    }

    pub fn resolve(file: FileConfig, cli: &Cli, data_dir: Option<&Path>) -> Result<Self> {
        let base_url = cli
            .base_url
            .clone()
            .or(file.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout_secs = cli
            .timeout
            .or(file.request_timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let token_file = match cli.token_file.clone().or(file.token_file) {
            Some(path) => path,
            None => data_dir.ok_or(Error::NoDataDir)?.join(TOKEN_FILE_NAME),
        };

        let log_dir = file
            .log_dir
            .or_else(|| data_dir.map(|d| d.join("logs")))
            .unwrap_or_else(|| PathBuf::from("logs"));

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(timeout_secs),
            token_file,
            log_dir,
            log_filter: file
                .log_filter
                .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        })
    }
}

pub fn read_file_config(path: &Path) -> Result<FileConfig> {
    let content = fs::read_to_string(path).map_err(|source| Error::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    if content.trim().is_empty() {
        return Ok(FileConfig::default());
    }
    serde_yaml::from_str(&content).map_err(|source| Error::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_file_or_flags() {
        let cfg = Config::resolve(FileConfig::default(), &Cli::default(), Some(Path::new("/data")))
            .unwrap();
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.request_timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(cfg.token_file, Path::new("/data").join(TOKEN_FILE_NAME));
        assert_eq!(cfg.log_dir, Path::new("/data").join("logs"));
        assert_eq!(cfg.log_filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn flags_override_file() {
        let file = FileConfig {
            base_url: Some("http://exam.local:8000/".into()),
            request_timeout_secs: Some(30),
            ..FileConfig::default()
        };
        let cli = Cli {
            base_url: Some("http://override:5000".into()),
            ..Cli::default()
        };
        let cfg = Config::resolve(file, &cli, Some(Path::new("/data"))).unwrap();
        assert_eq!(cfg.base_url, "http://override:5000");
        assert_eq!(cfg.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn token_file_needs_a_location() {
        let err = Config::resolve(FileConfig::default(), &Cli::default(), None).unwrap_err();
        assert!(matches!(err, Error::NoDataDir));
    }

    #[test]
    fn reads_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(
            &path,
            "base_url: http://exam.local:8000/\nrequest_timeout_secs: 3\nlog_filter: termexam=debug\n",
        )
        .unwrap();
        let file = read_file_config(&path).unwrap();
        let cfg = Config::resolve(file, &Cli::default(), Some(dir.path())).unwrap();
        assert_eq!(cfg.base_url, "http://exam.local:8000");
        assert_eq!(cfg.request_timeout, Duration::from_secs(3));
        assert_eq!(cfg.log_filter, "termexam=debug");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "exam_minutes: 45\n").unwrap();
        assert!(matches!(
            read_file_config(&path),
            Err(Error::ConfigParse { .. })
        ));
    }
}
