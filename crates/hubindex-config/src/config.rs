use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use documented::{Documented, DocumentedFields};
use serde::{Deserialize, Serialize};
use toml_edit::DocumentMut;
use tracing::{debug, info};

use crate::{
    annotations::annotate_toml_table,
    error::{ConfigError, Result},
    utils::{normalize_repositories, parse_duration, xdg_config_home},
};

pub const DEFAULT_BIND: &str = "0.0.0.0:8287";
pub const DEFAULT_REFRESH_INTERVAL: &str = "5m";
pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_WORKERS: usize = 8;

/// hubindex configuration
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, Documented, DocumentedFields)]
pub struct Config {
    /// GitHub user that owns repositories listed without an `owner/` prefix.
    pub username: Option<String>,

    /// GitHub personal access token used for API calls.
    pub access_token: Option<String>,

    /// Repositories to index, as `owner/repo` or a bare `repo`.
    #[serde(default)]
    pub repositories: Vec<String>,

    /// Address the HTTP server binds to.
    /// Default: 0.0.0.0:8287
    pub bind: Option<String>,

    /// How often the catalog is rebuilt from GitHub (e.g. "5m", "1h").
    /// Default: 5m
    pub refresh_interval: Option<String>,

    /// Base URL of the GitHub REST API.
    /// Default: https://api.github.com
    pub api_url: Option<String>,

    /// Timeout applied to every upstream HTTP request (e.g. "30s").
    /// Unset means no timeout.
    pub timeout: Option<String>,

    /// Number of threads serving HTTP requests.
    /// Default: 8
    pub workers: Option<usize>,
}

/// Values supplied on the command line. They take precedence over the
/// environment and the config file; repositories are appended.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub username: Option<String>,
    pub access_token: Option<String>,
    pub bind: Option<String>,
    pub repositories: Vec<String>,
}

/// Location of the config file: the explicit path, else `HUBINDEX_CONFIG`,
/// else `$XDG_CONFIG_HOME/hubindex/config.toml`.
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    match env::var("HUBINDEX_CONFIG") {
        Ok(path_str) => PathBuf::from(path_str),
        Err(_) => xdg_config_home().join("hubindex").join("config.toml"),
    }
}

/// Loads the config file, layers environment and command line values on top
/// and validates the result.
pub fn init(path: &Path, overrides: Overrides) -> Result<Config> {
    let mut config = Config::load(path)?;
    config.apply_env();
    config.apply_overrides(overrides);
    config.resolve()?;
    Ok(config)
}

impl Config {
    pub fn default_config() -> Self {
        Self {
            username: None,
            access_token: None,
            repositories: Vec::new(),
            bind: Some(DEFAULT_BIND.to_string()),
            refresh_interval: Some(DEFAULT_REFRESH_INTERVAL.to_string()),
            api_url: Some(DEFAULT_API_URL.to_string()),
            timeout: None,
            workers: Some(DEFAULT_WORKERS),
        }
    }

    /// Reads `path`, falling back to the defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(content) => {
                debug!("loading configuration from {}", path.display());
                Ok(toml::from_str(&content)?)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no configuration at {}, using defaults", path.display());
                Ok(Self::default_config())
            }
            Err(err) => Err(ConfigError::IoError(err)),
        }
    }

    /// Applies `HUBINDEX_USERNAME`, `HUBINDEX_ACCESS_TOKEN`, `HUBINDEX_BIND`
    /// and appends the space separated `HUBINDEX_REPOS`.
    pub fn apply_env(&mut self) {
        if let Ok(username) = env::var("HUBINDEX_USERNAME") {
            self.username = Some(username);
        }
        if let Ok(token) = env::var("HUBINDEX_ACCESS_TOKEN") {
            self.access_token = Some(token);
        }
        if let Ok(bind) = env::var("HUBINDEX_BIND") {
            self.bind = Some(bind);
        }
        if let Ok(repos) = env::var("HUBINDEX_REPOS") {
            self.repositories
                .extend(repos.split_whitespace().map(String::from));
        }
    }

    pub fn apply_overrides(&mut self, overrides: Overrides) {
        if overrides.username.is_some() {
            self.username = overrides.username;
        }
        if overrides.access_token.is_some() {
            self.access_token = overrides.access_token;
        }
        if overrides.bind.is_some() {
            self.bind = overrides.bind;
        }
        self.repositories.extend(overrides.repositories);
    }

    pub fn resolve(&mut self) -> Result<()> {
        let username = self
            .username
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or(ConfigError::MissingUsername)?;
        self.username = Some(username.to_string());

        self.repositories = normalize_repositories(&self.repositories);
        for repo in &self.repositories {
            validate_repository(repo)?;
        }

        self.bind.get_or_insert_with(|| DEFAULT_BIND.to_string());
        self.api_url
            .get_or_insert_with(|| DEFAULT_API_URL.to_string());
        self.workers.get_or_insert(DEFAULT_WORKERS);
        let interval = self
            .refresh_interval
            .get_or_insert_with(|| DEFAULT_REFRESH_INTERVAL.to_string());

        match parse_duration(interval) {
            Some(d) if !d.is_zero() => {}
            _ => {
                return Err(ConfigError::InvalidDuration {
                    field: "refresh_interval",
                    value: interval.clone(),
                })
            }
        }

        if let Some(timeout) = &self.timeout {
            if parse_duration(timeout).is_none() {
                return Err(ConfigError::InvalidDuration {
                    field: "timeout",
                    value: timeout.clone(),
                });
            }
        }

        if self.workers == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "workers",
                reason: "must be at least 1".into(),
            });
        }

        Ok(())
    }

    pub fn username(&self) -> &str {
        self.username.as_deref().unwrap_or_default()
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref().filter(|t| !t.is_empty())
    }

    pub fn bind(&self) -> &str {
        self.bind.as_deref().unwrap_or(DEFAULT_BIND)
    }

    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    pub fn workers(&self) -> usize {
        self.workers.unwrap_or(DEFAULT_WORKERS)
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
            .as_deref()
            .and_then(parse_duration)
            .filter(|d| !d.is_zero())
            .unwrap_or(Duration::from_secs(5 * 60))
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout.as_deref().and_then(parse_duration)
    }

    pub fn to_annotated_document(&self) -> Result<DocumentMut> {
        let toml_string = toml::to_string_pretty(self)?;
        let mut doc = toml_string.parse::<DocumentMut>()?;
        annotate_toml_table::<Config>(doc.as_table_mut())?;
        Ok(doc)
    }
}

/// Accepts `repo` or `owner/repo` with non-empty parts.
fn validate_repository(spec: &str) -> Result<()> {
    let parts: Vec<&str> = spec.split('/').collect();
    let valid = match parts.as_slice() {
        [repo] => !repo.is_empty(),
        [owner, repo] => !owner.is_empty() && !repo.is_empty(),
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidRepository(spec.to_string()))
    }
}

/// Writes an annotated default configuration to `path`.
pub fn generate_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Err(ConfigError::ConfigAlreadyExists(
            path.display().to_string(),
        ));
    }

    let mut def_config = Config::default_config();
    def_config.username = Some(String::new());
    let annotated_doc = def_config.to_annotated_document()?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, annotated_doc.to_string())?;
    info!(
        "Default configuration file generated with documentation at: {}",
        path.display()
    );
    Ok(())
}
