use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("TOML serialization error: {0}")]
    #[diagnostic(
        code(hubindex_config::toml_serialize),
        help("Check your configuration structure for invalid values")
    )]
    TomlSerError(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    #[diagnostic(
        code(hubindex_config::toml_deserialize),
        help("Check your config.toml syntax and structure")
    )]
    TomlDeError(#[from] toml::de::Error),

    #[error("Failed to parse TOML: {0}")]
    #[diagnostic(code(hubindex_config::toml))]
    Toml(#[from] toml_edit::TomlError),

    #[error("Configuration file already exists: {0}")]
    #[diagnostic(
        code(hubindex_config::already_exists),
        help("Remove the existing config file or use a different location")
    )]
    ConfigAlreadyExists(String),

    #[error("No GitHub username configured")]
    #[diagnostic(
        code(hubindex_config::missing_username),
        help("Pass --username, set HUBINDEX_USERNAME or add `username` to config.toml")
    )]
    MissingUsername,

    #[error("Invalid repository name: {0}")]
    #[diagnostic(
        code(hubindex_config::invalid_repository),
        help("Use `owner/repo` or a bare `repo` owned by the configured username")
    )]
    InvalidRepository(String),

    #[error("Invalid duration for `{field}`: {value}")]
    #[diagnostic(
        code(hubindex_config::invalid_duration),
        help("Durations look like `30s`, `5m`, `1h30m` or `1d`")
    )]
    InvalidDuration { field: &'static str, value: String },

    #[error("Invalid value for `{field}`: {reason}")]
    #[diagnostic(code(hubindex_config::invalid_value))]
    InvalidValue { field: &'static str, reason: String },

    #[error("Encountered unexpected TOML item: {0}")]
    #[diagnostic(code(hubindex_config::unexpected_toml_item))]
    UnexpectedTomlItem(String),

    #[error("IO error: {0}")]
    #[diagnostic(code(hubindex_config::io))]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
