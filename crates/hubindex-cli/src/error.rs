use hubindex_config::error::ConfigError;
use hubindex_core::error::CatalogError;
use hubindex_dl::error::UpstreamError;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum HubError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Upstream(#[from] UpstreamError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Catalog(#[from] CatalogError),

    #[error("Failed to listen on {addr}")]
    #[diagnostic(
        code(hubindex::bind),
        help("Check that the address is valid and not already in use")
    )]
    Bind {
        addr: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Server task failed: {0}")]
    #[diagnostic(code(hubindex::task))]
    Task(#[from] tokio::task::JoinError),

    #[error("Error while {action}")]
    #[diagnostic(code(hubindex::io))]
    IoError {
        action: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize output: {0}")]
    #[diagnostic(code(hubindex::json))]
    Json(#[from] serde_json::Error),
}

pub type HubResult<T> = std::result::Result<T, HubError>;

pub trait ErrorContext<T> {
    fn with_context<C>(self, context: C) -> HubResult<T>
    where
        C: FnOnce() -> String;
}

impl<T> ErrorContext<T> for std::io::Result<T> {
    fn with_context<C>(self, context: C) -> HubResult<T>
    where
        C: FnOnce() -> String,
    {
        self.map_err(|err| {
            HubError::IoError {
                action: context(),
                source: err,
            }
        })
    }
}
