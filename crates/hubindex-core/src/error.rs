//! Error types for hubindex-core.

use hubindex_dl::error::UpstreamError;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum CatalogError {
    #[error("Invalid repository specifier: `{0}`")]
    #[diagnostic(
        code(hubindex::invalid_repository),
        help("Use `owner/repo` or a bare `repo` owned by the default user")
    )]
    InvalidRepository(String),

    #[error("Failed to list assets of {repository}")]
    #[diagnostic(
        code(hubindex::upstream),
        help("The previous catalog stays published; the next refresh retries")
    )]
    Upstream {
        repository: String,
        #[source]
        source: UpstreamError,
    },

    #[error("Asset not found: {owner}/{repo}/{name}")]
    #[diagnostic(code(hubindex::asset_not_found))]
    AssetNotFound {
        owner: String,
        repo: String,
        name: String,
    },

    #[error("Failed to retrieve {name}")]
    #[diagnostic(code(hubindex::retrieval))]
    Retrieval {
        name: String,
        #[source]
        source: UpstreamError,
    },

    #[error("Refresh task failed: {0}")]
    #[diagnostic(code(hubindex::refresh_task))]
    RefreshTask(#[from] tokio::task::JoinError),
}

impl CatalogError {
    /// Whether the error should surface to a client as "not found".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::AssetNotFound { .. } | Self::Retrieval { .. })
    }
}
