use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum UpstreamError {
    #[error("Invalid URL: {url}")]
    #[diagnostic(code(hubindex_dl::invalid_url))]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error(transparent)]
    #[diagnostic(
        code(hubindex_dl::network),
        help("Check your internet connection or try again later")
    )]
    Network(#[from] Box<ureq::Error>),

    #[error("HTTP {status}: {url}")]
    #[diagnostic(
        code(hubindex_dl::http_error),
        help("A 401/403 usually means the access token is missing, expired or rate limited")
    )]
    HttpError { status: u16, url: String },

    #[error("Redirect without a Location header: {url}")]
    #[diagnostic(code(hubindex_dl::missing_location))]
    MissingLocation { url: String },

    #[error("Expected a redirect from {url}, got HTTP {status}")]
    #[diagnostic(code(hubindex_dl::expected_redirect))]
    ExpectedRedirect { status: u16, url: String },

    #[error("Invalid response from server: {url}")]
    #[diagnostic(code(hubindex_dl::invalid_response))]
    InvalidResponse { url: String },

    #[error("I/O error: {0}")]
    #[diagnostic(code(hubindex_dl::io))]
    Io(#[from] std::io::Error),
}

impl UpstreamError {
    /// Returns the HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpError { status, .. } | Self::ExpectedRedirect { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}

impl From<ureq::Error> for UpstreamError {
    fn from(e: ureq::Error) -> Self {
        Self::Network(Box::new(e))
    }
}

pub type Result<T> = std::result::Result<T, UpstreamError>;
