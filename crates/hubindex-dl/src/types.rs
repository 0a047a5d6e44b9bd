use std::{fmt, io::Read};

use serde::{Deserialize, Serialize};

/// A release as listed by `GET /repos/{owner}/{repo}/releases`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpstreamRelease {
    pub id: u64,
    pub tag_name: String,
}

/// An uploaded file attached to a release.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpstreamAsset {
    pub id: u64,
    pub name: String,
}

/// A git tag as listed by `GET /repos/{owner}/{repo}/tags`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpstreamTag {
    pub name: String,
}

/// Source archive flavours the platform can generate for a ref.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveKind {
    Tarball,
    Zipball,
}

impl ArchiveKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tarball => "tarball",
            Self::Zipball => "zipball",
        }
    }
}

impl fmt::Display for ArchiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Owned, readable response body.
pub type ByteStream = Box<dyn Read + Send + 'static>;

/// Outcome of a release asset download request.
pub enum AssetContent {
    /// The platform streamed the bytes directly.
    Stream(ByteStream),
    /// The platform pointed somewhere else; the caller fetches it.
    Redirect(String),
}

impl fmt::Debug for AssetContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stream(_) => f.write_str("Stream(..)"),
            Self::Redirect(url) => f.debug_tuple("Redirect").field(url).finish(),
        }
    }
}
