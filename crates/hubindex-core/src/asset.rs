use std::fmt;

use hubindex_dl::{platform::encode_segment, types::ArchiveKind};
use serde::Serialize;

/// One downloadable file in the catalog and how to retrieve it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AssetRecord {
    /// A file uploaded to a release, fetched by its upstream id.
    Hosted {
        id: u64,
        name: String,
        owner: String,
        repo: String,
    },
    /// A source archive the platform generates on demand for `git_ref`.
    Synthetic {
        name: String,
        owner: String,
        repo: String,
        #[serde(rename = "ref")]
        git_ref: String,
        format: ArchiveKind,
    },
}

impl AssetRecord {
    pub fn hosted(
        id: u64,
        name: impl Into<String>,
        owner: impl Into<String>,
        repo: impl Into<String>,
    ) -> Self {
        Self::Hosted {
            id,
            name: name.into(),
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// The tarball stand-in for `tag`, named `<repo>-<version>.tar.gz`.
    pub fn synthetic_tarball(owner: &str, repo: &str, tag: &str) -> Self {
        Self::Synthetic {
            name: archive_name(repo, tag),
            owner: owner.to_string(),
            repo: repo.to_string(),
            git_ref: tag.to_string(),
            format: ArchiveKind::Tarball,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Hosted { name, .. } | Self::Synthetic { name, .. } => name,
        }
    }

    pub fn owner(&self) -> &str {
        match self {
            Self::Hosted { owner, .. } | Self::Synthetic { owner, .. } => owner,
        }
    }

    pub fn repo(&self) -> &str {
        match self {
            Self::Hosted { repo, .. } | Self::Synthetic { repo, .. } => repo,
        }
    }

    pub fn id(&self) -> Option<u64> {
        match self {
            Self::Hosted { id, .. } => Some(*id),
            Self::Synthetic { .. } => None,
        }
    }

    pub fn git_ref(&self) -> Option<&str> {
        match self {
            Self::Hosted { .. } => None,
            Self::Synthetic { git_ref, .. } => Some(git_ref),
        }
    }

    pub fn format(&self) -> Option<ArchiveKind> {
        match self {
            Self::Hosted { .. } => None,
            Self::Synthetic { format, .. } => Some(*format),
        }
    }

    pub fn is_synthetic(&self) -> bool {
        matches!(self, Self::Synthetic { .. })
    }

    /// Download path of the record: `/<owner>/<repo>/<name>`.
    pub fn url(&self) -> String {
        format!(
            "/{}/{}/{}",
            encode_segment(self.owner()),
            encode_segment(self.repo()),
            encode_segment(self.name())
        )
    }

    /// Owner and repo compare case-insensitively, the file name exactly.
    pub fn matches(&self, owner: &str, repo: &str, name: &str) -> bool {
        self.owner().eq_ignore_ascii_case(owner)
            && self.repo().eq_ignore_ascii_case(repo)
            && self.name() == name
    }
}

impl fmt::Display for AssetRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Version string used in synthetic archive names.
///
/// Strips every `v` from both ends of the tag, so `v1.0.0` becomes `1.0.0`
/// and `1.0.0v` becomes `1.0.0` as well.
pub fn archive_version(tag: &str) -> &str {
    tag.trim_matches('v')
}

pub fn archive_name(repo: &str, tag: &str) -> String {
    format!("{}-{}.tar.gz", repo, archive_version(tag))
}

pub fn is_tarball_name(name: &str) -> bool {
    name.ends_with(".tar.gz")
}
