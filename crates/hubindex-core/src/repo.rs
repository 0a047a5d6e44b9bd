use std::{collections::HashSet, fmt};

use tracing::debug;

use crate::{error::CatalogError, CatalogResult};

/// A tracked repository with its owner resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSpec {
    pub owner: String,
    pub repo: String,
}

impl RepoSpec {
    /// Parses `owner/repo`, or a bare `repo` owned by `default_owner`.
    ///
    /// ```
    /// use hubindex_core::repo::RepoSpec;
    ///
    /// let spec = RepoSpec::parse("widget", "acme").unwrap();
    /// assert_eq!(spec.to_string(), "acme/widget");
    /// ```
    pub fn parse(spec: &str, default_owner: &str) -> CatalogResult<Self> {
        let spec = spec.trim();
        let (owner, repo) = match spec.split_once('/') {
            Some((owner, repo)) => (owner, repo),
            None => (default_owner, spec),
        };

        if owner.is_empty() || repo.is_empty() || repo.contains('/') {
            return Err(CatalogError::InvalidRepository(spec.to_string()));
        }

        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }

    /// Parses every entry in order. Entries naming a repository already seen,
    /// compared case-insensitively after the default owner is applied, are
    /// dropped so each repository is resolved once.
    pub fn parse_all<I, S>(specs: I, default_owner: &str) -> CatalogResult<Vec<Self>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut parsed = Vec::new();
        for spec in specs {
            let spec = Self::parse(spec.as_ref(), default_owner)?;
            if seen.insert(spec.key()) {
                parsed.push(spec);
            } else {
                debug!("skipping repeated repository {}", spec);
            }
        }
        Ok(parsed)
    }

    fn key(&self) -> (String, String) {
        (self.owner.to_lowercase(), self.repo.to_lowercase())
    }
}

impl fmt::Display for RepoSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}
