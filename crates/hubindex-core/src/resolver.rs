use std::{collections::HashSet, sync::Arc};

use hubindex_dl::{error::UpstreamError, traits::Platform};
use tracing::debug;

use crate::{
    asset::{is_tarball_name, AssetRecord},
    error::CatalogError,
    repo::RepoSpec,
    CatalogResult,
};

/// Turns one tracked repository into its asset records.
pub struct Resolver<P: Platform> {
    platform: Arc<P>,
}

/// Accumulates records for one repository, dropping repeated names.
struct RepoAssets<'a> {
    spec: &'a RepoSpec,
    seen: HashSet<String>,
    records: Vec<AssetRecord>,
}

impl<'a> RepoAssets<'a> {
    fn new(spec: &'a RepoSpec) -> Self {
        Self {
            spec,
            seen: HashSet::new(),
            records: Vec::new(),
        }
    }

    fn push(&mut self, record: AssetRecord) {
        if self.seen.insert(record.name().to_string()) {
            self.records.push(record);
        } else {
            debug!(
                "skipping duplicate asset name {} in {}",
                record.name(),
                self.spec
            );
        }
    }
}

impl<P: Platform> Resolver<P> {
    pub fn new(platform: Arc<P>) -> Self {
        Self { platform }
    }

    pub fn platform(&self) -> &Arc<P> {
        &self.platform
    }

    /// Lists every downloadable asset of `spec`.
    ///
    /// Each release contributes its uploads, plus a synthetic tarball of its
    /// tag when none of the uploads is a `.tar.gz`. A repository without any
    /// release contributes one synthetic tarball per tag instead. Any failing
    /// listing call fails the whole repository.
    pub fn resolve(&self, spec: &RepoSpec) -> CatalogResult<Vec<AssetRecord>> {
        let releases = self
            .platform
            .list_releases(&spec.owner, &spec.repo)
            .map_err(|source| upstream(spec, source))?;

        if releases.is_empty() {
            debug!("{} has no releases, falling back to tags", spec);
            return self.resolve_tags(spec);
        }

        let mut assets = RepoAssets::new(spec);
        for release in &releases {
            let uploads = self
                .platform
                .list_release_assets(&spec.owner, &spec.repo, release.id)
                .map_err(|source| upstream(spec, source))?;

            let has_tarball = uploads.iter().any(|a| is_tarball_name(&a.name));

            for upload in uploads {
                assets.push(AssetRecord::hosted(
                    upload.id,
                    upload.name,
                    &spec.owner,
                    &spec.repo,
                ));
            }

            if !has_tarball {
                assets.push(AssetRecord::synthetic_tarball(
                    &spec.owner,
                    &spec.repo,
                    &release.tag_name,
                ));
            }
        }

        Ok(assets.records)
    }

    fn resolve_tags(&self, spec: &RepoSpec) -> CatalogResult<Vec<AssetRecord>> {
        let tags = self
            .platform
            .list_tags(&spec.owner, &spec.repo)
            .map_err(|source| upstream(spec, source))?;

        let mut assets = RepoAssets::new(spec);
        for tag in &tags {
            assets.push(AssetRecord::synthetic_tarball(
                &spec.owner,
                &spec.repo,
                &tag.name,
            ));
        }

        Ok(assets.records)
    }
}

fn upstream(spec: &RepoSpec, source: UpstreamError) -> CatalogError {
    CatalogError::Upstream {
        repository: spec.to_string(),
        source,
    }
}
