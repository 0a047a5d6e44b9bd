//! Fixed upstream state for router and server tests.

use std::{collections::HashMap, io::Cursor, sync::Arc};

use hubindex_core::{catalog::Catalog, repo::RepoSpec};
use hubindex_dl::{
    error::UpstreamError,
    traits::Platform,
    types::{ArchiveKind, AssetContent, ByteStream, UpstreamAsset, UpstreamRelease, UpstreamTag},
};

#[derive(Default)]
pub struct FixturePlatform {
    releases: HashMap<String, Vec<(UpstreamRelease, Vec<UpstreamAsset>)>>,
    tags: HashMap<String, Vec<UpstreamTag>>,
    redirects: HashMap<u64, String>,
    bodies: HashMap<String, Vec<u8>>,
}

fn missing(what: String) -> UpstreamError {
    UpstreamError::HttpError {
        status: 404,
        url: what,
    }
}

impl FixturePlatform {
    /// `Acme/Widget` has release `v2.0.0` with a wheel (id 42) served through
    /// a redirect; `acme/tool` has no releases and tags `v1.0` and `v1.1`.
    pub fn sample() -> Self {
        let mut platform = Self::default();
        platform.releases.insert(
            "Acme/Widget".into(),
            vec![(
                UpstreamRelease {
                    id: 1,
                    tag_name: "v2.0.0".into(),
                },
                vec![UpstreamAsset {
                    id: 42,
                    name: "widget-2.0.0-py3-none-any.whl".into(),
                }],
            )],
        );
        platform.tags.insert(
            "acme/tool".into(),
            vec![
                UpstreamTag {
                    name: "v1.0".into(),
                },
                UpstreamTag {
                    name: "v1.1".into(),
                },
            ],
        );
        platform
            .redirects
            .insert(42, "https://objects.example/42".into());
        platform
            .bodies
            .insert("https://objects.example/42".into(), b"wheel bytes".to_vec());
        platform.bodies.insert(
            "https://codeload.example/acme/tool/tarball/v1.0".into(),
            b"tool tarball".to_vec(),
        );
        platform
    }

    /// A refreshed catalog over [`FixturePlatform::sample`].
    pub fn catalog() -> Arc<Catalog<FixturePlatform>> {
        let repos = RepoSpec::parse_all(["Acme/Widget", "tool"], "acme").unwrap();
        let catalog = Arc::new(Catalog::new(Arc::new(Self::sample()), repos));
        catalog.refresh_all().unwrap();
        catalog
    }
}

impl Platform for FixturePlatform {
    fn list_releases(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<UpstreamRelease>, UpstreamError> {
        Ok(self
            .releases
            .get(&format!("{owner}/{repo}"))
            .map(|releases| releases.iter().map(|(r, _)| r.clone()).collect())
            .unwrap_or_default())
    }

    fn list_release_assets(
        &self,
        owner: &str,
        repo: &str,
        release_id: u64,
    ) -> Result<Vec<UpstreamAsset>, UpstreamError> {
        self.releases
            .get(&format!("{owner}/{repo}"))
            .and_then(|releases| releases.iter().find(|(r, _)| r.id == release_id))
            .map(|(_, assets)| assets.clone())
            .ok_or_else(|| missing(format!("release {release_id}")))
    }

    fn list_tags(&self, owner: &str, repo: &str) -> Result<Vec<UpstreamTag>, UpstreamError> {
        Ok(self
            .tags
            .get(&format!("{owner}/{repo}"))
            .cloned()
            .unwrap_or_default())
    }

    fn download_release_asset(
        &self,
        _owner: &str,
        _repo: &str,
        asset_id: u64,
    ) -> Result<AssetContent, UpstreamError> {
        self.redirects
            .get(&asset_id)
            .map(|url| AssetContent::Redirect(url.clone()))
            .ok_or_else(|| missing(format!("asset {asset_id}")))
    }

    fn archive_link(
        &self,
        owner: &str,
        repo: &str,
        git_ref: &str,
        kind: ArchiveKind,
    ) -> Result<String, UpstreamError> {
        Ok(format!(
            "https://codeload.example/{owner}/{repo}/{kind}/{git_ref}"
        ))
    }

    fn fetch(&self, url: &str) -> Result<ByteStream, UpstreamError> {
        self.bodies
            .get(url)
            .map(|body| Box::new(Cursor::new(body.clone())) as ByteStream)
            .ok_or_else(|| missing(url.to_string()))
    }
}
