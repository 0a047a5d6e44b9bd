//! In-memory platform used by the unit tests.

use std::{
    collections::{HashMap, HashSet},
    io::Cursor,
    sync::Mutex,
};

use hubindex_dl::{
    error::UpstreamError,
    traits::Platform,
    types::{ArchiveKind, AssetContent, ByteStream, UpstreamAsset, UpstreamRelease, UpstreamTag},
};

#[derive(Clone)]
pub enum MockContent {
    Stream(Vec<u8>),
    Redirect(String),
}

#[derive(Default, Clone)]
pub struct MockState {
    pub releases: HashMap<String, Vec<UpstreamRelease>>,
    pub assets: HashMap<u64, Vec<UpstreamAsset>>,
    pub tags: HashMap<String, Vec<UpstreamTag>>,
    pub failing_repos: HashSet<String>,
    pub failing_releases: HashSet<u64>,
    pub failing_tags: HashSet<String>,
    pub contents: HashMap<u64, MockContent>,
    pub archive_links: HashMap<String, String>,
    pub urls: HashMap<String, Vec<u8>>,
}

#[derive(Default)]
pub struct MockPlatform {
    state: Mutex<MockState>,
    calls: Mutex<Vec<String>>,
}

fn not_found(url: impl Into<String>) -> UpstreamError {
    UpstreamError::HttpError {
        status: 404,
        url: url.into(),
    }
}

fn server_error(url: impl Into<String>) -> UpstreamError {
    UpstreamError::HttpError {
        status: 500,
        url: url.into(),
    }
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_release(self, repo: &str, id: u64, tag: &str, assets: &[(u64, &str)]) -> Self {
        self.update(|state| {
            state
                .releases
                .entry(repo.to_string())
                .or_default()
                .push(UpstreamRelease {
                    id,
                    tag_name: tag.to_string(),
                });
            state.assets.insert(
                id,
                assets
                    .iter()
                    .map(|(asset_id, name)| {
                        UpstreamAsset {
                            id: *asset_id,
                            name: name.to_string(),
                        }
                    })
                    .collect(),
            );
        });
        self
    }

    pub fn with_tags(self, repo: &str, tags: &[&str]) -> Self {
        self.update(|state| {
            state.tags.insert(
                repo.to_string(),
                tags.iter()
                    .map(|t| {
                        UpstreamTag {
                            name: t.to_string(),
                        }
                    })
                    .collect(),
            );
        });
        self
    }

    pub fn with_content(self, asset_id: u64, content: MockContent) -> Self {
        self.update(|state| {
            state.contents.insert(asset_id, content);
        });
        self
    }

    pub fn with_archive_link(
        self,
        repo: &str,
        kind: ArchiveKind,
        git_ref: &str,
        url: &str,
    ) -> Self {
        self.update(|state| {
            state
                .archive_links
                .insert(format!("{repo}/{kind}/{git_ref}"), url.to_string());
        });
        self
    }

    pub fn with_url(self, url: &str, body: &[u8]) -> Self {
        self.update(|state| {
            state.urls.insert(url.to_string(), body.to_vec());
        });
        self
    }

    pub fn update<F: FnOnce(&mut MockState)>(&self, f: F) {
        f(&mut self.state.lock().unwrap());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count_calls(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Platform for MockPlatform {
    fn list_releases(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<UpstreamRelease>, UpstreamError> {
        let key = format!("{owner}/{repo}");
        self.record(format!("releases {key}"));
        let state = self.state.lock().unwrap();
        if state.failing_repos.contains(&key) {
            return Err(server_error(key));
        }
        Ok(state.releases.get(&key).cloned().unwrap_or_default())
    }

    fn list_release_assets(
        &self,
        owner: &str,
        repo: &str,
        release_id: u64,
    ) -> Result<Vec<UpstreamAsset>, UpstreamError> {
        self.record(format!("assets {owner}/{repo} {release_id}"));
        let state = self.state.lock().unwrap();
        if state.failing_releases.contains(&release_id) {
            return Err(server_error(format!("release {release_id}")));
        }
        Ok(state.assets.get(&release_id).cloned().unwrap_or_default())
    }

    fn list_tags(&self, owner: &str, repo: &str) -> Result<Vec<UpstreamTag>, UpstreamError> {
        let key = format!("{owner}/{repo}");
        self.record(format!("tags {key}"));
        let state = self.state.lock().unwrap();
        if state.failing_tags.contains(&key) {
            return Err(server_error(key));
        }
        Ok(state.tags.get(&key).cloned().unwrap_or_default())
    }

    fn download_release_asset(
        &self,
        owner: &str,
        repo: &str,
        asset_id: u64,
    ) -> Result<AssetContent, UpstreamError> {
        self.record(format!("download {owner}/{repo} {asset_id}"));
        let state = self.state.lock().unwrap();
        match state.contents.get(&asset_id) {
            Some(MockContent::Stream(bytes)) => {
                Ok(AssetContent::Stream(Box::new(Cursor::new(bytes.clone()))))
            }
            Some(MockContent::Redirect(url)) => Ok(AssetContent::Redirect(url.clone())),
            None => Err(not_found(format!("asset {asset_id}"))),
        }
    }

    fn archive_link(
        &self,
        owner: &str,
        repo: &str,
        git_ref: &str,
        kind: ArchiveKind,
    ) -> Result<String, UpstreamError> {
        let key = format!("{owner}/{repo}/{kind}/{git_ref}");
        self.record(format!("archive {key}"));
        let state = self.state.lock().unwrap();
        state
            .archive_links
            .get(&key)
            .cloned()
            .ok_or_else(|| not_found(key))
    }

    fn fetch(&self, url: &str) -> Result<ByteStream, UpstreamError> {
        self.record(format!("fetch {url}"));
        let state = self.state.lock().unwrap();
        match state.urls.get(url) {
            Some(body) => Ok(Box::new(Cursor::new(body.clone()))),
            None => Err(not_found(url)),
        }
    }
}
