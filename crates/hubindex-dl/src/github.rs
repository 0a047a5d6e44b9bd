use tracing::debug;
use ureq::http::header::{ACCEPT, AUTHORIZATION};

use crate::{
    error::UpstreamError,
    http_client::SHARED_AGENT,
    platform::{encode_ref, encode_segment, ensure_success, fetch_json_pages, redirect_target},
    traits::Platform,
    types::{ArchiveKind, AssetContent, ByteStream, UpstreamAsset, UpstreamRelease, UpstreamTag},
};

pub const API_UPSTREAM: &str = "https://api.github.com";

/// GitHub REST client.
///
/// API calls carry the access token when one is configured. Redirect targets
/// and archive links are fetched anonymously: they are pre-signed and reject
/// foreign credentials.
#[derive(Debug, Clone)]
pub struct Github {
    api_base: String,
    token: Option<String>,
}

impl Default for Github {
    fn default() -> Self {
        Self::new(API_UPSTREAM, None)
    }
}

impl Github {
    pub fn new(api_base: impl Into<String>, token: Option<String>) -> Self {
        let api_base = api_base.into().trim_end_matches('/').to_string();
        Self {
            api_base,
            token: token.filter(|t| !t.is_empty()),
        }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn repo_url(&self, owner: &str, repo: &str, rest: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.api_base,
            encode_segment(owner),
            encode_segment(repo),
            rest
        )
    }

    /// GET on the API with redirects left unfollowed.
    fn call_manual_redirect(
        &self,
        url: &str,
        accept: &str,
    ) -> Result<ureq::http::Response<ureq::Body>, UpstreamError> {
        let mut req = SHARED_AGENT
            .get_manual_redirect(url)
            .header(ACCEPT, accept)
            .header("X-GitHub-Api-Version", "2022-11-28");
        if let Some(token) = &self.token {
            req = req.header(AUTHORIZATION, &format!("Bearer {}", token));
        }
        Ok(req.call()?)
    }
}

impl Platform for Github {
    fn list_releases(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<UpstreamRelease>, UpstreamError> {
        let url = self.repo_url(owner, repo, "releases?per_page=100");
        fetch_json_pages(&url, self.token.as_deref())
    }

    fn list_release_assets(
        &self,
        owner: &str,
        repo: &str,
        release_id: u64,
    ) -> Result<Vec<UpstreamAsset>, UpstreamError> {
        let url = self.repo_url(
            owner,
            repo,
            &format!("releases/{release_id}/assets?per_page=100"),
        );
        fetch_json_pages(&url, self.token.as_deref())
    }

    fn list_tags(&self, owner: &str, repo: &str) -> Result<Vec<UpstreamTag>, UpstreamError> {
        let url = self.repo_url(owner, repo, "tags?per_page=100");
        fetch_json_pages(&url, self.token.as_deref())
    }

    fn download_release_asset(
        &self,
        owner: &str,
        repo: &str,
        asset_id: u64,
    ) -> Result<AssetContent, UpstreamError> {
        let url = self.repo_url(owner, repo, &format!("releases/assets/{asset_id}"));
        let resp = self.call_manual_redirect(&url, "application/octet-stream")?;

        if let Some(location) = redirect_target(&resp, &url)? {
            debug!("asset {} redirected to {}", asset_id, location);
            return Ok(AssetContent::Redirect(location));
        }

        ensure_success(&resp, &url)?;
        Ok(AssetContent::Stream(Box::new(
            resp.into_body().into_reader(),
        )))
    }

    fn archive_link(
        &self,
        owner: &str,
        repo: &str,
        git_ref: &str,
        kind: ArchiveKind,
    ) -> Result<String, UpstreamError> {
        let url = self.repo_url(
            owner,
            repo,
            &format!("{}/{}", kind.as_str(), encode_ref(git_ref)),
        );
        let resp = self.call_manual_redirect(&url, "application/vnd.github+json")?;

        match redirect_target(&resp, &url)? {
            Some(location) => Ok(location),
            None => {
                let status = resp.status().as_u16();
                if resp.status().is_success() {
                    Err(UpstreamError::ExpectedRedirect { status, url })
                } else {
                    Err(UpstreamError::HttpError { status, url })
                }
            }
        }
    }

    fn fetch(&self, url: &str) -> Result<ByteStream, UpstreamError> {
        let resp = SHARED_AGENT.get(url).call()?;
        ensure_success(&resp, url)?;
        Ok(Box::new(resp.into_body().into_reader()))
    }
}
