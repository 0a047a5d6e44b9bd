use crate::{
    error::UpstreamError,
    types::{ArchiveKind, AssetContent, ByteStream, UpstreamAsset, UpstreamRelease, UpstreamTag},
};

/// Operations hubindex needs from a source-control platform.
///
/// Every call is blocking. Listing calls return items in upstream order.
pub trait Platform: Send + Sync {
    fn list_releases(&self, owner: &str, repo: &str)
        -> Result<Vec<UpstreamRelease>, UpstreamError>;

    fn list_release_assets(
        &self,
        owner: &str,
        repo: &str,
        release_id: u64,
    ) -> Result<Vec<UpstreamAsset>, UpstreamError>;

    fn list_tags(&self, owner: &str, repo: &str) -> Result<Vec<UpstreamTag>, UpstreamError>;

    /// Requests the binary content of a release asset.
    fn download_release_asset(
        &self,
        owner: &str,
        repo: &str,
        asset_id: u64,
    ) -> Result<AssetContent, UpstreamError>;

    /// Returns the URL the platform generated for a source archive of `git_ref`.
    fn archive_link(
        &self,
        owner: &str,
        repo: &str,
        git_ref: &str,
        kind: ArchiveKind,
    ) -> Result<String, UpstreamError>;

    /// Plain GET of an arbitrary URL, without platform credentials.
    fn fetch(&self, url: &str) -> Result<ByteStream, UpstreamError>;
}
