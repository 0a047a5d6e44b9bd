use std::sync::Arc;

use hubindex_dl::{
    error::UpstreamError,
    traits::Platform,
    types::{AssetContent, ByteStream},
};
use tracing::debug;

use crate::{asset::AssetRecord, error::CatalogError, CatalogResult};

/// Streams the bytes behind an [`AssetRecord`].
pub struct Dispatcher<P: Platform> {
    platform: Arc<P>,
}

impl<P: Platform> Dispatcher<P> {
    pub fn new(platform: Arc<P>) -> Self {
        Self { platform }
    }

    /// Opens the content of `asset`.
    ///
    /// Synthetic records ask the platform for an archive link and fetch it.
    /// Hosted records are requested by id; if the platform answers with a
    /// redirect, the target is fetched without credentials. Nothing is
    /// buffered: the caller reads the returned stream.
    pub fn download(&self, asset: &AssetRecord) -> CatalogResult<ByteStream> {
        let result = match asset {
            AssetRecord::Synthetic {
                owner,
                repo,
                git_ref,
                format,
                ..
            } => {
                self.platform
                    .archive_link(owner, repo, git_ref, *format)
                    .and_then(|link| {
                        debug!("{}: fetching {} archive from {}", asset, format, link);
                        self.platform.fetch(&link)
                    })
            }
            AssetRecord::Hosted {
                id, owner, repo, ..
            } => {
                self.platform
                    .download_release_asset(owner, repo, *id)
                    .and_then(|content| {
                        match content {
                            AssetContent::Stream(stream) => Ok(stream),
                            AssetContent::Redirect(target) => {
                                debug!("{}: following redirect to {}", asset, target);
                                self.platform.fetch(&target)
                            }
                        }
                    })
            }
        };

        result.map_err(|source| retrieval(asset, source))
    }
}

fn retrieval(asset: &AssetRecord, source: UpstreamError) -> CatalogError {
    CatalogError::Retrieval {
        name: asset.name().to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use hubindex_dl::types::ArchiveKind;

    use super::*;
    use crate::testing::{MockContent, MockPlatform};

    fn read_all(mut stream: ByteStream) -> Vec<u8> {
        let mut buf = Vec::new();
        stream.read_to_end(&mut buf).unwrap();
        buf
    }

    #[test]
    fn test_hosted_redirect_is_followed() {
        let platform = Arc::new(
            MockPlatform::new()
                .with_content(
                    42,
                    MockContent::Redirect("https://objects.example/42".into()),
                )
                .with_url("https://objects.example/42", b"wheel bytes"),
        );
        let dispatcher = Dispatcher::new(Arc::clone(&platform));
        let asset = AssetRecord::hosted(42, "widget-2.0.0-py3-none-any.whl", "acme", "widget");

        let body = read_all(dispatcher.download(&asset).unwrap());

        assert_eq!(body, b"wheel bytes");
        assert_eq!(
            platform.calls(),
            vec![
                "download acme/widget 42",
                "fetch https://objects.example/42"
            ]
        );
    }

    #[test]
    fn test_hosted_direct_stream() {
        let platform =
            Arc::new(MockPlatform::new().with_content(7, MockContent::Stream(b"direct".to_vec())));
        let dispatcher = Dispatcher::new(Arc::clone(&platform));
        let asset = AssetRecord::hosted(7, "a.whl", "acme", "widget");

        assert_eq!(read_all(dispatcher.download(&asset).unwrap()), b"direct");
        assert_eq!(platform.count_calls("fetch"), 0);
    }

    #[test]
    fn test_synthetic_fetches_archive_link() {
        let platform = Arc::new(
            MockPlatform::new()
                .with_archive_link(
                    "acme/widget",
                    ArchiveKind::Tarball,
                    "v2.0.0",
                    "https://codeload.example/acme/widget/tar.gz/v2.0.0",
                )
                .with_url(
                    "https://codeload.example/acme/widget/tar.gz/v2.0.0",
                    b"tarball",
                ),
        );
        let dispatcher = Dispatcher::new(Arc::clone(&platform));
        let asset = AssetRecord::synthetic_tarball("acme", "widget", "v2.0.0");

        assert_eq!(read_all(dispatcher.download(&asset).unwrap()), b"tarball");
        assert_eq!(
            platform.calls(),
            vec![
                "archive acme/widget/tarball/v2.0.0",
                "fetch https://codeload.example/acme/widget/tar.gz/v2.0.0"
            ]
        );
    }

    #[test]
    fn test_synthetic_uses_record_format() {
        let platform = Arc::new(
            MockPlatform::new()
                .with_archive_link("acme/widget", ArchiveKind::Zipball, "v1", "https://z/1")
                .with_url("https://z/1", b"zip"),
        );
        let dispatcher = Dispatcher::new(platform);
        let asset = AssetRecord::Synthetic {
            name: "widget-1.zip".into(),
            owner: "acme".into(),
            repo: "widget".into(),
            git_ref: "v1".into(),
            format: ArchiveKind::Zipball,
        };

        assert_eq!(read_all(dispatcher.download(&asset).unwrap()), b"zip");
    }

    #[test]
    fn test_archive_link_failure_is_not_found() {
        let platform = Arc::new(MockPlatform::new());
        let dispatcher = Dispatcher::new(Arc::clone(&platform));
        let asset = AssetRecord::synthetic_tarball("acme", "widget", "v9");

        let err = dispatcher.download(&asset).err().unwrap();
        assert!(err.is_not_found());
        assert!(matches!(err, CatalogError::Retrieval { ref name, .. } if name == "widget-9.tar.gz"));
        assert_eq!(platform.count_calls("fetch"), 0);
    }

    #[test]
    fn test_redirect_fetch_failure_is_not_found() {
        let platform = Arc::new(
            MockPlatform::new()
                .with_content(42, MockContent::Redirect("https://objects.example/gone".into())),
        );
        let dispatcher = Dispatcher::new(platform);
        let asset = AssetRecord::hosted(42, "a.whl", "acme", "widget");

        assert!(dispatcher.download(&asset).err().unwrap().is_not_found());
    }

    #[test]
    fn test_unknown_hosted_asset_is_not_found() {
        let dispatcher = Dispatcher::new(Arc::new(MockPlatform::new()));
        let asset = AssetRecord::hosted(1, "a.whl", "acme", "widget");

        assert!(dispatcher.download(&asset).err().unwrap().is_not_found());
    }
}
