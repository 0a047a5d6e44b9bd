use std::sync::LazyLock;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use regex::Regex;
use tracing::trace;
use ureq::{
    http::{
        header::{ACCEPT, AUTHORIZATION, LINK, LOCATION},
        Response,
    },
    Body,
};
use url::Url;

use crate::{error::UpstreamError, http_client::SHARED_AGENT};

/// Characters escaped when a value is placed into a single URL path segment.
pub const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Like [`PATH_SEGMENT`] but keeps `/`, for git refs such as `release/1.0`.
pub const GIT_REF: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

static NEXT_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<([^>]+)>\s*;\s*rel="next""#).expect("unable to compile link header regex")
});

pub fn encode_segment(value: &str) -> String {
    utf8_percent_encode(value, PATH_SEGMENT).to_string()
}

pub fn encode_ref(value: &str) -> String {
    utf8_percent_encode(value, GIT_REF).to_string()
}

/// Extracts the `rel="next"` target from a `Link` response header.
pub fn next_page_link(header: &str) -> Option<String> {
    NEXT_LINK_RE
        .captures(header)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Resolves a `Location` header value against the URL that produced it.
pub fn resolve_location(base: &str, location: &str) -> Result<String, UpstreamError> {
    let base = Url::parse(base).map_err(|source| {
        UpstreamError::InvalidUrl {
            url: base.to_string(),
            source,
        }
    })?;
    base.join(location)
        .map(String::from)
        .map_err(|source| {
            UpstreamError::InvalidUrl {
                url: location.to_string(),
                source,
            }
        })
}

/// Returns the resolved `Location` of a redirect response, `None` if the
/// response is not a redirect.
pub fn redirect_target(
    resp: &Response<Body>,
    url: &str,
) -> Result<Option<String>, UpstreamError> {
    if !resp.status().is_redirection() {
        return Ok(None);
    }

    let location = resp
        .headers()
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            UpstreamError::MissingLocation {
                url: url.to_string(),
            }
        })?;

    resolve_location(url, location).map(Some)
}

pub fn ensure_success(resp: &Response<Body>, url: &str) -> Result<(), UpstreamError> {
    let status = resp.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(UpstreamError::HttpError {
            status: status.as_u16(),
            url: url.to_string(),
        })
    }
}

/// Fetches a JSON array endpoint, following `Link: rel="next"` pagination
/// until the last page.
pub fn fetch_json_pages<T>(url: &str, token: Option<&str>) -> Result<Vec<T>, UpstreamError>
where
    T: serde::de::DeserializeOwned,
{
    let mut items = Vec::new();
    let mut next = Some(url.to_string());

    while let Some(page_url) = next.take() {
        trace!("fetching {}", page_url);

        let mut req = SHARED_AGENT
            .get(&page_url)
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");
        if let Some(token) = token {
            req = req.header(AUTHORIZATION, &format!("Bearer {}", token));
        }

        let mut resp = req.call()?;
        ensure_success(&resp, &page_url)?;

        next = resp
            .headers()
            .get(LINK)
            .and_then(|value| value.to_str().ok())
            .and_then(next_page_link);

        let page: Vec<T> = resp.body_mut().read_json().map_err(|_| {
            UpstreamError::InvalidResponse {
                url: page_url.clone(),
            }
        })?;
        items.extend(page);
    }

    Ok(items)
}
