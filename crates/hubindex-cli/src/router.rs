//! URL routing and HTML rendering of the index pages.
//!
//! Owner and repository segments match case-insensitively; asset names match
//! exactly.

use hubindex_core::{asset::AssetRecord, catalog::Catalog};
use hubindex_dl::{platform::encode_segment, traits::Platform};
use percent_encoding::percent_decode_str;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Favicon,
    /// Every asset of every repository.
    Index,
    /// The simple-repository project list.
    Simple,
    SimpleProject(String),
    Owner(String),
    Repo {
        owner: String,
        repo: String,
    },
    Asset {
        owner: String,
        repo: String,
        name: String,
    },
}

fn decode(segment: &str) -> Option<String> {
    percent_decode_str(segment)
        .decode_utf8()
        .ok()
        .map(|s| s.into_owned())
}

impl Route {
    /// Matches a request URL. Query strings are ignored; a single trailing
    /// slash is accepted on listing pages but not on downloads.
    pub fn parse(url: &str) -> Option<Self> {
        let path = url.split(['?', '#']).next().unwrap_or_default();
        let rest = path.strip_prefix('/')?;
        if rest.is_empty() {
            return Some(Self::Index);
        }

        let mut segments = rest.split('/').map(decode).collect::<Option<Vec<_>>>()?;
        let trailing_slash = segments.last().is_some_and(String::is_empty);
        if trailing_slash {
            segments.pop();
        }
        if segments.iter().any(String::is_empty) {
            return None;
        }

        let route = match segments.as_slice() {
            [icon] if icon == "favicon.ico" && !trailing_slash => Self::Favicon,
            [simple] if simple == "simple" => Self::Simple,
            [simple, repo] if simple == "simple" => Self::SimpleProject(repo.to_lowercase()),
            [owner] => Self::Owner(owner.to_lowercase()),
            [owner, repo] => {
                Self::Repo {
                    owner: owner.to_lowercase(),
                    repo: repo.to_lowercase(),
                }
            }
            [owner, repo, name] if !trailing_slash => {
                Self::Asset {
                    owner: owner.to_lowercase(),
                    repo: repo.to_lowercase(),
                    name: name.clone(),
                }
            }
            _ => return None,
        };
        Some(route)
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

struct Page {
    html: String,
}

impl Page {
    fn new(title: &str, simple_api: bool) -> Self {
        let mut html = format!("<html><head><title>{}</title>", escape_html(title));
        if simple_api {
            html.push_str("<meta name=\"api-version\" value=\"2\" />");
        }
        html.push_str("</head><body>");
        Self {
            html,
        }
    }

    fn heading(mut self, text: &str) -> Self {
        self.html
            .push_str(&format!("<h1>{}</h1>", escape_html(text)));
        self
    }

    fn link(&mut self, href: &str, text: &str) {
        self.html.push_str(&format!(
            "<a href=\"{}\">{}</a> ",
            escape_html(href),
            escape_html(text)
        ));
    }

    fn assets(mut self, assets: &[AssetRecord]) -> Self {
        for asset in assets {
            self.link(&asset.url(), asset.name());
        }
        self
    }

    fn finish(mut self) -> String {
        self.html.push_str("</body></html>");
        self.html
    }
}

/// Renders a listing page, or `None` for routes that are not listings.
pub fn render<P: Platform + 'static>(route: &Route, catalog: &Catalog<P>) -> Option<String> {
    let html = match route {
        Route::Index => {
            Page::new("Links for all projects", false)
                .heading("Links for all projects")
                .assets(&catalog.assets())
                .finish()
        }
        Route::Simple => {
            let mut page = Page::new("Simple index", true);
            for project in catalog.projects() {
                page.link(&format!("/simple/{}", encode_segment(&project)), &project);
            }
            page.finish()
        }
        Route::SimpleProject(repo) => {
            Page::new(&format!("Links for {repo}"), true)
                .heading(&format!("Links for {repo}"))
                .assets(&catalog.by_project(repo))
                .finish()
        }
        Route::Owner(owner) => {
            Page::new(&format!("Packages for {owner}"), false)
                .heading(&format!("Links for {owner} projects"))
                .assets(&catalog.by_owner(owner))
                .finish()
        }
        Route::Repo {
            owner,
            repo,
        } => {
            Page::new(&format!("Packages for {owner}/{repo}"), false)
                .heading(&format!("Links for {owner}/{repo}"))
                .assets(&catalog.by_repo(owner, repo))
                .finish()
        }
        Route::Favicon | Route::Asset { .. } => return None,
    };
    Some(html)
}
