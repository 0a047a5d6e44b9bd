use std::{
    sync::{Arc, LazyLock, PoisonError, RwLock},
    time::Duration,
};

use ureq::{
    http::{self, HeaderMap, Uri},
    typestate::WithoutBody,
    Agent, Proxy, RequestBuilder,
};

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub user_agent: Option<String>,
    pub headers: Option<HeaderMap>,
    pub proxy: Option<Proxy>,
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    /// Defaults to a `hubindex/<version>` user agent with no proxy, extra
    /// headers or timeout.
    fn default() -> Self {
        Self {
            user_agent: Some(concat!("hubindex/", env!("CARGO_PKG_VERSION")).into()),
            proxy: None,
            headers: None,
            timeout: None,
        }
    }
}

impl ClientConfig {
    /// Builds an `Agent` that follows redirects.
    ///
    /// Non-2xx statuses are returned as responses rather than errors so that
    /// callers can report the status and URL themselves.
    pub fn build(&self) -> Agent {
        self.agent(true)
    }

    /// Builds an `Agent` that hands 3xx responses back to the caller instead
    /// of following them. Used where the redirect target itself is the answer.
    pub fn build_manual_redirect(&self) -> Agent {
        self.agent(false)
    }

    fn agent(&self, follow_redirects: bool) -> Agent {
        let mut config = ureq::Agent::config_builder()
            .proxy(self.proxy.clone())
            .timeout_global(self.timeout)
            .http_status_as_error(false);

        if !follow_redirects {
            config = config.max_redirects(0).max_redirects_will_error(false);
        }

        if let Some(user_agent) = &self.user_agent {
            config = config.user_agent(user_agent);
        }

        config.build().into()
    }
}

struct SharedClient {
    agent: Agent,
    manual_redirect_agent: Agent,
    config: ClientConfig,
}

impl SharedClient {
    fn from_config(config: ClientConfig) -> Self {
        Self {
            agent: config.build(),
            manual_redirect_agent: config.build_manual_redirect(),
            config,
        }
    }
}

static SHARED_CLIENT_STATE: LazyLock<Arc<RwLock<SharedClient>>> =
    LazyLock::new(|| Arc::new(RwLock::new(SharedClient::from_config(ClientConfig::default()))));

#[derive(Clone, Default)]
pub struct SharedAgent;

impl SharedAgent {
    pub fn new() -> Self {
        Self
    }

    /// Creates a GET request on the redirect-following agent with the
    /// globally configured headers applied.
    pub fn get<T>(&self, uri: T) -> RequestBuilder<WithoutBody>
    where
        Uri: TryFrom<T>,
        <Uri as TryFrom<T>>::Error: Into<http::Error>,
    {
        let state = SHARED_CLIENT_STATE
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let req = state.agent.get(uri);
        apply_headers(req, &state.config.headers)
    }

    /// Creates a GET request whose 3xx response is returned unfollowed.
    pub fn get_manual_redirect<T>(&self, uri: T) -> RequestBuilder<WithoutBody>
    where
        Uri: TryFrom<T>,
        <Uri as TryFrom<T>>::Error: Into<http::Error>,
    {
        let state = SHARED_CLIENT_STATE
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let req = state.manual_redirect_agent.get(uri);
        apply_headers(req, &state.config.headers)
    }
}

fn apply_headers<B>(mut req: RequestBuilder<B>, headers: &Option<HeaderMap>) -> RequestBuilder<B> {
    if let Some(headers) = headers {
        for (key, value) in headers.iter() {
            req = req.header(key, value);
        }
    }
    req
}

pub static SHARED_AGENT: LazyLock<SharedAgent> = LazyLock::new(SharedAgent::new);

/// Rebuilds both shared agents after applying `updater` to a copy of the
/// current configuration.
///
/// ```
/// use hubindex_dl::http_client::configure_http_client;
///
/// configure_http_client(|cfg| {
///     cfg.user_agent = Some("my-index/1.0".to_string());
/// });
/// ```
pub fn configure_http_client<F>(updater: F)
where
    F: FnOnce(&mut ClientConfig),
{
    let mut state = SHARED_CLIENT_STATE
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    let mut new_config = state.config.clone();
    updater(&mut new_config);
    *state = SharedClient::from_config(new_config);
}
