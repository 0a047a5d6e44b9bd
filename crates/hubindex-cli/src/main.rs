use std::sync::Arc;

use clap::Parser;
use cli::{Args, Commands};
use error::HubResult;
use hubindex_config::config::{self, generate_default_config, Config, Overrides};
use hubindex_core::{catalog::Catalog, repo::RepoSpec};
use hubindex_dl::{error::UpstreamError, github::Github, http_client::configure_http_client};
use logging::setup_logging;
use server::IndexServer;
use tracing::{debug, error, info, warn};
use ureq::{
    http::{HeaderMap, HeaderName, HeaderValue},
    Proxy,
};
use utils::disable_color;

mod cli;
mod error;
mod list;
mod logging;
mod router;
mod server;
mod utils;

#[cfg(test)]
mod fixture;

fn overrides(args: &Args, repositories: Vec<String>) -> Overrides {
    Overrides {
        username: args.username.clone(),
        access_token: args.access_token.clone(),
        bind: args.bind.clone(),
        repositories,
    }
}

/// Parses `Name: value` pairs, skipping malformed entries.
fn parse_headers(raw: &[String]) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for entry in raw {
        let parsed = entry.split_once(':').and_then(|(key, value)| {
            let name = HeaderName::from_bytes(key.trim().as_bytes()).ok()?;
            let value = HeaderValue::from_str(value.trim()).ok()?;
            Some((name, value))
        });
        match parsed {
            Some((name, value)) => {
                headers.append(name, value);
            }
            None => warn!("ignoring malformed header `{}`", entry),
        }
    }
    headers
}

fn configure_client(args: &Args, config: &Config) -> HubResult<()> {
    let proxy = args
        .proxy
        .as_deref()
        .map(Proxy::new)
        .transpose()
        .map_err(UpstreamError::from)?;
    let user_agent = args.user_agent.clone();
    let headers = args.header.as_deref().map(parse_headers);
    let timeout = config.timeout();

    configure_http_client(|client| {
        if proxy.is_some() {
            client.proxy = proxy;
        }
        if let Some(user_agent) = user_agent {
            client.user_agent = Some(user_agent);
        }
        if headers.is_some() {
            client.headers = headers;
        }
        client.timeout = timeout;
    });
    Ok(())
}

fn build_catalog(config: &Config) -> HubResult<Catalog<Github>> {
    let platform = Github::new(config.api_url(), config.access_token().map(String::from));
    let repositories = RepoSpec::parse_all(&config.repositories, config.username())?;
    if repositories.is_empty() {
        warn!("no repositories configured, the index will be empty");
    }
    debug!(
        "tracking {}",
        repositories
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(Catalog::new(Arc::new(platform), repositories))
}

async fn serve(config: Config) -> HubResult<()> {
    let catalog = Arc::new(build_catalog(&config)?);
    let server = Arc::new(server::bind(config.bind())?);

    // A failed first refresh still serves, with an empty index.
    if let Err(err) = catalog.refresh().await {
        error!("initial refresh failed: {}", err);
    }
    catalog.start_refresh_cycle(config.refresh_interval());

    info!(
        "serving {} repositories on http://{} with {} workers",
        catalog.repositories().len(),
        config.bind(),
        config.workers()
    );

    let index = Arc::new(IndexServer::new(Arc::clone(&catalog)));
    let workers = config.workers();
    let served = tokio::task::spawn_blocking(move || server::run(server, index, workers)).await?;

    catalog.stop_refresh_cycle();
    info!("index server stopped");
    served
}

async fn handle_cli() -> HubResult<()> {
    let args = Args::parse();

    setup_logging(&args);

    if args.no_color {
        disable_color();
    }

    let config_path = config::config_path(args.config.as_deref());

    match args.command {
        Commands::DefConfig => generate_default_config(&config_path)?,
        Commands::Serve {
            ref repositories,
        } => {
            let config = config::init(&config_path, overrides(&args, repositories.clone()))?;
            configure_client(&args, &config)?;
            serve(config).await?;
        }
        Commands::List {
            ref repositories,
        } => {
            let config = config::init(&config_path, overrides(&args, repositories.clone()))?;
            configure_client(&args, &config)?;
            let catalog = build_catalog(&config)?;
            let json = args.json;
            tokio::task::spawn_blocking(move || list::list_assets(&catalog, json)).await??;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))
    .ok();

    if let Err(err) = handle_cli().await {
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_headers() {
        let headers = parse_headers(&[
            "X-Trace: abc".to_string(),
            "broken".to_string(),
            "Bad Name: x".to_string(),
            "Accept-Language:en".to_string(),
        ]);

        assert_eq!(headers.len(), 2);
        assert_eq!(headers["x-trace"], "abc");
        assert_eq!(headers["accept-language"], "en");
    }

    #[test]
    fn test_overrides_from_args() {
        let args = Args::parse_from(["hubindex", "-u", "acme", "-a", "secret", "list", "tool"]);
        let overrides = overrides(&args, vec!["tool".to_string()]);

        assert_eq!(overrides.username.as_deref(), Some("acme"));
        assert_eq!(overrides.access_token.as_deref(), Some("secret"));
        assert_eq!(overrides.bind, None);
        assert_eq!(overrides.repositories, vec!["tool"]);
    }
}
