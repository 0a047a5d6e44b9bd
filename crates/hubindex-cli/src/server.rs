use std::{io::Cursor, sync::Arc, thread};

use hubindex_core::{catalog::Catalog, dispatcher::Dispatcher};
use hubindex_dl::{traits::Platform, types::ByteStream};
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};
use tracing::{debug, error, info, warn};

use crate::{
    error::{ErrorContext, HubError, HubResult},
    router::{self, Route},
};

static FAVICON: &[u8] = include_bytes!("../assets/favicon.ico");

type Reply = Response<ByteStream>;

fn header(name: &str, value: &str) -> Option<Header> {
    Header::from_bytes(name.as_bytes(), value.as_bytes()).ok()
}

fn reply(status: u16, content_type: Option<&str>, body: Vec<u8>) -> Reply {
    let length = body.len();
    let data: ByteStream = Box::new(Cursor::new(body));
    let headers = content_type
        .and_then(|value| header("Content-Type", value))
        .into_iter()
        .collect();
    Response::new(
        StatusCode(status),
        headers,
        data,
        Some(length),
        None,
    )
}

fn empty(status: u16) -> Reply {
    reply(status, None, Vec::new())
}

/// Answers index requests from a catalog.
pub struct IndexServer<P: Platform> {
    catalog: Arc<Catalog<P>>,
    dispatcher: Dispatcher<P>,
}

impl<P: Platform + 'static> IndexServer<P> {
    pub fn new(catalog: Arc<Catalog<P>>) -> Self {
        let dispatcher = Dispatcher::new(Arc::clone(catalog.platform()));
        Self {
            catalog,
            dispatcher,
        }
    }

    pub fn handle(&self, request: Request) {
        info!("{} {}", request.method(), request.url());
        let response = self.respond_to(request.method(), request.url());
        if let Err(err) = request.respond(response) {
            debug!("failed to write response: {}", err);
        }
    }

    fn respond_to(&self, method: &Method, url: &str) -> Reply {
        if *method != Method::Get {
            let mut response = empty(405);
            if let Some(allow) = header("Allow", "GET") {
                response.add_header(allow);
            }
            return response;
        }

        let Some(route) = Route::parse(url) else {
            return empty(404);
        };

        match route {
            Route::Favicon => reply(200, Some("image/x-icon"), FAVICON.to_vec()),
            Route::Asset {
                owner,
                repo,
                name,
            } => self.download(&owner, &repo, &name),
            listing => {
                match router::render(&listing, &self.catalog) {
                    Some(html) => reply(200, Some("text/html; charset=utf-8"), html.into_bytes()),
                    None => empty(404),
                }
            }
        }
    }

    fn download(&self, owner: &str, repo: &str, name: &str) -> Reply {
        let stream = self
            .catalog
            .find(owner, repo, name)
            .and_then(|asset| self.dispatcher.download(&asset));

        match stream {
            Ok(stream) => {
                let headers = header("Content-Type", "application/octet-stream")
                    .into_iter()
                    .collect();
                Response::new(StatusCode(200), headers, stream, None, None)
            }
            Err(err) => {
                if err.is_not_found() {
                    warn!("{}", err);
                } else {
                    error!("{}", err);
                }
                empty(404)
            }
        }
    }
}

/// Serves requests on `workers` threads until the listener shuts down.
pub fn run<P: Platform + 'static>(
    server: Arc<Server>,
    index: Arc<IndexServer<P>>,
    workers: usize,
) -> HubResult<()> {
    let mut handles = Vec::with_capacity(workers);
    for id in 0..workers {
        let server = Arc::clone(&server);
        let index = Arc::clone(&index);
        let handle = thread::Builder::new()
            .name(format!("hubindex-worker-{id}"))
            .spawn(move || {
                for request in server.incoming_requests() {
                    index.handle(request);
                }
            })
            .with_context(|| format!("spawning request worker {id}"))?;
        handles.push(handle);
    }

    for handle in handles {
        if handle.join().is_err() {
            error!("request worker panicked");
        }
    }
    Ok(())
}

pub fn bind(addr: &str) -> HubResult<Server> {
    Server::http(addr).map_err(|source| {
        HubError::Bind {
            addr: addr.to_string(),
            source,
        }
    })
}
