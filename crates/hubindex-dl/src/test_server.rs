//! A local HTTP upstream answering with canned responses.

use std::{
    io::Cursor,
    sync::{Arc, Mutex},
    thread,
};

use tiny_http::{Header, Response, Server, StatusCode};

pub type Reply = Response<Cursor<Vec<u8>>>;

/// A request as the upstream received it.
#[derive(Debug, Clone)]
pub struct Seen {
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl Seen {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(field, _)| field.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

pub struct TestServer {
    base: String,
    seen: Arc<Mutex<Vec<Seen>>>,
}

impl TestServer {
    /// Serves every request with `handler(base, url)` on a background thread.
    pub fn start<F>(handler: F) -> Self
    where
        F: Fn(&str, &str) -> Reply + Send + 'static,
    {
        let server = Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        let base = format!("http://{addr}");
        let seen = Arc::new(Mutex::new(Vec::new()));

        let log = Arc::clone(&seen);
        let origin = base.clone();
        thread::spawn(move || {
            for request in server.incoming_requests() {
                let url = request.url().to_string();
                log.lock().unwrap().push(Seen {
                    url: url.clone(),
                    headers: request
                        .headers()
                        .iter()
                        .map(|h| (h.field.to_string(), h.value.to_string()))
                        .collect(),
                });
                let _ = request.respond(handler(&origin, &url));
            }
        });

        Self { base, seen }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }
}

pub fn reply(status: u16, body: &str) -> Reply {
    Response::from_string(body).with_status_code(StatusCode(status))
}

pub fn redirect(status: u16, location: &str) -> Reply {
    reply(status, "").with_header(header("Location", location))
}

pub fn header(name: &str, value: &str) -> Header {
    Header::from_bytes(name.as_bytes(), value.as_bytes()).unwrap()
}
