pub mod error;
pub mod github;
pub mod http_client;
pub mod platform;
pub mod traits;
pub mod types;

#[cfg(test)]
pub(crate) mod test_server;
