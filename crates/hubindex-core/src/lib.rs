use error::CatalogError;

pub mod asset;
pub mod catalog;
pub mod dispatcher;
pub mod error;
pub mod repo;
pub mod resolver;

#[cfg(test)]
pub(crate) mod testing;

pub type CatalogResult<T> = std::result::Result<T, CatalogError>;
