//! Credverify Network: retrieval of remote documents (DID documents,
//! status lists, registries, schemas) behind the [`HttpFetcher`] seam.

pub mod client;
pub mod error;
pub mod fetcher;
pub mod memory;

pub use client::HttpClientFetcher;
pub use error::FetchError;
pub use fetcher::HttpFetcher;
pub use memory::StaticFetcher;
