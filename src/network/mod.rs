pub mod client;
pub mod errors;
pub mod identity;

pub use client::{FetchedPage, HttpFetcher};
pub use errors::NetworkError;
pub use identity::IdentityProfile;
