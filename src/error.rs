use crate::models::location::RegionScope;
use thiserror::Error;

/// Failures surfaced to the caller of the discovery engine. Everything else
/// degrades inside the engine.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("no district found for {scope}")]
    NoDistrictFound { scope: RegionScope },
    #[error("location store error: {0}")]
    Store(#[from] StoreError),
}

/// Collaborator store failures (cache, location hierarchy, inventory, promotions).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("mongodb error: {0}")]
    Mongo(#[from] mongodb::error::Error),
    #[error("document decode error: {0}")]
    Decode(#[from] bson::de::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// External HTTP service failures (AI text completion, place verification).
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("environment error: {0}")]
    Environment(String),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("response error: {0}")]
    Response(String),
}
