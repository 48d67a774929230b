use facmon_server::store::StoreError;

/// Errors raised by the ingestion pipeline. Feed and decode failures come
/// from the upstream API; store failures come from our own persistence.
#[derive(Debug, thiserror::Error)]
pub enum IngestionError {
    #[error("feed request failed: {0}")]
    Feed(#[from] reqwest::Error),
    #[error("feed response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("store operation failed: {0}")]
    Store(#[from] StoreError),
}
