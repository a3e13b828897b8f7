use std::sync::Arc;

use engine_logging::engine_debug;
use postbox_core::Entry;

use crate::fetch::Fetcher;
use crate::FetchError;

#[derive(Debug, thiserror::Error)]
pub enum MarkReadError {
    #[error("entry has no message link")]
    NoTarget,
    #[error("opening message failed: {0}")]
    Fetch(#[from] FetchError),
}

#[async_trait::async_trait]
pub trait ReadMarker: Send + Sync {
    async fn mark_read(&self, entry: &Entry) -> Result<(), MarkReadError>;
}

/// Marks a message read the way the inbox does: by opening it.
pub struct HttpReadMarker {
    fetcher: Arc<dyn Fetcher>,
}

impl HttpReadMarker {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait::async_trait]
impl ReadMarker for HttpReadMarker {
    async fn mark_read(&self, entry: &Entry) -> Result<(), MarkReadError> {
        let url = entry.open_url.as_deref().ok_or(MarkReadError::NoTarget)?;
        let output = self.fetcher.fetch(url).await?;
        engine_debug!(
            "Opened message {} ({} bytes)",
            entry.index,
            output.metadata.byte_len
        );
        Ok(())
    }
}
