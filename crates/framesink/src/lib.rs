//! Client side of the external frame-encoding service.
//!
//! The capture path only needs two operations: store one encoded frame
//! under a sequence index, and finalize the stored set into a video. The
//! [`FrameSink`] trait keeps the capture coordinator testable without a
//! network; [`HttpFrameSink`] is the production implementation.

use std::time::Duration;

/// How long one submission may take before capture gives up. The encoder
/// ingests frames faster than we produce them in practice, so a stall this
/// long means the service is gone, not busy.
pub const SUBMISSION_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("failed to submit frame {index}: {source}")]
    Store {
        index: u32,
        #[source]
        source: reqwest::Error,
    },
    #[error("frame {index} rejected with status {status}")]
    StoreStatus {
        index: u32,
        status: reqwest::StatusCode,
    },
    #[error("failed to finalize capture: {0}")]
    Finalize(#[source] reqwest::Error),
    #[error("finalize rejected with status {0}")]
    FinalizeStatus(reqwest::StatusCode),
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
    /// Escape hatch for non-HTTP sink implementations.
    #[error("{0}")]
    Other(String),
}

/// Destination for captured frames. Implementations must tolerate `store`
/// being called with strictly increasing indices starting at zero and
/// `finalize` exactly once after the last frame.
pub trait FrameSink {
    fn store(&mut self, index: u32, png: &[u8]) -> Result<(), SinkError>;
    fn finalize(&mut self) -> Result<(), SinkError>;
}

/// Blocking HTTP sink posting to the frame-encoding service.
pub struct HttpFrameSink {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpFrameSink {
    /// `base_url` without a trailing slash, e.g. `http://localhost:3210`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, SinkError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(SUBMISSION_TIMEOUT)
            .build()
            .map_err(SinkError::Client)?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn store_url(&self, index: u32) -> String {
        format!("{}/save-frame?frame={}", self.base_url, index)
    }

    fn finish_url(&self) -> String {
        format!("{}/finish", self.base_url)
    }
}

impl FrameSink for HttpFrameSink {
    fn store(&mut self, index: u32, png: &[u8]) -> Result<(), SinkError> {
        let response = self
            .client
            .post(self.store_url(index))
            .header(reqwest::header::CONTENT_TYPE, "image/png")
            .body(png.to_vec())
            .send()
            .map_err(|source| SinkError::Store { index, source })?;
        if !response.status().is_success() {
            return Err(SinkError::StoreStatus {
                index,
                status: response.status(),
            });
        }
        tracing::trace!(index, bytes = png.len(), "frame stored");
        Ok(())
    }

    fn finalize(&mut self) -> Result<(), SinkError> {
        let response = self
            .client
            .post(self.finish_url())
            .send()
            .map_err(SinkError::Finalize)?;
        if !response.status().is_success() {
            return Err(SinkError::FinalizeStatus(response.status()));
        }
        tracing::info!("capture finalized");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_built_from_the_base() {
        let sink = HttpFrameSink::new("http://localhost:3210").unwrap();
        assert_eq!(
            sink.store_url(42),
            "http://localhost:3210/save-frame?frame=42"
        );
        assert_eq!(sink.finish_url(), "http://localhost:3210/finish");
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let sink = HttpFrameSink::new("http://localhost:3210/").unwrap();
        assert_eq!(sink.store_url(0), "http://localhost:3210/save-frame?frame=0");
    }
}
