//! Access to the annotation server.
//!
//! The server stores images and annotation records keyed by content hash.
//! [`AnnotationBackend`] is the client's view of its REST surface;
//! [`HttpBackend`] talks to a real server and [`MemoryBackend`] keeps
//! everything in process.

mod http;
mod memory;

use std::future::Future;

use thiserror::Error;

use crate::model::AnnotationRecord;

pub use http::HttpBackend;
pub use memory::{CallCounts, MemoryBackend};

/// Errors returned by backend requests.
#[derive(Error, Debug)]
pub enum BackendError {
    /// Connection, TLS or body transfer failure
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response, with the server's `error` message if it sent one
    #[error("{} (HTTP {status})", .message.as_deref().unwrap_or("Request failed"))]
    Status {
        status: u16,
        message: Option<String>,
    },

    /// Response body was not the expected JSON
    #[error("Invalid response: {0}")]
    Json(#[from] serde_json::Error),

    /// Upload succeeded but the response carried no hash
    #[error("Server response did not contain an image hash")]
    MissingHash,
}

/// A random image handed out by the server.
#[derive(Debug, Clone)]
pub struct RandomImage {
    /// Encoded image bytes
    pub bytes: Vec<u8>,
    /// Content hash from the response header, if present
    pub hash: Option<String>,
}

/// The server's REST surface as seen by the client.
///
/// Futures are not required to be `Send`; the client runs on a single
/// thread and interleaves requests.
pub trait AnnotationBackend {
    /// `POST /api/upload`: store an image, returning its content hash.
    fn upload(
        &self,
        filename: &str,
        bytes: Vec<u8>,
    ) -> impl Future<Output = Result<String, BackendError>>;

    /// `GET /api/image/{hash}`: encoded image bytes.
    fn fetch_image(&self, hash: &str) -> impl Future<Output = Result<Vec<u8>, BackendError>>;

    /// `GET /api/random-image`: bytes plus the `X-Image-Hash` header.
    fn random_image(&self) -> impl Future<Output = Result<RandomImage, BackendError>>;

    /// `GET /api/annotation/{hash}`: `Ok(None)` when the server has no record.
    fn load_annotation(
        &self,
        hash: &str,
    ) -> impl Future<Output = Result<Option<AnnotationRecord>, BackendError>>;

    /// `POST /api/save`: store or overwrite the record for its image hash.
    fn save_annotation(
        &self,
        record: &AnnotationRecord,
    ) -> impl Future<Output = Result<(), BackendError>>;
}
