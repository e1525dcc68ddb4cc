//! In-process annotation store.
//!
//! Behaves like the server: images are keyed by their SHA-256 hash, random
//! images are handed out round-robin and annotations are overwritten on save.
//! Every call yields to the runtime at least once so interleaving of
//! concurrent loads can be observed on a single-threaded executor.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use super::{AnnotationBackend, BackendError, RandomImage};
use crate::hash::content_hash;
use crate::model::AnnotationRecord;

/// Request counters, for checking which calls were made.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub upload: usize,
    pub fetch_image: usize,
    pub random_image: usize,
    pub load_annotation: usize,
    pub save_annotation: usize,
}

/// [`AnnotationBackend`] keeping images and annotations in memory.
#[derive(Debug)]
pub struct MemoryBackend {
    images: RefCell<HashMap<String, Vec<u8>>>,
    order: RefCell<Vec<String>>,
    annotations: RefCell<HashMap<String, AnnotationRecord>>,
    cursor: Cell<usize>,
    /// Extra yields before answering requests about a given hash
    latency: RefCell<HashMap<String, usize>>,
    send_hash_header: Cell<bool>,
    fail_saves: Cell<bool>,
    calls: Cell<CallCounts>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            images: RefCell::new(HashMap::new()),
            order: RefCell::new(Vec::new()),
            annotations: RefCell::new(HashMap::new()),
            cursor: Cell::new(0),
            latency: RefCell::new(HashMap::new()),
            send_hash_header: Cell::new(true),
            fail_saves: Cell::new(false),
            calls: Cell::new(CallCounts::default()),
        }
    }

    /// Store an image and return its content hash.
    ///
    /// Storing the same bytes twice keeps a single entry.
    pub fn insert_image(&self, bytes: Vec<u8>) -> String {
        let hash = content_hash(&bytes);
        let mut images = self.images.borrow_mut();
        if !images.contains_key(&hash) {
            self.order.borrow_mut().push(hash.clone());
            images.insert(hash.clone(), bytes);
        }
        hash
    }

    /// Store an annotation record, replacing any previous one for its image.
    pub fn insert_annotation(&self, record: AnnotationRecord) {
        self.annotations
            .borrow_mut()
            .insert(record.image_hash.clone(), record);
    }

    /// Stored annotation for `hash`.
    pub fn annotation(&self, hash: &str) -> Option<AnnotationRecord> {
        self.annotations.borrow().get(hash).cloned()
    }

    /// Number of stored images.
    pub fn image_count(&self) -> usize {
        self.order.borrow().len()
    }

    /// Delay every answer about `hash` by `yields` extra scheduler turns.
    pub fn set_latency(&self, hash: &str, yields: usize) {
        self.latency.borrow_mut().insert(hash.to_string(), yields);
    }

    /// Whether random images come with their hash (like the `X-Image-Hash` header).
    pub fn set_send_hash_header(&self, send: bool) {
        self.send_hash_header.set(send);
    }

    /// Make every save fail with HTTP 500.
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.set(fail);
    }

    /// Calls made so far.
    pub fn calls(&self) -> CallCounts {
        self.calls.get()
    }

    fn count(&self, update: impl FnOnce(&mut CallCounts)) {
        let mut calls = self.calls.get();
        update(&mut calls);
        self.calls.set(calls);
    }

    async fn pause(&self, hash: Option<&str>) {
        let extra = hash
            .and_then(|h| self.latency.borrow().get(h).copied())
            .unwrap_or(0);
        for _ in 0..=extra {
            tokio::task::yield_now().await;
        }
    }

    fn not_found(message: &str) -> BackendError {
        BackendError::Status {
            status: 404,
            message: Some(message.to_string()),
        }
    }
}

impl AnnotationBackend for MemoryBackend {
    async fn upload(&self, filename: &str, bytes: Vec<u8>) -> Result<String, BackendError> {
        self.count(|c| c.upload += 1);
        self.pause(None).await;
        if bytes.is_empty() {
            return Err(BackendError::Status {
                status: 400,
                message: Some("No file uploaded".to_string()),
            });
        }
        let hash = self.insert_image(bytes);
        log::debug!("Stored upload {} as {}", filename, hash);
        Ok(hash)
    }

    async fn fetch_image(&self, hash: &str) -> Result<Vec<u8>, BackendError> {
        self.count(|c| c.fetch_image += 1);
        self.pause(Some(hash)).await;
        self.images
            .borrow()
            .get(hash)
            .cloned()
            .ok_or_else(|| Self::not_found("Image not found"))
    }

    async fn random_image(&self) -> Result<RandomImage, BackendError> {
        self.count(|c| c.random_image += 1);
        let hash = {
            let order = self.order.borrow();
            if order.is_empty() {
                None
            } else {
                let index = self.cursor.get() % order.len();
                self.cursor.set(index + 1);
                Some(order[index].clone())
            }
        };
        self.pause(hash.as_deref()).await;

        let hash = hash.ok_or_else(|| Self::not_found("No images found"))?;
        let bytes = self
            .images
            .borrow()
            .get(&hash)
            .cloned()
            .ok_or_else(|| Self::not_found("Image not found"))?;
        Ok(RandomImage {
            bytes,
            hash: self.send_hash_header.get().then_some(hash),
        })
    }

    async fn load_annotation(&self, hash: &str) -> Result<Option<AnnotationRecord>, BackendError> {
        self.count(|c| c.load_annotation += 1);
        self.pause(Some(hash)).await;
        Ok(self.annotation(hash))
    }

    async fn save_annotation(&self, record: &AnnotationRecord) -> Result<(), BackendError> {
        self.count(|c| c.save_annotation += 1);
        self.pause(None).await;
        if self.fail_saves.get() {
            return Err(BackendError::Status {
                status: 500,
                message: None,
            });
        }
        self.insert_annotation(record.clone());
        Ok(())
    }
}
