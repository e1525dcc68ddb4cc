//! Async orchestration of image loads and saves.
//!
//! A [`Session`] ties an [`AnnotationEditor`] to an [`AnnotationBackend`] and
//! a [`Notifier`]. All three image acquisition paths (upload, random fetch,
//! fetch by hash) share one load routine: start a load ticket, obtain bytes
//! and hash, decode, install, then try to restore a stored annotation.
//!
//! Methods take `&self` so a front end can start a new load while an older
//! one is still waiting on the network. The editor is only borrowed between
//! suspension points.

use std::cell::{Ref, RefCell};

use crate::backend::{AnnotationBackend, RandomImage};
use crate::editor::{AnnotationEditor, InputOutcome, LoadTicket};
use crate::error::EditorError;
use crate::hash::content_hash_or_fallback;
use crate::image_data::LoadedImage;
use crate::input::{InputEvent, InputSource};
use crate::render::Renderer;
use crate::scaling::ImageSize;

/// Message shown after a successful save.
pub const SAVED_MESSAGE: &str = "Annotation saved!";

/// Severity of a user-visible message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// Receives messages meant for the user (alerts, toasts, status lines).
pub trait Notifier {
    fn notify(&self, kind: NoticeKind, message: &str);
}

/// [`Notifier`] that only writes to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, kind: NoticeKind, message: &str) {
        match kind {
            NoticeKind::Info => log::info!("{}", message),
            NoticeKind::Error => log::error!("{}", message),
        }
    }
}

/// An editor wired to a backend and a notifier.
pub struct Session<B, N = LogNotifier> {
    backend: B,
    notifier: N,
    editor: RefCell<AnnotationEditor>,
}

impl<B: AnnotationBackend, N: Notifier> Session<B, N> {
    pub fn new(editor: AnnotationEditor, backend: B, notifier: N) -> Self {
        Self {
            backend,
            notifier,
            editor: RefCell::new(editor),
        }
    }

    /// Borrow the editor for inspection.
    ///
    /// Do not hold the borrow across an `.await` on this session.
    pub fn editor(&self) -> Ref<'_, AnnotationEditor> {
        self.editor.borrow()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Load a random image without bothering the user if the server is unreachable.
    pub async fn start(&self) -> Result<ImageSize, EditorError> {
        self.load_random_image(false).await
    }

    // ========================================================================
    // Image acquisition
    // ========================================================================

    /// Upload a local image, then show it. Always user initiated.
    pub async fn upload_image(
        &self,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<ImageSize, EditorError> {
        let ticket = self.editor.borrow_mut().begin_load();
        let result = self.upload_and_load(ticket, filename, bytes).await;
        self.report_load(result, true)
    }

    /// Fetch a random image from the server and show it.
    ///
    /// Backend failures of automatic loads (`user_initiated == false`) are
    /// only logged.
    pub async fn load_random_image(&self, user_initiated: bool) -> Result<ImageSize, EditorError> {
        let ticket = self.editor.borrow_mut().begin_load();
        let result = self.fetch_random_and_load(ticket).await;
        self.report_load(result, user_initiated)
    }

    /// Fetch a stored image by its content hash and show it.
    pub async fn open_image(&self, hash: &str, user_initiated: bool) -> Result<ImageSize, EditorError> {
        let ticket = self.editor.borrow_mut().begin_load();
        let result = match self.backend.fetch_image(hash).await {
            Ok(bytes) => self.finish_load(ticket, &bytes, hash.to_string()).await,
            Err(err) => Err(EditorError::backend("Image could not be loaded", err)),
        };
        self.report_load(result, user_initiated)
    }

    async fn upload_and_load(
        &self,
        ticket: LoadTicket,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<ImageSize, EditorError> {
        // The upload consumes its copy; decoding happens from ours
        let hash = self
            .backend
            .upload(filename, bytes.clone())
            .await
            .map_err(|err| EditorError::backend("Upload failed", err))?;
        self.finish_load(ticket, &bytes, hash).await
    }

    async fn fetch_random_and_load(&self, ticket: LoadTicket) -> Result<ImageSize, EditorError> {
        let RandomImage { bytes, hash } = self
            .backend
            .random_image()
            .await
            .map_err(|err| EditorError::backend("Random image could not be loaded", err))?;
        if bytes.is_empty() {
            return Err(EditorError::EmptyImage);
        }
        let hash = hash.unwrap_or_else(|| {
            log::debug!("No hash from server, hashing locally");
            content_hash_or_fallback(&bytes)
        });
        self.finish_load(ticket, &bytes, hash).await
    }

    /// Decode and install the image, then restore its stored annotation.
    async fn finish_load(
        &self,
        ticket: LoadTicket,
        bytes: &[u8],
        hash: String,
    ) -> Result<ImageSize, EditorError> {
        if !self.editor.borrow().is_current(ticket) {
            return Err(EditorError::StaleLoad);
        }
        let image = LoadedImage::decode(bytes)?;
        if image.size().is_empty() {
            return Err(EditorError::EmptyImage);
        }
        let size = self
            .editor
            .borrow_mut()
            .install_image(ticket, image, hash.clone())?;

        // A missing or unreadable annotation never fails the load
        match self.backend.load_annotation(&hash).await {
            Ok(Some(record)) => self.editor.borrow_mut().apply_annotation(ticket, &record)?,
            Ok(None) => log::debug!("No stored annotation for {}", hash),
            Err(err) => log::warn!("Could not load annotation for {}: {}", hash, err),
        }
        Ok(size)
    }

    fn report_load(
        &self,
        result: Result<ImageSize, EditorError>,
        user_initiated: bool,
    ) -> Result<ImageSize, EditorError> {
        match &result {
            Ok(_) => {}
            Err(EditorError::StaleLoad) => log::debug!("Load superseded by a newer one"),
            Err(err @ EditorError::Backend { .. }) if !user_initiated => {
                log::warn!("Automatic image load failed: {}", err)
            }
            Err(err) => self.alert(err),
        }
        result
    }

    fn alert(&self, err: &EditorError) {
        log::error!("{}", err);
        self.notifier.notify(NoticeKind::Error, &err.to_string());
    }

    // ========================================================================
    // Save
    // ========================================================================

    /// Persist the current annotation.
    ///
    /// Rejected without any request when nothing can be saved. The outcome
    /// is reported through the notifier; editor state is never changed.
    pub async fn save(&self) -> Result<(), EditorError> {
        let built = self.editor.borrow().build_record();
        let record = match built {
            Ok(record) => record,
            Err(err) => {
                self.alert(&err);
                return Err(err);
            }
        };

        match self.backend.save_annotation(&record).await {
            Ok(()) => {
                self.notifier.notify(NoticeKind::Info, SAVED_MESSAGE);
                Ok(())
            }
            Err(err) => {
                let err = EditorError::backend("Saving the annotation failed", err);
                self.alert(&err);
                Err(err)
            }
        }
    }

    // ========================================================================
    // Input and rendering
    // ========================================================================

    /// Apply one input event, saving when the event asks for it.
    pub async fn handle_input(&self, event: InputEvent) -> Result<InputOutcome, EditorError> {
        let outcome = self.editor.borrow_mut().handle_input(event);
        if outcome == InputOutcome::SaveRequested {
            self.save().await?;
        }
        Ok(outcome)
    }

    /// Drain `source`, applying every event.
    ///
    /// Failed saves are reported and do not stop the run. Returns the number
    /// of events that changed the editor or saved.
    pub async fn run<S: InputSource + ?Sized>(&self, source: &mut S) -> usize {
        let mut effective = 0;
        while let Some(event) = source.next_event() {
            match self.handle_input(event).await {
                Ok(InputOutcome::Unchanged) => {}
                Ok(_) => effective += 1,
                Err(err) => log::debug!("Input event failed: {}", err),
            }
        }
        effective
    }

    /// Draw the current frame.
    pub fn render<R: Renderer + ?Sized>(&self, renderer: &mut R) -> bool {
        self.editor.borrow().render(renderer)
    }

    /// Tear down the session, returning the backend.
    pub fn dispose(self) -> B {
        self.editor.into_inner().dispose();
        self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::image_data::test_support::png_bytes;
    use crate::model::{AnnotationRecord, CanonicalPoint, DisplayPoint, LabelSet, Mode};
    use crate::scaling::ViewportBudget;

    /// Notifier that remembers every message.
    #[derive(Default)]
    struct RecordingNotifier {
        messages: RefCell<Vec<(NoticeKind, String)>>,
    }

    impl RecordingNotifier {
        fn errors(&self) -> Vec<String> {
            self.messages
                .borrow()
                .iter()
                .filter(|(kind, _)| *kind == NoticeKind::Error)
                .map(|(_, m)| m.clone())
                .collect()
        }

        fn infos(&self) -> Vec<String> {
            self.messages
                .borrow()
                .iter()
                .filter(|(kind, _)| *kind == NoticeKind::Info)
                .map(|(_, m)| m.clone())
                .collect()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, kind: NoticeKind, message: &str) {
            self.messages.borrow_mut().push((kind, message.to_string()));
        }
    }

    fn session(backend: MemoryBackend) -> Session<MemoryBackend, RecordingNotifier> {
        let editor = AnnotationEditor::new(
            ViewportBudget::new(1400.0, 900.0),
            LabelSet::new(["Person", "Nacht"]),
        );
        Session::new(editor, backend, RecordingNotifier::default())
    }

    #[tokio::test]
    async fn test_save_rejected_without_network_call() {
        let session = session(MemoryBackend::new());
        assert!(matches!(session.save().await, Err(EditorError::NoImageLoaded)));

        session.backend().insert_image(png_bytes(40, 30));
        session.load_random_image(true).await.unwrap();
        assert!(matches!(session.save().await, Err(EditorError::NothingMarked)));

        assert_eq!(session.backend().calls().save_annotation, 0);
        assert_eq!(session.notifier().errors().len(), 2);
    }

    #[tokio::test]
    async fn test_save_success_and_failure_leave_state() {
        let session = session(MemoryBackend::new());
        let hash = session.backend().insert_image(png_bytes(40, 30));
        session.load_random_image(true).await.unwrap();
        session
            .handle_input(InputEvent::Click(DisplayPoint::new(4.0, 3.0)))
            .await
            .unwrap();

        session.handle_input(InputEvent::Save).await.unwrap();
        assert_eq!(session.notifier().infos(), [SAVED_MESSAGE]);
        assert!(session.backend().annotation(&hash).is_some());

        session.backend().set_fail_saves(true);
        assert!(session.save().await.is_err());
        assert_eq!(session.notifier().errors().len(), 1);
        assert_eq!(session.editor().subject_points().len(), 1);
        assert_eq!(session.editor().image_hash(), Some(hash.as_str()));
    }

    #[tokio::test]
    async fn test_automatic_load_failure_is_silent() {
        let session = session(MemoryBackend::new());
        let err = session.start().await.unwrap_err();
        assert!(matches!(err, EditorError::Backend { .. }));
        assert!(session.notifier().errors().is_empty());

        assert!(session.load_random_image(true).await.is_err());
        assert_eq!(session.notifier().errors().len(), 1);
    }

    #[tokio::test]
    async fn test_decode_error_always_reported() {
        let session = session(MemoryBackend::new());
        session.backend().insert_image(b"not an image".to_vec());
        let err = session.load_random_image(false).await.unwrap_err();
        assert!(matches!(err, EditorError::Decode(_)));
        assert_eq!(session.notifier().errors().len(), 1);
        assert!(!session.editor().is_image_loaded());
    }

    #[tokio::test]
    async fn test_missing_hash_header_hashes_locally() {
        let session = session(MemoryBackend::new());
        let hash = session.backend().insert_image(png_bytes(20, 20));
        session.backend().set_send_hash_header(false);
        session.load_random_image(true).await.unwrap();
        assert_eq!(session.editor().image_hash(), Some(hash.as_str()));
    }

    #[tokio::test]
    async fn test_upload_restores_existing_annotation() {
        let session = session(MemoryBackend::new());
        let bytes = png_bytes(40, 30);
        let hash = crate::hash::content_hash(&bytes);

        let mut record = AnnotationRecord::new(hash.as_str());
        record.subject_points = vec![CanonicalPoint::new(10.0, 10.0)];
        record.labels = vec!["Beach".to_string()];
        session.backend().insert_annotation(record);

        let size = session.upload_image("photo.png", bytes).await.unwrap();
        assert_eq!(size, ImageSize::new(40, 30));

        let editor = session.editor();
        assert_eq!(editor.image_hash(), Some(hash.as_str()));
        assert_eq!(editor.mode(), Mode::Composition);
        assert_eq!(editor.labels().selected_labels(), ["Beach"]);
    }

    #[tokio::test]
    async fn test_upload_failure_reported() {
        let session = session(MemoryBackend::new());
        let err = session.upload_image("empty.png", Vec::new()).await.unwrap_err();
        assert_eq!(err.to_string(), "Upload failed: No file uploaded (HTTP 400)");
        assert_eq!(session.notifier().errors().len(), 1);
    }

    #[tokio::test]
    async fn test_latest_load_wins() {
        let backend = MemoryBackend::new();
        let slow = backend.insert_image(png_bytes(40, 30));
        let fast = backend.insert_image(png_bytes(20, 20));
        backend.set_latency(&slow, 5);

        let mut stale = AnnotationRecord::new(slow.as_str());
        stale.subject_points = vec![CanonicalPoint::new(1.0, 1.0)];
        backend.insert_annotation(stale);

        let session = session(backend);
        let (first, second) = tokio::join!(
            session.open_image(&slow, true),
            session.open_image(&fast, true)
        );

        assert!(matches!(first, Err(EditorError::StaleLoad)));
        assert_eq!(second.unwrap(), ImageSize::new(20, 20));
        let editor = session.editor();
        assert_eq!(editor.image_hash(), Some(fast.as_str()));
        assert!(editor.subject_points().is_empty());
        assert!(session.notifier().errors().is_empty());
    }

    #[tokio::test]
    async fn test_next_image_clears_session() {
        let session = session(MemoryBackend::new());
        session.backend().insert_image(png_bytes(20, 20));
        session.load_random_image(true).await.unwrap();
        session
            .handle_input(InputEvent::Click(DisplayPoint::new(1.0, 1.0)))
            .await
            .unwrap();
        session.handle_input(InputEvent::NextImage).await.unwrap();

        assert!(!session.editor().is_image_loaded());
        assert!(session.editor().subject_points().is_empty());
        let backend = session.dispose();
        assert_eq!(backend.calls().random_image, 1);
    }
}
