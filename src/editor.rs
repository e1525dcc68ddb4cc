//! The annotation editor state machine.
//!
//! [`AnnotationEditor`] owns all mutable annotation state of the client: the
//! loaded image and its hash, the subject and composition point sets (in
//! display space), the active mode, the shape type selector and the labels.
//! It performs no I/O; the session drives it with load tickets, input events
//! and annotation records.
//!
//! # Load tickets
//!
//! Every image load starts with [`AnnotationEditor::begin_load`], which
//! resets the session synchronously and hands out a [`LoadTicket`]. Results
//! of that load are installed only while the ticket is still the latest one,
//! so a slow load can never overwrite the state of a newer one.

use crate::constants::api;
use crate::error::EditorError;
use crate::image_data::LoadedImage;
use crate::input::InputEvent;
use crate::model::{
    AnnotationRecord, DisplayPoint, LabelSet, Mode, ShapeType, ShapeTypeSelector,
    current_timestamp,
};
use crate::render::{Renderer, Scene, SceneStyle, draw_scene};
use crate::scaling::{ImageSize, Scale, ViewportBudget};

/// Identifies one image load sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LoadTicket(u64);

/// What an input event did to the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// State changed; views should redraw
    Changed,
    /// Nothing happened
    Unchanged,
    /// The user asked to save; the session has to do it
    SaveRequested,
}

/// Client-side annotation state for one image at a time.
#[derive(Debug)]
pub struct AnnotationEditor {
    // Session state, reset on every load
    image: Option<LoadedImage>,
    image_hash: Option<String>,
    canvas: ImageSize,
    subject: Vec<DisplayPoint>,
    composition: Vec<DisplayPoint>,
    mode: Mode,
    shape: ShapeTypeSelector,

    // Survives image loads (the selection inside is reset)
    labels: LabelSet,
    viewport: ViewportBudget,
    style: SceneStyle,
    load_seq: u64,
}

impl AnnotationEditor {
    /// Create an editor with no image loaded.
    pub fn new(viewport: ViewportBudget, labels: LabelSet) -> Self {
        Self {
            image: None,
            image_hash: None,
            canvas: ImageSize::default(),
            subject: Vec::new(),
            composition: Vec::new(),
            mode: Mode::default(),
            shape: ShapeTypeSelector::new(),
            labels,
            viewport,
            style: SceneStyle::default(),
            load_seq: 0,
        }
    }

    /// Use `style` for rendering.
    pub fn with_style(mut self, style: SceneStyle) -> Self {
        self.style = style;
        self
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Start a new image load.
    ///
    /// Invalidates every earlier ticket and resets the session before the
    /// caller suspends on any request.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.load_seq += 1;
        self.reset_session();
        log::debug!("Begin image load #{}", self.load_seq);
        LoadTicket(self.load_seq)
    }

    /// Check whether `ticket` belongs to the latest load.
    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.0 == self.load_seq
    }

    /// Install a decoded image for `ticket`.
    ///
    /// Sizes the canvas to fit the viewport budget and returns the display
    /// size. Fails with [`EditorError::StaleLoad`] when a newer load started.
    pub fn install_image(
        &mut self,
        ticket: LoadTicket,
        image: LoadedImage,
        hash: String,
    ) -> Result<ImageSize, EditorError> {
        self.ensure_current(ticket)?;

        let fit = self.viewport.fit(image.size());
        log::info!(
            "Image {} loaded: {}x{} shown at {}x{} (scale {:.3})",
            hash,
            image.size().width,
            image.size().height,
            fit.display.width,
            fit.display.height,
            fit.scale
        );

        self.reset_session();
        self.canvas = fit.display;
        self.image = Some(image);
        self.image_hash = Some(hash);
        Ok(fit.display)
    }

    /// Restore a stored annotation into the freshly loaded image.
    ///
    /// Points are scaled from the record's own original size to the current
    /// canvas. If the record has subject points the editor switches to
    /// composition mode so the next clicks continue the composition.
    pub fn apply_annotation(
        &mut self,
        ticket: LoadTicket,
        record: &AnnotationRecord,
    ) -> Result<(), EditorError> {
        self.ensure_current(ticket)?;
        let image_size = self
            .image
            .as_ref()
            .map(LoadedImage::size)
            .ok_or(EditorError::NoImageLoaded)?;

        let recorded =
            ImageSize::from(record.original_size_or((image_size.width, image_size.height)));
        let scale = Scale::to_display(recorded, self.canvas);

        let subject = record.effective_subject_points();
        if !subject.is_empty() {
            self.subject = scale.apply_all(subject);
        }
        if !record.composition_points.is_empty() {
            self.composition = scale.apply_all(&record.composition_points);
        }
        if !self.subject.is_empty() {
            self.mode = Mode::Composition;
        }

        if self.labels.restore_selection(&record.labels) {
            log::debug!("Label catalog extended from stored annotation");
        }
        match record.shape_type {
            Some(shape) => self.shape.select(shape, self.composition.len()),
            None => self.shape.on_point_count_changed(self.composition.len()),
        }

        log::info!(
            "Restored annotation for {}: {} subject, {} composition points, shape {}",
            record.image_hash,
            self.subject.len(),
            self.composition.len(),
            self.shape.selected()
        );
        Ok(())
    }

    /// Drop the current image and all session state.
    ///
    /// In-flight loads are invalidated. The label catalog is kept.
    pub fn reset(&mut self) {
        self.load_seq += 1;
        self.reset_session();
        log::debug!("Editor reset");
    }

    /// Move on to the next image. Same as [`AnnotationEditor::reset`].
    pub fn next_image(&mut self) {
        self.reset();
    }

    /// Tear the editor down.
    pub fn dispose(mut self) {
        self.reset();
        log::debug!("Editor disposed");
    }

    fn reset_session(&mut self) {
        self.image = None;
        self.image_hash = None;
        self.canvas = ImageSize::default();
        self.subject.clear();
        self.composition.clear();
        self.mode = Mode::Subject;
        self.shape = ShapeTypeSelector::new();
        self.labels.clear_selection();
    }

    fn ensure_current(&self, ticket: LoadTicket) -> Result<(), EditorError> {
        if self.is_current(ticket) {
            Ok(())
        } else {
            log::debug!(
                "Discarding result of load #{} (latest is #{})",
                ticket.0,
                self.load_seq
            );
            Err(EditorError::StaleLoad)
        }
    }

    // ========================================================================
    // Point capture
    // ========================================================================

    /// Record a click at `point` (display space) in the active set.
    ///
    /// Ignored while no image is loaded. Returns true if a point was added.
    pub fn click(&mut self, point: DisplayPoint) -> bool {
        if self.image.is_none() {
            return false;
        }
        match self.mode {
            Mode::Subject => self.subject.push(point),
            Mode::Composition => {
                self.composition.push(point);
                self.shape.on_point_count_changed(self.composition.len());
            }
        }
        log::debug!("{} point added at {:?}", self.mode.name(), point);
        true
    }

    /// Switch between subject and composition mode.
    pub fn toggle_mode(&mut self) -> Mode {
        self.set_mode(self.mode.toggled());
        self.mode
    }

    /// Activate `mode`. Point sets are not touched.
    pub fn set_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            log::debug!("Mode: {} -> {}", self.mode.name(), mode.name());
        }
        self.mode = mode;
    }

    /// Remove the last point of the active set. Returns the removed point.
    pub fn undo(&mut self) -> Option<DisplayPoint> {
        let removed = match self.mode {
            Mode::Subject => self.subject.pop(),
            Mode::Composition => {
                let removed = self.composition.pop();
                if removed.is_some() {
                    self.shape.on_point_count_changed(self.composition.len());
                }
                removed
            }
        };
        if removed.is_some() {
            log::debug!("Undo in {} mode", self.mode.name());
        }
        removed
    }

    /// Empty the active set and return shape inference to automatic.
    pub fn clear(&mut self) {
        match self.mode {
            Mode::Subject => self.subject.clear(),
            Mode::Composition => self.composition.clear(),
        }
        self.shape.reset_auto(self.composition.len());
        log::debug!("Cleared {} points", self.mode.name());
    }

    /// Apply an explicit shape type choice.
    pub fn select_shape_type(&mut self, shape: ShapeType) {
        self.shape.select(shape, self.composition.len());
    }

    // ========================================================================
    // Labels
    // ========================================================================

    /// Add a free-text label to the catalog. Returns true if it was new.
    pub fn add_label(&mut self, label: &str) -> bool {
        self.labels.add(label)
    }

    /// Check or uncheck a label for the current image.
    pub fn set_label(&mut self, label: &str, selected: bool) {
        self.labels.set_selected(label, selected);
    }

    // ========================================================================
    // Input
    // ========================================================================

    /// Apply one input event.
    pub fn handle_input(&mut self, event: InputEvent) -> InputOutcome {
        match event {
            InputEvent::Click(point) => {
                if self.click(point) {
                    InputOutcome::Changed
                } else {
                    InputOutcome::Unchanged
                }
            }
            InputEvent::ToggleMode => {
                self.toggle_mode();
                InputOutcome::Changed
            }
            InputEvent::Undo => {
                if self.undo().is_some() {
                    InputOutcome::Changed
                } else {
                    InputOutcome::Unchanged
                }
            }
            InputEvent::Clear => {
                self.clear();
                InputOutcome::Changed
            }
            InputEvent::SelectShapeType(shape) => {
                self.select_shape_type(shape);
                InputOutcome::Changed
            }
            InputEvent::AddLabel(label) => {
                if self.add_label(&label) {
                    InputOutcome::Changed
                } else {
                    InputOutcome::Unchanged
                }
            }
            InputEvent::SetLabel(label, selected) => {
                self.set_label(&label, selected);
                InputOutcome::Changed
            }
            InputEvent::Save => InputOutcome::SaveRequested,
            InputEvent::NextImage => {
                self.next_image();
                InputOutcome::Changed
            }
        }
    }

    // ========================================================================
    // Save
    // ========================================================================

    /// Build the record to persist, with points in canonical space.
    ///
    /// Fails without touching any state when no image is loaded, nothing is
    /// marked, or the image has no hash.
    pub fn build_record(&self) -> Result<AnnotationRecord, EditorError> {
        let image = self.image.as_ref().ok_or(EditorError::NoImageLoaded)?;
        if self.subject.is_empty() && self.composition.is_empty() {
            return Err(EditorError::NothingMarked);
        }
        let hash = self
            .image_hash
            .as_deref()
            .filter(|h| !h.is_empty())
            .ok_or(EditorError::MissingHash)?;

        let original = image.size();
        let scale = Scale::to_canonical(self.canvas, original);

        let mut record = AnnotationRecord::new(hash);
        record.image = Some(api::image_url(hash));
        record.subject_points = scale.apply_all(&self.subject);
        record.composition_points = scale.apply_all(&self.composition);
        record.original_width = Some(original.width);
        record.original_height = Some(original.height);
        record.shape_type = Some(self.shape.selected());
        record.labels = self.labels.selected_labels();
        record.timestamp = Some(current_timestamp());
        Ok(record)
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Draw the current frame. Returns false when no image is loaded.
    pub fn render<R: Renderer + ?Sized>(&self, renderer: &mut R) -> bool {
        let Some(image) = self.image.as_ref() else {
            log::debug!("Nothing to render, no image loaded");
            return false;
        };
        let scene = Scene {
            image,
            canvas: self.canvas,
            subject: &self.subject,
            composition: &self.composition,
        };
        draw_scene(renderer, &scene, &self.style);
        true
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Check if an image is loaded.
    pub fn is_image_loaded(&self) -> bool {
        self.image.is_some()
    }

    /// Content hash of the loaded image.
    pub fn image_hash(&self) -> Option<&str> {
        self.image_hash.as_deref()
    }

    /// Intrinsic size of the loaded image.
    pub fn image_size(&self) -> Option<ImageSize> {
        self.image.as_ref().map(LoadedImage::size)
    }

    /// Canvas size in display pixels (zero while nothing is loaded).
    pub fn canvas_size(&self) -> ImageSize {
        self.canvas
    }

    /// Active mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Subject points, display space.
    pub fn subject_points(&self) -> &[DisplayPoint] {
        &self.subject
    }

    /// Composition points, display space.
    pub fn composition_points(&self) -> &[DisplayPoint] {
        &self.composition
    }

    /// Number of composition points (drives the shape type).
    pub fn composition_point_count(&self) -> usize {
        self.composition.len()
    }

    /// Selected shape type.
    pub fn shape_type(&self) -> ShapeType {
        self.shape.selected()
    }

    /// Whether the shape type follows the point count.
    pub fn is_shape_auto(&self) -> bool {
        self.shape.is_auto()
    }

    /// Label catalog and selection.
    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    /// Viewport budget used for the next load.
    pub fn viewport(&self) -> ViewportBudget {
        self.viewport
    }

    /// Change the viewport budget. Takes effect on the next load.
    pub fn set_viewport(&mut self, viewport: ViewportBudget) {
        self.viewport = viewport;
    }
}
