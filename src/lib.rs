//! IKAT - Image Komposition Annotation Tool
//!
//! Client core for annotating images with a subject region, a composition
//! shape and free-text labels. Annotations are stored on a server, keyed by
//! the SHA-256 hash of the image bytes.
//!
//! The [`editor::AnnotationEditor`] holds all annotation state and performs
//! no I/O. A [`session::Session`] connects it to an
//! [`backend::AnnotationBackend`] and reports outcomes to the user through a
//! [`session::Notifier`].

pub mod backend;
pub mod color_utils;
pub mod config;
pub mod constants;
pub mod editor;
pub mod error;
pub mod hash;
pub mod image_data;
pub mod input;
pub mod model;
pub mod render;
pub mod scaling;
pub mod session;

pub use editor::{AnnotationEditor, InputOutcome, LoadTicket};
pub use error::EditorError;
pub use session::{LogNotifier, NoticeKind, Notifier, Session};

#[cfg(test)]
mod tests;
