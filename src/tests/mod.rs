//! End-to-end tests of the annotation client.
//!
//! These tests drive a [`crate::Session`] against the in-process backend and
//! check what ends up on the wire and on the canvas.

mod wire_format_tests;
