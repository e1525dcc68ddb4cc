//! Points tagged with the coordinate space they live in.
//!
//! The editor works in display space (pixels of the possibly downscaled
//! canvas) while stored annotations use canonical space (pixels of the
//! original image). The space is part of the type, so mixing them up is a
//! compile error and every conversion goes through [`crate::scaling::Scale`].

use std::fmt;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

/// Pixel coordinates on the rendered canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplaySpace {}

/// Pixel coordinates of the original, unscaled image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanonicalSpace {}

/// A 2D point in coordinate space `S`.
///
/// `Clone`, `Copy` and `PartialEq` are implemented by hand so they hold for
/// every `S`, not only for spaces that implement them.
#[derive(Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Point<S> {
    pub x: f32,
    pub y: f32,
    #[serde(skip)]
    space: PhantomData<S>,
}

/// A point on the rendered canvas.
pub type DisplayPoint = Point<DisplaySpace>;

/// A point in original image pixels.
pub type CanonicalPoint = Point<CanonicalSpace>;

impl<S> Point<S> {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            space: PhantomData,
        }
    }
}

impl<S> Clone for Point<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for Point<S> {}

impl<S> PartialEq for Point<S> {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x && self.y == other.y
    }
}

impl<S> fmt::Debug for Point<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Marker type with no trait impls at all.
    enum BareSpace {}

    #[test]
    fn test_copy_without_space_bounds() {
        let points = [Point::<BareSpace>::new(1.0, 2.0), Point::new(3.0, 4.0)];
        let copied: Vec<Point<BareSpace>> = points.iter().copied().collect();
        assert!(copied[1] == points[1]);
        assert_eq!(copied[0].x, 1.0);
    }

    #[test]
    fn test_canonical_point_json_shape() {
        let p = CanonicalPoint::new(400.0, 300.5);
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, r#"{"x":400.0,"y":300.5}"#);

        let back: CanonicalPoint = serde_json::from_str(r#"{"x": 1, "y": 2.5}"#).unwrap();
        assert_eq!(back, CanonicalPoint::new(1.0, 2.5));
    }
}
