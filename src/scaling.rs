//! Display/canonical coordinate scaling.
//!
//! An image is shown downscaled (never upscaled) to fit the viewport budget.
//! Clicks arrive in display space; stored annotations live in canonical
//! space. This module holds the fit computation and the typed scale factors
//! that convert between the two.

use std::marker::PhantomData;

use crate::constants::{
    DEFAULT_VIEWPORT_HEIGHT, DEFAULT_VIEWPORT_WIDTH, SIDEBAR_ALLOWANCE, TOOLBAR_ALLOWANCE,
};
use crate::model::{CanonicalSpace, DisplaySpace, Point};

/// Width and height in whole pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Check if either side is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl From<(u32, u32)> for ImageSize {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

/// Space available for the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportBudget {
    /// Window width
    pub width: f32,
    /// Window height
    pub height: f32,
    /// Width reserved for the sidebar
    pub sidebar_allowance: f32,
    /// Height reserved for the toolbar
    pub toolbar_allowance: f32,
}

impl ViewportBudget {
    /// Budget for a window of the given size with the default allowances.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            sidebar_allowance: SIDEBAR_ALLOWANCE,
            toolbar_allowance: TOOLBAR_ALLOWANCE,
        }
    }

    /// Maximum canvas width. Never below one pixel.
    pub fn max_width(&self) -> f32 {
        (self.width - self.sidebar_allowance).max(1.0)
    }

    /// Maximum canvas height. Never below one pixel.
    pub fn max_height(&self) -> f32 {
        (self.height - self.toolbar_allowance).max(1.0)
    }

    /// Fit an image of `canonical` size into this budget.
    pub fn fit(&self, canonical: ImageSize) -> Fit {
        fit_to_viewport(canonical, self)
    }
}

impl Default for ViewportBudget {
    fn default() -> Self {
        Self::new(DEFAULT_VIEWPORT_WIDTH, DEFAULT_VIEWPORT_HEIGHT)
    }
}

/// Result of fitting an image into the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fit {
    /// Applied scale, at most 1.0
    pub scale: f32,
    /// Canvas size in display pixels
    pub display: ImageSize,
}

/// Compute the canvas size for an image.
///
/// `scale = min(max_width / width, max_height / height, 1)`. The canvas
/// keeps whole pixels like an HTML canvas does, and is at least 1x1.
pub fn fit_to_viewport(canonical: ImageSize, budget: &ViewportBudget) -> Fit {
    if canonical.is_empty() {
        return Fit {
            scale: 1.0,
            display: ImageSize::new(canonical.width.max(1), canonical.height.max(1)),
        };
    }

    let scale = (budget.max_width() / canonical.width as f32)
        .min(budget.max_height() / canonical.height as f32)
        .min(1.0);

    let width = ((canonical.width as f32 * scale).floor() as u32).max(1);
    let height = ((canonical.height as f32 * scale).floor() as u32).max(1);

    Fit {
        scale,
        display: ImageSize::new(width, height),
    }
}

/// Per-axis scale factors converting points from space `F` to space `T`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale<F, T> {
    pub sx: f32,
    pub sy: f32,
    spaces: PhantomData<(F, T)>,
}

impl<F, T> Scale<F, T> {
    fn between(from: ImageSize, to: ImageSize) -> Self {
        Self {
            sx: to.width as f32 / from.width.max(1) as f32,
            sy: to.height as f32 / from.height.max(1) as f32,
            spaces: PhantomData,
        }
    }

    /// Convert a single point.
    pub fn apply(&self, point: Point<F>) -> Point<T> {
        Point::new(point.x * self.sx, point.y * self.sy)
    }

    /// Convert a point sequence, keeping its order.
    pub fn apply_all(&self, points: &[Point<F>]) -> Vec<Point<T>> {
        points.iter().map(|p| self.apply(*p)).collect()
    }
}

impl Scale<DisplaySpace, CanonicalSpace> {
    /// Factors used when saving: `canonical / display`.
    pub fn to_canonical(display: ImageSize, canonical: ImageSize) -> Self {
        Self::between(display, canonical)
    }
}

impl Scale<CanonicalSpace, DisplaySpace> {
    /// Factors used when restoring: `display / recorded_original`.
    pub fn to_display(recorded_original: ImageSize, display: ImageSize) -> Self {
        Self::between(recorded_original, display)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CanonicalPoint, DisplayPoint};

    const EPSILON: f32 = 0.001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_fit_downscales() {
        // 1400 - 400 = 1000 wide, 900 - 150 = 750 high
        let budget = ViewportBudget::new(1400.0, 900.0);
        let fit = budget.fit(ImageSize::new(4000, 3000));
        assert!(approx_eq(fit.scale, 0.25));
        assert_eq!(fit.display, ImageSize::new(1000, 750));
    }

    #[test]
    fn test_fit_never_upscales() {
        let budget = ViewportBudget::new(3000.0, 3000.0);
        let fit = budget.fit(ImageSize::new(640, 480));
        assert_eq!(fit.scale, 1.0);
        assert_eq!(fit.display, ImageSize::new(640, 480));
    }

    #[test]
    fn test_fit_limited_by_height() {
        let budget = ViewportBudget::new(2400.0, 650.0);
        let fit = budget.fit(ImageSize::new(1000, 1000));
        assert!(approx_eq(fit.scale, 0.5));
        assert_eq!(fit.display, ImageSize::new(500, 500));
    }

    #[test]
    fn test_fit_tiny_viewport() {
        let budget = ViewportBudget::new(100.0, 100.0);
        let fit = budget.fit(ImageSize::new(1000, 1000));
        assert_eq!(fit.display, ImageSize::new(1, 1));
    }

    #[test]
    fn test_display_to_canonical() {
        let scale = Scale::to_canonical(ImageSize::new(1000, 750), ImageSize::new(4000, 3000));
        let p = scale.apply(DisplayPoint::new(100.0, 100.0));
        assert!(approx_eq(p.x, 400.0));
        assert!(approx_eq(p.y, 400.0));
    }

    #[test]
    fn test_round_trip() {
        let display = ImageSize::new(733, 411);
        let canonical = ImageSize::new(3999, 2242);
        let points = vec![
            DisplayPoint::new(12.5, 99.0),
            DisplayPoint::new(700.25, 3.0),
            DisplayPoint::new(0.0, 410.0),
        ];

        let stored = Scale::to_canonical(display, canonical).apply_all(&points);
        let restored = Scale::to_display(canonical, display).apply_all(&stored);

        for (a, b) in points.iter().zip(&restored) {
            assert!(approx_eq(a.x, b.x) && approx_eq(a.y, b.y), "{:?} != {:?}", a, b);
        }
    }

    #[test]
    fn test_restore_uses_recorded_size() {
        // Record made against a 2000x1500 original, shown at 1000x750
        let scale = Scale::to_display(ImageSize::new(2000, 1500), ImageSize::new(1000, 750));
        let p = scale.apply(CanonicalPoint::new(200.0, 300.0));
        assert!(approx_eq(p.x, 100.0));
        assert!(approx_eq(p.y, 150.0));
    }
}
