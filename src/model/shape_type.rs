//! Composition shape types and their inference from the point count.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Composition shape of an image.
///
/// Serialized as its lowercase name (`"thirds"`, `"triangle"`, ...). Unknown
/// names read back as [`ShapeType::Custom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum ShapeType {
    /// Rule of thirds (no composition points)
    #[default]
    Thirds,
    /// Single focal point
    Point,
    /// Horizon line
    Horizon,
    Triangle,
    Rectangle,
    Pentagon,
    Hexagon,
    /// Seven or more points
    Polygon,
    /// A manual choice outside the mapping table
    Custom,
}

impl ShapeType {
    /// Shape type the mapping table assigns to `count` composition points.
    pub fn expected_for(count: usize) -> Self {
        match count {
            0 => ShapeType::Thirds,
            1 => ShapeType::Point,
            2 => ShapeType::Horizon,
            3 => ShapeType::Triangle,
            4 => ShapeType::Rectangle,
            5 => ShapeType::Pentagon,
            6 => ShapeType::Hexagon,
            _ => ShapeType::Polygon,
        }
    }

    /// Wire name of this shape type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeType::Thirds => "thirds",
            ShapeType::Point => "point",
            ShapeType::Horizon => "horizon",
            ShapeType::Triangle => "triangle",
            ShapeType::Rectangle => "rectangle",
            ShapeType::Pentagon => "pentagon",
            ShapeType::Hexagon => "hexagon",
            ShapeType::Polygon => "polygon",
            ShapeType::Custom => "custom",
        }
    }

    /// Get the display name for this shape type.
    pub fn name(&self) -> &'static str {
        match self {
            ShapeType::Thirds => "Rule of Thirds",
            ShapeType::Point => "Point",
            ShapeType::Horizon => "Horizon",
            ShapeType::Triangle => "Triangle",
            ShapeType::Rectangle => "Rectangle",
            ShapeType::Pentagon => "Pentagon",
            ShapeType::Hexagon => "Hexagon",
            ShapeType::Polygon => "Polygon",
            ShapeType::Custom => "Custom",
        }
    }

    /// Get all shape types in selector order.
    pub fn all() -> &'static [ShapeType] {
        &[
            ShapeType::Thirds,
            ShapeType::Point,
            ShapeType::Horizon,
            ShapeType::Triangle,
            ShapeType::Rectangle,
            ShapeType::Pentagon,
            ShapeType::Hexagon,
            ShapeType::Polygon,
            ShapeType::Custom,
        ]
    }

    /// Parse a wire name, returning `None` for unknown names.
    pub fn parse(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|t| t.as_str() == name)
    }
}

impl From<String> for ShapeType {
    fn from(name: String) -> Self {
        Self::parse(&name).unwrap_or_else(|| {
            log::warn!("Unknown shape type '{}', treating as custom", name);
            ShapeType::Custom
        })
    }
}

impl From<ShapeType> for &'static str {
    fn from(shape: ShapeType) -> Self {
        shape.as_str()
    }
}

impl fmt::Display for ShapeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The shape type selector and its automatic/manual state.
///
/// In automatic mode every point-count change overwrites the selection with
/// [`ShapeType::expected_for`]. A manual choice that differs from the
/// expected value switches to manual mode; the selection then stays put
/// until a point-count change makes the expected value equal to it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeTypeSelector {
    selected: ShapeType,
    auto: bool,
}

impl ShapeTypeSelector {
    /// Automatic selector for zero composition points.
    pub fn new() -> Self {
        Self {
            selected: ShapeType::expected_for(0),
            auto: true,
        }
    }

    /// Currently selected shape type.
    pub fn selected(&self) -> ShapeType {
        self.selected
    }

    /// Whether point-count changes drive the selection.
    pub fn is_auto(&self) -> bool {
        self.auto
    }

    /// Apply a change of the composition point count.
    pub fn on_point_count_changed(&mut self, count: usize) {
        let expected = ShapeType::expected_for(count);
        if self.auto {
            self.selected = expected;
        } else if expected == self.selected {
            log::debug!("Shape type matches point count again, auto mode re-engaged");
            self.auto = true;
        }
    }

    /// Apply an explicit user choice, given the current point count.
    pub fn select(&mut self, shape: ShapeType, count: usize) {
        self.selected = shape;
        self.auto = shape == ShapeType::expected_for(count);
        log::debug!(
            "Shape type set to {} ({})",
            shape,
            if self.auto { "auto" } else { "manual" }
        );
    }

    /// Return to automatic mode and recompute from `count`.
    pub fn reset_auto(&mut self, count: usize) {
        self.auto = true;
        self.selected = ShapeType::expected_for(count);
    }
}

impl Default for ShapeTypeSelector {
    fn default() -> Self {
        Self::new()
    }
}
