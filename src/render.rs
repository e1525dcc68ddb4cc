//! Rendering of the image and the marked point sets.
//!
//! The editor never touches a drawing surface directly. It describes the
//! scene through the [`Renderer`] trait: clear, draw the bitmap, draw shape
//! primitives. [`DisplayList`] is a renderer that records the calls, which a
//! front end can replay onto its own surface.

use crate::color_utils::Color;
use crate::constants::render::{
    COMPOSITION_COLOR, COMPOSITION_PREFIX, FILL_ALPHA, FONT_SIZE, LINE_WIDTH, MARKER_RADIUS,
    MARKER_TEXT_COLOR, SUBJECT_COLOR, SUBJECT_PREFIX,
};
use crate::image_data::LoadedImage;
use crate::model::DisplayPoint;
use crate::scaling::ImageSize;

// ============================================================================
// Primitives
// ============================================================================

/// Outline style of a path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f32,
}

/// A shape primitive in display space.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// Polyline through `points`. A closed path has an implicit edge from the
    /// last point back to the first.
    Path {
        points: Vec<DisplayPoint>,
        closed: bool,
        stroke: Stroke,
        fill: Option<Color>,
    },
    /// Filled circular point marker.
    Marker {
        center: DisplayPoint,
        radius: f32,
        color: Color,
    },
    /// Text centered on `at`.
    Text {
        text: String,
        at: DisplayPoint,
        size: f32,
        color: Color,
    },
}

/// A drawing surface the editor renders onto.
pub trait Renderer {
    /// Clear the whole surface and size it to `size`.
    fn clear(&mut self, size: ImageSize);

    /// Draw `image` scaled to fill `size`.
    fn draw_image(&mut self, image: &LoadedImage, size: ImageSize);

    /// Draw a shape primitive.
    fn draw_shape(&mut self, shape: &Primitive);
}

// ============================================================================
// Scene
// ============================================================================

/// Colors and label prefixes of the two point sets.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneStyle {
    pub subject_color: Color,
    pub composition_color: Color,
    pub subject_prefix: &'static str,
    pub composition_prefix: &'static str,
}

impl Default for SceneStyle {
    fn default() -> Self {
        Self {
            subject_color: SUBJECT_COLOR,
            composition_color: COMPOSITION_COLOR,
            subject_prefix: SUBJECT_PREFIX,
            composition_prefix: COMPOSITION_PREFIX,
        }
    }
}

/// Everything needed to draw one frame.
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    pub image: &'a LoadedImage,
    pub canvas: ImageSize,
    pub subject: &'a [DisplayPoint],
    pub composition: &'a [DisplayPoint],
}

/// Draw a full frame: clear, bitmap, subject set, composition set.
pub fn draw_scene<R: Renderer + ?Sized>(renderer: &mut R, scene: &Scene<'_>, style: &SceneStyle) {
    renderer.clear(scene.canvas);
    renderer.draw_image(scene.image, scene.canvas);

    if !scene.subject.is_empty() {
        draw_point_set(renderer, scene.subject, style.subject_color, style.subject_prefix);
    }
    if !scene.composition.is_empty() {
        draw_point_set(
            renderer,
            scene.composition,
            style.composition_color,
            style.composition_prefix,
        );
    }
}

/// Draw one point set: its outline (by point count) and numbered markers.
///
/// One point gets only a marker, two points an open line, three or more a
/// closed polygon filled with a translucent tint of `color`.
pub fn draw_point_set<R: Renderer + ?Sized>(
    renderer: &mut R,
    points: &[DisplayPoint],
    color: Color,
    prefix: &str,
) {
    let stroke = Stroke {
        color,
        width: LINE_WIDTH,
    };

    match points.len() {
        0 => return,
        1 => {}
        2 => renderer.draw_shape(&Primitive::Path {
            points: points.to_vec(),
            closed: false,
            stroke,
            fill: None,
        }),
        _ => renderer.draw_shape(&Primitive::Path {
            points: points.to_vec(),
            closed: true,
            stroke,
            fill: Some(color.with_alpha(FILL_ALPHA)),
        }),
    }

    for (index, point) in points.iter().enumerate() {
        renderer.draw_shape(&Primitive::Marker {
            center: *point,
            radius: MARKER_RADIUS,
            color,
        });
        renderer.draw_shape(&Primitive::Text {
            text: format!("{}{}", prefix, index + 1),
            at: *point,
            size: FONT_SIZE,
            color: MARKER_TEXT_COLOR,
        });
    }
}

// ============================================================================
// Display list
// ============================================================================

/// A recorded renderer call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(ImageSize),
    Image(ImageSize),
    Shape(Primitive),
}

/// Renderer that records every call for later replay.
#[derive(Debug, Clone, Default)]
pub struct DisplayList {
    commands: Vec<DrawCommand>,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands recorded since the last clear.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Shape primitives recorded since the last clear.
    pub fn shapes(&self) -> impl Iterator<Item = &Primitive> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Shape(shape) => Some(shape),
            _ => None,
        })
    }

    /// Texts of all recorded markers, in drawing order.
    pub fn marker_labels(&self) -> Vec<&str> {
        self.shapes()
            .filter_map(|s| match s {
                Primitive::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Check if nothing has been drawn.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Renderer for DisplayList {
    fn clear(&mut self, size: ImageSize) {
        // A cleared surface discards everything drawn before it
        self.commands.clear();
        self.commands.push(DrawCommand::Clear(size));
    }

    fn draw_image(&mut self, _image: &LoadedImage, size: ImageSize) {
        self.commands.push(DrawCommand::Image(size));
    }

    fn draw_shape(&mut self, shape: &Primitive) {
        self.commands.push(DrawCommand::Shape(shape.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_data::test_support::blank;

    fn points(coords: &[(f32, f32)]) -> Vec<DisplayPoint> {
        coords.iter().map(|(x, y)| DisplayPoint::new(*x, *y)).collect()
    }

    fn paths(list: &DisplayList) -> Vec<&Primitive> {
        list.shapes()
            .filter(|s| matches!(s, Primitive::Path { .. }))
            .collect()
    }

    #[test]
    fn test_single_point_has_no_outline() {
        let mut list = DisplayList::new();
        draw_point_set(&mut list, &points(&[(5.0, 5.0)]), SUBJECT_COLOR, "S");
        assert!(paths(&list).is_empty());
        assert_eq!(list.marker_labels(), ["S1"]);
    }

    #[test]
    fn test_two_points_open_line() {
        let mut list = DisplayList::new();
        draw_point_set(&mut list, &points(&[(0.0, 0.0), (10.0, 0.0)]), SUBJECT_COLOR, "S");
        let paths = paths(&list);
        assert_eq!(paths.len(), 1);
        assert!(matches!(paths[0], Primitive::Path { closed: false, fill: None, .. }));
    }

    #[test]
    fn test_polygon_closed_and_tinted() {
        let mut list = DisplayList::new();
        let tri = points(&[(0.0, 0.0), (10.0, 0.0), (5.0, 8.0)]);
        draw_point_set(&mut list, &tri, COMPOSITION_COLOR, "K");

        match paths(&list).as_slice() {
            [Primitive::Path {
                closed,
                fill: Some(fill),
                stroke,
                points,
            }] => {
                assert!(*closed);
                assert_eq!(points.len(), 3);
                assert_eq!(stroke.color, COMPOSITION_COLOR);
                assert!((fill.a - FILL_ALPHA).abs() < f32::EPSILON);
                assert_eq!((fill.r, fill.g, fill.b), (0x34, 0x98, 0xdb));
            }
            other => panic!("unexpected primitives: {:?}", other),
        }
        assert_eq!(list.marker_labels(), ["K1", "K2", "K3"]);
    }

    #[test]
    fn test_scene_order() {
        let image = blank(20, 10);
        let subject = points(&[(1.0, 1.0)]);
        let composition = points(&[(2.0, 2.0), (3.0, 3.0)]);
        let scene = Scene {
            image: &image,
            canvas: ImageSize::new(20, 10),
            subject: &subject,
            composition: &composition,
        };

        let mut list = DisplayList::new();
        draw_scene(&mut list, &scene, &SceneStyle::default());

        assert_eq!(list.commands()[0], DrawCommand::Clear(ImageSize::new(20, 10)));
        assert_eq!(list.commands()[1], DrawCommand::Image(ImageSize::new(20, 10)));
        assert_eq!(list.marker_labels(), ["S1", "K1", "K2"]);
    }

    #[test]
    fn test_empty_sets_draw_only_image() {
        let image = blank(4, 4);
        let scene = Scene {
            image: &image,
            canvas: ImageSize::new(4, 4),
            subject: &[],
            composition: &[],
        };
        let mut list = DisplayList::new();
        draw_scene(&mut list, &scene, &SceneStyle::default());
        assert_eq!(list.commands().len(), 2);
    }
}
