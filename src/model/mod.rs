//! Data models for the IKAT annotation client.

mod annotation;
mod labels;
mod mode;
mod point;
mod shape_type;

pub use annotation::{AnnotationRecord, current_timestamp, format_timestamp};
pub use labels::LabelSet;
pub use mode::Mode;
pub use point::{CanonicalPoint, CanonicalSpace, DisplayPoint, DisplaySpace, Point};
pub use shape_type::{ShapeType, ShapeTypeSelector};
