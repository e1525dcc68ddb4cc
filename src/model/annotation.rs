//! The persisted annotation record.
//!
//! This is the JSON document exchanged with the annotation server. Points
//! inside a record are always in canonical space (original image pixels).

use serde::{Deserialize, Serialize};

use super::point::CanonicalPoint;
use super::shape_type::ShapeType;

/// An annotation as stored by the server, keyed by image hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationRecord {
    /// Content hash of the annotated image.
    pub image_hash: String,

    /// Server URL of the image (`/api/image/<hash>`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Subject points, canonical space.
    #[serde(default)]
    pub subject_points: Vec<CanonicalPoint>,

    /// Composition points, canonical space.
    #[serde(default)]
    pub composition_points: Vec<CanonicalPoint>,

    /// Subject points of records written before subject and composition
    /// were split. Read only.
    #[serde(default, skip_serializing)]
    pub points: Vec<CanonicalPoint>,

    /// Width of the original image the points refer to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_width: Option<u32>,

    /// Height of the original image the points refer to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_height: Option<u32>,

    /// Composition shape type. Older records may not carry one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape_type: Option<ShapeType>,

    /// Labels attached to the image.
    #[serde(default)]
    pub labels: Vec<String>,

    /// Save time (ISO 8601, UTC).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    /// How often the server handed this record out. Server-owned.
    #[serde(default, skip_serializing)]
    pub review_count: Option<u32>,

    /// When the server last handed this record out. Server-owned.
    #[serde(default, skip_serializing)]
    pub last_reviewed: Option<String>,
}

impl AnnotationRecord {
    /// Create an empty record for `image_hash`.
    pub fn new(image_hash: impl Into<String>) -> Self {
        Self {
            image_hash: image_hash.into(),
            image: None,
            subject_points: Vec::new(),
            composition_points: Vec::new(),
            points: Vec::new(),
            original_width: None,
            original_height: None,
            shape_type: None,
            labels: Vec::new(),
            timestamp: None,
            review_count: None,
            last_reviewed: None,
        }
    }

    /// Subject points, falling back to the legacy `points` field.
    pub fn effective_subject_points(&self) -> &[CanonicalPoint] {
        if self.subject_points.is_empty() {
            &self.points
        } else {
            &self.subject_points
        }
    }

    /// Recorded original size, or `fallback` when missing or zero.
    pub fn original_size_or(&self, fallback: (u32, u32)) -> (u32, u32) {
        let width = self.original_width.filter(|w| *w > 0).unwrap_or(fallback.0);
        let height = self.original_height.filter(|h| *h > 0).unwrap_or(fallback.1);
        (width, height)
    }

    /// Serialize the record to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a record from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Get the current time as an ISO 8601 string with milliseconds.
pub fn current_timestamp() -> String {
    // web-time keeps this working on both native and WASM
    let millis = web_time::SystemTime::now()
        .duration_since(web_time::SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    format_timestamp(millis as u64)
}

/// Format milliseconds since the Unix epoch as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
pub fn format_timestamp(millis: u64) -> String {
    let secs = millis / 1000;
    let days = secs / 86_400;
    let secs_today = secs % 86_400;
    let (year, month, day) = civil_from_days(days as i64);

    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}Z",
        year,
        month,
        day,
        secs_today / 3600,
        (secs_today % 3600) / 60,
        secs_today % 60,
        millis % 1000
    )
}

/// Convert days since 1970-01-01 to a proleptic Gregorian date.
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = (if z >= 0 { z } else { z - 146_096 }) / 146_097;
    let day_of_era = z - era * 146_097;
    let year_of_era =
        (day_of_era - day_of_era / 1460 + day_of_era / 36_524 - day_of_era / 146_096) / 365;
    let day_of_year = day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
    let mp = (5 * day_of_year + 2) / 153;
    let day = (day_of_year - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = year_of_era + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_json_fields() {
        let mut record = AnnotationRecord::new("abc");
        record.subject_points.push(CanonicalPoint::new(400.0, 400.0));
        record.original_width = Some(4000);
        record.original_height = Some(3000);
        record.shape_type = Some(ShapeType::Triangle);
        record.review_count = Some(3);

        let value: serde_json::Value = serde_json::from_str(&record.to_json().unwrap()).unwrap();
        assert_eq!(value["imageHash"], "abc");
        assert_eq!(value["subjectPoints"][0]["x"], 400.0);
        assert_eq!(value["originalWidth"], 4000);
        assert_eq!(value["shapeType"], "triangle");
        assert!(value.get("reviewCount").is_none());
        assert!(value.get("points").is_none());
    }

    #[test]
    fn test_legacy_points_are_subject_points() {
        let json = r#"{
            "imageHash": "old",
            "points": [{"x": 1, "y": 2}, {"x": 3, "y": 4}],
            "shapeType": "horizon"
        }"#;
        let record = AnnotationRecord::from_json(json).unwrap();
        assert!(record.subject_points.is_empty());
        assert_eq!(record.effective_subject_points().len(), 2);
        assert!(record.composition_points.is_empty());
        assert_eq!(record.shape_type, Some(ShapeType::Horizon));
    }

    #[test]
    fn test_server_fields_are_read() {
        let json = r#"{
            "imageHash": "h",
            "subjectPoints": [],
            "compositionPoints": [],
            "labels": ["Nacht"],
            "reviewCount": 2,
            "lastReviewed": "2025-01-01T10:00:00"
        }"#;
        let record = AnnotationRecord::from_json(json).unwrap();
        assert_eq!(record.review_count, Some(2));
        assert_eq!(record.shape_type, None);
        assert_eq!(record.labels, ["Nacht"]);
    }

    #[test]
    fn test_original_size_fallback() {
        let mut record = AnnotationRecord::new("h");
        assert_eq!(record.original_size_or((640, 480)), (640, 480));
        record.original_width = Some(0);
        record.original_height = Some(900);
        assert_eq!(record.original_size_or((640, 480)), (640, 900));
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0), "1970-01-01T00:00:00.000Z");
        assert_eq!(format_timestamp(951_782_400_000), "2000-02-29T00:00:00.000Z");
        assert_eq!(
            format_timestamp(1_700_000_000_123),
            "2023-11-14T22:13:20.123Z"
        );
    }
}
