//! Compatibility of annotation records with what the server stores.

use crate::model::{AnnotationRecord, CanonicalPoint, ShapeType};

#[test]
fn test_server_record_is_readable() {
    let json = r#"{
        "imageHash": "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08",
        "image": "/api/image/9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08",
        "subjectPoints": [{"x": 120.5, "y": 80}],
        "compositionPoints": [{"x": 0, "y": 0}, {"x": 640, "y": 480}],
        "originalWidth": 640,
        "originalHeight": 480,
        "shapeType": "horizon",
        "labels": ["Landschaft", "Tag"],
        "timestamp": "2024-05-01T12:00:00.000Z",
        "reviewCount": 3,
        "lastReviewed": "2024-05-02T08:30:00.000Z"
    }"#;
    let record = AnnotationRecord::from_json(json).unwrap();
    assert_eq!(record.subject_points, [CanonicalPoint::new(120.5, 80.0)]);
    assert_eq!(record.shape_type, Some(ShapeType::Horizon));
    assert_eq!(record.review_count, Some(3));
    assert_eq!(record.original_size_or((1, 1)), (640, 480));
}

#[test]
fn test_server_owned_fields_are_not_sent() {
    let mut record = AnnotationRecord::from_json(
        r#"{"imageHash": "h", "reviewCount": 2, "lastReviewed": "x", "points": [{"x": 1, "y": 2}]}"#,
    )
    .unwrap();
    record.labels = vec!["Nacht".to_string()];

    let value: serde_json::Value = serde_json::from_str(&record.to_json().unwrap()).unwrap();
    let object = value.as_object().unwrap();
    assert!(!object.contains_key("reviewCount"));
    assert!(!object.contains_key("lastReviewed"));
    assert!(!object.contains_key("points"));
    assert!(!object.contains_key("shapeType"));
    assert_eq!(object["labels"][0], "Nacht");
}

#[test]
fn test_unknown_shape_type_reads_as_custom() {
    let record =
        AnnotationRecord::from_json(r#"{"imageHash": "h", "shapeType": "spiral"}"#).unwrap();
    assert_eq!(record.shape_type, Some(ShapeType::Custom));
}

#[test]
fn test_zero_original_size_falls_back() {
    let record = AnnotationRecord::from_json(
        r#"{"imageHash": "h", "originalWidth": 0, "originalHeight": 0}"#,
    )
    .unwrap();
    assert_eq!(record.original_size_or((800, 600)), (800, 600));
}
