//! Face detection records exchanged with external detectors.
//!
//! Detections are recorded in append-only JSONL format, one record per line,
//! keyed by frame index. An external detector process writes this stream;
//! the CLI replays it into a video session.

use serde::{Deserialize, Serialize};

use crate::rect::PixelRect;

/// A single face detection reported by an external detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceDetection {
    /// Zero-based index of the frame the detection belongs to.
    #[serde(rename = "f")]
    pub frame_index: u64,

    /// Detected face rectangle in frame pixels.
    #[serde(flatten)]
    pub rect: PixelRect,
}

impl FaceDetection {
    pub fn new(frame_index: u64, rect: PixelRect) -> Self {
        Self { frame_index, rect }
    }
}

/// Parse detections from JSONL content (one JSON object per line).
pub fn parse_detections(jsonl: &str) -> Result<Vec<FaceDetection>, serde_json::Error> {
    jsonl
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(serde_json::from_str)
        .collect()
}

/// Serialize detections to JSONL format.
pub fn serialize_detections(detections: &[FaceDetection]) -> Result<String, serde_json::Error> {
    let mut output = String::new();
    for detection in detections {
        output.push_str(&serde_json::to_string(detection)?);
        output.push('\n');
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_roundtrip() {
        let detection = FaceDetection::new(12, PixelRect::new(10, 20, 80, 90));
        let json = serde_json::to_string(&detection).unwrap();
        let parsed: FaceDetection = serde_json::from_str(&json).unwrap();
        assert_eq!(detection, parsed);
    }

    #[test]
    fn test_json_format_is_flat() {
        let detection = FaceDetection::new(3, PixelRect::new(1, 2, 3, 4));
        let json = serde_json::to_string(&detection).unwrap();
        assert!(json.contains("\"f\":3"));
        assert!(json.contains("\"x\":1"));
        assert!(json.contains("\"h\":4"));
    }

    #[test]
    fn test_jsonl_roundtrip_skips_comments() {
        let detections = vec![
            FaceDetection::new(0, PixelRect::new(10, 10, 60, 60)),
            FaceDetection::new(0, PixelRect::new(200, 40, 70, 70)),
            FaceDetection::new(30, PixelRect::new(12, 14, 62, 58)),
        ];
        let mut jsonl = String::from("# detector: frontal v1\n");
        jsonl.push_str(&serialize_detections(&detections).unwrap());

        let parsed = parse_detections(&jsonl).unwrap();
        assert_eq!(parsed, detections);
    }

    #[test]
    fn test_parse_rejects_malformed_lines() {
        assert!(parse_detections("{\"f\":0,\"x\":1}").is_err());
    }
}
