//! Stroke record format shared by persistence and the redo buffer.
//!
//! A stroke set is stored as a JSON array of records:
//!
//! ```json
//! [{"path": "M0 0 L10 0", "color": "#000000", "strokeWidth": 3.0, "isEraser": false, "toolType": 0}]
//! ```
//!
//! Decoding is tolerant: records that fail to parse are dropped one by one.

use crate::color::SerializableColor;
use crate::path::StrokePath;
use crate::stroke::{Stroke, StrokeError, ToolType};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Errors decoding a single record or a whole payload.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed record: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid color: {0}")]
    Color(#[from] crate::color::ColorParseError),
    #[error("invalid path: {0}")]
    Path(#[from] crate::path::PathError),
    #[error(transparent)]
    Stroke(#[from] StrokeError),
    #[error("payload is not a list of strokes")]
    NotAList,
}

/// One stroke in its serialized form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrokeRecord {
    pub path: String,
    pub color: String,
    pub stroke_width: f64,
    #[serde(default)]
    pub is_eraser: bool,
    /// Kept loose so unknown or non-integer codes decode as `Normal`.
    #[serde(default)]
    pub tool_type: Value,
}

impl StrokeRecord {
    /// Serialize a stroke.
    pub fn from_stroke(stroke: &Stroke) -> Self {
        Self {
            path: stroke.path().to_description(),
            color: stroke.color().to_hex(),
            stroke_width: stroke.stroke_width(),
            is_eraser: stroke.is_eraser(),
            tool_type: Value::from(stroke.tool().code()),
        }
    }

    /// Decoded tool type, defaulting to `Normal`.
    pub fn tool(&self) -> ToolType {
        self.tool_type
            .as_i64()
            .map(ToolType::from_code)
            .unwrap_or_default()
    }

    /// Rebuild the stroke, validating every field.
    pub fn to_stroke(&self) -> Result<Stroke, CodecError> {
        let path = StrokePath::parse_description(&self.path)?;
        let color: SerializableColor = self.color.parse()?;
        let tool = self.tool();
        // Erasing is always a normal-tool action; older records may disagree.
        let tool = if self.is_eraser { ToolType::Normal } else { tool };
        Ok(Stroke::new(path, color, self.stroke_width, tool, self.is_eraser)?)
    }
}

impl From<&Stroke> for StrokeRecord {
    fn from(stroke: &Stroke) -> Self {
        Self::from_stroke(stroke)
    }
}

/// Encode a full stroke set.
pub fn encode_strokes(strokes: &[Stroke]) -> Result<String, CodecError> {
    let records: Vec<StrokeRecord> = strokes.iter().map(StrokeRecord::from).collect();
    Ok(serde_json::to_string(&records)?)
}

/// Result of a tolerant decode.
#[derive(Debug, Default)]
pub struct Decoded {
    pub strokes: Vec<Stroke>,
    /// Number of records that were dropped.
    pub skipped: usize,
}

/// Decode a stroke set, skipping records that do not parse.
///
/// Fails only when the payload itself is not a JSON array.
pub fn decode_strokes(payload: &str) -> Result<Decoded, CodecError> {
    let value: Value = serde_json::from_str(payload)?;
    let Value::Array(entries) = value else {
        return Err(CodecError::NotAList);
    };

    let mut decoded = Decoded::default();
    for (index, entry) in entries.into_iter().enumerate() {
        let stroke = serde_json::from_value::<StrokeRecord>(entry)
            .map_err(CodecError::from)
            .and_then(|record| record.to_stroke());
        match stroke {
            Ok(stroke) => decoded.strokes.push(stroke),
            Err(e) => {
                log::warn!("Skipping stroke record {}: {}", index, e);
                decoded.skipped += 1;
            }
        }
    }
    Ok(decoded)
}
