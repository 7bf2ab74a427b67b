//! The result of one inspection.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::label::ClassLabel;

/// Format used for every user-facing timestamp.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Classification of one submitted image.
///
/// Immutable once created; the session keeps copies of it in the
/// current/last slots and in the history list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionResult {
    pub predicted_class: ClassLabel,
    pub timestamp: String,
}

impl InspectionResult {
    pub fn new(predicted_class: ClassLabel, timestamp: impl Into<String>) -> Self {
        Self {
            predicted_class,
            timestamp: timestamp.into(),
        }
    }

    /// Stamp a label with the local wall clock.
    pub fn now(predicted_class: ClassLabel) -> Self {
        Self::at(predicted_class, Local::now())
    }

    pub fn at(predicted_class: ClassLabel, when: DateTime<Local>) -> Self {
        Self::new(predicted_class, format_timestamp(when))
    }
}

pub fn format_timestamp(when: DateTime<Local>) -> String {
    when.format(TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamp_uses_second_precision() {
        let when = Local.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap();
        let result = InspectionResult::at(ClassLabel::Peeling, when);
        assert_eq!(result.timestamp, "2026-03-04 05:06:07");
    }

    #[test]
    fn json_shape_matches_predict_response() {
        let result = InspectionResult::new(ClassLabel::MajorCrack, "2026-01-01 00:00:00");
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["predicted_class"], "Major Crack");
        assert_eq!(value["timestamp"], "2026-01-01 00:00:00");
        assert_eq!(value.as_object().unwrap().len(), 2);
    }
}
