//! Surface-condition class labels.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::InspectionError;

/// One of the seven condition classes the classifier can emit.
///
/// Declaration order is the model's output order; `ALL[i]` is the label for
/// score index `i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ClassLabel {
    Algae,
    #[serde(rename = "Major Crack")]
    MajorCrack,
    #[serde(rename = "Minor Crack")]
    MinorCrack,
    Normal,
    Peeling,
    Spalling,
    Stain,
}

impl ClassLabel {
    pub const COUNT: usize = 7;

    pub const ALL: [ClassLabel; Self::COUNT] = [
        ClassLabel::Algae,
        ClassLabel::MajorCrack,
        ClassLabel::MinorCrack,
        ClassLabel::Normal,
        ClassLabel::Peeling,
        ClassLabel::Spalling,
        ClassLabel::Stain,
    ];

    /// Human label, identical to the serde name.
    pub fn as_str(self) -> &'static str {
        match self {
            ClassLabel::Algae => "Algae",
            ClassLabel::MajorCrack => "Major Crack",
            ClassLabel::MinorCrack => "Minor Crack",
            ClassLabel::Normal => "Normal",
            ClassLabel::Peeling => "Peeling",
            ClassLabel::Spalling => "Spalling",
            ClassLabel::Stain => "Stain",
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Anything other than `Normal` counts as an issue in the statistics.
    pub fn is_issue(self) -> bool {
        self != ClassLabel::Normal
    }
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClassLabel {
    type Err = InspectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|label| label.as_str() == s)
            .ok_or_else(|| InspectionError::UnknownLabel(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_order_is_fixed() {
        let names: Vec<&str> = ClassLabel::ALL.iter().map(|l| l.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Algae",
                "Major Crack",
                "Minor Crack",
                "Normal",
                "Peeling",
                "Spalling",
                "Stain"
            ]
        );
        assert_eq!(ClassLabel::from_index(1), Some(ClassLabel::MajorCrack));
        assert_eq!(ClassLabel::from_index(7), None);
    }

    #[test]
    fn parses_human_names() {
        assert_eq!(
            "Minor Crack".parse::<ClassLabel>().unwrap(),
            ClassLabel::MinorCrack
        );
        let err = "Rust".parse::<ClassLabel>().unwrap_err();
        assert!(err.to_string().contains("Rust"));
    }

    #[test]
    fn serde_uses_human_names() {
        let json = serde_json::to_string(&ClassLabel::MajorCrack).unwrap();
        assert_eq!(json, "\"Major Crack\"");
        let back: ClassLabel = serde_json::from_str("\"Stain\"").unwrap();
        assert_eq!(back, ClassLabel::Stain);
    }

    #[test]
    fn only_normal_is_not_an_issue() {
        let issues = ClassLabel::ALL.iter().filter(|l| l.is_issue()).count();
        assert_eq!(issues, 6);
        assert!(!ClassLabel::Normal.is_issue());
    }
}
