//! Classifier boundary and arg-max labelling.

use cottage_protocol::{ClassLabel, CottageResult, InspectionError};
use ndarray::Array4;

/// Opaque pretrained classifier: preprocessed tensor in, one score per
/// [`ClassLabel`] out, in `ClassLabel::ALL` order.
pub trait ClassifierPort: Send + Sync {
    fn scores(&self, input: &Array4<f32>) -> CottageResult<Vec<f32>>;

    /// Short description for logs.
    fn describe(&self) -> String {
        "classifier".to_owned()
    }
}

/// Pick the label with the highest score.
///
/// Ties resolve to the first maximal index, NaN never wins, and a vector
/// that is not exactly one score per label is rejected.
pub fn label_for_scores(scores: &[f32]) -> CottageResult<ClassLabel> {
    if scores.len() != ClassLabel::COUNT {
        return Err(InspectionError::Inference(format!(
            "expected {} class scores, got {}",
            ClassLabel::COUNT,
            scores.len()
        )));
    }

    let mut best: Option<(usize, f32)> = None;
    for (index, &score) in scores.iter().enumerate() {
        if score.is_nan() {
            continue;
        }
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((index, score)),
        }
    }

    let (index, _) = best.ok_or_else(|| {
        InspectionError::Inference("classifier returned no comparable scores".to_owned())
    })?;
    ClassLabel::from_index(index)
        .ok_or_else(|| InspectionError::Inference(format!("score index {index} has no label")))
}

/// Classifier that ignores its input and returns fixed scores. Used for the
/// offline demo mode and in tests.
#[derive(Debug, Clone)]
pub struct StaticClassifier {
    scores: Vec<f32>,
}

impl StaticClassifier {
    pub fn with_scores(scores: Vec<f32>) -> Self {
        Self { scores }
    }

    /// One-hot scores for `label`.
    pub fn for_label(label: ClassLabel) -> Self {
        let scores = ClassLabel::ALL
            .iter()
            .map(|candidate| if *candidate == label { 1.0 } else { 0.0 })
            .collect();
        Self { scores }
    }
}

impl ClassifierPort for StaticClassifier {
    fn scores(&self, _input: &Array4<f32>) -> CottageResult<Vec<f32>> {
        Ok(self.scores.clone())
    }

    fn describe(&self) -> String {
        format!("static({} scores)", self.scores.len())
    }
}
