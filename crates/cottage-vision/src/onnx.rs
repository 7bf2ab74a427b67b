//! ONNX-backed classifier (pure Rust, via tract).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cottage_protocol::{CottageResult, InspectionError};
use ndarray::Array4;
use tracing::{debug, info, instrument};
use tract_onnx::prelude::*;

use crate::classify::ClassifierPort;
use crate::preprocess::PreprocessConfig;

/// A classifier exported to ONNX with an NHWC `[1, side, side, 3]` f32 input
/// and a `[1, 7]` score output.
///
/// Loaded and optimised once; `scores` only borrows the plan, so one
/// instance is shared across requests.
pub struct OnnxClassifier {
    plan: TypedRunnableModel<TypedModel>,
    source: PathBuf,
    input_shape: [usize; 4],
}

impl OnnxClassifier {
    #[instrument(skip(path, config), fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>, config: &PreprocessConfig) -> Result<Self> {
        let path = path.as_ref();
        let input_shape = config.input_shape();

        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .with_context(|| format!("failed reading onnx model {path:?}"))?
            .with_input_fact(0, f32::fact(input_shape).into())
            .context("model does not accept an NHWC f32 image input")?
            .into_optimized()
            .context("failed optimising onnx model")?
            .into_runnable()
            .context("failed building onnx execution plan")?;

        info!(?input_shape, "classifier model loaded");
        Ok(Self {
            plan,
            source: path.to_path_buf(),
            input_shape,
        })
    }
}

impl ClassifierPort for OnnxClassifier {
    fn scores(&self, input: &Array4<f32>) -> CottageResult<Vec<f32>> {
        if input.shape() != self.input_shape.as_slice() {
            return Err(InspectionError::Inference(format!(
                "input shape {:?} does not match model input {:?}",
                input.shape(),
                self.input_shape
            )));
        }

        let data = input.as_slice().ok_or_else(|| {
            InspectionError::Inference("input tensor is not contiguous".to_owned())
        })?;
        let tensor = Tensor::from_shape(input.shape(), data)
            .map_err(|error| InspectionError::Inference(error.to_string()))?;

        let outputs = self
            .plan
            .run(tvec!(tensor.into()))
            .map_err(|error| InspectionError::Inference(error.to_string()))?;
        let first = outputs
            .first()
            .ok_or_else(|| InspectionError::Inference("model produced no outputs".to_owned()))?;
        let view = first
            .to_array_view::<f32>()
            .map_err(|error| InspectionError::Inference(error.to_string()))?;

        let scores: Vec<f32> = view.iter().copied().collect();
        debug!(scores = ?scores, "classifier scores");
        Ok(scores)
    }

    fn describe(&self) -> String {
        format!("onnx({})", self.source.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_model_file_is_reported_with_path() {
        let missing = std::env::temp_dir().join("cottage-vision-missing-model.onnx");
        let error = match OnnxClassifier::load(&missing, &PreprocessConfig::default()) {
            Ok(_) => panic!("loading a missing model should fail"),
            Err(error) => error,
        };
        assert!(format!("{error:#}").contains("cottage-vision-missing-model.onnx"));
    }
}
