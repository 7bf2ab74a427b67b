//! Turns submitted images into condition labels.
//!
//! The pipeline is: [`ImageSource`] → bytes → [`decode_image`] →
//! [`preprocess`] (RGB, 224×224, `[0,1]`, NHWC with batch dim) →
//! [`ClassifierPort::scores`] → [`label_for_scores`] (arg-max).

pub mod classify;
pub mod onnx;
pub mod preprocess;
pub mod source;

pub use classify::{ClassifierPort, StaticClassifier, label_for_scores};
pub use onnx::OnnxClassifier;
pub use preprocess::{PreprocessConfig, decode_image, preprocess};
pub use source::{ImageSource, decode_data_url};
