//! Inference Engine - ONNX Runtime Integration
//!
//! Loads the classifier once at startup and runs one forward pass per request.

use std::path::{Path, PathBuf};

use ndarray::Array4;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use parking_lot::Mutex;

use super::classifier::{check_shape, Classifier, ClassifierError};
use super::InputSpec;

/// ONNX Runtime backed classifier
pub struct OnnxClassifier {
    /// `Session::run` needs exclusive access
    session: Mutex<Session>,
    output_name: String,
    model_path: PathBuf,
    name: String,
    spec: InputSpec,
}

impl std::fmt::Debug for OnnxClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxClassifier")
            .field("model_path", &self.model_path)
            .field("output_name", &self.output_name)
            .field("spec", &self.spec)
            .finish()
    }
}

impl OnnxClassifier {
    /// Load ONNX model from file
    pub fn load(model_path: impl AsRef<Path>, spec: InputSpec) -> Result<Self, ClassifierError> {
        let model_path = model_path.as_ref();
        tracing::info!("Loading ONNX model from: {}", model_path.display());

        if !model_path.exists() {
            return Err(ClassifierError::NotFound(model_path.display().to_string()));
        }

        let session = Session::builder()
            .map_err(|e| ClassifierError::Load(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ClassifierError::Load(format!("Failed to set optimization: {}", e)))?
            .commit_from_file(model_path)
            .map_err(|e| ClassifierError::Load(format!("{}: {}", model_path.display(), e)))?;

        let output_name = session.outputs.first()
            .map(|o| o.name.clone())
            .ok_or(ClassifierError::NoOutput)?;

        let name = model_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| model_path.display().to_string());

        tracing::info!(
            model = %name,
            output = %output_name,
            input_shape = ?spec.shape(),
            "ONNX model loaded successfully"
        );

        Ok(Self {
            session: Mutex::new(session),
            output_name,
            model_path: model_path.to_path_buf(),
            name,
            spec,
        })
    }
}

impl Classifier for OnnxClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn input_spec(&self) -> InputSpec {
        self.spec
    }

    fn scores(&self, batch: Array4<f32>) -> Result<Vec<f32>, ClassifierError> {
        check_shape(&batch, &self.spec)?;

        let input_tensor = Tensor::from_array(batch)
            .map_err(|e| ClassifierError::Runtime(format!("Tensor error: {}", e)))?;

        let mut session = self.session.lock();

        let outputs = session.run(ort::inputs![input_tensor])
            .map_err(|e| ClassifierError::Runtime(e.to_string()))?;

        let output = outputs.get(&self.output_name)
            .ok_or(ClassifierError::NoOutput)?;

        let (_, data) = output.try_extract_tensor::<f32>()
            .map_err(|e| ClassifierError::Runtime(format!("Extract error: {}", e)))?;

        if data.is_empty() {
            return Err(ClassifierError::NoOutput);
        }

        Ok(data.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::InputLayout;

    /// `[1, 8, 8, 3]` -> ReduceMean over H, W -> Softmax, opset 13
    const CHANNEL_MEAN_MODEL: &str =
        concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/channel_mean.onnx");

    fn fixture_spec() -> InputSpec {
        InputSpec { size: 8, layout: InputLayout::Nhwc, ..Default::default() }
    }

    #[test]
    fn test_forward_pass() {
        let classifier = OnnxClassifier::load(CHANNEL_MEAN_MODEL, fixture_spec()).unwrap();
        assert_eq!(classifier.name(), "channel_mean.onnx");

        // Channel c is filled with c, so channel means are [0, 1, 2]
        let batch = Array4::from_shape_fn((1, 8, 8, 3), |(_, _, _, c)| c as f32);
        let scores = classifier.scores(batch).unwrap();

        assert_eq!(scores.len(), 3);
        let sum: f32 = scores.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert!(scores[2] > scores[1] && scores[1] > scores[0]);
    }

    #[test]
    fn test_forward_pass_is_deterministic() {
        let classifier = OnnxClassifier::load(CHANNEL_MEAN_MODEL, fixture_spec()).unwrap();
        let batch = Array4::from_shape_fn((1, 8, 8, 3), |(_, y, x, c)| ((x + y * 3 + c) % 7) as f32);

        let first = classifier.scores(batch.clone()).unwrap();
        let second = classifier.scores(batch).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_wrong_shape_rejected() {
        let classifier = OnnxClassifier::load(CHANNEL_MEAN_MODEL, fixture_spec()).unwrap();
        let err = classifier.scores(Array4::zeros((1, 3, 8, 8))).unwrap_err();
        assert!(matches!(err, ClassifierError::Shape { expected: [1, 8, 8, 3], .. }));
    }

    #[test]
    fn test_missing_model_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = OnnxClassifier::load(dir.path().join("missing.onnx"), InputSpec::default())
            .unwrap_err();
        assert!(matches!(err, ClassifierError::NotFound(_)));
    }
}
