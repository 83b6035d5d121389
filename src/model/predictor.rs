//! Prediction pipeline: decode -> resize -> batch -> forward pass -> label

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;

use super::classifier::{Classifier, ClassifierError};
use super::postprocess::{self, ScoreError};
use super::preprocess;
use crate::labels::LabelList;

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("{0}")]
    Decode(#[from] image::ImageError),

    #[error("{0}")]
    Inference(#[from] ClassifierError),

    #[error("{0}")]
    Scores(#[from] ScoreError),

    #[error("predicted class index {index} is out of range for {labels} labels")]
    UnknownClass { index: usize, labels: usize },
}

/// Top-1 prediction for one image
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub index: usize,
    pub label: String,
    /// 0.0 - 1.0
    pub probability: f32,
    /// Percentage, two decimals, 0 - 100
    pub confidence: f64,
    pub inference_time_us: u64,
}

/// Immutable model + labels, shared by all requests
pub struct Predictor {
    classifier: Arc<dyn Classifier>,
    labels: LabelList,
}

impl Predictor {
    pub fn new(classifier: Arc<dyn Classifier>, labels: LabelList) -> Self {
        Self { classifier, labels }
    }

    pub fn model_name(&self) -> &str {
        self.classifier.name()
    }

    /// Classify raw image bytes
    pub fn predict(&self, bytes: &[u8]) -> Result<Prediction, PredictError> {
        let image = preprocess::decode(bytes)?;
        tracing::debug!(
            width = image.width(),
            height = image.height(),
            color = ?image.color(),
            "Image decoded"
        );

        let spec = self.classifier.input_spec();
        let batch = preprocess::to_batch(&image, &spec);
        tracing::debug!(shape = ?batch.shape(), "Input batch prepared");

        let start = Instant::now();
        let scores = self.classifier.scores(batch)?;
        let inference_time_us = start.elapsed().as_micros() as u64;

        let probabilities = postprocess::probabilities(&scores)?;
        let top = postprocess::top1(&probabilities)?;

        let label = self.labels.get(top.index)
            .ok_or(PredictError::UnknownClass {
                index: top.index,
                labels: self.labels.len(),
            })?
            .to_string();

        let confidence = postprocess::confidence_percent(top.probability);

        tracing::info!(
            model = %self.classifier.name(),
            class = %label,
            confidence,
            inference_ms = inference_time_us as f64 / 1000.0,
            "Prediction complete"
        );

        Ok(Prediction {
            index: top.index,
            label,
            probability: top.probability,
            confidence,
            inference_time_us,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::InputSpec;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use ndarray::Array4;
    use std::io::Cursor;

    /// Returns fixed scores regardless of input
    struct FixedScores(Vec<f32>);

    impl Classifier for FixedScores {
        fn name(&self) -> &str {
            "fixed"
        }

        fn input_spec(&self) -> InputSpec {
            InputSpec { size: 8, ..Default::default() }
        }

        fn scores(&self, _batch: Array4<f32>) -> Result<Vec<f32>, ClassifierError> {
            Ok(self.0.clone())
        }
    }

    fn png() -> Vec<u8> {
        let img = RgbImage::from_pixel(12, 12, Rgb([90, 60, 30]));
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img).write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    fn predictor(scores: Vec<f32>, labels: &[&str]) -> Predictor {
        Predictor::new(
            Arc::new(FixedScores(scores)),
            LabelList::from_names(labels.iter().copied()).unwrap(),
        )
    }

    #[test]
    fn test_predict_picks_top_label() {
        let p = predictor(vec![0.05, 0.9, 0.05], &["a", "b", "c"]);
        let prediction = p.predict(&png()).unwrap();

        assert_eq!(prediction.index, 1);
        assert_eq!(prediction.label, "b");
        assert_eq!(prediction.confidence, 90.0);
    }

    #[test]
    fn test_logits_are_softmaxed() {
        let p = predictor(vec![0.0, 3.0], &["a", "b"]);
        let prediction = p.predict(&png()).unwrap();

        assert_eq!(prediction.label, "b");
        assert!(prediction.confidence > 90.0 && prediction.confidence < 100.0);
    }

    #[test]
    fn test_index_beyond_labels() {
        let p = predictor(vec![0.1, 0.1, 0.8], &["a", "b"]);
        let err = p.predict(&png()).unwrap_err();
        assert!(matches!(err, PredictError::UnknownClass { index: 2, labels: 2 }));
    }

    #[test]
    fn test_non_image_bytes() {
        let p = predictor(vec![1.0], &["a"]);
        let err = p.predict(b"%PDF-1.4 not an image").unwrap_err();
        assert!(matches!(err, PredictError::Decode(_)));
        assert!(!err.to_string().is_empty());
    }
}
