//! Model Module - Image Classification Inference
//!
//! Preprocessing, the inference engine and result formatting are kept apart
//! so the ONNX backend can be swapped without touching the HTTP layer.

pub mod classifier;
pub mod onnx;
pub mod postprocess;
pub mod predictor;
pub mod preprocess;

// Re-export common types
pub use classifier::{Classifier, ClassifierError};
pub use onnx::OnnxClassifier;
pub use predictor::{PredictError, Prediction, Predictor};

/// Default square input resolution (ResNet-style backbones)
pub const DEFAULT_INPUT_SIZE: u32 = 224;

/// Number of color channels fed to the model
pub const CHANNELS: usize = 3;

/// Memory layout of the input tensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputLayout {
    /// `[1, height, width, 3]` (Keras / TensorFlow exports)
    Nhwc,
    /// `[1, 3, height, width]` (PyTorch exports)
    Nchw,
}

impl InputLayout {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "nhwc" => Some(Self::Nhwc),
            "nchw" => Some(Self::Nchw),
            _ => None,
        }
    }
}

/// Value range of each channel in the input tensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelRange {
    /// 0.0 ..= 255.0, the model applies its own preprocessing
    Raw,
    /// 0.0 ..= 1.0
    Unit,
}

impl PixelRange {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "raw" => Some(Self::Raw),
            "unit" => Some(Self::Unit),
            _ => None,
        }
    }

    pub fn scale(self, channel: u8) -> f32 {
        match self {
            Self::Raw => channel as f32,
            Self::Unit => channel as f32 / 255.0,
        }
    }
}

/// Fixed input expected by the model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputSpec {
    pub size: u32,
    pub layout: InputLayout,
    pub pixel_range: PixelRange,
}

impl Default for InputSpec {
    fn default() -> Self {
        Self {
            size: DEFAULT_INPUT_SIZE,
            layout: InputLayout::Nhwc,
            pixel_range: PixelRange::Raw,
        }
    }
}

impl InputSpec {
    /// Full tensor shape including the batch dimension of 1
    pub fn shape(&self) -> [usize; 4] {
        let s = self.size as usize;
        match self.layout {
            InputLayout::Nhwc => [1, s, s, CHANNELS],
            InputLayout::Nchw => [1, CHANNELS, s, s],
        }
    }
}
