//! Configuration module

use std::env;
use std::path::PathBuf;

use crate::model::{InputLayout, InputSpec, PixelRange};

/// Default health message, shown by `GET /`
pub const DEFAULT_SERVICE_MESSAGE: &str = "Image Classifier API running";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address
    pub host: String,

    /// Server port
    pub port: u16,

    /// ONNX model file
    pub model_path: PathBuf,

    /// JSON array of class names, indexed like the model output
    pub class_names_path: PathBuf,

    /// Input tensor shape and pixel encoding expected by the model
    pub input: InputSpec,

    /// Maximum accepted request body, in bytes
    pub max_upload_bytes: usize,

    /// Message returned by the health check
    pub service_message: String,

    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            model_path: PathBuf::from("model.onnx"),
            class_names_path: PathBuf::from("class_names.json"),
            input: InputSpec::default(),
            max_upload_bytes: 16 * 1024 * 1024,
            service_message: DEFAULT_SERVICE_MESSAGE.to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup; unset or unparsable
    /// values fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let input = InputSpec {
            size: lookup("INPUT_SIZE")
                .and_then(|s| s.parse().ok())
                .filter(|s| *s > 0)
                .unwrap_or(defaults.input.size),

            layout: lookup("INPUT_LAYOUT")
                .and_then(|l| InputLayout::parse(&l))
                .unwrap_or(defaults.input.layout),

            pixel_range: lookup("PIXEL_RANGE")
                .and_then(|r| PixelRange::parse(&r))
                .unwrap_or(defaults.input.pixel_range),
        };

        Self {
            host: lookup("HOST").unwrap_or(defaults.host),

            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),

            model_path: lookup("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),

            class_names_path: lookup("CLASS_NAMES_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.class_names_path),

            input,

            max_upload_bytes: lookup("MAX_UPLOAD_BYTES")
                .and_then(|b| b.parse().ok())
                .unwrap_or(defaults.max_upload_bytes),

            service_message: lookup("SERVICE_MESSAGE")
                .unwrap_or(defaults.service_message),

            log_format: match lookup("LOG_FORMAT").as_deref() {
                Some(f) if f.eq_ignore_ascii_case("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        }
    }

    /// `host:port` string for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
