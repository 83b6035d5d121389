//! Class label list
//!
//! Index `i` of the list names output `i` of the model.

use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LabelError {
    #[error("failed to read label file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("label file {path} is not a JSON array of strings: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("label file {0} contains no labels")]
    Empty(String),
}

/// Ordered, non-empty list of class names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelList {
    names: Vec<String>,
}

impl LabelList {
    /// Load from a JSON file such as `["acne", "eczema", "psoriasis"]`
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LabelError> {
        let path = path.as_ref();
        let display = path.display().to_string();

        let raw = std::fs::read_to_string(path).map_err(|source| LabelError::Io {
            path: display.clone(),
            source,
        })?;

        let names: Vec<String> = serde_json::from_str(&raw).map_err(|source| LabelError::Parse {
            path: display.clone(),
            source,
        })?;

        if names.is_empty() {
            return Err(LabelError::Empty(display));
        }

        Ok(Self { names })
    }

    /// Build from names already in memory. Returns `None` for an empty list.
    pub fn from_names<I, S>(names: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            None
        } else {
            Some(Self { names })
        }
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.names.iter().any(|n| n == label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}
