// ============================================================
// Layer 6 - Model Store
// ============================================================
// Loads the persisted linear regression model from JSON.
//
// Loading happens once, at process start. Every failure is a
// ModelLoadError, and the caller treats it as fatal: without
// a model the app has nothing to offer.
//
// Steps:
//   1. Read the file (missing file gets its own variant so the
//      message can point at --model-path)
//   2. Deserialise into LinearModelRecord
//   3. Validate shape into a LinearModel
//
// Reference: serde_json documentation
//            Rust Book §9 (Error Handling)

use std::{fs, io, path::PathBuf};
use thiserror::Error;

use crate::ml::model::{LinearModel, LinearModelRecord, ModelShapeError};

/// Why the persisted model could not be loaded
#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("model file '{}' not found (check --model-path)", .path.display())]
    NotFound { path: PathBuf },

    #[error("cannot read model file '{}'", .path.display())]
    Io {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("model file '{}' is not valid model JSON", .path.display())]
    Corrupt {
        path:   PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("model file '{}' is inconsistent", .path.display())]
    Invalid {
        path:   PathBuf,
        #[source]
        source: ModelShapeError,
    },
}

/// Reads the model file at a fixed path.
pub struct ModelStore {
    path: PathBuf,
}

impl ModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read, parse and validate the model file.
    pub fn load(&self) -> Result<LinearModel, ModelLoadError> {
        let json = fs::read_to_string(&self.path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                ModelLoadError::NotFound { path: self.path.clone() }
            } else {
                ModelLoadError::Io { path: self.path.clone(), source }
            }
        })?;

        let record: LinearModelRecord = serde_json::from_str(&json)
            .map_err(|source| ModelLoadError::Corrupt { path: self.path.clone(), source })?;

        let model = LinearModel::try_from(record)
            .map_err(|source| ModelLoadError::Invalid { path: self.path.clone(), source })?;

        tracing::info!(
            "Loaded linear model from '{}' ({} features)",
            self.path.display(),
            model.terms().len()
        );
        Ok(model)
    }
}
