use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::features::{FeatureField, FeatureVector};
use crate::domain::traits::PricePredictor;

/// Evaluation metrics recorded when the model was fitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub r2:   f64,
    pub rmse: f64,
    pub mse:  f64,
    /// RMSE and MSE were computed on a scaled target
    #[serde(default)]
    pub scaled: bool,
}

/// On-disk layout of the model file.
///
/// ```json
/// {
///   "model_type": "linear_regression",
///   "feature_names": ["sqft_living", "bedrooms", ...],
///   "coefficients": [180.0, -35000.0, ...],
///   "intercept": 6250000.0,
///   "metrics": { "r2": 0.7736, "rmse": 0.254, "mse": 0.0645, "scaled": true }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModelRecord {
    #[serde(default = "default_model_type")]
    pub model_type:    String,
    pub feature_names: Vec<String>,
    pub coefficients:  Vec<f64>,
    pub intercept:     f64,
    #[serde(default)]
    pub metrics:       Option<ModelMetrics>,
}

fn default_model_type() -> String {
    "linear_regression".to_string()
}

/// Reasons a model record cannot be turned into a usable model
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelShapeError {
    #[error("model has {coefficients} coefficients but {features} feature names")]
    LengthMismatch { coefficients: usize, features: usize },

    #[error("model uses feature '{0}', which the form does not collect")]
    UnknownFeature(String),

    #[error("feature '{0}' appears more than once")]
    DuplicateFeature(String),

    #[error("model has no features")]
    Empty,

    #[error("model parameter '{0}' is not a finite number")]
    NonFinite(String),

    #[error("unsupported model type '{0}'")]
    UnsupportedType(String),
}

/// A validated linear regression model:
/// `price = intercept + Σ coefficient_i * feature_i`
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    terms:     Vec<(FeatureField, f64)>,
    intercept: f64,
    metrics:   Option<ModelMetrics>,
}

impl LinearModel {
    pub fn new(terms: Vec<(FeatureField, f64)>, intercept: f64) -> Self {
        Self { terms, intercept, metrics: None }
    }

    /// (feature, coefficient) pairs in model order
    pub fn terms(&self) -> &[(FeatureField, f64)] {
        &self.terms
    }

    pub fn features(&self) -> impl Iterator<Item = FeatureField> + '_ {
        self.terms.iter().map(|(f, _)| *f)
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn metrics(&self) -> Option<&ModelMetrics> {
        self.metrics.as_ref()
    }
}

impl TryFrom<LinearModelRecord> for LinearModel {
    type Error = ModelShapeError;

    fn try_from(record: LinearModelRecord) -> Result<Self, Self::Error> {
        if record.model_type != "linear_regression" {
            return Err(ModelShapeError::UnsupportedType(record.model_type));
        }
        if record.feature_names.is_empty() {
            return Err(ModelShapeError::Empty);
        }
        if record.coefficients.len() != record.feature_names.len() {
            return Err(ModelShapeError::LengthMismatch {
                coefficients: record.coefficients.len(),
                features:     record.feature_names.len(),
            });
        }
        if !record.intercept.is_finite() {
            return Err(ModelShapeError::NonFinite("intercept".to_string()));
        }

        let mut terms: Vec<(FeatureField, f64)> = Vec::with_capacity(record.coefficients.len());
        for (name, coef) in record.feature_names.into_iter().zip(record.coefficients) {
            let field = FeatureField::from_name(&name)
                .ok_or_else(|| ModelShapeError::UnknownFeature(name.clone()))?;
            if terms.iter().any(|(f, _)| *f == field) {
                return Err(ModelShapeError::DuplicateFeature(name));
            }
            if !coef.is_finite() {
                return Err(ModelShapeError::NonFinite(name));
            }
            terms.push((field, coef));
        }

        Ok(Self {
            terms,
            intercept: record.intercept,
            metrics:   record.metrics,
        })
    }
}

impl From<&LinearModel> for LinearModelRecord {
    fn from(model: &LinearModel) -> Self {
        Self {
            model_type:    default_model_type(),
            feature_names: model.features().map(|f| f.name().to_string()).collect(),
            coefficients:  model.terms.iter().map(|(_, c)| *c).collect(),
            intercept:     model.intercept,
            metrics:       model.metrics.clone(),
        }
    }
}

impl PricePredictor for LinearModel {
    fn predict(&self, features: &FeatureVector) -> f64 {
        self.terms
            .iter()
            .fold(self.intercept, |acc, (field, coef)| acc + coef * features.value(*field))
    }
}
