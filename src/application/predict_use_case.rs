use std::path::Path;

use crate::application::prediction_form::{collect, predict};
use crate::domain::error::FormError;
use crate::domain::features::FeatureVector;
use crate::domain::traits::WidgetSource;
use crate::infra::model_store::{ModelLoadError, ModelStore};
use crate::ml::model::LinearModel;

/// A loaded price model behind the form adapter.
pub struct PredictUseCase {
    model: LinearModel,
}

impl PredictUseCase {
    pub fn new(model: LinearModel) -> Self {
        Self { model }
    }

    /// Load the persisted model. Any failure here is fatal to the caller.
    pub fn load(model_path: impl AsRef<Path>) -> Result<Self, ModelLoadError> {
        let model = ModelStore::new(model_path.as_ref()).load()?;
        Ok(Self::new(model))
    }

    pub fn model(&self) -> &LinearModel {
        &self.model
    }

    /// Collect the widgets and, if they are complete, predict a price.
    pub fn estimate<W: WidgetSource + ?Sized>(
        &self,
        widgets: &W,
    ) -> Result<(FeatureVector, f64), FormError> {
        let vector = collect(widgets)?;
        let price  = predict(&vector, &self.model);
        tracing::debug!("Predicted {:.2} for {:?}", price, vector);
        Ok((vector, price))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::features::FeatureField;
    use std::collections::HashMap;

    #[test]
    fn test_estimate_uses_loaded_model() {
        let uc = PredictUseCase::new(LinearModel::new(vec![(FeatureField::Grade, 1000.0)], 5.0));
        let widgets: HashMap<String, String> = [
            ("sqft_living", "2000"),
            ("bedrooms",    "3"),
            ("bathrooms",   "2"),
            ("grade",       "7"),
            ("waterfront",  "0"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let (vector, price) = uc.estimate(&widgets).unwrap();
        assert_eq!(vector.grade, 7);
        assert_eq!(price, 7005.0);
    }

    #[test]
    fn test_estimate_passes_form_errors_through() {
        let uc = PredictUseCase::new(LinearModel::new(vec![(FeatureField::Grade, 1.0)], 0.0));
        let err = uc.estimate(&HashMap::new()).unwrap_err();
        assert!(matches!(err, FormError::Incomplete(_)));
    }

    #[test]
    fn test_load_reports_missing_model() {
        let dir = tempfile::tempdir().unwrap();
        let err = PredictUseCase::load(dir.path().join("lr_model.json")).err().unwrap();
        assert!(matches!(err, ModelLoadError::NotFound { .. }));
    }
}
