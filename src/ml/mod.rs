// ============================================================
// Layer 5 - ML / Model Layer
// ============================================================
// The price model: a linear regression fitted offline.
//
//   model.rs - LinearModel (coefficients + intercept), its
//              on-disk record, shape validation, and the
//              PricePredictor implementation.
//
// Training is not part of this app. The model arrives as a
// JSON file and is only ever evaluated here.

/// Linear regression model and its serialisable record
pub mod model;
