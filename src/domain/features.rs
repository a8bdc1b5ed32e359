// ============================================================
// Layer 3 - Feature Domain Types
// ============================================================
// A FeatureVector is the validated set of property details
// the price model needs. It is only ever built by the form
// adapter's `collect`, which is the one place untyped widget
// strings are parsed.
//
// FeatureField names each input. The snake_case names double
// as HTML form field names and as the feature names stored in
// the persisted model file.
//
// Reference: Rust Book §6 (Enums), §5 (Structs)

use serde::{Deserialize, Serialize};
use std::fmt;

/// Allowed values of the floors selector
pub const FLOOR_OPTIONS: [f64; 6] = [1.0, 1.5, 2.0, 2.5, 3.0, 3.5];

/// Used when the floors selector is left blank
pub const DEFAULT_FLOORS: f64 = 2.0;

/// Used when the year built input is left blank
pub const DEFAULT_YR_BUILT: u32 = 2000;

/// One named input of the prediction form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureField {
    SqftLiving,
    Bedrooms,
    Bathrooms,
    Floors,
    Grade,
    Waterfront,
    YrBuilt,
}

impl FeatureField {
    /// Every field, in the order the form shows them
    pub const ALL: [FeatureField; 7] = [
        FeatureField::SqftLiving,
        FeatureField::Bedrooms,
        FeatureField::Bathrooms,
        FeatureField::Floors,
        FeatureField::Grade,
        FeatureField::Waterfront,
        FeatureField::YrBuilt,
    ];

    /// Form and model-file name of the field
    pub fn name(&self) -> &'static str {
        match self {
            Self::SqftLiving => "sqft_living",
            Self::Bedrooms   => "bedrooms",
            Self::Bathrooms  => "bathrooms",
            Self::Floors     => "floors",
            Self::Grade      => "grade",
            Self::Waterfront => "waterfront",
            Self::YrBuilt    => "yr_built",
        }
    }

    /// Human-readable label shown next to the widget
    pub fn label(&self) -> &'static str {
        match self {
            Self::SqftLiving => "Living Area (Sq. Ft.)",
            Self::Bedrooms   => "Bedrooms",
            Self::Bathrooms  => "Bathrooms",
            Self::Floors     => "Floors",
            Self::Grade      => "Quality Grade (1 = poor, 13 = excellent)",
            Self::Waterfront => "Waterfront Property",
            Self::YrBuilt    => "Year Built",
        }
    }

    /// Required fields must be filled in; the others fall back to defaults
    pub fn is_required(&self) -> bool {
        !matches!(self, Self::Floors | Self::YrBuilt)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }
}

impl fmt::Display for FeatureField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Validated inputs for one price prediction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub sqft_living: u32,
    pub bedrooms:    u32,
    pub bathrooms:   f64,
    pub floors:      f64,
    pub grade:       u32,
    pub waterfront:  bool,
    pub yr_built:    u32,
}

impl FeatureVector {
    /// Numeric value of one field as the regression model sees it.
    /// The waterfront flag becomes 1.0 or 0.0.
    pub fn value(&self, field: FeatureField) -> f64 {
        match field {
            FeatureField::SqftLiving => self.sqft_living as f64,
            FeatureField::Bedrooms   => self.bedrooms as f64,
            FeatureField::Bathrooms  => self.bathrooms,
            FeatureField::Floors     => self.floors,
            FeatureField::Grade      => self.grade as f64,
            FeatureField::Waterfront => if self.waterfront { 1.0 } else { 0.0 },
            FeatureField::YrBuilt    => self.yr_built as f64,
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip_through_from_name() {
        for field in FeatureField::ALL {
            assert_eq!(FeatureField::from_name(field.name()), Some(field));
        }
        assert_eq!(FeatureField::from_name("price"), None);
    }

    #[test]
    fn test_only_floors_and_year_are_optional() {
        let optional: Vec<_> = FeatureField::ALL
            .into_iter()
            .filter(|f| !f.is_required())
            .collect();
        assert_eq!(optional, vec![FeatureField::Floors, FeatureField::YrBuilt]);
    }

    #[test]
    fn test_waterfront_flag_is_numeric() {
        let mut v = FeatureVector {
            sqft_living: 2000,
            bedrooms:    3,
            bathrooms:   2.0,
            floors:      DEFAULT_FLOORS,
            grade:       7,
            waterfront:  false,
            yr_built:    DEFAULT_YR_BUILT,
        };
        assert_eq!(v.value(FeatureField::Waterfront), 0.0);
        v.waterfront = true;
        assert_eq!(v.value(FeatureField::Waterfront), 1.0);
        assert_eq!(v.value(FeatureField::SqftLiving), 2000.0);
    }
}
