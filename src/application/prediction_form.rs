// ============================================================
// Layer 2 - Prediction Form Adapter
// ============================================================
// The single seam between untyped widget values and the typed
// FeatureVector:
//
//   collect  - read every widget, report ALL blank required
//              fields at once, then parse and range-check
//   predict  - hand the vector to the model, return its output
//              untouched (no retry, no caching, no clamping)
//
// Widget rules:
//   sqft_living  whole number, 300..=15000
//   bedrooms     whole number, 0..=15
//   bathrooms    0.0..=10.0 in steps of 0.25
//   floors       one of 1.0, 1.5 ... 3.5     (blank → 2.0)
//   grade        whole number, 1..=13
//   waterfront   0/1, yes/no, true/false
//   yr_built     whole number, 1900..=2024   (blank → 2000)

use std::ops::RangeInclusive;

use crate::domain::error::{FormError, IncompleteInputError, InvalidInputError};
use crate::domain::features::{
    FeatureField, FeatureVector, DEFAULT_FLOORS, DEFAULT_YR_BUILT, FLOOR_OPTIONS,
};
use crate::domain::traits::{PricePredictor, WidgetSource};

const SQFT_RANGE:     RangeInclusive<u32> = 300..=15000;
const BEDROOMS_RANGE: RangeInclusive<u32> = 0..=15;
const GRADE_RANGE:    RangeInclusive<u32> = 1..=13;
const YEAR_RANGE:     RangeInclusive<u32> = 1900..=2024;
const MAX_BATHROOMS:  f64 = 10.0;

/// Read the form widgets into a validated FeatureVector.
///
/// Missing required fields take priority: if any are blank, the
/// error lists exactly those fields and nothing else.
pub fn collect<W: WidgetSource + ?Sized>(widgets: &W) -> Result<FeatureVector, FormError> {
    let raw = |field: FeatureField| {
        widgets
            .value(field.name())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    let missing: Vec<FeatureField> = FeatureField::ALL
        .into_iter()
        .filter(|f| f.is_required() && raw(*f).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(IncompleteInputError { missing }.into());
    }

    let mut invalid = Vec::new();
    let mut check = |result: Result<_, InvalidInputError>, fallback| {
        result.unwrap_or_else(|e| {
            invalid.push(e);
            fallback
        })
    };

    // Required fields are known present past the check above.
    let sqft_living = check(whole(FeatureField::SqftLiving, raw(FeatureField::SqftLiving).unwrap_or(""), SQFT_RANGE), 0);
    let bedrooms    = check(whole(FeatureField::Bedrooms, raw(FeatureField::Bedrooms).unwrap_or(""), BEDROOMS_RANGE), 0);
    let grade       = check(whole(FeatureField::Grade, raw(FeatureField::Grade).unwrap_or(""), GRADE_RANGE), 0);
    let yr_built    = match raw(FeatureField::YrBuilt) {
        Some(v) => check(whole(FeatureField::YrBuilt, v, YEAR_RANGE), 0),
        None    => DEFAULT_YR_BUILT,
    };

    let bathrooms = match parse_bathrooms(raw(FeatureField::Bathrooms).unwrap_or("")) {
        Ok(v)  => v,
        Err(e) => { invalid.push(e); 0.0 }
    };
    let floors = match raw(FeatureField::Floors) {
        Some(v) => parse_floors(v).unwrap_or_else(|e| { invalid.push(e); 0.0 }),
        None    => DEFAULT_FLOORS,
    };
    let waterfront = parse_flag(raw(FeatureField::Waterfront).unwrap_or(""))
        .unwrap_or_else(|e| { invalid.push(e); false });

    if !invalid.is_empty() {
        invalid.sort_by_key(|e| e.field);
        return Err(FormError::Invalid(invalid));
    }

    Ok(FeatureVector {
        sqft_living,
        bedrooms,
        bathrooms,
        floors,
        grade,
        waterfront,
        yr_built,
    })
}

/// Forward the vector to the model. The result is returned as-is.
pub fn predict<P: PricePredictor + ?Sized>(vector: &FeatureVector, model: &P) -> f64 {
    model.predict(vector)
}

// ─── Field parsers ────────────────────────────────────────────────────────────

fn invalid(field: FeatureField, value: &str, expected: impl Into<String>) -> InvalidInputError {
    InvalidInputError {
        field,
        value:    value.to_string(),
        expected: expected.into(),
    }
}

/// Whole numbers; accepts "2000" and "2000.0" (JSON clients send both).
fn whole(field: FeatureField, value: &str, range: RangeInclusive<u32>) -> Result<u32, InvalidInputError> {
    let expected = || format!("a whole number from {} to {}", range.start(), range.end());

    let n: f64 = value.parse().map_err(|_| invalid(field, value, expected()))?;
    if n.fract() != 0.0 || n < *range.start() as f64 || n > *range.end() as f64 {
        return Err(invalid(field, value, expected()));
    }
    Ok(n as u32)
}

fn parse_bathrooms(value: &str) -> Result<f64, InvalidInputError> {
    let expected = "a number from 0 to 10 in steps of 0.25";
    let n: f64 = value
        .parse()
        .map_err(|_| invalid(FeatureField::Bathrooms, value, expected))?;
    if !(0.0..=MAX_BATHROOMS).contains(&n) || (n * 4.0).fract() != 0.0 {
        return Err(invalid(FeatureField::Bathrooms, value, expected));
    }
    Ok(n)
}

fn parse_floors(value: &str) -> Result<f64, InvalidInputError> {
    let expected = "one of 1, 1.5, 2, 2.5, 3, 3.5";
    let n: f64 = value
        .parse()
        .map_err(|_| invalid(FeatureField::Floors, value, expected))?;
    if FLOOR_OPTIONS.contains(&n) {
        Ok(n)
    } else {
        Err(invalid(FeatureField::Floors, value, expected))
    }
}

fn parse_flag(value: &str) -> Result<bool, InvalidInputError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "yes" | "true"  => Ok(true),
        "0" | "no"  | "false" => Ok(false),
        _ => Err(invalid(FeatureField::Waterfront, value, "yes/no or 1/0")),
    }
}
