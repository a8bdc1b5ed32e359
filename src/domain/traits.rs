// ============================================================
// Layer 3 - Core Traits (Abstractions)
// ============================================================
// The form adapter and the web layer program against these
// traits, so tests can swap in stubs:
//   - LinearModel implements PricePredictor
//   - a constant stub implements it in tests
//   - HashMap<String, String> implements WidgetSource
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use std::collections::HashMap;

use crate::domain::features::FeatureVector;

// ─── PricePredictor ───────────────────────────────────────────────────────────
/// Anything that turns a validated FeatureVector into a price.
///
/// Implementations must be pure: same input, same output,
/// no side effects.
pub trait PricePredictor {
    fn predict(&self, features: &FeatureVector) -> f64;
}

// ─── WidgetSource ─────────────────────────────────────────────────────────────
/// Current raw values of the form widgets, keyed by field name.
///
/// Values are untyped strings exactly as the browser posted
/// them. Parsing happens in the form adapter's `collect`.
pub trait WidgetSource {
    fn value(&self, name: &str) -> Option<&str>;
}

impl WidgetSource for HashMap<String, String> {
    fn value(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}
