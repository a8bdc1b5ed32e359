// ============================================================
// Layer 3 - Domain Layer
// ============================================================
// Plain Rust structs, enums and traits that name the core
// concepts of the app: uploaded images and their encoded
// form, the style directive handed to the page, the typed
// feature vector, and the predictor abstraction.
//
// Rules for this layer:
//   - NO axum or HTTP types
//   - NO file I/O
//   - Only plain data, validation-free constructors and traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

/// Uploaded and base64-encoded background images
pub mod image;

/// The background style payload consumed by the page
pub mod directive;

/// Form fields and the typed FeatureVector
pub mod features;

/// Typed errors shared by the application and web layers
pub mod error;

/// Core abstractions (traits) implemented by other layers
pub mod traits;
