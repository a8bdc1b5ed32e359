// ============================================================
// Layer 6 - Infrastructure Layer
// ============================================================
// Everything that touches the filesystem, and only at start-up:
//
//   model_store.rs - reads the persisted linear regression
//                    model (JSON) and validates its shape.
//                    A missing or broken file is fatal.
//
//   image_file.rs  - reads the optional fallback background
//                    image given on the command line.
//
// Nothing in this layer runs per request.
//
// Reference: Rust Book §9 (Error Handling)

/// Persisted model loading
pub mod model_store;

/// Fallback background image loading
pub mod image_file;
