// ============================================================
// Layer 2 - Application / Use Cases
// ============================================================
// Orchestrates the other layers for one goal at a time.
//
//   slideshow.rs        - the background slideshow controller
//   prediction_form.rs  - collect widget values, call the model
//   session.rs          - per-session context and its store
//   predict_use_case.rs - a loaded model plus the form adapter
//   serve_use_case.rs   - wires everything up for the web layer
//
// Rules for this layer:
//   - No HTML or HTTP types here (that's the web layer)
//   - No direct file access (that's infra)
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

/// Cinematic background slideshow controller
pub mod slideshow;

/// Prediction form adapter (collect + predict)
pub mod prediction_form;

/// Session-scoped state
pub mod session;

/// Model-backed price estimation
pub mod predict_use_case;

/// Start-up wiring for the web app
pub mod serve_use_case;
