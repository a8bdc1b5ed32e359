// ============================================================
// Layer 1 - CLI Commands and Arguments
// ============================================================
// Three subcommands:
//   - `serve`      runs the web app (slideshow + prediction form)
//   - `predict`    one prediction from flags, printed to stdout
//   - `model-info` describes the persisted model
//
// The application layer never sees clap types: each Args
// struct converts into a plain config or widget map.

use clap::{Args, Subcommand};
use std::{collections::HashMap, net::SocketAddr, path::PathBuf};

use crate::application::serve_use_case::ServeConfig;
use crate::application::slideshow::DEFAULT_MAX_IMAGES;
use crate::domain::features::FeatureField;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the house price app over HTTP
    Serve(ServeArgs),

    /// Predict one price from the command line
    Predict(PredictArgs),

    /// Show the persisted model's coefficients and metrics
    ModelInfo(ModelInfoArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Linear regression model file (JSON)
    #[arg(long, default_value = "models/lr_model.json")]
    pub model_path: PathBuf,

    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8501")]
    pub addr: SocketAddr,

    /// Seconds each slideshow image stays on screen
    #[arg(long, default_value_t = 6)]
    pub interval_secs: u64,

    /// Largest accepted upload per image, in bytes
    #[arg(long, default_value_t = 10 * 1024 * 1024)]
    pub max_image_bytes: usize,

    /// Most images kept from one upload; the rest are skipped
    #[arg(long, default_value_t = DEFAULT_MAX_IMAGES)]
    pub max_images: usize,

    /// Background shown when no images are uploaded (PNG, JPEG or SVG).
    /// Defaults to a built-in dark image.
    #[arg(long)]
    pub fallback_image: Option<PathBuf>,

    /// Darkness of the overlay between background and content, 0..1
    #[arg(long, default_value_t = 0.55)]
    pub overlay_opacity: f32,

    /// Blur radius of the translucent panels
    #[arg(long, default_value_t = 8)]
    pub blur_px: u32,

    /// Idle time after which a visitor's slideshow is forgotten
    #[arg(long, default_value_t = 3600)]
    pub session_ttl_secs: u64,

    /// Most sessions kept at once; the longest idle one is dropped first
    #[arg(long, default_value_t = 1000)]
    pub max_sessions: usize,
}

impl From<ServeArgs> for ServeConfig {
    fn from(a: ServeArgs) -> Self {
        ServeConfig {
            model_path:       a.model_path,
            addr:             a.addr,
            interval_secs:    a.interval_secs,
            max_image_bytes:  a.max_image_bytes,
            max_images:       a.max_images,
            fallback_image:   a.fallback_image,
            overlay_opacity:  a.overlay_opacity,
            blur_px:          a.blur_px,
            session_ttl_secs: a.session_ttl_secs,
            max_sessions:     a.max_sessions,
        }
    }
}

/// Flags mirror the web form. Values are passed through as text so
/// the CLI gets exactly the same validation as the browser.
#[derive(Args, Debug)]
pub struct PredictArgs {
    #[arg(long, default_value = "models/lr_model.json")]
    pub model_path: PathBuf,

    /// Living area in square feet (300-15000)
    #[arg(long)]
    pub sqft_living: Option<String>,

    /// Number of bedrooms (0-15)
    #[arg(long)]
    pub bedrooms: Option<String>,

    /// Number of bathrooms (0-10, in steps of 0.25)
    #[arg(long)]
    pub bathrooms: Option<String>,

    /// Number of floors (1, 1.5, 2, 2.5, 3 or 3.5)
    #[arg(long)]
    pub floors: Option<String>,

    /// Quality grade (1 = poor, 13 = excellent)
    #[arg(long)]
    pub grade: Option<String>,

    /// Waterfront property (yes/no or 1/0)
    #[arg(long)]
    pub waterfront: Option<String>,

    /// Year built (1900-2024)
    #[arg(long)]
    pub yr_built: Option<String>,
}

impl PredictArgs {
    /// The flags that were given, keyed by field name
    pub fn widgets(&self) -> HashMap<String, String> {
        [
            (FeatureField::SqftLiving, &self.sqft_living),
            (FeatureField::Bedrooms,   &self.bedrooms),
            (FeatureField::Bathrooms,  &self.bathrooms),
            (FeatureField::Floors,     &self.floors),
            (FeatureField::Grade,      &self.grade),
            (FeatureField::Waterfront, &self.waterfront),
            (FeatureField::YrBuilt,    &self.yr_built),
        ]
        .into_iter()
        .filter_map(|(field, value)| Some((field.name().to_string(), value.clone()?)))
        .collect()
    }
}

#[derive(Args, Debug)]
pub struct ModelInfoArgs {
    #[arg(long, default_value = "models/lr_model.json")]
    pub model_path: PathBuf,
}
