// ============================================================
// Layer 2 - ServeUseCase
// ============================================================
// Builds the shared AppState the web layer serves from:
//
//   Step 1: Load the persisted model        (Layer 6 - infra)
//           Failure aborts start-up: there is no degraded mode.
//   Step 2: Resolve the fallback background (Layer 6 - infra)
//   Step 3: Build the slideshow controller
//   Step 4: Create the empty session store

use anyhow::{ensure, Context, Result};
use std::{net::SocketAddr, path::PathBuf, time::Duration};

use crate::application::predict_use_case::PredictUseCase;
use crate::application::session::SessionStore;
use crate::application::slideshow::{
    builtin_fallback, encode_fallback, SlideshowConfig, SlideshowController, DEFAULT_MAX_IMAGES,
};
use crate::domain::directive::Treatment;
use crate::infra::image_file::read_image_file;

// ─── Serve Configuration ─────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct ServeConfig {
    pub model_path:       PathBuf,
    pub addr:             SocketAddr,
    pub interval_secs:    u64,
    pub max_image_bytes:  usize,
    pub max_images:       usize,
    pub fallback_image:   Option<PathBuf>,
    pub overlay_opacity:  f32,
    pub blur_px:          u32,
    pub session_ttl_secs: u64,
    pub max_sessions:     usize,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            model_path:       PathBuf::from("models/lr_model.json"),
            addr:             SocketAddr::from(([127, 0, 0, 1], 8501)),
            interval_secs:    6,
            max_image_bytes:  10 * 1024 * 1024,
            max_images:       DEFAULT_MAX_IMAGES,
            fallback_image:   None,
            overlay_opacity:  0.55,
            blur_px:          8,
            session_ttl_secs: 3600,
            max_sessions:     1000,
        }
    }
}

/// Everything a request handler needs, shared across requests
pub struct AppState {
    pub predictor: PredictUseCase,
    pub slideshow: SlideshowController,
    pub sessions:  SessionStore,
}

pub struct ServeUseCase {
    config: ServeConfig,
}

impl ServeUseCase {
    pub fn new(config: ServeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ServeConfig {
        &self.config
    }

    pub fn build_state(&self) -> Result<AppState> {
        let cfg = &self.config;
        ensure!(cfg.interval_secs > 0, "--interval-secs must be at least 1");
        ensure!(cfg.max_images > 0, "--max-images must be at least 1");
        ensure!(cfg.max_sessions > 0, "--max-sessions must be at least 1");
        ensure!(
            (0.0..=1.0).contains(&cfg.overlay_opacity),
            "--overlay-opacity must be between 0 and 1, got {}",
            cfg.overlay_opacity
        );

        // ── Step 1: model ────────────────────────────────────────────────────
        let predictor = PredictUseCase::load(&cfg.model_path)
            .context("Cannot start without a prediction model")?;

        // ── Step 2: fallback background ──────────────────────────────────────
        let fallback = match &cfg.fallback_image {
            Some(path) => {
                let upload = read_image_file(path)?;
                let encoded = encode_fallback(&upload)
                    .with_context(|| format!("Fallback image '{}' is unusable", path.display()))?;
                tracing::info!("Using '{}' as the fallback background", path.display());
                encoded
            }
            None => builtin_fallback(),
        };

        // ── Step 3: slideshow controller ─────────────────────────────────────
        let slideshow = SlideshowController::new(SlideshowConfig {
            interval:        Duration::from_secs(cfg.interval_secs),
            max_image_bytes: cfg.max_image_bytes,
            max_images:      cfg.max_images,
            treatment:       Treatment {
                overlay_opacity: cfg.overlay_opacity,
                panel_blur_px:   cfg.blur_px,
                ..Treatment::default()
            },
            fallback,
        });

        // ── Step 4: sessions ─────────────────────────────────────────────────
        let sessions = SessionStore::new(
            Duration::from_secs(cfg.session_ttl_secs),
            cfg.max_sessions,
            slideshow.empty_state(),
        );

        Ok(AppState { predictor, slideshow, sessions })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::slideshow::BUILTIN_FALLBACK_SVG;
    use std::fs;

    fn bundled_model() -> PathBuf {
        PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/models/lr_model.json"))
    }

    #[test]
    fn test_missing_model_aborts_start_up() {
        let dir = tempfile::tempdir().unwrap();
        let uc = ServeUseCase::new(ServeConfig {
            model_path: dir.path().join("missing.json"),
            ..ServeConfig::default()
        });
        let err = uc.build_state().err().unwrap();
        assert!(format!("{err:#}").contains("not found"));
    }

    #[test]
    fn test_builds_with_builtin_fallback() {
        let uc = ServeUseCase::new(ServeConfig {
            model_path: bundled_model(),
            ..ServeConfig::default()
        });
        let state = uc.build_state().unwrap();
        let d = state.slideshow.current_directive(&state.slideshow.empty_state());
        assert_eq!(d.image_url, builtin_fallback().data_url());
        assert_eq!(d.treatment.overlay_opacity, 0.55);
    }

    #[test]
    fn test_custom_fallback_image_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bg.svg");
        fs::write(&path, BUILTIN_FALLBACK_SVG.replace("#1b1c19", "#000000")).unwrap();

        let uc = ServeUseCase::new(ServeConfig {
            model_path:     bundled_model(),
            fallback_image: Some(path),
            ..ServeConfig::default()
        });
        let state = uc.build_state().unwrap();
        let d = state.slideshow.current_directive(&state.slideshow.empty_state());
        assert!(d.is_fallback());
        assert_ne!(d.image_url, builtin_fallback().data_url());
    }

    #[test]
    fn test_upload_cap_reaches_slideshow() {
        let uc = ServeUseCase::new(ServeConfig {
            model_path: bundled_model(),
            max_images: 5,
            ..ServeConfig::default()
        });
        let state = uc.build_state().unwrap();
        assert_eq!(state.slideshow.config().max_images, 5);
    }

    #[test]
    fn test_rejects_bad_overlay_opacity() {
        let uc = ServeUseCase::new(ServeConfig {
            model_path:      bundled_model(),
            overlay_opacity: 1.5,
            ..ServeConfig::default()
        });
        assert!(uc.build_state().is_err());
    }
}
