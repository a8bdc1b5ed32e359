// ============================================================
// Layer 3 - StyleDirective
// ============================================================
// The payload the slideshow controller hands to the page for
// one render pass: which background to show and how to treat
// it visually (dark overlay, frosted-glass panels, fade-in).
//
// The page turns this into CSS. Nothing in here knows about
// HTML; that mapping lives in the web layer.

use serde::Serialize;

/// Where the background image of a directive came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackgroundSource {
    /// Image `index` of a `total`-image slideshow
    Slide { index: usize, total: usize },

    /// The configured default shown when no images are active
    Fallback,
}

/// Visual treatment applied on top of the background image
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Treatment {
    /// Alpha of the black overlay between image and content (0.0..=1.0)
    pub overlay_opacity: f32,

    /// Blur radius of the frosted-glass content panels
    pub panel_blur_px:   u32,

    /// Alpha of the white tint on content panels
    pub panel_opacity:   f32,

    /// Duration of the fade-in when a new background appears
    pub transition_ms:   u32,
}

impl Default for Treatment {
    fn default() -> Self {
        Self {
            overlay_opacity: 0.55,
            panel_blur_px:   8,
            panel_opacity:   0.15,
            transition_ms:   1200,
        }
    }
}

/// One render pass worth of background styling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyleDirective {
    /// Embeddable `data:` URL of the background image
    pub image_url: String,
    pub source:    BackgroundSource,
    pub treatment: Treatment,
}

impl StyleDirective {
    pub fn is_fallback(&self) -> bool {
        self.source == BackgroundSource::Fallback
    }

    /// Index of the slide being shown, if this is a slideshow directive
    pub fn slide_index(&self) -> Option<usize> {
        match self.source {
            BackgroundSource::Slide { index, .. } => Some(index),
            BackgroundSource::Fallback            => None,
        }
    }
}
