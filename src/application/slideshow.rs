// ============================================================
// Layer 2 - Background Slideshow Controller
// ============================================================
// Turns zero or more uploaded images into a rotating,
// network-free page background.
//
//   ingest            - validate + encode a new upload set,
//                       replacing the old one completely
//   SlideshowState::advance
//                     - move to the next image on a tick
//   current_directive - the StyleDirective for this render pass,
//                       from a state or a CurrentSlide copied out of one
//
// State machine (derived from the image count):
//
//   Empty ──ingest(≥1 accepted)──▶ Single / Rotating
//   Rotating ──advance──▶ Rotating   (index wraps around)
//   any ──ingest──▶ Empty / Single / Rotating
//
// Bad uploads never abort a batch. Each one becomes an
// UploadRejection in the IngestReport, next to the new state.
// Zero-length entries (a browser posts one when no file was
// picked) are skipped without a rejection.
//
// PNG and JPEG uploads are decoded in full before they are
// accepted, so a valid signature followed by garbage is
// rejected as malformed.

use image::ImageFormat;
use std::time::Duration;

use crate::domain::directive::{BackgroundSource, StyleDirective, Treatment};
use crate::domain::error::{RejectReason, UploadRejection};
use crate::domain::image::{EncodedImage, MediaType, UploadedImage};

/// Below this many images the sidebar suggests uploading more
pub const MIN_SUGGESTED_IMAGES: usize = 3;

/// Default cap on images kept from one upload
pub const DEFAULT_MAX_IMAGES: usize = 32;

/// Dark, subtle default background used when no images are active
pub const BUILTIN_FALLBACK_SVG: &str = r##"<svg width="1200" height="800" xmlns="http://www.w3.org/2000/svg"><rect width="1200" height="800" fill="#1b1c19"/><rect x="50" y="50" width="1100" height="700" stroke="#227c45" stroke-width="5" fill="none" stroke-opacity="0.3"/><rect x="100" y="100" width="500" height="200" fill="rgba(255, 255, 255, 0.05)" rx="10" ry="10"/><rect x="600" y="400" width="500" height="300" fill="rgba(255, 255, 255, 0.08)" rx="10" ry="10"/><line x1="50" y1="750" x2="1150" y2="50" stroke="#227c45" stroke-width="2" stroke-opacity="0.1"/><circle cx="600" cy="400" r="100" fill="rgba(255, 255, 255, 0.05)"/></svg>"##;

pub fn builtin_fallback() -> EncodedImage {
    EncodedImage::encode("builtin-fallback.svg", MediaType::Svg, BUILTIN_FALLBACK_SVG.as_bytes())
}

// ─── Configuration ────────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct SlideshowConfig {
    /// How long each image stays up before the next tick
    pub interval:        Duration,
    /// Per-image upload limit
    pub max_image_bytes: usize,
    /// Images past this count in one upload are rejected
    pub max_images:      usize,
    pub treatment:       Treatment,
    /// Shown whenever the slideshow is empty
    pub fallback:        EncodedImage,
}

impl Default for SlideshowConfig {
    fn default() -> Self {
        Self {
            interval:        Duration::from_secs(6),
            max_image_bytes: 10 * 1024 * 1024,
            max_images:      DEFAULT_MAX_IMAGES,
            treatment:       Treatment::default(),
            fallback:        builtin_fallback(),
        }
    }
}

// ─── State ────────────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideshowPhase {
    Empty,
    Single,
    Rotating,
}

/// Ordered images, the one currently shown, and the rotation interval.
///
/// Invariant: `current < images.len()` whenever `images` is non-empty,
/// and `current == 0` when it is empty.
#[derive(Debug, Clone, PartialEq)]
pub struct SlideshowState {
    images:   Vec<EncodedImage>,
    current:  usize,
    interval: Duration,
}

impl SlideshowState {
    /// A fresh slideshow starts at the first image
    pub fn new(images: Vec<EncodedImage>, interval: Duration) -> Self {
        Self { images, current: 0, interval }
    }

    pub fn empty(interval: Duration) -> Self {
        Self::new(Vec::new(), interval)
    }

    pub fn phase(&self) -> SlideshowPhase {
        match self.images.len() {
            0 => SlideshowPhase::Empty,
            1 => SlideshowPhase::Single,
            _ => SlideshowPhase::Rotating,
        }
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    #[cfg(test)]
    pub fn images(&self) -> &[EncodedImage] {
        &self.images
    }

    /// True when some images are active but fewer than look good
    pub fn suggests_more_images(&self) -> bool {
        (1..MIN_SUGGESTED_IMAGES).contains(&self.images.len())
    }

    /// Handle one rotation tick: `(current + 1) mod len`.
    /// With zero or one image the state comes back unchanged.
    pub fn advance(mut self) -> Self {
        if self.images.len() > 1 {
            self.current = (self.current + 1) % self.images.len();
        }
        self
    }
}

/// Result of one `ingest` call
#[derive(Debug, Clone)]
pub struct IngestReport {
    /// The new state, built from accepted images only
    pub state:    SlideshowState,
    /// One entry per rejected upload, in upload order
    pub rejected: Vec<UploadRejection>,
}

/// Where a slideshow is: what `current_directive` reads
pub trait SlidePosition {
    fn current_image(&self) -> Option<&EncodedImage>;
    fn current_index(&self) -> usize;
    fn slide_count(&self) -> usize;
}

impl SlidePosition for SlideshowState {
    fn current_image(&self) -> Option<&EncodedImage> {
        self.images.get(self.current)
    }

    fn current_index(&self) -> usize {
        self.current
    }

    fn slide_count(&self) -> usize {
        self.images.len()
    }
}

/// The image on screen and its position. Cheap to copy out of a
/// state: the encoded payload is shared, not duplicated.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentSlide {
    pub image: Option<EncodedImage>,
    pub index: usize,
    pub total: usize,
}

impl CurrentSlide {
    pub fn of(state: &SlideshowState) -> Self {
        Self {
            image: state.current_image().cloned(),
            index: state.current_index(),
            total: state.len(),
        }
    }
}

impl SlidePosition for CurrentSlide {
    fn current_image(&self) -> Option<&EncodedImage> {
        self.image.as_ref()
    }

    fn current_index(&self) -> usize {
        self.index
    }

    fn slide_count(&self) -> usize {
        self.total
    }
}

// ─── Controller ───────────────────────────────────────────────────────────────
pub struct SlideshowController {
    config: SlideshowConfig,
}

impl SlideshowController {
    pub fn new(config: SlideshowConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SlideshowConfig {
        &self.config
    }

    /// The state a brand-new session starts with
    pub fn empty_state(&self) -> SlideshowState {
        SlideshowState::empty(self.config.interval)
    }

    /// Validate and encode a complete upload set.
    ///
    /// The returned state always replaces the previous one; there is
    /// no way to append to an existing slideshow.
    pub fn ingest(&self, images: Vec<UploadedImage>) -> IngestReport {
        let limit        = self.config.max_images;
        let mut accepted = Vec::with_capacity(images.len().min(limit));
        let mut rejected = Vec::new();

        for upload in images {
            if upload.is_empty() {
                tracing::debug!("Ignoring empty upload '{}'", upload.file_name);
                continue;
            }
            if accepted.len() >= limit {
                rejected.push(UploadRejection::new(upload.file_name, RejectReason::TooMany { limit }));
                continue;
            }

            match self.accept(&upload) {
                Ok(encoded) => accepted.push(encoded),
                Err(reason) => {
                    tracing::warn!("Rejected upload '{}': {}", upload.file_name, reason);
                    rejected.push(UploadRejection::new(upload.file_name, reason));
                }
            }
        }

        let state = SlideshowState::new(accepted, self.config.interval);
        tracing::info!(
            "Slideshow rebuilt: {} image(s), {} rejected, phase {:?}",
            state.len(),
            rejected.len(),
            state.phase()
        );

        IngestReport { state, rejected }
    }

    /// The background for this render pass. Pure: reads `state`
    /// and the configuration, changes nothing.
    pub fn current_directive<S: SlidePosition + ?Sized>(&self, state: &S) -> StyleDirective {
        let treatment = self.config.treatment.clone();
        match state.current_image() {
            Some(image) => StyleDirective {
                image_url: image.data_url(),
                source:    BackgroundSource::Slide {
                    index: state.current_index(),
                    total: state.slide_count(),
                },
                treatment,
            },
            None => StyleDirective {
                image_url: self.config.fallback.data_url(),
                source:    BackgroundSource::Fallback,
                treatment,
            },
        }
    }

    /// Check one non-empty upload and encode it.
    fn accept(&self, upload: &UploadedImage) -> Result<EncodedImage, RejectReason> {
        let media_type = resolve_media_type(upload)?;
        if !media_type.is_uploadable() {
            return Err(RejectReason::UnsupportedMedia(media_type.mime().to_string()));
        }

        let limit = self.config.max_image_bytes;
        if upload.len() > limit {
            return Err(RejectReason::Oversized { size: upload.len(), limit });
        }

        check_content(media_type, &upload.bytes)?;
        Ok(EncodedImage::encode(upload.file_name.clone(), media_type, &upload.bytes))
    }
}

/// Validate an image supplied at start-up as the empty-slideshow
/// background. SVG is allowed here and there is no size limit.
pub fn encode_fallback(upload: &UploadedImage) -> Result<EncodedImage, UploadRejection> {
    let reject = |reason| UploadRejection::new(upload.file_name.clone(), reason);

    if upload.is_empty() {
        return Err(reject(RejectReason::Malformed { expected: "non-empty" }));
    }
    let media_type = resolve_media_type(upload).map_err(reject)?;
    check_content(media_type, &upload.bytes).map_err(reject)?;

    Ok(EncodedImage::encode(upload.file_name.clone(), media_type, &upload.bytes))
}

/// Declared type wins. Without one (or with the generic
/// octet-stream), fall back to the file extension, and to PNG
/// when the file has no extension at all.
fn resolve_media_type(upload: &UploadedImage) -> Result<MediaType, RejectReason> {
    let declared = upload
        .declared_type
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty() && *d != "application/octet-stream");

    if let Some(declared) = declared {
        return MediaType::from_declared(declared)
            .ok_or_else(|| RejectReason::UnsupportedMedia(declared.to_string()));
    }

    match upload.file_name.rsplit_once('.') {
        None => Ok(MediaType::Png),
        Some((_, ext)) => MediaType::from_extension(&upload.file_name)
            .ok_or_else(|| RejectReason::UnsupportedMedia(format!(".{ext}"))),
    }
}

/// The bytes must actually be an image of the resolved type.
/// Raster images have to decode completely.
fn check_content(media_type: MediaType, bytes: &[u8]) -> Result<(), RejectReason> {
    let valid = match media_type {
        MediaType::Png  => decodes_as(bytes, ImageFormat::Png),
        MediaType::Jpeg => decodes_as(bytes, ImageFormat::Jpeg),
        MediaType::Svg  => std::str::from_utf8(bytes).map(|s| s.contains("<svg")).unwrap_or(false),
    };

    if valid {
        Ok(())
    } else {
        let expected = match media_type {
            MediaType::Png  => "PNG",
            MediaType::Jpeg => "JPEG",
            MediaType::Svg  => "SVG",
        };
        Err(RejectReason::Malformed { expected })
    }
}

fn decodes_as(bytes: &[u8], format: ImageFormat) -> bool {
    match image::load_from_memory_with_format(bytes, format) {
        Ok(img) => {
            tracing::debug!("Decoded {:?} image, {}x{}", format, img.width(), img.height());
            true
        }
        Err(e) => {
            tracing::debug!("Cannot decode as {:?}: {}", format, e);
            false
        }
    }
}


// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use super::fixtures::{jpeg_bytes, png_bytes};

    fn png(name: &str, tag: u8) -> UploadedImage {
        UploadedImage::new(name, Some("image/png".into()), png_bytes(tag))
    }

    fn jpeg(name: &str) -> UploadedImage {
        UploadedImage::new(name, Some("image/jpeg".into()), jpeg_bytes(7))
    }

    fn gif(name: &str) -> UploadedImage {
        UploadedImage::new(name, Some("image/gif".into()), b"GIF89a....".to_vec())
    }

    fn controller() -> SlideshowController {
        SlideshowController::new(SlideshowConfig::default())
    }

    fn index_of(d: &StyleDirective) -> Option<usize> {
        d.slide_index()
    }

    #[test]
    fn test_directive_after_ingest_is_first_image() {
        let c = controller();
        let report = c.ingest(vec![png("a.png", 1), jpeg("b.jpg"), png("c.png", 3)]);
        let d = c.current_directive(&report.state);

        assert_eq!(index_of(&d), Some(0));
        assert_eq!(d.image_url, report.state.images()[0].data_url());
        assert_eq!(d.source, BackgroundSource::Slide { index: 0, total: 3 });
    }

    #[test]
    fn test_advance_len_times_is_cyclic() {
        let c = controller();
        let images = vec![png("a.png", 1), png("b.png", 2), png("c.png", 3), jpeg("d.jpg")];
        let start = c.ingest(images).state.advance();
        let len   = start.len();

        let mut state = start.clone();
        for _ in 0..len {
            state = state.advance();
        }
        assert_eq!(state.current_index(), start.current_index());
    }

    #[test]
    fn test_advance_is_noop_for_zero_or_one_image() {
        let c = controller();

        let empty = c.empty_state();
        assert_eq!(empty.clone().advance(), empty);

        let single = c.ingest(vec![png("only.png", 1)]).state;
        assert_eq!(single.phase(), SlideshowPhase::Single);
        assert_eq!(single.clone().advance(), single);
    }

    #[test]
    fn test_all_unsupported_batch_is_empty_with_one_failure_each() {
        let c = controller();
        let report = c.ingest(vec![gif("a.gif"), gif("b.gif"), gif("c.gif")]);

        assert_eq!(report.state.phase(), SlideshowPhase::Empty);
        assert_eq!(report.rejected.len(), 3);
        assert!(report.rejected.iter().all(UploadRejection::is_unsupported_media));
        assert!(c.current_directive(&report.state).is_fallback());
    }

    #[test]
    fn test_two_images_rotate_and_wrap() {
        let c = controller();
        let state = c.ingest(vec![png("first.png", 1), png("second.png", 2)]).state;
        let first  = state.images()[0].data_url();
        let second = state.images()[1].data_url();

        assert_eq!(c.current_directive(&state).image_url, first);
        let state = state.advance();
        assert_eq!(c.current_directive(&state).image_url, second);
        let state = state.advance();
        assert_eq!(c.current_directive(&state).image_url, first);
    }

    #[test]
    fn test_empty_entries_are_skipped_silently() {
        let c = controller();
        let empty = UploadedImage::new("", Some("application/octet-stream".into()), Vec::new());
        let report = c.ingest(vec![empty, png("a.png", 1)]);

        assert_eq!(report.state.len(), 1);
        assert!(report.rejected.is_empty());
    }

    #[test]
    fn test_valid_signature_with_garbage_body_is_malformed() {
        let c = controller();
        let mut fake_png = b"\x89PNG\r\n\x1a\n".to_vec();
        fake_png.extend_from_slice(b"this is not an image at all");
        let mut fake_jpeg = vec![0xFF, 0xD8, 0xFF];
        fake_jpeg.extend_from_slice(b"garbage");
        let mut truncated = png_bytes(5);
        truncated.truncate(truncated.len() / 2);

        let report = c.ingest(vec![
            UploadedImage::new("sig.png", Some("image/png".into()), fake_png),
            UploadedImage::new("sig.jpg", Some("image/jpeg".into()), fake_jpeg),
            UploadedImage::new("half.png", Some("image/png".into()), truncated),
        ]);

        assert!(report.state.is_empty());
        let reasons: Vec<_> = report.rejected.iter().map(|r| r.reason.clone()).collect();
        assert_eq!(
            reasons,
            vec![
                RejectReason::Malformed { expected: "PNG" },
                RejectReason::Malformed { expected: "JPEG" },
                RejectReason::Malformed { expected: "PNG" },
            ]
        );
    }

    #[test]
    fn test_images_past_the_cap_are_rejected() {
        let config = SlideshowConfig { max_images: 2, ..SlideshowConfig::default() };
        let c = SlideshowController::new(config);
        let report = c.ingest(vec![png("a.png", 1), png("b.png", 2), png("c.png", 3)]);

        assert_eq!(report.state.len(), 2);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].file_name, "c.png");
        assert_eq!(report.rejected[0].reason, RejectReason::TooMany { limit: 2 });
    }

    #[test]
    fn test_current_slide_matches_directive() {
        let c = controller();
        let state = c.ingest(vec![png("a.png", 1), png("b.png", 2)]).state.advance();
        let slide = CurrentSlide::of(&state);

        assert_eq!((slide.index, slide.total), (1, 2));
        assert_eq!(c.current_directive(&slide), c.current_directive(&state));
        assert!(c.current_directive(&CurrentSlide::of(&c.empty_state())).is_fallback());
    }

    #[test]
    fn test_only_empty_entries_give_empty_state_without_error() {
        let c = controller();
        let empty = UploadedImage::new("", None, Vec::new());
        let report = c.ingest(vec![empty]);
        assert!(report.state.is_empty());
        assert!(report.rejected.is_empty());
    }

    #[test]
    fn test_bad_items_do_not_abort_the_batch() {
        let ok    = png("ok.png", 1);
        let limit = ok.len() + 1;
        let config = SlideshowConfig { max_image_bytes: limit, ..SlideshowConfig::default() };
        let c = SlideshowController::new(config);

        let mut big = png("big.png", 9);
        big.bytes.extend_from_slice(&[0; 64]);
        let fake = UploadedImage::new("fake.png", Some("image/png".into()), b"not a png".to_vec());

        let report = c.ingest(vec![big, ok, fake, gif("g.gif")]);

        assert_eq!(report.state.len(), 1);
        assert_eq!(report.state.images()[0].file_name, "ok.png");
        let reasons: Vec<_> = report.rejected.iter().map(|r| r.reason.clone()).collect();
        assert!(matches!(reasons[0], RejectReason::Oversized { limit: l, .. } if l == limit));
        assert_eq!(reasons[1], RejectReason::Malformed { expected: "PNG" });
        assert_eq!(reasons[2], RejectReason::UnsupportedMedia("image/gif".into()));
    }

    #[test]
    fn test_svg_upload_is_unsupported() {
        let c = controller();
        let svg = UploadedImage::new("x.svg", Some("image/svg+xml".into()), b"<svg/>".to_vec());
        let report = c.ingest(vec![svg]);
        assert_eq!(
            report.rejected[0].reason,
            RejectReason::UnsupportedMedia("image/svg+xml".into())
        );
    }

    #[test]
    fn test_missing_declared_type_uses_extension() {
        let c = controller();
        let mut photo = jpeg("photo.JPG");
        photo.declared_type = None;
        let mut notes = png("notes.txt", 1);
        notes.declared_type = Some("application/octet-stream".into());

        let report = c.ingest(vec![photo, notes]);
        assert_eq!(report.state.images()[0].media_type, MediaType::Jpeg);
        assert_eq!(report.rejected[0].reason, RejectReason::UnsupportedMedia(".txt".into()));
    }

    #[test]
    fn test_new_ingest_replaces_previous_set() {
        let c = controller();
        let old = c.ingest(vec![png("a.png", 1), png("b.png", 2)]).state.advance();
        assert_eq!(old.current_index(), 1);

        let new = c.ingest(vec![png("c.png", 3)]).state;
        assert_eq!(new.len(), 1);
        assert_eq!(new.current_index(), 0);
        assert_eq!(new.images()[0].file_name, "c.png");
    }

    #[test]
    fn test_more_images_hint() {
        let c = controller();
        assert!(c.ingest(vec![png("a.png", 1)]).state.suggests_more_images());
        assert!(!c.ingest(vec![]).state.suggests_more_images());
        let three = vec![png("a.png", 1), png("b.png", 2), png("c.png", 3)];
        assert!(!c.ingest(three).state.suggests_more_images());
    }

    #[test]
    fn test_fallback_accepts_svg() {
        let svg = UploadedImage::new("bg.svg", Some("image/svg+xml".into()), b"<svg></svg>".to_vec());
        let encoded = encode_fallback(&svg).unwrap();
        assert_eq!(encoded.media_type, MediaType::Svg);

        let broken = UploadedImage::new("bg.png", Some("image/png".into()), b"nope".to_vec());
        assert!(encode_fallback(&broken).is_err());
    }

    #[test]
    fn test_builtin_fallback_is_svg_data_url() {
        let d = controller().current_directive(&SlideshowState::empty(Duration::from_secs(6)));
        assert!(d.is_fallback());
        assert!(d.image_url.starts_with("data:image/svg+xml;base64,"));
    }
}
