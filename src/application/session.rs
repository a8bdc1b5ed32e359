// ============================================================
// Layer 2 - Session Context
// ============================================================
// Everything that belongs to one visitor's session lives in a
// SessionContext: the slideshow state and the rejections from
// their last upload. Contexts are created on the first request
// of a session and dropped once the session has been idle for
// longer than the TTL.
//
// The store is the only shared structure. The HTTP runtime is
// multi-threaded, so it sits behind a mutex; each session only
// ever sees its own context. The store holds at most
// `max_sessions` contexts: starting one more evicts the session
// that has been idle longest.
//
// Callers copy a SessionView out under the lock and do the
// expensive work (data URLs, HTML) after releasing it.

use parking_lot::Mutex;
use std::{
    collections::HashMap,
    fmt,
    str::FromStr,
    time::{Duration, Instant},
};

use crate::application::slideshow::{CurrentSlide, IngestReport, SlideshowPhase, SlideshowState};
use crate::domain::error::UploadRejection;

/// Opaque random session identifier, printed as 16 hex digits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

impl SessionId {
    pub fn generate() -> Self {
        Self(rand::random())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        u64::from_str_radix(s, 16).map(Self)
    }
}

/// Per-session state
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub slideshow: SlideshowState,
    /// Skipped files from the most recent upload, shown until the next one
    pub rejected:  Vec<UploadRejection>,
    last_seen:     Instant,
}

impl SessionContext {
    pub fn new(slideshow: SlideshowState) -> Self {
        Self {
            slideshow,
            rejected:  Vec::new(),
            last_seen: Instant::now(),
        }
    }

    /// Apply one rotation tick to this session's slideshow
    pub fn tick(&mut self) {
        let interval = self.slideshow.interval();
        let state = std::mem::replace(&mut self.slideshow, SlideshowState::empty(interval));
        self.slideshow = state.advance();
    }

    /// Swap in a freshly ingested upload set
    pub fn replace(&mut self, report: IngestReport) {
        self.slideshow = report.state;
        self.rejected  = report.rejected;
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            slide:         CurrentSlide::of(&self.slideshow),
            phase:         self.slideshow.phase(),
            suggests_more: self.slideshow.suggests_more_images(),
            rejected:      self.rejected.clone(),
        }
    }
}

/// The parts of a session one render pass reads
#[derive(Debug, Clone)]
pub struct SessionView {
    pub slide:         CurrentSlide,
    pub phase:         SlideshowPhase,
    pub suggests_more: bool,
    pub rejected:      Vec<UploadRejection>,
}

/// All live sessions
pub struct SessionStore {
    sessions:     Mutex<HashMap<SessionId, SessionContext>>,
    ttl:          Duration,
    max_sessions: usize,
    initial:      SlideshowState,
}

impl SessionStore {
    /// `initial` is the slideshow state every new session starts with
    pub fn new(ttl: Duration, max_sessions: usize, initial: SlideshowState) -> Self {
        Self {
            sessions:     Mutex::new(HashMap::new()),
            ttl,
            max_sessions: max_sessions.max(1),
            initial,
        }
    }

    /// Run `f` against the caller's session, creating it if the id is
    /// absent, unknown or expired. Returns the id actually used.
    pub fn with_session<R>(
        &self,
        id: Option<SessionId>,
        f:  impl FnOnce(&mut SessionContext) -> R,
    ) -> (SessionId, R) {
        let now = Instant::now();
        let mut sessions = self.sessions.lock();

        let before = sessions.len();
        sessions.retain(|_, ctx| now.duration_since(ctx.last_seen) <= self.ttl);
        if sessions.len() < before {
            tracing::debug!("Expired {} idle session(s)", before - sessions.len());
        }

        let id = match id {
            Some(id) if sessions.contains_key(&id) => id,
            _ => {
                while sessions.len() >= self.max_sessions {
                    let oldest = sessions
                        .iter()
                        .min_by_key(|(_, ctx)| ctx.last_seen)
                        .map(|(id, _)| *id);
                    match oldest {
                        Some(oldest) => {
                            tracing::debug!("Session limit reached, evicting {}", oldest);
                            sessions.remove(&oldest);
                        }
                        None => break,
                    }
                }
                SessionId::generate()
            }
        };

        let ctx = sessions.entry(id).or_insert_with(|| {
            tracing::debug!("Starting session {}", id);
            SessionContext::new(self.initial.clone())
        });
        ctx.last_seen = now;
        (id, f(ctx))
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }
}
