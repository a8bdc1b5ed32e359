// ============================================================
// Layer 1 - HTTP Handlers
// ============================================================
// Every page-producing request is one render pass:
//
//   1. find (or start) the caller's session from its cookie
//   2. apply this request's change to the session context
//      (new upload set, or nothing)
//   3. copy out a SessionView and release the lock
//   4. build the directive and render, attach the session cookie
//
// Rotation ticks come from the page's script as POSTs to
// /background/tick and get JSON back; they never re-render the
// page, so form input survives them.
//
// Uploads are validated and encoded BEFORE the session lock is
// taken, so the stored slideshow is only ever replaced whole.

use axum::{
    extract::{Multipart, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    Form, Json,
};
use serde_json::{json, Value};
use std::{collections::HashMap, sync::Arc};

use crate::application::serve_use_case::AppState;
use crate::application::session::{SessionContext, SessionId};
use crate::application::slideshow::SlideshowPhase;
use crate::domain::image::UploadedImage;
use crate::web::error::AppError;
use crate::web::page::{render_page, FormView, PageView, UPLOAD_FIELD};

pub type SharedState = Arc<AppState>;

pub const SESSION_COOKIE: &str = "hp_session";

// ─── Page routes ──────────────────────────────────────────────────────────────

pub async fn index(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    render_pass(&state, &headers, FormView::default(), |_| {})
}

pub async fn upload_background(
    State(state):  State<SharedState>,
    headers:       HeaderMap,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let mut uploads = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let declared  = field.content_type().map(str::to_string);
        let bytes     = field.bytes().await?;
        uploads.push(UploadedImage::new(file_name, declared, bytes.to_vec()));
    }

    tracing::info!("Received {} background upload(s)", uploads.len());
    let report = state.slideshow.ingest(uploads);

    Ok(render_pass(&state, &headers, FormView::default(), move |ctx| ctx.replace(report)))
}

pub async fn clear_background(
    State(state): State<SharedState>,
    headers:      HeaderMap,
) -> Response {
    let report = state.slideshow.ingest(Vec::new());
    render_pass(&state, &headers, FormView::default(), move |ctx| ctx.replace(report))
}

pub async fn predict_form(
    State(state):  State<SharedState>,
    headers:       HeaderMap,
    Form(values):  Form<HashMap<String, String>>,
) -> Response {
    let outcome = state.predictor.estimate(&values).map(|(_, price)| price);
    match &outcome {
        Ok(price) => tracing::info!("Prediction served: {:.2}", price),
        Err(e)    => tracing::warn!("Form submission rejected: {}", e),
    }

    let form = FormView { values, outcome: Some(outcome) };
    render_pass(&state, &headers, form, |_| {})
}

// ─── JSON / service routes ────────────────────────────────────────────────────

/// `POST /background/tick`: advance the caller's slideshow one step
/// and return the background to show next.
pub async fn tick_background(
    State(state): State<SharedState>,
    headers:      HeaderMap,
) -> Response {
    let (id, view) = state.sessions.with_session(session_from_headers(&headers), |ctx| {
        ctx.tick();
        ctx.view()
    });
    let directive = state.slideshow.current_directive(&view.slide);

    let mut response = Json(json!({
        "image_url": directive.image_url,
        "index":     directive.slide_index(),
        "total":     view.slide.total,
        "rotating":  view.phase == SlideshowPhase::Rotating,
        "fallback":  directive.is_fallback(),
    }))
    .into_response();
    set_session_cookie(&mut response, id);
    response
}

/// `POST /api/predict` with a JSON object of feature values.
pub async fn api_predict(
    State(state): State<SharedState>,
    Json(body):   Json<serde_json::Map<String, Value>>,
) -> Response {
    let widgets: HashMap<String, String> = body
        .into_iter()
        .filter_map(|(name, value)| {
            let text = match value {
                Value::Null      => return None,
                Value::String(s) => s,
                Value::Bool(b)   => (if b { "1" } else { "0" }).to_string(),
                other            => other.to_string(),
            };
            Some((name, text))
        })
        .collect();

    match state.predictor.estimate(&widgets) {
        Ok((features, price)) => Json(json!({ "price": price, "features": features })).into_response(),
        Err(e) => {
            tracing::warn!("API prediction rejected: {}", e);
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "error": e.to_string(), "fields": e.fields() })),
            )
                .into_response()
        }
    }
}

pub async fn health() -> &'static str {
    "ok"
}

// ─── Render pass ──────────────────────────────────────────────────────────────

fn render_pass(
    state:   &AppState,
    headers: &HeaderMap,
    form:    FormView,
    update:  impl FnOnce(&mut SessionContext),
) -> Response {
    let (id, view) = state.sessions.with_session(session_from_headers(headers), |ctx| {
        update(ctx);
        ctx.view()
    });
    let directive = state.slideshow.current_directive(&view.slide);

    let html = render_page(&PageView {
        directive:     &directive,
        phase:         view.phase,
        suggests_more: view.suggests_more,
        interval_secs: state.slideshow.config().interval.as_secs(),
        rejected:      &view.rejected,
        form:          &form,
        model:         state.predictor.model(),
    });

    let mut response = Html(html).into_response();
    set_session_cookie(&mut response, id);
    response
}

fn session_from_headers(headers: &HeaderMap) -> Option<SessionId> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().strip_prefix(SESSION_COOKIE)?.strip_prefix('='))
        .find_map(|id| id.parse().ok())
}

fn set_session_cookie(response: &mut Response, id: SessionId) {
    let cookie = format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax");
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
}
