// ============================================================
// Layer 1 - Web Presentation Layer
// ============================================================
// The single-page app, served with axum:
//
//   GET  /                   render pass
//   POST /background         multipart upload of slideshow images
//   POST /background/tick    advance the slideshow, JSON background back
//   POST /background/clear   back to the fallback background
//   POST /predict            form submission → price or inline errors
//   POST /api/predict        JSON in, JSON out
//   GET  /health             liveness check
//
// Like the CLI, this layer only routes and renders. All
// decisions are made by the application layer.

pub mod error;
pub mod handlers;
pub mod page;

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::trace::TraceLayer;

use crate::application::serve_use_case::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    // Room for a full upload set plus multipart overhead
    let config = state.slideshow.config();
    let upload_limit = config
        .max_image_bytes
        .saturating_mul(config.max_images)
        .saturating_add(1024 * 1024);

    Router::new()
        .route("/", get(handlers::index))
        .route(
            "/background",
            post(handlers::upload_background).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(page::TICK_PATH, post(handlers::tick_background))
        .route("/background/clear", post(handlers::clear_background))
        .route("/predict", post(handlers::predict_form))
        .route("/api/predict", post(handlers::api_predict))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until Ctrl-C.
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Cannot bind to {addr}"))?;

    tracing::info!("Serving on http://{}", listener.local_addr()?);

    axum::serve(listener, router(Arc::new(state)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

// ─── Router Tests ─────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use std::time::Duration;
    use tower::ServiceExt;

    use crate::application::predict_use_case::PredictUseCase;
    use crate::application::session::SessionStore;
    use crate::application::slideshow::fixtures::png_bytes;
    use crate::application::slideshow::{SlideshowConfig, SlideshowController};
    use crate::domain::image::{EncodedImage, MediaType};
    use crate::ml::model::LinearModel;

    const BOUNDARY: &str = "X-TEST-BOUNDARY";
    const CONSTANT_PRICE: f64 = 475_000.0;

    fn app() -> Router {
        // No terms: the model always answers its intercept
        let model     = LinearModel::new(Vec::new(), CONSTANT_PRICE);
        let slideshow = SlideshowController::new(SlideshowConfig::default());
        let sessions  = SessionStore::new(Duration::from_secs(60), 100, slideshow.empty_state());
        router(Arc::new(AppState {
            predictor: PredictUseCase::new(model),
            slideshow,
            sessions,
        }))
    }

    fn multipart_body(files: &[(&str, &str, Vec<u8>)]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, content_type, bytes) in files {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"images\"; filename=\"{name}\"\r\n\
                     Content-Type: {content_type}\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn upload_request(files: &[(&str, &str, Vec<u8>)], cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::post("/background").header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::from(multipart_body(files))).unwrap()
    }

    fn form_request(body: &'static str) -> Request<Body> {
        Request::post("/predict")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    }

    fn tick_request(cookie: &str) -> Request<Body> {
        Request::post("/background/tick")
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        serde_json::from_str(&body_text(response).await).unwrap()
    }

    fn cookie_of(response: &Response) -> String {
        let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn data_url_of(tag: u8) -> String {
        EncodedImage::encode("x.png", MediaType::Png, &png_bytes(tag)).data_url()
    }

    fn background_of(tag: u8) -> String {
        format!("url('{}')", data_url_of(tag))
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "ok");
    }

    #[tokio::test]
    async fn test_first_visit_gets_cookie_and_fallback() {
        let response = app()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(cookie_of(&response).starts_with("hp_session="));

        let html = body_text(response).await;
        assert!(html.contains("data:image/svg+xml;base64,"));
        assert!(html.contains("No images uploaded"));
        assert!(!html.contains("/background/tick"));
    }

    #[tokio::test]
    async fn test_upload_then_ticks_rotate_background() {
        let app = app();

        let response = app
            .clone()
            .oneshot(upload_request(
                &[("one.png", "image/png", png_bytes(1)), ("two.png", "image/png", png_bytes(2))],
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = cookie_of(&response);
        let html = body_text(response).await;
        assert!(html.contains(&background_of(1)));
        assert!(html.contains("fetch('/background/tick'"));

        let json = body_json(app.clone().oneshot(tick_request(&cookie)).await.unwrap()).await;
        assert_eq!(json["image_url"], data_url_of(2));
        assert_eq!(json["index"], 1);
        assert_eq!(json["total"], 2);
        assert_eq!(json["rotating"], true);

        let json = body_json(app.clone().oneshot(tick_request(&cookie)).await.unwrap()).await;
        assert_eq!(json["image_url"], data_url_of(1));

        // A page load shows the current slide without advancing it
        let reload = || {
            Request::get("/")
                .header(header::COOKIE, cookie.as_str())
                .body(Body::empty())
                .unwrap()
        };
        let html = body_text(app.clone().oneshot(reload()).await.unwrap()).await;
        assert!(html.contains(&background_of(1)));
        let html = body_text(app.oneshot(reload()).await.unwrap()).await;
        assert!(html.contains(&background_of(1)));
    }

    #[tokio::test]
    async fn test_form_input_survives_rotation() {
        let app = app();
        let response = app
            .clone()
            .oneshot(upload_request(
                &[("one.png", "image/png", png_bytes(1)), ("two.png", "image/png", png_bytes(2))],
                None,
            ))
            .await
            .unwrap();
        let cookie = cookie_of(&response);

        // Half-filled form: the re-rendered page keeps the values and still rotates
        let submit = Request::post("/predict")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(header::COOKIE, cookie.as_str())
            .body(Body::from("sqft_living=3120&bedrooms=4&bathrooms="))
            .unwrap();
        let html = body_text(app.clone().oneshot(submit).await.unwrap()).await;
        assert!(html.contains("value=\"3120\""));
        assert!(html.contains("fetch('/background/tick'"));
        assert!(!html.contains("http-equiv=\"refresh\""));

        // The tick answers with JSON only; nothing on the page is replaced
        let response = app.oneshot(tick_request(&cookie)).await.unwrap();
        assert_eq!(
            response.headers()[header::CONTENT_TYPE].to_str().unwrap(),
            "application/json"
        );
        let json = body_json(response).await;
        assert_eq!(json["image_url"], data_url_of(2));
        assert!(json.get("form").is_none());
    }

    #[tokio::test]
    async fn test_tick_without_images_reports_fallback() {
        let json = body_json(app().oneshot(tick_request("hp_session=00000000000000ff")).await.unwrap()).await;
        assert_eq!(json["fallback"], true);
        assert_eq!(json["rotating"], false);
        assert!(json["index"].is_null());
    }

    #[tokio::test]
    async fn test_garbage_behind_png_signature_is_rejected() {
        let mut fake = b"\x89PNG\r\n\x1a\n".to_vec();
        fake.extend_from_slice(b"this is not an image at all");
        let response = app()
            .oneshot(upload_request(&[("fake.png", "image/png", fake)], None))
            .await
            .unwrap();
        let html = body_text(response).await;
        assert!(html.contains("fake.png: content is not a valid PNG image"));
        assert!(html.contains("No images uploaded"));
    }

    #[tokio::test]
    async fn test_rejected_uploads_are_listed() {
        let response = app()
            .oneshot(upload_request(
                &[("cat.gif", "image/gif", b"GIF89a".to_vec()), ("ok.png", "image/png", png_bytes(1))],
                None,
            ))
            .await
            .unwrap();
        let html = body_text(response).await;
        assert!(html.contains("Skipped files"));
        assert!(html.contains("cat.gif"));
        assert!(html.contains(&background_of(1)));
        assert!(html.contains("Upload at least 3 images"));
    }

    #[tokio::test]
    async fn test_clear_returns_to_fallback() {
        let app = app();
        let response = app
            .clone()
            .oneshot(upload_request(&[("one.png", "image/png", png_bytes(1))], None))
            .await
            .unwrap();
        let cookie = cookie_of(&response);

        let clear = Request::post("/background/clear")
            .header(header::COOKIE, cookie.as_str())
            .body(Body::empty())
            .unwrap();
        let html = body_text(app.oneshot(clear).await.unwrap()).await;
        assert!(!html.contains(&background_of(1)));
        assert!(html.contains("data:image/svg+xml;base64,"));
    }

    #[tokio::test]
    async fn test_form_prediction_is_rendered() {
        let response = app()
            .oneshot(form_request("sqft_living=2000&bedrooms=3&bathrooms=2&grade=7&waterfront=0"))
            .await
            .unwrap();
        let html = body_text(response).await;
        assert!(html.contains("Estimated Price"));
        assert!(html.contains("$475,000.00"));
    }

    #[tokio::test]
    async fn test_incomplete_form_highlights_missing_fields() {
        let response = app()
            .oneshot(form_request("sqft_living=2000&bedrooms=&bathrooms=2&waterfront=0"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Please fill in: Bedrooms, Quality Grade"));
        assert!(!html.contains("Estimated Price"));
    }

    #[tokio::test]
    async fn test_api_predict() {
        let ok = Request::post("/api/predict")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                r#"{"sqft_living": 2000, "bedrooms": 3, "bathrooms": 2, "grade": 7, "waterfront": false}"#,
            ))
            .unwrap();
        let response = app().oneshot(ok).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["price"], CONSTANT_PRICE);
        assert_eq!(json["features"]["waterfront"], false);

        let incomplete = Request::post("/api/predict")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"sqft_living": 2000, "grade": null}"#))
            .unwrap();
        let response = app().oneshot(incomplete).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = body_json(response).await;
        assert_eq!(
            json["fields"],
            serde_json::json!(["bedrooms", "bathrooms", "grade", "waterfront"])
        );
    }
}
