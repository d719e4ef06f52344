//! API integration tests.
//!
//! The router is built around stub inference handles so no ONNX models are
//! needed. Tests that exercise the pipeline skip on machines without a system
//! font to load for labels.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use image::RgbImage;
use tempfile::TempDir;
use tower::ServiceExt;

use hguard_api::{create_router, ApiConfig, AppState};
use hguard_media::{
    load_label_font, CattleDetector, DiseaseClassifier, FrameAnnotator, MediaPipeline,
    MediaResult, NormalizedCrop,
};
use hguard_models::{Detection, PixelRect};

const BOUNDARY: &str = "hguard-test-boundary";

struct CenterDetector;

impl CattleDetector for CenterDetector {
    fn detect(&self, frame: &RgbImage) -> MediaResult<Vec<Detection>> {
        let (w, h) = frame.dimensions();
        Ok(vec![Detection::new(
            PixelRect::new(
                w as f32 * 0.25,
                h as f32 * 0.25,
                w as f32 * 0.75,
                h as f32 * 0.75,
            ),
            0.9,
        )])
    }
}

struct HealthyClassifier;

impl DiseaseClassifier for HealthyClassifier {
    fn classify(&self, _crop: &NormalizedCrop) -> MediaResult<f32> {
        Ok(0.95)
    }
}

/// Build a router backed by stub inference handles writing into `dir`.
/// Returns `None` when no label font is available on this machine.
fn test_router(dir: &TempDir) -> Option<axum::Router> {
    let font = load_label_font().ok()?;
    let annotator = FrameAnnotator::new(Arc::new(CenterDetector), Arc::new(HealthyClassifier), font);
    let pipeline = MediaPipeline::new(annotator, dir.path());

    let config = ApiConfig {
        processed_dir: dir.path().to_string_lossy().to_string(),
        ..ApiConfig::default()
    };
    Some(create_router(AppState::with_pipeline(config, pipeline), None))
}

/// Encode a multipart body: (field name, filename, bytes) per part.
fn multipart_body(parts: &[(&str, &str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, filename, bytes) in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                name, filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn predict_request(parts: &[(&str, &str, &[u8])]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/predict")
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

fn png_bytes() -> Vec<u8> {
    let frame = RgbImage::from_pixel(160, 120, image::Rgb([200, 180, 160]));
    let mut out = Vec::new();
    frame
        .write_to(
            &mut std::io::Cursor::new(&mut out),
            image::ImageFormat::Png,
        )
        .unwrap();
    out
}

/// A noise-filled PNG large enough to exceed axum's 2 MB extractor default.
fn large_png_bytes() -> Vec<u8> {
    let mut seed: u32 = 0x9e37_79b9;
    let mut next = move || {
        seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        (seed >> 24) as u8
    };
    let frame = RgbImage::from_fn(1200, 900, |_, _| image::Rgb([next(), next(), next()]));
    let mut out = Vec::new();
    frame
        .write_to(
            &mut std::io::Cursor::new(&mut out),
            image::ImageFormat::Png,
        )
        .unwrap();
    out
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_endpoint_reports_healthy() {
    let dir = TempDir::new().unwrap();
    let Some(app) = test_router(&dir) else { return };

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn pages_are_served_as_html() {
    let dir = TempDir::new().unwrap();
    let Some(app) = test_router(&dir) else { return };

    for path in [
        "/",
        "/about",
        "/doctorlogin",
        "/doctordashboard",
        "/farmerlogin",
        "/farmerdashboard",
        "/farmerregister",
    ] {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK, "page {}", path);
        let content_type = response.headers()["content-type"].to_str().unwrap();
        assert!(content_type.starts_with("text/html"), "page {}", path);
    }
}

#[tokio::test]
async fn missing_files_field_is_rejected_with_400() {
    let dir = TempDir::new().unwrap();
    let Some(app) = test_router(&dir) else { return };

    let response = app
        .oneshot(predict_request(&[("other", "cow.jpg", b"irrelevant")]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "No file uploaded");
    assert_eq!(json["results"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn disallowed_extension_reports_invalid_file_type() {
    let dir = TempDir::new().unwrap();
    let Some(app) = test_router(&dir) else { return };

    let response = app
        .oneshot(predict_request(&[("files", "notes.txt", b"hello")]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let result = &json["results"][0];
    assert_eq!(result["filename"], "notes.txt");
    assert_eq!(result["status"], "Invalid file type");
    assert!(result["processed_file"].is_null());
}

#[tokio::test]
async fn empty_filename_reports_no_file_selected() {
    let dir = TempDir::new().unwrap();
    let Some(app) = test_router(&dir) else { return };

    let response = app
        .oneshot(predict_request(&[("files", "", b"")]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let result = &json["results"][0];
    assert_eq!(result["filename"], "empty");
    assert_eq!(result["status"], "No file selected");
}

#[tokio::test]
async fn image_upload_is_analysed_and_artifact_written() {
    let dir = TempDir::new().unwrap();
    let Some(app) = test_router(&dir) else { return };

    let png = png_bytes();
    let response = app
        .oneshot(predict_request(&[("files", "cow.png", &png)]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let result = &json["results"][0];
    assert_eq!(result["filename"], "cow.png");
    assert_eq!(result["status"], "Successfully Analysed");

    let url = result["processed_file"].as_str().unwrap();
    let artifact = url.strip_prefix("/assets/processed/").unwrap();
    assert!(artifact.ends_with(".jpg"));
    assert!(dir.path().join(artifact).is_file());
}

#[tokio::test]
async fn upload_above_two_megabytes_is_accepted() {
    let dir = TempDir::new().unwrap();
    let Some(app) = test_router(&dir) else { return };

    let png = large_png_bytes();
    assert!(png.len() > 2 * 1024 * 1024, "fixture must beat the extractor default");

    let response = app
        .oneshot(predict_request(&[("files", "herd.png", &png)]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let result = &json["results"][0];
    assert_eq!(result["filename"], "herd.png");
    assert_eq!(result["status"], "Successfully Analysed");
}

#[tokio::test]
async fn batch_keeps_one_result_per_file_in_order() {
    let dir = TempDir::new().unwrap();
    let Some(app) = test_router(&dir) else { return };

    let png = png_bytes();
    let response = app
        .oneshot(predict_request(&[
            ("files", "a.png", &png),
            ("files", "b.txt", b"nope"),
            ("files", "c.png", b"not a real png"),
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let results = json["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0]["filename"], "a.png");
    assert_eq!(results[0]["status"], "Successfully Analysed");
    assert_eq!(results[1]["filename"], "b.txt");
    assert_eq!(results[1]["status"], "Invalid file type");
    assert_eq!(results[2]["filename"], "c.png");
    assert_eq!(results[2]["status"], "Processing failed");
}

#[tokio::test]
async fn processed_artifact_is_served_with_content_type() {
    let dir = TempDir::new().unwrap();
    let Some(app) = test_router(&dir) else { return };

    std::fs::write(dir.path().join("processed_test.jpg"), b"jpeg-bytes").unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/assets/processed/processed_test.jpg")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "image/jpeg");
}

#[tokio::test]
async fn missing_artifact_is_404() {
    let dir = TempDir::new().unwrap();
    let Some(app) = test_router(&dir) else { return };

    let response = app
        .oneshot(
            Request::builder()
                .uri("/assets/processed/processed_nope.jpg")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn path_traversal_in_artifact_name_is_rejected() {
    let dir = TempDir::new().unwrap();
    let Some(app) = test_router(&dir) else { return };

    let response = app
        .oneshot(
            Request::builder()
                .uri("/assets/processed/..%2Fsecret.txt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn security_headers_are_present() {
    let dir = TempDir::new().unwrap();
    let Some(app) = test_router(&dir) else { return };

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let headers = response.headers();
    assert!(headers.contains_key("X-Content-Type-Options"));
    assert!(headers.contains_key("X-Frame-Options"));
    assert!(headers.contains_key("X-Request-ID"));
}
