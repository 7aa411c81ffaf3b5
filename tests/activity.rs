use axum::{body::to_bytes, http::Request, Router};
use gpxfix_rs::{config::Config, routes, state::AppState};
use serde_json::Value;
use tower::ServiceExt;

fn app() -> Router {
    let config = Config::from_env();
    let state = AppState::new(config);
    Router::new()
        .merge(routes::health::router())
        .merge(routes::upload::router())
        .merge(routes::activity::router())
        .with_state(state)
}

fn sample_gpx() -> &'static str {
    r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test">
  <trk><name>Test Run</name><trkseg>
    <trkpt lat="52.5200" lon="13.4050"><ele>34.0</ele><time>2026-01-01T12:00:00Z</time></trkpt>
    <trkpt lat="52.5203" lon="13.4050"><ele>36.0</ele><time>2026-01-01T12:00:10Z</time></trkpt>
    <trkpt lat="52.5306" lon="13.4050"><ele>36.0</ele><time>2026-01-01T12:00:20Z</time></trkpt>
    <trkpt lat="52.5206" lon="13.4050"><ele>35.0</ele><time>2026-01-01T12:00:30Z</time></trkpt>
  </trkseg></trk>
</gpx>"#
}

fn multipart_body(file_name: &str, file_body: &str, boundary: &str) -> String {
    format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n{file_body}\r\n--{boundary}--\r\n"
    )
}

async fn upload(app: &Router) -> String {
    let boundary = "X-BOUNDARY-TEST";
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/upload")
                .method("POST")
                .header(
                    "content-type",
                    format!("multipart/form-data; boundary={boundary}"),
                )
                .body(axum::body::Body::from(multipart_body("run.gpx", sample_gpx(), boundary)))
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), axum::http::StatusCode::OK);

    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("upload body");
    let json: Value = serde_json::from_slice(&body).expect("upload json");
    json.get("file_id")
        .and_then(Value::as_str)
        .expect("file id")
        .to_string()
}

fn get(uri: String) -> Request<axum::body::Body> {
    Request::builder()
        .uri(uri)
        .method("GET")
        .body(axum::body::Body::empty())
        .expect("request")
}

#[tokio::test]
async fn export_returns_cleaned_gpx() {
    let app = app();
    let file_id = upload(&app).await;

    let response = app
        .oneshot(get(format!("/api/activities/{file_id}/export")))
        .await
        .expect("response");

    assert_eq!(response.status(), axum::http::StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    assert_eq!(content_type, "application/gpx+xml");

    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let text = String::from_utf8(body.to_vec()).expect("utf8");
    assert_eq!(text.matches("<trkpt ").count(), 3);
    assert!(!text.contains("52.5306"));
}

#[tokio::test]
async fn drops_report_running_totals() {
    let app = app();
    let file_id = upload(&app).await;

    let response = app
        .oneshot(get(format!("/api/activities/{file_id}/drops")))
        .await
        .expect("response");

    assert_eq!(response.status(), axum::http::StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let drops: Vec<Value> = serde_json::from_slice(&body).expect("drops json");

    assert_eq!(drops.len(), 3);
    assert_eq!(drops[2]["index"], 3);
    assert_eq!(drops[2]["elapsed_seconds"], 20.0);
    assert_eq!(drops[2]["aggregates"]["distance"], 66.0);
    assert_eq!(drops[2]["aggregates"]["time"], 30.0);
}

#[tokio::test]
async fn unknown_activity_is_not_found() {
    let response = app()
        .oneshot(get("/api/activities/missing/export".to_string()))
        .await
        .expect("response");

    assert_eq!(response.status(), axum::http::StatusCode::NOT_FOUND);
}
