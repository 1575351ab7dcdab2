//! HTTP 层冒烟测试 — 路由拼装、错误包封、multipart 门槛
//!
//! 走完整的 axum 栈 (in-process, 不绑端口)。
//! Run: cargo test -p gym-server --test api_surface

use axum::body::Body;
use http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::Service;

use gym_server::core::server::build_app;
use gym_server::core::{Config, ServerState};

async fn test_app() -> (tempfile::TempDir, axum::Router) {
    let tmp = tempfile::tempdir().unwrap();
    let config = Config {
        work_dir: tmp.path().to_string_lossy().into_owned(),
        http_port: 0,
        environment: "development".to_string(),
        timezone: chrono_tz::Asia::Kolkata,
        auto_checkout_time: chrono::NaiveTime::from_hms_opt(23, 59, 0).unwrap(),
        upstream_timeout_ms: 30_000,
        ai_api_url: String::new(),
        ai_api_key: String::new(),
        ai_model: "gemini-1.5-flash".to_string(),
    };
    let state = ServerState::initialize(&config).await;
    (tmp, build_app(state))
}

async fn send(app: &mut axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.call(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_reports_database_roundtrip() {
    let (_tmp, mut app) = test_app().await;

    let (status, body) = send(&mut app, get("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"]["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn register_fetch_roundtrip() {
    let (_tmp, mut app) = test_app().await;

    let (status, body) = send(
        &mut app,
        post_json(
            "/api/members",
            json!({"name": "Ravi Kumar", "phone": "9876512345"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["member_id"], "MEM001");
    assert_eq!(body["status"], "Pending");
    assert_eq!(body["payment_status"], "paid");

    // id 以 "table:id" 字符串下发，原样可回查
    let id = body["id"].as_str().unwrap().to_string();
    assert!(id.starts_with("member:"));

    let (status, body) = send(&mut app, get(&format!("/api/members/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["member_id"], "MEM001");
}

#[tokio::test]
async fn errors_carry_the_envelope() {
    let (_tmp, mut app) = test_app().await;

    // 不存在的会员
    let (status, body) = send(&mut app, get("/api/members/member:missing")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "E0003");
    assert!(body["message"].as_str().unwrap().contains("not found"));

    // 表名不匹配的 ID
    let (status, body) = send(&mut app, get("/api/members/trainer:abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "E0002");

    // 非法手机号
    let (status, body) = send(
        &mut app,
        post_json("/api/members", json!({"name": "X", "phone": "12"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "E0002");
    assert!(body["message"].as_str().unwrap().contains("phone"));

    // 未注册的路由走 axum 缺省 404，无包封
    let (status, _) = send(&mut app, get("/api/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn self_service_check_in_requires_photo() {
    let (_tmp, mut app) = test_app().await;

    let boundary = "gymtestboundary";
    let form = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"identifier\"\r\n\r\n\
         MEM001\r\n\
         --{boundary}--\r\n"
    );
    let request = Request::builder()
        .method("POST")
        .uri("/api/attendance/self/check-in")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(form))
        .unwrap();

    // 照片门槛先于会员解析，没有照片不落任何记录
    let (status, body) = send(&mut app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "E0002");
    assert!(body["message"].as_str().unwrap().contains("photo"));
}

#[tokio::test]
async fn commentary_labels_the_fallback() {
    let (_tmp, mut app) = test_app().await;

    let (status, body) = send(&mut app, get("/api/analytics/commentary")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "fallback");
    assert!(
        body["commentary"]
            .as_str()
            .unwrap()
            .starts_with("[Automated summary; AI commentary is not configured]")
    );
    assert_eq!(body["summary"]["total_revenue"], 0.0);
    assert_eq!(body["summary"]["payment_count"], 0);
}
