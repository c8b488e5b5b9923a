//! Local stand-in for the YouTube watch page, Innertube player and timed-text
//! endpoints.
#![allow(dead_code)]

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use tokio::net::TcpListener;

pub const API_KEY: &str = "stub-api-key_01";
pub const CONSENT_TOKEN: &str = "cb.20240101-00-p0.en+FX+123";

const TIMED_TEXT_EN: &str = r#"<?xml version="1.0" encoding="utf-8" ?><transcript><text start="0" dur="2.5">Hello</text><text start="2.5" dur="1">world</text></transcript>"#;
const TIMED_TEXT_DE: &str = r#"<?xml version="1.0" encoding="utf-8" ?><transcript><text start="0.5" dur="1.75">Hallo &amp;amp; willkommen</text><text start="2.25" dur="2">Welt</text></transcript>"#;

#[derive(Clone)]
struct Stub {
    base: String,
}

/// Start the stub on an ephemeral port inside the current runtime
pub async fn spawn_stub() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());

    let app = Router::new()
        .route("/watch", get(watch))
        .route("/youtubei/v1/player", post(player))
        .route("/api/timedtext", get(timed_text))
        .with_state(Stub { base: base.clone() });

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    base
}

/// Start the stub on its own runtime thread, for tests that block
pub fn spawn_stub_in_background() -> String {
    let (tx, rx) = std::sync::mpsc::channel();

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async move {
            let base = spawn_stub().await;
            tx.send(base).unwrap();
            std::future::pending::<()>().await;
        });
    });

    rx.recv().unwrap()
}

/// Base URL nothing listens on
pub async fn closed_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

fn watch_page() -> String {
    format!(
        r#"<html><head><script>ytcfg.set({{"INNERTUBE_API_KEY": "{}", "INNERTUBE_CLIENT_NAME": "WEB"}});</script></head><body></body></html>"#,
        API_KEY
    )
}

fn consent_page() -> String {
    format!(
        r#"<html><form action="https://consent.youtube.com/s" method="POST"><input type="hidden" name="v" value="{}"></form></html>"#,
        CONSENT_TOKEN
    )
}

async fn watch(Query(params): Query<HashMap<String, String>>, headers: HeaderMap) -> Response {
    let video_id = params.get("v").cloned().unwrap_or_default();

    match video_id.as_str() {
        "captcha" => Html(r#"<html><div class="g-recaptcha" data-sitekey="x"></div></html>"#.to_string())
            .into_response(),
        "consent" => {
            let expected = format!("CONSENT=YES+{}", CONSENT_TOKEN);
            let consented = headers
                .get(header::COOKIE)
                .and_then(|value| value.to_str().ok())
                .map(|cookie| cookie == expected)
                .unwrap_or(false);

            if consented {
                Html(watch_page()).into_response()
            } else {
                Html(consent_page()).into_response()
            }
        }
        _ => Html(watch_page()).into_response(),
    }
}

async fn player(
    State(stub): State<Stub>,
    Query(params): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Response {
    if params.get("key").map(String::as_str) != Some(API_KEY) {
        return StatusCode::FORBIDDEN.into_response();
    }
    if body["context"]["client"]["clientName"] != "ANDROID" {
        return StatusCode::BAD_REQUEST.into_response();
    }

    let video_id = body["videoId"].as_str().unwrap_or_default().to_string();

    match video_id.as_str() {
        "abc123" | "consent" => Json(json!({
            "playabilityStatus": { "status": "OK" },
            "captions": {
                "playerCaptionsTracklistRenderer": {
                    "captionTracks": [
                        {
                            "baseUrl": format!("{}/api/timedtext?v={}&lang=de&fmt=srv3", stub.base, video_id),
                            "name": { "runs": [{ "text": "German" }] },
                            "languageCode": "de"
                        },
                        {
                            "baseUrl": format!("{}/api/timedtext?v={}&lang=en&kind=asr&fmt=srv3", stub.base, video_id),
                            "name": { "runs": [{ "text": "English (auto-generated)" }] },
                            "languageCode": "en",
                            "kind": "asr"
                        }
                    ]
                }
            }
        }))
        .into_response(),
        "nocaps" => Json(json!({ "playabilityStatus": { "status": "OK" } })).into_response(),
        "private" => Json(json!({
            "playabilityStatus": { "status": "LOGIN_REQUIRED", "reason": "This video is private" }
        }))
        .into_response(),
        "limited" => StatusCode::TOO_MANY_REQUESTS.into_response(),
        _ => Json(json!({
            "playabilityStatus": { "status": "ERROR", "reason": "This video is unavailable" }
        }))
        .into_response(),
    }
}

async fn timed_text(Query(params): Query<HashMap<String, String>>) -> Response {
    if params.contains_key("fmt") {
        return (StatusCode::BAD_REQUEST, "srv3 is not served").into_response();
    }

    let body = match params.get("lang").map(String::as_str) {
        Some("en") => TIMED_TEXT_EN,
        Some("de") => TIMED_TEXT_DE,
        _ => return StatusCode::NOT_FOUND.into_response(),
    };

    ([(header::CONTENT_TYPE, "text/xml; charset=utf-8")], body).into_response()
}
