use super::*;
use axum::{
    body::{self, Body},
    http::{header, Request},
};
use integrations::SessionConfig;
use shared::domain::LeadStatus;
use tower::ServiceExt;

const BOUNDARY: &str = "lead-form-boundary";

fn test_app() -> (Router, Arc<AppState>) {
    let api = ApiContext::new(LeadStore::new(), Arc::new(MemoryObjectStorage::new()));
    let sessions: Arc<dyn SessionProvider> = Arc::new(JwtSessionProvider::new(SessionConfig {
        secret: "test-secret".to_string(),
        ttl_seconds: 600,
        staff_username: "staff".to_string(),
        staff_password: "hunter2".to_string(),
    }));
    let state = Arc::new(AppState { api, sessions });
    (build_router(state.clone(), 1024 * 1024), state)
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn form_request(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::post(uri).header(
        header::CONTENT_TYPE,
        "application/x-www-form-urlencoded",
    );
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

fn multipart_request(fields: &[(&str, &str)], resume: Option<(&str, &[u8])>) -> Request<Body> {
    let mut payload = Vec::new();
    for (name, value) in fields {
        payload.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, bytes)) = resume {
        payload.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"resume\"; \
                 filename=\"{file_name}\"\r\nContent-Type: application/pdf\r\n\r\n"
            )
            .as_bytes(),
        );
        payload.extend_from_slice(bytes);
        payload.extend_from_slice(b"\r\n");
    }
    payload.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::post("/submit")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(payload))
        .expect("request")
}

async fn body_json(response: Response) -> serde_json::Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

async fn body_text(response: Response) -> String {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    String::from_utf8(bytes.to_vec()).expect("utf8")
}

fn ana() -> serde_json::Value {
    serde_json::json!({
        "firstName": "Ana",
        "lastName": "Lee",
        "email": "ana@x.com",
        "linkedin": "https://li/ana",
        "message": "help"
    })
}

async fn sign_in(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(form_request(
            "/login",
            "username=staff&password=hunter2",
            None,
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .expect("session cookie");
    cookie
        .split(';')
        .next()
        .expect("cookie pair")
        .to_string()
}

#[tokio::test]
async fn healthz_reports_ok() {
    let (app, _) = test_app();
    let request = Request::get("/healthz")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
}

#[tokio::test]
async fn lead_lifecycle_over_json_api() {
    let (app, _) = test_app();

    let response = app
        .clone()
        .oneshot(json_request("POST", "/leads", ana()))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["message"], "Lead submitted successfully");
    assert_eq!(created["lead"]["status"], "PENDING");
    assert_eq!(created["lead"]["email"], "ana@x.com");

    let response = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            "/leads",
            serde_json::json!({ "email": "ana@x.com", "status": "REACHED_OUT" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["message"], "Lead status updated");
    assert_eq!(updated["lead"]["status"], "REACHED_OUT");

    let response = app
        .oneshot(Request::get("/leads").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let listed = body_json(response).await;
    let leads = listed.as_array().expect("array");
    assert_eq!(leads.len(), 1);
    assert_eq!(leads[0]["email"], "ana@x.com");
    assert_eq!(leads[0]["status"], "REACHED_OUT");
}

#[tokio::test]
async fn create_without_email_is_rejected_and_nothing_is_stored() {
    let (app, state) = test_app();
    let mut candidate = ana();
    candidate
        .as_object_mut()
        .expect("object")
        .remove("email");

    let response = app
        .oneshot(json_request("POST", "/leads", candidate))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error = body_json(response).await;
    assert_eq!(error["code"], "validation");
    assert!(state.api.store.is_empty().await);
}

#[tokio::test]
async fn update_for_unknown_email_is_not_found() {
    let (app, _) = test_app();
    let response = app
        .oneshot(json_request(
            "PATCH",
            "/leads",
            serde_json::json!({ "email": "ghost@x.com", "status": "REACHED_OUT" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "not_found");
}

#[tokio::test]
async fn reverting_to_pending_is_conflict() {
    let (app, _) = test_app();
    app.clone()
        .oneshot(json_request("POST", "/leads", ana()))
        .await
        .expect("create");
    app.clone()
        .oneshot(json_request(
            "PATCH",
            "/leads",
            serde_json::json!({ "email": "ana@x.com", "status": "REACHED_OUT" }),
        ))
        .await
        .expect("forward");

    let response = app
        .oneshot(json_request(
            "PATCH",
            "/leads",
            serde_json::json!({ "email": "ana@x.com", "status": "PENDING" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let (app, _) = test_app();
    let request = Request::post("/leads")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "validation");
}

#[tokio::test]
async fn form_page_renders_every_field() {
    let (app, state) = test_app();
    let response = app
        .oneshot(Request::get("/").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    for field in state.api.form.fields() {
        assert!(
            html.contains(&format!("name=\"{}\"", field.name)),
            "missing {}",
            field.name
        );
    }
    assert!(html.contains("action=\"/submit\""));
}

#[tokio::test]
async fn multipart_submission_stores_lead_with_resume() {
    let (app, state) = test_app();
    let request = multipart_request(
        &[
            ("firstName", "Ana"),
            ("lastName", "Lee"),
            ("email", "ana@x.com"),
            ("country", "Portugal"),
            ("linkedin", "https://li/ana"),
            ("visas", "O1"),
            ("visas", "EB2-NIW"),
            ("message", "help"),
        ],
        Some(("cv.pdf", &b"%PDF-1.7"[..])),
    );

    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Lead submitted successfully!"));

    let leads = state.api.store.list().await;
    assert_eq!(leads.len(), 1);
    assert_eq!(leads[0].status, LeadStatus::Pending);
    assert_eq!(leads[0].visas.len(), 2);
    assert!(leads[0]
        .resume
        .as_deref()
        .is_some_and(|url| url.ends_with("-cv.pdf")));
}

#[tokio::test]
async fn invalid_multipart_submission_echoes_field_errors() {
    let (app, state) = test_app();
    let request = multipart_request(&[("firstName", "Ana"), ("email", "not-an-email")], None);

    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("class=\"field-error\""));
    assert!(html.contains("value=\"Ana\""));
    assert!(state.api.store.is_empty().await);
}

#[tokio::test]
async fn console_requires_a_session() {
    let (app, _) = test_app();
    let response = app
        .oneshot(
            Request::get("/leads-list")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).expect("location"),
        "/login"
    );
}

#[tokio::test]
async fn forged_session_cookie_is_ignored() {
    let (app, _) = test_app();
    let request = Request::get("/leads-list")
        .header(header::COOKIE, "lead_session=forged.token.value")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn bad_credentials_render_login_error() {
    let (app, _) = test_app();
    let response = app
        .oneshot(form_request(
            "/login",
            "username=staff&password=wrong",
            None,
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    assert!(body_text(response)
        .await
        .contains("Invalid username or password"));
}

#[tokio::test]
async fn incomplete_login_form_renders_login_error() {
    let (app, _) = test_app();
    let response = app
        .oneshot(form_request("/login", "username=staff", None))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    assert!(body_text(response)
        .await
        .contains("Invalid username or password"));
}

#[tokio::test]
async fn staff_can_view_and_mark_leads() {
    let (app, state) = test_app();
    app.clone()
        .oneshot(json_request("POST", "/leads", ana()))
        .await
        .expect("create");
    let cookie = sign_in(&app).await;

    let console = Request::get("/leads-list")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .expect("request");
    let response = app.clone().oneshot(console).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("ana@x.com"));
    assert!(html.contains("Mark as Reached Out"));

    let response = app
        .clone()
        .oneshot(form_request(
            "/leads-list/reached-out",
            "email=ana%40x.com",
            Some(&cookie),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).expect("location"),
        "/leads-list"
    );
    assert_eq!(state.api.store.list().await[0].status, LeadStatus::ReachedOut);

    let console = Request::get("/leads-list")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .expect("request");
    let html = body_text(app.oneshot(console).await.expect("response")).await;
    assert!(!html.contains("Mark as Reached Out"));
}

#[tokio::test]
async fn marking_without_session_changes_nothing() {
    let (app, state) = test_app();
    app.clone()
        .oneshot(json_request("POST", "/leads", ana()))
        .await
        .expect("create");

    let response = app
        .oneshot(form_request(
            "/leads-list/reached-out",
            "email=ana%40x.com",
            None,
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(state.api.store.list().await[0].status, LeadStatus::Pending);
}

#[tokio::test]
async fn logout_clears_the_cookie() {
    let (app, _) = test_app();
    let response = app
        .oneshot(Request::post("/logout").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .expect("cookie");
    assert!(cookie.starts_with("lead_session=;"));
    assert!(cookie.contains("Max-Age=0"));
}

#[test]
fn error_codes_map_to_http_statuses() {
    assert_eq!(status_for(ErrorCode::Validation), StatusCode::BAD_REQUEST);
    assert_eq!(status_for(ErrorCode::NotFound), StatusCode::NOT_FOUND);
    assert_eq!(status_for(ErrorCode::Conflict), StatusCode::CONFLICT);
    assert_eq!(status_for(ErrorCode::Unauthorized), StatusCode::UNAUTHORIZED);
    assert_eq!(
        status_for(ErrorCode::Internal),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}
