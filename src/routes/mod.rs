mod api;
mod auth;
mod pages;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(pages::index))
        .route("/verify", get(pages::verify_lookup))
        .route("/verify/:code", get(pages::verify_page))
        .route("/api/auth", post(auth::login).delete(auth::logout))
        .route(
            "/api/certificates",
            get(api::list_certificates).post(api::create_certificate),
        )
        .route(
            "/api/certificates/:id",
            get(api::get_certificate)
                .patch(api::update_certificate)
                .delete(api::delete_certificate),
        )
        .route("/api/certificates/:id/pdf", get(api::download_certificate))
        .route("/api/verify/:code", get(api::verify_certificate))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::db::memory::MemoryStore;
    use crate::qr::{decode_modules, expected_modules};
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, Response, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        let state = AppState::new(Arc::new(Config::for_tests()), Arc::new(MemoryStore::new()));
        router(Arc::new(state))
    }

    fn json_request(method: &str, uri: &str, cookie: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn empty_request(method: &str, uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_json(response: Response<Body>) -> Value {
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    async fn body_text(response: Response<Body>) -> String {
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(body.to_vec()).unwrap()
    }

    /// Logs in and returns the `name=value` pair to send back as a cookie.
    async fn login(app: &Router) -> String {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/auth",
                None,
                json!({"email": "admin@example.com", "password": "secret"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }

    async fn create(app: &Router, cookie: &str, body: Value) -> Value {
        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/certificates", Some(cookie), body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        body_json(response).await
    }

    fn sample() -> Value {
        json!({
            "recipient_name": "NIYOMUGABO Adelite",
            "recipient_email": "a@x.com",
            "deutschlevel": "B1",
            "pruefungsdatum": "2025-10-26",
            "pruefungsort": "Kigali",
            "hoeren": 80,
            "lesen": 63,
            "schreiben": 70,
            "sprechen": 60
        })
    }

    #[tokio::test]
    async fn admin_routes_require_session() {
        let app = app();
        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/certificates", None, sample()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"], "Unauthorized");

        let response = app
            .clone()
            .oneshot(empty_request("GET", "/api/certificates", Some("admin-session=forged")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn login_rejects_bad_credentials() {
        let app = app();
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/auth",
                None,
                json!({"email": "admin@example.com", "password": "wrong"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"], "Invalid credentials");

        let response = app
            .oneshot(json_request("POST", "/api/auth", None, json!({"email": "admin@example.com"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn logout_ends_the_session() {
        let app = app();
        let cookie = login(&app).await;

        let response = app
            .clone()
            .oneshot(empty_request("DELETE", "/api/auth", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(empty_request("GET", "/api/certificates", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn invalid_input_is_rejected_with_message() {
        let app = app();
        let cookie = login(&app).await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/certificates",
                Some(&cookie),
                json!({"recipient_email": "a@x.com"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "recipient_name is required");

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/certificates",
                Some(&cookie),
                json!({"recipient_name": "X", "recipient_email": "not-an-email"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn issue_verify_deactivate_delete() {
        let app = app();
        let cookie = login(&app).await;

        let created = create(&app, &cookie, sample()).await;
        let code = created["certificate_code"].as_str().unwrap().to_string();
        let id = created["id"].as_str().unwrap().to_string();
        assert!(code.starts_with("CERT-"));
        assert_eq!(created["is_active"], true);

        let url = format!("https://certificate.kigalideutschacademy.com/verify/{}", code);
        let token = created["qr_code_url"].as_str().unwrap();
        assert_eq!(decode_modules(token).unwrap(), expected_modules(&url).unwrap());

        let response = app
            .clone()
            .oneshot(empty_request("GET", &format!("/api/verify/{}", code), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let verified = body_json(response).await;
        assert_eq!(verified["recipient_name"], "NIYOMUGABO Adelite");
        assert_eq!(verified["hoeren"], 80);

        let response = app
            .clone()
            .oneshot(json_request(
                "PATCH",
                &format!("/api/certificates/{}", id),
                Some(&cookie),
                json!({"action": "deactivate"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(empty_request("GET", &format!("/api/verify/{}", code), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"], "Certificate not found");

        // still visible to the administrator
        let response = app
            .clone()
            .oneshot(empty_request("GET", "/api/certificates", Some(&cookie)))
            .await
            .unwrap();
        let listed = body_json(response).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);
        assert_eq!(listed[0]["is_active"], false);

        let response = app
            .clone()
            .oneshot(empty_request("DELETE", &format!("/api/certificates/{}", id), Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(empty_request("GET", &format!("/api/certificates/{}", id), Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unknown_action_is_a_bad_request() {
        let app = app();
        let cookie = login(&app).await;
        let created = create(&app, &cookie, sample()).await;

        let response = app
            .oneshot(json_request(
                "PATCH",
                &format!("/api/certificates/{}", created["id"].as_str().unwrap()),
                Some(&cookie),
                json!({"action": "activate"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "Invalid action");
    }

    #[tokio::test]
    async fn missing_rows_are_404() {
        let app = app();
        let cookie = login(&app).await;
        let id = uuid::Uuid::new_v4();

        for (method, uri) in [
            ("GET", format!("/api/certificates/{}", id)),
            ("DELETE", format!("/api/certificates/{}", id)),
            ("GET", format!("/api/certificates/{}/pdf", id)),
            ("GET", "/api/certificates/not-a-uuid".to_string()),
            ("DELETE", "/api/certificates/not-a-uuid".to_string()),
            ("GET", "/api/certificates/not-a-uuid/pdf".to_string()),
        ] {
            let response = app
                .clone()
                .oneshot(empty_request(method, &uri, Some(&cookie)))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{method} {uri}");
            assert_eq!(body_json(response).await["error"], "Certificate not found");
        }

        let response = app
            .clone()
            .oneshot(json_request(
                "PATCH",
                "/api/certificates/not-a-uuid",
                Some(&cookie),
                json!({"action": "deactivate"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .oneshot(empty_request("GET", "/api/verify/CERT-UNKNOWN-0000", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn verify_page_renders_both_pages() {
        let app = app();
        let cookie = login(&app).await;
        let created = create(&app, &cookie, sample()).await;
        let code = created["certificate_code"].as_str().unwrap();

        let response = app
            .clone()
            .oneshot(empty_request("GET", &format!("/verify/{}", code), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("NIYOMUGABO Adelite"));
        assert!(html.contains("B1 - DEUTSCH - ZERTIFIKAT"));
        assert!(html.contains("26.10.2025"));
        assert_eq!(html.matches("class=\"page\"").count(), 2);

        let response = app
            .oneshot(empty_request("GET", "/verify/CERT-NOPE-0000", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_text(response).await.contains("CERT-NOPE-0000"));
    }

    #[tokio::test]
    async fn lookup_form_redirects_to_code() {
        let app = app();
        let response = app
            .clone()
            .oneshot(empty_request("GET", "/verify?code=%20CERT-ABC-123%20", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/verify/CERT-ABC-123");

        let response = app
            .oneshot(empty_request("GET", "/verify?code=", None))
            .await
            .unwrap();
        assert_eq!(response.headers()[header::LOCATION], "/");
    }
}
