//! Router-level tests against a mocked backend.

#![allow(clippy::unwrap_used)]

use std::net::{IpAddr, Ipv4Addr};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use luxe_storefront::config::{BackendConfig, StorefrontConfig};
use luxe_storefront::state::AppState;
use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use tower::ServiceExt;
use wiremock::matchers::{body_json, body_partial_json, header as header_eq, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn setup() -> (MockServer, Router) {
    let server = MockServer::start().await;
    let config = StorefrontConfig {
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 3000,
        base_url: "http://localhost:3000".to_string(),
        session_secret: SecretString::from("k9#Lm2$Qx7!Rv4@Tz8%Wb3^Yd6&Hn1*Pj5"),
        backend: BackendConfig {
            base_url: server.uri(),
            ..Default::default()
        },
        sentry_dsn: None,
        sentry_environment: None,
    };
    let state = AppState::new(config).unwrap();
    (server, luxe_storefront::app(state).unwrap())
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(response: &axum::response::Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
}

fn session_cookie(response: &axum::response::Response) -> String {
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    cookie.split(';').next().unwrap().to_string()
}

fn form(uri: &str) -> axum::http::request::Builder {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
}

async fn mount_product(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/v1/products/p1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"product": {
                "_id": "p1",
                "name": "آباژور برنجی",
                "price": 2_500_000,
                "stock": 3,
                "images": ["/uploads/lamp.jpg"]
            }}
        })))
        .mount(server)
        .await;
}

fn get(uri: &str, cookie: &str) -> Request<Body> {
    Request::get(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

/// Run the phone and code steps; returns the signed-in session cookie.
async fn sign_in(server: &MockServer, app: &Router) -> String {
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/send"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/verify"))
        .and(body_json(json!({"phone": "09121234567", "otp": "1234"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "token": "tok-1",
                "user": {
                    "_id": "u1",
                    "phone": "09121234567",
                    "firstName": "مریم",
                    "lastName": "احمدی",
                    "roles": ["USER"],
                    "addresses": []
                }
            }
        })))
        .expect(1)
        .mount(server)
        .await;

    let response = app
        .clone()
        .oneshot(
            form("/register/send")
                .header("x-forwarded-for", "203.0.113.20")
                .body(Body::from("phone=09121234567"))
                .unwrap(),
        )
        .await
        .unwrap();
    let cookie = session_cookie(&response);

    // Persian digits are accepted for the code
    let response = app
        .clone()
        .oneshot(
            form("/register/verify")
                .header("x-forwarded-for", "203.0.113.20")
                .header(header::COOKIE, &cookie)
                .body(Body::from("otp=%DB%B1%DB%B2%DB%B3%DB%B4"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/profile");
    cookie
}

#[tokio::test]
async fn test_health_sets_security_headers() {
    let (_server, app) = setup().await;

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-frame-options"], "DENY");
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(body_text(response).await, "ok");
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let (_server, app) = setup().await;

    let response = app
        .oneshot(
            Request::get("/health")
                .header("x-request-id", "abc-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers()["x-request-id"], "abc-123");
}

#[tokio::test]
async fn test_home_renders_featured_products() {
    let (server, app) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"products": [{"_id": "p1", "name": "مبل راحتی", "price": 48_000_000}]}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/collections"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"collections": [{"_id": "c1", "name": "کلاسیک", "slug": "classic"}]}
        })))
        .mount(&server)
        .await;

    let response = app
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("مبل راحتی"));
    assert!(html.contains("/collection/classic"));
    assert!(html.contains("dir=\"rtl\""));
}

#[tokio::test]
async fn test_home_survives_backend_outage() {
    let (server, app) = setup().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "down"})))
        .mount(&server)
        .await;

    let response = app
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_missing_product_is_not_found() {
    let (server, app) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/products/nope"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "not found"})))
        .mount(&server)
        .await;

    let response = app
        .oneshot(Request::get("/product/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_add_to_cart_redirects_and_updates_badge() {
    let (server, app) = setup().await;
    mount_product(&server).await;

    let body = "product_id=p1&return_to=%2Fshop";
    let response = app
        .clone()
        .oneshot(form("/cart/add").body(Body::from(body)).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/shop");
    let cookie = session_cookie(&response);

    let response = app
        .oneshot(
            Request::get("/cart/count")
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains('۱'));
}

#[tokio::test]
async fn test_add_to_cart_rejects_external_return_path() {
    let (server, app) = setup().await;
    mount_product(&server).await;

    let body = "product_id=p1&return_to=%2F%2Fevil.example.com";
    let response = app
        .oneshot(form("/cart/add").body(Body::from(body)).unwrap())
        .await
        .unwrap();

    assert_eq!(location(&response), "/cart");
}

#[tokio::test]
async fn test_htmx_add_to_cart_triggers_refresh() {
    let (server, app) = setup().await;
    mount_product(&server).await;

    let body = "product_id=p1";
    let response = app
        .oneshot(
            form("/cart/add")
                .header("hx-request", "true")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["hx-trigger"], "cart-updated");
    let html = body_text(response).await;
    assert!(html.contains("cart-count"));
    assert!(html.contains("hx-swap-oob"));
}

#[tokio::test]
async fn test_checkout_requires_sign_in() {
    let (_server, app) = setup().await;

    let response = app
        .oneshot(Request::get("/checkout").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/register");
}

#[tokio::test]
async fn test_send_code_forwards_phone() {
    let (server, app) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/send"))
        .and(body_json(json!({"phone": "09121234567"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "sent"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let body = "phone=%DB%B0%DB%B9%DB%B1%DB%B2%DB%B1%DB%B2%DB%B3%DB%B4%DB%B5%DB%B6%DB%B7";
    let response = app
        .clone()
        .oneshot(
            form("/register/send")
                .header("x-forwarded-for", "203.0.113.10")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/register");
    let cookie = session_cookie(&response);

    // The code step is shown once a code is pending
    let response = app
        .oneshot(
            Request::get("/register")
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let html = body_text(response).await;
    assert!(html.contains("/register/verify"));
}

#[tokio::test]
async fn test_add_to_cart_refuses_out_of_stock() {
    let (server, app) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/products/p0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"product": {"_id": "p0", "name": "میز ناهارخوری", "price": 9_000_000, "stock": 0}}
        })))
        .mount(&server)
        .await;

    let response = app
        .clone()
        .oneshot(form("/cart/add").body(Body::from("product_id=p0")).unwrap())
        .await
        .unwrap();
    assert_eq!(location(&response), "/cart");
    let cookie = session_cookie(&response);

    let html = body_text(app.oneshot(get("/cart", &cookie)).await.unwrap()).await;
    assert!(html.contains(luxe_storefront::routes::cart::OUT_OF_STOCK));
    assert!(!html.contains("میز ناهارخوری"));
}

#[tokio::test]
async fn test_update_cart_caps_unbounded_quantity() {
    let (server, app) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/products/p9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"product": {"_id": "p9", "name": "گلدان", "price": 100_000}}
        })))
        .mount(&server)
        .await;

    let response = app
        .clone()
        .oneshot(form("/cart/add").body(Body::from("product_id=p9")).unwrap())
        .await
        .unwrap();
    let cookie = session_cookie(&response);

    let response = app
        .clone()
        .oneshot(
            form("/cart/update")
                .header(header::COOKIE, &cookie)
                .body(Body::from("product_id=p9&quantity=9223372036854775807"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(location(&response), "/cart");

    let response = app.oneshot(get("/cart", &cookie)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("۹۹۹"));
}

#[tokio::test]
async fn test_verify_code_signs_in() {
    let (server, app) = setup().await;
    let cookie = sign_in(&server, &app).await;

    let response = app.clone().oneshot(get("/profile", &cookie)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains(luxe_storefront::routes::auth::SIGNED_IN));
    assert!(html.contains("مریم"));
    assert!(html.contains("۰۹۱۲۱۲۳۴۵۶۷"));

    // The code step is gone once signed in
    let response = app.oneshot(get("/register", &cookie)).await.unwrap();
    assert_eq!(location(&response), "/profile");
}

#[tokio::test]
async fn test_verify_without_pending_phone_is_refused() {
    let (_server, app) = setup().await;

    let response = app
        .oneshot(
            form("/register/verify")
                .header("x-forwarded-for", "203.0.113.21")
                .body(Body::from("otp=1234"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/register");
}

#[tokio::test]
async fn test_create_address_uses_saved_address() {
    let (server, app) = setup().await;
    let cookie = sign_in(&server, &app).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/users/me/addresses"))
        .and(header_eq("authorization", "Bearer tok-1"))
        .and(body_partial_json(json!({"name": "خانه", "cityId": 12})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "success": true,
            "data": {"user": {"_id": "u1", "addresses": [
                {"_id": "a0", "name": "قدیمی", "address": "کرج"},
                {"_id": "a1", "name": "خانه", "address": "تهران، خیابان ولیعصر", "postalCode": "1234567890"}
            ]}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let body = "name=%D8%AE%D8%A7%D9%86%D9%87&address=%3Cb%3Eold%3C%2Fb%3E&postal_code=1&city_id=12&lat=35.7&lng=51.4";
    let response = app
        .clone()
        .oneshot(
            form("/profile/addresses")
                .header(header::COOKIE, &cookie)
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(location(&response), "/profile");

    let html = body_text(app.oneshot(get("/profile", &cookie)).await.unwrap()).await;
    assert!(html.contains(luxe_storefront::routes::profile::ADDRESS_ADDED));
    assert!(html.contains("تهران، خیابان ولیعصر"));
    assert!(html.contains("۱۲۳۴۵۶۷۸۹۰"));
    assert!(!html.contains("کرج"));
}

#[tokio::test]
async fn test_create_address_falls_back_to_form_values() {
    let (server, app) = setup().await;
    let cookie = sign_in(&server, &app).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/users/me/addresses"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"success": true, "data": {}})))
        .mount(&server)
        .await;

    let body = "name=%D9%85%D8%AD%D9%84+%DA%A9%D8%A7%D8%B1&address=%D8%B4%DB%8C%D8%B1%D8%A7%D8%B2&city_id=3";
    let response = app
        .clone()
        .oneshot(
            form("/profile/addresses")
                .header(header::COOKIE, &cookie)
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(location(&response), "/profile");

    let html = body_text(app.oneshot(get("/profile", &cookie)).await.unwrap()).await;
    assert!(html.contains("محل کار"));
    assert!(html.contains("شیراز"));
}

#[tokio::test]
async fn test_profile_update_signs_out() {
    let (server, app) = setup().await;
    let cookie = sign_in(&server, &app).await;
    Mock::given(method("PATCH"))
        .and(path("/api/v1/users/me"))
        .and(header_eq("authorization", "Bearer tok-1"))
        .and(body_json(json!({
            "firstName": "سارا",
            "lastName": "احمدی",
            "email": "sara@example.com",
            "username": "sara"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"user": {"_id": "u1", "firstName": "سارا"}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let body = "first_name=%D8%B3%D8%A7%D8%B1%D8%A7&last_name=%D8%A7%D8%AD%D9%85%D8%AF%DB%8C&email=sara%40example.com&username=+sara+";
    let response = app
        .clone()
        .oneshot(
            form("/profile")
                .header(header::COOKIE, &cookie)
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(location(&response), "/register");

    let response = app.clone().oneshot(get("/profile", &cookie)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/register");

    let html = body_text(app.oneshot(get("/register", &cookie)).await.unwrap()).await;
    assert!(html.contains(luxe_storefront::routes::profile::PROFILE_UPDATED));
    assert!(!html.contains("/register/verify"));
}
