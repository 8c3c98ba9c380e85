#![allow(clippy::unwrap_used)]

use luxe_client::{ApiClient, ApiConfig, ApiError, ProductQuery, UserQuery};
use luxe_core::{Address, AddressId, Product, ProductId, RatingSummary, Role};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, header, header_regex, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn setup() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let client = ApiClient::new(&ApiConfig::new(server.uri())).unwrap();
    (server, client)
}

fn product(id: &str, summary: Option<RatingSummary>) -> Product {
    serde_json::from_value(json!({
        "_id": id,
        "name": id,
        "price": 1000,
        "ratingSummary": summary,
    }))
    .unwrap()
}

#[tokio::test]
async fn test_bearer_token_and_query_are_sent() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/products"))
        .and(query_param("limit", "4"))
        .and(query_param("featured", "true"))
        .and(header("authorization", "Bearer secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"products": [{"_id": "p1", "name": "Lamp", "price": 1_250_000}]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let page = client
        .with_token(Some("secret-token"))
        .list_products(&ProductQuery {
            limit: Some(4),
            featured: Some(true),
            ..Default::default()
        })
        .await
        .unwrap()
        .into_data()
        .unwrap();

    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].name, "Lamp");
}

#[tokio::test]
async fn test_bare_array_product_list() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"_id": "p1", "name": "A", "price": 10},
            {"_id": "p2", "name": "B", "price": 20}
        ])))
        .mount(&server)
        .await;

    let envelope = client
        .anonymous()
        .list_products(&ProductQuery::default())
        .await
        .unwrap();
    assert!(envelope.success);
    assert_eq!(envelope.into_data().unwrap().items.len(), 2);
}

#[tokio::test]
async fn test_rate_limit_uses_fallback_message() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/send"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let err = client.anonymous().send_otp("09120000000").await.unwrap_err();
    assert!(err.is_rate_limited());
    assert_eq!(err.status(), Some(429));
    assert_eq!(
        err.to_string(),
        "تعداد درخواست‌های شما از حد مجاز بیشتر است. لطفاً کمی صبر کنید."
    );
}

#[tokio::test]
async fn test_rate_limit_prefers_server_message() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/send"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({"message": "slow down"})))
        .mount(&server)
        .await;

    let err = client.anonymous().send_otp("09120000000").await.unwrap_err();
    assert_eq!(err.to_string(), "slow down");
}

#[tokio::test]
async fn test_error_field_wins_over_message() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/verify"))
        .and(body_json(json!({"phone": "09120000000", "otp": "1234"})))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"error": "کد نامعتبر", "message": "bad"})),
        )
        .mount(&server)
        .await;

    let err = client
        .anonymous()
        .verify_otp("09120000000", "1234")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 400, .. }));
    assert_eq!(err.to_string(), "کد نامعتبر");
}

#[tokio::test]
async fn test_status_fallback_and_text_bodies() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/products/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/products/broken"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let api = client.anonymous();
    let missing = api.get_product(&ProductId::from("missing")).await.unwrap_err();
    assert!(missing.is_not_found());
    assert_eq!(missing.to_string(), "HTTP error! status: 404");

    let broken = api.get_product(&ProductId::from("broken")).await.unwrap_err();
    assert_eq!(broken.status(), Some(502));
    assert_eq!(broken.to_string(), "Bad Gateway");
}

#[tokio::test]
async fn test_verify_returns_token_and_profile() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/verify"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "token": "jwt",
                "user": {"_id": "u1", "phone": "09120000000", "roles": ["ADMIN"], "firstName": "Sara"}
            }
        })))
        .mount(&server)
        .await;

    let data = client
        .anonymous()
        .verify_otp("09120000000", "1234")
        .await
        .unwrap()
        .into_data()
        .unwrap();
    assert_eq!(data.token.as_deref(), Some("jwt"));
    let user = data.user.unwrap();
    assert_eq!(user.roles, Some(vec![Role::Admin]));
    assert_eq!(user.first_name.as_deref(), Some("Sara"));
}

#[tokio::test]
async fn test_banned_users_alias_and_user_pagination() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users/banned"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"bannedUsers": [{"phone": "09120000000"}]}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"users": [{"_id": "u1", "phone": "0912"}], "total": 25}
        })))
        .mount(&server)
        .await;

    let api = client.anonymous();
    let bans = api.banned_users(None, None).await.unwrap().into_data().unwrap();
    assert_eq!(bans.items[0].phone, "09120000000");

    let users = api
        .list_users(&UserQuery {
            page: Some(2),
            limit: Some(10),
            search: None,
        })
        .await
        .unwrap()
        .into_data()
        .unwrap();
    assert_eq!(users.items.len(), 1);
    assert_eq!(users.pagination.page_count(10), 3);
}

#[tokio::test]
async fn test_ratings_prefer_embedded_and_default_on_failure() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/comments/product/p2/summary"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"summary": {"average": 3.5, "count": 2}}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/comments/product/p3/summary"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let embedded = RatingSummary {
        average: 4.0,
        count: 9,
    };
    let products = vec![
        product("p1", Some(embedded)),
        product("p2", None),
        product("p3", None),
    ];

    let api = client.anonymous();
    let ratings = api.ratings_for(&products).await;
    assert_eq!(ratings[&ProductId::from("p1")], embedded);
    assert_eq!(ratings[&ProductId::from("p2")].count, 2);
    assert_eq!(ratings[&ProductId::from("p3")], RatingSummary::default());

    // Second lookup is served from cache (the mock expects one call)
    let again = api.comment_summary(&ProductId::from("p2")).await.unwrap();
    assert_eq!(again.count, 2);
}

#[tokio::test]
async fn test_multipart_product_upload() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/products"))
        .and(header("authorization", "Bearer admin"))
        .and(header_regex("content-type", "^multipart/form-data"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"success": true, "data": {}})))
        .expect(1)
        .mount(&server)
        .await;

    let draft = luxe_core::validation::ProductDraft {
        name: "Lamp".into(),
        description: "Brass".into(),
        category: "روشنایی".into(),
        sub_category: "آویز".into(),
        collection: "c1".into(),
        section: "living".into(),
        price: "1000".into(),
        stock: "3".into(),
        is_active: true,
        featured: false,
        tags: String::new(),
    };
    let fields = draft.validate(1, true).unwrap();
    let upload = luxe_client::ProductUpload {
        fields,
        images: vec![luxe_client::ImageUpload {
            file_name: "lamp.png".into(),
            content_type: "image/png".into(),
            bytes: vec![0x89, 0x50, 0x4e, 0x47],
        }],
    };

    let ack = client.with_token(Some("admin")).create_product(upload).await.unwrap();
    assert!(ack.success);
}

#[tokio::test]
async fn test_unreachable_backend_names_base_url() {
    let client = ApiClient::new(&ApiConfig::new("http://127.0.0.1:9")).unwrap();
    let err = client
        .anonymous()
        .list_products(&ProductQuery::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Network { .. }));
    assert!(err.to_string().contains("http://127.0.0.1:9"));
}

#[tokio::test]
async fn test_me_returns_profile() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/auth/me"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"user": {"_id": "u7", "phone": "09127778899", "roles": ["USER"], "addresses": []}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let user = client
        .with_token(Some("tok"))
        .me()
        .await
        .unwrap()
        .into_data()
        .unwrap()
        .user
        .unwrap();
    assert_eq!(user.phone.as_deref(), Some("09127778899"));
    assert_eq!(user.roles, Some(vec![Role::User]));
}

#[tokio::test]
async fn test_me_rejects_missing_token() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/auth/me"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "توکن نامعتبر"})))
        .mount(&server)
        .await;

    let err = client.anonymous().me().await.unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert_eq!(err.to_string(), "توکن نامعتبر");
}

#[tokio::test]
async fn test_list_addresses() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users/me/addresses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"addresses": [
                {"_id": "a1", "name": "خانه", "postalCode": "1234567890", "cityId": 1,
                 "location": {"lat": 35.7, "lng": 51.4}, "address": "تهران"},
                {"_id": "a2", "name": "محل کار", "postalCode": null}
            ]}
        })))
        .mount(&server)
        .await;

    let page = client
        .with_token(Some("tok"))
        .list_addresses()
        .await
        .unwrap()
        .into_data()
        .unwrap();
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].id, Some(AddressId::from("a1")));
    assert!((page.items[0].location.lat - 35.7).abs() < f64::EPSILON);
    assert_eq!(page.items[1].postal_code, "");
}

#[tokio::test]
async fn test_update_and_delete_address() {
    let (server, client) = setup().await;
    Mock::given(method("PATCH"))
        .and(path("/api/v1/users/me/addresses/a1"))
        .and(body_partial_json(json!({"name": "خانه جدید", "postalCode": "1111111111"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"user": {"_id": "u1", "addresses": [{"_id": "a1", "name": "خانه جدید"}]}}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/users/me/addresses/a1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true, "message": "deleted"})))
        .expect(1)
        .mount(&server)
        .await;

    let api = client.with_token(Some("tok"));
    let address = Address {
        name: "خانه جدید".into(),
        postal_code: "1111111111".into(),
        ..Address::default()
    };
    let updated = api
        .update_address(&AddressId::from("a1"), &address)
        .await
        .unwrap()
        .into_data()
        .unwrap();
    assert_eq!(updated.newest_address().unwrap().name, "خانه جدید");

    let ack = api.delete_address(&AddressId::from("a1")).await.unwrap();
    assert!(ack.success);
}
