use axum::http::{self, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use mock_server::{app, Category, Post, Tag, ADMIN_PASSWORD, ADMIN_USERNAME};
use serde_json::Value;
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: &str) -> Request<String> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(body.to_string()).unwrap()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

async fn login(app: &Router) -> String {
    let body = format!(r#"{{"username":"{ADMIN_USERNAME}","password":"{ADMIN_PASSWORD}"}}"#);
    let resp = app
        .clone()
        .oneshot(json_request("POST", "/api/user/login", None, &body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let envelope: Value = body_json(resp).await;
    envelope["data"]["token"].as_str().unwrap().to_string()
}

// --- user ---

#[tokio::test]
async fn login_with_wrong_password_is_enveloped_401() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/api/user/login",
            None,
            r#"{"username":"admin","password":"nope"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let envelope: Value = body_json(resp).await;
    assert_eq!(envelope["success"], false);
    assert_eq!(envelope["message"], "invalid credentials");
    assert_eq!(envelope["code"], 401);
}

#[tokio::test]
async fn writes_without_token_get_plain_401() {
    let resp = app()
        .oneshot(json_request("POST", "/api/category", None, r#"{"name":"Rust"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(&body_bytes(resp).await[..], b"unauthorized");
}

#[tokio::test]
async fn unknown_token_is_rejected() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/api/tag",
            Some("forged"),
            r#"{"name":"Rust"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- category ---

#[tokio::test]
async fn list_categories_empty_is_enveloped() {
    let resp = app().oneshot(get("/api/category")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let envelope: Value = body_json(resp).await;
    assert_eq!(envelope["success"], true);
    assert_eq!(envelope["data"]["total"], 0);
    assert!(envelope["data"]["categories"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn get_category_not_found_has_bare_message() {
    let resp = app().oneshot(get("/api/category/missing")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(resp).await;
    assert_eq!(body, serde_json::json!({"message": "not found"}));
}

#[tokio::test]
async fn category_lifecycle() {
    let app = app();
    let token = login(&app).await;

    let resp = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/category",
            Some(&token),
            r#"{"name":"Rust","icon":"mdi:language-rust"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let envelope: Value = body_json(resp).await;
    assert_eq!(envelope["code"], 201);
    let created: Category = serde_json::from_value(envelope["data"].clone()).unwrap();

    let dup = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/category",
            Some(&token),
            r#"{"name":"Rust"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(dup.status(), StatusCode::CONFLICT);

    let options = app
        .clone()
        .oneshot(get("/api/category/select-options"))
        .await
        .unwrap();
    let envelope: Value = body_json(options).await;
    assert_eq!(envelope["data"][0]["name"], "Rust");

    let uri = format!("/api/category/{}", created.id);
    let resp = app
        .clone()
        .oneshot(json_request("PUT", &uri, Some(&token), r#"{"description":"systems"}"#))
        .await
        .unwrap();
    let envelope: Value = body_json(resp).await;
    assert_eq!(envelope["data"]["description"], "systems");
    assert_eq!(envelope["data"]["name"], "Rust");

    let resp = app
        .clone()
        .oneshot(json_request("DELETE", &uri, Some(&token), ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    let resp = app.clone().oneshot(get(&uri)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn categories_paginate_and_filter() {
    let app = app();
    let token = login(&app).await;
    for name in ["Rust", "Go", "Ruby"] {
        let body = format!(r#"{{"name":"{name}"}}"#);
        app.clone()
            .oneshot(json_request("POST", "/api/category", Some(&token), &body))
            .await
            .unwrap();
    }

    let resp = app
        .clone()
        .oneshot(get("/api/category?page=2&pageSize=2"))
        .await
        .unwrap();
    let envelope: Value = body_json(resp).await;
    assert_eq!(envelope["data"]["total"], 3);
    assert_eq!(envelope["data"]["categories"][0]["name"], "Ruby");

    let resp = app.clone().oneshot(get("/api/category?query=ru")).await.unwrap();
    let envelope: Value = body_json(resp).await;
    assert_eq!(envelope["data"]["total"], 2);
}

// --- tag ---

#[tokio::test]
async fn tags_are_bare_payloads() {
    let app = app();
    let token = login(&app).await;

    let resp = app
        .clone()
        .oneshot(json_request("POST", "/api/tag", Some(&token), r#"{"name":"async"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let tag: Tag = body_json(resp).await;
    assert_eq!(tag.name, "async");
    assert_eq!(tag.post_count, 0);

    let resp = app.clone().oneshot(get("/api/tag")).await.unwrap();
    let page: Value = body_json(resp).await;
    assert!(page.get("success").is_none());
    assert_eq!(page["total"], 1);
}

#[tokio::test]
async fn duplicate_tag_carries_backend_code() {
    let app = app();
    let token = login(&app).await;
    for _ in 0..2 {
        app.clone()
            .oneshot(json_request("POST", "/api/tag", Some(&token), r#"{"name":"io"}"#))
            .await
            .unwrap();
    }
    let resp = app
        .clone()
        .oneshot(json_request("POST", "/api/tag", Some(&token), r#"{"name":"io"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = body_json(resp).await;
    assert_eq!(body["message"], "tag exists");
    assert_eq!(body["code"], 40901);
}

#[tokio::test]
async fn delete_missing_tag_is_404() {
    let app = app();
    let token = login(&app).await;
    let resp = app
        .oneshot(json_request("DELETE", "/api/tag/missing", Some(&token), ""))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- post ---

#[tokio::test]
async fn create_post_and_filter_by_tag() {
    let app = app();
    let token = login(&app).await;

    let resp = app
        .clone()
        .oneshot(json_request("POST", "/api/tag", Some(&token), r#"{"name":"rust"}"#))
        .await
        .unwrap();
    let tag: Tag = body_json(resp).await;

    let body = format!(
        r#"{{"title":"Ownership","description":"d","coverImage":"c.png","categoryId":"c1","tagIds":["{}"],"content":"borrowing","isRecommended":true}}"#,
        tag.id
    );
    let resp = app
        .clone()
        .oneshot(json_request("POST", "/api/post", Some(&token), &body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let envelope: Value = body_json(resp).await;
    let post: Post = serde_json::from_value(envelope["data"].clone()).unwrap();
    assert!(post.is_public);

    let uri = format!("/api/post?isRecommended=true&tagId=other%2C{}", tag.id);
    let resp = app.clone().oneshot(get(&uri)).await.unwrap();
    let envelope: Value = body_json(resp).await;
    assert_eq!(envelope["data"]["total"], 1);

    let resp = app
        .clone()
        .oneshot(get("/api/post?page=18446744073709551615"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app.clone().oneshot(get("/api/post?keyword=absent")).await.unwrap();
    let envelope: Value = body_json(resp).await;
    assert_eq!(envelope["data"]["total"], 0);

    let uri = format!("/api/post/{}", post.id);
    let resp = app
        .clone()
        .oneshot(json_request("PUT", &uri, Some(&token), r#"{"isPublic":false}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let envelope: Value = body_json(resp).await;
    assert_eq!(envelope["data"]["isPublic"], false);
    assert_eq!(envelope["data"]["title"], "Ownership");

    let resp = app.clone().oneshot(get("/api/post/all")).await.unwrap();
    let envelope: Value = body_json(resp).await;
    assert_eq!(envelope["data"]["posts"][0]["title"], "Ownership");

    let resp = app.clone().oneshot(get("/api/tag")).await.unwrap();
    let page: Value = body_json(resp).await;
    assert_eq!(page["tags"][0]["postCount"], 1);
}

#[tokio::test]
async fn post_without_title_is_422() {
    let app = app();
    let token = login(&app).await;
    let resp = app
        .oneshot(json_request(
            "POST",
            "/api/post",
            Some(&token),
            r#"{"title":" ","description":"d","coverImage":"c","categoryId":"c1","content":"x"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let envelope: Value = body_json(resp).await;
    assert_eq!(envelope["message"], "title required");
}

// --- upload ---

#[tokio::test]
async fn upload_returns_url() {
    let app = app();
    let token = login(&app).await;
    let boundary = "XBOUNDARY";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"cover.png\"\r\n\
         Content-Type: image/png\r\n\r\n\
         PNGDATA\r\n\
         --{boundary}--\r\n"
    );
    let req = Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header(
            http::header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .header(http::header::AUTHORIZATION, format!("Bearer {token}"))
        .body(body)
        .unwrap();

    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let envelope: Value = body_json(resp).await;
    assert!(envelope["data"]["url"]
        .as_str()
        .unwrap()
        .ends_with("-cover.png"));
    assert_eq!(envelope["data"]["size"], 7);
}
