//! In-memory blog backend honoring the `{success, data, message, code}`
//! envelope contract.
//!
//! Categories and posts answer with envelopes, tags answer with bare
//! payloads, so a client has to cope with both framings. Writes require a
//! bearer token issued by `/api/user/login`; a missing or unknown token gets
//! a plain-text 401.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin123";

const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub post_count: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    pub cover_image: String,
    pub category_id: String,
    pub tag_ids: Vec<String>,
    pub content: String,
    pub is_recommended: bool,
    pub is_public: bool,
    pub view_count: u64,
}

#[derive(Deserialize)]
pub struct CreateNamed {
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateNamed {
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePost {
    pub title: String,
    pub description: String,
    pub slug: Option<String>,
    pub cover_image: String,
    pub category_id: String,
    #[serde(default)]
    pub tag_ids: Vec<String>,
    pub content: String,
    #[serde(default)]
    pub is_recommended: bool,
    #[serde(default = "default_true")]
    pub is_public: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePost {
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub category_id: Option<String>,
    pub tag_ids: Option<Vec<String>>,
    pub is_recommended: Option<bool>,
    pub is_public: Option<bool>,
}

fn default_true() -> bool {
    true
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Default)]
pub struct Db {
    categories: Vec<Category>,
    tags: Vec<Tag>,
    posts: Vec<Post>,
    tokens: HashSet<String>,
}

pub type SharedDb = Arc<RwLock<Db>>;

pub fn app() -> Router {
    app_with_db(SharedDb::default())
}

pub fn app_with_db(db: SharedDb) -> Router {
    let api = Router::new()
        .route("/user/login", post(login))
        .route("/category", get(list_categories).post(create_category))
        .route("/category/select-options", get(category_options))
        .route(
            "/category/{id}",
            get(get_category).put(update_category).delete(delete_category),
        )
        .route("/tag", get(list_tags).post(create_tag))
        .route("/tag/{id}", put(update_tag).delete(delete_tag))
        .route("/post", get(list_posts).post(create_post))
        .route("/post/all", get(list_all_posts))
        .route("/post/{id}", put(update_post))
        .route("/upload", post(upload));
    Router::new().nest("/api", api).with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

fn envelope<T: Serialize>(status: StatusCode, data: T) -> Response {
    let body = json!({"success": true, "data": data, "code": status.as_u16()});
    (status, Json(body)).into_response()
}

fn failure(status: StatusCode, message: &str) -> Response {
    let body = json!({"success": false, "message": message, "code": status.as_u16()});
    (status, Json(body)).into_response()
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({"message": "not found"}))).into_response()
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(header::CONTENT_TYPE, "text/plain")],
        "unauthorized",
    )
        .into_response()
}

fn authorize(db: &Db, headers: &HeaderMap) -> Result<(), Response> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));
    match token {
        Some(token) if db.tokens.contains(token) => Ok(()),
        _ => {
            tracing::debug!("rejected request without a valid token");
            Err(unauthorized())
        }
    }
}

/// 1-based `page` and `pageSize` from the query string.
fn paginate<T: Clone>(items: &[T], params: &HashMap<String, String>) -> Vec<T> {
    let page = params
        .get("page")
        .and_then(|p| p.parse::<usize>().ok())
        .filter(|p| *p > 0)
        .unwrap_or(1);
    let size = params
        .get("pageSize")
        .and_then(|p| p.parse::<usize>().ok())
        .filter(|p| *p > 0)
        .unwrap_or(DEFAULT_PAGE_SIZE);
    items
        .iter()
        .skip((page - 1).saturating_mul(size))
        .take(size)
        .cloned()
        .collect()
}

fn matches_query(name: &str, params: &HashMap<String, String>) -> bool {
    params
        .get("query")
        .map_or(true, |query| name.to_lowercase().contains(&query.to_lowercase()))
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

async fn login(State(db): State<SharedDb>, Json(form): Json<LoginForm>) -> Response {
    if form.username != ADMIN_USERNAME || form.password != ADMIN_PASSWORD {
        return failure(StatusCode::UNAUTHORIZED, "invalid credentials");
    }
    let token = Uuid::new_v4().to_string();
    db.write().await.tokens.insert(token.clone());
    tracing::info!(username = %form.username, "issued token");
    envelope(StatusCode::OK, json!({ "token": token }))
}

// ---------------------------------------------------------------------------
// Category (enveloped)
// ---------------------------------------------------------------------------

async fn list_categories(
    State(db): State<SharedDb>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let db = db.read().await;
    let matching: Vec<Category> = db
        .categories
        .iter()
        .filter(|c| matches_query(&c.name, &params))
        .cloned()
        .collect();
    let total = matching.len();
    let categories = paginate(&matching, &params);
    envelope(StatusCode::OK, json!({ "categories": categories, "total": total }))
}

async fn category_options(State(db): State<SharedDb>) -> Response {
    let db = db.read().await;
    let options: Vec<_> = db
        .categories
        .iter()
        .map(|c| json!({ "id": c.id, "name": c.name, "icon": c.icon }))
        .collect();
    envelope(StatusCode::OK, options)
}

async fn create_category(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Json(input): Json<CreateNamed>,
) -> Response {
    let mut db = db.write().await;
    if let Err(response) = authorize(&db, &headers) {
        return response;
    }
    if db.categories.iter().any(|c| c.name == input.name) {
        return failure(StatusCode::CONFLICT, "category exists");
    }
    let category = Category {
        id: Uuid::new_v4().to_string(),
        name: input.name,
        description: input.description,
        icon: input.icon,
    };
    db.categories.push(category.clone());
    envelope(StatusCode::CREATED, category)
}

async fn get_category(State(db): State<SharedDb>, Path(id): Path<String>) -> Response {
    let db = db.read().await;
    match db.categories.iter().find(|c| c.id == id) {
        Some(category) => envelope(StatusCode::OK, category),
        None => not_found(),
    }
}

async fn update_category(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<UpdateNamed>,
) -> Response {
    let mut db = db.write().await;
    if let Err(response) = authorize(&db, &headers) {
        return response;
    }
    let Some(category) = db.categories.iter_mut().find(|c| c.id == id) else {
        return not_found();
    };
    if let Some(name) = input.name {
        category.name = name;
    }
    if let Some(description) = input.description {
        category.description = Some(description);
    }
    if let Some(icon) = input.icon {
        category.icon = Some(icon);
    }
    envelope(StatusCode::OK, category.clone())
}

async fn delete_category(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let mut db = db.write().await;
    if let Err(response) = authorize(&db, &headers) {
        return response;
    }
    let before = db.categories.len();
    db.categories.retain(|c| c.id != id);
    if db.categories.len() == before {
        return not_found();
    }
    StatusCode::NO_CONTENT.into_response()
}

// ---------------------------------------------------------------------------
// Tag (bare payloads)
// ---------------------------------------------------------------------------

async fn list_tags(
    State(db): State<SharedDb>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let db = db.read().await;
    let matching: Vec<Tag> = db
        .tags
        .iter()
        .filter(|t| matches_query(&t.name, &params))
        .cloned()
        .collect();
    let total = matching.len();
    let tags = paginate(&matching, &params);
    Json(json!({ "tags": tags, "total": total })).into_response()
}

async fn create_tag(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Json(input): Json<CreateNamed>,
) -> Response {
    let mut db = db.write().await;
    if let Err(response) = authorize(&db, &headers) {
        return response;
    }
    if db.tags.iter().any(|t| t.name == input.name) {
        let body = json!({"message": "tag exists", "code": 40901});
        return (StatusCode::CONFLICT, Json(body)).into_response();
    }
    let tag = Tag {
        id: Uuid::new_v4().to_string(),
        name: input.name,
        description: input.description,
        icon: input.icon,
        post_count: 0,
    };
    db.tags.push(tag.clone());
    (StatusCode::CREATED, Json(tag)).into_response()
}

async fn update_tag(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<UpdateNamed>,
) -> Response {
    let mut db = db.write().await;
    if let Err(response) = authorize(&db, &headers) {
        return response;
    }
    let Some(tag) = db.tags.iter_mut().find(|t| t.id == id) else {
        return not_found();
    };
    if let Some(name) = input.name {
        tag.name = name;
    }
    if let Some(description) = input.description {
        tag.description = Some(description);
    }
    if let Some(icon) = input.icon {
        tag.icon = Some(icon);
    }
    Json(tag.clone()).into_response()
}

async fn delete_tag(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let mut db = db.write().await;
    if let Err(response) = authorize(&db, &headers) {
        return response;
    }
    let before = db.tags.len();
    db.tags.retain(|t| t.id != id);
    if db.tags.len() == before {
        return not_found();
    }
    StatusCode::NO_CONTENT.into_response()
}

// ---------------------------------------------------------------------------
// Post (enveloped)
// ---------------------------------------------------------------------------

fn post_matches(post: &Post, params: &HashMap<String, String>) -> bool {
    let flag = |key: &str| params.get(key).and_then(|v| v.parse::<bool>().ok());
    if params
        .get("categoryId")
        .is_some_and(|category| post.category_id != *category)
    {
        return false;
    }
    if let Some(tags) = params.get("tagId") {
        if !tags.split(',').any(|tag| post.tag_ids.iter().any(|t| t == tag)) {
            return false;
        }
    }
    if let Some(keyword) = params.get("keyword") {
        if !post.title.contains(keyword.as_str()) && !post.content.contains(keyword.as_str()) {
            return false;
        }
    }
    if flag("isPublic").is_some_and(|public| post.is_public != public) {
        return false;
    }
    if flag("isRecommended").is_some_and(|recommended| post.is_recommended != recommended) {
        return false;
    }
    true
}

async fn list_posts(
    State(db): State<SharedDb>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let db = db.read().await;
    let matching: Vec<Post> = db
        .posts
        .iter()
        .filter(|p| post_matches(p, &params))
        .cloned()
        .collect();
    let total = matching.len();
    let posts = paginate(&matching, &params);
    envelope(StatusCode::OK, json!({ "posts": posts, "total": total }))
}

async fn list_all_posts(State(db): State<SharedDb>) -> Response {
    let db = db.read().await;
    envelope(
        StatusCode::OK,
        json!({ "posts": db.posts, "total": db.posts.len() }),
    )
}

async fn create_post(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Json(input): Json<CreatePost>,
) -> Response {
    let mut db = db.write().await;
    if let Err(response) = authorize(&db, &headers) {
        return response;
    }
    if input.title.trim().is_empty() {
        return failure(StatusCode::UNPROCESSABLE_ENTITY, "title required");
    }
    let post = Post {
        id: Uuid::new_v4().to_string(),
        title: input.title,
        description: input.description,
        slug: input.slug,
        cover_image: input.cover_image,
        category_id: input.category_id,
        tag_ids: input.tag_ids,
        content: input.content,
        is_recommended: input.is_recommended,
        is_public: input.is_public,
        view_count: 0,
    };
    for tag in db.tags.iter_mut().filter(|t| post.tag_ids.contains(&t.id)) {
        tag.post_count += 1;
    }
    db.posts.push(post.clone());
    envelope(StatusCode::CREATED, post)
}

async fn update_post(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<UpdatePost>,
) -> Response {
    let mut db = db.write().await;
    if let Err(response) = authorize(&db, &headers) {
        return response;
    }
    let Some(post) = db.posts.iter_mut().find(|p| p.id == id) else {
        return not_found();
    };
    if let Some(title) = input.title {
        post.title = title;
    }
    if let Some(description) = input.description {
        post.description = description;
    }
    if let Some(content) = input.content {
        post.content = content;
    }
    if let Some(category_id) = input.category_id {
        post.category_id = category_id;
    }
    if let Some(tag_ids) = input.tag_ids {
        post.tag_ids = tag_ids;
    }
    if let Some(recommended) = input.is_recommended {
        post.is_recommended = recommended;
    }
    if let Some(public) = input.is_public {
        post.is_public = public;
    }
    envelope(StatusCode::OK, post.clone())
}

// ---------------------------------------------------------------------------
// Upload
// ---------------------------------------------------------------------------

async fn upload(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    if let Err(response) = authorize(&*db.read().await, &headers) {
        return response;
    }
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("file") {
            continue;
        }
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let Ok(bytes) = field.bytes().await else {
            return failure(StatusCode::BAD_REQUEST, "unreadable file");
        };
        tracing::debug!(file_name = %file_name, size = bytes.len(), "stored upload");
        let url = format!("/uploads/{}-{file_name}", Uuid::new_v4());
        return envelope(StatusCode::OK, json!({ "url": url, "size": bytes.len() }));
    }
    failure(StatusCode::BAD_REQUEST, "file field missing")
}
