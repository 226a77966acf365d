//! CustomWear API Server
//!
//! Stores exported drawings per user, serves the public gallery and accepts
//! clothing template uploads.
//!
//! ## Routes
//!
//! ```text
//! POST /api/auth            register the session user        JSON {id, username, email}
//! POST /api/editor          save a drawing                   multipart drawing_pic
//! GET  /api/editor          list the user's drawings
//! POST /api/editor/upload   store a clothing template        multipart file
//! GET  /api/explore         gallery page                     ?page=&limit=
//! POST /api/explore         publish a design                 multipart drawing_pic, drawing_name, drawing_on
//! GET  /health
//! ```
//!
//! The session user is identified by the `x-user-id` header.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use customwear_core::error::{EditorError, ErrorKind};
use customwear_core::storage::{
    DEFAULT_PAGE_SIZE, DesignMetadata, DirectoryAssets, DrawingStore, ImageUpload,
    MAX_UPLOAD_BYTES, MemoryDrawingStore, StoreError,
};
use serde::Deserialize;
use serde_json::json;
use std::{collections::HashMap, net::SocketAddr, path::PathBuf, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

/// Header carrying the authenticated user's id.
const USER_HEADER: &str = "x-user-id";
/// Room for multipart framing on top of the file itself.
const BODY_OVERHEAD: usize = 64 * 1024;

/// Server configuration
#[derive(Debug, Clone)]
struct ServerConfig {
    addr: SocketAddr,
    asset_dir: PathBuf,
    max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 3030)),
            asset_dir: PathBuf::from("./public/Clothes"),
            max_upload_bytes: MAX_UPLOAD_BYTES,
        }
    }
}

impl ServerConfig {
    /// Read `CUSTOMWEAR_ADDR`, `CUSTOMWEAR_ASSET_DIR` and `CUSTOMWEAR_MAX_UPLOAD_BYTES`.
    fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(addr) = lookup("CUSTOMWEAR_ADDR") {
            match addr.parse() {
                Ok(addr) => config.addr = addr,
                Err(e) => warn!("Ignoring CUSTOMWEAR_ADDR={}: {}", addr, e),
            }
        }
        if let Some(dir) = lookup("CUSTOMWEAR_ASSET_DIR") {
            config.asset_dir = PathBuf::from(dir);
        }
        if let Some(max) = lookup("CUSTOMWEAR_MAX_UPLOAD_BYTES") {
            match max.parse() {
                Ok(max) => config.max_upload_bytes = max,
                Err(e) => warn!("Ignoring CUSTOMWEAR_MAX_UPLOAD_BYTES={}: {}", max, e),
            }
        }
        config
    }
}

/// Shared application state
#[derive(Clone)]
struct AppState {
    store: Arc<dyn DrawingStore>,
}

/// An error rendered as `{ "message": ... }` with a matching status.
#[derive(Debug)]
struct ApiError(EditorError);

impl From<EditorError> for ApiError {
    fn from(err: EditorError) -> Self {
        Self(err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0.kind() {
            ErrorKind::Validation | ErrorKind::Decode => StatusCode::BAD_REQUEST,
            ErrorKind::Authentication => StatusCode::UNAUTHORIZED,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Network | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            warn!("Request failed: {}", self.0);
        }
        (status, Json(json!({ "message": self.0.user_message() }))).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "customwear_server=info,tower_http=info".into()),
        )
        .init();

    let config = ServerConfig::from_env();
    let assets = DirectoryAssets::new(config.asset_dir.clone())
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    let store = MemoryDrawingStore::with_assets(Box::new(assets))
        .with_max_upload_bytes(config.max_upload_bytes);
    let app = app(Arc::new(store), &config);

    info!("CustomWear API listening on {}", config.addr);
    info!("Clothing assets stored in {}", config.asset_dir.display());

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await
}

fn app(store: Arc<dyn DrawingStore>, config: &ServerConfig) -> Router {
    Router::new()
        .route("/api/auth", post(register))
        .route("/api/editor", post(save_drawing).get(list_drawings))
        .route("/api/editor/upload", post(upload_asset))
        .route("/api/explore", get(explore).post(publish))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes + BODY_OVERHEAD))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { store })
}

async fn health() -> &'static str {
    "OK"
}

fn session_user(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Multipart body split into uploaded files and plain text fields.
#[derive(Default)]
struct FormData {
    files: HashMap<String, ImageUpload>,
    fields: HashMap<String, String>,
}

impl FormData {
    async fn read(mut multipart: Multipart) -> ApiResult<Self> {
        let bad_form = |e: axum::extract::multipart::MultipartError| {
            ApiError(EditorError::Validation(format!("invalid form data: {e}")))
        };
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await.map_err(bad_form)? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            if file_name.is_some() || content_type.is_some() {
                let bytes = field.bytes().await.map_err(bad_form)?;
                let upload = ImageUpload::new(
                    file_name.unwrap_or_else(|| name.clone()),
                    content_type.unwrap_or_default(),
                    bytes.to_vec(),
                );
                form.files.insert(name, upload);
            } else {
                let text = field.text().await.map_err(bad_form)?;
                form.fields.insert(name, text);
            }
        }
        Ok(form)
    }

    fn file(&mut self, name: &str) -> ApiResult<ImageUpload> {
        self.files
            .remove(name)
            .ok_or_else(|| ApiError(EditorError::Validation("no file uploaded".to_string())))
    }
}

#[derive(Debug, Deserialize)]
struct RegisterRequest {
    id: String,
    username: String,
    email: String,
}

async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let registration = state
        .store
        .register_user(&req.id, &req.username, &req.email)
        .await?;
    let status = if registration.created {
        info!("Registered user {}", registration.user.id);
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(json!({ "user": registration.user }))))
}

async fn save_drawing(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let user = session_user(&headers).ok_or(ApiError(EditorError::Authentication))?;
    let upload = FormData::read(multipart).await?.file("drawing_pic")?;
    let record = state.store.save_drawing(Some(&user), upload).await?;
    info!("Saved drawing {} for {}", record.id, user);
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Drawing saved", "drawingId": record.id })),
    ))
}

async fn list_drawings(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    let user = session_user(&headers).ok_or(ApiError(EditorError::Authentication))?;
    let drawings = state.store.list_drawings(Some(&user)).await?;
    Ok(Json(json!({ "drawings": drawings })))
}

async fn upload_asset(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let upload = FormData::read(multipart).await?.file("file")?;
    let asset = state.store.upload_asset(upload).await?;
    info!("Stored clothing asset {}", asset.file_name);
    Ok((
        StatusCode::CREATED,
        Json(json!({ "filename": asset.file_name, "path": asset.path })),
    ))
}

#[derive(Debug, Deserialize)]
struct PageQuery {
    page: Option<u32>,
    limit: Option<u32>,
}

async fn explore(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<impl IntoResponse> {
    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE);
    Ok(Json(state.store.fetch_page(page, limit).await?))
}

async fn publish(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let mut form = FormData::read(multipart).await?;
    let upload = form.file("drawing_pic")?;
    let metadata = DesignMetadata {
        drawing_name: form.fields.remove("drawing_name"),
        drawing_on: form.fields.remove("drawing_on"),
    };
    let record = state.store.upload_design(upload, metadata).await?;
    info!("Published design {}", record.id);
    Ok((StatusCode::CREATED, Json(record)))
}
