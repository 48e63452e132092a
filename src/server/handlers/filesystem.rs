// 文件浏览 API 处理器
//
// 只负责参数提取与结果转换，文件系统操作在阻塞线程池中执行

use axum::{
    extract::{multipart::MultipartError, Multipart, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{de, Deserialize, Deserializer, Serialize};
use tracing::{info, warn};

use crate::filesystem::{
    BrowseResponse, FilesystemService, FsError, FsErrorCode, MessageResponse, Page, RootInfo,
    SearchResponse, FILE_UPLOADED,
};
use crate::server::state::AppState;

/// 错误响应
#[derive(Debug, Serialize)]
struct ErrorResponse {
    code: i32,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
}

impl IntoResponse for FsError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.code {
            FsErrorCode::DirectoryNotFound => StatusCode::NOT_FOUND,
            FsErrorCode::FileNotFound => StatusCode::NOT_FOUND,
            FsErrorCode::PermissionDenied => StatusCode::FORBIDDEN,
            FsErrorCode::IoFailure => StatusCode::INTERNAL_SERVER_ERROR,
            FsErrorCode::NoFileUploaded => StatusCode::BAD_REQUEST,
            FsErrorCode::MalformedUpload => StatusCode::BAD_REQUEST,
            FsErrorCode::UploadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        };

        let body = Json(ErrorResponse {
            code: self.code.code(),
            message: self.message,
            path: self.path,
        });

        (status, body).into_response()
    }
}

impl From<MultipartError> for FsError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            FsError::new(FsErrorCode::UploadTooLarge)
        } else {
            FsError::new(FsErrorCode::MalformedUpload)
                .with_message(format!("Malformed upload request: {}", err.body_text()))
        }
    }
}

/// 在阻塞线程池中执行文件系统操作
async fn run_blocking<T, F>(state: &AppState, op: F) -> Result<T, FsError>
where
    F: FnOnce(&FilesystemService) -> Result<T, FsError> + Send + 'static,
    T: Send + 'static,
{
    let service = state.filesystem.clone();
    tokio::task::spawn_blocking(move || op(&*service))
        .await
        .map_err(FsError::internal)?
}

/// 未指定时页码为 1，分页大小取配置默认值
fn page_of(state: &AppState, page: Option<i64>, page_size: Option<i64>) -> Page {
    Page::new(
        page.unwrap_or(1),
        page_size.unwrap_or(state.config.filesystem.default_page_size),
    )
}

/// 浏览查询参数
#[derive(Debug, Deserialize)]
pub struct BrowseQuery {
    pub path: Option<String>,
    pub page: Option<i64>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<i64>,
}

/// GET {base}/browse?path=docs&page=1&pageSize=10
/// 列出目录下的子目录与文件
pub async fn browse(
    State(state): State<AppState>,
    Query(query): Query<BrowseQuery>,
) -> Result<Json<BrowseResponse>, FsError> {
    let page = page_of(&state, query.page, query.page_size);
    info!("API: 浏览目录 path={:?}, {:?}", query.path, page);

    let path = query.path;
    let response = run_blocking(&state, move |service| service.browse(path.as_deref(), page)).await?;
    Ok(Json(response))
}

/// 搜索查询参数
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: Option<String>,
    pub page: Option<i64>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<i64>,
}

/// GET {base}/search?query=report&page=1&pageSize=10
/// 递归搜索文件名，query 为空时等同浏览根目录
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, FsError> {
    let page = page_of(&state, query.page, query.page_size);
    info!("API: 搜索文件 query={:?}, {:?}", query.query, page);

    let term = query.query;
    let response = run_blocking(&state, move |service| service.search(term.as_deref(), page)).await?;
    Ok(Json(response))
}

/// 上传查询参数
#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub path: Option<String>,
}

/// POST {base}/upload?path=docs  (multipart 字段名 file)
/// 上传单个文件，同名文件直接覆盖
pub async fn upload(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    mut multipart: Multipart,
) -> Result<Json<MessageResponse>, FsError> {
    let mut uploaded: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await? {
        // 只取第一个带文件名的 file 字段
        if uploaded.is_some() || field.name() != Some("file") {
            continue;
        }
        // 空文件名不视为文件
        let Some(file_name) = field
            .file_name()
            .filter(|name| !name.is_empty())
            .map(str::to_string)
        else {
            warn!("上传字段 file 缺少文件名，已忽略");
            continue;
        };

        let bytes = field.bytes().await?;
        uploaded = Some((file_name, bytes.to_vec()));
    }

    let Some((file_name, content)) = uploaded else {
        return Err(FsError::new(FsErrorCode::NoFileUploaded));
    };

    info!(
        "API: 上传文件 name={}, path={:?}, size={}",
        file_name,
        query.path,
        content.len()
    );

    let path = query.path;
    run_blocking(&state, move |service| {
        service.upload(Some(&content), &file_name, path.as_deref())
    })
    .await?;

    Ok(Json(MessageResponse::new(FILE_UPLOADED)))
}

/// 删除查询参数
#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    pub name: String,
    #[serde(default, rename = "isDirectory", deserialize_with = "lenient_bool")]
    pub is_directory: bool,
}

/// 布尔查询参数，忽略大小写（True / FALSE 等）
fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    if value.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if value.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(de::Error::invalid_value(
            de::Unexpected::Str(&value),
            &"true or false",
        ))
    }
}

/// DELETE {base}/delete?name=docs&isDirectory=true
/// 删除文件或目录
pub async fn delete_entry(
    State(state): State<AppState>,
    Query(query): Query<DeleteQuery>,
) -> Result<Json<MessageResponse>, FsError> {
    info!(
        "API: 删除 name={}, is_directory={}",
        query.name, query.is_directory
    );

    let DeleteQuery { name, is_directory } = query;
    let deleted = run_blocking(&state, move |service| service.delete(&name, is_directory)).await?;
    Ok(Json(MessageResponse::new(deleted.message())))
}

/// GET {base}/home-directory
/// 获取根目录及其是否存在
pub async fn home_directory(State(state): State<AppState>) -> Json<RootInfo> {
    Json(state.filesystem.get_root())
}
