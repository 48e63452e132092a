// 路由构建

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// 构建完整应用路由
///
/// 文件浏览 API 挂载在 `server.base_path` 下，健康检查固定为 `/health`
pub fn build_router(state: AppState) -> Router {
    let base_path = normalize_base_path(&state.config.server.base_path);
    let body_limit = state.config.filesystem.max_upload_bytes();

    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http()) // HTTP 请求日志
        .layer(build_cors(&state.config.server.cors_origins));

    let api_routes = Router::new()
        .route("/browse", get(handlers::browse))
        .route("/search", get(handlers::search))
        .route("/upload", post(handlers::upload))
        .route("/delete", delete(handlers::delete_entry))
        .route("/home-directory", get(handlers::home_directory))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state);

    // axum 不允许在根路径 nest，基础路径为空时直接合并
    let app = if base_path.is_empty() {
        Router::new().merge(api_routes)
    } else {
        Router::new().nest(&base_path, api_routes)
    };

    app.route("/health", get(health_check)).layer(middleware)
}

/// 健康检查
async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "file-browser-rust",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// CORS：包含 "*" 时允许任意来源，否则只允许列出的来源
fn build_cors(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.is_empty() || origins.iter().any(|o| o.trim() == "*") {
        return cors.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.trim().parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("忽略无效的 CORS 来源: {}, 错误: {}", origin, e);
                None
            }
        })
        .collect();

    cors.allow_origin(AllowOrigin::list(allowed))
}

/// 规范化基础路径："api/x/" -> "/api/x"，"/" 或空 -> ""
fn normalize_base_path(base_path: &str) -> String {
    let trimmed = base_path.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::filesystem::FilesystemService;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use std::fs;
    use tempfile::TempDir;
    use tower::ServiceExt;

    const BOUNDARY: &str = "file-browser-test-boundary";

    fn test_app(root: &std::path::Path, configure: impl FnOnce(&mut AppConfig)) -> Router {
        let mut config = AppConfig::default();
        config.filesystem.root_directory = root.to_string_lossy().to_string();
        configure(&mut config);
        let service = FilesystemService::with_root(root);
        build_router(AppState::with_service(config, service))
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn delete_request(uri: &str) -> Request<Body> {
        Request::builder()
            .method("DELETE")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    fn upload_request(uri: &str, field: &str, file_name: Option<&str>, content: &[u8]) -> Request<Body> {
        let disposition = match file_name {
            Some(name) => format!("form-data; name=\"{}\"; filename=\"{}\"", field, name),
            None => format!("form-data; name=\"{}\"", field),
        };

        let mut body = Vec::new();
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(format!("Content-Disposition: {}\r\n", disposition).as_bytes());
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn file_names(value: &Value) -> Vec<String> {
        value["filesQuery"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["name"].as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_normalize_base_path() {
        assert_eq!(normalize_base_path("/api/FileBrowser"), "/api/FileBrowser");
        assert_eq!(normalize_base_path("api/FileBrowser/"), "/api/FileBrowser");
        assert_eq!(normalize_base_path("/"), "");
        assert_eq!(normalize_base_path(""), "");
    }

    #[tokio::test]
    async fn test_upload_browse_delete_flow() {
        let temp_dir = TempDir::new().unwrap();
        let app = test_app(temp_dir.path(), |_| {});

        let (status, body) = send(
            &app,
            upload_request("/api/FileBrowser/upload?path=", "file", Some("a.txt"), b"hi"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "File uploaded successfully.");

        let (status, body) = send(&app, get_request("/api/FileBrowser/browse?path=&page=1&pageSize=0")).await;
        assert_eq!(status, StatusCode::OK);
        let files = body["filesQuery"].as_array().unwrap();
        let expected_path = temp_dir.path().join("a.txt").to_string_lossy().to_string();
        assert!(files.iter().any(|f| {
            f["name"] == "a.txt" && f["path"] == expected_path.as_str() && f["size"] == 2
        }));

        let (status, body) = send(
            &app,
            delete_request("/api/FileBrowser/delete?name=a.txt&isDirectory=false"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "File deleted.");

        let (_, body) = send(&app, get_request("/api/FileBrowser/browse?pageSize=0")).await;
        assert!(!file_names(&body).contains(&"a.txt".to_string()));
    }

    #[tokio::test]
    async fn test_browse_missing_directory_is_404() {
        let temp_dir = TempDir::new().unwrap();
        let app = test_app(temp_dir.path(), |_| {});

        let (status, body) = send(&app, get_request("/api/FileBrowser/browse?path=missing")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], 50002);
        assert_eq!(body["message"], "Directory not found.");
    }

    #[tokio::test]
    async fn test_browse_uses_configured_default_page_size() {
        let temp_dir = TempDir::new().unwrap();
        for i in 0..6 {
            fs::write(temp_dir.path().join(format!("f{}.txt", i)), "x").unwrap();
        }
        let app = test_app(temp_dir.path(), |config| {
            config.filesystem.default_page_size = 4;
        });

        let (_, body) = send(&app, get_request("/api/FileBrowser/browse")).await;
        assert_eq!(file_names(&body).len(), 4);

        let (_, body) = send(&app, get_request("/api/FileBrowser/browse?page=2")).await;
        assert_eq!(file_names(&body).len(), 2);
    }

    #[tokio::test]
    async fn test_search_shapes() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("docs")).unwrap();
        fs::write(temp_dir.path().join("docs/report.txt"), "hello").unwrap();
        fs::write(temp_dir.path().join("notes.md"), "n").unwrap();
        let app = test_app(temp_dir.path(), |_| {});

        let (status, body) = send(&app, get_request("/api/FileBrowser/search?query=")).await;
        assert_eq!(status, StatusCode::OK);
        let (_, browse) = send(&app, get_request("/api/FileBrowser/browse")).await;
        assert_eq!(body, browse);

        let (status, body) = send(&app, get_request("/api/FileBrowser/search?query=report")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.get("directoriesQuery").is_none());
        assert_eq!(file_names(&body), vec!["report.txt".to_string()]);
    }

    #[tokio::test]
    async fn test_upload_rejections() {
        let temp_dir = TempDir::new().unwrap();
        let app = test_app(temp_dir.path(), |_| {});

        // 空文件
        let (status, body) = send(
            &app,
            upload_request("/api/FileBrowser/upload", "file", Some("empty.txt"), b""),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "No file uploaded.");
        assert!(!temp_dir.path().join("empty.txt").exists());

        // 缺少 file 字段
        let (status, _) = send(
            &app,
            upload_request("/api/FileBrowser/upload", "other", Some("x.txt"), b"data"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!temp_dir.path().join("x.txt").exists());

        // 目标目录不存在
        let (status, body) = send(
            &app,
            upload_request("/api/FileBrowser/upload?path=nope", "file", Some("x.txt"), b"data"),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["message"]
            .as_str()
            .unwrap()
            .starts_with("Internal server error: "));
    }

    #[tokio::test]
    async fn test_upload_empty_file_name_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let app = test_app(temp_dir.path(), |_| {});

        let (status, body) = send(
            &app,
            upload_request("/api/FileBrowser/upload", "file", Some(""), b"data"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], 50011);
        assert_eq!(body["message"], "No file uploaded.");
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_upload_into_read_only_directory_is_403() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let locked = temp_dir.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();

        // root 用户不受权限位限制，跳过
        if fs::write(locked.join("writable-check"), "x").is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let app = test_app(temp_dir.path(), |_| {});
        let (status, body) = send(
            &app,
            upload_request("/api/FileBrowser/upload?path=locked", "file", Some("x.txt"), b"data"),
        )
        .await;

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], 50003);
        assert_eq!(body["message"], "Unauthorized access.");
        assert!(!locked.join("x.txt").exists());
    }

    #[tokio::test]
    async fn test_upload_over_body_limit_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let app = test_app(temp_dir.path(), |config| {
            config.filesystem.max_upload_size_mb = 1;
        });

        let content = vec![b'x'; 1024 * 1024 + 1];
        let (status, _) = send(
            &app,
            upload_request("/api/FileBrowser/upload", "file", Some("big.bin"), &content),
        )
        .await;
        assert!(!status.is_success());
        assert!(!temp_dir.path().join("big.bin").exists());
    }

    #[tokio::test]
    async fn test_delete_errors() {
        let temp_dir = TempDir::new().unwrap();
        let app = test_app(temp_dir.path(), |_| {});

        let (status, body) = send(
            &app,
            delete_request("/api/FileBrowser/delete?name=ghost&isDirectory=true"),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Directory not found.");

        let (status, body) = send(&app, delete_request("/api/FileBrowser/delete?name=ghost.txt")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "File not found.");

        let (status, _) = send(&app, delete_request("/api/FileBrowser/delete")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_directory_recursively() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("old/inner")).unwrap();
        fs::write(temp_dir.path().join("old/inner/file.txt"), "x").unwrap();
        let app = test_app(temp_dir.path(), |_| {});

        let (status, body) = send(
            &app,
            delete_request("/api/FileBrowser/delete?name=old&isDirectory=true"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Directory deleted.");
        assert!(!temp_dir.path().join("old").exists());
    }

    #[tokio::test]
    async fn test_delete_flag_ignores_case() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("d")).unwrap();
        fs::write(temp_dir.path().join("f.txt"), "x").unwrap();
        let app = test_app(temp_dir.path(), |_| {});

        let (status, body) = send(
            &app,
            delete_request("/api/FileBrowser/delete?name=d&isDirectory=True"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Directory deleted.");
        assert!(!temp_dir.path().join("d").exists());

        let (status, body) = send(
            &app,
            delete_request("/api/FileBrowser/delete?name=f.txt&isDirectory=FALSE"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "File deleted.");

        let (status, _) = send(
            &app,
            delete_request("/api/FileBrowser/delete?name=d&isDirectory=yes"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_home_directory_and_health() {
        let temp_dir = TempDir::new().unwrap();
        let app = test_app(temp_dir.path(), |_| {});

        let (status, body) = send(&app, get_request("/api/FileBrowser/home-directory")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["path"], temp_dir.path().to_string_lossy().to_string());
        assert_eq!(body["exists"], true);

        let (status, body) = send(&app, get_request("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_root_base_path_merges_routes() {
        let temp_dir = TempDir::new().unwrap();
        let app = test_app(temp_dir.path(), |config| {
            config.server.base_path = "/".to_string();
        });

        let (status, _) = send(&app, get_request("/home-directory")).await;
        assert_eq!(status, StatusCode::OK);
    }
}
