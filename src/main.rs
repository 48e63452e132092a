use file_browser_rust::{config::LogConfig, logging, AppConfig, AppState};
use tracing::info;

/// 加载日志配置
///
/// 日志系统需先于完整配置初始化，这里只读取 [log] 段，失败时返回默认配置
async fn load_log_config(config_path: &str) -> LogConfig {
    if let Ok(content) = tokio::fs::read_to_string(config_path).await {
        if let Ok(config) = toml::from_str::<toml::Value>(&content) {
            if let Some(log_table) = config.get("log") {
                if let Ok(log_config) = log_table.clone().try_into::<LogConfig>() {
                    return log_config;
                }
            }
        }
    }

    LogConfig::default()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = AppConfig::config_path();

    // 初始化日志系统（必须保持 _log_guard 存活）
    let log_config = load_log_config(&config_path).await;
    let _log_guard = logging::init_logging(&log_config);

    info!("File Browser v{} 启动中...", env!("CARGO_PKG_VERSION"));

    // 创建应用状态（根目录在此解析一次）
    let app_state = AppState::load(&config_path).await;
    let root = app_state.filesystem.get_root();
    if !root.exists {
        tracing::warn!("根目录不存在: {}，浏览与上传请求将失败", root.path);
    }

    let server_config = app_state.config.server.clone();
    let addr = format!("{}:{}", server_config.host, server_config.port);

    let app = file_browser_rust::build_router(app_state);

    info!("服务器启动在: http://{}", addr);
    info!("API 基础路径: http://{}{}", addr, server_config.base_path);
    info!("健康检查: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("服务器错误: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("收到 Ctrl+C，开始关闭...");
        }
    }

    info!("应用已安全退出");
    Ok(())
}
