// 配置管理模块

pub mod env_detector;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;

pub use env_detector::{EnvDetector, EnvInfo, OsType};

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "config/app.toml";

/// 指定配置文件路径的环境变量
pub const CONFIG_PATH_ENV: &str = "FILE_BROWSER_CONFIG";

/// 覆盖根目录的环境变量
pub const ROOT_DIRECTORY_ENV: &str = "DEFAULT_ROOT_DIRECTORY";

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    pub server: ServerConfig,
    /// 文件系统配置
    #[serde(default)]
    pub filesystem: FilesystemConfig,
    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// 是否启用日志文件持久化
    #[serde(default = "default_log_enabled")]
    pub enabled: bool,
    /// 日志文件保存目录
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    /// 日志保留天数（默认 7 天）
    #[serde(default = "default_log_retention_days")]
    pub retention_days: u32,
    /// 日志级别（默认 info）
    #[serde(default = "default_log_level")]
    pub level: String,
    /// 单个日志文件最大大小（字节，默认 50MB）
    #[serde(default = "default_log_max_file_size")]
    pub max_file_size: u64,
}

fn default_log_enabled() -> bool {
    true
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_log_retention_days() -> u32 {
    7
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_max_file_size() -> u64 {
    50 * 1024 * 1024 // 50MB
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: default_log_enabled(),
            log_dir: default_log_dir(),
            retention_days: default_log_retention_days(),
            level: default_log_level(),
            max_file_size: default_log_max_file_size(),
        }
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    pub host: String,
    /// 监听端口
    pub port: u16,
    /// CORS允许的源（包含 "*" 表示允许所有）
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
    /// API 基础路径
    #[serde(default = "default_base_path")]
    pub base_path: String,
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_base_path() -> String {
    "/api/FileBrowser".to_string()
}

/// 文件系统配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilesystemConfig {
    /// 根目录，以 `~` 开头时展开为用户主目录
    #[serde(default = "default_root_directory")]
    pub root_directory: String,
    /// 未指定 pageSize 时的默认分页大小（<= 0 表示不分页）
    #[serde(default = "default_page_size")]
    pub default_page_size: i64,
    /// 上传请求体大小上限 (MB)
    #[serde(default = "default_max_upload_size_mb")]
    pub max_upload_size_mb: u64,
}

fn default_root_directory() -> String {
    "/app".to_string()
}

fn default_page_size() -> i64 {
    10
}

fn default_max_upload_size_mb() -> u64 {
    100
}

impl Default for FilesystemConfig {
    fn default() -> Self {
        Self {
            root_directory: default_root_directory(),
            default_page_size: default_page_size(),
            max_upload_size_mb: default_max_upload_size_mb(),
        }
    }
}

impl FilesystemConfig {
    /// 上传请求体大小上限（字节）
    pub fn max_upload_bytes(&self) -> usize {
        (self.max_upload_size_mb as usize).saturating_mul(1024 * 1024)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let env_info = EnvDetector::get_env_info();

        // Docker 环境使用 0.0.0.0 以便从宿主机访问，本地环境使用 127.0.0.1
        let host = if env_info.is_docker {
            "0.0.0.0".to_string()
        } else {
            "127.0.0.1".to_string()
        };

        tracing::info!(
            "检测到环境: {} (Docker: {}), 服务器监听地址: {}",
            env_info.os_type.as_str(),
            env_info.is_docker,
            host
        );

        Self {
            server: ServerConfig {
                host,
                port: 5000,
                cors_origins: default_cors_origins(),
                base_path: default_base_path(),
            },
            filesystem: FilesystemConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl AppConfig {
    /// 配置文件路径：优先读取 `FILE_BROWSER_CONFIG`
    pub fn config_path() -> String {
        std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
    }

    /// 从文件加载配置
    pub async fn load_from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .context("Failed to read config file")?;

        let config: AppConfig = toml::from_str(&content).context("Failed to parse config file")?;

        Ok(config)
    }

    /// 保存配置到文件
    pub async fn save_to_file(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        // 确保父目录存在
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .context("Failed to create config directory")?;
            }
        }

        fs::write(path, content)
            .await
            .context("Failed to write config file")?;

        tracing::info!("✓ 配置已保存: {}", path);

        Ok(())
    }

    /// 加载或创建默认配置，随后应用环境变量覆盖
    pub async fn load_or_default(path: &str) -> Self {
        let mut config = match Self::load_from_file(path).await {
            Ok(config) => {
                tracing::info!("配置文件加载成功: {}", path);
                config
            }
            Err(e) => {
                tracing::warn!("配置文件加载失败，使用默认配置: {:#}", e);
                let default_config = Self::default();

                // 尝试保存默认配置
                if let Err(e) = default_config.save_to_file(path).await {
                    tracing::error!("保存默认配置失败: {:#}", e);
                }

                default_config
            }
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config
    }

    /// 应用环境变量覆盖
    ///
    /// 目前只有根目录 `DEFAULT_ROOT_DIRECTORY` 支持覆盖，空值忽略
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(root) = lookup(ROOT_DIRECTORY_ENV).filter(|v| !v.trim().is_empty()) {
            tracing::info!("根目录由环境变量 {} 覆盖: {}", ROOT_DIRECTORY_ENV, root);
            self.filesystem.root_directory = root;
        }
    }
}
