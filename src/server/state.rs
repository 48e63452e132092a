// 应用状态

use crate::config::AppConfig;
use crate::filesystem::FilesystemService;
use std::sync::Arc;

/// 应用全局状态
///
/// 配置与根目录在启动时确定，之后只读
#[derive(Clone)]
pub struct AppState {
    /// 文件系统服务
    pub filesystem: Arc<FilesystemService>,
    /// 应用配置
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// 由已加载的配置创建应用状态
    pub fn new(config: AppConfig) -> Self {
        let filesystem = FilesystemService::new(&config.filesystem);
        Self {
            filesystem: Arc::new(filesystem),
            config: Arc::new(config),
        }
    }

    /// 从配置文件加载并创建应用状态
    pub async fn load(config_path: &str) -> Self {
        let config = AppConfig::load_or_default(config_path).await;
        Self::new(config)
    }

    /// 使用指定服务创建（测试或嵌入场景）
    pub fn with_service(config: AppConfig, filesystem: FilesystemService) -> Self {
        Self {
            filesystem: Arc::new(filesystem),
            config: Arc::new(config),
        }
    }
}
