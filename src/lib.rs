// File Browser Rust Library
// 单根目录远程文件管理服务核心库

// 配置管理模块
pub mod config;

// 日志模块
pub mod logging;

// 本地文件系统模块
pub mod filesystem;

// Web服务器模块
pub mod server;

// 导出常用类型
pub use config::AppConfig;
pub use filesystem::{
    BrowseResponse, DirectoryItem, FileItem, FilesystemService, FsError, FsErrorCode, Page,
    RootInfo, SearchResponse,
};
pub use server::{build_router, AppState};
