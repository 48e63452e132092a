// 文件系统模块数据类型定义

use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;

// 重新导出配置模块中的 FilesystemConfig
pub use crate::config::FilesystemConfig;

/// 文件系统错误码
/// 错误码范围：50001 - 50099
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsErrorCode {
    /// 目录不存在
    DirectoryNotFound = 50002,
    /// 权限不足
    PermissionDenied = 50003,
    /// 其他 I/O 错误
    IoFailure = 50005,
    /// 文件不存在
    FileNotFound = 50008,
    /// 未上传文件或文件为空
    NoFileUploaded = 50011,
    /// 上传请求格式错误
    MalformedUpload = 50012,
    /// 上传内容超过大小限制
    UploadTooLarge = 50013,
}

impl FsErrorCode {
    pub fn code(&self) -> i32 {
        *self as i32
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::DirectoryNotFound => "Directory not found.",
            Self::PermissionDenied => "Unauthorized access.",
            Self::IoFailure => "Internal server error: ",
            Self::FileNotFound => "File not found.",
            Self::NoFileUploaded => "No file uploaded.",
            Self::MalformedUpload => "Malformed upload request.",
            Self::UploadTooLarge => "Uploaded file is too large.",
        }
    }
}

/// 文件系统错误
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct FsError {
    pub code: FsErrorCode,
    pub message: String,
    pub path: Option<String>,
}

impl FsError {
    pub fn new(code: FsErrorCode) -> Self {
        Self {
            message: code.message().to_string(),
            code,
            path: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// 将 I/O 错误归类：权限拒绝为 PermissionDenied，其余为 IoFailure 并附带原始信息
    pub fn from_io(err: &io::Error, path: &Path) -> Self {
        let path = path.to_string_lossy().to_string();
        match err.kind() {
            io::ErrorKind::PermissionDenied => {
                Self::new(FsErrorCode::PermissionDenied).with_path(path)
            }
            _ => Self::internal(err).with_path(path),
        }
    }

    /// 内部错误，消息为 "Internal server error: <详情>"
    pub fn internal(detail: impl std::fmt::Display) -> Self {
        Self::new(FsErrorCode::IoFailure)
            .with_message(format!("{}{}", FsErrorCode::IoFailure.message(), detail))
    }
}

/// 子目录条目
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DirectoryItem {
    /// 目录名
    pub name: String,
    /// 完整路径
    pub path: String,
}

/// 文件条目
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileItem {
    /// 文件名
    pub name: String,
    /// 完整路径
    pub path: String,
    /// 文件大小（字节）
    pub size: u64,
}

impl DirectoryItem {
    pub fn from_path(path: &Path) -> Self {
        Self {
            name: entry_name(path),
            path: path.to_string_lossy().to_string(),
        }
    }
}

impl FileItem {
    pub fn from_path(path: &Path, size: u64) -> Self {
        Self {
            name: entry_name(path),
            path: path.to_string_lossy().to_string(),
            size,
        }
    }
}

fn entry_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

/// 浏览目录响应
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BrowseResponse {
    /// 子目录列表
    #[serde(rename = "directoriesQuery")]
    pub directories: Vec<DirectoryItem>,
    /// 文件列表
    #[serde(rename = "filesQuery")]
    pub files: Vec<FileItem>,
}

/// 文件名搜索结果
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchMatches {
    #[serde(rename = "filesQuery")]
    pub files: Vec<FileItem>,
}

/// 搜索响应
///
/// 查询为空时退化为根目录浏览，返回浏览结果的结构
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum SearchResponse {
    Listing(BrowseResponse),
    Matches(SearchMatches),
}

impl SearchResponse {
    /// 结果中的文件列表
    pub fn files(&self) -> &[FileItem] {
        match self {
            Self::Listing(listing) => &listing.files,
            Self::Matches(matches) => &matches.files,
        }
    }
}

/// 删除的条目类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletedKind {
    File,
    Directory,
}

impl DeletedKind {
    pub fn message(&self) -> &'static str {
        match self {
            Self::File => "File deleted.",
            Self::Directory => "Directory deleted.",
        }
    }
}

/// 上传成功提示
pub const FILE_UPLOADED: &str = "File uploaded successfully.";

/// 根目录信息
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RootInfo {
    /// 配置的根目录
    pub path: String,
    /// 根目录当前是否存在
    pub exists: bool,
}

/// 简单消息响应
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
