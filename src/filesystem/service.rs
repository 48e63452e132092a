// 文件系统服务
//
// 以配置的根目录为基准，提供浏览、搜索、上传、删除等操作

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use crate::config::EnvDetector;

use super::pagination::Page;
use super::pattern::NamePattern;
use super::types::*;

/// 文件系统服务
///
/// 只持有启动时解析好的根目录，不含其他可变状态，可在线程间共享
#[derive(Debug, Clone)]
pub struct FilesystemService {
    root: PathBuf,
}

impl FilesystemService {
    /// 根据配置创建服务，根目录在此解析一次
    pub fn new(config: &FilesystemConfig) -> Self {
        let root = resolve_root(&config.root_directory);
        info!(
            "文件浏览根目录: {:?} (配置值: {}, 存在: {})",
            root,
            config.root_directory,
            root.is_dir()
        );
        Self { root }
    }

    /// 直接使用给定根目录创建服务
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 浏览目录：列出直接子目录与文件，两者各自分页
    pub fn browse(&self, relative_path: Option<&str>, page: Page) -> Result<BrowseResponse, FsError> {
        let full_path = self.resolve(relative_path);

        if !full_path.is_dir() {
            return Err(FsError::new(FsErrorCode::DirectoryNotFound)
                .with_path(full_path.to_string_lossy().to_string()));
        }

        let read_dir = fs::read_dir(&full_path).map_err(|e| {
            error!("读取目录失败: {:?}, 错误: {}", full_path, e);
            FsError::from_io(&e, &full_path)
        })?;

        let mut directories = Vec::new();
        let mut files = Vec::new();

        for entry in read_dir.filter_map(|entry| entry.ok()) {
            let path = entry.path();
            // 跟随链接获取元数据，无法读取的条目直接跳过
            let metadata = match fs::metadata(&path) {
                Ok(metadata) => metadata,
                Err(e) => {
                    debug!("跳过无法读取的条目: {:?}, 错误: {}", path, e);
                    continue;
                }
            };

            if metadata.is_dir() {
                directories.push(DirectoryItem::from_path(&path));
            } else if metadata.is_file() {
                files.push(FileItem::from_path(&path, metadata.len()));
            }
        }

        Ok(BrowseResponse {
            directories: page.apply(directories),
            files: page.apply(files),
        })
    }

    /// 递归搜索文件名包含 query 的文件
    ///
    /// query 为空白时等同于浏览根目录
    pub fn search(&self, query: Option<&str>, page: Page) -> Result<SearchResponse, FsError> {
        let query = query.unwrap_or_default();
        if query.trim().is_empty() {
            return self.browse(None, page).map(SearchResponse::Listing);
        }

        if !self.root.is_dir() {
            return Err(FsError::new(FsErrorCode::DirectoryNotFound)
                .with_path(self.root.to_string_lossy().to_string()));
        }

        let pattern = NamePattern::contains(query)?;

        let matches = WalkDir::new(&self.root)
            .min_depth(1)
            .follow_links(false)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("搜索时跳过无法访问的路径: {}", e);
                    None
                }
            })
            .filter(|entry| pattern.matches(&entry.file_name().to_string_lossy()))
            .filter_map(|entry| {
                // 与浏览一致：跟随链接判断类型，遍历本身不进入链接
                let metadata = fs::metadata(entry.path()).ok()?;
                metadata
                    .is_file()
                    .then(|| FileItem::from_path(entry.path(), metadata.len()))
            });

        Ok(SearchResponse::Matches(SearchMatches {
            files: page.apply(matches),
        }))
    }

    /// 上传文件到 root/relative_path/file_name，已存在则覆盖
    ///
    /// 内容为空时不触碰文件系统
    pub fn upload(
        &self,
        content: Option<&[u8]>,
        file_name: &str,
        relative_path: Option<&str>,
    ) -> Result<PathBuf, FsError> {
        let content = match content {
            Some(content) if !content.is_empty() => content,
            _ => return Err(FsError::new(FsErrorCode::NoFileUploaded)),
        };

        let destination = self.resolve(relative_path).join(file_name);

        let write_result = File::create(&destination).and_then(|mut file| {
            file.write_all(content)?;
            file.flush()
        });

        if let Err(e) = write_result {
            let err = FsError::from_io(&e, &destination);
            if err.code == FsErrorCode::PermissionDenied {
                error!("无权写入路径: {:?}, 错误: {}", destination, e);
            } else {
                error!("上传文件时发生内部错误: {:?}, 错误: {}", destination, e);
            }
            return Err(err);
        }

        info!("文件已上传: {:?} ({} 字节)", destination, content.len());
        Ok(destination)
    }

    /// 删除文件或目录（目录递归删除）
    pub fn delete(&self, name: &str, is_directory: bool) -> Result<DeletedKind, FsError> {
        let full_path = self.root.join(name);
        let display = full_path.to_string_lossy().to_string();

        if is_directory {
            if !full_path.is_dir() {
                return Err(FsError::new(FsErrorCode::DirectoryNotFound).with_path(display));
            }

            fs::remove_dir_all(&full_path).map_err(|e| {
                error!("删除目录失败: {:?}, 错误: {}", full_path, e);
                FsError::from_io(&e, &full_path)
            })?;

            info!("目录已删除: {:?}", full_path);
            Ok(DeletedKind::Directory)
        } else {
            if !full_path.is_file() {
                return Err(FsError::new(FsErrorCode::FileNotFound).with_path(display));
            }

            fs::remove_file(&full_path).map_err(|e| {
                error!("删除文件失败: {:?}, 错误: {}", full_path, e);
                FsError::from_io(&e, &full_path)
            })?;

            info!("文件已删除: {:?}", full_path);
            Ok(DeletedKind::File)
        }
    }

    /// 根目录及其当前是否存在
    pub fn get_root(&self) -> RootInfo {
        RootInfo {
            path: self.root.to_string_lossy().to_string(),
            exists: self.root.is_dir(),
        }
    }

    fn resolve(&self, relative_path: Option<&str>) -> PathBuf {
        match relative_path.filter(|p| !p.is_empty()) {
            Some(relative) => self.root.join(relative),
            None => self.root.clone(),
        }
    }
}

/// 解析配置的根目录，`~` 开头时展开为用户主目录
pub fn resolve_root(configured: &str) -> PathBuf {
    expand_home(configured, EnvDetector::home_dir)
}

fn expand_home<F>(configured: &str, home_dir: F) -> PathBuf
where
    F: FnOnce() -> Option<PathBuf>,
{
    if !configured.starts_with('~') {
        return PathBuf::from(configured);
    }

    let Some(home) = home_dir() else {
        warn!("无法获取用户主目录，根目录按原样使用: {}", configured);
        return PathBuf::from(configured);
    };

    let remainder = configured.trim_start_matches(['~', '/']);
    if remainder.is_empty() {
        home
    } else {
        home.join(remainder)
    }
}
