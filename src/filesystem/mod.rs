// 本地文件系统浏览模块
//
// 以单一根目录为基准提供浏览、搜索、上传、删除能力

mod pagination;
mod pattern;
mod service;
mod types;

pub use pagination::Page;
pub use pattern::NamePattern;
pub use service::{resolve_root, FilesystemService};
pub use types::*;
