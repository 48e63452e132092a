// 运行环境检测模块

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// 操作系统类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OsType {
    Windows,
    Linux,
    MacOS,
    Unknown,
}

impl OsType {
    /// 获取操作系统类型的字符串表示
    pub fn as_str(&self) -> &str {
        match self {
            OsType::Windows => "Windows",
            OsType::Linux => "Linux",
            OsType::MacOS => "macOS",
            OsType::Unknown => "Unknown",
        }
    }

    /// 该平台默认文件名匹配是否区分大小写
    ///
    /// Windows 与 macOS 默认不区分，其余平台区分
    pub fn is_case_sensitive(&self) -> bool {
        !matches!(self, OsType::Windows | OsType::MacOS)
    }
}

/// 环境信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvInfo {
    /// 是否在 Docker 环境中
    pub is_docker: bool,
    /// 操作系统类型
    pub os_type: OsType,
}

/// 环境检测器
pub struct EnvDetector;

impl EnvDetector {
    /// 检测是否在 Docker 环境中
    ///
    /// 依次检查 /.dockerenv、/proc/1/cgroup 以及 container 环境变量
    pub fn is_docker() -> bool {
        if Path::new("/.dockerenv").exists() {
            return true;
        }

        if let Ok(content) = fs::read_to_string("/proc/1/cgroup") {
            if content.contains("docker") || content.contains("containerd") {
                return true;
            }
        }

        std::env::var("container").is_ok()
    }

    /// 获取操作系统类型（编译目标平台）
    pub fn get_os_type() -> OsType {
        #[cfg(target_os = "windows")]
        return OsType::Windows;

        #[cfg(target_os = "macos")]
        return OsType::MacOS;

        #[cfg(target_os = "linux")]
        return OsType::Linux;

        #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
        return OsType::Unknown;
    }

    /// 获取完整的环境信息
    pub fn get_env_info() -> EnvInfo {
        EnvInfo {
            is_docker: Self::is_docker(),
            os_type: Self::get_os_type(),
        }
    }

    /// 当前用户主目录
    ///
    /// Unix 读取 HOME，Windows 读取 USERPROFILE；均未设置时返回 None
    pub fn home_dir() -> Option<PathBuf> {
        let key = if cfg!(target_os = "windows") {
            "USERPROFILE"
        } else {
            "HOME"
        };

        std::env::var_os(key)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
    }
}
