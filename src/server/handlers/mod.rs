// API处理器模块

pub mod filesystem;

pub use filesystem::{browse, delete_entry, home_directory, search, upload};
