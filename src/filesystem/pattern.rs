// 文件名通配匹配
//
// 查询词 q 按 `*q*` 通配模式匹配文件名，q 中的 `*` 与 `?` 同样作为通配符

use regex::{Regex, RegexBuilder};

use crate::config::EnvDetector;

use super::types::FsError;

/// 文件名匹配模式
#[derive(Debug, Clone)]
pub struct NamePattern {
    regex: Regex,
}

impl NamePattern {
    /// 构造"包含 query"的模式，大小写规则跟随当前平台
    pub fn contains(query: &str) -> Result<Self, FsError> {
        Self::contains_with_case(query, EnvDetector::get_os_type().is_case_sensitive())
    }

    /// 构造"包含 query"的模式，显式指定是否区分大小写
    pub fn contains_with_case(query: &str, case_sensitive: bool) -> Result<Self, FsError> {
        let glob = format!("*{}*", query);
        let regex = RegexBuilder::new(&glob_to_regex(&glob))
            .case_insensitive(!case_sensitive)
            .dot_matches_new_line(true)
            .build()
            .map_err(FsError::internal)?;

        Ok(Self { regex })
    }

    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }
}

/// 通配模式转为锚定的正则表达式
fn glob_to_regex(glob: &str) -> String {
    let mut out = String::with_capacity(glob.len() * 2 + 2);
    out.push('^');

    let mut literal = String::new();
    for ch in glob.chars() {
        match ch {
            '*' | '?' => {
                out.push_str(&regex::escape(&literal));
                literal.clear();
                out.push_str(if ch == '*' { ".*" } else { "." });
            }
            _ => literal.push(ch),
        }
    }
    out.push_str(&regex::escape(&literal));

    out.push('$');
    out
}
