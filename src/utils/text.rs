//! 文本工具
//!
//! 章节标题归一化必须同时用于文档自身的章节 key 和 LLM 返回的章节标题，
//! 否则本应命中的章节会静默匹配失败。

use regex::Regex;
use std::sync::LazyLock;

static INDEX_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(?:\.\d+)*\.?\s+").expect("合法的正则"));

/// 章节标题归一化
///
/// 反复去掉 markdown 标题符号、强调/引号包裹和编号前缀，直到不再变化，
/// 然后压缩空白并转为小写。结果再次归一化保持不变。
///
/// ```
/// use survey_refine::utils::normalize_title;
/// assert_eq!(normalize_title("## 2.1  **Related   Work**"), "related work");
/// assert_eq!(normalize_title("**1 Intro**"), "intro");
/// ```
pub fn normalize_title(title: &str) -> String {
    let mut current = title;
    loop {
        let stripped = current
            .trim()
            .trim_start_matches('#')
            .trim_matches(|c: char| matches!(c, '*' | '_' | '`' | '"' | '\'') || c.is_whitespace());
        let stripped = match INDEX_PREFIX.find(stripped) {
            Some(m) => &stripped[m.end()..],
            None => stripped,
        };
        if stripped == current {
            break;
        }
        current = stripped;
    }
    current
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// 截断长文本用于日志显示
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
