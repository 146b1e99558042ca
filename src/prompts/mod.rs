//! 提示词模板
//!
//! 每种语言一套 [`PromptSet`]，通过静态表按语言代码选择，
//! 未知语言回退到英文。

mod en;
mod zh;

use phf::phf_map;
use tracing::warn;

/// 默认语言
pub const DEFAULT_LANGUAGE: &str = "en";

/// 一套完整的提示词模板
///
/// 模板中的 `{name}` 占位符由 [`fill`] 替换。
#[derive(Debug)]
pub struct PromptSet {
    /// 生成一条修改建议: `{title}` `{outline}` `{eval_detail}`
    pub suggest: &'static str,
    /// 按建议修改大纲: `{title}` `{suggestions}` `{outline}` `{bibkeys}`
    pub modify: &'static str,
    /// 评估大纲: `{title}` `{outline}`
    pub evaluate: &'static str,
    /// 抽取图表: `{content}` `{title_list}`
    pub chart: &'static str,
}

static PROMPTS: phf::Map<&'static str, &'static PromptSet> = phf_map! {
    "en" => &en::PROMPTS,
    "zh" => &zh::PROMPTS,
};

/// 按语言代码获取提示词
pub fn get_prompts(language: &str) -> &'static PromptSet {
    match PROMPTS.get(language) {
        Some(prompts) => prompts,
        None => {
            warn!(
                "不支持的语言: {}, 回退到 {}",
                language, DEFAULT_LANGUAGE
            );
            &en::PROMPTS
        }
    }
}

/// 已注册的语言代码
pub fn supported_languages() -> Vec<&'static str> {
    let mut langs: Vec<&'static str> = PROMPTS.keys().copied().collect();
    langs.sort_unstable();
    langs
}

/// 替换模板中的占位符
///
/// 只替换给定名字的 `{name}`，模板中其他花括号（例如 mermaid 示例）保持不变。
pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
    values
        .iter()
        .fold(template.to_string(), |acc, (name, value)| {
            acc.replace(&format!("{{{}}}", name), value)
        })
}
