//! 图表抽取服务 - 业务能力层
//!
//! 一次 LLM 调用，把整篇综述和章节标题列表交给模型，按固定文本格式解析出
//! 每个章节的图表记录。解析/校验失败整体重试。

use regex::Regex;
use std::collections::HashSet;
use std::sync::{Arc, LazyLock};
use tracing::{debug, info};

use crate::error::{AppResult, ParseError};
use crate::models::figure::{Figure, FigureKind, FigureMap};
use crate::prompts::{fill, PromptSet};
use crate::services::llm_service::LlmClient;
use crate::services::retry::retry_recoverable;
use crate::utils::normalize_title;

/// 默认最大尝试次数
pub const DEFAULT_MAX_ATTEMPTS: usize = 10;

static FIGURE_RECORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"Section Title:[ \t]*([^\n]+?)[ \t]*\r?\n\s*",
        r"Position Sentence:[ \t]*([^\n]+?)[ \t]*\r?\n\s*",
        r"Figure Title:[ \t]*([^\n]+?)[ \t]*\r?\n\s*",
        r"```(mermaid|markdown)[ \t]*\r?\n([\s\S]+?)```",
    ))
    .expect("合法的正则")
});
static SECTION_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Section Title:").expect("合法的正则"));

/// 图表抽取服务
pub struct FigureExtractor {
    client: Arc<dyn LlmClient>,
    prompts: &'static PromptSet,
    max_attempts: usize,
}

impl FigureExtractor {
    pub fn new(client: Arc<dyn LlmClient>, prompts: &'static PromptSet) -> Self {
        Self {
            client,
            prompts,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// 设置最大尝试次数
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// 抽取图表
    ///
    /// # 参数
    /// - `content`: 综述全文
    /// - `section_titles`: 综述已有的章节标题（原始形式）
    ///
    /// # 返回
    /// 归一化章节标题 → 图表列表
    pub async fn extract(&self, content: &str, section_titles: &[String]) -> AppResult<FigureMap> {
        let prompt = fill(
            self.prompts.chart,
            &[
                ("content", content),
                ("title_list", &section_titles.join(",")),
            ],
        );
        let known: HashSet<String> = section_titles.iter().map(|t| normalize_title(t)).collect();

        let prompt = &prompt;
        let known = &known;
        let client = &self.client;
        let figures = retry_recoverable("抽取图表", self.max_attempts, move |attempt| async move {
            debug!("图表抽取第 {} 次尝试", attempt);
            let response = client.complete(prompt).await?;
            Ok(parse_figures(&response, known)?)
        })
        .await?;

        info!(
            "抽取到 {} 个图表, 涉及 {} 个章节",
            figures.values().map(Vec::len).sum::<usize>(),
            figures.len()
        );
        Ok(figures)
    }
}

/// 按固定格式解析 LLM 返回的图表记录
///
/// - 每条记录依次为 Section Title / Position Sentence / Figure Title 三行和一个
///   mermaid 或 markdown 代码块
/// - `Section Title:` 出现次数多于完整记录数时视为结构不符
/// - 章节标题归一化后必须在 `known_sections` 中
/// - 没有任何记录时返回空表
pub fn parse_figures(response: &str, known_sections: &HashSet<String>) -> Result<FigureMap, ParseError> {
    let mut figures = FigureMap::new();
    let mut parsed = 0;

    for caps in FIGURE_RECORD.captures_iter(response) {
        let section = normalize_title(&caps[1]);
        if !known_sections.contains(&section) {
            return Err(ParseError::SectionNotFound {
                section: caps[1].trim().to_string(),
            });
        }
        let kind: FigureKind = caps[4]
            .parse()
            .map_err(|reason| ParseError::MalformedValue { reason })?;
        figures.entry(section).or_default().push(Figure {
            position_sentence: caps[2].trim().to_string(),
            title: caps[3].trim().to_string(),
            kind,
            body: caps[5].trim().to_string(),
        });
        parsed += 1;
    }

    let labels = SECTION_LABEL.find_iter(response).count();
    if labels != parsed {
        return Err(ParseError::StructureNotCorresponding {
            reason: format!("发现 {} 个 Section Title, 但只有 {} 条完整记录", labels, parsed),
        });
    }

    Ok(figures)
}
