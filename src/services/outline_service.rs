//! 大纲服务 - 业务能力层
//!
//! 提供 suggest / modify / evaluate 三种能力，每种能力一次 LLM 往返。
//! 只处理单个大纲，不关心轮次和候选。

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;

use crate::error::{AppResult, ParseError};
use crate::models::outline::{Evaluation, Outline};
use crate::prompts::{fill, PromptSet};
use crate::services::llm_service::StageClients;
use crate::services::retry::retry_recoverable;

static SCORE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?im)^[\s*#>_-]*(?:total\s+score|overall\s+score|score|总分|分数|得分)[\s*_]*[:：][\s*_]*(-?\d+(?:\.\d+)?)",
    )
    .expect("合法的正则")
});

/// 大纲服务
///
/// 职责：
/// - 根据评估意见生成一条修改建议
/// - 按建议修改大纲，只允许引用已知文献
/// - 对大纲打分
///
/// 每一步的解析/校验失败按 `max_attempts` 重试，其他错误直接返回。
#[derive(Clone)]
pub struct OutlineService {
    clients: StageClients,
    prompts: &'static PromptSet,
    max_attempts: usize,
}

impl OutlineService {
    pub fn new(clients: StageClients, prompts: &'static PromptSet, max_attempts: usize) -> Self {
        Self {
            clients,
            prompts,
            max_attempts,
        }
    }

    /// 生成一条修改建议
    pub async fn suggest(&self, title: &str, outline: &str, eval_detail: &str) -> AppResult<String> {
        let prompt = fill(
            self.prompts.suggest,
            &[
                ("title", title),
                ("outline", outline),
                ("eval_detail", eval_detail),
            ],
        );
        let prompt = &prompt;
        let client = &self.clients.suggest;
        retry_recoverable("生成修改建议", self.max_attempts, move |_| async move {
            let response = client.complete(prompt).await?;
            Ok(parse_suggestion(&response)?)
        })
        .await
    }

    /// 按建议修改大纲
    pub async fn modify(
        &self,
        title: &str,
        suggestions: &[String],
        outline: &str,
        bibkeys: &[String],
    ) -> AppResult<Outline> {
        let suggestion_text = suggestions
            .iter()
            .enumerate()
            .map(|(i, s)| format!("{}. {}", i + 1, s))
            .collect::<Vec<_>>()
            .join("\n");
        let bibkey_text = bibkeys.join(", ");
        let prompt = fill(
            self.prompts.modify,
            &[
                ("title", title),
                ("suggestions", &suggestion_text),
                ("outline", outline),
                ("bibkeys", &bibkey_text),
            ],
        );
        let known: HashSet<&str> = bibkeys.iter().map(String::as_str).collect();

        let prompt = &prompt;
        let known = &known;
        let client = &self.clients.modify;
        retry_recoverable("修改大纲", self.max_attempts, move |_| async move {
            let response = client.complete(prompt).await?;
            let outline = Outline::parse_markdown(&response)?;
            check_citations(&outline, known)?;
            debug!("修改后的大纲包含 {} 个章节", outline.section_count());
            Ok(outline)
        })
        .await
    }

    /// 对大纲打分
    pub async fn evaluate(&self, title: &str, outline: &str) -> AppResult<Evaluation> {
        let prompt = fill(
            self.prompts.evaluate,
            &[("title", title), ("outline", outline)],
        );
        let prompt = &prompt;
        let client = &self.clients.evaluate;
        retry_recoverable("评估大纲", self.max_attempts, move |_| async move {
            let response = client.complete(prompt).await?;
            Ok(parse_evaluation(&response)?)
        })
        .await
    }
}

/// 解析修改建议，空回复视为格式错误
pub fn parse_suggestion(response: &str) -> Result<String, ParseError> {
    let suggestion = response.trim();
    if suggestion.is_empty() {
        return Err(ParseError::MalformedValue {
            reason: "修改建议为空".to_string(),
        });
    }
    Ok(suggestion.to_string())
}

/// 检查大纲只引用了已知的 bibkey
pub fn check_citations(outline: &Outline, known: &HashSet<&str>) -> Result<(), ParseError> {
    match outline
        .citations()
        .into_iter()
        .find(|key| !known.contains(key.as_str()))
    {
        Some(bibkey) => Err(ParseError::BibkeyNotFound { bibkey }),
        None => Ok(()),
    }
}

/// 解析评估结果
///
/// 取最后一个 `Score: <n>` 行作为分数，整段回复作为诊断说明。
pub fn parse_evaluation(response: &str) -> Result<Evaluation, ParseError> {
    let detail = response.trim();
    let raw = SCORE_LINE
        .captures_iter(detail)
        .last()
        .and_then(|c| c.get(1))
        .ok_or_else(|| ParseError::MalformedValue {
            reason: "评估结果中没有 Score 行".to_string(),
        })?;
    let score: f64 = raw.as_str().parse().map_err(|_| ParseError::MalformedValue {
        reason: format!("无法解析分数: {}", raw.as_str()),
    })?;
    Ok(Evaluation {
        score,
        detail: detail.to_string(),
    })
}
