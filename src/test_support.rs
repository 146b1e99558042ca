//! 单元测试用的脚本化 LLM

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{AppError, AppResult, LlmError};
use crate::prompts::get_prompts;
use crate::services::llm_service::LlmClient;

/// prompt 对应的步骤
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Suggest,
    Modify,
    Evaluate,
    Chart,
}

impl Step {
    fn index(self) -> usize {
        self as usize
    }
}

/// 按 prompt 的第一行判断是哪个步骤（只支持英文模板）
pub fn step_of(prompt: &str) -> Step {
    let prompts = get_prompts("en");
    let first_line = |template: &str| template.lines().next().unwrap_or_default().to_string();
    if prompt.starts_with(&first_line(prompts.suggest)) {
        Step::Suggest
    } else if prompt.starts_with(&first_line(prompts.modify)) {
        Step::Modify
    } else if prompt.starts_with(&first_line(prompts.evaluate)) {
        Step::Evaluate
    } else {
        Step::Chart
    }
}

type Reply = Box<dyn Fn(Step, usize) -> AppResult<String> + Send + Sync>;

/// 脚本化 LLM：回复由 `(步骤, 该步骤第几次调用)` 决定，调用次数按步骤计数
pub struct StepLlm {
    reply: Reply,
    counts: [AtomicUsize; 4],
}

impl StepLlm {
    pub fn new(reply: impl Fn(Step, usize) -> AppResult<String> + Send + Sync + 'static) -> Self {
        Self {
            reply: Box::new(reply),
            counts: Default::default(),
        }
    }

    /// 总是返回格式正确的回复，第 n 次评估得分为 `scores[n % len]`
    pub fn well_behaved(scores: Vec<f64>) -> Self {
        Self::new(move |step, n| match step {
            Step::Suggest => Ok(format!("Suggestion {}: split the methods section.", n)),
            Step::Modify => Ok(modified_outline(n)),
            Step::Evaluate => Ok(format!("Balanced outline.\nScore: {}", scores[n % scores.len()])),
            Step::Chart => Ok(String::new()),
        })
    }

    pub fn calls(&self, step: Step) -> usize {
        self.counts[step.index()].load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.counts.iter().map(|c| c.load(Ordering::SeqCst)).sum()
    }
}

/// 修改步骤返回的大纲，章节标题带上调用序号以便区分
pub fn modified_outline(n: usize) -> String {
    format!(
        "```markdown\n# LLM Surveys\n## 1 Introduction\nDigest Construction: Revision {} [smith2020].\n## 2 Methods\nDigest Analysis: Compare methods.\n```",
        n
    )
}

pub fn transport_error() -> AppError {
    AppError::Llm(LlmError::EmptyContent {
        model: "step".to_string(),
    })
}

#[async_trait]
impl LlmClient for StepLlm {
    async fn complete(&self, prompt: &str) -> AppResult<String> {
        let step = step_of(prompt);
        let n = self.counts[step.index()].fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        (self.reply)(step, n)
    }

    fn model_name(&self) -> &str {
        "step"
    }
}
