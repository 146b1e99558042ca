//! 单候选精修流程 - 流程层
//!
//! 核心职责：定义"一个候选"的完整精修流程
//!
//! 流程顺序：
//! 1. suggest → 根据上一轮评估意见生成一条修改建议
//! 2. modify → 按建议修改大纲（只允许引用已知文献）
//! 3. evaluate → 对新大纲打分
//!
//! 本层不重试：各步骤内部只重试解析失败，其余错误使本候选失败。

use tracing::{debug, info};

use crate::error::AppResult;
use crate::models::outline::{Outline, RenderOptions};
use crate::services::OutlineService;
use crate::utils::truncate_text;
use crate::workflow::refine_ctx::RefineCtx;

/// 没有评估意见时填入提示词的说明
pub const NO_EVALUATION: &str = "No evaluation is available yet.";

/// 一个候选的输入
///
/// 同一轮的每个候选各持有一份独立副本，互不共享可变状态。
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateInput {
    pub title: String,
    /// 父大纲的完整渲染
    pub parent_outline: String,
    /// 父大纲的评估意见
    pub eval_detail: String,
    pub bibkeys: Vec<String>,
}

impl CandidateInput {
    pub fn from_outline(title: impl Into<String>, outline: &Outline, bibkeys: &[String]) -> Self {
        Self {
            title: title.into(),
            parent_outline: outline.render(RenderOptions::FULL),
            eval_detail: outline.eval_detail().unwrap_or(NO_EVALUATION).to_string(),
            bibkeys: bibkeys.to_vec(),
        }
    }
}

/// 单候选精修流程
#[derive(Clone)]
pub struct CandidateFlow {
    outline_service: OutlineService,
}

impl CandidateFlow {
    /// 创建新的单候选精修流程
    pub fn new(outline_service: OutlineService) -> Self {
        Self { outline_service }
    }

    /// 生成一个候选大纲
    ///
    /// 返回的大纲已写入评估分数、评估意见和产生它的修改建议。
    pub async fn run(&self, input: &CandidateInput, ctx: &RefineCtx) -> AppResult<Outline> {
        let suggestion = self
            .outline_service
            .suggest(&input.title, &input.parent_outline, &input.eval_detail)
            .await?;
        debug!("{} 修改建议: {}", ctx, truncate_text(&suggestion, 120));

        let mut outline = self
            .outline_service
            .modify(
                &input.title,
                std::slice::from_ref(&suggestion),
                &input.parent_outline,
                &input.bibkeys,
            )
            .await?;

        let rendered = outline.render(RenderOptions::FULL);
        let evaluation = self
            .outline_service
            .evaluate(&input.title, &rendered)
            .await?;

        info!("{} ✓ 候选完成, 得分: {}", ctx, evaluation.score);
        debug!("{} 大纲:\n{}", ctx, rendered);

        outline.stamp(evaluation, suggestion);
        Ok(outline)
    }
}
