//! Best-of-N 单轮执行器 - 编排层
//!
//! ## 职责
//!
//! 用完全相同的输入并发运行 N 个候选，依靠模型本身的随机性产生差异，
//! 再选出得分最高的候选作为本轮结果。
//!
//! ## 设计特点
//!
//! - **相互隔离**：每个候选拿到输入的独立副本，单个候选失败不影响其他候选
//! - **并发控制**：通过 Semaphore 限制同时运行的候选数量
//! - **可取消**：候选运行在 `JoinSet` 中，本轮 future 被丢弃时未完成的候选一并中止
//! - **稳定选择**：最高分并列时取生成顺序中的第一个

use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, warn};

use crate::error::{AppResult, RefineError};
use crate::models::outline::Outline;
use crate::workflow::{CandidateFlow, CandidateInput, RefineCtx};

/// 一轮的结果
#[derive(Debug, Clone)]
pub struct RoundOutcome {
    /// 得分最高的候选
    pub winner: Outline,
    /// 成功候选的得分（按生成顺序）
    pub scores: Vec<f64>,
    /// 失败的候选数
    pub failed: usize,
}

/// Best-of-N 单轮执行器
#[derive(Clone)]
pub struct RoundExecutor {
    flow: CandidateFlow,
    max_concurrent: usize,
}

impl RoundExecutor {
    pub fn new(flow: CandidateFlow, max_concurrent: usize) -> Self {
        Self {
            flow,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// 执行一轮 best-of-N
    ///
    /// # 参数
    /// - `title`: 综述标题
    /// - `round`: 轮次（从1开始，仅用于日志）
    /// - `parent`: 上一轮选出的大纲
    /// - `bibkeys`: 允许引用的文献
    /// - `width`: 候选数量
    pub async fn run_round(
        &self,
        title: &str,
        round: usize,
        parent: &Outline,
        bibkeys: &[String],
        width: usize,
    ) -> AppResult<RoundOutcome> {
        if width == 0 {
            return Err(RefineError::ZeroWidth.into());
        }

        let input = CandidateInput::from_outline(title, parent, bibkeys);
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut tasks = JoinSet::new();

        for idx in 0..width {
            let ctx = RefineCtx::new(title, round, idx + 1);
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| RefineError::CandidateAborted {
                    candidate: idx + 1,
                    message: e.to_string(),
                })?;

            // 每个候选持有独立的输入副本
            let flow = self.flow.clone();
            let input = input.clone();

            tasks.spawn(async move {
                let _permit = permit;
                (idx, flow.run(&input, &ctx).await)
            });
        }

        // 等待本轮所有候选完成
        let mut candidates: Vec<Option<Outline>> = vec![None; width];
        let mut failed = 0;
        let mut last_error = String::new();

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((idx, Ok(outline))) => candidates[idx] = Some(outline),
                Ok((idx, Err(e))) => {
                    warn!("{} ❌ 候选失败: {}", RefineCtx::new(title, round, idx + 1), e);
                    failed += 1;
                    last_error = e.to_string();
                }
                Err(e) => {
                    error!("[综述 {} 轮#{}] 候选任务异常退出: {}", title, round, e);
                    failed += 1;
                    last_error = e.to_string();
                }
            }
        }

        let mut finished: Vec<Outline> = candidates.into_iter().flatten().collect();
        let best = select_best(&finished).ok_or_else(|| RefineError::AllCandidatesFailed {
            round,
            width,
            last_error,
        })?;

        let scores = finished
            .iter()
            .map(|o| o.eval_score().unwrap_or(f64::NEG_INFINITY))
            .collect();
        let winner = finished.swap_remove(best);

        Ok(RoundOutcome {
            winner,
            scores,
            failed,
        })
    }
}

/// 选出得分最高的候选下标
///
/// 并列时取最先出现的；没有评估结果的候选视为负无穷。
pub fn select_best(candidates: &[Outline]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, outline) in candidates.iter().enumerate() {
        let score = outline.eval_score().unwrap_or(f64::NEG_INFINITY);
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((idx, score)),
        }
    }
    best.map(|(idx, _)| idx)
}
