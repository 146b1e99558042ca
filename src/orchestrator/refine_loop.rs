//! 精修循环控制器 - 编排层
//!
//! 按轮次严格串行地驱动 [`RoundExecutor`]：第 i+1 轮以第 i 轮选出的大纲
//! 及其评估意见为输入。全部轮次结束后把最终大纲提交回综述，并记录每轮得分。
//!
//! 任意一轮失败时综述保持不变，错误向上传播。

use tracing::info;

use crate::error::AppResult;
use crate::models::survey::Survey;
use crate::orchestrator::round_executor::RoundExecutor;
use crate::utils::logging::{log_round_complete, log_round_start};

/// 精修结果摘要
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RefineSummary {
    /// 实际执行的轮数（早停时小于配置值）
    pub rounds_run: usize,
    /// 每轮全部候选得分
    pub scores: Vec<Vec<f64>>,
    /// 最终大纲的得分
    pub best_score: Option<f64>,
}

/// 精修循环控制器
pub struct RefineLoop {
    executor: RoundExecutor,
    refine_count: usize,
    best_of: usize,
    early_stop_patience: usize,
}

impl RefineLoop {
    pub fn new(executor: RoundExecutor, refine_count: usize, best_of: usize) -> Self {
        Self {
            executor,
            refine_count,
            best_of,
            early_stop_patience: 0,
        }
    }

    /// 连续 `patience` 轮没有超过历史最高分时提前结束，0 表示不早停
    pub fn with_early_stop(mut self, patience: usize) -> Self {
        self.early_stop_patience = patience;
        self
    }

    /// 对综述大纲执行多轮精修
    pub async fn run(&self, survey: &mut Survey) -> AppResult<RefineSummary> {
        let bibkeys = survey.bibkeys();
        let mut current = survey.skeleton.clone();
        let mut history: Vec<Vec<f64>> = Vec::with_capacity(self.refine_count);
        let mut best_seen: Option<f64> = None;
        let mut stale_rounds = 0;

        for round in 0..self.refine_count {
            log_round_start(&survey.title, round, self.refine_count, self.best_of);

            let outcome = self
                .executor
                .run_round(&survey.title, round + 1, &current, &bibkeys, self.best_of)
                .await?;

            let round_best = outcome.winner.eval_score().unwrap_or(f64::NEG_INFINITY);
            log_round_complete(&survey.title, round, round_best, &outcome.scores);

            history.push(outcome.scores);
            current = outcome.winner;

            if best_seen.is_some_and(|best| round_best <= best) {
                stale_rounds += 1;
            } else {
                best_seen = Some(round_best);
                stale_rounds = 0;
            }

            if self.early_stop_patience > 0 && stale_rounds >= self.early_stop_patience {
                info!(
                    "[{}] 连续 {} 轮没有提升, 提前结束精修",
                    survey.title, stale_rounds
                );
                break;
            }
        }

        let summary = RefineSummary {
            rounds_run: history.len(),
            scores: history.clone(),
            best_score: current.eval_score(),
        };

        survey.commit_outline(current);
        survey.record_refinement(history, self.best_of, self.refine_count);

        Ok(summary)
    }
}
