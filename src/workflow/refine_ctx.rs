//! 精修上下文
//!
//! 封装"我正在处理哪篇综述的第几轮、第几个候选"这一信息，只用于日志

use std::fmt::Display;

/// 精修上下文
#[derive(Debug, Clone)]
pub struct RefineCtx {
    /// 综述标题
    pub survey_title: String,

    /// 轮次（从1开始）
    pub round: usize,

    /// 候选序号（从1开始）
    pub candidate: usize,
}

impl RefineCtx {
    /// 创建新的精修上下文
    pub fn new(survey_title: impl Into<String>, round: usize, candidate: usize) -> Self {
        Self {
            survey_title: survey_title.into(),
            round,
            candidate,
        }
    }
}

impl Display for RefineCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[综述 {} 轮#{} 候选#{}]",
            self.survey_title, self.round, self.candidate
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let ctx = RefineCtx::new("LLM Surveys", 2, 3);
        assert_eq!(ctx.to_string(), "[综述 LLM Surveys 轮#2 候选#3]");
    }
}
