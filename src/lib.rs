//! # Survey Refine
//!
//! 基于 LLM 的学术综述大纲精修与图表插入
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 数据与基础层
//! - `models/` - 综述、大纲、图表数据结构及 JSON 读写
//! - `prompts/` - 按语言组织的提示词模板（en / zh）
//! - `config` / `error` / `utils` - 配置、错误类型、日志和文本工具
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，每次只完成一个步骤
//! - `LlmService` - OpenAI 兼容接口调用能力（`LlmClient` trait）
//! - `OutlineService` - suggest / modify / evaluate 三个步骤
//! - `FigureExtractor` - 图表抽取（带重试）
//! - `apply_figures` - 把图表标记插入章节正文
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个候选"和"一次图表处理"的完整流程
//! - `RefineCtx` - 上下文封装（综述 + 轮次 + 候选序号）
//! - `CandidateFlow` - suggest → modify → evaluate
//! - `FigureFlow` - 抽取 → 补丁
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/round_executor` - Best-of-N 单轮执行器，管理并发
//! - `orchestrator/refine_loop` - 精修循环，串行驱动多轮
//! - `orchestrator/app` - 应用入口，加载、精修、插图、保存
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod prompts;
pub mod services;
pub mod utils;
pub mod workflow;

#[cfg(test)]
mod test_support;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{Figure, FigureKind, FigureMap, Outline, OutlineSection, Survey};
pub use orchestrator::{App, RefineLoop, RefineSummary, RoundExecutor, RunReport};
pub use services::{FigureExtractor, LlmClient, LlmService, OutlineService, StageClients};
pub use workflow::{CandidateFlow, CandidateInput, FigureFlow, RefineCtx};
